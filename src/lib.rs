#![forbid(unsafe_code)]
#![warn(missing_docs)]
/*!
# schema_match

A schema-driven structured-document comparison engine: given a [`Schema`] describing the
expected shape of a record and a ground-truth/prediction pair of values conforming to it,
[`compare`] produces a weighted similarity score plus a hierarchical confusion-matrix tree
(true positives, false alarms, false discoveries, true negatives, false negatives) that mirrors
the schema's own nesting.

## Why two metric views

Every node in the tree carries two distinct [`Counts`] views side by side:

- `overall`, this node's own object-level classification — a nested record counts as a single
  match or non-match against its parent, not the sum of its fields' outcomes.
- `aggregate`, the full recursive sum of every primitive leaf in the node's subtree.

A record with nine correct fields and one wrong one is a single false discovery from its
parent's point of view (`overall`), but nine true positives and one false discovery from a
leaf-counting point of view (`aggregate`). Both are useful; neither subsumes the other.

## Usage

```
# use std::sync::Arc;
# use schema_match::{Schema, FieldDescriptor, Record, Value, Scalar, PrimType};
# use schema_match::comparator::Exact;
let schema = Schema::new([(
    "name",
    FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)),
)])
.unwrap();

let ground_truth = Record::new().insert("name", Value::Prim(Scalar::String("Alice".into())));
let prediction = ground_truth.clone();

let result = schema_match::compare(&schema, &ground_truth, &prediction, Default::default());
assert_eq!(result.overall_score, 1.0);
```

Unordered lists of records (`FieldKind::ListRec`) are matched order-independently via the
Hungarian algorithm, so a prediction that returns the right records in the wrong order still
scores as a perfect match.
*/

pub mod aggregate;
pub mod comparator;
pub mod derived;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod hungarian;
pub mod list;
pub mod metrics;
pub mod node;
pub mod nonmatch;
pub mod path;
pub mod primitive;
pub mod record;
pub mod scalar;
pub mod schema;
pub mod value;

pub use comparator::Comparator;
pub use engine::{compare, CompareOptions, CompareResult, RecursionCtx};
pub use error::{Error, SchemaError};
pub use metrics::{Counts, DerivedMetrics};
pub use node::ComparisonNode;
pub use nonmatch::{NonMatch, NonMatchKind};
pub use scalar::{PrimType, Scalar};
pub use schema::{FieldDescriptor, FieldKind, Schema};
pub use value::{Record, Value};
