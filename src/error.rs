//! The crate's error taxonomy (spec §7).
//!
//! The comparison engine itself never raises: kind mismatches become `{fd: 1, fp: 1}`
//! nodes and division-by-zero in derived metrics resolves to `0.0`. The only fallible
//! surface is schema construction, which fails fast with the offending field path.

use thiserror::Error;

use crate::scalar::PrimType;

/// Raised by [`Schema::new`](crate::Schema::new) and [`FieldDescriptor`](crate::schema::FieldDescriptor)
/// builders when a schema violates one of the structural invariants in spec §3.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    #[error("field `{field}`: a ListRec field must not carry a comparator (Hungarian uses the element schema's match_threshold instead)")]
    ListRecHasComparator { field: String },

    #[error("field `{field}`: a ListRec field must not carry a threshold (Hungarian uses the element schema's match_threshold instead)")]
    ListRecHasThreshold { field: String },

    #[error("field `{field}`: a {kind:?} field requires a comparator")]
    MissingComparator { field: String, kind: PrimType },

    #[error("field `{field}`: threshold {value} is out of range [0, 1]")]
    ThresholdOutOfRange { field: String, value: f64 },

    #[error("field `{field}`: weight {value} must be greater than 0")]
    WeightNotPositive { field: String, value: f64 },

    #[error("schema: match_threshold {value} is out of range [0, 1]")]
    MatchThresholdOutOfRange { value: f64 },

    #[error("duplicate field name `{field}` in schema")]
    DuplicateField { field: String },
}

/// Crate-level error type. Beyond [`SchemaError`], the only other fallible ambient
/// operation is the Hungarian solver's degeneracy fallback (spec §7), which is logged
/// and handled internally rather than surfaced — so today this is effectively a thin
/// wrapper, kept as an enum so new non-comparison-path failures have somewhere to go.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
