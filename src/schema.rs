//! The expected shape of a document (spec §3): a tree of [`FieldDescriptor`]s, each carrying
//! a [`FieldKind`], a [`Comparator`] where the kind needs one, a per-field `weight`, `threshold`
//! and `clip_under_threshold` policy, rooted in a [`Schema`] that additionally carries the
//! `match_threshold` used to classify record-list pairs (spec §4.6).
//!
//! Modelled after the teacher's `Schema` enum (`schema_analysis::schema::Schema`): a tagged
//! enum over the shapes a value can take, validated eagerly rather than trusted blindly.

use std::sync::Arc;

use ordermap::OrderMap;

use crate::{comparator::Comparator, error::SchemaError, scalar::PrimType};

/// The shape a field's value is expected to take.
pub enum FieldKind {
    /// A single primitive value (spec §3's `PrimType`).
    Primitive(PrimType),
    /// A nested object, validated against its own [`Schema`].
    Record(Box<Schema>),
    /// A list of primitive values, order-independent (spec §4.3a).
    ListPrim(PrimType),
    /// A list of nested objects, matched order-independently via the Hungarian algorithm
    /// (spec §4.3b), each element validated against `element`.
    ListRec(Box<Schema>),
}

/// One field's full configuration: what shape it must take, how to score a match, how much
/// it counts toward its parent's weighted similarity, and how lenient to be before a
/// similarity counts as a match at all.
pub struct FieldDescriptor {
    pub kind: FieldKind,
    /// Required for `Primitive`/`ListPrim`, forbidden for `Record`/`ListRec` (spec §3's
    /// structural invariant — a nested record's match/no-match call is made by its own
    /// `match_threshold`, not an externally supplied comparator).
    pub comparator: Option<Arc<dyn Comparator>>,
    /// Relative contribution to the parent record's weighted similarity (spec §4.4 step 1).
    /// Must be greater than 0.
    pub weight: f64,
    /// Similarity cutoff for TP/FD classification (spec §3). `None` falls back to the spec's
    /// documented default of `0.5`. Must lie in `[0, 1]` when set, and MUST be `None` for
    /// `Record`/`ListRec` fields — a `ListRec` field is classified against the element
    /// schema's `match_threshold` instead (spec §3's structural invariant), and a nested
    /// `Record` field is classified against its own `object_threshold` below.
    pub threshold: Option<f64>,
    /// Below `threshold`, whether the field's contribution clips to `0.0` in the weighted
    /// score (`true`, the default) or keeps the raw similarity (`false`) — spec §3's
    /// `clip_under_threshold`. Either way, the classification itself (TP vs FD) is unaffected;
    /// only `threshold_applied_score` differs (spec §4.1, §8's boundary behaviour).
    pub clip_under_threshold: bool,
}

impl FieldDescriptor {
    /// Effective threshold used for classification: `threshold`, or the spec's default `0.5`.
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or(0.5)
    }

    pub fn primitive(prim: PrimType, comparator: Arc<dyn Comparator>) -> Self {
        Self {
            kind: FieldKind::Primitive(prim),
            comparator: Some(comparator),
            weight: 1.0,
            threshold: None,
            clip_under_threshold: true,
        }
    }

    pub fn list_prim(prim: PrimType, comparator: Arc<dyn Comparator>) -> Self {
        Self {
            kind: FieldKind::ListPrim(prim),
            comparator: Some(comparator),
            weight: 1.0,
            threshold: None,
            clip_under_threshold: true,
        }
    }

    pub fn record(schema: Schema) -> Self {
        Self {
            kind: FieldKind::Record(Box::new(schema)),
            comparator: None,
            weight: 1.0,
            threshold: None,
            clip_under_threshold: true,
        }
    }

    pub fn list_rec(schema: Schema) -> Self {
        Self {
            kind: FieldKind::ListRec(Box::new(schema)),
            comparator: None,
            weight: 1.0,
            threshold: None,
            clip_under_threshold: true,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_clip_under_threshold(mut self, clip: bool) -> Self {
        self.clip_under_threshold = clip;
        self
    }

    fn validate(&self, field: &str) -> Result<(), SchemaError> {
        match (&self.kind, &self.comparator) {
            (FieldKind::Primitive(kind) | FieldKind::ListPrim(kind), None) => {
                return Err(SchemaError::MissingComparator {
                    field: field.to_owned(),
                    kind: *kind,
                });
            }
            (FieldKind::Record(_) | FieldKind::ListRec(_), Some(_)) => {
                return Err(SchemaError::ListRecHasComparator {
                    field: field.to_owned(),
                });
            }
            _ => {}
        }
        if matches!(self.kind, FieldKind::ListRec(_)) && self.threshold.is_some() {
            return Err(SchemaError::ListRecHasThreshold {
                field: field.to_owned(),
            });
        }
        if self.weight <= 0.0 {
            return Err(SchemaError::WeightNotPositive {
                field: field.to_owned(),
                value: self.weight,
            });
        }
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(SchemaError::ThresholdOutOfRange {
                    field: field.to_owned(),
                    value: t,
                });
            }
        }
        Ok(())
    }
}

/// The expected shape of a record: an ordered map of named [`FieldDescriptor`]s plus the
/// similarity threshold used when this schema is the element type of a `ListRec` field
/// (spec §4.6 — Hungarian pair classification).
pub struct Schema {
    pub fields: OrderMap<String, FieldDescriptor>,
    /// Minimum raw similarity (spec §4.4) for two records of this shape to be classified as
    /// a matched pair rather than an unmatched-ground-truth/unmatched-prediction pair when
    /// this schema is used as a `ListRec` element type (spec §3, §4.6). Defaults to `0.7`,
    /// mirroring `original_source`'s `match_threshold: ClassVar[float] = 0.7`.
    pub match_threshold: f64,
}

impl Schema {
    /// Builds a schema from an already-ordered sequence of `(name, descriptor)` pairs,
    /// validating every structural invariant from spec §3 up front. Field names are
    /// considered duplicated if the same name appears twice in `fields` — enforced while
    /// building the backing `OrderMap` rather than re-scanned afterward.
    pub fn new(
        fields: impl IntoIterator<Item = (impl Into<String>, FieldDescriptor)>,
    ) -> Result<Self, SchemaError> {
        Self::with_match_threshold(fields, 0.7)
    }

    pub fn with_match_threshold(
        fields: impl IntoIterator<Item = (impl Into<String>, FieldDescriptor)>,
        match_threshold: f64,
    ) -> Result<Self, SchemaError> {
        if !(0.0..=1.0).contains(&match_threshold) {
            return Err(SchemaError::MatchThresholdOutOfRange {
                value: match_threshold,
            });
        }

        let mut map = OrderMap::new();
        for (name, descriptor) in fields {
            let name = name.into();
            descriptor.validate(&name)?;
            if map.insert(name.clone(), descriptor).is_some() {
                return Err(SchemaError::DuplicateField { field: name });
            }
        }

        Ok(Schema {
            fields: map,
            match_threshold,
        })
    }

    pub fn get(&self, field: &str) -> Option<&FieldDescriptor> {
        self.fields.get(field)
    }

    /// Field names in declaration order — used for `all_fields_matched` (spec §4.4 step 5).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

// Hand-written impls the way the teacher keeps its derive-unfriendly boilerplate in
// `mod boilerplate` — `Arc<dyn Comparator>` has no `Debug`/`PartialEq` impl of its own, so
// `Schema`/`FieldDescriptor` are printed and compared structurally, ignoring the trait
// object's identity.
mod boilerplate {
    use std::fmt;

    use super::{FieldDescriptor, FieldKind, Schema};

    impl fmt::Debug for FieldKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                FieldKind::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
                FieldKind::Record(_) => f.debug_tuple("Record").finish(),
                FieldKind::ListPrim(p) => f.debug_tuple("ListPrim").field(p).finish(),
                FieldKind::ListRec(_) => f.debug_tuple("ListRec").finish(),
            }
        }
    }

    impl fmt::Debug for Schema {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Schema")
                .field("fields", &self.fields.keys().collect::<Vec<_>>())
                .field("match_threshold", &self.match_threshold)
                .finish()
        }
    }

    impl fmt::Debug for FieldDescriptor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FieldDescriptor")
                .field("kind", &self.kind)
                .field("has_comparator", &self.comparator.is_some())
                .field("weight", &self.weight)
                .field("threshold", &self.threshold)
                .field("clip_under_threshold", &self.clip_under_threshold)
                .finish()
        }
    }

    impl PartialEq for FieldKind {
        fn eq(&self, other: &Self) -> bool {
            match (self, other) {
                (FieldKind::Primitive(a), FieldKind::Primitive(b)) => a == b,
                (FieldKind::ListPrim(a), FieldKind::ListPrim(b)) => a == b,
                (FieldKind::Record(a), FieldKind::Record(b)) => {
                    a.fields.keys().eq(b.fields.keys())
                }
                (FieldKind::ListRec(a), FieldKind::ListRec(b)) => {
                    a.fields.keys().eq(b.fields.keys())
                }
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::Exact;

    #[test]
    fn rejects_missing_comparator() {
        let err = Schema::new([(
            "name",
            FieldDescriptor {
                kind: FieldKind::Primitive(PrimType::String),
                comparator: None,
                weight: 1.0,
                threshold: None,
                clip_under_threshold: true,
            },
        )])
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingComparator { .. }));
    }

    #[test]
    fn rejects_comparator_on_record_field() {
        let inner = Schema::new(Vec::<(String, FieldDescriptor)>::new()).unwrap();
        let err = Schema::new([(
            "addr",
            FieldDescriptor {
                kind: FieldKind::Record(Box::new(inner)),
                comparator: Some(Arc::new(Exact)),
                weight: 1.0,
                threshold: None,
                clip_under_threshold: true,
            },
        )])
        .unwrap_err();
        assert!(matches!(err, SchemaError::ListRecHasComparator { .. }));
    }

    #[test]
    fn rejects_threshold_on_list_rec_field() {
        let inner = Schema::new(Vec::<(String, FieldDescriptor)>::new()).unwrap();
        let err = Schema::new([(
            "items",
            FieldDescriptor::list_rec(inner).with_threshold(0.5),
        )])
        .unwrap_err();
        assert!(matches!(err, SchemaError::ListRecHasThreshold { .. }));
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let err = Schema::new([
            (
                "name",
                FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)),
            ),
            (
                "name",
                FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)),
            ),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn rejects_out_of_range_match_threshold() {
        let err = Schema::with_match_threshold(Vec::<(String, FieldDescriptor)>::new(), 1.5)
            .unwrap_err();
        assert!(matches!(err, SchemaError::MatchThresholdOutOfRange { .. }));
    }

    #[test]
    fn default_match_threshold_is_seven_tenths() {
        let s = Schema::new(Vec::<(String, FieldDescriptor)>::new()).unwrap();
        assert_eq!(s.match_threshold, 0.7);
    }

    #[test]
    fn default_field_threshold_is_one_half() {
        let d = FieldDescriptor::primitive(PrimType::String, Arc::new(Exact));
        assert_eq!(d.effective_threshold(), 0.5);
    }
}
