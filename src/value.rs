//! Runtime data ([`Value`]/[`Record`]) being compared, as opposed to the [`Schema`](crate::Schema)
//! describing its shape (spec §3).

use ordermap::OrderMap;
use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// A value occupying a schema field slot.
///
/// `Value` does not carry its own type tag beyond this enum — whether a given `Value` is
/// the right shape for a field is the dispatcher's job (spec §4.2), not this type's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Value {
    Null,
    Prim(Scalar),
    Rec(Record),
    ListPrim(Vec<Scalar>),
    ListRec(Vec<Record>),
}

impl Value {
    /// The primitive-field "effectively null" predicate (spec §3): absent, or present as an
    /// empty string. Only meaningful for [`Value::Null`]/[`Value::Prim`] — never call this on
    /// a list-shaped value, use [`Value::is_list_null`] instead; the two predicates are
    /// intentionally distinct (spec §9 design notes).
    pub fn is_prim_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Prim(s) => s.is_empty_string(),
            Value::Rec(_) | Value::ListPrim(_) | Value::ListRec(_) => false,
        }
    }

    /// The list-field "effectively null" predicate (spec §3): absent, or present as an empty
    /// list. Distinct from [`Value::is_prim_null`] — an empty string is not an empty list and
    /// vice versa.
    pub fn is_list_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::ListPrim(v) => v.is_empty(),
            Value::ListRec(v) => v.is_empty(),
            Value::Prim(_) | Value::Rec(_) => false,
        }
    }

    pub fn as_rec(&self) -> Option<&Record> {
        match self {
            Value::Rec(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<&Scalar> {
        match self {
            Value::Prim(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list_prim(&self) -> Option<&[Scalar]> {
        match self {
            Value::ListPrim(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_rec(&self) -> Option<&[Record]> {
        match self {
            Value::ListRec(v) => Some(v),
            _ => None,
        }
    }
}

/// A nested object: the field values declared by a `Schema::Record`'s [`FieldDescriptor`]s,
/// plus whatever field names showed up in the source but aren't declared in the schema.
///
/// Field order is preserved via [`OrderMap`] the same way the teacher's `Schema::Struct`
/// keeps declaration order, so that non-match reports and serialized trees read naturally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub fields: OrderMap<String, Value>,
    /// Names present on the source object but absent from the schema — the hallucination
    /// side-channel described in spec §9 design notes. The engine only ever needs the count,
    /// never the (unparsed, schema-less) values themselves.
    #[serde(default)]
    pub extra_fields: Vec<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), value);
        self
    }

    pub fn with_extra_fields(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.extra_fields.extend(names);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_predicates_are_distinct() {
        assert!(Value::Null.is_prim_null());
        assert!(Value::Null.is_list_null());
        assert!(Value::Prim(Scalar::String(String::new())).is_prim_null());
        assert!(!Value::Prim(Scalar::String(String::new())).is_list_null());
        assert!(Value::ListPrim(vec![]).is_list_null());
        assert!(!Value::ListPrim(vec![]).is_prim_null());
        assert!(!Value::Prim(Scalar::Int(0)).is_prim_null());
    }

    #[test]
    fn record_builder_preserves_order() {
        let r = Record::new()
            .insert("b", Value::Null)
            .insert("a", Value::Null);
        let keys: Vec<&str> = r.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
