//! Primitive value types shared by [`Schema`](crate::Schema) and [`Value`](crate::Value).

use serde::{Deserialize, Serialize};

/// The four primitive kinds a [`FieldKind::Primitive`](crate::schema::FieldKind::Primitive) or
/// [`FieldKind::ListPrim`](crate::schema::FieldKind::ListPrim) field may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimType {
    String,
    Int,
    Float,
    Bool,
}

/// A single primitive value. Tagged with the same shape as [`PrimType`] so that a
/// `Scalar`'s variant can be checked against a field's declared `PrimType` at construction
/// time, the way the teacher's `Schema` variants are checked against serde's visitor calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Scalar {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// The [`PrimType`] this value belongs to.
    pub fn prim_type(&self) -> PrimType {
        match self {
            Scalar::String(_) => PrimType::String,
            Scalar::Int(_) => PrimType::Int,
            Scalar::Float(_) => PrimType::Float,
            Scalar::Bool(_) => PrimType::Bool,
        }
    }

    /// `true` for the string variant holding the empty string — the primitive-field
    /// "effectively null" rule in spec §3 treats this the same as an absent value.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Scalar::String(s) if s.is_empty())
    }
}
