//! [`AggregateCalculator`] (spec §4.7): the additive primitive-leaf rollup that fills
//! `aggregate` at every node.
//!
//! Per spec §9's re-architecture note, `overall` and `aggregate` are computed together in a
//! single recursive pass ([`crate::record`], [`crate::list`]) rather than in a separate
//! post-traversal — merging a child's already-correct `aggregate` into a parent's running
//! total is just [`Counts::merge`]. The one genuinely separate piece of aggregate logic is
//! this module's [`leaf_counts_one_sided`]: the recursive per-primitive-leaf FN/TN (ground
//! truth side) or FA (prediction side) breakdown used when a list-of-record element has no
//! counterpart on the other side (spec §4.3b: "an unmatched GT/prediction record contributes
//! to `aggregate` only").

use crate::{
    metrics::Counts,
    schema::{FieldKind, Schema},
    value::Value,
};

/// Recursively counts primitive-leaf contributions for a value that has no counterpart on
/// the other side of a list-of-record match (spec §4.3b).
///
/// - `is_gt_side = true`: a non-null leaf is a miss (`fn_ += 1`); a null/empty leaf is a
///   quiet true negative (`tn += 1`) — the same per-leaf split the dispatcher's list-null and
///   primitive-null rules use (spec §4.2), just applied one level further down.
/// - `is_gt_side = false` (an unmatched prediction): a non-null leaf is a hallucination
///   (`fa += 1`); a null/empty leaf contributes nothing, per spec §4.3b's wording ("non-null
///   child value → `fa += 1`", silent on the null case).
pub fn leaf_counts_one_sided(kind: &FieldKind, value: &Value, is_gt_side: bool) -> Counts {
    match kind {
        FieldKind::Primitive(_) => {
            let null = value.is_prim_null();
            if is_gt_side {
                if null { Counts::tn(1) } else { Counts::fn_(1) }
            } else if null {
                Counts::ZERO
            } else {
                Counts::fa(1)
            }
        }
        FieldKind::ListPrim(_) => {
            let null = value.is_list_null();
            let len = match value {
                Value::ListPrim(items) => items.len() as u64,
                _ => 0,
            };
            if is_gt_side {
                if null { Counts::tn(1) } else { Counts::fn_(len) }
            } else if null {
                Counts::ZERO
            } else {
                Counts::fa(len)
            }
        }
        FieldKind::Record(inner) => record_leaf_counts(inner, value, is_gt_side),
        FieldKind::ListRec(inner) => list_rec_leaf_counts(inner, value, is_gt_side),
    }
}

fn record_leaf_counts(schema: &Schema, value: &Value, is_gt_side: bool) -> Counts {
    let null = matches!(value, Value::Null);
    if is_gt_side {
        if null {
            return Counts::tn(1);
        }
    } else if null {
        return Counts::ZERO;
    }

    let Some(record) = value.as_rec() else {
        return Counts::ZERO;
    };

    let mut total = Counts::ZERO;
    for (name, descriptor) in &schema.fields {
        let child_value = record.get(name).unwrap_or(&Value::Null);
        total = total.merge(leaf_counts_one_sided(&descriptor.kind, child_value, is_gt_side));
    }
    if !is_gt_side {
        total = total.merge(Counts::fa(record.extra_fields.len() as u64));
    }
    total
}

fn list_rec_leaf_counts(schema: &Schema, value: &Value, is_gt_side: bool) -> Counts {
    let null = value.is_list_null();
    if is_gt_side && null {
        return Counts::tn(1);
    }
    if !is_gt_side && null {
        return Counts::ZERO;
    }

    let Some(items) = value.as_list_rec() else {
        return Counts::ZERO;
    };

    let mut total = Counts::ZERO;
    for record in items {
        let wrapped = Value::Rec(record.clone());
        total = total.merge(record_leaf_counts(schema, &wrapped, is_gt_side));
    }
    total
}
