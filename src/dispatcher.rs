//! The null/type routing dispatcher (spec §4.2): decides, for one `(field, gt, pred)` triple,
//! whether the pair is a null-state outcome (TN/FA/FN) or needs a real comparer, and which one.

use crate::{
    engine::RecursionCtx,
    list, metrics::Counts, node::ComparisonNode, nonmatch::NonMatch, path, primitive, record,
    schema::{FieldDescriptor, FieldKind},
    value::Value,
};

/// What [`dispatch`] hands back to the caller ([`crate::record::compare`]'s field loop).
pub struct DispatchResult {
    pub node: ComparisonNode,
    /// Extra (hallucinated) prediction fields transitively present below this field — `0`
    /// for `Primitive`/`ListPrim` fields, forwarded from [`crate::record::RecordOutcome`] or
    /// [`crate::list::RecordListOutcome`] for `Record`/`ListRec` fields (spec §4.4 step 3).
    pub transitive_extra: u64,
    /// The threshold this field's `raw_similarity` is compared against for
    /// `all_fields_matched` purposes (spec §4.4 step 5): the descriptor's own threshold for
    /// `Primitive`/`ListPrim`/`Record` fields, or the element schema's `match_threshold` for
    /// `ListRec` fields (spec §3's structural invariant; `SPEC_FULL.md` §4's resolution).
    pub threshold_for_match: f64,
}

fn wrap(node: ComparisonNode, transitive_extra: u64, threshold_for_match: f64) -> DispatchResult {
    DispatchResult {
        node,
        transitive_extra,
        threshold_for_match,
    }
}

/// Routes one field comparison per spec §4.2's decision order: list-null short-circuit first,
/// then primitive/record null rules, then type-based dispatch to the real comparer.
pub fn dispatch(
    ctx: &mut RecursionCtx,
    path: &str,
    descriptor: &FieldDescriptor,
    gt: &Value,
    pred: &Value,
) -> DispatchResult {
    match &descriptor.kind {
        FieldKind::ListPrim(_) => dispatch_list_prim(path, descriptor, gt, pred),
        FieldKind::ListRec(schema) => dispatch_list_rec(ctx, path, descriptor, schema, gt, pred),
        FieldKind::Primitive(_) => dispatch_primitive(path, descriptor, gt, pred),
        FieldKind::Record(schema) => dispatch_record(ctx, path, descriptor, schema, gt, pred),
    }
}

fn dispatch_primitive(path: &str, descriptor: &FieldDescriptor, gt: &Value, pred: &Value) -> DispatchResult {
    let threshold = descriptor.effective_threshold();
    let gt_null = gt.is_prim_null();
    let pred_null = pred.is_prim_null();

    let node = match (gt_null, pred_null) {
        (true, true) => ComparisonNode::leaf(1.0, 1.0, descriptor.weight, Counts::tn(1)),
        (true, false) => {
            let mut n = ComparisonNode::leaf(0.0, 0.0, descriptor.weight, Counts::fa(1));
            n.non_matches
                .push(NonMatch::false_alarm(path, "prediction present, ground truth absent"));
            n
        }
        (false, true) => {
            let mut n = ComparisonNode::leaf(0.0, 0.0, descriptor.weight, Counts::fn_(1));
            n.non_matches
                .push(NonMatch::false_negative(path, "ground truth present, prediction absent"));
            n
        }
        (false, false) => match (gt.as_prim(), pred.as_prim()) {
            (Some(a), Some(b)) if a.prim_type() == b.prim_type() => {
                primitive::compare(path, descriptor, a, b)
            }
            _ => kind_mismatch_node(path, descriptor.weight, "type mismatch"),
        },
    };
    wrap(node, 0, threshold)
}

fn dispatch_list_prim(path: &str, descriptor: &FieldDescriptor, gt: &Value, pred: &Value) -> DispatchResult {
    let threshold = descriptor.effective_threshold();
    let gt_null = gt.is_list_null();
    let pred_null = pred.is_list_null();

    let node = match (gt_null, pred_null) {
        (true, true) => ComparisonNode::leaf(1.0, 1.0, descriptor.weight, Counts::tn(1)),
        (true, false) => list_null_fa(path, descriptor, pred),
        (false, true) => list_null_fn(path, descriptor, gt),
        (false, false) => match (gt.as_list_prim(), pred.as_list_prim()) {
            (Some(g), Some(p)) => list::compare_primitive_list(path, descriptor, g, p),
            _ => kind_mismatch_node(path, descriptor.weight, "type mismatch"),
        },
    };
    wrap(node, 0, threshold)
}

fn dispatch_record(
    ctx: &mut RecursionCtx,
    path: &str,
    descriptor: &FieldDescriptor,
    schema: &crate::schema::Schema,
    gt: &Value,
    pred: &Value,
) -> DispatchResult {
    let threshold = descriptor.effective_threshold();
    let gt_null = matches!(gt, Value::Null);
    let pred_null = matches!(pred, Value::Null);

    match (gt_null, pred_null) {
        (true, true) => wrap(
            ComparisonNode::leaf(1.0, 1.0, descriptor.weight, Counts::tn(1)),
            0,
            threshold,
        ),
        (true, false) => {
            let mut n = ComparisonNode::leaf(0.0, 0.0, descriptor.weight, Counts::fa(1));
            n.non_matches
                .push(NonMatch::false_alarm(path, "prediction present, ground truth absent"));
            wrap(n, 0, threshold)
        }
        (false, true) => {
            let mut n = ComparisonNode::leaf(0.0, 0.0, descriptor.weight, Counts::fn_(1));
            n.non_matches
                .push(NonMatch::false_negative(path, "ground truth present, prediction absent"));
            wrap(n, 0, threshold)
        }
        (false, false) => match (gt.as_rec(), pred.as_rec()) {
            (Some(g), Some(p)) => {
                let outcome = record::compare(ctx, path, schema, g, p, Some(descriptor));
                wrap(outcome.node, outcome.transitive_extra, threshold)
            }
            _ => wrap(kind_mismatch_node(path, descriptor.weight, "type mismatch"), 0, threshold),
        },
    }
}

fn dispatch_list_rec(
    ctx: &mut RecursionCtx,
    path: &str,
    descriptor: &FieldDescriptor,
    schema: &crate::schema::Schema,
    gt: &Value,
    pred: &Value,
) -> DispatchResult {
    let match_threshold = schema.match_threshold;
    let gt_null = gt.is_list_null();
    let pred_null = pred.is_list_null();

    match (gt_null, pred_null) {
        (true, true) => wrap(
            ComparisonNode::leaf(1.0, 1.0, descriptor.weight, Counts::tn(1)),
            0,
            match_threshold,
        ),
        (true, false) => wrap(list_null_fa(path, descriptor, pred), 0, match_threshold),
        (false, true) => wrap(list_null_fn(path, descriptor, gt), 0, match_threshold),
        (false, false) => match (gt.as_list_rec(), pred.as_list_rec()) {
            (Some(g), Some(p)) => {
                let outcome = list::compare_record_list(ctx, path, descriptor, schema, g, p);
                wrap(outcome.node, outcome.transitive_extra, match_threshold)
            }
            _ => wrap(
                kind_mismatch_node(path, descriptor.weight, "type mismatch"),
                0,
                match_threshold,
            ),
        },
    }
}

/// Ground truth null/empty, prediction populated: `fa = len(pred)` (spec §4.2 point 1,
/// §4.10's state table), one non-match per unmatched prediction item.
fn list_null_fa(field_path: &str, descriptor: &FieldDescriptor, pred: &Value) -> ComparisonNode {
    let len = match pred {
        Value::ListPrim(v) => v.len(),
        Value::ListRec(v) => v.len(),
        _ => 0,
    };
    let mut n = ComparisonNode::leaf(0.0, 0.0, descriptor.weight, Counts::fa(len as u64));
    for i in 0..len {
        n.non_matches.push(NonMatch::false_alarm(
            path::join(field_path, &path::index(i)),
            "prediction item present, no ground-truth list",
        ));
    }
    n
}

/// Ground truth populated, prediction null/empty: `fn = len(gt)` (spec §4.2 point 1).
fn list_null_fn(field_path: &str, descriptor: &FieldDescriptor, gt: &Value) -> ComparisonNode {
    let len = match gt {
        Value::ListPrim(v) => v.len(),
        Value::ListRec(v) => v.len(),
        _ => 0,
    };
    let mut n = ComparisonNode::leaf(0.0, 0.0, descriptor.weight, Counts::fn_(len as u64));
    for i in 0..len {
        n.non_matches.push(NonMatch::false_negative(
            path::join(field_path, &path::index(i)),
            "ground-truth item present, no prediction list",
        ));
    }
    n
}

/// A value's tag disagrees with what the schema declared for this field (spec §4.2 point 3,
/// §4.11, §7): treated as `{fd: 1, fp: 1}`, never a panic.
pub fn kind_mismatch_node(field_path: &str, weight: f64, reason: &str) -> ComparisonNode {
    let mut n = ComparisonNode::leaf(0.0, 0.0, weight, Counts::fd(1));
    n.non_matches.push(NonMatch::false_discovery(
        field_path,
        None,
        None,
        0.0,
        0.0,
        reason,
    ));
    n
}
