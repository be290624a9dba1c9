//! `ListComparer` (spec §4.3): the primitive-list variant (§4.3a) and the record-list variant
//! (§4.3b), both built on [`crate::hungarian`]'s assignment solver. The record-list variant is
//! the engine's hot path and its most intricate piece — see the module-level notes inline.

use ordermap::OrderMap;
use std::collections::HashSet;

use crate::{
    aggregate::leaf_counts_one_sided,
    engine::RecursionCtx,
    hungarian::{self, Assignment},
    metrics::Counts,
    node::ComparisonNode,
    nonmatch::NonMatch,
    path,
    record::{self, RecordOutcome},
    scalar::Scalar,
    schema::{FieldDescriptor, Schema},
    value::Record,
};

/// Placeholder index segment used while building the n×m cost matrix (spec §4.6), before the
/// Hungarian solver has decided which ground-truth index each pair will actually settle at —
/// every cell is compared under the same nominal path, then [`restamp_paths`] rewrites the
/// matched cells' descendant non-match paths to their real `[i]` index once the assignment is
/// known (spec §4.9/§4.10's index-notation requirement).
const PLACEHOLDER_INDEX: &str = "[*]";

/// Rewrites every non-match path under `node` (and its descendants) that starts with
/// `old_prefix` to start with `new_prefix` instead — used to turn a cost-matrix cell's nominal
/// `items[*]...` paths into the real `items[i]...` paths once the Hungarian assignment is
/// known (spec §4.9/§4.10).
fn restamp_paths(node: &mut ComparisonNode, old_prefix: &str, new_prefix: &str) {
    for non_match in &mut node.non_matches {
        if let Some(rest) = non_match.field_path.strip_prefix(old_prefix) {
            non_match.field_path = format!("{new_prefix}{rest}");
        }
    }
    for child in node.children.values_mut() {
        restamp_paths(child, old_prefix, new_prefix);
    }
    for element in &mut node.elements {
        restamp_paths(element, old_prefix, new_prefix);
    }
}

/// Primitive-list comparison (spec §4.3a). Called only when both `gt`/`pred` are non-empty —
/// the dispatcher's list-null short-circuit (spec §4.2 point 1) already resolved the empty
/// cases into TN/FA/FN before this function is ever reached.
pub fn compare_primitive_list(
    field_path: &str,
    descriptor: &FieldDescriptor,
    gt: &[Scalar],
    pred: &[Scalar],
) -> ComparisonNode {
    let comparator = descriptor
        .comparator
        .as_ref()
        .expect("ListPrim fields always carry a comparator (enforced at Schema::new)");
    let threshold = descriptor.effective_threshold();

    let similarity: Vec<Vec<f64>> = gt
        .iter()
        .map(|g| pred.iter().map(|p| comparator.compare(g, p)).collect())
        .collect();
    let assignments = hungarian::solve(&similarity);

    let tp = assignments.iter().filter(|a| a.similarity >= threshold).count() as u64;
    let fd = assignments.len() as u64 - tp;
    let fn_ = (gt.len() - assignments.len()) as u64;
    let fa = (pred.len() - assignments.len()) as u64;

    let raw = if assignments.is_empty() {
        0.0
    } else {
        assignments.iter().map(|a| a.similarity).sum::<f64>() / assignments.len() as f64
    };

    let mut node = ComparisonNode::leaf(
        raw,
        raw, // never clips under threshold (spec §4.3a)
        descriptor.weight,
        Counts {
            tp,
            fa,
            fd,
            tn: 0,
            fn_,
        },
    );

    let matched_gt: HashSet<usize> = assignments.iter().map(|a| a.i).collect();
    let matched_pred: HashSet<usize> = assignments.iter().map(|a| a.j).collect();
    for i in 0..gt.len() {
        if !matched_gt.contains(&i) {
            node.non_matches.push(NonMatch::false_negative(
                path::join(field_path, &path::index(i)),
                "unmatched ground-truth item",
            ));
        }
    }
    for j in 0..pred.len() {
        if !matched_pred.contains(&j) {
            node.non_matches.push(NonMatch::false_alarm(
                path::join(field_path, &path::index(j)),
                "unmatched prediction item",
            ));
        }
    }

    node
}

/// The result of comparing a ground-truth list of records against a predicted one.
pub struct RecordListOutcome {
    pub node: ComparisonNode,
    /// Extra-field FAs transitively found inside the *matched* pairs' prediction records
    /// (spec §4.4 step 3's "matched pairs of nested ListRec fields"); unmatched predictions
    /// are already counted at the object level in `node.overall`/`node.aggregate` and are not
    /// double-counted here.
    pub transitive_extra: u64,
}

/// Record-list comparison (spec §4.3b), the engine's hot path. Called only when both `gt`/
/// `pred` are non-empty (see [`compare_primitive_list`]'s note — the same short-circuit
/// applies here).
pub fn compare_record_list(
    ctx: &mut RecursionCtx,
    field_path: &str,
    descriptor: &FieldDescriptor,
    element_schema: &Schema,
    gt: &[Record],
    pred: &[Record],
) -> RecordListOutcome {
    let mt = element_schema.match_threshold;
    let n = gt.len();
    let m = pred.len();

    // The cost-matrix build: a full recursive record comparison per cell (spec §4.6 — "the
    // cost matrix build dominates list-comparison runtime"). Results are kept (not just the
    // similarity) so the per-field detail pass below can reuse them without recomputing
    // (spec §4.6's memoisation suggestion).
    let pair_results: Vec<Vec<RecordOutcome>> = build_pair_results(ctx, field_path, element_schema, gt, pred);

    let similarity: Vec<Vec<f64>> = pair_results
        .iter()
        .map(|row| row.iter().map(|r| r.raw_similarity).collect())
        .collect();
    let assignments = hungarian::solve(&similarity);
    let k = assignments.len();

    let tp = assignments.iter().filter(|a| a.similarity >= mt).count() as u64;
    let fd = k as u64 - tp;
    let fn_ = (n - k) as u64;
    let fa = (m - k) as u64;
    let list_overall = Counts {
        tp,
        fa,
        fd,
        tn: 0,
        fn_,
    };

    let denom = n.max(m) as f64;
    let raw_similarity = if denom > 0.0 {
        assignments.iter().map(|a| a.similarity).sum::<f64>() / denom
    } else {
        0.0
    };

    let matched_gt: HashSet<usize> = assignments.iter().map(|a| a.i).collect();
    let matched_pred: HashSet<usize> = assignments.iter().map(|a| a.j).collect();

    // Aggregate: every matched pair's full recursive aggregate, unconditionally (spec §4.3b
    // — aggregate never gates on match-goodness, only the per-field `overall` breakdown
    // below does), plus unmatched items' per-primitive-leaf FN/TN/FA (spec §4.7).
    let mut aggregate = Counts::ZERO;
    for &Assignment { i, j, .. } in &assignments {
        aggregate = aggregate.merge(pair_results[i][j].node.aggregate);
    }
    for i in 0..n {
        if !matched_gt.contains(&i) {
            aggregate = aggregate.merge(record_leaf_counts(element_schema, &gt[i], true));
        }
    }
    for j in 0..m {
        if !matched_pred.contains(&j) {
            aggregate = aggregate.merge(record_leaf_counts(element_schema, &pred[j], false));
        }
    }

    // Per-field detail (spec §4.3b's "threshold-gated recursion"): for each child field of
    // the element schema, merge counts across every matched pair and every unmatched item.
    // A "good" match (s >= mt) updates both overall and aggregate for that field; a matched
    // pair below mt, and every unmatched item, updates aggregate only.
    let mut field_overall: Vec<Counts> = vec![Counts::ZERO; element_schema.fields.len()];
    let mut field_aggregate: Vec<Counts> = vec![Counts::ZERO; element_schema.fields.len()];
    for &Assignment { i, j, similarity: s } in &assignments {
        let good = s >= mt;
        for (idx, name) in element_schema.fields.keys().enumerate() {
            if let Some(child) = pair_results[i][j].node.children.get(name) {
                field_aggregate[idx] = field_aggregate[idx].merge(child.aggregate);
                if good {
                    field_overall[idx] = field_overall[idx].merge(child.overall);
                }
            }
        }
    }
    for i in 0..n {
        if matched_gt.contains(&i) {
            continue;
        }
        for (idx, (_name, d)) in element_schema.fields.iter().enumerate() {
            let v = gt[i].get(_name).unwrap_or(&crate::value::Value::Null);
            field_aggregate[idx] = field_aggregate[idx].merge(leaf_counts_one_sided(&d.kind, v, true));
        }
    }
    for j in 0..m {
        if matched_pred.contains(&j) {
            continue;
        }
        for (idx, (_name, d)) in element_schema.fields.iter().enumerate() {
            let v = pred[j].get(_name).unwrap_or(&crate::value::Value::Null);
            field_aggregate[idx] = field_aggregate[idx].merge(leaf_counts_one_sided(&d.kind, v, false));
        }
    }

    let mut children: OrderMap<String, ComparisonNode> = OrderMap::new();
    for (idx, (name, d)) in element_schema.fields.iter().enumerate() {
        children.insert(
            name.clone(),
            ComparisonNode::leaf(0.0, 0.0, d.weight, field_overall[idx]).with_aggregate(field_aggregate[idx]),
        );
    }

    // Elements: one node per gt index in ascending order (matched pair or unmatched-gt leaf),
    // then one per remaining unmatched prediction index (spec §4.3b, §4.6 — "ascending-i
    // order").
    let pair_by_gt: std::collections::HashMap<usize, (usize, f64)> = assignments
        .iter()
        .map(|a| (a.i, (a.j, a.similarity)))
        .collect();
    let mut elements = Vec::with_capacity(n + (m.saturating_sub(k)));
    let mut non_matches = Vec::new();
    let placeholder_path = path::join(field_path, PLACEHOLDER_INDEX);
    for i in 0..n {
        if let Some(&(j, s)) = pair_by_gt.get(&i) {
            let mut elem = pair_results[i][j].node.clone();
            restamp_paths(&mut elem, &placeholder_path, &path::join(field_path, &path::index(i)));
            let good = s >= mt;
            elem.overall = if good { Counts::tp(1) } else { Counts::fd(1) };
            elements.push(elem);
            if !good {
                non_matches.push(NonMatch::false_discovery(
                    path::join(field_path, &path::index(i)),
                    None,
                    None,
                    s,
                    mt,
                    "list item similarity below match_threshold",
                ));
            }
        } else {
            elements.push(ComparisonNode::leaf(0.0, 0.0, 1.0, Counts::fn_(1)));
            non_matches.push(NonMatch::false_negative(
                path::join(field_path, &path::index(i)),
                "unmatched ground-truth record",
            ));
        }
    }
    for j in 0..m {
        if !matched_pred.contains(&j) {
            elements.push(ComparisonNode::leaf(0.0, 0.0, 1.0, Counts::fa(1)));
            non_matches.push(NonMatch::false_alarm(
                path::join(field_path, &path::index(j)),
                "unmatched prediction record",
            ));
        }
    }

    let transitive_extra: u64 = assignments
        .iter()
        .map(|a| pair_results[a.i][a.j].transitive_extra)
        .sum();

    let mut node = ComparisonNode::with_children(
        raw_similarity,
        raw_similarity, // never clips under threshold (spec §4.3b)
        descriptor.weight,
        list_overall,
        aggregate,
        children,
    );
    node.elements = elements;
    node.non_matches = non_matches;

    RecordListOutcome {
        node,
        transitive_extra,
    }
}

/// Builds the n×m cost-matrix cells (spec §4.6, §5's "one site" parallelism carve-out).
///
/// Sequential by default: `ctx`'s depth counter is mutated in and out of every call, which
/// only makes sense for one borrow at a time.
#[cfg(not(feature = "parallel"))]
fn build_pair_results(
    ctx: &mut RecursionCtx,
    field_path: &str,
    element_schema: &Schema,
    gt: &[Record],
    pred: &[Record],
) -> Vec<Vec<RecordOutcome>> {
    gt.iter()
        .map(|g| {
            pred.iter()
                .map(|p| {
                    let elem_path = path::join(field_path, PLACEHOLDER_INDEX);
                    record::compare(ctx, &elem_path, element_schema, g, p, None)
                })
                .collect()
        })
        .collect()
}

/// Parallel cost-matrix build behind the `parallel` feature (spec §5): each cell is an
/// independent, pure recursive comparison, so rows are farmed out across `rayon`'s pool.
/// Every row gets its own [`RecursionCtx`] seeded at the caller's current depth, since the
/// depth counter can't be shared mutable state across threads.
#[cfg(feature = "parallel")]
fn build_pair_results(
    ctx: &mut RecursionCtx,
    field_path: &str,
    element_schema: &Schema,
    gt: &[Record],
    pred: &[Record],
) -> Vec<Vec<RecordOutcome>> {
    use rayon::prelude::*;

    let base_depth = ctx.depth;
    gt.par_iter()
        .map(|g| {
            pred.iter()
                .map(|p| {
                    let mut local_ctx = RecursionCtx { depth: base_depth };
                    let elem_path = path::join(field_path, PLACEHOLDER_INDEX);
                    record::compare(&mut local_ctx, &elem_path, element_schema, g, p, None)
                })
                .collect()
        })
        .collect()
}

fn record_leaf_counts(schema: &Schema, record: &Record, is_gt_side: bool) -> Counts {
    let mut total = Counts::ZERO;
    for (name, descriptor) in &schema.fields {
        let v = record.get(name).unwrap_or(&crate::value::Value::Null);
        total = total.merge(leaf_counts_one_sided(&descriptor.kind, v, is_gt_side));
    }
    if !is_gt_side {
        total = total.merge(Counts::fa(record.extra_fields.len() as u64));
    }
    total
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{comparator::Exact, scalar::PrimType, value::Value};

    fn item_schema() -> Schema {
        Schema::with_match_threshold(
            [
                (
                    "id",
                    FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)).with_threshold(1.0),
                ),
                (
                    "qty",
                    FieldDescriptor::primitive(PrimType::Int, Arc::new(Exact)).with_threshold(1.0),
                ),
            ],
            0.7,
        )
        .unwrap()
    }

    fn rec(id: &str, qty: i64) -> Record {
        Record::new()
            .insert("id", Value::Prim(Scalar::String(id.into())))
            .insert("qty", Value::Prim(Scalar::Int(qty)))
    }

    #[test]
    fn hungarian_reorder_scenario_c() {
        let schema = item_schema();
        let gt = vec![rec("A", 1), rec("B", 2)];
        let pred = vec![rec("B", 2), rec("A", 1)];
        let d = FieldDescriptor::list_rec(Schema::new(Vec::<(String, FieldDescriptor)>::new()).unwrap());
        let mut ctx = RecursionCtx::new();
        let outcome = compare_record_list(&mut ctx, "items", &d, &schema, &gt, &pred);
        assert_eq!(outcome.node.overall, Counts::tp(2));
        assert_eq!(outcome.node.aggregate, Counts::tp(4));
        assert_eq!(outcome.node.raw_similarity, 1.0);
    }

    #[test]
    fn below_match_threshold_scenario_d() {
        let schema = item_schema();
        let gt = vec![rec("A", 1)];
        let pred = vec![rec("A", 9)];
        let d = FieldDescriptor::list_rec(Schema::new(Vec::<(String, FieldDescriptor)>::new()).unwrap());
        let mut ctx = RecursionCtx::new();
        let outcome = compare_record_list(&mut ctx, "items", &d, &schema, &gt, &pred);
        assert_eq!(outcome.node.overall, Counts::fd(1));
        assert_eq!(outcome.node.raw_similarity, 0.5);
    }

    #[test]
    fn matched_pair_non_match_path_uses_real_index_not_placeholder() {
        // A good match overall (qty is the only field off) — the pair's internal `qty`
        // false-discovery must be reported at "items[0].qty", never at the cost-matrix
        // build's nominal "items[*].qty".
        let schema = item_schema();
        let gt = vec![rec("A", 1)];
        let pred = vec![rec("A", 2)];
        let d = FieldDescriptor::list_rec(Schema::new(Vec::<(String, FieldDescriptor)>::new()).unwrap());
        let mut ctx = RecursionCtx::new();
        let outcome = compare_record_list(&mut ctx, "items", &d, &schema, &gt, &pred);

        let elem = &outcome.node.elements[0];
        let qty = elem.children.get("qty").expect("qty child present");
        assert_eq!(qty.non_matches.len(), 1);
        assert_eq!(qty.non_matches[0].field_path, "items[0].qty");
        assert!(!qty.non_matches[0].field_path.contains('*'));
    }
}
