//! Record comparison (spec §4.4) and the root-vs-nested `overall` split (spec §4.5): the
//! engine's `ComparisonEngine` driving a ground-truth record recursively against a schema.

use ordermap::OrderMap;

use crate::{
    dispatcher,
    engine::RecursionCtx,
    metrics::Counts,
    node::ComparisonNode,
    nonmatch::NonMatch,
    schema::{FieldDescriptor, FieldKind, Schema},
    value::Record,
};

/// The outcome of comparing one ground-truth/prediction record pair against a [`Schema`].
pub struct RecordOutcome {
    /// The finished node. When built with `object_context: None` (the record is the document
    /// root), `node.overall` is the elementwise sum of the children's `overall` plus this
    /// level's own extra-field FAs (spec §4.5). When built with `object_context: Some(_)`
    /// (the record is a nested field value), `node.overall` is instead the single TP/FD
    /// object-level classification plus the transitive extra-field FAs (spec §4.4 step 6,
    /// §4.5) — callers that need the *sum* view regardless of context should use
    /// [`RecordOutcome::sum_overall`].
    pub node: ComparisonNode,
    /// `total_score / total_weight` from spec §4.4 step 4 — the record's weighted similarity,
    /// independent of whatever classification ends up in `node.overall`.
    pub raw_similarity: f64,
    /// Spec §4.4 step 5: every declared field's raw similarity met its own threshold.
    pub all_fields_matched: bool,
    /// The elementwise sum of this record's children's `overall` plus its own extra-field
    /// FAs — always computed, regardless of `object_context` (spec §4.5's "standalone root"
    /// formula). Exposed separately because [`RecordOutcome::node`]`.overall` may have been
    /// overridden to the object classification instead.
    pub sum_overall: Counts,
    /// Extra (hallucinated) prediction fields anywhere in this record's subtree: this
    /// level's own count plus the transitive count from every nested `Record`/`ListRec`
    /// field that was actually compared (spec §4.4 step 3, `SPEC_FULL.md` §4's resolution).
    /// An enclosing record adds this into its own rollup when treating this record as a
    /// nested field value.
    pub transitive_extra: u64,
}

/// Compares `gt` against `pred` under `schema` (spec §4.4).
///
/// `object_context`, when `Some`, is the parent field's descriptor — used only to classify
/// this record as a single TP/FD object for the parent's ledger (spec §4.4 step 6) and to
/// apply the parent field's `clip_under_threshold` policy to the returned node's `similarity`.
/// `None` means this record is being compared as the document root, in which case the node's
/// `overall` is the full elementwise sum (spec §4.5) and there is no clipping.
pub fn compare(
    ctx: &mut RecursionCtx,
    path: &str,
    schema: &Schema,
    gt: &Record,
    pred: &Record,
    object_context: Option<&FieldDescriptor>,
) -> RecordOutcome {
    if ctx.depth_exceeded() {
        tracing::warn!(path, "recursion depth guard tripped; treating as kind mismatch");
        let node = dispatcher::kind_mismatch_node(
            path,
            object_context.map(|d| d.weight).unwrap_or(1.0),
            "maximum recursion depth exceeded",
        );
        return RecordOutcome {
            node: node.clone(),
            raw_similarity: 0.0,
            all_fields_matched: false,
            sum_overall: node.overall,
            transitive_extra: 0,
        };
    }
    ctx.depth += 1;

    let mut children: OrderMap<String, ComparisonNode> = OrderMap::new();
    let mut sum_overall = Counts::ZERO;
    let mut aggregate = Counts::ZERO;
    let mut total_score = 0.0_f64;
    let mut total_weight = 0.0_f64;
    let mut matched_count = 0usize;
    let mut transitive_extra = 0u64;

    for (name, descriptor) in &schema.fields {
        let child_path = crate::path::join(path, name);
        let gt_child = gt.get(name).unwrap_or(&crate::value::Value::Null);
        let pred_child = pred.get(name).unwrap_or(&crate::value::Value::Null);

        let dispatched = dispatcher::dispatch(ctx, &child_path, descriptor, gt_child, pred_child);

        sum_overall = sum_overall.merge(dispatched.node.overall);
        aggregate = aggregate.merge(dispatched.node.aggregate);
        total_score += dispatched.node.similarity * descriptor.weight;
        total_weight += descriptor.weight;
        if dispatched.node.raw_similarity >= dispatched.threshold_for_match {
            matched_count += 1;
        }
        transitive_extra += dispatched.transitive_extra;

        // A `ListRec` field's own `node.overall` (the list's object-level TN/FA/FD/FN counts,
        // spec §4.3b) never carries the extra-field FAs hallucinated inside its *matched*
        // pairs (spec §4.4 step 3) — those only live in `dispatched.transitive_extra`. A
        // nested `Record` field's `node.overall` already embeds its own transitive extras
        // (the `object_context` branch below merges them in), so only `ListRec` needs this
        // on top of the per-field `sum_overall` merge above, or a matched-list-pair
        // hallucination would silently contribute zero FAs to the enclosing record's overall.
        if matches!(descriptor.kind, FieldKind::ListRec(_)) {
            sum_overall = sum_overall.merge(Counts::fa(dispatched.transitive_extra));
        }

        children.insert(name.clone(), dispatched.node);
    }

    let own_extra = pred.extra_fields.len() as u64;
    sum_overall = sum_overall.merge(Counts::fa(own_extra));
    aggregate = aggregate.merge(Counts::fa(own_extra));
    transitive_extra += own_extra;

    let raw_similarity = if total_weight > 0.0 {
        total_score / total_weight
    } else {
        0.0
    };
    let all_fields_matched = matched_count == schema.fields.len();

    let mut node = ComparisonNode::with_children(
        raw_similarity,
        raw_similarity,
        1.0,
        sum_overall,
        aggregate,
        children,
    );

    if let Some(parent) = object_context {
        let threshold = parent.effective_threshold();
        let is_tp = raw_similarity >= threshold;
        let object_overall = if is_tp { Counts::tp(1) } else { Counts::fd(1) }
            .merge(Counts::fa(transitive_extra));
        let applied = if is_tp || !parent.clip_under_threshold {
            raw_similarity
        } else {
            0.0
        };
        node.overall = object_overall;
        node.similarity = applied;
        node.weight = parent.weight;
        if !is_tp {
            node.non_matches.push(NonMatch::false_discovery(
                path,
                None,
                None,
                raw_similarity,
                threshold,
                "nested record similarity below threshold",
            ));
        }
    }

    ctx.depth -= 1;

    RecordOutcome {
        node,
        raw_similarity,
        all_fields_matched,
        sum_overall,
        transitive_extra,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{comparator::Exact, scalar::PrimType, scalar::Scalar, value::Value};

    fn flat_schema() -> Schema {
        Schema::new([
            (
                "name",
                FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)).with_threshold(1.0),
            ),
            (
                "age",
                FieldDescriptor::primitive(PrimType::Int, Arc::new(Exact)).with_threshold(1.0),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn perfect_match_root_scenario_a() {
        let schema = flat_schema();
        let rec = Record::new()
            .insert("name", Value::Prim(Scalar::String("Alice".into())))
            .insert("age", Value::Prim(Scalar::Int(30)));
        let mut ctx = RecursionCtx::new();
        let outcome = compare(&mut ctx, "", &schema, &rec, &rec, None);
        assert_eq!(outcome.raw_similarity, 1.0);
        assert!(outcome.all_fields_matched);
        assert_eq!(outcome.node.overall, Counts::tp(2));
        assert_eq!(outcome.node.overall, outcome.node.aggregate);
    }

    #[test]
    fn matched_list_pair_extra_field_counts_at_root_overall() {
        let item_schema = Schema::new([(
            "id",
            FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)).with_threshold(1.0),
        )])
        .unwrap();
        let schema = Schema::new([("items", FieldDescriptor::list_rec(item_schema))]).unwrap();

        let gt_item = Record::new().insert("id", Value::Prim(Scalar::String("A".into())));
        let pred_item = Record::new()
            .insert("id", Value::Prim(Scalar::String("A".into())))
            .with_extra_fields(["ssn".to_owned()]);

        let gt = Record::new().insert("items", Value::ListRec(vec![gt_item]));
        let pred = Record::new().insert("items", Value::ListRec(vec![pred_item]));

        let mut ctx = RecursionCtx::new();
        let outcome = compare(&mut ctx, "", &schema, &gt, &pred, None);
        // The matched pair is a perfect TP, but its prediction hallucinated "ssn" — that FA
        // must reach the document root's overall, not just its aggregate.
        assert_eq!(outcome.node.overall, Counts::tp(1).merge(Counts::fa(1)));
        assert_eq!(outcome.node.overall, outcome.node.aggregate);
    }

    #[test]
    fn extra_prediction_field_is_false_alarm_scenario_e() {
        let schema = Schema::new([(
            "name",
            FieldDescriptor::primitive(PrimType::String, Arc::new(Exact)).with_threshold(1.0),
        )])
        .unwrap();
        let gt = Record::new().insert("name", Value::Prim(Scalar::String("Alice".into())));
        let pred = Record::new()
            .insert("name", Value::Prim(Scalar::String("Alice".into())))
            .with_extra_fields(["ssn".to_owned()]);
        let mut ctx = RecursionCtx::new();
        let outcome = compare(&mut ctx, "", &schema, &gt, &pred, None);
        assert_eq!(outcome.node.overall, Counts::tp(1).merge(Counts::fa(1)));
    }
}
