//! [`ComparisonEngine`] (spec §4.4/§4.8): the top-level `compare` entry point, wiring the
//! record recursion, the derived-metrics pass, and non-match collection together, plus the
//! recursion-depth guard ([`RecursionCtx`]) shared by [`crate::record`]/[`crate::list`].

use serde::{Deserialize, Serialize};

use crate::{derived, nonmatch, record, schema::Schema, value::Record, ComparisonNode, NonMatch};

/// Guards against runaway recursion on a cyclic or pathologically deep schema (spec §4.11):
/// a schema is a static tree, so a well-formed one can never exceed a shallow bound in
/// practice, but nothing stops a caller from building one that does.
pub struct RecursionCtx {
    pub depth: usize,
}

/// Deepest nesting level the engine will recurse into before treating a field as a kind
/// mismatch instead (spec §4.11). Chosen generously above any realistic document depth.
pub const MAX_DEPTH: usize = 32;

impl RecursionCtx {
    pub fn new() -> Self {
        RecursionCtx { depth: 0 }
    }

    pub fn depth_exceeded(&self) -> bool {
        self.depth >= MAX_DEPTH
    }
}

impl Default for RecursionCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Knobs for one [`compare`] call (spec §4, §4.8/§4.9's "optional" framing of the heavier
/// outputs).
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions {
    /// Include the full [`ComparisonNode`] tree in the result. Cheap to always request in
    /// practice (it's built regardless, spec §9's design note), but callers that only need
    /// the top-level score can skip copying/serializing it out.
    pub include_confusion_matrix: bool,
    /// Walk the finished tree and flatten every [`NonMatch`] into
    /// [`CompareResult::non_matches`] (spec §4.9).
    pub document_non_matches: bool,
    /// Use `tp / (tp + fn_ + fd)` instead of the traditional `tp / (tp + fn_)` for every
    /// node's derived recall (spec §4.9's alternate formula, `SPEC_FULL.md`'s resolution:
    /// exposed as a caller-chosen mode rather than always-on, since the two formulas answer
    /// different questions — "of what existed, what did we find" vs. "of what we confidently
    /// reported, what was actually right").
    pub recall_with_fd: bool,
    /// Fill `overall_derived`/`aggregate_derived` on every node (spec §4.8). Defaults to
    /// `true` in [`CompareOptions::default`] — the derived pass is cheap relative to the
    /// comparison itself.
    pub add_derived_metrics: bool,
    /// Re-package the result for batch aggregators (spec §6). The batch/evaluator
    /// repackaging format is an explicit non-goal (spec §1); this flag is accepted for API
    /// compatibility with the described interface and is a documented no-op — [`compare`]
    /// never reads it.
    pub evaluator_format: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            include_confusion_matrix: true,
            document_non_matches: true,
            recall_with_fd: false,
            add_derived_metrics: true,
            evaluator_format: false,
        }
    }
}

/// The outcome of comparing one ground-truth/prediction document pair against a [`Schema`]
/// (spec §4, top level).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResult {
    /// The document's weighted similarity, `[0, 1]` (spec §4.4 step 4, computed at the root).
    pub overall_score: f64,
    /// Every declared top-level field's raw similarity met its own threshold (spec §4.4
    /// step 5).
    pub all_fields_matched: bool,
    /// `overall_score` broken down per top-level field name, for callers that want a flat
    /// summary without walking `confusion_matrix` (spec §9's "score percolation").
    pub field_scores: Vec<(String, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confusion_matrix: Option<ComparisonNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_matches: Option<Vec<NonMatch>>,
}

/// Compares `gt` against `pred` under `schema` (spec §4 end to end): the document root is
/// always treated as a standalone record (`object_context: None`, spec §4.5), so its `overall`
/// is the full elementwise sum of its children rather than a single TP/FD classification.
pub fn compare(schema: &Schema, gt: &Record, pred: &Record, options: CompareOptions) -> CompareResult {
    let mut ctx = RecursionCtx::new();
    let outcome = record::compare(&mut ctx, "", schema, gt, pred, None);
    let mut node = outcome.node;

    if options.add_derived_metrics {
        let recall_with_fd = options.recall_with_fd;
        node.visit_mut_post_order(&mut |n: &mut ComparisonNode| {
            n.overall_derived = Some(derived::derive(&n.overall, recall_with_fd));
            n.aggregate_derived = Some(derived::derive(&n.aggregate, recall_with_fd));
        });
    }

    let field_scores: Vec<(String, f64)> = node
        .children
        .iter()
        .map(|(name, child)| (name.clone(), child.similarity))
        .collect();

    let non_matches = options.document_non_matches.then(|| nonmatch::collect(&node));
    let confusion_matrix = options.include_confusion_matrix.then_some(node);

    CompareResult {
        overall_score: outcome.raw_similarity,
        all_fields_matched: outcome.all_fields_matched,
        field_scores,
        confusion_matrix,
        non_matches,
    }
}
