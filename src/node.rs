//! [`ComparisonNode`]: one node of the hierarchical comparison tree (spec §3), carrying both
//! metric views described in spec §4.5 side by side.

use ordermap::OrderMap;
use serde::{Deserialize, Serialize};

use crate::{
    metrics::{Counts, DerivedMetrics},
    nonmatch::NonMatch,
};

/// One node of the comparison tree — produced once per compared field, plus one root node
/// for the document as a whole.
///
/// Carries two distinct [`Counts`] views (spec §4.5), which intentionally disagree for
/// `Record`/`ListRec` nodes:
/// - `overall`: this node's own object-level classification — for a `Record` field nested
///   inside a parent, this is a single TP/FD/FN/TN/FA (plus any transitive extra-field FAs,
///   spec §4.4 step 3), never the sum of its descendants'. For a record compared as the
///   document root, this is the elementwise sum of its children's `overall` contributions
///   plus its own extra-field FAs (spec §4.5).
/// - `aggregate`: the sum of every primitive-leaf count in this node's entire subtree. For a
///   `Primitive`/`ListPrim` leaf, `overall` and `aggregate` are identical — the distinction
///   only matters once a node has children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonNode {
    /// Raw similarity in `[0, 1]` before `clip_under_threshold` is applied (spec §4.4).
    pub raw_similarity: f64,
    /// `raw_similarity`, or `0.0` if it fell below the field's threshold and
    /// `clip_under_threshold` is set (spec §4.1's `threshold_applied_score`).
    pub similarity: f64,
    /// The field's weight, carried on the node for score percolation (spec §9 design note
    /// "score percolation").
    pub weight: f64,
    /// This node's own object-level confusion-matrix classification (spec §4.5).
    pub overall: Counts,
    /// The sum of every primitive-leaf count in this node's subtree (spec §4.5).
    pub aggregate: Counts,
    /// Precision/recall/F1/accuracy derived from `overall`, filled by the derived pass
    /// (spec §4.8) when `add_derived_metrics` is requested. `None` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_derived: Option<DerivedMetrics>,
    /// Precision/recall/F1/accuracy derived from `aggregate` (spec §4.8).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_derived: Option<DerivedMetrics>,
    /// Present for `Record` nodes: one entry per compared field (or, for a `ListRec` node,
    /// the per-field detail aggregated across matched/unmatched elements — spec §4.3b).
    #[serde(default, skip_serializing_if = "OrderMap::is_empty")]
    pub children: OrderMap<String, ComparisonNode>,
    /// Present for `ListRec` nodes only: one node per matched pair / unmatched element, in
    /// the order the Hungarian matcher paired them (spec §4.3b, §4.6).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ComparisonNode>,
    /// Non-matches originating at this node, before any from descendants are folded in
    /// (spec §4.9/§9 design note "collect leaf non-matches during the recursion"). Populated
    /// only when `document_non_matches` is requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_matches: Vec<NonMatch>,
}

impl ComparisonNode {
    /// A leaf node built directly from a single classification — used for `Primitive`/
    /// `ListPrim` fields, where `overall` and `aggregate` always coincide.
    pub fn leaf(raw_similarity: f64, similarity: f64, weight: f64, counts: Counts) -> Self {
        ComparisonNode {
            raw_similarity,
            similarity,
            weight,
            overall: counts,
            aggregate: counts,
            overall_derived: None,
            aggregate_derived: None,
            children: OrderMap::new(),
            elements: Vec::new(),
            non_matches: Vec::new(),
        }
    }

    pub fn with_children(
        raw_similarity: f64,
        similarity: f64,
        weight: f64,
        overall: Counts,
        aggregate: Counts,
        children: OrderMap<String, ComparisonNode>,
    ) -> Self {
        ComparisonNode {
            raw_similarity,
            similarity,
            weight,
            overall,
            aggregate,
            overall_derived: None,
            aggregate_derived: None,
            children,
            elements: Vec::new(),
            non_matches: Vec::new(),
        }
    }

    /// Overrides `aggregate` after construction — used when a node's `overall` and
    /// `aggregate` are built from genuinely different inputs (spec §4.3b's per-field detail
    /// merge across matched/unmatched list elements).
    pub fn with_aggregate(mut self, aggregate: Counts) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_elements(
        raw_similarity: f64,
        similarity: f64,
        weight: f64,
        overall: Counts,
        aggregate: Counts,
        elements: Vec<ComparisonNode>,
    ) -> Self {
        ComparisonNode {
            raw_similarity,
            similarity,
            weight,
            overall,
            aggregate,
            overall_derived: None,
            aggregate_derived: None,
            children: OrderMap::new(),
            elements,
            non_matches: Vec::new(),
        }
    }

    /// Depth-first walk, children and elements first, invoking `f` on every descendant and
    /// finally on `self` — the shape the derived pass (spec §4.8) and the aggregate rollup
    /// helpers need (bottom-up, so a parent always sees already-updated children).
    pub fn visit_mut_post_order(&mut self, f: &mut impl FnMut(&mut ComparisonNode)) {
        for child in self.children.values_mut() {
            child.visit_mut_post_order(f);
        }
        for element in &mut self.elements {
            element.visit_mut_post_order(f);
        }
        f(self);
    }
}
