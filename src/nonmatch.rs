//! [`NonMatch`] records and the [`NonMatchCollector`] walk (spec §4.9): a flat, debugging-only
//! list of field-level non-matches with dotted/bracketed paths (spec §4.10, [`crate::path`]).
//!
//! Individual non-matches are produced where they originate — by the dispatcher (§4.2) for
//! null-state FA/FN, by [`crate::primitive`] for FD, by [`crate::list`] for unmatched list
//! items — and attached to the node they originate at (spec §9 design note). When the caller
//! requests `document_non_matches`, [`collect`] walks the finished tree and concatenates them
//! into one flat, deterministically ordered list; it does not influence scoring.

use serde::{Deserialize, Serialize};

use crate::{node::ComparisonNode, scalar::Scalar};

/// Which confusion-matrix bucket a non-match falls into (spec §4.9). `TrueNegative`/
/// `TruePositive` are matches, not non-matches, so they never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonMatchKind {
    /// Prediction present with no ground-truth counterpart.
    FalseAlarm,
    /// Ground truth and prediction both present but did not match well enough.
    FalseDiscovery,
    /// Ground truth present, prediction effectively null (an omission).
    FalseNegative,
}

/// One field-level non-match, for debugging (spec §4.9). Does not influence scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonMatch {
    /// Dotted/bracketed path to the field, e.g. `"items[1].qty"` (spec §4.10).
    pub field_path: String,
    pub kind: NonMatchKind,
    /// The ground-truth scalar, when the non-match is about a single primitive value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<Scalar>,
    /// The predicted scalar, when the non-match is about a single primitive value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub reason: String,
}

impl NonMatch {
    pub fn false_alarm(field_path: impl Into<String>, reason: impl Into<String>) -> Self {
        NonMatch {
            field_path: field_path.into(),
            kind: NonMatchKind::FalseAlarm,
            ground_truth: None,
            predicted: None,
            similarity: None,
            threshold: None,
            reason: reason.into(),
        }
    }

    pub fn false_negative(field_path: impl Into<String>, reason: impl Into<String>) -> Self {
        NonMatch {
            field_path: field_path.into(),
            kind: NonMatchKind::FalseNegative,
            ground_truth: None,
            predicted: None,
            similarity: None,
            threshold: None,
            reason: reason.into(),
        }
    }

    pub fn false_discovery(
        field_path: impl Into<String>,
        ground_truth: Option<Scalar>,
        predicted: Option<Scalar>,
        similarity: f64,
        threshold: f64,
        reason: impl Into<String>,
    ) -> Self {
        NonMatch {
            field_path: field_path.into(),
            kind: NonMatchKind::FalseDiscovery,
            ground_truth,
            predicted,
            similarity: Some(similarity),
            threshold: Some(threshold),
            reason: reason.into(),
        }
    }
}

/// Walks the finished tree depth-first (children before elements before the node's own
/// non-matches, a stable order so repeated calls on structurally-equal trees agree — spec
/// §8's determinism property) and concatenates every [`NonMatch`] into one flat list.
pub fn collect(node: &ComparisonNode) -> Vec<NonMatch> {
    let mut out = Vec::new();
    collect_into(node, &mut out);
    out
}

fn collect_into(node: &ComparisonNode, out: &mut Vec<NonMatch>) {
    for child in node.children.values() {
        collect_into(child, out);
    }
    for element in &node.elements {
        collect_into(element, out);
    }
    out.extend(node.non_matches.iter().cloned());
}

#[cfg(test)]
mod tests {
    use ordermap::OrderMap;

    use super::*;
    use crate::metrics::Counts;

    #[test]
    fn collect_concatenates_depth_first() {
        let mut root = ComparisonNode::leaf(1.0, 1.0, 1.0, Counts::ZERO);
        let mut child = ComparisonNode::leaf(0.0, 0.0, 1.0, Counts::fa(1));
        child
            .non_matches
            .push(NonMatch::false_alarm("a.b", "prediction present"));
        let mut children = OrderMap::new();
        children.insert("b".to_owned(), child);
        root.children = children;
        root.non_matches.push(NonMatch::false_alarm("a", "outer"));

        let collected = collect(&root);
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].field_path, "a.b");
        assert_eq!(collected[1].field_path, "a");
    }
}
