//! [`PrimitiveComparer`] (spec §4.1): scores a single non-null primitive pair of the same
//! [`PrimType`](crate::scalar::PrimType) against a [`FieldDescriptor`]'s comparator and
//! threshold. Never produces FA/FN — those are null-state outcomes the dispatcher (§4.2)
//! resolves before a pair ever reaches here.

use crate::{
    metrics::Counts, node::ComparisonNode, nonmatch::NonMatch, path::join, schema::FieldDescriptor,
    scalar::Scalar,
};

/// Compares two non-null primitives of the descriptor's declared type, producing a leaf node
/// plus, when it classified as a false discovery, a [`NonMatch`] attached to that node.
///
/// `field_path` is this field's already-joined path (spec §4.10), used only to stamp the
/// non-match entry, if any.
pub fn compare(field_path: &str, descriptor: &FieldDescriptor, gt: &Scalar, pred: &Scalar) -> ComparisonNode {
    let comparator = descriptor
        .comparator
        .as_ref()
        .expect("Primitive fields always carry a comparator (enforced at Schema::new)");

    let raw = comparator.compare(gt, pred);
    let threshold = descriptor.effective_threshold();
    let is_tp = raw >= threshold;

    let counts = if is_tp { Counts::tp(1) } else { Counts::fd(1) };
    let applied = if is_tp || !descriptor.clip_under_threshold {
        raw
    } else {
        0.0
    };

    let mut node = ComparisonNode::leaf(raw, applied, descriptor.weight, counts);
    if !is_tp {
        node.non_matches.push(NonMatch::false_discovery(
            field_path,
            Some(gt.clone()),
            Some(pred.clone()),
            raw,
            threshold,
            "similarity below threshold",
        ));
    }
    node
}

/// Field path helper re-exported for sibling modules that build a primitive node inline
/// (e.g. list-of-primitive element comparisons, which don't have a stable field name).
pub fn indexed_path(parent: &str, index: usize) -> String {
    join(parent, &crate::path::index(index))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{comparator::Exact, scalar::PrimType};

    #[test]
    fn exact_match_is_true_positive() {
        let d = FieldDescriptor::primitive(PrimType::Int, Arc::new(Exact));
        let node = compare("age", &d, &Scalar::Int(30), &Scalar::Int(30));
        assert_eq!(node.overall, Counts::tp(1));
        assert_eq!(node.similarity, 1.0);
        assert!(node.non_matches.is_empty());
    }

    #[test]
    fn mismatch_below_threshold_is_false_discovery() {
        let d = FieldDescriptor::primitive(PrimType::Int, Arc::new(Exact)).with_threshold(1.0);
        let node = compare("age", &d, &Scalar::Int(30), &Scalar::Int(31));
        assert_eq!(node.overall, Counts::fd(1));
        assert_eq!(node.similarity, 0.0);
        assert_eq!(node.non_matches.len(), 1);
    }

    #[test]
    fn clip_under_threshold_false_preserves_raw_similarity_in_score() {
        let d = FieldDescriptor::primitive(PrimType::String, Arc::new(crate::comparator::Levenshtein))
            .with_threshold(0.9)
            .with_clip_under_threshold(false);
        let node = compare(
            "name",
            &d,
            &Scalar::String("Alice".into()),
            &Scalar::String("Alicia".into()),
        );
        assert_eq!(node.overall, Counts::fd(1)); // still classified FD
        assert!(node.similarity > 0.0); // but the score is not clipped to 0
        assert_eq!(node.similarity, node.raw_similarity);
    }

    #[test]
    fn threshold_exactly_equal_to_similarity_counts_as_match() {
        let d = FieldDescriptor::primitive(PrimType::Int, Arc::new(crate::comparator::NumericTolerance {
            tolerance: 10.0,
        }))
        .with_threshold(0.5);
        // similarity = 1 - 5/10 = 0.5, exactly at threshold.
        let node = compare("x", &d, &Scalar::Int(0), &Scalar::Int(5));
        assert_eq!(node.overall, Counts::tp(1));
    }
}
