//! [`DerivedCalculator`] (spec §4.8): precision/recall/F1/accuracy from a [`Counts`], with the
//! alternate recall formula spec §4.9 calls out as a caller-selectable mode.

use crate::metrics::{Counts, DerivedMetrics};

/// Derives precision/recall/F1/accuracy from `counts`.
///
/// When `recall_with_fd` is `false`, recall is the traditional `tp / (tp + fn_)` ("of what
/// existed in the ground truth, how much did we find"). When `true`, it's
/// `tp / (tp + fn_ + fd)` instead ("of what we reported with enough confidence to call a
/// match, how much was right") — [`Counts::derived`] only ever computes the traditional
/// formula, so this module recomputes recall (and the `f1` that depends on it) rather than
/// calling through to it.
pub fn derive(counts: &Counts, recall_with_fd: bool) -> DerivedMetrics {
    let base = counts.derived();
    if !recall_with_fd {
        return base;
    }

    let denom = counts.tp + counts.fn_ + counts.fd;
    let recall = if denom == 0 {
        0.0
    } else {
        counts.tp as f64 / denom as f64
    };
    let f1 = if base.precision + recall == 0.0 {
        0.0
    } else {
        2.0 * base.precision * recall / (base.precision + recall)
    };

    DerivedMetrics {
        precision: base.precision,
        recall,
        f1,
        accuracy: base.accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traditional_recall_ignores_fd() {
        let c = Counts {
            tp: 1,
            fn_: 1,
            fd: 1,
            ..Counts::ZERO
        };
        let d = derive(&c, false);
        assert_eq!(d.recall, 0.5);
    }

    #[test]
    fn recall_with_fd_counts_discoveries_against_recall() {
        let c = Counts {
            tp: 1,
            fn_: 1,
            fd: 1,
            ..Counts::ZERO
        };
        let d = derive(&c, true);
        assert!((d.recall - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn both_formulas_agree_when_there_are_no_false_discoveries() {
        let c = Counts::tp(3).merge(Counts::fn_(1));
        assert_eq!(derive(&c, false).recall, derive(&c, true).recall);
    }
}
