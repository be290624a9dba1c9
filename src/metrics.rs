//! The confusion-matrix vocabulary (spec §3/§4.1): TP/FA/FD/FP/TN/FN counts, their structural
//! invariant, and the derived precision/recall/F1/accuracy metrics (spec §4.9).

use serde::{Deserialize, Serialize};

/// Raw confusion-matrix counts for one node of the comparison tree.
///
/// `fp` is always exactly `fa + fd` (spec §3's invariant): a false positive is either an
/// outright fabrication (`fa`, no ground-truth counterpart at all) or a value present on
/// both sides that didn't match well enough (`fd`). [`Counts::fp`] is a method rather than a
/// stored field so the invariant can never be violated by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Counts {
    /// True positive: ground truth and prediction both present and matched.
    pub tp: u64,
    /// False alarm: prediction present with no ground-truth counterpart (hallucination).
    pub fa: u64,
    /// False detection: ground truth and prediction both present but did not match.
    pub fd: u64,
    /// True negative: both ground truth and prediction are effectively null.
    pub tn: u64,
    /// False negative: ground truth present, prediction effectively null (an omission).
    pub fn_: u64,
}

impl Counts {
    pub const ZERO: Counts = Counts {
        tp: 0,
        fa: 0,
        fd: 0,
        tn: 0,
        fn_: 0,
    };

    /// `fa + fd` — total false positives. Spec §3's `fp == fa + fd` invariant, expressed as a
    /// derived quantity rather than a field that could drift out of sync.
    pub fn fp(&self) -> u64 {
        self.fa + self.fd
    }

    pub fn total(&self) -> u64 {
        self.tp + self.fa + self.fd + self.tn + self.fn_
    }

    pub fn tp(n: u64) -> Counts {
        Counts {
            tp: n,
            ..Counts::ZERO
        }
    }
    pub fn fa(n: u64) -> Counts {
        Counts {
            fa: n,
            ..Counts::ZERO
        }
    }
    pub fn fd(n: u64) -> Counts {
        Counts {
            fd: n,
            ..Counts::ZERO
        }
    }
    pub fn tn(n: u64) -> Counts {
        Counts {
            tn: n,
            ..Counts::ZERO
        }
    }
    pub fn fn_(n: u64) -> Counts {
        Counts {
            fn_: n,
            ..Counts::ZERO
        }
    }

    /// Elementwise sum, the building block of every bottom-up rollup in the crate (spec
    /// §4.5's `aggregate` additivity, §4.4's parent-field accumulation).
    pub fn merge(mut self, other: Counts) -> Counts {
        self.tp += other.tp;
        self.fa += other.fa;
        self.fd += other.fd;
        self.tn += other.tn;
        self.fn_ += other.fn_;
        self
    }

    /// The derived precision/recall/F1/accuracy metrics for this count set (spec §4.9).
    pub fn derived(&self) -> DerivedMetrics {
        let fp = self.fp();
        let precision = safe_div(self.tp, self.tp + fp);
        let recall = safe_div(self.tp, self.tp + self.fn_);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        let accuracy = safe_div(self.tp + self.tn, self.total());
        DerivedMetrics {
            precision,
            recall,
            f1,
            accuracy,
        }
    }
}

impl std::iter::Sum for Counts {
    fn sum<I: Iterator<Item = Counts>>(iter: I) -> Self {
        iter.fold(Counts::ZERO, Counts::merge)
    }
}

/// `a / b` as `f64`, or `0.0` if `b` is zero (spec §4.9's "division by zero resolves to 0").
fn safe_div(a: u64, b: u64) -> f64 {
    if b == 0 {
        0.0
    } else {
        a as f64 / b as f64
    }
}

/// Precision/recall/F1/accuracy derived from a [`Counts`] (spec §4.9). Division-by-zero
/// resolves to `0.0` rather than `NaN` or a panic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}
