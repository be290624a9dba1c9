//! The [`HungarianMatcher`] (spec §4.6): maximum-weight bipartite matching on an n×m
//! similarity matrix, used by [`crate::list`] to pair list elements order-independently.
//!
//! Implements the textbook O(n³) shortest-augmenting-path assignment algorithm (the
//! "Jonker-Volgenant"-style potentials formulation from the standard references, the same
//! one most Rust assignment-problem crates implement) on `cost = 1 - similarity`. Rectangular
//! matrices are handled by padding to a square with a prohibitively expensive cost for any
//! real-to-dummy pairing, which forces the solver to maximise the number of real-to-real
//! matches (`min(n, m)` of them) before it ever falls back to a dummy pairing — exactly the
//! "returns `min(n,m)` matched pairs" contract in spec §4.6.

/// One matched pair from [`solve`]: `(ground_truth_index, prediction_index, similarity)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub i: usize,
    pub j: usize,
    pub similarity: f64,
}

/// Any pairing between a real row/column and a padding row/column costs at least this much —
/// comfortably above the maximum possible real cost (`1.0 + epsilon`), so the solver always
/// prefers a real-to-real match over leaving a real index paired with padding.
const DUMMY_COST: f64 = 1_000.0;

/// Solves the assignment problem on `similarity` (rows = ground truth, cols = prediction),
/// returning `min(n, m)` pairs that maximise the similarity sum.
///
/// Deterministic: ties are broken by a vanishingly small index-based perturbation
/// (`i * m + j`, scaled far below any real similarity gap) that nudges the solver toward the
/// lexicographically-smallest optimal assignment, approximating spec §4.6's "ascending row
/// then column" tie-break contract. Pairs are returned in ascending ground-truth-index order.
pub fn solve(similarity: &[Vec<f64>]) -> Vec<Assignment> {
    let n = similarity.len();
    let m = if n == 0 { 0 } else { similarity[0].len() };
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let size = n.max(m);
    // A perturbation small enough that it can never flip which *set* of cells is optimal
    // (the real similarity values are represented with plenty of headroom below 1.0), but
    // large enough to survive f64 rounding across a matrix of this size.
    let epsilon = 1e-9 / ((n * m) as f64 + 1.0);

    let mut cost = vec![vec![0.0_f64; size]; size];
    for i in 0..size {
        for j in 0..size {
            cost[i][j] = if i < n && j < m {
                (1.0 - similarity[i][j]) + epsilon * ((i * m + j) as f64)
            } else if i < n || j < m {
                DUMMY_COST
            } else {
                0.0
            };
        }
    }

    let row_for_col = if let Some(valid) = valid_assignment(&kuhn_munkres(&cost), size) {
        valid
    } else {
        // Numerical degeneracy (e.g. a non-finite cost produced by a misbehaving comparator)
        // left the potentials method without a clean permutation. Spec §7's "Hungarian
        // failure" clause requires a deterministic fallback here rather than a panic or a
        // silently wrong assignment.
        tracing::warn!(n, m, "hungarian solver degenerated, falling back to greedy matching");
        greedy_assignment(&cost, size)
    };

    let mut assignments: Vec<Assignment> = row_for_col
        .into_iter()
        .enumerate()
        .filter_map(|(j, i)| {
            if i < n && j < m {
                Some(Assignment {
                    i,
                    j,
                    similarity: similarity[i][j],
                })
            } else {
                None
            }
        })
        .collect();
    assignments.sort_by_key(|a| a.i);
    assignments
}

/// Checks that `row_for_col` is a genuine permutation of `0..size` (every row used exactly
/// once). The potentials method can't actually produce anything else on a well-formed finite
/// cost matrix, but a non-finite cost (`NaN`/`inf` from a misbehaving comparator) can corrupt
/// the delta/potential updates enough to break that guarantee — this is the cheap check that
/// decides whether [`solve`] needs the greedy fallback (spec §7).
fn valid_assignment(row_for_col: &[usize], size: usize) -> Option<Vec<usize>> {
    let mut seen = vec![false; size];
    for &i in row_for_col {
        if i >= size || seen[i] {
            return None;
        }
        seen[i] = true;
    }
    Some(row_for_col.to_vec())
}

/// Deterministic greedy fallback (spec §7): repeatedly picks the globally cheapest remaining
/// (row, column) cell and removes both, lowest-cost first with ties broken by ascending row
/// then column. Not optimal in general, but always produces a valid assignment.
fn greedy_assignment(cost: &[Vec<f64>], size: usize) -> Vec<usize> {
    let mut cells: Vec<(usize, usize)> = (0..size).flat_map(|i| (0..size).map(move |j| (i, j))).collect();
    cells.sort_by(|&(i1, j1), &(i2, j2)| {
        let c1 = cost[i1][j1];
        let c2 = cost[i2][j2];
        c1.partial_cmp(&c2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(i1.cmp(&i2))
            .then(j1.cmp(&j2))
    });

    let mut row_for_col = vec![usize::MAX; size];
    let mut row_used = vec![false; size];
    let mut col_used = vec![false; size];
    let mut remaining = size;
    for (i, j) in cells {
        if remaining == 0 {
            break;
        }
        if row_used[i] || col_used[j] {
            continue;
        }
        row_for_col[j] = i;
        row_used[i] = true;
        col_used[j] = true;
        remaining -= 1;
    }
    row_for_col
}

/// Square assignment problem, minimising total cost. Returns, for each column `j`, the row
/// assigned to it (`row_for_col[j]`). 1-indexed internally (the classic formulation's
/// potentials are defined relative to a sentinel index 0), 0-indexed at the boundary.
fn kuhn_munkres(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    const INF: f64 = f64::INFINITY;

    // u/v are the row/column potentials; p[j] is the row matched to column j (1-indexed,
    // 0 = unmatched sentinel); way[j] records the augmenting-path predecessor column.
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n {
                if !used[j] {
                    let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    // p[j] (1-indexed row, 1-indexed col) -> row_for_col (0-indexed row, 0-indexed col).
    let mut row_for_col = vec![usize::MAX; n];
    for j in 1..=n {
        row_for_col[j - 1] = p[j] - 1;
    }
    row_for_col
}
