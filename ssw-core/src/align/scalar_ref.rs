//! Full-matrix local alignment used as the reference for the striped kernel.
//! DP uses i for reference (rows) and j for query (columns).

use super::types::GapModel;

/// Best local score and where it ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ScalarHit {
    pub score: i32,
    pub query_end: Option<usize>,
    pub ref_end: Option<usize>,
}

/// Affine-gap Smith-Waterman over the whole matrix in `i32`. `scores` is the
/// row-major `alphabet_size` x `alphabet_size` matrix indexed
/// `[reference * alphabet_size + query]`.
///
/// Ties keep the earliest reference position, then the earliest query
/// position, matching the striped scan.
pub fn align_local_scalar(
    query: &[u8],
    reference: &[u8],
    scores: &[i8],
    alphabet_size: usize,
    gaps: GapModel,
) -> ScalarHit {
    let mut best = ScalarHit::default();
    fill(query, reference, scores, alphabet_size, gaps, |i, j, h| {
        if h > best.score {
            best = ScalarHit {
                score: h,
                query_end: Some(j),
                ref_end: Some(i),
            };
        }
    });
    best
}

/// Highest cell of each reference column, one entry per reference position.
pub fn column_maxima(
    query: &[u8],
    reference: &[u8],
    scores: &[i8],
    alphabet_size: usize,
    gaps: GapModel,
) -> Vec<i32> {
    let mut maxima = vec![0i32; reference.len()];
    fill(query, reference, scores, alphabet_size, gaps, |i, _, h| {
        maxima[i] = maxima[i].max(h);
    });
    maxima
}

/// Runs the recurrence, handing every cell to `visit` as
/// `(reference index, query index, H)` in reference-major order.
fn fill(
    query: &[u8],
    reference: &[u8],
    scores: &[i8],
    alphabet_size: usize,
    gaps: GapModel,
    mut visit: impl FnMut(usize, usize, i32),
) {
    let m = query.len();
    let neg_inf = i32::MIN / 4;
    let gap_open = gaps.open() as i32;
    let gap_extend = gaps.extend() as i32;

    let mut h_row = vec![0i32; m + 1];
    let mut e_row = vec![neg_inf; m + 1];

    for (i, &r) in reference.iter().enumerate() {
        let row = &scores[r as usize * alphabet_size..(r as usize + 1) * alphabet_size];
        let mut h_diag = 0i32;
        let mut f = neg_inf;
        for j in 1..=m {
            let h_up = h_row[j];
            e_row[j] = (e_row[j] - gap_extend).max(h_up - gap_open);
            f = (f - gap_extend).max(h_row[j - 1] - gap_open);
            let h = (h_diag + row[query[j - 1] as usize] as i32)
                .max(e_row[j])
                .max(f)
                .max(0);
            h_row[j] = h;
            h_diag = h_up;
            visit(i, j - 1, h);
        }
    }
}
