//! Banded affine-gap traceback between known begin and end coordinates.
//! DP uses i for reference (rows) and j for query (columns).

use super::types::{Cigar, CigarOp, GapModel};
use crate::error::{SswError, SswResult};

// Bits 0-1: H direction
const DIR_DIAG: u8 = 0;
const DIR_DEL: u8 = 1; // E (vertical gap, consumes reference)
const DIR_INS: u8 = 2; // F (horizontal gap, consumes query)

// Bits 2-3: E/F extended from themselves rather than opened from H.
const E_EXTENDS: u8 = 1 << 2;
const F_EXTENDS: u8 = 1 << 3;

const NEG_INF: i32 = i32::MIN / 4;

/// Inclusive, 0-based coordinates of an alignment in both sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceBounds {
    pub query_begin: usize,
    pub query_end: usize,
    pub ref_begin: usize,
    pub ref_end: usize,
}

impl TraceBounds {
    fn check(&self, query_len: usize, ref_len: usize) -> SswResult<()> {
        if self.query_begin > self.query_end
            || self.ref_begin > self.ref_end
            || self.query_end >= query_len
            || self.ref_end >= ref_len
        {
            return Err(SswError::InvalidTraceBounds {
                query_begin: self.query_begin,
                query_end: self.query_end,
                ref_begin: self.ref_begin,
                ref_end: self.ref_end,
            });
        }
        Ok(())
    }
}

/// Reconstructs the operations of an alignment scoring `expected` that
/// consumes exactly the bounded query and reference ranges. `score(r, q)`
/// gives the substitution score of reference symbol `r` against query
/// symbol `q`.
///
/// The band starts at `|ref_span - query_span| + 1` diagonals either side and
/// doubles until the banded optimum reaches `expected` or the band covers the
/// whole rectangle.
pub fn trace<S>(
    query: &[u8],
    reference: &[u8],
    bounds: TraceBounds,
    gaps: GapModel,
    expected: i32,
    score: S,
) -> SswResult<Cigar>
where
    S: Fn(u8, u8) -> i32,
{
    bounds.check(query.len(), reference.len())?;
    let q = &query[bounds.query_begin..=bounds.query_end];
    let r = &reference[bounds.ref_begin..=bounds.ref_end];
    let widest = q.len().max(r.len());

    let mut band = q.len().abs_diff(r.len()) + 1;
    loop {
        let band_dp = BandedDp::fill(q, r, band, gaps, &score);
        let found = band_dp.final_score();
        if found == expected {
            return Ok(band_dp.traceback());
        }
        if band >= widest {
            return Err(SswError::ScoreMismatch {
                phase: "traceback",
                expected,
                found,
            });
        }
        band = (band * 2).min(widest);
        log::debug!("traceback band widened to {band} (score {found}, expected {expected})");
    }
}

struct BandedDp {
    rows: usize,
    cols: usize,
    band: usize,
    width: usize,
    dirs: Vec<u8>,
    final_score: i32,
}

impl BandedDp {
    /// Global affine DP over the rectangle, restricted to |i - j| <= band.
    /// Cell (i, j) of row i is stored at offset `j + band - i`.
    fn fill<S>(q: &[u8], r: &[u8], band: usize, gaps: GapModel, score: &S) -> Self
    where
        S: Fn(u8, u8) -> i32,
    {
        let rows = r.len();
        let cols = q.len();
        let width = 2 * band + 1;
        let gap_open = gaps.open() as i32;
        let gap_extend = gaps.extend() as i32;

        let mut dirs = vec![DIR_DIAG; (rows + 1) * width];
        let mut h_prev = vec![NEG_INF; width];
        let mut e_prev = vec![NEG_INF; width];
        let mut h_cur = vec![NEG_INF; width];
        let mut e_cur = vec![NEG_INF; width];

        // Row 0: leading insertions.
        for j in 0..=cols.min(band) {
            let k = j + band;
            h_prev[k] = -gaps.cost(j);
            if j > 0 {
                dirs[k] = DIR_INS | if j > 1 { F_EXTENDS } else { 0 };
            }
        }

        for i in 1..=rows {
            h_cur.fill(NEG_INF);
            e_cur.fill(NEG_INF);
            let lo = i.saturating_sub(band);
            let hi = (i + band).min(cols);
            let mut f = NEG_INF;
            let mut h_left = NEG_INF;

            for j in lo..=hi {
                let k = j + band - i;
                let row = i * width;
                if j == 0 {
                    // Column 0: leading deletions.
                    let h = -gaps.cost(i);
                    h_cur[k] = h;
                    e_cur[k] = h;
                    dirs[row + k] = DIR_DEL | if i > 1 { E_EXTENDS } else { 0 };
                    h_left = h;
                    continue;
                }

                let (h_up, e_up) = if k + 1 < width {
                    (h_prev[k + 1], e_prev[k + 1])
                } else {
                    (NEG_INF, NEG_INF)
                };
                let e_open = h_up - gap_open;
                let e_ext = e_up - gap_extend;
                let e_from_ext = e_ext > e_open;
                let e = if e_from_ext { e_ext } else { e_open };

                let f_open = h_left - gap_open;
                let f_ext = f - gap_extend;
                let f_from_ext = f_ext > f_open;
                f = if f_from_ext { f_ext } else { f_open };

                let diag = h_prev[k] + score(r[i - 1], q[j - 1]);
                let mut h = diag;
                let mut d = DIR_DIAG;
                // Ties keep the diagonal, then the deletion.
                if e > h {
                    h = e;
                    d = DIR_DEL;
                }
                if f > h {
                    h = f;
                    d = DIR_INS;
                }
                if e_from_ext {
                    d |= E_EXTENDS;
                }
                if f_from_ext {
                    d |= F_EXTENDS;
                }
                dirs[row + k] = d;
                h_cur[k] = h.max(NEG_INF);
                e_cur[k] = e.max(NEG_INF);
                h_left = h_cur[k];
            }

            std::mem::swap(&mut h_prev, &mut h_cur);
            std::mem::swap(&mut e_prev, &mut e_cur);
        }

        let final_score = if rows.abs_diff(cols) <= band {
            h_prev[cols + band - rows]
        } else {
            NEG_INF
        };

        Self {
            rows,
            cols,
            band,
            width,
            dirs,
            final_score,
        }
    }

    fn final_score(&self) -> i32 {
        self.final_score
    }

    #[inline]
    fn dir(&self, i: usize, j: usize) -> u8 {
        self.dirs[i * self.width + j + self.band - i]
    }

    fn traceback(&self) -> Cigar {
        let mut i = self.rows;
        let mut j = self.cols;
        let mut rev_ops = Cigar::default();
        // State: 0 = in H matrix, 1 = in E matrix (Del), 2 = in F matrix (Ins)
        let mut state = 0u8;

        while i > 0 || j > 0 {
            if i == 0 {
                rev_ops.push(CigarOp::Ins, j);
                break;
            }
            if j == 0 {
                rev_ops.push(CigarOp::Del, i);
                break;
            }
            let d = self.dir(i, j);
            match state {
                0 => match d & 0b11 {
                    DIR_DEL => state = 1,
                    DIR_INS => state = 2,
                    _ => {
                        rev_ops.push(CigarOp::Match, 1);
                        i -= 1;
                        j -= 1;
                    }
                },
                1 => {
                    rev_ops.push(CigarOp::Del, 1);
                    i -= 1;
                    if d & E_EXTENDS == 0 {
                        state = 0;
                    }
                }
                _ => {
                    rev_ops.push(CigarOp::Ins, 1);
                    j -= 1;
                    if d & F_EXTENDS == 0 {
                        state = 0;
                    }
                }
            }
        }

        Cigar {
            ops: rev_ops.ops.into_iter().rev().collect(),
        }
    }
}
