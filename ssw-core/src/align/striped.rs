//! Striped affine-gap Smith-Waterman column scan shared by the forward and
//! reverse passes.

use super::profile::{StripeVector, StripedProfile};
use super::types::GapModel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Reverse,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScanBest {
    pub(crate) score: i32,
    pub(crate) ref_end: Option<usize>,
    pub(crate) query_end: Option<usize>,
    /// Column maxima in scan order, kept only when requested.
    pub(crate) column_max: Vec<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ScanOutcome {
    Complete(ScanBest),
    /// A cell reached the lane ceiling; the scores can no longer be trusted.
    Saturated,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ScanParams {
    pub(crate) gaps: GapModel,
    pub(crate) direction: Direction,
    /// Stop as soon as the best score reaches this value.
    pub(crate) stop_at: Option<i32>,
    pub(crate) keep_columns: bool,
}

/// Scans `reference` column by column against the striped query. The best
/// score is the first column (in scan order) reaching it, and within that
/// column the lowest query position.
pub(crate) fn scan<V: StripeVector>(
    profile: &StripedProfile<V>,
    reference: &[u8],
    params: ScanParams,
) -> ScanOutcome {
    let seg_len = profile.seg_len;
    let m = profile.query_len;
    let n = reference.len();

    let v_zero = V::splat(0);
    let v_floor = V::splat(V::FLOOR);
    let v_bias = V::splat(profile.bias);
    let v_gap_o = V::splat(params.gaps.open() as i32);
    let v_gap_e = V::splat(params.gaps.extend() as i32);
    let ceiling = V::CEILING - profile.bias;
    let caps = profile.padding.as_ref();

    let mut h_store = vec![v_zero; seg_len];
    let mut h_load = vec![v_zero; seg_len];
    let mut e = vec![v_floor; seg_len];

    let mut best = ScanBest {
        score: 0,
        ref_end: None,
        query_end: None,
        column_max: if params.keep_columns {
            Vec::with_capacity(n)
        } else {
            Vec::new()
        },
    };

    for step in 0..n {
        let col = match params.direction {
            Direction::Forward => step,
            Direction::Reverse => n - 1 - step,
        };
        let scores = profile.scores_for(reference[col]);

        let mut v_f = v_floor;
        let mut v_max = v_zero;
        let mut v_h = h_store[seg_len - 1].shift_lanes(0);
        std::mem::swap(&mut h_load, &mut h_store);

        for i in 0..seg_len {
            v_h = v_h.sat_add(scores[i]).sat_sub(v_bias).lane_max(v_zero);
            let v_e = e[i];
            v_h = v_h.lane_max(v_e).lane_max(v_f);
            if let Some(caps) = caps {
                v_h = v_h.lane_min(caps.h[i]);
            }
            v_max = v_max.lane_max(v_h);
            h_store[i] = v_h;

            let v_h_gap = v_h.sat_sub(v_gap_o);
            e[i] = v_e.sat_sub(v_gap_e).lane_max(v_h_gap);
            if let Some(caps) = caps {
                e[i] = e[i].lane_min(caps.e[i]);
            }
            v_f = v_f.sat_sub(v_gap_e).lane_max(v_h_gap);

            v_h = h_load[i];
        }

        // Lazy F: carry the vertical gap across stripe boundaries until it
        // can no longer beat opening a fresh gap anywhere.
        let mut i = 0;
        v_f = v_f.shift_lanes(V::FLOOR);
        loop {
            let v_h = h_store[i];
            if !v_f.any_gt(v_h.sat_sub(v_gap_o)) {
                break;
            }
            let mut v_h = v_h.lane_max(v_f);
            let mut v_e = e[i].lane_max(v_h.sat_sub(v_gap_o));
            if let Some(caps) = caps {
                v_h = v_h.lane_min(caps.h[i]);
                v_e = v_e.lane_min(caps.e[i]);
            }
            h_store[i] = v_h;
            v_max = v_max.lane_max(v_h);
            e[i] = v_e;
            v_f = v_f.sat_sub(v_gap_e);
            i += 1;
            if i == seg_len {
                i = 0;
                v_f = v_f.shift_lanes(V::FLOOR);
            }
        }

        let col_max = v_max.hmax();
        if params.keep_columns {
            best.column_max.push(col_max);
        }
        if col_max > best.score {
            best.score = col_max;
            best.ref_end = Some(col);
            best.query_end = (0..m).find(|&q| h_store[q % seg_len].lane(q / seg_len) == col_max);
        }
        if col_max >= ceiling {
            return ScanOutcome::Saturated;
        }
        if params.stop_at.is_some_and(|stop| best.score >= stop) {
            break;
        }
    }

    ScanOutcome::Complete(best)
}
