use super::forward::{scan_or_overflow, LaneWidth};
use super::profile::{NarrowVector, Profile, StripedProfile, WideVector};
use super::striped::{Direction, ScanParams};
use super::types::GapModel;
use crate::error::{SswError, SswResult};

/// Start of the optimal alignment ending at (`query_end`, `ref_end`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Begin {
    pub(crate) query: usize,
    pub(crate) reference: usize,
}

/// Rescans the reversed query prefix against the reference read backwards
/// from `ref_end`, stopping at the first column that reproduces `score`.
/// That column and the lowest reversed query position give the latest
/// start achieving the optimum.
pub(crate) fn find_begin(
    profile: &Profile,
    reference: &[u8],
    gaps: GapModel,
    lanes: LaneWidth,
    score: i32,
    query_end: usize,
    ref_end: usize,
) -> SswResult<Begin> {
    let reversed: Vec<u8> = profile.query()[..=query_end].iter().rev().copied().collect();
    let params = ScanParams {
        gaps,
        direction: Direction::Reverse,
        stop_at: Some(score),
        keep_columns: false,
    };
    let window = &reference[..=ref_end];
    let best = match lanes {
        LaneWidth::Narrow => {
            let bias = profile.narrow().map_or(0, |p| p.bias);
            let rev = StripedProfile::<NarrowVector>::build(
                &reversed,
                profile.scores(),
                profile.alphabet_size(),
                bias,
            );
            scan_or_overflow(&rev, window, params)?
        }
        LaneWidth::Wide => {
            let rev = StripedProfile::<WideVector>::build(
                &reversed,
                profile.scores(),
                profile.alphabet_size(),
                0,
            );
            scan_or_overflow(&rev, window, params)?
        }
    };

    match (best.ref_end, best.query_end) {
        (Some(reference), Some(rev_query)) if best.score == score => Ok(Begin {
            query: query_end - rev_query,
            reference,
        }),
        _ => Err(SswError::ScoreMismatch {
            phase: "reverse scan",
            expected: score,
            found: best.score,
        }),
    }
}
