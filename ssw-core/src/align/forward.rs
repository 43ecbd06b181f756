use super::profile::{Profile, StripeVector, StripedProfile};
use super::striped::{scan, Direction, ScanBest, ScanOutcome, ScanParams};
use super::types::{AlignOptions, ScoreWidth};
use crate::error::{SswError, SswResult};

/// Secondary scores are only reported for masks at least this wide.
pub const MIN_MASK_LEN: usize = 15;

/// Lane width a scan actually ran at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LaneWidth {
    Narrow,
    Wide,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ForwardHit {
    pub(crate) score: i32,
    pub(crate) ref_end: Option<usize>,
    pub(crate) query_end: Option<usize>,
    pub(crate) score2: i32,
    pub(crate) ref_end2: Option<usize>,
    pub(crate) lanes: LaneWidth,
}

/// Best score and end point over the whole reference, escalating from 8-bit
/// to 16-bit lanes when the profile allows it.
pub(crate) fn scan_forward(
    profile: &Profile,
    reference: &[u8],
    options: &AlignOptions,
) -> SswResult<ForwardHit> {
    let secondary = options.flags.secondary && options.mask_len >= MIN_MASK_LEN;
    if options.flags.secondary && !secondary {
        log::warn!(
            "mask length {} is below {}; secondary score not computed",
            options.mask_len,
            MIN_MASK_LEN
        );
    }
    let params = ScanParams {
        gaps: options.gaps,
        direction: Direction::Forward,
        stop_at: None,
        keep_columns: secondary,
    };

    let (best, lanes) = match (profile.width(), profile.narrow()) {
        (ScoreWidth::Wide, _) | (_, None) => (
            scan_or_overflow(profile.wide(), reference, params)?,
            LaneWidth::Wide,
        ),
        (ScoreWidth::Narrow, Some(narrow)) => {
            (scan_or_overflow(narrow, reference, params)?, LaneWidth::Narrow)
        }
        (ScoreWidth::Adaptive, Some(narrow)) => match scan(narrow, reference, params) {
            ScanOutcome::Complete(best) => (best, LaneWidth::Narrow),
            ScanOutcome::Saturated => {
                log::debug!(
                    "8-bit scan saturated (query {} x reference {}); rescanning with 16-bit lanes",
                    profile.len(),
                    reference.len()
                );
                (scan_or_overflow(profile.wide(), reference, params)?, LaneWidth::Wide)
            }
        },
    };

    let (score2, ref_end2) = match (secondary, best.ref_end) {
        (true, Some(end)) => secondary_best(&best.column_max, end, options.mask_len),
        _ => (0, None),
    };

    Ok(ForwardHit {
        score: best.score,
        ref_end: best.ref_end,
        query_end: best.query_end,
        score2,
        ref_end2,
        lanes,
    })
}

pub(crate) fn scan_or_overflow<V: StripeVector>(
    profile: &StripedProfile<V>,
    reference: &[u8],
    params: ScanParams,
) -> SswResult<ScanBest> {
    match scan(profile, reference, params) {
        ScanOutcome::Complete(best) => Ok(best),
        ScanOutcome::Saturated => Err(SswError::ScoreOverflow { width: V::BITS }),
    }
}

/// Best column maximum strictly more than `mask_len` columns away from `end`.
/// Ties keep the leftmost column.
pub(crate) fn secondary_best(column_max: &[i32], end: usize, mask_len: usize) -> (i32, Option<usize>) {
    let lower = end.saturating_sub(mask_len);
    let upper = end.saturating_add(mask_len).saturating_add(1);
    let mut best = (0, None);
    let candidates = (0..lower).chain(upper..column_max.len());
    for col in candidates {
        if column_max[col] > best.0 {
            best = (column_max[col], Some(col));
        }
    }
    best
}
