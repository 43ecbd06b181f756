pub mod aligner;
mod forward;
pub mod matrices;
pub mod profile;
mod reverse;
pub mod scalar_ref;
mod striped;
pub mod trace;
pub mod types;

pub use aligner::{Aligner, Alignment, Strand};
pub use forward::MIN_MASK_LEN;
pub use matrices::{ExactMatcher, IupacMatcher, Matcher, ScoreMatrix};
pub use profile::{build_profile, Profile};
pub use trace::{trace, TraceBounds};
pub use types::{
    packed_len, packed_op, AlignFlags, AlignOptions, AlignmentResult, Cigar, CigarOp, GapModel,
    ScoreWidth,
};

use crate::error::SswResult;
use forward::scan_forward;
use profile::check_symbols;
use reverse::find_begin;

#[cfg(test)]
mod tests;

/// Aligns `reference` (alphabet indices) against the query held by `profile`.
///
/// The forward scan always runs. The begin coordinates are recovered when
/// `begin`, `trace` or either filter is requested and the score is positive
/// and passes the score filter. The operations are built only when `trace`
/// is set and neither filter rejects the alignment.
pub fn align(
    profile: &Profile,
    reference: &[u8],
    options: &AlignOptions,
) -> SswResult<AlignmentResult> {
    check_symbols(reference, profile.alphabet_size())?;
    let hit = scan_forward(profile, reference, options)?;

    // Saturation is reported before any score leaves the 16-bit range.
    let mut result = AlignmentResult {
        score: hit.score as u16,
        score2: hit.score2 as u16,
        ref_end: hit.ref_end,
        query_end: hit.query_end,
        ref_end2: hit.ref_end2,
        ..AlignmentResult::default()
    };
    let (Some(ref_end), Some(query_end)) = (hit.ref_end, hit.query_end) else {
        return Ok(result);
    };

    let flags = options.flags;
    let wants_begin =
        flags.begin || flags.trace || flags.filter_by_score || flags.filter_by_distance;
    let score_ok = !flags.filter_by_score || result.score >= options.filter_score;
    if !wants_begin || !score_ok {
        return Ok(result);
    }

    let begin = find_begin(
        profile,
        reference,
        options.gaps,
        hit.lanes,
        hit.score,
        query_end,
        ref_end,
    )?;
    result.query_begin = Some(begin.query);
    result.ref_begin = Some(begin.reference);

    let distance_ok = !flags.filter_by_distance
        || (ref_end - begin.reference <= options.filter_distance
            && query_end - begin.query <= options.filter_distance);
    if flags.trace && distance_ok {
        let bounds = TraceBounds {
            query_begin: begin.query,
            query_end,
            ref_begin: begin.reference,
            ref_end,
        };
        let cigar = trace(
            profile.query(),
            reference,
            bounds,
            options.gaps,
            hit.score,
            |r, q| profile.score(r, q),
        )?;
        result.cigar = Some(cigar);
    }
    Ok(result)
}

/// Aligns every reference against one shared profile.
pub fn align_batch<R>(
    profile: &Profile,
    references: &[R],
    options: &AlignOptions,
) -> Vec<SswResult<AlignmentResult>>
where
    R: AsRef<[u8]> + Sync,
{
    par_map!(references, |reference: &R| align(
        profile,
        reference.as_ref(),
        options
    ))
}
