use super::scalar_ref::{align_local_scalar, column_maxima};
use super::types::{packed_op, AlignOptions, AlignmentResult, Cigar, CigarOp, GapModel, ScoreWidth};
use super::{align, align_batch, Aligner, ExactMatcher, Profile, ScoreMatrix};
use crate::alphabets::dna;
use crate::error::SswError;

use proptest::prelude::*;

const REFERENCE: &[u8] = b"GTGCGATGTGCGATGAGATC";

fn profile_for(matrix: &ScoreMatrix, query: &[u8], width: ScoreWidth) -> Profile {
    matrix.profile(query, width).unwrap()
}

fn run(query: &[u8], reference: &[u8], options: &AlignOptions) -> AlignmentResult {
    let matrix = ScoreMatrix::default();
    let profile = profile_for(&matrix, query, ScoreWidth::Adaptive);
    align(&profile, &matrix.encode(reference).unwrap(), options).unwrap()
}

fn traced() -> AlignOptions {
    AlignOptions::default().with_trace()
}

/// Pseudo-random ACGT sequence, reproducible from `seed`.
fn sequence(len: usize, mut seed: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            b"ACGT"[(seed % 4) as usize]
        })
        .collect()
}

fn rescore(
    matrix: &ScoreMatrix,
    query: &[u8],
    reference: &[u8],
    result: &AlignmentResult,
    gaps: GapModel,
) -> i32 {
    let q = matrix.encode(query).unwrap();
    let r = matrix.encode(reference).unwrap();
    let mut qi = result.query_begin.unwrap();
    let mut ri = result.ref_begin.unwrap();
    let mut score = 0i32;
    for &(op, len) in &result.cigar.as_ref().unwrap().ops {
        match op {
            CigarOp::Match => {
                for _ in 0..len {
                    score += matrix.score(r[ri], q[qi]) as i32;
                    qi += 1;
                    ri += 1;
                }
            }
            CigarOp::Ins => {
                score -= gaps.cost(len);
                qi += len;
            }
            CigarOp::Del => {
                score -= gaps.cost(len);
                ri += len;
            }
        }
    }
    score
}

#[test]
fn perfect_alignment() {
    let res = run(REFERENCE, REFERENCE, &traced());
    assert_eq!(res.score, 40);
    assert_eq!((res.query_begin, res.query_end), (Some(0), Some(19)));
    assert_eq!((res.ref_begin, res.ref_end), (Some(0), Some(19)));
    assert_eq!(res.cigar.unwrap().to_string(), "20M");
}

#[test]
fn lowercase_query_matches_uppercase() {
    let lower = REFERENCE.to_ascii_lowercase();
    assert_eq!(run(&lower, REFERENCE, &traced()), run(REFERENCE, REFERENCE, &traced()));
}

#[test]
fn single_insertion() {
    let mut query = REFERENCE[..10].to_vec();
    query.push(b'A');
    query.extend_from_slice(&REFERENCE[10..]);
    let res = run(&query, REFERENCE, &traced());
    assert_eq!(res.score, 40 - 3);
    assert_eq!(
        res.cigar.unwrap().ops,
        vec![(CigarOp::Match, 10), (CigarOp::Ins, 1), (CigarOp::Match, 10)]
    );
}

#[test]
fn single_deletion() {
    let mut query = REFERENCE[..10].to_vec();
    query.extend_from_slice(&REFERENCE[11..]);
    let res = run(&query, REFERENCE, &traced());
    assert_eq!(res.score, 38 - 3);
    assert_eq!(res.cigar.unwrap().to_string(), "10M1D9M");
}

#[test]
fn single_mismatch_stays_ungapped() {
    let mut query = REFERENCE.to_vec();
    query[10] = b'A';
    let res = run(&query, REFERENCE, &traced());
    assert_eq!(res.score, 38 - 2);
    assert_eq!(res.cigar.unwrap().to_string(), "20M");
}

#[test]
fn iupac_codes_match_in_reference_only() {
    let aligner = Aligner::new(ScoreMatrix::iupac(2, -2), GapModel::default());
    let al = aligner.align(b"AGCGATCACGT", b"MRYSWKBDHVN").unwrap();
    assert_eq!(al.score(), 22);
    assert_eq!(al.cigar_string(), "11M");
    assert_eq!(al.mismatch_count(), 0);

    let swapped = aligner.align(b"MRYSWKBDHVN", b"AGCGATCACGT").unwrap();
    assert_eq!(swapped.score(), 0);
}

#[test]
fn periodic_mismatches_keep_earliest_end() {
    let reference = [b"CCC".to_vec(), b"AGCT".repeat(10)].concat();
    let query = b"AGGT".repeat(10);
    let al = Aligner::dna().align(&query, &reference).unwrap();
    assert_eq!(al.score(), 40);
    let (r, m, q) = al.aligned();
    assert_eq!(r, "AGCTAGCTAGCTAGCTAGCTAGCTAGCTAGCTAGCTAG");
    assert_eq!(m, "||*|||*|||*|||*|||*|||*|||*|||*|||*|||");
    assert_eq!(q, "AGGTAGGTAGGTAGGTAGGTAGGTAGGTAGGTAGGTAG");
    assert_eq!(al.result.ref_begin, Some(3));
    assert_eq!(al.result.ref_end, Some(40));
}

#[test]
fn gap_model_requires_open_above_extend() {
    for open in 0..6u8 {
        for extend in 0..6u8 {
            let ok = extend > 0 && open > extend;
            assert_eq!(GapModel::new(open, extend).is_ok(), ok, "{open}/{extend}");
        }
    }
    assert_eq!(
        GapModel::new(1, 2),
        Err(SswError::InvalidGapModel {
            gap_open: 1,
            gap_extend: 2
        })
    );
}

#[test]
fn secondary_score_from_distant_copy() {
    let reference = [REFERENCE, &[b'N'; 30][..], REFERENCE].concat();
    let res = run(REFERENCE, &reference, &AlignOptions::default().with_secondary(15));
    assert_eq!(res.score, 40);
    assert_eq!(res.ref_end, Some(19));
    assert_eq!(res.score2, 40);
    assert_eq!(res.ref_end2, Some(69));
}

#[test]
fn short_mask_skips_secondary() {
    let reference = [REFERENCE, &[b'N'; 30][..], REFERENCE].concat();
    let res = run(REFERENCE, &reference, &AlignOptions::default().with_secondary(10));
    assert_eq!(res.score, 40);
    assert_eq!(res.score2, 0);
    assert_eq!(res.ref_end2, None);
}

#[test]
fn phases_follow_flags() {
    let plain = run(REFERENCE, REFERENCE, &AlignOptions::default());
    assert_eq!(plain.ref_end, Some(19));
    assert_eq!(plain.ref_begin, None);
    assert!(plain.cigar.is_none());

    let begin = run(REFERENCE, REFERENCE, &AlignOptions::default().with_begin());
    assert_eq!(begin.ref_begin, Some(0));
    assert!(begin.cigar.is_none());
}

#[test]
fn score_filter_stops_after_forward_scan() {
    let res = run(REFERENCE, REFERENCE, &traced().with_score_filter(41));
    assert_eq!(res.score, 40);
    assert_eq!(res.query_end, Some(19));
    assert_eq!(res.query_begin, None);
    assert!(res.cigar.is_none());

    let res = run(REFERENCE, REFERENCE, &traced().with_score_filter(40));
    assert!(res.cigar.is_some());
}

#[test]
fn distance_filter_skips_trace() {
    let res = run(REFERENCE, REFERENCE, &traced().with_distance_filter(10));
    assert_eq!(res.ref_begin, Some(0));
    assert!(res.cigar.is_none());

    let res = run(REFERENCE, REFERENCE, &traced().with_distance_filter(19));
    assert!(res.cigar.is_some());
}

#[test]
fn no_alignment_leaves_coordinates_unset() {
    let res = run(b"AAAA", b"CCCCCC", &traced().with_secondary(15));
    assert_eq!(res, AlignmentResult::default());
}

#[test]
fn out_of_range_reference_symbol() {
    let matrix = ScoreMatrix::default();
    let profile = profile_for(&matrix, b"ACGT", ScoreWidth::Adaptive);
    assert_eq!(
        align(&profile, &[0, 1, 9], &AlignOptions::default()),
        Err(SswError::SymbolOutOfRange {
            symbol: 9,
            pos: 2,
            alphabet_size: 5
        })
    );
    assert_eq!(
        matrix.encode(b"ACXT"),
        Err(SswError::UnknownSymbol { ch: 'X', pos: 2 })
    );
}

#[test]
fn narrow_overflow_escalates_to_wide() {
    let matrix = ScoreMatrix::default();
    let seq = sequence(300, 0x9e37_79b9);
    let codes = matrix.encode(&seq).unwrap();
    let options = traced();

    let adaptive = align(&profile_for(&matrix, &seq, ScoreWidth::Adaptive), &codes, &options).unwrap();
    let wide = align(&profile_for(&matrix, &seq, ScoreWidth::Wide), &codes, &options).unwrap();
    assert_eq!(adaptive, wide);
    assert_eq!(adaptive.score, 600);
    assert_eq!(adaptive.cigar.unwrap().ops, vec![(CigarOp::Match, 300)]);

    let scalar = align_local_scalar(&codes, &codes, matrix.scores(), 5, GapModel::default());
    assert_eq!(scalar.score, 600);
    assert_eq!(wide.query_end, scalar.query_end);
    assert_eq!(wide.ref_end, scalar.ref_end);

    assert_eq!(
        align(&profile_for(&matrix, &seq, ScoreWidth::Narrow), &codes, &options),
        Err(SswError::ScoreOverflow { width: 8 })
    );
}

#[test]
fn wide_overflow_is_reported() {
    let matrix = ScoreMatrix::from_matcher(dna::alphabet(), &ExactMatcher::new(100, -100));
    let seq = sequence(400, 7);
    let codes = matrix.encode(&seq).unwrap();
    let profile = profile_for(&matrix, &seq, ScoreWidth::Adaptive);
    assert_eq!(
        align(&profile, &codes, &AlignOptions::default()),
        Err(SswError::ScoreOverflow { width: 16 })
    );
}

#[test]
fn short_queries_on_wide_lanes() {
    let matrix = ScoreMatrix::default();
    let options = traced();
    let single = profile_for(&matrix, b"A", ScoreWidth::Wide);
    let res = align(&single, &matrix.encode(b"CCC").unwrap(), &options).unwrap();
    assert_eq!(res, AlignmentResult::default());

    let three = profile_for(&matrix, b"ACG", ScoreWidth::Wide);
    let res = align(&three, &matrix.encode(b"TTACGTT").unwrap(), &options).unwrap();
    assert_eq!(res.score, 6);
    assert_eq!((res.ref_begin, res.ref_end), (Some(2), Some(4)));
    assert_eq!(res.cigar.unwrap().ops, vec![(CigarOp::Match, 3)]);

    // 300 does not fit next to a bias of 100 in 8 bits.
    let heavy = ScoreMatrix::from_matcher(dna::alphabet(), &ExactMatcher::new(100, -100));
    let profile = profile_for(&heavy, b"AAA", ScoreWidth::Adaptive);
    let res = align(&profile, &heavy.encode(b"AAA").unwrap(), &options).unwrap();
    assert_eq!(res.score, 300);
    assert_eq!(res.query_begin, Some(0));
    assert_eq!(res.cigar.unwrap().ops, vec![(CigarOp::Match, 3)]);
}

#[test]
fn secondary_ignores_lanes_past_query_end() {
    let query = b"AGTAGTAGTAGTAGTAG";
    let reference = [&query[..], &[b'C'; 40][..]].concat();
    let options = AlignOptions::default().with_secondary(15);
    let matrix = ScoreMatrix::default();
    for width in [ScoreWidth::Narrow, ScoreWidth::Wide, ScoreWidth::Adaptive] {
        let profile = profile_for(&matrix, query, width);
        let res = align(&profile, &matrix.encode(&reference).unwrap(), &options).unwrap();
        assert_eq!(res.score, 34);
        assert_eq!(res.ref_end, Some(16));
        // A 16-column deletion off the primary end: 34 - (3 + 15).
        assert_eq!((res.score2, res.ref_end2), (16, Some(32)));
    }
}

#[test]
fn batch_matches_single_alignments() {
    let matrix = ScoreMatrix::default();
    let profile = profile_for(&matrix, REFERENCE, ScoreWidth::Adaptive);
    let references: Vec<Vec<u8>> = [REFERENCE.to_vec(), sequence(50, 3), sequence(120, 11)]
        .iter()
        .map(|r| matrix.encode(r).unwrap())
        .collect();
    let options = traced();
    let batch = align_batch(&profile, &references, &options);
    assert_eq!(batch.len(), 3);
    for (reference, res) in references.iter().zip(batch) {
        assert_eq!(res, align(&profile, reference, &options));
    }
}

#[test]
fn packed_cigar_layout() {
    let mut cigar = Cigar::default();
    cigar.push(CigarOp::Match, 10);
    cigar.push(CigarOp::Ins, 1);
    cigar.push(CigarOp::Match, 4);
    cigar.push(CigarOp::Match, 6);
    let packed = cigar.to_packed();
    assert_eq!(packed, vec![10 << 4, (1 << 4) | 1, 10 << 4]);
    assert_eq!(packed_op(packed[1]), Some(b'I'));
    assert_eq!(Cigar::from_packed(&packed).unwrap(), cigar);
    assert_eq!(
        Cigar::from_packed(&[(5 << 4) | 4]),
        Err(SswError::UnknownCigarOp { code: 4 })
    );
}

#[test]
fn cigar_runs_merge_and_count_columns() {
    let mut cigar = Cigar::default();
    assert!(cigar.is_empty());
    cigar.push(CigarOp::Del, 0);
    assert!(cigar.is_empty());
    cigar.push(CigarOp::Match, 3);
    cigar.push(CigarOp::Del, 2);
    cigar.push(CigarOp::Del, 1);
    cigar.push(CigarOp::Ins, 0);
    cigar.push(CigarOp::Match, 4);
    assert_eq!(cigar.to_string(), "3M3D4M");
    assert_eq!(cigar.len(), 10);
    assert_eq!(cigar.consumed(), (7, 10));
}

fn dna_strategy(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T'), Just(b'N')],
        1..max,
    )
}

proptest! {
    #[test]
    fn striped_matches_scalar(q in dna_strategy(60), r in dna_strategy(80)) {
        let matrix = ScoreMatrix::default();
        let (qc, rc) = (matrix.encode(&q).unwrap(), matrix.encode(&r).unwrap());
        let gaps = GapModel::default();
        let scalar = align_local_scalar(&qc, &rc, matrix.scores(), 5, gaps);
        for width in [ScoreWidth::Narrow, ScoreWidth::Wide, ScoreWidth::Adaptive] {
            let res = align(&profile_for(&matrix, &q, width), &rc, &AlignOptions::new(gaps)).unwrap();
            prop_assert_eq!(res.score as i32, scalar.score);
            prop_assert_eq!(res.query_end, scalar.query_end);
            prop_assert_eq!(res.ref_end, scalar.ref_end);
        }
    }
}

proptest! {
    #[test]
    fn self_alignment_is_one_match_run(
        s in prop::collection::vec(prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')], 1..100),
    ) {
        let res = run(&s, &s, &traced());
        prop_assert_eq!(res.score as usize, 2 * s.len());
        prop_assert_eq!(res.query_begin, Some(0));
        prop_assert_eq!(res.ref_end, Some(s.len() - 1));
        prop_assert_eq!(res.cigar.unwrap().ops, vec![(CigarOp::Match, s.len())]);
    }
}

proptest! {
    #[test]
    fn trace_spans_and_rescores(q in dna_strategy(40), r in dna_strategy(60), open in 2u8..6) {
        let matrix = ScoreMatrix::default();
        let gaps = GapModel::new(open, 1).unwrap();
        let profile = profile_for(&matrix, &q, ScoreWidth::Adaptive);
        let res = align(&profile, &matrix.encode(&r).unwrap(), &AlignOptions::new(gaps).with_trace()).unwrap();
        if res.score > 0 {
            let cigar = res.cigar.as_ref().unwrap();
            let (qb, qe) = (res.query_begin.unwrap(), res.query_end.unwrap());
            let (rb, re) = (res.ref_begin.unwrap(), res.ref_end.unwrap());
            prop_assert_eq!(cigar.consumed(), (qe - qb + 1, re - rb + 1));
            prop_assert_eq!(rescore(&matrix, &q, &r, &res, gaps), res.score as i32);
        } else {
            prop_assert_eq!(res.clone(), AlignmentResult::default());
        }
    }
}

/// Leftmost column strictly beating every earlier candidate, skipping
/// columns within `mask` of `end`.
fn masked_secondary(columns: &[i32], end: usize, mask: usize) -> (i32, Option<usize>) {
    columns
        .iter()
        .enumerate()
        .filter(|(col, _)| col.abs_diff(end) > mask)
        .fold((0, None), |best, (col, &v)| if v > best.0 { (v, Some(col)) } else { best })
}

proptest! {
    #[test]
    fn secondary_matches_scalar_columns(q in dna_strategy(60), r in dna_strategy(120)) {
        let matrix = ScoreMatrix::default();
        let (qc, rc) = (matrix.encode(&q).unwrap(), matrix.encode(&r).unwrap());
        let gaps = GapModel::default();
        let scalar = align_local_scalar(&qc, &rc, matrix.scores(), 5, gaps);
        let expected = match scalar.ref_end {
            Some(end) => masked_secondary(&column_maxima(&qc, &rc, matrix.scores(), 5, gaps), end, 15),
            None => (0, None),
        };
        let options = AlignOptions::new(gaps).with_secondary(15);
        for width in [ScoreWidth::Narrow, ScoreWidth::Wide, ScoreWidth::Adaptive] {
            let res = align(&profile_for(&matrix, &q, width), &rc, &options).unwrap();
            prop_assert_eq!((res.score2 as i32, res.ref_end2), expected);
        }
    }
}

proptest! {
    #[test]
    fn begin_is_latest_start_of_best_alignment(q in dna_strategy(60), r in dna_strategy(80)) {
        let matrix = ScoreMatrix::default();
        let (qc, rc) = (matrix.encode(&q).unwrap(), matrix.encode(&r).unwrap());
        let gaps = GapModel::default();
        let options = AlignOptions::new(gaps).with_begin();
        for width in [ScoreWidth::Narrow, ScoreWidth::Wide, ScoreWidth::Adaptive] {
            let res = align(&profile_for(&matrix, &q, width), &rc, &options).unwrap();
            let (Some(qe), Some(re)) = (res.query_end, res.ref_end) else {
                prop_assert_eq!(res.query_begin, None);
                continue;
            };
            let q_rev: Vec<u8> = qc[..=qe].iter().rev().copied().collect();
            let r_rev: Vec<u8> = rc[..=re].iter().rev().copied().collect();
            let back = align_local_scalar(&q_rev, &r_rev, matrix.scores(), 5, gaps);
            prop_assert_eq!(back.score, res.score as i32);
            prop_assert_eq!(res.query_begin, back.query_end.map(|j| qe - j));
            prop_assert_eq!(res.ref_begin, back.ref_end.map(|i| re - i));
        }
    }
}
