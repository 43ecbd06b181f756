use super::matrices::ScoreMatrix;
use super::types::{AlignOptions, AlignmentResult, Cigar, CigarOp, GapModel, ScoreWidth};
use super::{align, MIN_MASK_LEN};
use crate::alphabets::dna;
use crate::error::SswResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strand {
    Forward,
    /// The query was reverse complemented before aligning.
    Reverse,
}

/// Aligns raw sequences: encodes them with the matrix alphabet, then runs the
/// begin, trace and secondary phases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aligner {
    matrix: ScoreMatrix,
    gaps: GapModel,
    width: ScoreWidth,
}

impl Aligner {
    pub fn new(matrix: ScoreMatrix, gaps: GapModel) -> Self {
        Self {
            matrix,
            gaps,
            width: ScoreWidth::default(),
        }
    }

    /// `AGTCN`, +2/-2 with `N` neutral, gap open 3, gap extend 1.
    pub fn dna() -> Self {
        Self::new(ScoreMatrix::default(), GapModel::default())
    }

    pub fn with_width(mut self, width: ScoreWidth) -> Self {
        self.width = width;
        self
    }

    pub fn matrix(&self) -> &ScoreMatrix {
        &self.matrix
    }

    pub fn gaps(&self) -> GapModel {
        self.gaps
    }

    pub fn align(&self, query: &[u8], reference: &[u8]) -> SswResult<Alignment> {
        self.align_strand(query, reference, Strand::Forward)
    }

    /// Also aligns the reverse complement of `query`; that result wins only
    /// when it scores strictly higher.
    pub fn align_both_strands(&self, query: &[u8], reference: &[u8]) -> SswResult<Alignment> {
        let forward = self.align_strand(query, reference, Strand::Forward)?;
        let rc = dna::reverse_complement(query);
        let reverse = self.align_strand(&rc, reference, Strand::Reverse)?;
        if reverse.result.score > forward.result.score {
            Ok(reverse)
        } else {
            Ok(forward)
        }
    }

    fn align_strand(&self, query: &[u8], reference: &[u8], strand: Strand) -> SswResult<Alignment> {
        let profile = self.matrix.profile(query, self.width)?;
        let codes = self.matrix.encode(reference)?;
        let options = AlignOptions::new(self.gaps)
            .with_begin()
            .with_trace()
            .with_secondary(MIN_MASK_LEN.max(query.len() / 2));
        let result = align(&profile, &codes, &options)?;
        Ok(Alignment {
            result,
            strand,
            query: query.to_vec(),
            reference: reference.to_vec(),
        })
    }
}

impl Default for Aligner {
    fn default() -> Self {
        Self::dna()
    }
}

/// An alignment together with the sequences it was computed from. `query` is
/// the sequence as aligned, so it is reverse complemented on the reverse
/// strand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub result: AlignmentResult,
    pub strand: Strand,
    query: Vec<u8>,
    reference: Vec<u8>,
}

impl Alignment {
    pub fn score(&self) -> u16 {
        self.result.score
    }

    pub fn query(&self) -> &[u8] {
        &self.query
    }

    pub fn reference(&self) -> &[u8] {
        &self.reference
    }

    pub fn cigar(&self) -> Option<&Cigar> {
        self.result.cigar.as_ref()
    }

    fn spans(&self) -> Option<(usize, usize, usize, usize)> {
        let r = &self.result;
        Some((r.query_begin?, r.query_end?, r.ref_begin?, r.ref_end?))
    }

    /// CIGAR text with the unaligned query ends as soft clips.
    pub fn cigar_string(&self) -> String {
        let (Some(cigar), Some((qb, qe, _, _))) = (self.cigar(), self.spans()) else {
            return String::new();
        };
        let mut out = String::new();
        if qb > 0 {
            out.push_str(&format!("{qb}S"));
        }
        out.push_str(&cigar.to_string());
        let tail = self.query.len() - qe - 1;
        if tail > 0 {
            out.push_str(&format!("{tail}S"));
        }
        out
    }

    /// Reference line, match line (`|` identical, `*` substituted, blank
    /// under gaps) and query line.
    pub fn aligned(&self) -> (String, String, String) {
        let mut lines = (String::new(), String::new(), String::new());
        let (Some(cigar), Some((qb, qe, rb, re))) = (self.cigar(), self.spans()) else {
            return lines;
        };
        let mut q = self.query[qb..=qe].iter().map(|&b| b as char);
        let mut r = self.reference[rb..=re].iter().map(|&b| b as char);
        let (r_line, m_line, q_line) = &mut lines;
        for &(op, len) in &cigar.ops {
            for _ in 0..len {
                match op {
                    CigarOp::Match => {
                        let (rc, qc) = (r.next().unwrap_or('-'), q.next().unwrap_or('-'));
                        r_line.push(rc);
                        q_line.push(qc);
                        m_line.push(if rc.eq_ignore_ascii_case(&qc) { '|' } else { '*' });
                    }
                    CigarOp::Ins => {
                        r_line.push('-');
                        m_line.push(' ');
                        q_line.push(q.next().unwrap_or('-'));
                    }
                    CigarOp::Del => {
                        r_line.push(r.next().unwrap_or('-'));
                        m_line.push(' ');
                        q_line.push('-');
                    }
                }
            }
        }
        lines
    }

    pub fn match_count(&self) -> usize {
        self.aligned().1.matches('|').count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.aligned().1.matches('*').count()
    }

    pub fn insertion_count(&self) -> usize {
        self.op_total(CigarOp::Ins)
    }

    pub fn deletion_count(&self) -> usize {
        self.op_total(CigarOp::Del)
    }

    fn op_total(&self, kind: CigarOp) -> usize {
        self.cigar().map_or(0, |c| {
            c.ops
                .iter()
                .filter(|(op, _)| *op == kind)
                .map(|(_, n)| n)
                .sum()
        })
    }

    /// Fraction of the query between the begin and end coordinates.
    pub fn query_coverage(&self) -> f64 {
        match self.spans() {
            Some((qb, qe, _, _)) if !self.query.is_empty() => {
                (qe - qb + 1) as f64 / self.query.len() as f64
            }
            _ => 0.0,
        }
    }

    pub fn reference_coverage(&self) -> f64 {
        match self.spans() {
            Some((_, _, rb, re)) if !self.reference.is_empty() => {
                (re - rb + 1) as f64 / self.reference.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Score summary followed by the aligned lines wrapped to `width`
    /// columns, each block labelled with 1-based sequence offsets.
    pub fn report(&self, width: usize) -> String {
        let mut out = format!(
            "Score = {}, Matches = {}, Mismatches = {}, Insertions = {}, Deletions = {}\n\n",
            self.result.score,
            self.match_count(),
            self.mismatch_count(),
            self.insertion_count(),
            self.deletion_count()
        );
        let Some((qb, qe, rb, re)) = self.spans() else {
            return out;
        };
        let margin = qe.max(re).to_string().len() + 8;
        let step = width.saturating_sub(margin).max(1);
        let (r_line, m_line, q_line) = self.aligned();
        let r_chars: Vec<char> = r_line.chars().collect();
        let m_chars: Vec<char> = m_line.chars().collect();
        let q_chars: Vec<char> = q_line.chars().collect();

        for offset in (0..r_chars.len()).step_by(step) {
            let end = (offset + step).min(r_chars.len());
            let rows = [
                (Some(("ref", rb)), &r_chars[offset..end]),
                (None, &m_chars[offset..end]),
                (Some(("query", qb)), &q_chars[offset..end]),
            ];
            for (label, chunk) in rows {
                let left = label
                    .map(|(name, begin)| format!("{name:<5} {}", begin + offset + 1))
                    .unwrap_or_default();
                let text: String = chunk.iter().collect();
                out.push_str(&format!("{left:<margin$}{text}\n"));
            }
            out.push('\n');
        }
        out
    }
}
