use crate::error::{SswError, SswResult};
use std::fmt;

/// Operation codes in SAM order; the packed form stores the index.
const PACKED_OPS: &[u8; 9] = b"MIDNSHP=X";

/// Kind of an alignment column. `Ins` advances only the query and `Del`
/// only the reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CigarOp {
    /// Aligned pair, identical or substituted.
    Match,
    Ins,
    Del,
}

impl CigarOp {
    pub fn code(self) -> u8 {
        match self {
            CigarOp::Match => b'M',
            CigarOp::Ins => b'I',
            CigarOp::Del => b'D',
        }
    }

    fn packed_index(self) -> u32 {
        match self {
            CigarOp::Match => 0,
            CigarOp::Ins => 1,
            CigarOp::Del => 2,
        }
    }
}

/// Alignment path from the begin to the end coordinates as `(op, run)` pairs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Cigar {
    pub ops: Vec<(CigarOp, usize)>,
}

impl Cigar {
    /// Extends the last run when `op` repeats it; empty runs are dropped.
    pub fn push(&mut self, op: CigarOp, len: usize) {
        if len == 0 {
            return;
        }
        if let Some((last_op, last_len)) = self.ops.last_mut() {
            if *last_op == op {
                *last_len += len;
                return;
            }
        }
        self.ops.push((op, len));
    }

    /// Alignment columns across all runs.
    pub fn len(&self) -> usize {
        self.ops.iter().map(|(_, n)| *n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Residues consumed on (query, reference).
    pub fn consumed(&self) -> (usize, usize) {
        self.ops
            .iter()
            .fold((0, 0), |(q, r), &(op, len)| match op {
                CigarOp::Match => (q + len, r + len),
                CigarOp::Ins => (q + len, r),
                CigarOp::Del => (q, r + len),
            })
    }

    /// Packs each run as `len << 4 | op`, op indexed into `MIDNSHP=X`.
    pub fn to_packed(&self) -> Vec<u32> {
        self.ops
            .iter()
            .map(|&(op, len)| ((len as u32) << 4) | op.packed_index())
            .collect()
    }

    pub fn from_packed(packed: &[u32]) -> SswResult<Self> {
        let mut cigar = Cigar::default();
        for &value in packed {
            let op = match value & 0xf {
                0 => CigarOp::Match,
                1 => CigarOp::Ins,
                2 => CigarOp::Del,
                code => return Err(SswError::UnknownCigarOp { code }),
            };
            cigar.push(op, packed_len(value) as usize);
        }
        Ok(cigar)
    }
}

#[inline]
pub fn packed_len(value: u32) -> u32 {
    value >> 4
}

/// Operation character of a packed run, `None` past the end of `MIDNSHP=X`.
#[inline]
pub fn packed_op(value: u32) -> Option<u8> {
    PACKED_OPS.get((value & 0xf) as usize).copied()
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &(op, len) in &self.ops {
            write!(f, "{}{}", len, op.code() as char)?;
        }
        Ok(())
    }
}

/// Affine gap costs: a gap of length k costs `open + extend * (k - 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapModel {
    open: u8,
    extend: u8,
}

impl GapModel {
    pub fn new(open: u8, extend: u8) -> SswResult<Self> {
        if extend == 0 || open <= extend {
            return Err(SswError::InvalidGapModel {
                gap_open: open,
                gap_extend: extend,
            });
        }
        Ok(Self { open, extend })
    }

    pub fn open(&self) -> u8 {
        self.open
    }

    pub fn extend(&self) -> u8 {
        self.extend
    }

    pub fn cost(&self, len: usize) -> i32 {
        if len == 0 {
            0
        } else {
            self.open as i32 + self.extend as i32 * (len as i32 - 1)
        }
    }
}

impl Default for GapModel {
    fn default() -> Self {
        Self { open: 3, extend: 1 }
    }
}

/// Lane width of the striped profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScoreWidth {
    /// 8-bit lanes only; saturation is an error.
    Narrow,
    /// 16-bit lanes only.
    Wide,
    /// 8-bit lanes, rerun with 16-bit lanes on saturation.
    #[default]
    Adaptive,
}

/// Which phases run after the forward scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AlignFlags {
    pub begin: bool,
    pub secondary: bool,
    pub filter_by_score: bool,
    pub filter_by_distance: bool,
    pub trace: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignOptions {
    pub gaps: GapModel,
    pub flags: AlignFlags,
    pub filter_score: u16,
    pub filter_distance: usize,
    pub mask_len: usize,
}

impl AlignOptions {
    pub fn new(gaps: GapModel) -> Self {
        Self {
            gaps,
            flags: AlignFlags::default(),
            filter_score: 0,
            filter_distance: 0,
            mask_len: 15,
        }
    }

    pub fn with_begin(mut self) -> Self {
        self.flags.begin = true;
        self
    }

    pub fn with_secondary(mut self, mask_len: usize) -> Self {
        self.flags.secondary = true;
        self.mask_len = mask_len;
        self
    }

    pub fn with_score_filter(mut self, filter_score: u16) -> Self {
        self.flags.filter_by_score = true;
        self.filter_score = filter_score;
        self
    }

    pub fn with_distance_filter(mut self, filter_distance: usize) -> Self {
        self.flags.filter_by_distance = true;
        self.filter_distance = filter_distance;
        self
    }

    pub fn with_trace(mut self) -> Self {
        self.flags.trace = true;
        self
    }
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self::new(GapModel::default())
    }
}

/// Coordinates are 0-based and inclusive; `None` when nothing aligned or the
/// phase producing them did not run.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AlignmentResult {
    pub score: u16,
    pub score2: u16,
    pub ref_begin: Option<usize>,
    pub ref_end: Option<usize>,
    pub query_begin: Option<usize>,
    pub query_end: Option<usize>,
    pub ref_end2: Option<usize>,
    pub cigar: Option<Cigar>,
}
