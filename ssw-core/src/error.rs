use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SswError {
    #[error("invalid gap model: gap_open ({gap_open}) must be greater than gap_extend ({gap_extend}) and gap_extend must be positive")]
    InvalidGapModel { gap_open: u8, gap_extend: u8 },

    #[error("query sequence is empty")]
    EmptyQuery,

    #[error("alphabet is empty")]
    EmptyAlphabet,

    #[error("duplicate symbol '{ch}' in alphabet")]
    DuplicateSymbol { ch: char },

    #[error("symbol '{ch}' at position {pos} is not in the alphabet")]
    UnknownSymbol { ch: char, pos: usize },

    #[error("symbol index {symbol} at position {pos} out of range (alphabet size {alphabet_size})")]
    SymbolOutOfRange {
        symbol: u8,
        pos: usize,
        alphabet_size: usize,
    },

    #[error("score matrix has {found} entries, expected {expected} for the alphabet")]
    MatrixShape { expected: usize, found: usize },

    #[error("alignment score saturated the {width}-bit score range")]
    ScoreOverflow { width: u8 },

    #[error("inconsistent trace bounds: query {query_begin}..={query_end}, reference {ref_begin}..={ref_end}")]
    InvalidTraceBounds {
        query_begin: usize,
        query_end: usize,
        ref_begin: usize,
        ref_end: usize,
    },

    #[error("{phase} reached score {found}, expected {expected}")]
    ScoreMismatch {
        phase: &'static str,
        expected: i32,
        found: i32,
    },

    #[error("unknown packed cigar operation code {code}")]
    UnknownCigarOp { code: u32 },
}

pub type SswResult<T> = Result<T, SswError>;
