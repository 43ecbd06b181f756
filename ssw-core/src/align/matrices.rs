use super::profile::{build_profile, Profile};
use super::types::ScoreWidth;
use crate::alphabets::{dna, Alphabet};
use crate::error::{SswError, SswResult};

/// Substitution policy over raw symbols.
pub trait Matcher {
    fn score(&self, reference: u8, query: u8) -> i8;
}

/// Case-insensitive identity scoring, optionally with a symbol that scores 0
/// against everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExactMatcher {
    pub match_score: i8,
    pub mismatch_score: i8,
    pub neutral: Option<u8>,
}

impl ExactMatcher {
    pub fn new(match_score: i8, mismatch_score: i8) -> Self {
        Self {
            match_score,
            mismatch_score,
            neutral: None,
        }
    }

    pub fn with_neutral(mut self, symbol: u8) -> Self {
        self.neutral = Some(symbol.to_ascii_uppercase());
        self
    }
}

impl Matcher for ExactMatcher {
    fn score(&self, reference: u8, query: u8) -> i8 {
        let (r, q) = (reference.to_ascii_uppercase(), query.to_ascii_uppercase());
        if self.neutral.is_some_and(|n| n == r || n == q) {
            0
        } else if r == q {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// Matches when the query base is one of the bases the reference code
/// stands for. Swapping query and reference changes the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IupacMatcher {
    pub match_score: i8,
    pub mismatch_score: i8,
}

impl IupacMatcher {
    pub fn new(match_score: i8, mismatch_score: i8) -> Self {
        Self {
            match_score,
            mismatch_score,
        }
    }
}

impl Matcher for IupacMatcher {
    fn score(&self, reference: u8, query: u8) -> i8 {
        if dna::covers(reference, query) {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

/// Square table, row-major, rows indexed by reference symbol and columns by
/// query symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreMatrix {
    alphabet: Alphabet,
    scores: Vec<i8>,
}

impl ScoreMatrix {
    pub fn from_matcher(alphabet: Alphabet, matcher: &dyn Matcher) -> Self {
        let symbols = alphabet.symbols();
        let scores = symbols
            .iter()
            .flat_map(|&r| symbols.iter().map(move |&q| matcher.score(r, q)))
            .collect();
        Self { alphabet, scores }
    }

    pub fn from_scores(alphabet: Alphabet, scores: Vec<i8>) -> SswResult<Self> {
        let expected = alphabet.len() * alphabet.len();
        if scores.len() != expected {
            return Err(SswError::MatrixShape {
                expected,
                found: scores.len(),
            });
        }
        Ok(Self { alphabet, scores })
    }

    /// `AGTCN` with `N` neutral.
    pub fn dna(match_score: i8, mismatch_score: i8) -> Self {
        let matcher = ExactMatcher::new(match_score, mismatch_score).with_neutral(b'N');
        Self::from_matcher(dna::alphabet(), &matcher)
    }

    pub fn iupac(match_score: i8, mismatch_score: i8) -> Self {
        Self::from_matcher(
            dna::iupac_alphabet(),
            &IupacMatcher::new(match_score, mismatch_score),
        )
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn scores(&self) -> &[i8] {
        &self.scores
    }

    #[inline]
    pub fn score(&self, reference: u8, query: u8) -> i8 {
        self.scores[reference as usize * self.alphabet.len() + query as usize]
    }

    pub fn encode(&self, seq: &[u8]) -> SswResult<Vec<u8>> {
        self.alphabet.encode(seq)
    }

    pub fn profile(&self, query: &[u8], width: ScoreWidth) -> SswResult<Profile> {
        let codes = self.encode(query)?;
        build_profile(&codes, self.alphabet.len(), &self.scores, width)
    }
}

impl Default for ScoreMatrix {
    fn default() -> Self {
        Self::dna(2, -2)
    }
}
