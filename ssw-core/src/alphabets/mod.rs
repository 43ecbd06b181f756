pub mod dna;

use crate::error::{SswError, SswResult};

const UNMAPPED: u8 = 255;

/// Ordered symbol table. Each symbol maps to its position; lookup is
/// case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    map: [u8; 256],
}

impl Alphabet {
    pub fn new(symbols: &[u8]) -> SswResult<Self> {
        if symbols.is_empty() {
            return Err(SswError::EmptyAlphabet);
        }
        // Case folding leaves at most 230 distinct symbols, so indices never reach UNMAPPED.
        let mut map = [UNMAPPED; 256];
        let mut ordered = Vec::with_capacity(symbols.len());
        for (i, &b) in symbols.iter().enumerate() {
            let upper = b.to_ascii_uppercase();
            if map[upper as usize] != UNMAPPED {
                return Err(SswError::DuplicateSymbol { ch: upper as char });
            }
            map[upper as usize] = i as u8;
            map[upper.to_ascii_lowercase() as usize] = i as u8;
            ordered.push(upper);
        }
        Ok(Self {
            symbols: ordered,
            map,
        })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    #[inline]
    pub fn index(&self, symbol: u8) -> Option<u8> {
        match self.map[symbol as usize] {
            UNMAPPED => None,
            idx => Some(idx),
        }
    }

    pub fn symbol(&self, index: u8) -> Option<u8> {
        self.symbols.get(index as usize).copied()
    }

    pub fn encode(&self, seq: &[u8]) -> SswResult<Vec<u8>> {
        seq.iter()
            .enumerate()
            .map(|(pos, &b)| {
                self.index(b).ok_or(SswError::UnknownSymbol { ch: b as char, pos })
            })
            .collect()
    }
}
