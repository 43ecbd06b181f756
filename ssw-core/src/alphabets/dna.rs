use crate::alphabets::Alphabet;
use std::sync::LazyLock;

/// Default nucleotide alphabet; `N` is scored neutrally by the default matrix.
pub const DNA_SYMBOLS: &[u8] = b"AGTCN";

/// IUPAC nucleotide codes, concrete bases first.
pub const IUPAC_SYMBOLS: &[u8] = b"AGCTUMRYSWKBDHVN";

/// (code, complement, bases the code stands for)
const IUPAC_TABLE: &[(u8, u8, &[u8])] = &[
    (b'A', b'T', b"A"),
    (b'G', b'C', b"G"),
    (b'C', b'G', b"C"),
    (b'T', b'A', b"T"),
    (b'U', b'A', b"T"),
    (b'M', b'K', b"AC"),
    (b'R', b'Y', b"AG"),
    (b'Y', b'R', b"CT"),
    (b'S', b'S', b"CG"),
    (b'W', b'W', b"AT"),
    (b'K', b'M', b"GT"),
    (b'B', b'V', b"CGT"),
    (b'D', b'H', b"AGT"),
    (b'H', b'D', b"ACT"),
    (b'V', b'B', b"ACG"),
    (b'N', b'N', b"AGCT"),
];

pub fn alphabet() -> Alphabet {
    Alphabet::new(DNA_SYMBOLS).expect("DNA alphabet is non-empty and unique")
}

pub fn iupac_alphabet() -> Alphabet {
    Alphabet::new(IUPAC_SYMBOLS).expect("IUPAC alphabet is non-empty and unique")
}

static COMPLEMENT: LazyLock<[u8; 256]> = LazyLock::new(|| {
    let mut comp = [0; 256];
    comp.iter_mut().enumerate().for_each(|(v, a)| {
        *a = v as u8;
    });
    for &(code, complement, _) in IUPAC_TABLE {
        comp[code as usize] = complement;
        comp[code.to_ascii_lowercase() as usize] = complement.to_ascii_lowercase();
    }
    comp
});

// Bit set over A=1, C=2, G=4, T=8 for each code; zero for non-nucleotides.
static BASES: LazyLock<[u8; 256]> = LazyLock::new(|| {
    let mut bits = [0u8; 256];
    for &(code, _, bases) in IUPAC_TABLE {
        let mask = bases.iter().fold(0u8, |acc, &b| acc | base_bit(b));
        bits[code as usize] = mask;
        bits[code.to_ascii_lowercase() as usize] = mask;
    }
    bits
});

fn base_bit(b: u8) -> u8 {
    match b {
        b'A' => 1,
        b'C' => 2,
        b'G' => 4,
        b'T' => 8,
        _ => 0,
    }
}

#[inline]
pub fn complement(a: u8) -> u8 {
    COMPLEMENT[a as usize]
}

pub fn reverse_complement(text: &[u8]) -> Vec<u8> {
    text.iter().rev().map(|&a| complement(a)).collect()
}

/// True when every base `query` stands for is one of the bases `code`
/// stands for. Not symmetric: `covers(b'M', b'A')` holds, `covers(b'A', b'M')`
/// does not.
#[inline]
pub fn covers(code: u8, query: u8) -> bool {
    let code_bits = BASES[code as usize];
    let query_bits = BASES[query as usize];
    query_bits != 0 && code_bits & query_bits == query_bits
}
