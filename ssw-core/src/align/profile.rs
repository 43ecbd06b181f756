use super::types::ScoreWidth;
use crate::error::{SswError, SswResult};
use std::sync::OnceLock;
use wide::{i16x8, u8x16};

/// Lane operations the striped kernel needs from a vector type.
pub(crate) trait StripeVector: Copy + Send + Sync {
    const LANES: usize;
    /// Raw lane value at which saturating arithmetic stops being exact.
    const CEILING: i32;
    const BITS: u8;
    /// Lowest value gap scores carry; stays far from the saturation edge.
    const FLOOR: i32;

    fn splat(v: i32) -> Self;
    fn from_lanes(lanes: &[i32]) -> Self;
    fn sat_add(self, other: Self) -> Self;
    fn sat_sub(self, other: Self) -> Self;
    fn lane_max(self, other: Self) -> Self;
    fn lane_min(self, other: Self) -> Self;
    fn lane(self, lane: usize) -> i32;
    fn hmax(self) -> i32;
    fn any_gt(self, other: Self) -> bool;
    /// Moves every lane up by one, inserting `insert` into lane 0.
    fn shift_lanes(self, insert: i32) -> Self;
}

pub(crate) type NarrowVector = u8x16;
pub(crate) type WideVector = i16x8;

impl StripeVector for u8x16 {
    const LANES: usize = 16;
    const CEILING: i32 = u8::MAX as i32;
    const BITS: u8 = 8;
    const FLOOR: i32 = 0;

    #[inline]
    fn splat(v: i32) -> Self {
        u8x16::splat(v.clamp(0, u8::MAX as i32) as u8)
    }

    fn from_lanes(lanes: &[i32]) -> Self {
        let mut arr = [0u8; 16];
        for (slot, &v) in arr.iter_mut().zip(lanes) {
            *slot = v.clamp(0, u8::MAX as i32) as u8;
        }
        u8x16::from(arr)
    }

    #[inline]
    fn sat_add(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    #[inline]
    fn sat_sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }

    #[inline]
    fn lane_max(self, other: Self) -> Self {
        self.max(other)
    }

    #[inline]
    fn lane_min(self, other: Self) -> Self {
        self.min(other)
    }

    #[inline]
    fn lane(self, lane: usize) -> i32 {
        self.to_array()[lane] as i32
    }

    #[inline]
    fn hmax(self) -> i32 {
        self.to_array().iter().copied().max().unwrap_or(0) as i32
    }

    #[inline]
    fn any_gt(self, other: Self) -> bool {
        let (a, b) = (self.to_array(), other.to_array());
        a.iter().zip(b.iter()).any(|(x, y)| x > y)
    }

    #[inline]
    fn shift_lanes(self, insert: i32) -> Self {
        let mut arr = self.to_array();
        arr.copy_within(0..15, 1);
        arr[0] = insert.clamp(0, u8::MAX as i32) as u8;
        u8x16::from(arr)
    }
}

impl StripeVector for i16x8 {
    const LANES: usize = 8;
    const CEILING: i32 = i16::MAX as i32;
    const BITS: u8 = 16;
    const FLOOR: i32 = i16::MIN as i32 / 2;

    #[inline]
    fn splat(v: i32) -> Self {
        i16x8::splat(v.clamp(i16::MIN as i32, i16::MAX as i32) as i16)
    }

    fn from_lanes(lanes: &[i32]) -> Self {
        let mut arr = [0i16; 8];
        for (slot, &v) in arr.iter_mut().zip(lanes) {
            *slot = v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
        i16x8::from(arr)
    }

    #[inline]
    fn sat_add(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    #[inline]
    fn sat_sub(self, other: Self) -> Self {
        self.saturating_sub(other)
    }

    #[inline]
    fn lane_max(self, other: Self) -> Self {
        self.max(other)
    }

    #[inline]
    fn lane_min(self, other: Self) -> Self {
        self.min(other)
    }

    #[inline]
    fn lane(self, lane: usize) -> i32 {
        self.to_array()[lane] as i32
    }

    #[inline]
    fn hmax(self) -> i32 {
        self.to_array().iter().copied().max().unwrap_or(0) as i32
    }

    #[inline]
    fn any_gt(self, other: Self) -> bool {
        let (a, b) = (self.to_array(), other.to_array());
        a.iter().zip(b.iter()).any(|(x, y)| x > y)
    }

    #[inline]
    fn shift_lanes(self, insert: i32) -> Self {
        let mut arr = self.to_array();
        arr.copy_within(0..7, 1);
        arr[0] = insert.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        i16x8::from(arr)
    }
}

/// Query scores laid out lane-major: query position `lane * seg_len + seg`
/// lives in vector `seg` of the block for each reference symbol.
pub(crate) struct StripedProfile<V> {
    pub(crate) vectors: Vec<V>,
    pub(crate) seg_len: usize,
    pub(crate) query_len: usize,
    pub(crate) bias: i32,
    /// Per-segment caps for lanes past the end of the query, `None` when
    /// every lane holds a query position.
    pub(crate) padding: Option<PaddingCaps<V>>,
}

/// Real lanes are capped at the lane ceiling; padding lanes hold H at 0 and
/// E at the floor.
pub(crate) struct PaddingCaps<V> {
    pub(crate) h: Vec<V>,
    pub(crate) e: Vec<V>,
}

impl<V: StripeVector> StripedProfile<V> {
    /// Every stored value is `score + bias`; padding lanes score 0.
    pub(crate) fn build(query: &[u8], scores: &[i8], alphabet_size: usize, bias: i32) -> Self {
        let m = query.len();
        let seg_len = m.div_ceil(V::LANES);
        let mut vectors = Vec::with_capacity(alphabet_size * seg_len);
        let mut lane_vals = vec![0i32; V::LANES];
        for a in 0..alphabet_size {
            let row = &scores[a * alphabet_size..(a + 1) * alphabet_size];
            for seg in 0..seg_len {
                for (lane, slot) in lane_vals.iter_mut().enumerate() {
                    let idx = lane * seg_len + seg;
                    *slot = if idx < m {
                        row[query[idx] as usize] as i32 + bias
                    } else {
                        bias
                    };
                }
                vectors.push(V::from_lanes(&lane_vals));
            }
        }
        let padding = (seg_len * V::LANES > m).then(|| {
            let mut h = Vec::with_capacity(seg_len);
            let mut e = Vec::with_capacity(seg_len);
            for seg in 0..seg_len {
                let real = |lane: usize| lane * seg_len + seg < m;
                let h_lanes: Vec<i32> = (0..V::LANES)
                    .map(|lane| if real(lane) { V::CEILING } else { 0 })
                    .collect();
                let e_lanes: Vec<i32> = (0..V::LANES)
                    .map(|lane| if real(lane) { V::CEILING } else { V::FLOOR })
                    .collect();
                h.push(V::from_lanes(&h_lanes));
                e.push(V::from_lanes(&e_lanes));
            }
            PaddingCaps { h, e }
        });
        Self {
            vectors,
            seg_len,
            query_len: m,
            bias,
            padding,
        }
    }

    #[inline]
    pub(crate) fn scores_for(&self, symbol: u8) -> &[V] {
        let base = symbol as usize * self.seg_len;
        &self.vectors[base..base + self.seg_len]
    }
}

/// Query profile shared by every alignment against the same query. Read-only
/// once built; the wide layout is built on first use.
pub struct Profile {
    query: Vec<u8>,
    scores: Vec<i8>,
    alphabet_size: usize,
    width: ScoreWidth,
    narrow: Option<StripedProfile<NarrowVector>>,
    wide: OnceLock<StripedProfile<WideVector>>,
}

/// Validates the inputs and lays out the query for the requested width.
pub fn build_profile(
    query: &[u8],
    alphabet_size: usize,
    scores: &[i8],
    width: ScoreWidth,
) -> SswResult<Profile> {
    if alphabet_size == 0 {
        return Err(SswError::EmptyAlphabet);
    }
    if query.is_empty() {
        return Err(SswError::EmptyQuery);
    }
    let expected = alphabet_size * alphabet_size;
    if scores.len() != expected {
        return Err(SswError::MatrixShape {
            expected,
            found: scores.len(),
        });
    }
    check_symbols(query, alphabet_size)?;

    let bias = scores.iter().map(|&s| -(s as i32)).max().unwrap_or(0).max(0);
    let narrow = match width {
        ScoreWidth::Narrow | ScoreWidth::Adaptive => Some(StripedProfile::build(
            query,
            scores,
            alphabet_size,
            bias,
        )),
        ScoreWidth::Wide => None,
    };
    let wide = OnceLock::new();
    if width == ScoreWidth::Wide {
        let _ = wide.set(StripedProfile::build(query, scores, alphabet_size, 0));
    }
    Ok(Profile {
        query: query.to_vec(),
        scores: scores.to_vec(),
        alphabet_size,
        width,
        narrow,
        wide,
    })
}

pub(crate) fn check_symbols(seq: &[u8], alphabet_size: usize) -> SswResult<()> {
    match seq.iter().position(|&s| s as usize >= alphabet_size) {
        Some(pos) => Err(SswError::SymbolOutOfRange {
            symbol: seq[pos],
            pos,
            alphabet_size,
        }),
        None => Ok(()),
    }
}

impl Profile {
    pub fn query(&self) -> &[u8] {
        &self.query
    }

    pub fn scores(&self) -> &[i8] {
        &self.scores
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    pub fn width(&self) -> ScoreWidth {
        self.width
    }

    pub fn len(&self) -> usize {
        self.query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    #[inline]
    pub(crate) fn score(&self, reference: u8, query: u8) -> i32 {
        self.scores[reference as usize * self.alphabet_size + query as usize] as i32
    }

    pub(crate) fn narrow(&self) -> Option<&StripedProfile<NarrowVector>> {
        self.narrow.as_ref()
    }

    pub(crate) fn wide(&self) -> &StripedProfile<WideVector> {
        self.wide.get_or_init(|| {
            StripedProfile::build(&self.query, &self.scores, self.alphabet_size, 0)
        })
    }

    #[cfg(test)]
    pub(crate) fn has_wide(&self) -> bool {
        self.wide.get().is_some()
    }
}
