//! Seeded pseudo-randomness for reproducible jitter.
//!
//! [`seeded_random`] is a pure function from an integer seed to a value in
//! [0, 1): the same seed gives the same value on every platform and every
//! call. Grid jitter keys it by `seed + position_hash(cell)`, so one logical
//! grid cell always moves by the same offset regardless of render resolution
//! or iteration order.

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). Seed of 0 is automatically
/// replaced with a non-zero fallback to avoid the all-zeros fixed point.
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Fallback seed used when the caller provides 0, which is a fixed point
    /// of the xorshift algorithm.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` divided by 2^53 for
    /// full mantissa precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64 finalizer. Spreads nearby integers (consecutive seeds, adjacent
/// cells) across the whole 64-bit space before they seed the xorshift state.
fn mix(value: u64) -> u64 {
    let mut z = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Maps an integer seed to a reproducible value in [0, 1).
pub fn seeded_random(seed: i64) -> f64 {
    Xorshift64::new(mix(seed as u64)).next_f64()
}

/// Deterministic hash of a pre-rotation lattice cell.
///
/// Cells are lattice indices, not pixel coordinates, so the hash does not
/// depend on the output resolution.
pub fn position_hash(cell_x: i64, cell_y: i64) -> i64 {
    cell_x
        .wrapping_mul(73_856_093)
        .wrapping_add(cell_y.wrapping_mul(19_349_663))
}

/// Independent jitter factors for x and y, each in [-0.5, 0.5).
///
/// Multiply by `spacing * jitter` to get the positional offset of a cell.
pub fn jitter_factors(seed: i64, cell_x: i64, cell_y: i64) -> (f64, f64) {
    let key = seed.wrapping_add(position_hash(cell_x, cell_y));
    let mut rng = Xorshift64::new(mix(key as u64));
    let jx = rng.next_f64() - 0.5;
    let jy = rng.next_f64() - 0.5;
    (jx, jy)
}
