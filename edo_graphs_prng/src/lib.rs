// Seedable pseudo-random source for force-directed layout.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// The layout engine draws every initial node coordinate from a `LayoutRng`, so
// a run is fully reproducible from its `u64` seed. Only the binaries pick a
// seed from the clock; library code and tests always pass one explicitly.
//
// The generator is integer-only; the float helpers convert the top bits of a
// `u64` and never feed floats back into the state.

use std::time::{SystemTime, UNIX_EPOCH};

/// Xoshiro256++ generator seeded from a single `u64`.
#[derive(Clone, Debug)]
pub struct LayoutRng {
    s: [u64; 4],
}

impl LayoutRng {
    /// Create a generator from `seed`. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Derive a seed from the wall clock. Used at the application boundary
    /// when the user did not ask for a reproducible run.
    pub fn clock_seed() -> u64 {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let mut sm = (nanos as u64) ^ ((nanos >> 64) as u64) ^ u64::from(std::process::id());
        splitmix64(&mut sm)
    }

    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f64` in [0, 1), built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// A point drawn uniformly from the unit hypercube `[0, 1)^dimensions`.
    pub fn unit_point(&mut self, dimensions: usize) -> Vec<f64> {
        (0..dimensions).map(|_| self.next_f64()).collect()
    }
}

/// SplitMix64 step, used to spread a small seed over the 256-bit state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
