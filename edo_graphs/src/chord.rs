// Chords as binary necklaces over an equal division of the octave.
//
// A `Chord` is a fixed-length bit string: position `p` is active when pitch
// class `p` (in steps of the EDO) sounds. Two chords related by a cyclic
// rotation are transpositions of one another, so most of the graph builder
// works on rotation classes:
//
// - `all_rotations` lists the left rotations in order, rotation 0 first.
// - `smallest_rotation` picks the lexicographically least rotation; this is
//   the canonical representative used to deduplicate chord shapes.
// - `interval_neighbors` moves one active note by a fixed offset.
//
// The separate "encoding rotation" used to build textual symbols lives in
// `symbol.rs`; it is not the same rotation as `smallest_rotation`.

use std::fmt;
use std::str::FromStr;

/// A chord in an N-EDO tuning system. Ordering is lexicographic with
/// inactive < active, matching a `0`/`1` string comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chord {
    bits: Vec<bool>,
}

impl Chord {
    pub fn new(bits: Vec<bool>) -> Self {
        Chord { bits }
    }

    /// The all-inactive chord of length `edo`.
    pub fn silent(edo: usize) -> Self {
        Chord {
            bits: vec![false; edo],
        }
    }

    /// Build a chord from its active pitch classes. Positions are taken mod `edo`.
    pub fn from_positions(edo: usize, positions: &[usize]) -> Self {
        let mut bits = vec![false; edo];
        if edo > 0 {
            for &p in positions {
                bits[p % edo] = true;
            }
        }
        Chord { bits }
    }

    pub fn edo(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn is_active(&self, position: usize) -> bool {
        self.bits[position]
    }

    /// Number of active positions.
    pub fn cardinality(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Rotation by `n` to the left: position `n` becomes position 0.
    pub fn rotated_left(&self, n: usize) -> Chord {
        if self.bits.is_empty() {
            return self.clone();
        }
        let mut bits = self.bits.clone();
        bits.rotate_left(n % self.bits.len());
        Chord { bits }
    }

    /// Rotation by `n` to the right; undoes `rotated_left(n)`.
    pub fn rotated_right(&self, n: usize) -> Chord {
        if self.bits.is_empty() {
            return self.clone();
        }
        let mut bits = self.bits.clone();
        bits.rotate_right(n % self.bits.len());
        Chord { bits }
    }

    /// The bit string read back to front.
    pub fn reversed(&self) -> Chord {
        Chord {
            bits: self.bits.iter().rev().copied().collect(),
        }
    }

    /// All `edo` left rotations, starting with the chord itself. Symmetric
    /// chords repeat.
    pub fn all_rotations(&self) -> Vec<Chord> {
        (0..self.bits.len()).map(|i| self.rotated_left(i)).collect()
    }

    /// The lexicographically smallest rotation: the canonical member of the
    /// rotation class.
    pub fn smallest_rotation(&self) -> Chord {
        self.all_rotations()
            .into_iter()
            .min()
            .unwrap_or_else(|| self.clone())
    }

    /// Chords reached by moving one active note from `p` to `(p + offset) mod
    /// edo`, wherever the destination is free. Cardinality is unchanged.
    pub fn interval_neighbors(&self, offset: i64) -> Vec<Chord> {
        let edo = self.bits.len();
        if edo == 0 {
            return Vec::new();
        }
        let shift = offset.rem_euclid(edo as i64) as usize;
        let mut neighbors = Vec::new();
        for p in 0..edo {
            let target = (p + shift) % edo;
            if self.bits[p] && !self.bits[target] {
                let mut bits = self.bits.clone();
                bits[p] = false;
                bits[target] = true;
                neighbors.push(Chord { bits });
            }
        }
        neighbors
    }

    /// Every chord of length `edo` with exactly `size` active positions, in
    /// lexicographic order of their active-position lists.
    pub fn all_with_cardinality(edo: usize, size: usize) -> Vec<Chord> {
        if size > edo {
            return Vec::new();
        }
        let mut chords = Vec::new();
        let mut positions: Vec<usize> = (0..size).collect();
        loop {
            chords.push(Chord::from_positions(edo, &positions));

            // Advance to the next combination: bump the rightmost position
            // that still has room, then reset everything after it.
            let Some(i) = (0..size).rev().find(|&i| positions[i] < edo - size + i) else {
                return chords;
            };
            positions[i] += 1;
            for j in i + 1..size {
                positions[j] = positions[j - 1] + 1;
            }
        }
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.bits {
            f.write_str(if b { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Chord {
    type Err = char;

    /// Parse a `0`/`1` string. The error is the first offending character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Chord::new)
    }
}
