// Compact textual symbols for chords.
//
// A symbol names a chord by its *shape* (the cycle of gaps between active
// notes) plus, optionally, which rotation of that shape is meant:
//
//   100010010000  (C major in 12-EDO)  ->  "324"
//   001000100100  (D major)            ->  "324.2"
//
// Each gap is one base-62 digit (`0-9A-Za-z`), so run lengths and rotation
// indices are limited to 0..=61. The shape is taken from the *encoding
// rotation*: the rotation whose reverse, read as a binary number, is smallest.
// That rotation always starts on an active note and ends on the longest run of
// inactive ones, which makes the final digit redundant; `truncated()` drops it
// and `decode` still recovers the chord for two or more notes.
//
// `Symbol` keeps the "has a rotation suffix" distinction as an enum rather than
// something callers have to sniff out of the text.

use crate::chord::Chord;
use crate::error::CodecError;
use std::cmp::Ordering;
use std::fmt;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Largest value one base-62 digit can hold.
pub const MAX_DIGIT: usize = 61;

/// The base-62 character for `value`, if it fits one digit.
pub fn digit(value: usize) -> Option<char> {
    ALPHABET.get(value).map(|&b| char::from(b))
}

/// The value of one base-62 character.
pub fn digit_value(c: char) -> Result<usize, CodecError> {
    match c {
        '0'..='9' => Ok(c as usize - '0' as usize),
        'A'..='Z' => Ok(c as usize - 'A' as usize + 10),
        'a'..='z' => Ok(c as usize - 'a' as usize + 36),
        other => Err(CodecError::InvalidDigit(other)),
    }
}

pub fn to_base62(mut n: usize) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(ALPHABET[n % 62]);
        n /= 62;
        if n == 0 {
            break;
        }
    }
    digits.iter().rev().map(|&b| char::from(b)).collect()
}

/// Parse a base-62 number. Values too large for `usize` saturate; callers
/// range-check the result against the EDO anyway.
pub fn from_base62(s: &str) -> Result<usize, CodecError> {
    s.chars().try_fold(0usize, |acc, c| {
        Ok(acc.saturating_mul(62).saturating_add(digit_value(c)?))
    })
}

/// A chord symbol: a bare shape, or a shape with the index of the rotation it
/// denotes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Canonical(String),
    Rotated(String, usize),
}

impl Symbol {
    /// Parse symbol text. Without a `.` the text is a bare shape when
    /// `simplify` is set and an error otherwise.
    pub fn parse(text: &str, simplify: bool) -> Result<Symbol, CodecError> {
        let symbol = match text.split_once('.') {
            None if simplify => Symbol::Canonical(text.to_string()),
            None => return Err(CodecError::MissingRotation(text.to_string())),
            Some((_, "")) => return Err(CodecError::EmptyRotation(text.to_string())),
            Some((shape, suffix)) => Symbol::Rotated(shape.to_string(), from_base62(suffix)?),
        };
        for c in symbol.shape().chars() {
            digit_value(c)?;
        }
        Ok(symbol)
    }

    /// The run-length digits, without any rotation suffix.
    pub fn shape(&self) -> &str {
        match self {
            Symbol::Canonical(shape) | Symbol::Rotated(shape, _) => shape,
        }
    }

    /// Rotation index; a bare shape means rotation 0.
    pub fn rotation(&self) -> usize {
        match self {
            Symbol::Canonical(_) => 0,
            Symbol::Rotated(_, index) => *index,
        }
    }

    /// The same symbol with the last shape digit dropped. The rotation suffix,
    /// if any, is kept.
    pub fn truncated(&self) -> Symbol {
        let trim = |shape: &str| {
            let mut s = shape.to_string();
            s.pop();
            s
        };
        match self {
            Symbol::Canonical(shape) => Symbol::Canonical(trim(shape)),
            Symbol::Rotated(shape, index) => Symbol::Rotated(trim(shape), *index),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Canonical(shape) => f.write_str(shape),
            Symbol::Rotated(shape, index) => write!(f, "{shape}.{}", to_base62(*index)),
        }
    }
}

/// Compare two equal-length chords as if each were reversed and read as a
/// binary number: position 0 is the least significant bit.
fn cmp_reversed(a: &Chord, b: &Chord) -> Ordering {
    a.bits().iter().rev().cmp(b.bits().iter().rev())
}

/// Encode a chord. The shape comes from the rotation with the smallest
/// reversed value (first one wins ties); its index is attached unless
/// `simplify` is set and the index is 0.
pub fn encode(chord: &Chord, simplify: bool) -> Result<Symbol, CodecError> {
    let rotations = chord.all_rotations();
    let mut index = 0;
    for (i, rotation) in rotations.iter().enumerate().skip(1) {
        if cmp_reversed(rotation, &rotations[index]) == Ordering::Less {
            index = i;
        }
    }

    let mut shape = String::new();
    if let Some(best) = rotations.get(index) {
        let bits = best.bits();
        let mut seen_active = false;
        let mut run = 0;
        // One wrap-around character closes the final gap.
        for &active in bits.iter().chain(bits.first()) {
            if !active {
                run += 1;
                continue;
            }
            if seen_active {
                shape.push(digit(run).ok_or(CodecError::RunTooLong { run })?);
            }
            seen_active = true;
            run = 0;
        }
    }

    Ok(if simplify && index == 0 {
        Symbol::Canonical(shape)
    } else {
        Symbol::Rotated(shape, index)
    })
}

/// Decode a symbol back to a chord of length `edo`.
///
/// The shape is expanded gap by gap after a leading active note. A complete
/// shape overshoots by its closing note, which is dropped; a truncated one
/// falls short and is padded with inactive positions. The result is then
/// rotated right by the symbol's rotation index.
pub fn decode(symbol: &Symbol, edo: usize) -> Result<Chord, CodecError> {
    let index = symbol.rotation();
    if index >= edo.max(1) {
        return Err(CodecError::RotationOutOfRange { index, edo });
    }
    let shape = symbol.shape();
    if shape.is_empty() {
        return Ok(Chord::silent(edo));
    }

    let mut bits = vec![true];
    for c in shape.chars() {
        let run = digit_value(c)?;
        bits.extend(std::iter::repeat_n(false, run));
        bits.push(true);
    }
    if bits.len() > edo {
        bits.pop();
    }
    if bits.len() > edo {
        return Err(CodecError::Overflow {
            shape: shape.to_string(),
            len: bits.len(),
            edo,
        });
    }
    bits.resize(edo, false);
    Ok(Chord::new(bits).rotated_right(index))
}

/// Parse symbol text and decode it in one step.
pub fn decode_str(text: &str, edo: usize, simplify: bool) -> Result<Chord, CodecError> {
    decode(&Symbol::parse(text, simplify)?, edo)
}
