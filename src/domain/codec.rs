//! Coordinate codecs: map an `(x, y)` cell coordinate to a hashable key.
//!
//! Three encodings share the [`CellKey`] contract so the neighbor engine and
//! stepper are written once:
//! - [`Coord`]: the native `(i64, i64)` tuple.
//! - [`StringKey`]: delimiter-joined decimal text such as `"3,-7"`.
//! - [`PackedKey`]: x in the high 16 bits and y in the low 16 bits of a `u32`.
//!
//! Packed keys only cover `[-32768, 32767]` per axis. [`CellKey::encode`]
//! rejects coordinates outside that range with [`Error::OutOfRange`];
//! [`PackedKey::encode_wrapping`] keeps the silent aliasing behaviour for
//! callers that explicitly want it. Neighbor offsets computed inside the
//! stepper wrap at the 16-bit boundary, so a packed world touching the edge
//! of the range behaves like a torus there. The unbounded encodings stop at
//! the edge of `i64` instead: a neighbor past it has no key.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};

/// An unbounded cell coordinate.
pub type Coord = (i64, i64);

pub const KEY_DELIMITER: char = ',';

/// Key type a [`World`](super::World) is stored under.
///
/// Implementations must be injective over their representable range:
/// `K::encode(x, y)?.decode() == (x, y)`.
pub trait CellKey: Clone + Eq + Hash + fmt::Debug + Send + Sync {
    /// Range-checked encoding.
    fn encode(x: i64, y: i64) -> Result<Self>;

    fn decode(&self) -> Coord;

    /// Key of the cell `(dx, dy)` away from this one, or `None` when that
    /// cell lies outside the plane the encoding covers.
    fn offset(&self, dx: i64, dy: i64) -> Option<Self>;
}

impl CellKey for Coord {
    #[inline]
    fn encode(x: i64, y: i64) -> Result<Self> {
        Ok((x, y))
    }

    #[inline]
    fn decode(&self) -> Coord {
        *self
    }

    #[inline]
    fn offset(&self, dx: i64, dy: i64) -> Option<Self> {
        Some((self.0.checked_add(dx)?, self.1.checked_add(dy)?))
    }
}

/// Human-readable key, `"x,y"`.
///
/// Equality and hashing use only the text. The parsed coordinate is kept
/// alongside so decoding a live key does not re-parse it.
#[derive(Clone, Debug)]
pub struct StringKey {
    text: String,
    coord: Coord,
}

impl StringKey {
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            text: format!("{x}{KEY_DELIMITER}{y}"),
            coord: (x, y),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Split a `"x,y"` key into its coordinate.
///
/// Fails on a wrong number of parts or a non-numeric component; a malformed
/// key is never coerced to the origin.
pub fn decode_string_key(key: &str) -> Result<Coord> {
    let mut parts = key.split(KEY_DELIMITER);
    let (Some(xs), Some(ys), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::parse(key, "expected exactly two components"));
    };
    let x = xs
        .parse::<i64>()
        .map_err(|e| Error::parse(key, format!("x component: {e}")))?;
    let y = ys
        .parse::<i64>()
        .map_err(|e| Error::parse(key, format!("y component: {e}")))?;
    Ok((x, y))
}

impl FromStr for StringKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = decode_string_key(s)?;
        Ok(Self::new(x, y))
    }
}

impl PartialEq for StringKey {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for StringKey {}

impl Hash for StringKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for StringKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl CellKey for StringKey {
    fn encode(x: i64, y: i64) -> Result<Self> {
        Ok(Self::new(x, y))
    }

    fn decode(&self) -> Coord {
        self.coord
    }

    fn offset(&self, dx: i64, dy: i64) -> Option<Self> {
        let (x, y) = self.coord;
        Some(Self::new(x.checked_add(dx)?, y.checked_add(dy)?))
    }
}

/// Bit-packed key: `(x << 16) | (y & 0xFFFF)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackedKey(u32);

impl PackedKey {
    pub const MIN: i64 = i16::MIN as i64;
    pub const MAX: i64 = i16::MAX as i64;

    /// Packs without bounds checking. Coordinates outside the 16-bit range
    /// alias to a different cell.
    #[inline]
    pub const fn encode_wrapping(x: i64, y: i64) -> Self {
        Self(((x as u32) << 16) | (y as u32 & 0xFFFF))
    }

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn to_bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn in_range(x: i64, y: i64) -> bool {
        x >= Self::MIN && x <= Self::MAX && y >= Self::MIN && y <= Self::MAX
    }
}

impl CellKey for PackedKey {
    fn encode(x: i64, y: i64) -> Result<Self> {
        if !Self::in_range(x, y) {
            return Err(Error::OutOfRange { x, y });
        }
        Ok(Self::encode_wrapping(x, y))
    }

    /// Sign-extends both 16-bit fields.
    #[inline]
    fn decode(&self) -> Coord {
        let x = (self.0 >> 16) as u16 as i16;
        let y = self.0 as u16 as i16;
        (x as i64, y as i64)
    }

    /// Always `Some`; wraps at the 16-bit boundary.
    #[inline]
    fn offset(&self, dx: i64, dy: i64) -> Option<Self> {
        let (x, y) = self.decode();
        Some(Self::encode_wrapping(x.wrapping_add(dx), y.wrapping_add(dy)))
    }
}
