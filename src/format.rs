/*!
# Sparse Formats

A relation can be stored in three encodings:
- **COO**: parallel `row`/`col` arrays, one entry per edge,
- **CSR**: compressed by source vertex (out-edges),
- **CSC**: compressed by destination vertex (in-edges).

[`SparseFormat`] names a single encoding or a preference (`Any`, `Auto`) that accepts whatever a
construction produced. [`FormatSet`] is the bitmask of encodings materialized in a format cache
(bit 0 = COO, bit 1 = CSR, bit 2 = CSC).
*/

use std::{
    fmt::{Debug, Display},
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

use crate::error::{GraphError, Result};

/// Identifier of a sparse encoding or of a format preference.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SparseFormat {
    /// Coordinate list
    Coo,
    /// Compressed by source (out-edges)
    Csr,
    /// Compressed by destination (in-edges)
    Csc,
    /// Accept any encoding; never convert eagerly
    #[default]
    Any,
    /// Let the consumer pick lazily; never convert eagerly
    Auto,
}

impl SparseFormat {
    /// The three concrete encodings in bit order
    pub const CONCRETE: [SparseFormat; 3] = [SparseFormat::Coo, SparseFormat::Csr, SparseFormat::Csc];

    /// Returns the bitmask bit of a concrete encoding and `None` for `Any`/`Auto`
    pub const fn bit(self) -> Option<u8> {
        match self {
            SparseFormat::Coo => Some(1),
            SparseFormat::Csr => Some(2),
            SparseFormat::Csc => Some(4),
            SparseFormat::Any | SparseFormat::Auto => None,
        }
    }

    /// Returns *true* if the value names one of the three encodings
    pub const fn is_concrete(self) -> bool {
        self.bit().is_some()
    }

    /// Returns the encoding in which the reversed relation stores the same buffers.
    /// CSR and CSC swap, everything else is kept.
    pub const fn reversed(self) -> Self {
        match self {
            SparseFormat::Csr => SparseFormat::Csc,
            SparseFormat::Csc => SparseFormat::Csr,
            other => other,
        }
    }

    /// Returns `Ok(self)` for a concrete encoding and an [`GraphError::InvalidFormat`] otherwise
    pub fn concrete(self) -> Result<Self> {
        if self.is_concrete() {
            Ok(self)
        } else {
            Err(GraphError::InvalidFormat(format!(
                "{self} does not name a single encoding"
            )))
        }
    }
}

impl Display for SparseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SparseFormat::Coo => "coo",
            SparseFormat::Csr => "csr",
            SparseFormat::Csc => "csc",
            SparseFormat::Any => "any",
            SparseFormat::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for SparseFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "coo" => Ok(SparseFormat::Coo),
            "csr" => Ok(SparseFormat::Csr),
            "csc" => Ok(SparseFormat::Csc),
            "any" => Ok(SparseFormat::Any),
            "auto" => Ok(SparseFormat::Auto),
            _ => Err(GraphError::InvalidFormat(format!("unknown format name {s:?}"))),
        }
    }
}

/// Converts a single bitmask bit into its encoding
impl TryFrom<u8> for SparseFormat {
    type Error = GraphError;

    fn try_from(bit: u8) -> Result<Self> {
        match bit {
            1 => Ok(SparseFormat::Coo),
            2 => Ok(SparseFormat::Csr),
            4 => Ok(SparseFormat::Csc),
            _ => Err(GraphError::InvalidFormat(format!("{bit} is not a format bit"))),
        }
    }
}

/// Bitmask of materialized encodings.
///
/// # Examples
/// ```
/// use relgraph::format::{FormatSet, SparseFormat};
///
/// let mut set = FormatSet::from(SparseFormat::Csr);
/// set |= SparseFormat::Coo;
///
/// assert_eq!(set, 3);
/// assert!(set.contains(SparseFormat::Coo));
/// assert!(!set.contains(SparseFormat::Csc));
/// assert_eq!(format!("{set}"), "COO|CSR");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct FormatSet(u8);

impl FormatSet {
    pub const EMPTY: FormatSet = FormatSet(0);
    pub const COO: FormatSet = FormatSet(1);
    pub const CSR: FormatSet = FormatSet(2);
    pub const CSC: FormatSet = FormatSet(4);
    pub const ALL: FormatSet = FormatSet(7);

    /// Returns the set for raw bits or `None` if bits beyond the three formats are set
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL.0 == 0 {
            Some(FormatSet(bits))
        } else {
            None
        }
    }

    /// Returns the raw bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns *true* if no format is contained
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns *true* if the encoding is contained. Always *false* for `Any`/`Auto`.
    pub const fn contains(self, format: SparseFormat) -> bool {
        match format.bit() {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }

    /// Returns *true* if every format of `other` is also in `self`
    pub const fn is_superset_of(self, other: FormatSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the number of contained formats
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns the set as seen by the reversed relation (CSR and CSC bits swapped)
    pub const fn reversed(self) -> Self {
        let coo = self.0 & 1;
        let csr = (self.0 >> 1) & 1;
        let csc = (self.0 >> 2) & 1;
        FormatSet(coo | (csc << 1) | (csr << 2))
    }

    /// Iterates over the contained encodings in bit order
    pub fn iter(self) -> impl Iterator<Item = SparseFormat> {
        SparseFormat::CONCRETE
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}

impl From<SparseFormat> for FormatSet {
    fn from(format: SparseFormat) -> Self {
        FormatSet(format.bit().unwrap_or(0))
    }
}

impl BitOr for FormatSet {
    type Output = FormatSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        FormatSet(self.0 | rhs.0)
    }
}

impl BitOr<SparseFormat> for FormatSet {
    type Output = FormatSet;

    fn bitor(self, rhs: SparseFormat) -> Self::Output {
        self | FormatSet::from(rhs)
    }
}

impl BitOrAssign<SparseFormat> for FormatSet {
    fn bitor_assign(&mut self, rhs: SparseFormat) {
        *self = *self | rhs;
    }
}

impl PartialEq<u8> for FormatSet {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl Display for FormatSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("EMPTY");
        }

        let mut first = true;
        for (format, name) in SparseFormat::CONCRETE.into_iter().zip(["COO", "CSR", "CSC"]) {
            if self.contains(format) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl Debug for FormatSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FormatSet({self})")
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn parse_format_names() {
        for format in [
            SparseFormat::Coo,
            SparseFormat::Csr,
            SparseFormat::Csc,
            SparseFormat::Any,
            SparseFormat::Auto,
        ] {
            assert_eq!(format.to_string().parse::<SparseFormat>(), Ok(format));
        }

        assert_eq!("CSR".parse::<SparseFormat>(), Ok(SparseFormat::Csr));
        assert!(matches!(
            "dense".parse::<SparseFormat>(),
            Err(GraphError::InvalidFormat(_))
        ));
    }

    #[test]
    fn format_bits() {
        for bit in 0..=255u8 {
            match SparseFormat::try_from(bit) {
                Ok(format) => assert_eq!(format.bit(), Some(bit)),
                Err(err) => {
                    assert!(![1, 2, 4].contains(&bit));
                    assert!(matches!(err, GraphError::InvalidFormat(_)));
                }
            }
        }

        assert!(SparseFormat::Any.concrete().is_err());
        assert_eq!(SparseFormat::Csc.concrete(), Ok(SparseFormat::Csc));
    }

    #[test]
    fn reversed_swaps_compressed_bits() {
        for bits in 0..8u8 {
            let set = FormatSet::from_bits(bits).unwrap();
            let rev = set.reversed();

            assert_eq!(rev.reversed(), set);
            assert_eq!(rev.len(), set.len());
            assert_eq!(rev.contains(SparseFormat::Coo), set.contains(SparseFormat::Coo));
            assert_eq!(rev.contains(SparseFormat::Csr), set.contains(SparseFormat::Csc));
            assert_eq!(rev.contains(SparseFormat::Csc), set.contains(SparseFormat::Csr));
        }

        assert_eq!(FormatSet::from_bits(8), None);
    }

    #[test]
    fn iterate_and_display() {
        assert_eq!(
            FormatSet::ALL.iter().collect_vec(),
            SparseFormat::CONCRETE.to_vec()
        );
        assert_eq!((FormatSet::CSC | SparseFormat::Coo).to_string(), "COO|CSC");
        assert_eq!(FormatSet::EMPTY.to_string(), "EMPTY");
        assert!(FormatSet::ALL.is_superset_of(FormatSet::CSR | FormatSet::CSC));
        assert!(!FormatSet::CSR.is_superset_of(FormatSet::CSC));
    }
}
