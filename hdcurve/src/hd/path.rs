//! Derivation paths such as `m/44'/60'/0'/0/0`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Index offset for hardened children (2^31)
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A child index; values at or above [`HARDENED_OFFSET`] are hardened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct ChildIndex(u32);

impl ChildIndex {
    /// Normal child `index` (must be below 2^31)
    pub fn normal(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidPath(format!("normal index {index} out of range")));
        }
        Ok(Self(index))
    }

    /// Hardened child `index'` (must be below 2^31)
    pub fn hardened(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidPath(format!("hardened index {index} out of range")));
        }
        Ok(Self(index | HARDENED_OFFSET))
    }

    /// The raw 32-bit value, hardened flag included
    pub fn raw(self) -> u32 {
        self.0
    }

    /// The index without the hardened flag
    pub fn index(self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }

    pub fn is_hardened(self) -> bool {
        self.0 & HARDENED_OFFSET != 0
    }

    /// The following index in the same range, if any
    pub fn next(self) -> Option<Self> {
        let index = self.index().checked_add(1).filter(|i| *i < HARDENED_OFFSET)?;
        Some(Self(index | (self.0 & HARDENED_OFFSET)))
    }
}

impl From<u32> for ChildIndex {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ChildIndex> for u32 {
    fn from(index: ChildIndex) -> Self {
        index.0
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildIndex {
    type Err = Error;

    /// Decimal index with an optional `'`, `h` or `H` hardened suffix
    fn from_str(segment: &str) -> Result<Self> {
        let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
            Some(digits) => (digits, true),
            None => (segment, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPath(format!("invalid path segment '{segment}'")));
        }

        let index = digits
            .parse::<u32>()
            .map_err(|_| Error::InvalidPath(format!("path segment '{segment}' out of range")))?;
        if hardened {
            Self::hardened(index)
        } else {
            Self::normal(index)
        }
    }
}

/// An ordered list of child indices from some root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<ChildIndex>,
}

impl DerivationPath {
    /// The empty path `m`
    pub fn root() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[ChildIndex] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// This path extended by one index
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { indices }
    }

    pub fn iter(&self) -> impl Iterator<Item = ChildIndex> + '_ {
        self.indices.iter().copied()
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidPath("empty path".to_string()));
        }

        let mut segments = path.split('/').peekable();
        if segments.peek() == Some(&"m") {
            segments.next();
        }

        let indices = segments
            .map(ChildIndex::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { indices })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl FromIterator<ChildIndex> for DerivationPath {
    fn from_iter<I: IntoIterator<Item = ChildIndex>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildIndex;
    type IntoIter = std::slice::Iter<'a, ChildIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}
