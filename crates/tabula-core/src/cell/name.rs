//! Cell names and the rules that admit them

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{Error, Result};

fn cell_name_re() -> &'static Regex {
    static CELL_NAME_RE: OnceLock<Regex> = OnceLock::new();
    CELL_NAME_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)([1-9][0-9]*)$").expect("cell name regex must compile")
    })
}

/// A normalized cell name such as `A1` or `ZZ301`
///
/// One or more ASCII letters followed by a number without leading zeros,
/// stored upper-cased. Names order lexically (`A10` sorts before `A2`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellName(String);

impl CellName {
    /// Parse and normalize a cell name without any extra validation rule
    ///
    /// # Examples
    /// ```
    /// use tabula_core::CellName;
    ///
    /// assert_eq!(CellName::parse("b12").unwrap().as_str(), "B12");
    /// assert!(CellName::parse("A0").is_err());
    /// assert!(CellName::parse("12").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, &NameValidator::AcceptAll)
    }

    /// Parse and normalize a cell name, then check it against `validator`
    pub fn parse_with(text: &str, validator: &NameValidator) -> Result<Self> {
        if !Self::is_well_formed(text) {
            return Err(Error::InvalidName(text.to_string()));
        }
        let normalized = text.to_ascii_uppercase();
        if !validator.is_valid(&normalized) {
            return Err(Error::InvalidName(normalized));
        }
        Ok(Self(normalized))
    }

    /// Whether `text` has the shape of a cell name (case-insensitive)
    pub fn is_well_formed(text: &str) -> bool {
        cell_name_re().is_match(text)
    }

    /// Wrap text already known to be a normalized, accepted name
    pub(crate) fn new_unchecked(normalized: String) -> Self {
        Self(normalized)
    }

    /// Name of the cell at a zero-based grid position
    ///
    /// ```
    /// use tabula_core::CellName;
    ///
    /// assert_eq!(CellName::from_grid(0, 0).as_str(), "A1");
    /// assert_eq!(CellName::from_grid(26, 9).as_str(), "AA10");
    /// ```
    pub fn from_grid(col: u32, row: u32) -> Self {
        Self(format!("{}{}", column_to_letters(col), u64::from(row) + 1))
    }

    /// Zero-based (column, row) of this name, if it fits in `u32`s
    pub fn grid_position(&self) -> Option<(u32, u32)> {
        let caps = cell_name_re().captures(&self.0)?;
        let col = letters_to_column(&caps[1])?;
        let row: u32 = caps[2].parse().ok()?;
        Some((col, row - 1))
    }

    /// The normalized name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_to_letters(col: u32) -> String {
    let mut result = Vec::new();
    let mut n = u64::from(col) + 1;

    while n > 0 {
        n -= 1;
        result.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    result.reverse();
    String::from_utf8(result).unwrap_or_default()
}

/// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut col: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + u64::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
        if col > u64::from(u32::MAX) + 1 {
            return None;
        }
    }

    u32::try_from(col - 1).ok()
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CellName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for CellName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CellName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Extra rule a normalized cell name must satisfy
///
/// The rule only sees names that already have cell-name shape, upper-cased.
#[derive(Clone, Default)]
pub enum NameValidator {
    /// Every well-formed name is accepted
    #[default]
    AcceptAll,
    /// Accepted when the regex matches anywhere in the name
    ///
    /// Anchor with `^...$` to constrain the whole name.
    Pattern(Regex),
    /// Accepted when the predicate returns true
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl NameValidator {
    /// Compile a pattern validator
    ///
    /// ```
    /// use tabula_core::NameValidator;
    ///
    /// let validator = NameValidator::pattern_from_str("^[A-C][0-9]$").unwrap();
    /// assert!(validator.is_valid("B7"));
    /// assert!(!validator.is_valid("D7"));
    /// ```
    pub fn pattern_from_str(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(NameValidator::Pattern)
            .map_err(|e| Error::InvalidPattern(e.to_string()))
    }

    /// Build a predicate validator
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        NameValidator::Predicate(Arc::new(f))
    }

    /// Whether a normalized name passes this rule
    pub fn is_valid(&self, name: &str) -> bool {
        match self {
            NameValidator::AcceptAll => true,
            NameValidator::Pattern(re) => re.is_match(name),
            NameValidator::Predicate(f) => f(name),
        }
    }

    /// Regex source of a pattern validator
    pub fn pattern(&self) -> Option<&str> {
        match self {
            NameValidator::Pattern(re) => Some(re.as_str()),
            _ => None,
        }
    }
}

impl fmt::Debug for NameValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameValidator::AcceptAll => f.write_str("AcceptAll"),
            NameValidator::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            NameValidator::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}
