// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Memory budget configuration and parsing.
//!
//! A [`MemoryBudget`] caps the bytes held by live arenas. Microcontroller
//! arenas are usually tens to hundreds of kilobytes, so kilobyte suffixes
//! are the common case.

use crate::MemoryError;
use std::fmt;

const KB: usize = 1024;
const MB: usize = 1024 * KB;
const GB: usize = 1024 * MB;

/// Recognised suffixes, longest first so that `"KB"` wins over `"B"`.
const SUFFIXES: &[(&str, usize)] = &[
    ("KB", KB),
    ("MB", MB),
    ("GB", GB),
    ("K", KB),
    ("M", MB),
    ("G", GB),
    ("B", 1),
];

/// A hard ceiling on the bytes held by live arenas.
///
/// # Parsing
/// - `"256K"` or `"256KB"` → 256 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1024² bytes
/// - `"1G"` or `"1GB"` → 1024³ bytes
/// - `"65536"` or `"65536B"` → raw byte count
///
/// # Examples
/// ```
/// use memory_manager::MemoryBudget;
///
/// let b = MemoryBudget::parse("256K").unwrap();
/// assert_eq!(b.as_bytes(), 256 * 1024);
/// assert_eq!(b.to_string(), "256 KB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    bytes: usize,
}

impl MemoryBudget {
    /// Creates a budget from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a budget from kilobytes.
    pub fn from_kb(kb: usize) -> Self {
        Self { bytes: kb * KB }
    }

    /// Creates a budget from megabytes.
    pub fn from_mb(mb: usize) -> Self {
        Self { bytes: mb * MB }
    }

    /// Returns the budget in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns the budget in kilobytes (truncated).
    pub fn as_kb(&self) -> usize {
        self.bytes / KB
    }

    /// Parses a human-readable budget string (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, MemoryError> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();

        let (digits, multiplier) = SUFFIXES
            .iter()
            .find(|(suffix, _)| upper.ends_with(suffix))
            .map(|(suffix, mult)| (&trimmed[..trimmed.len() - suffix.len()], *mult))
            .unwrap_or((trimmed, 1));

        let value: usize = digits.trim().parse().map_err(|_| {
            MemoryError::InvalidBudget(format!(
                "'{s}': expected a number with an optional K, M or G suffix"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| MemoryError::InvalidBudget(format!("'{s}' overflows usize")))?;

        if bytes == 0 {
            return Err(MemoryError::InvalidBudget(format!("'{s}' is zero")));
        }

        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes {
            b if b >= GB && b % GB == 0 => write!(f, "{} GB", b / GB),
            b if b >= MB && b % MB == 0 => write!(f, "{} MB", b / MB),
            b if b >= KB && b % KB == 0 => write!(f, "{} KB", b / KB),
            b => write!(f, "{b} B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(MemoryBudget::from_kb(64).as_bytes(), 65536);
        assert_eq!(MemoryBudget::from_mb(1).as_kb(), 1024);
    }

    #[test]
    fn test_parse_kilobytes() {
        assert_eq!(MemoryBudget::parse("256K").unwrap().as_kb(), 256);
        assert_eq!(MemoryBudget::parse("256kb").unwrap().as_kb(), 256);
        assert_eq!(MemoryBudget::parse(" 48 KB ").unwrap().as_kb(), 48);
    }

    #[test]
    fn test_parse_larger_units() {
        assert_eq!(MemoryBudget::parse("2M").unwrap().as_bytes(), 2 * MB);
        assert_eq!(MemoryBudget::parse("1gb").unwrap().as_bytes(), GB);
    }

    #[test]
    fn test_parse_raw_bytes() {
        assert_eq!(MemoryBudget::parse("4096").unwrap().as_bytes(), 4096);
        assert_eq!(MemoryBudget::parse("4096B").unwrap().as_bytes(), 4096);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(MemoryBudget::parse(""), Err(MemoryError::InvalidBudget(_))));
        assert!(matches!(MemoryBudget::parse("lots"), Err(MemoryError::InvalidBudget(_))));
        assert!(matches!(MemoryBudget::parse("0K"), Err(MemoryError::InvalidBudget(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(MemoryBudget::from_mb(1).to_string(), "1 MB");
        assert_eq!(MemoryBudget::from_kb(96).to_string(), "96 KB");
        assert_eq!(MemoryBudget::from_bytes(1000).to_string(), "1000 B");
    }

    #[test]
    fn test_serde_roundtrip() {
        let b = MemoryBudget::from_kb(128);
        let json = serde_json::to_string(&b).unwrap();
        let back: MemoryBudget = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
