// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Character-offset positions and their wire encodings.
//!
//! Offsets count `char`s of the document text. On the wire a span travels as the
//! comma-joined string `"start,end"` and a word selection as comma-joined token indices;
//! both encodings stop at this module.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use smol_str::SmolStr;
use thiserror::Error;

/// A half-open `[start, end)` character span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharSpan {
    start: usize,
    end: usize,
}

impl CharSpan {
    pub fn new(start: usize, end: usize) -> Result<Self, ParsePositionError> {
        if start > end {
            return Err(ParsePositionError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn overlaps(&self, other: &CharSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Encodes the span as the backend's `position_value`.
    pub fn to_position_value(&self) -> String {
        self.to_string()
    }

    pub fn parse(input: &str) -> Result<Self, ParsePositionError> {
        let (start, end) = input.split_once(',').ok_or(ParsePositionError::MissingComma)?;
        let start = parse_offset(start)?;
        let end = parse_offset(end)?;
        Self::new(start, end)
    }
}

fn parse_offset(raw: &str) -> Result<usize, ParsePositionError> {
    let raw = raw.trim();
    raw.parse::<usize>().map_err(|_| ParsePositionError::InvalidOffset(SmolStr::new(raw)))
}

impl fmt::Display for CharSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}

impl FromStr for CharSpan {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePositionError {
    #[error("position must be formatted as \"start,end\"")]
    MissingComma,
    #[error("invalid character offset '{0}'")]
    InvalidOffset(SmolStr),
    #[error("position start {start} is after end {end}")]
    Reversed { start: usize, end: usize },
}

/// A selected passage: the span plus the literal text it covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextRange {
    span: CharSpan,
    representation: String,
}

impl TextRange {
    pub fn new(span: CharSpan, representation: impl Into<String>) -> Self {
        Self { span, representation: representation.into() }
    }

    pub fn span(&self) -> CharSpan {
        self.span
    }

    pub fn start_offset(&self) -> usize {
        self.span.start()
    }

    pub fn end_offset(&self) -> usize {
        self.span.end()
    }

    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// Ordered token indices of a word selection.
pub type TokenIndices = SmallVec<[usize; 8]>;

/// Encodes token indices as the comma-joined list some endpoints expect.
pub fn format_token_ids(tokens: &[usize]) -> String {
    let mut out = String::new();
    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&token.to_string());
    }
    out
}

pub fn parse_token_ids(input: &str) -> Result<TokenIndices, ParseTokenIdsError> {
    if input.trim().is_empty() {
        return Ok(TokenIndices::new());
    }
    input
        .split(',')
        .map(|raw| {
            let raw = raw.trim();
            raw.parse::<usize>().map_err(|_| ParseTokenIdsError(SmolStr::new(raw)))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid token index '{0}'")]
pub struct ParseTokenIdsError(SmolStr);

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{format_token_ids, parse_token_ids, CharSpan, ParsePositionError};

    #[rstest]
    #[case(0, 0)]
    #[case(5, 12)]
    #[case(10, 18)]
    #[case(1_000_000, 1_000_007)]
    fn position_value_round_trips(#[case] start: usize, #[case] end: usize) {
        let span = CharSpan::new(start, end).expect("span");
        let encoded = span.to_position_value();
        assert_eq!(encoded, format!("{start},{end}"));
        assert_eq!(CharSpan::parse(&encoded).expect("parse"), span);
    }

    #[test]
    fn every_ordered_pair_round_trips_and_reversed_pairs_are_rejected() {
        let offsets = (0..48).chain([255, 256, 65_535, 1 << 20, usize::MAX - 1, usize::MAX]);
        let offsets = offsets.collect::<Vec<_>>();
        for &start in &offsets {
            for &end in &offsets {
                let encoded = format!("{start},{end}");
                if start <= end {
                    let span = CharSpan::parse(&encoded).expect("ordered pair parses");
                    assert_eq!((span.start(), span.end()), (start, end));
                    assert_eq!(span.to_position_value(), encoded);
                } else {
                    assert_eq!(
                        CharSpan::parse(&encoded),
                        Err(ParsePositionError::Reversed { start, end })
                    );
                }
            }
        }
    }

    #[test]
    fn parse_tolerates_whitespace_around_offsets() {
        let span: CharSpan = " 5 , 12".parse().expect("parse");
        assert_eq!((span.start(), span.end()), (5, 12));
    }

    #[rstest]
    #[case("512", ParsePositionError::MissingComma)]
    #[case("a,12", ParsePositionError::InvalidOffset("a".into()))]
    #[case("5,-1", ParsePositionError::InvalidOffset("-1".into()))]
    #[case("12,5", ParsePositionError::Reversed { start: 12, end: 5 })]
    fn parse_rejects_malformed_positions(#[case] input: &str, #[case] expected: ParsePositionError) {
        assert_eq!(CharSpan::parse(input), Err(expected));
    }

    #[test]
    fn spans_report_overlap_and_containment() {
        let a = CharSpan::new(2, 6).expect("span");
        let b = CharSpan::new(5, 9).expect("span");
        let c = CharSpan::new(6, 9).expect("span");
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(5));
        assert!(!a.contains(6));
    }

    #[test]
    fn token_ids_use_comma_joined_encoding() {
        assert_eq!(format_token_ids(&[3, 4, 5]), "3,4,5");
        assert_eq!(parse_token_ids("3, 4,5").expect("parse").as_slice(), &[3, 4, 5]);
        assert!(parse_token_ids("").expect("parse").is_empty());
        parse_token_ids("3,x").unwrap_err();
    }
}
