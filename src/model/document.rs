// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::ops::Range;

use super::ids::TextId;
use super::position::{CharSpan, TextRange};

/// One word of the document, addressed by its position in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    index: usize,
    span: CharSpan,
}

impl Token {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn span(&self) -> CharSpan {
        self.span
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizeOptions {
    /// Emit runs of punctuation as their own tokens instead of gluing them to the word.
    pub split_punctuation: bool,
}

/// The annotated text plus its word segmentation.
///
/// All offsets are char offsets; `char_to_byte` maps them onto the UTF-8 buffer so slicing
/// stays O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedText {
    text_id: TextId,
    text: String,
    char_to_byte: Vec<usize>,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Word,
    Punct,
}

fn classify(ch: char, options: TokenizeOptions) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Space
    } else if options.split_punctuation && !ch.is_alphanumeric() {
        CharClass::Punct
    } else {
        CharClass::Word
    }
}

impl TokenizedText {
    pub fn new(text_id: TextId, text: impl Into<String>, options: TokenizeOptions) -> Self {
        let text = text.into();
        let mut char_to_byte = Vec::with_capacity(text.len() + 1);
        let mut tokens = Vec::new();
        let mut current: Option<(usize, CharClass)> = None;

        for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
            char_to_byte.push(byte_idx);
            let class = classify(ch, options);
            match current {
                Some((_, open)) if open == class => {}
                Some((start, open)) => {
                    if open != CharClass::Space {
                        push_token(&mut tokens, start, char_idx);
                    }
                    current = Some((char_idx, class));
                }
                None => current = Some((char_idx, class)),
            }
        }
        let char_len = char_to_byte.len();
        char_to_byte.push(text.len());
        if let Some((start, open)) = current {
            if open != CharClass::Space {
                push_token(&mut tokens, start, char_len);
            }
        }

        Self { text_id, text, char_to_byte, tokens }
    }

    pub fn text_id(&self) -> TextId {
        self.text_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.char_to_byte.len() - 1
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// The token covering `offset`, if the offset is not whitespace.
    pub fn token_at(&self, offset: usize) -> Option<&Token> {
        let idx = self.tokens.partition_point(|token| token.span.end() <= offset);
        self.tokens.get(idx).filter(|token| token.span.contains(offset))
    }

    /// Indices of every token that overlaps `span`.
    pub fn tokens_overlapping(&self, span: CharSpan) -> Range<usize> {
        let first = self.tokens.partition_point(|token| token.span.end() <= span.start());
        let last = self.tokens.partition_point(|token| token.span.start() < span.end());
        first..last.max(first)
    }

    pub fn slice(&self, span: CharSpan) -> Option<&str> {
        let start = *self.char_to_byte.get(span.start())?;
        let end = *self.char_to_byte.get(span.end())?;
        self.text.get(start..end)
    }

    /// Builds the [`TextRange`] for `span`, or `None` when it runs past the end of the text.
    pub fn range(&self, span: CharSpan) -> Option<TextRange> {
        self.slice(span).map(|repr| TextRange::new(span, repr))
    }

    /// Builds the [`TextRange`] covering an ordered run of tokens, first to last.
    pub fn range_for_tokens(&self, tokens: &[usize]) -> Option<TextRange> {
        let first = self.tokens.get(*tokens.first()?)?;
        let last = self.tokens.get(*tokens.last()?)?;
        let span = CharSpan::new(first.span.start(), last.span.end()).ok()?;
        self.range(span)
    }
}

fn push_token(tokens: &mut Vec<Token>, start: usize, end: usize) {
    let index = tokens.len();
    // start < end holds: a token is only closed after at least one char was seen.
    if let Ok(span) = CharSpan::new(start, end) {
        tokens.push(Token { index, span });
    }
}
