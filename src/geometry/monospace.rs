// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{ComputedStyle, LayoutProbe, Padding, ViewportRect};
use crate::model::CharSpan;

/// A fixed-width character grid that wraps at a column count.
///
/// Stands in for a rendering engine wherever text is laid out on a grid (terminal frontends,
/// headless tests, benchmarks).
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceLayout {
    origin_top: f32,
    origin_left: f32,
    padding: Padding,
    char_width: f32,
    line_height: f32,
    columns: usize,
    text_len: usize,
    shorthand_padding: bool,
    attached: bool,
}

impl MonospaceLayout {
    pub fn new(text_len: usize, columns: usize, char_width: f32, line_height: f32) -> Self {
        Self {
            origin_top: 0.0,
            origin_left: 0.0,
            padding: Padding::default(),
            char_width,
            line_height,
            columns: columns.max(1),
            text_len,
            shorthand_padding: true,
            attached: true,
        }
    }

    pub fn with_origin(mut self, top: f32, left: f32) -> Self {
        self.origin_top = top;
        self.origin_left = left;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Report only `padding-left` in the computed style, like engines without the shorthand.
    pub fn with_longhand_padding_only(mut self) -> Self {
        self.shorthand_padding = false;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Re-wraps the grid, e.g. after the window was resized.
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
    }

    /// Detached layouts resolve no character rectangles.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    fn cell(&self, offset: usize) -> (usize, usize) {
        (offset / self.columns, offset % self.columns)
    }

    fn cell_rect(&self, line: usize, column: usize, len: usize) -> ViewportRect {
        let top = self.origin_top + self.padding.top + line as f32 * self.line_height;
        let left = self.origin_left + self.padding.left + column as f32 * self.char_width;
        let width = len as f32 * self.char_width;
        ViewportRect { top, bottom: top + self.line_height, left, right: left + width, width }
    }
}

impl LayoutProbe for MonospaceLayout {
    fn container_rect(&self) -> Option<ViewportRect> {
        if !self.attached {
            return None;
        }
        let lines = self.text_len.div_ceil(self.columns).max(1);
        let width = self.padding.left + self.columns as f32 * self.char_width + self.padding.right;
        let height =
            self.padding.top + lines as f32 * self.line_height + self.padding.bottom;
        Some(ViewportRect {
            top: self.origin_top,
            bottom: self.origin_top + height,
            left: self.origin_left,
            right: self.origin_left + width,
            width,
        })
    }

    fn char_rect(&self, offset: usize) -> Option<ViewportRect> {
        if !self.attached || offset >= self.text_len {
            return None;
        }
        let (line, column) = self.cell(offset);
        Some(self.cell_rect(line, column, 1))
    }

    fn range_rect(&self, span: CharSpan) -> Option<ViewportRect> {
        if !self.attached || span.is_empty() || span.end() > self.text_len {
            return None;
        }
        let (first_line, column) = self.cell(span.start());
        let (last_line, _) = self.cell(span.end() - 1);
        (first_line == last_line).then(|| self.cell_rect(first_line, column, span.len()))
    }

    fn computed_style(&self) -> ComputedStyle {
        if self.shorthand_padding {
            ComputedStyle {
                line_height: Some(self.line_height),
                padding: Some(self.padding),
                padding_left: Some(self.padding.left),
            }
        } else {
            ComputedStyle {
                line_height: Some(self.line_height),
                padding: None,
                padding_left: Some(self.padding.left),
            }
        }
    }
}
