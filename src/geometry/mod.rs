// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Screen-space geometry for highlighted text spans.
//!
//! Rectangles come from a [`LayoutProbe`] in viewport coordinates and are translated so that
//! every [`BoundingBox`] is relative to the text container's top-left corner. A span that wraps
//! decomposes into a start box, full-width mid boxes and an end box.
//!
//! Missing layout is not an error: when the probe cannot resolve a rectangle (the node left
//! the DOM, layout is mid-update) the result is an empty geometry.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::config::GeometryConfig;
use crate::model::{AppellationId, CharSpan, DateAppellationId};

mod monospace;

pub use monospace::MonospaceLayout;

/// A rectangle in viewport coordinates, as reported by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportRect {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Numeric computed style of the text container.
///
/// Some engines report only the longhand `padding-left`, so both forms are carried.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComputedStyle {
    pub line_height: Option<f32>,
    pub padding: Option<Padding>,
    pub padding_left: Option<f32>,
}

/// The rendering-engine primitives geometry is computed from.
pub trait LayoutProbe {
    fn container_rect(&self) -> Option<ViewportRect>;

    /// Rectangle of the single character at `offset`.
    fn char_rect(&self, offset: usize) -> Option<ViewportRect>;

    /// Rectangle of a span, when the engine can report it as one box.
    fn range_rect(&self, span: CharSpan) -> Option<ViewportRect>;

    fn computed_style(&self) -> ComputedStyle;
}

/// A container-relative box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const EMPTY: Self = Self { top: 0.0, left: 0.0, width: 0.0, height: 0.0 };

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxRole {
    Start,
    Mid,
    End,
}

/// Highlight boxes for one span.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionGeometry {
    start: Option<BoundingBox>,
    mids: SmallVec<[BoundingBox; 4]>,
    end: Option<BoundingBox>,
}

impl SelectionGeometry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none()
    }

    pub fn start(&self) -> Option<&BoundingBox> {
        self.start.as_ref()
    }

    pub fn mids(&self) -> &[BoundingBox] {
        &self.mids
    }

    pub fn end(&self) -> Option<&BoundingBox> {
        self.end.as_ref()
    }

    /// Number of boxes, which is also the number of rendered lines the span covers.
    pub fn len(&self) -> usize {
        self.boxes().count()
    }

    /// Boxes in top-to-bottom order.
    pub fn boxes(&self) -> impl Iterator<Item = (BoxRole, BoundingBox)> + '_ {
        self.start
            .iter()
            .map(|b| (BoxRole::Start, *b))
            .chain(self.mids.iter().map(|b| (BoxRole::Mid, *b)))
            .chain(self.end.iter().map(|b| (BoxRole::End, *b)))
    }
}

fn line_height(style: &ComputedStyle, config: &GeometryConfig) -> f32 {
    style
        .line_height
        .filter(|lh| lh.is_finite() && *lh > 0.0)
        .unwrap_or(config.fallback_line_height)
}

fn resolve_padding(style: &ComputedStyle) -> Padding {
    if let Some(padding) = style.padding {
        return padding;
    }
    match style.padding_left {
        Some(left) => Padding { left, right: left, ..Padding::default() },
        None => Padding::default(),
    }
}

/// Box for a single character offset (a caret-sized point).
pub fn point_geometry(
    probe: &dyn LayoutProbe,
    offset: usize,
    config: &GeometryConfig,
) -> BoundingBox {
    let (Some(container), Some(rect)) = (probe.container_rect(), probe.char_rect(offset)) else {
        return BoundingBox::EMPTY;
    };
    let lh = line_height(&probe.computed_style(), config);
    BoundingBox {
        top: rect.top - container.top,
        left: rect.left - container.left,
        width: rect.width,
        height: (lh - config.highlight_gap).max(0.0),
    }
}

/// Highlight boxes for `span`.
pub fn range_geometry(
    probe: &dyn LayoutProbe,
    span: CharSpan,
    config: &GeometryConfig,
) -> SelectionGeometry {
    if span.is_empty() {
        return SelectionGeometry::empty();
    }
    let Some(container) = probe.container_rect() else {
        return SelectionGeometry::empty();
    };
    let (Some(start), Some(end)) = (probe.char_rect(span.start()), probe.char_rect(span.end() - 1))
    else {
        return SelectionGeometry::empty();
    };

    let style = probe.computed_style();
    let lh = line_height(&style, config);
    let height = (lh - config.highlight_gap).max(0.0);
    let start_top = start.top - container.top;
    let start_left = start.left - container.left;

    let n_lines = 1 + ((end.bottom - start.bottom) / lh).round().max(0.0) as usize;

    if n_lines <= 1 {
        let width = probe
            .range_rect(span)
            .map(|rect| rect.width)
            .unwrap_or(end.right - start.left)
            .max(0.0);
        return SelectionGeometry {
            start: Some(BoundingBox { top: start_top, left: start_left, width, height }),
            mids: SmallVec::new(),
            end: None,
        };
    }

    let padding = resolve_padding(&style);
    let content_left = padding.left;
    let content_width = (container.width - padding.left - padding.right).max(0.0);
    let content_right = content_left + content_width;

    let start_box = BoundingBox {
        top: start_top,
        left: start_left,
        width: (content_right - start_left).max(0.0),
        height,
    };
    let end_box = BoundingBox {
        top: end.top - container.top,
        left: content_left,
        width: (end.right - container.left - content_left).max(0.0),
        height,
    };
    let mids = (0..n_lines.saturating_sub(2))
        .map(|i| BoundingBox {
            top: start_top + (i + 1) as f32 * lh,
            left: content_left,
            width: content_width,
            height,
        })
        .collect();

    SelectionGeometry { start: Some(start_box), mids, end: Some(end_box) }
}

/// What a tracked highlight belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HighlightKey {
    TextSelection,
    Appellation(AppellationId),
    DateAppellation(DateAppellationId),
}

/// Geometry cache for every highlighted span.
///
/// Entries are recomputed wholesale on [`Highlights::recompute`]; nothing is reused across
/// calls, so repeated recomputation after a resize converges on the same boxes.
#[derive(Debug, Default)]
pub struct Highlights {
    entries: BTreeMap<HighlightKey, (CharSpan, SelectionGeometry)>,
}

impl Highlights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks `span` under `key`; geometry is filled on the next recompute.
    pub fn track(&mut self, key: HighlightKey, span: CharSpan) {
        self.entries.insert(key, (span, SelectionGeometry::empty()));
    }

    pub fn untrack(&mut self, key: HighlightKey) -> bool {
        self.entries.remove(&key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_tracked(&self, key: HighlightKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn geometry(&self, key: HighlightKey) -> Option<&SelectionGeometry> {
        self.entries.get(&key).map(|(_, geometry)| geometry)
    }

    pub fn recompute(&mut self, probe: &dyn LayoutProbe, config: &GeometryConfig) {
        for (span, geometry) in self.entries.values_mut() {
            *geometry = range_geometry(probe, *span, config);
        }
        tracing::trace!(entries = self.entries.len(), "recomputed highlight geometry");
    }

    pub fn iter(&self) -> impl Iterator<Item = (HighlightKey, &SelectionGeometry)> + '_ {
        self.entries.iter().map(|(key, (_, geometry))| (*key, geometry))
    }
}
