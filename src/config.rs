// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Runtime configuration.
//!
//! Configuration is a JSON document; every key is optional and falls back to the defaults
//! below, so `{}` is a valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::TokenizeOptions;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlossaConfig {
    pub geometry: GeometryConfig,
    pub selection: SelectionConfig,
    pub tokenizer: TokenizerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeometryConfig {
    /// Line height used when the container's computed style does not report one.
    pub fallback_line_height: f32,
    /// Vertical gap between stacked highlight boxes.
    pub highlight_gap: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self { fallback_line_height: 20.0, highlight_gap: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Let shift-extension run across words that already belong to an appellation.
    pub allow_extend_across_annotations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerConfig {
    pub split_punctuation: bool,
}

impl TokenizerConfig {
    pub fn options(&self) -> TokenizeOptions {
        TokenizeOptions { split_punctuation: self.split_punctuation }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("geometry.fallback_line_height must be positive, got {0}")]
    LineHeight(f32),
}

impl GlossaConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config = Self::from_json_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let line_height = self.geometry.fallback_line_height;
        if !line_height.is_finite() || line_height <= 0.0 {
            return Err(ConfigError::LineHeight(line_height));
        }
        Ok(())
    }
}
