// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Reference to a controlled-vocabulary entry, as stored on an appellation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptRef {
    uri: SmolStr,
    #[serde(default)]
    label: SmolStr,
}

impl ConceptRef {
    pub fn new(uri: impl AsRef<str>, label: impl AsRef<str>) -> Self {
        Self { uri: SmolStr::new(uri), label: SmolStr::new(label) }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A full concept entry as returned by a concept search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub uri: SmolStr,
    pub label: SmolStr,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub authority: Option<SmolStr>,
    #[serde(default)]
    pub concept_type: Option<SmolStr>,
}

impl Concept {
    pub fn to_ref(&self) -> ConceptRef {
        ConceptRef::new(&self.uri, &self.label)
    }
}
