// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Glossa and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Glossa: selection and annotation core for collaborative text annotation.
//!
//! Tracks what the user has selected in a document, arbitrates which input field receives the
//! next selection, computes highlight geometry, and keeps appellations, date appellations and
//! relations in step with a backend.

pub mod backend;
pub mod bus;
pub mod config;
pub mod geometry;
pub mod lifecycle;
pub mod listen;
pub mod model;
pub mod selection;
pub mod session;
