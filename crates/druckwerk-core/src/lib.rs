// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — core attribute model and error definitions shared across all crates.

pub mod attrs;
pub mod config;
pub mod error;
pub mod media;

pub use attrs::{AttrValue, AttributeSet, Tag};
pub use config::ClientConfig;
pub use error::DruckwerkError;
