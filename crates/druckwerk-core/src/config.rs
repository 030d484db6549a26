// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client configuration.

use serde::{Deserialize, Serialize};

/// Settings for one IPP client session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Value of the `requesting-user-name` operation attribute.
    pub requesting_user: String,
    /// HTTP User-Agent sent with every request.
    pub user_agent: String,
    /// Whether a PDF renderer is available on this host.  Detected once at
    /// startup by the embedding application; PDF sources are rejected before
    /// any network I/O when this is false.
    pub pdf_render_available: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requesting_user: std::env::var("USER").unwrap_or_else(|_| "anonymous".into()),
            user_agent: concat!("druckwerk ", env!("CARGO_PKG_VERSION")).into(),
            pdf_render_available: true,
        }
    }
}
