// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Druckwerk.

use thiserror::Error;

/// Top-level error type for all Druckwerk operations.
#[derive(Debug, Error)]
pub enum DruckwerkError {
    // -- Request construction errors (raised before any network I/O) --
    #[error("invalid printer URI: {0}")]
    InvalidUri(String),

    #[error("unknown document format")]
    UnknownFormat,

    #[error("unsupported print media: {0}")]
    UnsupportedMedia(String),

    #[error("cannot convert this file format: {0}")]
    UnsupportedSource(String),

    #[error("failed to open file: {0}")]
    FileOpen(String),

    // -- Conversion errors --
    #[error("document conversion failed: {0}")]
    Convert(String),

    // -- Network / protocol errors --
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed IPP response: {0}")]
    Protocol(String),

    #[error("IPP encoding failed: {0}")]
    Codec(String),

    #[error("TLS certificate rejected: {0}")]
    TlsUntrusted(String),

    // -- File I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DruckwerkError>;
