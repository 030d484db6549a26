// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MIME classification boundary.

use std::path::Path;

/// Classifies a file into a MIME type.
///
/// Implementations may sniff content or go by name; the session only needs a
/// best-effort answer to route the document into the right conversion path.
pub trait MimeSniffer: Send + Sync {
    /// `None` when the file cannot be classified.
    fn classify(&self, path: &Path) -> Option<String>;
}

/// Extension-based classifier covering the formats the print pipeline
/// handles plus the page-description formats printers commonly accept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionSniffer;

impl MimeSniffer for ExtensionSniffer {
    fn classify(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let mime = match ext.as_str() {
            "pdf" => "application/pdf",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "tif" | "tiff" => "image/tiff",
            "bmp" => "image/bmp",
            "webp" => "image/webp",
            "ps" | "eps" => "application/postscript",
            "txt" => "text/plain",
            _ => return None,
        };
        Some(mime.into())
    }
}
