// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document format negotiation.
//
// Printers advertise a small, varying set of document formats; automatic
// selection degrades from the document's native format toward the raster
// formats nearly every IPP printer accepts.  Tie-break is strict list
// order, never quality-based.

/// The caller's "pick for me" placeholder format.
pub const AUTO_FORMAT: &str = "application/octet-stream";

/// Raster fallbacks in preference order: PWG raster first, Apple URF second.
const RASTER_FORMATS: &[&str] = &["image/pwg-raster", "image/urf"];

/// Fallback chain for a PDF source.
const PDF_CHAIN: &[&str] = &[
    "application/pdf",
    "application/postscript",
    "image/pwg-raster",
    "image/urf",
];

/// Fallback chain for an image source.
const IMAGE_CHAIN: &[&str] = &[
    "image/png",
    "image/gif",
    "image/jpeg",
    "image/pwg-raster",
    "image/urf",
];

/// Select the document format to send.
///
/// * `force_raster` overrides everything: the first supported raster format
///   wins, or the result is empty.
/// * A requested format of [`AUTO_FORMAT`] negotiates from the source MIME
///   type's fallback chain; sources that are neither PDF nor image get the
///   request back unchanged.
/// * Any other explicit request is honored without negotiation.
///
/// An empty return means no acceptable format exists.
pub fn negotiate(
    requested: &str,
    source_mime: &str,
    supported: &[String],
    force_raster: bool,
) -> String {
    if force_raster {
        return first_match(supported, RASTER_FORMATS);
    }
    if requested == AUTO_FORMAT {
        if source_mime == "application/pdf" {
            return first_match(supported, PDF_CHAIN);
        }
        if source_mime.contains("image") {
            return first_match(supported, IMAGE_CHAIN);
        }
    }
    requested.to_string()
}

fn first_match(supported: &[String], wanted: &[&str]) -> String {
    wanted
        .iter()
        .find(|w| supported.iter().any(|s| s == *w))
        .map(|w| (*w).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported(formats: &[&str]) -> Vec<String> {
        formats.iter().map(|f| (*f).to_string()).collect()
    }

    #[test]
    fn force_raster_prefers_pwg_over_urf() {
        let both = supported(&["image/urf", "image/pwg-raster", "application/pdf"]);
        assert_eq!(
            negotiate("application/pdf", "application/pdf", &both, true),
            "image/pwg-raster"
        );

        let urf_only = supported(&["application/pdf", "image/urf"]);
        assert_eq!(negotiate(AUTO_FORMAT, "image/png", &urf_only, true), "image/urf");

        let neither = supported(&["application/pdf"]);
        assert_eq!(negotiate(AUTO_FORMAT, "application/pdf", &neither, true), "");
    }

    #[test]
    fn auto_pdf_source_falls_back_in_chain_order() {
        let formats = supported(&["application/postscript", "image/urf"]);
        assert_eq!(
            negotiate(AUTO_FORMAT, "application/pdf", &formats, false),
            "application/postscript"
        );
    }

    #[test]
    fn auto_image_source_prefers_png() {
        let formats = supported(&["image/jpeg", "image/png"]);
        assert_eq!(negotiate(AUTO_FORMAT, "image/jpeg", &formats, false), "image/png");

        let jpeg_only = supported(&["image/jpeg"]);
        assert_eq!(
            negotiate(AUTO_FORMAT, "image/tiff", &jpeg_only, false),
            "image/jpeg"
        );
    }

    #[test]
    fn auto_with_unhandled_source_returns_request_unchanged() {
        let formats = supported(&["application/pdf"]);
        assert_eq!(
            negotiate(AUTO_FORMAT, "text/plain", &formats, false),
            AUTO_FORMAT
        );
    }

    #[test]
    fn explicit_request_is_honored_even_if_unsupported() {
        let formats = supported(&["image/urf"]);
        assert_eq!(
            negotiate("application/pdf", "application/pdf", &formats, false),
            "application/pdf"
        );
    }

    #[test]
    fn auto_with_nothing_supported_is_empty() {
        assert_eq!(negotiate(AUTO_FORMAT, "application/pdf", &[], false), "");
    }
}
