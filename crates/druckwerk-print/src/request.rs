// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-Job request assembly.
//
// Turns caller-requested job attributes plus the printer profile into the
// operation/job attribute sets the codec encodes, applying the protocol
// adjustments printers actually require: dropping `document-format` when
// the printer does not declare it creatable, square resolution for URF,
// and stripping attributes the raster/PostScript converters bake into the
// payload anyway.  Any failure here halts the print flow before a single
// byte goes on the network.

use std::path::Path;

use tracing::debug;
use url::Url;

use druckwerk_core::attrs::{AttrValue, AttributeSet};
use druckwerk_core::config::ClientConfig;
use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_core::media;

use crate::negotiate::negotiate;
use crate::profile::{PrinterProfile, resolve};

/// Caller switches for one print request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    /// Ignore format negotiation and send a raster format.
    pub force_raster: bool,
    /// Send `document-format` even when the printer does not list it in
    /// job-creation-attributes-supported.
    pub force_include_format: bool,
    /// Strip attributes that are redundant once conversion bakes them into
    /// the payload.
    pub strip_redundant: bool,
}

/// Values the conversion pipeline needs, captured before any stripping.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    /// 3 = colour, 1 = monochrome, 0 = unspecified.
    pub color_planes: u8,
    pub quality: i32,
    pub paper_size: String,
    /// Requested `sides` keyword (empty when unset).
    pub sides: String,
    pub res_x: u32,
    pub res_y: u32,
}

/// A fully assembled Print-Job request, ready for encoding.
#[derive(Debug, Clone)]
pub struct BuiltRequest {
    pub op_attrs: AttributeSet,
    pub job_attrs: AttributeSet,
    /// The negotiated document format the payload must arrive in.
    pub format: String,
    pub params: RenderParams,
}

/// Base operation attributes common to every request of a session.
pub fn base_op_attrs(url: &Url, config: &ClientConfig) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    attrs.insert("attributes-charset", AttrValue::Charset("utf-8".into()));
    attrs.insert(
        "attributes-natural-language",
        AttrValue::NaturalLanguage("en-us".into()),
    );
    attrs.insert("printer-uri", AttrValue::Uri(url.to_string()));
    attrs.insert(
        "requesting-user-name",
        AttrValue::Name(config.requesting_user.clone()),
    );
    attrs
}

/// Assemble the Print-Job attribute sets.
///
/// `supported_formats` is the printer's advertised list plus any formats
/// derived from its device id.
#[allow(clippy::too_many_arguments)]
pub fn build(
    mut job_attrs: AttributeSet,
    profile: &PrinterProfile,
    supported_formats: &[String],
    source_mime: &str,
    filename: &Path,
    url: &Url,
    options: &PrintOptions,
    config: &ClientConfig,
) -> Result<BuiltRequest> {
    let mut op_attrs = base_op_attrs(url, config);
    let job_name = filename
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    op_attrs.insert("job-name", AttrValue::Name(job_name));

    let requested_format = resolve(&job_attrs, profile, "document-format")
        .and_then(AttrValue::as_str)
        .unwrap_or_default()
        .to_string();
    let format = negotiate(
        &requested_format,
        source_mime,
        supported_formats,
        options.force_raster,
    );
    debug!(requested = %requested_format, negotiated = %format, mime = %source_mime, "format negotiation");

    // "application/octet-string" is a placeholder some firmwares echo back;
    // it is no more printable than an empty result.
    if format.is_empty() || format == "application/octet-string" {
        return Err(DruckwerkError::UnknownFormat);
    }

    // Printers that don't declare document-format creatable may reject the
    // whole request when it shows up anyway.
    let declares_format = profile
        .job_creation_attributes()
        .iter()
        .any(|a| a == "document-format");
    if !declares_format && !options.force_include_format {
        job_attrs.remove("document-format");
    }

    let (mut res_x, mut res_y, units) = resolve(&job_attrs, profile, "printer-resolution")
        .and_then(AttrValue::as_resolution)
        .unwrap_or((0, 0, 3));
    if format == "image/urf" {
        // URF requires square resolution; take the lower axis.
        let min = res_x.min(res_y);
        res_x = min;
        res_y = min;
        job_attrs.insert(
            "printer-resolution",
            AttrValue::Resolution {
                x: res_x,
                y: res_y,
                units,
            },
        );
    }

    let quality = resolve(&job_attrs, profile, "print-quality")
        .and_then(AttrValue::as_int)
        .unwrap_or(0);

    let color_mode = resolve(&job_attrs, profile, "print-color-mode")
        .and_then(AttrValue::as_str)
        .unwrap_or_default();
    let color_planes = if color_mode.contains("color") {
        3
    } else if color_mode.contains("monochrome") {
        1
    } else {
        0
    };

    let paper_size = resolve(&job_attrs, profile, "media")
        .and_then(AttrValue::as_str)
        .unwrap_or_default()
        .to_string();
    if !media::contains(&paper_size) {
        return Err(DruckwerkError::UnsupportedMedia(paper_size));
    }

    // Captured before stripping; the converter still needs it.
    let sides = resolve(&job_attrs, profile, "sides")
        .and_then(AttrValue::as_str)
        .unwrap_or_default()
        .to_string();

    if options.strip_redundant && (format == "image/pwg-raster" || format == "image/urf") {
        job_attrs.remove("sides");
        job_attrs.remove("print-color-mode");
    }
    if options.strip_redundant && format == "application/postscript" {
        job_attrs.remove("sides");
    }

    // TODO: derive media-col from the media table entry for `paper_size`
    // instead of this fixed 5x7in size.
    let mut media_size = AttributeSet::new();
    media_size.insert("x-dimension", AttrValue::Integer(12700));
    media_size.insert("y-dimension", AttrValue::Integer(17780));
    let mut media_col = AttributeSet::new();
    media_col.insert("media-size", AttrValue::Collection(media_size));
    job_attrs.insert("media-col", AttrValue::Collection(media_col));

    Ok(BuiltRequest {
        op_attrs,
        job_attrs,
        format,
        params: RenderParams {
            color_planes,
            quality,
            paper_size,
            sides,
            res_x: res_x.max(0) as u32,
            res_y: res_y.max(0) as u32,
        },
    })
}
