// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion dispatch: route a source document to the right render path.
//
// Every submission goes through conversion — images are always re-laid out
// onto the page, and PDF is rendered to whatever format negotiation picked.
// Only PDF and image sources have a render path; everything else fails
// here, before the network is touched.

use std::path::Path;

use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_document::carrier::RequestCarrier;
use druckwerk_document::render::{ConversionRequest, ImageRenderJob, PdfRenderJob, RenderJob};

use crate::request::BuiltRequest;

/// Decide the render path for a source document and package the conversion
/// request around the carrier.
pub fn plan(
    source_mime: &str,
    built: &BuiltRequest,
    source: &Path,
    pdf_render_available: bool,
    carrier: RequestCarrier,
) -> Result<ConversionRequest> {
    let params = &built.params;

    if source_mime == "application/pdf" {
        if !pdf_render_available {
            return Err(DruckwerkError::UnsupportedSource(source_mime.into()));
        }
        let (two_sided, tumble) = duplex_flags(&params.sides);
        return Ok(ConversionRequest {
            job: RenderJob::Pdf(PdfRenderJob {
                source: source.to_path_buf(),
                target_format: built.format.clone(),
                color_planes: params.color_planes,
                quality: params.quality,
                paper_size: params.paper_size.clone(),
                res_x: params.res_x,
                res_y: params.res_y,
                two_sided,
                tumble,
            }),
            carrier,
        });
    }

    if source_mime.contains("image") {
        return Ok(ConversionRequest {
            job: RenderJob::Image(ImageRenderJob {
                source: source.to_path_buf(),
                target_format: built.format.clone(),
                color_planes: params.color_planes,
                quality: params.quality,
                paper_size: params.paper_size.clone(),
                res_x: params.res_x,
                res_y: params.res_y,
            }),
            carrier,
        });
    }

    Err(DruckwerkError::UnsupportedSource(source_mime.into()))
}

/// Map the `sides` keyword onto (two_sided, tumble).
fn duplex_flags(sides: &str) -> (bool, bool) {
    match sides {
        "two-sided-long-edge" => (true, false),
        "two-sided-short-edge" => (true, true),
        _ => (false, false),
    }
}
