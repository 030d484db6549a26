// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Renderer boundary: the external rasterizer that turns a source document
// into printer-ready bytes.  Rasterization itself lives outside this
// workspace; implementations append their output to the request carrier.

use std::path::PathBuf;

use druckwerk_core::error::Result;

use crate::carrier::RequestCarrier;

/// Parameters for rendering a PDF source.
#[derive(Debug, Clone)]
pub struct PdfRenderJob {
    pub source: PathBuf,
    /// Target document format (e.g. `image/pwg-raster`).
    pub target_format: String,
    /// Colour planes: 3 = colour, 1 = monochrome, 0 = unspecified.
    pub color_planes: u8,
    /// IPP print-quality value (3 = draft, 4 = normal, 5 = high; 0 = unset).
    pub quality: i32,
    /// PWG media keyword the pages are laid out for.
    pub paper_size: String,
    pub res_x: u32,
    pub res_y: u32,
    pub two_sided: bool,
    /// Flip on the short edge; only meaningful when `two_sided` is set.
    pub tumble: bool,
}

/// Parameters for rendering an image source.  Images are always re-laid out
/// onto the page, so there is no duplex handling here.
#[derive(Debug, Clone)]
pub struct ImageRenderJob {
    pub source: PathBuf,
    pub target_format: String,
    pub color_planes: u8,
    pub quality: i32,
    pub paper_size: String,
    pub res_x: u32,
    pub res_y: u32,
}

/// A render task for one of the two supported source kinds.
#[derive(Debug, Clone)]
pub enum RenderJob {
    Pdf(PdfRenderJob),
    Image(ImageRenderJob),
}

/// One conversion in flight: the render parameters plus the carrier the
/// output is appended to.  The carrier comes back to the caller (via the
/// worker) once rendering succeeds, and travels on to the uploader.
#[derive(Debug)]
pub struct ConversionRequest {
    pub job: RenderJob,
    pub carrier: RequestCarrier,
}

/// External document rasterizer.
///
/// Implementations run on a blocking worker thread and may take their time;
/// they must write the complete converted payload into `carrier` before
/// returning.
pub trait DocumentRenderer: Send + Sync {
    fn render_pdf(&self, job: &PdfRenderJob, carrier: &mut RequestCarrier) -> Result<()>;
    fn render_image(&self, job: &ImageRenderJob, carrier: &mut RequestCarrier) -> Result<()>;
}
