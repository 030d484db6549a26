// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk Document — the conversion side of the print pipeline.  This
// crate owns everything between "file the user picked" and "printer-ready
// request body": MIME classification, the temp-file carrier that accumulates
// the IPP request prefix plus converted payload, the renderer trait
// implemented by an external PDF/image rasterizer, and the worker task that
// keeps rendering off the network control flow.

pub mod carrier;
pub mod mime;
pub mod render;
pub mod worker;

pub use carrier::RequestCarrier;
pub use mime::{ExtensionSniffer, MimeSniffer};
pub use render::{ConversionRequest, DocumentRenderer, ImageRenderJob, PdfRenderJob, RenderJob};
pub use worker::ConvertWorker;
