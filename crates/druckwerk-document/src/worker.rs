// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Asynchronous conversion worker.
//
// One dedicated task owns the renderer and receives conversion requests
// over an mpsc channel; each request runs under `spawn_blocking` so slow
// rasterization never stalls network polling, and answers exactly once over
// its own oneshot.  Independently submitted conversions may complete in any
// order.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use druckwerk_core::error::{DruckwerkError, Result};

use crate::carrier::RequestCarrier;
use crate::render::{ConversionRequest, DocumentRenderer, RenderJob};

/// Requests queued ahead of the worker before senders start waiting.
const QUEUE_DEPTH: usize = 8;

struct WorkItem {
    request: ConversionRequest,
    reply: oneshot::Sender<Result<RequestCarrier>>,
}

/// Handle to the conversion worker task.  Cheap to clone; the task exits
/// when every handle is dropped.
#[derive(Clone)]
pub struct ConvertWorker {
    tx: mpsc::Sender<WorkItem>,
}

impl ConvertWorker {
    /// Spawn the worker task.  Must be called from within a Tokio runtime.
    pub fn spawn(renderer: Arc<dyn DocumentRenderer>) -> Self {
        let (tx, mut rx) = mpsc::channel::<WorkItem>(QUEUE_DEPTH);

        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                let renderer = Arc::clone(&renderer);
                // Each request gets its own blocking slot so one long render
                // does not serialize the ones behind it.
                tokio::spawn(async move {
                    let WorkItem { request, reply } = item;
                    let outcome =
                        match tokio::task::spawn_blocking(move || run_render(&*renderer, request))
                            .await
                        {
                            Ok(result) => result,
                            Err(e) => Err(DruckwerkError::Convert(format!(
                                "render task aborted: {e}"
                            ))),
                        };
                    if reply.send(outcome).is_err() {
                        warn!("conversion finished but the requester is gone");
                    }
                });
            }
            debug!("conversion worker shutting down");
        });

        Self { tx }
    }

    /// Convert one document, returning the carrier with the payload
    /// appended.  Exactly one of success or failure comes back per request.
    pub async fn convert(&self, request: ConversionRequest) -> Result<RequestCarrier> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(WorkItem { request, reply })
            .await
            .map_err(|_| DruckwerkError::Convert("conversion worker is not running".into()))?;
        response
            .await
            .map_err(|_| DruckwerkError::Convert("conversion worker dropped the request".into()))?
    }
}

fn run_render(renderer: &dyn DocumentRenderer, request: ConversionRequest) -> Result<RequestCarrier> {
    let ConversionRequest { job, mut carrier } = request;
    match &job {
        RenderJob::Pdf(pdf) => {
            debug!(source = %pdf.source.display(), format = %pdf.target_format, "rendering PDF");
            renderer.render_pdf(pdf, &mut carrier)?;
        }
        RenderJob::Image(image) => {
            debug!(source = %image.source.display(), format = %image.target_format, "rendering image");
            renderer.render_image(image, &mut carrier)?;
        }
    }
    carrier.finish()?;
    Ok(carrier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ImageRenderJob, PdfRenderJob};
    use std::io::Write;

    struct StubRenderer {
        payload: &'static [u8],
        fail: bool,
    }

    impl DocumentRenderer for StubRenderer {
        fn render_pdf(&self, _job: &PdfRenderJob, carrier: &mut RequestCarrier) -> Result<()> {
            if self.fail {
                return Err(DruckwerkError::Convert("renderer exploded".into()));
            }
            carrier.write_all(self.payload)?;
            Ok(())
        }

        fn render_image(&self, _job: &ImageRenderJob, carrier: &mut RequestCarrier) -> Result<()> {
            if self.fail {
                return Err(DruckwerkError::Convert("renderer exploded".into()));
            }
            carrier.write_all(self.payload)?;
            Ok(())
        }
    }

    fn image_request(prefix: &[u8]) -> ConversionRequest {
        ConversionRequest {
            job: RenderJob::Image(ImageRenderJob {
                source: "/tmp/photo.jpg".into(),
                target_format: "image/pwg-raster".into(),
                color_planes: 3,
                quality: 4,
                paper_size: "iso_a4_210x297mm".into(),
                res_x: 300,
                res_y: 300,
            }),
            carrier: RequestCarrier::new(prefix).expect("carrier"),
        }
    }

    #[tokio::test]
    async fn conversion_appends_payload_after_prefix() {
        let worker = ConvertWorker::spawn(Arc::new(StubRenderer {
            payload: b"RASTER",
            fail: false,
        }));

        let carrier = worker
            .convert(image_request(b"PREFIX"))
            .await
            .expect("conversion should succeed");

        let contents = std::fs::read(carrier.path()).expect("read carrier");
        assert_eq!(contents, b"PREFIXRASTER");
    }

    #[tokio::test]
    async fn renderer_failure_is_reported_once() {
        let worker = ConvertWorker::spawn(Arc::new(StubRenderer {
            payload: b"",
            fail: true,
        }));

        let err = worker
            .convert(image_request(b"PREFIX"))
            .await
            .expect_err("conversion should fail");
        assert!(matches!(err, DruckwerkError::Convert(_)));
    }
}
