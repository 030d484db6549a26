// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Submit a file to a printer from the command line:
//
//     cargo run --example print_file -- ipp://192.168.1.50 photo.jpg
//
// Uses a pass-through "renderer" that sends the source bytes unmodified —
// enough to exercise discovery, negotiation, and submission against a
// printer that accepts the file's native format.  A real deployment plugs
// in an actual rasterizer behind `DocumentRenderer`.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use druckwerk_core::attrs::{AttrValue, AttributeSet};
use druckwerk_core::config::ClientConfig;
use druckwerk_core::error::Result;
use druckwerk_document::carrier::RequestCarrier;
use druckwerk_document::render::{DocumentRenderer, ImageRenderJob, PdfRenderJob};
use druckwerk_print::request::PrintOptions;
use druckwerk_print::session::{IppSession, SessionEvent};

struct PassthroughRenderer;

impl DocumentRenderer for PassthroughRenderer {
    fn render_pdf(&self, job: &PdfRenderJob, carrier: &mut RequestCarrier) -> Result<()> {
        let bytes = std::fs::read(&job.source)?;
        carrier.write_all(&bytes)?;
        Ok(())
    }

    fn render_image(&self, job: &ImageRenderJob, carrier: &mut RequestCarrier) -> Result<()> {
        let bytes = std::fs::read(&job.source)?;
        carrier.write_all(&bytes)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(url), Some(file)) = (args.next(), args.next()) else {
        eprintln!("usage: print_file <printer-url> <file>");
        std::process::exit(2);
    };

    let session = IppSession::with_default_stack(
        ClientConfig::default(),
        Arc::new(PassthroughRenderer),
    )?;

    {
        let watched = session.clone();
        session.subscribe(move |event| match event {
            SessionEvent::BusyMessageChanged => println!("  {}", watched.busy_message()),
            SessionEvent::ProgressChanged => {
                let progress = watched.progress();
                if !progress.is_empty() {
                    println!("  {progress}");
                }
            }
            SessionEvent::JobFinished(ok) => println!("job finished: {ok}"),
            _ => {}
        });
    }

    session.set_url(&url).await?;

    let profile = session.printer_attributes();
    println!("supported formats: {:?}", profile.supported_formats());
    if let Some(message) = profile.status_message() {
        println!("printer status: {message}");
    }

    let mut attrs = AttributeSet::new();
    attrs.insert(
        "document-format",
        AttrValue::Mime("application/octet-stream".into()),
    );
    attrs.insert("media", AttrValue::Keyword("iso_a4_210x297mm".into()));

    let accepted = session
        .print(attrs, Path::new(&file), PrintOptions::default())
        .await?;

    let job = session.job_attributes();
    println!(
        "printer answered: accepted={accepted} job={}",
        serde_json::to_string_pretty(&job).unwrap_or_default()
    );

    session.get_jobs().await?;
    for job in session.jobs() {
        let id = job.get("job-id").and_then(AttrValue::as_int).unwrap_or(-1);
        let state = job.get("job-state").and_then(AttrValue::as_int).unwrap_or(0);
        println!("  job {id}: state {state}");
    }

    Ok(())
}
