// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP transport boundary for IPP exchanges.
//
// IPP rides on HTTP POST with a `application/ipp` body (RFC 8010 §3).  The
// session speaks to a trait so tests run without sockets; the production
// implementation is a `reqwest` client with the lenient TLS verifier from
// `trust` and a streamed upload that reports (sent, total) progress.

use std::error::Error as _;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};
use url::Url;

use druckwerk_core::config::ClientConfig;
use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_document::carrier::RequestCarrier;

use crate::trust::LenientServerCertVerifier;

/// Default IPP port (IANA-assigned).
const IPP_PORT: u16 = 631;

/// Chunk size for streamed uploads.
const UPLOAD_CHUNK: usize = 64 * 1024;

/// Callback receiving (sent, total) byte counts during an upload.
pub type ProgressSink = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// A request body: raw bytes for attribute-only operations, or a consumed
/// carrier for Print-Job.  Taking the carrier by value pins its backing
/// file for the duration of the upload.
pub enum UploadBody {
    Bytes(Vec<u8>),
    Carrier(RequestCarrier),
}

impl UploadBody {
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Carrier(carrier) => carrier.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// POSTs IPP request bodies and returns the raw response body.
#[async_trait]
pub trait IppTransport: Send + Sync {
    async fn post(
        &self,
        target: &Url,
        body: UploadBody,
        progress: Option<ProgressSink>,
    ) -> Result<Vec<u8>>;
}

/// Normalize user input into an `ipp://`/`ipps://` printer URI.
///
/// Bare host names get the `ipp` scheme; `http`/`https` map onto their IPP
/// equivalents; anything else is rejected.
pub fn normalize_printer_uri(input: &str) -> Result<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DruckwerkError::InvalidUri("empty printer URL".into()));
    }
    let candidate = match input.split_once("://") {
        None => format!("ipp://{input}"),
        Some(("ipp" | "ipps", _)) => input.to_string(),
        Some(("http", rest)) => format!("ipp://{rest}"),
        Some(("https", rest)) => format!("ipps://{rest}"),
        Some((scheme, _)) => {
            return Err(DruckwerkError::InvalidUri(format!(
                "unsupported scheme '{scheme}'"
            )));
        }
    };
    Url::parse(&candidate).map_err(|e| DruckwerkError::InvalidUri(format!("{input}: {e}")))
}

/// The HTTP URL actually POSTed to: `ipp` → `http`, `ipps` → `https`, port
/// defaulting to 631.
pub fn http_target(printer: &Url) -> Result<Url> {
    let host = printer
        .host_str()
        .ok_or_else(|| DruckwerkError::InvalidUri(format!("no host in '{printer}'")))?;
    let scheme = match printer.scheme() {
        "ipps" => "https",
        _ => "http",
    };
    let port = printer.port().unwrap_or(IPP_PORT);
    let path = printer.path();
    Url::parse(&format!("{scheme}://{host}:{port}{path}"))
        .map_err(|e| DruckwerkError::InvalidUri(format!("{printer}: {e}")))
}

/// Production transport over `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the client with the session's User-Agent and the lenient
    /// printer TLS policy.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // The verifier and client config both resolve crypto through the
        // process-default provider.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let verifier = LenientServerCertVerifier::new()?;
        let tls = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(verifier))
            .with_no_client_auth();

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .use_preconfigured_tls(tls)
            .build()
            .map_err(|e| DruckwerkError::Network(format!("client setup: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IppTransport for ReqwestTransport {
    async fn post(
        &self,
        target: &Url,
        body: UploadBody,
        progress: Option<ProgressSink>,
    ) -> Result<Vec<u8>> {
        let total = body.len();
        debug!(%target, bytes = total, "POST application/ipp");

        let request = self
            .client
            .post(target.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/ipp");

        let request = match body {
            UploadBody::Bytes(bytes) => request.body(bytes),
            UploadBody::Carrier(carrier) => {
                let file = tokio::fs::File::open(carrier.path()).await?;
                // The carrier rides along in the stream state so its backing
                // file outlives the last chunk read.
                let stream = futures::stream::try_unfold(
                    (file, carrier, 0u64),
                    move |(mut file, carrier, sent)| {
                        let progress = progress.clone();
                        async move {
                            let mut buf = vec![0u8; UPLOAD_CHUNK];
                            let n = file.read(&mut buf).await?;
                            if n == 0 {
                                return Ok::<_, std::io::Error>(None);
                            }
                            buf.truncate(n);
                            let sent = sent + n as u64;
                            if let Some(report) = &progress {
                                report(sent, total);
                            }
                            Ok(Some((buf, (file, carrier, sent))))
                        }
                    },
                );
                request
                    .header(reqwest::header::CONTENT_LENGTH, total)
                    .body(reqwest::Body::wrap_stream(stream))
            }
        };

        let response = request.send().await.map_err(classify_send_error)?;
        let response = response.error_for_status().map_err(|e| {
            warn!(%target, error = %e, "printer answered with HTTP error");
            DruckwerkError::Network(e.to_string())
        })?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DruckwerkError::Network(format!("reading response: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// TLS rejections come back from reqwest buried in its error chain; dig
/// them out so the caller sees `TlsUntrusted` rather than a generic
/// network failure.
fn classify_send_error(error: reqwest::Error) -> DruckwerkError {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(tls) = cause.downcast_ref::<rustls::Error>() {
            return DruckwerkError::TlsUntrusted(tls.to_string());
        }
        source = cause.source();
    }
    DruckwerkError::Network(error.to_string())
}
