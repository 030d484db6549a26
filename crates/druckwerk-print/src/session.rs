// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The IPP client session: one printer URL, four independent request tracks
// (discover, print, list, cancel), and the state they mutate.
//
// All methods take `&self`; the tracks may be awaited concurrently and do
// not serialize each other.  State lives behind a mutex that is never held
// across an await, and observers are notified synchronously after each
// mutation, outside the lock.  Request-construction failures surface as
// job-failure events before any network I/O; network failures synthesize a
// job-state message and never poison the session.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};
use url::Url;

use druckwerk_core::attrs::{AttrValue, AttributeSet};
use druckwerk_core::config::ClientConfig;
use druckwerk_core::error::{DruckwerkError, Result};
use druckwerk_document::carrier::RequestCarrier;
use druckwerk_document::mime::{ExtensionSniffer, MimeSniffer};
use druckwerk_document::render::DocumentRenderer;
use druckwerk_document::worker::ConvertWorker;

use crate::codec::{IppCodec, IppOperation, SUCCESS_STATUS_MAX, WireCodec};
use crate::dispatch;
use crate::profile::{PrinterProfile, additional_formats};
use crate::request::{self, PrintOptions};
use crate::transport::{IppTransport, ProgressSink, ReqwestTransport, UploadBody, http_target, normalize_printer_uri};

/// State changes published to subscribers, mirroring the session's
/// observable outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    UrlChanged,
    AttributesChanged,
    AdditionalFormatsChanged,
    JobAttributesChanged,
    JobListChanged,
    JobFinished(bool),
    CancelStatus(bool),
    BusyMessageChanged,
    ProgressChanged,
}

/// What the session is currently busy doing, for front-end display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyState {
    #[default]
    Idle,
    Converting,
    Transferring,
}

impl BusyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Converting => "Converting",
            Self::Transferring => "Transferring",
        }
    }
}

/// Everything the session owns and mutates.
#[derive(Debug, Default)]
struct SessionState {
    url: Option<Url>,
    profile: PrinterProfile,
    additional_formats: Vec<String>,
    job_attrs: AttributeSet,
    jobs: Vec<AttributeSet>,
    busy: BusyState,
    progress: String,
}

type Observer = Box<dyn Fn(&SessionEvent) + Send + Sync>;

struct Shared {
    config: ClientConfig,
    codec: Arc<dyn IppCodec>,
    transport: Arc<dyn IppTransport>,
    sniffer: Arc<dyn MimeSniffer>,
    converter: ConvertWorker,
    state: Mutex<SessionState>,
    observers: Mutex<Vec<Observer>>,
}

/// An IPP client session bound to (at most) one printer at a time.
///
/// Cheap to clone; all clones share the same state and observers.  Must be
/// created inside a Tokio runtime (the conversion worker spawns a task).
#[derive(Clone)]
pub struct IppSession {
    shared: Arc<Shared>,
}

impl IppSession {
    /// Create a session over explicit collaborators.
    pub fn new(
        config: ClientConfig,
        codec: Arc<dyn IppCodec>,
        transport: Arc<dyn IppTransport>,
        sniffer: Arc<dyn MimeSniffer>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        let converter = ConvertWorker::spawn(renderer);
        Self {
            shared: Arc::new(Shared {
                config,
                codec,
                transport,
                sniffer,
                converter,
                state: Mutex::new(SessionState::default()),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Create a session with the production stack: the `ipp`-crate codec,
    /// the reqwest transport with lenient printer TLS, and extension-based
    /// MIME classification.
    pub fn with_default_stack(
        config: ClientConfig,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::new(
            config,
            Arc::new(WireCodec),
            transport,
            Arc::new(ExtensionSniffer),
            renderer,
        ))
    }

    /// Register an observer; it is called synchronously after every state
    /// mutation, from whichever task performed it.
    pub fn subscribe(&self, observer: impl Fn(&SessionEvent) + Send + Sync + 'static) {
        self.lock_observers().push(Box::new(observer));
    }

    // -- State snapshots ----------------------------------------------------

    pub fn url(&self) -> Option<String> {
        self.lock_state().url.as_ref().map(|u| u.to_string())
    }

    /// Snapshot of the last discovered printer profile.
    pub fn printer_attributes(&self) -> PrinterProfile {
        self.lock_state().profile.clone()
    }

    pub fn additional_formats(&self) -> Vec<String> {
        self.lock_state().additional_formats.clone()
    }

    /// Job attributes from the last print exchange (possibly synthesized on
    /// failure).
    pub fn job_attributes(&self) -> AttributeSet {
        self.lock_state().job_attrs.clone()
    }

    /// The job list from the last successful Get-Jobs.
    pub fn jobs(&self) -> Vec<AttributeSet> {
        self.lock_state().jobs.clone()
    }

    pub fn busy_message(&self) -> &'static str {
        self.lock_state().busy.as_str()
    }

    /// Upload progress as "NN%", empty outside an upload.
    pub fn progress(&self) -> String {
        self.lock_state().progress.clone()
    }

    // -- Track 1: discovery -------------------------------------------------

    /// Point the session at a printer.  A changed URL publishes
    /// `UrlChanged` and immediately runs discovery; an invalid URL clears
    /// the target.
    pub async fn set_url(&self, input: &str) -> Result<()> {
        let url = match normalize_printer_uri(input) {
            Ok(url) => url,
            Err(e) => {
                self.lock_state().url = None;
                self.emit(SessionEvent::UrlChanged);
                return Err(e);
            }
        };

        {
            let mut state = self.lock_state();
            if state.url.as_ref() == Some(&url) {
                return Ok(());
            }
            state.url = Some(url);
        }
        self.emit(SessionEvent::UrlChanged);
        self.refresh().await
    }

    /// Query the printer's attributes, replacing the profile wholesale.
    ///
    /// The cache is cleared before the request goes out, so a transport
    /// failure leaves the printer "not yet known" rather than stale.
    pub async fn refresh(&self) -> Result<()> {
        let url = {
            let mut state = self.lock_state();
            state.profile.clear();
            state.additional_formats.clear();
            state.url.clone()
        };
        self.emit(SessionEvent::AttributesChanged);
        self.emit(SessionEvent::AdditionalFormatsChanged);

        let Some(url) = url else {
            return Err(DruckwerkError::InvalidUri("no printer URL set".into()));
        };

        let op_attrs = request::base_op_attrs(&url, &self.shared.config);
        let body = self.shared.codec.encode(
            IppOperation::GetPrinterAttributes,
            &op_attrs,
            &AttributeSet::new(),
        )?;

        let response = self
            .shared
            .transport
            .post(&http_target(&url)?, UploadBody::Bytes(body), None)
            .await;

        let decoded = match response.and_then(|bytes| self.shared.codec.decode(&bytes)) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(%url, error = %e, "printer discovery failed");
                self.emit(SessionEvent::AttributesChanged);
                return Err(e);
            }
        };

        let mut printer_attrs = decoded.printer_attrs;
        // Some printers answer with no printer group at all; the operation
        // group's status-message is the only hint worth keeping then.
        if !printer_attrs.contains("status-message")
            && let Some(message) = decoded.op_attrs.get("status-message")
        {
            printer_attrs.insert("status-message", message.clone());
        }

        let profile = PrinterProfile::new(printer_attrs);
        let has_device_id = profile.device_id().is_some();
        let extra = additional_formats(&profile);
        if !extra.is_empty() {
            debug!(formats = ?extra, "formats derived from printer-device-id");
        }

        {
            let mut state = self.lock_state();
            state.profile = profile;
            state.additional_formats = extra;
        }
        if has_device_id {
            self.emit(SessionEvent::AdditionalFormatsChanged);
        }
        self.emit(SessionEvent::AttributesChanged);
        info!(%url, "printer attributes refreshed");
        Ok(())
    }

    // -- Track 2: print -----------------------------------------------------

    /// Submit a document.  Returns whether the printer reported the job
    /// accepted (status in the successful class); construction, conversion,
    /// and transport failures come back as errors after surfacing as
    /// job-failure events.
    pub async fn print(
        &self,
        attrs: AttributeSet,
        path: &Path,
        options: PrintOptions,
    ) -> Result<bool> {
        self.lock_state().progress.clear();
        self.emit(SessionEvent::ProgressChanged);

        if let Err(e) = std::fs::File::open(path) {
            return Err(self.job_failure(DruckwerkError::FileOpen(e.to_string())));
        }

        let mime = self
            .shared
            .sniffer
            .classify(path)
            .unwrap_or_else(|| "application/octet-stream".into());

        let (url, profile, extra) = {
            let state = self.lock_state();
            (
                state.url.clone(),
                state.profile.clone(),
                state.additional_formats.clone(),
            )
        };
        let Some(url) = url else {
            return Err(self.job_failure(DruckwerkError::InvalidUri("no printer URL set".into())));
        };

        let mut supported = profile.supported_formats();
        supported.extend(extra);

        info!(file = %path.display(), %mime, ?options, "printing");

        let built = match request::build(
            attrs,
            &profile,
            &supported,
            &mime,
            path,
            &url,
            &options,
            &self.shared.config,
        ) {
            Ok(built) => built,
            Err(e) => return Err(self.job_failure(e)),
        };

        let prefix = match self
            .shared
            .codec
            .encode(IppOperation::PrintJob, &built.op_attrs, &built.job_attrs)
        {
            Ok(prefix) => prefix,
            Err(e) => return Err(self.job_failure(e)),
        };

        self.set_busy(BusyState::Converting);

        let carrier = match RequestCarrier::new(&prefix) {
            Ok(carrier) => carrier,
            Err(e) => return Err(self.job_failure(e.into())),
        };
        let conversion = match dispatch::plan(
            &mime,
            &built,
            path,
            self.shared.config.pdf_render_available,
            carrier,
        ) {
            Ok(conversion) => conversion,
            Err(e) => return Err(self.job_failure(e)),
        };

        let carrier = match self.shared.converter.convert(conversion).await {
            Ok(carrier) => carrier,
            Err(e) => return Err(self.job_failure(e)),
        };

        self.set_busy(BusyState::Transferring);

        let progress: ProgressSink = {
            let session = self.clone();
            Arc::new(move |sent, total| session.report_progress(sent, total))
        };

        let response = self
            .shared
            .transport
            .post(&http_target(&url)?, UploadBody::Carrier(carrier), Some(progress))
            .await;

        let body = match response {
            Ok(body) => body,
            Err(e) => {
                // No IPP response at all; synthesize the one attribute a
                // front end needs to show something sensible.
                let mut job_attrs = AttributeSet::new();
                job_attrs.insert("job-state-message", AttrValue::Text("Network error".into()));
                self.lock_state().job_attrs = job_attrs;
                self.emit(SessionEvent::JobAttributesChanged);
                self.emit(SessionEvent::JobFinished(false));
                return Err(e);
            }
        };

        match self.shared.codec.decode(&body) {
            Ok(decoded) => {
                let job_attrs = decoded.job_attrs.into_iter().next().unwrap_or_default();
                let success = decoded.status <= SUCCESS_STATUS_MAX;
                debug!(status = decoded.status, success, "print response");
                self.lock_state().job_attrs = job_attrs;
                self.emit(SessionEvent::JobAttributesChanged);
                self.emit(SessionEvent::JobFinished(success));
                Ok(success)
            }
            Err(e) => {
                self.lock_state().job_attrs.clear();
                self.emit(SessionEvent::JobAttributesChanged);
                self.emit(SessionEvent::JobFinished(false));
                Err(e)
            }
        }
    }

    // -- Track 3: job listing -----------------------------------------------

    /// Fetch the printer's job list, replacing the cached list wholesale.
    /// On failure the previous list stays as a stale-but-consistent read.
    pub async fn get_jobs(&self) -> Result<()> {
        let url = self
            .lock_state()
            .url
            .clone()
            .ok_or_else(|| DruckwerkError::InvalidUri("no printer URL set".into()))?;

        let mut op_attrs = request::base_op_attrs(&url, &self.shared.config);
        op_attrs.insert("requested-attributes", AttrValue::Keyword("all".into()));

        let body =
            self.shared
                .codec
                .encode(IppOperation::GetJobs, &op_attrs, &AttributeSet::new())?;
        let response = self
            .shared
            .transport
            .post(&http_target(&url)?, UploadBody::Bytes(body), None)
            .await?;
        let decoded = self.shared.codec.decode(&response)?;

        debug!(jobs = decoded.job_attrs.len(), "job list updated");
        self.lock_state().jobs = decoded.job_attrs;
        self.emit(SessionEvent::JobListChanged);
        Ok(())
    }

    // -- Track 4: cancel ----------------------------------------------------

    /// Cancel a job by id.  Whatever the outcome, a Get-Jobs follows so
    /// observers see the authoritative post-cancel list.
    pub async fn cancel_job(&self, job_id: i32) -> Result<bool> {
        let outcome = self.send_cancel(job_id).await;
        let status = matches!(outcome, Ok(true));
        self.emit(SessionEvent::CancelStatus(status));

        if let Err(e) = self.get_jobs().await {
            warn!(error = %e, "post-cancel job listing failed");
        }
        outcome
    }

    async fn send_cancel(&self, job_id: i32) -> Result<bool> {
        let url = self
            .lock_state()
            .url
            .clone()
            .ok_or_else(|| DruckwerkError::InvalidUri("no printer URL set".into()))?;

        let mut op_attrs = request::base_op_attrs(&url, &self.shared.config);
        op_attrs.insert("job-id", AttrValue::Integer(job_id));

        let body =
            self.shared
                .codec
                .encode(IppOperation::CancelJob, &op_attrs, &AttributeSet::new())?;
        let response = self
            .shared
            .transport
            .post(&http_target(&url)?, UploadBody::Bytes(body), None)
            .await?;
        let decoded = self.shared.codec.decode(&response)?;

        info!(job_id, status = decoded.status, "cancel response");
        Ok(decoded.status <= SUCCESS_STATUS_MAX)
    }

    // -- Internals ----------------------------------------------------------

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        match self.shared.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<Observer>> {
        match self.shared.observers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(&self, event: SessionEvent) {
        let observers = self.lock_observers();
        for observer in observers.iter() {
            observer(&event);
        }
    }

    fn set_busy(&self, busy: BusyState) {
        self.lock_state().busy = busy;
        self.emit(SessionEvent::BusyMessageChanged);
    }

    /// Surface a pre-upload failure as job state and hand the error back.
    fn job_failure(&self, error: DruckwerkError) -> DruckwerkError {
        warn!(%error, "print failed before completion");
        let mut job_attrs = AttributeSet::new();
        job_attrs.insert("job-state-message", AttrValue::Text(error.to_string()));
        self.lock_state().job_attrs = job_attrs;
        self.emit(SessionEvent::JobAttributesChanged);
        self.emit(SessionEvent::JobFinished(false));
        error
    }

    fn report_progress(&self, sent: u64, total: u64) {
        // total == 0 would render a meaningless figure (or divide by zero).
        if total == 0 {
            return;
        }
        let percent = 100 * sent / total;
        self.lock_state().progress = format!("{percent}%");
        self.emit(SessionEvent::ProgressChanged);
    }
}
