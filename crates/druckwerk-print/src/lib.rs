// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk Print — the IPP session orchestrator.  Discovers a printer's
// capabilities, negotiates the document format, assembles Print-Job
// requests, routes documents through conversion, and tracks jobs through
// listing and cancellation.  The wire codec, HTTP transport, MIME sniffer,
// and document renderer are collaborators behind traits; this crate ships
// production implementations over the `ipp` crate and `reqwest`.

pub mod codec;
pub mod dispatch;
pub mod negotiate;
pub mod profile;
pub mod request;
pub mod session;
pub mod transport;
pub mod trust;

pub use codec::{DecodedResponse, IppCodec, IppOperation, WireCodec};
pub use profile::PrinterProfile;
pub use request::{BuiltRequest, PrintOptions};
pub use session::{BusyState, IppSession, SessionEvent};
pub use transport::{IppTransport, ReqwestTransport, UploadBody};
pub use trust::{TlsErrorKind, should_proceed};
