// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TLS trust policy for printer connections.
//
// Network printers overwhelmingly present self-issued certificates, so a
// strict WebPKI check would make every ipps:// printer unreachable.  The
// policy here allows a fixed, small set of validation failures (self-signed
// chains, hostname mismatch, missing issuer) and treats everything else —
// expiry, revocation, bad signatures — as fatal.  This is a narrowing of
// validation for LAN print discovery, not a general trust bypass.

use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, SignatureScheme};
use tracing::{debug, warn};

use druckwerk_core::error::{DruckwerkError, Result};

/// Classified TLS validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsErrorKind {
    /// No error at all.
    None,
    SelfSigned,
    HostnameMismatch,
    UnableToGetLocalIssuer,
    UnableToVerifyFirstCertificate,
    /// Anything not in the allow-set: expiry, revocation, bad signature, …
    Other,
}

/// Whether an exchange may proceed given every TLS error reported for it.
///
/// All reported errors must be in the benign allow-set; a single `Other`
/// aborts trust.
pub fn should_proceed(errors: &[TlsErrorKind]) -> bool {
    errors.iter().all(|kind| {
        matches!(
            kind,
            TlsErrorKind::None
                | TlsErrorKind::SelfSigned
                | TlsErrorKind::HostnameMismatch
                | TlsErrorKind::UnableToGetLocalIssuer
                | TlsErrorKind::UnableToVerifyFirstCertificate
        )
    })
}

/// Map a rustls validation error onto the policy vocabulary.
///
/// Self-signed chains and truncated chains both surface from webpki as
/// `UnknownIssuer`, which the policy treats the same way.
pub fn classify(error: &rustls::Error) -> TlsErrorKind {
    match error {
        rustls::Error::InvalidCertificate(cert_error) => match cert_error {
            CertificateError::UnknownIssuer => TlsErrorKind::UnableToGetLocalIssuer,
            CertificateError::NotValidForName => TlsErrorKind::HostnameMismatch,
            _ => TlsErrorKind::Other,
        },
        _ => TlsErrorKind::Other,
    }
}

/// A `ServerCertVerifier` that runs the standard WebPKI verification and
/// then applies [`should_proceed`] to the outcome.
#[derive(Debug)]
pub struct LenientServerCertVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl LenientServerCertVerifier {
    /// Build the verifier over the bundled WebPKI roots.
    ///
    /// The ring crypto provider must already be installed as the process
    /// default (the transport constructor takes care of that).
    pub fn new() -> Result<Self> {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let inner = WebPkiServerVerifier::builder(Arc::new(roots))
            .build()
            .map_err(|e| DruckwerkError::TlsUntrusted(format!("verifier setup: {e}")))?;
        Ok(Self { inner })
    }
}

impl ServerCertVerifier for LenientServerCertVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        match self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        ) {
            Ok(verified) => Ok(verified),
            Err(error) => {
                let kind = classify(&error);
                if should_proceed(&[kind]) {
                    debug!(?kind, %error, "allowing known-benign TLS validation failure");
                    Ok(ServerCertVerified::assertion())
                } else {
                    warn!(?kind, %error, "rejecting TLS certificate");
                    Err(error)
                }
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}
