// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Temp-file carrier for a partially-built IPP request body.
//
// A Print-Job request body is the encoded IPP message followed immediately
// by the document payload.  The carrier is seeded with the encoded prefix,
// the renderer appends the converted document, and the uploader streams the
// whole file.  Ownership moves along that chain (builder → renderer →
// uploader), so the backing file cannot be deleted while an upload still
// reads from it; it is removed when the carrier is finally dropped.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

/// A request body under construction, backed by a named temp file.
#[derive(Debug)]
pub struct RequestCarrier {
    file: NamedTempFile,
    len: u64,
}

impl RequestCarrier {
    /// Create a carrier seeded with the encoded IPP request prefix.
    pub fn new(prefix: &[u8]) -> io::Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(prefix)?;
        debug!(path = %file.path().display(), prefix_len = prefix.len(), "request carrier created");
        Ok(Self {
            file,
            len: prefix.len() as u64,
        })
    }

    /// Append payload bytes after whatever is already in the carrier.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)?;
        self.len += bytes.len() as u64;
        Ok(())
    }

    /// Total bytes written so far (prefix + payload).
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the backing file, for the uploader to stream from.
    ///
    /// The file stays valid for as long as the carrier is alive.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Flush buffered writes so a reader opening [`path`](Self::path) sees
    /// the complete body.
    pub fn finish(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Renderers stream converted output straight into the carrier.
impl Write for RequestCarrier {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.file.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn carrier_accumulates_prefix_then_payload() {
        let mut carrier = RequestCarrier::new(b"IPP-PREFIX").expect("create carrier");
        carrier.append(b"PAYLOAD").expect("append");
        carrier.finish().expect("flush");

        assert_eq!(carrier.len(), "IPP-PREFIXPAYLOAD".len() as u64);
        let contents = fs::read(carrier.path()).expect("read back");
        assert_eq!(contents, b"IPP-PREFIXPAYLOAD");
    }

    #[test]
    fn backing_file_removed_on_drop() {
        let path = {
            let carrier = RequestCarrier::new(b"x").expect("create carrier");
            carrier.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn write_trait_tracks_length() {
        let mut carrier = RequestCarrier::new(b"").expect("create carrier");
        assert!(carrier.is_empty());
        carrier.write_all(b"abc").expect("write");
        assert_eq!(carrier.len(), 3);
    }
}
