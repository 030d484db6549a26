// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer profile: the cached result of the last Get-Printer-Attributes
// exchange, plus the requested-or-default attribute resolver.
//
// The profile is replaced wholesale on every discovery response and cleared
// when a new discovery starts, so everything read from it is a snapshot of
// one response, never a merge of several.

use druckwerk_core::attrs::{AttrValue, AttributeSet};

/// Cached printer attributes from the last successful discovery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrinterProfile {
    attrs: AttributeSet,
}

impl PrinterProfile {
    pub fn new(attrs: AttributeSet) -> Self {
        Self { attrs }
    }

    /// The raw printer attribute set.
    pub fn attrs(&self) -> &AttributeSet {
        &self.attrs
    }

    /// True until a discovery response has populated the profile.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn clear(&mut self) {
        self.attrs.clear();
    }

    /// MIME types from `document-format-supported`.
    pub fn supported_formats(&self) -> Vec<String> {
        self.multi_value("document-format-supported")
    }

    /// Attribute names from `job-creation-attributes-supported`.
    pub fn job_creation_attributes(&self) -> Vec<String> {
        self.multi_value("job-creation-attributes-supported")
    }

    /// The printer's default for `name`, looked up as `name + "-default"`.
    pub fn default_for(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(&format!("{name}-default"))
    }

    /// Raw `printer-device-id` string (IEEE 1284), when advertised.
    pub fn device_id(&self) -> Option<&str> {
        self.attrs.get("printer-device-id").and_then(AttrValue::as_str)
    }

    pub fn status_message(&self) -> Option<&str> {
        self.attrs.get("status-message").and_then(AttrValue::as_str)
    }

    fn multi_value(&self, name: &str) -> Vec<String> {
        self.attrs
            .get(name)
            .map(|v| v.string_values().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Resolve the effective value for `name`: the requested attribute when
/// present, otherwise the printer's advertised default.  Absence is a valid
/// outcome — validation of missing values belongs to the caller.
pub fn resolve<'a>(
    requested: &'a AttributeSet,
    profile: &'a PrinterProfile,
    name: &str,
) -> Option<&'a AttrValue> {
    requested.get(name).or_else(|| profile.default_for(name))
}

/// Formats implied by the device-id `CMD:` field that the printer did not
/// already advertise in `document-format-supported`.
///
/// Some printers omit PDF/PostScript from the IPP attribute but list the
/// interpreter in their IEEE 1284 device id; those formats are usable and
/// get appended to the negotiation set for the current session only.
pub fn additional_formats(profile: &PrinterProfile) -> Vec<String> {
    let Some(device_id) = profile.device_id() else {
        return Vec::new();
    };

    let advertised = profile.supported_formats();
    let mut extra = Vec::new();

    for entry in device_id.split(';') {
        let mut parts = entry.splitn(2, ':');
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        if key.trim() != "CMD" {
            continue;
        }
        for command in value.split(',') {
            let mime = match command.trim() {
                "PDF" => "application/pdf",
                "POSTSCRIPT" => "application/postscript",
                _ => continue,
            };
            if !advertised.iter().any(|f| f == mime) && !extra.iter().any(|f| f == mime) {
                extra.push(mime.to_string());
            }
        }
    }

    extra
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(entries: &[(&str, AttrValue)]) -> PrinterProfile {
        let mut attrs = AttributeSet::new();
        for (name, value) in entries {
            attrs.insert(*name, value.clone());
        }
        PrinterProfile::new(attrs)
    }

    #[test]
    fn resolve_prefers_requested_over_default() {
        let profile = profile_with(&[(
            "sides-default",
            AttrValue::Keyword("one-sided".into()),
        )]);
        let mut requested = AttributeSet::new();
        requested.insert("sides", AttrValue::Keyword("two-sided-long-edge".into()));

        assert_eq!(
            resolve(&requested, &profile, "sides").and_then(AttrValue::as_str),
            Some("two-sided-long-edge")
        );
    }

    #[test]
    fn resolve_falls_back_to_printer_default() {
        let profile = profile_with(&[(
            "media-default",
            AttrValue::Keyword("iso_a4_210x297mm".into()),
        )]);
        let requested = AttributeSet::new();

        assert_eq!(
            resolve(&requested, &profile, "media").and_then(AttrValue::as_str),
            Some("iso_a4_210x297mm")
        );
    }

    #[test]
    fn resolve_missing_everywhere_is_none() {
        let profile = PrinterProfile::default();
        let requested = AttributeSet::new();
        assert!(resolve(&requested, &profile, "media").is_none());
    }

    #[test]
    fn device_id_cmd_tokens_extend_formats() {
        let profile = profile_with(&[
            (
                "document-format-supported",
                AttrValue::List(vec![
                    AttrValue::Mime("application/pdf".into()),
                    AttrValue::Mime("image/urf".into()),
                ]),
            ),
            (
                "printer-device-id",
                AttrValue::Text(
                    "MFG:ACME;MDL:LaserWriter;CMD:PCL,PDF,POSTSCRIPT;CLS:PRINTER".into(),
                ),
            ),
        ]);

        // PDF is already advertised; only PostScript is new.
        assert_eq!(additional_formats(&profile), ["application/postscript"]);
    }

    #[test]
    fn no_device_id_means_no_additional_formats() {
        let profile = profile_with(&[(
            "document-format-supported",
            AttrValue::Mime("image/urf".into()),
        )]);
        assert!(additional_formats(&profile).is_empty());
    }

    #[test]
    fn malformed_device_id_entries_are_skipped() {
        let profile = profile_with(&[(
            "printer-device-id",
            AttrValue::Text("garbage;CMDPDF;CMD:PDF".into()),
        )]);
        assert_eq!(additional_formats(&profile), ["application/pdf"]);
    }

    #[test]
    fn supported_formats_reads_single_and_list_values() {
        let single = profile_with(&[(
            "document-format-supported",
            AttrValue::Mime("image/jpeg".into()),
        )]);
        assert_eq!(single.supported_formats(), ["image/jpeg"]);
    }
}
