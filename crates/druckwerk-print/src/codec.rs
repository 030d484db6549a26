// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// IPP message codec boundary.
//
// The orchestrator never touches the TLV wire format itself; it hands
// ordered attribute sets to an `IppCodec` and gets decoded attribute groups
// back.  The production implementation adapts the `ipp` crate.

use std::io::Cursor;

use ipp::parser::IppParser;
use ipp::prelude::*;
use ipp::reader::IppReader;

use druckwerk_core::attrs::{AttrValue, AttributeSet};
use druckwerk_core::error::{DruckwerkError, Result};

/// The four operations this client performs (RFC 8011 §4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IppOperation {
    PrintJob,
    CancelJob,
    GetJobs,
    GetPrinterAttributes,
}

impl IppOperation {
    pub fn opcode(&self) -> u16 {
        match self {
            Self::PrintJob => 0x0002,
            Self::CancelJob => 0x0008,
            Self::GetJobs => 0x000A,
            Self::GetPrinterAttributes => 0x000B,
        }
    }
}

/// Status codes at or below this value are the IPP "successful" class.
pub const SUCCESS_STATUS_MAX: u16 = 0x00FF;

/// A decoded IPP response, split into the groups the session consumes.
#[derive(Debug, Clone, Default)]
pub struct DecodedResponse {
    /// Raw status-code from the response header.
    pub status: u16,
    pub op_attrs: AttributeSet,
    /// One set per job-attributes group; Get-Jobs returns one group per job.
    pub job_attrs: Vec<AttributeSet>,
    pub printer_attrs: AttributeSet,
}

impl DecodedResponse {
    pub fn is_success(&self) -> bool {
        self.status <= SUCCESS_STATUS_MAX
    }
}

/// Encode/decode boundary between the session and the wire.
pub trait IppCodec: Send + Sync {
    /// Encode a request message (without document payload).
    fn encode(
        &self,
        operation: IppOperation,
        op_attrs: &AttributeSet,
        job_attrs: &AttributeSet,
    ) -> Result<Vec<u8>>;

    /// Decode a complete response body.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedResponse>;
}

/// Production codec backed by the `ipp` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireCodec;

impl IppCodec for WireCodec {
    fn encode(
        &self,
        operation: IppOperation,
        op_attrs: &AttributeSet,
        job_attrs: &AttributeSet,
    ) -> Result<Vec<u8>> {
        let mut request =
            IppRequestResponse::new(IppVersion::v1_1(), to_operation(operation), None);

        for (name, value) in op_attrs {
            request.attributes_mut().add(
                DelimiterTag::OperationAttributes,
                IppAttribute::new(name, to_wire(value)),
            );
        }
        for (name, value) in job_attrs {
            request.attributes_mut().add(
                DelimiterTag::JobAttributes,
                IppAttribute::new(name, to_wire(value)),
            );
        }

        Ok(request.to_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedResponse> {
        let reader = IppReader::new(Cursor::new(bytes.to_vec()));
        let response = IppParser::new(reader)
            .parse()
            .map_err(|e| DruckwerkError::Protocol(e.to_string()))?;

        let status = response.header().operation_or_status;
        let attrs = response.attributes();

        let op_attrs = attrs
            .groups_of(DelimiterTag::OperationAttributes)
            .next()
            .map(group_to_set)
            .unwrap_or_default();

        let job_attrs = attrs
            .groups_of(DelimiterTag::JobAttributes)
            .map(group_to_set)
            .collect();

        let printer_attrs = attrs
            .groups_of(DelimiterTag::PrinterAttributes)
            .next()
            .map(group_to_set)
            .unwrap_or_default();

        Ok(DecodedResponse {
            status,
            op_attrs,
            job_attrs,
            printer_attrs,
        })
    }
}

fn to_operation(operation: IppOperation) -> Operation {
    match operation {
        IppOperation::PrintJob => Operation::PrintJob,
        IppOperation::CancelJob => Operation::CancelJob,
        IppOperation::GetJobs => Operation::GetJobs,
        IppOperation::GetPrinterAttributes => Operation::GetPrinterAttributes,
    }
}

fn group_to_set(group: &IppAttributeGroup) -> AttributeSet {
    group
        .attributes()
        .iter()
        .map(|(name, attr)| (name.clone(), from_wire(attr.value())))
        .collect()
}

/// Project our attribute model onto `ipp` crate values.
fn to_wire(value: &AttrValue) -> IppValue {
    match value {
        AttrValue::Charset(s) => IppValue::Charset(s.clone()),
        AttrValue::NaturalLanguage(s) => IppValue::NaturalLanguage(s.clone()),
        AttrValue::Uri(s) => IppValue::Uri(s.clone()),
        AttrValue::Keyword(s) => IppValue::Keyword(s.clone()),
        AttrValue::Mime(s) => IppValue::MimeMediaType(s.clone()),
        AttrValue::Integer(v) => IppValue::Integer(*v),
        AttrValue::Enum(v) => IppValue::Enum(*v),
        AttrValue::Boolean(v) => IppValue::Boolean(*v),
        AttrValue::Text(s) => IppValue::TextWithoutLanguage(s.clone()),
        AttrValue::Name(s) => IppValue::NameWithoutLanguage(s.clone()),
        AttrValue::Resolution { x, y, units } => IppValue::Resolution {
            cross_feed: *x,
            feed: *y,
            units: *units,
        },
        AttrValue::Range { low, high } => IppValue::RangeOfInteger {
            min: *low,
            max: *high,
        },
        // Collections serialize as the memberAttrName/value sequence between
        // begCollection and endCollection (RFC 8010 §3.1.6).
        AttrValue::Collection(set) => {
            let mut members = Vec::with_capacity(set.len() * 2);
            for (name, member) in set {
                members.push(IppValue::MemberAttrName(name.to_string()));
                members.push(to_wire(member));
            }
            IppValue::Collection(members)
        }
        AttrValue::List(values) => IppValue::Array(values.iter().map(to_wire).collect()),
    }
}

/// Lift `ipp` crate values back into our model.  Value syntaxes the session
/// never consumes (dateTime, octetString, …) degrade to their text form.
fn from_wire(value: &IppValue) -> AttrValue {
    match value {
        IppValue::Charset(s) => AttrValue::Charset(s.clone()),
        IppValue::NaturalLanguage(s) => AttrValue::NaturalLanguage(s.clone()),
        IppValue::Uri(s) => AttrValue::Uri(s.clone()),
        IppValue::Keyword(s) => AttrValue::Keyword(s.clone()),
        IppValue::MimeMediaType(s) => AttrValue::Mime(s.clone()),
        IppValue::Integer(v) => AttrValue::Integer(*v),
        IppValue::Enum(v) => AttrValue::Enum(*v),
        IppValue::Boolean(v) => AttrValue::Boolean(*v),
        IppValue::TextWithoutLanguage(s) => AttrValue::Text(s.clone()),
        IppValue::NameWithoutLanguage(s) => AttrValue::Name(s.clone()),
        IppValue::Resolution {
            cross_feed,
            feed,
            units,
        } => AttrValue::Resolution {
            x: *cross_feed,
            y: *feed,
            units: *units,
        },
        IppValue::RangeOfInteger { min, max } => AttrValue::Range {
            low: *min,
            high: *max,
        },
        IppValue::Collection(members) => {
            let mut set = AttributeSet::new();
            let mut iter = members.iter();
            while let Some(member) = iter.next() {
                if let IppValue::MemberAttrName(name) = member
                    && let Some(inner) = iter.next()
                {
                    set.insert(name.clone(), from_wire(inner));
                }
            }
            AttrValue::Collection(set)
        }
        IppValue::Array(values) => AttrValue::List(values.iter().map(from_wire).collect()),
        other => AttrValue::Text(other.to_string()),
    }
}
