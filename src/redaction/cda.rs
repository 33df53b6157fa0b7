//! HL7 CDA document redaction
//!
//! Rewrites a clinical XML document token by token, blanking the
//! patient-identifying pieces while leaving document structure intact. The
//! rewrite never builds a DOM: every token is re-emitted as soon as its rules
//! have been applied.
//!
//! Identity rules:
//! - all text under a `family` element is blanked, at any depth
//! - the `value` attribute of `birthTime` elements is dropped
//! - the `extension` attribute of `id` elements inside `patientPatient`
//!   is rewritten to an empty string, keeping the attribute itself
//!
//! Namespace prefixes and `xmlns` declarations are stripped from every
//! emitted element and attribute.

use crate::domain::{CardiomaskError, DemographicHints, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

/// Element whose text content carries the patient's family name.
const FAMILY_ELEMENT: &str = "family";

/// Element wrapping the patient's identity block.
const PATIENT_ELEMENT: &str = "patientPatient";

/// Element carrying the date of birth in its `value` attribute.
const BIRTH_TIME_ELEMENT: &str = "birthTime";

/// Redacts patient identity from a CDA document.
///
/// The output is structurally isomorphic to the input: identical element
/// order, no namespace declarations, and the substitutions described at the
/// module level.
///
/// # Errors
///
/// Returns [`CardiomaskError::XmlParse`] on any tokenization failure; the
/// caller is expected to skip the file.
pub fn redact(input: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(input);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    // Depth counters rather than booleans, so a same-named element nested
    // inside itself keeps the scope open until the outermost one closes.
    let mut family_depth = 0usize;
    let mut patient_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => {
                let local = utf8_name(e.local_name().as_ref())?;
                if local == FAMILY_ELEMENT {
                    family_depth += 1;
                }
                if local == PATIENT_ELEMENT {
                    patient_depth += 1;
                }
                let element = rewrite_element(&e, &local, patient_depth > 0)?;
                writer
                    .write_event(Event::Start(element))
                    .map_err(write_error)?;
            }
            Event::Empty(e) => {
                let local = utf8_name(e.local_name().as_ref())?;
                let element = rewrite_element(&e, &local, patient_depth > 0)?;
                writer
                    .write_event(Event::Empty(element))
                    .map_err(write_error)?;
            }
            Event::End(e) => {
                let local = utf8_name(e.local_name().as_ref())?;
                if local == FAMILY_ELEMENT {
                    family_depth = family_depth.saturating_sub(1);
                }
                if local == PATIENT_ELEMENT {
                    patient_depth = patient_depth.saturating_sub(1);
                }
                writer
                    .write_event(Event::End(BytesEnd::new(local)))
                    .map_err(write_error)?;
            }
            Event::Text(e) => {
                if family_depth > 0 {
                    writer
                        .write_event(Event::Text(BytesText::new("")))
                        .map_err(write_error)?;
                } else {
                    writer.write_event(Event::Text(e)).map_err(write_error)?;
                }
            }
            Event::CData(e) => {
                if family_depth > 0 {
                    writer
                        .write_event(Event::Text(BytesText::new("")))
                        .map_err(write_error)?;
                } else {
                    writer.write_event(Event::CData(e)).map_err(write_error)?;
                }
            }
            Event::Eof => break,
            other => writer.write_event(other).map_err(write_error)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

/// Extracts best-effort demographic hints from a CDA document.
///
/// Returns the first non-empty family-name text found inside the patient
/// identity block, and the birth period (`YYYY/MM`) from the first
/// `birthTime` element carrying a parseable `value`. Never fails: a malformed
/// document simply yields whatever was gathered before the error.
pub fn extract_demographics(input: &[u8]) -> DemographicHints {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut hints = DemographicHints::default();
    let mut family_depth = 0usize;
    let mut patient_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let Ok(local) = utf8_name(e.local_name().as_ref()) else {
                    break;
                };
                if local == PATIENT_ELEMENT {
                    patient_depth += 1;
                }
                if local == FAMILY_ELEMENT && patient_depth > 0 {
                    family_depth += 1;
                }
                if local == BIRTH_TIME_ELEMENT && hints.birth_period.is_empty() {
                    if let Some(period) = birth_period_attribute(&e) {
                        hints.birth_period = period;
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let Ok(local) = utf8_name(e.local_name().as_ref()) else {
                    break;
                };
                if local == BIRTH_TIME_ELEMENT && hints.birth_period.is_empty() {
                    if let Some(period) = birth_period_attribute(&e) {
                        hints.birth_period = period;
                    }
                }
            }
            Ok(Event::End(e)) => {
                let Ok(local) = utf8_name(e.local_name().as_ref()) else {
                    break;
                };
                if local == PATIENT_ELEMENT {
                    patient_depth = patient_depth.saturating_sub(1);
                }
                if local == FAMILY_ELEMENT {
                    family_depth = family_depth.saturating_sub(1);
                }
            }
            Ok(Event::Text(e)) => {
                if family_depth > 0 && hints.name.is_empty() {
                    if let Ok(text) = e.unescape() {
                        let text = text.trim();
                        if !text.is_empty() {
                            hints.name = text.to_string();
                        }
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            Ok(_) => {}
        }
        buf.clear();
    }

    hints
}

/// Rebuilds an element with its namespace stripped and identity attributes
/// rewritten.
fn rewrite_element(
    element: &BytesStart<'_>,
    local: &str,
    inside_patient: bool,
) -> Result<BytesStart<'static>> {
    let mut out = BytesStart::new(local.to_string());

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| {
            CardiomaskError::XmlParse(format!("malformed attribute in <{local}>: {e}"))
        })?;

        let raw_key = attribute.key.as_ref();
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }

        let key = utf8_name(attribute.key.local_name().as_ref())?;
        if local == BIRTH_TIME_ELEMENT && key == "value" {
            continue;
        }

        if local == "id" && inside_patient && key == "extension" {
            out.push_attribute((key.as_str(), ""));
            continue;
        }

        let value = attribute
            .unescape_value()
            .map_err(|e| CardiomaskError::XmlParse(format!("bad attribute value: {e}")))?;
        out.push_attribute((key.as_str(), value.as_ref()));
    }

    Ok(out)
}

/// Reads the `value` attribute of a `birthTime` element and reduces it to
/// year/month granularity. Expects at least `YYYYMM` of digits.
fn birth_period_attribute(element: &BytesStart<'_>) -> Option<String> {
    for attribute in element.attributes().flatten() {
        if attribute.key.local_name().as_ref() == b"value" {
            let value = attribute.unescape_value().ok()?;
            let value = value.trim();
            if value.len() >= 6 && value[..6].bytes().all(|b| b.is_ascii_digit()) {
                return Some(format!("{}/{}", &value[..4], &value[4..6]));
            }
            return None;
        }
    }
    None
}

fn utf8_name(raw: &[u8]) -> Result<String> {
    std::str::from_utf8(raw)
        .map(|s| s.to_string())
        .map_err(|e| CardiomaskError::XmlParse(format!("non-UTF-8 name: {e}")))
}

fn xml_error(err: quick_xml::Error) -> CardiomaskError {
    CardiomaskError::XmlParse(err.to_string())
}

fn write_error<E: std::fmt::Display>(err: E) -> CardiomaskError {
    CardiomaskError::Io(err.to_string())
}
