//! MFER waveform redaction
//!
//! Removes the patient-identifying fields from an MFER (Medical waveform
//! Format Encoding Rules) binary container. The format is a flat
//! tag-length-value sequence; only the identity-bearing tags are interpreted,
//! every other field passes through as an opaque byte range.
//!
//! The pass scans the buffer once, records the spans occupied by identity
//! fields, and assembles the output by copying the retained spans into a
//! fresh buffer.

use crate::domain::{CardiomaskError, Result};
use std::ops::Range;

/// Padding tag: no length or value follows.
const TAG_ZERO: u8 = 0x00;

/// End-of-content tag: scanning stops here.
const TAG_END: u8 = 0x80;

/// Channel attribute tag. Carries its own 1-byte sub-length immediately after
/// the generic header; the sub-length governs the value that follows.
const TAG_CHANNEL_ATTRIBUTE: u8 = 0x3f;

/// Patient name tag.
const TAG_PATIENT_NAME: u8 = 0x81;

/// Patient identifier tag.
const TAG_PATIENT_ID: u8 = 0x82;

/// Patient age and birthdate tag.
const TAG_PATIENT_AGE: u8 = 0x83;

/// Removes patient name, identifier, and age/birthdate fields from an MFER
/// buffer.
///
/// The output is byte-identical to the input outside the redacted spans:
/// field order and all non-identity content are preserved exactly. Each
/// removed field loses its tag byte, its full length encoding, and its value.
///
/// # Errors
///
/// Returns [`CardiomaskError::Decode`] if a length-of-length header declares
/// more than 4 bytes, or if any header or value runs past the end of the
/// buffer. The caller is expected to skip the file; partial output is never
/// produced.
pub fn redact(input: &[u8]) -> Result<Vec<u8>> {
    let spans = scan_identity_spans(input)?;
    Ok(copy_retained(input, &spans))
}

/// Scans the TLV stream and returns the byte ranges of identity fields,
/// in ascending order.
fn scan_identity_spans(input: &[u8]) -> Result<Vec<Range<usize>>> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < input.len() {
        let field_start = i;
        let tag = input[i];
        i += 1;

        if tag == TAG_ZERO {
            continue;
        }
        if tag == TAG_END {
            break;
        }

        let length_byte = read_byte(input, i)?;
        i += 1;

        let mut length = u32::from(length_byte);
        if length_byte > 0x7f {
            // Extended form: low 7 bits give the count of big-endian length
            // bytes that follow, left-padded to a 4-byte width.
            let num_bytes = usize::from(length_byte & 0x7f);
            if num_bytes > 4 {
                return Err(CardiomaskError::Decode(format!(
                    "length-of-length {} exceeds 4 bytes at offset {}",
                    num_bytes,
                    i - 1
                )));
            }
            let end = i.checked_add(num_bytes).filter(|&e| e <= input.len());
            let Some(end) = end else {
                return Err(CardiomaskError::Decode(format!(
                    "extended length truncated at offset {i}"
                )));
            };
            let mut padded = [0u8; 4];
            padded[4 - num_bytes..].copy_from_slice(&input[i..end]);
            length = u32::from_be_bytes(padded);
            i = end;
        }

        if tag == TAG_CHANNEL_ATTRIBUTE {
            // The channel attribute re-reads one byte as its own sub-length.
            length = u32::from(read_byte(input, i)?);
            i += 1;
        }

        let value_end = i
            .checked_add(length as usize)
            .filter(|&e| e <= input.len())
            .ok_or_else(|| {
                CardiomaskError::Decode(format!(
                    "field 0x{tag:02x} value of {length} bytes runs past end of buffer"
                ))
            })?;

        if matches!(tag, TAG_PATIENT_NAME | TAG_PATIENT_ID | TAG_PATIENT_AGE) {
            spans.push(field_start..value_end);
        }

        i = value_end;
    }

    Ok(spans)
}

/// Builds the output buffer from everything outside the given spans.
fn copy_retained(input: &[u8], spans: &[Range<usize>]) -> Vec<u8> {
    let dropped: usize = spans.iter().map(|s| s.len()).sum();
    let mut output = Vec::with_capacity(input.len() - dropped);
    let mut pos = 0;
    for span in spans {
        output.extend_from_slice(&input[pos..span.start]);
        pos = span.end;
    }
    output.extend_from_slice(&input[pos..]);
    output
}

fn read_byte(input: &[u8], at: usize) -> Result<u8> {
    input.get(at).copied().ok_or_else(|| {
        CardiomaskError::Decode(format!("unexpected end of buffer at offset {at}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 12-lead ECG header: preamble, byte order, character code, then the
    /// three identity fields.
    fn sample_record() -> Vec<u8> {
        let mut data = Vec::new();
        // Preamble
        data.extend_from_slice(&[
            0x40, 0x20, 0x4d, 0x46, 0x52, 0x20, 0x53, 0x74, 0x61, 0x6e, 0x64, 0x61, 0x72, 0x64,
            0x20, 0x31, 0x32, 0x20, 0x6c, 0x65, 0x61, 0x64, 0x73, 0x20, 0x45, 0x43, 0x47, 0x20,
            0x20, 0x20, 0x20, 0x20, 0x20, 0x20,
        ]);
        // Byte order
        data.extend_from_slice(&[0x01, 0x01, 0x01]);
        // Character code
        data.extend_from_slice(&[0x03, 0x08, 0x55, 0x4e, 0x49, 0x43, 0x4f, 0x44, 0x45, 0x00]);
        // Patient name
        data.extend_from_slice(&[
            0x81, 0x2a, 0xe5, 0x85, 0x89, 0xe9, 0x9b, 0xbb, 0xe3, 0x80, 0x80, 0xe8, 0x8a, 0xb1,
            0xe5, 0xad, 0x90, 0x5e, 0xef, 0xbd, 0xba, 0xef, 0xbd, 0xb3, 0xef, 0xbe, 0x83, 0xef,
            0xbe, 0x9e, 0xef, 0xbe, 0x9d, 0x20, 0xef, 0xbe, 0x8a, 0xef, 0xbe, 0x85, 0xef, 0xbd,
            0xba, 0x00,
        ]);
        // Patient ID
        data.extend_from_slice(&[
            0x82, 0x0b, 0x31, 0x31, 0x32, 0x33, 0x37, 0x30, 0x30, 0x30, 0x35, 0x31, 0x00,
        ]);
        // Age and birthdate
        data.extend_from_slice(&[0x83, 0x07, 0x16, 0xfe, 0x1f, 0xc0, 0x07, 0x0b, 0x17]);
        data
    }

    #[test]
    fn test_redact_removes_all_identity_fields() {
        let input = sample_record();
        let output = redact(&input).unwrap();
        // Everything up to the patient name field survives untouched.
        assert_eq!(output, &input[..47]);
    }

    #[test]
    fn test_redact_is_identity_without_identity_fields() {
        let input = vec![
            0x40, 0x03, 0x4d, 0x46, 0x52, // preamble
            0x01, 0x01, 0x01, // byte order
            0x84, 0x01, 0x02, // patient sex, retained
        ];
        assert_eq!(redact(&input).unwrap(), input);
    }

    #[test]
    fn test_redact_single_field_shrinks_by_encoded_size() {
        let mut input = vec![0x40, 0x02, 0xaa, 0xbb];
        input.extend_from_slice(&[0x82, 0x03, 0x31, 0x32, 0x33]); // 5 encoded bytes
        input.extend_from_slice(&[0x01, 0x01, 0x01]);

        let output = redact(&input).unwrap();
        assert_eq!(output.len(), input.len() - 5);
        assert_eq!(output, vec![0x40, 0x02, 0xaa, 0xbb, 0x01, 0x01, 0x01]);
    }

    #[test]
    fn test_redact_extended_length_identity_field() {
        // Patient name with a 1-byte extended length encoding (0x81 => one
        // length byte follows).
        let mut input = vec![0x40, 0x01, 0x00];
        input.push(0x81); // tag
        input.push(0x81); // extended form, 1 length byte
        input.push(0x05);
        input.extend_from_slice(b"alice");
        input.extend_from_slice(&[0x01, 0x01, 0x01]);

        let output = redact(&input).unwrap();
        assert_eq!(output, vec![0x40, 0x01, 0x00, 0x01, 0x01, 0x01]);
    }

    #[test]
    fn test_redact_extended_length_passthrough_field() {
        // A 300-byte opaque field with a 2-byte extended length.
        let mut input = vec![0x08, 0x82, 0x01, 0x2c];
        input.extend(std::iter::repeat(0x55).take(300));
        input.extend_from_slice(&[0x82, 0x02, 0x34, 0x32]); // patient ID, removed

        let output = redact(&input).unwrap();
        assert_eq!(output, &input[..304]);
    }

    #[test]
    fn test_redact_zero_and_end_sentinels() {
        let input = vec![
            0x00, 0x00, // padding, no header follows
            0x82, 0x02, 0x34, 0x32, // patient ID, removed
            0x80, // end of content
            0x82, 0xff, // opaque trailing bytes, never scanned
        ];
        let output = redact(&input).unwrap();
        assert_eq!(output, vec![0x00, 0x00, 0x80, 0x82, 0xff]);
    }

    #[test]
    fn test_redact_channel_attribute_sub_length() {
        // Channel attribute: generic length byte (ignored), then a 1-byte
        // sub-length of 2 governing the value.
        let input = vec![
            0x3f, 0x05, 0x02, 0xaa, 0xbb, // channel attribute
            0x82, 0x01, 0x39, // patient ID, removed
            0x01, 0x01, 0x01, // byte order
        ];
        let output = redact(&input).unwrap();
        assert_eq!(output, vec![0x3f, 0x05, 0x02, 0xaa, 0xbb, 0x01, 0x01, 0x01]);
    }

    #[test]
    fn test_redact_rejects_wide_length_of_length() {
        let input = vec![0x40, 0x85, 0x00, 0x00, 0x00, 0x00, 0x01];
        let err = redact(&input).unwrap_err();
        assert!(matches!(err, CardiomaskError::Decode(_)));
        assert!(err.to_string().contains("exceeds 4 bytes"));
    }

    #[test]
    fn test_redact_rejects_truncated_value() {
        let input = vec![0x40, 0x10, 0x01];
        let err = redact(&input).unwrap_err();
        assert!(matches!(err, CardiomaskError::Decode(_)));
    }

    #[test]
    fn test_redact_rejects_truncated_extended_length() {
        let input = vec![0x40, 0x82, 0x01];
        let err = redact(&input).unwrap_err();
        assert!(matches!(err, CardiomaskError::Decode(_)));
    }

    #[test]
    fn test_redact_rejects_missing_length_byte() {
        let input = vec![0x40];
        let err = redact(&input).unwrap_err();
        assert!(matches!(err, CardiomaskError::Decode(_)));
    }

    #[test]
    fn test_redact_empty_buffer() {
        assert_eq!(redact(&[]).unwrap(), Vec::<u8>::new());
    }
}
