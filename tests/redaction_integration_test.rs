//! Integration tests for the redaction pipeline with a realistic MFER record
//! and CDA document

use cardiomask::domain::RawFile;
use cardiomask::redaction::{cda, mfer, FileDispatcher, Outcome};
use cardiomask::store::PseudonymStore;
use sha2::{Digest, Sha256};

/// 12-lead ECG header carrying all three identity fields, as produced by a
/// hospital MFER exporter.
fn mfer_record() -> Vec<u8> {
    let mut data = Vec::new();
    // Preamble: "MFR Standard 12 leads ECG"
    data.extend_from_slice(&[
        0x40, 0x20, 0x4d, 0x46, 0x52, 0x20, 0x53, 0x74, 0x61, 0x6e, 0x64, 0x61, 0x72, 0x64, 0x20,
        0x31, 0x32, 0x20, 0x6c, 0x65, 0x61, 0x64, 0x73, 0x20, 0x45, 0x43, 0x47, 0x20, 0x20, 0x20,
        0x20, 0x20, 0x20, 0x20,
    ]);
    // Byte order
    data.extend_from_slice(&[0x01, 0x01, 0x01]);
    // Character code
    data.extend_from_slice(&[0x03, 0x08, 0x55, 0x4e, 0x49, 0x43, 0x4f, 0x44, 0x45, 0x00]);
    // Patient name
    data.extend_from_slice(&[
        0x81, 0x2a, 0xe5, 0x85, 0x89, 0xe9, 0x9b, 0xbb, 0xe3, 0x80, 0x80, 0xe8, 0x8a, 0xb1, 0xe5,
        0xad, 0x90, 0x5e, 0xef, 0xbd, 0xba, 0xef, 0xbd, 0xb3, 0xef, 0xbe, 0x83, 0xef, 0xbe, 0x9e,
        0xef, 0xbe, 0x9d, 0x20, 0xef, 0xbe, 0x8a, 0xef, 0xbe, 0x85, 0xef, 0xbd, 0xba, 0x00,
    ]);
    // Patient ID "1123700051"
    data.extend_from_slice(&[
        0x82, 0x0b, 0x31, 0x31, 0x32, 0x33, 0x37, 0x30, 0x30, 0x30, 0x35, 0x31, 0x00,
    ]);
    // Age and birthdate
    data.extend_from_slice(&[0x83, 0x07, 0x16, 0xfe, 0x1f, 0xc0, 0x07, 0x0b, 0x17]);
    data
}

fn cda_document() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<ClinicalDocument xmlns="urn:hl7-org:v3">
<recordTarget><patientRole>
<patientPatient>
<id root="1.2.392.200119" extension="P001"/>
<name><family>Koden</family><given>Hanako</given></name>
<birthTime value="19920715000000"/>
</patientPatient>
</patientRole></recordTarget>
</ClinicalDocument>"#
        .to_string()
}

fn expected_pseudonym(id: &str, seed: &str) -> String {
    hex::encode(Sha256::digest(format!("{id}{seed}").as_bytes()))
}

#[test]
fn test_mfer_record_redacts_to_non_identity_prefix() {
    let input = mfer_record();
    let output = mfer::redact(&input).unwrap();

    // Preamble, byte order, and character code survive untouched; the three
    // identity fields vanish with their headers.
    assert_eq!(output, &input[..47]);
    // The patient ID digits are gone wholesale.
    assert!(!output
        .windows(10)
        .any(|w| w == "1123700051".as_bytes()));
}

#[test]
fn test_cda_document_loses_identity_but_keeps_structure() {
    let output = cda::redact(cda_document().as_bytes()).unwrap();
    let output = String::from_utf8(output).unwrap();

    assert!(!output.contains("xmlns"));
    assert!(!output.contains("Koden"));
    assert!(!output.contains("19920715"));
    assert!(output.contains(r#"<id root="1.2.392.200119" extension=""/>"#));
    assert!(output.contains("<birthTime/>"));
    assert!(output.contains("<given>Hanako</given>"));
    // Element order is untouched.
    let record_target = output.find("<recordTarget>").unwrap();
    let patient = output.find("<patientPatient>").unwrap();
    assert!(record_target < patient);
}

#[test]
fn test_dispatcher_end_to_end_renames_and_redacts() {
    let store = PseudonymStore::open_in_memory().unwrap();
    let dispatcher = FileDispatcher::new(store.clone());
    let pseudonym = expected_pseudonym("P001", "secret");

    let waveform = RawFile::new("P001_20230101.mwf", mfer_record());
    let document = RawFile::new("P001_20230101.xml", cda_document().into_bytes());

    let outputs: Vec<RawFile> = [waveform, document]
        .iter()
        .map(|file| match dispatcher.process(file, "secret").unwrap() {
            Outcome::Redacted(output) => output,
            Outcome::Skipped => panic!("expected a redacted file"),
        })
        .collect();

    assert_eq!(outputs[0].name, format!("{pseudonym}_20230101.mwf"));
    assert_eq!(outputs[1].name, format!("{pseudonym}_20230101.xml"));
    for output in &outputs {
        assert!(!output.name.contains("P001"));
    }

    // Both files resolved the same identifier, so the store holds one record
    // enriched with the document's demographics.
    let records = store.export_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "P001");
    assert_eq!(records[0].pseudonym, pseudonym);
    assert_eq!(records[0].name, "Koden");
    assert_eq!(records[0].birth_period, "1992/07");
}

#[test]
fn test_dispatcher_pseudonym_survives_seed_change() {
    let store = PseudonymStore::open_in_memory().unwrap();
    let dispatcher = FileDispatcher::new(store);

    let file = RawFile::new("P001_20230101.mwf", mfer_record());
    let first = match dispatcher.process(&file, "seed-one").unwrap() {
        Outcome::Redacted(output) => output.name,
        Outcome::Skipped => panic!("expected a redacted file"),
    };
    let second = match dispatcher.process(&file, "seed-two").unwrap() {
        Outcome::Redacted(output) => output.name,
        Outcome::Skipped => panic!("expected a redacted file"),
    };

    assert_eq!(first, second);
    assert!(first.starts_with(&expected_pseudonym("P001", "seed-one")));
}
