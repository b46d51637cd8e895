//! Tests for record implementations
//!
//! These tests verify:
//! - Bit-exact layouts of the built-in record types
//! - byte_length() matches what write() produces
//! - store_compare() against on-disk bytes
//! - update_write() stays inside the record
//! - Decoding failures surface as codec errors

use std::cmp::Ordering;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

use varstore::record::{read_at, write_at};
use varstore::{Decoder, NameCounter, PayloadRecord, Record, RefreshDecoder, StoreError, StringRecord};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_content() -> (TempDir, PathBuf, File) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("content.dat");
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .unwrap();
    (temp_dir, path, file)
}

// =============================================================================
// StringRecord Tests
// =============================================================================

#[test]
fn test_string_record_layout() {
    let (_temp, path, mut file) = setup_content();
    let record = StringRecord::new("abc");

    record.write(&mut file, 0).unwrap();

    assert_eq!(fs::read(&path).unwrap(), [0, 0, 0, 3, b'a', b'b', b'c']);
    assert_eq!(record.byte_length(), 7);
}

#[test]
fn test_string_record_compare_against_disk() {
    let (_temp, _path, mut file) = setup_content();
    StringRecord::new("mango").write(&mut file, 10).unwrap();

    let cmp = |s: &str, file: &mut File| StringRecord::new(s).store_compare(file, 10).unwrap();

    assert_eq!(cmp("apple", &mut file), Ordering::Less);
    assert_eq!(cmp("mango", &mut file), Ordering::Equal);
    assert_eq!(cmp("mangos", &mut file), Ordering::Greater);
    assert_eq!(cmp("zebra", &mut file), Ordering::Greater);
}

#[test]
fn test_string_record_refresh_read() {
    let (_temp, _path, mut file) = setup_content();
    StringRecord::new("first").write(&mut file, 0).unwrap();
    StringRecord::new("sécond").write(&mut file, 9).unwrap();

    let mut record = StringRecord::default();
    record.refresh_read(&mut file, 9).unwrap();
    assert_eq!(record.value(), "sécond");

    assert_eq!(StringRecord::read_at(&mut file, 0).unwrap().value(), "first");
}

#[test]
fn test_string_record_rejects_invalid_utf8() {
    let (_temp, _path, mut file) = setup_content();
    write_at(&mut file, 0, &[0, 0, 0, 2, 0xff, 0xfe]).unwrap();

    let err = StringRecord::read_at(&mut file, 0).unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
}

#[test]
fn test_negative_length_header_is_codec_error() {
    let (_temp, _path, mut file) = setup_content();
    write_at(&mut file, 0, &(-5i32).to_be_bytes()).unwrap();

    let err = StringRecord::read_at(&mut file, 0).unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
}

#[test]
fn test_truncated_record_is_io_error() {
    let (_temp, _path, mut file) = setup_content();
    write_at(&mut file, 0, &[0, 0, 0, 10, b'x']).unwrap();

    let err = StringRecord::read_at(&mut file, 0).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
}

// =============================================================================
// NameCounter Tests
// =============================================================================

#[test]
fn test_name_counter_layout() {
    let (_temp, path, mut file) = setup_content();
    let record = NameCounter::new("A", 258);

    record.write(&mut file, 0).unwrap();

    assert_eq!(fs::read(&path).unwrap(), [0, 0, 0, 1, b'A', 0, 0, 1, 2]);
    assert_eq!(record.byte_length(), 9);
}

#[test]
fn test_name_counter_compares_by_name_only() {
    let (_temp, _path, mut file) = setup_content();
    NameCounter::new("bob", 1).write(&mut file, 0).unwrap();

    let probe = NameCounter::new("bob", 999);
    assert_eq!(probe.store_compare(&mut file, 0).unwrap(), Ordering::Equal);
    assert_eq!(
        NameCounter::new("al", 1).store_compare(&mut file, 0).unwrap(),
        Ordering::Less
    );
}

#[test]
fn test_name_counter_update_write_touches_only_counter() {
    let (_temp, path, mut file) = setup_content();
    NameCounter::new("ab", 1).write(&mut file, 4).unwrap();
    write_at(&mut file, 14, b"tail").unwrap();
    let before = fs::read(&path).unwrap();

    NameCounter::new("ab", -1).update_write(&mut file, 4).unwrap();

    let after = fs::read(&path).unwrap();
    assert_eq!(after.len(), before.len());
    assert_eq!(&after[..10], &before[..10]);
    assert_eq!(&after[10..14], &[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(&after[14..], b"tail");
    assert_eq!(NameCounter::read_at(&mut file, 4).unwrap().counter(), -1);
}

#[test]
fn test_name_counter_increment() {
    let mut record = NameCounter::new("n", i32::MAX);
    assert_eq!(record.increment(1), i32::MIN);
    record.set_counter(5);
    assert_eq!(record.increment(-2), 3);
}

// =============================================================================
// PayloadRecord Tests
// =============================================================================

#[test]
fn test_payload_record_layout_and_length() {
    let (_temp, path, mut file) = setup_content();
    let record = PayloadRecord::new("k", 7u32).unwrap();

    record.write(&mut file, 0).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, record.byte_length());
    assert_eq!(&bytes[..9], &[0, 0, 0, 1, b'k', 0, 0, 0, 4]);
    assert_eq!(&bytes[9..], &7u32.to_le_bytes());
}

#[test]
fn test_payload_record_set_value_changes_length() {
    let mut record = PayloadRecord::new("key", vec![1u8]).unwrap();
    let before = record.byte_length();

    record.set_value(vec![1, 2, 3]).unwrap();

    assert_eq!(record.byte_length(), before + 2);
    assert_eq!(record.value(), &vec![1, 2, 3]);
}

#[test]
fn test_payload_record_read_back() {
    let (_temp, _path, mut file) = setup_content();
    let record = PayloadRecord::new("pair", (3i64, "three".to_string())).unwrap();
    record.write(&mut file, 5).unwrap();

    let decoded: PayloadRecord<(i64, String)> = PayloadRecord::read_at(&mut file, 5).unwrap();
    assert_eq!(decoded, record);
    assert_eq!(
        PayloadRecord::new("pair", (0i64, String::new()))
            .unwrap()
            .store_compare(&mut file, 5)
            .unwrap(),
        Ordering::Equal
    );
}

#[test]
fn test_payload_record_bad_payload_is_codec_error() {
    let (_temp, _path, mut file) = setup_content();
    // Key "k", payload of one byte where a u64 is expected
    write_at(&mut file, 0, &[0, 0, 0, 1, b'k', 0, 0, 0, 1, 9]).unwrap();

    let err = PayloadRecord::<u64>::read_at(&mut file, 0).unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
}

// =============================================================================
// Decoder Tests
// =============================================================================

#[test]
fn test_refresh_decoder_and_function_decoder_agree() {
    let (_temp, _path, mut file) = setup_content();
    NameCounter::new("same", 42).write(&mut file, 0).unwrap();

    let by_refresh = RefreshDecoder::<NameCounter>::new().decode(&mut file, 0).unwrap();
    let by_fn = NameCounter::read_at.decode(&mut file, 0).unwrap();

    assert_eq!(by_refresh, by_fn);
    assert_eq!(by_fn, NameCounter::new("same", 42));
}

#[test]
fn test_read_at_helper() {
    let (_temp, _path, mut file) = setup_content();
    write_at(&mut file, 3, b"xyz").unwrap();

    assert_eq!(read_at(&mut file, 3, 3).unwrap(), b"xyz");
    assert_eq!(read_at(&mut file, 0, 3).unwrap(), [0, 0, 0]);
}
