// POR and RIM placement files

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use rvlevel_lib::error::DecodeError;
use rvlevel_lib::placement::{
    decode_por, decode_rim, encode_por, encode_rim, read_por, read_rim, PorFile, RimFile,
};

#[path = "common/mod.rs"]
mod common;

use common::Bytes;

fn por_entry(b: Bytes, entry_type: u32, id: u32) -> Bytes {
    b.u32(entry_type)
        .u32(id)
        .u32(id + 1)
        .vector(10.0, -20.0, 30.0)
        .floats(&[0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0])
        .vector(100.0, 50.0, 8.0)
        .floats(&[0.0, 0.0, 0.0, 0.0])
}

fn rim_entry(b: Bytes, flags: u32) -> Bytes {
    b.u32(flags)
        .vector(0.0, -1.0, 0.0)
        .f32(-12.5)
        .floats(&[0.0, 64.0, 12.5, 12.5, 0.0, 64.0])
        .vector(0.0, 12.5, 0.0)
        .vector(64.0, 12.5, 0.0)
        .vector(64.0, 12.5, 64.0)
        .vector(0.0, 12.5, 64.0)
}

#[test]
fn por_round_trips_exactly() {
    common::init_tracing();
    let bytes = por_entry(por_entry(Bytes::new().i32(2), 0, 1), 1, 3).build();
    assert_eq!(bytes.len(), 4 + 2 * 88);

    let por = decode_por(&bytes).expect("Failed to decode POR");
    assert_eq!(por.entries.len(), 2);
    assert_eq!(por.entries[1].ids, [3, 4]);
    assert_eq!(por.entries[0].rotation[2], [-1.0, 0.0, 0.0]);
    assert!(por.entries.iter().all(|e| e.reserved_is_zero()));
    assert_eq!(encode_por(&por).unwrap(), bytes);
}

#[test]
fn por_reserved_bits_are_preserved() {
    let mut bytes = por_entry(Bytes::new().i32(1), 0, 0).build();
    let tail = bytes.len() - 16;
    bytes[tail..tail + 4].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());

    let por = decode_por(&bytes).unwrap();
    assert!(!por.entries[0].reserved_is_zero());
    assert_eq!(encode_por(&por).unwrap(), bytes);
}

#[test]
fn rim_round_trips_exactly() {
    let bytes = rim_entry(rim_entry(Bytes::new().i16(2), 0), 1).build();
    assert_eq!(bytes.len(), 2 + 2 * 92);

    let rim = decode_rim(&bytes).expect("Failed to decode RIM");
    assert_eq!(rim.entries[1].flags, 1);
    assert!(rim.entries.iter().all(|e| e.bbox_contains_vertices()));
    assert_eq!(encode_rim(&rim).unwrap(), bytes);
}

#[test]
fn empty_placement_files() {
    assert_eq!(decode_por(&[0, 0, 0, 0]).unwrap(), PorFile::default());
    assert_eq!(decode_rim(&[0, 0]).unwrap(), RimFile::default());
    assert_eq!(encode_rim(&RimFile::default()).unwrap(), vec![0, 0]);
}

#[test]
fn rim_count_without_entries_is_truncation() {
    let bytes = Bytes::new().i16(1).build();
    match decode_rim(&bytes) {
        Err(DecodeError::TruncatedStream { stream_len }) => assert_eq!(stream_len, 2),
        other => panic!("expected TruncatedStream, got {other:?}"),
    }
}

#[test]
fn partial_por_entry_is_truncation() {
    let mut bytes = por_entry(Bytes::new().i32(1), 0, 0).build();
    bytes.truncate(50);
    assert!(matches!(
        decode_por(&bytes),
        Err(DecodeError::TruncatedStream { stream_len: 50 })
    ));
}

#[test]
fn absurd_por_count_is_malformed() {
    let bytes = Bytes::new().i32(1_000_000).build();
    match decode_por(&bytes) {
        Err(DecodeError::MalformedCount { position, detail }) => {
            assert_eq!(position, 0);
            assert_eq!(detail.count, 1_000_000);
            assert_eq!(detail.remaining, 0);
            assert_eq!(detail.min_element_size, 88);
        }
        other => panic!("expected MalformedCount, got {other:?}"),
    }
}

#[test]
fn trailing_bytes_are_ignored() {
    let mut bytes = rim_entry(Bytes::new().i16(1), 0).build();
    bytes.extend_from_slice(&[0xAA; 3]);
    let rim = decode_rim(&bytes).unwrap();
    assert_eq!(rim.entries.len(), 1);
}

/// Log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn stream_readers_log_like_byte_decoders() {
    let logs = Captured::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || sink.clone())
        .finish();

    let por_bytes = por_entry(por_entry(Bytes::new().i32(2), 0, 1), 1, 3).build();
    let rim_bytes = rim_entry(Bytes::new().i16(1), 0).build();
    tracing::subscriber::with_default(subscriber, || {
        let por = read_por(&mut Cursor::new(&por_bytes)).expect("Failed to read POR");
        assert_eq!(por.entries.len(), 2);
        let rim = read_rim(&mut Cursor::new(&rim_bytes)).expect("Failed to read RIM");
        assert_eq!(rim.entries.len(), 1);
    });

    let text = logs.text();
    assert!(text.contains("decoded por"), "{text}");
    assert!(text.contains("entries=2"), "{text}");
    assert!(text.contains("decoded rim"), "{text}");
    assert!(text.contains("entries=1"), "{text}");
}
