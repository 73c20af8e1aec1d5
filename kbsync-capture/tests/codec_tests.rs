//! Tests for the event wire codec.

use kbsync_capture::codec::{decode_frame, encode_frame, read_event, write_event, MAX_FRAME_SIZE};
use kbsync_types::{Address, EventPayload, SequencedEvent, SnapshotId, Tick};
use std::io::Cursor;

fn event(tick: u64) -> SequencedEvent {
    SequencedEvent::new(
        SnapshotId::new(),
        Tick::new(tick),
        EventPayload::CommentChanged { ea: Address::new(0x1000), comment: "entry".into(), repeatable: false },
    )
}

/// Helper: write a raw length-prefixed payload into a buffer.
fn make_length_prefixed(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

// ── Frames ───────────────────────────────────────────────────────

#[test]
fn test_frame_has_big_endian_length_prefix() {
    let frame = encode_frame(&event(1)).unwrap();
    let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    assert_eq!(len, frame.len() - 4);
}

#[test]
fn test_decode_needs_whole_frame() {
    let frame = encode_frame(&event(1)).unwrap();
    assert!(decode_frame(&frame[..2]).unwrap().is_none());
    assert!(decode_frame(&frame[..frame.len() - 1]).unwrap().is_none());
}

#[test]
fn test_decode_reports_consumed_bytes() {
    let mut buf = encode_frame(&event(1)).unwrap();
    let first_len = buf.len();
    buf.extend(encode_frame(&event(2)).unwrap());

    let (first, used) = decode_frame(&buf).unwrap().unwrap();
    assert_eq!(used, first_len);
    assert_eq!(first.tick, Tick::new(1));

    let (second, _) = decode_frame(&buf[used..]).unwrap().unwrap();
    assert_eq!(second.tick, Tick::new(2));
}

#[test]
fn test_decode_rejects_oversized_prefix() {
    let huge = (MAX_FRAME_SIZE as u32 + 1).to_be_bytes();
    assert!(decode_frame(&huge).is_err());
}

#[test]
fn test_decode_rejects_bad_json() {
    assert!(decode_frame(&make_length_prefixed(b"{not json")).is_err());
}

// ── Async streams ────────────────────────────────────────────────

#[tokio::test]
async fn test_write_then_read() {
    let original = event(7);
    let mut buf = Vec::new();
    write_event(&mut buf, &original).await.unwrap();

    let mut reader = Cursor::new(buf);
    assert_eq!(read_event(&mut reader).await.unwrap(), original);
}

#[tokio::test]
async fn test_read_event_too_large() {
    let huge_len: u32 = 16 * 1024 * 1024 + 1;
    let mut reader = Cursor::new(huge_len.to_be_bytes().to_vec());
    let err = read_event(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("frame too large"));
}

#[tokio::test]
async fn test_read_event_truncated_body() {
    let mut data = make_length_prefixed(b"{\"snapshot\":");
    data.truncate(data.len() - 3);
    let mut reader = Cursor::new(data);
    let err = read_event(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[tokio::test]
async fn test_read_event_invalid_json() {
    let mut reader = Cursor::new(make_length_prefixed(b"[1,2,3]"));
    let err = read_event(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("JSON decode error"));
}

#[tokio::test]
async fn test_read_event_empty_stream() {
    let mut reader = Cursor::new(Vec::new());
    assert!(read_event(&mut reader).await.is_err());
}

#[tokio::test]
async fn test_read_event_truncated_length() {
    let mut reader = Cursor::new(vec![0u8, 0]);
    let err = read_event(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[tokio::test]
async fn test_read_event_zero_length_invalid_json() {
    let mut reader = Cursor::new(make_length_prefixed(b""));
    let err = read_event(&mut reader).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}
