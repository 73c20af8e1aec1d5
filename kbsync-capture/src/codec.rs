//! Wire framing for sequenced events.
//!
//! Each frame is a 4-byte big-endian length followed by the event as JSON.

use crate::error::CaptureResult;
use kbsync_types::SequencedEvent;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame body size (16 MB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

const LEN_PREFIX: usize = 4;

fn too_large(len: usize) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("frame too large: {len} bytes"))
}

/// Encodes one event as a complete frame.
pub fn encode_frame(event: &SequencedEvent) -> CaptureResult<Vec<u8>> {
    let body = serde_json::to_vec(event)?;
    if body.len() > MAX_FRAME_SIZE {
        return Err(too_large(body.len()).into());
    }
    let mut frame = Vec::with_capacity(LEN_PREFIX + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decodes the first frame in `buf`.
///
/// Returns the event and the number of bytes consumed, or `None` if `buf`
/// does not yet hold a whole frame.
pub fn decode_frame(buf: &[u8]) -> CaptureResult<Option<(SequencedEvent, usize)>> {
    let Some(prefix) = buf.get(..LEN_PREFIX) else {
        return Ok(None);
    };
    let mut len_bytes = [0u8; LEN_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let len = u32::from_be_bytes(len_bytes) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(too_large(len).into());
    }
    let Some(body) = buf.get(LEN_PREFIX..LEN_PREFIX + len) else {
        return Ok(None);
    };
    let event = serde_json::from_slice(body)?;
    Ok(Some((event, LEN_PREFIX + len)))
}

/// Reads one length-prefixed event.
pub async fn read_event<T: AsyncRead + Unpin>(io: &mut T) -> io::Result<SequencedEvent> {
    let mut len_bytes = [0u8; LEN_PREFIX];
    io.read_exact(&mut len_bytes).await?;
    let len = u32::from_be_bytes(len_bytes) as usize;

    if len > MAX_FRAME_SIZE {
        return Err(too_large(len));
    }

    let mut buf = vec![0u8; len];
    io.read_exact(&mut buf).await?;

    serde_json::from_slice(&buf).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("JSON decode error: {e}"))
    })
}

/// Writes one length-prefixed event and flushes.
pub async fn write_event<T: AsyncWrite + Unpin>(io: &mut T, event: &SequencedEvent) -> io::Result<()> {
    let frame = encode_frame(event).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    io.write_all(&frame).await?;
    io.flush().await
}
