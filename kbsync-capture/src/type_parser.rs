//! Type descriptor parsing.
//!
//! The host's type byte grammar is opaque to the pipeline. What matters for
//! replication is that references to other local types, which the host
//! encodes by ordinal, come out as names. Hosts with a richer grammar plug
//! in their own `TypeParser`.

use crate::error::TypeParseError;
use crate::host::RawType;
use kbsync_types::{Ordinal, ParsedType, SerializedType, TypeToken};
use tracing::warn;

/// Byte that introduces an ordinal reference in `OrdinalRefParser`.
pub const ORDINAL_REF_MARKER: u8 = b'#';

/// Parses a raw descriptor into language-neutral tokens.
pub trait TypeParser: Send + Sync {
    /// `names` resolves an ordinal to the name of the local type it holds.
    fn parse(
        &self,
        raw: &[u8],
        names: &dyn Fn(Ordinal) -> Option<String>,
    ) -> Result<Vec<TypeToken>, TypeParseError>;
}

/// Splits a descriptor into byte runs and named references.
///
/// A reference is the marker byte followed by the ordinal as unsigned
/// LEB128. Everything else is copied verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalRefParser;

impl TypeParser for OrdinalRefParser {
    fn parse(
        &self,
        raw: &[u8],
        names: &dyn Fn(Ordinal) -> Option<String>,
    ) -> Result<Vec<TypeToken>, TypeParseError> {
        let mut tokens = Vec::new();
        let mut run = Vec::new();
        let mut i = 0;

        while i < raw.len() {
            if raw[i] != ORDINAL_REF_MARKER {
                run.push(raw[i]);
                i += 1;
                continue;
            }

            let (ordinal, next) = decode_ordinal(raw, i + 1)?;
            let name = names(Ordinal::new(ordinal))
                .ok_or(TypeParseError::UnknownOrdinal { ordinal, offset: i })?;
            if !run.is_empty() {
                tokens.push(TypeToken::Bytes(std::mem::take(&mut run)));
            }
            tokens.push(TypeToken::Named(name));
            i = next;
        }

        if !run.is_empty() {
            tokens.push(TypeToken::Bytes(run));
        }
        Ok(tokens)
    }
}

/// Decodes an unsigned LEB128 ordinal starting at `start`.
/// Returns the ordinal and the index of the first byte after it.
fn decode_ordinal(raw: &[u8], start: usize) -> Result<(u32, usize), TypeParseError> {
    let mut value: u64 = 0;
    let mut shift = 0;
    let mut i = start;
    loop {
        let byte = *raw.get(i).ok_or(TypeParseError::Truncated { offset: i })?;
        value |= u64::from(byte & 0x7f) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 28 {
            return Err(TypeParseError::Overflow { offset: start });
        }
    }
    let ordinal = u32::try_from(value).map_err(|_| TypeParseError::Overflow { offset: start })?;
    Ok((ordinal, i))
}

/// Encodes an ordinal reference, marker included.
pub fn encode_ordinal_ref(ordinal: Ordinal) -> Vec<u8> {
    let mut out = vec![ORDINAL_REF_MARKER];
    let mut value = ordinal.value();
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Builds the transmitted form of a raw type.
///
/// A descriptor that fails to parse is still returned, with
/// `ParsedType::Unknown` and the raw bytes intact.
pub fn serialize_type(
    parser: &dyn TypeParser,
    raw: RawType,
    names: &dyn Fn(Ordinal) -> Option<String>,
) -> SerializedType {
    let parsed = match parser.parse(&raw.bytes, names) {
        Ok(tokens) => ParsedType::Tokens(tokens),
        Err(e) => {
            warn!("Malformed type descriptor ({} bytes): {}", raw.bytes.len(), e);
            ParsedType::Unknown
        }
    };
    SerializedType {
        raw: raw.bytes,
        fields: raw.fields,
        field_comments: raw.field_comments,
        parsed,
    }
}
