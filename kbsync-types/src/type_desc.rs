//! Serialized type descriptors and local type declarations.
//!
//! A host stores types in a compact byte grammar in which references to
//! other local types are encoded by ordinal. Ordinals differ between
//! databases, so every descriptor travels with a parsed form in which those
//! references are replaced by names. The raw bytes are kept alongside so a
//! receiver with its own parser can still recover a descriptor we failed to
//! parse.

use crate::Ordinal;
use serde::{Deserialize, Serialize};

/// One piece of a parsed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeToken {
    /// Bytes copied verbatim from the descriptor.
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
    /// A reference to another local type, by name.
    Named(String),
}

/// The language-neutral structure extracted from a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "tokens", rename_all = "snake_case")]
pub enum ParsedType {
    /// The descriptor was parsed into tokens.
    Tokens(Vec<TypeToken>),
    /// Parsing failed; only the raw form is usable.
    #[default]
    Unknown,
}

impl ParsedType {
    /// Returns true if the descriptor could not be parsed.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, ParsedType::Unknown)
    }

    /// Names of all local types referenced by the descriptor.
    pub fn referenced_names(&self) -> impl Iterator<Item = &str> {
        let tokens: &[TypeToken] = match self {
            ParsedType::Tokens(tokens) => tokens,
            ParsedType::Unknown => &[],
        };
        tokens.iter().filter_map(|t| match t {
            TypeToken::Named(name) => Some(name.as_str()),
            TypeToken::Bytes(_) => None,
        })
    }
}

/// A serialized type as read from the host, with its parsed form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedType {
    /// Raw descriptor bytes (hex on the wire).
    #[serde(with = "hex_bytes")]
    pub raw: Vec<u8>,
    /// Field names, in declaration order.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Field comments, in declaration order.
    #[serde(default)]
    pub field_comments: Vec<String>,
    /// Parsed form of `raw`.
    #[serde(default)]
    pub parsed: ParsedType,
}

impl SerializedType {
    /// Compares two descriptors by meaning rather than by bytes.
    ///
    /// Raw bytes embed ordinals, so they are only compared when one side
    /// could not be parsed.
    #[must_use]
    pub fn same_semantics(&self, other: &SerializedType) -> bool {
        if self.fields != other.fields || self.field_comments != other.field_comments {
            return false;
        }
        match (&self.parsed, &other.parsed) {
            (ParsedType::Tokens(a), ParsedType::Tokens(b)) => a == b,
            _ => self.raw == other.raw,
        }
    }
}

/// The transmitted content of one local type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSnapshot {
    /// Canonical type name.
    pub name: String,
    /// Serialized type.
    pub descriptor: SerializedType,
    /// Type-level comment.
    #[serde(default)]
    pub comment: String,
    /// Host storage class.
    #[serde(default)]
    pub storage_class: i32,
}

impl DeclarationSnapshot {
    /// Format-stable equality: identical for two declarations of the same
    /// semantic type even if their ordinal numbering differs.
    #[must_use]
    pub fn same_semantics(&self, other: &DeclarationSnapshot) -> bool {
        self.name == other.name
            && self.comment == other.comment
            && self.storage_class == other.storage_class
            && self.descriptor.same_semantics(&other.descriptor)
    }
}

/// A declaration as known to the local type library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub ordinal: Ordinal,
    pub declaration: DeclarationSnapshot,
}

impl TypeDeclaration {
    #[must_use]
    pub fn new(ordinal: Ordinal, declaration: DeclarationSnapshot) -> Self {
        Self { ordinal, declaration }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.declaration.name
    }

    /// Semantic equality, ignoring the ordinal.
    #[must_use]
    pub fn same_semantics(&self, other: &TypeDeclaration) -> bool {
        self.declaration.same_semantics(&other.declaration)
    }
}

/// Serde adapter carrying byte blobs as lowercase hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
