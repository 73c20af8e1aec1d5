//! Canonical events, the unit of replication.
//!
//! Every event is immutable and self-describing: a receiver can apply it
//! without consulting the sender's database. Cross-referenced structures,
//! enumerations and types are always named, never identified by a host id
//! or ordinal.

use crate::decompiler::{LvarSettings, UserComment, UserItemFlag, UserLabel, UserNumberFormat};
use crate::{Address, DeclarationSnapshot, SerializedType, SnapshotId, Tick};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an operand is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repr", rename_all = "snake_case")]
pub enum OperandFormat {
    Hex,
    Dec,
    Char,
    Bin,
    Oct,
    Offset,
    /// Enumeration member, by enumeration name.
    Enum { name: String, serial: u8 },
    /// Structure offset, by structure path.
    StructOffset { path: Vec<String>, delta: i64 },
    StackVar,
}

/// Extra representation information attached to a structure member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "repr", rename_all = "snake_case")]
pub enum MemberRepr {
    /// Plain data, nothing to add.
    #[default]
    Plain,
    /// An offset to `target` relative to `base`.
    Offset {
        target: Address,
        base: Address,
        tdelta: i64,
        flags: u32,
    },
    /// An enumeration member.
    Enum { name: String, serial: u8 },
    /// A nested structure.
    Struct { name: String },
    /// A string literal of the given string type.
    StringLiteral { strtype: i32 },
}

/// Full description of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub name: String,
    pub class: String,
    pub start: Address,
    pub end: Address,
    pub orgbase: u64,
    pub align: u8,
    pub comb: u8,
    pub perm: u8,
    pub bitness: u8,
    pub flags: u16,
}

/// One range of a segment register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRegisterRange {
    pub start: Address,
    pub end: Address,
    pub value: u64,
    pub tag: u8,
}

/// What a type change applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum TypeTarget {
    /// An item at an address.
    Address { ea: Address },
    /// A structure member, located by structure name and offset.
    StructMember { struct_name: String, offset: u64 },
}

/// The payload of an event, containing the actual operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum EventPayload {
    // ── Local type library ──────────────────────────────────────
    LocalTypeCreated {
        declaration: DeclarationSnapshot,
    },
    LocalTypeModified {
        previous: DeclarationSnapshot,
        current: DeclarationSnapshot,
    },
    LocalTypeDeleted {
        previous: DeclarationSnapshot,
    },

    // ── Item and operand types ──────────────────────────────────
    TypeInfoChanged {
        target: TypeTarget,
        /// `None` when the type was removed.
        descriptor: Option<SerializedType>,
    },
    OperandTypeChanged {
        ea: Address,
        operand: u8,
        format: OperandFormat,
    },

    // ── Enumerations ────────────────────────────────────────────
    EnumCreated {
        name: String,
    },
    EnumDeleted {
        name: String,
    },
    EnumRenamed {
        old_name: String,
        new_name: String,
        /// False when an enumeration member was renamed.
        is_enum: bool,
    },
    EnumBitfieldChanged {
        name: String,
        bitfield: bool,
    },
    EnumCommentChanged {
        name: String,
        comment: String,
        repeatable: bool,
    },
    EnumMemberCreated {
        enum_name: String,
        name: String,
        value: u64,
        bmask: u64,
    },
    EnumMemberDeleted {
        enum_name: String,
        value: u64,
        serial: u8,
        bmask: u64,
    },

    // ── Structures ──────────────────────────────────────────────
    StructCreated {
        name: String,
        is_union: bool,
    },
    StructDeleted {
        name: String,
    },
    StructRenamed {
        old_name: String,
        new_name: String,
    },
    StructExpanded {
        name: String,
        offset: u64,
        delta: i64,
    },
    StructMemberCreated {
        struct_name: String,
        name: String,
        offset: u64,
        flags: u64,
        size: u64,
        repr: MemberRepr,
    },
    StructMemberDeleted {
        struct_name: String,
        offset: u64,
    },
    StructMemberRenamed {
        struct_name: String,
        offset: u64,
        new_name: String,
    },
    StructMemberChanged {
        struct_name: String,
        start: u64,
        end: u64,
        flags: u64,
        repr: MemberRepr,
    },
    StructCommentChanged {
        struct_name: String,
        /// Set when the comment belongs to a member.
        member_name: Option<String>,
        comment: String,
        repeatable: bool,
    },

    // ── Segments ────────────────────────────────────────────────
    SegmentAdded {
        segment: SegmentInfo,
    },
    SegmentDeleted {
        start: Address,
        flags: u32,
    },
    SegmentStartChanged {
        new_start: Address,
        old_start: Address,
    },
    SegmentEndChanged {
        start: Address,
        new_end: Address,
    },
    SegmentRenamed {
        start: Address,
        name: String,
    },
    SegmentClassChanged {
        start: Address,
        class: String,
    },
    SegmentAttrsUpdated {
        start: Address,
        perm: u8,
        bitness: u8,
    },
    SegmentMoved {
        from: Address,
        to: Address,
        changed_netmap: bool,
    },
    SegmentRegisterRangesChanged {
        register: u32,
        ranges: Vec<SegmentRegisterRange>,
    },

    // ── Functions ───────────────────────────────────────────────
    FunctionAdded {
        start: Address,
        end: Address,
    },
    FunctionStartChanged {
        start: Address,
        new_start: Address,
    },
    FunctionEndChanged {
        start: Address,
        new_end: Address,
    },
    FunctionDeleted {
        start: Address,
    },
    FunctionTailAppended {
        function: Address,
        tail_start: Address,
        tail_end: Address,
    },
    FunctionTailDeleted {
        function: Address,
        tail: Address,
    },
    TailOwnerChanged {
        tail: Address,
        owner: Address,
    },

    // ── Items ───────────────────────────────────────────────────
    DataDefined {
        ea: Address,
        flags: u64,
        size: u64,
        /// Structure name for structure-typed data.
        struct_name: Option<String>,
    },
    CodeDefined {
        ea: Address,
    },
    Undefined {
        ea: Address,
    },
    Renamed {
        ea: Address,
        new_name: String,
        local: bool,
    },
    BytePatched {
        ea: Address,
        value: u8,
    },

    // ── Comments and bookmarks ──────────────────────────────────
    CommentChanged {
        ea: Address,
        comment: String,
        repeatable: bool,
    },
    RangeCommentChanged {
        kind: u8,
        start: Address,
        comment: String,
        repeatable: bool,
    },
    ExtraCommentChanged {
        ea: Address,
        line: i32,
        comment: String,
    },
    BookmarkChanged {
        ea: Address,
        index: u32,
        description: String,
    },

    // ── Decompiler user state ───────────────────────────────────
    UserLabelsChanged {
        function: Address,
        labels: Vec<UserLabel>,
    },
    UserCommentsChanged {
        function: Address,
        comments: Vec<UserComment>,
    },
    UserItemFlagsChanged {
        function: Address,
        flags: Vec<UserItemFlag>,
    },
    UserLvarSettingsChanged {
        function: Address,
        settings: LvarSettings,
    },
    UserNumberFormatsChanged {
        function: Address,
        formats: Vec<UserNumberFormat>,
    },
}

/// Closed enumeration of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LocalTypeCreated,
    LocalTypeModified,
    LocalTypeDeleted,
    TypeInfoChanged,
    OperandTypeChanged,
    EnumCreated,
    EnumDeleted,
    EnumRenamed,
    EnumBitfieldChanged,
    EnumCommentChanged,
    EnumMemberCreated,
    EnumMemberDeleted,
    StructCreated,
    StructDeleted,
    StructRenamed,
    StructExpanded,
    StructMemberCreated,
    StructMemberDeleted,
    StructMemberRenamed,
    StructMemberChanged,
    StructCommentChanged,
    SegmentAdded,
    SegmentDeleted,
    SegmentStartChanged,
    SegmentEndChanged,
    SegmentRenamed,
    SegmentClassChanged,
    SegmentAttrsUpdated,
    SegmentMoved,
    SegmentRegisterRangesChanged,
    FunctionAdded,
    FunctionStartChanged,
    FunctionEndChanged,
    FunctionDeleted,
    FunctionTailAppended,
    FunctionTailDeleted,
    TailOwnerChanged,
    DataDefined,
    CodeDefined,
    Undefined,
    Renamed,
    BytePatched,
    CommentChanged,
    RangeCommentChanged,
    ExtraCommentChanged,
    BookmarkChanged,
    UserLabelsChanged,
    UserCommentsChanged,
    UserItemFlagsChanged,
    UserLvarSettingsChanged,
    UserNumberFormatsChanged,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl EventPayload {
    /// Returns the kind of this payload.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        use EventPayload as P;
        match self {
            P::LocalTypeCreated { .. } => EventKind::LocalTypeCreated,
            P::LocalTypeModified { .. } => EventKind::LocalTypeModified,
            P::LocalTypeDeleted { .. } => EventKind::LocalTypeDeleted,
            P::TypeInfoChanged { .. } => EventKind::TypeInfoChanged,
            P::OperandTypeChanged { .. } => EventKind::OperandTypeChanged,
            P::EnumCreated { .. } => EventKind::EnumCreated,
            P::EnumDeleted { .. } => EventKind::EnumDeleted,
            P::EnumRenamed { .. } => EventKind::EnumRenamed,
            P::EnumBitfieldChanged { .. } => EventKind::EnumBitfieldChanged,
            P::EnumCommentChanged { .. } => EventKind::EnumCommentChanged,
            P::EnumMemberCreated { .. } => EventKind::EnumMemberCreated,
            P::EnumMemberDeleted { .. } => EventKind::EnumMemberDeleted,
            P::StructCreated { .. } => EventKind::StructCreated,
            P::StructDeleted { .. } => EventKind::StructDeleted,
            P::StructRenamed { .. } => EventKind::StructRenamed,
            P::StructExpanded { .. } => EventKind::StructExpanded,
            P::StructMemberCreated { .. } => EventKind::StructMemberCreated,
            P::StructMemberDeleted { .. } => EventKind::StructMemberDeleted,
            P::StructMemberRenamed { .. } => EventKind::StructMemberRenamed,
            P::StructMemberChanged { .. } => EventKind::StructMemberChanged,
            P::StructCommentChanged { .. } => EventKind::StructCommentChanged,
            P::SegmentAdded { .. } => EventKind::SegmentAdded,
            P::SegmentDeleted { .. } => EventKind::SegmentDeleted,
            P::SegmentStartChanged { .. } => EventKind::SegmentStartChanged,
            P::SegmentEndChanged { .. } => EventKind::SegmentEndChanged,
            P::SegmentRenamed { .. } => EventKind::SegmentRenamed,
            P::SegmentClassChanged { .. } => EventKind::SegmentClassChanged,
            P::SegmentAttrsUpdated { .. } => EventKind::SegmentAttrsUpdated,
            P::SegmentMoved { .. } => EventKind::SegmentMoved,
            P::SegmentRegisterRangesChanged { .. } => EventKind::SegmentRegisterRangesChanged,
            P::FunctionAdded { .. } => EventKind::FunctionAdded,
            P::FunctionStartChanged { .. } => EventKind::FunctionStartChanged,
            P::FunctionEndChanged { .. } => EventKind::FunctionEndChanged,
            P::FunctionDeleted { .. } => EventKind::FunctionDeleted,
            P::FunctionTailAppended { .. } => EventKind::FunctionTailAppended,
            P::FunctionTailDeleted { .. } => EventKind::FunctionTailDeleted,
            P::TailOwnerChanged { .. } => EventKind::TailOwnerChanged,
            P::DataDefined { .. } => EventKind::DataDefined,
            P::CodeDefined { .. } => EventKind::CodeDefined,
            P::Undefined { .. } => EventKind::Undefined,
            P::Renamed { .. } => EventKind::Renamed,
            P::BytePatched { .. } => EventKind::BytePatched,
            P::CommentChanged { .. } => EventKind::CommentChanged,
            P::RangeCommentChanged { .. } => EventKind::RangeCommentChanged,
            P::ExtraCommentChanged { .. } => EventKind::ExtraCommentChanged,
            P::BookmarkChanged { .. } => EventKind::BookmarkChanged,
            P::UserLabelsChanged { .. } => EventKind::UserLabelsChanged,
            P::UserCommentsChanged { .. } => EventKind::UserCommentsChanged,
            P::UserItemFlagsChanged { .. } => EventKind::UserItemFlagsChanged,
            P::UserLvarSettingsChanged { .. } => EventKind::UserLvarSettingsChanged,
            P::UserNumberFormatsChanged { .. } => EventKind::UserNumberFormatsChanged,
        }
    }
}

/// An event stamped with its position in a snapshot's total order.
///
/// This is what the transport carries to the relay and what other clients
/// replay, in tick order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// The snapshot whose counter issued `tick`.
    pub snapshot: SnapshotId,
    /// Position in the snapshot's total order.
    pub tick: Tick,
    /// The operation to replay.
    pub payload: EventPayload,
}

impl SequencedEvent {
    #[must_use]
    pub fn new(snapshot: SnapshotId, tick: Tick, payload: EventPayload) -> Self {
        Self { snapshot, tick, payload }
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}
