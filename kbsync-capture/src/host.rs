//! The host database collaborator.
//!
//! The pipeline never owns the database. It reads current state through
//! this trait while classifying and synthesizing, always synchronously and
//! always on the thread that delivered the notification.

use kbsync_types::decompiler::{
    LvarSettings, UserComment, UserItemFlag, UserLabel, UserNumberFormat,
};
use kbsync_types::{Address, HostId, Ordinal, SegmentInfo, SegmentRegisterRange};

/// Whether the host's background analyzer is working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoAnalysisState {
    Idle,
    Running,
}

/// What a raw id or address refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// An ordinary item (code, data or nothing) at an address.
    Item,
    Struct,
    StructMember,
    Enum,
    EnumMember,
}

impl EntityKind {
    /// Kinds whose renames are reported by a dedicated notification.
    pub fn has_specific_rename(&self) -> bool {
        matches!(self, EntityKind::Struct | EntityKind::StructMember | EntityKind::Enum)
    }
}

/// Current state of a decoded item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Unknown,
    Code,
    Data,
}

/// A type exactly as the host serializes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawType {
    pub bytes: Vec<u8>,
    pub fields: Vec<String>,
    pub field_comments: Vec<String>,
}

/// One entry of the local type library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTypeInfo {
    pub name: String,
    pub ty: RawType,
    pub comment: String,
    pub storage_class: i32,
}

/// Where a structure member lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberLocation {
    pub struct_id: HostId,
    pub name: String,
    pub offset: u64,
}

/// Member representation with host ids still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMemberRepr {
    Plain,
    Offset {
        target: Address,
        base: Address,
        tdelta: i64,
        flags: u32,
    },
    Enum {
        enum_id: HostId,
        serial: u8,
    },
    Struct {
        struct_id: HostId,
    },
    StringLiteral {
        strtype: i32,
    },
}

/// A structure member as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMemberInfo {
    pub name: String,
    /// Start offset; union members all report 0.
    pub start: u64,
    pub end: u64,
    pub flags: u64,
    /// True for members of a union.
    pub in_union: bool,
    pub repr: HostMemberRepr,
}

impl StructMemberInfo {
    /// Size in bytes. Union members span `[0, end)`.
    pub fn size(&self) -> u64 {
        if self.in_union { self.end } else { self.end.saturating_sub(self.start) }
    }

    /// Offset used to address the member in events.
    pub fn offset(&self) -> u64 {
        if self.in_union { 0 } else { self.start }
    }
}

/// An enumeration member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberInfo {
    pub name: String,
    pub value: u64,
    pub bmask: u64,
    pub serial: u8,
}

/// Operand representation with host ids still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOperandFormat {
    Hex,
    Dec,
    Char,
    Bin,
    Oct,
    Offset,
    Enum { enum_id: HostId, serial: u8 },
    StructOffset { path: Vec<HostId>, delta: i64 },
    StackVar,
    /// Anything else, including "no special representation".
    Other,
}

/// Read access to the host database.
///
/// Lookups return `None` when the entity no longer exists, which happens
/// when it was deleted between the notification and its processing.
pub trait HostDatabase {
    fn auto_analysis_state(&self) -> AutoAnalysisState;

    /// Classifies a raw id that may be an address or a host id.
    fn entity_kind(&self, raw: u64) -> EntityKind;

    // ── Structures ───────────────────────────────────────────────

    fn struct_name(&self, id: HostId) -> Option<String>;
    fn struct_is_union(&self, id: HostId) -> bool;
    fn struct_member(&self, struct_id: HostId, member_id: HostId) -> Option<StructMemberInfo>;
    fn member_location(&self, member_id: HostId) -> Option<MemberLocation>;
    fn struct_comment(&self, id: HostId, repeatable: bool) -> Option<String>;

    // ── Enumerations ─────────────────────────────────────────────

    fn enum_name(&self, id: HostId) -> Option<String>;
    fn enum_is_bitfield(&self, id: HostId) -> bool;
    fn enum_comment(&self, id: HostId, repeatable: bool) -> Option<String>;
    fn enum_member(&self, member_id: HostId) -> Option<EnumMemberInfo>;

    // ── Segments ─────────────────────────────────────────────────

    fn segment(&self, start: Address) -> Option<SegmentInfo>;
    fn segment_register_ranges(&self, register: u32) -> Vec<SegmentRegisterRange>;

    // ── Items ────────────────────────────────────────────────────

    /// Type applied to an item or a structure member.
    fn item_type(&self, raw: u64) -> Option<RawType>;
    fn operand_format(&self, ea: Address, operand: u8) -> HostOperandFormat;
    fn byte_at(&self, ea: Address) -> Option<u8>;
    fn comment(&self, ea: Address, repeatable: bool) -> Option<String>;
    fn item_state(&self, ea: Address) -> ItemState;
    /// Start of the function containing `ea`.
    fn function_start(&self, ea: Address) -> Option<Address>;

    // ── Local type library ───────────────────────────────────────

    /// Ordinals range over `1..=local_type_count()`.
    fn local_type_count(&self) -> u32;
    fn local_type(&self, ordinal: Ordinal) -> Option<LocalTypeInfo>;
    fn local_type_name(&self, ordinal: Ordinal) -> Option<String> {
        self.local_type(ordinal).map(|t| t.name)
    }
    /// True if `name` is also a structure or enumeration.
    fn is_struct_or_enum(&self, name: &str) -> bool;

    // ── Decompiler user state ────────────────────────────────────

    fn user_labels(&self, function: Address) -> Vec<UserLabel>;
    fn user_comments(&self, function: Address) -> Vec<UserComment>;
    fn user_item_flags(&self, function: Address) -> Vec<UserItemFlag>;
    /// Variable types come back with only their raw form filled in.
    fn user_lvar_settings(&self, function: Address) -> LvarSettings;
    fn user_number_formats(&self, function: Address) -> Vec<UserNumberFormat>;
}
