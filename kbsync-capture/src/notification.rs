//! The host's raw notification vocabulary.
//!
//! One closed enum covers every callback the host can deliver. Arguments are
//! positional data exactly as the host hands them over: addresses, host ids
//! and, for a few kinds, strings. Nothing here is transmitted as-is.

use kbsync_types::{Address, HostId};

/// A raw mutation notification from the host database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    // ── Type library ─────────────────────────────────────────────
    /// Something in the local type library changed. Carries no payload and
    /// may stand for any number of changes.
    LocalTypesChanged,
    TypeInfoChanged { ea: u64 },
    OperandTypeInfoChanged { ea: Address, operand: u8 },

    // ── Operands ─────────────────────────────────────────────────
    OperandTypeChanged { ea: Address, operand: u8 },

    // ── Enumerations ─────────────────────────────────────────────
    EnumCreated { id: HostId },
    EnumDeleting { id: HostId },
    /// `id` is the enumeration when `is_enum`, otherwise the member.
    EnumRenaming { id: HostId, is_enum: bool, new_name: String },
    EnumBitfieldChanged { id: HostId },
    EnumCommentChanged { id: HostId, repeatable: bool },
    EnumMemberCreated { enum_id: HostId, member_id: HostId },
    EnumMemberDeleting { enum_id: HostId, member_id: HostId },

    // ── Structures ───────────────────────────────────────────────
    StructCreated { id: HostId },
    StructDeleting { id: HostId },
    StructAlignChanged { id: HostId },
    StructRenaming { id: HostId, old_name: String, new_name: String },
    StructExpanding { id: HostId, offset: u64, delta: i64 },
    StructMemberCreated { struct_id: HostId, member_id: HostId },
    StructMemberDeleted { struct_id: HostId, offset: u64 },
    StructMemberRenaming { struct_id: HostId, member_id: HostId, new_name: String },
    StructMemberChanged { struct_id: HostId, member_id: HostId },
    /// `id` is a structure or a structure member.
    StructCommentChanged { id: HostId, repeatable: bool },

    // ── Segments ─────────────────────────────────────────────────
    SegmentAdded { start: Address },
    SegmentDeleted { start: Address, end: Address, flags: u32 },
    SegmentStartChanged { start: Address, old_start: Address },
    SegmentEndChanged { start: Address, old_end: Address },
    SegmentNameChanged { start: Address, name: String },
    SegmentClassChanged { start: Address, class: String },
    SegmentAttrsUpdated { start: Address },
    SegmentMoved { from: Address, to: Address, size: u64, changed_netmap: bool },
    AllSegmentsMoved,
    SegmentRegisterChanged { register: u32 },
    SegmentRegisterDeleted { register: u32 },

    // ── Functions ────────────────────────────────────────────────
    FunctionAdded { start: Address, end: Address },
    FunctionStartChanged { start: Address, new_start: Address },
    FunctionEndChanged { start: Address, new_end: Address },
    FunctionDeleting { start: Address },
    FunctionTailAppended { function: Address, tail_start: Address, tail_end: Address },
    FunctionTailDeleted { function: Address, tail: Address },
    TailOwnerChanged { tail: Address, owner: Address, old_owner: Address },
    FunctionNoReturnChanged { start: Address },
    CalleeAddressChanged { ea: Address },

    // ── Items ────────────────────────────────────────────────────
    /// `type_id` is the structure id for structure-typed data.
    DataDefined { ea: Address, flags: u64, type_id: Option<HostId>, size: u64 },
    /// `ea` may also be a structure, member or enumeration id.
    Renamed { ea: u64, new_name: String, local: bool },
    BytePatched { ea: Address, old_value: u32 },
    ItemColorChanged { ea: Address },

    // ── Comments and bookmarks ───────────────────────────────────
    CommentChanged { ea: Address, repeatable: bool },
    RangeCommentChanged { kind: u8, start: Address, comment: String, repeatable: bool },
    ExtraCommentChanged { ea: Address, line: i32, comment: String },
    BookmarkChanged { ea: Address, index: u32, description: String },

    // ── UI actions ───────────────────────────────────────────────
    ActionStarting { name: String, ea: Address },
    ActionFinished,

    // ── Analysis ─────────────────────────────────────────────────
    AutoAnalysisEmpty,

    // ── Decompiler ───────────────────────────────────────────────
    /// The decompiler printed the function containing `ea`.
    FunctionPrinted { ea: Address },
}

impl Notification {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        use Notification as N;
        match self {
            N::LocalTypesChanged => "local_types_changed",
            N::TypeInfoChanged { .. } => "ti_changed",
            N::OperandTypeInfoChanged { .. } => "op_ti_changed",
            N::OperandTypeChanged { .. } => "op_type_changed",
            N::EnumCreated { .. } => "enum_created",
            N::EnumDeleting { .. } => "deleting_enum",
            N::EnumRenaming { .. } => "renaming_enum",
            N::EnumBitfieldChanged { .. } => "enum_bf_changed",
            N::EnumCommentChanged { .. } => "enum_cmt_changed",
            N::EnumMemberCreated { .. } => "enum_member_created",
            N::EnumMemberDeleting { .. } => "deleting_enum_member",
            N::StructCreated { .. } => "struc_created",
            N::StructDeleting { .. } => "deleting_struc",
            N::StructAlignChanged { .. } => "struc_align_changed",
            N::StructRenaming { .. } => "renaming_struc",
            N::StructExpanding { .. } => "expanding_struc",
            N::StructMemberCreated { .. } => "struc_member_created",
            N::StructMemberDeleted { .. } => "struc_member_deleted",
            N::StructMemberRenaming { .. } => "renaming_struc_member",
            N::StructMemberChanged { .. } => "struc_member_changed",
            N::StructCommentChanged { .. } => "struc_cmt_changed",
            N::SegmentAdded { .. } => "segm_added",
            N::SegmentDeleted { .. } => "segm_deleted",
            N::SegmentStartChanged { .. } => "segm_start_changed",
            N::SegmentEndChanged { .. } => "segm_end_changed",
            N::SegmentNameChanged { .. } => "segm_name_changed",
            N::SegmentClassChanged { .. } => "segm_class_changed",
            N::SegmentAttrsUpdated { .. } => "segm_attrs_updated",
            N::SegmentMoved { .. } => "segm_moved",
            N::AllSegmentsMoved => "allsegs_moved",
            N::SegmentRegisterChanged { .. } => "sgr_changed",
            N::SegmentRegisterDeleted { .. } => "sgr_deleted",
            N::FunctionAdded { .. } => "func_added",
            N::FunctionStartChanged { .. } => "set_func_start",
            N::FunctionEndChanged { .. } => "set_func_end",
            N::FunctionDeleting { .. } => "deleting_func",
            N::FunctionTailAppended { .. } => "func_tail_appended",
            N::FunctionTailDeleted { .. } => "func_tail_deleted",
            N::TailOwnerChanged { .. } => "tail_owner_changed",
            N::FunctionNoReturnChanged { .. } => "func_noret_changed",
            N::CalleeAddressChanged { .. } => "callee_addr_changed",
            N::DataDefined { .. } => "make_data",
            N::Renamed { .. } => "renamed",
            N::BytePatched { .. } => "byte_patched",
            N::ItemColorChanged { .. } => "item_color_changed",
            N::CommentChanged { .. } => "cmt_changed",
            N::RangeCommentChanged { .. } => "range_cmt_changed",
            N::ExtraCommentChanged { .. } => "extra_cmt_changed",
            N::BookmarkChanged { .. } => "bookmark_changed",
            N::ActionStarting { .. } => "preprocess_action",
            N::ActionFinished => "postprocess_action",
            N::AutoAnalysisEmpty => "auto_empty",
            N::FunctionPrinted { .. } => "func_printed",
        }
    }
}
