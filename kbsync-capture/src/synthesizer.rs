//! Event synthesis for directly classified notifications.
//!
//! Every host id is resolved to a name here, at synthesis time, because the
//! host may reassign or delete it right after the notification.

use crate::error::{CaptureError, CaptureResult};
use crate::host::{EntityKind, HostDatabase, HostMemberRepr, HostOperandFormat, RawType};
use crate::notification::Notification;
use crate::type_parser::{serialize_type, TypeParser};
use kbsync_types::{
    Address, EventPayload, HostId, MemberRepr, OperandFormat, SegmentInfo, SerializedType,
    TypeTarget,
};

/// Builds canonical payloads from notifications and host state.
pub struct EventSynthesizer<'a> {
    host: &'a dyn HostDatabase,
    parser: &'a dyn TypeParser,
}

impl<'a> EventSynthesizer<'a> {
    pub fn new(host: &'a dyn HostDatabase, parser: &'a dyn TypeParser) -> Self {
        Self { host, parser }
    }

    /// Serializes a raw type, resolving ordinal references to names.
    pub fn serialize(&self, raw: RawType) -> SerializedType {
        let host = self.host;
        serialize_type(self.parser, raw, &|o| host.local_type_name(o))
    }

    fn struct_name(&self, id: HostId) -> CaptureResult<String> {
        self.host.struct_name(id).ok_or_else(|| CaptureError::unresolved("structure", id))
    }

    fn enum_name(&self, id: HostId) -> CaptureResult<String> {
        self.host.enum_name(id).ok_or_else(|| CaptureError::unresolved("enumeration", id))
    }

    fn segment(&self, start: Address) -> CaptureResult<SegmentInfo> {
        self.host
            .segment(start)
            .ok_or_else(|| CaptureError::UnresolvedReference(format!("segment at {start}")))
    }

    fn member_repr(&self, repr: HostMemberRepr) -> CaptureResult<MemberRepr> {
        Ok(match repr {
            HostMemberRepr::Plain => MemberRepr::Plain,
            HostMemberRepr::Offset { target, base, tdelta, flags } => {
                MemberRepr::Offset { target, base, tdelta, flags }
            }
            HostMemberRepr::Enum { enum_id, serial } => {
                MemberRepr::Enum { name: self.enum_name(enum_id)?, serial }
            }
            HostMemberRepr::Struct { struct_id } => {
                MemberRepr::Struct { name: self.struct_name(struct_id)? }
            }
            HostMemberRepr::StringLiteral { strtype } => MemberRepr::StringLiteral { strtype },
        })
    }

    fn operand_format(&self, ea: Address, operand: u8) -> CaptureResult<OperandFormat> {
        Ok(match self.host.operand_format(ea, operand) {
            HostOperandFormat::Hex => OperandFormat::Hex,
            HostOperandFormat::Dec => OperandFormat::Dec,
            HostOperandFormat::Char => OperandFormat::Char,
            HostOperandFormat::Bin => OperandFormat::Bin,
            HostOperandFormat::Oct => OperandFormat::Oct,
            HostOperandFormat::Offset => OperandFormat::Offset,
            HostOperandFormat::Enum { enum_id, serial } => {
                OperandFormat::Enum { name: self.enum_name(enum_id)?, serial }
            }
            HostOperandFormat::StructOffset { path, delta } => OperandFormat::StructOffset {
                path: path.into_iter().map(|id| self.struct_name(id)).collect::<CaptureResult<_>>()?,
                delta,
            },
            HostOperandFormat::StackVar => OperandFormat::StackVar,
            HostOperandFormat::Other => {
                return Err(CaptureError::UnresolvedReference(format!(
                    "representation of operand {operand} at {ea}"
                )));
            }
        })
    }

    fn type_target(&self, raw: u64) -> CaptureResult<TypeTarget> {
        if self.host.entity_kind(raw) != EntityKind::StructMember {
            return Ok(TypeTarget::Address { ea: Address::new(raw) });
        }
        let id = HostId::new(raw);
        let location = self
            .host
            .member_location(id)
            .ok_or_else(|| CaptureError::unresolved("structure member", id))?;
        Ok(TypeTarget::StructMember {
            struct_name: self.struct_name(location.struct_id)?,
            offset: location.offset,
        })
    }

    /// Builds the single event of a `Classification::Direct` notification.
    pub fn synthesize(&self, notification: &Notification) -> CaptureResult<EventPayload> {
        use EventPayload as P;
        use Notification as N;
        let host = self.host;

        let payload = match notification {
            // ── Types and operands ───────────────────────────────
            N::TypeInfoChanged { ea } => P::TypeInfoChanged {
                target: self.type_target(*ea)?,
                descriptor: host.item_type(*ea).map(|raw| self.serialize(raw)),
            },
            N::OperandTypeChanged { ea, operand } => P::OperandTypeChanged {
                ea: *ea,
                operand: *operand,
                format: self.operand_format(*ea, *operand)?,
            },

            // ── Enumerations ─────────────────────────────────────
            N::EnumCreated { id } => P::EnumCreated { name: self.enum_name(*id)? },
            N::EnumDeleting { id } => P::EnumDeleted { name: self.enum_name(*id)? },
            N::EnumRenaming { id, is_enum, new_name } => {
                let old_name = if *is_enum {
                    self.enum_name(*id)?
                } else {
                    host.enum_member(*id)
                        .map(|m| m.name)
                        .ok_or_else(|| CaptureError::unresolved("enumeration member", *id))?
                };
                P::EnumRenamed { old_name, new_name: new_name.clone(), is_enum: *is_enum }
            }
            N::EnumBitfieldChanged { id } => P::EnumBitfieldChanged {
                name: self.enum_name(*id)?,
                bitfield: host.enum_is_bitfield(*id),
            },
            N::EnumCommentChanged { id, repeatable } => P::EnumCommentChanged {
                name: self.enum_name(*id)?,
                comment: host.enum_comment(*id, *repeatable).unwrap_or_default(),
                repeatable: *repeatable,
            },
            N::EnumMemberCreated { enum_id, member_id } => {
                let member = host
                    .enum_member(*member_id)
                    .ok_or_else(|| CaptureError::unresolved("enumeration member", *member_id))?;
                P::EnumMemberCreated {
                    enum_name: self.enum_name(*enum_id)?,
                    name: member.name,
                    value: member.value,
                    bmask: member.bmask,
                }
            }
            N::EnumMemberDeleting { enum_id, member_id } => {
                let member = host
                    .enum_member(*member_id)
                    .ok_or_else(|| CaptureError::unresolved("enumeration member", *member_id))?;
                P::EnumMemberDeleted {
                    enum_name: self.enum_name(*enum_id)?,
                    value: member.value,
                    serial: member.serial,
                    bmask: member.bmask,
                }
            }

            // ── Structures ───────────────────────────────────────
            N::StructCreated { id } => P::StructCreated {
                name: self.struct_name(*id)?,
                is_union: host.struct_is_union(*id),
            },
            N::StructDeleting { id } => P::StructDeleted { name: self.struct_name(*id)? },
            N::StructRenaming { old_name, new_name, .. } => P::StructRenamed {
                old_name: old_name.clone(),
                new_name: new_name.clone(),
            },
            N::StructExpanding { id, offset, delta } => P::StructExpanded {
                name: self.struct_name(*id)?,
                offset: *offset,
                delta: *delta,
            },
            N::StructMemberCreated { struct_id, member_id } => {
                let struct_name = self.struct_name(*struct_id)?;
                let member = host
                    .struct_member(*struct_id, *member_id)
                    .ok_or_else(|| CaptureError::unresolved("structure member", *member_id))?;
                P::StructMemberCreated {
                    struct_name,
                    name: member.name.clone(),
                    offset: member.offset(),
                    flags: member.flags,
                    size: member.size(),
                    repr: self.member_repr(member.repr)?,
                }
            }
            N::StructMemberDeleted { struct_id, offset } => P::StructMemberDeleted {
                struct_name: self.struct_name(*struct_id)?,
                offset: *offset,
            },
            N::StructMemberRenaming { struct_id, member_id, new_name } => {
                let struct_name = self.struct_name(*struct_id)?;
                let member = host
                    .struct_member(*struct_id, *member_id)
                    .ok_or_else(|| CaptureError::unresolved("structure member", *member_id))?;
                P::StructMemberRenamed { struct_name, offset: member.offset(), new_name: new_name.clone() }
            }
            N::StructMemberChanged { struct_id, member_id } => {
                let struct_name = self.struct_name(*struct_id)?;
                let member = host
                    .struct_member(*struct_id, *member_id)
                    .ok_or_else(|| CaptureError::unresolved("structure member", *member_id))?;
                P::StructMemberChanged {
                    struct_name,
                    start: member.start,
                    end: member.end,
                    flags: member.flags,
                    repr: self.member_repr(member.repr)?,
                }
            }
            N::StructCommentChanged { id, repeatable } => {
                let (struct_name, member_name) = if host.entity_kind(id.value()) == EntityKind::StructMember {
                    let location = host
                        .member_location(*id)
                        .ok_or_else(|| CaptureError::unresolved("structure member", *id))?;
                    (self.struct_name(location.struct_id)?, Some(location.name))
                } else {
                    (self.struct_name(*id)?, None)
                };
                P::StructCommentChanged {
                    struct_name,
                    member_name,
                    comment: host.struct_comment(*id, *repeatable).unwrap_or_default(),
                    repeatable: *repeatable,
                }
            }

            // ── Segments ─────────────────────────────────────────
            N::SegmentAdded { start } => P::SegmentAdded { segment: self.segment(*start)? },
            N::SegmentDeleted { start, flags, .. } => P::SegmentDeleted { start: *start, flags: *flags },
            N::SegmentStartChanged { start, old_start } => P::SegmentStartChanged {
                new_start: *start,
                old_start: *old_start,
            },
            N::SegmentEndChanged { start, .. } => P::SegmentEndChanged {
                start: *start,
                new_end: self.segment(*start)?.end,
            },
            N::SegmentNameChanged { start, name } => P::SegmentRenamed { start: *start, name: name.clone() },
            N::SegmentClassChanged { start, class } => P::SegmentClassChanged {
                start: *start,
                class: class.clone(),
            },
            N::SegmentAttrsUpdated { start } => {
                let segment = self.segment(*start)?;
                P::SegmentAttrsUpdated { start: *start, perm: segment.perm, bitness: segment.bitness }
            }
            N::SegmentMoved { from, to, changed_netmap, .. } => P::SegmentMoved {
                from: *from,
                to: *to,
                changed_netmap: *changed_netmap,
            },
            N::SegmentRegisterChanged { register } => P::SegmentRegisterRangesChanged {
                register: *register,
                ranges: host.segment_register_ranges(*register),
            },

            // ── Functions ────────────────────────────────────────
            N::FunctionAdded { start, end } => P::FunctionAdded { start: *start, end: *end },
            N::FunctionStartChanged { start, new_start } => P::FunctionStartChanged {
                start: *start,
                new_start: *new_start,
            },
            N::FunctionEndChanged { start, new_end } => P::FunctionEndChanged {
                start: *start,
                new_end: *new_end,
            },
            N::FunctionDeleting { start } => P::FunctionDeleted { start: *start },
            N::FunctionTailAppended { function, tail_start, tail_end } => P::FunctionTailAppended {
                function: *function,
                tail_start: *tail_start,
                tail_end: *tail_end,
            },
            N::FunctionTailDeleted { function, tail } => P::FunctionTailDeleted {
                function: *function,
                tail: *tail,
            },
            N::TailOwnerChanged { tail, owner, .. } => P::TailOwnerChanged { tail: *tail, owner: *owner },

            // ── Items ────────────────────────────────────────────
            N::DataDefined { ea, flags, type_id, size } => P::DataDefined {
                ea: *ea,
                flags: *flags,
                size: *size,
                struct_name: type_id.map(|id| self.struct_name(id)).transpose()?,
            },
            N::Renamed { ea, new_name, local } => P::Renamed {
                ea: Address::new(*ea),
                new_name: new_name.clone(),
                local: *local,
            },
            N::BytePatched { ea, .. } => P::BytePatched {
                ea: *ea,
                value: host
                    .byte_at(*ea)
                    .ok_or_else(|| CaptureError::UnresolvedReference(format!("byte at {ea}")))?,
            },

            // ── Comments and bookmarks ───────────────────────────
            N::CommentChanged { ea, repeatable } => P::CommentChanged {
                ea: *ea,
                comment: host.comment(*ea, *repeatable).unwrap_or_default(),
                repeatable: *repeatable,
            },
            N::RangeCommentChanged { kind, start, comment, repeatable } => P::RangeCommentChanged {
                kind: *kind,
                start: *start,
                comment: comment.clone(),
                repeatable: *repeatable,
            },
            N::ExtraCommentChanged { ea, line, comment } => P::ExtraCommentChanged {
                ea: *ea,
                line: *line,
                comment: comment.clone(),
            },
            N::BookmarkChanged { ea, index, description } => P::BookmarkChanged {
                ea: *ea,
                index: *index,
                description: description.clone(),
            },

            other => return Err(CaptureError::NotDirect(other.name())),
        };
        Ok(payload)
    }
}
