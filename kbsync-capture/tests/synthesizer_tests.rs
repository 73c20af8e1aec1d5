mod common;

use common::{member, FakeHost};
use kbsync_capture::host::{EnumMemberInfo, HostMemberRepr, HostOperandFormat, RawType};
use kbsync_capture::type_parser::encode_ordinal_ref;
use kbsync_capture::{CaptureError, EventSynthesizer, Notification, OrdinalRefParser};
use kbsync_types::{
    Address, EventPayload, HostId, MemberRepr, OperandFormat, ParsedType, SegmentInfo, TypeTarget,
    TypeToken,
};
use pretty_assertions::assert_eq;

fn synthesize(host: &FakeHost, notification: Notification) -> Result<EventPayload, CaptureError> {
    EventSynthesizer::new(host, &OrdinalRefParser).synthesize(&notification)
}

fn text_segment() -> SegmentInfo {
    SegmentInfo {
        name: ".text".into(),
        class: "CODE".into(),
        start: Address::new(0x401000),
        end: Address::new(0x402000),
        orgbase: 0,
        align: 3,
        comb: 2,
        perm: 5,
        bitness: 1,
        flags: 0x10,
    }
}

// ── Structures ───────────────────────────────────────────────────

#[test]
fn struct_member_created_uses_names() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");
    let mid = host.add_member(sid, 0xff01, member("len", 0, 4));

    let payload = synthesize(&host, Notification::StructMemberCreated { struct_id: sid, member_id: mid }).unwrap();
    assert_eq!(
        payload,
        EventPayload::StructMemberCreated {
            struct_name: "packet_t".into(),
            name: "len".into(),
            offset: 0,
            flags: 0,
            size: 4,
            repr: MemberRepr::Plain,
        }
    );
}

#[test]
fn struct_member_repr_resolves_nested_struct_and_enum() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");
    let header = host.add_struct(0xfe00, "header_t");
    let kind = host.add_enum(0xfd00, "kind_e");

    let mut hdr = member("hdr", 0, 8);
    hdr.repr = HostMemberRepr::Struct { struct_id: header };
    let hdr_id = host.add_member(sid, 0xff01, hdr);
    let mut tag = member("tag", 8, 12);
    tag.repr = HostMemberRepr::Enum { enum_id: kind, serial: 0 };
    let tag_id = host.add_member(sid, 0xff02, tag);

    let payload = synthesize(&host, Notification::StructMemberChanged { struct_id: sid, member_id: hdr_id }).unwrap();
    assert_eq!(
        payload,
        EventPayload::StructMemberChanged {
            struct_name: "packet_t".into(),
            start: 0,
            end: 8,
            flags: 0,
            repr: MemberRepr::Struct { name: "header_t".into() },
        }
    );

    let payload = synthesize(&host, Notification::StructMemberCreated { struct_id: sid, member_id: tag_id }).unwrap();
    let EventPayload::StructMemberCreated { repr, offset, size, .. } = payload else {
        panic!("expected StructMemberCreated");
    };
    assert_eq!(repr, MemberRepr::Enum { name: "kind_e".into(), serial: 0 });
    assert_eq!((offset, size), (8, 4));
}

#[test]
fn union_member_spans_from_zero() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "value_u");
    host.unions.insert(sid);
    let mut m = member("as_long", 0, 8);
    m.in_union = true;
    let mid = host.add_member(sid, 0xff01, m);

    let EventPayload::StructMemberCreated { offset, size, .. } =
        synthesize(&host, Notification::StructMemberCreated { struct_id: sid, member_id: mid }).unwrap()
    else {
        panic!("expected StructMemberCreated");
    };
    assert_eq!((offset, size), (0, 8));

    assert_eq!(
        synthesize(&host, Notification::StructCreated { id: sid }).unwrap(),
        EventPayload::StructCreated { name: "value_u".into(), is_union: true }
    );
}

#[test]
fn unresolvable_struct_is_an_error() {
    let host = FakeHost::new();
    let result = synthesize(&host, Notification::StructDeleting { id: HostId::new(0xdead) });
    assert!(matches!(result, Err(CaptureError::UnresolvedReference(_))));
}

#[test]
fn member_rename_addresses_member_by_offset() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");
    let mid = host.add_member(sid, 0xff01, member("len", 4, 8));

    let payload = synthesize(
        &host,
        Notification::StructMemberRenaming { struct_id: sid, member_id: mid, new_name: "length".into() },
    )
    .unwrap();
    assert_eq!(
        payload,
        EventPayload::StructMemberRenamed { struct_name: "packet_t".into(), offset: 4, new_name: "length".into() }
    );
}

#[test]
fn member_comment_names_struct_and_member() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");
    let mid = host.add_member(sid, 0xff01, member("len", 0, 4));
    host.struct_comments.insert((mid, true), "payload length".into());

    let payload = synthesize(&host, Notification::StructCommentChanged { id: mid, repeatable: true }).unwrap();
    assert_eq!(
        payload,
        EventPayload::StructCommentChanged {
            struct_name: "packet_t".into(),
            member_name: Some("len".into()),
            comment: "payload length".into(),
            repeatable: true,
        }
    );
}

#[test]
fn struct_comment_without_member() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");

    let payload = synthesize(&host, Notification::StructCommentChanged { id: sid, repeatable: false }).unwrap();
    assert_eq!(
        payload,
        EventPayload::StructCommentChanged {
            struct_name: "packet_t".into(),
            member_name: None,
            comment: String::new(),
            repeatable: false,
        }
    );
}

// ── Enumerations ─────────────────────────────────────────────────

#[test]
fn enum_member_rename_reports_member_old_name() {
    let mut host = FakeHost::new();
    let mid = host.add_enum_member(0xfd01, EnumMemberInfo { name: "RED".into(), value: 1, bmask: u64::MAX, serial: 0 });

    let payload = synthesize(
        &host,
        Notification::EnumRenaming { id: mid, is_enum: false, new_name: "COLOR_RED".into() },
    )
    .unwrap();
    assert_eq!(
        payload,
        EventPayload::EnumRenamed { old_name: "RED".into(), new_name: "COLOR_RED".into(), is_enum: false }
    );
}

#[test]
fn enum_member_deleting() {
    let mut host = FakeHost::new();
    let eid = host.add_enum(0xfd00, "color_e");
    let mid = host.add_enum_member(0xfd01, EnumMemberInfo { name: "RED".into(), value: 1, bmask: 3, serial: 2 });

    assert_eq!(
        synthesize(&host, Notification::EnumMemberDeleting { enum_id: eid, member_id: mid }).unwrap(),
        EventPayload::EnumMemberDeleted { enum_name: "color_e".into(), value: 1, serial: 2, bmask: 3 }
    );
}

// ── Types and operands ───────────────────────────────────────────

#[test]
fn type_info_on_address() {
    let mut host = FakeHost::new();
    host.set_local_type(1, "packet_t", b"\x0d");
    let mut bytes = b"\x0a".to_vec();
    bytes.extend(encode_ordinal_ref(kbsync_types::Ordinal::new(1)));
    host.item_types.insert(0x1000, RawType { bytes, ..Default::default() });

    let EventPayload::TypeInfoChanged { target, descriptor } =
        synthesize(&host, Notification::TypeInfoChanged { ea: 0x1000 }).unwrap()
    else {
        panic!("expected TypeInfoChanged");
    };
    assert_eq!(target, TypeTarget::Address { ea: Address::new(0x1000) });
    assert_eq!(
        descriptor.unwrap().parsed,
        ParsedType::Tokens(vec![TypeToken::Bytes(vec![0x0a]), TypeToken::Named("packet_t".into())])
    );
}

#[test]
fn type_info_on_member_uses_struct_name_and_offset() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");
    let mid = host.add_member(sid, 0xff01, member("len", 4, 8));

    let EventPayload::TypeInfoChanged { target, descriptor } =
        synthesize(&host, Notification::TypeInfoChanged { ea: mid.value() }).unwrap()
    else {
        panic!("expected TypeInfoChanged");
    };
    assert_eq!(target, TypeTarget::StructMember { struct_name: "packet_t".into(), offset: 4 });
    assert!(descriptor.is_none());
}

#[test]
fn malformed_item_type_still_emitted() {
    let mut host = FakeHost::new();
    host.item_types.insert(0x1000, RawType { bytes: b"#\x09".to_vec(), ..Default::default() });

    let EventPayload::TypeInfoChanged { descriptor, .. } =
        synthesize(&host, Notification::TypeInfoChanged { ea: 0x1000 }).unwrap()
    else {
        panic!("expected TypeInfoChanged");
    };
    let descriptor = descriptor.unwrap();
    assert!(descriptor.parsed.is_unknown());
    assert_eq!(descriptor.raw, b"#\x09".to_vec());
}

#[test]
fn struct_offset_operand_resolves_path() {
    let mut host = FakeHost::new();
    let outer = host.add_struct(0xff00, "packet_t");
    let inner = host.add_struct(0xfe00, "header_t");
    let ea = Address::new(0x1000);
    host.operand_formats.insert((ea, 1), HostOperandFormat::StructOffset { path: vec![outer, inner], delta: -4 });

    assert_eq!(
        synthesize(&host, Notification::OperandTypeChanged { ea, operand: 1 }).unwrap(),
        EventPayload::OperandTypeChanged {
            ea,
            operand: 1,
            format: OperandFormat::StructOffset { path: vec!["packet_t".into(), "header_t".into()], delta: -4 },
        }
    );
}

#[test]
fn enum_operand_with_missing_enum_is_an_error() {
    let mut host = FakeHost::new();
    let ea = Address::new(0x1000);
    host.operand_formats.insert((ea, 0), HostOperandFormat::Enum { enum_id: HostId::new(0xbad), serial: 0 });

    assert!(synthesize(&host, Notification::OperandTypeChanged { ea, operand: 0 }).is_err());
}

// ── Segments and items ───────────────────────────────────────────

#[test]
fn segment_added_reads_full_description() {
    let mut host = FakeHost::new();
    host.segments.insert(Address::new(0x401000), text_segment());

    assert_eq!(
        synthesize(&host, Notification::SegmentAdded { start: Address::new(0x401000) }).unwrap(),
        EventPayload::SegmentAdded { segment: text_segment() }
    );
}

#[test]
fn segment_end_changed_reads_new_end() {
    let mut host = FakeHost::new();
    host.segments.insert(Address::new(0x401000), text_segment());

    assert_eq!(
        synthesize(
            &host,
            Notification::SegmentEndChanged { start: Address::new(0x401000), old_end: Address::new(0x401800) }
        )
        .unwrap(),
        EventPayload::SegmentEndChanged { start: Address::new(0x401000), new_end: Address::new(0x402000) }
    );
}

#[test]
fn data_defined_with_struct_type() {
    let mut host = FakeHost::new();
    let sid = host.add_struct(0xff00, "packet_t");

    assert_eq!(
        synthesize(
            &host,
            Notification::DataDefined { ea: Address::new(0x5000), flags: 0x6000_0400, type_id: Some(sid), size: 12 }
        )
        .unwrap(),
        EventPayload::DataDefined {
            ea: Address::new(0x5000),
            flags: 0x6000_0400,
            size: 12,
            struct_name: Some("packet_t".into()),
        }
    );
}

#[test]
fn byte_patched_reads_current_value() {
    let mut host = FakeHost::new();
    host.bytes.insert(Address::new(0x1000), 0x90);

    assert_eq!(
        synthesize(&host, Notification::BytePatched { ea: Address::new(0x1000), old_value: 0xcc }).unwrap(),
        EventPayload::BytePatched { ea: Address::new(0x1000), value: 0x90 }
    );
}

#[test]
fn deleted_comment_is_empty() {
    let host = FakeHost::new();
    assert_eq!(
        synthesize(&host, Notification::CommentChanged { ea: Address::new(0x1000), repeatable: true }).unwrap(),
        EventPayload::CommentChanged { ea: Address::new(0x1000), comment: String::new(), repeatable: true }
    );
}

#[test]
fn non_direct_kind_is_rejected() {
    let host = FakeHost::new();
    assert!(matches!(
        synthesize(&host, Notification::LocalTypesChanged),
        Err(CaptureError::NotDirect("local_types_changed"))
    ));
}
