//! Shared test helpers for capture tests.

#![allow(dead_code)]

use kbsync_capture::host::{
    EnumMemberInfo, HostOperandFormat, LocalTypeInfo, MemberLocation, RawType, StructMemberInfo,
};
use kbsync_capture::transport::mock::RecordingTransport;
use kbsync_capture::{
    AutoAnalysisState, CaptureConfig, CaptureSession, EntityKind, FunctionSyncEntry,
    HostDatabase, ItemState, Snapshot,
};
use kbsync_types::decompiler::{LvarSettings, UserComment, UserItemFlag, UserLabel, UserNumberFormat};
use kbsync_types::{Address, HostId, Ordinal, SegmentInfo, SegmentRegisterRange};
use std::collections::{BTreeMap, HashMap, HashSet};

/// In-memory host database.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub auto_analysis_running: bool,
    pub kinds: HashMap<u64, EntityKind>,
    pub struct_names: HashMap<HostId, String>,
    pub unions: HashSet<HostId>,
    pub members: HashMap<HostId, (HostId, StructMemberInfo)>,
    pub struct_comments: HashMap<(HostId, bool), String>,
    pub enum_names: HashMap<HostId, String>,
    pub bitfields: HashSet<HostId>,
    pub enum_comments: HashMap<(HostId, bool), String>,
    pub enum_members: HashMap<HostId, EnumMemberInfo>,
    pub segments: HashMap<Address, SegmentInfo>,
    pub sreg_ranges: HashMap<u32, Vec<SegmentRegisterRange>>,
    pub item_types: HashMap<u64, RawType>,
    pub operand_formats: HashMap<(Address, u8), HostOperandFormat>,
    pub bytes: HashMap<Address, u8>,
    pub comments: HashMap<(Address, bool), String>,
    pub item_states: HashMap<Address, ItemState>,
    /// Function ranges, `[start, end)`.
    pub functions: Vec<(Address, Address)>,
    pub local_types: BTreeMap<u32, LocalTypeInfo>,
    pub decompiler: HashMap<Address, FunctionSyncEntry>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_struct(&mut self, id: u64, name: &str) -> HostId {
        let id = HostId::new(id);
        self.kinds.insert(id.value(), EntityKind::Struct);
        self.struct_names.insert(id, name.to_string());
        id
    }

    pub fn add_member(&mut self, struct_id: HostId, member_id: u64, member: StructMemberInfo) -> HostId {
        let id = HostId::new(member_id);
        self.kinds.insert(member_id, EntityKind::StructMember);
        self.members.insert(id, (struct_id, member));
        id
    }

    pub fn add_enum(&mut self, id: u64, name: &str) -> HostId {
        let id = HostId::new(id);
        self.kinds.insert(id.value(), EntityKind::Enum);
        self.enum_names.insert(id, name.to_string());
        id
    }

    pub fn add_enum_member(&mut self, member_id: u64, member: EnumMemberInfo) -> HostId {
        let id = HostId::new(member_id);
        self.kinds.insert(member_id, EntityKind::EnumMember);
        self.enum_members.insert(id, member);
        id
    }

    pub fn add_function(&mut self, start: u64, end: u64) -> Address {
        self.functions.push((Address::new(start), Address::new(end)));
        Address::new(start)
    }

    pub fn set_local_type(&mut self, ordinal: u32, name: &str, bytes: &[u8]) {
        self.local_types.insert(ordinal, local_type(name, bytes));
    }

    pub fn remove_local_type(&mut self, ordinal: u32) -> Option<LocalTypeInfo> {
        self.local_types.remove(&ordinal)
    }

    pub fn decompiler_state(&mut self, function: Address) -> &mut FunctionSyncEntry {
        self.decompiler.entry(function).or_default()
    }
}

/// A local type with no fields and no comment.
pub fn local_type(name: &str, bytes: &[u8]) -> LocalTypeInfo {
    LocalTypeInfo {
        name: name.to_string(),
        ty: RawType { bytes: bytes.to_vec(), ..Default::default() },
        comment: String::new(),
        storage_class: 0,
    }
}

/// A plain (non-union) structure member spanning `[start, end)`.
pub fn member(name: &str, start: u64, end: u64) -> StructMemberInfo {
    StructMemberInfo {
        name: name.to_string(),
        start,
        end,
        flags: 0,
        in_union: false,
        repr: kbsync_capture::host::HostMemberRepr::Plain,
    }
}

impl HostDatabase for FakeHost {
    fn auto_analysis_state(&self) -> AutoAnalysisState {
        if self.auto_analysis_running { AutoAnalysisState::Running } else { AutoAnalysisState::Idle }
    }

    fn entity_kind(&self, raw: u64) -> EntityKind {
        self.kinds.get(&raw).copied().unwrap_or(EntityKind::Item)
    }

    fn struct_name(&self, id: HostId) -> Option<String> {
        self.struct_names.get(&id).cloned()
    }

    fn struct_is_union(&self, id: HostId) -> bool {
        self.unions.contains(&id)
    }

    fn struct_member(&self, struct_id: HostId, member_id: HostId) -> Option<StructMemberInfo> {
        self.members
            .get(&member_id)
            .filter(|(owner, _)| *owner == struct_id)
            .map(|(_, m)| m.clone())
    }

    fn member_location(&self, member_id: HostId) -> Option<MemberLocation> {
        self.members.get(&member_id).map(|(struct_id, m)| MemberLocation {
            struct_id: *struct_id,
            name: m.name.clone(),
            offset: m.offset(),
        })
    }

    fn struct_comment(&self, id: HostId, repeatable: bool) -> Option<String> {
        self.struct_comments.get(&(id, repeatable)).cloned()
    }

    fn enum_name(&self, id: HostId) -> Option<String> {
        self.enum_names.get(&id).cloned()
    }

    fn enum_is_bitfield(&self, id: HostId) -> bool {
        self.bitfields.contains(&id)
    }

    fn enum_comment(&self, id: HostId, repeatable: bool) -> Option<String> {
        self.enum_comments.get(&(id, repeatable)).cloned()
    }

    fn enum_member(&self, member_id: HostId) -> Option<EnumMemberInfo> {
        self.enum_members.get(&member_id).cloned()
    }

    fn segment(&self, start: Address) -> Option<SegmentInfo> {
        self.segments.get(&start).cloned()
    }

    fn segment_register_ranges(&self, register: u32) -> Vec<SegmentRegisterRange> {
        self.sreg_ranges.get(&register).cloned().unwrap_or_default()
    }

    fn item_type(&self, raw: u64) -> Option<RawType> {
        self.item_types.get(&raw).cloned()
    }

    fn operand_format(&self, ea: Address, operand: u8) -> HostOperandFormat {
        self.operand_formats.get(&(ea, operand)).cloned().unwrap_or(HostOperandFormat::Other)
    }

    fn byte_at(&self, ea: Address) -> Option<u8> {
        self.bytes.get(&ea).copied()
    }

    fn comment(&self, ea: Address, repeatable: bool) -> Option<String> {
        self.comments.get(&(ea, repeatable)).cloned()
    }

    fn item_state(&self, ea: Address) -> ItemState {
        self.item_states.get(&ea).copied().unwrap_or(ItemState::Unknown)
    }

    fn function_start(&self, ea: Address) -> Option<Address> {
        self.functions
            .iter()
            .find(|(start, end)| *start <= ea && ea < *end)
            .map(|(start, _)| *start)
    }

    fn local_type_count(&self) -> u32 {
        self.local_types.keys().next_back().copied().unwrap_or(0)
    }

    fn local_type(&self, ordinal: Ordinal) -> Option<LocalTypeInfo> {
        self.local_types.get(&ordinal.value()).cloned()
    }

    fn is_struct_or_enum(&self, name: &str) -> bool {
        self.struct_names.values().chain(self.enum_names.values()).any(|n| n == name)
    }

    fn user_labels(&self, function: Address) -> Vec<UserLabel> {
        self.decompiler.get(&function).map(|e| e.labels.clone()).unwrap_or_default()
    }

    fn user_comments(&self, function: Address) -> Vec<UserComment> {
        self.decompiler.get(&function).map(|e| e.comments.clone()).unwrap_or_default()
    }

    fn user_item_flags(&self, function: Address) -> Vec<UserItemFlag> {
        self.decompiler.get(&function).map(|e| e.item_flags.clone()).unwrap_or_default()
    }

    fn user_lvar_settings(&self, function: Address) -> LvarSettings {
        self.decompiler.get(&function).map(|e| e.lvar_settings.clone()).unwrap_or_default()
    }

    fn user_number_formats(&self, function: Address) -> Vec<UserNumberFormat> {
        self.decompiler.get(&function).map(|e| e.number_formats.clone()).unwrap_or_default()
    }
}

/// Installs a log subscriber honouring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A session with default config and a recording transport.
pub fn make_session() -> (CaptureSession, RecordingTransport) {
    make_session_with(CaptureConfig::default())
}

pub fn make_session_with(config: CaptureConfig) -> (CaptureSession, RecordingTransport) {
    init_tracing();
    let transport = RecordingTransport::new();
    let snapshot = Snapshot::new("firmware", "bootloader.bin", "initial");
    let session = CaptureSession::new(config, snapshot, Box::new(transport.clone())).unwrap();
    (session, transport)
}
