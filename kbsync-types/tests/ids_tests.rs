use kbsync_types::decompiler::VariableLocation;
use kbsync_types::{Address, HostId, Ordinal, SnapshotId, Tick};
use std::collections::HashSet;
use std::str::FromStr;

// ── Address ───────────────────────────────────────────────────────

#[test]
fn address_displays_as_hex() {
    assert_eq!(Address::new(0x1000).to_string(), "0x1000");
    assert_eq!(Address::new(0).to_string(), "0x0");
}

#[test]
fn address_parses_hex_and_decimal() {
    assert_eq!(Address::from_str("0x1000").unwrap(), Address::new(0x1000));
    assert_eq!(Address::from_str("0X1f").unwrap(), Address::new(0x1f));
    assert_eq!(Address::from_str("4096").unwrap(), Address::new(4096));
}

#[test]
fn address_parse_invalid() {
    assert!(Address::from_str("0xzz").is_err());
    assert!(Address::from_str("main").is_err());
}

#[test]
fn address_default_is_zero() {
    assert_eq!(Address::default(), Address::new(0));
    assert_eq!(VariableLocation::default().ea.to_string(), "0x0");
}

#[test]
fn address_serde_is_transparent() {
    let json = serde_json::to_string(&Address::new(4096)).unwrap();
    assert_eq!(json, "4096");
    let parsed: Address = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, Address::new(4096));
}

#[test]
fn address_ordering_follows_value() {
    assert!(Address::new(1) < Address::new(2));
}

// ── HostId / Ordinal ──────────────────────────────────────────────

#[test]
fn host_id_display() {
    assert_eq!(HostId::new(0xff00_0001).to_string(), "id:0xff000001");
}

#[test]
fn ordinal_display_and_order() {
    assert_eq!(Ordinal::new(7).to_string(), "#7");
    assert!(Ordinal::new(3) < Ordinal::new(12));
}

// ── Tick ──────────────────────────────────────────────────────────

#[test]
fn tick_zero_is_default() {
    assert_eq!(Tick::default(), Tick::ZERO);
    assert_eq!(Tick::ZERO.value(), 0);
}

#[test]
fn tick_next_increments() {
    assert_eq!(Tick::new(41).next(), Tick::new(42));
}

#[test]
fn tick_next_saturates() {
    assert_eq!(Tick::new(u64::MAX).next(), Tick::new(u64::MAX));
}

// ── SnapshotId ────────────────────────────────────────────────────

#[test]
fn snapshot_id_new_is_unique() {
    let a = SnapshotId::new();
    let b = SnapshotId::new();
    assert_ne!(a, b);
}

#[test]
fn snapshot_id_display_and_parse() {
    let id = SnapshotId::new();
    let parsed = SnapshotId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
    let from_str: SnapshotId = id.to_string().parse().unwrap();
    assert_eq!(id, from_str);
}

#[test]
fn snapshot_id_parse_invalid() {
    assert!(SnapshotId::parse("not-a-uuid").is_err());
}

#[test]
fn snapshot_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    assert_eq!(SnapshotId::from_uuid(uuid).as_uuid(), uuid);
}

#[test]
fn snapshot_id_hash_eq() {
    let id = SnapshotId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}
