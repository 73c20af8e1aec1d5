//! Entity snapshot cache.
//!
//! Holds the last observed canonical state of everything whose changes can
//! only be detected by diffing: local type declarations (by ordinal) and
//! decompiler user state (by function). Memory grows with the number of
//! ordinals and functions touched in one session; nothing is evicted.

use kbsync_types::decompiler::{
    LvarSettings, UserComment, UserItemFlag, UserLabel, UserNumberFormat,
};
use kbsync_types::{Address, DeclarationSnapshot, Ordinal, TypeDeclaration};
use std::collections::{BTreeMap, HashMap};

/// Key of a cached entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Ordinal(Ordinal),
    Function(Address),
}

/// A value to store in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Declaration(DeclarationSnapshot),
    Function(FunctionSyncEntry),
}

/// A borrowed cache entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachedEntity<'a> {
    Declaration(&'a DeclarationSnapshot),
    Function(&'a FunctionSyncEntry),
}

/// Last-sent decompiler user state of one function.
///
/// Every slot starts empty, which is what the host reports for a function
/// nobody customised, so an untouched function never produces events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionSyncEntry {
    pub labels: Vec<UserLabel>,
    pub comments: Vec<UserComment>,
    pub item_flags: Vec<UserItemFlag>,
    pub lvar_settings: LvarSettings,
    pub number_formats: Vec<UserNumberFormat>,
}

/// Owned snapshot cache for one synchronization session.
#[derive(Debug, Default)]
pub struct EntitySnapshotCache {
    declarations: BTreeMap<Ordinal, DeclarationSnapshot>,
    delete_candidates: BTreeMap<Ordinal, DeclarationSnapshot>,
    functions: HashMap<Address, FunctionSyncEntry>,
}

impl EntitySnapshotCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a cached entity.
    pub fn get(&self, key: &EntityKey) -> Option<CachedEntity<'_>> {
        match key {
            EntityKey::Ordinal(ordinal) => {
                self.declarations.get(ordinal).map(CachedEntity::Declaration)
            }
            EntityKey::Function(ea) => self.functions.get(ea).map(CachedEntity::Function),
        }
    }

    /// Stores an entity, replacing any previous value. A value of the wrong
    /// shape for the key is ignored and `false` is returned.
    pub fn put(&mut self, key: EntityKey, value: CachedValue) -> bool {
        match (key, value) {
            (EntityKey::Ordinal(ordinal), CachedValue::Declaration(declaration)) => {
                self.declarations.insert(ordinal, declaration);
                true
            }
            (EntityKey::Function(ea), CachedValue::Function(entry)) => {
                self.functions.insert(ea, entry);
                true
            }
            _ => false,
        }
    }

    // ── Declarations ─────────────────────────────────────────────

    pub fn declaration(&self, ordinal: Ordinal) -> Option<&DeclarationSnapshot> {
        self.declarations.get(&ordinal)
    }

    pub fn put_declaration(&mut self, declaration: TypeDeclaration) {
        self.declarations.insert(declaration.ordinal, declaration.declaration);
    }

    /// Forgets the declaration at `ordinal` without keeping a candidate.
    pub fn remove_declaration(&mut self, ordinal: Ordinal) -> Option<DeclarationSnapshot> {
        self.declarations.remove(&ordinal)
    }

    /// All ordinals with a live declaration, ascending.
    pub fn ordinals(&self) -> impl Iterator<Item = Ordinal> + '_ {
        self.declarations.keys().copied()
    }

    /// Number of live declarations.
    pub fn declaration_count(&self) -> usize {
        self.declarations.len()
    }

    /// Moves the live declaration at `ordinal` to the delete candidates.
    /// Returns false if there was nothing to move.
    pub fn move_to_delete_candidates(&mut self, ordinal: Ordinal) -> bool {
        match self.declarations.remove(&ordinal) {
            Some(declaration) => {
                self.delete_candidates.insert(ordinal, declaration);
                true
            }
            None => false,
        }
    }

    pub fn delete_candidate(&self, ordinal: Ordinal) -> Option<&DeclarationSnapshot> {
        self.delete_candidates.get(&ordinal)
    }

    pub fn pop_delete_candidate(&mut self, ordinal: Ordinal) -> Option<DeclarationSnapshot> {
        self.delete_candidates.remove(&ordinal)
    }

    /// Drops every declaration. Delete candidates are kept.
    pub fn clear_declarations(&mut self) {
        self.declarations.clear();
    }

    /// All ordinals with a pending delete candidate, ascending.
    pub fn delete_candidate_ordinals(&self) -> impl Iterator<Item = Ordinal> + '_ {
        self.delete_candidates.keys().copied()
    }

    // ── Functions ────────────────────────────────────────────────

    pub fn function_entry(&self, ea: Address) -> Option<&FunctionSyncEntry> {
        self.functions.get(&ea)
    }

    /// Gets the entry for a function, creating an empty one if needed.
    pub fn function_entry_mut(&mut self, ea: Address) -> &mut FunctionSyncEntry {
        self.functions.entry(ea).or_default()
    }

    /// Number of functions observed.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}
