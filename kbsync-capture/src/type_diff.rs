//! Local type library diffing.
//!
//! The host reports type library changes with a single payload-less signal,
//! so every known ordinal is compared against the cache. An ordinal that no
//! longer resolves is not deleted right away: the host may be about to
//! reuse it, and the replacement must be diffed against the old content.
//! The old content waits among the delete candidates until the next batch
//! settles it.

use crate::cache::EntitySnapshotCache;
use crate::host::HostDatabase;
use crate::type_parser::{serialize_type, TypeParser};
use kbsync_types::{DeclarationSnapshot, Ordinal, TypeDeclaration};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// One settled difference in the type library.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeChange {
    /// A declaration appeared at an ordinal the cache did not know.
    New(TypeDeclaration),
    /// The declaration at `ordinal` changed, or an ordinal pending deletion
    /// came back with different content.
    Modified {
        ordinal: Ordinal,
        previous: DeclarationSnapshot,
        current: DeclarationSnapshot,
    },
    /// A delete candidate stayed unresolved for a whole batch.
    Deleted {
        ordinal: Ordinal,
        previous: DeclarationSnapshot,
    },
}

impl TypeChange {
    pub fn ordinal(&self) -> Ordinal {
        match self {
            TypeChange::New(declaration) => declaration.ordinal,
            TypeChange::Modified { ordinal, .. } | TypeChange::Deleted { ordinal, .. } => *ordinal,
        }
    }
}

/// What the host currently holds at an ordinal.
enum Lookup {
    Resolved(DeclarationSnapshot),
    /// Present but owned by structure/enumeration notifications, or unnamed.
    Skipped,
    Missing,
}

fn lookup(host: &dyn HostDatabase, parser: &dyn TypeParser, ordinal: Ordinal) -> Lookup {
    let Some(info) = host.local_type(ordinal) else {
        return Lookup::Missing;
    };
    if info.name.is_empty() || host.is_struct_or_enum(&info.name) {
        return Lookup::Skipped;
    }
    let names = |o: Ordinal| host.local_type_name(o);
    Lookup::Resolved(DeclarationSnapshot {
        name: info.name,
        descriptor: serialize_type(parser, info.ty, &names),
        comment: info.comment,
        storage_class: info.storage_class,
    })
}

/// Replaces the cached type library with the host's current one, without
/// reporting anything. Used at session start and after remote changes were
/// applied locally.
///
/// Pending delete candidates survive unless their ordinal resolves again,
/// in which case the host's content becomes the new baseline.
pub fn prime_type_cache(
    host: &dyn HostDatabase,
    parser: &dyn TypeParser,
    cache: &mut EntitySnapshotCache,
) -> usize {
    cache.clear_declarations();
    for raw in 1..=host.local_type_count() {
        let ordinal = Ordinal::new(raw);
        if let Lookup::Resolved(declaration) = lookup(host, parser, ordinal) {
            cache.pop_delete_candidate(ordinal);
            cache.put_declaration(TypeDeclaration::new(ordinal, declaration));
        }
    }
    let primed = cache.declaration_count();
    info!("Primed type cache with {} declarations", primed);
    primed
}

/// Diffs the host's type library against the cache and brings the cache up
/// to date. Changes are returned in ascending ordinal order.
pub fn diff_local_types(
    host: &dyn HostDatabase,
    parser: &dyn TypeParser,
    cache: &mut EntitySnapshotCache,
    emit_deletions: bool,
) -> Vec<TypeChange> {
    let mut ordinals: BTreeSet<Ordinal> = (1..=host.local_type_count()).map(Ordinal::new).collect();
    ordinals.extend(cache.ordinals());
    ordinals.extend(cache.delete_candidate_ordinals());

    let mut changes = Vec::new();
    for ordinal in ordinals {
        match lookup(host, parser, ordinal) {
            Lookup::Resolved(current) => {
                if let Some(change) = settle_resolved(cache, ordinal, current) {
                    changes.push(change);
                }
            }
            Lookup::Skipped => {
                cache.remove_declaration(ordinal);
                cache.pop_delete_candidate(ordinal);
            }
            Lookup::Missing => {
                if cache.move_to_delete_candidates(ordinal) {
                    debug!("Ordinal {} unresolved, kept as delete candidate", ordinal);
                } else if let Some(previous) = cache.pop_delete_candidate(ordinal) {
                    debug!("Delete candidate {} ({}) confirmed", ordinal, previous.name);
                    if emit_deletions {
                        changes.push(TypeChange::Deleted { ordinal, previous });
                    }
                }
            }
        }
    }

    if !changes.is_empty() {
        info!("Type library batch produced {} change(s)", changes.len());
    }
    changes
}

fn settle_resolved(
    cache: &mut EntitySnapshotCache,
    ordinal: Ordinal,
    current: DeclarationSnapshot,
) -> Option<TypeChange> {
    let candidate = cache.pop_delete_candidate(ordinal);
    let previous = cache.declaration(ordinal).cloned().or(candidate);

    let change = match previous {
        Some(previous) if previous.same_semantics(&current) => None,
        Some(previous) => Some(TypeChange::Modified {
            ordinal,
            previous,
            current: current.clone(),
        }),
        None => Some(TypeChange::New(TypeDeclaration::new(ordinal, current.clone()))),
    };
    cache.put_declaration(TypeDeclaration::new(ordinal, current));
    change
}
