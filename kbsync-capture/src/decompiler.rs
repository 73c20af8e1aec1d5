//! Decompiler user state diffing.
//!
//! The decompiler signals only that a function was printed. Its five kinds
//! of user state (labels, comments, item flags, local variable settings,
//! number formats) are fetched and compared slot by slot with what was last
//! sent. A slot is overwritten as soon as it differs, before the event has
//! gone anywhere, and is never rolled back.

use crate::cache::EntitySnapshotCache;
use crate::error::{CaptureError, CaptureResult};
use crate::host::{HostDatabase, RawType};
use crate::type_parser::{serialize_type, TypeParser};
use kbsync_types::decompiler::LvarSettings;
use kbsync_types::{Address, EventPayload};
use tracing::debug;

/// Diffs the user state of the function containing `ea`.
///
/// Events come out in the fixed slot order. Printing an unchanged function
/// yields nothing.
pub fn diff_function_state(
    host: &dyn HostDatabase,
    parser: &dyn TypeParser,
    cache: &mut EntitySnapshotCache,
    ea: Address,
) -> CaptureResult<Vec<EventPayload>> {
    let function = host
        .function_start(ea)
        .ok_or_else(|| CaptureError::UnresolvedReference(format!("function containing {ea}")))?;

    let labels = host.user_labels(function);
    let comments = host.user_comments(function);
    let item_flags = host.user_item_flags(function);
    let lvar_settings = resolve_lvar_types(host, parser, host.user_lvar_settings(function));
    let number_formats = host.user_number_formats(function);

    let entry = cache.function_entry_mut(function);
    let mut events = Vec::new();

    if entry.labels != labels {
        entry.labels = labels.clone();
        events.push(EventPayload::UserLabelsChanged { function, labels });
    }
    if entry.comments != comments {
        entry.comments = comments.clone();
        events.push(EventPayload::UserCommentsChanged { function, comments });
    }
    if entry.item_flags != item_flags {
        entry.item_flags = item_flags.clone();
        events.push(EventPayload::UserItemFlagsChanged { function, flags: item_flags });
    }
    if entry.lvar_settings != lvar_settings {
        entry.lvar_settings = lvar_settings.clone();
        events.push(EventPayload::UserLvarSettingsChanged { function, settings: lvar_settings });
    }
    if entry.number_formats != number_formats {
        entry.number_formats = number_formats.clone();
        events.push(EventPayload::UserNumberFormatsChanged { function, formats: number_formats });
    }

    debug!("Function {} printed, {} slot(s) changed", function, events.len());
    Ok(events)
}

fn resolve_lvar_types(
    host: &dyn HostDatabase,
    parser: &dyn TypeParser,
    mut settings: LvarSettings,
) -> LvarSettings {
    let names = |o| host.local_type_name(o);
    for variable in &mut settings.variables {
        if let Some(ty) = variable.ty.take() {
            let raw = RawType { bytes: ty.raw, fields: ty.fields, field_comments: ty.field_comments };
            variable.ty = Some(serialize_type(parser, raw, &names));
        }
    }
    settings
}
