//! Decompiler-derived per-function user state.
//!
//! The decompiler keeps five independent kinds of user customisation per
//! function. Each is synchronized as a whole: when any element changes the
//! complete list is sent again.

use crate::{Address, SerializedType};
use serde::{Deserialize, Serialize};

/// A user-assigned name for a decompiler label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLabel {
    /// Label number assigned by the decompiler.
    pub label: i32,
    pub name: String,
}

/// Position of a comment in the decompiler output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLocation {
    pub ea: Address,
    /// Item preciser (which part of the line the comment attaches to).
    pub itp: i32,
}

/// A user comment in the decompiler output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserComment {
    pub location: TreeLocation,
    pub comment: String,
}

/// Location of an item flag (address + operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentLocation {
    pub ea: Address,
    pub op: i32,
}

/// User-set item flags, e.g. collapsed blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserItemFlag {
    pub location: CommentLocation,
    pub flags: u32,
}

/// Where a local variable lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableLocation {
    pub atype: u32,
    pub reg1: i32,
    pub reg2: i32,
    pub stkoff: i64,
    pub ea: Address,
}

/// Identifies a local variable across decompilations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LvarLocator {
    pub location: VariableLocation,
    pub def_ea: Address,
}

/// Saved user information about one local variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LvarSavedInfo {
    pub locator: LvarLocator,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Option<SerializedType>,
    pub comment: String,
    pub flags: u32,
}

/// All user local-variable settings of one function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LvarSettings {
    pub variables: Vec<LvarSavedInfo>,
    #[serde(default)]
    pub sizes: Vec<i32>,
    /// Variable mappings (merged variables), source to target.
    #[serde(default)]
    pub mappings: Vec<(LvarLocator, LvarLocator)>,
    pub stkoff_delta: i64,
    pub flags: i32,
}

impl LvarSettings {
    /// Returns true if the function carries no user variable settings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == LvarSettings::default()
    }
}

/// Operand of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandLocator {
    pub ea: Address,
    pub opnum: i32,
}

/// How the decompiler displays a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    pub flags: u32,
    pub opnum: i8,
    pub props: u8,
    pub serial: u8,
    pub org_nbytes: i8,
    pub type_name: String,
}

/// A user-selected number format for one operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNumberFormat {
    pub operand: OperandLocator,
    pub format: NumberFormat,
}
