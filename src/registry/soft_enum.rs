//! Soft enums: named value sets that can change after commands are
//! registered (warp names, online players, kit names).
//!
//! The store only tracks state. Each mutation returns a [`SoftEnumUpdate`]
//! describing what changed; pushing that to connected clients is the
//! caller's job.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::error::OverloadError;
use crate::model::CommandEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoftEnumUpdateKind {
    Add,
    Remove,
    Set,
}

/// One change to a soft enum, in the shape clients expect it broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftEnumUpdate {
    pub enum_name: String,
    pub values: Vec<String>,
    pub kind: SoftEnumUpdateKind,
}

#[derive(Debug, Default)]
pub struct SoftEnumStore {
    enums: RwLock<IndexMap<String, CommandEnum>>,
}

impl SoftEnumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `soft_enum`, replacing any enum with the same name.
    pub fn add_enum(&self, soft_enum: CommandEnum) -> SoftEnumUpdate {
        let update = SoftEnumUpdate {
            enum_name: soft_enum.name.clone(),
            values: soft_enum.values.clone(),
            kind: SoftEnumUpdateKind::Set,
        };
        self.enums.write().insert(soft_enum.name.clone(), soft_enum);
        debug!(soft_enum = %update.enum_name, values = update.values.len(), "soft enum added");
        update
    }

    /// Change the values of an existing enum. `Add` appends values not
    /// already present, `Remove` drops the given values, `Set` replaces all.
    pub fn update_enum(
        &self,
        enum_name: &str,
        values: Vec<String>,
        kind: SoftEnumUpdateKind,
    ) -> Result<SoftEnumUpdate, OverloadError> {
        let mut enums = self.enums.write();
        let soft_enum = enums
            .get_mut(enum_name)
            .ok_or_else(|| OverloadError::SoftEnumNotFound {
                name: enum_name.to_string(),
            })?;

        match kind {
            SoftEnumUpdateKind::Add => {
                for value in &values {
                    if !soft_enum.values.contains(value) {
                        soft_enum.values.push(value.clone());
                    }
                }
            }
            SoftEnumUpdateKind::Remove => soft_enum.values.retain(|v| !values.contains(v)),
            SoftEnumUpdateKind::Set => soft_enum.values.clone_from(&values),
        }
        debug!(soft_enum = enum_name, ?kind, values = values.len(), "soft enum updated");

        Ok(SoftEnumUpdate {
            enum_name: enum_name.to_string(),
            values,
            kind,
        })
    }

    pub fn remove_enum(&self, enum_name: &str) -> Result<SoftEnumUpdate, OverloadError> {
        let removed = self
            .enums
            .write()
            .shift_remove(enum_name)
            .ok_or_else(|| OverloadError::SoftEnumNotFound {
                name: enum_name.to_string(),
            })?;
        Ok(SoftEnumUpdate {
            enum_name: removed.name,
            values: removed.values,
            kind: SoftEnumUpdateKind::Remove,
        })
    }

    pub fn get_enum(&self, enum_name: &str) -> Option<CommandEnum> {
        self.enums.read().get(enum_name).cloned()
    }

    /// Snapshot of every enum in registration order.
    pub fn enums(&self) -> Vec<CommandEnum> {
        self.enums.read().values().cloned().collect()
    }
}
