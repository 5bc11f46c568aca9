pub mod soft_enum;

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::info;

use crate::error::OverloadError;
use crate::model::CommandDefinition;

pub use soft_enum::{SoftEnumStore, SoftEnumUpdate, SoftEnumUpdateKind};

// ── Command map ─────────────────────────────────────────────────

/// Registered top-level commands, looked up by name or alias.
///
/// Definitions are stored behind `Arc` and never mutated in place, so a
/// lookup hands out a snapshot that stays valid while the map changes.
/// Registration takes the write lock; lookups only the read lock.
#[derive(Debug, Default)]
pub struct CommandMap {
    inner: RwLock<MapInner>,
}

#[derive(Debug, Default)]
struct MapInner {
    /// Lower-cased name or alias → command.
    by_key: IndexMap<String, Arc<CommandDefinition>>,
    /// Lower-cased primary names in registration order.
    primary: Vec<String>,
}

fn command_keys(command: &CommandDefinition) -> Vec<String> {
    std::iter::once(command.name())
        .chain(command.aliases().iter().map(String::as_str))
        .map(str::to_lowercase)
        .collect()
}

impl CommandMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command` under its name and aliases. Fails without
    /// inserting anything when a key is already taken.
    pub fn register(&self, command: CommandDefinition) -> Result<Arc<CommandDefinition>, OverloadError> {
        let keys = command_keys(&command);
        let mut inner = self.inner.write();
        for (i, key) in keys.iter().enumerate() {
            if inner.by_key.contains_key(key) || keys.iter().take(i).any(|k| k == key) {
                return Err(OverloadError::DuplicateCommand { key: key.clone() });
            }
        }

        let command = Arc::new(command);
        for key in &keys {
            inner.by_key.insert(key.clone(), Arc::clone(&command));
        }
        inner.primary.push(command.name().to_lowercase());
        info!(command = command.name(), aliases = keys.len() - 1, "registered command");
        Ok(command)
    }

    /// Remove the command known as `name` (or by one of its aliases),
    /// together with every key it was registered under.
    pub fn unregister(&self, name: &str) -> Result<Arc<CommandDefinition>, OverloadError> {
        let mut inner = self.inner.write();
        let command = inner
            .by_key
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| OverloadError::CommandNotFound {
                name: name.to_string(),
            })?;

        for key in command_keys(&command) {
            inner.by_key.shift_remove(&key);
        }
        let primary = command.name().to_lowercase();
        inner.primary.retain(|p| *p != primary);
        info!(command = command.name(), "unregistered command");
        Ok(command)
    }

    /// Case-insensitive lookup by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<CommandDefinition>> {
        self.inner.read().by_key.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().by_key.contains_key(&name.to_lowercase())
    }

    /// Primary command names, lower-cased, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner.read().primary.clone()
    }

    /// Every registered command once, in registration order.
    pub fn commands(&self) -> Vec<Arc<CommandDefinition>> {
        let inner = self.inner.read();
        inner
            .primary
            .iter()
            .filter_map(|name| inner.by_key.get(name).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().primary.is_empty()
    }
}
