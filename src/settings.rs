use std::fs;
use std::io::Write;
use std::path::Path;

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::OverloadError;

pub const SETTINGS_FILE: &str = "overloads.json";

const SETTINGS_VERSION: u32 = 1;

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_attach_soft_enums() -> bool {
    true
}

/// Behaviour of the packet hook, stored as JSON next to the host's other
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HookSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Replace the packet's soft enums with the store's current snapshot.
    #[serde(default = "default_attach_soft_enums")]
    pub attach_soft_enums: bool,
    /// Cap on overloads per command after rewriting. None = unlimited.
    #[serde(default)]
    pub overload_limit: Option<usize>,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            attach_soft_enums: true,
            overload_limit: None,
        }
    }
}

/// Load settings from `path`. A missing file yields the defaults; an
/// unreadable or malformed one is an error.
pub fn load_settings(path: &Path) -> Result<HookSettings, OverloadError> {
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(HookSettings::default());
    }
    let data = fs::read_to_string(path)?;
    let settings: HookSettings = serde_json::from_str(&data)?;
    if settings.version > SETTINGS_VERSION {
        return Err(OverloadError::Validation {
            message: format!(
                "settings version {} is newer than supported version {SETTINGS_VERSION}",
                settings.version
            ),
        });
    }
    Ok(settings)
}

/// Save settings to `path` (atomic: write a sibling `.tmp`, then rename).
pub fn save_settings(path: &Path, settings: &HookSettings) -> Result<(), OverloadError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// JSON Schema of [`HookSettings`].
pub fn settings_schema() -> Value {
    let root = schema_for!(HookSettings);
    serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
}
