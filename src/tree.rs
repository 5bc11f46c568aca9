//! JSON documents describing a command tree and its soft enums.
//!
//! Used by the CLI and fixtures. Arguments go through the same ordering
//! rules as programmatic registration.

use std::path::Path;

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OverloadError;
use crate::model::{ArgumentConverter, ArgumentKind, CommandDefinition, CommandEnum};
use crate::registry::{CommandMap, SoftEnumStore};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArgumentSpec {
    pub position: usize,
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    pub kind: ArgumentKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Any one of these grants access. Empty = everyone.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Registered in document order. Several entries with the same
    /// position are alternatives for that slot.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    #[serde(default)]
    pub sub_commands: Vec<CommandSpec>,
}

impl CommandSpec {
    pub fn build(&self) -> Result<CommandDefinition, OverloadError> {
        let mut command = CommandDefinition::new(&self.name)
            .with_description(&self.description)
            .with_aliases(self.aliases.iter().cloned());
        for permission in &self.permissions {
            command = command.with_permission(permission);
        }
        for argument in &self.arguments {
            command.register_argument(
                argument.position,
                ArgumentConverter::new(&argument.name, argument.optional, argument.kind.clone()),
            )?;
        }
        for sub_command in &self.sub_commands {
            if !sub_command.sub_commands.is_empty() {
                return Err(OverloadError::Validation {
                    message: format!(
                        "sub-command {}/{} cannot have sub-commands of its own",
                        self.name, sub_command.name
                    ),
                });
            }
            command.register_sub_command(sub_command.build()?)?;
        }
        Ok(command)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CommandTreeDocument {
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
    #[serde(default)]
    pub soft_enums: Vec<CommandEnum>,
}

impl CommandTreeDocument {
    /// Build every command before registering any, so a definition that
    /// fails to build leaves the map and store untouched.
    pub fn install(&self, commands: &CommandMap, soft_enums: &SoftEnumStore) -> Result<(), OverloadError> {
        let built = self
            .commands
            .iter()
            .map(CommandSpec::build)
            .collect::<Result<Vec<_>, _>>()?;
        for command in built {
            commands.register(command)?;
        }
        for soft_enum in &self.soft_enums {
            soft_enums.add_enum(soft_enum.clone());
        }
        Ok(())
    }
}

pub fn parse_tree(json: &str) -> Result<CommandTreeDocument, OverloadError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_tree(path: &Path) -> Result<CommandTreeDocument, OverloadError> {
    let data = std::fs::read_to_string(path)?;
    parse_tree(&data)
}

/// JSON Schema of [`CommandTreeDocument`], for editors and validation.
pub fn tree_schema() -> Value {
    let root = schema_for!(CommandTreeDocument);
    serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({ "type": "object" }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::Overload;
    use crate::overloads::expand_overloads;
    use crate::recipient::PermissionView;

    const WARP_TREE: &str = r#"{
        "commands": [
            {
                "name": "warp",
                "description": "Teleport to a warp",
                "aliases": ["w"],
                "arguments": [
                    { "position": 0, "name": "warp", "kind": { "type": "soft_enum", "enum_name": "warps" } },
                    { "position": 0, "name": "page", "optional": true, "kind": { "type": "integer" } }
                ],
                "sub_commands": [
                    { "name": "list", "aliases": ["ls"] },
                    {
                        "name": "set",
                        "permissions": ["warp.admin"],
                        "arguments": [
                            { "position": 0, "name": "name", "kind": { "type": "raw_string" } },
                            { "position": 1, "name": "public", "optional": true, "kind": { "type": "boolean" } }
                        ]
                    }
                ]
            }
        ],
        "soft_enums": [ { "name": "warps", "values": ["spawn", "shop"] } ]
    }"#;

    #[test]
    fn installs_commands_and_enums() {
        let doc = parse_tree(WARP_TREE).unwrap();
        let map = CommandMap::new();
        let store = SoftEnumStore::new();
        doc.install(&map, &store).unwrap();

        let warp = map.get("w").unwrap();
        assert_eq!(warp.sub_commands().count(), 3);
        assert_eq!(store.get_enum("warps").unwrap().values, vec!["spawn", "shop"]);

        let admin = PermissionView::new("admin").grant("warp.admin");
        let overloads = expand_overloads(&warp, &admin).unwrap();
        let names: Vec<Vec<&str>> = overloads.iter().map(Overload::names).collect();
        assert_eq!(
            names,
            vec![vec!["list"], vec!["set", "name", "public"], vec!["warp"], vec!["page"]]
        );
    }

    #[test]
    fn argument_order_errors_surface() {
        let doc = parse_tree(
            r#"{ "commands": [ { "name": "bad", "arguments": [
                { "position": 1, "name": "late", "kind": { "type": "integer" } }
            ] } ] }"#,
        )
        .unwrap();
        let map = CommandMap::new();
        let err = doc.install(&map, &SoftEnumStore::new()).unwrap_err();
        assert!(matches!(err, OverloadError::ArgumentOrder { position: 1, .. }));
        assert!(map.is_empty());
    }

    #[test]
    fn nested_sub_commands_are_rejected() {
        let doc = parse_tree(
            r#"{ "commands": [ { "name": "a", "sub_commands": [
                { "name": "b", "sub_commands": [ { "name": "c" } ] }
            ] } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            doc.install(&CommandMap::new(), &SoftEnumStore::new()),
            Err(OverloadError::Validation { .. })
        ));
    }

    #[test]
    fn malformed_document_is_a_json_error() {
        assert!(matches!(parse_tree("[1, 2"), Err(OverloadError::Json { .. })));
    }

    #[test]
    fn schema_describes_commands() {
        let schema = tree_schema();
        let text = schema.to_string();
        assert!(text.contains("commands"));
        assert!(text.contains("soft_enums"));
    }
}
