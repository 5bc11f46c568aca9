use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::OverloadError;
use crate::recipient::Recipient;

use super::argument::ArgumentConverter;
use super::argument_list::ArgumentList;

/// A named, permission-checked command: its own argument list plus any
/// sub-commands. Sub-commands are ordinary definitions without children.
///
/// Built once at registration time, then shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct CommandDefinition {
    name: String,
    description: String,
    aliases: Vec<String>,
    permissions: Vec<String>,
    argument_list: ArgumentList,
    /// Keyed by lower-cased name and every alias, so one sub-command
    /// usually appears under several keys.
    sub_commands: IndexMap<String, Arc<CommandDefinition>>,
}

impl CommandDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Add a permission node. Holding any one of the listed nodes is enough.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    pub fn argument_list(&self) -> &ArgumentList {
        &self.argument_list
    }

    pub fn register_argument(
        &mut self,
        position: usize,
        converter: ArgumentConverter,
    ) -> Result<(), OverloadError> {
        self.argument_list.register_argument(position, converter)
    }

    /// Register `sub_command` under its name and each alias.
    /// Fails without inserting anything if any key is already taken.
    pub fn register_sub_command(&mut self, sub_command: CommandDefinition) -> Result<(), OverloadError> {
        let keys: Vec<String> = std::iter::once(&sub_command.name)
            .chain(sub_command.aliases.iter())
            .map(|k| k.to_lowercase())
            .collect();
        for (i, key) in keys.iter().enumerate() {
            if self.sub_commands.contains_key(key) || keys.iter().take(i).any(|k| k == key) {
                return Err(OverloadError::DuplicateSubCommand {
                    command: self.name.clone(),
                    key: key.clone(),
                });
            }
        }
        let sub_command = Arc::new(sub_command);
        for key in keys {
            self.sub_commands.insert(key, Arc::clone(&sub_command));
        }
        Ok(())
    }

    /// Every registered sub-command entry in registration order. A
    /// sub-command with aliases is yielded once per key.
    pub fn sub_commands(&self) -> impl Iterator<Item = &CommandDefinition> + '_ {
        self.sub_commands.values().map(Arc::as_ref)
    }

    /// Look up a sub-command by name or alias, case-insensitively.
    pub fn sub_command(&self, key: &str) -> Option<&CommandDefinition> {
        self.sub_commands.get(&key.to_lowercase()).map(Arc::as_ref)
    }

    pub fn has_sub_commands(&self) -> bool {
        !self.sub_commands.is_empty()
    }

    /// Whether `recipient` may use this command. Unrestricted commands
    /// pass; otherwise any one listed permission suffices. Never reports a
    /// denial to anyone. Recipient errors propagate.
    pub fn test_permission_silent(&self, recipient: &dyn Recipient) -> Result<bool, OverloadError> {
        if self.permissions.is_empty() {
            return Ok(true);
        }
        for permission in &self.permissions {
            if recipient.has_permission(permission)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Structural equality: same name and same argument shape. Used to collapse
/// a sub-command that appears once per alias.
impl PartialEq for CommandDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.argument_list == other.argument_list
    }
}

impl Eq for CommandDefinition {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::argument::ArgumentKind;
    use crate::recipient::PermissionView;

    #[test]
    fn sub_command_is_registered_under_every_alias() {
        let mut cmd = CommandDefinition::new("warp");
        cmd.register_sub_command(CommandDefinition::new("list").with_aliases(["ls", "LIST-ALL"]))
            .unwrap();
        assert_eq!(cmd.sub_commands().count(), 3);
        assert_eq!(cmd.sub_command("list-all").unwrap().name(), "list");
        assert_eq!(cmd.sub_command("LS").unwrap().name(), "list");
    }

    #[test]
    fn duplicate_sub_command_key_inserts_nothing() {
        let mut cmd = CommandDefinition::new("warp");
        cmd.register_sub_command(CommandDefinition::new("set")).unwrap();
        let err = cmd
            .register_sub_command(CommandDefinition::new("create").with_aliases(["new", "set"]))
            .unwrap_err();
        assert_eq!(
            err,
            OverloadError::DuplicateSubCommand {
                command: "warp".to_string(),
                key: "set".to_string(),
            }
        );
        assert_eq!(cmd.sub_commands().count(), 1);
        assert!(cmd.sub_command("new").is_none());
    }

    #[test]
    fn alias_equal_to_own_name_is_rejected() {
        let mut cmd = CommandDefinition::new("warp");
        let err = cmd
            .register_sub_command(CommandDefinition::new("del").with_aliases(["DEL"]))
            .unwrap_err();
        assert!(matches!(err, OverloadError::DuplicateSubCommand { .. }));
        assert!(!cmd.has_sub_commands());
    }

    #[test]
    fn equality_ignores_description_and_permissions() {
        let mut a = CommandDefinition::new("set").with_description("one");
        a.register_argument(0, ArgumentConverter::required("name", ArgumentKind::RawString))
            .unwrap();
        let mut b = CommandDefinition::new("set")
            .with_description("two")
            .with_permission("warp.set");
        b.register_argument(0, ArgumentConverter::required("name", ArgumentKind::RawString))
            .unwrap();
        assert_eq!(a, b);

        let c = CommandDefinition::new("set");
        assert_ne!(a, c);
    }

    #[test]
    fn permission_check_any_of() {
        let cmd = CommandDefinition::new("ban")
            .with_permission("mod.ban")
            .with_permission("admin");
        let admin = PermissionView::new("a").grant("admin");
        let nobody = PermissionView::new("b");
        assert!(cmd.test_permission_silent(&admin).unwrap());
        assert!(!cmd.test_permission_silent(&nobody).unwrap());
    }

    #[test]
    fn unrestricted_command_skips_recipient() {
        let mut gone = PermissionView::new("c");
        gone.disconnect();
        assert!(CommandDefinition::new("help").test_permission_silent(&gone).unwrap());
    }
}
