//! Rewriting of outbound "available commands" packets.
//!
//! Only one hook may be active per [`HookSlot`]. The slot is owned by the
//! host (not a process global): `register` claims it, dropping the returned
//! [`PacketHook`] releases it.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::OverloadError;
use crate::model::{CommandEnum, Overload};
use crate::overloads::expand_overloads;
use crate::recipient::Recipient;
use crate::registry::{CommandMap, SoftEnumStore};
use crate::settings::HookSettings;

// ── Packet model ────────────────────────────────────────────────

/// One command entry of the packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandData {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<CommandEnum>,
    pub overloads: Vec<Overload>,
}

/// In-memory form of the "available commands" message, keyed by command
/// name. Encoding it for the wire is the transport's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableCommandsPacket {
    pub command_data: IndexMap<String, CommandData>,
    #[serde(default)]
    pub soft_enums: Vec<CommandEnum>,
}

impl AvailableCommandsPacket {
    /// A packet listing every command in `commands`, with no overloads
    /// filled in yet.
    pub fn from_commands(commands: &CommandMap) -> Self {
        let command_data = commands
            .commands()
            .iter()
            .map(|command| {
                let name = command.name().to_lowercase();
                let aliases = (!command.aliases().is_empty()).then(|| {
                    let mut values: Vec<String> =
                        command.aliases().iter().map(|a| a.to_lowercase()).collect();
                    values.push(name.clone());
                    CommandEnum::new(format!("{name}Aliases"), values)
                });
                let data = CommandData {
                    name: name.clone(),
                    description: command.description().to_string(),
                    aliases,
                    overloads: Vec::new(),
                };
                (name, data)
            })
            .collect();
        Self {
            command_data,
            soft_enums: Vec::new(),
        }
    }
}

// ── Registration slot ───────────────────────────────────────────

/// Externally-owned "at most one hook" flag.
#[derive(Debug, Default)]
pub struct HookSlot {
    holder: Mutex<Option<String>>,
}

impl HookSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_registered(&self) -> bool {
        self.holder.lock().is_some()
    }

    /// Name of the registrant currently holding the slot.
    pub fn holder(&self) -> Option<String> {
        self.holder.lock().clone()
    }

    /// Claim the slot for `registrant`. Fails while another hook is alive.
    pub fn register(
        self: &Arc<Self>,
        registrant: impl Into<String>,
        commands: Arc<CommandMap>,
        soft_enums: Arc<SoftEnumStore>,
        settings: HookSettings,
    ) -> Result<PacketHook, OverloadError> {
        let registrant = registrant.into();
        {
            let mut holder = self.holder.lock();
            if let Some(current) = holder.as_ref() {
                return Err(OverloadError::HookAlreadyRegistered {
                    holder: current.clone(),
                });
            }
            *holder = Some(registrant.clone());
        }
        info!(registrant = %registrant, "packet hook registered");
        Ok(PacketHook {
            slot: Arc::clone(self),
            registrant,
            commands,
            soft_enums,
            settings,
        })
    }
}

// ── Hook ────────────────────────────────────────────────────────

/// An active registration. Rewrites packets per recipient; releases its
/// slot when dropped.
#[derive(Debug)]
pub struct PacketHook {
    slot: Arc<HookSlot>,
    registrant: String,
    commands: Arc<CommandMap>,
    soft_enums: Arc<SoftEnumStore>,
    settings: HookSettings,
}

impl PacketHook {
    pub fn registrant(&self) -> &str {
        &self.registrant
    }

    pub fn settings(&self) -> &HookSettings {
        &self.settings
    }

    /// A copy of `packet` with the overloads of every known command
    /// recomputed for `recipient`. Commands the map does not know keep
    /// their original overloads.
    pub fn rewrite(
        &self,
        packet: &AvailableCommandsPacket,
        recipient: &dyn Recipient,
    ) -> Result<AvailableCommandsPacket, OverloadError> {
        let mut rewritten = packet.clone();
        for (name, data) in &mut rewritten.command_data {
            let Some(command) = self.commands.get(name) else {
                continue;
            };
            let mut overloads = expand_overloads(&command, recipient)?;
            if let Some(limit) = self.settings.overload_limit {
                if overloads.len() > limit {
                    warn!(
                        command = %name,
                        overloads = overloads.len(),
                        limit,
                        "overload list truncated"
                    );
                    overloads.truncate(limit);
                }
            }
            data.overloads = overloads;
        }
        if self.settings.attach_soft_enums {
            rewritten.soft_enums = self.soft_enums.enums();
        }
        Ok(rewritten)
    }

    /// One independently rewritten packet per target, in target order.
    /// A failure for one target leaves the others untouched.
    pub fn rewrite_for_targets(
        &self,
        packet: &AvailableCommandsPacket,
        targets: &[&dyn Recipient],
    ) -> Vec<Result<AvailableCommandsPacket, OverloadError>> {
        targets
            .iter()
            .map(|target| {
                let result = self.rewrite(packet, *target);
                if let Err(e) = &result {
                    warn!(recipient = target.id(), error = %e, "packet rewrite failed");
                }
                result
            })
            .collect()
    }
}

impl Drop for PacketHook {
    fn drop(&mut self) {
        *self.slot.holder.lock() = None;
        info!(registrant = %self.registrant, "packet hook released");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{ArgumentConverter, ArgumentKind, CommandDefinition, CommandParameter};
    use crate::recipient::PermissionView;

    fn setup() -> (Arc<CommandMap>, Arc<SoftEnumStore>) {
        let map = Arc::new(CommandMap::new());
        let mut warp = CommandDefinition::new("warp")
            .with_description("Teleport to a warp")
            .with_aliases(["w"]);
        warp.register_sub_command(CommandDefinition::new("list")).unwrap();
        let mut set = CommandDefinition::new("set").with_permission("warp.admin");
        set.register_argument(0, ArgumentConverter::required("name", ArgumentKind::RawString))
            .unwrap();
        warp.register_sub_command(set).unwrap();
        warp.register_argument(
            0,
            ArgumentConverter::required(
                "warp",
                ArgumentKind::SoftEnum {
                    enum_name: "warps".to_string(),
                },
            ),
        )
        .unwrap();
        map.register(warp).unwrap();

        let store = Arc::new(SoftEnumStore::new());
        store.add_enum(CommandEnum::new("warps", vec!["spawn".to_string()]));
        (map, store)
    }

    fn packet_with_foreign_command(map: &CommandMap) -> AvailableCommandsPacket {
        let mut packet = AvailableCommandsPacket::from_commands(map);
        packet.command_data.insert(
            "vanilla".to_string(),
            CommandData {
                name: "vanilla".to_string(),
                description: String::new(),
                aliases: None,
                overloads: vec![Overload::new(vec![CommandParameter::sub_command("keep")])],
            },
        );
        packet
    }

    #[test]
    fn slot_is_exclusive_until_teardown() {
        let (map, store) = setup();
        let slot = HookSlot::new();
        let hook = slot
            .register("first", Arc::clone(&map), Arc::clone(&store), HookSettings::default())
            .unwrap();
        assert!(slot.is_registered());
        assert_eq!(slot.holder().as_deref(), Some("first"));

        let err = slot
            .register("second", Arc::clone(&map), Arc::clone(&store), HookSettings::default())
            .unwrap_err();
        assert_eq!(
            err,
            OverloadError::HookAlreadyRegistered {
                holder: "first".to_string(),
            }
        );

        drop(hook);
        assert!(!slot.is_registered());
        let again = slot
            .register("second", map, store, HookSettings::default())
            .unwrap();
        assert_eq!(again.registrant(), "second");
    }

    #[test]
    fn separate_slots_do_not_interfere() {
        let (map, store) = setup();
        let a = HookSlot::new();
        let b = HookSlot::new();
        let _ha = a
            .register("a", Arc::clone(&map), Arc::clone(&store), HookSettings::default())
            .unwrap();
        assert!(b.register("b", map, store, HookSettings::default()).is_ok());
    }

    #[test]
    fn from_commands_lists_aliases_with_name() {
        let (map, _) = setup();
        let packet = AvailableCommandsPacket::from_commands(&map);
        let data = &packet.command_data["warp"];
        assert_eq!(data.description, "Teleport to a warp");
        let aliases = data.aliases.as_ref().unwrap();
        assert_eq!(aliases.name, "warpAliases");
        assert_eq!(aliases.values, vec!["w", "warp"]);
        assert!(data.overloads.is_empty());
    }

    #[test]
    fn rewrite_fills_known_commands_only() {
        let (map, store) = setup();
        let slot = HookSlot::new();
        let hook = slot
            .register("t", Arc::clone(&map), store, HookSettings::default())
            .unwrap();
        let packet = packet_with_foreign_command(&map);

        let guest = PermissionView::new("guest");
        let rewritten = hook.rewrite(&packet, &guest).unwrap();

        let warp: Vec<Vec<&str>> = rewritten.command_data["warp"]
            .overloads
            .iter()
            .map(Overload::names)
            .collect();
        assert_eq!(warp, vec![vec!["list"], vec!["warp"]]);
        assert_eq!(
            rewritten.command_data["vanilla"].overloads,
            packet.command_data["vanilla"].overloads
        );
        assert_eq!(rewritten.soft_enums, vec![CommandEnum::new("warps", vec!["spawn".to_string()])]);
        // input untouched
        assert!(packet.command_data["warp"].overloads.is_empty());
    }

    #[test]
    fn soft_enums_left_alone_when_disabled() {
        let (map, store) = setup();
        let slot = HookSlot::new();
        let settings = HookSettings {
            attach_soft_enums: false,
            ..HookSettings::default()
        };
        let hook = slot.register("t", Arc::clone(&map), store, settings).unwrap();
        let packet = AvailableCommandsPacket::from_commands(&map);
        let rewritten = hook.rewrite(&packet, &PermissionView::new("p")).unwrap();
        assert!(rewritten.soft_enums.is_empty());
    }

    #[test]
    fn overload_limit_truncates() {
        let (map, store) = setup();
        let slot = HookSlot::new();
        let settings = HookSettings {
            overload_limit: Some(1),
            ..HookSettings::default()
        };
        let hook = slot.register("t", Arc::clone(&map), store, settings).unwrap();
        let packet = AvailableCommandsPacket::from_commands(&map);
        let admin = PermissionView::new("admin").grant("warp.admin");
        let rewritten = hook.rewrite(&packet, &admin).unwrap();
        assert_eq!(rewritten.command_data["warp"].overloads.len(), 1);
    }

    #[test]
    fn each_target_gets_its_own_view() {
        let (map, store) = setup();
        let slot = HookSlot::new();
        let hook = slot
            .register("t", Arc::clone(&map), store, HookSettings::default())
            .unwrap();
        let packet = AvailableCommandsPacket::from_commands(&map);

        let admin = PermissionView::new("admin").grant("warp.admin");
        let guest = PermissionView::new("guest");
        let mut gone = PermissionView::new("gone");
        gone.disconnect();

        let results = hook.rewrite_for_targets(&packet, &[&admin, &gone, &guest]);
        assert_eq!(results.len(), 3);

        let admin_view = results[0].as_ref().unwrap();
        assert_eq!(admin_view.command_data["warp"].overloads.len(), 3);
        assert!(matches!(results[1], Err(OverloadError::InvalidRecipient { .. })));
        let guest_view = results[2].as_ref().unwrap();
        assert_eq!(guest_view.command_data["warp"].overloads.len(), 2);
    }
}
