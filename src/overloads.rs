//! Flattening of a command tree into the overload list advertised to one
//! recipient.
//!
//! Sub-command overloads come first, each prefixed with a parameter naming
//! the sub-command, followed by the command's own overloads. Clients show
//! completions in the order received, so the order is part of the contract.

use tracing::{debug, trace};

use crate::error::OverloadError;
use crate::model::{ArgumentList, CommandDefinition, CommandParameter, Overload};
use crate::recipient::Recipient;

/// One overload per alternative index. Alternative `i` takes the `i`-th
/// converter at each position in ascending order; positions with fewer
/// alternatives are left out of that overload rather than padded.
///
/// An empty argument list yields no overloads at all.
pub fn generate_overload_list(argument_list: &ArgumentList) -> Vec<Overload> {
    let mut overloads = vec![Overload::default(); argument_list.max_alternatives()];
    for (_, converters) in argument_list.positions() {
        for (overload, converter) in overloads.iter_mut().zip(converters) {
            overload.push(converter.network_parameter());
        }
    }
    overloads
}

/// Drop structural duplicates, keeping the first occurrence. A sub-command
/// registered under several aliases shows up once.
pub fn unique_sub_commands<'a, I>(sub_commands: I) -> Vec<&'a CommandDefinition>
where
    I: IntoIterator<Item = &'a CommandDefinition>,
{
    let mut unique: Vec<&CommandDefinition> = Vec::new();
    for sub_command in sub_commands {
        if !unique.contains(&sub_command) {
            unique.push(sub_command);
        }
    }
    unique
}

/// The full ordered overload list for `command` as seen by `recipient`.
///
/// Sub-commands the recipient may not use are skipped silently. An error
/// from the recipient's permission check aborts the whole expansion.
pub fn expand_overloads(
    command: &CommandDefinition,
    recipient: &dyn Recipient,
) -> Result<Vec<Overload>, OverloadError> {
    let mut overloads = Vec::new();

    for sub_command in unique_sub_commands(command.sub_commands()) {
        if !sub_command.test_permission_silent(recipient)? {
            trace!(
                command = command.name(),
                sub_command = sub_command.name(),
                recipient = recipient.id(),
                "sub-command hidden from recipient"
            );
            continue;
        }

        let selector = CommandParameter::sub_command(sub_command.name());
        let own = generate_overload_list(sub_command.argument_list());
        if own.is_empty() {
            overloads.push(Overload::new(vec![selector]));
        } else {
            overloads.extend(own.into_iter().map(|o| o.with_prefix(selector.clone())));
        }
    }

    overloads.extend(generate_overload_list(command.argument_list()));

    debug!(
        command = command.name(),
        recipient = recipient.id(),
        overloads = overloads.len(),
        "expanded overloads"
    );
    Ok(overloads)
}
