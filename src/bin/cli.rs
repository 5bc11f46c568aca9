// CLI binary: panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use command_overloads::hook::{AvailableCommandsPacket, HookSlot};
use command_overloads::model::{arg, CommandParameter, Overload};
use command_overloads::recipient::PermissionView;
use command_overloads::registry::{CommandMap, SoftEnumStore};
use command_overloads::settings::{self, HookSettings};
use command_overloads::{expand_overloads, tree, OverloadError};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "overloads-cli", about = "Inspect per-recipient command overloads", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Command tree document (JSON)
    #[arg(long, global = true)]
    tree: Option<PathBuf>,

    /// Hook settings file (JSON). Defaults apply when absent.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand one command for a recipient
    Expand {
        /// Command name or alias
        command: String,
        /// Permission granted to the recipient (repeatable)
        #[arg(long = "grant")]
        grants: Vec<String>,
        /// Recipient name used in logs
        #[arg(long, default_value = "cli")]
        recipient: String,
    },
    /// Rewrite a full available-commands packet for a recipient
    Packet {
        #[arg(long = "grant")]
        grants: Vec<String>,
        #[arg(long, default_value = "cli")]
        recipient: String,
    },
    /// List registered commands with usage
    Commands,
    /// Print the JSON Schema of a document format
    Schema {
        #[arg(value_enum, default_value = "tree")]
        document: SchemaDocument,
    },
    /// Time repeated expansion of one command
    Bench {
        command: String,
        #[arg(long = "grant")]
        grants: Vec<String>,
        /// Number of iterations
        #[arg(long, default_value = "10000", value_parser = clap::value_parser!(u32).range(1..))]
        iterations: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaDocument {
    /// Command tree documents passed with --tree
    Tree,
    /// Hook settings files passed with --settings
    Settings,
}

// ── State initialization ─────────────────────────────────────────

struct Loaded {
    commands: Arc<CommandMap>,
    soft_enums: Arc<SoftEnumStore>,
    settings: HookSettings,
}

fn load(cli: &Cli) -> Result<Loaded, OverloadError> {
    let settings = match &cli.settings {
        Some(path) => settings::load_settings(path)?,
        None => HookSettings::default(),
    };
    let commands = Arc::new(CommandMap::new());
    let soft_enums = Arc::new(SoftEnumStore::new());
    let path = cli.tree.as_ref().ok_or_else(|| OverloadError::Validation {
        message: "--tree <file> is required for this command".to_string(),
    })?;
    tree::load_tree(path)?.install(&commands, &soft_enums)?;
    Ok(Loaded {
        commands,
        soft_enums,
        settings,
    })
}

// ── Output formatting ────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn format_parameter(p: &CommandParameter) -> String {
    let (open, close) = if p.optional { ('[', ']') } else { ('<', '>') };
    let kind = match &p.enum_data {
        Some(e) if p.has_flag(arg::FLAG_SOFT_ENUM) => format!("soft enum {}", e.name),
        Some(e) if p.has_flag(arg::FLAG_ENUM) => e.values.join("|"),
        _ => format!("#{}", p.type_id()),
    };
    format!("{open}{}: {kind}{close}", p.name)
}

fn format_overload(overload: &Overload) -> String {
    overload
        .iter()
        .map(format_parameter)
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_overloads(name: &str, overloads: &[Overload]) {
    println!("/{name} ({} overloads)", overloads.len());
    for overload in overloads {
        println!("  /{name} {}", format_overload(overload));
    }
}

// ── Subcommands ─────────────────────────────────────────────────

fn run(cli: &Cli) -> Result<(), OverloadError> {
    match &cli.command {
        Commands::Schema { document } => match document {
            SchemaDocument::Tree => print_json(&tree::tree_schema()),
            SchemaDocument::Settings => print_json(&settings::settings_schema()),
        },
        Commands::Commands => {
            let loaded = load(cli)?;
            for command in loaded.commands.commands() {
                println!("/{} - {}", command.name(), command.description());
                for usage in command.argument_list().usage() {
                    println!("    /{} {usage}", command.name());
                }
                for sub in command_overloads::overloads::unique_sub_commands(command.sub_commands()) {
                    let usages = sub.argument_list().usage();
                    if usages.is_empty() {
                        println!("    /{} {}", command.name(), sub.name());
                    }
                    for usage in usages {
                        println!("    /{} {} {usage}", command.name(), sub.name());
                    }
                }
            }
        }
        Commands::Expand {
            command,
            grants,
            recipient,
        } => {
            let loaded = load(cli)?;
            let definition = loaded
                .commands
                .get(command)
                .ok_or_else(|| OverloadError::CommandNotFound {
                    name: command.clone(),
                })?;
            let view = PermissionView::new(recipient).with_permissions(grants.iter().cloned());
            let overloads = expand_overloads(&definition, &view)?;
            if cli.json {
                print_json(&overloads);
            } else {
                print_overloads(definition.name(), &overloads);
            }
        }
        Commands::Packet { grants, recipient } => {
            let loaded = load(cli)?;
            let slot = HookSlot::new();
            let hook = slot.register(
                "overloads-cli",
                Arc::clone(&loaded.commands),
                loaded.soft_enums,
                loaded.settings,
            )?;
            let packet = AvailableCommandsPacket::from_commands(&loaded.commands);
            let view = PermissionView::new(recipient).with_permissions(grants.iter().cloned());
            let rewritten = hook.rewrite(&packet, &view)?;
            if cli.json {
                print_json(&rewritten);
            } else {
                for (name, data) in &rewritten.command_data {
                    print_overloads(name, &data.overloads);
                }
                for soft_enum in &rewritten.soft_enums {
                    println!("soft enum {}: {}", soft_enum.name, soft_enum.values.join(", "));
                }
            }
        }
        Commands::Bench {
            command,
            grants,
            iterations,
        } => {
            let loaded = load(cli)?;
            let definition = loaded
                .commands
                .get(command)
                .ok_or_else(|| OverloadError::CommandNotFound {
                    name: command.clone(),
                })?;
            let view = PermissionView::new("bench").with_permissions(grants.iter().cloned());
            run_bench(&definition, &view, *iterations)?;
        }
    }
    Ok(())
}

// ── Bench mode ──────────────────────────────────────────────────

fn run_bench(
    command: &command_overloads::model::CommandDefinition,
    view: &PermissionView,
    iterations: u32,
) -> Result<(), OverloadError> {
    use std::time::Instant;

    // Warmup
    let overloads = expand_overloads(command, view)?;
    eprintln!("/{}: {} overloads", command.name(), overloads.len());

    let mut times = Vec::with_capacity(iterations as usize);
    for _ in 0..iterations {
        let start = Instant::now();
        let result = expand_overloads(command, view)?;
        times.push(start.elapsed());
        std::hint::black_box(&result);
    }

    times.sort();
    let total: std::time::Duration = times.iter().sum();
    let avg = total / iterations;
    let median = times[times.len() / 2];
    let min = times[0];
    let max = times[times.len() - 1];

    eprintln!("Results ({iterations} iterations):");
    eprintln!("  avg:    {avg:>8.2?}");
    eprintln!("  median: {median:>8.2?}");
    eprintln!("  min:    {min:>8.2?}");
    eprintln!("  max:    {max:>8.2?}");
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
