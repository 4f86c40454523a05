//! Command dispatch

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{MountService, MountedScene};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::TreeDisplay;
use crate::infrastructure::traits::RealFileSystem;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Mount { manifest, strict }) => {
            let strict = *strict || settings.strict;
            _mount(&mount_service(settings), manifest, strict)
        }
        Some(Commands::Tree { manifest, objects }) => {
            _tree(&mount_service(settings), manifest, *objects)
        }
        Some(Commands::Config { command }) => _config(command, &settings, cli.config.as_deref()),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

fn mount_service(settings: Settings) -> MountService {
    MountService::new(Arc::new(RealFileSystem), Arc::new(settings))
}

#[instrument(skip(service))]
fn _mount(service: &MountService, manifest: &Path, strict: bool) -> CliResult<()> {
    let mounted = service.mount_file(manifest)?;
    print_report(&mounted);

    if strict && !mounted.is_clean() {
        let skipped = mounted.report.skipped().count();
        return Err(CliError::Unclean(format!(
            "{} unattached, {} rejected",
            skipped,
            mounted.rejected.len()
        )));
    }
    Ok(())
}

fn print_report(mounted: &MountedScene) {
    output::header(&format!(
        "Mounted {} of {} nodes under {}",
        mounted.report.attached().count(),
        mounted.report.len(),
        mounted.builder.root_id()
    ));
    for entry in &mounted.report.entries {
        if entry.resolution.is_attached() {
            output::success_detail(&format!("{}: {}", entry.id, entry.resolution));
        } else {
            output::failure(&format!("{}: {}", entry.id, entry.resolution));
        }
    }
    for id in &mounted.rejected {
        output::warning(&format!("\"{}\" already processed, declaration ignored", id));
    }
}

#[instrument(skip(service))]
fn _tree(service: &MountService, manifest: &Path, objects: bool) -> CliResult<()> {
    let mounted = service.mount_file(manifest)?;
    let tree = if objects {
        mounted.scene.to_tree_string()
    } else {
        mounted.builder.arena().to_tree_string()
    };
    output::info(&tree);

    let orphans: Vec<_> = mounted.report.skipped().map(|e| e.id.as_str()).collect();
    if !orphans.is_empty() {
        output::warning(&format!("not attached: {}", orphans.join(", ")));
    }
    Ok(())
}

fn _config(command: &ConfigCommands, settings: &Settings, explicit: Option<&Path>) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: <no config directory>"),
            }
            if let Some(path) = explicit {
                output::info(&format!("file:   {}", path.display()));
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
