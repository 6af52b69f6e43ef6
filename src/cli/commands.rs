//! Command dispatch and handlers

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::Classification;
use crate::cli::args::{ClassifyArgs, Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{RenderOptions, TreeNodeConvert};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the parsed command line, returning the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("read the current directory", e))?,
    };

    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(exitcode::OK)
        }
        Some(command) => {
            let settings = Settings::load(Some(&project_dir))?;
            let container = ServiceContainer::new(settings);
            match command {
                Commands::Tree { input, data } => cmd_tree(&container, input, *data),
                Commands::Leaves { input } => cmd_leaves(&container, input),
                Commands::Flatten { input } => cmd_flatten(&container, input),
                Commands::Config { command } => cmd_config(&container, command, &project_dir),
                Commands::Completion { .. } => Ok(exitcode::OK),
            }
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(exitcode::OK)
        }
    }
}

/// Resolve the rule set and run the classification, reporting skipped records.
fn classify(container: &ServiceContainer, input: &ClassifyArgs) -> CliResult<Option<Classification>> {
    let rules: PathBuf = input
        .rules
        .clone()
        .or_else(|| container.settings.rules_file.clone())
        .ok_or_else(|| {
            CliError::Usage("no rule set: pass --rules or set rules_file in config".to_string())
        })?;
    debug!("classify: rules={}, records={}", rules.display(), input.records.display());

    let result = container.classification.classify(
        &rules,
        &input.records,
        &container.settings.root_name,
    )?;

    match &result {
        Some(c) => output::skipped(&c.skipped),
        None => output::warning("nothing to classify: empty rule set or record file"),
    }
    Ok(result)
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, input: &ClassifyArgs, data: bool) -> CliResult<i32> {
    let Some(classification) = classify(container, input)? else {
        return Ok(exitcode::EMPTY);
    };
    let options = RenderOptions {
        record_count: container.settings.record_count,
        show_data: data || container.settings.show_data,
    };
    output::info(&classification.tree.to_tree_string_with(options));
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn cmd_leaves(container: &ServiceContainer, input: &ClassifyArgs) -> CliResult<i32> {
    let Some(classification) = classify(container, input)? else {
        return Ok(exitcode::EMPTY);
    };
    let tree = &classification.tree;
    for leaf in tree.leaf_nodes(tree.root()) {
        let count = tree.get_node(leaf).map(|n| n.data().len()).unwrap_or(0);
        output::info(&format!(
            "{} ({} records)",
            tree.path_names(leaf).iter().join("/"),
            count
        ));
    }
    Ok(exitcode::OK)
}

#[instrument(skip(container))]
fn cmd_flatten(container: &ServiceContainer, input: &ClassifyArgs) -> CliResult<i32> {
    let Some(classification) = classify(container, input)? else {
        return Ok(exitcode::EMPTY);
    };
    let tree = &classification.tree;
    for idx in tree.flatten_list(tree.root()) {
        let Some(node) = tree.get_node(idx) else {
            continue;
        };
        let vertical = tree.vertical_index(idx);
        output::info(&format!(
            "{}{} [v={}, h={}] ({} records)",
            "  ".repeat(vertical.saturating_sub(1)),
            node.label(),
            vertical,
            tree.horizontal_index(idx),
            node.data().len()
        ));
    }
    Ok(exitcode::OK)
}

fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: &Path,
) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global: {} ({})",
                    path.display(),
                    existence(container, &path)
                )),
                None => output::detail("global: unavailable (no home directory)"),
            }
            let local = local_config_path(project_dir);
            output::detail(&format!(
                "local:  {} ({})",
                local.display(),
                existence(container, &local)
            ));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(project_dir)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(exitcode::OK)
}

fn existence(container: &ServiceContainer, path: &Path) -> &'static str {
    if container.fs.is_file(path) {
        "exists"
    } else {
        "not found"
    }
}
