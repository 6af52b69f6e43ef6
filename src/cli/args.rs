//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Hierarchical classification trees: route flat records through rule chains
#[derive(Parser, Debug)]
#[command(name = "classtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .classtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Input files shared by the classification commands.
#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Record file (.json array of objects or .toml [[records]])
    #[arg(value_hint = ValueHint::FilePath)]
    pub records: PathBuf,

    /// Rule-set file (default: rules_file from config)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub rules: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the classification tree
    Tree {
        #[command(flatten)]
        input: ClassifyArgs,
        /// List records beneath their nodes
        #[arg(long)]
        data: bool,
    },

    /// List leaf nodes with their root paths
    Leaves {
        #[command(flatten)]
        input: ClassifyArgs,
    },

    /// List all nodes in depth-first order with their positions
    Flatten {
        #[command(flatten)]
        input: ClassifyArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
