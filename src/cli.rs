// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and global setting overrides.

use clap::{Parser, Subcommand};
use dockwrap::output::OutputMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockwrap")]
#[command(about = "Supervised Docker/Podman CLI client with live output and daemon watchdog")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Print only final results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: dockwrap.yml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Container CLI executable (default: looked up on PATH)
    #[arg(long, global = true)]
    pub executable: Option<PathBuf>,

    /// Look up `podman` instead of `docker`
    #[arg(long, global = true)]
    pub podman: bool,

    /// Registry host prefixed onto pushed and pulled images
    #[arg(long, global = true)]
    pub registry: Option<String>,

    /// Build manifest filename
    #[arg(long, global = true)]
    pub dockerfile: Option<String>,

    /// Echo build/run output live
    #[arg(long, global = true)]
    pub show_output: bool,

    /// Kill the command if the daemon becomes unreachable
    #[arg(long, global = true)]
    pub kill_on_daemon_loss: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an image from a context directory
    Build {
        /// Image name and tag
        image: String,

        /// Build context directory
        #[arg(short = 'C', long, default_value = ".")]
        context: PathBuf,

        /// Extra arguments passed to `build` (after `--`)
        #[arg(last = true)]
        extra: Vec<String>,
    },

    /// Run an image from the current directory
    Run {
        /// Image to run
        image: String,

        /// Volume mount (repeatable)
        #[arg(short = 'v', long = "volume")]
        volumes: Vec<String>,

        /// Environment variable KEY=VALUE (repeatable)
        #[arg(short = 'e', long = "env")]
        env: Vec<String>,

        /// Extra option placed before the image name (repeatable)
        #[arg(long = "opt", allow_hyphen_values = true)]
        extra: Vec<String>,

        /// Command to run in the container (after `--`)
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Push an image to the configured registry
    Push { image: String },

    /// Pull an image from the configured registry
    Pull { image: String },

    /// Tag the single image matching IMAGE as NEW_TAG
    Tag { image: String, new_tag: String },

    /// Print the ID of the image matching IMAGE
    ImageId { image: String },

    /// Check whether the container daemon is reachable
    Ping,

    /// Show the detected executable and parent container
    Env,
}
