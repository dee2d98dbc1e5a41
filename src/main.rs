// ABOUTME: Entry point for the dockwrap CLI application.
// ABOUTME: Parses arguments, resolves settings, and dispatches to the client facade.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use dockwrap::client::{ClientError, DockerClient};
use dockwrap::config::Settings;
use dockwrap::error::{Error, Result};
use dockwrap::output::Output;
use dockwrap::process::{CommandResult, DaemonLossPolicy};
use dockwrap::runtime::{RuntimeType, detect_parent_container, locate_executable};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

/// File settings with command-line overrides applied.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match cli.config {
        Some(ref path) => Settings::load(path)?,
        None => Settings::discover(&env::current_dir()?)?,
    };

    if cli.podman {
        settings.runtime = RuntimeType::Podman;
    }
    if let Some(ref executable) = cli.executable {
        settings.executable = Some(executable.clone());
    }
    if let Some(ref registry) = cli.registry {
        settings.registry_host = registry.clone();
    }
    if let Some(ref dockerfile) = cli.dockerfile {
        settings.dockerfile = dockerfile.clone();
    }
    if cli.show_output {
        settings.show_output = true;
    }
    if cli.kill_on_daemon_loss {
        settings.on_daemon_loss = DaemonLossPolicy::Kill;
    }

    Ok(settings)
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let settings = resolve_settings(&cli)?;
    let connect = || DockerClient::from_settings(&settings);
    let echoed = settings.show_output;
    output.start_timer();

    match cli.command {
        Commands::Build {
            image,
            context,
            extra,
        } => {
            let client = connect()?;
            output.progress(&format!("  → Building {image} in {}...", context.display()));
            finish(output, client.build(&image, &context, &extra).await, echoed)?;
            output.success(&format!("Built {image}"));
        }
        Commands::Run {
            image,
            volumes,
            env,
            extra,
            command,
        } => {
            let client = connect()?;
            output.progress(&format!("  → Running {image}..."));
            let result = client.run(&image, &command, &volumes, &env, &extra).await;
            finish(output, result, echoed)?;
            output.success(&format!("{image} exited successfully"));
        }
        Commands::Push { image } => {
            let client = connect()?;
            output.progress(&format!("  → Pushing {image}..."));
            finish(output, client.push(&image).await, false)?;
            output.success(&format!("Pushed {image}"));
        }
        Commands::Pull { image } => {
            let client = connect()?;
            output.progress(&format!("  → Pulling {image}..."));
            finish(output, client.pull(&image).await, false)?;
            output.success(&format!("Pulled {image}"));
        }
        Commands::Tag { image, new_tag } => {
            connect()?.tag(&image, &new_tag).await?;
            output.success(&format!("Tagged {image} as {new_tag}"));
        }
        Commands::ImageId { image } => {
            let id = connect()?.image_id(&image).await?;
            if id.is_empty() {
                return Err(ClientError::ImageNotFound { image }.into());
            }
            output.success(&id);
        }
        Commands::Ping => {
            if !connect()?.is_connected().await {
                return Err(Error::DaemonUnreachable);
            }
            output.success("container daemon is reachable");
        }
        Commands::Env => show_env(&settings, output)?,
    }

    Ok(())
}

/// Report captured output and turn a failed result into an error.
fn finish(output: &Output, result: CommandResult, echoed: bool) -> Result<()> {
    if !echoed {
        output.command_output(&result.command, &result.output);
    }
    let command = result.command.clone();
    result
        .into_result()
        .map(|_| ())
        .map_err(|source| Error::Command { command, source })
}

fn show_env(settings: &Settings, output: &Output) -> Result<()> {
    let executable = match settings.executable {
        Some(ref path) => path.clone(),
        None => locate_executable(settings.runtime).map_err(ClientError::from)?,
    };
    output.success(&format!("executable: {}", executable.display()));

    match detect_parent_container() {
        Ok(Some(id)) => output.success(&format!("parent container: {id}")),
        Ok(None) => output.success("parent container: none"),
        Err(e) => output.warning(&format!("container detection failed: {e}")),
    }
    Ok(())
}
