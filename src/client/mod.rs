// ABOUTME: Client facade over the container CLI.
// ABOUTME: One method per operation; build/run are supervised, the rest are one-shot.

mod args;
mod error;

pub use args::{
    DEFAULT_DOCKERFILE, DEFAULT_REGISTRY_HOST, build_args, parse_image_ids, registry_image,
    run_args,
};
pub use error::{ClientError, ClientErrorKind};

use crate::config::Settings;
use crate::probe::{CliProbe, LivenessProbe};
use crate::process::{
    CommandResult, DEFAULT_PROBE_INTERVAL, DaemonLossPolicy, Invocation, ProcessError, Runner,
    capture,
};
use crate::runtime::{detect_parent_container, locate_executable};
use error::{CommandSnafu, ImageNotFoundSnafu};
use snafu::{ResultExt, ensure};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Client configuration. Callers may change `show_output` or
/// `registry_host` between calls, but not while a call is in flight.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path to the container CLI.
    pub executable: PathBuf,
    /// Build manifest passed to `build -f`.
    pub dockerfile: String,
    /// Registry prefixed onto pushed and pulled images unless `docker.io`.
    pub registry_host: String,
    /// ID of the container this process runs in, if any.
    pub parent_container_id: Option<String>,
    pub in_container: bool,
    /// Echo build/run output live to stdout.
    pub show_output: bool,
    pub probe_interval: Duration,
    pub on_daemon_loss: DaemonLossPolicy,
}

impl ClientConfig {
    /// Defaults for everything but the executable; not inside a container.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            dockerfile: DEFAULT_DOCKERFILE.to_string(),
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
            parent_container_id: None,
            in_container: false,
            show_output: false,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            on_daemon_loss: DaemonLossPolicy::default(),
        }
    }
}

/// Drives the container CLI on behalf of the caller.
pub struct DockerClient {
    config: ClientConfig,
    probe: Option<Arc<dyn LivenessProbe>>,
}

impl DockerClient {
    /// Locate `docker` on PATH and detect the parent container.
    pub fn new() -> Result<Self, ClientError> {
        Self::from_settings(&Settings::default())
    }

    /// Build a client from file settings, locating the executable on PATH
    /// unless one is configured.
    ///
    /// Failing to read cgroup metadata only means we are not in a container.
    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let executable = match settings.executable {
            Some(ref path) => path.clone(),
            None => locate_executable(settings.runtime)?,
        };

        let parent_container_id = match detect_parent_container() {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!("container detection unavailable: {}", e);
                None
            }
        };

        let config = ClientConfig {
            in_container: parent_container_id.is_some(),
            parent_container_id,
            dockerfile: settings.dockerfile.clone(),
            registry_host: settings.registry_host.clone(),
            show_output: settings.show_output,
            probe_interval: settings.probe_interval,
            on_daemon_loss: settings.on_daemon_loss,
            ..ClientConfig::new(executable)
        };
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            probe: None,
        }
    }

    /// Use a custom liveness probe instead of `<executable> info`.
    pub fn with_probe(mut self, probe: Arc<dyn LivenessProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    fn liveness_probe(&self) -> Arc<dyn LivenessProbe> {
        match self.probe {
            Some(ref probe) => Arc::clone(probe),
            None => Arc::new(CliProbe::new(&self.config.executable)),
        }
    }

    fn runner(&self) -> Runner {
        Runner::new(self.liveness_probe())
            .show_output(self.config.show_output)
            .probe_interval(self.config.probe_interval)
            .on_daemon_loss(self.config.on_daemon_loss)
    }

    fn invocation(&self, args: Vec<String>) -> Invocation {
        Invocation::new(&self.config.executable, args)
    }

    /// Build `image` from `context_dir` using the configured manifest.
    pub async fn build(
        &self,
        image: &str,
        context_dir: impl AsRef<Path>,
        extra: &[String],
    ) -> CommandResult {
        let args = build_args(&self.config.dockerfile, image, extra);
        let invocation = self.invocation(args).workdir(context_dir.as_ref());
        self.runner().run(&invocation).await
    }

    /// Run `image` from the current working directory.
    pub async fn run(
        &self,
        image: &str,
        command: &[String],
        volumes: &[String],
        env: &[String],
        extra: &[String],
    ) -> CommandResult {
        let invocation = self.invocation(run_args(image, command, volumes, env, extra));
        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                return CommandResult::failed(
                    invocation.command_string(),
                    String::new(),
                    ProcessError::WorkingDirectory(e),
                );
            }
        };
        self.runner().run(&invocation.workdir(cwd)).await
    }

    /// Push `image`, qualified with the configured registry.
    pub async fn push(&self, image: &str) -> CommandResult {
        let image = registry_image(&self.config.registry_host, image);
        capture(&self.invocation(vec!["push".to_string(), image])).await
    }

    /// Pull `image`, qualified with the configured registry.
    pub async fn pull(&self, image: &str) -> CommandResult {
        let image = registry_image(&self.config.registry_host, image);
        capture(&self.invocation(vec!["pull".to_string(), image])).await
    }

    /// Resolve `image` to a single image ID; empty when nothing matches.
    pub async fn image_id(&self, image: &str) -> Result<String, ClientError> {
        let invocation = self.invocation(vec![
            "images".to_string(),
            "-q".to_string(),
            image.to_string(),
        ]);
        let result = capture(&invocation).await;
        let command = result.command.clone();
        let output = result.into_result().context(CommandSnafu { command })?;
        parse_image_ids(&output, image)
    }

    /// Tag the single image matching `image` as `new_tag`.
    ///
    /// Nothing is tagged unless `image` resolves to exactly one ID.
    pub async fn tag(&self, image: &str, new_tag: &str) -> Result<(), ClientError> {
        let id = self.image_id(image).await?;
        ensure!(!id.is_empty(), ImageNotFoundSnafu { image });

        let invocation = self.invocation(vec![
            "tag".to_string(),
            "-f".to_string(),
            id,
            new_tag.to_string(),
        ]);
        let result = capture(&invocation).await;
        let command = result.command.clone();
        result.into_result().context(CommandSnafu { command })?;
        Ok(())
    }

    /// Whether the daemon answers a liveness probe right now.
    pub async fn is_connected(&self) -> bool {
        self.liveness_probe().is_connected().await
    }

    /// Client version lookup is not implemented and always returns `None`.
    pub fn version(&self) -> Option<String> {
        None
    }
}
