// ABOUTME: Argument list assembly for each container CLI subcommand.
// ABOUTME: Pure functions so command lines can be checked without spawning.

use super::error::{AmbiguousImageSnafu, ClientError};
use snafu::ensure;

/// Registry host that needs no prefix on image names.
pub const DEFAULT_REGISTRY_HOST: &str = "docker.io";

/// Build manifest used when none is configured.
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// `build -f <dockerfile> -t <image> <extra..> .`
pub fn build_args(dockerfile: &str, image: &str, extra: &[String]) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "-f".to_string(),
        dockerfile.to_string(),
        "-t".to_string(),
        image.to_string(),
    ];
    args.extend_from_slice(extra);
    args.push(".".to_string());
    args
}

/// `run [-v <vol>].. [-e <env>].. <extra..> <image> <command..>`
pub fn run_args(
    image: &str,
    command: &[String],
    volumes: &[String],
    env: &[String],
    extra: &[String],
) -> Vec<String> {
    let mut args = vec!["run".to_string()];
    for volume in volumes {
        args.push("-v".to_string());
        args.push(volume.clone());
    }
    for var in env {
        args.push("-e".to_string());
        args.push(var.clone());
    }
    args.extend_from_slice(extra);
    args.push(image.to_string());
    args.extend_from_slice(command);
    args
}

/// Qualify `image` with `registry_host` unless it is the default registry.
pub fn registry_image(registry_host: &str, image: &str) -> String {
    if registry_host == DEFAULT_REGISTRY_HOST {
        image.to_string()
    } else {
        format!("{registry_host}/{image}")
    }
}

/// Interpret `images -q` output: empty when nothing matched, an error when
/// more than one image did.
pub fn parse_image_ids(output: &str, image: &str) -> Result<String, ClientError> {
    // Blank lines are not counted, so "id\n\n" resolves to `id`.
    let ids: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    ensure!(
        ids.len() <= 1,
        AmbiguousImageSnafu {
            image,
            count: ids.len()
        }
    );
    Ok(ids.first().map(|id| id.to_string()).unwrap_or_default())
}
