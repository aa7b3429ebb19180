use std::path::PathBuf;

use anyhow::{Context, Result};
use config::Environment;
use tracing::info;

use crate::cli::Args;
use crate::models::common::Config;

pub const ENV_PREFIX: &str = "SKIPTRACE";

fn path_string(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}

pub fn load_config(args: &Args) -> Result<Config> {
    build_config(args, Environment::with_prefix(ENV_PREFIX))
}

/// Layers built-in defaults, the optional config file, `env` and finally command
/// line flags, later sources winning.
pub fn build_config(args: &Args, env: Environment) -> Result<Config> {
    info!("Config path: {}", args.config.to_string_lossy());

    let mut builder = config::Config::builder()
        .add_source(config::File::from(args.config.as_path()).required(false))
        .add_source(env)
        .set_override_option("rpc_url", args.rpc_url.clone())?
        .set_override_option("network", args.network.clone())?
        .set_override_option("stage", args.stage.map(|s| s.as_str()))?
        .set_override_option("txs_dir", path_string(&args.txs_dir))?
        .set_override_option("traces_dir", path_string(&args.traces_dir))?;
    if args.skip_malformed {
        builder = builder.set_override("skip_malformed", true)?;
    }

    let config: Config = builder
        .build()
        .context("failed to read config sources")?
        .try_deserialize()
        .context("failed to parse config")?;

    Ok(config)
}

pub fn strip_html(error: &str) -> String {
    // If the error contains HTML tags, extract just the text content
    if error.contains("<!doctype html>") || error.contains("<html>") {
        error
            .lines()
            .map(|line| line.trim())
            .find(|line| {
                !line.starts_with('<')
                    && !line.ends_with('>')
                    && !line.is_empty()
                    && *line != "html"
                    && *line != "body"
            })
            .unwrap_or(error)
            .to_string()
    } else {
        error.to_string()
    }
}
