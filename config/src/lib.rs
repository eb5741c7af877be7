#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod volume_config;

use app_config::AppConfig;
pub use app_config::get_config_dir;
pub use args::Args;
use color_eyre::Result;
use eyre::{
    eyre,
    Context as _,
};
use serde::{
    Deserialize,
    Deserializer,
};
use std::{
    net::SocketAddr,
    path::Path,
    time::Duration,
};
pub use volume_config::{
    CasType,
    CasTypeIter,
    VolumeConfig,
};

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");
/// Served by the exporter itself next to the metrics endpoint.
const RESERVED_PATHS: [&str; 2] = ["/", "/healthz"];

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    app_config: AppConfig,
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    pub namespace: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub fetch_timeout: Duration,
    #[serde(default)]
    pub volumes: Vec<VolumeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Layers the built-in defaults, the user's `config.yaml`, the file passed with `--config`
    /// and finally the remaining command-line arguments.
    pub fn new(args: Args) -> Result<Self> {
        Self::with_config_dir(args, &get_config_dir())
    }

    fn with_config_dir(args: Args, config_dir: &Path) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("config_dir", config_dir.display().to_string())?
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        let user_config = config::File::from(config_dir.join("config.yaml"))
            .format(config::FileFormat::Yaml)
            .required(false);
        builder = builder.add_source(user_config);

        if let Some(path) = &args.config {
            builder = builder.add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let single_volume = args
            .controller_url
            .clone()
            .map(|url| VolumeConfig::new(url, args.cas_type.unwrap_or_default()));
        builder = builder.add_source(args);

        let mut cfg: Self = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .context("Failed to load configuration")?;
        if let Some(volume) = single_volume {
            cfg.volumes = vec![volume];
        }
        debug!(config_dir = %cfg.app_config.config_dir.display(), volumes = cfg.volumes.len(), "Configuration loaded");

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.volumes.is_empty() {
            return Err(eyre!("config.volumes must be non-empty"));
        }
        if !self.metrics_path.starts_with('/') {
            return Err(eyre!("metrics_path must start with '/', got {:?}", self.metrics_path));
        }
        if RESERVED_PATHS.contains(&self.metrics_path.as_str()) {
            return Err(eyre!("metrics_path {:?} is reserved", self.metrics_path));
        }
        if let Some(c) = self.metrics_path.chars().find(|c| !is_plain_path_char(*c)) {
            return Err(eyre!("metrics_path {:?} contains unsupported character {c:?}", self.metrics_path));
        }
        if self.namespace.trim().is_empty() {
            return Err(eyre!("namespace must not be empty"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(eyre!("fetch_timeout must be greater than zero"));
        }
        self.validate_label_names()
    }

    /// Metrics of all volumes share one family per name, so every volume needs the same label
    /// names.
    fn validate_label_names(&self) -> Result<()> {
        let Some((first, rest)) = self.volumes.split_first() else {
            return Ok(());
        };
        let expected: Vec<&String> = first.labels.keys().collect();
        for volume in rest {
            let names: Vec<&String> = volume.labels.keys().collect();
            if names != expected {
                return Err(eyre!(
                    "Volume {} has labels {names:?} but volume {} has {expected:?}, all volumes need the same label names",
                    volume.controller_url,
                    first.controller_url
                ));
            }
        }
        Ok(())
    }
}

/// Route parameters and wildcards are not allowed in the metrics path.
fn is_plain_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '~')
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    humantime::parse_duration(&value).map_err(serde::de::Error::custom)
}
