use crate::CasType;
use clap::Parser;
use std::{
    net::SocketAddr,
    path::PathBuf,
};

/// Exposes storage volume controller statistics as Prometheus metrics.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Additional YAML configuration file, layered over the user configuration.
    #[clap(long, short = 'f', value_name = "FILE", env = "VOLUME_EXPORTER_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Address the metrics endpoint listens on.
    #[clap(long, short = 'a', value_name = "ADDRESS", env = "VOLUME_EXPORTER_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,

    /// Path under which metrics are exposed.
    #[clap(long, short = 'm', value_name = "PATH", env = "VOLUME_EXPORTER_METRICS_PATH")]
    pub metrics_path: Option<String>,

    /// Controller to monitor. Replaces the configured volume list with this single volume.
    #[clap(long, short = 'c', value_name = "URL", env = "VOLUME_EXPORTER_CONTROLLER_URL")]
    pub controller_url: Option<url::Url>,

    /// Storage engine of the controller given with `--controller-url`.
    #[clap(
        long,
        short = 't',
        value_name = "CAS_TYPE",
        env = "VOLUME_EXPORTER_CAS_TYPE",
        requires = "controller_url"
    )]
    pub cas_type: Option<CasType>,

    /// Prefix of every exported metric name.
    #[clap(long, value_name = "NAMESPACE", env = "VOLUME_EXPORTER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Timeout of a single stats request, e.g. `5s` or `1500ms`.
    #[clap(long, value_name = "DURATION", env = "VOLUME_EXPORTER_FETCH_TIMEOUT")]
    pub fetch_timeout: Option<String>,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[clap(long, short = 'v', action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(listen_address) = &self.listen_address {
                cache.insert("listen_address".to_string(), listen_address.to_string().into());
            }
            if let Some(metrics_path) = &self.metrics_path {
                cache.insert("metrics_path".to_string(), metrics_path.clone().into());
            }
            if let Some(namespace) = &self.namespace {
                cache.insert("namespace".to_string(), namespace.clone().into());
            }
            if let Some(fetch_timeout) = &self.fetch_timeout {
                cache.insert("fetch_timeout".to_string(), fetch_timeout.clone().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
Authors: {author}

Config directory: {config_dir_path}"
    )
}
