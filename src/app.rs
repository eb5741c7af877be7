use color_eyre::Result;
use eyre::Context as _;
use volume_exporter_collector::{
    MetricsRegistry,
    VolumeCollector,
};
use volume_exporter_config::{
    Args,
    Config,
};

pub struct App {
    config: Config,
    registry: MetricsRegistry,
}

impl App {
    /// Loads the configuration and registers one collector per configured volume.
    ///
    /// Collectors hold a blocking HTTP client, so this must run before the async runtime starts.
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::new(args)?;
        config.validate()?;

        let registry = MetricsRegistry::new();
        for volume in &config.volumes {
            let collector = VolumeCollector::new(volume, &config.namespace, config.fetch_timeout)
                .with_context(|| format!("Failed to set up collector for {}", volume.controller_url))?;
            registry
                .register(&collector)
                .with_context(|| format!("Failed to register collector for {}", volume.controller_url))?;
        }

        Ok(Self { config, registry })
    }

    pub fn run(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to build tokio runtime")?;

        let Self { config, registry } = self;
        let router = volume_exporter_http::create_router(registry.clone(), &config.metrics_path);
        info!(
            volumes = registry.len(),
            metrics_path = %config.metrics_path,
            "Starting volume stats exporter"
        );
        let served = runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(config.listen_address)
                .await
                .with_context(|| format!("Failed to bind {}", config.listen_address))?;
            volume_exporter_http::serve(listener, router, volume_exporter_http::shutdown_signal())
                .await
                .context("Metrics server failed")
        });

        let drained = registry.drain();
        info!(drained, "Unregistered volume collectors");
        served
    }
}
