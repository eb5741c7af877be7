use crate::{
    collectors::{
        stats_source,
        StatsSource,
    },
    error::{
        CollectError,
        ErrorKind,
        SetupError,
    },
    metrics::{
        normalize,
        MetricsSnapshot,
        GAUGE_DEFS,
    },
};
use prometheus::{
    core::{
        Collector,
        Desc,
    },
    proto::MetricFamily,
    IntCounterVec,
    IntGauge,
    Opts,
};
use std::{
    any::Any,
    collections::{
        BTreeMap,
        HashMap,
    },
    fmt,
    panic::{
        self,
        AssertUnwindSafe,
    },
    sync::Arc,
    time::Duration,
};
use volume_exporter_config::{
    CasType,
    VolumeConfig,
};

/// Result of one run of the fetch, decode and normalize pipeline.
#[derive(Debug)]
pub struct Scrape {
    pub snapshot: MetricsSnapshot,
    /// Set when the snapshot is zero because a stage failed, as opposed to a controller that
    /// reported zeros.
    pub error: Option<CollectError>,
}

/// Prometheus collector for a single volume.
///
/// Every call to [`Collector::collect`] fetches fresh stats from the controller. Nothing from one
/// scrape is kept for the next, so concurrent scrapes of the same collector cannot observe each
/// other's values. A failing scrape reports every gauge as zero. Cloning is cheap and clones
/// share the controller connection and error counters.
#[derive(Clone)]
pub struct VolumeCollector {
    inner: Arc<Inner>,
}

struct Inner {
    id: String,
    source: Box<dyn StatsSource>,
    gauge_opts: Vec<Opts>,
    errors: IntCounterVec,
    descs: Vec<Desc>,
}

impl VolumeCollector {
    pub fn new(volume: &VolumeConfig, namespace: &str, fetch_timeout: Duration) -> Result<Self, SetupError> {
        let source = stats_source(volume.cas_type, &volume.controller_url, fetch_timeout)?;
        Self::with_source(volume.controller_url.to_string(), source, namespace, &volume.labels)
    }

    /// Builds a collector around an already constructed source. `id` names the volume in logs
    /// and in the registry.
    pub fn with_source(
        id: impl Into<String>,
        source: Box<dyn StatsSource>,
        namespace: &str,
        labels: &BTreeMap<String, String>,
    ) -> Result<Self, SetupError> {
        let invalid = |source: prometheus::Error| SetupError::Metrics {
            namespace: namespace.to_string(),
            source,
        };
        let const_labels: HashMap<String, String> = labels.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

        let mut descs = Vec::with_capacity(GAUGE_DEFS.len() + 1);
        let mut gauge_opts = Vec::with_capacity(GAUGE_DEFS.len());
        for (name, help) in GAUGE_DEFS {
            let opts = Opts::new(name, help)
                .namespace(namespace)
                .const_labels(const_labels.clone());
            let gauge = IntGauge::with_opts(opts.clone()).map_err(invalid)?;
            descs.extend(gauge.desc().into_iter().cloned());
            gauge_opts.push(opts);
        }

        let errors = IntCounterVec::new(
            Opts::new(
                "collection_errors_total",
                "Scrapes that reported zero values because collecting stats failed, by failing stage",
            )
            .namespace(namespace)
            .const_labels(const_labels),
            &["kind"],
        )
        .map_err(invalid)?;
        for kind in ErrorKind::ALL {
            errors.with_label_values(&[kind.as_str()]);
        }
        descs.extend(errors.desc().into_iter().cloned());

        Ok(Self {
            inner: Arc::new(Inner {
                id: id.into(),
                source,
                gauge_opts,
                errors,
                descs,
            }),
        })
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn cas_type(&self) -> CasType {
        self.inner.source.cas_type()
    }

    /// Number of failed scrapes of the given kind since the collector was built.
    pub fn error_count(&self, kind: ErrorKind) -> u64 {
        self.inner.errors.with_label_values(&[kind.as_str()]).get()
    }

    /// Runs the pipeline once. Never panics: failures, including panics inside the source, yield
    /// the zero snapshot together with the error.
    #[instrument(level = "trace", skip(self), fields(volume = %self.inner.id))]
    pub fn scrape(&self) -> Scrape {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.inner.run_pipeline()))
            .unwrap_or_else(|payload| Err(CollectError::Panicked(panic_message(payload))));

        match outcome {
            Ok(snapshot) => {
                debug!(volume = %self.inner.id, ?snapshot, "Collected volume stats");
                Scrape { snapshot, error: None }
            }
            Err(error) => {
                let kind = error.kind();
                warn!(volume = %self.inner.id, kind = kind.as_str(), "Reporting zero values: {error}");
                self.inner.errors.with_label_values(&[kind.as_str()]).inc();
                Scrape {
                    snapshot: MetricsSnapshot::default(),
                    error: Some(error),
                }
            }
        }
    }
}

impl Inner {
    fn run_pipeline(&self) -> Result<MetricsSnapshot, CollectError> {
        let body = self.source.fetch()?;
        let stats = self.source.decode(&body)?;
        trace!(volume = %self.id, name = %stats.name, up_time = stats.up_time, "Decoded volume stats");
        Ok(normalize(&stats))
    }
}

impl Collector for VolumeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.inner.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let snapshot = self.scrape().snapshot;

        // Gauges are built per scrape so that concurrent scrapes never share a value.
        let mut families = Vec::with_capacity(self.inner.gauge_opts.len() + 1);
        for (opts, value) in self.inner.gauge_opts.iter().zip(snapshot.values()) {
            match IntGauge::with_opts(opts.clone()) {
                Ok(gauge) => {
                    gauge.set(i64::try_from(value).unwrap_or(i64::MAX));
                    families.extend(gauge.collect());
                }
                Err(e) => error!(volume = %self.inner.id, metric = %opts.name, "Failed to build gauge: {e}"),
            }
        }
        families.extend(self.inner.errors.collect());
        families
    }
}

impl fmt::Debug for VolumeCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeCollector")
            .field("id", &self.inner.id)
            .field("cas_type", &self.cas_type())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
