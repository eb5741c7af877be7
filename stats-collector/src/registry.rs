use crate::{
    collectors::VolumeCollector,
    error::RegistrationError,
};
use prometheus::{
    core::Collector,
    proto::MetricFamily,
    Registry,
    TextEncoder,
};
use std::{
    collections::{
        btree_map::Entry,
        BTreeMap,
    },
    sync::{
        Arc,
        Mutex,
        MutexGuard,
        PoisonError,
    },
    thread,
};

/// Process-wide set of volume collectors scraped by the metrics endpoint.
///
/// Created once at startup and passed to whoever registers collectors; [`MetricsRegistry::drain`]
/// unregisters everything at shutdown. Clones share the same registry.
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    registry: Registry,
    collectors: Mutex<BTreeMap<String, VolumeCollector>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, collector: &VolumeCollector) -> Result<(), RegistrationError> {
        let mut collectors = self.collectors();
        let id = collector.id();
        if collectors.contains_key(id) {
            return Err(RegistrationError::AlreadyRegistered(id.to_string()));
        }

        self.inner
            .registry
            .register(Box::new(collector.clone()))
            .map_err(|source| RegistrationError::Rejected {
                volume: id.to_string(),
                source,
            })?;
        collectors.insert(id.to_string(), collector.clone());
        info!(volume = %id, cas_type = %collector.cas_type(), "Registered volume collector");
        Ok(())
    }

    pub fn unregister(&self, collector: &VolumeCollector) -> Result<(), RegistrationError> {
        let mut collectors = self.collectors();
        let id = collector.id();
        let Some(registered) = collectors.remove(id) else {
            return Err(RegistrationError::NotRegistered(id.to_string()));
        };

        if let Err(source) = self.inner.registry.unregister(Box::new(registered.clone())) {
            collectors.insert(id.to_string(), registered);
            return Err(RegistrationError::Rejected {
                volume: id.to_string(),
                source,
            });
        }
        info!(volume = %id, "Unregistered volume collector");
        Ok(())
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.collectors().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.collectors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors().is_empty()
    }

    /// Unregisters every collector, returning how many were removed.
    pub fn drain(&self) -> usize {
        let registered: Vec<VolumeCollector> = self.collectors().values().cloned().collect();
        let mut drained = 0;
        for collector in &registered {
            match self.unregister(collector) {
                Ok(()) => drained += 1,
                Err(e) => warn!(volume = %collector.id(), "Failed to unregister collector: {e}"),
            }
        }
        drained
    }

    /// Scrapes every registered collector, one thread per volume, so a scrape takes about one
    /// fetch timeout however many controllers are stalled. Async callers must still run it on a
    /// blocking thread.
    ///
    /// Families are merged by name and sorted the same way [`Registry::gather`] does it.
    pub fn gather(&self) -> Vec<MetricFamily> {
        let collectors: Vec<VolumeCollector> = self.collectors().values().cloned().collect();

        let scraped: Vec<Vec<MetricFamily>> = thread::scope(|scope| {
            let handles: Vec<_> = collectors
                .iter()
                .map(|collector| scope.spawn(move || collector.collect()))
                .collect();
            handles
                .into_iter()
                .zip(&collectors)
                .map(|(handle, collector)| {
                    handle.join().unwrap_or_else(|_| {
                        error!(volume = %collector.id(), "Collector thread panicked, volume left out of the scrape");
                        Vec::new()
                    })
                })
                .collect()
        });

        merge_families(scraped.into_iter().flatten())
    }

    /// Scrapes and encodes in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.gather())
    }

    fn collectors(&self) -> MutexGuard<'_, BTreeMap<String, VolumeCollector>> {
        self.inner.collectors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn merge_families(families: impl IntoIterator<Item = MetricFamily>) -> Vec<MetricFamily> {
    let mut by_name: BTreeMap<String, MetricFamily> = BTreeMap::new();
    for mut family in families {
        if family.get_metric().is_empty() {
            continue;
        }
        match by_name.entry(family.get_name().to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(family);
            }
            Entry::Occupied(mut entry) => entry.get_mut().mut_metric().extend(family.take_metric()),
        }
    }

    for family in by_name.values_mut() {
        family.mut_metric().sort_by(|a, b| {
            let values = |metric: &prometheus::proto::Metric| {
                metric
                    .get_label()
                    .iter()
                    .map(|pair| pair.value().to_string())
                    .collect::<Vec<_>>()
            };
            values(a).cmp(&values(b))
        });
    }
    by_name.into_values().collect()
}
