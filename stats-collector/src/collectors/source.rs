use crate::{
    collectors::JivaSource,
    error::{
        DecodeError,
        FetchError,
    },
    metrics::VolumeStats,
};
use std::time::Duration;
use url::Url;
use volume_exporter_config::CasType;

/// Wire dialect of one storage engine: how to fetch its stats and how to read them.
pub trait StatsSource: Send + Sync {
    /// Storage engine this source speaks to.
    fn cas_type(&self) -> CasType;

    /// Fetch the raw stats body from the controller.
    fn fetch(&self) -> Result<Vec<u8>, FetchError>;

    /// Decode a body returned by [`StatsSource::fetch`].
    fn decode(&self, body: &[u8]) -> Result<VolumeStats, DecodeError>;
}

/// Builds the source for `cas_type` talking to the controller at `controller_url`.
pub fn stats_source(
    cas_type: CasType,
    controller_url: &Url,
    timeout: Duration,
) -> Result<Box<dyn StatsSource>, FetchError> {
    match cas_type {
        CasType::Jiva => Ok(Box::new(JivaSource::new(controller_url, timeout)?)),
    }
}
