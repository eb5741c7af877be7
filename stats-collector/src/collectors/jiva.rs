use crate::{
    client::StatsClient,
    collectors::StatsSource,
    error::{
        DecodeError,
        FetchError,
    },
    metrics::VolumeStats,
};
use std::time::Duration;
use url::Url;
use volume_exporter_config::CasType;

/// Jiva controllers serve their stats as JSON on `/v1/stats`.
#[derive(Debug, Clone)]
pub struct JivaSource {
    client: StatsClient,
}

impl JivaSource {
    pub fn new(controller_url: &Url, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: StatsClient::new(controller_url, timeout)?,
        })
    }
}

impl StatsSource for JivaSource {
    fn cas_type(&self) -> CasType {
        CasType::Jiva
    }

    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        self.client.fetch()
    }

    fn decode(&self, body: &[u8]) -> Result<VolumeStats, DecodeError> {
        VolumeStats::from_slice(body)
    }
}
