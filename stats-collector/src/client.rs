use crate::error::FetchError;
use reqwest::blocking::Client as HttpClient;
use std::time::Duration;
use url::Url;

/// Path of the stats document, relative to the controller URL.
pub const STATS_PATH: &str = "v1/stats";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues one stats request per call against a single controller.
///
/// The client is blocking: it runs on the thread that scrapes the registry and is bounded by the
/// configured timeout. It never retries, the scrape interval is the retry cadence.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http_client: HttpClient,
    stats_url: Url,
}

impl StatsClient {
    pub fn new(controller_url: &Url, timeout: Duration) -> Result<Self, FetchError> {
        let stats_url = stats_url(controller_url)?;
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { http_client, stats_url })
    }

    pub fn stats_url(&self) -> &Url {
        &self.stats_url
    }

    /// Fetches the raw stats body. Any non-2xx answer is an error, its body is dropped.
    #[instrument(level = "trace", skip(self), fields(url = %self.stats_url))]
    pub fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let response = self
            .http_client
            .get(self.stats_url.clone())
            .send()
            .map_err(|e| FetchError::from_request(&self.stats_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.stats_url.clone(),
                status,
            });
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::from_request(&self.stats_url, e))?;
        trace!(len = body.len(), "Fetched stats body");
        Ok(body.to_vec())
    }
}

fn stats_url(controller_url: &Url) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: controller_url.to_string(),
        reason,
    };

    if !matches!(controller_url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", controller_url.scheme())));
    }

    // `join` replaces the last path segment unless the base ends with a slash.
    let mut base = controller_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(STATS_PATH).map_err(|e| invalid(e.to_string()))
}
