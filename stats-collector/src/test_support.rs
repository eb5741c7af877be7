//! Fake controllers and sources shared by the unit tests.

use crate::{
    collectors::{
        StatsSource,
        VolumeCollector,
    },
    error::{
        DecodeError,
        FetchError,
    },
    metrics::VolumeStats,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse,
        Response,
    },
    routing::get,
    Router,
};
use std::{
    future::IntoFuture,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Arc,
    },
    thread,
    time::Duration,
};
use tokio::sync::oneshot;
use url::Url;
use volume_exporter_config::{
    CasType,
    VolumeConfig,
};

pub(crate) const FAKE_RESPONSE: &str = r#"{"Name":"vol","ReadIOPS":"1","ReplicaCounter":6,"RevisionCounter":100,"SCSIIOCount":null,"SectorSize":"4096","Size":"1073741824","TotalReadBlockCount":"10","TotalReadTime":"10","TotalWriteTime":"15","TotatWriteBlockCount":"10","UpTime":10,"UsedBlocks":"1048576","UsedLogicalBlocks":"1048576","WriteIOPS":"15","actions":{},"links":{"self":"http://localhost:9501/v1/stats"},"type":"stats"}"#;
pub(crate) const CONTROLLER_RESPONSE: &str = r#"{"Name":"vol1","ReadIOPS":"0","ReplicaCounter":0,"RevisionCounter":0,"SCSIIOCount":{},"SectorSize":"4096","Size":"1073741824","TotalReadBlockCount":"0","TotalReadTime":"0","TotalWriteTime":"0","TotatWriteBlockCount":"0","UpTime":158.667823193,"UsedBlocks":"5","UsedLogicalBlocks":"0","WriteIOPS":"0","actions":{},"links":{"self":"http://10.42.0.1:9501/v1/stats"},"type":"stats"}"#;
pub(crate) const VALID_CONTROLLER_RESPONSE: &str = r#"{"Name":"vol1","ReadIOPS":"5","ReplicaCounter":2,"RevisionCounter":10,"SCSIIOCount":{},"SectorSize":"4096","Size":"1073741824","TotalReadBlockCount":"25","TotalReadTime":"45","TotalWriteTime":"30","TotatWriteBlockCount":"6","UpTime":158.667823193,"UsedBlocks":"5","UsedLogicalBlocks":"23","WriteIOPS":"11","actions":{},"links":{"self":"http://10.42.0.1:9501/v1/stats"},"type":"stats"}"#;
pub(crate) const INVALID_CONTROLLER_RESPONSE: &str = "404 Page not found";

/// How the fake controller answers `GET /v1/stats`.
pub(crate) enum Reply {
    Fixed { status: StatusCode, body: String },
    /// Cycles through the bodies, one per request, with status 200.
    Alternate(Vec<String>),
    /// Answers only after the delay.
    Stall(Duration),
}

impl Reply {
    pub(crate) fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self::Fixed {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }
}

#[derive(Clone)]
struct FakeState {
    reply: Arc<Reply>,
    hits: Arc<AtomicUsize>,
}

/// A controller serving `/v1/stats` on a loopback port from its own thread and runtime, so that
/// blocking clients can be exercised from plain `#[test]` functions.
pub(crate) struct FakeController {
    url: Url,
    hits: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl FakeController {
    pub(crate) fn start(reply: Reply) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = Url::parse(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let state = FakeState {
            reply: Arc::new(reply),
            hits: hits.clone(),
        };
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let app = Router::new().route("/v1/stats", get(stats)).with_state(state);
                tokio::select! {
                    _ = axum::serve(listener, app).into_future() => {}
                    _ = shutdown_rx => {}
                }
            });
        });

        Self {
            url,
            hits,
            shutdown: Some(shutdown_tx),
        }
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeController {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn stats(State(state): State<FakeState>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst);
    match state.reply.as_ref() {
        Reply::Fixed { status, body } => (*status, body.clone()).into_response(),
        Reply::Alternate(bodies) => (StatusCode::OK, bodies[hit % bodies.len()].clone()).into_response(),
        Reply::Stall(delay) => {
            tokio::time::sleep(*delay).await;
            (StatusCode::OK, "{}").into_response()
        }
    }
}

/// A controller URL nothing listens on.
pub(crate) fn unreachable_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

pub(crate) fn jiva_collector(controller_url: &Url) -> VolumeCollector {
    let volume = VolumeConfig::new(controller_url.clone(), CasType::Jiva);
    VolumeCollector::new(&volume, "openebs", Duration::from_secs(5)).unwrap()
}

/// Serves the given bodies in turn without any network.
pub(crate) struct ScriptedSource {
    bodies: Vec<String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSource {
    pub(crate) fn new<const N: usize>(bodies: [&str; N]) -> Self {
        Self {
            bodies: bodies.iter().map(|b| b.to_string()).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl StatsSource for ScriptedSource {
    fn cas_type(&self) -> CasType {
        CasType::Jiva
    }

    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bodies[call % self.bodies.len()].clone().into_bytes())
    }

    fn decode(&self, body: &[u8]) -> Result<VolumeStats, DecodeError> {
        VolumeStats::from_slice(body)
    }
}

pub(crate) struct PanickingSource;

impl StatsSource for PanickingSource {
    fn cas_type(&self) -> CasType {
        CasType::Jiva
    }

    fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        panic!("controller exploded")
    }

    fn decode(&self, body: &[u8]) -> Result<VolumeStats, DecodeError> {
        VolumeStats::from_slice(body)
    }
}

/// Value of the sample named exactly `series` (including its label set) in a text exposition.
pub(crate) fn sample(text: &str, series: &str) -> Option<f64> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.rsplit_once(' '))
        .find(|(name, _)| *name == series)
        .and_then(|(_, value)| value.parse().ok())
}
