use super::repository::ParcelRepository;
use crate::config::Config;
use crate::datasources::{BackendClient, DataSource, MockSource, RemoteSource, SourceKind};
use crate::error::Result;
use crate::models::{IrrigationAdvice, Prediction};

/// Picks the data source for the session and talks to the backend.
pub struct DataSyncService {
    backend: Option<BackendClient>,
    mock: MockSource,
    remote: Option<RemoteSource>,
}

impl DataSyncService {
    pub fn new(config: &Config) -> Self {
        let mock = MockSource::new(config.demo.seed, config.demo.region);

        // Only create a backend client when it is enabled
        let backend = if config.backend.enabled {
            tracing::info!("Backend configured at {}", config.backend.url);
            Some(BackendClient::new(&config.backend.url))
        } else {
            tracing::info!("Backend disabled - using demo data only");
            None
        };

        let remote = backend
            .clone()
            .map(|client| RemoteSource::new(client, config.demo.region, config.demo.seed));

        Self {
            backend,
            mock,
            remote,
        }
    }

    #[cfg(test)]
    pub fn with_mock(mut self, mock: MockSource) -> Self {
        self.mock = mock;
        self
    }

    pub fn backend(&self) -> Option<&BackendClient> {
        self.backend.as_ref()
    }

    pub fn mock(&self) -> &MockSource {
        &self.mock
    }

    pub async fn check_connection(&self) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();

        if let Some(ref client) = self.backend {
            status.backend_configured = true;
            status.backend_url = Some(client.base_url().to_string());
            status.backend_reachable = client.test_connection().await;
        }

        status
    }

    /// Probe the backend, then load from it or from the demo set.
    pub async fn load_repository(&self) -> (ParcelRepository, ConnectionStatus) {
        let status = self.check_connection().await;

        let primary: Option<&dyn DataSource> = match self.remote {
            Some(ref remote) if status.backend_reachable => Some(remote),
            Some(_) => {
                tracing::warn!("Backend health check failed - using demo data");
                None
            }
            None => None,
        };

        let repository = ParcelRepository::load(primary, &self.mock).await;
        (repository, status)
    }
}

/// Prediction and recommendation for one parcel.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAnalysis {
    pub prediction: Prediction,
    pub advice: IrrigationAdvice,
}

/// `/predict`, then `/recommend` with the predicted risk.
pub async fn fetch_remote_analysis(
    client: &BackendClient,
    parcel_id: &str,
    rain_factor: f64,
) -> Result<RemoteAnalysis> {
    let prediction = client.predict(parcel_id).await?;
    tracing::debug!(
        "Prediction for {}: risk_7d={}",
        parcel_id,
        prediction.risk_7d
    );
    let advice = client
        .recommend(parcel_id, prediction.risk_7d, Some(rain_factor))
        .await?;

    Ok(RemoteAnalysis { prediction, advice })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStatus {
    pub backend_configured: bool,
    pub backend_reachable: bool,
    pub backend_url: Option<String>,
}

impl ConnectionStatus {
    /// The source a fresh load would use.
    pub fn source_kind(&self) -> SourceKind {
        if self.backend_reachable {
            SourceKind::Remote
        } else {
            SourceKind::Mock
        }
    }

    pub fn describe(&self) -> String {
        match (&self.backend_url, self.backend_reachable) {
            (None, _) => "Backend disabled".to_string(),
            (Some(url), true) => format!("Backend reachable at {}", url),
            (Some(url), false) => format!("Backend unreachable at {}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn dead_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    fn config(url: String, enabled: bool) -> Config {
        let mut config = Config {
            backend: BackendConfig { url, enabled },
            ..Config::default()
        };
        config.demo.seed = Some(5);
        config
    }

    fn service(config: &Config) -> DataSyncService {
        let mock = MockSource::new(config.demo.seed, config.demo.region)
            .with_today(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        DataSyncService::new(config).with_mock(mock)
    }

    #[tokio::test]
    async fn disabled_backend_uses_demo_data() {
        let config = config("http://localhost:1".into(), false);
        let (repo, status) = service(&config).load_repository().await;

        assert!(!status.backend_configured);
        assert_eq!(status.describe(), "Backend disabled");
        assert_eq!(repo.origin(), SourceKind::Mock);
        assert_eq!(repo.len(), 4);
    }

    #[tokio::test]
    async fn unreachable_backend_falls_back() {
        let config = config(dead_url().await, true);
        let (repo, status) = service(&config).load_repository().await;

        assert!(status.backend_configured);
        assert!(!status.backend_reachable);
        assert_eq!(status.source_kind(), SourceKind::Mock);
        assert_eq!(repo.origin(), SourceKind::Mock);
        assert!(!repo.backend_available());
    }

    #[tokio::test]
    async fn healthy_backend_with_failing_parcels_falls_back() {
        let url = spawn(Router::new().route("/health", get(|| async { "ok" }))).await;
        let config = config(url, true);
        let (repo, status) = service(&config).load_repository().await;

        assert!(status.backend_reachable);
        assert_eq!(repo.origin(), SourceKind::Mock);
        assert_eq!(repo.len(), 4);
    }

    #[tokio::test]
    async fn healthy_backend_is_used() {
        let url = spawn(
            Router::new()
                .route("/health", get(|| async { "ok" }))
                .route("/parcels", get(|| async { Json(json!([])) })),
        )
        .await;
        let config = config(url, true);
        let (repo, status) = service(&config).load_repository().await;

        assert_eq!(status.source_kind(), SourceKind::Remote);
        assert_eq!(repo.origin(), SourceKind::Remote);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn remote_analysis_chains_predict_into_recommend() {
        let url = spawn(
            Router::new()
                .route(
                    "/predict",
                    post(|| async { Json(json!({"risk_7d": 64.0})) }),
                )
                .route(
                    "/recommend",
                    post(|Json(body): Json<Value>| async move {
                        Json(json!({
                            "window": format!("risk {}", body["risk_7d"]),
                            "amount_mm": body["rain_factor"].as_f64().unwrap_or(0.0) * 10.0,
                            "rationale": "stub"
                        }))
                    }),
                ),
        )
        .await;
        let client = BackendClient::new(&url);

        let analysis = fetch_remote_analysis(&client, "TR-1", 0.5).await.unwrap();
        assert_eq!(analysis.prediction.risk_7d, 64.0);
        assert_eq!(analysis.advice.window, "risk 64.0");
        assert_eq!(analysis.advice.amount_mm, 5.0);
    }
}
