use crate::error::{AquaGuardError, Result};
use crate::logic::scoring::compute_stress;
use crate::models::{AdviceOrigin, IrrigationAdvice, Prediction, SignalPoint};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// HTTP client for the prediction backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

/// Entry of `GET /parcels`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteParcel {
    pub parcel_id: String,
    #[serde(default)]
    pub name: String,
}

// Backend response structures
#[derive(Debug, Default, Deserialize)]
pub struct TimeseriesResponse {
    #[serde(default)]
    pub ndvi: Vec<NdviObservation>,
    #[serde(default)]
    pub meteo: Vec<MeteoObservation>,
}

#[derive(Debug, Deserialize)]
pub struct NdviObservation {
    pub date: String,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MeteoObservation {
    pub date: String,
    #[serde(default)]
    pub rain_mm: Option<f64>,
    #[serde(default)]
    pub temp_c: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    risk_7d: Option<f64>,
    #[serde(default)]
    risk_14d: Option<f64>,
    #[serde(default)]
    ndvi_7d_pred: Option<f64>,
    #[serde(default)]
    top_factors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    window: Option<String>,
    #[serde(default)]
    amount_mm: Option<f64>,
    #[serde(default)]
    rationale: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    answer: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    parcel_id: &'a str,
}

#[derive(Debug, Serialize)]
struct RecommendRequest<'a> {
    parcel_id: &'a str,
    risk_7d: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    rain_factor: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    parcel_id: &'a str,
    question: &'a str,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Connectivity probe. Any success status counts.
    pub async fn health(&self) -> Result<()> {
        let url = self.url("/health");
        let response = self.client.get(&url).send().await?;
        Self::ensure_success("GET", &url, response).await?;
        Ok(())
    }

    pub async fn test_connection(&self) -> bool {
        match self.health().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Backend probe failed: {}", e);
                false
            }
        }
    }

    pub async fn parcels(&self) -> Result<Vec<RemoteParcel>> {
        self.get_json(&self.url("/parcels")).await
    }

    /// Fetch and map the NDVI and weather series of one parcel.
    pub async fn timeseries(&self, parcel_id: &str) -> Result<Vec<SignalPoint>> {
        let url = reqwest::Url::parse_with_params(
            &self.url("/timeseries"),
            &[("parcel_id", parcel_id)],
        )
        .map_err(|e| AquaGuardError::Config(format!("Invalid backend URL: {}", e)))?;

        let response: TimeseriesResponse = self.get_json(url.as_str()).await?;
        Ok(map_timeseries(&response))
    }

    pub async fn predict(&self, parcel_id: &str) -> Result<Prediction> {
        let response: PredictResponse = self
            .post_json("/predict", &PredictRequest { parcel_id })
            .await?;

        if let Some(error) = response.error {
            return Err(AquaGuardError::InvalidData(format!(
                "Prediction for {} failed: {}",
                parcel_id, error
            )));
        }
        let risk_7d = response.risk_7d.ok_or_else(|| {
            AquaGuardError::InvalidData(format!("Prediction for {} has no risk_7d", parcel_id))
        })?;

        Ok(Prediction {
            risk_7d,
            risk_14d: response.risk_14d,
            ndvi_7d_pred: response.ndvi_7d_pred,
            top_factors: response.top_factors,
        })
    }

    pub async fn recommend(
        &self,
        parcel_id: &str,
        risk_7d: f64,
        rain_factor: Option<f64>,
    ) -> Result<IrrigationAdvice> {
        let response: RecommendResponse = self
            .post_json(
                "/recommend",
                &RecommendRequest {
                    parcel_id,
                    risk_7d,
                    rain_factor,
                },
            )
            .await?;

        Ok(IrrigationAdvice::new(
            response.window.unwrap_or_default(),
            response.amount_mm.unwrap_or(0.0),
            response.rationale.unwrap_or_default(),
            AdviceOrigin::Remote,
        )
        .with_data_point("Risk 7d", format!("{:.0}", risk_7d)))
    }

    pub async fn chat(&self, parcel_id: &str, question: &str) -> Result<String> {
        let response: ChatResponse = self
            .post_json(
                "/chat",
                &ChatRequest {
                    parcel_id,
                    question,
                },
            )
            .await?;
        Ok(response.answer.unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success("GET", url, response).await?;
        Self::decode(url, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::ensure_success("POST", &url, response).await?;
        Self::decode(&url, response).await
    }

    /// A body that does not match the expected shape is bad data, not a transport failure.
    async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T> {
        response.json().await.map_err(|e| {
            if e.is_decode() {
                AquaGuardError::InvalidData(format!("Unexpected response from {}: {}", url, e))
            } else {
                AquaGuardError::Http(e)
            }
        })
    }

    async fn ensure_success(
        method: &'static str,
        url: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AquaGuardError::RemoteStatus {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Evapotranspiration proxy from air temperature.
pub fn et_from_temperature(temp_c: f64) -> f64 {
    (2.0 + temp_c * 0.12).clamp(0.0, 10.0)
}

/// Join NDVI and weather observations on date.
///
/// NDVI observations drive the output: a date without weather gets no rain
/// and the ET of 0 °C. Unparseable dates and missing NDVI values are skipped.
/// A repeated date keeps the last observation.
pub fn map_timeseries(response: &TimeseriesResponse) -> Vec<SignalPoint> {
    let meteo: HashMap<NaiveDate, &MeteoObservation> = response
        .meteo
        .iter()
        .filter_map(|m| parse_date(&m.date).map(|d| (d, m)))
        .collect();

    let mut points: BTreeMap<NaiveDate, SignalPoint> = BTreeMap::new();
    for obs in &response.ndvi {
        let Some(date) = parse_date(&obs.date) else {
            tracing::warn!("Skipping NDVI observation with bad date '{}'", obs.date);
            continue;
        };
        let Some(ndvi) = obs.value.filter(|v| v.is_finite()) else {
            tracing::warn!("Skipping NDVI observation on {} without a value", date);
            continue;
        };

        let weather = meteo.get(&date);
        let rain = weather
            .and_then(|m| m.rain_mm)
            .filter(|r| r.is_finite())
            .unwrap_or(0.0)
            .max(0.0);
        let temp_c = weather
            .and_then(|m| m.temp_c)
            .filter(|t| t.is_finite())
            .unwrap_or(0.0);
        let et = et_from_temperature(temp_c);

        points.insert(
            date,
            SignalPoint {
                date,
                ndvi,
                rain,
                et,
                stress: compute_stress(ndvi, rain, et),
            },
        );
    }

    points.into_values().collect()
}

/// Accepts `YYYY-MM-DD`, also as the prefix of a timestamp.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
