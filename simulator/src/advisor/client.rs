use reqwest::Client;
use rshieldcore::prelude::SimulationParameters;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Context handed to the remote narrative service for one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeRequest<'a> {
    pub topic: &'a str,
    pub params: &'a SimulationParameters,
    pub rc: f64,
    pub peak_sim_value: f64,
    pub peak_real_value: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendResponse {
    pub series: Vec<TrendPoint>,
    pub narrative: String,
}

/// Client for the external generative trend/narrative service. The service
/// is opaque to the simulation core; transport and decode failures are
/// surfaced verbatim so the dashboard can show them to the user.
pub struct AdvisorClient {
    base_url: String,
    client: Client,
}

impl AdvisorClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub async fn fetch_trend_series(
        &self,
        keywords: &[String],
        start_date: &str,
        end_date: &str,
        locale: &str,
    ) -> Result<TrendResponse, String> {
        let response = self
            .client
            .post(format!("{}/trends", self.base_url))
            .json(&json!({
                "keywords": keywords,
                "start_date": start_date,
                "end_date": end_date,
                "locale": locale,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "".into());
            return Err(format!("{}: {}", status, text));
        }
        response
            .json::<TrendResponse>()
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn fetch_expert_narrative(
        &self,
        request: &NarrativeRequest<'_>,
    ) -> Result<String, String> {
        let response = self
            .client
            .post(format!("{}/narrative", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_else(|_| "".into());
            return Err(format!("{}: {}", status, text));
        }
        response.text().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrative_request_serializes_its_context() {
        let params = SimulationParameters::default();
        let request = NarrativeRequest {
            topic: "campus rumor",
            params: &params,
            rc: 1.2,
            peak_sim_value: 580_000.0,
            peak_real_value: 600_000.0,
        };
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["topic"], "campus rumor");
        assert_eq!(encoded["params"]["population"], 10_000_000.0);
        assert_eq!(encoded["rc"], 1.2);
    }

    #[test]
    fn client_accepts_a_base_url() {
        assert!(AdvisorClient::new("http://127.0.0.1:9100").is_ok());
    }
}
