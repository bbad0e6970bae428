use crate::config::toml_config::SearchConfig;
use crate::domain::model::{LocalListing, LocalQuery, OrganicQuery, OrganicResult, SerpResponse};
use crate::domain::ports::SearchSource;
use crate::utils::error::{RankError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

/// SerpAPI 用戶端。回應在此解碼成型別化結構。
#[derive(Debug, Clone)]
pub struct SerpApiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    google_domain: String,
    gl: String,
    hl: String,
    location: String,
    zoom: u32,
}

impl SerpApiClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| RankError::MissingConfigError {
                field: "search.api_key".to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/search.json", config.base_url().trim_end_matches('/')),
            api_key,
            google_domain: config.google_domain.clone(),
            gl: config.gl.clone(),
            hl: config.hl.clone(),
            location: config.location.clone(),
            zoom: config.zoom(),
        })
    }

    fn base_params<'a>(&'a self, engine: &'a str, keyword: &'a str) -> Vec<(&'a str, String)> {
        vec![
            ("api_key", self.api_key.clone()),
            ("engine", engine.to_string()),
            ("google_domain", self.google_domain.clone()),
            ("q", keyword.to_string()),
            ("gl", self.gl.clone()),
            ("hl", self.hl.clone()),
            ("location", self.location.clone()),
        ]
    }

    async fn fetch<T: DeserializeOwned + Default>(
        &self,
        params: &[(&str, String)],
        results_key: &str,
        single_key: Option<&str>,
    ) -> Result<SerpResponse<T>> {
        let engine = params
            .iter()
            .find(|(k, _)| *k == "engine")
            .map(|(_, v)| v.as_str())
            .unwrap_or_default();
        tracing::debug!("Making SerpAPI request (engine={})", engine);

        let response = self.client.get(&self.endpoint).query(params).send().await?;
        let status = response.status();
        tracing::debug!("SerpAPI response status: {}", status);

        let body = response.text().await?;
        let json: serde_json::Value = match serde_json::from_str(&body) {
            Ok(json) => json,
            Err(_) if !status.is_success() => {
                return Err(RankError::HttpStatusError {
                    status: status.as_u16(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(message) = json.get("error").and_then(|v| v.as_str()) {
            return Ok(SerpResponse::Error(message.to_string()));
        }

        if !status.is_success() {
            return Err(RankError::HttpStatusError {
                status: status.as_u16(),
            });
        }

        let results = match json.get(results_key) {
            Some(serde_json::Value::Array(items)) => items.iter().map(decode_item).collect(),
            Some(other) => vec![decode_item(other)],
            None => match single_key.and_then(|key| json.get(key)) {
                Some(single) => vec![decode_item(single)],
                None => Vec::new(),
            },
        };

        Ok(SerpResponse::Results(results))
    }
}

/// 逐筆解碼。解不出來的項目以空白結果佔位，後面的名次不會往前移。
fn decode_item<T: DeserializeOwned + Default>(item: &serde_json::Value) -> T {
    match serde_json::from_value::<T>(item.clone()) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("Skipping undecodable result: {}", e);
            T::default()
        }
    }
}

#[async_trait]
impl SearchSource for SerpApiClient {
    async fn organic(&self, query: &OrganicQuery) -> Result<SerpResponse<OrganicResult>> {
        let mut params = self.base_params("google", &query.keyword);
        params.push(("start", query.start.to_string()));

        self.fetch(&params, "organic_results", None).await
    }

    async fn local(&self, query: &LocalQuery) -> Result<SerpResponse<LocalListing>> {
        let mut params = self.base_params("google_maps", &query.keyword);
        params.push(("type", "search".to_string()));
        params.push(("z", self.zoom.to_string()));

        // 只有一個地點時，google_maps 回傳 place_results 而不是 local_results
        self.fetch(&params, "local_results", Some("place_results")).await
    }
}
