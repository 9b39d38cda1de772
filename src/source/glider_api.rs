//! Client for the glider deployment REST API.

use crate::errors::{AppError, AppResult};
use crate::models::deployment::DeploymentInfo;
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DeploymentsResponse {
    #[serde(default)]
    data: Vec<DeploymentInfo>,
}

/// Looks up deployment records by name.
pub trait DeploymentLookup {
    fn deployment(&self, name: &str) -> AppResult<DeploymentInfo>;
}

pub struct GliderApiClient {
    client: Client,
    base_url: String,
}

impl GliderApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl DeploymentLookup for GliderApiClient {
    fn deployment(&self, name: &str) -> AppResult<DeploymentInfo> {
        let url = format!(
            "{}/deployments/?deployment={}",
            self.base_url,
            urlencoding::encode(name)
        );
        debug!("GET {url}");

        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(AppError::Fetch {
                resource: name.to_string(),
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        first_deployment(name, &response.text()?)
    }
}

fn first_deployment(name: &str, body: &str) -> AppResult<DeploymentInfo> {
    let parsed: DeploymentsResponse = serde_json::from_str(body)?;
    parsed.data.into_iter().next().ok_or_else(|| AppError::Fetch {
        resource: name.to_string(),
        reason: "deployment not found".to_string(),
    })
}
