use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{MuxConfig, MuxEntry, TunerChannel, TunerClient};
use crate::config::TvheadendConfig;
use crate::errors::{AppError, AppResult, TunerError, TunerResult};

/// Grid requests ask for everything in one page
const GRID_LIMIT: &str = "100000";

#[derive(Debug, Deserialize)]
struct GridResponse<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    uuid: String,
}

/// HTTP client for the Tvheadend JSON API
#[derive(Debug, Clone)]
pub struct TvheadendClient {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
}

impl TvheadendClient {
    pub fn new(config: &TvheadendConfig) -> AppResult<Self> {
        let mut base_url = Url::parse(&config.url).map_err(|e| {
            AppError::configuration(format!("tvheadend.url: invalid URL '{}': {e}", config.url))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(config.request_timeout()?)
            .build()
            .map_err(|e| AppError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn endpoint(&self, operation: &'static str, path: &str) -> TunerResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TunerError::invalid_response(operation, format!("bad endpoint {path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> TunerResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TunerError::transport(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TunerError::Status {
                operation,
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> TunerResult<T> {
        let url = self.endpoint(operation, path)?;
        debug!("{}: GET {}", operation, url.path());
        let response = self.send(operation, self.client.get(url).query(query)).await?;
        Self::decode(operation, response).await
    }

    async fn post_form(
        &self,
        operation: &'static str,
        path: &str,
        form: &[(&str, &str)],
    ) -> TunerResult<Response> {
        let url = self.endpoint(operation, path)?;
        debug!("{}: POST {}", operation, url.path());
        self.send(operation, self.client.post(url).form(form)).await
    }

    async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> TunerResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TunerError::transport(operation, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| TunerError::invalid_response(operation, e.to_string()))
    }

    async fn delete_node(&self, operation: &'static str, uuid: &str) -> TunerResult<()> {
        self.post_form(operation, "api/idnode/delete", &[("uuid", uuid)])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TunerClient for TvheadendClient {
    async fn list_all_muxes(&self) -> TunerResult<Vec<MuxEntry>> {
        let grid: GridResponse<MuxEntry> = self
            .get_json("list_all_muxes", "api/mpegts/mux/grid", &[("limit", GRID_LIMIT)])
            .await?;
        Ok(grid.entries)
    }

    async fn network_mux_create(&self, network_uuid: &str) -> TunerResult<String> {
        const OPERATION: &str = "network_mux_create";
        let conf = json!({ "enabled": 1, "epg": 1 }).to_string();
        let response = self
            .post_form(
                OPERATION,
                "api/mpegts/network/mux_create",
                &[("uuid", network_uuid), ("conf", &conf)],
            )
            .await?;
        let created: CreatedResponse = Self::decode(OPERATION, response).await?;
        if created.uuid.is_empty() {
            return Err(TunerError::invalid_response(OPERATION, "empty mux uuid"));
        }
        Ok(created.uuid)
    }

    async fn idnode_save(&self, config: &MuxConfig) -> TunerResult<()> {
        const OPERATION: &str = "idnode_save";
        let node = serde_json::to_string(config)
            .map_err(|e| TunerError::invalid_response(OPERATION, e.to_string()))?;
        self.post_form(OPERATION, "api/idnode/save", &[("node", &node)])
            .await?;
        Ok(())
    }

    async fn delete_mux(&self, uuid: &str) -> TunerResult<()> {
        self.delete_node("delete_mux", uuid).await
    }

    async fn map_all_services_to_channels(&self) -> TunerResult<()> {
        const OPERATION: &str = "map_all_services_to_channels";
        let services: GridResponse<ServiceEntry> = self
            .get_json(OPERATION, "api/mpegts/service/grid", &[("limit", GRID_LIMIT)])
            .await?;
        let uuids: Vec<String> = services.entries.into_iter().map(|s| s.uuid).collect();
        debug!("Mapping {} services to channels", uuids.len());

        let node = json!({
            "services": uuids,
            "encrypted": false,
            "merge_same_name": false,
            "check_availability": false,
            "type_tags": true,
            "provider_tags": false,
            "network_tags": false,
        })
        .to_string();
        self.post_form(OPERATION, "api/service/mapper/save", &[("node", &node)])
            .await?;
        Ok(())
    }

    async fn list_all_channels(&self) -> TunerResult<Vec<TunerChannel>> {
        let grid: GridResponse<TunerChannel> = self
            .get_json(
                "list_all_channels",
                "api/channel/grid",
                &[("all", "1"), ("limit", GRID_LIMIT)],
            )
            .await?;
        Ok(grid.entries)
    }

    async fn delete_channels(&self, uuid: &str) -> TunerResult<()> {
        self.delete_node("delete_channels", uuid).await
    }
}
