//! Engagement service bound to the v1 REST API.

use async_trait::async_trait;
use lodestar_core::{Engagement, EngagementFormConfig};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{EngagementService, Result, ServiceError};

/// REST client for the v1 engagement API.
///
/// The `Client` is expected to carry session credentials already
/// (default headers), so this type never sees tokens.
#[derive(Clone)]
pub struct Apiv1EngagementService {
    /// HTTP client
    client: Client,

    /// Backend base URL
    base_url: Url,
}

impl Apiv1EngagementService {
    /// Create a service for `base_url`.
    pub fn new(base_url: &str, client: Client) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidConfig("backend URL is empty".to_string()));
        }
        let base_url = Url::parse(trimmed)
            .map_err(|e| ServiceError::InvalidConfig(format!("invalid backend URL {}: {}", trimmed, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ServiceError::InvalidConfig(format!("backend URL {} cannot be a base", trimmed)));
        }

        Ok(Self { client, base_url })
    }

    /// The base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Map a response to `T`, turning non-2xx into `ServiceError::Server`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Backend returned {} ({} bytes)", status, body.len());
        return Err(ServiceError::Server {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl EngagementService for Apiv1EngagementService {
    async fn fetch_engagements(&self) -> Result<Vec<Engagement>> {
        let url = self.endpoint(&["engagements"]);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let engagements: Vec<Engagement> = decode(response).await?;

        debug!("Fetched {} engagements", engagements.len());
        Ok(engagements)
    }

    async fn create_engagement(&self, data: &Engagement) -> Result<Engagement> {
        let url = self.endpoint(&["engagements"]);
        debug!("POST {} ({}/{})", url, data.customer_name, data.project_name);

        let response = self.client.post(url).json(data).send().await?;
        decode(response).await
    }

    async fn save_engagement(&self, data: &Engagement) -> Result<Engagement> {
        let url = self.endpoint(&[
            "engagements",
            "customers",
            &data.customer_name,
            "projects",
            &data.project_name,
        ]);
        debug!("PUT {}", url);

        let response = self.client.put(url).json(data).send().await?;
        decode(response).await
    }

    async fn launch_engagement(&self, data: &Engagement) -> Result<Engagement> {
        let url = self.endpoint(&["engagements", "launch"]);
        debug!("PUT {} ({}/{})", url, data.customer_name, data.project_name);

        let response = self.client.put(url).json(data).send().await?;
        decode(response).await
    }

    async fn fetch_form_config(&self) -> Result<EngagementFormConfig> {
        let url = self.endpoint(&["config"]);
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service(server: &MockServer) -> Apiv1EngagementService {
        Apiv1EngagementService::new(&format!("{}/", server.uri()), Client::new()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_engagements() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/engagements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "customer_name": "Acme", "project_name": "Rocket"},
                {"id": "b", "customer_name": "Globex", "project_name": "Dome"}
            ])))
            .mount(&server)
            .await;

        let engagements = service(&server).await.fetch_engagements().await.unwrap();
        assert_eq!(engagements.len(), 2);
        assert_eq!(engagements[0].id.as_str(), "1");
        assert_eq!(engagements[1].customer_name, "Globex");
    }

    #[tokio::test]
    async fn test_create_posts_body_and_returns_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/engagements"))
            .and(body_partial_json(json!({"customer_name": "Acme", "project_name": "Rocket"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "server-1", "customer_name": "Acme", "project_name": "Rocket"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = service(&server)
            .await
            .create_engagement(&Engagement::draft("Acme", "Rocket"))
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "server-1");
    }

    #[tokio::test]
    async fn test_save_uses_customer_and_project_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/engagements/customers/Acme/projects/Rocket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1", "customer_name": "Acme", "project_name": "Rocket", "location": "Remote"
            })))
            .mount(&server)
            .await;

        let saved = service(&server)
            .await
            .save_engagement(&Engagement::draft("Acme", "Rocket"))
            .await
            .unwrap();
        assert_eq!(saved.location.as_deref(), Some("Remote"));
    }

    #[tokio::test]
    async fn test_non_success_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/engagements"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = service(&server).await.fetch_engagements().await.unwrap_err();
        match err {
            ServiceError::Server { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = service(&server).await.fetch_form_config().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) is not expected to be listening locally.
        let service = Apiv1EngagementService::new("http://127.0.0.1:9", Client::new()).unwrap();
        let err = service.fetch_engagements().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_rejects_empty_base_url() {
        let err = Apiv1EngagementService::new("  ", Client::new()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let service = Apiv1EngagementService::new("https://api.example.com/v1/", Client::new()).unwrap();
        assert_eq!(
            service.endpoint(&["engagements"]).as_str(),
            "https://api.example.com/v1/engagements"
        );
    }
}
