use crate::error::{ClientError, Result};
use crate::models::*;
use async_trait::async_trait;
use reqwest::{header::ACCEPT_LANGUAGE, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const ROUTE_WAR_STATUS: &str = "war_status";
pub const ROUTE_WAR_INFO: &str = "war_info";
pub const ROUTE_WAR_STATS: &str = "war_stats";
pub const ROUTE_NEWS_FEED: &str = "news_feed";

/// Default upstream API location
pub const DEFAULT_API_URL: &str = "https://api.live.prod.thehelldiversgame.com/api";

/// Read operations offered by the upstream war API.
///
/// Every call resolves to an [`ApiResponse`] as soon as the upstream answered,
/// whatever the status code; only transport failures are reported as errors.
#[async_trait]
pub trait WarApi: Send + Sync {
    /// `GET /WarSeason/{war_id}/Status`
    async fn war_status(&self, war_id: WarId) -> Result<ApiResponse<WarSeasonStatus>>;

    /// `GET /WarSeason/{war_id}/WarInfo`
    async fn war_info(&self, war_id: WarId) -> Result<ApiResponse<WarSeasonInfo>>;

    /// `GET /Stats/war/{war_id}/summary`
    async fn war_stats(&self, war_id: WarId) -> Result<ApiResponse<WarStatistics>>;

    /// `GET /NewsFeed/{war_id}?fromTimestamp=..`, items published at or after `from_timestamp`
    async fn news_feed(
        &self,
        war_id: WarId,
        from_timestamp: i64,
        language: &str,
    ) -> Result<ApiResponse<Vec<NewsItem>>>;
}

/// reqwest-backed implementation of [`WarApi`]
#[derive(Debug, Clone)]
pub struct HttpWarApi {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl HttpWarApi {
    /// Create a new client against `base_url`
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("hde/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Transport { route: "client", source })?;

        Ok(Self { client, base_url, request_timeout })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        route: &'static str,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>> {
        let started = Instant::now();
        let response = request.timeout(self.request_timeout).send().await.map_err(|source| {
            error!(route, error = %source, "Request failed");
            if source.is_timeout() {
                ClientError::Timeout { route }
            } else {
                ClientError::Transport { route, source }
            }
        })?;

        let status = response.status();
        let body = if status == StatusCode::OK {
            let bytes = response
                .bytes()
                .await
                .map_err(|source| ClientError::Transport { route, source })?;
            let parsed = serde_json::from_slice::<T>(&bytes)
                .map_err(|source| ClientError::Decode { route, source })?;
            Some(parsed)
        } else {
            None
        };
        let elapsed = started.elapsed();

        info!(route, code = status.as_u16(), duration_ms = elapsed.as_millis() as u64, "Fetched");
        Ok(ApiResponse { route, status: status.as_u16(), elapsed, body })
    }
}

#[async_trait]
impl WarApi for HttpWarApi {
    async fn war_status(&self, war_id: WarId) -> Result<ApiResponse<WarSeasonStatus>> {
        let url = self.url(&format!("/WarSeason/{}/Status", war_id));
        debug!(route = ROUTE_WAR_STATUS, %url, "Fetching war status");
        self.execute(ROUTE_WAR_STATUS, self.client.get(&url)).await
    }

    async fn war_info(&self, war_id: WarId) -> Result<ApiResponse<WarSeasonInfo>> {
        let url = self.url(&format!("/WarSeason/{}/WarInfo", war_id));
        debug!(route = ROUTE_WAR_INFO, %url, "Fetching war info");
        self.execute(ROUTE_WAR_INFO, self.client.get(&url)).await
    }

    async fn war_stats(&self, war_id: WarId) -> Result<ApiResponse<WarStatistics>> {
        let url = self.url(&format!("/Stats/war/{}/summary", war_id));
        debug!(route = ROUTE_WAR_STATS, %url, "Fetching war stats");
        self.execute(ROUTE_WAR_STATS, self.client.get(&url)).await
    }

    async fn news_feed(
        &self,
        war_id: WarId,
        from_timestamp: i64,
        language: &str,
    ) -> Result<ApiResponse<Vec<NewsItem>>> {
        let url = self.url(&format!("/NewsFeed/{}", war_id));
        debug!(route = ROUTE_NEWS_FEED, %url, from_timestamp, language, "Fetching news feed");
        let request = self
            .client
            .get(&url)
            .query(&[("fromTimestamp", from_timestamp)])
            .header(ACCEPT_LANGUAGE, language);
        self.execute(ROUTE_NEWS_FEED, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio_test::{assert_err, assert_ok};
    use warp::Filter;

    #[derive(Debug, Clone, PartialEq)]
    struct SeenRequest {
        war_id: i32,
        query: String,
        language: Option<String>,
    }

    /// Local stand-in for the upstream news feed that records what it receives
    fn spawn_news_feed(body: &'static str) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();

        let route = warp::get()
            .and(warp::path!("api" / "NewsFeed" / i32))
            .and(warp::query::raw())
            .and(warp::header::optional::<String>("accept-language"))
            .map(move |war_id: i32, query: String, language: Option<String>| {
                recorder.lock().unwrap().push(SeenRequest { war_id, query, language });
                warp::reply::with_header(body, "content-type", "application/json")
            });

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        (addr, seen)
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let api = HttpWarApi::new("https://example.com/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base_url(), "https://example.com/api");
        assert_eq!(api.url("/WarSeason/801/Status"), "https://example.com/api/WarSeason/801/Status");
    }

    #[test]
    fn test_new_rejects_non_http_url() {
        let err = HttpWarApi::new("ftp://example.com", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
        assert_eq!(err.route(), None);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let api = HttpWarApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = api.war_status(801).await.unwrap_err();
        assert_eq!(err.route(), Some(ROUTE_WAR_STATUS));
        assert!(matches!(err, ClientError::Transport { .. } | ClientError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_news_feed_request_on_the_wire() {
        let (addr, seen) = spawn_news_feed(
            r#"[{"id": 9, "published": 4300, "type": 0, "tagIds": [], "message": "hold the line"}]"#,
        );
        let api = HttpWarApi::new(&format!("http://{}/api/", addr), Duration::from_secs(5)).unwrap();

        let response = assert_ok!(api.news_feed(801, 4243, "fr-FR").await);

        assert_eq!(response.route, ROUTE_NEWS_FEED);
        assert_eq!(response.status, 200);
        let items = assert_ok!(response.into_result());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].published, 4300);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![SeenRequest {
                war_id: 801,
                query: "fromTimestamp=4243".to_string(),
                language: Some("fr-FR".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_non_200_is_returned_without_body() {
        let (addr, _seen) = spawn_news_feed("[]");
        let api = HttpWarApi::new(&format!("http://{}/api", addr), Duration::from_secs(5)).unwrap();

        // Only the news feed is served; the status route answers 404.
        let response = assert_ok!(api.war_status(801).await);

        assert_eq!(response.status, 404);
        assert!(response.body.is_none());
        let err = assert_err!(response.into_result());
        assert!(matches!(err, ClientError::UnexpectedStatus { status: 404, .. }));
    }
}
