//! Scrape tests against a canned war API

use async_trait::async_trait;
use hde_client::{
    ApiResponse, ClientError, NewsItem, PlanetInfo, PlanetStats, PlanetStatus, StatSummary,
    WarApi, WarId, WarSeasonInfo, WarSeasonStatus, WarStatistics, ROUTE_NEWS_FEED,
    ROUTE_WAR_INFO, ROUTE_WAR_STATS, ROUTE_WAR_STATUS,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_err;

use crate::error::ExporterError;
use crate::planets::PlanetNames;
use crate::registry::{sample, MetricsRegistry, API_REQUEST_STATUS};
use crate::scraper::{ScrapeReport, Scraper};

const WAR: WarId = 801;

#[derive(Clone)]
enum Reply<T> {
    Ok(T),
    Status(u16),
    Unreachable,
    Slow(Duration, T),
}

impl<T> Reply<T> {
    async fn respond(self, route: &'static str) -> hde_client::Result<ApiResponse<T>> {
        let (status, body) = match self {
            Reply::Ok(body) => (200, Some(body)),
            Reply::Status(code) => (code, None),
            Reply::Unreachable => return Err(ClientError::Timeout { route }),
            Reply::Slow(delay, body) => {
                tokio::time::sleep(delay).await;
                (200, Some(body))
            }
        };
        Ok(ApiResponse { route, status, elapsed: Duration::ZERO, body })
    }
}

/// War API double serving one canned reply per route
struct CannedWarApi {
    status: Mutex<Reply<WarSeasonStatus>>,
    info: Mutex<Reply<WarSeasonInfo>>,
    stats: Mutex<Reply<WarStatistics>>,
    calls: Mutex<Vec<&'static str>>,
}

impl CannedWarApi {
    fn healthy() -> Self {
        Self {
            status: Mutex::new(Reply::Ok(war_status())),
            info: Mutex::new(Reply::Ok(war_info())),
            stats: Mutex::new(Reply::Ok(war_stats())),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarApi for CannedWarApi {
    async fn war_status(&self, _war_id: WarId) -> hde_client::Result<ApiResponse<WarSeasonStatus>> {
        self.calls.lock().unwrap().push(ROUTE_WAR_STATUS);
        let reply = self.status.lock().unwrap().clone();
        reply.respond(ROUTE_WAR_STATUS).await
    }

    async fn war_info(&self, _war_id: WarId) -> hde_client::Result<ApiResponse<WarSeasonInfo>> {
        self.calls.lock().unwrap().push(ROUTE_WAR_INFO);
        let reply = self.info.lock().unwrap().clone();
        reply.respond(ROUTE_WAR_INFO).await
    }

    async fn war_stats(&self, _war_id: WarId) -> hde_client::Result<ApiResponse<WarStatistics>> {
        self.calls.lock().unwrap().push(ROUTE_WAR_STATS);
        let reply = self.stats.lock().unwrap().clone();
        reply.respond(ROUTE_WAR_STATS).await
    }

    async fn news_feed(
        &self,
        _war_id: WarId,
        _from_timestamp: i64,
        _language: &str,
    ) -> hde_client::Result<ApiResponse<Vec<NewsItem>>> {
        Reply::Status(404).respond(ROUTE_NEWS_FEED).await
    }
}

fn war_status() -> WarSeasonStatus {
    WarSeasonStatus {
        war_id: WAR,
        time: 1000,
        planet_status: vec![
            PlanetStatus {
                index: 126,
                owner: 2,
                health: 750000,
                regen_per_second: 1.5,
                players: 12000,
            },
            PlanetStatus { index: 9999, owner: 3, health: 1, regen_per_second: 0.0, players: 1 },
        ],
    }
}

fn war_info() -> WarSeasonInfo {
    WarSeasonInfo {
        war_id: WAR,
        planet_infos: vec![PlanetInfo { index: 126, max_health: 1000000, ..Default::default() }],
        ..Default::default()
    }
}

fn war_stats() -> WarStatistics {
    WarStatistics {
        galaxy_stats: StatSummary {
            missions_won: 500,
            deaths: 80,
            accuracy: 0.61,
            ..Default::default()
        },
        planets_stats: vec![PlanetStats {
            planet_index: 126,
            stats: StatSummary { bug_kills: 0, automaton_kills: 3400, ..Default::default() },
        }],
    }
}

fn scraper(api: Arc<CannedWarApi>, registry: Arc<MetricsRegistry>) -> Scraper {
    let planets = PlanetNames::new(HashMap::from([
        (0, "Super Earth".to_string()),
        (126, "Malevelon Creek".to_string()),
    ]));
    Scraper::new(api, registry, planets, WAR, Duration::from_secs(5))
}

fn setup() -> (Arc<CannedWarApi>, Arc<MetricsRegistry>, Scraper) {
    let api = Arc::new(CannedWarApi::healthy());
    let registry = Arc::new(MetricsRegistry::new().unwrap());
    let scraper = scraper(api.clone(), registry.clone());
    (api, registry, scraper)
}

const CREEK: &[(&str, &str)] = &[("planet", "Malevelon Creek")];

#[tokio::test]
async fn test_scrape_publishes_every_family() {
    let (api, registry, scraper) = setup();

    scraper.scrape().await.unwrap();

    let rendered = registry.render();
    assert_eq!(sample(&rendered, "hde_galaxy_missions_won", &[]), Some(500.0));
    assert_eq!(sample(&rendered, "hde_galaxy_deaths", &[]), Some(80.0));
    assert_eq!(sample(&rendered, "hde_galaxy_accuracy", &[]), Some(0.61));
    assert_eq!(sample(&rendered, "hde_planet_automaton_kills", CREEK), Some(3400.0));
    assert_eq!(sample(&rendered, "hde_planet_bug_kills", CREEK), Some(0.0));
    assert_eq!(sample(&rendered, "hde_planet_health", CREEK), Some(750000.0));
    assert_eq!(sample(&rendered, "hde_planet_players", CREEK), Some(12000.0));
    assert_eq!(sample(&rendered, "hde_planet_regen_rate", CREEK), Some(1.5));
    assert_eq!(sample(&rendered, "hde_planet_max_health", CREEK), Some(1000000.0));
    assert_eq!(api.calls(), vec![ROUTE_WAR_STATUS, ROUTE_WAR_INFO, ROUTE_WAR_STATS]);

    for route in [ROUTE_WAR_STATUS, ROUTE_WAR_INFO, ROUTE_WAR_STATS] {
        let labels = [("route", route), ("status", "200")];
        assert_eq!(sample(&rendered, API_REQUEST_STATUS, &labels), Some(1.0));
    }
}

#[tokio::test]
async fn test_unknown_planet_is_skipped() {
    let (_api, registry, scraper) = setup();

    let report = scraper.scrape().await.unwrap();

    assert_eq!(report, ScrapeReport { planet_entries: 3, unknown_planets: 1 });
    let rendered = registry.render();
    let health_series = rendered.lines().filter(|l| l.starts_with("hde_planet_health{")).count();
    assert_eq!(health_series, 1);
    assert_eq!(sample(&rendered, "hde_planet_health", CREEK), Some(750000.0));
}

#[tokio::test]
async fn test_non_200_publishes_nothing() {
    let (api, registry, scraper) = setup();
    *api.info.lock().unwrap() = Reply::Status(503);

    let err = assert_err!(scraper.scrape().await);

    assert!(matches!(
        err,
        ExporterError::Upstream(ClientError::UnexpectedStatus { status: 503, .. })
    ));
    assert_eq!(api.calls(), vec![ROUTE_WAR_STATUS, ROUTE_WAR_INFO]);

    let rendered = registry.render();
    assert_eq!(sample(&rendered, "hde_galaxy_missions_won", &[]), None);
    assert_eq!(sample(&rendered, "hde_planet_health", CREEK), None);
    let labels = [("route", ROUTE_WAR_INFO), ("status", "503")];
    assert_eq!(sample(&rendered, API_REQUEST_STATUS, &labels), Some(1.0));
}

#[tokio::test]
async fn test_failed_scrape_keeps_previous_values() {
    let (api, registry, scraper) = setup();
    scraper.scrape().await.unwrap();

    let mut stats = war_stats();
    stats.galaxy_stats.missions_won = 9000;
    *api.stats.lock().unwrap() = Reply::Ok(stats);
    *api.status.lock().unwrap() = Reply::Status(500);

    assert!(scraper.scrape().await.is_err());
    assert_eq!(sample(&registry.render(), "hde_galaxy_missions_won", &[]), Some(500.0));
}

#[tokio::test]
async fn test_transport_error_is_observed_without_status() {
    let (api, registry, scraper) = setup();
    *api.status.lock().unwrap() = Reply::Unreachable;

    let err = assert_err!(scraper.scrape().await);

    assert!(matches!(err, ExporterError::Upstream(ClientError::Timeout { .. })));
    let rendered = registry.render();
    let route = [("route", ROUTE_WAR_STATUS)];
    assert_eq!(sample(&rendered, "hde_api_request_duration_count", &route), Some(1.0));
    assert_eq!(sample(&rendered, API_REQUEST_STATUS, &route), None);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_covers_the_whole_scrape() {
    let (api, registry, scraper) = setup();
    *api.info.lock().unwrap() = Reply::Slow(Duration::from_secs(3), war_info());
    *api.stats.lock().unwrap() = Reply::Slow(Duration::from_secs(3), war_stats());

    let err = assert_err!(scraper.scrape().await);

    assert!(matches!(err, ExporterError::Timeout(d) if d == Duration::from_secs(5)));
    let rendered = registry.render();
    let stats_route = [("route", ROUTE_WAR_STATS)];
    assert_eq!(sample(&rendered, "hde_api_request_duration_count", &stats_route), Some(1.0));
    assert_eq!(sample(&rendered, API_REQUEST_STATUS, &stats_route), None);
    assert_eq!(sample(&rendered, "hde_galaxy_missions_won", &[]), None);
}
