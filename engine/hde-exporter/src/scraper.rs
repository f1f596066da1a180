//! Periodic scrape of the war API into the metrics registry

use hde_client::{
    ApiResponse, PlanetIndex, WarApi, WarId, WarSeasonInfo, WarSeasonStatus, WarStatistics,
    ROUTE_WAR_INFO, ROUTE_WAR_STATS, ROUTE_WAR_STATUS,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{ExporterError, Result};
use crate::registry::{
    MetricsRegistry, PLANET_HEALTH, PLANET_MAX_HEALTH, PLANET_PLAYERS, PLANET_REGEN_RATE,
    STAT_GAUGES,
};
use crate::planets::PlanetNames;

/// The three resources one scrape reads
#[derive(Debug, Clone, Default)]
pub struct WarSnapshot {
    pub status: WarSeasonStatus,
    pub info: WarSeasonInfo,
    pub stats: WarStatistics,
}

/// What a successful scrape published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Planet entries published across the three resources
    pub planet_entries: usize,
    /// Planet entries skipped because their index has no name
    pub unknown_planets: usize,
}

pub struct Scraper {
    api: Arc<dyn WarApi>,
    registry: Arc<MetricsRegistry>,
    planets: PlanetNames,
    war_id: WarId,
    request_timeout: Duration,
}

impl Scraper {
    pub fn new(
        api: Arc<dyn WarApi>,
        registry: Arc<MetricsRegistry>,
        planets: PlanetNames,
        war_id: WarId,
        request_timeout: Duration,
    ) -> Self {
        Self { api, registry, planets, war_id, request_timeout }
    }

    /// Fetch the war status, info and statistics and publish them.
    ///
    /// Any failed request aborts the scrape before a single gauge is
    /// touched, so the registry keeps the values of the last good scrape.
    pub async fn scrape(&self) -> Result<ScrapeReport> {
        info!(war_id = self.war_id, "Performing scrape");
        let snapshot = self.fetch().await?;
        let report = self.publish(&snapshot);
        debug!(
            war_id = self.war_id,
            planet_entries = report.planet_entries,
            unknown_planets = report.unknown_planets,
            "Scrape published"
        );
        Ok(report)
    }

    /// Fetch the three resources in order under a single deadline
    pub async fn fetch(&self) -> Result<WarSnapshot> {
        let deadline = Instant::now() + self.request_timeout;
        let war_id = self.war_id;

        let status = self.call(ROUTE_WAR_STATUS, deadline, self.api.war_status(war_id)).await?;
        let info = self.call(ROUTE_WAR_INFO, deadline, self.api.war_info(war_id)).await?;
        let stats = self.call(ROUTE_WAR_STATS, deadline, self.api.war_stats(war_id)).await?;

        Ok(WarSnapshot { status, info, stats })
    }

    async fn call<T, F>(&self, route: &'static str, deadline: Instant, request: F) -> Result<T>
    where
        F: Future<Output = hde_client::Result<ApiResponse<T>>>,
    {
        let started = Instant::now();
        let outcome = timeout_at(deadline, request).await;
        let elapsed = started.elapsed();

        let response = match outcome {
            Err(_) => {
                self.registry.record_request(route, elapsed, None);
                let timeout_secs = self.request_timeout.as_secs_f64();
                error!(route, timeout_secs, "Scrape deadline exceeded");
                return Err(ExporterError::Timeout(self.request_timeout));
            }
            Ok(Err(e)) => {
                self.registry.record_request(route, elapsed, None);
                error!(route, error = %e, "Error fetching");
                return Err(e.into());
            }
            Ok(Ok(response)) => response,
        };

        self.registry.record_request(route, elapsed, Some(response.status));
        if !response.is_success() {
            error!(route, code = response.status, "Error code while fetching");
        }
        Ok(response.into_result()?)
    }

    fn planet_name(&self, index: PlanetIndex) -> Option<&str> {
        let name = self.planets.get(index);
        if name.is_none() {
            warn!(planet_id = index, "Unknown planet");
        }
        name
    }

    /// Write a snapshot into the registry
    pub fn publish(&self, snapshot: &WarSnapshot) -> ScrapeReport {
        let mut report = ScrapeReport::default();
        let galaxy = &snapshot.stats.galaxy_stats;

        for stat in STAT_GAUGES {
            self.registry.set_gauge(stat.galaxy_name(), &[], (stat.value)(galaxy));
        }

        for planet in &snapshot.stats.planets_stats {
            let Some(name) = self.planet_name(planet.planet_index) else {
                report.unknown_planets += 1;
                continue;
            };
            for stat in STAT_GAUGES {
                let value = (stat.value)(&planet.stats);
                self.registry.set_gauge(stat.planet_name(), &[("planet", name)], value);
            }
            report.planet_entries += 1;
        }

        for planet in &snapshot.info.planet_infos {
            let Some(name) = self.planet_name(planet.index) else {
                report.unknown_planets += 1;
                continue;
            };
            let max_health = planet.max_health as f64;
            self.registry.set_gauge(PLANET_MAX_HEALTH, &[("planet", name)], max_health);
            report.planet_entries += 1;
        }

        for planet in &snapshot.status.planet_status {
            let Some(name) = self.planet_name(planet.index) else {
                report.unknown_planets += 1;
                continue;
            };
            let labels = [("planet", name)];
            self.registry.set_gauge(PLANET_HEALTH, &labels, planet.health as f64);
            self.registry.set_gauge(PLANET_PLAYERS, &labels, planet.players as f64);
            self.registry.set_gauge(PLANET_REGEN_RATE, &labels, planet.regen_per_second);
            report.planet_entries += 1;
        }

        report
    }
}
