//! Explicit Prometheus registry for the exporter
//!
//! The recorder is built without being installed as the process-wide
//! `metrics` recorder, so every test can own an isolated registry.

use hde_client::StatSummary;
use metrics::{Key, KeyName, Label, Recorder, SharedString};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::time::Duration;

use crate::error::Result;

pub const API_REQUEST_DURATION: &str = "hde_api_request_duration";
pub const API_REQUEST_STATUS: &str = "hde_api_request_status";
pub const BUILD_INFO: &str = "hde_build_info";
pub const PLANET_HEALTH: &str = "hde_planet_health";
pub const PLANET_MAX_HEALTH: &str = "hde_planet_max_health";
pub const PLANET_PLAYERS: &str = "hde_planet_players";
pub const PLANET_REGEN_RATE: &str = "hde_planet_regen_rate";

pub const GALAXY_PREFIX: &str = "hde_galaxy_";
pub const PLANET_PREFIX: &str = "hde_planet_";

/// Request duration buckets, in seconds
pub const REQUEST_DURATION_BUCKETS: &[f64] =
    &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// One statistic published both galaxy-wide and per planet
pub struct StatGauge {
    pub suffix: &'static str,
    pub help: &'static str,
    pub value: fn(&StatSummary) -> f64,
}

impl StatGauge {
    pub fn galaxy_name(&self) -> String {
        format!("{}{}", GALAXY_PREFIX, self.suffix)
    }

    pub fn planet_name(&self) -> String {
        format!("{}{}", PLANET_PREFIX, self.suffix)
    }
}

const fn stat(
    suffix: &'static str,
    help: &'static str,
    value: fn(&StatSummary) -> f64,
) -> StatGauge {
    StatGauge { suffix, help, value }
}

pub static STAT_GAUGES: &[StatGauge] = &[
    stat("missions_won", "Number of missions won", |s| s.missions_won as f64),
    stat("missions_lost", "Number of missions lost", |s| s.missions_lost as f64),
    stat("mission_time", "Time spent on missions", |s| s.mission_time as f64),
    stat("bug_kills", "Number of bug kills", |s| s.bug_kills as f64),
    stat("automaton_kills", "Number of automaton kills", |s| s.automaton_kills as f64),
    stat("illuminate_kills", "Number of illuminate kills", |s| s.illuminate_kills as f64),
    stat("bullets_fired", "Number of bullets fired", |s| s.bullets_fired as f64),
    stat("bullets_hit", "Number of bullets hit", |s| s.bullets_hit as f64),
    stat("time_played", "Time played", |s| s.time_played as f64),
    stat("deaths", "Number of deaths", |s| s.deaths as f64),
    stat("revives", "Number of revives", |s| s.revives as f64),
    stat("friendlies", "Number of friendly fire incidents", |s| s.friendlies as f64),
    stat("mission_success_rate", "Mission success rate", |s| s.mission_success_rate),
    stat("accuracy", "Accuracy", |s| s.accuracy),
];

fn key(name: impl Into<KeyName>, labels: &[(&'static str, &str)]) -> Key {
    let labels: Vec<Label> =
        labels.iter().map(|(k, v)| Label::new(*k, v.to_string())).collect();
    Key::from_parts(name, labels)
}

/// Registry shared by the scraper and the HTTP handler
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Build the registry and describe every metric family
    pub fn new() -> Result<Self> {
        let recorder = PrometheusBuilder::new()
            .set_buckets(REQUEST_DURATION_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        let registry = Self { recorder, handle };
        registry.describe();
        Ok(registry)
    }

    fn describe(&self) {
        let gauge = |name: String, help: String| {
            self.recorder.describe_gauge(KeyName::from(name), None, SharedString::from(help));
        };

        gauge(PLANET_HEALTH.to_string(), "Health of the planet".to_string());
        gauge(PLANET_MAX_HEALTH.to_string(), "Max health of the planet".to_string());
        gauge(PLANET_PLAYERS.to_string(), "Number of players on the planet".to_string());
        gauge(PLANET_REGEN_RATE.to_string(), "Regen rate of the planet".to_string());
        gauge(BUILD_INFO.to_string(), "Build information of the exporter".to_string());

        for stat in STAT_GAUGES {
            gauge(stat.galaxy_name(), format!("{} in the galaxy", stat.help));
            gauge(stat.planet_name(), format!("{} on the planet", stat.help));
        }

        self.recorder.describe_histogram(
            KeyName::from(API_REQUEST_DURATION),
            None,
            SharedString::from("Duration of the api request"),
        );
        self.recorder.describe_counter(
            KeyName::from(API_REQUEST_STATUS),
            None,
            SharedString::from("Status of the api request"),
        );
    }

    pub fn set_gauge(&self, name: impl Into<KeyName>, labels: &[(&'static str, &str)], value: f64) {
        self.recorder.register_gauge(&key(name, labels)).set(value);
    }

    pub fn increment_counter(&self, name: impl Into<KeyName>, labels: &[(&'static str, &str)]) {
        self.recorder.register_counter(&key(name, labels)).increment(1);
    }

    pub fn observe(&self, name: impl Into<KeyName>, labels: &[(&'static str, &str)], value: f64) {
        self.recorder.register_histogram(&key(name, labels)).record(value);
    }

    /// Record one API call; `status` is `None` when no response came back
    pub fn record_request(&self, route: &'static str, elapsed: Duration, status: Option<u16>) {
        self.observe(API_REQUEST_DURATION, &[("route", route)], elapsed.as_secs_f64());
        if let Some(status) = status {
            let status = status.to_string();
            let labels = [("route", route), ("status", status.as_str())];
            self.increment_counter(API_REQUEST_STATUS, &labels);
        }
    }

    pub fn set_build_info(&self, version: &str, collector: &str) {
        self.set_gauge(BUILD_INFO, &[("version", version), ("collector", collector)], 1.0);
    }

    /// Current registry contents in the Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Value of the `name` sample carrying every label in `labels`
#[cfg(test)]
pub(crate) fn sample(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    rendered.lines().filter(|line| !line.starts_with('#')).find_map(|line| {
        let (series, value) = line.rsplit_once(' ')?;
        let metric = series.split('{').next()?;
        let matches = metric == name
            && labels.iter().all(|(k, v)| series.contains(&format!("{}=\"{}\"", k, v)));
        if matches {
            value.parse().ok()
        } else {
            None
        }
    })
}
