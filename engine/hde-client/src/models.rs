use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ClientError, Result};

/// War identifier used by the upstream API (e.g. 801)
pub type WarId = i32;

/// Planet index as reported by the upstream API
pub type PlanetIndex = i32;

/// Single entry of the in-game news feed
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: i64,

    /// Publication time, in war-time seconds
    pub published: i64,

    #[serde(rename = "type", default)]
    pub kind: i32,

    #[serde(default)]
    pub tag_ids: Vec<i32>,

    #[serde(default)]
    pub message: String,
}

/// Live status of the war season
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarSeasonStatus {
    #[serde(default)]
    pub war_id: WarId,

    #[serde(default)]
    pub time: i64,

    #[serde(default)]
    pub planet_status: Vec<PlanetStatus>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanetStatus {
    pub index: PlanetIndex,

    #[serde(default)]
    pub owner: i32,

    #[serde(default)]
    pub health: i64,

    #[serde(default)]
    pub regen_per_second: f64,

    #[serde(default)]
    pub players: i64,
}

/// Static description of the war season
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarSeasonInfo {
    #[serde(default)]
    pub war_id: WarId,

    #[serde(default)]
    pub start_date: i64,

    #[serde(default)]
    pub end_date: i64,

    #[serde(default)]
    pub planet_infos: Vec<PlanetInfo>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanetInfo {
    pub index: PlanetIndex,

    #[serde(default)]
    pub max_health: i64,

    #[serde(default)]
    pub sector: i32,

    #[serde(default)]
    pub initial_owner: i32,

    #[serde(default)]
    pub disabled: bool,
}

/// Aggregated war statistics, for the whole galaxy and per planet
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct WarStatistics {
    #[serde(default)]
    pub galaxy_stats: StatSummary,

    #[serde(default)]
    pub planets_stats: Vec<PlanetStats>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanetStats {
    pub planet_index: PlanetIndex,

    #[serde(flatten)]
    pub stats: StatSummary,
}

/// Counters shared by the galaxy-wide and per-planet statistics
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StatSummary {
    pub missions_won: u64,
    pub missions_lost: u64,
    pub mission_time: u64,
    pub bug_kills: u64,
    pub automaton_kills: u64,
    pub illuminate_kills: u64,
    pub bullets_fired: u64,
    pub bullets_hit: u64,
    pub time_played: u64,
    pub deaths: u64,
    pub revives: u64,
    pub friendlies: u64,
    pub mission_success_rate: f64,

    // The live API spells it "accurracy".
    #[serde(alias = "accurracy")]
    pub accuracy: f64,
}

/// Raw outcome of one API call: status and timing are always present, the
/// body only when the upstream answered 200.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub route: &'static str,
    pub status: u16,
    pub elapsed: Duration,
    pub body: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Turn the response into its body, failing on anything but a 200
    pub fn into_result(self) -> Result<T> {
        if !self.is_success() {
            return Err(ClientError::UnexpectedStatus { route: self.route, status: self.status });
        }
        self.body.ok_or(ClientError::EmptyBody { route: self.route })
    }
}
