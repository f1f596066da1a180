//! Helldivers 2 war API client
//!
//! Typed access to the four read endpoints both services rely on: season
//! status, season info, war statistics and the news feed.

pub mod client;
pub mod error;
pub mod models;

pub use client::{
    HttpWarApi, WarApi, DEFAULT_API_URL, ROUTE_NEWS_FEED, ROUTE_WAR_INFO, ROUTE_WAR_STATS,
    ROUTE_WAR_STATUS,
};
pub use error::{ClientError, Result};
pub use models::*;
