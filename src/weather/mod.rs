//! Weather observation feeds
//!
//! A [`FeedFetcher`] retrieves the latest observations for the tracked stations.
//! The production implementation reads the Estonian Environment Agency XML feed.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::Result;
use crate::models::WeatherObservation;

pub mod ilmateenistus;

pub use ilmateenistus::{IlmateenistusFeed, parse_feed};

/// Source of fresh observations for one refresh cycle.
///
/// Implementations either return every tracked station found in the feed or fail
/// the whole cycle; partial results are never returned.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Vec<WeatherObservation>>;
}

/// Upper-cased set of station names to keep from a feed
#[derive(Debug, Clone, Default)]
pub struct StationAllowList {
    stations: HashSet<String>,
}

impl StationAllowList {
    pub fn new<I, S>(stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stations: stations
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .collect(),
        }
    }

    /// `name` must already be upper-cased
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.stations.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
