//! Integration tests for the refresh → store → fee pipeline

use std::sync::Arc;

use async_trait::async_trait;
use chrono_tz::Tz;
use parking_lot::Mutex;

use deliveryfee::weather::parse_feed;
use deliveryfee::{
    AppState, CycleOutcome, DeliveryFeeConfig, DeliveryFeeError, FeeQuote, FeedFetcher,
    StationAllowList, VehicleType, WeatherObservation,
};

const COLD_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<observations timestamp="1678738197">
    <station>
        <name>Tallinn-Harku</name>
        <wmocode>26038</wmocode>
        <phenomenon>Clear</phenomenon>
        <airtemperature>-11.0</airtemperature>
        <windspeed>5.0</windspeed>
    </station>
    <station>
        <name>Pärnu</name>
        <wmocode>41803</wmocode>
        <phenomenon>Light rain</phenomenon>
        <airtemperature>2.4</airtemperature>
        <windspeed>14.1</windspeed>
    </station>
    <station>
        <name>Narva</name>
        <wmocode>26058</wmocode>
        <phenomenon>Hail</phenomenon>
        <airtemperature>-1.0</airtemperature>
        <windspeed>30.0</windspeed>
    </station>
</observations>"#;

const STORM_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<observations timestamp="1678741797">
    <station>
        <name>Tallinn-Harku</name>
        <wmocode>26038</wmocode>
        <phenomenon>Thunder</phenomenon>
        <airtemperature>3.0</airtemperature>
        <windspeed>8.0</windspeed>
    </station>
</observations>"#;

/// Serves queued XML documents, then fails once the queue is empty
struct QueuedXmlFeed {
    documents: Mutex<Vec<&'static str>>,
    stations: StationAllowList,
}

impl QueuedXmlFeed {
    fn new(documents: Vec<&'static str>) -> Self {
        Self {
            documents: Mutex::new(documents.into_iter().rev().collect()),
            stations: StationAllowList::new(DeliveryFeeConfig::default().weather.stations),
        }
    }
}

#[async_trait]
impl FeedFetcher for QueuedXmlFeed {
    async fn fetch(&self) -> deliveryfee::Result<Vec<WeatherObservation>> {
        let document = self
            .documents
            .lock()
            .pop()
            .ok_or_else(|| DeliveryFeeError::fetch("connection refused"))?;
        parse_feed(document, &self.stations, Tz::Europe__Tallinn)
    }
}

fn app(documents: Vec<&'static str>) -> AppState {
    AppState::with_fetcher(
        &DeliveryFeeConfig::default(),
        Arc::new(QueuedXmlFeed::new(documents)),
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn test_cold_bike_delivery_in_tallinn() {
    let app = app(vec![COLD_FEED]);
    assert_eq!(
        app.scheduler.refresh_now().await,
        CycleOutcome::Updated { stations: 2 }
    );

    let quote = app.service.compute_fee(VehicleType::Bike, "TALLINN").unwrap();
    let FeeQuote::Breakdown(breakdown) = quote else {
        panic!("expected a breakdown");
    };
    assert_eq!(breakdown.station_name, "TALLINN-HARKU");
    assert_eq!(breakdown.regional_base_fee, 3.0);
    assert_eq!(breakdown.air_temperature_fee, 1.0);
    assert_eq!(breakdown.wind_speed_fee, 0.0);
    assert_eq!(breakdown.weather_phenomenon_fee, 0.0);
    assert_eq!(breakdown.total, 4.0);
    assert_eq!(breakdown.observation_timestamp, "2023-03-13 22:09:57 PM");
}

#[tokio::test]
async fn test_rainy_windy_parnu() {
    let app = app(vec![COLD_FEED]);
    app.scheduler.refresh_now().await;

    // 2.0 + 0 + 0.5 + 0.5
    assert_eq!(app.service.quote("bike", "Pärnu").unwrap().total(), Some(3.0));
    // 2.5 + 0 + 0 + 0.5
    assert_eq!(app.service.quote("scooter", "pärnu").unwrap().total(), Some(3.0));
    assert_eq!(app.service.quote("car", "PÄRNU").unwrap().total(), Some(3.0));
}

#[tokio::test]
async fn test_untracked_and_unrefreshed_locations() {
    let app = app(vec![COLD_FEED]);
    app.scheduler.refresh_now().await;

    // Tartu's station was absent from the feed
    let err = app.service.compute_fee(VehicleType::Car, "Tartu").unwrap_err();
    assert!(matches!(err, DeliveryFeeError::NotFound { .. }));

    // Narva is in the feed but neither tracked nor mapped
    assert!(app.store.latest_for_station("NARVA").is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_observations() {
    let app = app(vec![COLD_FEED]);
    app.scheduler.refresh_now().await;

    let outcome = app.scheduler.refresh_now().await;
    assert!(matches!(outcome, CycleOutcome::Failed { .. }));

    let observation = app.store.latest_for("Tallinn").unwrap();
    assert_eq!(observation.air_temperature, -11.0);
}

#[tokio::test]
async fn test_thunder_replaces_previous_cycle() {
    let app = app(vec![COLD_FEED, STORM_FEED]);
    app.scheduler.refresh_now().await;
    app.scheduler.refresh_now().await;

    let quote = app.service.compute_fee(VehicleType::Scooter, "Tallinn").unwrap();
    assert_eq!(
        quote,
        FeeQuote::Forbidden {
            message: "Usage of selected vehicle type is forbidden".to_string()
        }
    );
    assert_eq!(
        app.service.compute_fee(VehicleType::Car, "Tallinn").unwrap().total(),
        Some(4.0)
    );

    // Pärnu was not in the storm feed and keeps the earlier reading
    let parnu = app.store.latest_for("Pärnu").unwrap();
    assert_eq!(parnu.phenomenon, "Light rain");
}
