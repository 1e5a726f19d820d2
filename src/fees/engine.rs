use super::phenomenon::FORBIDDEN_PHENOMENA;
use super::{FeeOutcome, FeeSchedule, PhenomenonCategory, PhenomenonTaxonomy};
use crate::Result;
use crate::models::VehicleType;

/// Pure fee rules plus the tables they read from
#[derive(Debug, Default)]
pub struct FeeEngine {
    schedule: FeeSchedule,
    taxonomy: PhenomenonTaxonomy,
}

impl FeeEngine {
    #[must_use]
    pub fn new(schedule: FeeSchedule, taxonomy: PhenomenonTaxonomy) -> Self {
        Self { schedule, taxonomy }
    }

    #[must_use]
    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    /// RBF
    pub fn regional_base_fee(&self, vehicle: VehicleType, location: &str) -> Result<f64> {
        self.schedule.get(vehicle, location)
    }

    /// ATEF: below -10 °C costs 1.0, -10..=0 °C costs 0.5, open-air vehicles only
    #[must_use]
    pub fn air_temperature_fee(temperature: f64, vehicle: VehicleType) -> f64 {
        if !vehicle.is_open_air() {
            return 0.0;
        }
        if temperature < -10.0 {
            1.0
        } else if temperature <= 0.0 {
            0.5
        } else {
            0.0
        }
    }

    /// WSEF: bikes pay 0.5 for 10..=20 m/s and are forbidden above 20 m/s
    #[must_use]
    pub fn wind_speed_fee(wind_speed: f64, vehicle: VehicleType) -> FeeOutcome {
        if vehicle != VehicleType::Bike {
            return FeeOutcome::Fee(0.0);
        }
        if wind_speed > 20.0 {
            FeeOutcome::Forbidden
        } else if wind_speed >= 10.0 {
            FeeOutcome::Fee(0.5)
        } else {
            FeeOutcome::Fee(0.0)
        }
    }

    /// WPEF: snow or sleet 1.0, rain 0.5, glaze/hail/thunder forbidden, open-air vehicles only
    #[must_use]
    pub fn weather_phenomenon_fee(&self, phenomenon: &str, vehicle: VehicleType) -> FeeOutcome {
        if !vehicle.is_open_air() {
            return FeeOutcome::Fee(0.0);
        }

        let phenomenon = phenomenon.to_lowercase();
        if FORBIDDEN_PHENOMENA.contains(&phenomenon.as_str()) {
            return FeeOutcome::Forbidden;
        }

        match self.taxonomy.category_of(&phenomenon) {
            Some(PhenomenonCategory::Snow | PhenomenonCategory::Sleet) => FeeOutcome::Fee(1.0),
            Some(PhenomenonCategory::Rain) => FeeOutcome::Fee(0.5),
            None => FeeOutcome::Fee(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn engine() -> FeeEngine {
        FeeEngine::new(FeeSchedule::new(), PhenomenonTaxonomy::default())
    }

    #[rstest]
    #[case(-11.0)]
    #[case(-10.0)]
    #[case(-9.0)]
    #[case(0.0)]
    #[case(5.0)]
    fn test_air_temperature_fee_is_zero_for_car(#[case] temperature: f64) {
        assert_eq!(FeeEngine::air_temperature_fee(temperature, VehicleType::Car), 0.0);
    }

    #[rstest]
    #[case(-11.0, 1.0)]
    #[case(-10.1, 1.0)]
    #[case(-10.0, 0.5)]
    #[case(-5.0, 0.5)]
    #[case(-0.0, 0.5)]
    #[case(0.0, 0.5)]
    #[case(0.1, 0.0)]
    #[case(21.0, 0.0)]
    fn test_air_temperature_fee_open_air(#[case] temperature: f64, #[case] expected: f64) {
        assert_eq!(FeeEngine::air_temperature_fee(temperature, VehicleType::Bike), expected);
        assert_eq!(FeeEngine::air_temperature_fee(temperature, VehicleType::Scooter), expected);
    }

    #[rstest]
    #[case(9.0)]
    #[case(10.0)]
    #[case(20.0)]
    #[case(21.0)]
    fn test_wind_speed_fee_is_zero_unless_bike(#[case] wind_speed: f64) {
        assert_eq!(FeeEngine::wind_speed_fee(wind_speed, VehicleType::Car), FeeOutcome::Fee(0.0));
        assert_eq!(FeeEngine::wind_speed_fee(wind_speed, VehicleType::Scooter), FeeOutcome::Fee(0.0));
    }

    #[rstest]
    #[case(0.0, FeeOutcome::Fee(0.0))]
    #[case(9.9, FeeOutcome::Fee(0.0))]
    #[case(10.0, FeeOutcome::Fee(0.5))]
    #[case(15.0, FeeOutcome::Fee(0.5))]
    #[case(20.0, FeeOutcome::Fee(0.5))]
    #[case(20.1, FeeOutcome::Forbidden)]
    fn test_wind_speed_fee_for_bike(#[case] wind_speed: f64, #[case] expected: FeeOutcome) {
        assert_eq!(FeeEngine::wind_speed_fee(wind_speed, VehicleType::Bike), expected);
    }

    #[rstest]
    #[case("Glaze")]
    #[case("hail")]
    #[case("THUNDER")]
    fn test_dangerous_phenomena_forbid_open_air(#[case] phenomenon: &str) {
        let engine = engine();
        assert!(engine.weather_phenomenon_fee(phenomenon, VehicleType::Bike).is_forbidden());
        assert!(engine.weather_phenomenon_fee(phenomenon, VehicleType::Scooter).is_forbidden());
        assert_eq!(
            engine.weather_phenomenon_fee(phenomenon, VehicleType::Car),
            FeeOutcome::Fee(0.0)
        );
    }

    #[rstest]
    #[case("light rain", 0.5)]
    #[case("Heavy shower", 0.5)]
    #[case("light snow shower", 1.0)]
    #[case("Drifting snow", 1.0)]
    #[case("moderate sleet", 1.0)]
    #[case("Clear", 0.0)]
    #[case("Thunderstorm", 0.0)]
    #[case("", 0.0)]
    fn test_phenomenon_fee_open_air(#[case] phenomenon: &str, #[case] expected: f64) {
        let engine = engine();
        assert_eq!(
            engine.weather_phenomenon_fee(phenomenon, VehicleType::Bike),
            FeeOutcome::Fee(expected)
        );
        assert_eq!(
            engine.weather_phenomenon_fee(phenomenon, VehicleType::Scooter),
            FeeOutcome::Fee(expected)
        );
    }

    #[rstest]
    #[case("light rain")]
    #[case("heavy snowfall")]
    #[case("light sleet")]
    fn test_phenomenon_fee_is_zero_for_car(#[case] phenomenon: &str) {
        assert_eq!(
            engine().weather_phenomenon_fee(phenomenon, VehicleType::Car),
            FeeOutcome::Fee(0.0)
        );
    }

    #[test]
    fn test_regional_base_fee_lookup() {
        let schedule: FeeSchedule = [
            (VehicleType::Car, "TALLINN", 4.0),
            (VehicleType::Bike, "TALLINN", 3.0),
        ]
        .into_iter()
        .collect();
        let engine = FeeEngine::new(schedule, PhenomenonTaxonomy::default());

        assert_eq!(engine.regional_base_fee(VehicleType::Bike, "Tallinn").unwrap(), 3.0);
        assert!(engine.regional_base_fee(VehicleType::Scooter, "Tallinn").is_err());

        engine.schedule().set(VehicleType::Bike, "Tallinn", 5.0);
        assert_eq!(engine.regional_base_fee(VehicleType::Bike, "TALLINN").unwrap(), 5.0);
    }
}
