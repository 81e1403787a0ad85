//! Power type classification

use serde::{Deserialize, Serialize};

/// Kind of energy usage or generation a tariff applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerType {
    Consumption,
    InterruptibleConsumption,
    ThermalStorageConsumption,
    Production,
    SolarProduction,
    WindProduction,
    BatteryStorage,
    ElectricVehicle,
}

impl PowerType {
    pub fn is_consumption(&self) -> bool {
        matches!(
            self,
            Self::Consumption
                | Self::InterruptibleConsumption
                | Self::ThermalStorageConsumption
                | Self::ElectricVehicle
        )
    }

    pub fn is_production(&self) -> bool {
        matches!(
            self,
            Self::Production | Self::SolarProduction | Self::WindProduction
        )
    }
}

impl Default for PowerType {
    fn default() -> Self {
        Self::Consumption
    }
}

impl std::fmt::Display for PowerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consumption => write!(f, "CONSUMPTION"),
            Self::InterruptibleConsumption => write!(f, "INTERRUPTIBLE_CONSUMPTION"),
            Self::ThermalStorageConsumption => write!(f, "THERMAL_STORAGE_CONSUMPTION"),
            Self::Production => write!(f, "PRODUCTION"),
            Self::SolarProduction => write!(f, "SOLAR_PRODUCTION"),
            Self::WindProduction => write!(f, "WIND_PRODUCTION"),
            Self::BatteryStorage => write!(f, "BATTERY_STORAGE"),
            Self::ElectricVehicle => write!(f, "ELECTRIC_VEHICLE"),
        }
    }
}
