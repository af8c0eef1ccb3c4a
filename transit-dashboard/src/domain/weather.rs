//! Ambient conditions: current weather and air quality.

use serde::Serialize;

/// Current weather at the dashboard's home city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub city: String,
    pub temperature_f: f64,
    pub temperature_c: f64,
    pub description: String,
    pub icon: String,
    /// WMO weather interpretation code.
    pub weather_code: u16,
    pub wind_speed_mph: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub precipitation_mm: f64,
    pub rain_mm: f64,
    pub is_day: bool,
}

/// Pollutant concentrations in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Pollutants {
    pub pm2_5: f64,
    pub pm10: f64,
    pub ozone: f64,
    pub nitrogen_dioxide: f64,
    pub carbon_monoxide: f64,
}

/// Current air quality (US AQI).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQuality {
    pub city: String,
    pub index: u16,
    /// Qualitative level, e.g. "Good" or "Moderate".
    pub level: String,
    pub color: String,
    pub icon: String,
    pub pollutants: Pollutants,
}
