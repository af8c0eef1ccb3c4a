//! Wire types for the dashboard backend.
//!
//! These mirror the JSON exactly; conversion to domain types happens in
//! `convert`. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// `GET /api/stations` response.
#[derive(Debug, Default, Deserialize)]
pub struct StationsResponse {
    #[serde(default)]
    pub stations: Vec<StationDto>,
}

/// One station record. Records without a code are dropped during conversion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationDto {
    #[serde(default)]
    pub abbr: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
}

/// `GET /api/departures/{abbr}` response.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesResponse {
    #[serde(default)]
    pub departures: Vec<DepartureDto>,
}

/// One estimate. Numeric fields arrive as strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DepartureDto {
    pub destination: String,
    pub minutes: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub hexcolor: Option<String>,
    #[serde(default)]
    pub delay: Option<String>,
}

/// `GET /api/weather` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherDto {
    #[serde(default)]
    pub city: Option<String>,
    pub temperature: f64,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub weather_code: u16,
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_speed_kmh: Option<f64>,
    #[serde(default)]
    pub wind_direction: f64,
    #[serde(default)]
    pub precipitation_mm: f64,
    #[serde(default)]
    pub rain_mm: f64,
    #[serde(default = "default_is_day")]
    pub is_day: u8,
}

fn default_is_day() -> u8 {
    1
}

/// `GET /api/aqi` response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AirQualityDto {
    #[serde(default)]
    pub city: Option<String>,
    pub aqi: f64,
    pub aqi_level: String,
    #[serde(default)]
    pub aqi_color: String,
    #[serde(default)]
    pub aqi_icon: String,
    #[serde(default)]
    pub pollutants: PollutantsDto,
}

/// Pollutant sub-values; any may be missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PollutantsDto {
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(default)]
    pub ozone: f64,
    #[serde(default)]
    pub nitrogen_dioxide: f64,
    #[serde(default)]
    pub carbon_monoxide: f64,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stations_missing_array_is_empty() {
        let parsed: StationsResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(parsed.stations.is_empty());
    }

    #[test]
    fn station_without_position() {
        let parsed: StationDto =
            serde_json::from_str(r#"{"abbr": "EMBR", "name": "Embarcadero"}"#).unwrap();
        assert_eq!(parsed.abbr.as_deref(), Some("EMBR"));
        assert!(parsed.lat.is_none());
        assert!(parsed.city.is_none());
    }

    #[test]
    fn null_fields_do_not_fail_the_payload() {
        let json = r#"{"stations": [
            {"abbr": null, "name": "Mystery"},
            {"abbr": "EMBR", "name": null},
            {"abbr": "GLEN", "name": "Glen Park"}
        ]}"#;
        let parsed: StationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.stations.len(), 3);
        assert!(parsed.stations[0].abbr.is_none());

        let json = r#"{"departures": [
            {"destination": "Richmond", "minutes": "5", "length": null, "color": null}
        ]}"#;
        let parsed: DeparturesResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.departures[0].length.is_none());
        assert!(parsed.departures[0].color.is_none());
    }

    #[test]
    fn departures_payload() {
        let json = r##"{
            "success": true,
            "station_name": "Powell St.",
            "station_abbr": "POWL",
            "departures": [
                {"destination": "Richmond", "minutes": "5", "platform": "2", "direction": "North",
                 "length": "10", "color": "RED", "hexcolor": "#ff0000", "delay": "0"}
            ],
            "source": "live"
        }"##;
        let parsed: DeparturesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.departures.len(), 1);
        assert_eq!(parsed.departures[0].hexcolor.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn aqi_without_pollutants() {
        let parsed: AirQualityDto =
            serde_json::from_str(r#"{"aqi": 42, "aqi_level": "Good"}"#).unwrap();
        assert_eq!(parsed.pollutants.pm2_5, 0.0);
    }

    #[test]
    fn error_body_detail() {
        let parsed: ErrorBody =
            serde_json::from_str(r#"{"detail": "Weather API error: boom"}"#).unwrap();
        assert_eq!(parsed.detail, "Weather API error: boom");
    }
}
