//! Conversion from backend DTOs to domain types.
//!
//! Stations with missing or unusable codes are skipped (the rest of the list
//! is still worth showing). A departure with an unusable ETA or car count
//! fails the whole board, since a partial schedule would be presented as
//! complete. A car count or line that is simply absent is tolerated.

use tracing::debug;

use crate::domain::{
    AirQuality, Coordinate, Departure, Eta, LineColor, Pollutants, Station, StationId, Weather,
};

use super::types::{AirQualityDto, DepartureDto, PollutantsDto, StationDto, WeatherDto};

/// City assumed when a weather or AQI record omits one.
const DEFAULT_CITY: &str = "San Francisco";

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// ETA was neither a minute count nor a "leaving" marker
    #[error("invalid ETA: {0}")]
    InvalidEta(String),

    /// Car count was not a number
    #[error("invalid train length: {0}")]
    InvalidLength(String),

    /// AQI value was negative or not finite
    #[error("invalid AQI value: {0}")]
    InvalidAqi(String),
}

/// Convert a station list, skipping records with missing or invalid codes.
pub fn convert_stations(dtos: Vec<StationDto>) -> Vec<Station> {
    dtos.into_iter()
        .filter_map(|dto| {
            let Some(abbr) = dto.abbr.as_deref() else {
                debug!(name = ?dto.name, "Skipping station without a code");
                return None;
            };
            match StationId::parse_normalized(abbr) {
                Ok(id) => Some(convert_station(id, dto)),
                Err(e) => {
                    debug!(abbr, error = %e, "Skipping station with invalid code");
                    None
                }
            }
        })
        .collect()
}

fn convert_station(id: StationId, dto: StationDto) -> Station {
    // Unnamed stations are listed under their code.
    let name = non_empty(dto.name).unwrap_or_else(|| id.to_string());
    Station {
        id,
        name,
        city: non_empty(dto.city),
        position: Coordinate::from_parts(dto.lat, dto.lon),
        address: non_empty(dto.address),
        zipcode: non_empty(dto.zipcode),
    }
}

/// Convert a departure board.
pub fn convert_departures(dtos: Vec<DepartureDto>) -> Result<Vec<Departure>, ConversionError> {
    dtos.into_iter().map(convert_departure).collect()
}

fn convert_departure(dto: DepartureDto) -> Result<Departure, ConversionError> {
    let eta = Eta::parse(&dto.minutes).ok_or_else(|| ConversionError::InvalidEta(dto.minutes))?;

    let cars: u16 = match dto.length.as_deref().map(str::trim) {
        None | Some("") => 0,
        Some(length) => length
            .parse()
            .map_err(|_| ConversionError::InvalidLength(length.to_string()))?,
    };

    // Delay is informational; an odd value is treated as on time.
    let delay_secs = dto
        .delay
        .as_deref()
        .and_then(|d| d.trim().parse().ok())
        .unwrap_or(0);

    Ok(Departure {
        destination: dto.destination,
        eta,
        cars,
        platform: dto.platform.unwrap_or_default(),
        line: LineColor::new(dto.color.unwrap_or_default(), dto.hexcolor),
        direction: non_empty(dto.direction),
        delay_secs,
    })
}

/// Convert the current weather record.
pub fn convert_weather(dto: WeatherDto) -> Weather {
    Weather {
        city: non_empty(dto.city).unwrap_or_else(|| DEFAULT_CITY.to_string()),
        temperature_f: dto.temperature,
        temperature_c: dto
            .temperature_c
            .unwrap_or_else(|| ((dto.temperature - 32.0) * 5.0 / 9.0).round()),
        description: dto.description,
        icon: dto.icon,
        weather_code: dto.weather_code,
        wind_speed_mph: dto.wind_speed,
        wind_speed_kmh: dto
            .wind_speed_kmh
            .unwrap_or_else(|| (dto.wind_speed / 0.621371).round()),
        wind_direction_deg: dto.wind_direction,
        precipitation_mm: dto.precipitation_mm,
        rain_mm: dto.rain_mm,
        is_day: dto.is_day != 0,
    }
}

/// Convert the current air-quality record.
pub fn convert_air_quality(dto: AirQualityDto) -> Result<AirQuality, ConversionError> {
    if !dto.aqi.is_finite() || dto.aqi < 0.0 || dto.aqi > f64::from(u16::MAX) {
        return Err(ConversionError::InvalidAqi(dto.aqi.to_string()));
    }

    Ok(AirQuality {
        city: non_empty(dto.city).unwrap_or_else(|| DEFAULT_CITY.to_string()),
        index: dto.aqi.round() as u16,
        level: dto.aqi_level,
        color: dto.aqi_color,
        icon: dto.aqi_icon,
        pollutants: convert_pollutants(dto.pollutants),
    })
}

fn convert_pollutants(dto: PollutantsDto) -> Pollutants {
    Pollutants {
        pm2_5: dto.pm2_5,
        pm10: dto.pm10,
        ozone: dto.ozone,
        nitrogen_dioxide: dto.nitrogen_dioxide,
        carbon_monoxide: dto.carbon_monoxide,
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_LINE_HEX;

    fn station_dto(abbr: &str, lat: Option<f64>, lon: Option<f64>) -> StationDto {
        StationDto {
            abbr: Some(abbr.to_string()),
            name: Some(format!("Station {abbr}")),
            city: Some("San Francisco".to_string()),
            lat,
            lon,
            address: None,
            zipcode: Some(String::new()),
        }
    }

    fn departure_dto(minutes: &str, length: &str) -> DepartureDto {
        DepartureDto {
            destination: "Richmond".to_string(),
            minutes: minutes.to_string(),
            platform: Some("2".to_string()),
            direction: Some("North".to_string()),
            length: Some(length.to_string()),
            color: Some("RED".to_string()),
            hexcolor: Some("#ff0000".to_string()),
            delay: Some("0".to_string()),
        }
    }

    #[test]
    fn convert_station_with_position() {
        let stations = convert_stations(vec![station_dto(
            "EMBR",
            Some(37.792976),
            Some(-122.396742),
        )]);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "EMBR");
        assert!(stations[0].position.is_some());
        assert!(stations[0].zipcode.is_none());
    }

    #[test]
    fn zero_position_means_unplaced() {
        let stations = convert_stations(vec![station_dto("EMBR", Some(0.0), Some(0.0))]);
        assert!(stations[0].position.is_none());
    }

    #[test]
    fn lowercase_codes_are_normalized() {
        let stations = convert_stations(vec![station_dto("embr", None, None)]);
        assert_eq!(stations[0].id.as_str(), "EMBR");
    }

    #[test]
    fn invalid_codes_are_skipped() {
        let stations = convert_stations(vec![
            station_dto("EMBR", None, None),
            station_dto("", None, None),
            station_dto("TOO-LONG-CODE", None, None),
        ]);
        assert_eq!(stations.len(), 1);
    }

    #[test]
    fn stations_without_code_are_skipped_and_unnamed_use_code() {
        let mut unnamed = station_dto("GLEN", None, None);
        unnamed.name = None;
        let mut anonymous = station_dto("EMBR", None, None);
        anonymous.abbr = None;

        let stations = convert_stations(vec![anonymous, unnamed]);
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id.as_str(), "GLEN");
        assert_eq!(stations[0].name, "GLEN");
    }

    #[test]
    fn missing_length_and_color_are_tolerated() {
        let mut dto = departure_dto("3", "8");
        dto.length = None;
        dto.color = None;
        dto.hexcolor = None;

        let deps = convert_departures(vec![dto]).unwrap();
        assert_eq!(deps[0].cars, 0);
        assert_eq!(deps[0].line.name, "");
        assert_eq!(deps[0].line.hex, DEFAULT_LINE_HEX);
    }

    #[test]
    fn convert_departure_minutes() {
        let deps = convert_departures(vec![departure_dto("5", "10")]).unwrap();
        assert_eq!(deps[0].eta, Eta::Minutes(5));
        assert_eq!(deps[0].cars, 10);
        assert_eq!(deps[0].platform, "2");
        assert_eq!(deps[0].line.name, "RED");
        assert_eq!(deps[0].line.hex, "#ff0000");
    }

    #[test]
    fn convert_departure_leaving() {
        let deps = convert_departures(vec![departure_dto("Leaving", "8")]).unwrap();
        assert_eq!(deps[0].eta, Eta::Now);
    }

    #[test]
    fn missing_hex_gets_default() {
        let mut dto = departure_dto("3", "6");
        dto.hexcolor = None;
        let deps = convert_departures(vec![dto]).unwrap();
        assert_eq!(deps[0].line.hex, DEFAULT_LINE_HEX);
    }

    #[test]
    fn bad_eta_fails_board() {
        let err = convert_departures(vec![departure_dto("5", "10"), departure_dto("soon", "10")])
            .unwrap_err();
        assert_eq!(err, ConversionError::InvalidEta("soon".into()));
    }

    #[test]
    fn bad_length_fails_board() {
        let err = convert_departures(vec![departure_dto("5", "ten")]).unwrap_err();
        assert_eq!(err, ConversionError::InvalidLength("ten".into()));
    }

    #[test]
    fn odd_delay_is_on_time() {
        let mut dto = departure_dto("5", "10");
        dto.delay = Some("n/a".into());
        let deps = convert_departures(vec![dto]).unwrap();
        assert_eq!(deps[0].delay_secs, 0);
    }

    #[test]
    fn convert_weather_record() {
        let dto: WeatherDto = serde_json::from_str(
            r#"{"city": "San Francisco", "temperature": 62, "temperature_c": 17,
                "description": "Foggy", "icon": "🌫️", "wind_speed": 12, "wind_speed_kmh": 19,
                "wind_direction": 270, "weather_code": 45, "precipitation_mm": 0.2,
                "rain_mm": 0.1, "is_day": 0}"#,
        )
        .unwrap();
        let weather = convert_weather(dto);
        assert_eq!(weather.temperature_f, 62.0);
        assert_eq!(weather.weather_code, 45);
        assert!(!weather.is_day);
        assert_eq!(weather.precipitation_mm, 0.2);
    }

    #[test]
    fn weather_fills_derived_units() {
        let dto: WeatherDto = serde_json::from_str(
            r#"{"temperature": 50, "description": "Clear Sky", "wind_speed": 0}"#,
        )
        .unwrap();
        let weather = convert_weather(dto);
        assert_eq!(weather.temperature_c, 10.0);
        assert_eq!(weather.city, DEFAULT_CITY);
        assert!(weather.is_day);
    }

    #[test]
    fn convert_aqi_record() {
        let dto: AirQualityDto = serde_json::from_str(
            r##"{"aqi": 42, "aqi_level": "Good", "aqi_color": "#00e400", "aqi_icon": "🟢",
                "pollutants": {"pm2_5": 8.5, "ozone": 61.2}}"##,
        )
        .unwrap();
        let aqi = convert_air_quality(dto).unwrap();
        assert_eq!(aqi.index, 42);
        assert_eq!(aqi.level, "Good");
        assert_eq!(aqi.pollutants.pm2_5, 8.5);
        assert_eq!(aqi.pollutants.ozone, 61.2);
        assert_eq!(aqi.pollutants.pm10, 0.0);
    }

    #[test]
    fn negative_aqi_rejected() {
        let dto: AirQualityDto =
            serde_json::from_str(r#"{"aqi": -1, "aqi_level": "Unknown"}"#).unwrap();
        assert!(convert_air_quality(dto).is_err());
    }
}
