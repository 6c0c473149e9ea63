//! Turning an Open-Meteo forecast into the client's imperial weather report.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::conditions::{estimate_cloud_cover, WeatherCondition};
use super::forecast::{at, ForecastResponse, HourlySeries};
use super::units::{celsius_to_fahrenheit, km_to_miles, kmh_to_mph, mm_to_inches, round1};

/// Days of forecast included in the report
pub const FORECAST_DAYS: usize = 7;

const DEFAULT_TEMPERATURE_C: f64 = 21.0;
const DEFAULT_WIND_KMH: f64 = 10.0;
const DEFAULT_HUMIDITY: f64 = 50.0;
const DEFAULT_UV_INDEX: f64 = 5.0;
const DEFAULT_APPARENT_C: f64 = 18.0;
const DEFAULT_PRESSURE_HPA: f64 = 1013.0;
const DEFAULT_VISIBILITY_MILES: f64 = 6.2;
const FORECAST_HUMIDITY: u8 = 65;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentReport {
    /// °F
    pub temperature: f64,
    /// mph
    pub wind_speed: f64,
    /// %
    pub humidity: f64,
    /// inches
    pub precipitation: f64,
    pub uv_index: f64,
    pub condition: WeatherCondition,
    pub condition_emoji: String,
    pub cloud_cover: u8,
    /// miles
    pub visibility: f64,
    /// °F, taken from the apparent temperature
    pub dew_point: f64,
    /// hPa
    pub pressure: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    /// e.g. "Sat, Jun 01"
    pub date: String,
    /// Mean of high and low, °F
    pub temperature: f64,
    pub high: f64,
    pub low: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub wind: f64,
    pub humidity: u8,
    pub condition: WeatherCondition,
    pub condition_emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalReport {
    pub avg_temp: f64,
    pub avg_precip: f64,
    pub avg_wind: f64,
    pub record_high: f64,
    pub record_low: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentReport,
    pub forecast: Vec<DayReport>,
    pub historical: HistoricalReport,
}

/// Build the full report for a location at `lat`.
///
/// `now` is used to pick the hourly UV value when the current block has none.
pub fn build_report(forecast: &ForecastResponse, lat: f64, now: DateTime<Utc>) -> WeatherReport {
    let current = current_report(forecast, now);
    let days = daily_reports(forecast);
    let historical = historical_estimate(lat, current.temperature);

    WeatherReport {
        current,
        forecast: days,
        historical,
    }
}

fn current_report(forecast: &ForecastResponse, now: DateTime<Utc>) -> CurrentReport {
    let current = &forecast.current;
    let code = current.weather_code.unwrap_or(0);
    let condition = WeatherCondition::from_wmo_code(code);

    let uv_index = current
        .uv_index
        .or_else(|| hourly_uv_at(&forecast.hourly, local_now(now, forecast.utc_offset_seconds)))
        .unwrap_or(DEFAULT_UV_INDEX);

    let visibility = at(&forecast.hourly.visibility, 0)
        .map(|meters| round1(km_to_miles(meters / 1000.0)))
        .unwrap_or(DEFAULT_VISIBILITY_MILES);

    CurrentReport {
        temperature: round1(celsius_to_fahrenheit(
            current.temperature_2m.unwrap_or(DEFAULT_TEMPERATURE_C),
        )),
        wind_speed: round1(kmh_to_mph(current.wind_speed_10m.unwrap_or(DEFAULT_WIND_KMH))),
        humidity: current.relative_humidity_2m.unwrap_or(DEFAULT_HUMIDITY),
        precipitation: round1(mm_to_inches(current.precipitation.unwrap_or(0.0))),
        uv_index: round1(uv_index),
        condition,
        condition_emoji: condition.emoji().to_string(),
        cloud_cover: estimate_cloud_cover(code),
        visibility,
        dew_point: round1(celsius_to_fahrenheit(
            current.apparent_temperature.unwrap_or(DEFAULT_APPARENT_C),
        )),
        pressure: current.pressure_msl.unwrap_or(DEFAULT_PRESSURE_HPA).round() as i64,
        description: condition.title(),
    }
}

/// Wall-clock time at the forecast location, truncated to the hour
fn local_now(now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDateTime {
    let local = (now + Duration::seconds(utc_offset_seconds as i64)).naive_utc();
    local
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(local)
}

/// First hourly UV value at or after `hour`
fn hourly_uv_at(hourly: &HourlySeries, hour: NaiveDateTime) -> Option<f64> {
    hourly
        .time
        .iter()
        .enumerate()
        .find(|(_, time)| {
            NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
                .map(|t| t >= hour)
                .unwrap_or(false)
        })
        .and_then(|(i, _)| at(&hourly.uv_index, i))
}

fn daily_reports(forecast: &ForecastResponse) -> Vec<DayReport> {
    let daily = &forecast.daily;

    daily
        .time
        .iter()
        .take(FORECAST_DAYS)
        .enumerate()
        .filter_map(|(i, date)| {
            let high = celsius_to_fahrenheit(at(&daily.temperature_2m_max, i)?);
            let low = celsius_to_fahrenheit(at(&daily.temperature_2m_min, i)?);
            let condition = WeatherCondition::from_wmo_code(at(&daily.weather_code, i).unwrap_or(0));
            let wind = round1(kmh_to_mph(
                at(&daily.wind_speed_10m_max, i).unwrap_or(DEFAULT_WIND_KMH),
            ));

            Some(DayReport {
                date: format_day(date),
                temperature: round1((high + low) / 2.0),
                high: round1(high),
                low: round1(low),
                precipitation: round1(mm_to_inches(at(&daily.precipitation_sum, i).unwrap_or(0.0))),
                wind_speed: wind,
                wind,
                humidity: FORECAST_HUMIDITY,
                condition,
                condition_emoji: condition.emoji().to_string(),
            })
        })
        .collect()
}

/// "2024-06-01" -> "Sat, Jun 01"; unparseable dates pass through
fn format_day(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a, %b %d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Climate-normal estimate from latitude and the current temperature (°F)
pub fn historical_estimate(lat: f64, current_temp: f64) -> HistoricalReport {
    let avg_temp = if lat > 40.0 {
        current_temp - 5.0
    } else if lat < -40.0 {
        current_temp - 3.0
    } else {
        current_temp
    };

    HistoricalReport {
        avg_temp: round1(avg_temp),
        avg_precip: if lat > 40.0 { 1.2 } else { 0.8 },
        avg_wind: 8.5,
        record_high: round1(current_temp + 25.0),
        record_low: round1(current_temp - 30.0),
    }
}
