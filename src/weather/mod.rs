//! Weather conditions, unit conversion and report assembly.

mod conditions;
mod forecast;
mod report;
mod units;

pub use conditions::{estimate_cloud_cover, WeatherCondition};
pub use forecast::{
    CurrentConditions, DailySeries, ForecastResponse, HourlySeries, CURRENT_VARIABLES,
    DAILY_VARIABLES, HOURLY_VARIABLES,
};
pub use report::{
    build_report, historical_estimate, CurrentReport, DayReport, HistoricalReport, WeatherReport,
    FORECAST_DAYS,
};
pub use units::{celsius_to_fahrenheit, km_to_miles, kmh_to_mph, mm_to_inches, round1, round2};
