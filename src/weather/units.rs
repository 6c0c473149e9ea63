//! Metric to imperial conversions.

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * 0.621371
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm * 0.0393701
}

pub fn km_to_miles(km: f64) -> f64 {
    km * 0.621371
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
