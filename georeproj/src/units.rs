//! Unit conversions.

/// Number of US survey feet in one meter.
pub const US_SURVEY_FEET_PER_METER: f64 = 3.280833333;

/// Converts a distance in US survey feet to meters.
pub fn feet_to_meters(feet: f64) -> f64 {
    feet / US_SURVEY_FEET_PER_METER
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn survey_feet() {
        assert_eq!(feet_to_meters(0.0), 0.0);
        assert_abs_diff_eq!(feet_to_meters(3.280833333), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(feet_to_meters(5280.0), 1609.347_219, epsilon = 1e-6);
    }
}
