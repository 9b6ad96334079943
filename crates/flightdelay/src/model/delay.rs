//! Conversion of a raw model score into a displayable delay.

use serde::Serialize;

/// Minutes represented by one unit of model output.
pub const MINUTES_PER_UNIT: f64 = 20.0;

/// Headline shown when no delay is predicted.
pub const NOT_DELAYED_MESSAGE: &str = "✅ Flight is Not Delayed";

/// Headline shown when a delay is predicted.
pub const DELAYED_MESSAGE: &str = "⚠️ Flight is Delayed";

/// A model score interpreted as a delay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayEstimate {
    /// Raw model output.
    pub predicted_delay: f64,
    /// Delay in whole minutes.
    pub minutes: i64,
    /// Headline for the result page.
    pub message: &'static str,
    /// Human-readable delay, e.g. `1 hour(s) 5 minute(s) delay`.
    pub text: String,
}

impl DelayEstimate {
    /// Interpret a model score.
    #[must_use]
    pub fn from_prediction(predicted_delay: f64) -> Self {
        let minutes = delay_minutes(predicted_delay);
        let mut estimate = Self {
            predicted_delay,
            minutes,
            message: NOT_DELAYED_MESSAGE,
            text: format_delay(minutes),
        };
        if estimate.is_delayed() {
            estimate.message = DELAYED_MESSAGE;
        }
        estimate
    }

    /// Whether any delay is predicted.
    #[must_use]
    pub fn is_delayed(&self) -> bool {
        self.minutes > 0
    }
}

/// Scale a model score to minutes, truncating toward zero.
///
/// A score that is non-finite, or becomes non-finite once scaled, yields 0.
/// Finite scores beyond the `i64` range saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn delay_minutes(predicted_delay: f64) -> i64 {
    let scaled = predicted_delay * MINUTES_PER_UNIT;
    if !scaled.is_finite() {
        return 0;
    }
    scaled as i64
}

/// Format delay minutes for display.
#[must_use]
pub fn format_delay(minutes: i64) -> String {
    if minutes <= 0 {
        "On Time".to_string()
    } else if minutes < 60 {
        format!("{minutes} minutes delay")
    } else {
        let hours = minutes / 60;
        let minutes = minutes % 60;
        format!("{hours} hour(s) {minutes} minute(s) delay")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_minutes_truncates_toward_zero() {
        assert_eq!(delay_minutes(1.0), 20);
        assert_eq!(delay_minutes(1.99), 39);
        assert_eq!(delay_minutes(-0.04), 0);
        assert_eq!(delay_minutes(-1.0), -20);
    }

    #[test]
    fn test_delay_minutes_non_finite() {
        assert_eq!(delay_minutes(f64::NAN), 0);
        assert_eq!(delay_minutes(f64::INFINITY), 0);
        assert_eq!(delay_minutes(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_delay_minutes_overflow_on_scaling() {
        // Finite score whose scaled value overflows to infinity
        assert!(f64::MAX.is_finite());
        assert_eq!(delay_minutes(f64::MAX), 0);
        assert_eq!(delay_minutes(-f64::MAX), 0);
    }

    #[test]
    fn test_estimate_infinite_score_is_on_time() {
        let estimate = DelayEstimate::from_prediction(f64::INFINITY);
        assert_eq!(estimate.minutes, 0);
        assert_eq!(estimate.message, NOT_DELAYED_MESSAGE);
        assert_eq!(estimate.text, "On Time");
    }

    #[test]
    fn test_format_on_time() {
        assert_eq!(format_delay(0), "On Time");
        assert_eq!(format_delay(-15), "On Time");
    }

    #[test]
    fn test_format_minutes_only() {
        assert_eq!(format_delay(1), "1 minutes delay");
        assert_eq!(format_delay(59), "59 minutes delay");
    }

    #[test]
    fn test_format_hours_and_minutes() {
        assert_eq!(format_delay(60), "1 hour(s) 0 minute(s) delay");
        assert_eq!(format_delay(125), "2 hour(s) 5 minute(s) delay");
    }

    #[test]
    fn test_estimate_not_delayed() {
        let estimate = DelayEstimate::from_prediction(-0.3);
        assert_eq!(estimate.message, NOT_DELAYED_MESSAGE);
        assert_eq!(estimate.text, "On Time");
        assert!(!estimate.is_delayed());
    }

    #[test]
    fn test_estimate_small_positive_score_rounds_to_on_time() {
        // 0.04 * 20 = 0.8 minutes, truncated to 0
        let estimate = DelayEstimate::from_prediction(0.04);
        assert_eq!(estimate.minutes, 0);
        assert_eq!(estimate.message, NOT_DELAYED_MESSAGE);
    }

    #[test]
    fn test_estimate_delayed() {
        let estimate = DelayEstimate::from_prediction(3.5);
        assert_eq!(estimate.minutes, 70);
        assert_eq!(estimate.message, DELAYED_MESSAGE);
        assert_eq!(estimate.text, "1 hour(s) 10 minute(s) delay");
        assert!(estimate.is_delayed());
    }
}
