//! Flight delay model.
//!
//! - [`features`]: code tables and the [`FeatureVector`] layout
//! - [`LinearRegression`]: the pre-trained model, loaded once at startup
//! - [`delay`]: turning the model score into a displayable delay
//!
//! [`DelayPredictor`] ties the three together for the web and CLI layers.

pub mod delay;
pub mod features;

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use delay::{format_delay, DelayEstimate};
pub use features::{encode_airport, encode_carrier, FeatureVector, FEATURE_COUNT};

/// A regression primitive mapping a feature vector to a scalar.
pub trait Regressor: Send + Sync + Debug {
    /// Number of features the model expects.
    fn feature_count(&self) -> usize;

    /// Predict a single value.
    fn predict(&self, features: &[f64]) -> f64;
}

/// Ordinary least squares model: `intercept + Σ coefficients[i] * x[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Bias term.
    pub intercept: f64,
    /// One weight per feature, in [`FeatureVector`] order.
    pub coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Create a model from trained parameters.
    #[must_use]
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Load a model artifact from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it does
    /// not have exactly [`FEATURE_COUNT`] finite coefficients.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::model_load(path, e.to_string()))?;
        let model: Self =
            serde_json::from_str(&raw).map_err(|e| Error::model_load(path, e.to_string()))?;
        model
            .validate()
            .map_err(|message| Error::model_load(path, message))?;

        info!(
            "Loaded linear model from {} ({} coefficients)",
            path.display(),
            model.coefficients.len()
        );
        Ok(model)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {FEATURE_COUNT} coefficients, found {}",
                self.coefficients.len()
            ));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("model parameters must be finite".to_string());
        }
        Ok(())
    }
}

impl Regressor for LinearRegression {
    fn feature_count(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

/// Runs the full encode, predict and format pipeline.
#[derive(Debug, Clone)]
pub struct DelayPredictor {
    model: Arc<dyn Regressor>,
}

impl DelayPredictor {
    /// Wrap a trained model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelShape`] if the model does not take exactly
    /// [`FEATURE_COUNT`] features.
    pub fn new(model: Arc<dyn Regressor>) -> Result<Self> {
        let found = model.feature_count();
        if found != FEATURE_COUNT {
            return Err(Error::ModelShape {
                expected: FEATURE_COUNT,
                found,
            });
        }
        Ok(Self { model })
    }

    /// Load the linear model artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be loaded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Arc::new(LinearRegression::load(path)?))
    }

    /// Predict the delay for an encoded flight.
    #[must_use]
    pub fn estimate(&self, features: &FeatureVector) -> DelayEstimate {
        let predicted_delay = self.model.predict(&features.to_array());
        let estimate = DelayEstimate::from_prediction(predicted_delay);

        debug!(
            model_output = predicted_delay,
            delay_minutes = estimate.minutes,
            displayed = %estimate.text,
            "Delay prediction"
        );
        estimate
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_artifact(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "flightdelay-model-{}-{name}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_linear_predict() {
        let model = LinearRegression::new(1.0, vec![0.5, 0.0, 2.0, -1.0, 0.1]);
        let y = model.predict(&[2.0, 9.0, 1.0, 3.0, 10.0]);
        assert!((y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_valid_artifact() {
        let path = write_artifact(
            "valid",
            r#"{"intercept": 0.5, "coefficients": [0.1, 0.2, 0.3, 0.4, 0.5]}"#,
        );
        let model = LinearRegression::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.feature_count(), FEATURE_COUNT);
        assert!((model.intercept - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_wrong_coefficient_count() {
        let path = write_artifact("short", r#"{"intercept": 0.5, "coefficients": [0.1, 0.2]}"#);
        let err = LinearRegression::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, Error::ModelLoad { .. }));
        assert!(err.to_string().contains("expected 5 coefficients"));
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = LinearRegression::load("/nonexistent/lr_model.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lr_model.json"));
    }

    #[test]
    fn test_load_malformed_artifact() {
        let path = write_artifact("malformed", "not json");
        let err = LinearRegression::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, Error::ModelLoad { .. }));
    }

    #[test]
    fn test_shipped_artifact_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/lr_model.json");
        let predictor = DelayPredictor::load(path).unwrap();
        let estimate = predictor.estimate(&FeatureVector::encode("DEL", "BOM", "AI", 30.0, 10.0));
        assert!(estimate.predicted_delay.is_finite());
    }

    #[test]
    fn test_predictor_estimate() {
        // Only wind speed matters: 14 * 0.25 = 3.5 units = 70 minutes
        let model = LinearRegression::new(0.0, vec![0.0, 0.0, 0.0, 0.0, 0.25]);
        let predictor = DelayPredictor::new(Arc::new(model)).unwrap();

        let estimate = predictor.estimate(&FeatureVector::encode("DEL", "JFK", "AI", 25.0, 14.0));
        assert_eq!(estimate.minutes, 70);
        assert_eq!(estimate.text, "1 hour(s) 10 minute(s) delay");
    }

    #[test]
    fn test_predictor_rejects_wrong_feature_count() {
        let model = LinearRegression::new(0.0, vec![0.1, 0.2, 0.3]);
        let err = DelayPredictor::new(Arc::new(model)).unwrap_err();

        assert!(matches!(
            err,
            Error::ModelShape {
                expected: FEATURE_COUNT,
                found: 3
            }
        ));
    }

    #[test]
    fn test_shipped_artifact_huge_wind_is_on_time() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/lr_model.json");
        let predictor = DelayPredictor::load(path).unwrap();

        // The score is finite but overflows once scaled to minutes
        let features = FeatureVector::encode("DEL", "BOM", "AI", 30.0, 1e308);
        let estimate = predictor.estimate(&features);
        assert!(estimate.predicted_delay.is_finite());
        assert_eq!(estimate.minutes, 0);
        assert_eq!(estimate.text, "On Time");
    }
}
