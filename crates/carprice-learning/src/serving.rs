//! Serving guard around a persisted pipeline.
//!
//! [`Predictor`] loads the artifact once at startup. If loading fails it
//! stays up in an unavailable state and refuses every request with
//! [`LearningError::ArtifactUnavailable`] instead of crashing the caller.

use crate::error::{LearningError, Result};
use crate::model::TrainedPipeline;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error, info};

/// Raw values a caller can supply for one vehicle.
///
/// Field names match the input columns of a default training run. Fields
/// left `None` are null in the record and imputed by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceInput {
    pub odometer: Option<f64>,
    pub condition: Option<String>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub drive: Option<String>,
    pub state: Option<String>,
    pub vehicle_age: Option<f64>,
}

impl PriceInput {
    /// Numeric (column, value) pairs.
    fn numeric_fields(&self) -> [(&'static str, Option<f64>); 2] {
        [("odometer", self.odometer), ("vehicle_age", self.vehicle_age)]
    }

    fn text_fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("condition", self.condition.as_deref()),
            ("fuel", self.fuel.as_deref()),
            ("transmission", self.transmission.as_deref()),
            ("drive", self.drive.as_deref()),
            ("state", self.state.as_deref()),
        ]
    }
}

#[derive(Debug)]
enum State {
    Ready(TrainedPipeline),
    Unavailable(String),
}

/// Loads a pipeline and answers price requests, or refuses them.
#[derive(Debug)]
pub struct Predictor {
    state: State,
}

impl Predictor {
    /// Load the artifact at `path`. Never fails; check
    /// [`is_available()`](Self::is_available).
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match TrainedPipeline::load(path) {
            Ok(pipeline) => {
                info!(
                    "Price model loaded from {} ({} input columns)",
                    path.display(),
                    pipeline.feature_names_in().len()
                );
                Self::from_pipeline(pipeline)
            }
            Err(e) => {
                error!("Price model unavailable: {}", e);
                Self {
                    state: State::Unavailable(e.to_string()),
                }
            }
        }
    }

    pub fn from_pipeline(pipeline: TrainedPipeline) -> Self {
        Self {
            state: State::Ready(pipeline),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// The loaded pipeline, if any.
    pub fn pipeline(&self) -> Option<&TrainedPipeline> {
        match &self.state {
            State::Ready(pipeline) => Some(pipeline),
            State::Unavailable(_) => None,
        }
    }

    /// Why the artifact could not be loaded.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match &self.state {
            State::Ready(_) => None,
            State::Unavailable(reason) => Some(reason),
        }
    }

    /// Estimate a price.
    ///
    /// Fields the loaded pipeline does not expect are skipped; expected
    /// columns without a value are null.
    pub fn predict(&self, input: &PriceInput) -> Result<f64> {
        let pipeline = match &self.state {
            State::Ready(pipeline) => pipeline,
            State::Unavailable(reason) => {
                return Err(LearningError::ArtifactUnavailable(reason.clone()));
            }
        };

        let mut record = pipeline.record();
        for (column, value) in input.numeric_fields() {
            if pipeline.expects(column) {
                record = record.set(column, value);
            } else if value.is_some() {
                debug!("Skipping '{}', not an input of this pipeline", column);
            }
        }
        for (column, value) in input.text_fields() {
            if pipeline.expects(column) {
                record = record.set(column, value);
            } else if value.is_some() {
                debug!("Skipping '{}', not an input of this pipeline", column);
            }
        }
        record.predict()
    }
}
