//! carprice-learning: preprocessing, gradient boosting and the persisted
//! price-prediction pipeline.
//!
//! This crate turns a prepared listings table (see `carprice-processing`)
//! into a fitted pipeline: per-role imputation and encoding, a native
//! histogram gradient-boosted tree regressor, held-out evaluation, and an
//! atomically written JSON artifact that can be loaded for serving.
//!
//! # Features
//!
//! - **Column transformer**: median imputation + standardisation for numeric
//!   columns, most-frequent imputation + sparse one-hot encoding for
//!   categorical columns
//! - **Gradient boosting**: squared-error XGBoost trees (`hist` method) fitted
//!   on a sparse CSR matrix
//! - **Artifact**: fitted transformer, fitted regressor and metadata in one
//!   file, validated on load
//! - **Serving guard**: [`Predictor`] refuses requests instead of crashing
//!   when the artifact is missing or corrupt
//! - **Progress Reporting**: stage and per-tree progress callbacks
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use carprice_learning::{PriceInput, Predictor, Trainer, TrainingConfig};
//!
//! // Train from data/vehicles.csv, write saved_pipeline/price_prediction_pipeline.json
//! let trainer = Trainer::builder()
//!     .config(TrainingConfig::default())
//!     .on_progress(|u| println!("{:.0}% - {}", u.progress * 100.0, u.message))
//!     .build()?;
//! let result = trainer.run()?;
//! println!("Test R²: {:.3}", result.metrics.r2);
//!
//! // Serve
//! let predictor = Predictor::from_path("saved_pipeline/price_prediction_pipeline.json");
//! let price = predictor.predict(&PriceInput {
//!     odometer: Some(100_000.0),
//!     condition: Some("good".into()),
//!     fuel: Some("gas".into()),
//!     vehicle_age: Some(10.0),
//!     ..Default::default()
//! })?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     carprice-processing                         │
//! │  load_csv ─► clean ─► cap ─► derive age ─► prune ─► schema      │
//! └───────────────────────────┬─────────────────────────────────────┘
//!                             │ PreparedDataset
//!                             ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     carprice-learning                           │
//! │  split ─► ColumnTransformer ─► GradientBoostedRegressor         │
//! │                    │                      │                     │
//! │                    └──── TrainedPipeline ─┘ ─► save / load      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, LearningError>`](Result). The
//! error type provides specific variants for different failure modes:
//!
//! - [`LearningError::Preparation`] - cleaning, capping, derivation or pruning failed
//! - [`LearningError::InvalidConfig`] - invalid training configuration
//! - [`LearningError::UnexpectedColumn`] - a record names a column the pipeline does not expect
//! - [`LearningError::Artifact`] - a persisted pipeline is inconsistent
//! - [`LearningError::ArtifactUnavailable`] - the predictor has no pipeline loaded
//!
//! See [`LearningError`] for the complete list.
//!
//! # Thread Safety
//!
//! [`TrainedPipeline`] is `Send + Sync` and can be shared across threads for
//! prediction. The fitted regressor is stored as XGBoost model bytes and a
//! booster is loaded per prediction call, so no native handle is shared.
//! [`BoostingConfig::n_threads`] sets XGBoost's thread count for training.
//!
//! # Model Persistence
//!
//! ```rust,ignore
//! pipeline.save("saved_pipeline/price_prediction_pipeline.json")?;
//!
//! let pipeline = TrainedPipeline::load("saved_pipeline/price_prediction_pipeline.json")?;
//! let prices = pipeline.predict(&new_listings)?;
//! ```
//!
//! Pipelines can also be serialized to bytes for custom storage:
//!
//! ```rust,ignore
//! let bytes = pipeline.to_bytes()?;
//! let pipeline = TrainedPipeline::from_bytes(&bytes)?;
//! ```

mod config;
mod error;
mod matrix;
pub mod metrics;
mod model;
pub mod preprocessing;
pub mod regressor;
mod serving;
mod split;
mod trainer;
mod types;

// Re-export public API
//
// Configuration types
pub use config::{
    BoostingConfig, DEFAULT_ARTIFACT_PATH, DEFAULT_DATA_PATH, TrainingConfig,
    TrainingConfigBuilder,
};
// Error types
pub use error::{LearningError, Result};
// Feature matrix
pub use matrix::FeatureMatrix;
// Model types
pub use model::{
    ARTIFACT_FORMAT_VERSION, ArtifactMetadata, MODEL_NAME, RecordBuilder, RecordValue,
    TrainedPipeline,
};
// Preprocessing and regressor entry points
pub use preprocessing::{ColumnTransformer, FittedColumnTransformer};
pub use regressor::{FittedGradientBoostedRegressor, GradientBoostedRegressor};
// Serving
pub use serving::{PriceInput, Predictor};
// Splitting
pub use split::{split_indices, train_test_split};
// Trainer types
pub use trainer::{Trainer, TrainerBuilder};
// Progress reporting types
pub use carprice_processing::{PipelineStage, ProgressReporter, ProgressUpdate};
// Result and metrics types
pub use types::{Metrics, ModelInfo, TrainingResult};
