//! Vehicle Listing Preparation Library
//!
//! Turns a raw table of used-vehicle listings into a clean training table,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! The preparation stages always run in the same order:
//!
//! - **Initial Cleaning**: drop identifier/free-text/high-cardinality columns
//!   and rows whose price is missing or a placeholder
//! - **Outlier Capping**: clip `price` and `odometer` at their 99th percentile
//! - **Feature Derivation**: replace `year` with `vehicle_age`
//! - **Missing-Value Pruning**: drop columns more than 40% empty
//! - **Schema Inference**: classify the remaining columns as numeric or
//!   categorical features, recording every exclusion with a reason
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use carprice_processing::{DataPreparation, PreparationConfig, load_csv};
//!
//! let raw = load_csv("data/vehicles.csv")?;
//!
//! let prepared = DataPreparation::builder()
//!     .config(PreparationConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .prepare(raw)?;
//!
//! println!("Numeric features: {:?}", prepared.schema.numeric_columns());
//! println!("Categorical features: {:?}", prepared.schema.categorical_columns());
//! ```
//!
//! # Configuration
//!
//! Use [`PreparationConfig`] to customize preparation:
//!
//! ```rust,ignore
//! use carprice_processing::PreparationConfig;
//!
//! let config = PreparationConfig::builder()
//!     .missing_column_threshold(0.5)   // Drop columns with >50% missing
//!     .cap_percentile(0.95)
//!     .reference_year(2025)
//!     .build()?;
//! ```
//!
//! Each stage is also usable on its own: [`InitialCleaner`],
//! [`OutlierCapper`], [`FeatureDeriver`], [`MissingValuePruner`] and
//! [`ColumnSchema`].

pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{InitialCleaner, MissingValuePruner};
pub use config::{
    ConfigValidationError, DEFAULT_COLUMNS_TO_DROP, DEFAULT_REFERENCE_YEAR, PreparationConfig,
    PreparationConfigBuilder,
};
pub use error::{ErrorKind, PreparationError, Result as PreparationResult, ResultExt};
pub use features::FeatureDeriver;
pub use io::load_csv;
pub use pipeline::{
    ClosureProgressReporter, DataPreparation, DataPreparationBuilder, OutlierCapper,
    PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use profiler::{ColumnRole, ColumnSchema, ColumnSpec, ExcludedColumn, ExclusionReason};
pub use types::{
    CapReport, CleaningReport, DerivationReport, DroppedColumn, PreparationSummary,
    PreparedDataset,
};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
