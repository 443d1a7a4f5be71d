//! Parsing extracted CSV regions and reporting per-source outcomes.
//!
//! - [`csv`]: turns a CSV byte stream into a [`crate::types::DataSet`]
//! - [`observability`]: observer hooks called once per source with success/failure/alerts

pub mod csv;
pub mod observability;

pub use csv::{CsvReadOptions, read_csv};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
