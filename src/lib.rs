//! In-memory paired RGB-depth image datasets for domain-adaptation training.
//!
//! Two ingestion front-ends (a pre-split manifest reader and a synthetic
//! directory walker) feed one generic [`PairedDataset`], which owns the
//! record table and its label encoding and offers stratified train/validation
//! splitting and stratified size reduction with stable, contiguous indices.

pub mod dataset;

pub use dataset::common_structs::{RawRecord, Record, Transform};
pub use dataset::data_loaders::manifest_loader::ManifestSource;
pub use dataset::data_loaders::synthetic_loader::SyntheticSource;
pub use dataset::error::DatasetError;
pub use dataset::label_encoding::LabelEncoder;
pub use dataset::paired_dataset::PairedDataset;
pub use dataset::RecordSource;
