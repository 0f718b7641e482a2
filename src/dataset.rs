pub mod common_structs;

pub mod data_loaders;
pub mod error;
pub mod label_encoding;
pub mod paired_dataset;
pub mod resampling;

use self::common_structs::RawRecord;
use self::error::DatasetError;

/// Ingestion strategy seam: a data source able to produce the raw paired
/// records a [`paired_dataset::PairedDataset`] is built from. Records come
/// back in the source's deterministic enumeration order, labels unencoded.
pub trait RecordSource {
    fn produce_records(&self) -> Result<Vec<RawRecord>, DatasetError>;
}
