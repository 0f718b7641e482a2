use std::collections::BTreeMap;
use std::mem;
use std::ops::Range;

use image::DynamicImage;
use log::info;

use crate::dataset::common_structs::{Record, Transform};
use crate::dataset::error::DatasetError;
use crate::dataset::label_encoding::LabelEncoder;
use crate::dataset::resampling::{self, Partition};
use crate::dataset::RecordSource;

/// In-memory paired RGB-depth dataset: an owned record table plus the label
/// encoder fitted over it, addressable by dense zero-based index.
///
/// The table is only ever replaced wholesale: [`split_data`] and
/// [`reduce_data`] build a fresh table (or leave the old one untouched on
/// error), so an index stays valid until the next resampling call. The
/// encoder is fitted once at construction and never changes afterwards.
///
/// [`split_data`]: PairedDataset::split_data
/// [`reduce_data`]: PairedDataset::reduce_data
pub struct PairedDataset {
    records: Vec<Record>,
    encoder: LabelEncoder,
    transform: Option<Transform>,
}

impl PairedDataset {
    /// Ingest all records from `source`, fit the label encoder over the
    /// distinct labels seen and stamp every record with its encoded class.
    pub fn from_source<S: RecordSource>(source: &S) -> Result<PairedDataset, DatasetError> {
        let raw = source.produce_records()?;
        let encoder = LabelEncoder::fit(raw.iter().map(|r| r.class_label.as_str()));

        let mut records = Vec::with_capacity(raw.len());
        for r in raw {
            let encoded_class = encoder.encode(&r.class_label)?;
            records.push(Record {
                rgb: r.rgb,
                depth: r.depth,
                class_label: r.class_label,
                encoded_class,
            });
        }
        info!(
            "built dataset: {} records across {} classes",
            records.len(),
            encoder.len()
        );

        Ok(PairedDataset {
            records,
            encoder,
            transform: None,
        })
    }

    /// Apply `transform` uniformly and independently to both modalities on
    /// every [`get`](PairedDataset::get).
    pub fn with_transform(mut self, transform: Transform) -> PairedDataset {
        self.transform = Some(transform);
        self
    }

    /// Fetch the record at `index` as `(rgb, depth, encoded_class)`.
    pub fn get(
        &self,
        index: usize,
    ) -> Result<(DynamicImage, DynamicImage, usize), DatasetError> {
        let record = self.records.get(index).ok_or(DatasetError::OutOfRange {
            index,
            len: self.records.len(),
        })?;
        let (rgb, depth) = match &self.transform {
            Some(transform) => (transform(&record.rgb), transform(&record.depth)),
            None => (record.rgb.clone(), record.depth.clone()),
        };
        Ok((rgb, depth, record.encoded_class))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Class labels in encoded order, so `classes()[code]` names `code`.
    pub fn classes(&self) -> &[String] {
        self.encoder.classes()
    }

    /// Full reverse mapping from encoded class to label.
    pub fn encoded_classes(&self) -> BTreeMap<usize, String> {
        self.encoder
            .classes()
            .iter()
            .enumerate()
            .map(|(code, label)| (code, label.clone()))
            .collect()
    }

    /// Stratified train/validation split: the validation group totals
    /// `round(val_fraction * len)`, apportioned across classes by largest
    /// remainder, with every class contributing at least one and at most all
    /// but one of its samples. The table is replaced by the concatenation
    /// `[train..., val...]` and the returned ranges index into it
    /// contiguously: `(0..n_train, n_train..len)`.
    ///
    /// Fails with [`DatasetError::Stratification`] when any class has fewer
    /// than 2 samples and [`DatasetError::InvalidFraction`] when
    /// `val_fraction` is outside `[0, 1]`; the table is left untouched on
    /// failure.
    pub fn split_data(
        &mut self,
        val_fraction: f64,
        seed: Option<u64>,
    ) -> Result<(Range<usize>, Range<usize>), DatasetError> {
        let Partition { rest, taken } =
            resampling::stratified_partition(&self.records, val_fraction, true, seed)?;
        let (n_train, n_val) = (rest.len(), taken.len());

        let order: Vec<usize> = rest.iter().chain(taken.iter()).copied().collect();
        let old = mem::take(&mut self.records);
        self.records = resampling::take_by_index(old, &order);

        info!("split dataset: {n_train} train / {n_val} val records");
        Ok((0..n_train, n_train..n_train + n_val))
    }

    /// Stratified reduction: keep `round(keep_fraction * len)` records,
    /// apportioned across classes by largest remainder, and discard the rest.
    /// The table is replaced by the kept records reindexed to `0..n_kept`;
    /// returns that range and the number of discarded records.
    ///
    /// Fails with [`DatasetError::Stratification`] when the fraction would
    /// keep zero samples of some class and [`DatasetError::InvalidFraction`]
    /// when `keep_fraction` is outside `[0, 1]`; the table is left untouched
    /// then.
    pub fn reduce_data(
        &mut self,
        keep_fraction: f64,
        seed: Option<u64>,
    ) -> Result<(Range<usize>, usize), DatasetError> {
        let Partition { rest, taken } =
            resampling::stratified_partition(&self.records, keep_fraction, false, seed)?;
        let (n_discarded, n_kept) = (rest.len(), taken.len());

        let old = mem::take(&mut self.records);
        self.records = resampling::take_by_index(old, &taken);

        info!("reduced dataset: kept {n_kept}, discarded {n_discarded} records");
        Ok((0..n_kept, n_discarded))
    }
}
