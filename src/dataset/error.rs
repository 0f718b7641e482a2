use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by ingestion, indexing and resampling.
///
/// Nothing is swallowed silently except the counted skip-on-missing-depth
/// policy of the synthetic front-end; every other failure aborts the
/// operation that triggered it and leaves dataset state untouched.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Filesystem access failed (missing manifest, unreadable image or dir).
    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a decodable image.
    #[error("failed to decode image `{}`: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A manifest line does not match `<template_path> <raw_class_id>`.
    #[error("malformed line {line_no} in manifest `{}`", .path.display())]
    ManifestParse { path: PathBuf, line_no: usize },

    /// A resampling fraction outside `[0, 1]`.
    #[error("fraction {fraction} is outside [0, 1]")]
    InvalidFraction { fraction: f64 },

    /// A class has too few samples to be represented in every target group.
    #[error("class `{class}` has {count} sample(s), too few to stratify at the requested fraction")]
    Stratification { class: String, count: usize },

    /// Index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A label that was never fitted by the encoder.
    #[error("unknown class label `{label}`")]
    UnknownLabel { label: String },

    /// An integer code outside the encoder's fitted domain.
    #[error("unknown class code {code}")]
    UnknownCode { code: usize },
}
