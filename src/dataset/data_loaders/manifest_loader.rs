use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;

use crate::dataset::common_structs::RawRecord;
use crate::dataset::error::DatasetError;
use crate::dataset::RecordSource;

/// Token in a manifest template path that selects the modality folder.
const MODALITY_TOKEN: &str = "???";
/// Token that selects the per-modality file stem suffix.
const CROP_TOKEN: &str = "***";

/// Front-end for the pre-split labeled set.
///
/// Reads `<root>/<split>.txt`, one `<template_path> <raw_class_id>` pair per
/// line. The class label is the second path segment of the template; the
/// template's tokens resolve to `rgb`/`crop` for the RGB file and
/// `depth`/`depthcrop` for its depth partner. The raw class id column is
/// ignored, the label encoding is rebuilt from the labels themselves.
///
/// Missing or unreadable images are fatal here, for both modalities; only
/// the synthetic front-end has a skip policy.
pub struct ManifestSource {
    root: PathBuf,
    split: String,
    blacklist: HashSet<String>,
}

impl ManifestSource {
    /// `split` names the manifest file, conventionally `"train"` or `"test"`.
    pub fn new(root: impl AsRef<Path>, split: &str) -> ManifestSource {
        ManifestSource {
            root: root.as_ref().to_path_buf(),
            split: split.to_owned(),
            blacklist: HashSet::new(),
        }
    }

    /// Drop every manifest entry whose class label is in `classes`.
    pub fn with_blacklist<I, S>(mut self, classes: I) -> ManifestSource
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = classes.into_iter().map(Into::into).collect();
        self
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(format!("{}.txt", self.split))
    }
}

impl RecordSource for ManifestSource {
    fn produce_records(&self) -> Result<Vec<RawRecord>, DatasetError> {
        let manifest = self.manifest_path();
        let contents = fs::read_to_string(&manifest).map_err(|source| DatasetError::Io {
            path: manifest.clone(),
            source,
        })?;

        let mut pending: Vec<(PathBuf, PathBuf, String)> = Vec::new();
        for (line_idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || DatasetError::ManifestParse {
                path: manifest.clone(),
                line_no: line_idx + 1,
            };
            let mut fields = line.split_whitespace();
            let template = fields.next().ok_or_else(malformed)?;
            let _raw_class_id = fields.next().ok_or_else(malformed)?;

            let class_label = template.split('/').nth(1).ok_or_else(malformed)?.to_owned();
            if self.blacklist.contains(&class_label) {
                continue;
            }

            let rgb_path = self
                .root
                .join(template.replace(MODALITY_TOKEN, "rgb").replace(CROP_TOKEN, "crop"));
            let depth_path = self.root.join(
                template
                    .replace(MODALITY_TOKEN, "depth")
                    .replace(CROP_TOKEN, "depthcrop"),
            );
            pending.push((rgb_path, depth_path, class_label));
        }

        let records = pending
            .into_par_iter()
            .map(|(rgb_path, depth_path, class_label)| {
                let rgb = super::decode_rgb(&rgb_path)?;
                let depth = super::decode_rgb(&depth_path)?;
                Ok(RawRecord {
                    rgb,
                    depth,
                    class_label,
                })
            })
            .collect::<Result<Vec<_>, DatasetError>>()?;

        info!(
            "manifest split `{}`: loaded {} paired records",
            self.split,
            records.len()
        );
        Ok(records)
    }
}
