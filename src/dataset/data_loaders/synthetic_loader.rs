use std::cell::Cell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rayon::prelude::*;

use crate::dataset::common_structs::RawRecord;
use crate::dataset::error::DatasetError;
use crate::dataset::RecordSource;

/// Front-end for the synthetic, directory-structured set.
///
/// Walks `root` one level into class-named subdirectories; every image under
/// `<class>/rgb/` is a sample whose partner must sit at
/// `<class>/depth/<same filename>`. A missing partner is not an error: the
/// sample is skipped, counted, and the total is logged after the walk. A
/// missing or unreadable RGB image stays fatal.
///
/// Directories and files are visited in sorted path order so record order is
/// deterministic.
pub struct SyntheticSource {
    root: PathBuf,
    blacklist: HashSet<String>,
    skipped: Cell<usize>,
}

impl SyntheticSource {
    pub fn new(root: impl AsRef<Path>) -> SyntheticSource {
        SyntheticSource {
            root: root.as_ref().to_path_buf(),
            blacklist: HashSet::new(),
            skipped: Cell::new(0),
        }
    }

    /// Drop every class directory whose name is in `classes`.
    pub fn with_blacklist<I, S>(mut self, classes: I) -> SyntheticSource
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blacklist = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Samples skipped during the last walk because their depth partner was
    /// missing.
    pub fn skipped(&self) -> usize {
        self.skipped.get()
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, DatasetError> {
    let io_err = |source| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.path());
    Ok(entries)
}

impl RecordSource for SyntheticSource {
    fn produce_records(&self) -> Result<Vec<RawRecord>, DatasetError> {
        let mut pending: Vec<(PathBuf, PathBuf, String)> = Vec::new();
        let mut skipped = 0usize;

        for class_entry in sorted_entries(&self.root)? {
            let class_dir = class_entry.path();
            if !class_dir.is_dir() {
                continue;
            }
            let class_label = class_entry.file_name().to_string_lossy().into_owned();
            if self.blacklist.contains(&class_label) {
                continue;
            }

            let depth_dir = class_dir.join("depth");
            for img_entry in sorted_entries(&class_dir.join("rgb"))? {
                let rgb_path = img_entry.path();
                if !rgb_path.is_file() {
                    continue;
                }
                let depth_path = depth_dir.join(img_entry.file_name());
                if !depth_path.is_file() {
                    skipped += 1;
                    warn!(
                        "skipping `{}`: no depth partner at `{}`",
                        rgb_path.display(),
                        depth_path.display()
                    );
                    continue;
                }
                pending.push((rgb_path, depth_path, class_label.clone()));
            }
        }

        info!(
            "synthetic walk of `{}`: {} paired samples, {} skipped for missing depth partner",
            self.root.display(),
            pending.len(),
            skipped
        );
        self.skipped.set(skipped);

        pending
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
            .collect()
    }
}
