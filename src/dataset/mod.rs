//! MOTChallenge dataset traversal.
//!
//! A dataset root holds split directories (`train/`, `test/`), each holding
//! sequence directories named `<challenge>-<NN>`. Sequences are visited by
//! number starting at 1; the first number with no directory ends the dataset.

mod information_file;
mod sequence;

pub use information_file::{InformationFile, SequenceInfo, INFORMATION_FILE_NAME};
pub use sequence::{
    AnnotationSource, SequenceFrame, SequenceLoader, DETECTIONS_FILE, GROUND_TRUTH_FILE,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::annotations::AnnotationMode;
use crate::{Error, Result};

/// Default challenge prefix of sequence directories.
pub const DEFAULT_CHALLENGE: &str = "MOT16";

/// Configuration for the dataset loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Dataset root containing the split directories.
    pub root: PathBuf,

    /// Sequence directory prefix, e.g. `MOT16` for `MOT16-02`.
    pub challenge: String,

    /// Representation of annotation groups.
    pub mode: AnnotationMode,
}

impl LoaderConfig {
    /// Create a configuration for `root` with the MOT16 prefix and full boxes.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            challenge: DEFAULT_CHALLENGE.to_string(),
            mode: AnnotationMode::default(),
        }
    }

    pub fn with_challenge(mut self, challenge: impl Into<String>) -> Self {
        self.challenge = challenge.into();
        self
    }

    pub fn with_mode(mut self, mode: AnnotationMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new("./")
    }
}

/// Loader over all sequences of a dataset root.
#[derive(Debug, Clone)]
pub struct DataLoader {
    pub config: LoaderConfig,
}

impl DataLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Iterate the sequences in numeric order.
    pub fn sequences(&self) -> SequenceIter {
        SequenceIter {
            config: self.config.clone(),
            next_number: 1,
            done: false,
        }
    }

    /// Open sequence `number` directly. `Ok(None)` if no such directory exists.
    pub fn load_sequence(&self, number: usize) -> Result<Option<SequenceLoader>> {
        match find_sequence_dir(&self.config.root, &self.config.challenge, number)? {
            Some(dir) => SequenceLoader::open(dir, self.config.mode).map(Some),
            None => Ok(None),
        }
    }
}

impl IntoIterator for &DataLoader {
    type Item = Result<SequenceLoader>;
    type IntoIter = SequenceIter;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences()
    }
}

/// Directory name of sequence `number`: `MOT16-02`, `MOT16-13`, ...
pub fn sequence_dir_name(challenge: &str, number: usize) -> String {
    format!("{}-{:02}", challenge, number)
}

/// Locate `root/*/<challenge>-<NN>`.
///
/// Split directories are searched in sorted order; if several contain the
/// sequence, the first one is used. A root that does not exist holds no
/// sequences.
pub fn find_sequence_dir(
    root: &Path,
    challenge: &str,
    number: usize,
) -> Result<Option<PathBuf>> {
    let read_error = |e: io::Error| {
        Error::IoError(io::Error::new(
            e.kind(),
            format!("failed to read dataset root '{}': {}", root.display(), e),
        ))
    };

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(read_error(e)),
    };

    let mut splits = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_error)?.path();
        if path.is_dir() {
            splits.push(path);
        }
    }
    splits.sort();

    let name = sequence_dir_name(challenge, number);
    let mut candidates = splits
        .iter()
        .map(|split| split.join(&name))
        .filter(|path| path.is_dir());

    let found = candidates.next();
    if let Some(dir) = &found {
        let extra: Vec<PathBuf> = candidates.collect();
        if !extra.is_empty() {
            log::warn!(
                "{} found in several splits, using {} (ignoring {:?})",
                name,
                dir.display(),
                extra
            );
        }
    }

    Ok(found)
}

/// Iterator over the sequences of a dataset.
///
/// Ends at the first sequence number without a directory. An error opening a
/// sequence is yielded once, after which the iterator is exhausted.
#[derive(Debug)]
pub struct SequenceIter {
    config: LoaderConfig,
    next_number: usize,
    done: bool,
}

impl SequenceIter {
    /// Number of the sequence the next call to `next` will look for.
    pub fn next_number(&self) -> usize {
        self.next_number
    }
}

impl Iterator for SequenceIter {
    type Item = Result<SequenceLoader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let found = find_sequence_dir(&self.config.root, &self.config.challenge, self.next_number);
        let dir = match found {
            Ok(Some(dir)) => dir,
            Ok(None) => {
                log::debug!(
                    "no {} under {}, dataset ends",
                    sequence_dir_name(&self.config.challenge, self.next_number),
                    self.config.root.display()
                );
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        self.next_number += 1;
        let sequence = SequenceLoader::open(&dir, self.config.mode);
        if sequence.is_err() {
            self.done = true;
        }
        Some(sequence)
    }
}
