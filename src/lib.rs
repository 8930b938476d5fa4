//! # motchallenge-rs - MOTChallenge dataset loading and evaluation
//!
//! Loads multi-object-tracking benchmark datasets laid out in the
//! [MOTChallenge](https://motchallenge.net/instructions) format, pairs every
//! frame image with its per-frame annotations and accumulates MOTA/MOTP
//! metrics across a sequence.
//!
//! ## Layout
//!
//! ```text
//! root/
//!   train/MOT16-02/{seqinfo.ini, gt/gt.txt, det/det.txt, img1/000001.jpg, ...}
//!   test/MOT16-01/{seqinfo.ini, det/det.txt, img1/000001.jpg, ...}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use motchallenge_rs::{AnnotationMode, DataLoader, LoaderConfig};
//!
//! let loader = DataLoader::new(LoaderConfig::new("./data/").with_mode(AnnotationMode::Midpoints));
//! for sequence in &loader {
//!     let mut sequence = sequence?;
//!     while let Some(frame) = sequence.next() {
//!         let frame = frame?;
//!         let predictions = frame.annotations.midpoints();
//!         sequence.update_metrics(&predictions)?;
//!     }
//!     println!("{}", sequence.display_metrics());
//! }
//! # Ok::<(), motchallenge_rs::Error>(())
//! ```

// Public modules
pub mod annotations;
pub mod dataset;
pub mod metrics;

// Re-exports for convenience
pub use annotations::{
    normalize_ground_truth, AnnotationMode, BoundingBox, FrameAnnotationGrouper,
    FrameAnnotations, FrameGroup, Midpoint,
};
pub use dataset::{
    AnnotationSource, DataLoader, LoaderConfig, SequenceFrame, SequenceInfo, SequenceIter,
    SequenceLoader,
};
pub use metrics::{MOTAccumulator, Metric, MetricsReport};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur while loading or evaluating a dataset
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Format error in {path}:{line}: {message}")]
        FormatError {
            path: String,
            line: usize,
            message: String,
        },

        #[error("Image error: {0}")]
        ImageError(#[from] image::ImageError),

        #[error("Metrics evaluation error: {0}")]
        MetricsError(String),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
    }

    impl Error {
        pub(crate) fn format(
            path: impl Into<String>,
            line: usize,
            message: impl Into<String>,
        ) -> Self {
            Error::FormatError {
                path: path.into(),
                line,
                message: message.into(),
            }
        }
    }

    /// Result type for motchallenge operations
    pub type Result<T> = std::result::Result<T, Error>;
}
