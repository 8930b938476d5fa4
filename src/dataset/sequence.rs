//! Per-sequence frame iteration and metric accumulation.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use nalgebra::DMatrix;

use super::information_file::SequenceInfo;
use crate::annotations::{
    normalize_ground_truth, AnnotationMode, FrameAnnotationGrouper, FrameAnnotations, Midpoint,
};
use crate::metrics::{self, norm2squared_matrix, MOTAccumulator, Metric, MetricsReport};
use crate::Result;

/// Ground truth of a training sequence, relative to the sequence directory.
pub const GROUND_TRUTH_FILE: &str = "gt/gt.txt";
/// Public detections, relative to the sequence directory.
pub const DETECTIONS_FILE: &str = "det/det.txt";

/// Which annotation file a sequence is paired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationSource {
    /// Normalized `gt/gt.txt` (training split)
    GroundTruth,
    /// `det/det.txt` (testing split, no ground truth available)
    Detections,
}

impl AnnotationSource {
    /// Training sequences are recognized by `train` anywhere in their path.
    pub fn for_sequence(path: &Path) -> Self {
        if path.to_string_lossy().contains("train") {
            AnnotationSource::GroundTruth
        } else {
            AnnotationSource::Detections
        }
    }
}

/// One image of a sequence paired with its annotations.
#[derive(Debug)]
pub struct SequenceFrame {
    /// Frame index (1-based)
    pub index: usize,
    pub path: PathBuf,
    pub image: DynamicImage,
    pub annotations: FrameAnnotations,
}

/// Loader for a single MOTChallenge sequence.
///
/// Iterating yields frames `1..=seq_length` in order. Iteration stops early,
/// without error, at the first image missing on disk. The loader is itself the
/// iterator, so metrics can be updated between pulls:
///
/// ```rust,no_run
/// # use motchallenge_rs::{AnnotationMode, SequenceLoader};
/// let mut sequence = SequenceLoader::open("data/train/MOT16-02", AnnotationMode::Midpoints)?;
/// while let Some(frame) = sequence.next() {
///     let frame = frame?;
///     sequence.update_metrics(&frame.annotations.midpoints())?;
/// }
/// println!("{}", sequence.display_metrics());
/// # Ok::<(), motchallenge_rs::Error>(())
/// ```
#[derive(Debug)]
pub struct SequenceLoader {
    path: PathBuf,
    info: SequenceInfo,
    mode: AnnotationMode,
    source: AnnotationSource,
    grouper: FrameAnnotationGrouper<BufReader<File>>,
    accumulator: MOTAccumulator,
    next_frame: usize,
    finished: bool,
    /// Ground-truth midpoints of the most recently yielded frame
    current_midpoints: Vec<Midpoint>,
}

impl SequenceLoader {
    /// Open the sequence at `path`.
    ///
    /// Reads `seqinfo.ini` and opens the annotation file. For training
    /// sequences the ground truth is normalized first.
    pub fn open<P: AsRef<Path>>(path: P, mode: AnnotationMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let info = SequenceInfo::load(&path)?;
        let source = AnnotationSource::for_sequence(&path);

        let annotation_path = match source {
            AnnotationSource::GroundTruth => normalize_ground_truth(path.join(GROUND_TRUTH_FILE))?,
            AnnotationSource::Detections => path.join(DETECTIONS_FILE),
        };
        let grouper =
            FrameAnnotationGrouper::open(&annotation_path, mode)?.padded_to(info.seq_length);

        log::info!(
            "opened sequence {} ({} frames, {:?} from {})",
            info.name,
            info.seq_length,
            source,
            annotation_path.display()
        );

        Ok(Self {
            path,
            info,
            mode,
            source,
            grouper,
            accumulator: MOTAccumulator::new(),
            next_frame: 1,
            finished: false,
            current_midpoints: Vec::new(),
        })
    }

    pub fn info(&self) -> &SequenceInfo {
        &self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AnnotationMode {
        self.mode
    }

    pub fn source(&self) -> AnnotationSource {
        self.source
    }

    pub fn accumulator(&self) -> &MOTAccumulator {
        &self.accumulator
    }

    /// Path of the image for 1-based `frame`: `<seq>/<imDir>/<frame:06><imExt>`.
    pub fn image_path(&self, frame: usize) -> PathBuf {
        self.path
            .join(&self.info.im_dir)
            .join(format!("{:06}{}", frame, self.info.im_ext))
    }

    /// Ground-truth midpoints of the frame last yielded.
    pub fn current_midpoints(&self) -> &[Midpoint] {
        &self.current_midpoints
    }

    /// Score predictions for the frame last yielded.
    ///
    /// Computes squared Euclidean distances between `predictions` and the
    /// frame's ground-truth midpoints and records them in the accumulator,
    /// with ground-truth and prediction indices as ids.
    ///
    /// # Returns
    /// The distance matrix, shape `predictions.len() x ground_truth.len()`.
    pub fn update_metrics(&mut self, predictions: &[Midpoint]) -> Result<DMatrix<f64>> {
        let distances = norm2squared_matrix(predictions, &self.current_midpoints, f64::INFINITY);

        let gt_ids: Vec<u64> = (0..self.current_midpoints.len() as u64).collect();
        let pred_ids: Vec<u64> = (0..predictions.len() as u64).collect();
        self.accumulator
            .update(&gt_ids, &pred_ids, &distances.transpose())?;

        Ok(distances)
    }

    /// Compute `metrics` over all frames scored so far.
    pub fn compute_metrics(&self, metrics: &[Metric]) -> MetricsReport {
        metrics::compute(&self.accumulator, metrics, &self.info.name)
    }

    /// Compute the standard report (frames, MOTA, MOTP) and log it.
    pub fn display_metrics(&self) -> MetricsReport {
        let report = self.compute_metrics(&Metric::STANDARD);
        log::info!("metrics for {}:\n{}", self.info.name, report);
        report
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Iterator for SequenceLoader {
    type Item = Result<SequenceFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.next_frame > self.info.seq_length {
            return None;
        }

        let index = self.next_frame;
        let path = self.image_path(index);
        if !path.is_file() {
            log::warn!(
                "{}: image {} missing, stopping after {} of {} frames",
                self.info.name,
                path.display(),
                index - 1,
                self.info.seq_length
            );
            self.finish();
            return None;
        }

        let image = match image::open(&path) {
            Ok(image) => image,
            Err(e) => {
                self.finish();
                return Some(Err(e.into()));
            }
        };

        let annotations = match self.grouper.next() {
            Some(Ok(group)) => {
                debug_assert_eq!(group.frame, index);
                group.annotations
            }
            Some(Err(e)) => {
                self.finish();
                return Some(Err(e));
            }
            None => FrameAnnotations::empty(self.mode),
        };

        log::debug!("{}: frame {} with {} annotations", self.info.name, index, annotations.len());

        self.current_midpoints = annotations.midpoints();
        self.next_frame += 1;

        Some(Ok(SequenceFrame {
            index,
            path,
            image,
            annotations,
        }))
    }
}
