//! Streaming per-frame grouping of MOTChallenge annotation files.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::{parse_record, AnnotationMode, BoundingBox, FrameAnnotations, FrameGroup};
use crate::{Error, Result};

/// Groups a frame-sorted annotation stream into one [`FrameGroup`] per frame.
///
/// Groups are emitted for every frame index starting at 1 with no gaps: a
/// frame without any rows yields an empty group, so the n-th group always
/// belongs to the n-th image of the sequence. Only one group (plus one
/// look-ahead row) is held in memory.
///
/// The input must be sorted by frame; a row for a frame that was already
/// emitted is reported as a format error. After the first error the iterator
/// is exhausted.
#[derive(Debug)]
pub struct FrameAnnotationGrouper<R> {
    lines: Lines<R>,
    source: String,
    mode: AnnotationMode,
    /// Frame index of the next group to emit
    frame: usize,
    line_number: usize,
    /// Row read ahead that belongs to a later frame
    pending: Option<BoundingBox>,
    /// Keep emitting empty groups up to this frame after input ends
    last_frame: usize,
    input_done: bool,
    failed: bool,
}

impl FrameAnnotationGrouper<BufReader<File>> {
    /// Open an annotation file for grouping.
    pub fn open<P: AsRef<Path>>(path: P, mode: AnnotationMode) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open annotation file '{}': {}", path.display(), e),
            ))
        })?;

        Ok(Self::new(BufReader::new(file), mode).with_source(path.to_string_lossy()))
    }
}

impl<R: BufRead> FrameAnnotationGrouper<R> {
    /// Create a grouper over any buffered reader of CSV rows.
    pub fn new(reader: R, mode: AnnotationMode) -> Self {
        Self {
            lines: reader.lines(),
            source: "<reader>".to_string(),
            mode,
            frame: 1,
            line_number: 0,
            pending: None,
            last_frame: 0,
            input_done: false,
            failed: false,
        }
    }

    /// Name used for this input in error messages.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Keep yielding empty groups through `last_frame` once the input is exhausted.
    pub fn padded_to(mut self, last_frame: usize) -> Self {
        self.last_frame = last_frame;
        self
    }

    /// Frame index of the next group this grouper will emit.
    pub fn next_frame(&self) -> usize {
        self.frame
    }

    pub fn mode(&self) -> AnnotationMode {
        self.mode
    }

    fn read_record(&mut self) -> Result<Option<BoundingBox>> {
        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record = parse_record(&line)
                .map_err(|msg| Error::format(self.source.as_str(), self.line_number, msg))?;
            return Ok(Some(record));
        }
        Ok(None)
    }

    fn emit(&mut self, boxes: Vec<BoundingBox>) -> FrameGroup {
        let group = FrameGroup {
            frame: self.frame,
            annotations: FrameAnnotations::from_boxes(boxes, self.mode),
        };
        log::trace!("frame {}: {} annotations", group.frame, group.annotations.len());
        self.frame += 1;
        group
    }

    fn fail(&mut self, err: Error) -> Option<Result<FrameGroup>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for FrameAnnotationGrouper<R> {
    type Item = Result<FrameGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let mut buffer = Vec::new();

        if let Some(record) = self.pending.take() {
            if record.frame > self.frame {
                // Current frame has no rows of its own
                self.pending = Some(record);
                return Some(Ok(self.emit(buffer)));
            }
            buffer.push(record);
        }

        while !self.input_done {
            match self.read_record() {
                Ok(Some(record)) if record.frame == self.frame => buffer.push(record),
                Ok(Some(record)) if record.frame > self.frame => {
                    self.pending = Some(record);
                    return Some(Ok(self.emit(buffer)));
                }
                Ok(Some(record)) => {
                    let msg = format!(
                        "row for frame {} after frame {} was already emitted \
                         (input not sorted by frame)",
                        record.frame,
                        self.frame - 1
                    );
                    let err = Error::format(self.source.as_str(), self.line_number, msg);
                    return self.fail(err);
                }
                Ok(None) => self.input_done = true,
                Err(err) => return self.fail(err),
            }
        }

        if !buffer.is_empty() || self.frame <= self.last_frame {
            Some(Ok(self.emit(buffer)))
        } else {
            None
        }
    }
}
