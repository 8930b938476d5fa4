//! Per-frame bounding-box annotations in MOTChallenge CSV format.
//!
//! Ground-truth and detection files share the row layout
//! `frame,id,bb_left,bb_top,bb_width,bb_height,...`; trailing columns
//! (confidence, class, visibility, world coordinates) are ignored.
//!
//! - [`normalize_ground_truth`] - stable-sort a raw ground-truth file by frame
//! - [`FrameAnnotationGrouper`] - stream a frame-sorted file as one group per frame

mod grouper;
mod normalizer;

pub use grouper::FrameAnnotationGrouper;
pub use normalizer::{normalize_ground_truth, normalized_path, sort_rows};

/// Minimum number of columns in an annotation row.
pub const MIN_FIELDS: usize = 6;

/// A single annotated bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Frame index (1-based)
    pub frame: usize,
    /// Object identity, `-1` in detection files
    pub object_id: i64,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Center of the box.
    pub fn midpoint(&self) -> Midpoint {
        Midpoint {
            x: self.left + self.width / 2.0,
            y: self.top + self.height / 2.0,
        }
    }
}

/// Center point of a bounding box, used for distance-based matching.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Midpoint {
    pub x: f64,
    pub y: f64,
}

impl Midpoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_squared(&self, other: &Midpoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Representation emitted for each annotation group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationMode {
    /// Full boxes (left, top, width, height)
    #[default]
    Boxes,
    /// Box centers only
    Midpoints,
}

/// The annotations of one frame, in the representation chosen by [`AnnotationMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAnnotations {
    Boxes(Vec<BoundingBox>),
    Midpoints(Vec<Midpoint>),
}

impl FrameAnnotations {
    /// Build the representation for `mode` from parsed boxes.
    pub fn from_boxes(boxes: Vec<BoundingBox>, mode: AnnotationMode) -> Self {
        match mode {
            AnnotationMode::Boxes => FrameAnnotations::Boxes(boxes),
            AnnotationMode::Midpoints => {
                FrameAnnotations::Midpoints(boxes.iter().map(BoundingBox::midpoint).collect())
            }
        }
    }

    /// An empty group in the representation for `mode`.
    pub fn empty(mode: AnnotationMode) -> Self {
        Self::from_boxes(Vec::new(), mode)
    }

    /// Midpoints of every annotation, regardless of representation.
    pub fn midpoints(&self) -> Vec<Midpoint> {
        match self {
            FrameAnnotations::Boxes(boxes) => boxes.iter().map(BoundingBox::midpoint).collect(),
            FrameAnnotations::Midpoints(points) => points.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FrameAnnotations::Boxes(boxes) => boxes.len(),
            FrameAnnotations::Midpoints(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All annotations sharing one frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGroup {
    /// Frame index (1-based)
    pub frame: usize,
    pub annotations: FrameAnnotations,
}

/// Parse the leading frame index of a row.
pub(crate) fn parse_frame_index(field: &str) -> std::result::Result<usize, String> {
    let field = field.trim();
    match field.parse::<usize>() {
        Ok(0) => Err("frame index must be >= 1".to_string()),
        Ok(frame) => Ok(frame),
        Err(e) => Err(format!("frame index '{}' is not an integer: {}", field, e)),
    }
}

/// Parse one CSV row into a [`BoundingBox`].
pub(crate) fn parse_record(line: &str) -> std::result::Result<BoundingBox, String> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < MIN_FIELDS {
        return Err(format!(
            "expected at least {} comma-separated fields, got {}",
            MIN_FIELDS,
            parts.len()
        ));
    }

    let frame = parse_frame_index(parts[0])?;

    let mut values = [0.0f64; MIN_FIELDS - 1];
    for (slot, field) in values.iter_mut().zip(&parts[1..MIN_FIELDS]) {
        let field = field.trim();
        *slot = field
            .parse()
            .map_err(|_| format!("field '{}' is not numeric", field))?;
    }

    Ok(BoundingBox {
        frame,
        object_id: values[0] as i64,
        left: values[1],
        top: values[2],
        width: values[3],
        height: values[4],
    })
}
