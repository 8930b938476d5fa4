//! MOT metrics accumulator.
//!
//! Follows the py-motmetrics `MOTAccumulator(auto_id=True)` event model:
//! each `update` is one frame, previous correspondences are kept while they
//! remain pairable, the remaining objects and hypotheses are paired by a
//! minimum-cost assignment, and everything left over becomes a miss or a
//! false positive.

use std::collections::{HashMap, HashSet};

use nalgebra::DMatrix;

use super::assignment::linear_sum_assignment;
use crate::{Error, Result};

/// Types of MOT events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// Object paired with the same hypothesis as last time (or first pairing)
    Match,
    /// Object paired with a different hypothesis than last time
    Switch,
    /// Object without hypothesis
    Miss,
    /// Hypothesis without object
    FalsePositive,
}

/// A single MOT event.
#[derive(Debug, Clone)]
pub struct Event {
    pub frame_id: u64,
    pub event_type: EventType,
    pub object_id: Option<u64>,
    pub hypothesis_id: Option<u64>,
    /// Pairing distance, only for matches and switches
    pub distance: Option<f64>,
}

/// Event totals over all frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventCounts {
    pub num_frames: usize,
    /// Pairings that kept their previous correspondence (or had none)
    pub num_matches: usize,
    pub num_switches: usize,
    /// Matches plus switches
    pub num_detections: usize,
    pub num_misses: usize,
    pub num_false_positives: usize,
    /// Ground-truth objects seen, summed over frames
    pub num_objects: usize,
    /// Sum of pairing distances
    pub total_distance: f64,
}

/// Accumulator for MOT (Multi-Object Tracking) metrics.
///
/// Frame ids are assigned automatically, starting at 0.
#[derive(Debug, Default)]
pub struct MOTAccumulator {
    events: Vec<Event>,
    /// object_id -> hypothesis_id of the most recent pairing
    last_match: HashMap<u64, u64>,
    next_frame_id: u64,
}

impl MOTAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the accumulator with one frame.
    ///
    /// # Arguments
    /// * `object_ids` - Ground truth object ids present in this frame
    /// * `hypothesis_ids` - Predicted ids present in this frame
    /// * `distances` - Distance matrix (objects x hypotheses), NaN for pairs that may not match
    ///
    /// # Returns
    /// The frame id assigned to this update.
    pub fn update(
        &mut self,
        object_ids: &[u64],
        hypothesis_ids: &[u64],
        distances: &DMatrix<f64>,
    ) -> Result<u64> {
        if distances.shape() != (object_ids.len(), hypothesis_ids.len()) {
            return Err(Error::MetricsError(format!(
                "distance matrix shape {:?} does not match {} objects x {} hypotheses",
                distances.shape(),
                object_ids.len(),
                hypothesis_ids.len()
            )));
        }

        let frame_id = self.next_frame_id;
        self.next_frame_id += 1;

        let mut matched_objects: HashSet<usize> = HashSet::new();
        let mut matched_hypotheses: HashSet<usize> = HashSet::new();

        // Keep previous correspondences that are still pairable
        for (oi, oid) in object_ids.iter().enumerate() {
            let Some(&prev_hid) = self.last_match.get(oid) else {
                continue;
            };
            let Some(hi) = hypothesis_ids.iter().position(|&h| h == prev_hid) else {
                continue;
            };
            let d = distances[(oi, hi)];
            if d.is_finite() && !matched_hypotheses.contains(&hi) {
                matched_objects.insert(oi);
                matched_hypotheses.insert(hi);
                self.push(frame_id, EventType::Match, Some(*oid), Some(prev_hid), Some(d));
            }
        }

        // Pair the rest by minimum total distance
        let free_objects: Vec<usize> = (0..object_ids.len())
            .filter(|i| !matched_objects.contains(i))
            .collect();
        let free_hypotheses: Vec<usize> = (0..hypothesis_ids.len())
            .filter(|j| !matched_hypotheses.contains(j))
            .collect();
        let sub = DMatrix::from_fn(free_objects.len(), free_hypotheses.len(), |r, c| {
            distances[(free_objects[r], free_hypotheses[c])]
        });

        for (r, c) in linear_sum_assignment(&sub) {
            let (oi, hi) = (free_objects[r], free_hypotheses[c]);
            let (oid, hid) = (object_ids[oi], hypothesis_ids[hi]);

            let event_type = match self.last_match.get(&oid) {
                Some(&prev) if prev != hid => EventType::Switch,
                _ => EventType::Match,
            };

            matched_objects.insert(oi);
            matched_hypotheses.insert(hi);
            self.last_match.insert(oid, hid);
            self.push(frame_id, event_type, Some(oid), Some(hid), Some(distances[(oi, hi)]));
        }

        for (oi, &oid) in object_ids.iter().enumerate() {
            if !matched_objects.contains(&oi) {
                self.push(frame_id, EventType::Miss, Some(oid), None, None);
            }
        }

        for (hi, &hid) in hypothesis_ids.iter().enumerate() {
            if !matched_hypotheses.contains(&hi) {
                self.push(frame_id, EventType::FalsePositive, None, Some(hid), None);
            }
        }

        Ok(frame_id)
    }

    fn push(
        &mut self,
        frame_id: u64,
        event_type: EventType,
        object_id: Option<u64>,
        hypothesis_id: Option<u64>,
        distance: Option<f64>,
    ) {
        self.events.push(Event {
            frame_id,
            event_type,
            object_id,
            hypothesis_id,
            distance,
        });
    }

    /// Get all collected events.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of frames (updates) seen so far.
    pub fn num_frames(&self) -> usize {
        self.next_frame_id as usize
    }

    /// Totals over all events.
    pub fn counts(&self) -> EventCounts {
        let mut counts = EventCounts {
            num_frames: self.num_frames(),
            ..EventCounts::default()
        };

        for event in &self.events {
            match event.event_type {
                EventType::Match | EventType::Switch => {
                    if event.event_type == EventType::Switch {
                        counts.num_switches += 1;
                    } else {
                        counts.num_matches += 1;
                    }
                    counts.num_detections += 1;
                    counts.num_objects += 1;
                    counts.total_distance += event.distance.unwrap_or(0.0);
                }
                EventType::Miss => {
                    counts.num_misses += 1;
                    counts.num_objects += 1;
                }
                EventType::FalsePositive => counts.num_false_positives += 1,
            }
        }

        counts
    }
}
