//! Metric computation and reporting.

use std::fmt;

use serde::Serialize;

use super::{EventCounts, MOTAccumulator};

/// Metrics that can be computed from an accumulator.
///
/// Names follow py-motmetrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NumFrames,
    /// Multi-Object Tracking Accuracy
    Mota,
    /// Multi-Object Tracking Precision (mean pairing distance)
    Motp,
    Precision,
    Recall,
    /// Pairings without an identity switch
    NumMatches,
    NumSwitches,
    /// Matches plus switches
    NumDetections,
    NumMisses,
    NumFalsePositives,
    NumObjects,
}

impl Metric {
    /// The default report: frame count, accuracy and precision.
    pub const STANDARD: [Metric; 3] = [Metric::NumFrames, Metric::Mota, Metric::Motp];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::NumFrames => "num_frames",
            Metric::Mota => "mota",
            Metric::Motp => "motp",
            Metric::Precision => "precision",
            Metric::Recall => "recall",
            Metric::NumMatches => "num_matches",
            Metric::NumSwitches => "num_switches",
            Metric::NumDetections => "num_detections",
            Metric::NumMisses => "num_misses",
            Metric::NumFalsePositives => "num_false_positives",
            Metric::NumObjects => "num_objects",
        }
    }

    fn is_count(&self) -> bool {
        !matches!(
            self,
            Metric::Mota | Metric::Motp | Metric::Precision | Metric::Recall
        )
    }

    /// Evaluate this metric on event totals.
    ///
    /// Ratios with a zero denominator are NaN.
    pub fn evaluate(&self, counts: &EventCounts) -> f64 {
        let ratio = |num: f64, den: usize| {
            if den == 0 {
                f64::NAN
            } else {
                num / den as f64
            }
        };

        match self {
            Metric::NumFrames => counts.num_frames as f64,
            Metric::Mota => {
                let errors = counts.num_misses + counts.num_false_positives + counts.num_switches;
                1.0 - ratio(errors as f64, counts.num_objects)
            }
            Metric::Motp => ratio(counts.total_distance, counts.num_detections),
            Metric::Precision => ratio(
                counts.num_detections as f64,
                counts.num_detections + counts.num_false_positives,
            ),
            Metric::Recall => ratio(counts.num_detections as f64, counts.num_objects),
            Metric::NumMatches => counts.num_matches as f64,
            Metric::NumSwitches => counts.num_switches as f64,
            Metric::NumDetections => counts.num_detections as f64,
            Metric::NumMisses => counts.num_misses as f64,
            Metric::NumFalsePositives => counts.num_false_positives as f64,
            Metric::NumObjects => counts.num_objects as f64,
        }
    }
}

/// One computed metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValue {
    pub metric: Metric,
    pub value: f64,
}

/// Metrics computed for one sequence, in the order requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub name: String,
    pub values: Vec<MetricValue>,
}

impl MetricsReport {
    /// Value of `metric`, if it was requested.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values
            .iter()
            .find(|v| v.metric == metric)
            .map(|v| v.value)
    }
}

impl fmt::Display for MetricsReport {
    /// Renders a one-row table:
    ///
    /// ```text
    ///           num_frames      mota      motp
    /// MOT16-02         600  0.512345  0.123456
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self
            .values
            .iter()
            .map(|v| {
                if v.metric.is_count() {
                    format!("{}", v.value)
                } else {
                    format!("{:.6}", v.value)
                }
            })
            .collect();
        let widths: Vec<usize> = self
            .values
            .iter()
            .zip(&cells)
            .map(|(v, cell)| v.metric.name().len().max(cell.len()))
            .collect();

        write!(f, "{:width$}", "", width = self.name.len())?;
        for (v, width) in self.values.iter().zip(&widths) {
            write!(f, "  {:>width$}", v.metric.name(), width = *width)?;
        }
        writeln!(f)?;

        write!(f, "{}", self.name)?;
        for (cell, width) in cells.iter().zip(&widths) {
            write!(f, "  {:>width$}", cell, width = *width)?;
        }
        Ok(())
    }
}

/// Compute `metrics` from an accumulator.
pub fn compute(accumulator: &MOTAccumulator, metrics: &[Metric], name: &str) -> MetricsReport {
    let counts = accumulator.counts();
    MetricsReport {
        name: name.to_string(),
        values: metrics
            .iter()
            .map(|&metric| MetricValue {
                metric,
                value: metric.evaluate(&counts),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    #[test]
    fn test_empty_accumulator() {
        let acc = MOTAccumulator::new();
        let report = compute(&acc, &Metric::STANDARD, "empty");

        assert_eq!(report.get(Metric::NumFrames), Some(0.0));
        assert!(report.get(Metric::Mota).unwrap().is_nan());
        assert!(report.get(Metric::Motp).unwrap().is_nan());
        assert_eq!(report.get(Metric::Recall), None);
    }

    #[test]
    fn test_metrics_recall_precision() {
        let mut acc = MOTAccumulator::new();
        let one = DMatrix::from_row_slice(1, 1, &[0.0]);

        // 3 matches, 2 misses, 1 false positive
        acc.update(&[1], &[1], &one).unwrap();
        acc.update(&[1], &[1], &one).unwrap();
        acc.update(&[1], &[1], &one).unwrap();
        acc.update(&[1], &[], &DMatrix::zeros(1, 0)).unwrap();
        acc.update(&[1], &[], &DMatrix::zeros(1, 0)).unwrap();
        acc.update(&[], &[7], &DMatrix::zeros(0, 1)).unwrap();

        let report = compute(&acc, &[Metric::Recall, Metric::Precision, Metric::NumFrames], "s");
        assert_relative_eq!(report.get(Metric::Recall).unwrap(), 0.6, epsilon = 1e-10);
        assert_relative_eq!(report.get(Metric::Precision).unwrap(), 0.75, epsilon = 1e-10);
        assert_eq!(report.get(Metric::NumFrames), Some(6.0));
    }

    #[test]
    fn test_metrics_mota_motp() {
        let mut acc = MOTAccumulator::new();

        // 2 matches at distances 1 and 3, 1 miss, 1 switch in the next frame
        let d = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, f64::NAN, 3.0]);
        acc.update(&[1, 2], &[1, 2], &d).unwrap();
        let d = DMatrix::from_row_slice(2, 1, &[2.0, f64::NAN]);
        acc.update(&[1, 2], &[5], &d).unwrap();

        let report = compute(&acc, &Metric::STANDARD, "s");
        // objects = 4, errors = 1 miss + 1 switch
        assert_relative_eq!(report.get(Metric::Mota).unwrap(), 0.5, epsilon = 1e-10);
        assert_relative_eq!(report.get(Metric::Motp).unwrap(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_switches_are_not_matches() {
        let mut acc = MOTAccumulator::new();
        let d = DMatrix::from_row_slice(1, 1, &[2.0]);

        acc.update(&[1], &[1], &d).unwrap();
        acc.update(&[1], &[2], &d).unwrap();

        let report = compute(
            &acc,
            &[
                Metric::NumMatches,
                Metric::NumSwitches,
                Metric::NumDetections,
                Metric::Motp,
                Metric::Recall,
                Metric::Precision,
            ],
            "s",
        );
        assert_eq!(report.get(Metric::NumMatches), Some(1.0));
        assert_eq!(report.get(Metric::NumSwitches), Some(1.0));
        assert_eq!(report.get(Metric::NumDetections), Some(2.0));
        // The switched pairing still counts as a detection
        assert_relative_eq!(report.get(Metric::Motp).unwrap(), 2.0, epsilon = 1e-10);
        assert_relative_eq!(report.get(Metric::Recall).unwrap(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(report.get(Metric::Precision).unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_display_table() {
        let report = MetricsReport {
            name: "MOT16-02".to_string(),
            values: vec![
                MetricValue { metric: Metric::NumFrames, value: 600.0 },
                MetricValue { metric: Metric::Mota, value: 0.5 },
            ],
        };

        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("num_frames"));
        assert!(lines[0].contains("mota"));
        assert!(lines[1].starts_with("MOT16-02"));
        assert!(lines[1].contains("600"));
        assert!(lines[1].contains("0.500000"));
    }

    #[test]
    fn test_report_serializes() {
        let report = MetricsReport {
            name: "MOT16-02".to_string(),
            values: vec![MetricValue { metric: Metric::NumFrames, value: 3.0 }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"name":"MOT16-02","values":[{"metric":"num_frames","value":3.0}]}"#
        );
    }
}
