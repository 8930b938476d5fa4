//! Ground-truth normalization.
//!
//! Raw MOTChallenge ground truth is grouped by object rather than by frame.
//! The grouper needs frame-ordered input, so the file is stably sorted by its
//! frame column and written next to the original.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::parse_frame_index;
use crate::{Error, Result};

/// Marker appended to the file stem of a normalized file.
pub const NORMALIZED_SUFFIX: &str = "_corrected";

/// Derived path of the normalized copy: `gt/gt.txt` -> `gt/gt_corrected.txt`.
pub fn normalized_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "txt".to_string());

    path.with_file_name(format!("{}{}.{}", stem, NORMALIZED_SUFFIX, extension))
}

/// Read all rows from `reader` and stably sort them by frame index.
///
/// Rows are returned verbatim without line terminators. Blank lines are dropped.
///
/// # Arguments
/// * `reader` - Source of CSV rows
/// * `source` - Name used in error messages
pub fn sort_rows<R: BufRead>(reader: R, source: &str) -> Result<Vec<String>> {
    let mut keyed: Vec<(usize, String)> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let first = line.split(',').next().unwrap_or_default();
        let frame = parse_frame_index(first).map_err(|msg| Error::format(source, idx + 1, msg))?;
        keyed.push((frame, line));
    }

    // sort_by_key is stable: rows of the same frame keep their file order
    keyed.sort_by_key(|(frame, _)| *frame);

    Ok(keyed.into_iter().map(|(_, line)| line).collect())
}

/// Sort a raw ground-truth file by frame index and write the normalized copy.
///
/// Overwrites any previous normalized file. Returns the path written.
pub fn normalize_ground_truth<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let source = path.to_string_lossy().to_string();

    let file = File::open(path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("failed to open ground truth file '{}': {}", source, e),
        ))
    })?;
    let rows = sort_rows(BufReader::new(file), &source)?;

    let out_path = normalized_path(path);
    let out_file = File::create(&out_path).map_err(|e| {
        Error::IoError(std::io::Error::new(
            e.kind(),
            format!("failed to create '{}': {}", out_path.display(), e),
        ))
    })?;

    let mut writer = BufWriter::new(out_file);
    for row in &rows {
        writeln!(writer, "{}", row)?;
    }
    writer.flush()?;

    log::debug!(
        "normalized {} rows from {} into {}",
        rows.len(),
        source,
        out_path.display()
    );

    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn frames_of(contents: &str) -> Vec<usize> {
        contents
            .lines()
            .map(|l| l.split(',').next().unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_normalized_path() {
        assert_eq!(
            normalized_path("/data/train/MOT16-02/gt/gt.txt"),
            PathBuf::from("/data/train/MOT16-02/gt/gt_corrected.txt")
        );
        assert_eq!(normalized_path("gt"), PathBuf::from("gt_corrected.txt"));
    }

    #[test]
    fn test_sort_is_stable() {
        let input = "3,1,0,0,1,1\n1,1,0,0,1,1\n2,1,0,0,1,1\n1,2,5,5,1,1\n";
        let rows = sort_rows(input.as_bytes(), "mem").unwrap();

        assert_eq!(
            rows,
            vec![
                "1,1,0,0,1,1".to_string(),
                "1,2,5,5,1,1".to_string(),
                "2,1,0,0,1,1".to_string(),
                "3,1,0,0,1,1".to_string(),
            ]
        );
    }

    #[test]
    fn test_sort_numeric_not_lexicographic() {
        let input = "10,1,0,0,1,1\n9,1,0,0,1,1\n100,1,0,0,1,1\n";
        let rows = sort_rows(input.as_bytes(), "mem").unwrap();
        assert_eq!(frames_of(&rows.join("\n")), vec![9, 10, 100]);
    }

    #[test]
    fn test_sort_rejects_bad_frame() {
        let input = "1,1,0,0,1,1\nx,1,0,0,1,1\n";
        match sort_rows(input.as_bytes(), "mem") {
            Err(Error::FormatError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_writes_sorted_copy() {
        let dir = tempfile::tempdir().unwrap();
        let gt = dir.path().join("gt.txt");
        let raw = "3,1,1,1,2,2,1,1,1\n1,1,2,2,2,2,1,1,1\n2,1,3,3,2,2,1,1,1\n1,2,4,4,2,2,1,1,1\n";
        fs::write(&gt, raw).unwrap();

        let out = normalize_ground_truth(&gt).unwrap();
        assert_eq!(out, dir.path().join("gt_corrected.txt"));

        let contents = fs::read_to_string(&out).unwrap();
        assert_eq!(frames_of(&contents), vec![1, 1, 2, 3]);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "1,1,2,2,2,2,1,1,1");
        assert_eq!(lines[1], "1,2,4,4,2,2,1,1,1");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let gt = dir.path().join("gt.txt");
        fs::write(&gt, "5,1,0,0,1,1\n2,3,0,0,1,1\r\n2,1,0,0,1,1\n\n4,1,0,0,1,1\n").unwrap();

        let first = normalize_ground_truth(&gt).unwrap();
        let once = fs::read(&first).unwrap();

        // Normalizing the normalized file is a fixed point
        let again = dir.path().join("again.txt");
        fs::write(&again, &once).unwrap();
        let second = normalize_ground_truth(&again).unwrap();
        assert_eq!(fs::read(&second).unwrap(), once);

        // Re-running on the original overwrites with identical bytes
        normalize_ground_truth(&gt).unwrap();
        assert_eq!(fs::read(&first).unwrap(), once);
    }

    #[test]
    fn test_normalize_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = normalize_ground_truth(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
