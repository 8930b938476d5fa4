//! MOTChallenge seqinfo.ini parser.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// Name of the sequence manifest inside every sequence directory.
pub const INFORMATION_FILE_NAME: &str = "seqinfo.ini";

/// Raw lines of a MOTChallenge seqinfo.ini file.
///
/// These files contain metadata about video sequences in the format:
/// ```ini
/// [Sequence]
/// name=MOT16-02
/// imDir=img1
/// frameRate=30
/// seqLength=600
/// imWidth=1920
/// imHeight=1080
/// imExt=.jpg
/// ```
///
/// Entries are read by line position, not by key lookup.
#[derive(Debug)]
pub struct InformationFile {
    path: String,
    lines: Vec<String>,
}

impl InformationFile {
    /// Create a new InformationFile by reading the given file path.
    pub fn new<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref().to_string_lossy().to_string();
        let file = File::open(&file_path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open information file '{}': {}", path, e),
            ))
        })?;

        let lines = BufReader::new(file).lines().collect::<std::io::Result<Vec<String>>>()?;

        Ok(Self { path, lines })
    }

    /// Build from in-memory contents, `source` names it in errors.
    pub fn from_contents(source: &str, contents: &str) -> Self {
        Self {
            path: source.to_string(),
            lines: contents.lines().map(str::to_string).collect(),
        }
    }

    /// Value of the `key=value` entry on 0-based line `index`.
    ///
    /// Fails if the line is missing, has no `=`, or holds a different key.
    pub fn entry(&self, index: usize, key: &str) -> Result<&str> {
        let line = self.lines.get(index).ok_or_else(|| {
            Error::format(&self.path, index + 1, format!("missing line for '{}'", key))
        })?;

        let (found_key, value) = line.split_once('=').ok_or_else(|| {
            let message = format!("expected '{}=<value>', got '{}'", key, line);
            Error::format(&self.path, index + 1, message)
        })?;

        if found_key.trim() != key {
            return Err(Error::format(
                &self.path,
                index + 1,
                format!("expected key '{}', got '{}'", key, found_key.trim()),
            ));
        }

        Ok(value.trim())
    }

    /// Parse the entry on line `index` into `T`.
    pub fn parse_entry<T: FromStr>(&self, index: usize, key: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let value = self.entry(index, key)?;
        value.parse().map_err(|e: T::Err| {
            Error::format(
                &self.path,
                index + 1,
                format!("value '{}' for '{}' is invalid: {}", value, key, e),
            )
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Immutable metadata of one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    pub name: String,
    /// Image directory relative to the sequence directory
    pub im_dir: String,
    pub frame_rate: u32,
    /// Declared number of frames
    pub seq_length: usize,
    pub im_width: u32,
    pub im_height: u32,
    /// Image extension including the dot, e.g. `.jpg`
    pub im_ext: String,
}

impl SequenceInfo {
    /// Load the manifest of the sequence at `sequence_dir`.
    pub fn load<P: AsRef<Path>>(sequence_dir: P) -> Result<Self> {
        let info = InformationFile::new(sequence_dir.as_ref().join(INFORMATION_FILE_NAME))?;
        Self::from_information_file(&info)
    }

    /// Read the fixed-position entries on lines 2..=8 (line 1 is the section header).
    pub fn from_information_file(info: &InformationFile) -> Result<Self> {
        Ok(Self {
            name: info.entry(1, "name")?.to_string(),
            im_dir: info.entry(2, "imDir")?.to_string(),
            frame_rate: info.parse_entry(3, "frameRate")?,
            seq_length: info.parse_entry(4, "seqLength")?,
            im_width: info.parse_entry(5, "imWidth")?,
            im_height: info.parse_entry(6, "imHeight")?,
            im_ext: info.entry(7, "imExt")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SEQINFO: &str = "[Sequence]\nname=MOT16-02\nimDir=img1\nframeRate=30\nseqLength=600\n\
                           imWidth=1920\nimHeight=1080\nimExt=.jpg\n";

    fn create_temp_seqinfo() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SEQINFO).unwrap();
        file
    }

    #[test]
    fn test_load_sequence_info() {
        let file = create_temp_seqinfo();
        let info = InformationFile::new(file.path()).unwrap();
        let seq = SequenceInfo::from_information_file(&info).unwrap();

        assert_eq!(
            seq,
            SequenceInfo {
                name: "MOT16-02".to_string(),
                im_dir: "img1".to_string(),
                frame_rate: 30,
                seq_length: 600,
                im_width: 1920,
                im_height: 1080,
                im_ext: ".jpg".to_string(),
            }
        );
    }

    #[test]
    fn test_crlf_and_trailing_blank_line() {
        let contents = SEQINFO.replace('\n', "\r\n") + "\r\n";
        let info = InformationFile::from_contents("mem", &contents);
        let seq = SequenceInfo::from_information_file(&info).unwrap();
        assert_eq!(seq.im_ext, ".jpg");
        assert_eq!(seq.seq_length, 600);
    }

    #[test]
    fn test_entry_wrong_position() {
        // frameRate and seqLength swapped
        let contents =
            SEQINFO.replace("frameRate=30\nseqLength=600", "seqLength=600\nframeRate=30");
        let info = InformationFile::from_contents("mem", &contents);

        match SequenceInfo::from_information_file(&info) {
            Err(Error::FormatError { line, .. }) => assert_eq!(line, 4),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_manifest() {
        let info = InformationFile::from_contents("mem", "[Sequence]\nname=MOT16-02\nimDir=img1\n");
        assert!(matches!(
            SequenceInfo::from_information_file(&info),
            Err(Error::FormatError { line: 4, .. })
        ));
    }

    #[test]
    fn test_non_numeric_value() {
        let contents = SEQINFO.replace("seqLength=600", "seqLength=many");
        let info = InformationFile::from_contents("mem", &contents);
        assert!(SequenceInfo::from_information_file(&info).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(SequenceInfo::load(dir.path()), Err(Error::IoError(_))));
    }
}
