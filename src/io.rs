//! Reading datasets and configs, writing layouts and frame streams
//!
//! The format is picked from the file extension. JSON and YAML are both
//! accepted for input; layouts can be written as either. Frame streams are
//! always JSON lines, one frame per line.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::LayoutConfig;
use crate::model::Dataset;
use crate::session::Frame;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parsing error occurred
    #[error("parse error: {0}")]
    Parse(String),

    /// A writing error occurred
    #[error("write error: {0}")]
    Write(String),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// Serialization format of a dataset, config or layout file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// File extensions this format is read from and written to
    pub fn supported_extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }

    /// Check if this format handles the given file extension
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Find the format for a path based on its extension
    pub fn for_path(path: &Path) -> IoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        [Format::Json, Format::Yaml]
            .into_iter()
            .find(|format| format.supports_extension(ext))
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    fn parse<T: DeserializeOwned>(&self, reader: impl std::io::Read) -> IoResult<T> {
        match self {
            Format::Json => serde_json::from_reader(reader).map_err(|e| IoError::Parse(e.to_string())),
            Format::Yaml => serde_yaml::from_reader(reader).map_err(|e| IoError::Parse(e.to_string())),
        }
    }

    fn emit<T: Serialize>(&self, writer: impl Write, value: &T) -> IoResult<()> {
        match self {
            Format::Json => {
                serde_json::to_writer_pretty(writer, value).map_err(|e| IoError::Write(e.to_string()))
            }
            Format::Yaml => {
                serde_yaml::to_writer(writer, value).map_err(|e| IoError::Write(e.to_string()))
            }
        }
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> IoResult<T> {
    let format = Format::for_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    format.parse(reader)
}

/// Parse a dataset file (JSON or YAML)
pub fn read_dataset(path: &Path) -> IoResult<Dataset> {
    read_file(path)
}

/// Parse a config file (JSON or YAML); missing sections keep their defaults
pub fn read_config(path: &Path) -> IoResult<LayoutConfig> {
    read_file(path)
}

/// Write any serializable value, choosing the format from `path`
pub fn write_value<T: Serialize>(path: &Path, value: &T) -> IoResult<()> {
    let format = Format::for_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    format.emit(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Writes frames as JSON lines
pub struct FrameWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> IoResult<()> {
        serde_json::to_writer(&mut self.inner, frame).map_err(|e| IoError::Write(e.to_string()))?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of frames written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(mut self) -> IoResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;
    use crate::session::NodePosition;
    use std::path::PathBuf;

    #[test]
    fn format_supports_extension_case_insensitive() {
        assert!(Format::Json.supports_extension("json"));
        assert!(Format::Json.supports_extension("JSON"));
        assert!(Format::Yaml.supports_extension("yml"));
        assert!(!Format::Yaml.supports_extension("toml"));
    }

    #[test]
    fn format_for_path_extracts_extension() {
        assert_eq!(
            Format::for_path(&PathBuf::from("/data/graph.yaml")).unwrap(),
            Format::Yaml
        );
        assert!(matches!(
            Format::for_path(Path::new("graph.xyz")),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            Format::for_path(Path::new("noextension")),
            Err(IoError::UnknownExtension(_))
        ));
    }

    #[test]
    fn io_error_display() {
        let err = IoError::UnsupportedFormat("xyz".to_string());
        assert_eq!(err.to_string(), "unsupported format: xyz");

        let err = IoError::Parse("invalid syntax".to_string());
        assert_eq!(err.to_string(), "parse error: invalid syntax");
    }

    #[test]
    fn reads_yaml_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.yml");
        std::fs::write(
            &path,
            "nodes:\n  - {id: a, cluster: 1}\n  - {id: b, cluster: 2, x: 5, y: 6}\nlinks:\n  - {source: a, target: b, distance: 40}\n",
        )
        .unwrap();

        let dataset = read_dataset(&path).unwrap();
        assert_eq!(dataset.nodes.len(), 2);
        assert_eq!(dataset.nodes[0].cluster, Label::Int(1));
        assert_eq!(dataset.nodes[1].x, Some(5.0));
        assert_eq!(dataset.links[0].distance, Some(40.0));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"nodes\": [").unwrap();

        assert!(matches!(read_dataset(&path), Err(IoError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            read_config(Path::new("does/not/exist.yaml")),
            Err(IoError::Io(_))
        ));
    }

    #[test]
    fn write_value_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/layout.json");
        write_value(&path, &vec![1, 2, 3]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: Vec<i32> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn frame_writer_emits_one_line_per_frame() {
        let frame = Frame {
            tick: 1,
            alpha: 0.5,
            nodes: vec![NodePosition {
                id: Label::Int(7),
                x: 1.0,
                y: -2.0,
            }],
            links: vec![],
        };
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_frame(&frame).unwrap();
        writer.write_frame(&frame).unwrap();
        assert_eq!(writer.written(), 2);

        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let first = text.lines().next().unwrap();
        insta::assert_snapshot!(first, @r#"{"tick":1,"alpha":0.5,"nodes":[{"id":7,"x":1.0,"y":-2.0}],"links":[]}"#);
        assert_eq!(text.lines().count(), 2);
    }
}
