//! Correspondence records and the append-only dataset file
//!
//! Each record is one line: the target's camera coordinates followed by the
//! arm pose, comma separated, no header.
//!
//! ```text
//! 100,200,10.0,20.0,5.0
//! 312,240,198.5,-12.0,-20.0,9.0
//! ```

use std::fmt;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::{CalibrationError, Result};

/// Camera-space target paired with the arm pose that reached it
#[derive(Debug, Clone, PartialEq)]
pub struct CorrespondenceRecord {
    /// Target point in pixels (x, y)
    pub target: [i32; 2],
    /// End-effector pose in the arm driver's native layout
    pub pose: Vec<f64>,
}

impl CorrespondenceRecord {
    pub fn new(target: [i32; 2], pose: Vec<f64>) -> Self {
        Self { target, pose }
    }

    /// Parse one dataset line; `line_number` is 1-based and only used in errors
    ///
    /// Accepts any pose with at least two values so that 3- and 4-value
    /// datasets can both be read.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(CalibrationError::DatasetParse {
                line: line_number,
                reason: format!("expected at least 4 fields, found {}", fields.len()),
            });
        }

        let mut target = [0i32; 2];
        for (slot, field) in target.iter_mut().zip(&fields[..2]) {
            *slot = field.parse().map_err(|_| CalibrationError::DatasetParse {
                line: line_number,
                reason: format!("target coordinate {:?} is not an integer", field),
            })?;
        }

        let pose = fields[2..]
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|_| CalibrationError::DatasetParse {
                    line: line_number,
                    reason: format!("pose value {:?} is not a number", field),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { target, pose })
    }
}

impl fmt::Display for CorrespondenceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.target[0], self.target[1])?;
        for value in &self.pose {
            write!(f, ",{:?}", value)?;
        }
        Ok(())
    }
}

/// Destination for completed records
pub trait RecordSink {
    /// Persist one record; an error means the record was not stored
    fn append(&mut self, record: &CorrespondenceRecord) -> std::io::Result<()>;
}

/// Record sink over any writer, one flushed line per record
#[derive(Debug)]
pub struct DatasetWriter<W: Write> {
    writer: W,
}

impl<W: Write> DatasetWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for DatasetWriter<W> {
    fn append(&mut self, record: &CorrespondenceRecord) -> std::io::Result<()> {
        // Single write per record
        let line = format!("{}\n", record);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()
    }
}

/// Dataset file opened in create+append mode for every record
#[derive(Debug, Clone)]
pub struct DatasetFile {
    path: PathBuf,
}

impl DatasetFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for DatasetFile {
    fn append(&mut self, record: &CorrespondenceRecord) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let length = file.metadata()?.len();

        let result = DatasetWriter::new(&mut file).append(record);
        if result.is_err() {
            // Drop any bytes of the failed line that reached the file
            if let Err(e) = file.set_len(length) {
                warn!(
                    "could not roll back partial record in {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
        result
    }
}

/// Read every record from a dataset, skipping blank lines
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<CorrespondenceRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CalibrationError::io("Failed to read dataset line", e))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(CorrespondenceRecord::parse_line(&line, index + 1)?);
    }
    Ok(records)
}

/// Read a dataset file
pub fn read_dataset(path: &Path) -> Result<Vec<CorrespondenceRecord>> {
    let file = std::fs::File::open(path).map_err(|e| {
        CalibrationError::io(format!("Failed to open dataset {}", path.display()), e)
    })?;
    read_records(BufReader::new(file))
}
