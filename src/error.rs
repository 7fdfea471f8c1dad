//! Error types for the hue_arm_calib library

use std::path::PathBuf;
use thiserror::Error;

use crate::calibration::CorrespondenceRecord;

/// Result type alias for hue_arm_calib operations
pub type Result<T> = std::result::Result<T, CalibrationError>;

/// Error types for detection, collaborators and the calibration session
#[derive(Error, Debug)]
pub enum CalibrationError {
    /// Configuration document could not be read or parsed
    #[error("Invalid configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File system operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// OpenCV operation failed
    #[error("OpenCV error: {operation}")]
    OpenCv {
        operation: String,
        #[source]
        source: opencv::Error,
    },

    /// Static frame could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Frame source has no more frames to deliver
    #[error("Frame source unavailable: {reason}")]
    FrameSource { reason: String },

    /// Correspondence record could not be appended to the dataset
    #[error("Failed to persist record {record}: {source}")]
    Persistence {
        record: CorrespondenceRecord,
        #[source]
        source: std::io::Error,
    },

    /// Arm driver query or motion failed
    #[error("Arm {operation} failed: {reason}")]
    Arm { operation: String, reason: String },

    /// Arm reported fewer pose values than the deployment needs
    #[error("Arm pose has {actual} values, expected at least {expected}")]
    InvalidPose { expected: usize, actual: usize },

    /// Dataset line could not be parsed
    #[error("Dataset line {line}: {reason}")]
    DatasetParse { line: usize, reason: String },
}

impl CalibrationError {
    /// Create an OpenCV error with context
    pub fn opencv(operation: impl Into<String>, source: opencv::Error) -> Self {
        Self::OpenCv {
            operation: operation.into(),
            source,
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an arm driver error
    pub fn arm(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Arm {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Check if the session can keep running after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalibrationError::Arm { .. } | CalibrationError::InvalidPose { .. }
        )
    }

    /// Get operator-facing description for the status overlay and log
    pub fn user_message(&self) -> String {
        match self {
            CalibrationError::Arm { operation, .. } => {
                format!("Arm {} failed. Retry the capture or cancel.", operation)
            }
            CalibrationError::InvalidPose { expected, actual } => format!(
                "Arm reported {} pose values (need {}). Retry the capture or cancel.",
                actual, expected
            ),
            CalibrationError::Persistence { record, .. } => format!(
                "Could not save record {}. Calibration stopped to avoid losing data.",
                record
            ),
            CalibrationError::Config { path, .. } => {
                format!("Configuration {} is invalid.", path.display())
            }
            CalibrationError::FrameSource { .. } => {
                "Frame source stopped delivering frames.".to_string()
            }
            _ => "Calibration failed.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(CalibrationError::arm("go_home", "timeout").is_recoverable());
        assert!(CalibrationError::InvalidPose {
            expected: 3,
            actual: 2
        }
        .is_recoverable());

        let fatal = CalibrationError::Persistence {
            record: CorrespondenceRecord::new([1, 2], vec![3.0, 4.0, 5.0]),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(!fatal.is_recoverable());
        assert!(!CalibrationError::FrameSource {
            reason: "disconnected".into()
        }
        .is_recoverable());
    }

    #[test]
    fn test_persistence_message_names_record() {
        let err = CalibrationError::Persistence {
            record: CorrespondenceRecord::new([100, 200], vec![10.0, 20.0, 5.0]),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let text = err.to_string();
        assert!(text.contains("100,200,10.0,20.0,5.0"));
        assert!(text.contains("disk full"));
        assert!(err.user_message().contains("100,200"));
    }
}
