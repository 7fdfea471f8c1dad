//! Frame sources for the interactive tools
//!
//! A source is picked explicitly through [`SourceKind`]; every variant
//! delivers BGR frames resized to the working resolution.

use log::{info, warn};
use opencv::{
    core::{Mat, Size},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::PathBuf;
use std::str::FromStr;

use crate::image_loader::load_image;
use crate::{CalibrationError, Result};

/// Blocking supplier of frames
pub trait FrameSource {
    /// Next frame at the source's working resolution
    fn next_frame(&mut self) -> Result<Mat>;

    /// Release the underlying device
    fn close(&mut self) -> Result<()>;
}

/// Which kind of source to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Video device by index (`/dev/video<index>`)
    Camera { index: i32 },
    /// Single image file, served repeatedly
    Image { path: PathBuf },
}

impl FromStr for SourceKind {
    type Err = std::convert::Infallible;

    /// `/dev/videoN` or a bare number selects a camera, anything else is a path
    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let index = value
            .strip_prefix("/dev/video")
            .unwrap_or(value)
            .parse::<i32>();
        Ok(match index {
            Ok(index) => SourceKind::Camera { index },
            Err(_) => SourceKind::Image {
                path: PathBuf::from(value),
            },
        })
    }
}

impl SourceKind {
    /// Open the source, delivering frames of `size`
    pub fn open(&self, size: Size) -> Result<Box<dyn FrameSource>> {
        match self {
            SourceKind::Camera { index } => Ok(Box::new(CameraSource::open(*index, size)?)),
            SourceKind::Image { path } => Ok(Box::new(ImageSource::open(path, size)?)),
        }
    }
}

/// Resize a frame to the working resolution
pub fn resize_frame(frame: &Mat, size: Size) -> Result<Mat> {
    let mut resized = Mat::default();
    imgproc::resize(frame, &mut resized, size, 0.0, 0.0, imgproc::INTER_LINEAR)
        .map_err(|e| CalibrationError::opencv("Frame resize", e))?;
    Ok(resized)
}

/// Live camera through OpenCV `videoio`
pub struct CameraSource {
    capture: VideoCapture,
    size: Size,
    last_frame: Option<Mat>,
}

impl CameraSource {
    pub fn open(index: i32, size: Size) -> Result<Self> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| CalibrationError::opencv(format!("Opening camera {}", index), e))?;
        let opened = capture
            .is_opened()
            .map_err(|e| CalibrationError::opencv("Camera status", e))?;
        if !opened {
            return Err(CalibrationError::FrameSource {
                reason: format!("camera /dev/video{} could not be opened", index),
            });
        }
        info!("camera /dev/video{} opened", index);

        Ok(Self {
            capture,
            size,
            last_frame: None,
        })
    }
}

impl FrameSource for CameraSource {
    /// Read the next frame; an empty read reuses the previous frame
    fn next_frame(&mut self) -> Result<Mat> {
        let mut raw = Mat::default();
        let grabbed = self
            .capture
            .read(&mut raw)
            .map_err(|e| CalibrationError::opencv("Camera read", e))?;

        if !grabbed || raw.empty() {
            return match &self.last_frame {
                Some(previous) => {
                    warn!("camera returned no frame, reusing the previous one");
                    previous
                        .try_clone()
                        .map_err(|e| CalibrationError::opencv("Frame copy", e))
                }
                None => Err(CalibrationError::FrameSource {
                    reason: "camera returned no frame".into(),
                }),
            };
        }

        let frame = resize_frame(&raw, self.size)?;
        self.last_frame = Some(
            frame
                .try_clone()
                .map_err(|e| CalibrationError::opencv("Frame copy", e))?,
        );
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        self.capture
            .release()
            .map_err(|e| CalibrationError::opencv("Camera release", e))
    }
}

/// Static image served as an endless stream
pub struct ImageSource {
    frame: Mat,
}

impl ImageSource {
    pub fn open(path: &std::path::Path, size: Size) -> Result<Self> {
        let raw = load_image(path)?;
        info!("image {} loaded", path.display());
        Ok(Self::from_frame(resize_frame(&raw, size)?))
    }

    /// Serve an already decoded frame
    pub fn from_frame(frame: Mat) -> Self {
        Self { frame }
    }
}

impl FrameSource for ImageSource {
    fn next_frame(&mut self) -> Result<Mat> {
        self.frame
            .try_clone()
            .map_err(|e| CalibrationError::opencv("Frame copy", e))
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
