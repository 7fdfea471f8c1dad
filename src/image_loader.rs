//! Static frame loading
//!
//! Decodes an image file with the `image` crate and converts it to an
//! OpenCV `Mat` in BGR order, the layout the detector expects. The format is
//! guessed from the file contents, so extensions do not have to match.

use opencv::core::{Mat, Scalar, Vec3b, CV_8UC3};
use opencv::prelude::*;
use std::path::Path;

use crate::{CalibrationError, Result};

/// Load an image from disk as an 8-bit BGR `Mat`
///
/// # Errors
///
/// Returns `CalibrationError::ImageLoad` if the file cannot be opened or
/// decoded.
///
/// # Example
///
/// ```rust,no_run
/// use hue_arm_calib::image_loader::load_image;
/// use opencv::prelude::*;
/// use std::path::Path;
///
/// let mat = load_image(Path::new("demo.jpg"))?;
/// println!("Loaded image: {}x{}", mat.cols(), mat.rows());
/// # Ok::<(), hue_arm_calib::CalibrationError>(())
/// ```
pub fn load_image(path: &Path) -> Result<Mat> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| {
            CalibrationError::image_load(
                format!("Failed to open image file: {}", path.display()),
                e,
            )
        })?
        .with_guessed_format()
        .map_err(|e| {
            CalibrationError::image_load(
                format!("Failed to read image header: {}", path.display()),
                e,
            )
        })?;

    let img = reader.decode().map_err(|e| {
        CalibrationError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();
    rgb_to_bgr_mat(rgb_img.as_raw(), width as i32, height as i32)
}

/// Convert a tightly packed RGB buffer to a BGR `Mat`
pub(crate) fn rgb_to_bgr_mat(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    let expected = (width.max(0) as usize) * (height.max(0) as usize) * 3;
    if rgb_data.len() != expected {
        return Err(CalibrationError::ImageLoad {
            message: format!(
                "RGB buffer has {} bytes, {}x{} needs {}",
                rgb_data.len(),
                width,
                height,
                expected
            ),
            source: None,
        });
    }

    let mut mat = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0))
        .map_err(|e| CalibrationError::opencv("Frame allocation", e))?;

    for (index, rgb) in rgb_data.chunks_exact(3).enumerate() {
        let x = index as i32 % width;
        let y = index as i32 / width;
        let pixel = mat
            .at_2d_mut::<Vec3b>(y, x)
            .map_err(|e| CalibrationError::opencv("Pixel access", e))?;
        pixel[0] = rgb[2];
        pixel[1] = rgb[1];
        pixel[2] = rgb[0];
    }

    Ok(mat)
}
