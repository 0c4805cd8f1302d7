//! ROI cropping and the deterministic binarization pipeline.
//!
//! The teacher repo has no equivalent of this stage; the pipeline below
//! ports `_preprocess` from the original Python `OCRScoreReader`
//! (`cvtColor` → `resize(fx=fy=3, INTER_CUBIC)` → `GaussianBlur((3,3),0)`
//! → `CLAHE(clipLimit=2.0, tileGridSize=(8,8))` →
//! `threshold(THRESH_BINARY+THRESH_OTSU)` → `bitwise_not` →
//! `morphologyEx(MORPH_CLOSE, kernel=(2,2))`) onto the `opencv` crate, the
//! same crate used for comparable CV pipelines elsewhere in the example
//! pack (e.g. the dribbling-detection-algorithm reference).

use opencv::core::{Mat, Size, BORDER_DEFAULT};
use opencv::prelude::*;
use opencv::{core, imgproc};

use crate::error::Result;

/// Fixed constants of the preprocessing design; not runtime-tunable
/// (spec §4.2).
const UPSCALE_FACTOR: f64 = 3.0;
const GAUSSIAN_KERNEL: i32 = 3;
const CLAHE_CLIP_LIMIT: f64 = 2.0;
const CLAHE_TILE_SIZE: i32 = 8;
const MORPH_KERNEL_SIZE: i32 = 2;

/// A fixed rectangle on the source frame, in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Clamps this rectangle so it stays inside a `frame_width x
    /// frame_height` frame (spec §4.2: "clamps (x, y) so the rectangle
    /// stays inside the frame").
    pub fn clamped(&self, frame_width: i32, frame_height: i32) -> Rect {
        let x = self.x.clamp(0, (frame_width - 1).max(0));
        let y = self.y.clamp(0, (frame_height - 1).max(0));
        let width = self.width.min(frame_width - x).max(1);
        let height = self.height.min(frame_height - y).max(1);
        Rect::new(x, y, width, height)
    }
}

/// Crops `roi` (already clamped) from an RGBA `pixels` buffer and runs the
/// deterministic binarization pipeline, returning a single-channel binary
/// image at `UPSCALE_FACTOR`x the ROI's resolution.
pub fn extract_and_preprocess(
    pixels: &[u8],
    frame_width: u32,
    frame_height: u32,
    roi: Rect,
) -> Result<Mat> {
    let roi = roi.clamped(frame_width as i32, frame_height as i32);

    let rgba = unsafe {
        Mat::new_rows_cols_with_data_unsafe(
            frame_height as i32,
            frame_width as i32,
            core::CV_8UC4,
            pixels.as_ptr() as *mut std::ffi::c_void,
            core::Mat_AUTO_STEP,
        )?
    };

    let region = core::Rect::new(roi.x, roi.y, roi.width, roi.height);
    let cropped = Mat::roi(&rgba, region)?;

    let mut gray = Mat::default();
    imgproc::cvt_color(&cropped, &mut gray, imgproc::COLOR_RGBA2GRAY, 0)?;

    let mut upscaled = Mat::default();
    imgproc::resize(
        &gray,
        &mut upscaled,
        Size::new(0, 0),
        UPSCALE_FACTOR,
        UPSCALE_FACTOR,
        imgproc::INTER_CUBIC,
    )?;

    let mut blurred = Mat::default();
    imgproc::gaussian_blur(
        &upscaled,
        &mut blurred,
        Size::new(GAUSSIAN_KERNEL, GAUSSIAN_KERNEL),
        0.0,
        0.0,
        BORDER_DEFAULT,
    )?;

    let mut clahe = imgproc::create_clahe(CLAHE_CLIP_LIMIT, Size::new(CLAHE_TILE_SIZE, CLAHE_TILE_SIZE))?;
    let mut equalized = Mat::default();
    clahe.apply(&blurred, &mut equalized)?;

    let mut binary = Mat::default();
    imgproc::threshold(
        &equalized,
        &mut binary,
        0.0,
        255.0,
        imgproc::THRESH_BINARY + imgproc::THRESH_OTSU,
    )?;

    let mut inverted = Mat::default();
    core::bitwise_not(&binary, &mut inverted, &core::no_array())?;

    let kernel = imgproc::get_structuring_element(
        imgproc::MORPH_RECT,
        Size::new(MORPH_KERNEL_SIZE, MORPH_KERNEL_SIZE),
        core::Point::new(-1, -1),
    )?;
    let mut closed = Mat::default();
    imgproc::morphology_ex(
        &inverted,
        &mut closed,
        imgproc::MORPH_CLOSE,
        &kernel,
        core::Point::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_rect_inside_frame() {
        let r = Rect::new(1900, 1000, 170, 70);
        let clamped = r.clamped(1920, 1080);
        assert!(clamped.x + clamped.width <= 1920);
        assert!(clamped.y + clamped.height <= 1080);
    }

    #[test]
    fn clamps_negative_origin() {
        let r = Rect::new(-5, -5, 170, 70);
        let clamped = r.clamped(1920, 1080);
        assert_eq!(clamped.x, 0);
        assert_eq!(clamped.y, 0);
    }
}
