//! Frame sampling and ROI extraction/preprocessing.
//!
//! Turns a source video into a sequence of binarized ROI images ready for
//! OCR, with no knowledge of the OCR engine, the score parser, or the
//! event detector.

pub mod error;
pub mod roi;
pub mod sampler;

pub use error::{Result, VisionError};
pub use roi::{extract_and_preprocess, Rect};
pub use sampler::{estimate_sample_count, video_stem, FrameSampler, SampledFrame, SamplerConfig};
