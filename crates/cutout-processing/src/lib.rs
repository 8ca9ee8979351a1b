//! Cutout Processing Library
//!
//! Upload validation, image codec helpers, the segmentation capability, and
//! the batch processor that assembles the output archive.

pub mod archive;
pub mod batch;
pub mod codec;
pub mod segmenter;
pub mod validator;

pub use batch::{BatchConfig, BatchError, BatchOutcome, BatchProcessor, UploadItem};
pub use segmenter::{HttpSegmenter, Segmenter};
pub use validator::{UploadValidator, ValidationError};
