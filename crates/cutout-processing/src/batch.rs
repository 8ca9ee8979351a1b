//! Batch image processor.
//!
//! Runs the per-item pipeline (validate, decode, segment, encode) strictly in
//! input order and assembles the survivors into an in-memory ZIP archive.
//! Every per-item failure is converted to a skip at its point of origin; only
//! the two batch-level conditions (`NoValidInput`, archive failure) escape.

use bytes::Bytes;
use image::RgbaImage;
use std::sync::Arc;

use cutout_core::sanitize::{file_stem, sanitize_filename};

use crate::archive::{unique_member_name, ArchiveWriter};
use crate::codec::{self, OUTPUT_EXTENSION};
use crate::segmenter::Segmenter;
use crate::validator::UploadValidator;

/// One uploaded file: the user-supplied name plus the raw bytes.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub filename: String,
    pub data: Bytes,
}

/// Why an item was dropped from the batch. Logged server-side only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DisallowedExtension,
    EmptyFile,
    TooLarge,
    Undecodable,
    SegmentationFailed,
    EncodeFailed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::DisallowedExtension => "disallowed_extension",
            SkipReason::EmptyFile => "empty_file",
            SkipReason::TooLarge => "too_large",
            SkipReason::Undecodable => "undecodable",
            SkipReason::SegmentationFailed => "segmentation_failed",
            SkipReason::EncodeFailed => "encode_failed",
        }
    }
}

/// Summary of one archive member.
#[derive(Debug, Clone)]
pub struct ProcessedEntry {
    pub member_name: String,
    pub size_bytes: usize,
}

/// Result of a batch run: the finalized archive plus per-entry summaries in
/// processing order.
#[derive(Debug)]
pub struct BatchOutcome {
    pub archive: Vec<u8>,
    pub entries: Vec<ProcessedEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// No files were supplied, or every supplied file was skipped.
    #[error("no valid images processed")]
    NoValidInput,

    /// The archive itself could not be built. Not a per-item condition.
    #[error("archive assembly failed")]
    Archive(#[source] anyhow::Error),
}

/// Batch processor policy: per-item cap and extension whitelist. The output
/// format is fixed to PNG.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_item_bytes: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_item_bytes: 10 * 1024 * 1024,
            allowed_extensions: ["png", "jpg", "jpeg", "webp", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

pub struct BatchProcessor {
    validator: UploadValidator,
    segmenter: Arc<dyn Segmenter>,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig, segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            validator: UploadValidator::new(config.max_item_bytes, config.allowed_extensions),
            segmenter,
        }
    }

    /// Process a batch of uploads into a ZIP archive.
    ///
    /// Items are handled sequentially in input order; each item runs to
    /// completion (success or skip) before the next begins. The archive only
    /// ever contains entries for items that passed every stage.
    pub async fn process(&self, items: Vec<UploadItem>) -> Result<BatchOutcome, BatchError> {
        let mut writer = ArchiveWriter::new();
        let mut entries = Vec::new();

        for item in items {
            let fallback = format!("image-{}.{}", uuid::Uuid::new_v4().simple(), OUTPUT_EXTENSION);
            let filename = sanitize_filename(&item.filename, &fallback);

            match self.process_item(&filename, item.data).await {
                Ok(encoded) => {
                    let member_name = unique_member_name(file_stem(&filename));
                    writer
                        .add_entry(&member_name, &encoded)
                        .map_err(BatchError::Archive)?;
                    tracing::debug!(
                        original = %item.filename,
                        member = %member_name,
                        size_bytes = encoded.len(),
                        "Processed image"
                    );
                    entries.push(ProcessedEntry {
                        member_name,
                        size_bytes: encoded.len(),
                    });
                }
                Err(reason) => {
                    tracing::info!(
                        original = %item.filename,
                        reason = reason.as_str(),
                        "Skipping file"
                    );
                }
            }
        }

        if entries.is_empty() {
            return Err(BatchError::NoValidInput);
        }

        let archive = writer.finish().map_err(BatchError::Archive)?;
        Ok(BatchOutcome { archive, entries })
    }

    /// One item through the pipeline. Any failure maps to a [`SkipReason`];
    /// nothing here can abort the batch.
    async fn process_item(&self, filename: &str, data: Bytes) -> Result<Vec<u8>, SkipReason> {
        if self.validator.validate_extension(filename).is_err() {
            return Err(SkipReason::DisallowedExtension);
        }

        if let Err(e) = self.validator.validate_file_size(data.len()) {
            return Err(match e {
                crate::validator::ValidationError::EmptyFile => SkipReason::EmptyFile,
                _ => SkipReason::TooLarge,
            });
        }

        let decoded = run_blocking(move || codec::decode_rgba(&data))
            .await
            .map_err(|e| {
                tracing::warn!(filename = %filename, error = %e, "Failed to decode image");
                SkipReason::Undecodable
            })?;

        let segmented: RgbaImage = self.segmenter.segment(decoded).await.map_err(|e| {
            tracing::warn!(filename = %filename, error = %e, "Segmentation failed");
            SkipReason::SegmentationFailed
        })?;

        // The trait returns RgbaImage, so the result carries an alpha plane
        // even when the capability's internals produced another layout.
        run_blocking(move || codec::encode_png(&segmented))
            .await
            .map_err(|e| {
                tracing::warn!(filename = %filename, error = %e, "Failed to encode output");
                SkipReason::EncodeFailed
            })
    }
}

/// Run CPU-bound image work off the async executor. A panicked task is
/// reported as an ordinary error so the batch keeps going.
async fn run_blocking<T, F>(f: F) -> Result<T, anyhow::Error>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, anyhow::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("blocking image task failed: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::{Cursor, Read};

    /// Returns the input unchanged.
    struct PassThroughSegmenter;

    #[async_trait]
    impl Segmenter for PassThroughSegmenter {
        async fn segment(&self, image: RgbaImage) -> Result<RgbaImage> {
            Ok(image)
        }
    }

    /// Fails for images narrower than 2 pixels; passes everything else.
    struct RejectsNarrowSegmenter;

    #[async_trait]
    impl Segmenter for RejectsNarrowSegmenter {
        async fn segment(&self, image: RgbaImage) -> Result<RgbaImage> {
            if image.width() < 2 {
                anyhow::bail!("model rejected input");
            }
            Ok(image)
        }
    }

    fn processor(config: BatchConfig) -> BatchProcessor {
        BatchProcessor::new(config, Arc::new(PassThroughSegmenter))
    }

    fn png_item(name: &str, width: u32, height: u32) -> UploadItem {
        let img = RgbaImage::from_pixel(width, height, Rgba([100, 150, 200, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        UploadItem {
            filename: name.to_string(),
            data: Bytes::from(buffer),
        }
    }

    fn jpeg_item(name: &str) -> UploadItem {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        UploadItem {
            filename: name.to_string(),
            data: Bytes::from(buffer),
        }
    }

    fn member_names(archive: &[u8]) -> Vec<String> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive.to_vec())).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    fn member_bytes(archive: &[u8], index: usize) -> Vec<u8> {
        let mut zip = zip::ZipArchive::new(Cursor::new(archive.to_vec())).unwrap();
        let mut entry = zip.by_index(index).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        data
    }

    #[tokio::test]
    async fn test_png_and_jpeg_batch_yields_two_alpha_capable_entries() {
        let items = vec![png_item("transparent.png", 4, 4), jpeg_item("opaque.jpg")];
        let outcome = processor(BatchConfig::default()).process(items).await.unwrap();

        assert_eq!(outcome.entries.len(), 2);
        let names = member_names(&outcome.archive);
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);

        for i in 0..2 {
            let decoded = codec::decode_rgba(&member_bytes(&outcome.archive, i)).unwrap();
            assert!(decoded.width() > 0);
        }
    }

    #[tokio::test]
    async fn test_entries_preserve_input_order() {
        let items = vec![png_item("a.png", 2, 2), png_item("b.png", 2, 2)];
        let outcome = processor(BatchConfig::default()).process(items).await.unwrap();

        assert!(outcome.entries[0].member_name.ends_with("_a.png"));
        assert!(outcome.entries[1].member_name.ends_with("_b.png"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_no_valid_input() {
        let result = processor(BatchConfig::default()).process(vec![]).await;
        assert!(matches!(result, Err(BatchError::NoValidInput)));
    }

    #[tokio::test]
    async fn test_all_disallowed_extensions_is_no_valid_input() {
        let items = vec![png_item("a.gif", 2, 2), png_item("b.txt", 2, 2)];
        let result = processor(BatchConfig::default()).process(items).await;
        assert!(matches!(result, Err(BatchError::NoValidInput)));
    }

    #[tokio::test]
    async fn test_corrupt_blob_skipped_without_aborting_batch() {
        let corrupt = UploadItem {
            filename: "broken.png".to_string(),
            data: Bytes::from_static(b"definitely not a png"),
        };
        let items = vec![corrupt, png_item("ok.png", 2, 2)];
        let outcome = processor(BatchConfig::default()).process(items).await.unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert!(outcome.entries[0].member_name.ends_with("_ok.png"));
    }

    #[tokio::test]
    async fn test_segmentation_failure_does_not_block_later_items() {
        let processor = BatchProcessor::new(
            BatchConfig::default(),
            Arc::new(RejectsNarrowSegmenter),
        );
        // 1px-wide image trips the stub; the 4px one survives
        let items = vec![png_item("narrow.png", 1, 4), png_item("wide.png", 4, 4)];
        let outcome = processor.process(items).await.unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert!(outcome.entries[0].member_name.ends_with("_wide.png"));
    }

    #[tokio::test]
    async fn test_item_at_cap_accepted_one_over_skipped() {
        let at_cap = png_item("at-cap.png", 4, 4);
        let cap = at_cap.data.len();

        let config = BatchConfig {
            max_item_bytes: cap,
            ..BatchConfig::default()
        };
        let outcome = processor(config).process(vec![at_cap.clone()]).await.unwrap();
        assert_eq!(outcome.entries.len(), 1);

        let config = BatchConfig {
            max_item_bytes: cap - 1,
            ..BatchConfig::default()
        };
        let result = processor(config).process(vec![at_cap]).await;
        assert!(matches!(result, Err(BatchError::NoValidInput)));
    }

    #[tokio::test]
    async fn test_empty_file_skipped() {
        let empty = UploadItem {
            filename: "empty.png".to_string(),
            data: Bytes::new(),
        };
        let items = vec![empty, png_item("ok.png", 2, 2)];
        let outcome = processor(BatchConfig::default()).process(items).await.unwrap();
        assert_eq!(outcome.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_colliding_names_get_distinct_members() {
        let items = vec![png_item("same.png", 2, 2), png_item("same.png", 3, 3)];
        let outcome = processor(BatchConfig::default()).process(items).await.unwrap();

        let names = member_names(&outcome.archive);
        assert_eq!(names.len(), 2);
        assert_ne!(names[0], names[1]);
        assert!(names.iter().all(|n| n.ends_with("_same.png")));
    }

    #[tokio::test]
    async fn test_tokens_are_randomized_across_runs() {
        let processor = processor(BatchConfig::default());
        let first = processor.process(vec![png_item("p.png", 2, 2)]).await.unwrap();
        let second = processor.process(vec![png_item("p.png", 2, 2)]).await.unwrap();

        let (token_a, base_a) = first.entries[0].member_name.split_once('_').unwrap();
        let (token_b, base_b) = second.entries[0].member_name.split_once('_').unwrap();
        assert_eq!(base_a, base_b);
        assert_ne!(token_a, token_b);
    }

    #[tokio::test]
    async fn test_nameless_upload_gets_placeholder_and_processes() {
        let img = png_item("", 2, 2);
        let outcome = processor(BatchConfig::default()).process(vec![img]).await.unwrap();

        assert_eq!(outcome.entries.len(), 1);
        assert!(outcome.entries[0].member_name.contains("_image-"));
    }
}
