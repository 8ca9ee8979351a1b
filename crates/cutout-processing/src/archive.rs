//! In-memory ZIP archive assembly for processed images.

use anyhow::{Context, Result};
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::codec::OUTPUT_EXTENSION;

/// Builds a ZIP archive in memory, one entry at a time, in append order.
///
/// A fresh builder is created per batch; nothing is shared across requests.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    entry_count: usize,
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
            entry_count: 0,
        }
    }

    /// Append a member under `name`. Callers are responsible for uniqueness;
    /// see [`unique_member_name`].
    pub fn add_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip
            .start_file(name, self.options)
            .with_context(|| format!("Failed to add file to ZIP: {}", name))?;
        self.zip
            .write_all(data)
            .with_context(|| format!("Failed to write file data to ZIP: {}", name))?;
        self.entry_count += 1;
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn finish(mut self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish().context("Failed to finalize ZIP archive")?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Archive member name for a processed image: a random token prefix keeps
/// members pairwise distinct even when two uploads share a base name.
pub fn unique_member_name(stem: &str) -> String {
    format!(
        "{}_{}.{}",
        uuid::Uuid::new_v4().simple(),
        stem,
        OUTPUT_EXTENSION
    )
}
