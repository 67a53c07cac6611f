use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

pub struct CsvStorage;

impl CsvStorage {
    /// Writes one token per row under a single `token` header.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_tokens_csv<T: AsRef<str>>(path: &Path, tokens: &[T]) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = Writer::from_writer(file);

        writer.write_record(["token"])?;
        for token in tokens {
            writer.write_record([token.as_ref()])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Writes tokens joined by `\n`, with no trailing newline.
    ///
    /// # Errors
    /// Returns error if the file cannot be written
    pub fn write_tokens_txt<T: AsRef<str>>(path: &Path, tokens: &[T]) -> Result<()> {
        let body = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(path, body)
            .with_context(|| format!("Failed to write token file: {}", path.display()))
    }

    /// Writes `headers` followed by one row per serialized record.
    ///
    /// The header row is written even when `records` is empty. `headers` must
    /// list the record's fields in declaration order.
    ///
    /// # Errors
    /// Returns error if file cannot be created or a record fails to serialize
    pub fn write_records<T: Serialize>(
        path: &Path,
        headers: &[&str],
        records: &[T],
    ) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer.write_record(headers)?;
        for record in records {
            writer
                .serialize(record)
                .with_context(|| format!("Failed to write record to {}", path.display()))?;
        }

        writer.flush()?;
        Ok(())
    }
}
