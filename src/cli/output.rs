// Output formatting for CLI

use super::config::OutputFormat;
use crate::identity::ContainerIdentity;
use crate::track::IabTrackReader;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Flat summary of a track file, as printed by `--info`
#[derive(Debug, Clone, Serialize)]
pub struct TrackInfo {
    pub path: String,
    pub frame_count: u32,
    pub file_size: u64,
    pub edit_rate: String,
    pub duration_seconds: f64,
    pub asset_uuid: String,
    pub spoken_language: String,
    pub label_set: String,
    pub conformance_labels: Vec<String>,
    pub company_name: String,
    pub product_name: String,
    pub product_version: String,
    pub product_uuid: String,
    pub modification_date: Option<DateTime<Utc>>,
}

impl TrackInfo {
    pub fn from_identity(
        path: &Path,
        identity: &ContainerIdentity,
        frame_count: u32,
        file_size: u64,
        modification_date: Option<DateTime<Utc>>,
    ) -> Self {
        let info = &identity.writer_info;
        Self {
            path: path.display().to_string(),
            frame_count,
            file_size,
            edit_rate: identity.edit_rate.to_string(),
            duration_seconds: frame_count as f64 / identity.edit_rate.as_f64(),
            asset_uuid: info.asset_uuid.to_string(),
            spoken_language: identity.descriptor.spoken_language.clone(),
            label_set: format!("{:?}", info.label_set),
            conformance_labels: identity
                .conformance_labels
                .iter()
                .map(ToString::to_string)
                .collect(),
            company_name: info.company_name.clone(),
            product_name: info.product_name.clone(),
            product_version: info.product_version.clone(),
            product_uuid: info.product_uuid.to_string(),
            modification_date,
        }
    }

    /// Summarize an open reader
    pub fn from_reader<R: Read + Seek>(path: &Path, reader: &IabTrackReader<R>) -> crate::Result<Self> {
        Ok(Self::from_identity(
            path,
            &reader.identity()?,
            reader.frame_count()?,
            reader.file_len(),
            reader.modification_date(),
        ))
    }
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output any serializable value in the selected format
    pub fn output<T: Serialize>(&self, value: &T, writer: &mut impl Write) -> anyhow::Result<()> {
        let value = serde_json::to_value(value)?;
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(&value)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(&value)?)?;
            }
            OutputFormat::KeyValue => {
                self.output_key_value(&value, writer)?;
            }
            OutputFormat::Table => {
                self.output_table(&value, writer)?;
            }
        }
        Ok(())
    }

    /// Output as key-value pairs
    fn output_key_value(&self, value: &serde_json::Value, writer: &mut impl Write) -> std::io::Result<()> {
        if let Some(obj) = value.as_object() {
            let mut items: Vec<_> = obj.iter().collect();
            items.sort_by(|a, b| a.0.cmp(b.0));

            for (key, value) in items {
                writeln!(writer, "{}: {}", key, self.format_value(value))?;
            }
        }
        Ok(())
    }

    /// Output as table
    fn output_table(&self, value: &serde_json::Value, writer: &mut impl Write) -> std::io::Result<()> {
        if let Some(obj) = value.as_object() {
            let max_key_len = obj.keys().map(|k| k.len()).max().unwrap_or(0);

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;

            for (key, value) in obj {
                writeln!(
                    writer,
                    "{:<width$}: {}",
                    format!("{}:", key),
                    self.format_value(value),
                    width = max_key_len + 2
                )?;
            }

            writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
        }
        Ok(())
    }

    /// Format a JSON value for display
    fn format_value(&self, value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(none)".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(arr) => {
                if arr.is_empty() {
                    "[]".to_string()
                } else {
                    arr.iter()
                        .map(|v| self.format_value(v))
                        .collect::<Vec<_>>()
                        .join(", ")
                }
            }
            serde_json::Value::Object(obj) => {
                if obj.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{{} items}}", obj.len())
                }
            }
        }
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}
