//! Result table built from the accumulated posts, and its CSV form.
//!
//! The CSV layout matches a DataFrame dump: an unnamed leading index column,
//! then one column per [`PostRecord`] field.

use harvest_core::{CoreError, PostRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Turn the accumulated records into a table, rows in fetch order.
pub fn export(records: Vec<PostRecord>) -> Result<ResultTable, CoreError> {
    if records.is_empty() {
        return Err(CoreError::EmptyResult);
    }

    let table = ResultTable { rows: records };
    info!("Exported posts to table.");
    debug!("Table has {} rows", table.len());
    Ok(table)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    rows: Vec<PostRecord>,
}

impl ResultTable {
    pub fn columns(&self) -> &'static [&'static str] {
        &PostRecord::COLUMNS
    }

    pub fn rows(&self) -> &[PostRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn head(&self, n: usize) -> &[PostRecord] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CoreError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(PostRecord::COLUMNS.len() + 1);
        header.push("");
        header.extend_from_slice(self.columns());
        csv_writer.write_record(&header)?;

        for (index, record) in self.rows.iter().enumerate() {
            csv_writer.write_record(&csv_row(index, record))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))?;
        info!("Wrote {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Write the whole table to every target. All targets get identical bytes;
    /// no per-target partitioning is applied.
    pub fn write_csv_targets(&self, targets: &[PathBuf]) -> Result<(), CoreError> {
        for target in targets {
            self.write_csv_file(target)?;
        }
        Ok(())
    }
}

fn csv_row(index: usize, record: &PostRecord) -> [String; 10] {
    [
        index.to_string(),
        record.id.clone(),
        record.title.clone(),
        record.selftext.clone(),
        record.score.to_string(),
        record.num_comments.to_string(),
        record
            .view_count
            .map(|views| views.to_string())
            .unwrap_or_default(),
        format_float(record.upvote_ratio),
        record.subreddit.clone(),
        format_float(record.created_utc),
    ]
}

// Always keep a decimal point so float columns read back as floats.
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}
