//! CSV checkpoint sinks
//!
//! Two persistence policies:
//! - `AppendCsvSink`: one timestamped file, every flush appends rows
//! - `OverwriteCsvSink`: every flush rewrites `<prefix>_current.csv` in full,
//!   and `finalize` turns it into a timestamped file and prunes backups

use crate::output::traits::{CheckpointSink, OutputResult};
use crate::output::timestamp;
use crate::state::Item;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Column set written by every sink
pub const CSV_HEADER: [&str; 5] = ["nombre_original", "nombre", "foil", "precio", "url"];

#[derive(Serialize)]
struct ItemRow<'a> {
    nombre_original: &'a str,
    nombre: &'a str,
    foil: &'static str,
    precio: Option<u64>,
    url: &'a str,
}

impl<'a> From<&'a Item> for ItemRow<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            nombre_original: &item.raw_name,
            nombre: &item.name,
            foil: item.foil_label(),
            precio: item.price,
            url: &item.url,
        }
    }
}

/// Writes rows (and optionally the header) to any writer
fn write_rows<W: Write>(writer: W, header: bool, batches: &[&[Item]]) -> OutputResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    if header {
        csv.write_record(CSV_HEADER)?;
    }

    for batch in batches {
        for item in batch.iter() {
            csv.serialize(ItemRow::from(item))?;
        }
    }

    csv.flush()?;
    Ok(())
}

/// Destination that can be cut back to an earlier length
trait TruncateTo: Write {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl TruncateTo for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Appends an encoded batch, cutting `out` back to `start` if the write fails
///
/// Either the whole batch lands or none of it does, so retrying the batch
/// cannot duplicate rows.
fn append_all_or_nothing<W: TruncateTo>(out: &mut W, start: u64, bytes: &[u8]) -> OutputResult<()> {
    if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
        if let Err(undo) = out.truncate_to(start) {
            tracing::error!("Could not remove partial checkpoint rows: {}", undo);
        }
        return Err(e.into());
    }
    Ok(())
}

/// Sink that appends each checkpoint to a single growing file
#[derive(Debug)]
pub struct AppendCsvSink {
    path: PathBuf,
}

impl AppendCsvSink {
    /// Creates `<dir>/<prefix>_<timestamp>.csv` with a header row
    pub fn create(dir: &Path, prefix: &str) -> OutputResult<Self> {
        Self::create_with_stamp(dir, prefix, &timestamp())
    }

    /// Same as `create` with an explicit timestamp
    pub fn create_with_stamp(dir: &Path, prefix: &str, stamp: &str) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}_{}.csv", prefix, stamp));

        if !path.exists() {
            write_rows(File::create(&path)?, true, &[])?;
        }

        tracing::debug!("Appending checkpoints to {}", path.display());
        Ok(Self { path })
    }
}

impl CheckpointSink for AppendCsvSink {
    fn flush(&mut self, items: &[Item]) -> OutputResult<()> {
        let mut batch = Vec::new();
        write_rows(&mut batch, false, &[items])?;

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let start = file.metadata()?.len();
        append_all_or_nothing(&mut file, start, &batch)
    }

    fn finalize(&mut self) -> OutputResult<Option<PathBuf>> {
        Ok(Some(self.path.clone()))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Sink that rewrites one current file on every checkpoint
///
/// The full item history is kept in memory so each flush can rewrite the
/// file from scratch. A current file left behind by an interrupted run is
/// kept as a timestamped backup until the next successful finalize.
#[derive(Debug)]
pub struct OverwriteCsvSink {
    dir: PathBuf,
    prefix: String,
    current: PathBuf,
    written: Vec<Item>,
    final_stamp: Option<String>,
}

impl OverwriteCsvSink {
    /// Opens `<dir>/<prefix>_current.csv`, moving any stale copy to a backup
    pub fn open(dir: &Path, prefix: &str) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;
        let current = dir.join(format!("{}_current.csv", prefix));

        if current.exists() {
            let backup = dir.join(format!("{}_backup_{}.csv", prefix, timestamp()));
            tracing::warn!(
                "Found current file from an interrupted run, keeping it as {}",
                backup.display()
            );
            fs::rename(&current, &backup)?;
        }

        let sink = Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            current,
            written: Vec::new(),
            final_stamp: None,
        };
        sink.rewrite(&[])?;
        Ok(sink)
    }

    /// Uses a fixed timestamp for the finalized file name
    pub fn with_final_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.final_stamp = Some(stamp.into());
        self
    }

    /// Lists backup files belonging to this prefix
    pub fn backups(&self) -> OutputResult<Vec<PathBuf>> {
        let marker = format!("{}_backup_", self.prefix);
        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_backup = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&marker) && name.ends_with(".csv"))
                .unwrap_or(false);
            if is_backup {
                backups.push(path);
            }
        }

        backups.sort();
        Ok(backups)
    }

    /// Rewrites the current file with everything written so far plus `extra`
    fn rewrite(&self, extra: &[Item]) -> OutputResult<()> {
        let tmp = self.current.with_extension("csv.tmp");
        write_rows(File::create(&tmp)?, true, &[self.written.as_slice(), extra])?;
        fs::rename(&tmp, &self.current)?;
        Ok(())
    }
}

impl CheckpointSink for OverwriteCsvSink {
    fn flush(&mut self, items: &[Item]) -> OutputResult<()> {
        self.rewrite(items)?;
        self.written.extend_from_slice(items);
        Ok(())
    }

    // Copy, remove and prune are separate steps; a crash in between can
    // leave the final file and the backups side by side.
    fn finalize(&mut self) -> OutputResult<Option<PathBuf>> {
        let stamp = self.final_stamp.clone().unwrap_or_else(timestamp);
        let final_path = self.dir.join(format!("{}_{}.csv", self.prefix, stamp));

        fs::copy(&self.current, &final_path)?;
        fs::remove_file(&self.current)?;

        for backup in self.backups()? {
            match fs::remove_file(&backup) {
                Ok(()) => tracing::debug!("Removed backup {}", backup.display()),
                Err(e) => tracing::warn!("Failed to remove backup {}: {}", backup.display(), e),
            }
        }

        tracing::info!("Finalized output: {}", final_path.display());
        Ok(Some(final_path))
    }

    fn path(&self) -> &Path {
        &self.current
    }
}
