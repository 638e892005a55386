//! Catalog aggregation
//!
//! Merges per-store CSV files into one unified catalog, tagging each row with
//! the file it came from. Older files may lack the `foil` or `nombre_original`
//! columns, so each column falls back to whatever the file does have.

use crate::output::traits::OutputResult;
use crate::output::csv_sink::CSV_HEADER;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Prefix of the unified catalog file
pub const UNIFIED_PREFIX: &str = "List-Unificado";

/// Result of a merge run
#[derive(Debug, Clone)]
pub struct MergeSummary {
    /// The unified file that was written
    pub output: PathBuf,

    /// Source file names, in processing order
    pub sources: Vec<String>,

    /// Number of rows written
    pub records: usize,
}

/// Merges every `<prefix>*.csv` in `dir` into `List-Unificado_<timestamp>.csv`
pub fn merge_catalogs(dir: &Path, prefix: &str) -> OutputResult<MergeSummary> {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M").to_string();
    let output = dir.join(format!("{}_{}.csv", UNIFIED_PREFIX, stamp));
    merge_catalogs_into(dir, prefix, &output)
}

/// Merges every `<prefix>*.csv` in `dir` into `output`
///
/// In-progress (`_current`) and backup (`_backup_`) files are skipped, as is
/// the output file itself. Sources are read in file-name order.
pub fn merge_catalogs_into(dir: &Path, prefix: &str, output: &Path) -> OutputResult<MergeSummary> {
    let sources = list_sources(dir, prefix, output)?;

    let mut writer = csv::Writer::from_path(output)?;
    let mut header = vec!["archivo_origen"];
    header.extend_from_slice(&CSV_HEADER);
    writer.write_record(&header)?;

    let mut records = 0;
    for name in &sources {
        tracing::info!("Reading {}", name);
        records += merge_file(&dir.join(name), name, &mut writer)?;
    }
    writer.flush()?;

    tracing::info!(
        "Unified catalog {} written with {} records from {} files",
        output.display(),
        records,
        sources.len()
    );

    Ok(MergeSummary {
        output: output.to_path_buf(),
        sources,
        records,
    })
}

fn list_sources(dir: &Path, prefix: &str, output: &Path) -> OutputResult<Vec<String>> {
    let output_name = output.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        let wanted = name.starts_with(prefix)
            && name.ends_with(".csv")
            && !name.contains("_current")
            && !name.contains("_backup_")
            && !name.starts_with(UNIFIED_PREFIX)
            && name != output_name;
        if wanted {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

fn merge_file<W: std::io::Write>(
    path: &Path,
    source: &str,
    writer: &mut csv::Writer<W>,
) -> OutputResult<usize> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let raw_idx = column("nombre_original");
    let name_idx = column("nombre");
    let foil_idx = column("foil");
    let price_idx = column("precio");
    let url_idx = column("url");

    let mut count = 0;
    for record in reader.records() {
        let record = record?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let raw_name = non_empty(field(raw_idx)).unwrap_or_else(|| field(name_idx));
        let name = non_empty(field(name_idx)).unwrap_or(raw_name);
        let foil = match non_empty(field(foil_idx)) {
            Some(value) => value,
            None => detect_foil(raw_name),
        };

        writer.write_record([source, raw_name, name, foil, field(price_idx), field(url_idx)])?;
        count += 1;
    }

    Ok(count)
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Foil flag derived from a parenthesised "foil" note in the title
pub fn detect_foil(raw_name: &str) -> &'static str {
    static FOIL_NOTE: OnceLock<Regex> = OnceLock::new();
    let re = FOIL_NOTE.get_or_init(|| Regex::new(r"(?i)\(([^)]*foil[^)]*)\)").expect("valid regex"));

    if re.is_match(raw_name) {
        "Sí"
    } else {
        "No"
    }
}
