use crate::utils::error::{ExportError, Result};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

pub const MAX_COMPRESSION_LEVEL: i64 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub compression_level: i64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            compression_level: MAX_COMPRESSION_LEVEL,
        }
    }
}

impl ArchiveOptions {
    /// Fixed timestamp and permissions keep archives of identical trees identical.
    /// Level 0 stores entries uncompressed; deflate has no level 0.
    fn file_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default()
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        if self.compression_level == 0 {
            options.compression_method(CompressionMethod::Stored)
        } else {
            options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(self.compression_level))
        }
    }
}

/// A file on disk and its name inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub files: usize,
    pub uncompressed_bytes: u64,
}

/// Every regular file below `root`, named relative to it with `/` separators,
/// sorted by name.
pub fn collect_entries(root: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| ExportError::archive_io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        entries.push(ArchiveEntry {
            name: entry_name(root, entry.path())?,
            path: entry.into_path(),
        });
    }

    // Per-directory order is not the same as order by full name ("src.d" vs "src/").
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| ExportError::PathEscapeError {
            path: path.to_path_buf(),
        })?;

    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Compresses `entries` into `sink` as a streaming ZIP. Bytes reach the sink
/// as they are produced; the central directory is written last.
pub fn write_entries<W: Write>(
    entries: &[ArchiveEntry],
    sink: &mut W,
    options: &ArchiveOptions,
) -> Result<ArchiveSummary> {
    let mut zip = ZipWriter::new_stream(sink);
    let mut uncompressed_bytes = 0;

    for entry in entries {
        zip.start_file(entry.name.as_str(), options.file_options())?;
        let mut file = File::open(&entry.path).map_err(ExportError::archive_io)?;
        uncompressed_bytes += io::copy(&mut file, &mut zip).map_err(ExportError::archive_io)?;
    }

    zip.finish()?;

    Ok(ArchiveSummary {
        files: entries.len(),
        uncompressed_bytes,
    })
}

/// Archive the whole tree under `root` into `sink` and flush it.
pub fn stream<W: Write>(root: &Path, sink: &mut W, options: &ArchiveOptions) -> Result<ArchiveSummary> {
    let entries = collect_entries(root)?;
    let summary = write_entries(&entries, sink, options)?;
    sink.flush().map_err(ExportError::archive_io)?;
    Ok(summary)
}
