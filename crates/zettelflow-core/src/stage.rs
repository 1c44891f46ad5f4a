//! Stage directories
//!
//! Each stage owns one directory. Eligible inputs are the direct file entries
//! of that directory; ingest sources are retired into a `processed`
//! sub-directory once split, which is the only consumption marker.

use crate::error::{PipelineError, PipelineResult};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Sub-directory that consumed ingest files are moved into
pub const PROCESSED_DIR: &str = "processed";

/// Timestamp layout used in generated file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// A file found in a stage directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl StageFile {
    /// File name without its final extension
    pub fn stem(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(0) | None => &self.file_name,
            Some(dot) => &self.file_name[..dot],
        }
    }
}

/// Result of cleaning a stage directory
#[derive(Debug, Default)]
pub struct CleanOutcome {
    /// Files removed, or that would be removed in a dry run
    pub removed: Vec<PathBuf>,
    /// Files that could not be removed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// A directory holding the files of one stage
#[derive(Debug, Clone)]
pub struct StageDir {
    path: PathBuf,
}

impl StageDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.path.join(PROCESSED_DIR)
    }

    /// Create the directory if it does not exist yet
    pub fn ensure_exists(&self) -> PipelineResult<()> {
        fs::create_dir_all(&self.path).map_err(|e| PipelineError::stage(&self.path, e))
    }

    /// List direct file entries, sorted by name.
    ///
    /// Sub-directories (including `processed`) and dot files, such as the
    /// temp file of an interrupted write, are never listed. When
    /// `extension` is given only files ending in it are returned; a leading
    /// dot is optional.
    pub fn list_eligible(&self, extension: Option<&str>) -> PipelineResult<Vec<StageFile>> {
        let suffix = extension
            .filter(|ext| !ext.is_empty())
            .map(normalize_extension);

        let entries = fs::read_dir(&self.path).map_err(|e| PipelineError::stage(&self.path, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::stage(&self.path, e))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().into_owned();
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(suffix) = &suffix {
                if !file_name.ends_with(suffix.as_str()) {
                    continue;
                }
            }

            files.push(StageFile { path, file_name });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!("{} eligible file(s) in {}", files.len(), self.path.display());
        Ok(files)
    }

    /// Move a consumed file into `processed`
    pub fn retire(&self, file: &Path) -> PipelineResult<PathBuf> {
        retire(file, &self.processed_dir())
    }

    /// Whether any direct entry's name starts with `prefix`
    pub fn has_entry_with_prefix(&self, prefix: &str) -> bool {
        fs::read_dir(&self.path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .any(|e| e.file_name().to_string_lossy().starts_with(prefix))
            })
            .unwrap_or(false)
    }

    /// Write a new file, choosing a unique name if `file_name` is taken
    pub fn write_new(&self, file_name: &str, contents: &str) -> PipelineResult<PathBuf> {
        let target = unique_path(&self.path.join(file_name));
        write_atomic(&target, contents)?;
        Ok(target)
    }

    /// Write `file_name`, replacing any existing file of that name
    pub fn write(&self, file_name: &str, contents: &str) -> PipelineResult<PathBuf> {
        let target = self.path.join(file_name);
        write_atomic(&target, contents)?;
        Ok(target)
    }

    /// Delete every direct file entry. Sub-directories are left alone.
    pub fn clean(&self, dry_run: bool) -> PipelineResult<CleanOutcome> {
        let mut outcome = CleanOutcome::default();
        for file in self.list_eligible(None)? {
            if dry_run {
                outcome.removed.push(file.path);
                continue;
            }
            match fs::remove_file(&file.path) {
                Ok(()) => {
                    debug!("Removed {}", file.path.display());
                    outcome.removed.push(file.path);
                }
                Err(e) => {
                    warn!("Failed to remove {}: {}", file.path.display(), e);
                    outcome.failed.push((file.path, e.to_string()));
                }
            }
        }
        Ok(outcome)
    }
}

/// Move `file` into `processed_dir`, creating the directory if needed.
///
/// A name already taken inside `processed_dir` gets a numeric suffix so that
/// earlier retired files are kept.
pub fn retire(file: &Path, processed_dir: &Path) -> PipelineResult<PathBuf> {
    fs::create_dir_all(processed_dir).map_err(|e| PipelineError::stage(processed_dir, e))?;

    let file_name = file.file_name().ok_or_else(|| {
        PipelineError::io(
            file,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let target = unique_path(&processed_dir.join(file_name));
    fs::rename(file, &target).map_err(|e| PipelineError::io(file, e))?;
    debug!("Retired {} to {}", file.display(), target.display());
    Ok(target)
}

/// Write `contents` to `path` through a temp file in the same directory.
///
/// Readers see either the previous file or the complete new one.
pub fn write_atomic(path: &Path, contents: &str) -> PipelineResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(path, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| PipelineError::io(path, e))?;
    temp.flush().map_err(|e| PipelineError::io(path, e))?;
    temp.persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

/// Return `path`, or `<stem>-<n><ext>` for the first `n` that is free
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = match file_name.rfind('.') {
        Some(0) | None => (file_name.as_str(), ""),
        Some(dot) => file_name.split_at(dot),
    };

    let mut n = 1;
    loop {
        let candidate = parent.join(format!("{stem}-{n}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Hands out file-name timestamps for one driver.
///
/// Every stamp is later than the previous one, so two sources handled in the
/// same second never share a `<timestamp>` and names sort in processing order.
#[derive(Debug, Default)]
pub struct RunClock {
    last: Mutex<Option<NaiveDateTime>>,
}

impl RunClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next stamp for which `taken` is false, starting from the current time
    pub fn next_stamp(&self, taken: impl Fn(&str) -> bool) -> String {
        self.next_stamp_from(Local::now().naive_local(), taken)
    }

    /// Next stamp at or after `now`, strictly after the last one handed out,
    /// skipping seconds for which `taken` is true
    pub fn next_stamp_from(&self, now: NaiveDateTime, taken: impl Fn(&str) -> bool) -> String {
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = now.with_nanosecond(0).unwrap_or(now);
        let mut candidate = match *last {
            Some(prev) if prev >= now => prev + Duration::seconds(1),
            _ => now,
        };
        while taken(&candidate.format(TIMESTAMP_FORMAT).to_string()) {
            candidate += Duration::seconds(1);
        }

        *last = Some(candidate);
        candidate.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// `ingest_<timestamp>.txt`
pub fn ingest_file_name(timestamp: &str) -> String {
    format!("ingest_{timestamp}.txt")
}

/// `note_<timestamp>_<index><ext>`
pub fn note_file_name(timestamp: &str, index: usize, extension: &str) -> String {
    let ext = if extension.is_empty() {
        String::new()
    } else {
        normalize_extension(extension)
    };
    format!("note_{timestamp}_{index}{ext}")
}

fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}
