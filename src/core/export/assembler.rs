//! Output directory assembly
//!
//! Creates the run directory, plans one collision-free file name per item
//! before any work starts, writes item files atomically and finally writes
//! the manifest.

use crate::core::export::manifest::{Manifest, MANIFEST_FILE_NAME};
use crate::core::export::summary::ExportedFile;
use crate::core::format::ExportFormat;
use crate::core::verification::checksum::calculate_checksum_bytes;
use crate::domain::errors::{FatalRunError, WriteError};
use crate::domain::ids::{ItemId, RunId};
use crate::domain::item::LibraryItem;
use chrono::{DateTime, Utc};
use deunicode::deunicode;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Stem used when a title sanitizes to nothing
pub const FALLBACK_STEM: &str = "untitled";

/// Stem no item file may take
pub const RESERVED_STEM: &str = "manifest";

/// Windows reserved device names
const WINDOWS_RESERVED: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters invalid in file names on common filesystems
const INVALID_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Longest sanitized item id appended to a colliding stem
const MAX_ID_SUFFIX_LENGTH: usize = 40;

/// Sanitizes a title into a file stem
///
/// Applies, in order: Unicode transliteration, whitespace to hyphens,
/// removal of invalid characters, hyphen collapsing, truncation to
/// `max_len`, trimming of leading/trailing dots and hyphens, and
/// prefixing of Windows reserved names. Empty results become
/// [`FALLBACK_STEM`].
///
/// # Examples
///
/// ```
/// use folio::core::export::assembler::sanitize_stem;
///
/// assert_eq!(sanitize_stem("Café: A Memoir", 100), "Cafe-A-Memoir");
/// assert_eq!(sanitize_stem("???", 100), "untitled");
/// assert_eq!(sanitize_stem("con", 100), "_con");
/// ```
pub fn sanitize_stem(title: &str, max_len: usize) -> String {
    let ascii = deunicode(title);

    let mut result = String::with_capacity(ascii.len());
    let mut last_was_hyphen = false;

    for c in ascii.chars() {
        if c.is_whitespace() || c == '-' {
            if !last_was_hyphen {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if INVALID_CHARS.contains(&c) {
            continue;
        } else if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
            result.push(c);
            last_was_hyphen = false;
        }
        // Other punctuation and untransliterated characters are dropped
    }

    let truncated: String = result.chars().take(max_len.max(1)).collect();
    let trimmed = trim_edges(&truncated);
    let stem = prefix_reserved(trimmed);

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(|c| c == '.' || c == ' ' || c == '-')
}

/// Prefixes Windows reserved names (`CON`, `con.notes`) with `_`
fn prefix_reserved(name: &str) -> String {
    let base = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };
    if WINDOWS_RESERVED
        .iter()
        .any(|reserved| base.eq_ignore_ascii_case(reserved))
    {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// File names of one run, decided before any item is exported
#[derive(Debug, Clone)]
pub struct FilePlan {
    root: PathBuf,
    format: ExportFormat,
    names: HashMap<ItemId, String>,
}

impl FilePlan {
    /// Run directory the plan writes into
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Planned file name of an item, relative to [`FilePlan::root`]
    pub fn file_name(&self, item_id: &ItemId) -> Option<&str> {
        self.names.get(item_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn temp_path(&self, file_name: &str) -> PathBuf {
        self.root.join(format!(".{file_name}.tmp"))
    }
}

/// Plans collision-free file names for `items` in the given order
///
/// Collisions are case-insensitive. The later item gets its sanitized id
/// appended, then a numeric suffix if that is still taken.
pub fn plan(
    root: impl Into<PathBuf>,
    items: &[LibraryItem],
    format: ExportFormat,
    max_title_length: usize,
) -> FilePlan {
    let mut taken: HashSet<String> = HashSet::new();
    taken.insert(RESERVED_STEM.to_string());

    let mut names = HashMap::with_capacity(items.len());
    for item in items {
        let base = sanitize_stem(&item.title, max_title_length);
        let mut stem = base.clone();

        if taken.contains(&stem.to_lowercase()) {
            let id = sanitize_stem(item.id.as_str(), MAX_ID_SUFFIX_LENGTH);
            stem = format!("{base}-{id}");
            let with_id = stem.clone();
            let mut n = 2;
            while taken.contains(&stem.to_lowercase()) {
                stem = format!("{with_id}-{n}");
                n += 1;
            }
        }

        taken.insert(stem.to_lowercase());
        names.insert(item.id.clone(), format!("{stem}.{}", format.extension()));
    }

    FilePlan {
        root: root.into(),
        format,
        names,
    }
}

/// Name of a run directory: `<prefix>-<UTC timestamp>-<run id prefix>`
pub fn run_directory_name(prefix: &str, run_id: &RunId, started_at: DateTime<Utc>) -> String {
    format!(
        "{prefix}-{}-{}",
        started_at.format("%Y%m%dT%H%M%SZ"),
        run_id.short()
    )
}

/// Creates a fresh run directory under `base`
///
/// # Errors
///
/// Fails if the leaf directory already exists or cannot be created.
pub async fn create_output_directory(
    base: &Path,
    prefix: &str,
    run_id: &RunId,
    started_at: DateTime<Utc>,
) -> Result<PathBuf, FatalRunError> {
    let dir = base.join(run_directory_name(prefix, run_id, started_at));
    let fail = |e: std::io::Error| FatalRunError::OutputDirectory {
        path: dir.clone(),
        reason: e.to_string(),
    };

    tokio::fs::create_dir_all(base).await.map_err(fail)?;
    tokio::fs::create_dir(&dir).await.map_err(fail)?;

    tracing::debug!(dir = %dir.display(), "Created output directory");
    Ok(dir)
}

/// Writes `path` through a temporary sibling and a rename
async fn write_atomic(path: &Path, temp: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Err(e) = tokio::fs::write(temp, bytes).await {
        let _ = tokio::fs::remove_file(temp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(temp, path).await {
        let _ = tokio::fs::remove_file(temp).await;
        return Err(e);
    }
    Ok(())
}

/// Writes one item's bytes to its planned file
pub async fn write_item(
    plan: &FilePlan,
    item_id: &ItemId,
    bytes: &[u8],
) -> Result<ExportedFile, WriteError> {
    let file_name = plan
        .file_name(item_id)
        .ok_or_else(|| WriteError::Unplanned(item_id.to_string()))?;
    let path = plan.root.join(file_name);

    write_atomic(&path, &plan.temp_path(file_name), bytes)
        .await
        .map_err(|e| WriteError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    Ok(ExportedFile {
        item_id: item_id.clone(),
        file_name: file_name.to_string(),
        bytes: bytes.len() as u64,
        checksum: calculate_checksum_bytes(bytes),
        quality_score: None,
    })
}

/// Removes whatever an item may have placed in the run directory
pub async fn discard_item(plan: &FilePlan, item_id: &ItemId) {
    let Some(file_name) = plan.file_name(item_id) else {
        return;
    };
    for path in [plan.root.join(file_name), plan.temp_path(file_name)] {
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed abandoned output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove abandoned output"
            ),
        }
    }
}

/// Writes `manifest.json` into the run directory
pub async fn finalize(root: &Path, manifest: &Manifest) -> Result<PathBuf, FatalRunError> {
    let path = root.join(MANIFEST_FILE_NAME);
    let fail = |reason: String| FatalRunError::Manifest {
        path: path.clone(),
        reason,
    };

    let bytes = manifest.to_json_bytes().map_err(|e| fail(e.to_string()))?;
    let temp = root.join(format!(".{MANIFEST_FILE_NAME}.tmp"));
    write_atomic(&path, &temp, &bytes)
        .await
        .map_err(|e| fail(e.to_string()))?;

    Ok(path)
}
