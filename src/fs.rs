// DevOps Gateway - Filesystem Primitives
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Read, write (with optional backup), list, mkdir, move, stat.
// Every io::Error is converted to ActionFailed here with a remediation hint.
// No policy checks in this module: callers gate paths first.

use crate::error::{ToolError, ToolResult};
use crate::format::Truncation;
use chrono::{DateTime, Local};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
    Other,
}

impl FileType {
    fn from_meta(meta: &std::fs::Metadata) -> Self {
        let ft = meta.file_type();
        if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_file() {
            FileType::File
        } else {
            FileType::Other
        }
    }

    fn flag(&self) -> char {
        match self {
            FileType::File => '-',
            FileType::Directory => 'd',
            FileType::Symlink => 'l',
            FileType::Other => '?',
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileType::File => "file",
            FileType::Directory => "directory",
            FileType::Symlink => "symlink",
            FileType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRead {
    pub content: String,
    pub truncated: Option<Truncation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub bytes: usize,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub file_type: FileType,
    pub size: u64,
}

impl DirEntry {
    /// `d       4096 name` style line
    pub fn line(&self) -> String {
        format!("{}{:>10} {}", self.file_type.flag(), self.size, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: String,
    pub file_type: FileType,
    pub size: u64,
    pub mode: Option<u32>,
    pub modified: Option<String>,
    pub checksum: Option<String>,
}

// ============================================================================
// ERRORS
// ============================================================================

fn io_failure(action: &str, path: &Path, e: io::Error) -> ToolError {
    let hint = match e.kind() {
        io::ErrorKind::NotFound => Some("Check that the path exists (list_directory on its parent)"),
        io::ErrorKind::PermissionDenied => Some("Check the file permissions (get_file_info)"),
        io::ErrorKind::AlreadyExists => Some("Choose a different destination or remove the existing entry"),
        _ => None,
    };
    let err = ToolError::action(action, format!("{}: {}", path.display(), e));
    match hint {
        Some(h) => err.with_hint(h),
        None => err,
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Largest char boundary <= `max`
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Read a text file, optionally only its first `lines` lines.
/// At most `max_bytes + 1` bytes are pulled from disk; anything beyond
/// `max_bytes` is cut and flagged as a preview. Invalid UTF-8 is replaced.
pub fn read_text(path: &Path, lines: Option<usize>, max_bytes: usize) -> ToolResult<FileRead> {
    let file = File::open(path).map_err(|e| io_failure("Reading file", path, e))?;
    let size = file.metadata().map_err(|e| io_failure("Reading file", path, e))?.len();

    let mut reader = BufReader::new(file).take(max_bytes as u64 + 1);
    let mut buf = Vec::new();
    match lines {
        None => {
            reader.read_to_end(&mut buf).map_err(|e| io_failure("Reading file", path, e))?;
        }
        Some(n) => {
            for _ in 0..n {
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .map_err(|e| io_failure("Reading file", path, e))?;
                if read == 0 {
                    break;
                }
            }
            if buf.ends_with(b"\n") {
                buf.pop();
            }
        }
    }

    let mut content = String::from_utf8_lossy(&buf).into_owned();
    if buf.len() > max_bytes || content.len() > max_bytes {
        let end = floor_char_boundary(&content, max_bytes);
        content.truncate(end);
        let total = usize::try_from(size).unwrap_or(usize::MAX).max(buf.len());
        return Ok(FileRead { content, truncated: Some(Truncation { shown: end, total }) });
    }
    Ok(FileRead { content, truncated: None })
}

/// Sibling path `<path>.backup-<stamp>` not yet on disk
fn backup_path(path: &Path, stamp: &str) -> PathBuf {
    let base = format!("{}.backup-{}", path.display(), stamp);
    let mut candidate = PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{}-{}", base, n));
        n += 1;
    }
    candidate
}

/// Write `content`, creating parent directories. With `backup`, an existing
/// file is first copied to a timestamped sibling.
pub fn write_text(path: &Path, content: &str, backup: bool) -> ToolResult<WriteOutcome> {
    let mut saved = None;
    if backup && path.is_file() {
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let dest = backup_path(path, &stamp);
        std::fs::copy(path, &dest).map_err(|e| io_failure("Backing up file", path, e))?;
        log::info!("backup: {:?} -> {:?}", path, dest);
        saved = Some(dest);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_failure("Creating parent directory", parent, e))?;
        }
    }

    std::fs::write(path, content).map_err(|e| io_failure("Writing file", path, e))?;
    Ok(WriteOutcome { bytes: content.len(), backup: saved })
}

/// Entries sorted by name. Dotfiles skipped unless `show_hidden`.
pub fn list_dir(path: &Path, show_hidden: bool) -> ToolResult<Vec<DirEntry>> {
    let reader = std::fs::read_dir(path).map_err(|e| io_failure("Listing directory", path, e))?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| io_failure("Listing directory", path, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !show_hidden && name.starts_with('.') {
            continue;
        }
        // symlink_metadata so links are reported as links
        let (file_type, size) = match std::fs::symlink_metadata(entry.path()) {
            Ok(meta) => (FileType::from_meta(&meta), meta.len()),
            Err(_) => (FileType::Other, 0),
        };
        entries.push(DirEntry { name, file_type, size });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// mkdir -p. Returns false when the directory already existed.
pub fn make_dir(path: &Path) -> ToolResult<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(path).map_err(|e| io_failure("Creating directory", path, e))?;
    Ok(true)
}

/// Rename `from` to `to`. Refuses to replace an existing destination.
pub fn move_path(from: &Path, to: &Path) -> ToolResult<()> {
    if to.exists() {
        return Err(io_failure(
            "Moving file",
            to,
            io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        ));
    }
    std::fs::rename(from, to).map_err(|e| io_failure("Moving file", from, e))
}

/// Metadata plus SHA-256 for regular files
pub fn file_info(path: &Path) -> ToolResult<FileInfo> {
    let meta = std::fs::symlink_metadata(path).map_err(|e| io_failure("Reading metadata", path, e))?;
    let file_type = FileType::from_meta(&meta);

    let modified = meta
        .modified()
        .ok()
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string());

    let checksum = if file_type == FileType::File {
        let data = std::fs::read(path).map_err(|e| io_failure("Hashing file", path, e))?;
        Some(sha256_hex(&data))
    } else {
        None
    };

    Ok(FileInfo {
        path: path.display().to_string(),
        file_type,
        size: meta.len(),
        mode: unix_mode(&meta),
        modified,
        checksum,
    })
}

#[cfg(unix)]
fn unix_mode(meta: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn unix_mode(_meta: &std::fs::Metadata) -> Option<u32> {
    None
}

/// SHA256 hash as hex string
fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================
