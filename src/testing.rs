//! Testing utilities for the file bridge
//!
//! In-memory stand-ins for the host capabilities, so the bridge can be
//! exercised without a display server or a real disk.

use crate::bridge::error::{BridgeError, Result};
use crate::bridge::file_operations::{DialogProvider, FileFilter};
use crate::bridge::storage_manager::FileSystem;
use std::collections::{HashMap, VecDeque};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a scripted dialog answers with
#[derive(Debug, Clone)]
pub enum DialogReply {
    Pick(PathBuf),
    Cancel,
    /// The host fails to show the dialog
    Fail(String),
}

/// A dialog request as the provider saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub title: String,
    pub filters: Vec<FileFilter>,
    /// Set for save dialogs only
    pub default_name: Option<String>,
}

/// Dialog provider that replays canned replies in order.
///
/// Once the script runs out every dialog is cancelled.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    replies: Mutex<VecDeque<DialogReply>>,
    requests: Mutex<Vec<DialogRequest>>,
}

impl ScriptedDialog {
    pub fn new(replies: impl IntoIterator<Item = DialogReply>) -> Self {
        ScriptedDialog {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<DialogRequest> {
        lock(&self.requests).clone()
    }

    fn answer(&self, operation: &'static str, request: DialogRequest) -> Result<Option<PathBuf>> {
        lock(&self.requests).push(request);
        match lock(&self.replies).pop_front() {
            Some(DialogReply::Pick(path)) => Ok(Some(path)),
            Some(DialogReply::Cancel) | None => Ok(None),
            Some(DialogReply::Fail(reason)) => Err(BridgeError::Dialog { operation, reason }),
        }
    }
}

impl DialogProvider for ScriptedDialog {
    fn open(&self, title: &str, filters: &[FileFilter]) -> Result<Option<PathBuf>> {
        self.answer(
            "open",
            DialogRequest {
                title: title.to_string(),
                filters: filters.to_vec(),
                default_name: None,
            },
        )
    }

    fn save(&self, title: &str, default_name: &str) -> Result<Option<PathBuf>> {
        self.answer(
            "save",
            DialogRequest {
                title: title.to_string(),
                filters: Vec::new(),
                default_name: Some(default_name.to_string()),
            },
        )
    }
}

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Vec<u8>,
    unreadable: bool,
}

/// File system kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, MemoryFile>>,
    inaccessible: Mutex<Vec<PathBuf>>,
    opened: Mutex<usize>,
    read_only: bool,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        self.insert(path.into(), data, false);
        self
    }

    /// A file that exists but errors after its first chunk
    pub fn with_unreadable_file(self, path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        self.insert(path.into(), data, true);
        self
    }

    /// A path whose existence cannot even be checked, like a file under a
    /// directory the caller may not search
    pub fn with_inaccessible_file(self, path: impl Into<PathBuf>) -> Self {
        lock(&self.inaccessible).push(path.into());
        self
    }

    /// Rejects every write with `PermissionDenied`
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn insert(&self, path: PathBuf, data: Vec<u8>, unreadable: bool) {
        lock(&self.files).insert(path, MemoryFile { data, unreadable });
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        lock(&self.files)
            .get(path.as_ref())
            .map(|file| file.data.clone())
    }

    /// How many handles have been handed out by `open`
    pub fn open_count(&self) -> usize {
        *lock(&self.opened)
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        if lock(&self.inaccessible).iter().any(|p| p == path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        Ok(lock(&self.files).contains_key(path))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = lock(&self.files)
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
        *lock(&self.opened) += 1;

        if file.unreadable {
            Ok(Box::new(FailingReader {
                data: file.data,
                served: false,
            }))
        } else {
            Ok(Box::new(Cursor::new(file.data)))
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.insert(path.to_path_buf(), data.to_vec(), false);
        Ok(())
    }
}

struct FailingReader {
    data: Vec<u8>,
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served || self.data.is_empty() {
            return Err(io::Error::other("simulated read failure"));
        }
        self.served = true;
        let n = buf.len().min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        Ok(n)
    }
}
