use crate::bridge::error::{BridgeError, Result};
use rfd::FileDialog;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A named group of file extensions offered by an open dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(name: impl Into<String>, extensions: &[S]) -> Self {
        FileFilter {
            name: name.into(),
            extensions: extensions
                .iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Parses a host-style pattern list such as `*.jpg;*.png`.
    ///
    /// Wildcard-only entries (`*`, `*.*`) carry no extension and are dropped.
    pub fn parse(name: impl Into<String>, patterns: &str) -> Self {
        let extensions: Vec<&str> = patterns.split([';', ',']).collect();
        FileFilter::new(name, &extensions)
    }

    /// The image filter the panel opens with.
    pub fn images() -> Self {
        FileFilter::new("Images", &["jpg", "png"])
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

fn normalize_extension(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('*').trim_start_matches('.');
    if trimmed == "*" {
        return String::new();
    }
    trimmed.to_ascii_lowercase()
}

/// Host capability that presents blocking file selection dialogs.
///
/// `Ok(None)` means the user dismissed the dialog. `Err` is reserved for the
/// host failing to show it.
pub trait DialogProvider {
    fn open(&self, title: &str, filters: &[FileFilter]) -> Result<Option<PathBuf>>;

    fn save(&self, title: &str, default_name: &str) -> Result<Option<PathBuf>>;
}

/// Native OS dialogs backed by `rfd`.
#[derive(Debug, Clone, Default)]
pub struct NativeDialog {
    start_directory: Option<PathBuf>,
}

impl NativeDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_directory = Some(dir.into());
        self
    }

    fn base(&self, title: &str) -> FileDialog {
        let dialog = FileDialog::new().set_title(title);
        match &self.start_directory {
            Some(dir) => dialog.set_directory(dir),
            None => dialog,
        }
    }
}

impl DialogProvider for NativeDialog {
    fn open(&self, title: &str, filters: &[FileFilter]) -> Result<Option<PathBuf>> {
        let mut dialog = self.base(title);
        for filter in filters.iter().filter(|f| !f.extensions.is_empty()) {
            dialog = dialog.add_filter(filter.name.as_str(), filter.extensions.as_slice());
        }
        run_dialog("open", move || dialog.pick_file())
    }

    fn save(&self, title: &str, default_name: &str) -> Result<Option<PathBuf>> {
        let dialog = self.base(title).set_file_name(default_name);
        run_dialog("save", move || dialog.save_file())
    }
}

/// Runs a blocking `rfd` dialog, turning a backend panic into a dialog error.
///
/// Only panics are caught. Failures the backend handles itself (the default
/// xdg-portal backend logs a missing portal and returns `None`) cannot be told
/// apart from a cancel through `rfd` and come back as `Ok(None)`. The process
/// panic hook still runs before the unwind is caught, so the default hook
/// prints the panic to stderr unless the application installs its own.
fn run_dialog<F>(operation: &'static str, show: F) -> Result<Option<PathBuf>>
where
    F: FnOnce() -> Option<PathBuf>,
{
    panic::catch_unwind(AssertUnwindSafe(show)).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        warn!("{} dialog backend panicked: {}", operation, reason);
        BridgeError::dialog(operation, reason)
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "dialog backend panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_pattern() {
        let filter = FileFilter::parse("Images", "*.jpg;*.PNG");
        assert_eq!(filter.extensions, vec!["jpg", "png"]);
    }

    #[test]
    fn test_parse_drops_wildcards() {
        let filter = FileFilter::parse("All", "*.*; *");
        assert!(filter.extensions.is_empty());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let filter = FileFilter::images();
        assert!(filter.matches(Path::new("/photos/IMG_0001.JPG")));
        assert!(filter.matches(Path::new("shot.png")));
        assert!(!filter.matches(Path::new("notes.txt")));
        assert!(!filter.matches(Path::new("no_extension")));
    }

    #[test]
    fn test_run_dialog_passes_through_selection() {
        let picked = run_dialog("open", || Some(PathBuf::from("/tmp/a.png"))).unwrap();
        assert_eq!(picked, Some(PathBuf::from("/tmp/a.png")));

        let cancelled = run_dialog("open", || None).unwrap();
        assert_eq!(cancelled, None);
    }

    #[test]
    fn test_run_dialog_turns_panic_into_dialog_error() {
        let err = run_dialog("save", || panic!("no display")).unwrap_err();
        match err {
            BridgeError::Dialog { operation, reason } => {
                assert_eq!(operation, "save");
                assert_eq!(reason, "no display");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
