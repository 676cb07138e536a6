//! File selection and image encoding.
//!
//! [`FileBridge`] prompts for paths through a [`DialogProvider`], reads files
//! through a [`FileSystem`] and turns their bytes into data URIs. Every call is
//! independent; the bridge holds only its capabilities and configuration.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod chunker;
pub mod encoding;
pub mod error;
pub mod file_operations;
pub mod storage_manager;

use crate::config::BridgeConfig;
use encoding::EncodedImage;
use error::{BridgeError, Result};
use file_operations::{DialogProvider, FileFilter, NativeDialog};
use storage_manager::{FileSystem, LocalFileSystem};

/// Outcome of a dialog the user got to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Selected(PathBuf),
    Cancelled,
}

impl FileSelection {
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileSelection::Selected(path) => Some(path),
            FileSelection::Cancelled => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            FileSelection::Selected(path) => Some(path),
            FileSelection::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FileSelection::Cancelled)
    }
}

impl From<Option<PathBuf>> for FileSelection {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(FileSelection::Cancelled, FileSelection::Selected)
    }
}

pub struct FileBridge<D, F> {
    dialogs: D,
    files: F,
    config: BridgeConfig,
}

impl FileBridge<NativeDialog, LocalFileSystem> {
    /// Native dialogs over the local disk.
    pub fn native(config: BridgeConfig) -> Self {
        let dialogs = match &config.start_directory {
            Some(dir) => NativeDialog::new().with_start_directory(dir),
            None => NativeDialog::new(),
        };
        FileBridge::new(dialogs, LocalFileSystem, config)
    }
}

impl<D: DialogProvider, F: FileSystem> FileBridge<D, F> {
    pub fn new(dialogs: D, files: F, config: BridgeConfig) -> Self {
        FileBridge {
            dialogs,
            files,
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Asks the user for an existing image restricted to `filters`.
    ///
    /// An empty filter set falls back to the configured input filters.
    pub fn select_input_image(&self, filters: &[FileFilter]) -> Result<FileSelection> {
        let filters = if filters.is_empty() {
            self.config.input_filters.as_slice()
        } else {
            filters
        };

        let selection: FileSelection = self
            .dialogs
            .open(&self.config.open_title, filters)
            .inspect_err(|e| warn!("Error in open dialog: {}", e))?
            .into();

        match selection.path() {
            Some(path) => {
                info!("Selected file: {}", path.display());
                let restricted: Vec<&FileFilter> =
                    filters.iter().filter(|f| !f.extensions.is_empty()).collect();
                if !restricted.is_empty() && !restricted.iter().any(|f| f.matches(path)) {
                    warn!("Selected file {} matches none of the dialog filters", path.display());
                }
            }
            None => info!("No file selected in open dialog"),
        }
        Ok(selection)
    }

    /// Asks the user where to save, pre-filled with `default_name`.
    pub fn select_output_path(&self, default_name: &str) -> Result<FileSelection> {
        let default_name = if default_name.is_empty() {
            self.config.default_output_name.as_str()
        } else {
            default_name
        };

        let selection: FileSelection = self
            .dialogs
            .save(&self.config.save_title, default_name)
            .inspect_err(|e| warn!("Error in save dialog: {}", e))?
            .into();

        match selection.path() {
            Some(path) => info!("Selected output path: {}", path.display()),
            None => info!("No file path selected in save dialog"),
        }
        Ok(selection)
    }

    /// Reads `path` in chunks and encodes it as a `mime_type` data URI.
    pub fn read_file_as_data_uri(&self, path: &Path, mime_type: &str) -> Result<EncodedImage> {
        debug!("Starting read_file_as_data_uri for: {}", path.display());
        encoding::validate_mime_type(mime_type)?;

        let exists = self
            .files
            .exists(path)
            .map_err(|e| BridgeError::from_read(path, e))
            .inspect_err(|e| warn!("File read error: {}", e))?;
        if !exists {
            warn!("File does not exist: {}", path.display());
            return Err(BridgeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = self
            .read_content(path)
            .inspect_err(|e| warn!("File read error: {}", e))?;

        debug!(
            "Read {} bytes in {} chunks from {}",
            content.data.len(),
            content.chunk_count,
            path.display()
        );

        if content.data.is_empty() {
            warn!("No content read from file: {}", path.display());
            return Err(BridgeError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        let encoded = EncodedImage::from_content(mime_type, &content)?;
        debug!("Base64 conversion result length: {}", encoded.payload.len());
        Ok(encoded)
    }

    /// The handle lives only for the duration of this call.
    fn read_content(&self, path: &Path) -> Result<chunker::ChunkedContent> {
        let mut reader = self
            .files
            .open(path)
            .map_err(|e| BridgeError::from_read(path, e))?;
        chunker::read_chunks(reader.as_mut(), self.config.chunk_size)
            .map_err(|e| BridgeError::from_read(path, e))
    }

    /// Like [`read_file_as_data_uri`](Self::read_file_as_data_uri) with the
    /// MIME type taken from the extension.
    pub fn read_file_as_data_uri_guessed(&self, path: &Path) -> Result<EncodedImage> {
        self.read_file_as_data_uri(path, encoding::mime_for_path(path))
    }

    /// Prompts for an image and encodes it. `Ok(None)` when the user cancels.
    pub fn select_and_encode(&self, filters: &[FileFilter]) -> Result<Option<EncodedImage>> {
        match self.select_input_image(filters)? {
            FileSelection::Selected(path) => self.read_file_as_data_uri_guessed(&path).map(Some),
            FileSelection::Cancelled => Ok(None),
        }
    }

    /// Writes processed image bytes to a path, typically one from
    /// [`select_output_path`](Self::select_output_path).
    pub fn write_output(&self, path: &Path, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Err(BridgeError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        self.files
            .write(path, data)
            .map_err(|source| BridgeError::Write {
                path: path.to_path_buf(),
                source,
            })
            .inspect_err(|e| warn!("{}", e))?;

        info!(
            "Wrote {} bytes to {} (sha256 {})",
            data.len(),
            path.display(),
            chunker::hash_data(data)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DialogReply, MemoryFileSystem, ScriptedDialog};

    fn bridge(
        dialog: ScriptedDialog,
        files: MemoryFileSystem,
    ) -> FileBridge<ScriptedDialog, MemoryFileSystem> {
        FileBridge::new(dialog, files, BridgeConfig::default())
    }

    #[test]
    fn test_cancelled_open_is_not_an_error() {
        let bridge = bridge(ScriptedDialog::new([DialogReply::Cancel]), MemoryFileSystem::new());
        let selection = bridge.select_input_image(&[FileFilter::images()]).unwrap();
        assert!(selection.is_cancelled());
        assert_eq!(selection.path(), None);
    }

    #[test]
    fn test_dialog_failure_stays_distinct_from_cancel() {
        let bridge = bridge(
            ScriptedDialog::new([DialogReply::Fail("no display".into())]),
            MemoryFileSystem::new(),
        );
        let err = bridge.select_input_image(&[]).unwrap_err();
        assert!(matches!(err, BridgeError::Dialog { .. }));
    }

    #[test]
    fn test_save_path_returned_unchanged() {
        let dialog = ScriptedDialog::new([DialogReply::Pick("/tmp/out.png".into())]);
        let bridge = bridge(dialog, MemoryFileSystem::new());

        let selection = bridge.select_output_path("no_bg_output.png").unwrap();
        assert_eq!(selection, FileSelection::Selected(PathBuf::from("/tmp/out.png")));

        let requests = bridge.dialogs.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].default_name.as_deref(), Some("no_bg_output.png"));
    }

    #[test]
    fn test_cancelled_save_is_not_an_error() {
        let bridge = bridge(ScriptedDialog::new([DialogReply::Cancel]), MemoryFileSystem::new());
        let selection = bridge.select_output_path("no_bg_output.png").unwrap();
        assert_eq!(selection, FileSelection::Cancelled);
    }

    #[test]
    fn test_unmatched_pick_is_still_returned() {
        let dialog = ScriptedDialog::new([DialogReply::Pick("/docs/notes.txt".into())]);
        let bridge = bridge(dialog, MemoryFileSystem::new());
        let selection = bridge.select_input_image(&[FileFilter::images()]).unwrap();
        assert_eq!(selection.path(), Some(Path::new("/docs/notes.txt")));
    }

    #[test]
    fn test_inaccessible_file_is_read_error_not_missing() {
        let files = MemoryFileSystem::new().with_inaccessible_file("/locked/a.png");
        let bridge = bridge(ScriptedDialog::default(), files);
        let err = bridge
            .read_file_as_data_uri(Path::new("/locked/a.png"), "image/png")
            .unwrap_err();
        match err {
            BridgeError::Read { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied)
            }
            other => panic!("expected Read, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_filters_use_configured_ones() {
        let dialog = ScriptedDialog::new([DialogReply::Cancel]);
        let bridge = bridge(dialog, MemoryFileSystem::new());
        bridge.select_input_image(&[]).unwrap();

        let requests = bridge.dialogs.requests();
        assert_eq!(requests[0].filters, vec![FileFilter::images()]);
        assert_eq!(requests[0].title, "Select an image");
    }

    #[test]
    fn test_png_header_data_uri() {
        let files = MemoryFileSystem::new().with_file("/img/a.png", vec![0x89, 0x50, 0x4E, 0x47]);
        let bridge = bridge(ScriptedDialog::default(), files);

        let encoded = bridge
            .read_file_as_data_uri(Path::new("/img/a.png"), "image/png")
            .unwrap();
        assert!(encoded.data_uri.starts_with("data:image/png;base64,iVBORw=="));
        assert_eq!(encoded.mime_type, "image/png");
    }

    #[test]
    fn test_missing_file() {
        let bridge = bridge(ScriptedDialog::default(), MemoryFileSystem::new());
        let err = bridge
            .read_file_as_data_uri(Path::new("/nope.png"), "image/png")
            .unwrap_err();
        assert!(matches!(err, BridgeError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_file() {
        let files = MemoryFileSystem::new().with_file("/empty.png", Vec::new());
        let bridge = bridge(ScriptedDialog::default(), files);
        let err = bridge
            .read_file_as_data_uri(Path::new("/empty.png"), "image/png")
            .unwrap_err();
        assert!(matches!(err, BridgeError::EmptyFile { .. }));
    }

    #[test]
    fn test_read_failure_midway() {
        let files = MemoryFileSystem::new().with_unreadable_file("/broken.png", vec![1, 2, 3]);
        let bridge = bridge(ScriptedDialog::default(), files);
        let err = bridge
            .read_file_as_data_uri(Path::new("/broken.png"), "image/png")
            .unwrap_err();
        assert!(matches!(err, BridgeError::Read { .. }));
    }

    #[test]
    fn test_bad_mime_type_fails_before_reading() {
        let files = MemoryFileSystem::new().with_file("/a.png", vec![1]);
        let bridge = bridge(ScriptedDialog::default(), files);
        let err = bridge
            .read_file_as_data_uri(Path::new("/a.png"), "image/png; x")
            .unwrap_err();
        assert!(matches!(err, BridgeError::Encoding(_)));
    }

    #[test]
    fn test_select_and_encode() {
        let files = MemoryFileSystem::new().with_file("/pics/cat.jpg", vec![0xFF, 0xD8, 0xFF]);
        let dialog = ScriptedDialog::new([
            DialogReply::Pick("/pics/cat.jpg".into()),
            DialogReply::Cancel,
        ]);
        let bridge = bridge(dialog, files);

        let encoded = bridge.select_and_encode(&[]).unwrap().unwrap();
        assert_eq!(encoded.mime_type, "image/jpeg");
        assert_eq!(encoded.decode().unwrap(), vec![0xFF, 0xD8, 0xFF]);

        assert_eq!(bridge.select_and_encode(&[]).unwrap(), None);
    }

    #[test]
    fn test_write_output() {
        let files = MemoryFileSystem::new();
        let bridge = bridge(ScriptedDialog::default(), files);

        bridge.write_output(Path::new("/out/result.png"), b"png").unwrap();
        assert_eq!(bridge.files.contents("/out/result.png"), Some(b"png".to_vec()));

        let err = bridge.write_output(Path::new("/out/none.png"), &[]).unwrap_err();
        assert!(matches!(err, BridgeError::EmptyFile { .. }));
    }

    #[test]
    fn test_chunk_size_from_config() {
        let files = MemoryFileSystem::new().with_file("/big.bin", vec![7u8; 100]);
        let config = BridgeConfig {
            chunk_size: 16,
            ..BridgeConfig::default()
        };
        let bridge = FileBridge::new(ScriptedDialog::default(), files, config);

        let encoded = bridge
            .read_file_as_data_uri(Path::new("/big.bin"), "application/octet-stream")
            .unwrap();
        assert_eq!(encoded.byte_len, 100);
        assert_eq!(bridge.files.open_count(), 1);
    }
}
