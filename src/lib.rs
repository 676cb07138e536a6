//! Native file selection and data URI encoding for image panels.
//!
//! ```no_run
//! use file_bridge::{BridgeConfig, FileBridge, FileSelection};
//!
//! let bridge = FileBridge::native(BridgeConfig::default());
//! if let FileSelection::Selected(path) = bridge.select_input_image(&[]).unwrap() {
//!     let image = bridge.read_file_as_data_uri(&path, "image/png").unwrap();
//!     println!("{}", image.data_uri);
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod testing;

pub use bridge::encoding::{mime_for_path, EncodedImage};
pub use bridge::error::{BridgeError, Result};
pub use bridge::file_operations::{DialogProvider, FileFilter, NativeDialog};
pub use bridge::storage_manager::{FileSystem, LocalFileSystem};
pub use bridge::{FileBridge, FileSelection};
pub use config::{BridgeConfig, ConfigError};
