use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

/// Host capability for reading and writing whole files.
///
/// Readers returned by `open` own their handle; dropping them releases it.
pub trait FileSystem {
    /// `Ok(false)` only when the path is known not to exist; failing to
    /// check (e.g. permission denied on a parent) is an error.
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>>;

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

/// The local disk through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + '_>> {
        let file = File::open(path)?;
        Ok(Box::new(file))
    }

    /// Save data to `path`, creating missing parent directories.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }
}
