use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::utils::errors::RecipeError;

pub mod archive;
pub mod downloaders;

/// For downloading an object synchronously (blocking)
pub trait SyncDownload: Writable {
    /// Downloads into file_directory and returns the file destination.
    fn download(&mut self, file_directory: &Path) -> Result<PathBuf, RecipeError>;
}

/// To handle basic IO operations when downloading files
pub trait Writable {
    // If a file path does not already exist, it will be created.
    fn prepare_file_path(file_directory: &Path) -> Result<(), RecipeError> {
        if !file_directory.exists() {
            fs::create_dir_all(file_directory)?;
        }

        Ok(())
    }

    /// Opens the destination for writing. When appending, existing bytes are kept and new
    /// data lands after them; otherwise the file is truncated.
    fn open_write_file(file_path: &Path, append: bool) -> Result<File, RecipeError> {
        let dest = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(file_path)?;

        Ok(dest)
    }
}
