use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use log::{debug, info};

use crate::utils::errors::RecipeError;

/// Unpacks a gzip-compressed tar archive into `destination`.
///
/// Every entry is checked before anything is written for it: absolute paths and paths with a
/// `..` component are rejected with [RecipeError::PathTraversal], as are links pointing outside
/// the destination. Entries unpacked before the offending one stay on disk.
pub fn safe_extract(archive_path: &Path, destination: &Path) -> Result<(), RecipeError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    fs::create_dir_all(destination)?;

    info!(
        "Extracting {} into {}",
        archive_path.display(),
        destination.display()
    );

    let entries = archive
        .entries()
        .map_err(|e| RecipeError::ArchiveError(format!("Failed to read tar entries: {}", e)))?;

    for entry in entries {
        let mut entry = entry
            .map_err(|e| RecipeError::ArchiveError(format!("Failed to read tar entry: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| RecipeError::ArchiveError(format!("Failed to get entry path: {}", e)))?
            .into_owned();

        if !stays_within(&path) {
            return Err(RecipeError::PathTraversal(path));
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            let target = entry
                .link_name()
                .map_err(|e| RecipeError::ArchiveError(format!("Failed to get link name: {}", e)))?
                .map(|name| name.into_owned());
            if let Some(target) = target {
                // Symlink targets are relative to the link; hard link targets to the archive root.
                let resolved = if entry_type.is_symlink() {
                    path.parent().unwrap_or(Path::new("")).join(&target)
                } else {
                    target.clone()
                };
                if target.is_absolute() || !stays_within(&normalize(&resolved)) {
                    return Err(RecipeError::PathTraversal(target));
                }
            }
        }

        debug!("Unpacking {}", path.display());
        let unpacked = entry.unpack_in(destination).map_err(|e| {
            RecipeError::ArchiveError(format!("Failed to unpack {}: {}", path.display(), e))
        })?;
        if !unpacked {
            return Err(RecipeError::PathTraversal(path));
        }
    }
    Ok(())
}

fn stays_within(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

// Collapses `a/b/../c` into `a/c`. A leading `..` is kept so the caller rejects it.
fn normalize(path: &Path) -> std::path::PathBuf {
    let mut out: Vec<Component> = vec![];
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_stay_within() {
        assert!(stays_within(Path::new("waves_yesno/0_0_1_1_0_0_1_1.wav")));
        assert!(stays_within(Path::new("./waves_yesno/README")));
        assert!(!stays_within(Path::new("../evil.wav")));
        assert!(!stays_within(Path::new("waves_yesno/../../evil.wav")));
        assert!(!stays_within(Path::new("/etc/passwd")));
    }

    #[test]
    fn normalize_collapses_parent_components() {
        assert_eq!(normalize(Path::new("a/b/../c")), Path::new("a/c"));
        assert_eq!(normalize(Path::new("a/../../c")), Path::new("../c"));
    }
}
