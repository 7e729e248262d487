use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;

use crate::manifest::{ManifestItem, ManifestSet};
use crate::utils::errors::RecipeError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ManifestFormat {
    Jsonl,
    JsonlGz,
}

impl ManifestFormat {
    fn from_path(path: &Path) -> Result<Self, RecipeError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RecipeError::InvalidPathExtension(path.to_path_buf()))?;

        if name.ends_with(".jsonl.gz") {
            Ok(ManifestFormat::JsonlGz)
        } else if name.ends_with(".jsonl") {
            Ok(ManifestFormat::Jsonl)
        } else {
            Err(RecipeError::InvalidPathExtension(path.to_path_buf()))
        }
    }
}

impl<T: ManifestItem> ManifestSet<T> {
    /// Writes one JSON object per line.
    pub fn to_jsonl_writer<W: Write>(&self, mut writer: W) -> Result<(), RecipeError> {
        for item in self.iter() {
            serde_json::to_writer(&mut writer, item)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads one JSON object per line; blank lines are skipped.
    pub fn from_jsonl_reader<R: BufRead>(reader: R) -> Result<Self, RecipeError> {
        let mut items = vec![];
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            items.push(serde_json::from_str::<T>(&line)?);
        }
        Self::from_items(items)
    }

    /// Persists the set as `.jsonl` or gzip-compressed `.jsonl.gz`, chosen by the file name.
    /// Any other extension is rejected before the file is created.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RecipeError> {
        let path = path.as_ref();
        let format = ManifestFormat::from_path(path)?;
        let writer = BufWriter::new(File::create(path)?);

        match format {
            ManifestFormat::Jsonl => self.to_jsonl_writer(writer)?,
            ManifestFormat::JsonlGz => {
                let mut encoder = GzEncoder::new(writer, Compression::default());
                self.to_jsonl_writer(&mut encoder)?;
                encoder.finish()?.flush()?;
            }
        }
        debug!("Wrote {} items to {}", self.len(), path.display());
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecipeError> {
        let path = path.as_ref();
        let format = ManifestFormat::from_path(path)?;
        let file = File::open(path)?;

        match format {
            ManifestFormat::Jsonl => Self::from_jsonl_reader(BufReader::new(file)),
            ManifestFormat::JsonlGz => {
                Self::from_jsonl_reader(BufReader::new(GzDecoder::new(BufReader::new(file))))
            }
        }
    }
}
