//! Recipe for the "yes/no" corpus: 60 recordings of a single speaker saying eight Hebrew words,
//! each either "yes" or "no". The transcript is encoded in the file name, e.g.
//! `0_0_1_0_1_0_0_1.wav` reads "NO NO YES NO YES NO NO YES".

use std::collections::BTreeMap;
#[cfg(feature = "downloader")]
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use strum::IntoEnumIterator;
use walkdir::WalkDir;

use crate::manifest::fix::fix_manifests;
use crate::manifest::validation::validate_recordings_and_supervisions;
use crate::manifest::{
    PartitionManifests, Recording, RecordingSet, SupervisionSegment, SupervisionSet,
};
use crate::recipes::configs::PrepareConfigs;
use crate::recipes::{ManifestKind, Partition, manifest_path};
use crate::utils::constants::{YESNO_TOKEN_DELIMITER, YESNO_WORDS_PER_FILE};
use crate::utils::errors::RecipeError;

#[cfg(feature = "downloader")]
use crate::downloader::archive::safe_extract;
#[cfg(feature = "downloader")]
use crate::downloader::downloaders::{DownloadProgress, resumable_download_with_client};
#[cfg(feature = "downloader")]
use crate::recipes::configs::DownloadConfigs;
#[cfg(feature = "downloader")]
use crate::utils::callback::{AbortCallback, Callback, Nop};
#[cfg(feature = "downloader")]
use crate::utils::constants::{COMPLETED_MARKER, YESNO_ARCHIVE_NAME, YESNO_EXTRACTED_DIR};

/// Immutable symbol-to-word lookup used to decode file names.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WordMap<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl<'a> WordMap<'a> {
    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        Self { entries }
    }

    pub fn word(&self, symbol: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, word)| *word)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &'a str> {
        self.entries.iter().map(|(s, _)| *s)
    }
}

pub const YESNO_WORD_MAP: WordMap<'static> = WordMap::new(&[("0", "NO"), ("1", "YES")]);

/// Decodes a file stem such as `0_1_1_0_0_0_1_0` into "NO YES YES NO NO NO YES NO".
/// The stem must hold exactly eight `_`-separated tokens, each a symbol of `word_map`.
pub fn parse_transcript(stem: &str, word_map: &WordMap) -> Result<String, RecipeError> {
    let tokens: Vec<&str> = stem.split(YESNO_TOKEN_DELIMITER).collect();
    if tokens.len() != YESNO_WORDS_PER_FILE {
        return Err(RecipeError::MalformedFileName {
            name: stem.to_owned(),
            reason: format!(
                "expected {} tokens, found {}",
                YESNO_WORDS_PER_FILE,
                tokens.len()
            ),
        });
    }

    let words = tokens
        .iter()
        .map(|token| {
            word_map.word(token).ok_or_else(|| RecipeError::MalformedFileName {
                name: stem.to_owned(),
                reason: format!(
                    "token {:?} is not one of {:?}",
                    token,
                    word_map.symbols().collect::<Vec<_>>()
                ),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(words.join(" "))
}

/// Lists the audio files directly inside `corpus_dir` and sorts them by file name.
///
/// The order of directory enumeration differs between platforms and filesystems; the sort
/// makes the train/test split reproducible. Hidden files are ignored.
pub fn scan_audio_files(corpus_dir: &Path, extension: &str) -> Result<Vec<PathBuf>, RecipeError> {
    let mut files = vec![];
    for entry in WalkDir::new(corpus_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let hidden = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'));
        let matches = entry.path().extension().and_then(|e| e.to_str()) == Some(extension);
        if matches && !hidden {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Splits an ordered sequence by index parity: even indices first, odd indices second.
/// Both halves keep the input order.
pub fn split_by_parity<T: Clone>(items: &[T]) -> (Vec<T>, Vec<T>) {
    let even = items.iter().step_by(2).cloned().collect();
    let odd = items.iter().skip(1).step_by(2).cloned().collect();
    (even, odd)
}

fn file_stem(path: &Path) -> Result<&str, RecipeError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| RecipeError::MalformedFileName {
            name: path.display().to_string(),
            reason: "file name is not valid UTF-8".to_owned(),
        })
}

/// Builds, fixes up and validates the manifests of one partition.
fn prepare_partition(
    files: &[PathBuf],
    configs: &PrepareConfigs,
    word_map: &WordMap,
) -> Result<PartitionManifests, RecipeError> {
    let mut recordings = Vec::with_capacity(files.len());
    let mut supervisions = Vec::with_capacity(files.len());

    for audio_path in files {
        let stem = file_stem(audio_path)?;
        let text = parse_transcript(stem, word_map)?;

        let recording = Recording::from_file(audio_path, Some(stem))?;
        let segment = SupervisionSegment::new(stem, stem, 0.0, recording.duration)
            .with_channel(0)
            .with_language(configs.language())
            .with_text(&text);

        debug!("{}: {:.3}s \"{}\"", stem, recording.duration, text);
        recordings.push(recording);
        supervisions.push(segment);
    }

    let recordings = RecordingSet::from_recordings(recordings)?;
    let supervisions = SupervisionSet::from_segments(supervisions)?;

    let (recordings, supervisions) = fix_manifests(recordings, supervisions);
    validate_recordings_and_supervisions(&recordings, &supervisions)?;

    Ok(PartitionManifests {
        recordings,
        supervisions,
    })
}

/// Builds the train/test manifests of the yes/no corpus.
///
/// Files are sorted by name and split by index parity (train = even, test = odd). Both
/// partitions are built and validated before anything is written; when `output_dir` is given,
/// each partition is then persisted as
/// `<corpus_tag>_supervisions_<partition>.jsonl.gz` and `<corpus_tag>_recordings_<partition>.jsonl.gz`.
pub fn prepare_yesno(
    corpus_dir: &Path,
    output_dir: Option<&Path>,
    configs: &PrepareConfigs,
) -> Result<BTreeMap<Partition, PartitionManifests>, RecipeError> {
    if !corpus_dir.is_dir() {
        return Err(RecipeError::MissingCorpusDirectory(corpus_dir.to_path_buf()));
    }

    let files = scan_audio_files(corpus_dir, configs.audio_extension())?;
    if files.len() != configs.expected_num_files() {
        return Err(RecipeError::UnexpectedFileCount {
            expected: configs.expected_num_files(),
            found: files.len(),
        });
    }

    let (train_set, test_set) = split_by_parity(&files);
    for (partition, subset) in [(Partition::Train, &train_set), (Partition::Test, &test_set)] {
        let expected = configs.expected_partition_size(partition);
        if subset.len() != expected {
            return Err(RecipeError::UnexpectedPartitionSize {
                partition: partition.to_string(),
                expected,
                found: subset.len(),
            });
        }
    }

    let mut manifests = BTreeMap::new();
    for (partition, subset) in [(Partition::Train, train_set), (Partition::Test, test_set)] {
        info!("Preparing {} partition ({} files)", partition, subset.len());
        let prepared = prepare_partition(&subset, configs, &YESNO_WORD_MAP)?;
        manifests.insert(partition, prepared);
    }

    if let Some(output_dir) = output_dir {
        std::fs::create_dir_all(output_dir)?;
        for (partition, prepared) in &manifests {
            let tag = configs.corpus_tag();
            prepared.supervisions.to_file(manifest_path(
                output_dir,
                tag,
                ManifestKind::Supervisions,
                *partition,
            ))?;
            prepared.recordings.to_file(manifest_path(
                output_dir,
                tag,
                ManifestKind::Recordings,
                *partition,
            ))?;
        }
        info!("Wrote manifests to {}", output_dir.display());
    }

    Ok(manifests)
}

/// Reads back the manifests written by [prepare_yesno] and validates every partition.
pub fn load_manifests(
    output_dir: &Path,
    corpus_tag: &str,
) -> Result<BTreeMap<Partition, PartitionManifests>, RecipeError> {
    let mut manifests = BTreeMap::new();
    for partition in Partition::iter() {
        let recordings = RecordingSet::from_file(manifest_path(
            output_dir,
            corpus_tag,
            ManifestKind::Recordings,
            partition,
        ))?;
        let supervisions = SupervisionSet::from_file(manifest_path(
            output_dir,
            corpus_tag,
            ManifestKind::Supervisions,
            partition,
        ))?;
        validate_recordings_and_supervisions(&recordings, &supervisions)?;
        manifests.insert(
            partition,
            PartitionManifests {
                recordings,
                supervisions,
            },
        );
    }
    Ok(manifests)
}

/// Downloads and extracts the yes/no corpus under `target_dir` with a default client.
/// See [download_yesno_with_client].
#[cfg(feature = "downloader")]
pub fn download_yesno(target_dir: &Path, configs: &DownloadConfigs) -> Result<PathBuf, RecipeError> {
    let client = reqwest::blocking::Client::new();
    download_yesno_with_client(&client, target_dir, configs, Nop::new(), Nop::new())
}

/// Downloads the corpus archive to `<target_dir>/waves_yesno.tar.gz`, extracts it and returns
/// `<target_dir>/waves_yesno`.
///
/// A `.completed` marker inside the extracted directory is written last. While it exists this
/// function returns immediately without touching the network or the archive.
#[cfg(feature = "downloader")]
pub fn download_yesno_with_client<CB, A>(
    client: &reqwest::blocking::Client,
    target_dir: &Path,
    configs: &DownloadConfigs,
    progress_callback: CB,
    abort_callback: A,
) -> Result<PathBuf, RecipeError>
where
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
    fs::create_dir_all(target_dir)?;
    let extracted_dir = target_dir.join(YESNO_EXTRACTED_DIR);
    let tar_path = target_dir.join(YESNO_ARCHIVE_NAME);
    let completed_detector = extracted_dir.join(COMPLETED_MARKER);

    if completed_detector.is_file() {
        info!("Skipping - {} exists.", completed_detector.display());
        return Ok(extracted_dir);
    }

    resumable_download_with_client(
        client,
        configs.url(),
        tar_path.as_path(),
        configs.force_download(),
        progress_callback,
        abort_callback,
    )?;

    match fs::remove_dir_all(&extracted_dir) {
        Ok(()) => debug!("Removed stale {}", extracted_dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    safe_extract(tar_path.as_path(), target_dir)?;

    if !extracted_dir.is_dir() {
        return Err(RecipeError::ArchiveError(format!(
            "{} did not contain {}",
            tar_path.display(),
            YESNO_EXTRACTED_DIR
        )));
    }
    fs::File::create(&completed_detector)?;

    Ok(extracted_dir)
}
