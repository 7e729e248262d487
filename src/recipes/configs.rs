use serde::{Deserialize, Serialize};

use crate::recipes::Partition;
use crate::utils::constants::{
    AUDIO_EXTENSION, YESNO_CORPUS_TAG, YESNO_LANGUAGE, YESNO_NUM_FILES, YESNO_URL,
};

/// Settings for fetching a corpus archive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DownloadConfigs {
    /// Where the archive is fetched from.
    url: String,
    /// Fetch the archive again even if a complete copy is already on disk.
    force_download: bool,
}

impl DownloadConfigs {
    pub fn new() -> Self {
        Self {
            url: YESNO_URL.to_owned(),
            force_download: false,
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_owned();
        self
    }

    pub fn with_force_download(mut self, force_download: bool) -> Self {
        self.force_download = force_download;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn force_download(&self) -> bool {
        self.force_download
    }
}

impl Default for DownloadConfigs {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for turning an extracted corpus into manifests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfigs {
    /// Prefix of the manifest file names, e.g. `yesno_recordings_train.jsonl.gz`.
    corpus_tag: String,
    /// Only files with this extension are picked up from the corpus directory.
    audio_extension: String,
    /// The corpus must contain exactly this many audio files.
    expected_num_files: usize,
    /// Language tag attached to every supervision.
    language: String,
}

impl PrepareConfigs {
    pub fn new() -> Self {
        Self {
            corpus_tag: YESNO_CORPUS_TAG.to_owned(),
            audio_extension: AUDIO_EXTENSION.to_owned(),
            expected_num_files: YESNO_NUM_FILES,
            language: YESNO_LANGUAGE.to_owned(),
        }
    }

    pub fn with_corpus_tag(mut self, corpus_tag: &str) -> Self {
        self.corpus_tag = corpus_tag.to_owned();
        self
    }

    pub fn with_audio_extension(mut self, audio_extension: &str) -> Self {
        self.audio_extension = audio_extension.trim_start_matches('.').to_owned();
        self
    }

    pub fn with_expected_num_files(mut self, expected_num_files: usize) -> Self {
        self.expected_num_files = expected_num_files;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_owned();
        self
    }

    pub fn corpus_tag(&self) -> &str {
        &self.corpus_tag
    }

    pub fn audio_extension(&self) -> &str {
        &self.audio_extension
    }

    pub fn expected_num_files(&self) -> usize {
        self.expected_num_files
    }

    /// Size of `partition` after the parity split. Train takes the even indices, so it holds
    /// the extra file when the corpus size is odd.
    pub fn expected_partition_size(&self, partition: Partition) -> usize {
        match partition {
            Partition::Train => self.expected_num_files.div_ceil(2),
            Partition::Test => self.expected_num_files / 2,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for PrepareConfigs {
    fn default() -> Self {
        Self::new()
    }
}
