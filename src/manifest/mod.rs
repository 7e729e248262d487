use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::audio::compute_duration;
use crate::audio::loading::probe_audio_info;
use crate::utils::errors::RecipeError;

pub mod fix;
pub mod serialization;
pub mod validation;

/// Anything that can be stored in a [ManifestSet]: serializable, keyed by a unique id.
pub trait ManifestItem: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;
}

/// Where the samples of a [Recording] live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub channels: Vec<u32>,
    pub source: String,
}

impl AudioSource {
    pub fn file(channels: Vec<u32>, source: &Path) -> Self {
        Self {
            source_type: "file".to_owned(),
            channels,
            source: source.to_string_lossy().into_owned(),
        }
    }
}

/// Metadata for one audio file (or set of files making up one multi-channel recording).
/// Samples are never loaded into a Recording.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub sources: Vec<AudioSource>,
    pub sampling_rate: u32,
    pub num_samples: u64,
    pub duration: f64,
}

impl Recording {
    /// Builds a Recording from an audio file by reading its header.
    /// The id defaults to the file stem; the source path is stored as an absolute path.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        recording_id: Option<&str>,
    ) -> Result<Self, RecipeError> {
        let path = path.as_ref();
        let info = probe_audio_info(path)?;

        let id = match recording_id {
            Some(id) => id.to_owned(),
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    RecipeError::ParameterError(format!(
                        "Cannot derive a recording id from {}",
                        path.display()
                    ))
                })?
                .to_owned(),
        };

        let absolute = std::path::absolute(path)?;
        let channels = (0..info.num_channels as u32).collect();

        Ok(Self {
            id,
            sources: vec![AudioSource::file(channels, absolute.as_path())],
            sampling_rate: info.sampling_rate,
            num_samples: info.num_frames,
            duration: info.duration(),
        })
    }

    /// Duration as implied by the sample count and sampling rate.
    pub fn expected_duration(&self) -> f64 {
        compute_duration(self.num_samples, self.sampling_rate)
    }

    pub fn channel_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .sources
            .iter()
            .flat_map(|s| s.channels.iter().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn num_channels(&self) -> usize {
        self.channel_ids().len()
    }
}

impl ManifestItem for Recording {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A time span of a [Recording] carrying an annotation (here: the transcript).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupervisionSegment {
    pub id: String,
    pub recording_id: String,
    pub start: f64,
    pub duration: f64,
    pub channel: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl SupervisionSegment {
    pub fn new(id: &str, recording_id: &str, start: f64, duration: f64) -> Self {
        Self {
            id: id.to_owned(),
            recording_id: recording_id.to_owned(),
            start,
            duration,
            channel: 0,
            language: None,
            text: None,
            speaker: None,
        }
    }

    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_owned());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_owned());
        self
    }

    pub fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker = Some(speaker.to_owned());
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

impl ManifestItem for SupervisionSegment {
    fn id(&self) -> &str {
        &self.id
    }
}

/// An ordered collection of manifest items with unique ids.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestSet<T: ManifestItem> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

pub type RecordingSet = ManifestSet<Recording>;
pub type SupervisionSet = ManifestSet<SupervisionSegment>;

impl<T: ManifestItem> ManifestSet<T> {
    pub fn new() -> Self {
        Self {
            items: vec![],
            index: HashMap::new(),
        }
    }

    /// Collects items in iteration order. Returns [RecipeError::DuplicateId] if two items
    /// share an id.
    pub fn from_items<I: IntoIterator<Item = T>>(items: I) -> Result<Self, RecipeError> {
        let mut set = Self::new();
        for item in items {
            set.push(item)?;
        }
        Ok(set)
    }

    fn push(&mut self, item: T) -> Result<(), RecipeError> {
        match self.index.entry(item.id().to_owned()) {
            Entry::Occupied(e) => Err(RecipeError::DuplicateId(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(self.items.len());
                self.items.push(item);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    // Ids must not be changed through this; the index would go stale.
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id())
    }

    /// Returns the same items ordered by id.
    pub fn sorted_by_id(self) -> Self {
        let mut items = self.items;
        items.sort_by(|a, b| a.id().cmp(b.id()));
        let index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id().to_owned(), i))
            .collect();
        Self { items, index }
    }
}

impl<T: ManifestItem> Default for ManifestSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: ManifestItem> IntoIterator for &'a ManifestSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl RecordingSet {
    pub fn from_recordings<I: IntoIterator<Item = Recording>>(
        recordings: I,
    ) -> Result<Self, RecipeError> {
        Self::from_items(recordings)
    }
}

impl SupervisionSet {
    pub fn from_segments<I: IntoIterator<Item = SupervisionSegment>>(
        segments: I,
    ) -> Result<Self, RecipeError> {
        Self::from_items(segments)
    }

    pub fn for_recording<'a>(
        &'a self,
        recording_id: &'a str,
    ) -> impl Iterator<Item = &'a SupervisionSegment> + 'a {
        self.items
            .iter()
            .filter(move |s| s.recording_id == recording_id)
    }
}

/// The manifests of one partition: recordings paired one-to-one with their supervisions.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionManifests {
    pub recordings: RecordingSet,
    pub supervisions: SupervisionSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(id: &str) -> Recording {
        Recording {
            id: id.to_owned(),
            sources: vec![AudioSource::file(vec![0], Path::new("/tmp/a.wav"))],
            sampling_rate: 8000,
            num_samples: 8000,
            duration: 1.0,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = RecordingSet::from_recordings(vec![recording("a"), recording("a")]);
        assert!(matches!(result, Err(RecipeError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn sorted_by_id_keeps_lookup_consistent() {
        let set = RecordingSet::from_recordings(vec![recording("b"), recording("a")])
            .unwrap()
            .sorted_by_id();
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.get("b").map(|r| r.id.as_str()), Some("b"));
    }

    #[test]
    fn channel_ids_are_merged_across_sources() {
        let mut r = recording("a");
        r.sources.push(AudioSource::file(vec![1, 0], Path::new("/tmp/b.wav")));
        assert_eq!(r.channel_ids(), vec![0, 1]);
        assert_eq!(r.num_channels(), 2);
    }

    #[test]
    fn optional_supervision_fields_are_omitted() {
        let s = SupervisionSegment::new("s", "r", 0.0, 1.0).with_text("YES NO");
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"text\":\"YES NO\""));
        assert!(!json.contains("language"));
        assert!(!json.contains("speaker"));
    }
}
