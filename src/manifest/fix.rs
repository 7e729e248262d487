use log::warn;

use crate::manifest::{RecordingSet, SupervisionSet};
use crate::utils::constants::DURATION_TOLERANCE;

/// Canonicalizes a recording/supervision pair without changing what it says:
/// * both sets are ordered by id;
/// * a supervision ending past its recording by no more than [DURATION_TOLERANCE] is trimmed
///   to end exactly at the recording's end.
///
/// Orphans on either side are reported but kept; [super::validation] rejects them.
pub fn fix_manifests(
    recordings: RecordingSet,
    supervisions: SupervisionSet,
) -> (RecordingSet, SupervisionSet) {
    let recordings = recordings.sorted_by_id();
    let mut supervisions = supervisions.sorted_by_id();

    for segment in supervisions.iter_mut() {
        let Some(recording) = recordings.get(&segment.recording_id) else {
            warn!(
                "Supervision {} refers to unknown recording {}",
                segment.id, segment.recording_id
            );
            continue;
        };
        let overshoot = segment.end() - recording.duration;
        if overshoot > 0.0 && overshoot <= DURATION_TOLERANCE {
            segment.duration = (recording.duration - segment.start).max(0.0);
        }
    }

    for recording in &recordings {
        if supervisions.for_recording(&recording.id).next().is_none() {
            warn!("Recording {} has no supervision", recording.id);
        }
    }

    (recordings, supervisions)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::manifest::{AudioSource, Recording, SupervisionSegment};

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
    fn sets_are_sorted_by_id() {
        let recordings =
            RecordingSet::from_recordings(vec![recording("b"), recording("a")]).unwrap();
        let supervisions = SupervisionSet::from_segments(vec![
            SupervisionSegment::new("b", "b", 0.0, 1.0),
            SupervisionSegment::new("a", "a", 0.0, 1.0),
        ])
        .unwrap();

        let (recordings, supervisions) = fix_manifests(recordings, supervisions);
        assert_eq!(recordings.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(supervisions.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn small_overshoot_is_trimmed() {
        let recordings = RecordingSet::from_recordings(vec![recording("a")]).unwrap();
        let supervisions = SupervisionSet::from_segments(vec![
            SupervisionSegment::new("a", "a", 0.0, 1.01).with_text("YES"),
        ])
        .unwrap();

        let (_, supervisions) = fix_manifests(recordings, supervisions);
        let segment = supervisions.get("a").unwrap();
        assert_eq!(segment.duration, 1.0);
        assert_eq!(segment.text.as_deref(), Some("YES"));
    }

    #[test]
    fn orphans_and_large_overshoot_are_left_alone() {
        let recordings = RecordingSet::from_recordings(vec![recording("a")]).unwrap();
        let supervisions = SupervisionSet::from_segments(vec![
            SupervisionSegment::new("a", "a", 0.0, 2.0),
            SupervisionSegment::new("z", "z", 0.0, 1.0),
        ])
        .unwrap();

        let (_, supervisions) = fix_manifests(recordings, supervisions);
        assert_eq!(supervisions.len(), 2);
        assert_eq!(supervisions.get("a").unwrap().duration, 2.0);
    }
}
