use crate::manifest::{Recording, RecordingSet, SupervisionSegment, SupervisionSet};
use crate::utils::constants::DURATION_TOLERANCE;
use crate::utils::errors::RecipeError;

pub fn validate_recording(recording: &Recording) -> Result<(), RecipeError> {
    let id = recording.id.as_str();
    if id.is_empty() {
        return Err(RecipeError::validation(id, "Recording id is empty"));
    }
    if recording.sources.is_empty() {
        return Err(RecipeError::validation(id, "Recording has no audio sources"));
    }
    if recording.sources.iter().any(|s| s.channels.is_empty()) {
        return Err(RecipeError::validation(id, "Audio source lists no channels"));
    }
    if recording.sampling_rate == 0 {
        return Err(RecipeError::validation(id, "Sampling rate must be positive"));
    }
    if !recording.duration.is_finite() || recording.duration <= 0.0 {
        return Err(RecipeError::validation(
            id,
            format!("Duration must be positive, got {}", recording.duration),
        ));
    }

    let expected = recording.expected_duration();
    if (expected - recording.duration).abs() > DURATION_TOLERANCE {
        return Err(RecipeError::validation(
            id,
            format!(
                "Duration {} does not match num_samples / sampling_rate = {}",
                recording.duration, expected
            ),
        ));
    }
    Ok(())
}

pub fn validate_supervision(segment: &SupervisionSegment) -> Result<(), RecipeError> {
    let id = segment.id.as_str();
    if id.is_empty() {
        return Err(RecipeError::validation(id, "Supervision id is empty"));
    }
    if segment.recording_id.is_empty() {
        return Err(RecipeError::validation(id, "Supervision has no recording id"));
    }
    if !segment.start.is_finite() || segment.start < 0.0 {
        return Err(RecipeError::validation(
            id,
            format!("Start must be non-negative, got {}", segment.start),
        ));
    }
    if !segment.duration.is_finite() || segment.duration <= 0.0 {
        return Err(RecipeError::validation(
            id,
            format!("Duration must be positive, got {}", segment.duration),
        ));
    }
    Ok(())
}

/// Checks both sets individually and then their relation:
/// every supervision points at an existing recording, fits inside it, uses one of its channels,
/// and every recording is covered by at least one supervision.
pub fn validate_recordings_and_supervisions(
    recordings: &RecordingSet,
    supervisions: &SupervisionSet,
) -> Result<(), RecipeError> {
    for recording in recordings {
        validate_recording(recording)?;
    }

    for segment in supervisions {
        validate_supervision(segment)?;

        let recording = recordings.get(&segment.recording_id).ok_or_else(|| {
            RecipeError::validation(
                &segment.id,
                format!("Unknown recording id: {}", segment.recording_id),
            )
        })?;

        if segment.end() > recording.duration + DURATION_TOLERANCE {
            return Err(RecipeError::validation(
                &segment.id,
                format!(
                    "Segment ends at {} but recording {} lasts {}",
                    segment.end(),
                    recording.id,
                    recording.duration
                ),
            ));
        }

        if !recording.channel_ids().contains(&segment.channel) {
            return Err(RecipeError::validation(
                &segment.id,
                format!(
                    "Channel {} is not present in recording {}",
                    segment.channel, recording.id
                ),
            ));
        }
    }

    for recording in recordings {
        if supervisions.for_recording(&recording.id).next().is_none() {
            return Err(RecipeError::validation(
                &recording.id,
                "Recording has no supervision",
            ));
        }
    }
    Ok(())
}
