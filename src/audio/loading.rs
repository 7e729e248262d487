use std::fs::File;
use std::path::Path;

use symphonia::core::io::MediaSourceStream;
use symphonia::core::probe::{Hint, ProbeResult};

use crate::audio::AudioInfo;
use crate::utils::errors::RecipeError;

fn get_audio_probe<P: AsRef<Path>>(path: P) -> Result<ProbeResult, RecipeError> {
    let path = path.as_ref();
    let file = Box::new(File::open(path)?);
    let mss = MediaSourceStream::new(file, Default::default());
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }
    let format_opts = Default::default();
    let metadata_opts = Default::default();
    let probe = symphonia::default::get_probe().format(&hint, mss, &format_opts, &metadata_opts)?;
    Ok(probe)
}

/// Reads sampling rate, frame count and channel count from an audio file's header.
/// No packets are decoded.
pub fn probe_audio_info<P: AsRef<Path>>(path: P) -> Result<AudioInfo, RecipeError> {
    let probe = get_audio_probe(path)?;
    let format = probe.format;
    let track = format
        .default_track()
        .ok_or(RecipeError::ParameterError(
            "Failed to get default audio track".to_string(),
        ))?;
    let codec_params = &track.codec_params;

    let sampling_rate = codec_params
        .sample_rate
        .ok_or(RecipeError::ParameterError(
            "Failed to grab sample rate".to_string(),
        ))?;
    let num_frames = codec_params
        .n_frames
        .ok_or(RecipeError::ParameterError(
            "Failed to get the number of frames".to_string(),
        ))?;
    let num_channels = codec_params
        .channels
        .ok_or(RecipeError::ParameterError(
            "Failed to grab number of channels".to_string(),
        ))?
        .count();

    Ok(AudioInfo {
        sampling_rate,
        num_frames,
        num_channels,
    })
}
