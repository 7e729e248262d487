use std::path::{Path, PathBuf};

#[cfg(feature = "downloader")]
pub mod net;

pub const TEST_SAMPLE_RATE: u32 = 8000;

// NOTE: this is not actually dead code. Not every test module uses every helper.
#[allow(dead_code)]
pub(crate) fn write_wav(path: &Path, sample_rate: u32, channels: u16, num_frames: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("failed to create wav");
    for i in 0..num_frames * channels as u32 {
        writer
            .write_sample(((i % 200) as i16 - 100) * 50)
            .expect("failed to write sample");
    }
    writer.finalize().expect("failed to finalize wav");
}

/// The i-th yes/no style stem, e.g. `0_1_0_0_0_0_1_1`. Distinct for i in 0..256.
#[allow(dead_code)]
pub(crate) fn yesno_stem(i: usize) -> String {
    // 37 is odd, so this is a permutation of 0..256.
    let code = (i * 37) % 256;
    (0..8)
        .rev()
        .map(|bit| if code >> bit & 1 == 1 { "1" } else { "0" })
        .collect::<Vec<_>>()
        .join("_")
}

/// Writes `n` mono wav files with yes/no names and slightly different lengths.
/// Returns their paths in creation order.
#[allow(dead_code)]
pub(crate) fn make_corpus(dir: &Path, n: usize) -> Vec<PathBuf> {
    std::fs::create_dir_all(dir).expect("failed to create corpus dir");
    (0..n)
        .map(|i| {
            let path = dir.join(format!("{}.wav", yesno_stem(i)));
            write_wav(&path, TEST_SAMPLE_RATE, 1, 8000 + 80 * i as u32);
            path
        })
        .collect()
}
