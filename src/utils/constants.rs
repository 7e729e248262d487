// yes/no corpus (OpenSLR resource 1)
pub const YESNO_URL: &str = "http://www.openslr.org/resources/1/waves_yesno.tar.gz";
pub const YESNO_ARCHIVE_NAME: &str = "waves_yesno.tar.gz";
pub const YESNO_EXTRACTED_DIR: &str = "waves_yesno";
pub const YESNO_CORPUS_TAG: &str = "yesno";
pub const YESNO_LANGUAGE: &str = "Hebrew";
pub const YESNO_NUM_FILES: usize = 60;
pub const YESNO_WORDS_PER_FILE: usize = 8;
pub const YESNO_TOKEN_DELIMITER: char = '_';

// Zero-byte marker written once extraction has finished.
pub const COMPLETED_MARKER: &str = ".completed";

pub const AUDIO_EXTENSION: &str = "wav";

// Partial downloads are kept beside the destination under this suffix.
pub const TEMP_FILE_EXTENSION: &str = ".tmp";

// Seconds. Applies to duration/num_samples agreement and to supervision bounds.
pub const DURATION_TOLERANCE: f64 = 0.025;

pub const MANIFEST_EXTENSION: &str = "jsonl.gz";
