use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

pub mod configs;
pub mod yesno;

/// A named, disjoint subset of a corpus.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Train,
    Test,
}

/// The two manifest kinds written per partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ManifestKind {
    Recordings,
    Supervisions,
}

/// `<output_dir>/<corpus_tag>_<kind>_<partition>.jsonl.gz`
pub fn manifest_path(
    output_dir: &Path,
    corpus_tag: &str,
    kind: ManifestKind,
    partition: Partition,
) -> PathBuf {
    output_dir.join(format!(
        "{}_{}_{}.{}",
        corpus_tag,
        kind,
        partition,
        crate::utils::constants::MANIFEST_EXTENSION
    ))
}
