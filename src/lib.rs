pub mod audio;
#[cfg(feature = "downloader")]
pub mod downloader;
pub mod manifest;
pub mod recipes;
pub mod utils;
