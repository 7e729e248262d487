use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use corpus_recipes::downloader::downloaders::DownloadProgress;
use corpus_recipes::recipes::configs::{DownloadConfigs, PrepareConfigs};
use corpus_recipes::recipes::yesno::{download_yesno_with_client, prepare_yesno};
use corpus_recipes::utils::callback::{Nop, RecipeCallback};

/// Corpus download and manifest preparation
#[derive(Parser, Debug)]
#[command(name = "corpus-recipes", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download and extract the yes/no corpus into TARGET_DIR
    Download { target_dir: PathBuf },
    /// Build train/test manifests from an extracted yes/no corpus
    Prepare {
        corpus_dir: PathBuf,
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Download { target_dir } => download(target_dir),
        Command::Prepare {
            corpus_dir,
            output_dir,
        } => prepare(corpus_dir, output_dir),
    }
}

fn download(target_dir: PathBuf) -> Result<()> {
    let configs = DownloadConfigs::default();
    let client = reqwest::blocking::Client::new();

    // Stays a spinner unless the server reports a content-length.
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})")?,
    );
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
        .progress_chars("#>-");

    let pb_c = pb.clone();
    let progress_callback = RecipeCallback::new(move |progress: DownloadProgress| {
        if let Some(total) = progress.total_size {
            if pb_c.length() != Some(total as u64) {
                pb_c.set_length(total as u64);
                pb_c.set_style(bar_style.clone());
            }
        }
        pb_c.set_position(progress.downloaded as u64);
    });

    let extracted = download_yesno_with_client(
        &client,
        &target_dir,
        &configs,
        progress_callback,
        Nop::new(),
    )
    .with_context(|| format!("Failed to download corpus into {}", target_dir.display()))?;
    pb.finish_and_clear();

    info!("Corpus available at {}", extracted.display());
    Ok(())
}

fn prepare(corpus_dir: PathBuf, output_dir: PathBuf) -> Result<()> {
    if !corpus_dir.is_dir() {
        bail!("No such directory: {}", corpus_dir.display());
    }

    let configs = PrepareConfigs::default();
    let manifests = prepare_yesno(&corpus_dir, Some(output_dir.as_path()), &configs)
        .with_context(|| format!("Failed to prepare manifests from {}", corpus_dir.display()))?;

    for (partition, prepared) in &manifests {
        info!(
            "{}: {} recordings, {} supervisions",
            partition,
            prepared.recordings.len(),
            prepared.supervisions.len()
        );
    }
    Ok(())
}
