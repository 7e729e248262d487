use std::fs;
use std::io::{Read, copy};
use std::path::{Path, PathBuf};

use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::RANGE;
use url::Url;

use crate::downloader::{SyncDownload, Writable};
use crate::utils::callback::{AbortCallback, Callback, Nop};
use crate::utils::constants::TEMP_FILE_EXTENSION;
use crate::utils::errors::RecipeError;

/// Progress of a transfer, reported to the progress callback after every read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes on disk so far, including any resumed prefix.
    pub downloaded: usize,
    /// Expected size of the finished file. None if the server sent no content-length.
    pub total_size: Option<usize>,
}

/// Downloads a file synchronously (blocking).
/// Current progress can be obtained by supplying a Callback.
/// It is recommended to use [sync_download_request] or [sync_resume_request] to construct this
/// object and use the builder to set the callbacks over manual creation.
///
/// Bytes are written to `<content_name>.tmp` and only renamed to `content_name` once the body
/// has been fully read. When `resume_from` is non-zero, the temporary file already holds that
/// many bytes and the stream carries the remainder.
pub struct SyncDownloader<R, CB, A>
where
    R: Read,
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
    file_stream: R,
    content_name: String,
    progress: usize,
    /// Bytes already present in the temporary file before this transfer started.
    resume_from: u64,
    /// Content-length of the response plus resume_from; None when the server does not say.
    total_size: Option<usize>,
    progress_callback: CB,
    abort_callback: A,
}

impl<R: Read> SyncDownloader<R, Nop<DownloadProgress>, Nop<()>> {
    /// Returns a SyncDownloader with the default (NOP) callbacks
    pub fn new_with_parameters(
        file_stream: R,
        content_name: String,
        total_size: Option<usize>,
        resume_from: u64,
    ) -> Self {
        Self {
            file_stream,
            content_name,
            progress: resume_from as usize,
            resume_from,
            total_size,
            progress_callback: Nop::new(),
            abort_callback: Nop::new(),
        }
    }
}

impl<R, CB, A> SyncDownloader<R, CB, A>
where
    R: Read,
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
    /// Returns a SyncDownloader with both callbacks set.
    pub fn new_full(
        file_stream: R,
        content_name: String,
        total_size: Option<usize>,
        resume_from: u64,
        progress_callback: CB,
        abort_callback: A,
    ) -> Self {
        Self {
            file_stream,
            content_name,
            progress: resume_from as usize,
            resume_from,
            total_size,
            progress_callback,
            abort_callback,
        }
    }

    /// Sets the (optional) progress callback.
    /// To un-set the callback, supply a [Nop]
    pub fn with_progress_callback<C>(self, progress_callback: C) -> SyncDownloader<R, C, A>
    where
        C: Callback<Argument = DownloadProgress>,
    {
        SyncDownloader::new_full(
            self.file_stream,
            self.content_name,
            self.total_size,
            self.resume_from,
            progress_callback,
            self.abort_callback,
        )
    }

    pub fn with_abort_callback<A2>(self, abort_callback: A2) -> SyncDownloader<R, CB, A2>
    where
        A2: AbortCallback,
    {
        SyncDownloader::new_full(
            self.file_stream,
            self.content_name,
            self.total_size,
            self.resume_from,
            self.progress_callback,
            abort_callback,
        )
    }
}

impl<R, CB, A> Read for SyncDownloader<R, CB, A>
where
    R: Read,
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.abort_callback.abort() {
            return Err(std::io::Error::from(std::io::ErrorKind::ConnectionAborted));
        }

        let byte_read = self.file_stream.read(buf);
        if let Ok(num_bytes) = byte_read {
            self.progress += num_bytes;
            self.progress_callback.call(DownloadProgress {
                downloaded: self.progress,
                total_size: self.total_size,
            });
        };
        byte_read
    }
}

impl<R, CB, A> Writable for SyncDownloader<R, CB, A>
where
    R: Read,
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
}

impl<R, CB, A> SyncDownload for SyncDownloader<R, CB, A>
where
    R: Read,
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
    /// Downloads a file synchronously to the desired location. Returns Err on I/O failure.
    /// This will block the calling thread.
    /// The temporary file is left behind on failure so that a later call can resume it.
    fn download(&mut self, file_directory: &Path) -> Result<PathBuf, RecipeError> {
        Self::prepare_file_path(file_directory)?;

        let file_path = file_directory.join(&self.content_name);
        let tmp_path = partial_path(file_path.as_path());

        let mut dest = Self::open_write_file(tmp_path.as_path(), self.resume_from > 0)?;

        copy(self, &mut dest).map_err(|e| {
            if e.kind() == std::io::ErrorKind::ConnectionAborted {
                RecipeError::DownloadAborted(self.content_name.clone())
            } else {
                e.into()
            }
        })?;

        drop(dest);
        fs::rename(tmp_path.as_path(), file_path.as_path())?;
        Ok(file_path)
    }
}

/// Returns the path used to hold a partially downloaded file.
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(TEMP_FILE_EXTENSION);
    PathBuf::from(name)
}

fn send_request(client: &Client, url: &str, offset: Option<u64>) -> Result<Response, RecipeError> {
    let m_url = Url::parse(url)?;
    let mut request = client.get(m_url);
    if let Some(offset) = offset {
        request = request.header(RANGE, format!("bytes={}-", offset));
    }
    Ok(request.send()?)
}

/// Creates a SyncDownloader that encapsulates the request bytestream, progress,
/// and total response size.
/// Call [SyncDownloader::with_progress_callback] to set an optional callback to receive
/// updates on the number of bytes downloaded.
///
/// NOTE: SyncDownloaders are blocking and thus will block the calling thread.
/// # Arguments:
/// * client: the blocking client used to send the request
/// * url: the download url
/// * content_name: the file name to write the body to
/// # Returns:
/// Ok(SyncDownloader) on success, Err on a failure to send the request or a non-success status
pub fn sync_download_request(
    client: &Client,
    url: &str,
    content_name: &str,
) -> Result<SyncDownloader<Response, Nop<DownloadProgress>, Nop<()>>, RecipeError> {
    let res = send_request(client, url, None)?;

    if !res.status().is_success() {
        return Err(RecipeError::DownloadError(format!(
            "Failed to download, status code: {}",
            res.status()
        )));
    }

    let total_size = res.content_length().map(|len| len as usize);

    Ok(SyncDownloader::new_with_parameters(
        res,
        content_name.to_owned(),
        total_size,
        0,
    ))
}

/// Like [sync_download_request], but asks the server for the bytes after `offset`.
/// # Returns:
/// * Ok(Some(SyncDownloader)) with `resume_from == offset` when the server honours the range,
///   or with `resume_from == 0` when it sends the whole body instead.
/// * Ok(None) when the server reports the range as unsatisfiable, i.e. the partial file is
///   already complete.
pub fn sync_resume_request(
    client: &Client,
    url: &str,
    content_name: &str,
    offset: u64,
) -> Result<Option<SyncDownloader<Response, Nop<DownloadProgress>, Nop<()>>>, RecipeError> {
    let res = send_request(client, url, Some(offset))?;

    let resume_from = match res.status() {
        StatusCode::RANGE_NOT_SATISFIABLE => return Ok(None),
        StatusCode::PARTIAL_CONTENT => offset,
        status if status.is_success() => 0,
        status => {
            return Err(RecipeError::DownloadError(format!(
                "Failed to download, status code: {}",
                status
            )));
        }
    };

    let total_size = res
        .content_length()
        .map(|len| (len + resume_from) as usize);

    Ok(Some(SyncDownloader::new_with_parameters(
        res,
        content_name.to_owned(),
        total_size,
        resume_from,
    )))
}

/// Downloads `url` to `destination` with a default client and no callbacks.
/// See [resumable_download_with_client].
pub fn resumable_download(
    url: &str,
    destination: &Path,
    force_download: bool,
) -> Result<PathBuf, RecipeError> {
    let client = Client::new();
    resumable_download_with_client(
        &client,
        url,
        destination,
        force_download,
        Nop::new(),
        Nop::new(),
    )
}

/// Downloads `url` to `destination`, resuming a previous partial transfer when one exists.
/// * If `destination` already exists and `force_download` is false, nothing is fetched.
/// * If `force_download` is true, any existing destination or partial file is discarded first.
///
/// Network failures are not retried.
pub fn resumable_download_with_client<CB, A>(
    client: &Client,
    url: &str,
    destination: &Path,
    force_download: bool,
    progress_callback: CB,
    abort_callback: A,
) -> Result<PathBuf, RecipeError>
where
    CB: Callback<Argument = DownloadProgress>,
    A: AbortCallback,
{
    let content_name = destination
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            RecipeError::ParameterError(format!(
                "Invalid download destination: {}",
                destination.display()
            ))
        })?;
    let file_directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp_path = partial_path(destination);

    if force_download {
        remove_file_if_exists(destination)?;
        remove_file_if_exists(tmp_path.as_path())?;
    } else if destination.is_file() {
        info!("Skipping download - {} exists.", destination.display());
        return Ok(destination.to_path_buf());
    }

    let resume_from = match fs::metadata(tmp_path.as_path()) {
        Ok(m) if m.is_file() => m.len(),
        _ => 0,
    };

    let downloader = if resume_from > 0 {
        info!(
            "Resuming download of {} from byte {}",
            url, resume_from
        );
        match sync_resume_request(client, url, content_name, resume_from)? {
            Some(downloader) => downloader,
            None => {
                debug!("Server reports {} as complete", tmp_path.display());
                fs::rename(tmp_path.as_path(), destination)?;
                return Ok(destination.to_path_buf());
            }
        }
    } else {
        info!("Downloading {} to {}", url, destination.display());
        sync_download_request(client, url, content_name)?
    };

    let mut downloader = downloader
        .with_progress_callback(progress_callback)
        .with_abort_callback(abort_callback);

    downloader.download(file_directory)
}

fn remove_file_if_exists(path: &Path) -> Result<(), RecipeError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::utils::callback::{RecipeAbortCallback, RecipeCallback};

    #[test]
    fn partial_path_appends_suffix() {
        let p = partial_path(Path::new("/data/waves_yesno.tar.gz"));
        assert_eq!(p, PathBuf::from("/data/waves_yesno.tar.gz.tmp"));
    }

    #[test]
    fn download_from_reader_renames_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let body = b"0123456789".to_vec();
        let mut last = None;
        let mut downloader = SyncDownloader::new_with_parameters(
            Cursor::new(body.clone()),
            "blob".into(),
            Some(10),
            0,
        )
        .with_progress_callback(RecipeCallback::new(|p: DownloadProgress| last = Some(p)));

        let path = downloader.download(dir.path()).unwrap();
        drop(downloader);

        assert_eq!(path, dir.path().join("blob"));
        assert_eq!(fs::read(&path).unwrap(), body);
        assert!(!dir.path().join("blob.tmp").exists());
        assert_eq!(
            last,
            Some(DownloadProgress {
                downloaded: 10,
                total_size: Some(10),
            })
        );
    }

    #[test]
    fn resumed_download_appends_to_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blob.tmp"), b"01234").unwrap();

        let mut seen = vec![];
        let mut downloader = SyncDownloader::new_with_parameters(
            Cursor::new(b"56789".to_vec()),
            "blob".into(),
            Some(10),
            5,
        )
        .with_progress_callback(RecipeCallback::new(|p: DownloadProgress| {
            seen.push(p.downloaded)
        }));
        let path = downloader.download(dir.path()).unwrap();
        drop(downloader);

        assert_eq!(fs::read(path).unwrap(), b"0123456789");
        // Progress counts the resumed prefix.
        assert!(seen.iter().all(|&n| n >= 5));
        assert_eq!(seen.iter().max(), Some(&10));
    }

    #[test]
    fn aborted_download_keeps_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut downloader =
            SyncDownloader::new_with_parameters(Cursor::new(vec![1u8; 64]), "blob".into(), None, 0)
                .with_abort_callback(RecipeAbortCallback::new(|| true));

        let result = downloader.download(dir.path());
        assert!(matches!(result, Err(RecipeError::DownloadAborted(_))));
        assert!(dir.path().join("blob.tmp").is_file());
        assert!(!dir.path().join("blob").exists());
    }
}
