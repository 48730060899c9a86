//! HTTP download of release artifacts and config templates

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use crate::config::Timeouts;
use crate::error::{InstallerError, IoContext};

/// Something that can copy a URL to a local file.
///
/// Implementations must leave `dest` untouched when the transfer fails.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Download `url` to `dest`, returning the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, InstallerError>;
}

/// `reqwest` backed fetcher with connect and inactivity timeouts
pub struct HttpFetcher {
    client: reqwest::Client,
    inactivity: Duration,
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new(timeouts: &Timeouts) -> Result<Self, InstallerError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .user_agent(concat!("periphery-setup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InstallerError::download("<client>", e))?;
        Ok(Self {
            client,
            inactivity: timeouts.inactivity,
            show_progress: std::io::stdout().is_terminal(),
        })
    }

    fn progress_bar(&self, total: Option<u64>) -> ProgressBar {
        match total {
            Some(len) if self.show_progress => {
                let pb = ProgressBar::new(len);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("   [{bar:50.green/blue}] {bytes}/{total_bytes}  {msg}")
                {
                    pb.set_style(style.progress_chars("█▓░"));
                }
                pb
            }
            _ => ProgressBar::hidden(),
        }
    }

    async fn stream_to(&self, url: &str, partial: &Path) -> Result<u64, InstallerError> {
        // connect_timeout does not cover a server that accepts and then stays silent
        let response = timeout(self.inactivity, self.client.get(url).send())
            .await
            .map_err(|_| {
                InstallerError::download(
                    url,
                    format!(
                        "no response within {} seconds",
                        self.inactivity.as_secs()
                    ),
                )
            })?
            .and_then(|r| r.error_for_status())
            .map_err(|e| InstallerError::download(url, e))?;

        let total = response.content_length();
        let pb = self.progress_bar(total);
        if let Some(name) = url.rsplit('/').next() {
            pb.set_message(name.to_string());
        }

        let mut file = tokio::fs::File::create(partial)
            .await
            .io_context(|| format!("Failed to create {}", partial.display()))?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let chunk = match timeout(self.inactivity, stream.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => return Err(InstallerError::download(url, e)),
                Ok(None) => break,
                Err(_) => {
                    return Err(InstallerError::download(
                        url,
                        format!(
                            "no data received for {} seconds after {downloaded} bytes",
                            self.inactivity.as_secs()
                        ),
                    ));
                }
            };
            file.write_all(&chunk)
                .await
                .io_context(|| format!("Failed to write {}", partial.display()))?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush()
            .await
            .io_context(|| format!("Failed to flush {}", partial.display()))?;
        file.sync_all()
            .await
            .io_context(|| format!("Failed to sync {}", partial.display()))?;
        pb.finish_and_clear();

        if let Some(expected) = total
            && expected != downloaded
        {
            return Err(InstallerError::download(
                url,
                format!("expected {expected} bytes, got {downloaded}"),
            ));
        }
        Ok(downloaded)
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, InstallerError> {
        debug!("GET {url} -> {}", dest.display());
        let partial = partial_path(dest);

        match self.stream_to(url, &partial).await {
            Ok(bytes) => {
                tokio::fs::rename(&partial, dest)
                    .await
                    .io_context(|| format!("Failed to move download to {}", dest.display()))?;
                Ok(bytes)
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&partial).await
                    && rm.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to remove {}: {rm}", partial.display());
                }
                Err(e)
            }
        }
    }
}

/// `<dest>.download`, next to the destination so the final rename stays on one filesystem
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(".download");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Serve exactly one canned HTTP response on a loopback port.
    fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/periphery-x86_64")
    }

    fn fetcher() -> HttpFetcher {
        let mut f = HttpFetcher::new(&Timeouts::default()).unwrap();
        f.show_progress = false;
        f
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                // hold the connection open without answering
                thread::sleep(Duration::from_secs(30));
                drop(stream);
            }
        });
        let mut f = HttpFetcher::new(&Timeouts {
            connect: Duration::from_secs(1),
            inactivity: Duration::from_secs(1),
            ..Timeouts::default()
        })
        .unwrap();
        f.show_progress = false;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("periphery");

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            f.fetch(&format!("http://{addr}/periphery-x86_64"), &dest),
        )
        .await
        .expect("fetch hung past its inactivity timeout");

        assert!(matches!(result, Err(InstallerError::Download { .. })));
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/etc/komodo/periphery.config.toml")),
            Path::new("/etc/komodo/periphery.config.toml.download")
        );
    }

    #[tokio::test]
    async fn writes_body_to_destination() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello".to_string(),
        );
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("periphery");

        let bytes = fetcher().fetch(&url, &dest).await.unwrap();

        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn http_error_leaves_no_file() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nNot Found"
                .to_string(),
        );
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("periphery");

        let err = fetcher().fetch(&url, &dest).await.unwrap_err();

        assert!(matches!(err, InstallerError::Download { .. }), "{err}");
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
    }
}
