use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use indicatif::ProgressBar;
use tokio::sync::mpsc;

use crate::progress::ProgressCounter;

/// Default directory for persisted endpoint bodies.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloaded_pages";

// the job struct sent to the download workers
#[derive(Clone, Debug)]
pub struct DownloadJob {
    pub url: String,
}

// a persisted endpoint body
#[derive(Clone, Debug)]
pub struct DownloadedArtifact {
    pub source_url: String,
    pub file_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct DownloaderConfig {
    pub base_url: String,
    pub accept_status: HashSet<u16>,
    pub output_dir: PathBuf,
}

/// Maps a Content-Type header to an artifact extension. Types without a
/// mapping are skipped silently, that is not an error.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    if content_type.contains("text/html") {
        Some("html")
    } else if content_type.contains("application/javascript") {
        Some("js")
    } else if content_type.contains("application/x-httpd-php")
        || content_type.contains("text/x-php")
    {
        Some("php")
    } else {
        None
    }
}

/// Derives an artifact filename from an endpoint URL: the base-URL prefix
/// is dropped, surrounding slashes trimmed, and every character outside
/// `[A-Za-z0-9_-]` becomes `_`. Falls back to `index` when nothing is
/// left, so the root endpoint still gets a visible file.
pub fn sanitize_filename(url: &str, base_url: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let relative = url.strip_prefix(base).unwrap_or(url);
    let relative = relative.trim_matches('/');
    let sanitized: String = relative
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "index".to_string()
    } else {
        sanitized
    }
}

/// Runs download jobs off the channel one at a time. A transport or
/// filesystem failure for one URL is reported and never aborts the rest
/// of the queue.
pub async fn run_downloader(
    pb: ProgressBar,
    mut rx: mpsc::Receiver<DownloadJob>,
    tx: mpsc::Sender<DownloadedArtifact>,
    client: reqwest::Client,
    config: DownloaderConfig,
    progress: Arc<ProgressCounter>,
) {
    while let Some(job) = rx.recv().await {
        match fetch_and_persist(&client, &job.url, &config).await {
            Ok(Some(artifact)) => {
                pb.println(format!(
                    "{} {} -> {}",
                    "downloaded".bold().green(),
                    artifact.source_url,
                    artifact.file_path.display(),
                ));
                let _ = tx.send(artifact).await;
            }
            Ok(None) => {}
            Err(e) => {
                pb.println(format!(
                    "{} {}: {}",
                    "failed to download".bold().red(),
                    job.url,
                    e,
                ));
            }
        }
        let done = progress.complete();
        pb.set_message(crate::progress::render_bar(done, progress.total()));
        pb.inc(1);
    }
}

async fn fetch_and_persist(
    client: &reqwest::Client,
    url: &str,
    config: &DownloaderConfig,
) -> Result<Option<DownloadedArtifact>, String> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    if !config.accept_status.contains(&resp.status().as_u16()) {
        return Ok(None);
    }

    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let Some(extension) = extension_for_content_type(&content_type) else {
        return Ok(None);
    };

    let body = resp
        .text()
        .await
        .map_err(|e| format!("failed to read body: {e}"))?;

    let file_name = sanitize_filename(url, &config.base_url);
    let file_path = config.output_dir.join(format!("{file_name}.{extension}"));

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| format!("failed to create {}: {e}", config.output_dir.display()))?;
    tokio::fs::write(&file_path, body.as_bytes())
        .await
        .map_err(|e| format!("failed to write {}: {e}", file_path.display()))?;

    Ok(Some(DownloadedArtifact {
        source_url: url.to_string(),
        file_path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_mapping_matches_known_types() {
        assert_eq!(
            extension_for_content_type("text/html; charset=utf-8"),
            Some("html")
        );
        assert_eq!(
            extension_for_content_type("application/javascript"),
            Some("js")
        );
        assert_eq!(
            extension_for_content_type("application/x-httpd-php"),
            Some("php")
        );
        assert_eq!(extension_for_content_type("text/x-php"), Some("php"));
        assert_eq!(extension_for_content_type("application/octet-stream"), None);
        assert_eq!(extension_for_content_type(""), None);
    }

    #[test]
    fn sanitize_filename_strips_base_and_replaces_specials() {
        assert_eq!(
            sanitize_filename("http://t.test/admin", "http://t.test"),
            "admin"
        );
        assert_eq!(
            sanitize_filename("http://t.test/api/v1?x=1", "http://t.test/"),
            "api_v1_x_1"
        );
        assert_eq!(
            sanitize_filename("http://t.test/user-data_v2/", "http://t.test"),
            "user-data_v2"
        );
        assert_eq!(sanitize_filename("http://t.test/", "http://t.test"), "index");
    }
}
