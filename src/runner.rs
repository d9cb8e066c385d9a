use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indicatif::ProgressBar;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task;
use tokio::time::Instant;

use crate::downloader::{self, DownloadJob, DownloadedArtifact, DownloaderConfig};
use crate::probe::{self, ProbeJob, ProbeOutcome, ProbeReply};
use crate::progress::ProgressCounter;
use crate::utils;
use crate::wordlist::{self, WordlistSource};

#[derive(Clone, Debug)]
pub struct Options {
    pub base_url: String,
    pub wordlist: Option<WordlistSource>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub methods: Vec<reqwest::Method>,
    pub accept_status: HashSet<u16>,
    pub concurrency: u32,
    pub rate: u32,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    pub download_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            wordlist: Some(WordlistSource::FilePath("Wordlist/pro_100.txt".to_string())),
            headers: Vec::new(),
            cookies: Vec::new(),
            methods: vec![reqwest::Method::HEAD],
            accept_status: utils::default_accept_status(),
            concurrency: 100,
            rate: 1000,
            timeout_seconds: 10,
            proxy: None,
            follow_redirects: false,
            download_dir: PathBuf::from(downloader::DEFAULT_DOWNLOAD_DIR),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no target provided (base_url is empty)")]
    MissingTarget,

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("methods list is empty")]
    EmptyMethods,

    #[error("acceptance status set is empty")]
    EmptyAcceptStatus,

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("failed to read wordlist: {path}: {source}")]
    WordlistRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("task join failed: {source}")]
    TaskJoin {
        #[source]
        source: tokio::task::JoinError,
    },
}

/// A confirmed endpoint with the status code seen at confirmation time.
#[derive(Clone, Debug)]
pub struct Discovered {
    pub url: String,
    pub status: u16,
    pub method: reqwest::Method,
}

#[derive(Clone, Debug)]
pub struct ScanResult {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub discovered: Vec<Discovered>,
}

impl ScanResult {
    /// Sorted, deduplicated endpoint URLs for the report.
    pub fn endpoint_urls(&self) -> Vec<String> {
        self.discovered.iter().map(|d| d.url.clone()).collect()
    }
}

#[derive(Clone, Debug)]
pub struct DownloadSummary {
    pub elapsed: Duration,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub artifacts: Vec<DownloadedArtifact>,
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.base_url.trim().is_empty() {
            return Err(RunnerError::MissingTarget);
        }
        if reqwest::Url::parse(&options.base_url).is_err() {
            return Err(RunnerError::InvalidUrl {
                url: options.base_url.clone(),
            });
        }
        if options.methods.is_empty() {
            return Err(RunnerError::EmptyMethods);
        }
        if options.accept_status.is_empty() {
            return Err(RunnerError::EmptyAcceptStatus);
        }
        Ok(Self { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Probes every (path, method) candidate against the target and
    /// returns the aggregated result once all candidates have completed.
    /// Pass `ProgressBar::hidden()` for library use.
    pub async fn run(&self, pb: ProgressBar) -> Result<ScanResult, RunnerError> {
        let started_at = Instant::now();

        let paths = wordlist::load_paths(self.options.wordlist.as_ref())
            .await
            .map_err(|e| RunnerError::WordlistRead {
                path: wordlist_label(self.options.wordlist.as_ref()),
                source: e,
            })?;

        let candidates = probe::build_candidates(&paths, &self.options.methods);
        let total = candidates.len() as u64;
        pb.set_length(total.max(1));

        let progress = Arc::new(ProgressCounter::new(total));
        let client = build_http_client(&self.options)?;
        let accept_status = self.options.accept_status.clone();

        let (job_tx, mut job_rx) = mpsc::channel::<ProbeJob>(1024);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<ProbeOutcome>(1024);

        let mut worker_job_rxs = Vec::new();
        let worker_count = self.options.concurrency.max(1) as usize;
        let mut worker_job_txs = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let (tx, rx) = mpsc::channel::<ProbeJob>(1024);
            worker_job_txs.push(tx);
            worker_job_rxs.push(rx);
        }

        let dispatch_handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while let Some(job) = job_rx.recv().await {
                if worker_job_txs.is_empty() {
                    break;
                }
                let tx = worker_job_txs[idx % worker_job_txs.len()].clone();
                let _ = tx.send(job).await;
                idx = idx.wrapping_add(1);
            }
        });

        let send_handle = tokio::spawn(probe::send_candidates(
            job_tx,
            self.options.base_url.clone(),
            candidates,
            self.options.rate,
        ));

        let workers = FuturesUnordered::new();
        for jrx in worker_job_rxs {
            let jtx = outcome_tx.clone();
            let jpb = pb.clone();
            let client = client.clone();
            let progress = progress.clone();
            workers.push(task::spawn(async move {
                probe::run_prober(jpb, jrx, jtx, client, progress).await
            }));
        }
        drop(outcome_tx);

        // single owning task serializes all mutation of the result set
        let collect_pb = pb.clone();
        let collect_handle = task::spawn(async move {
            let mut seen: HashMap<String, (u16, reqwest::Method)> = HashMap::new();
            let mut failed: u64 = 0;
            while let Some(outcome) = outcome_rx.recv().await {
                if let ProbeReply::Failed(cause) = &outcome.reply {
                    failed += 1;
                    collect_pb.println(format!(
                        "{} {}: {}",
                        "error fetching".bold().red(),
                        outcome.url,
                        cause,
                    ));
                    continue;
                }
                if !probe::is_confirmed(&outcome.reply, &accept_status) {
                    continue;
                }
                let ProbeReply::Status(code) = outcome.reply else {
                    continue;
                };
                // re-discovery of the same URL under another method is a no-op
                if seen.contains_key(&outcome.url) {
                    continue;
                }
                collect_pb.println(format!(
                    "{} {}",
                    format!("[{code}]").bold().green(),
                    outcome.url,
                ));
                seen.insert(outcome.url, (code, outcome.method));
            }
            (seen, failed)
        });

        match send_handle.await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {}
            Err(e) => return Err(RunnerError::TaskJoin { source: e }),
        }
        let _ = dispatch_handle.await;
        let _: Vec<_> = workers.collect().await;

        let (seen, failed_tasks) = collect_handle
            .await
            .map_err(|e| RunnerError::TaskJoin { source: e })?;

        let mut discovered: Vec<Discovered> = seen
            .into_iter()
            .map(|(url, (status, method))| Discovered {
                url,
                status,
                method,
            })
            .collect();
        discovered.sort_by(|a, b| a.url.cmp(&b.url));

        Ok(ScanResult {
            started_at,
            elapsed: started_at.elapsed(),
            total_tasks: total,
            completed_tasks: progress.completed(),
            failed_tasks,
            discovered,
        })
    }

    /// Re-fetches each discovered endpoint and persists recognized bodies
    /// under the download directory. Uses the same bounded worker pool as
    /// the probe phase.
    pub async fn download(
        &self,
        pb: ProgressBar,
        endpoints: &[String],
    ) -> Result<DownloadSummary, RunnerError> {
        let started_at = Instant::now();
        let total = endpoints.len() as u64;
        pb.set_length(total.max(1));

        let progress = Arc::new(ProgressCounter::new(total));
        let client = build_http_client(&self.options)?;
        let config = DownloaderConfig {
            base_url: self.options.base_url.clone(),
            accept_status: self.options.accept_status.clone(),
            output_dir: self.options.download_dir.clone(),
        };

        let (job_tx, mut job_rx) = mpsc::channel::<DownloadJob>(1024);
        let (artifact_tx, mut artifact_rx) = mpsc::channel::<DownloadedArtifact>(1024);

        let mut worker_job_rxs = Vec::new();
        let worker_count = self.options.concurrency.max(1) as usize;
        let mut worker_job_txs = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let (tx, rx) = mpsc::channel::<DownloadJob>(1024);
            worker_job_txs.push(tx);
            worker_job_rxs.push(rx);
        }

        let dispatch_handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while let Some(job) = job_rx.recv().await {
                if worker_job_txs.is_empty() {
                    break;
                }
                let tx = worker_job_txs[idx % worker_job_txs.len()].clone();
                let _ = tx.send(job).await;
                idx = idx.wrapping_add(1);
            }
        });

        let urls = endpoints.to_vec();
        let send_handle = tokio::spawn(async move {
            for url in urls {
                if job_tx.send(DownloadJob { url }).await.is_err() {
                    break;
                }
            }
        });

        let workers = FuturesUnordered::new();
        for jrx in worker_job_rxs {
            let jtx = artifact_tx.clone();
            let jpb = pb.clone();
            let client = client.clone();
            let config = config.clone();
            let progress = progress.clone();
            workers.push(task::spawn(async move {
                downloader::run_downloader(jpb, jrx, jtx, client, config, progress).await
            }));
        }
        drop(artifact_tx);

        let collect_handle = task::spawn(async move {
            let mut out: Vec<DownloadedArtifact> = Vec::new();
            while let Some(artifact) = artifact_rx.recv().await {
                out.push(artifact);
            }
            out
        });

        let _ = send_handle.await;
        let _ = dispatch_handle.await;
        let _: Vec<_> = workers.collect().await;

        let mut artifacts = collect_handle
            .await
            .map_err(|e| RunnerError::TaskJoin { source: e })?;
        artifacts.sort_by(|a, b| a.source_url.cmp(&b.source_url));

        Ok(DownloadSummary {
            elapsed: started_at.elapsed(),
            total_tasks: total,
            completed_tasks: progress.completed(),
            artifacts,
        })
    }
}

fn wordlist_label(source: Option<&WordlistSource>) -> String {
    match source {
        Some(WordlistSource::FilePath(path)) => path.clone(),
        Some(WordlistSource::Inline(_)) => "<inline>".to_string(),
        None => "<none>".to_string(),
    }
}

fn build_http_client(options: &Options) -> Result<reqwest::Client, RunnerError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:95.0) Gecko/20100101 Firefox/95.0",
        ),
    );

    for (name, value) in options.headers.iter() {
        let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RunnerError::InvalidHeader { name: name.clone() })?;
        let header_value = reqwest::header::HeaderValue::from_str(value)
            .map_err(|_| RunnerError::InvalidHeader { name: name.clone() })?;
        headers.insert(header_name, header_value);
    }

    if !options.cookies.is_empty() {
        let jar = options
            .cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let value = reqwest::header::HeaderValue::from_str(&jar).map_err(|_| {
            RunnerError::InvalidHeader {
                name: "Cookie".to_string(),
            }
        })?;
        headers.insert(reqwest::header::COOKIE, value);
    }

    let redirect_policy = if options.follow_redirects {
        reqwest::redirect::Policy::limited(10)
    } else {
        reqwest::redirect::Policy::none()
    };

    let timeout = Duration::from_secs(options.timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(redirect_policy)
        .timeout(timeout)
        .danger_accept_invalid_hostnames(true)
        .danger_accept_invalid_certs(true);

    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| RunnerError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| RunnerError::HttpClientBuild { source: e })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_or_invalid_target() {
        let options = Options::default();
        assert!(matches!(
            Runner::new(options),
            Err(RunnerError::MissingTarget)
        ));

        let options = Options {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Runner::new(options),
            Err(RunnerError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn new_rejects_empty_methods_and_status_set() {
        let options = Options {
            base_url: "http://example.test".to_string(),
            methods: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            Runner::new(options),
            Err(RunnerError::EmptyMethods)
        ));

        let options = Options {
            base_url: "http://example.test".to_string(),
            accept_status: HashSet::new(),
            ..Default::default()
        };
        assert!(matches!(
            Runner::new(options),
            Err(RunnerError::EmptyAcceptStatus)
        ));
    }

    #[test]
    fn client_build_rejects_bad_header_names() {
        let options = Options {
            base_url: "http://example.test".to_string(),
            headers: vec![("bad header".to_string(), "v".to_string())],
            ..Default::default()
        };
        assert!(matches!(
            build_http_client(&options),
            Err(RunnerError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn client_build_accepts_headers_and_cookies() {
        let options = Options {
            base_url: "http://example.test".to_string(),
            headers: vec![("X-Forwarded-For".to_string(), "127.0.0.1".to_string())],
            cookies: vec![("session".to_string(), "abc".to_string())],
            ..Default::default()
        };
        assert!(build_http_client(&options).is_ok());
    }
}
