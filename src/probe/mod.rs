use std::collections::HashSet;
use std::error::Error;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use indicatif::ProgressBar;
use itertools::iproduct;
use tokio::sync::mpsc;

use crate::progress::ProgressCounter;
use crate::utils;

// one (path, method) unit of probing work
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub path: String,
    pub method: reqwest::Method,
}

// the job struct sent to the probe workers, URL already joined
#[derive(Clone, Debug)]
pub struct ProbeJob {
    pub url: String,
    pub method: reqwest::Method,
}

/// What a single probe produced: a status code, or the transport failure
/// that prevented one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeReply {
    Status(u16),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct ProbeOutcome {
    pub url: String,
    pub method: reqwest::Method,
    pub reply: ProbeReply,
}

/// Expands the path set against the method set. The candidate count is the
/// run's total task count and is fixed before dispatch begins.
pub fn build_candidates(paths: &[String], methods: &[reqwest::Method]) -> Vec<Candidate> {
    iproduct!(paths.iter(), methods.iter())
        .map(|(path, method)| Candidate {
            path: path.clone(),
            method: method.clone(),
        })
        .collect()
}

/// A transport failure is never confirmed; a status code is confirmed iff
/// it is a member of the acceptance set.
pub fn is_confirmed(reply: &ProbeReply, accept_status: &HashSet<u16>) -> bool {
    match reply {
        ProbeReply::Status(code) => accept_status.contains(code),
        ProbeReply::Failed(_) => false,
    }
}

// this asynchronous function sends each candidate as a job to the probe
// workers, joined against the base URL and paced by the rate limiter
pub async fn send_candidates(
    tx: mpsc::Sender<ProbeJob>,
    base_url: String,
    candidates: Vec<Candidate>,
    rate: u32,
) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let lim = RateLimiter::direct(Quota::per_second(
        NonZeroU32::new(rate.max(1)).unwrap_or(NonZeroU32::MIN),
    ));

    for candidate in candidates {
        let msg = ProbeJob {
            url: utils::join_url(&base_url, &candidate.path),
            method: candidate.method,
        };
        if tx.send(msg).await.is_err() {
            break;
        }
        lim.until_ready().await;
    }
    Ok(())
}

/// Runs probe jobs off the channel one at a time. Each job produces
/// exactly one outcome and one progress tick, failures included; a
/// failed request never affects the rest of the queue.
pub async fn run_prober(
    pb: ProgressBar,
    mut rx: mpsc::Receiver<ProbeJob>,
    tx: mpsc::Sender<ProbeOutcome>,
    client: reqwest::Client,
    progress: Arc<ProgressCounter>,
) {
    while let Some(job) = rx.recv().await {
        let reply = match client.request(job.method.clone(), &job.url).send().await {
            Ok(resp) => ProbeReply::Status(resp.status().as_u16()),
            Err(e) => ProbeReply::Failed(e.to_string()),
        };

        let outcome = ProbeOutcome {
            url: job.url,
            method: job.method,
            reply,
        };
        let _ = tx.send(outcome).await;

        let done = progress.complete();
        pb.set_message(crate::progress::render_bar(done, progress.total()));
        pb.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_count_is_paths_times_methods() {
        let paths = vec!["/a".to_string(), "/b".to_string(), "/c".to_string()];
        let methods = vec![reqwest::Method::HEAD, reqwest::Method::GET];
        let candidates = build_candidates(&paths, &methods);
        assert_eq!(candidates.len(), 6);
        assert!(candidates.contains(&Candidate {
            path: "/b".to_string(),
            method: reqwest::Method::GET,
        }));
    }

    #[test]
    fn classifier_is_pure_and_rejects_failures() {
        let accept = utils::default_accept_status();
        let hit = ProbeReply::Status(204);
        let forbidden = ProbeReply::Status(403);
        let miss = ProbeReply::Status(404);
        let failed = ProbeReply::Failed("connection refused".to_string());

        assert!(is_confirmed(&hit, &accept));
        assert!(is_confirmed(&forbidden, &accept));
        assert!(!is_confirmed(&miss, &accept));
        assert!(!is_confirmed(&failed, &accept));
        // same inputs, same answer
        assert_eq!(is_confirmed(&hit, &accept), is_confirmed(&hit, &accept));
    }

    #[tokio::test]
    async fn prober_renders_progress_into_the_bar_message() {
        let (job_tx, job_rx) = mpsc::channel::<ProbeJob>(4);
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<ProbeOutcome>(4);
        let pb = ProgressBar::hidden();
        let progress = Arc::new(ProgressCounter::new(1));

        // nothing listens on port 1, the probe fails but still ticks
        job_tx
            .send(ProbeJob {
                url: "http://127.0.0.1:1/x".to_string(),
                method: reqwest::Method::HEAD,
            })
            .await
            .unwrap();
        drop(job_tx);

        run_prober(
            pb.clone(),
            job_rx,
            outcome_tx,
            reqwest::Client::new(),
            progress,
        )
        .await;

        let outcome = outcome_rx.recv().await.unwrap();
        assert!(matches!(outcome.reply, ProbeReply::Failed(_)));
        assert!(pb.message().contains("100.00%"));
    }

    #[tokio::test]
    async fn send_candidates_joins_urls_against_base() {
        let (tx, mut rx) = mpsc::channel::<ProbeJob>(16);
        let candidates = build_candidates(
            &["/admin".to_string(), "login".to_string()],
            &[reqwest::Method::HEAD],
        );
        send_candidates(tx, "http://example.test/".to_string(), candidates, 1000)
            .await
            .unwrap();

        let mut urls = Vec::new();
        while let Some(job) = rx.recv().await {
            urls.push(job.url);
        }
        assert_eq!(
            urls,
            vec![
                "http://example.test/admin".to_string(),
                "http://example.test/login".to_string(),
            ]
        );
    }
}
