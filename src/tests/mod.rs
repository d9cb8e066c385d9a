use crate::probe::{self, ProbeReply};
use crate::utils;
use crate::wordlist;

#[tokio::test]
async fn builtin_paths_fix_total_tasks_when_wordlist_is_missing() {
    let source = wordlist::WordlistSource::FilePath("/does/not/exist.txt".to_string());
    let paths = wordlist::load_paths(Some(&source)).await.unwrap();
    let methods = vec![reqwest::Method::HEAD, reqwest::Method::GET];
    let candidates = probe::build_candidates(&paths, &methods);
    assert_eq!(candidates.len(), wordlist::COMMON_PATHS.len() * methods.len());
}

#[test]
fn probe_urls_survive_filename_sanitization() {
    let base = "http://example.test";
    let url = utils::join_url(base, "/api/v1/users?id=1");
    assert_eq!(url, "http://example.test/api/v1/users?id=1");
    let name = crate::downloader::sanitize_filename(&url, base);
    assert_eq!(name, "api_v1_users_id_1");
}

#[test]
fn acceptance_policy_drives_classification_end_to_end() {
    let accept = utils::parse_status_set_csv("200").unwrap();
    assert!(probe::is_confirmed(&ProbeReply::Status(200), &accept));
    assert!(!probe::is_confirmed(&ProbeReply::Status(401), &accept));

    let accept = utils::default_accept_status();
    assert!(probe::is_confirmed(&ProbeReply::Status(401), &accept));
    assert!(!probe::is_confirmed(
        &ProbeReply::Failed("dns error".to_string()),
        &accept
    ));
}

#[test]
fn progress_rendering_tracks_counter_state() {
    let counter = crate::progress::ProgressCounter::new(4);
    counter.complete();
    counter.complete();
    let bar = crate::progress::render_bar(counter.completed(), counter.total());
    assert!(bar.contains("50.00%"));
}
