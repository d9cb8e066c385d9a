use std::collections::HashSet;

use tokio::fs::File;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

/// Paths probed on every run, whether or not a wordlist is supplied.
pub const COMMON_PATHS: [&str; 5] = ["/admin", "/login", "/dashboard", "/user", "/api"];

#[derive(Clone, Debug)]
pub enum WordlistSource {
    FilePath(String),
    Inline(Vec<String>),
}

/// Builds the deduplicated candidate path set: wordlist entries first,
/// then the builtin common paths. A missing wordlist file is tolerated,
/// the builtin paths still apply.
pub async fn load_paths(source: Option<&WordlistSource>) -> Result<Vec<String>, std::io::Error> {
    let mut out: Vec<String> = Vec::new();

    match source {
        Some(WordlistSource::Inline(values)) => {
            out.extend(
                values
                    .iter()
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string()),
            );
        }
        Some(WordlistSource::FilePath(path)) => {
            if let Ok(handle) = File::open(path).await {
                let mut lines = BufReader::new(handle).lines();
                while let Some(line) = lines.next_line().await? {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    out.push(line.to_string());
                }
            }
        }
        None => {}
    }

    out.extend(COMMON_PATHS.iter().map(|p| p.to_string()));

    let mut seen: HashSet<String> = HashSet::new();
    out.retain(|p| seen.insert(p.clone()));
    Ok(out)
}
