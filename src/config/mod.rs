use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub wordlist: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub headers: Option<Vec<String>>,
    pub cookies: Option<Vec<String>>,
    pub methods: Option<String>,
    #[serde(alias = "valid_status")]
    pub accept_status: Option<String>,
    pub concurrency: Option<u32>,
    pub rate: Option<u32>,
    pub timeout: Option<usize>,
    pub workers: Option<usize>,
    pub proxy: Option<String>,
    pub follow_redirects: Option<bool>,
    pub download: Option<bool>,
    pub download_dir: Option<String>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".pathprobe").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# Pathprobe config
#
# Location (default):
#   ~/.pathprobe/config.yml

# Target
# url: https://example.com

# Input
wordlist: Wordlist/pro_100.txt

# Output
output: endpoints.txt
# output_format: text

# HTTP (optional)
# proxy: http://127.0.0.1:8080
# headers:
#   - "Authorization: Bearer token"
# cookies:
#   - "session=abc123"
methods: HEAD
follow_redirects: false

# Status codes that confirm an endpoint. Ranges are inclusive.
accept_status: "200-299,401,403"

# Performance
concurrency: 100
rate: 1000
timeout: 10
workers: 10

# Download phase
download: false
download_dir: downloaded_pages

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
