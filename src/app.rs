use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::output;
use crate::runner::{Options, Runner, ScanResult};
use crate::utils;
use crate::wordlist::WordlistSource;

fn print_banner() {
    const BANNER: &str = r#"
                 __  __                   __
    ____  ____ _/ /_/ /_  ____  _________/ /_  ___
   / __ \/ __ `/ __/ __ \/ __ \/ ___/ __  / _ \/ _ \
  / /_/ / /_/ / /_/ / / / /_/ / /  / /_/ /  __/  __/
 / .___/\__,_/\__/_/ /_/ .___/_/   \__,_/\___/\___/
/_/                   /_/
       v0.2.1 - endpoint discovery and download tool
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    base_url: String,
    wordlist_path: String,
    output: String,
    output_format: Option<String>,
    headers: Vec<(String, String)>,
    cookies: Vec<(String, String)>,
    methods: Vec<reqwest::Method>,
    accept_status: HashSet<u16>,
    concurrency: u32,
    rate: u32,
    timeout: usize,
    workers: usize,
    proxy: Option<String>,
    follow_redirects: bool,
    download: bool,
    download_dir: String,
    no_color: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let base_url = args
        .url
        .or(cfg.url)
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| "target URL is required (--url)".to_string())?;
    if reqwest::Url::parse(&base_url).is_err() {
        return Err(format!("invalid URL: {base_url}"));
    }

    let wordlist_path = config::expand_tilde_string(
        args.wordlist
            .or(cfg.wordlist)
            .unwrap_or_else(|| "Wordlist/pro_100.txt".to_string())
            .as_str(),
    );

    let output = config::expand_tilde_string(
        args.output
            .or(cfg.output)
            .unwrap_or_else(|| "endpoints.txt".to_string())
            .as_str(),
    );
    let output_format = args.output_format.or(cfg.output_format);

    let header_lines = if args.header.is_empty() {
        cfg.headers.unwrap_or_default()
    } else {
        args.header
    };
    let mut headers: Vec<(String, String)> = Vec::new();
    for raw in header_lines.iter() {
        headers.push(utils::parse_header_line(raw).map_err(|e| format!("invalid header: {e}"))?);
    }

    let cookie_pairs = if args.cookie.is_empty() {
        cfg.cookies.unwrap_or_default()
    } else {
        args.cookie
    };
    let mut cookies: Vec<(String, String)> = Vec::new();
    for raw in cookie_pairs.iter() {
        cookies.push(utils::parse_cookie_pair(raw).map_err(|e| format!("invalid cookie: {e}"))?);
    }

    let methods = match args.methods.or(cfg.methods) {
        Some(raw) => utils::parse_http_methods_csv(&raw)
            .map_err(|e| format!("invalid methods '{raw}': {e}"))?,
        None => vec![reqwest::Method::HEAD],
    };

    let accept_status = match args.accept_status.or(cfg.accept_status) {
        Some(raw) => utils::parse_status_set_csv(&raw)
            .map_err(|e| format!("invalid accept-status '{raw}': {e}"))?,
        None => utils::default_accept_status(),
    };

    let concurrency = args.concurrency.or(cfg.concurrency).unwrap_or(100);
    let rate = args.rate.or(cfg.rate).unwrap_or(1000);
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    let workers = args.workers.or(cfg.workers).unwrap_or(10);

    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let follow_redirects = args.follow_redirects || cfg.follow_redirects.unwrap_or(false);

    let download = args.download || cfg.download.unwrap_or(false);
    let download_dir = config::expand_tilde_string(
        args.download_dir
            .or(cfg.download_dir)
            .unwrap_or_else(|| crate::downloader::DEFAULT_DOWNLOAD_DIR.to_string())
            .as_str(),
    );

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    Ok(RunConfig {
        base_url,
        wordlist_path,
        output,
        output_format,
        headers,
        cookies,
        methods,
        accept_status,
        concurrency,
        rate,
        timeout,
        workers,
        proxy,
        follow_redirects,
        download,
        download_dir,
        no_color,
    })
}

fn build_progress_bar() -> Result<ProgressBar, String> {
    let pb = ProgressBar::new(1);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(200));
    pb.set_style(
        ProgressStyle::with_template(
            ":: Progress: [{pos}/{len}] :: {per_sec} :: Duration: [{elapsed_precise}] :: {msg}",
        )
        .map_err(|e| format!("failed to build progress bar style: {e}"))?
        .progress_chars(r#"#>-"#),
    );
    Ok(pb)
}

async fn write_report(run: &RunConfig, result: &ScanResult) -> Result<(), String> {
    let output_format = run
        .output_format
        .as_deref()
        .and_then(output::OutputFormat::parse)
        .or_else(|| output::infer_format_from_path(&run.output))
        .unwrap_or(output::OutputFormat::Text);

    let records = output::build_records(&result.discovered);
    let rendered = match output_format {
        output::OutputFormat::Text => output::render_text(&records),
        output::OutputFormat::Json => output::render_json(&records),
    };

    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&run.output)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|e| format!("failed to write output file: {e}"))?;
    outfile
        .flush()
        .await
        .map_err(|e| format!("failed to flush output file: {e}"))?;
    Ok(())
}

/// Writes the report when something was discovered. Nothing is created
/// on a zero-discovery run; a failed write is reported and does not
/// abort the remaining phases.
async fn report_phase(run: &RunConfig, result: &ScanResult) {
    if result.discovered.is_empty() {
        println!(
            "{} {}",
            "[WRN]".bold().yellow(),
            "No endpoints discovered.".bold().white(),
        );
        return;
    }
    match write_report(run, result).await {
        Ok(()) => format_kv_line("Report", &run.output),
        Err(e) => eprintln!("{} {}", "[ERR]".bold().red(), e),
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let options = Options {
        base_url: run.base_url.clone(),
        wordlist: Some(WordlistSource::FilePath(run.wordlist_path.clone())),
        headers: run.headers.clone(),
        cookies: run.cookies.clone(),
        methods: run.methods.clone(),
        accept_status: run.accept_status.clone(),
        concurrency: run.concurrency,
        rate: run.rate,
        timeout_seconds: run.timeout,
        proxy: run.proxy.clone(),
        follow_redirects: run.follow_redirects,
        download_dir: PathBuf::from(&run.download_dir),
    };
    let runner = Runner::new(options).map_err(|e| e.to_string())?;

    format_kv_line("Target", &run.base_url);
    format_kv_line(
        "Scan",
        &format!(
            "wordlist={} methods={} accept={} download={}",
            run.wordlist_path,
            run.methods
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(","),
            utils::format_status_set(&run.accept_status),
            format_bool(run.download),
        ),
    );
    format_kv_line(
        "HTTP",
        &format!(
            "rate={} conc={} workers={} timeout={}s redirects={} proxy={}",
            run.rate,
            run.concurrency,
            run.workers,
            run.timeout,
            format_bool(run.follow_redirects),
            if run.proxy.is_some() { "on" } else { "off" },
        ),
    );
    println!();

    let pb = build_progress_bar()?;
    let result = runner.run(pb.clone()).await.map_err(|e| e.to_string())?;
    pb.finish_and_clear();

    println!();
    format_kv_line(
        "Probed",
        &format!(
            "tasks={}/{} failed={} found={}",
            result.completed_tasks,
            result.total_tasks,
            result.failed_tasks,
            result.discovered.len(),
        ),
    );

    report_phase(&run, &result).await;

    if run.download && !result.discovered.is_empty() {
        println!();
        println!(
            "{}",
            "downloading content of discovered endpoints".bold().white()
        );
        let dl_pb = build_progress_bar()?;
        let summary = runner
            .download(dl_pb.clone(), &result.endpoint_urls())
            .await
            .map_err(|e| e.to_string())?;
        dl_pb.finish_and_clear();
        format_kv_line(
            "Download",
            &format!(
                "tasks={}/{} artifacts={} dir={}",
                summary.completed_tasks,
                summary.total_tasks,
                summary.artifacts.len(),
                run.download_dir,
            ),
        );
    }

    println!();
    println!(
        ":: Completed :: scan took {}s ::",
        result.elapsed.as_secs()
    );

    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = CliArgs::parse();

    let cfg = match args.config.clone().map(|p| config::expand_tilde(&p)) {
        Some(path) => config::load_config(&path, false)?,
        None => match config::default_config_path() {
            Some(path) => {
                config::ensure_default_config_file(&path)?;
                config::load_config(&path, true)?
            }
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(run.workers)
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
