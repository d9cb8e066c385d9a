use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pathprobe",
    version,
    about = "async endpoint discovery and download tool",
    long_about = "Pathprobe discovers live HTTP endpoints on a target by probing candidate paths with bounded concurrency, then optionally downloads the content of confirmed endpoints for offline inspection.\n\nExamples:\n  pathprobe -u https://target.tld/\n  pathprobe -u https://target.tld/ -w wordlist.txt -m HEAD,GET\n  pathprobe -u https://target.tld/ --download\n\nTip: Use --config to persist scan settings and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'u',
        long = "u",
        visible_alias = "url",
        value_name = "URL",
        help_heading = "Input",
        help = "Target base URL (scheme + host)."
    )]
    pub url: Option<String>,

    #[arg(
        short = 'w',
        long = "wl",
        visible_alias = "wordlist",
        value_name = "FILE",
        help_heading = "Input",
        help = "Wordlist file path, one candidate path per line (missing file is tolerated)."
    )]
    pub wordlist: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.pathprobe/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        short = 'H',
        long = "hdr",
        visible_alias = "header",
        value_name = "HEADER",
        action = ArgAction::Append,
        help_heading = "HTTP",
        help = "Add a header to all requests (format: 'Key: Value', repeatable)."
    )]
    pub header: Vec<String>,

    #[arg(
        short = 'b',
        long = "ck",
        visible_alias = "cookie",
        value_name = "COOKIE",
        action = ArgAction::Append,
        help_heading = "HTTP",
        help = "Add a cookie to all requests (format: 'name=value', repeatable)."
    )]
    pub cookie: Vec<String>,

    #[arg(
        short = 'm',
        long = "mth",
        visible_alias = "methods",
        value_name = "METHODS",
        help_heading = "HTTP",
        help = "Comma-separated HTTP methods to probe with (default HEAD)."
    )]
    pub methods: Option<String>,

    #[arg(
        short = 's',
        long = "st",
        visible_alias = "accept-status",
        value_name = "CODES",
        help_heading = "Scan",
        help = "Status codes that confirm an endpoint; single codes or inclusive ranges (default 200-299,401,403)."
    )]
    pub accept_status: Option<String>,

    #[arg(
        short = 't',
        long = "cnc",
        visible_alias = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Max in-flight requests during scanning."
    )]
    pub concurrency: Option<u32>,

    #[arg(
        short = 'r',
        long = "rt",
        visible_alias = "rate",
        value_name = "RPS",
        help_heading = "Performance",
        help = "Request rate limit (requests per second)."
    )]
    pub rate: Option<u32>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<usize>,

    #[arg(
        long = "wrk",
        visible_alias = "workers",
        value_name = "N",
        help_heading = "Performance",
        help = "Number of runtime worker threads."
    )]
    pub workers: Option<usize>,

    #[arg(
        short = 'p',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'F',
        long = "frd",
        visible_alias = "follow-redirects",
        help_heading = "HTTP",
        help = "Follow HTTP redirects."
    )]
    pub follow_redirects: bool,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Report file path (default endpoints.txt; skipped when nothing is found)."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Report format (text or json)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'd',
        long = "dl",
        visible_alias = "download",
        help_heading = "Download",
        help = "Download the content of discovered endpoints after the scan."
    )]
    pub download: bool,

    #[arg(
        long = "dd",
        visible_alias = "download-dir",
        value_name = "DIR",
        help_heading = "Download",
        help = "Directory for downloaded endpoint bodies (default downloaded_pages)."
    )]
    pub download_dir: Option<String>,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,
}
