use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.methods.as_deref() {
        crate::utils::parse_http_methods_csv(raw)
            .map_err(|e| format!("invalid --methods '{raw}': {e}"))?;
    }
    if let Some(raw) = args.accept_status.as_deref() {
        crate::utils::parse_status_set_csv(raw)
            .map_err(|e| format!("invalid --accept-status '{raw}': {e}"))?;
    }
    for raw in args.header.iter() {
        crate::utils::parse_header_line(raw).map_err(|e| format!("invalid --header: {e}"))?;
    }
    for raw in args.cookie.iter() {
        crate::utils::parse_cookie_pair(raw).map_err(|e| format!("invalid --cookie: {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text or json"
            ));
        }
    }
    Ok(())
}
