use std::collections::HashSet;

pub fn parse_http_methods_csv(value: &str) -> Result<Vec<reqwest::Method>, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("methods list is empty".to_string());
    }

    let mut out: Vec<reqwest::Method> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        let canonical = item.to_ascii_uppercase();
        let method = reqwest::Method::from_bytes(canonical.as_bytes())
            .map_err(|_| format!("invalid method '{item}'"))?;
        if seen.insert(method.as_str().to_string()) {
            out.push(method);
        }
    }

    if out.is_empty() {
        return Err("methods list is empty".to_string());
    }
    Ok(out)
}

/// Parses a status-code set from CSV, where each item is either a single
/// code (`403`) or an inclusive range (`200-299`).
pub fn parse_status_set_csv(value: &str) -> Result<HashSet<u16>, String> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err("status list is empty".to_string());
    }
    let mut out = HashSet::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if let Some((start_raw, end_raw)) = item.split_once('-') {
            let start: u16 = start_raw
                .trim()
                .parse()
                .map_err(|_| format!("invalid status range '{item}'"))?;
            let end: u16 = end_raw
                .trim()
                .parse()
                .map_err(|_| format!("invalid status range '{item}'"))?;
            if start > end {
                return Err(format!("invalid status range '{item}', expected MIN-MAX"));
            }
            out.extend(start..=end);
        } else {
            let code: u16 = item
                .parse()
                .map_err(|_| format!("invalid status code '{item}'"))?;
            out.insert(code);
        }
    }
    if out.is_empty() {
        return Err("status list is empty".to_string());
    }
    Ok(out)
}

/// Default acceptance set: the whole 2xx class plus "exists but forbidden".
pub fn default_accept_status() -> HashSet<u16> {
    let mut out: HashSet<u16> = (200..300).collect();
    out.insert(401);
    out.insert(403);
    out
}

/// Renders a status set as CSV, collapsing consecutive runs into ranges.
pub fn format_status_set(set: &HashSet<u16>) -> String {
    let mut codes: Vec<u16> = set.iter().copied().collect();
    codes.sort_unstable();

    let mut parts: Vec<String> = Vec::new();
    let mut i = 0usize;
    while i < codes.len() {
        let start = codes[i];
        let mut end = start;
        while i + 1 < codes.len() && codes[i + 1] == end + 1 {
            end = codes[i + 1];
            i += 1;
        }
        if end > start + 1 {
            parts.push(format!("{start}-{end}"));
        } else if end == start + 1 {
            parts.push(start.to_string());
            parts.push(end.to_string());
        } else {
            parts.push(start.to_string());
        }
        i += 1;
    }
    parts.join(",")
}

/// Parses a header in 'Key: Value' form.
pub fn parse_header_line(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once(':')
        .ok_or_else(|| format!("invalid header '{value}', expected 'Key: Value'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid header '{value}', empty name"));
    }
    Ok((key.to_string(), val.trim().to_string()))
}

/// Parses a cookie in 'name=value' form.
pub fn parse_cookie_pair(value: &str) -> Result<(String, String), String> {
    let (name, val) = value
        .split_once('=')
        .ok_or_else(|| format!("invalid cookie '{value}', expected 'name=value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid cookie '{value}', empty name"));
    }
    Ok((name.to_string(), val.trim().to_string()))
}

/// Joins a base URL and a candidate path with exactly one slash between
/// them. Strips one trailing slash from the base and one leading slash
/// from the path; everything else (inner slashes, query strings) passes
/// through untouched.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_set_csv_parses_and_dedupes() {
        let set = parse_status_set_csv("200, 404,200").unwrap();
        assert!(set.contains(&200));
        assert!(set.contains(&404));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn parse_status_set_csv_expands_ranges() {
        let set = parse_status_set_csv("200-299,401,403").unwrap();
        assert_eq!(set.len(), 102);
        assert!(set.contains(&200));
        assert!(set.contains(&299));
        assert!(set.contains(&401));
        assert!(!set.contains(&404));
    }

    #[test]
    fn parse_status_set_csv_rejects_garbage() {
        assert!(parse_status_set_csv("").is_err());
        assert!(parse_status_set_csv("abc").is_err());
        assert!(parse_status_set_csv("500-200").is_err());
        assert!(parse_status_set_csv("200-").is_err());
    }

    #[test]
    fn default_accept_status_matches_documented_set() {
        let set = default_accept_status();
        assert_eq!(set, parse_status_set_csv("200-299,401,403").unwrap());
    }

    #[test]
    fn format_status_set_collapses_runs() {
        let set = parse_status_set_csv("200-299,401,403").unwrap();
        assert_eq!(format_status_set(&set), "200-299,401,403");
    }

    #[test]
    fn parse_http_methods_csv_uppercases_and_dedupes() {
        let out = parse_http_methods_csv("head, get,HEAD").unwrap();
        assert_eq!(out, vec![reqwest::Method::HEAD, reqwest::Method::GET]);
    }

    #[test]
    fn parse_header_line_splits_on_first_colon() {
        let (k, v) = parse_header_line("Authorization: Bearer a:b").unwrap();
        assert_eq!(k, "Authorization");
        assert_eq!(v, "Bearer a:b");
        assert!(parse_header_line("no-colon").is_err());
    }

    #[test]
    fn parse_cookie_pair_keeps_value_verbatim() {
        let (n, v) = parse_cookie_pair("session=abc=def").unwrap();
        assert_eq!(n, "session");
        assert_eq!(v, "abc=def");
        assert!(parse_cookie_pair("bare").is_err());
    }

    #[test]
    fn join_url_strips_exactly_one_slash_each_side() {
        assert_eq!(join_url("http://t.test/", "/admin"), "http://t.test/admin");
        assert_eq!(join_url("http://t.test", "admin"), "http://t.test/admin");
        assert_eq!(join_url("http://t.test", "//admin"), "http://t.test//admin");
        assert_eq!(
            join_url("http://t.test", "api/v1?x=1"),
            "http://t.test/api/v1?x=1"
        );
    }
}
