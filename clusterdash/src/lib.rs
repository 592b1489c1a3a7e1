//! Library surface for the clusterdash TUI; the binary and the integration
//! tests both build on it.

pub mod app;
pub mod logging;
pub mod poller;
pub mod profiles;
pub mod surface;
pub mod ui;

pub const USAGE: &str = "[--profile NAME|-P NAME] [--save] [--timeout SECS] \
[--tls-ca CERT_PEM|-t CERT_PEM] [--dry-run] [http://HOST:PORT/api/clusters]";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub url: Option<String>,
    pub tls_ca: Option<String>,
    pub profile: Option<String>,
    pub timeout_secs: Option<u64>,
    pub save: bool,
    pub dry_run: bool,
}

fn parse_timeout(v: &str, prog: &str) -> Result<u64, String> {
    match v.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(format!("Invalid --timeout '{v}'. Usage: {prog} {USAGE}")),
    }
}

/// `Err` carries the text to print: the usage line for `--help`, or what
/// was wrong with the arguments.
pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "clusterdash".into());
    let mut parsed = ParsedArgs::default();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => return Err(format!("Usage: {prog} {USAGE}")),
            "--tls-ca" | "-t" => parsed.tls_ca = it.next(),
            "--profile" | "-P" => parsed.profile = it.next(),
            "--timeout" => {
                let v = it.next().unwrap_or_default();
                parsed.timeout_secs = Some(parse_timeout(&v, &prog)?);
            }
            "--save" => parsed.save = true,
            "--dry-run" => parsed.dry_run = true,
            _ if arg.starts_with("--tls-ca=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.tls_ca = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        parsed.profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--timeout=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    parsed.timeout_secs = Some(parse_timeout(v, &prog)?);
                }
            }
            _ if parsed.url.is_none() => parsed.url = Some(arg),
            _ => return Err(format!("Unexpected argument. Usage: {prog} {USAGE}")),
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("clusterdash")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn flags_long_short_and_inline() {
        let p = parse_args(args(&[
            "-P",
            "prod",
            "--tls-ca=/etc/ca.pem",
            "--timeout",
            "30",
            "--save",
            "http://dash:5000/api/clusters",
        ]))
        .unwrap();
        assert_eq!(p.profile.as_deref(), Some("prod"));
        assert_eq!(p.tls_ca.as_deref(), Some("/etc/ca.pem"));
        assert_eq!(p.timeout_secs, Some(30));
        assert!(p.save);
        assert_eq!(p.url.as_deref(), Some("http://dash:5000/api/clusters"));
    }

    #[test]
    fn help_and_extra_positionals_are_errors() {
        assert!(parse_args(args(&["--help"])).unwrap_err().starts_with("Usage:"));
        assert!(parse_args(args(&["http://a", "http://b"]))
            .unwrap_err()
            .starts_with("Unexpected argument"));
    }

    #[test]
    fn timeout_must_be_positive() {
        assert!(parse_args(args(&["--timeout=0"])).is_err());
        assert!(parse_args(args(&["--timeout", "soon"])).is_err());
    }
}
