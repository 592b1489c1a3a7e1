//! Entry point for the clusterdash TUI. Parses args, resolves the profile and runs the App.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clusterdash::app::App;
use clusterdash::poller::{build_client, parse_endpoint, spawn_poller, DEFAULT_TIMEOUT};
use clusterdash::profiles::{
    config_dir, load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile,
};
use clusterdash::{logging, ParsedArgs};
use clusterdash_core::{POLL_INTERVAL, THROTTLE_WINDOW};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match clusterdash::parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    let Some(entry) = resolve_connection(&parsed)? else {
        return Ok(());
    };
    let url = parse_endpoint(&entry.url)?;
    let timeout = entry
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    if parsed.dry_run {
        println!("endpoint: {url}");
        println!("timeout: {}s", timeout.as_secs());
        if let Some(ca) = entry.tls_ca.as_deref() {
            println!("tls ca: {ca}");
        }
        return Ok(());
    }

    let log_path = logging::init(&config_dir())?;
    let client = build_client(timeout, entry.tls_ca.as_deref().map(Path::new))?;
    info!(%url, timeout_secs = timeout.as_secs(), log = %log_path.display(), "starting");

    let (events, poller) = spawn_poller(client, url.clone(), POLL_INTERVAL);
    let mut app = App::new(url.as_str(), THROTTLE_WINDOW);
    let res = tokio::select! {
        res = app.run(events) => res,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };
    poller.abort();
    res
}

/// Work out which endpoint to poll, persisting profiles along the way.
/// `None` means the user backed out.
fn resolve_connection(parsed: &ParsedArgs) -> anyhow::Result<Option<ProfileEntry>> {
    let mut profiles = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        tls_ca: parsed.tls_ca.clone(),
        timeout_secs: parsed.timeout_secs,
    };

    let entry = match req.resolve(&profiles) {
        ResolveProfile::Direct(entry) => {
            parse_endpoint(&entry.url)?;
            if let Some(name) = parsed.profile.as_ref() {
                let write = match profiles.profiles.get(name) {
                    // new profile: saved right away
                    None => true,
                    Some(existing) if *existing == entry => false,
                    Some(_) => {
                        parsed.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "))
                    }
                };
                if write {
                    profiles.profiles.insert(name.clone(), entry.clone());
                    save_profiles(&profiles).context("saving profiles")?;
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
                .and_then(|name| profiles.profiles.get(name));
            match picked {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (http://HOST:PORT/api/clusters): ")?;
            let url = url.trim();
            if url.is_empty() {
                return Ok(None);
            }
            parse_endpoint(url)?;
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let ca = ca.trim();
            let entry = ProfileEntry {
                url: url.to_string(),
                tls_ca: (!ca.is_empty()).then(|| ca.to_string()),
                timeout_secs: parsed.timeout_secs,
            };
            profiles.profiles.insert(name, entry.clone());
            save_profiles(&profiles).context("saving profiles")?;
            entry
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(None);
        }
    };
    Ok(Some(entry))
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}
