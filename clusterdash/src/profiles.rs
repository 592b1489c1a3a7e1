//! Named connection profiles: a JSON map of profile name -> { url, tls_ca, timeout_secs }.
//! Stored under the XDG config dir: $XDG_CONFIG_HOME/clusterdash/profiles.json
//! (fallback ~/.config/clusterdash/profiles.json).

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileEntry {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileEntry>,
    #[serde(default)]
    pub version: u32,
}

pub fn config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("clusterdash")
    } else {
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clusterdash")
    }
}

pub fn profiles_path() -> PathBuf {
    config_dir().join("profiles.json")
}

/// A missing or unreadable file yields an empty set of profiles.
pub fn load_profiles() -> ProfilesFile {
    match fs::read_to_string(profiles_path()) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable profiles file: {e}");
            ProfilesFile::default()
        }),
        Err(_) => ProfilesFile::default(),
    }
}

pub fn save_profiles(p: &ProfilesFile) -> io::Result<()> {
    let path = profiles_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(p).map_err(io::Error::other)?;
    fs::write(path, data)
}

#[derive(Debug, PartialEq, Eq)]
pub enum ResolveProfile {
    /// Use the inputs given on the command line (caller may persist them).
    Direct(ProfileEntry),
    /// Loaded from an existing profile entry.
    Loaded(ProfileEntry),
    /// Ask the user to pick one of these profile names.
    PromptSelect(Vec<String>),
    /// Ask the user for the URL of this new profile.
    PromptCreate(String),
    /// Nothing to go on.
    None,
}

#[derive(Debug, Default)]
pub struct ProfileRequest {
    pub profile_name: Option<String>,
    pub url: Option<String>,
    pub tls_ca: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ProfileRequest {
    pub fn resolve(self, pf: &ProfilesFile) -> ResolveProfile {
        match (self.url, self.profile_name) {
            (Some(url), _) => ResolveProfile::Direct(ProfileEntry {
                url,
                tls_ca: self.tls_ca,
                timeout_secs: self.timeout_secs,
            }),
            (None, Some(name)) => match pf.profiles.get(&name) {
                Some(entry) => {
                    let mut entry = entry.clone();
                    // command line wins over the stored value
                    if self.timeout_secs.is_some() {
                        entry.timeout_secs = self.timeout_secs;
                    }
                    if self.tls_ca.is_some() {
                        entry.tls_ca = self.tls_ca;
                    }
                    ResolveProfile::Loaded(entry)
                }
                None => ResolveProfile::PromptCreate(name),
            },
            (None, None) if pf.profiles.is_empty() => ResolveProfile::None,
            (None, None) => ResolveProfile::PromptSelect(pf.profiles.keys().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with(name: &str, url: &str) -> ProfilesFile {
        let mut pf = ProfilesFile::default();
        pf.profiles.insert(
            name.into(),
            ProfileEntry {
                url: url.into(),
                tls_ca: None,
                timeout_secs: Some(30),
            },
        );
        pf
    }

    #[test]
    fn url_on_command_line_is_direct() {
        let req = ProfileRequest {
            url: Some("http://dash:5000/api/clusters".into()),
            profile_name: Some("prod".into()),
            ..Default::default()
        };
        assert!(matches!(
            req.resolve(&file_with("prod", "http://other/api/clusters")),
            ResolveProfile::Direct(e) if e.url == "http://dash:5000/api/clusters"
        ));
    }

    #[test]
    fn known_profile_is_loaded_with_overrides() {
        let req = ProfileRequest {
            profile_name: Some("prod".into()),
            timeout_secs: Some(5),
            ..Default::default()
        };
        let ResolveProfile::Loaded(e) = req.resolve(&file_with("prod", "http://p/api/clusters"))
        else {
            panic!("expected a loaded profile");
        };
        assert_eq!(e.url, "http://p/api/clusters");
        assert_eq!(e.timeout_secs, Some(5));
    }

    #[test]
    fn unknown_profile_prompts_for_creation() {
        let req = ProfileRequest {
            profile_name: Some("new".into()),
            ..Default::default()
        };
        assert_eq!(
            req.resolve(&ProfilesFile::default()),
            ResolveProfile::PromptCreate("new".into())
        );
    }

    #[test]
    fn no_inputs_selects_or_gives_up() {
        assert_eq!(
            ProfileRequest::default().resolve(&ProfilesFile::default()),
            ResolveProfile::None
        );
        assert_eq!(
            ProfileRequest::default().resolve(&file_with("a", "http://a")),
            ResolveProfile::PromptSelect(vec!["a".into()])
        );
    }
}
