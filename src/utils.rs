use dirs::data_dir;
use once_cell::sync::Lazy;
use std::path::PathBuf;

pub const CREDENTIALS_ENV: &str = "WEEK_EVENTS_CREDENTIALS";
const CREDENTIALS_FILE: &str = "credentials.json";

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    base.join("week-events")
});

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

/// Candidate locations for the credentials file, most specific first.
pub fn credentials_candidates() -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(3);
    if let Some(explicit) = std::env::var_os(CREDENTIALS_ENV) {
        out.push(PathBuf::from(explicit));
    }
    out.push(PathBuf::from(CREDENTIALS_FILE));
    out.push(data_root().join(CREDENTIALS_FILE));
    out
}

pub fn credentials_path() -> Option<PathBuf> {
    credentials_candidates()
        .into_iter()
        .find(|candidate| candidate.is_file())
}
