use std::{env, path::PathBuf};

use dirs_next::{config_dir, home_dir};

/// Environment variable overriding the donation configuration location.
pub const CONFIG_PATH_ENV: &str = "DONATION_CONFIG_PATH";

/// Expands a leading `~` (Unix or Windows separator) to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

/// Location of the donation configuration when none is given explicitly.
///
/// `DONATION_CONFIG_PATH` wins when set and non-blank; otherwise the file
/// lives at `<config dir>/donation/config.yml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("donation")
        .join("config.yml")
}
