use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8085;
pub const BIND_HOST: &str = "0.0.0.0";
/// Site directory name, looked up next to the executable.
pub const SITE_DIR_NAME: &str = "docs";

/// Port from the first CLI argument, then `PORT`, then [`DEFAULT_PORT`].
///
/// A malformed argument is an error; a malformed `PORT` falls back.
pub fn server_port(arg: Option<&str>) -> Result<u16, String> {
    if let Some(arg) = arg {
        return parse_port(arg).ok_or_else(|| format!("invalid port argument: {arg:?}"));
    }
    Ok(std::env::var("PORT")
        .ok()
        .and_then(|value| parse_port(&value))
        .unwrap_or(DEFAULT_PORT))
}

fn parse_port(value: &str) -> Option<u16> {
    value
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port > 0)
}

/// Directory to serve: `SITE_DIR` if set, else `docs` beside the executable.
pub fn site_dir() -> PathBuf {
    std::env::var_os("SITE_DIR")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_site_dir)
}

fn default_site_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SITE_DIR_NAME)
}
