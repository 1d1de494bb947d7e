use crate::error::PocketBaseError;
use std::path::PathBuf;

/// Server used when `POCKETBASE_URL` is not set.
pub const DEFAULT_URL: &str = "http://127.0.0.1:8090";

/// Resolve the server URL from `POCKETBASE_URL`, falling back to [`DEFAULT_URL`].
pub fn url_from_env() -> String {
    std::env::var("POCKETBASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

/// Resolve an auth token from the filesystem.
/// Reads `~/.pocketbase_token`.
pub fn token_from_file() -> Result<String, PocketBaseError> {
    let path = token_file_path()?;
    std::fs::read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            PocketBaseError::Config(format!(
                "Could not read token file {}: {}",
                path.display(),
                e
            ))
        })
}

/// Resolve an auth token from the environment variable `POCKETBASE_TOKEN`.
pub fn token_from_env() -> Result<String, PocketBaseError> {
    std::env::var("POCKETBASE_TOKEN").map_err(|_| {
        PocketBaseError::Config("POCKETBASE_TOKEN environment variable not set".to_string())
    })
}

/// Resolve an auth token with precedence: env var -> file.
/// Returns `None` when neither is present; public collections need no token.
/// (CLI flag takes highest precedence but is handled at the CLI layer.)
pub fn auto_token() -> Option<String> {
    first_token(token_from_env().ok(), || token_from_file().ok())
}

/// The env token unless blank, else the file token unless blank.
fn first_token(env: Option<String>, file: impl FnOnce() -> Option<String>) -> Option<String> {
    let usable = |t: &String| !t.trim().is_empty();
    env.filter(usable).or_else(|| file().filter(usable))
}

fn token_file_path() -> Result<PathBuf, PocketBaseError> {
    home::home_dir()
        .map(|home| home.join(".pocketbase_token"))
        .ok_or_else(|| PocketBaseError::Config("Could not determine home directory".to_string()))
}
