//! `.env` loading.

use std::path::PathBuf;

/// Where a `.env` file was found, if anywhere.
#[derive(Debug, Default)]
pub struct EnvLoadResult {
    pub path: Option<PathBuf>,
    /// Parse failure of an `.env` that exists but could not be loaded.
    pub error: Option<String>,
}

/// Loads `.env` from the working directory, else from the executable's directory.
///
/// Runs before the logger exists, so the outcome is returned for logging
/// later instead of being logged here. Variables already set in the
/// environment win over the file.
pub fn try_load_dotenv() -> EnvLoadResult {
    if let Ok(path) = dotenvy::dotenv() {
        return EnvLoadResult {
            path: Some(path),
            error: None,
        };
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let env_path = exe_dir.join(".env");
            if env_path.exists() {
                return match dotenvy::from_path(&env_path) {
                    Ok(()) => EnvLoadResult {
                        path: Some(env_path),
                        error: None,
                    },
                    Err(e) => EnvLoadResult {
                        path: None,
                        error: Some(format!("{}: {e}", env_path.display())),
                    },
                };
            }
        }
    }

    EnvLoadResult::default()
}
