// External tool resolution.
// Order: explicit option, environment override, then PATH.

use std::env;
use std::path::PathBuf;

/// Environment variable that points at a specific ffprobe binary.
pub const FFPROBE_ENV: &str = "PHOTOMAN_FFPROBE_PATH";

fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        log::debug!("{} points at missing file {}, using PATH", env_key, v);
    }

    PathBuf::from(default_name)
}

/// Get path to ffprobe binary
pub fn ffprobe_path() -> PathBuf {
    resolve_tool(FFPROBE_ENV, "ffprobe")
}
