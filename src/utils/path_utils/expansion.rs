use home::home_dir;
use std::path::{Path, PathBuf};

/// Expand a leading `~` in an env file path to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path starts with `~` and no home directory is known.
pub fn expand_tilde(path: &Path) -> Result<PathBuf, String> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    home_dir()
        .map(|home| home.join(rest))
        .ok_or_else(|| format!("Home directory could not be determined for '{}'.", path.display()))
}
