use std::path::PathBuf;

use directories_next::ProjectDirs;

/// File name of the classifier settings inside the project config dir.
pub const SETTINGS_FILE_NAME: &str = "classifier.toml";

/// Per-user configuration directory for this crate, e.g.
/// `~/.config/pathext` on Linux. `None` when no home directory is known.
pub fn project_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pathext").map(|d| d.config_dir().to_path_buf())
}

/// Location of the per-user classifier settings file.
pub fn user_settings_path() -> Option<PathBuf> {
    project_config_dir().map(|d| d.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_path_ends_with_file_name() {
        if let Some(p) = user_settings_path() {
            assert!(p.ends_with(SETTINGS_FILE_NAME));
            assert!(p.parent().is_some_and(|d| d.ends_with("pathext")));
        }
    }
}
