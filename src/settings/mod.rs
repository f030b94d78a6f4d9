pub mod config_dirs;
pub mod read_settings;

// Re-export commonly used types/functions for convenience
pub use config_dirs::{project_config_dir, user_settings_path, SETTINGS_FILE_NAME};
pub use read_settings::{
    load_settings, load_user_settings, normalize_extensions, ClassifierSettings, SettingsError,
    DEFAULT_ARCHIVE_EXTENSIONS, DEFAULT_SAMPLE_SIZE, DEFAULT_VIDEO_EXTENSIONS,
};
