use crate::config::Settings;

/// Load settings, falling back to defaults when the config cannot be read
/// or fails validation. The second value explains a fallback.
///
/// Logging is configured from these settings, so the warning is handed
/// back to the caller instead of being logged here.
pub fn load_settings() -> (Settings, Option<String>) {
    let loaded = Settings::load()
        .map_err(|e| format!("failed to load config, using defaults: {e}"))
        .and_then(|s| match s.validate() {
            Ok(()) => Ok(s),
            Err(msg) => Err(format!("invalid config, using defaults: {msg}")),
        });

    match loaded {
        Ok(s) => (s, None),
        Err(warning) => (Settings::default(), Some(warning)),
    }
}
