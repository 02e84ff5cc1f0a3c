use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding persisted sessions (path info only, no existence check)
    pub data_dir: PathBuf,

    /// Directory for rolling log files; empty disables file logging
    pub log_dir: PathBuf,

    /// Delay before a field mutation is persisted
    pub save_debounce_ms: Option<u64>,

    pub otp_code_length: Option<usize>,
    pub otp_ttl_secs: Option<i64>,
    pub otp_max_attempts: Option<u32>,
    pub otp_lockout_secs: Option<i64>,

    pub max_upload_bytes: Option<u64>,
    pub allowed_content_types: Vec<String>,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// This method must NOT contain any validation or default value logic.
    /// Empty strings and missing sections are valid "facts". An integer that
    /// does not fit its field type is an error; range policy lives in wiring.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section = |name: &str, key: &str| toml_value.get(name).and_then(|s| s.get(key));

        Ok(Self {
            data_dir: PathBuf::from(
                section("storage", "data_dir")
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            ),
            log_dir: PathBuf::from(
                section("logging", "log_dir")
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            ),
            save_debounce_ms: integer(toml_value, "onboarding", "save_debounce_ms")?,
            otp_code_length: integer(toml_value, "otp", "code_length")?,
            otp_ttl_secs: integer(toml_value, "otp", "ttl_secs")?,
            otp_max_attempts: integer(toml_value, "otp", "max_attempts")?,
            otp_lockout_secs: integer(toml_value, "otp", "lockout_secs")?,
            max_upload_bytes: integer(toml_value, "documents", "max_upload_bytes")?,
            allowed_content_types: section("documents", "allowed_content_types")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Integer at `[section] key`, rejected when it does not fit the field type.
fn integer<T: TryFrom<i64>>(
    toml_value: &toml::Value,
    section: &str,
    key: &str,
) -> anyhow::Result<Option<T>> {
    let Some(raw) = toml_value
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
    else {
        return Ok(None);
    };
    T::try_from(raw)
        .map(Some)
        .map_err(|_| anyhow::anyhow!("{section}.{key} = {raw} is out of range"))
}
