//! Delimited-text source configuration.
//!
//! Loaded from JSON (file or string) or from `ROWPIPE_*` environment
//! variables. Every field has a default, so partial configurations work.
//!
//! ```json
//! { "charset": "ISO-8859-1", "delimiter": ";", "containsHeaders": true }
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, SourceResult};
use crate::parser::{resolve_charset, CsvStreamSource, AUTO_CHARSET};

pub const ENV_CHARSET: &str = "ROWPIPE_CHARSET";
pub const ENV_DELIMITER: &str = "ROWPIPE_DELIMITER";
pub const ENV_HEADERS: &str = "ROWPIPE_HEADERS";
pub const ENV_EMIT_HEADER_ROW: &str = "ROWPIPE_EMIT_HEADER_ROW";

/// Settings of a [`CsvStreamSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvSourceConfig {
    /// IANA charset label, or `auto` to detect
    pub charset: String,

    /// Cell separator (one or more characters)
    pub delimiter: String,

    /// First non-empty line holds column names
    pub contains_headers: bool,

    /// Also produce the header line as a data row
    pub emit_header_row: bool,
}

impl Default for CsvSourceConfig {
    fn default() -> Self {
        Self {
            charset: "UTF-8".to_string(),
            delimiter: ",".to_string(),
            contains_headers: true,
            emit_header_row: false,
        }
    }
}

impl CsvSourceConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Defaults overridden by `ROWPIPE_*` environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `ROWPIPE_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();
        if let Some(charset) = lookup(ENV_CHARSET) {
            config.charset = charset;
        }
        if let Some(delimiter) = lookup(ENV_DELIMITER) {
            config.delimiter = delimiter;
        }
        if let Some(flag) = lookup(ENV_HEADERS) {
            config.contains_headers = parse_flag(ENV_HEADERS, &flag)?;
        }
        if let Some(flag) = lookup(ENV_EMIT_HEADER_ROW) {
            config.emit_header_row = parse_flag(ENV_EMIT_HEADER_ROW, &flag)?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        if !self.charset.trim().eq_ignore_ascii_case(AUTO_CHARSET) {
            resolve_charset(&self.charset)?;
        }
        Ok(())
    }

    /// Build a source reading `reader` with these settings.
    pub fn open<R: Read>(&self, reader: R) -> SourceResult<CsvStreamSource> {
        self.validate()?;
        let source = CsvStreamSource::new(reader, &self.delimiter, &self.charset, self.contains_headers)?;
        Ok(source.emit_header_row(self.emit_header_row))
    }
}

fn parse_flag(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CsvSourceConfig::default();
        assert_eq!(config.charset, "UTF-8");
        assert_eq!(config.delimiter, ",");
        assert!(config.contains_headers);
        assert!(!config.emit_header_row);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = CsvSourceConfig::from_json(r#"{"delimiter": ";", "containsHeaders": false}"#).unwrap();
        assert_eq!(config.delimiter, ";");
        assert!(!config.contains_headers);
        assert_eq!(config.charset, "UTF-8");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CsvSourceConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"charset": "ISO-8859-1", "emitHeaderRow": true}}"#).unwrap();

        let config = CsvSourceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.charset, "ISO-8859-1");
        assert!(config.emit_header_row);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvSourceConfig::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_CHARSET, "windows-1252"),
            (ENV_DELIMITER, "|"),
            (ENV_HEADERS, "no"),
        ]
        .into_iter()
        .collect();

        let config = CsvSourceConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.charset, "windows-1252");
        assert_eq!(config.delimiter, "|");
        assert!(!config.contains_headers);
    }

    #[test]
    fn test_bad_flag() {
        let result = CsvSourceConfig::from_lookup(|k| (k == ENV_HEADERS).then(|| "maybe".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_charset_and_empty_delimiter() {
        let config = CsvSourceConfig { charset: "klingon-8".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::UnknownCharset(_))));

        let config = CsvSourceConfig { delimiter: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDelimiter)));

        let config = CsvSourceConfig { charset: "auto".into(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_builds_source() {
        let config = CsvSourceConfig { delimiter: "|".into(), emit_header_row: true, ..Default::default() };
        let mut source = config.open("a|b\n1|2\n".as_bytes()).unwrap();
        let rows = source.query(None, &[]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get_column_by_name("b").unwrap().value().as_str(), Some("2"));
    }
}
