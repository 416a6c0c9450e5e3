use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_PATH: &str = "macro_log.csv";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub pdf_export: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = env::var("MACRO_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH));

        let pdf_export = env::var("MACRO_PDF_EXPORT")
            .map(|value| switch_enabled(&value))
            .unwrap_or(true);

        Self {
            port,
            data_path,
            pdf_export,
        }
    }
}

fn switch_enabled(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_switch_accepts_common_off_values() {
        for value in ["0", "false", "OFF", " no "] {
            assert!(!switch_enabled(value), "{value} should disable");
        }
        for value in ["1", "true", "on", ""] {
            assert!(switch_enabled(value), "{value} should enable");
        }
    }
}
