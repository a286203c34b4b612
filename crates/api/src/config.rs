//! Runtime configuration from the environment.

/// Run mode; everything that is not explicitly development is production.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn is_development(self) -> bool {
        self == RunMode::Development
    }

    /// Parse an `APP_ENV` value. Unknown values fall back to production so a
    /// typo never accidentally enables development behavior.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => RunMode::Development,
            _ => RunMode::Production,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run_mode: RunMode,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let run_mode = RunMode::from_env_value(
            &std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
        );
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        Self {
            run_mode,
            bind_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_env_values_mean_production() {
        assert_eq!(RunMode::from_env_value("development"), RunMode::Development);
        assert_eq!(RunMode::from_env_value("Dev"), RunMode::Development);
        assert_eq!(RunMode::from_env_value("staging"), RunMode::Production);
        assert_eq!(RunMode::from_env_value(""), RunMode::Production);
    }
}
