use crate::workflows::road_health::policy::{
    InspectionPolicy, PolicyError, ScoringPolicy, DEFAULT_CYCLE_DAYS, DEFAULT_DUE_SOON_DAYS,
    DEFAULT_RECENT_DAYS, DEFAULT_REFERENCE_YEAR,
};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub datasets: DatasetConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let datasets = DatasetConfig {
            registry_path: env::var("ROAD_REGISTRY_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/road_registry.csv")),
            inspections_path: env::var("ROAD_INSPECTIONS_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/road_inspections.csv")),
        };

        let reference_year = read_number("SCORING_REFERENCE_YEAR", DEFAULT_REFERENCE_YEAR)?;
        let inspection = InspectionPolicy {
            recent_window_days: read_number("INSPECTION_RECENT_DAYS", DEFAULT_RECENT_DAYS)?,
            cycle_days: read_number("INSPECTION_CYCLE_DAYS", DEFAULT_CYCLE_DAYS)?,
            due_soon_window_days: read_number("INSPECTION_DUE_SOON_DAYS", DEFAULT_DUE_SOON_DAYS)?,
            category_cycle_days: match env::var("INSPECTION_CYCLE_OVERRIDES") {
                Ok(raw) => parse_cycle_overrides(&raw)?,
                Err(_) => BTreeMap::new(),
            },
        };
        inspection.validate().map_err(ConfigError::Policy)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            datasets,
            engine: EngineConfig {
                scoring: ScoringPolicy { reference_year },
                inspection,
            },
        })
    }
}

fn read_number<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        _ => Ok(default),
    }
}

/// Parses `Category=days` pairs separated by commas. Category names are
/// matched case-insensitively, so they are stored lowercased.
pub fn parse_cycle_overrides(raw: &str) -> Result<BTreeMap<String, i64>, ConfigError> {
    let mut overrides = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (category, days) = pair
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidCycleOverride(pair.to_string()))?;
        let category = category.trim();
        let days = days
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidCycleOverride(pair.to_string()))?;
        if category.is_empty() {
            return Err(ConfigError::InvalidCycleOverride(pair.to_string()));
        }
        overrides.insert(category.to_ascii_lowercase(), days);
    }
    Ok(overrides)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Locations of the two source tables.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub registry_path: PathBuf,
    pub inspections_path: PathBuf,
}

/// Scoring and inspection-cycle constants shared by every report.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub scoring: ScoringPolicy,
    pub inspection: InspectionPolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidCycleOverride(String),
    Policy(PolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a whole number (got '{value}')")
            }
            ConfigError::InvalidCycleOverride(pair) => write!(
                f,
                "INSPECTION_CYCLE_OVERRIDES entry '{pair}' must look like Category=days"
            ),
            ConfigError::Policy(err) => write!(f, "invalid inspection policy: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Policy(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidCycleOverride(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ROAD_REGISTRY_CSV",
            "ROAD_INSPECTIONS_CSV",
            "SCORING_REFERENCE_YEAR",
            "INSPECTION_RECENT_DAYS",
            "INSPECTION_CYCLE_DAYS",
            "INSPECTION_DUE_SOON_DAYS",
            "INSPECTION_CYCLE_OVERRIDES",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.datasets.registry_path,
            PathBuf::from("data/road_registry.csv")
        );
        assert_eq!(config.engine.scoring.reference_year, DEFAULT_REFERENCE_YEAR);
        assert_eq!(config.engine.inspection.cycle_days, DEFAULT_CYCLE_DAYS);
        assert!(config.engine.inspection.category_cycle_days.is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_inspection_windows_and_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INSPECTION_CYCLE_DAYS", "200");
        env::set_var("INSPECTION_CYCLE_OVERRIDES", "National=180, Urban = 150");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.engine.inspection.cycle_days, 200);
        assert_eq!(
            config.engine.inspection.category_cycle_days.get("national"),
            Some(&180)
        );
        assert_eq!(config.engine.inspection.cycle_for("Urban"), 150);
        assert_eq!(config.engine.inspection.cycle_for("State"), 200);
        reset_env();
    }

    #[test]
    fn rejects_malformed_numbers_and_overlapping_windows() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_REFERENCE_YEAR", "next year");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "SCORING_REFERENCE_YEAR",
                ..
            })
        ));

        reset_env();
        env::set_var("INSPECTION_RECENT_DAYS", "350");
        assert!(matches!(AppConfig::load(), Err(ConfigError::Policy(_))));

        reset_env();
        env::set_var("INSPECTION_CYCLE_OVERRIDES", "National");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidCycleOverride(_))
        ));
        reset_env();
    }
}
