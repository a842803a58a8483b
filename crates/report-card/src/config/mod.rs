use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::grading::{GradingEngine, RemarkTemplates, DEFAULT_CORE_SUBJECTS};

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
    pub grading: GradingConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            grading: GradingConfig::from_env()?,
        })
    }
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

/// School-wide grading settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingConfig {
    /// Subject codes whose points make up a division aggregate.
    pub core_subjects: Vec<String>,
    /// Name interpolated into head teacher remarks when a batch does not carry one.
    pub school_name: Option<String>,
    /// Optional JSON document overriding individual remark templates.
    pub remark_templates_path: Option<PathBuf>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            core_subjects: DEFAULT_CORE_SUBJECTS
                .iter()
                .map(|code| code.to_string())
                .collect(),
            school_name: None,
            remark_templates_path: None,
        }
    }
}

impl GradingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let core_subjects = match env::var("APP_CORE_SUBJECTS") {
            Ok(raw) => parse_core_subjects(&raw)?,
            Err(_) => Self::default().core_subjects,
        };

        let school_name = env::var("APP_SCHOOL_NAME")
            .ok()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let remark_templates_path = env::var("REMARK_TEMPLATES_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            core_subjects,
            school_name,
            remark_templates_path,
        })
    }

    /// Builds the grading engine, reading template overrides from disk when configured.
    pub fn engine(&self) -> Result<GradingEngine, ConfigError> {
        let templates = match &self.remark_templates_path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| {
                    ConfigError::TemplateFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                RemarkTemplates::from_json_str(&raw).map_err(|source| {
                    ConfigError::TemplateFormat {
                        path: path.clone(),
                        source,
                    }
                })?
            }
            None => RemarkTemplates::default(),
        };

        Ok(GradingEngine::new(self.core_subjects.clone(), templates))
    }
}

fn parse_core_subjects(raw: &str) -> Result<Vec<String>, ConfigError> {
    let codes: Vec<String> = raw
        .split(',')
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty())
        .collect();

    if codes.is_empty() {
        return Err(ConfigError::EmptyCoreSubjects);
    }
    Ok(codes)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    EmptyCoreSubjects,
    TemplateFile {
        path: PathBuf,
        source: std::io::Error,
    },
    TemplateFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::EmptyCoreSubjects => {
                write!(f, "APP_CORE_SUBJECTS must list at least one subject code")
            }
            ConfigError::TemplateFile { path, .. } => {
                write!(f, "unable to read remark templates at {}", path.display())
            }
            ConfigError::TemplateFormat { path, .. } => {
                write!(f, "remark templates at {} are not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::EmptyCoreSubjects => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::TemplateFile { source, .. } => Some(source),
            ConfigError::TemplateFormat { source, .. } => Some(source),
        }
    }
}
