use std::path::PathBuf;

use crate::bootstrap::AdminSeed;
use crate::errors::AppError;
use crate::jwt::JwtConfig;

const DEFAULT_PORT: u16 = 8000;

/// Process-wide settings, read once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub admin: AdminSeed,
    pub tls: Option<TlsPaths>,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| AppError::configuration("DATABASE_URL not set"))?;

        Ok(Self {
            database_url,
            port: parse_port(std::env::var("APP_PORT").ok())?,
            jwt: JwtConfig::from_env()?,
            admin: AdminSeed::from_env(),
            tls: tls_paths(std::env::var("CERT_PATH").ok(), std::env::var("KEY_PATH").ok()),
        })
    }
}

fn parse_port(raw: Option<String>) -> Result<u16, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<u16>()
            .map_err(|_| AppError::configuration("APP_PORT must be a valid port number")),
        None => Ok(DEFAULT_PORT),
    }
}

/// TLS is on only when both halves of the key pair are configured.
fn tls_paths(cert: Option<String>, key: Option<String>) -> Option<TlsPaths> {
    match (cert, key) {
        (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => Some(TlsPaths {
            cert: cert.into(),
            key: key.into(),
        }),
        _ => None,
    }
}
