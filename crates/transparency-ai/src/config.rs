use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use transparency_common::llm::LlmClientConfig;

use crate::error::AppError;

const DEFAULT_PORT: u16 = 8000;

/// Process-wide configuration, read once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to listen on.
    pub bind_addr: IpAddr,
    /// Listening port.
    pub port: u16,
    /// Model settings. `None` disables every AI feature.
    pub llm: Option<LlmClientConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `PORT`: listening port (default 8000)
    /// - `BIND_ADDR`: listening interface (default 0.0.0.0)
    /// - `GEMINI_API_KEY`: model credential; omit to run in static-only mode
    /// - `GEMINI_BASE_URL`, `GEMINI_MODEL`, `GEMINI_TIMEOUT_SECS`,
    ///   `GEMINI_MAX_ERROR_BODY_BYTES`: model client tuning
    pub fn from_env() -> Result<Self, AppError> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let bind_addr = parse_bind_addr(std::env::var("BIND_ADDR").ok().as_deref())?;

        Ok(Self {
            bind_addr,
            port,
            llm: LlmClientConfig::from_env(),
        })
    }

    pub fn ai_enabled(&self) -> bool {
        self.llm.is_some()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(DEFAULT_PORT),
        Some(s) => s
            .parse::<u16>()
            .map_err(|_| AppError::Config(format!("PORT must be a valid port number, got {s:?}"))),
    }
}

fn parse_bind_addr(raw: Option<&str>) -> Result<IpAddr, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        Some(s) => s
            .parse::<IpAddr>()
            .map_err(|_| AppError::Config(format!("BIND_ADDR must be an IP address, got {s:?}"))),
    }
}
