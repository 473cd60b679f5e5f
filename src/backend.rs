use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STATIC_ROOT: &str = "dist";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
enum LogLevel {
    Debug,
    Info,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
        }
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("debug") => Self::Debug,
            Some("info") => Self::Info,
            _ => DEFAULT_LOG_LEVEL,
        }
    }
}

struct ServerConfig {
    port: u16,
    static_root: PathBuf,
    log_level: LogLevel,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            port: parse_port(std::env::var("PORT").ok().as_deref()),
            static_root: parse_static_root(std::env::var("STATIC_ROOT").ok().as_deref()),
            log_level: LogLevel::parse(std::env::var("LOG_LEVEL").ok().as_deref()),
        }
    }
}

fn parse_port(value: Option<&str>) -> u16 {
    value
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_PORT)
}

fn parse_static_root(value: Option<&str>) -> PathBuf {
    match value.map(str::trim) {
        Some(raw) if !raw.is_empty() => PathBuf::from(raw),
        _ => PathBuf::from(DEFAULT_STATIC_ROOT),
    }
}

fn log_event(config: &ServerConfig, level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < config.log_level {
        return;
    }

    let mut line = json!({
        "ts": now_unix_seconds(),
        "level": level.as_str(),
        "event": event,
    });
    if let (Some(line_map), serde_json::Value::Object(extra)) = (line.as_object_mut(), fields) {
        line_map.extend(extra);
    }

    println!("{line}");
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn static_router(static_root: &Path) -> Router {
    let index = static_root.join("index.html");
    let service = ServeDir::new(static_root).not_found_service(ServeFile::new(index));

    Router::new().fallback_service(service)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();

    if !config.static_root.is_dir() {
        // trunk may not have produced the bundle yet; keep serving so a
        // later build shows up without a restart.
        log_event(
            &config,
            LogLevel::Debug,
            "static_root_missing",
            json!({ "static_root": config.static_root.display().to_string() }),
        );
    }

    let app = static_router(&config.static_root);
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    log_event(
        &config,
        LogLevel::Info,
        "server_started",
        json!({
            "port": config.port,
            "static_root": config.static_root.display().to_string(),
        }),
    );
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_parsing_falls_back_on_garbage() {
        assert_eq!(parse_port(None), DEFAULT_PORT);
        assert_eq!(parse_port(Some("not-a-port")), DEFAULT_PORT);
        assert_eq!(parse_port(Some("0")), DEFAULT_PORT);
        assert_eq!(parse_port(Some(" 3000 ")), 3000);
    }

    #[test]
    fn static_root_parsing_ignores_blank_values() {
        assert_eq!(parse_static_root(None), PathBuf::from(DEFAULT_STATIC_ROOT));
        assert_eq!(
            parse_static_root(Some("   ")),
            PathBuf::from(DEFAULT_STATIC_ROOT)
        );
        assert_eq!(parse_static_root(Some("public")), PathBuf::from("public"));
    }

    #[test]
    fn log_level_parsing_defaults_to_info() {
        assert_eq!(LogLevel::parse(Some("debug")), LogLevel::Debug);
        assert_eq!(LogLevel::parse(Some("info")), LogLevel::Info);
        assert_eq!(LogLevel::parse(Some("verbose")), LogLevel::Info);
        assert_eq!(LogLevel::parse(None), LogLevel::Info);
    }

    #[test]
    fn debug_ranks_below_info() {
        assert!(LogLevel::Debug < LogLevel::Info);
    }
}
