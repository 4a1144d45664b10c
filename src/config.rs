use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use tracing::Level;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        site_root: get_env_or_default("SITE_ROOT", "."),
        log_level: parse_level(&get_env_or_default("LOG_LEVEL", "INFO")),
    }
});

pub struct Config {
    /// Directory or http(s) URL the catalog paths are relative to.
    pub site_root: String,
    pub log_level: Level,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_level(raw: &str) -> Level {
    raw.trim().to_uppercase().parse::<Level>().unwrap_or(Level::INFO)
}

#[test]
fn test_parse_level() {
    assert_eq!(parse_level("debug"), Level::DEBUG);
    assert_eq!(parse_level(" WARN "), Level::WARN);
    assert_eq!(parse_level("nonsense"), Level::INFO);
}
