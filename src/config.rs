// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Minimum score (percent, inclusive) an exam needs to pass.
/// Shared by scoring and the statistics report.
pub const PASSING_SCORE_PERCENTAGE: f64 = 61.0;

/// Number of questions drawn when a start request does not ask for a count.
pub const DEFAULT_EXAM_QUESTION_COUNT: i64 = 80;

/// Exam duration (3h) used when a start request does not specify one.
pub const DEFAULT_EXAM_DURATION_SECONDS: i64 = 3 * 60 * 60;

pub const DEFAULT_SEED_FILE: &str = "data/questions.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. When absent the in-memory store is used.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub listen_addr: String,
    pub log_dir: String,
    pub seed_file: String,
    pub passing_score: f64,
    pub default_question_count: i64,
    pub default_duration_seconds: i64,
    pub cors_origins: Vec<String>,
    /// Marks the identity cookie `Secure; SameSite=None` for cross-site HTTPS deployments.
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let seed_file = env::var("SEED_FILE").unwrap_or_else(|_| DEFAULT_SEED_FILE.to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| default_origins());

        Self {
            database_url,
            rust_log,
            listen_addr,
            log_dir,
            seed_file,
            passing_score: parse_or("PASSING_SCORE", PASSING_SCORE_PERCENTAGE),
            default_question_count: parse_or("DEFAULT_QUESTION_COUNT", DEFAULT_EXAM_QUESTION_COUNT),
            default_duration_seconds: parse_or(
                "DEFAULT_DURATION_SECONDS",
                DEFAULT_EXAM_DURATION_SECONDS,
            ),
            cors_origins,
            secure_cookies: parse_or("SECURE_COOKIES", false),
        }
    }
}

impl Default for Config {
    /// In-memory configuration with the built-in exam defaults. Used by tests.
    fn default() -> Self {
        Self {
            database_url: None,
            rust_log: "info".to_string(),
            listen_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            seed_file: DEFAULT_SEED_FILE.to_string(),
            passing_score: PASSING_SCORE_PERCENTAGE,
            default_question_count: DEFAULT_EXAM_QUESTION_COUNT,
            default_duration_seconds: DEFAULT_EXAM_DURATION_SECONDS,
            cors_origins: default_origins(),
            secure_cookies: false,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}
