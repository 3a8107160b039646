use dotenv::dotenv;
use serde::Deserialize;
use std::{env, fs};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_evaluation_timeout_secs")]
    pub evaluation_timeout_secs: u64,
    #[serde(default = "default_audit_best_effort_timeout_secs")]
    pub audit_best_effort_timeout_secs: u64,
}

fn default_server_port() -> u16 {
    5300
}

fn default_evaluation_timeout_secs() -> u64 {
    5
}

fn default_audit_best_effort_timeout_secs() -> u64 {
    1
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        resolve_database_url_from_env();
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP"));

        if let Ok(env) = env::var("RUN_MODE") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        let config = builder.build()?;

        config.try_deserialize()
    }
}

fn resolve_database_url_from_env() {
    if env::var("APP_DATABASE_URL").is_ok() {
        return;
    }

    if let Ok(database_url) = env::var("DATABASE_URL") {
        env::set_var("APP_DATABASE_URL", database_url);
        return;
    }

    let password = env::var("DB_PASSWORD_FILE")
        .ok()
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|value| value.trim().to_string());

    if let Some(password) = password {
        let host = env::var("DB_HOST").unwrap_or_else(|_| "db".to_string());
        let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let user = env::var("DB_USER").unwrap_or_else(|_| "app".to_string());
        let name = env::var("DB_NAME").unwrap_or_else(|_| "app_db".to_string());
        let url = format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            user, password, host, port, name
        );
        env::set_var("APP_DATABASE_URL", url);
    }
}

pub fn init() {
    dotenv().ok();
}
