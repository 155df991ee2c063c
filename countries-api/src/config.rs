//! Command line and environment configuration

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "countries-api")]
#[command(version, about = "Read-only REST API over a countries table")]
pub struct Config {
    /// sqlx connection URL of the SQLite database
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./data/world.db?mode=rwc")]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "COUNTRIES_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "COUNTRIES_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Insert sample countries when the table is empty
    #[arg(long)]
    pub seed: bool,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments() {
        let config = Config::parse_from([
            "countries-api",
            "--database-url",
            "sqlite::memory:",
            "--port",
            "8080",
            "--seed",
        ]);

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert!(config.seed);
    }
}
