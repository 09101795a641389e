//! Process configuration: CLI flags layered over environment variables.

use std::net::SocketAddr;

use clap::Parser;

/// Runtime configuration for the backend process.
///
/// Every flag can also be supplied through the environment, which is how
/// deployments configure the service.
#[derive(Debug, Clone, Parser)]
#[command(name = "levelup-backend", version, about = "Game price comparison and review backend")]
pub struct AppConfig {
    /// Socket address to bind the HTTP server to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection URL. Without it the server runs on in-memory
    /// stores (development only).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Secret used to sign bearer tokens.
    #[arg(
        long,
        env = "JWT_SECRET",
        hide_env_values = true,
        default_value = "change-me-in-production"
    )]
    pub jwt_secret: String,

    /// Google OAuth client id for ID-token verification.
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Twitch application client id for IGDB.
    #[arg(long, env = "IGDB_CLIENT_ID")]
    pub igdb_client_id: Option<String>,

    /// Twitch application client secret for IGDB.
    #[arg(long, env = "IGDB_CLIENT_SECRET", hide_env_values = true)]
    pub igdb_client_secret: Option<String>,

    /// RAWG API key for genre enrichment.
    #[arg(long, env = "RAWG_API_KEY", hide_env_values = true)]
    pub rawg_api_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_flags() {
        let config = AppConfig::try_parse_from(["levelup-backend"]).expect("parses");
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn flags_override_defaults() {
        let config = AppConfig::try_parse_from([
            "levelup-backend",
            "--bind-addr",
            "127.0.0.1:9090",
            "--database-url",
            "postgres://localhost/levelup",
        ])
        .expect("parses");
        assert_eq!(config.bind_addr.port(), 9090);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/levelup")
        );
    }
}
