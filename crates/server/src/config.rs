use clap::Parser;
use clap::ValueEnum;

/// Signing secret used when none is configured outside production.
const DEVELOPMENT_SECRET: &str = "househunt-development-secret-do-not-use-in-production";

/// Deployment mode. Production demands a real secret and secure cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Development,
    Production,
}

/// Server configuration. Every flag can also be set from the environment.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Household housing tracker", long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind: String,
    /// PostgreSQL connection string.
    #[arg(long, env = "DB_URL")]
    pub db_url: String,
    /// Session token signing secret.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,
    #[arg(long, env = "HOUSING_ENV", value_enum, default_value = "development")]
    pub mode: Mode,
    /// Directory holding uploaded photos.
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: String,
    /// Public path the upload directory is served under.
    #[arg(long, env = "UPLOAD_URL", default_value = "/uploads")]
    pub upload_url: String,
    /// Nominatim-compatible geocoding search endpoint.
    #[arg(
        long,
        env = "GEOCODER_URL",
        default_value = "https://nominatim.openstreetmap.org/search"
    )]
    pub geocoder_url: String,
    /// Administrator created at startup when no accounts exist.
    #[arg(long, env = "ADMIN_USERNAME")]
    pub admin_username: Option<String>,
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,
}

impl Config {
    pub fn production(&self) -> bool {
        self.mode == Mode::Production
    }

    /// Signing secret, resolved once at startup.
    /// Production refuses to start without one; development falls back to
    /// the embedded secret with a warning.
    pub fn secret(&self) -> anyhow::Result<Vec<u8>> {
        match (self.jwt_secret.as_deref().filter(|s| !s.is_empty()), self.mode) {
            (Some(secret), _) => Ok(secret.as_bytes().to_vec()),
            (None, Mode::Production) => {
                anyhow::bail!("JWT_SECRET must be set when HOUSING_ENV=production")
            }
            (None, Mode::Development) => {
                log::warn!("JWT_SECRET not set, using the development secret");
                Ok(DEVELOPMENT_SECRET.as_bytes().to_vec())
            }
        }
    }

    /// Bootstrap administrator credentials, when both are configured.
    pub fn admin(&self) -> Option<(&str, &str)> {
        self.admin_username
            .as_deref()
            .zip(self.admin_password.as_deref())
            .filter(|(u, p)| !u.trim().is_empty() && !p.is_empty())
    }
}
