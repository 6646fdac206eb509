use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::auth::session::DEFAULT_MAX_SESSIONS;

#[derive(Parser, Debug)]
#[command(name = "spareparts", about = "Spare parts catalog server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Insert the admin user and sample spares when the catalog is empty
    #[arg(long)]
    pub seed: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub oauth: OAuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
    /// Email of the account allowed to edit and delete every record.
    pub admin_email: String,
    /// Live sessions kept in memory before the oldest is evicted.
    pub max_sessions: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct OAuthConfig {
    /// Google-style `client_secret.json`; its `web` section fills the client fields.
    pub client_secrets: Option<PathBuf>,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub tokeninfo_url: String,
    pub userinfo_url: String,
    pub revoke_url: String,
    pub redirect_uri: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "spareparts_session".to_string(),
            session_hours: 24,
            admin_email: "admin@spareparts.local".to_string(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_secrets: None,
            client_id: String::new(),
            client_secret: String::new(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            tokeninfo_url: "https://www.googleapis.com/oauth2/v1/tokeninfo".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v1/userinfo".to_string(),
            revoke_url: "https://accounts.google.com/o/oauth2/revoke".to_string(),
            redirect_uri: "postmessage".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    web: ClientSecretsWeb,
}

#[derive(Deserialize)]
struct ClientSecretsWeb {
    client_id: String,
    #[serde(default)]
    client_secret: String,
    token_uri: Option<String>,
}

impl OAuthConfig {
    /// Overlay the client id, secret and token endpoint from a downloaded
    /// `client_secret.json`.
    pub fn apply_client_secrets(&mut self, path: &Path) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(path)?;
        let secrets: ClientSecretsFile = serde_json::from_str(&content)?;
        self.client_id = secrets.web.client_id;
        self.client_secret = secrets.web.client_secret;
        if let Some(token_uri) = secrets.web.token_uri {
            self.token_url = token_uri;
        }
        Ok(())
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        if let Some(secrets) = config.oauth.client_secrets.clone() {
            let secrets = if secrets.is_relative() {
                data_dir.join(secrets)
            } else {
                secrets
            };
            config.oauth.apply_client_secrets(&secrets)?;
        }

        if config.oauth.client_id.is_empty() {
            tracing::warn!("No OAuth client id configured; Google sign-in will be rejected");
        }

        // Resolve paths relative to data dir
        if config.database.path.is_none() {
            config.database.path = Some(data_dir.join("spareparts.db"));
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".spareparts")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("spareparts.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(data_dir: Option<PathBuf>) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir,
            seed: false,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.cookie_name, "spareparts_session");
        assert_eq!(config.auth.session_hours, 24);
        assert_eq!(config.auth.max_sessions, 10_000);
        assert_eq!(config.oauth.redirect_uri, "postmessage");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli(Some(PathBuf::from("/tmp/test-spareparts")));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-spareparts"));
    }

    #[test]
    fn data_dir_defaults_to_dot_spareparts() {
        let dir = Config::data_dir(&cli(None));
        assert!(dir.ends_with(".spareparts"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.db_path(), tmp.path().join("spareparts.db"));
    }

    #[test]
    fn load_applies_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cli = cli(Some(tmp.path().to_path_buf()));
        cli.host = Some("127.0.0.1".to_string());
        cli.port = Some(8080);
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
port = 9000

[auth]
admin_email = "boss@example.com"
session_hours = 2

[oauth]
client_id = "abc.apps.googleusercontent.com"
"#,
        )
        .unwrap();

        let mut cli = cli(Some(tmp.path().to_path_buf()));
        cli.config = Some(config_path);
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.admin_email, "boss@example.com");
        assert_eq!(config.auth.session_hours, 2);
        assert_eq!(config.oauth.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(
            config.oauth.tokeninfo_url,
            "https://www.googleapis.com/oauth2/v1/tokeninfo"
        );
    }

    #[test]
    fn client_secrets_file_fills_oauth_client() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("client_secret.json"),
            r#"{"web": {"client_id": "id-123", "client_secret": "s3cret",
                "token_uri": "https://example.test/token"}}"#,
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[oauth]\nclient_secrets = \"client_secret.json\"\n",
        )
        .unwrap();

        let config = Config::load(&cli(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.oauth.client_id, "id-123");
        assert_eq!(config.oauth.client_secret, "s3cret");
        assert_eq!(config.oauth.token_url, "https://example.test/token");
    }

    #[test]
    fn missing_client_secrets_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("config.toml"),
            "[oauth]\nclient_secrets = \"nope.json\"\n",
        )
        .unwrap();
        assert!(Config::load(&cli(Some(tmp.path().to_path_buf()))).is_err());
    }
}
