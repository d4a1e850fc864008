use crate::directory::Delegate;
use crate::i18n::Language;
use config::{Config, ConfigError, Environment, File}; // Use the config crate
use directories_next::ProjectDirs;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0/me/mailboxSettings";
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/MailboxSettings.ReadWrite";

// How the bearer credential for the mailbox settings call is obtained
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// OAuth2 installed-app flow in the system browser.
    Interactive,
    /// Token stored in the OS keyring.
    Keyring,
    /// Token given directly in config or `APP__AUTH__ACCESS_TOKEN`.
    Token,
    #[default]
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    #[serde(default)]
    pub client_id: String,
    // Use `secrecy::Secret` so the value never ends up in logs
    #[serde(default)]
    pub client_secret: Option<SecretString>,
    #[serde(default = "default_tenant")]
    pub tenant: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub access_token: Option<SecretString>,
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
    #[serde(default)]
    pub keyring_user: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            client_id: String::new(),
            client_secret: None,
            tenant: default_tenant(),
            scopes: default_scopes(),
            access_token: None,
            keyring_service: default_keyring_service(),
            keyring_user: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Unset means the call waits on the transport's own timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }
}

// The current user's profile, standing in for the mail host's identity API
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProfileConfig {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub job_title: Option<String>,
}

// Top-level application configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_company")]
    pub company: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Per-language template file overrides, keyed by language code.
    #[serde(default)]
    pub templates: HashMap<String, PathBuf>,
    /// Replaces the built-in colleague list when present.
    #[serde(default)]
    pub directory: Option<Vec<Delegate>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            company: default_company(),
            time_zone: default_time_zone(),
            graph: GraphConfig::default(),
            auth: AuthConfig::default(),
            profile: ProfileConfig::default(),
            templates: HashMap::new(),
            directory: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from files and environment variables.
    ///
    /// Reads configuration from, lowest precedence first:
    /// 1. `config.toml` in the working directory (optional)
    /// 2. `config.toml` in the platform config directory (optional)
    /// 3. Environment variables prefixed with `APP__` (e.g., `APP__AUTH__ACCESS_TOKEN`)
    pub fn load() -> Result<Self, ConfigError> {
        let user_file = project_dirs().map(|dirs| dirs.config_dir().join("config"));
        Self::load_layered(Path::new("config"), user_file.as_deref())
    }

    fn load_layered(working_file: &Path, user_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from(working_file.to_path_buf()).required(false));

        // Per-user settings win over a config.toml lying in the working directory
        if let Some(user_file) = user_file {
            builder = builder.add_source(File::from(user_file.to_path_buf()).required(false));
        }

        let config = builder
            // Note: `__` separates struct levels, e.g. APP__GRAPH__ENDPOINT
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn template_path(&self, language: Language) -> Option<&PathBuf> {
        self.templates.get(language.code())
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("tr.com", "Oztiryakiler", "auto-reply-composer")
}

fn default_company() -> String {
    "Öztiryakiler".to_string()
}

fn default_time_zone() -> String {
    "Turkey Standard Time".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_GRAPH_ENDPOINT.to_string()
}

fn default_tenant() -> String {
    "common".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![DEFAULT_SCOPE.to_string()]
}

fn default_keyring_service() -> String {
    "auto-reply-composer".to_string()
}
