use std::env;
use std::path::PathBuf;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.pollinations.ai";
pub const DEFAULT_TEXT_BASE_URL: &str = "https://text.pollinations.ai";
pub const DEFAULT_USER_AGENT: &str = "AI-ArtGen/1.0";
pub const DEFAULT_TOKEN_ENV: &str = "POLLINATIONS_API_TOKEN";
pub const DEFAULT_GALLERY_KEY: &str = "generatedImages";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct PollinationsConfig {
    pub image_base_url: String,
    pub text_base_url: String,
    pub user_agent: String,
    /// Environment variable consulted for the bearer token on every request.
    pub token_env: String,
    /// Explicit token; takes precedence over `token_env` when set.
    pub api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: Option<PathBuf>,
    pub gallery_key: String,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub pollinations: PollinationsConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        PollinationsConfig {
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            text_base_url: DEFAULT_TEXT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            api_token: None,
        }
    }
}

impl PollinationsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let image_base_url =
            env::var("POLLINATIONS_IMAGE_URL").unwrap_or(defaults.image_base_url);
        let text_base_url = env::var("POLLINATIONS_TEXT_URL").unwrap_or(defaults.text_base_url);

        PollinationsConfig {
            image_base_url,
            text_base_url,
            ..defaults
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_token_env(mut self, name: impl Into<String>) -> Self {
        self.token_env = name.into();
        self
    }

    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    pub fn with_text_base_url(mut self, url: impl Into<String>) -> Self {
        self.text_base_url = url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Looks the token up at call time, so rotating the environment
    /// variable takes effect without a restart.
    pub fn resolve_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| env::var(&self.token_env).ok())
            .filter(|token| !token.trim().is_empty())
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.image_base_url.trim_end_matches('/'))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = env::var("ARTGEN_HOST").unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(defaults.port);

        ServerConfig { host, port }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            data_dir: None,
            gallery_key: DEFAULT_GALLERY_KEY.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        StoreConfig {
            data_dir: env::var("ARTGEN_DATA_DIR").ok().map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Explicit directory, falling back to the platform data directory.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("artgen")))
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            pollinations: PollinationsConfig::from_env(),
            server: ServerConfig::from_env(),
            store: StoreConfig::from_env(),
        }
    }

    pub fn with_pollinations(mut self, config: PollinationsConfig) -> Self {
        self.pollinations = config;
        self
    }

    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    pub fn with_store(mut self, config: StoreConfig) -> Self {
        self.store = config;
        self
    }
}
