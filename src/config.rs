use std::env;

use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub llm: Option<LlmConfig>,
    pub imagekit: ImageKitConfig,
}

/// Hosted language-model credentials. Absent config disables the remote
/// search pass; the composer then serves local matches only.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub model: String,
}

/// Image CDN signing credentials. The private key never leaves the server;
/// clients only ever see signed short-lived upload parameters.
#[derive(Debug, Clone)]
pub struct ImageKitConfig {
    pub public_key: String,
    pub private_key: SecretString,
    pub url_endpoint: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let llm = match env::var("LLM_API_KEY") {
            Ok(key) if !key.is_empty() => Some(LlmConfig {
                api_key: key.into(),
                model: env::var("LLM_MODEL")
                    .unwrap_or_else(|_| "claude-3-5-haiku-latest".to_string()),
            }),
            _ => None,
        };

        let imagekit = ImageKitConfig {
            public_key: env::var("IMAGEKIT_PUBLIC_KEY")?,
            private_key: env::var("IMAGEKIT_PRIVATE_KEY")?.into(),
            url_endpoint: env::var("IMAGEKIT_URL_ENDPOINT")?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            llm,
            imagekit,
        })
    }
}
