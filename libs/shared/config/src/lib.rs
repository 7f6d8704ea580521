use std::env;
use tracing::warn;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub auth_jwt_secret: String,
    pub webhook_signing_secret: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub port: u16,
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

fn with_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using default", name);
        default.to_string()
    })
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("PORT is not a valid port number ({}), using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let config = Self {
            supabase_url: required("SUPABASE_URL"),
            supabase_anon_key: required("SUPABASE_ANON_PUBLIC_KEY"),
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY"),
            auth_jwt_secret: required("AUTH_JWT_SECRET"),
            webhook_signing_secret: required("WEBHOOK_SIGNING_SECRET"),
            gemini_api_key: required("GEMINI_API_KEY"),
            gemini_base_url: with_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            gemini_model: with_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            port,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }
        if !config.is_chat_configured() {
            warn!("Chat assistant disabled until GEMINI_API_KEY is set");
        }
        if !config.is_webhook_configured() {
            warn!("User-sync webhook will reject every delivery until WEBHOOK_SIGNING_SECRET is set");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_role_key.is_empty()
            && !self.auth_jwt_secret.is_empty()
    }

    pub fn is_chat_configured(&self) -> bool {
        !self.gemini_api_key.is_empty() && !self.gemini_base_url.is_empty()
    }

    pub fn is_webhook_configured(&self) -> bool {
        self.webhook_signing_secret.starts_with("whsec_")
    }
}
