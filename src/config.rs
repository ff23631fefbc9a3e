use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use ipnet::IpNet;
use serde::Deserialize;

pub const DEFAULT_FIREBASE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_EMAILJS_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";
pub const DEFAULT_TO_EMAIL: &str = "info@ecoguardinitiativeuganda.org";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub cors_origins: Vec<String>,
    pub honeypot_field: Option<String>,
    /// Submissions per client per form type in one window.
    pub rate_limit: u32,
    /// Submissions per client across all form types in one window.
    pub client_rate_limit: u32,
    pub rate_limit_window_secs: u64,
    pub request_timeout: Option<Duration>,
    pub log_level: String,
    pub forms: FormsConfig,
}

/// Provider selection and credentials. Read-only once loaded.
///
/// Deserializes from the same shape a site config script would carry:
/// `{ "provider": "...", "googleSheets": {..}, "firebase": {..}, "emailjs": {..} }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormsConfig {
    pub provider: Option<String>,
    pub google_sheets: GoogleSheetsConfig,
    pub firebase: FirebaseConfig,
    pub emailjs: EmailJsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoogleSheetsConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub collection: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub to_email: Option<String>,
    pub endpoint: Option<String>,
}

impl FormsConfig {
    /// Provider tag with the google-sheets fallback applied.
    pub fn provider_tag(&self) -> &str {
        self.provider
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or("google-sheets")
    }

    /// Load from the process environment. See [`FormsConfig::from_vars`].
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from the JSON file named by `RELAY_FORMS_CONFIG`, or from the
    /// individual `RELAY_*` variables when it is unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        if let Some(path) = lookup("RELAY_FORMS_CONFIG").filter(|p| !p.is_empty()) {
            return Self::from_file(&path);
        }

        let opt = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(FormsConfig {
            provider: opt("RELAY_PROVIDER"),
            google_sheets: GoogleSheetsConfig {
                endpoint: or("RELAY_GOOGLE_SHEETS_ENDPOINT", ""),
            },
            firebase: FirebaseConfig {
                api_key: or("RELAY_FIREBASE_API_KEY", ""),
                project_id: or("RELAY_FIREBASE_PROJECT_ID", ""),
                collection: or("RELAY_FIREBASE_COLLECTION", "formSubmissions"),
                base_url: opt("RELAY_FIREBASE_BASE_URL"),
            },
            emailjs: EmailJsConfig {
                service_id: or("RELAY_EMAILJS_SERVICE_ID", ""),
                template_id: or("RELAY_EMAILJS_TEMPLATE_ID", ""),
                public_key: or("RELAY_EMAILJS_PUBLIC_KEY", ""),
                to_email: opt("RELAY_EMAILJS_TO_EMAIL"),
                endpoint: opt("RELAY_EMAILJS_ENDPOINT"),
            },
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read RELAY_FORMS_CONFIG '{}': {e}", path.display()))?;
        serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid RELAY_FORMS_CONFIG '{}': {e}", path.display()))
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("RELAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid RELAY_HOST: {e}"))?;

        let port: u16 = env_or("RELAY_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid RELAY_PORT: {e}"))?;

        let max_body_size: usize = env_or("RELAY_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid RELAY_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = split_list(&env_or("RELAY_TRUSTED_PROXIES", ""))
            .map(|s| {
                s.parse()
                    .map_err(|e| format!("Invalid RELAY_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cors_origins = split_list(&env_or("RELAY_CORS_ORIGINS", ""))
            .map(str::to_string)
            .collect();

        let rate_limit: u32 = env_or("RELAY_RATE_LIMIT", "10")
            .parse()
            .map_err(|e| format!("Invalid RELAY_RATE_LIMIT: {e}"))?;

        let client_rate_limit: u32 = env_or("RELAY_CLIENT_RATE_LIMIT", "30")
            .parse()
            .map_err(|e| format!("Invalid RELAY_CLIENT_RATE_LIMIT: {e}"))?;

        let rate_limit_window_secs: u64 = env_or("RELAY_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid RELAY_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        let timeout_secs: u64 = env_or("RELAY_REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid RELAY_REQUEST_TIMEOUT_SECS: {e}"))?;
        let request_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(Config {
            host,
            port,
            max_body_size,
            trusted_proxies,
            cors_origins,
            honeypot_field: env_opt("RELAY_HONEYPOT_FIELD"),
            rate_limit,
            client_rate_limit,
            rate_limit_window_secs,
            request_timeout,
            log_level: env_or("RELAY_LOG_LEVEL", "info"),
            forms: FormsConfig::from_env()?,
        })
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
