use crate::GarminError;
use secrecy::SecretString;

pub const DEFAULT_SSO_URL: &str = "https://sso.garmin.com/sso/login";
pub const DEFAULT_BASE_URL: &str = "https://connect.garmin.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub username: String,
    pub password: SecretString,
    /// Account identifier used in the wellness endpoint paths.
    pub display_name: String,
    pub sso_url: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, GarminError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, GarminError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let username = get("GARMIN_CONNECT_USERNAME")
            .ok_or_else(|| GarminError::Config("GARMIN_CONNECT_USERNAME missing".into()))?;
        let password = get("GARMIN_CONNECT_PASSWORD")
            .ok_or_else(|| GarminError::Config("GARMIN_CONNECT_PASSWORD missing".into()))?;
        let display_name =
            get("GARMIN_CONNECT_DISPLAY_NAME").unwrap_or_else(|| username.clone());
        let sso_url = get("GARMIN_CONNECT_SSO_URL").unwrap_or_else(|| DEFAULT_SSO_URL.into());
        let base_url = get("GARMIN_CONNECT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Ok(Self {
            username,
            password: SecretString::new(password.into()),
            display_name,
            sso_url,
            base_url,
        })
    }
}
