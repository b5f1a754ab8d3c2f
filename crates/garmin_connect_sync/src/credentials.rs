//! Account credentials from command line flags, the environment or a prompt.

use crate::error::SyncResult;
use garmin_connect_client::config::Config;

const USERNAME_VAR: &str = "GARMIN_CONNECT_USERNAME";
const PASSWORD_VAR: &str = "GARMIN_CONNECT_PASSWORD";

/// Build the client configuration.
///
/// Flags win over environment variables. When no password is given either
/// way, `prompt` is asked for one; it is not called without a username.
pub fn resolve_config<F, P>(
    username: Option<String>,
    password: Option<String>,
    mut get: F,
    prompt: P,
) -> SyncResult<Config>
where
    F: FnMut(&str) -> Option<String>,
    P: FnOnce(&str) -> std::io::Result<String>,
{
    let username = username.or_else(|| get(USERNAME_VAR));
    let password = match password.or_else(|| get(PASSWORD_VAR)) {
        Some(password) => Some(password),
        None => match &username {
            Some(user) => Some(prompt(&format!("Enter password for {user}: "))?),
            None => None,
        },
    };

    let config = Config::from_env_with(|k| match k {
        USERNAME_VAR => username.clone(),
        PASSWORD_VAR => password.clone(),
        _ => get(k),
    })?;
    Ok(config)
}
