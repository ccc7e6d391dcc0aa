//! Extension pour intégrer la configuration Audiobookshelf dans pmoconfig
//!
//! Les valeurs peuvent aussi venir des variables historiques `ABS_URI`,
//! `ABS_LIBRARY_ID` et `ABS_TOKEN` (voir [`pmoconfig::Config::with_overrides`]).

use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::{Number, Value};
use std::time::Duration;

use crate::client::DEFAULT_REQUEST_TIMEOUT_SECS;

/// Trait d'extension pour gérer la configuration Audiobookshelf dans pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoabs::AbsConfigExt;
///
/// let config = pmoconfig::Config::load_config("")?;
/// println!("Audiobookshelf: {}", config.get_abs_url()?);
/// ```
pub trait AbsConfigExt {
    /// URL du serveur Audiobookshelf (sans `/` final)
    ///
    /// # Errors
    ///
    /// Retourne une erreur si l'URL n'est pas configurée
    fn get_abs_url(&self) -> Result<String>;

    fn set_abs_url(&self, url: &str) -> Result<()>;

    /// Identifiant de la bibliothèque exposée aux lecteurs
    fn get_abs_library_id(&self) -> Result<String>;

    fn set_abs_library_id(&self, library_id: &str) -> Result<()>;

    /// Jeton d'API Audiobookshelf
    fn get_abs_token(&self) -> Result<String>;

    fn set_abs_token(&self, token: &str) -> Result<()>;

    /// Délai maximal d'une requête (30 secondes par défaut)
    fn get_abs_timeout(&self) -> Duration;

    fn set_abs_timeout(&self, timeout: Duration) -> Result<()>;
}

impl AbsConfigExt for Config {
    fn get_abs_url(&self) -> Result<String> {
        self.get_string(&["audiobookshelf", "url"])
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| anyhow!("Audiobookshelf URL not configured (audiobookshelf.url or ABS_URI)"))
    }

    fn set_abs_url(&self, url: &str) -> Result<()> {
        self.set_value(&["audiobookshelf", "url"], Value::String(url.to_string()))
    }

    fn get_abs_library_id(&self) -> Result<String> {
        self.get_string(&["audiobookshelf", "library_id"]).ok_or_else(|| {
            anyhow!("Audiobookshelf library not configured (audiobookshelf.library_id or ABS_LIBRARY_ID)")
        })
    }

    fn set_abs_library_id(&self, library_id: &str) -> Result<()> {
        self.set_value(
            &["audiobookshelf", "library_id"],
            Value::String(library_id.to_string()),
        )
    }

    fn get_abs_token(&self) -> Result<String> {
        self.get_string(&["audiobookshelf", "token"])
            .ok_or_else(|| anyhow!("Audiobookshelf token not configured (audiobookshelf.token or ABS_TOKEN)"))
    }

    fn set_abs_token(&self, token: &str) -> Result<()> {
        self.set_value(&["audiobookshelf", "token"], Value::String(token.to_string()))
    }

    fn get_abs_timeout(&self) -> Duration {
        let secs = self
            .get_u64(&["audiobookshelf", "timeout_secs"])
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    fn set_abs_timeout(&self, timeout: Duration) -> Result<()> {
        self.set_value(
            &["audiobookshelf", "timeout_secs"],
            Value::Number(Number::from(timeout.as_secs())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_are_errors() {
        let config = Config::from_yaml_str("").unwrap();
        assert!(config.get_abs_url().is_err());
        assert!(config.get_abs_library_id().is_err());
        assert!(config.get_abs_token().is_err());
        assert_eq!(config.get_abs_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_settings_from_yaml_and_legacy_env() {
        let config = Config::from_yaml_str(
            "audiobookshelf:\n  url: http://abs.local:13378/\n  timeout_secs: 5\n",
        )
        .unwrap()
        .with_overrides(vec![
            ("ABS_LIBRARY_ID".to_string(), "lib_1".to_string()),
            ("ABS_TOKEN".to_string(), "tok".to_string()),
        ]);

        assert_eq!(config.get_abs_url().unwrap(), "http://abs.local:13378");
        assert_eq!(config.get_abs_library_id().unwrap(), "lib_1");
        assert_eq!(config.get_abs_token().unwrap(), "tok");
        assert_eq!(config.get_abs_timeout(), Duration::from_secs(5));
    }
}
