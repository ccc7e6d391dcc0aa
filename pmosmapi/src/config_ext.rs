//! Extension pour intégrer la configuration Sonos dans pmoconfig

use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::{Number, Value};
use std::path::PathBuf;

pub const DEFAULT_SOAP_ENDPOINT: &str = "/wsdl";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_REPORT_INTERVAL_MILLIS: u64 = 10_000;

/// Trait d'extension pour les paramètres du service SMAPI
///
/// # Exemple
///
/// ```rust,ignore
/// use pmosmapi::SonosConfigExt;
///
/// let config = pmoconfig::Config::load_config("")?;
/// println!("SOAP endpoint: {}", config.get_sonos_soap_endpoint());
/// ```
pub trait SonosConfigExt {
    /// Chemin HTTP du point d'entrée SOAP (`/wsdl` par défaut)
    fn get_sonos_soap_endpoint(&self) -> String;

    /// Fichier WSDL servi en GET sur le point d'entrée SOAP
    ///
    /// Un chemin relatif est d'abord cherché dans le répertoire de
    /// configuration.
    fn get_sonos_wsdl_file(&self) -> Option<PathBuf>;

    /// Taille de page utilisée quand le lecteur demande `count=0`
    fn get_sonos_page_size(&self) -> usize;

    fn set_sonos_page_size(&self, page_size: usize) -> Result<()>;

    /// Intervalle de rafraîchissement annoncé par `getLastUpdate` (secondes)
    fn get_sonos_poll_interval(&self) -> u64;

    /// Intervalle des rapports de lecture demandé au lecteur (millisecondes)
    fn get_sonos_report_interval_millis(&self) -> u64;
}

impl SonosConfigExt for Config {
    fn get_sonos_soap_endpoint(&self) -> String {
        match self.get_string(&["sonos", "soap_endpoint"]) {
            Some(path) => format!("/{}", path.trim_matches('/')),
            None => DEFAULT_SOAP_ENDPOINT.to_string(),
        }
    }

    fn get_sonos_wsdl_file(&self) -> Option<PathBuf> {
        let path = PathBuf::from(self.get_string(&["sonos", "wsdl_file"])?);
        if path.is_relative() {
            if let Some(candidate) = self.directory().map(|dir| dir.join(&path)) {
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }
        Some(path)
    }

    fn get_sonos_page_size(&self) -> usize {
        self.get_u64(&["sonos", "page_size"])
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn set_sonos_page_size(&self, page_size: usize) -> Result<()> {
        self.set_value(&["sonos", "page_size"], Value::Number(Number::from(page_size)))
    }

    fn get_sonos_poll_interval(&self) -> u64 {
        self.get_u64(&["sonos", "poll_interval"])
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
    }

    fn get_sonos_report_interval_millis(&self) -> u64 {
        self.get_u64(&["sonos", "report_interval_millis"])
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_REPORT_INTERVAL_MILLIS)
    }
}
