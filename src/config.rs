//! Configuration to acknowledge operator preferences as well as set defaults.
//!
//! Specifically, we try to find a sitetree.toml, and if present we load
//! settings from there. This provides the backend address and the set of
//! endpoints the wizard must never offer to delete.

use facet::Facet;
use std::fs;

#[derive(Facet, Clone)]
/// Operator preferences loaded from sitetree.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "http://127.0.0.1:5000".to_string())]
    /// Backend base URL (scheme + host).
    pub server_url: String,
    #[facet(default = vec![
        "appeals".to_string(),
        "anti-corruption".to_string(),
        "nutrition".to_string(),
        "food".to_string(),
        "nutrition-dishes-archive".to_string(),
    ])]
    /// Endpoints that can never be deleted from the wizard, on top of steps
    /// the seed catalog flags static.
    pub protected_endpoints: Vec<String>,
    #[facet(default = "sitetree.log".to_string())]
    /// Log file path; the terminal itself belongs to the TUI.
    pub log_file: String,
}

impl Config {
    #[must_use]
    /// Load configuration from sitetree.toml if present.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be parsed.
    pub fn load() -> Self {
        if let Ok(contents) = fs::read_to_string("sitetree.toml") {
            if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                return config;
            }
        }
        facet_toml::from_str::<Self>("").unwrap()
    }
}
