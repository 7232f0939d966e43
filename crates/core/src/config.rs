use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub content: ContentConfig,
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// Base URL of the content API, e.g. `https://squeak.posthog.cc`.
    pub url: Url,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetsConfig {
    /// Header banner, read from disk on every request.
    pub header_path: PathBuf,
    pub font: FontConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontConfig {
    pub url: Url,
    #[serde(default = "default_font_family")]
    pub family: String,
    /// The CDN rejects font requests without a matching origin and referer.
    pub origin: Option<String>,
    pub referer: Option<String>,
}

fn default_font_family() -> String { "Matter".to_string() }
