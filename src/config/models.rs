use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};

use crate::registry::FormatAliases;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub negotiation: NegotiationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Negotiation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NegotiationConfig {
    /// Accept header assumed when the client sends none
    #[serde(default = "default_accept")]
    pub default_accept: String,
    /// Charset advertised for character text
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Chunk size used when serving streamed bodies
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
    /// Extra generic format names, e.g. `yaml = ["application/yaml", "text/yaml"]`
    #[serde(default)]
    pub formats: BTreeMap<String, Vec<String>>,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            default_accept: default_accept(),
            charset: default_charset(),
            stream_chunk_size: default_stream_chunk_size(),
            formats: BTreeMap::new(),
        }
    }
}

impl NegotiationConfig {
    /// Built-in format aliases with the configured ones layered on top.
    pub fn format_aliases(&self) -> FormatAliases {
        let mut aliases = FormatAliases::default();
        for (name, media_types) in &self.formats {
            aliases.define(name.clone(), media_types.iter().cloned());
        }
        aliases
    }
}

fn default_accept() -> String {
    "*/*".to_string()
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

fn default_stream_chunk_size() -> usize {
    64 * 1024
}
