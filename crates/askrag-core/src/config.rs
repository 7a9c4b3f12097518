//! Layered configuration loader and the explicit engine configuration.
//!
//! Figment merges `config.toml` + `config.<env>.toml` + `APP_*` env vars;
//! `RagConfig` is the explicit per-instance view the engine constructor
//! takes, so tests never depend on process-wide settings.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }
}

/// Tunables of the personal RAG engine. Defaults mirror the fixed
/// production constants; every field is overridable per instance.
///
/// Upload-side constraints (extensions `.pdf`/`.txt`/`.docx`, 10 MiB max)
/// are enforced by the caller before a file reaches the engine; the engine
/// re-checks only that the file exists.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Root under which every user gets a `user_<id>` store directory.
    pub vector_root: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retriever_k: usize,
    pub retriever_fetch_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            vector_root: PathBuf::from("data/vector_store"),
            chunk_size: 2500,
            chunk_overlap: 400,
            retriever_k: 5,
            retriever_fetch_k: 10,
        }
    }
}

impl RagConfig {
    /// Build from layered configuration, falling back to defaults per key.
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            vector_root: config
                .get::<String>("rag.vector_root")
                .map(expand_path)
                .unwrap_or(defaults.vector_root),
            chunk_size: config.get("rag.chunk_size").unwrap_or(defaults.chunk_size),
            chunk_overlap: config
                .get("rag.chunk_overlap")
                .unwrap_or(defaults.chunk_overlap),
            retriever_k: config
                .get("rag.retriever_k")
                .unwrap_or(defaults.retriever_k),
            retriever_fetch_k: config
                .get("rag.retriever_fetch_k")
                .unwrap_or(defaults.retriever_fetch_k),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. Absolute paths are returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
