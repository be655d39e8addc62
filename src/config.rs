//! Configuration Module
//!
//! Construction options for a cache instance, and the server configuration
//! loaded from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::{CacheError, Result};
use crate::persistence::PersistenceConfig;
use crate::transform::encryption::{self, EncryptionMaterial, IV_LEN, KEY_LEN};
use crate::transform::ValueKind;

// == Persistence Mode ==
/// Whether mutations wait for the persistence store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceMode {
    /// `set`/`unset` resolve after the store acknowledges
    #[default]
    WriteThrough,
    /// Store calls run on a spawned task; failures are only logged
    Background,
}

// == Vault Config ==
/// Options for building an [`LruVault`](crate::LruVault).
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Maximum resident entries (must be positive)
    pub capacity: usize,
    /// Enable the compression stage
    pub compress: bool,
    /// Enable the encryption stage
    pub encrypt: bool,
    /// Fixed AES key; random when unset
    pub key: Option<[u8; KEY_LEN]>,
    /// Fixed AES IV; random when unset
    pub init_vector: Option<[u8; IV_LEN]>,
    /// Pin the value classification instead of learning it from the first value
    pub value_kind: Option<ValueKind>,
    /// Mirror mutations to a persistence store
    pub write_through: bool,
    /// Store to mirror into; required when `write_through` is set
    pub persistence: Option<PersistenceConfig>,
    pub persistence_mode: PersistenceMode,
}

impl VaultConfig {
    /// Defaults: compression on, encryption off, no persistence.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            compress: true,
            encrypt: false,
            key: None,
            init_vector: None,
            value_kind: None,
            write_through: false,
            persistence: None,
            persistence_mode: PersistenceMode::default(),
        }
    }

    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    pub fn encrypt(mut self, enabled: bool) -> Self {
        self.encrypt = enabled;
        self
    }

    /// Enables encryption with fixed material.
    pub fn encryption_material(mut self, key: [u8; KEY_LEN], init_vector: [u8; IV_LEN]) -> Self {
        self.encrypt = true;
        self.key = Some(key);
        self.init_vector = Some(init_vector);
        self
    }

    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    /// Enables write-through into `persistence`.
    pub fn write_through(mut self, persistence: PersistenceConfig) -> Self {
        self.write_through = true;
        self.persistence = Some(persistence);
        self
    }

    pub fn persistence_mode(mut self, mode: PersistenceMode) -> Self {
        self.persistence_mode = mode;
        self
    }

    // == Validate ==
    /// Rejects configurations that can never produce a working cache.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::Config(
                "capacity must be a positive integer".to_string(),
            ));
        }
        if self.write_through && self.persistence.is_none() {
            return Err(CacheError::Config(
                "write_through requires a persistence config".to_string(),
            ));
        }
        Ok(())
    }

    /// Encryption material for this instance, filling in random parts.
    pub fn material(&self) -> Option<EncryptionMaterial> {
        self.encrypt.then(|| {
            EncryptionMaterial::new(
                self.key.unwrap_or_else(encryption::random_key),
                self.init_vector.unwrap_or_else(encryption::random_iv),
            )
        })
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    pub compress: bool,
    pub encrypt: bool,
    /// Hex AES key
    pub key_hex: Option<String>,
    /// Hex AES IV
    pub iv_hex: Option<String>,
    pub write_through: bool,
    /// Record directory; in-memory store when unset
    pub persistence_dir: Option<PathBuf>,
    /// HTTP server port
    pub server_port: u16,
}

impl ServerConfig {
    /// Creates a new ServerConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_COMPRESS` - Compress stored values (default: true)
    /// - `CACHE_ENCRYPT` - Encrypt stored values (default: false)
    /// - `CACHE_KEY` / `CACHE_IV` - Hex encryption material (default: random)
    /// - `WRITE_THROUGH` - Mirror writes to persistence (default: false)
    /// - `PERSISTENCE_DIR` - Record directory (default: in-memory store)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: parse_var("CACHE_CAPACITY").unwrap_or(defaults.capacity),
            compress: parse_var("CACHE_COMPRESS").unwrap_or(defaults.compress),
            encrypt: parse_var("CACHE_ENCRYPT").unwrap_or(defaults.encrypt),
            key_hex: env::var("CACHE_KEY").ok(),
            iv_hex: env::var("CACHE_IV").ok(),
            write_through: parse_var("WRITE_THROUGH").unwrap_or(defaults.write_through),
            persistence_dir: env::var("PERSISTENCE_DIR").ok().map(PathBuf::from),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    // == To Vault Config ==
    /// Builds the cache options, decoding any hex material.
    pub fn vault_config(&self) -> Result<VaultConfig> {
        let mut config = VaultConfig::new(self.capacity)
            .compress(self.compress)
            .encrypt(self.encrypt);

        if let Some(key_hex) = &self.key_hex {
            config.key = Some(encryption::parse_hex(key_hex, "CACHE_KEY")?);
        }
        if let Some(iv_hex) = &self.iv_hex {
            config.init_vector = Some(encryption::parse_hex(iv_hex, "CACHE_IV")?);
        }

        if self.write_through {
            let persistence = match &self.persistence_dir {
                Some(dir) => PersistenceConfig::Directory(dir.clone()),
                None => PersistenceConfig::Memory,
            };
            config = config.write_through(persistence);
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            compress: true,
            encrypt: false,
            key_hex: None,
            iv_hex: None,
            write_through: false,
            persistence_dir: None,
            server_port: 3000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
