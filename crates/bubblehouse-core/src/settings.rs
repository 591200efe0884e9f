//! Bubblehouse connection settings.
//!
//! These are re-read at the start of every sync cycle so a rotated secret or
//! corrected shop slug takes effect without a restart. [`RawSettings`] is the
//! unvalidated shape read from a YAML file or the environment;
//! [`RawSettings::validate`] turns it into a [`SyncSettings`] or reports every
//! empty field at once.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ConfigError;

/// Host used when the configured host is empty.
pub const DEFAULT_HOST: &str = "app.bubblehouse.com";

/// Settings exactly as stored, before validation.
#[derive(Clone, Default, Deserialize)]
pub struct RawSettings {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub shop_slug: String,
    #[serde(default)]
    pub kid: String,
    #[serde(default)]
    pub shared_secret: String,
}

impl std::fmt::Debug for RawSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawSettings")
            .field("host", &self.host)
            .field("shop_slug", &self.shop_slug)
            .field("kid", &self.kid)
            .field(
                "shared_secret",
                &(!self.shared_secret.is_empty()).then_some("[redacted]"),
            )
            .finish()
    }
}

impl RawSettings {
    /// Reads the four `BUBBLEHOUSE_*` settings through `lookup`, treating
    /// unset variables as empty.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let get = |var: &str| lookup(var).unwrap_or_default();
        Self {
            host: get("BUBBLEHOUSE_HOST"),
            shop_slug: get("BUBBLEHOUSE_SHOP_SLUG"),
            kid: get("BUBBLEHOUSE_KID"),
            shared_secret: get("BUBBLEHOUSE_SHARED_SECRET"),
        }
    }

    /// Applies the host default and checks that every required field is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteSettings`] listing every empty field.
    pub fn validate(self) -> Result<SyncSettings, ConfigError> {
        let host = match self.host.trim() {
            "" => DEFAULT_HOST.to_string(),
            h => h.trim_end_matches('/').to_string(),
        };
        let shop_slug = self.shop_slug.trim().to_string();
        let key_id = self.kid.trim().to_string();
        let shared_secret_base64 = self.shared_secret.trim().to_string();

        let missing: Vec<&'static str> = [
            ("host", host.is_empty()),
            ("shopSlug", shop_slug.is_empty()),
            ("kid", key_id.is_empty()),
            ("sharedSecret", shared_secret_base64.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::IncompleteSettings { missing });
        }

        Ok(SyncSettings {
            host,
            shop_slug,
            key_id,
            shared_secret_base64,
        })
    }
}

/// Validated connection settings for one sync cycle or embed render.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub host: String,
    pub shop_slug: String,
    pub key_id: String,
    pub shared_secret_base64: String,
}

impl std::fmt::Debug for SyncSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSettings")
            .field("host", &self.host)
            .field("shop_slug", &self.shop_slug)
            .field("key_id", &self.key_id)
            .field("shared_secret_base64", &"[redacted]")
            .finish()
    }
}

impl SyncSettings {
    /// Scheme and host of the Bubblehouse service.
    ///
    /// A host configured with an explicit `http://` or `https://` scheme is
    /// used as-is; a bare host is served over HTTPS.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.host.starts_with("https://") || self.host.starts_with("http://") {
            self.host.clone()
        } else {
            format!("https://{}", self.host)
        }
    }
}

/// Where the sync settings live.
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// A YAML file with `host`, `shop_slug`, `kid` and `shared_secret` keys.
    File(PathBuf),
    /// The `BUBBLEHOUSE_HOST`, `BUBBLEHOUSE_SHOP_SLUG`, `BUBBLEHOUSE_KID`
    /// and `BUBBLEHOUSE_SHARED_SECRET` environment variables.
    Env,
}

impl SettingsSource {
    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        path.map_or(Self::Env, |p| Self::File(p.to_path_buf()))
    }

    /// Reads the current settings without validating them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsFileIo`] or
    /// [`ConfigError::SettingsFileParse`] when the file cannot be used.
    pub fn load_raw(&self) -> Result<RawSettings, ConfigError> {
        match self {
            Self::Env => Ok(RawSettings::from_lookup(|key| std::env::var(key))),
            Self::File(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
                        path: path.display().to_string(),
                        source: e,
                    })?;
                // An empty file deserializes to `null`; treat it as all-empty settings.
                if content.trim().is_empty() {
                    return Ok(RawSettings::default());
                }
                Ok(serde_yaml::from_str(&content)?)
            }
        }
    }

    /// Reads and validates the current settings.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::load_raw`] or [`RawSettings::validate`].
    pub fn load(&self) -> Result<SyncSettings, ConfigError> {
        self.load_raw()?.validate()
    }
}
