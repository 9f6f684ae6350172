//! Chargement de la configuration.
//!
//! `defaults/calculatrice.default.toml` est embarqué dans le binaire ; un
//! fichier utilisateur et des surcharges ponctuelles (options de la ligne de
//! commande) se superposent via [`Loader`] avant désérialisation en
//! [`EngineConfig`]. Les valeurs numériques sont bornées après chargement.

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::noyau::{AngleMode, Precision};

const DEFAULT_TOML: &str = include_str!("../defaults/calculatrice.default.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    pub precision: Precision,
    pub history: HistoryConfig,
    pub angle: AngleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// 0 = illimité
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AngleConfig {
    pub default_mode: AngleMode,
}

impl EngineConfig {
    /// Borne la précision dans sa plage utile.
    pub fn clamped(mut self) -> Self {
        self.precision = self.precision.clamped();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            history: HistoryConfig {
                capacity: crate::noyau::historique::CAPACITE_DEFAUT,
            },
            angle: AngleConfig {
                default_mode: AngleMode::default(),
            },
        }
    }
}

/// Superpose fichiers et surcharges aux valeurs embarquées.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Fichier obligatoire : erreur s’il est absent.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Fichier facultatif : ignoré s’il est absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Surcharge d’une clé (`"angle.default_mode"`, `"precision.display_digits"`…).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let cfg: EngineConfig = self.builder.build()?.try_deserialize()?;
        Ok(cfg.clamped())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<EngineConfig, ConfigError> {
    Loader::new().build()
}
