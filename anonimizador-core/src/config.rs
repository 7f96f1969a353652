//! # Configuração do Anonimizador
//!
//! Todos os campos têm padrão; um JSON vazio (`{}`) equivale a
//! [`AnonymizerConfig::default`].
//!
//! ```json
//! {
//!   "entity_replacement": "all_occurrences",
//!   "entity_categories": ["PER", "ORG"],
//!   "disabled_passes": ["phone"],
//!   "phone_default_region": "AR",
//!   "max_text_length": 200000,
//!   "model_path": "/etc/anonimizador/crf.json"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnonymizeError, Result};
use crate::recognizer::DEFAULT_MAX_TEXT_LENGTH;
use crate::rules::PassKind;
use crate::tagger::EntityCategory;

/// Como o passo de entidades aplica os placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityReplacement {
    /// Substitui exatamente os spans detectados.
    #[default]
    DetectedSpans,
    /// Substitui toda ocorrência literal do texto da entidade, inclusive
    /// dentro de outras palavras ("Ana" em "Mariana").
    AllOccurrences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerConfig {
    pub entity_replacement: EntityReplacement,
    /// Categorias de entidade substituídas. `MISC` é sempre ignorada.
    pub entity_categories: Vec<EntityCategory>,
    /// Passos desligados; a ordem dos demais não muda.
    pub disabled_passes: Vec<PassKind>,
    /// Região ISO para telefones sem prefixo `+`.
    pub phone_default_region: Option<String>,
    /// Limite de caracteres aceito pelo reconhecedor.
    pub max_text_length: usize,
    /// Pesos do CRF em JSON; sem caminho, usa os pesos embutidos.
    pub model_path: Option<PathBuf>,
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            entity_replacement: EntityReplacement::default(),
            entity_categories: vec![EntityCategory::Per, EntityCategory::Loc, EntityCategory::Org],
            disabled_passes: vec![],
            phone_default_region: None,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            model_path: None,
        }
    }
}

impl AnonymizerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).map_err(|e| AnonymizeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn is_enabled(&self, pass: PassKind) -> bool {
        !self.disabled_passes.contains(&pass)
    }

    pub fn replaces(&self, category: EntityCategory) -> bool {
        category != EntityCategory::Misc && self.entity_categories.contains(&category)
    }

    fn validate(&self) -> Result<()> {
        if self.max_text_length == 0 {
            return Err(AnonymizeError::Config("max_text_length deve ser positivo".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(AnonymizerConfig::from_json_str("{}").unwrap(), AnonymizerConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = AnonymizerConfig::from_json_str(
            r#"{"entity_replacement": "all_occurrences", "disabled_passes": ["phone", "email"]}"#,
        )
        .unwrap();
        assert_eq!(config.entity_replacement, EntityReplacement::AllOccurrences);
        assert!(!config.is_enabled(PassKind::Phone));
        assert!(config.is_enabled(PassKind::Dni));
        assert!(config.replaces(EntityCategory::Per));
    }

    #[test]
    fn test_misc_never_replaced() {
        let config = AnonymizerConfig {
            entity_categories: EntityCategory::ALL.to_vec(),
            ..Default::default()
        };
        assert!(!config.replaces(EntityCategory::Misc));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AnonymizerConfig::from_json_str(r#"{"disabled_passes": ["fax"]}"#).unwrap_err();
        assert!(matches!(err, AnonymizeError::Config(_)));
        let err = AnonymizerConfig::from_json_str(r#"{"max_text_length": 0}"#).unwrap_err();
        assert!(matches!(err, AnonymizeError::Config(_)));
    }

    #[test]
    fn test_from_json_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"phone_default_region": "AR"}"#).unwrap();
        let config = AnonymizerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.phone_default_region.as_deref(), Some("AR"));

        let err = AnonymizerConfig::from_json_file(Path::new("/nao/existe.json")).unwrap_err();
        assert!(matches!(err, AnonymizeError::Io(_)));
    }
}
