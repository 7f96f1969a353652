//! # CRF — Conditional Random Field Linear-Chain
//!
//! Score de uma sequência de tags `y` para os tokens `x`:
//!
//! ```text
//! score(y, x) = Σ_i [emission(y_i, x, i) + transition(y_{i-1}, y_i)]
//! ```
//!
//! Os pesos de emissão ficam num mapa esparso `"feature|tag" → peso`; as
//! transições numa matriz `Tag::COUNT × Tag::COUNT`. O modelo é serializável
//! em JSON, o que permite trocar os pesos heurísticos embutidos por pesos
//! treinados fora do processo.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnonymizeError, Result};
use crate::features::FeatureVector;
use crate::tagger::Tag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrfModel {
    /// Pesos de emissão: `"{feature}|{tag}"` → peso
    pub emission_weights: HashMap<String, f64>,
    /// Pesos de transição: `[prev.index()][next.index()]`
    pub transition_weights: Vec<Vec<f64>>,
}

impl CrfModel {
    /// Modelo com todos os pesos zerados
    pub fn new() -> Self {
        let n = Tag::COUNT;
        Self {
            emission_weights: HashMap::new(),
            transition_weights: vec![vec![0.0f64; n]; n],
        }
    }

    /// Carrega pesos de um arquivo JSON gerado a partir de [`CrfModel`].
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let load_err = |reason: String| AnonymizeError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let model: CrfModel = serde_json::from_str(&raw).map_err(|e| load_err(e.to_string()))?;

        let n = Tag::COUNT;
        if model.transition_weights.len() != n || model.transition_weights.iter().any(|row| row.len() != n) {
            return Err(load_err(format!("matriz de transição deve ser {n}x{n}")));
        }
        Ok(model)
    }

    /// `Σ_k w_{k,tag} · f_k`
    pub fn emission_score(&self, features: &FeatureVector, tag: &Tag) -> f64 {
        let tag_label = tag.label();
        features
            .features
            .iter()
            .map(|(feat_name, feat_val)| {
                let key = format!("{feat_name}|{tag_label}");
                feat_val * self.emission_weights.get(&key).unwrap_or(&0.0)
            })
            .sum()
    }

    pub fn transition_score(&self, prev: &Tag, next: &Tag) -> f64 {
        self.transition_weights[prev.index()][next.index()]
    }

    pub fn set_emission(&mut self, feature: &str, tag: &Tag, weight: f64) {
        self.emission_weights.insert(format!("{feature}|{}", tag.label()), weight);
    }

    pub fn set_transition(&mut self, from: &Tag, to: &Tag, weight: f64) {
        self.transition_weights[from.index()][to.index()] = weight;
    }
}

impl Default for CrfModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Scores de emissão `[token][tag.index()]` da sequência inteira.
pub fn compute_emission_scores(model: &CrfModel, feature_vectors: &[FeatureVector]) -> Vec<Vec<f64>> {
    let tags = Tag::all();
    feature_vectors
        .iter()
        .map(|fv| tags.iter().map(|tag| model.emission_score(fv, tag)).collect())
        .collect()
}
