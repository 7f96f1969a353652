//! # Modelo de Entidades para Espanhol
//!
//! O modelo encapsula:
//! - **Pesos CRF** heurísticos para o espanhol jurídico-administrativo;
//! - **Gazetteers** usados pela extração de features;
//! - **Motor de Regras** configurado com o léxico embutido.
//!
//! Os pesos embutidos refletem os sinais mais fortes do domínio (nomes
//! conhecidos, títulos, capitalização fora de início de frase). Pesos
//! treinados fora do processo podem substituí-los via
//! [`NerModel::with_weights_file`].

use std::path::Path;

use tracing::info;

use crate::crf::CrfModel;
use crate::error::Result;
use crate::features::Gazetteers;
use crate::rule_based::RuleEngine;
use crate::tagger::{EntityCategory, Tag};

/// O modelo completo: CRF, regras e gazetteers.
///
/// Construído uma vez por pipeline e mantido imutável durante toda a sua vida.
pub struct NerModel {
    pub crf: CrfModel,
    /// Motor de regras para dicionários e padrões de contexto
    pub rule_engine: RuleEngine,
    gazetteers: Gazetteers,
}

impl NerModel {
    /// Modelo padrão com pesos heurísticos.
    pub fn build() -> Self {
        Self::with_crf(build_crf_model())
    }

    /// Usa um CRF arbitrário com as regras e gazetteers embutidos.
    pub fn with_crf(crf: CrfModel) -> Self {
        Self {
            crf,
            rule_engine: RuleEngine::from_lexicon(),
            gazetteers: Gazetteers::from_lexicon(),
        }
    }

    /// Carrega os pesos do CRF de um arquivo JSON.
    pub fn with_weights_file(path: &Path) -> Result<Self> {
        let crf = CrfModel::from_json_file(path)?;
        info!(path = %path.display(), weights = crf.emission_weights.len(), "pesos do CRF carregados");
        Ok(Self::with_crf(crf))
    }

    pub fn gazetteers(&self) -> &Gazetteers {
        &self.gazetteers
    }
}

impl Default for NerModel {
    fn default() -> Self {
        Self::build()
    }
}

/// Constrói o CRF com pesos heurísticos.
///
/// - Nome em gazetteer de pessoa: forte indício de `B-PER`/`I-PER`.
/// - Capitalização fora de início de frase: indício fraco de entidade.
/// - Palavra anterior "ciudad", "provincia"... → `B-LOC`.
/// - Minúsculas, dígitos, pontuação, placeholders: `O`.
pub fn build_crf_model() -> CrfModel {
    let mut model = CrfModel::new();
    let b_per = Tag::Begin(EntityCategory::Per);
    let i_per = Tag::Inside(EntityCategory::Per);
    let b_org = Tag::Begin(EntityCategory::Org);
    let i_org = Tag::Inside(EntityCategory::Org);
    let b_loc = Tag::Begin(EntityCategory::Loc);
    let i_loc = Tag::Inside(EntityCategory::Loc);

    // =====================================================================
    // PESOS DE EMISSÃO (Feature -> Tag)
    // =====================================================================

    // --- Outside ---
    model.set_emission("bias", &Tag::Outside, 1.0);
    model.set_emission("is_placeholder", &Tag::Outside, 20.0);
    model.set_emission("is_punctuation", &Tag::Outside, 6.0);
    model.set_emission("has_digit", &Tag::Outside, 3.0);
    model.set_emission("is_lower", &Tag::Outside, 4.0);
    model.set_emission("in_non_entity_lexicon", &Tag::Outside, 6.0);
    // Capitalização no início de frase é gramatical, não indício de nome
    model.set_emission("sentence_start", &Tag::Outside, 2.5);
    model.set_emission("is_title", &Tag::Outside, 6.0);
    model.set_emission("is_org_head", &Tag::Outside, 3.0);
    // Capitalizada fora de qualquer gazetteer e sem título antes
    model.set_emission("unknown_capitalized", &Tag::Outside, 1.0);

    // --- Capitalização ---
    model.set_emission("is_capitalized", &b_per, 2.0);
    model.set_emission("is_capitalized", &b_loc, 1.4);
    model.set_emission("is_capitalized", &b_org, 1.2);
    model.set_emission("is_capitalized", &i_per, 1.5);
    model.set_emission("is_capitalized", &i_loc, 1.2);
    model.set_emission("is_capitalized", &i_org, 1.2);
    // Siglas: "ANSES", "AFIP"
    model.set_emission("is_all_caps", &b_org, 1.5);

    // --- Gazetteers ---
    model.set_emission("in_person_gazetteer", &b_per, 4.0);
    model.set_emission("in_person_gazetteer", &i_per, 4.0);
    model.set_emission("in_location_gazetteer", &b_loc, 4.0);
    model.set_emission("in_location_gazetteer", &i_loc, 3.5);
    model.set_emission("in_org_gazetteer", &b_org, 4.0);
    model.set_emission("in_org_gazetteer", &i_org, 3.5);
    // Palavra solta de entrada composta: só ajuda a continuar a entidade
    model.set_emission("in_location_part", &b_loc, 0.5);
    model.set_emission("in_location_part", &i_loc, 1.5);
    model.set_emission("in_org_part", &b_org, 0.5);
    model.set_emission("in_org_part", &i_org, 1.5);

    // --- Contexto ---
    model.set_emission("prev_is_title", &b_per, 3.0);
    model.set_emission("next_is_capitalized", &b_per, 0.5);
    model.set_emission("prev_word=en", &b_loc, 1.0);
    model.set_emission("prev_word=de", &b_loc, 0.6);
    for word in ["ciudad", "provincia", "localidad", "barrio", "departamento", "municipio"] {
        model.set_emission(&format!("prev_word={word}"), &b_loc, 2.5);
    }

    // Sobrenomes patronímicos: Pérez, Gómez, Fernández
    model.set_emission("suffix2=ez", &b_per, 0.8);
    model.set_emission("suffix2=ez", &i_per, 0.8);

    // =====================================================================
    // PESOS DE TRANSIÇÃO
    // =====================================================================

    let tags = Tag::all();
    for prev in &tags {
        for next in &tags {
            if !Tag::is_valid_transition(prev, next) {
                model.set_transition(prev, next, -8.0);
            }
        }
    }

    for cat in EntityCategory::ALL {
        let b = Tag::Begin(cat);
        let i = Tag::Inside(cat);
        model.set_transition(&b, &i, 3.0);
        model.set_transition(&i, &i, 2.5);
        model.set_transition(&b, &Tag::Outside, 1.0);
        model.set_transition(&i, &Tag::Outside, 1.0);
        model.set_transition(&Tag::Outside, &b, 0.5);
    }
    model.set_transition(&Tag::Outside, &Tag::Outside, 1.5);

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;
    use crate::tokenizer::tokenize;
    use crate::viterbi::viterbi_decode;

    fn decode(text: &str) -> Vec<(String, Tag)> {
        let model = NerModel::build();
        let tokens = tokenize(text);
        let fvs = extract_features(&tokens, model.gazetteers());
        let result = viterbi_decode(&model.crf, &fvs);
        tokens.into_iter().map(|t| t.text).zip(result.best_sequence).collect()
    }

    #[test]
    fn test_crf_tags_known_name() {
        let tags = decode("declaró ayer Juan Pérez");
        assert_eq!(tags[2].1, Tag::Begin(EntityCategory::Per));
        assert_eq!(tags[3].1, Tag::Inside(EntityCategory::Per));
    }

    #[test]
    fn test_crf_keeps_plain_text_outside() {
        let tags = decode("La audiencia fue postergada por razones de agenda.");
        assert!(tags.iter().all(|(_, tag)| *tag == Tag::Outside), "{tags:?}");
    }

    #[test]
    fn test_crf_greeting_is_outside() {
        let tags = decode("Buenos días, Hola Mundo");
        assert!(tags.iter().all(|(_, tag)| *tag == Tag::Outside), "{tags:?}");
    }

    #[test]
    fn test_crf_placeholder_outside() {
        let tags = decode("vive PER_ANONIMIZADO");
        assert_eq!(tags[1].1, Tag::Outside);
    }

    #[test]
    fn test_transition_matrix_is_complete() {
        let crf = build_crf_model();
        assert_eq!(crf.transition_weights.len(), Tag::COUNT);
        let b = Tag::Begin(EntityCategory::Loc);
        let i = Tag::Inside(EntityCategory::Loc);
        assert!(crf.transition_score(&b, &i) > 0.0);
        assert!(crf.transition_score(&Tag::Outside, &i) < 0.0);
    }

    #[test]
    fn test_weights_file_roundtrip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_string(&build_crf_model()).unwrap()).unwrap();
        let model = NerModel::with_weights_file(file.path()).unwrap();
        assert!(model.crf.emission_weights.contains_key("is_placeholder|O"));
    }
}
