//! # Features por Token
//!
//! Cada token vira um vetor esparso de features binárias que o CRF pontua.
//!
//! - **Ortografia**: capitalização, caixa alta, dígitos, pontuação, sufixos.
//! - **Contexto**: palavra anterior/seguinte, início de frase.
//! - **Léxico**: gazetteers (pessoa, lugar, organização), palavras que não são
//!   entidades, títulos, placeholders já inseridos.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::lexicon;
use crate::tokenizer::Token;

/// Vetor esparso de features ativas de um token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: HashMap<String, f64>,
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self {
            features: HashMap::new(),
            token_index,
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }
}

/// Conjuntos normalizados (minúsculas) consultados em O(1).
#[derive(Debug, Clone, Default)]
pub struct Gazetteers {
    pub persons: HashSet<String>,
    pub locations: HashSet<String>,
    pub organizations: HashSet<String>,
    /// Palavras soltas de entradas com várias palavras ("buenos" de "Buenos Aires").
    pub location_parts: HashSet<String>,
    pub organization_parts: HashSet<String>,
    pub non_entities: HashSet<String>,
    pub titles: HashSet<String>,
}

impl Gazetteers {
    /// Gazetteers a partir do léxico embutido.
    ///
    /// Entradas de uma palavra vão para o conjunto principal. Entradas de várias
    /// palavras contribuem com cada palavra significativa (mais de 3 letras) só
    /// como sinal parcial; a frase completa fica com o motor de regras.
    pub fn from_lexicon() -> Self {
        let mut gaz = Self::default();
        for name in lexicon::FIRST_NAMES.iter().chain(lexicon::SURNAMES) {
            gaz.persons.insert(name.to_lowercase());
        }
        for loc in lexicon::LOCATIONS {
            insert_entry(&mut gaz.locations, &mut gaz.location_parts, loc);
        }
        for org in lexicon::ORGANIZATIONS {
            insert_entry(&mut gaz.organizations, &mut gaz.organization_parts, org);
        }
        gaz.non_entities.extend(lexicon::NON_ENTITY_WORDS.iter().map(|w| w.to_string()));
        gaz.titles.extend(lexicon::PERSON_TITLES.iter().map(|w| w.to_string()));
        gaz
    }
}

fn insert_entry(full: &mut HashSet<String>, parts: &mut HashSet<String>, entry: &str) {
    let words: Vec<&str> = entry.split_whitespace().collect();
    if let [single] = words.as_slice() {
        full.insert(single.to_lowercase());
        return;
    }
    for word in words {
        if word.chars().count() > 3 {
            parts.insert(word.to_lowercase());
        }
    }
}

/// Tokens que fecham uma frase: o token seguinte está em "início de frase".
const SENTENCE_BREAKS: &[&str] = &[".", "!", "?", ":", ";", "¿", "¡", "\"", "(", "-", "—"];

/// Gera os vetores de features da sequência inteira (um por token).
pub fn extract_features(tokens: &[Token], gazetteers: &Gazetteers) -> Vec<FeatureVector> {
    (0..tokens.len())
        .map(|i| extract_for_token(tokens, i, gazetteers))
        .collect()
}

/// Extrai as features de um token em seu contexto.
pub fn extract_for_token(tokens: &[Token], i: usize, gazetteers: &Gazetteers) -> FeatureVector {
    let mut fv = FeatureVector::new(i);
    let token = &tokens[i];
    let word = token.text.as_str();
    let norm = token.normalized();

    fv.insert("bias", 1.0);
    fv.insert(format!("word={norm}"), 1.0);

    if lexicon::is_placeholder(word) {
        fv.insert("is_placeholder", 1.0);
        return fv;
    }

    let has_alpha = word.chars().any(char::is_alphabetic);
    let all_upper = has_alpha && word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic());

    if token.is_capitalized() {
        fv.insert("is_capitalized", 1.0);
    } else if has_alpha {
        fv.insert("is_lower", 1.0);
    }
    if all_upper && word.chars().count() > 1 {
        fv.insert("is_all_caps", 1.0);
    }
    if word.chars().any(|c| c.is_ascii_digit()) {
        fv.insert("has_digit", 1.0);
    }
    if !word.chars().any(char::is_alphanumeric) {
        fv.insert("is_punctuation", 1.0);
    }

    let chars: Vec<char> = norm.chars().collect();
    for n in 2..=3 {
        if chars.len() > n {
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("suffix{n}={suffix}"), 1.0);
        }
    }

    let sentence_start = i == 0 || SENTENCE_BREAKS.contains(&tokens[i - 1].text.as_str());
    if sentence_start {
        fv.insert("sentence_start", 1.0);
    }

    // === Contexto ===
    if i > 0 {
        let prev = tokens[i - 1].normalized();
        if gazetteers.titles.contains(&prev) {
            fv.insert("prev_is_title", 1.0);
        }
        fv.insert(format!("prev_word={prev}"), 1.0);
    }
    if let Some(next) = tokens.get(i + 1) {
        if next.is_capitalized() && !lexicon::is_placeholder(&next.text) {
            fv.insert("next_is_capitalized", 1.0);
        }
    }

    // === Léxico ===
    if gazetteers.non_entities.contains(&norm) {
        fv.insert("in_non_entity_lexicon", 1.0);
    }
    if gazetteers.titles.contains(&norm) {
        fv.insert("is_title", 1.0);
    }
    if lexicon::ORG_HEADS.contains(&norm.as_str()) {
        fv.insert("is_org_head", 1.0);
    }
    if gazetteers.persons.contains(&norm) {
        fv.insert("in_person_gazetteer", 1.0);
    }
    if gazetteers.locations.contains(&norm) {
        fv.insert("in_location_gazetteer", 1.0);
    }
    if gazetteers.organizations.contains(&norm) {
        fv.insert("in_org_gazetteer", 1.0);
    }
    if gazetteers.location_parts.contains(&norm) {
        fv.insert("in_location_part", 1.0);
    }
    if gazetteers.organization_parts.contains(&norm) {
        fv.insert("in_org_part", 1.0);
    }

    let known = ["in_person_gazetteer", "in_location_gazetteer", "in_org_gazetteer", "in_location_part", "in_org_part"]
        .iter()
        .any(|key| fv.has(key));
    let after_title = i > 0 && gazetteers.titles.contains(&tokens[i - 1].normalized());
    if token.is_capitalized() && !known && !after_title {
        fv.insert("unknown_capitalized", 1.0);
    }

    fv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn features_of(text: &str) -> Vec<FeatureVector> {
        extract_features(&tokenize(text), &Gazetteers::from_lexicon())
    }

    #[test]
    fn test_capitalization_features() {
        let fvs = features_of("vive Gómez");
        assert!(fvs[0].has("is_lower"));
        assert!(fvs[1].has("is_capitalized"));
        assert!(fvs[1].has("in_person_gazetteer"));
    }

    #[test]
    fn test_sentence_start() {
        let fvs = features_of("Contactar hoy. Luego");
        assert!(fvs[0].has("sentence_start"));
        assert!(!fvs[1].has("sentence_start"));
        assert!(fvs[3].has("sentence_start"));
    }

    #[test]
    fn test_title_context() {
        let fvs = features_of("la Dra. Quiroga");
        assert!(fvs[2].has("prev_is_title"));
        assert!(fvs[2].has("prev_word=dra"));
        assert!(fvs[1].has("is_title"));
    }

    #[test]
    fn test_non_entity_and_all_caps() {
        let fvs = features_of("su DNI es");
        assert!(fvs[1].has("is_all_caps"));
        assert!(fvs[1].has("in_non_entity_lexicon"));
    }

    #[test]
    fn test_placeholder_short_circuits() {
        let fvs = features_of("PER_ANONIMIZADO");
        assert!(fvs[0].has("is_placeholder"));
        assert!(!fvs[0].has("is_capitalized"));
    }

    #[test]
    fn test_multiword_location_words() {
        let gaz = Gazetteers::from_lexicon();
        assert!(gaz.location_parts.contains("salvador"));
        assert!(gaz.location_parts.contains("buenos"));
        assert!(!gaz.locations.contains("buenos"));
        assert!(gaz.locations.contains("jujuy"));
        assert!(!gaz.location_parts.contains("de"));
    }

    #[test]
    fn test_partial_hit_is_weaker_signal() {
        let fvs = features_of("Buenos días en Jujuy");
        assert!(fvs[0].has("in_location_part"));
        assert!(!fvs[0].has("in_location_gazetteer"));
        assert!(fvs[3].has("in_location_gazetteer"));
    }

    #[test]
    fn test_unknown_capitalized() {
        // Hola Mundo , dijo la Dra. Zapata ante Juan
        let fvs = features_of("Hola Mundo, dijo la Dra. Zapata ante Juan");
        assert!(fvs[1].has("unknown_capitalized"));
        assert!(!fvs[6].has("unknown_capitalized"));
        assert!(!fvs[8].has("unknown_capitalized"));
    }
}
