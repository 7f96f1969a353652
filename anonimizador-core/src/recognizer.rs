//! # Reconhecedor de Entidades
//!
//! Ponto de extensão do primeiro passo do pipeline. A implementação padrão,
//! [`HybridRecognizer`], combina:
//!
//! 1. tokenização;
//! 2. extração de features;
//! 3. decodificação Viterbi do CRF;
//! 4. motor de regras (vence o CRF onde dispara);
//! 5. agrupamento dos tokens BIO em spans.

use tracing::debug;

use crate::error::{AnonymizeError, Result};
use crate::features::extract_features;
use crate::model::NerModel;
use crate::tagger::{tokens_to_spans, EntityCategory, EntitySpan, Tag, TaggedToken};
use crate::tokenizer::tokenize;
use crate::viterbi::viterbi_decode;

/// Limite padrão de caracteres por chamada.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1_000_000;

/// Reconhece entidades nomeadas num texto.
///
/// Implementações precisam ser `Send + Sync`: o pipeline é compartilhado entre threads.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Reconhecedor híbrido Regras + CRF.
pub struct HybridRecognizer {
    model: NerModel,
    max_text_length: usize,
}

impl HybridRecognizer {
    pub fn new(model: NerModel) -> Self {
        Self {
            model,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }

    pub fn with_max_text_length(mut self, max_text_length: usize) -> Self {
        self.max_text_length = max_text_length;
        self
    }

    pub fn model(&self) -> &NerModel {
        &self.model
    }

    /// Rotula cada token com a tag final e a fonte que a decidiu.
    pub fn tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
        let length = text.chars().count();
        if length > self.max_text_length {
            return Err(AnonymizeError::ModelInvocation(format!(
                "texto com {length} caracteres excede o limite de {}",
                self.max_text_length
            )));
        }

        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(vec![]);
        }

        let feature_vectors = extract_features(&tokens, self.model.gazetteers());
        let viterbi = viterbi_decode(&self.model.crf, &feature_vectors);
        let rules = self.model.rule_engine.apply(&tokens);

        // === Fusão: regra vence se disponível ===
        let mut tagged: Vec<TaggedToken> = tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| match &rules[i] {
                Some(rm) => TaggedToken {
                    token,
                    tag: rm.tag,
                    confidence: rm.confidence,
                    source: rm.rule_name.clone(),
                },
                None => TaggedToken {
                    token,
                    tag: viterbi.best_sequence.get(i).copied().unwrap_or(Tag::Outside),
                    confidence: viterbi.confidences.get(i).copied().unwrap_or(0.5),
                    source: "crf".to_string(),
                },
            })
            .collect();

        restart_after_line_breaks(&mut tagged, text);
        Ok(tagged)
    }
}

/// Entidades não atravessam linhas: `I-X` logo após `\n` vira `B-X`.
fn restart_after_line_breaks(tagged: &mut [TaggedToken], text: &str) {
    for i in 1..tagged.len() {
        let Tag::Inside(cat) = tagged[i].tag else {
            continue;
        };
        if text[tagged[i - 1].token.end..tagged[i].token.start].contains('\n') {
            tagged[i].tag = Tag::Begin(cat);
        }
    }
}

impl Default for HybridRecognizer {
    fn default() -> Self {
        Self::new(NerModel::build())
    }
}

impl EntityRecognizer for HybridRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let tagged = self.tag(text)?;
        let spans = merge_adjacent_persons(tokens_to_spans(&tagged, text), text);
        debug!(tokens = tagged.len(), entities = spans.len(), "entidades reconhecidas");
        Ok(spans)
    }
}

/// Une nomes de pessoa partidos entre regra e CRF ("Juan" + "Zárate"),
/// quando só há espaço (sem quebra de linha) entre eles.
fn merge_adjacent_persons(spans: Vec<EntitySpan>, text: &str) -> Vec<EntitySpan> {
    let mut merged: Vec<EntitySpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = &text[prev.end..span.start];
            let joinable = prev.category == EntityCategory::Per
                && span.category == EntityCategory::Per
                && gap.chars().all(|c| c == ' ' || c == '\t');
            if joinable {
                let prev_tokens = (prev.end_token - prev.start_token + 1) as f64;
                let span_tokens = (span.end_token - span.start_token + 1) as f64;
                prev.confidence = (prev.confidence * prev_tokens + span.confidence * span_tokens)
                    / (prev_tokens + span_tokens);
                prev.end = span.end;
                prev.end_token = span.end_token;
                prev.text = text[prev.start..prev.end].to_string();
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(text: &str) -> Vec<(String, EntityCategory)> {
        HybridRecognizer::default()
            .recognize(text)
            .unwrap()
            .into_iter()
            .map(|e| (e.text, e.category))
            .collect()
    }

    #[test]
    fn test_recognize_person_at_sentence_start() {
        let found = entities("Juan Pérez vive en Calle San Martín 123 y su DNI es 30123456");
        assert_eq!(found, vec![("Juan Pérez".to_string(), EntityCategory::Per)]);
    }

    #[test]
    fn test_recognize_title_and_location() {
        let found = entities("En San Salvador de Jujuy, la Sra. María Gómez denunció amenazas.");
        assert!(found.contains(&("San Salvador de Jujuy".to_string(), EntityCategory::Loc)));
        assert!(found.contains(&("María Gómez".to_string(), EntityCategory::Per)));
    }

    #[test]
    fn test_no_entities_in_plain_text() {
        assert!(entities("La audiencia fue postergada por razones de agenda.").is_empty());
    }

    #[test]
    fn test_placeholders_are_not_entities() {
        assert!(entities("PER_ANONIMIZADO vive en DIRECCION_ANONIMIZADA").is_empty());
    }

    #[test]
    fn test_offsets_match_text() {
        let text = "Declaró el Dr. Ramírez ante el Juzgado de Control Nº 2.";
        for span in HybridRecognizer::default().recognize(text).unwrap() {
            assert_eq!(&text[span.start..span.end], span.text);
        }
    }

    #[test]
    fn test_names_on_separate_lines_stay_apart() {
        let found = entities("Juan Pérez\nMaría Gómez");
        assert_eq!(
            found,
            vec![
                ("Juan Pérez".to_string(), EntityCategory::Per),
                ("María Gómez".to_string(), EntityCategory::Per),
            ]
        );

        let tagged = HybridRecognizer::default().tag("Juan Pérez\nMaría Gómez").unwrap();
        assert_eq!(tagged[2].tag, Tag::Begin(EntityCategory::Per));
    }

    #[test]
    fn test_greetings_are_not_entities() {
        assert!(entities("Buenos días a todos.").is_empty());
        assert!(entities("Hola Mundo").is_empty());
        assert!(entities("Saludos cordiales,\nGracias.").is_empty());
    }

    #[test]
    fn test_text_too_long_is_model_error() {
        let recognizer = HybridRecognizer::default().with_max_text_length(10);
        let err = recognizer.recognize("Juan Pérez vive en Jujuy").unwrap_err();
        assert!(matches!(err, AnonymizeError::ModelInvocation(_)));
    }

    #[test]
    fn test_tag_reports_rule_source() {
        let tagged = HybridRecognizer::default().tag("la Sra. Gómez").unwrap();
        assert_eq!(tagged[2].source, "title_pattern");
        assert_eq!(tagged[0].source, "crf");
    }
}
