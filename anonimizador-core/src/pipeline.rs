//! # Pipeline de Anonimização — Cinco Passos com Eventos Observáveis
//!
//! O [`Anonymizer`] aplica, sempre nesta ordem, sobre o mesmo texto:
//!
//! 1. **Entidades**: PER, LOC e ORG do reconhecedor → `{CAT}_ANONIMIZADO`.
//! 2. **DNI** → `DNI_ANONIMIZADO`.
//! 3. **Endereço** → `DIRECCION_ANONIMIZADA`.
//! 4. **Telefone** validado → `TELEFONO_ANONIMIZADO`.
//! 5. **E-mail** validado → `EMAIL_ANONIMIZADO`.
//!
//! A saída de cada passo é a entrada do seguinte. Um erro fatal em qualquer
//! passo aborta a chamada sem devolver texto parcial.
//!
//! Assim como a análise síncrona, o modo streaming emite [`PipelineEvent`]s por
//! um canal `mpsc`, que o servidor WebSocket repassa ao cliente.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use anonimizador_core::Anonymizer;
//!
//! let anonymizer = Anonymizer::new().unwrap();
//! let out = anonymizer.anonymize("Su DNI es 30.123.456").unwrap();
//! assert_eq!(out, "Su DNI es DNI_ANONIMIZADO");
//! ```

use std::sync::mpsc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{AnonymizerConfig, EntityReplacement};
use crate::detector::{MatchOutcome, PatternDetector};
use crate::error::{AnonymizeError, Result};
use crate::model::NerModel;
use crate::recognizer::{EntityRecognizer, HybridRecognizer};
use crate::rules::{Category, PassKind, Redaction};
use crate::tagger::EntitySpan;
use crate::validator::{EmailValidator, LibPhoneValidator, PhoneValidator, SyntaxEmailValidator, Verdict};

/// Eventos emitidos durante a anonimização.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// Um passo começou.
    PassStarted { pass: PassKind },
    /// Entidade devolvida pelo reconhecedor (inclusive as não substituídas).
    EntityRecognized { entity: EntitySpan },
    /// Um trecho foi substituído.
    Redacted { redaction: Redaction },
    /// Um trecho casou com a regex mas o validador recusou.
    MatchKept {
        pass: PassKind,
        start: usize,
        end: usize,
        reason: String,
    },
    /// **Conclusão**: texto final e todas as substituições.
    Done {
        text: String,
        redactions: Vec<Redaction>,
        processing_ms: u64,
    },
    /// **Falha**: erro fatal; nenhum texto é devolvido.
    Error { message: String },
}

/// Texto anonimizado e o que foi substituído.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationReport {
    pub text: String,
    pub redactions: Vec<Redaction>,
    pub processing_ms: u64,
}

/// O pipeline de anonimização.
///
/// Imutável após a construção e `Send + Sync`: pode ser compartilhado via `Arc`.
pub struct Anonymizer {
    config: AnonymizerConfig,
    recognizer: Box<dyn EntityRecognizer>,
    phone: Box<dyn PhoneValidator>,
    email: Box<dyn EmailValidator>,
    /// Passos de regex habilitados, na ordem de execução
    detectors: Vec<PatternDetector>,
}

impl Anonymizer {
    /// Pipeline com configuração padrão e pesos embutidos.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn from_config(config: AnonymizerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> AnonymizerBuilder {
        AnonymizerBuilder::default()
    }

    pub fn config(&self) -> &AnonymizerConfig {
        &self.config
    }

    pub fn anonymize(&self, text: &str) -> Result<String> {
        Ok(self.anonymize_with_report(text)?.text)
    }

    pub fn anonymize_with_report(&self, text: &str) -> Result<AnonymizationReport> {
        let start = Instant::now();
        let (text, redactions) = self.run(text, &mut |_| {})?;
        Ok(AnonymizationReport {
            text,
            redactions,
            processing_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Executa o pipeline enviando eventos de progresso.
    ///
    /// O último evento é sempre `Done` ou `Error`.
    pub fn anonymize_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let result = self.run(text, &mut |event| {
            let _ = tx.send(event);
        });
        let last = match result {
            Ok((text, redactions)) => PipelineEvent::Done {
                text,
                redactions,
                processing_ms: start.elapsed().as_millis() as u64,
            },
            Err(err) => PipelineEvent::Error {
                message: err.to_string(),
            },
        };
        let _ = tx.send(last);
    }

    /// Saída bruta do reconhecedor, sem substituir nada.
    pub fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        self.recognizer.recognize(text)
    }

    fn run(&self, text: &str, emit: &mut dyn FnMut(PipelineEvent)) -> Result<(String, Vec<Redaction>)> {
        let start = Instant::now();
        let mut current = text.to_string();
        let mut redactions = Vec::new();

        if self.config.is_enabled(PassKind::Entities) {
            emit(PipelineEvent::PassStarted { pass: PassKind::Entities });
            current = self
                .entity_pass(&current, &mut redactions, emit)
                .inspect_err(|err| error!(error = %err, "falha no passo de entidades"))?;
        }

        for detector in &self.detectors {
            emit(PipelineEvent::PassStarted { pass: detector.kind() });
            current = self.pattern_pass(detector, &current, &mut redactions, emit);
        }

        info!(
            chars = text.chars().count(),
            redactions = redactions.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "texto anonimizado"
        );
        Ok((current, redactions))
    }

    fn entity_pass(
        &self,
        text: &str,
        redactions: &mut Vec<Redaction>,
        emit: &mut dyn FnMut(PipelineEvent),
    ) -> Result<String> {
        let entities = self.recognizer.recognize(text)?;

        let mut targets: Vec<(EntitySpan, Category)> = Vec::new();
        for entity in entities {
            emit(PipelineEvent::EntityRecognized { entity: entity.clone() });
            if !self.config.replaces(entity.category) {
                continue;
            }
            if let Some(category) = Category::from_entity(entity.category) {
                targets.push((entity, category));
            }
        }

        let (out, replaced) = match self.config.entity_replacement {
            EntityReplacement::DetectedSpans => replace_spans(text, targets)?,
            EntityReplacement::AllOccurrences => replace_occurrences(text, targets),
        };
        for redaction in replaced {
            emit(PipelineEvent::Redacted { redaction: redaction.clone() });
            redactions.push(redaction);
        }
        Ok(out)
    }

    fn pattern_pass(
        &self,
        detector: &PatternDetector,
        text: &str,
        redactions: &mut Vec<Redaction>,
        emit: &mut dyn FnMut(PipelineEvent),
    ) -> String {
        let mut outcomes = Vec::new();
        let out = match detector.kind() {
            PassKind::Phone => detector.apply(text, |c| self.phone.check(c), &mut outcomes),
            PassKind::Email => detector.apply(text, |c| self.email.check(c), &mut outcomes),
            _ => detector.apply(text, |_| Verdict::Valid, &mut outcomes),
        };

        for outcome in outcomes {
            match outcome {
                MatchOutcome::Redacted(redaction) => {
                    emit(PipelineEvent::Redacted { redaction: redaction.clone() });
                    redactions.push(redaction);
                }
                MatchOutcome::Kept { start, end, verdict } => {
                    let reason = verdict.reason().unwrap_or_default();
                    // o trecho em si nunca vai para o log
                    debug!(pass = %detector.kind(), start, end, reason = %reason, "trecho mantido");
                    emit(PipelineEvent::MatchKept {
                        pass: detector.kind(),
                        start,
                        end,
                        reason,
                    });
                }
            }
        }
        out
    }
}

/// Substitui exatamente os spans detectados, ignorando sobreposições.
fn replace_spans(text: &str, mut targets: Vec<(EntitySpan, Category)>) -> Result<(String, Vec<Redaction>)> {
    targets.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(text.len());
    let mut redactions = Vec::new();
    let mut cursor = 0;
    for (span, category) in targets {
        if span.start < cursor {
            continue;
        }
        let original = text.get(span.start..span.end).ok_or_else(|| {
            AnonymizeError::ModelInvocation(format!("span {}..{} fora do texto", span.start, span.end))
        })?;
        out.push_str(&text[cursor..span.start]);
        out.push_str(category.placeholder());
        cursor = span.end;
        redactions.push(Redaction {
            pass: PassKind::Entities,
            category,
            original: original.to_string(),
            start: span.start,
            end: span.end,
            placeholder: category.placeholder().to_string(),
        });
    }
    out.push_str(&text[cursor..]);
    Ok((out, redactions))
}

/// Substitui toda ocorrência literal do texto de cada entidade, na ordem de detecção.
fn replace_occurrences(text: &str, targets: Vec<(EntitySpan, Category)>) -> (String, Vec<Redaction>) {
    let mut current = text.to_string();
    let mut redactions = Vec::new();
    for (span, category) in targets {
        if span.text.is_empty() || !current.contains(&span.text) {
            continue;
        }
        current = current.replace(&span.text, category.placeholder());
        redactions.push(Redaction {
            pass: PassKind::Entities,
            category,
            original: span.text,
            start: span.start,
            end: span.end,
            placeholder: category.placeholder().to_string(),
        });
    }
    (current, redactions)
}

/// Montagem do [`Anonymizer`] com colaboradores substituíveis.
#[derive(Default)]
pub struct AnonymizerBuilder {
    config: AnonymizerConfig,
    recognizer: Option<Box<dyn EntityRecognizer>>,
    phone: Option<Box<dyn PhoneValidator>>,
    email: Option<Box<dyn EmailValidator>>,
}

impl AnonymizerBuilder {
    pub fn config(mut self, config: AnonymizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn recognizer(mut self, recognizer: impl EntityRecognizer + 'static) -> Self {
        self.recognizer = Some(Box::new(recognizer));
        self
    }

    pub fn phone_validator(mut self, validator: impl PhoneValidator + 'static) -> Self {
        self.phone = Some(Box::new(validator));
        self
    }

    pub fn email_validator(mut self, validator: impl EmailValidator + 'static) -> Self {
        self.email = Some(Box::new(validator));
        self
    }

    /// Carrega o modelo (uma única vez) e compila os padrões.
    pub fn build(self) -> Result<Anonymizer> {
        let AnonymizerBuilder {
            config,
            recognizer,
            phone,
            email,
        } = self;

        let recognizer: Box<dyn EntityRecognizer> = match recognizer {
            Some(recognizer) => recognizer,
            None => {
                let model = match &config.model_path {
                    Some(path) => NerModel::with_weights_file(path)?,
                    None => NerModel::build(),
                };
                Box::new(HybridRecognizer::new(model).with_max_text_length(config.max_text_length))
            }
        };
        let phone: Box<dyn PhoneValidator> = match phone {
            Some(phone) => phone,
            None => Box::new(LibPhoneValidator::with_region(config.phone_default_region.as_deref())?),
        };
        let email: Box<dyn EmailValidator> = email.unwrap_or_else(|| Box::new(SyntaxEmailValidator));

        let detectors = PassKind::ALL
            .iter()
            .filter(|pass| config.is_enabled(**pass))
            .filter_map(|pass| PatternDetector::for_pass(*pass).transpose())
            .collect::<Result<Vec<_>>>()?;

        debug!(passes = detectors.len() + usize::from(config.is_enabled(PassKind::Entities)), "pipeline montado");
        Ok(Anonymizer {
            config,
            recognizer,
            phone,
            email,
            detectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    struct FixedRecognizer(Vec<EntitySpan>);

    impl EntityRecognizer for FixedRecognizer {
        fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    impl EntityRecognizer for FailingRecognizer {
        fn recognize(&self, _text: &str) -> Result<Vec<EntitySpan>> {
            Err(AnonymizeError::ModelInvocation("modelo indisponível".to_string()))
        }
    }

    fn span(text: &str, start: usize, end: usize, category: EntityCategory) -> EntitySpan {
        EntitySpan {
            text: text[start..end].to_string(),
            category,
            start_token: 0,
            end_token: 0,
            start,
            end,
            confidence: 1.0,
            source: "test".to_string(),
        }
    }

    fn anonymize(text: &str) -> String {
        Anonymizer::new().unwrap().anonymize(text).unwrap()
    }

    #[test]
    fn test_text_without_pii_is_unchanged() {
        let texts = [
            "La audiencia fue postergada por razones de agenda.\nLas partes serán notificadas oportunamente de la nueva fecha.",
            "Buenos días a todos.",
            "Hola Mundo",
            "Buenas tardes.\nSaludos cordiales,\nAtentamente.",
        ];
        for text in texts {
            assert_eq!(anonymize(text), text);
        }
    }

    #[test]
    fn test_dni_only() {
        assert_eq!(
            anonymize("El expediente cita el DNI 30123456 y el 28.456.789."),
            "El expediente cita el DNI DNI_ANONIMIZADO y el DNI_ANONIMIZADO."
        );
    }

    #[test]
    fn test_person_address_and_dni() {
        assert_eq!(
            anonymize("Juan Pérez vive en Calle San Martín 123 y su DNI es 30123456"),
            "PER_ANONIMIZADO vive en DIRECCION_ANONIMIZADA y su DNI es DNI_ANONIMIZADO"
        );
    }

    #[test]
    fn test_valid_phone_is_replaced() {
        assert_eq!(anonymize("Llamar al +65 6123 4567 mañana."), "Llamar al TELEFONO_ANONIMIZADO mañana.");
    }

    #[test]
    fn test_invalid_phones_are_kept() {
        assert_eq!(anonymize("Contactar a +54 9 3884 123456"), "Contactar a +54 9 3884 123456");
        assert_eq!(anonymize("llamar al +65 0000 0000"), "llamar al +65 0000 0000");
    }

    #[test]
    fn test_emails() {
        assert_eq!(anonymize("escriban a soporte@ejemplo.com"), "escriban a EMAIL_ANONIMIZADO");
        assert_eq!(anonymize("escriban a juan..perez@ejemplo.com"), "escriban a juan..perez@ejemplo.com");
        assert_eq!(anonymize("escriban a usuario@-dominio.com"), "escriban a usuario@-dominio.com");
    }

    #[test]
    fn test_line_breaks_are_preserved() {
        assert_eq!(anonymize("Juan Pérez\nMaría Gómez"), "PER_ANONIMIZADO\nPER_ANONIMIZADO");
        assert_eq!(anonymize("Juan Pérez\nJuan Pérez"), "PER_ANONIMIZADO\nPER_ANONIMIZADO");
    }

    #[test]
    fn test_uppercase_email_goes_to_email_pass() {
        assert_eq!(anonymize("escriban a SOPORTE@EJEMPLO.COM"), "escriban a EMAIL_ANONIMIZADO");
    }

    #[test]
    fn test_idempotent() {
        let once = anonymize("Juan Pérez vive en Calle San Martín 123 y su DNI es 30123456");
        assert_eq!(anonymize(&once), once);
    }

    #[test]
    fn test_misc_entities_are_never_replaced() {
        let text = "conforme al artículo 79 del Código Penal.";
        let anonymizer = Anonymizer::new().unwrap();
        let found = anonymizer.recognize(text).unwrap();
        assert!(found.iter().any(|e| e.category == EntityCategory::Misc));
        assert_eq!(anonymizer.anonymize(text).unwrap(), text);
    }

    #[test]
    fn test_failing_recognizer_aborts() {
        let anonymizer = Anonymizer::builder().recognizer(FailingRecognizer).build().unwrap();
        let err = anonymizer.anonymize("DNI 30123456").unwrap_err();
        assert!(matches!(err, AnonymizeError::ModelInvocation(_)));
    }

    #[test]
    fn test_detected_spans_vs_all_occurrences() {
        let text = "Ana y Anabel";
        let entities = vec![span(text, 0, 3, EntityCategory::Per)];

        let exact = Anonymizer::builder()
            .recognizer(FixedRecognizer(entities.clone()))
            .build()
            .unwrap();
        assert_eq!(exact.anonymize(text).unwrap(), "PER_ANONIMIZADO y Anabel");

        let literal = Anonymizer::builder()
            .config(AnonymizerConfig {
                entity_replacement: EntityReplacement::AllOccurrences,
                ..Default::default()
            })
            .recognizer(FixedRecognizer(entities))
            .build()
            .unwrap();
        assert_eq!(literal.anonymize(text).unwrap(), "PER_ANONIMIZADO y PER_ANONIMIZADObel");
    }

    #[test]
    fn test_span_outside_text_is_model_error() {
        let anonymizer = Anonymizer::builder()
            .recognizer(FixedRecognizer(vec![EntitySpan {
                text: "x".to_string(),
                category: EntityCategory::Per,
                start_token: 0,
                end_token: 0,
                start: 10,
                end: 20,
                confidence: 1.0,
                source: "test".to_string(),
            }]))
            .build()
            .unwrap();
        assert!(matches!(anonymizer.anonymize("corto"), Err(AnonymizeError::ModelInvocation(_))));
    }

    #[test]
    fn test_disabled_pass_is_skipped() {
        let anonymizer = Anonymizer::from_config(AnonymizerConfig {
            disabled_passes: vec![PassKind::Dni],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(anonymizer.anonymize("DNI 30123456").unwrap(), "DNI 30123456");
    }

    #[test]
    fn test_only_selected_categories() {
        let text = "Ana vive en Jujuy";
        let anonymizer = Anonymizer::builder()
            .config(AnonymizerConfig {
                entity_categories: vec![EntityCategory::Loc],
                ..Default::default()
            })
            .recognizer(FixedRecognizer(vec![
                span(text, 0, 3, EntityCategory::Per),
                span(text, 12, 17, EntityCategory::Loc),
            ]))
            .build()
            .unwrap();
        assert_eq!(anonymizer.anonymize(text).unwrap(), "Ana vive en LOC_ANONIMIZADO");
    }

    #[test]
    fn test_report_lists_redactions_in_pass_order() {
        let report = Anonymizer::new()
            .unwrap()
            .anonymize_with_report("Juan Pérez vive en Calle San Martín 123 y su DNI es 30123456")
            .unwrap();
        let passes: Vec<PassKind> = report.redactions.iter().map(|r| r.pass).collect();
        assert_eq!(passes, vec![PassKind::Entities, PassKind::Dni, PassKind::Address]);
        assert_eq!(report.redactions[0].original, "Juan Pérez");
        assert_eq!(report.redactions[2].original, "Calle San Martín 123");
    }

    #[test]
    fn test_streaming_events() {
        let anonymizer = Anonymizer::new().unwrap();
        let (tx, rx) = mpsc::channel();
        anonymizer.anonymize_streaming("escriban a juan..perez@ejemplo.com", tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();

        assert!(matches!(events[0], PipelineEvent::PassStarted { pass: PassKind::Entities }));
        assert!(events.iter().any(|e| matches!(e, PipelineEvent::MatchKept { pass: PassKind::Email, .. })));
        assert!(matches!(events.last(), Some(PipelineEvent::Done { .. })));
    }

    #[test]
    fn test_streaming_error_is_last_event() {
        let anonymizer = Anonymizer::builder().recognizer(FailingRecognizer).build().unwrap();
        let (tx, rx) = mpsc::channel();
        anonymizer.anonymize_streaming("texto", tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(events.last(), Some(PipelineEvent::Error { .. })));
        assert!(!events.iter().any(|e| matches!(e, PipelineEvent::Done { .. })));
    }

    #[test]
    fn test_anonymizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Anonymizer>();
    }
}
