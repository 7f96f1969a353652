//! # Detectores por Padrão
//!
//! Um passo de regex percorre as ocorrências da esquerda para a direita, sem
//! sobreposição, e pergunta a um portão ([`Verdict`]) se cada trecho deve ser
//! substituído. DNI e endereço usam um portão que sempre aceita.

use regex::Regex;

use crate::error::Result;
use crate::rules::{PassKind, Redaction};
use crate::validator::Verdict;

/// O que aconteceu com cada trecho encontrado.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Redacted(Redaction),
    /// Casou com a regex mas o validador recusou.
    Kept {
        start: usize,
        end: usize,
        verdict: Verdict,
    },
}

/// Regex compilada de um passo.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    kind: PassKind,
    regex: Regex,
}

impl PatternDetector {
    /// Compila o padrão do passo. O passo de entidades não tem padrão e
    /// devolve `None`.
    pub fn for_pass(kind: PassKind) -> Result<Option<Self>> {
        match kind.pattern() {
            Some(pattern) => Ok(Some(Self::with_pattern(kind, pattern)?)),
            None => Ok(None),
        }
    }

    pub fn with_pattern(kind: PassKind, pattern: &str) -> Result<Self> {
        Ok(Self {
            kind,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn kind(&self) -> PassKind {
        self.kind
    }

    /// Substitui os trechos aprovados por `gate` e registra cada decisão em `outcomes`.
    pub fn apply<F>(&self, text: &str, mut gate: F, outcomes: &mut Vec<MatchOutcome>) -> String
    where
        F: FnMut(&str) -> Verdict,
    {
        let Some(category) = self.kind.category() else {
            return text.to_string();
        };
        let placeholder = category.placeholder();

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for m in self.regex.find_iter(text) {
            let verdict = gate(m.as_str());
            if !verdict.is_valid() {
                outcomes.push(MatchOutcome::Kept {
                    start: m.start(),
                    end: m.end(),
                    verdict,
                });
                continue;
            }
            out.push_str(&text[cursor..m.start()]);
            out.push_str(placeholder);
            cursor = m.end();
            outcomes.push(MatchOutcome::Redacted(Redaction {
                pass: self.kind,
                category,
                original: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
                placeholder: placeholder.to_string(),
            }));
        }
        out.push_str(&text[cursor..]);
        out
    }
}
