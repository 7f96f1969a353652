//! # Tokenizador para Espanhol
//!
//! Divide o texto bruto em tokens (palavras, números, pontuação) preservando
//! os offsets de byte originais, para que as entidades possam ser substituídas
//! exatamente na posição em que foram detectadas.
//!
//! A segmentação base segue as fronteiras de palavra do Unicode (UAX #29,
//! via `unicode-segmentation`). Isso já mantém juntos:
//! - números com pontos ou vírgulas (`30.123.456`, `1.500,00`);
//! - palavras com apóstrofo (`O'Higgins`);
//! - placeholders com sublinhado (`PER_ANONIMIZADO`).
//!
//! Em seguida, abreviações comuns (`Dr.`, `Sra.`, `Av.`) são fundidas ao ponto.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use anonimizador_core::tokenizer::tokenize;
//!
//! let tokens = tokenize("La Dra. Gómez vive en Av. Belgrano 450.");
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["La", "Dra.", "Gómez", "vive", "en", "Av.", "Belgrano", "450", "."]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Pérez", ",", "30123456").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista.
    pub index: usize,
}

impl Token {
    /// Primeira letra maiúscula (ex: "Jujuy", "DNI").
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().map(char::is_uppercase).unwrap_or(false)
    }

    /// Forma normalizada usada pelos gazetteers: minúsculas, sem ponto final.
    pub fn normalized(&self) -> String {
        self.text.trim_end_matches('.').to_lowercase()
    }
}

/// Abreviações do espanhol jurídico/administrativo que "engolem" o ponto seguinte.
const ABBREVIATIONS: &[&str] = &[
    "Dr", "Dra", "Sr", "Sra", "Srta", "Sres", "Lic", "Ing", "Prof", "Arq",
    "Cdor", "Cra", "Esc", "Av", "Avda", "Bº", "Bo", "Dpto", "Depto", "Pje",
    "Nro", "Nº", "N", "Art", "Inc", "Expte", "Fs", "Pág", "Tel", "Cel",
    "Gral", "Cnel", "Tte", "Sgto", "Cap", "Sta", "Sto", "etc",
];

/// Tokeniza um texto em espanhol.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();

    for (start, segment) in text.split_word_bound_indices() {
        if segment.chars().all(char::is_whitespace) {
            continue;
        }

        // "Dr" + "." → "Dr."
        if segment == "." {
            if let Some(last) = tokens.last_mut() {
                if last.end == start && ABBREVIATIONS.contains(&last.text.as_str()) {
                    last.text.push('.');
                    last.end = start + 1;
                    continue;
                }
            }
        }

        tokens.push(Token {
            text: segment.to_string(),
            start,
            end: start + segment.len(),
            index: 0,
        });
    }

    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}
