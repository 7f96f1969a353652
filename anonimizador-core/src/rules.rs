//! # Categorias, Placeholders e Passos
//!
//! Cada categoria de PII tem um placeholder fixo. Os passos do pipeline rodam
//! sempre na mesma ordem:
//!
//! | Passo      | Detecção                         | Validação   | Placeholder              |
//! |------------|----------------------------------|-------------|--------------------------|
//! | `entities` | reconhecedor (PER, LOC, ORG)     | —           | `PER_ANONIMIZADO` etc.   |
//! | `dni`      | regex                            | —           | `DNI_ANONIMIZADO`        |
//! | `address`  | regex                            | —           | `DIRECCION_ANONIMIZADA`  |
//! | `phone`    | regex                            | telefone    | `TELEFONO_ANONIMIZADO`   |
//! | `email`    | regex                            | e-mail      | `EMAIL_ANONIMIZADO`      |

use serde::{Deserialize, Serialize};

use crate::tagger::EntityCategory;

/// DNI argentino: `30.123.456` ou `30123456`.
pub const DNI_PATTERN: &str = r"\b(?:\d{2}\.\d{3}\.\d{3}|\d{8})\b";

/// Palavra-chave de via + uma ou duas palavras capitalizadas + número + letra opcional.
pub const ADDRESS_PATTERN: &str = r"\b(?:Calle|Av\.|Avenida|Ruta|Pasaje)\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)?\s+\d+(?:[A-Za-z]|\s[A-Z])?\b";

pub const PHONE_PATTERN: &str = r"\+?\d{1,3}[-.\s]?\d{3,4}[-.\s]?\d{4}\b";

pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// Categoria de PII substituída pelo pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Per,
    Loc,
    Org,
    Dni,
    Address,
    Phone,
    Email,
}

impl Category {
    pub fn placeholder(&self) -> &'static str {
        match self {
            Category::Per => "PER_ANONIMIZADO",
            Category::Loc => "LOC_ANONIMIZADO",
            Category::Org => "ORG_ANONIMIZADO",
            Category::Dni => "DNI_ANONIMIZADO",
            Category::Address => "DIRECCION_ANONIMIZADA",
            Category::Phone => "TELEFONO_ANONIMIZADO",
            Category::Email => "EMAIL_ANONIMIZADO",
        }
    }

    /// Categoria substituível de uma entidade; `MISC` não tem.
    pub fn from_entity(category: EntityCategory) -> Option<Self> {
        match category {
            EntityCategory::Per => Some(Category::Per),
            EntityCategory::Loc => Some(Category::Loc),
            EntityCategory::Org => Some(Category::Org),
            EntityCategory::Misc => None,
        }
    }
}

/// Passo do pipeline, na ordem de execução.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    Entities,
    Dni,
    Address,
    Phone,
    Email,
}

impl PassKind {
    pub const ALL: [PassKind; 5] = [
        PassKind::Entities,
        PassKind::Dni,
        PassKind::Address,
        PassKind::Phone,
        PassKind::Email,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PassKind::Entities => "entities",
            PassKind::Dni => "dni",
            PassKind::Address => "address",
            PassKind::Phone => "phone",
            PassKind::Email => "email",
        }
    }

    /// Regex do passo; `None` para o passo de entidades.
    pub fn pattern(&self) -> Option<&'static str> {
        match self {
            PassKind::Entities => None,
            PassKind::Dni => Some(DNI_PATTERN),
            PassKind::Address => Some(ADDRESS_PATTERN),
            PassKind::Phone => Some(PHONE_PATTERN),
            PassKind::Email => Some(EMAIL_PATTERN),
        }
    }

    /// Categoria dos passos de regex.
    pub fn category(&self) -> Option<Category> {
        match self {
            PassKind::Entities => None,
            PassKind::Dni => Some(Category::Dni),
            PassKind::Address => Some(Category::Address),
            PassKind::Phone => Some(Category::Phone),
            PassKind::Email => Some(Category::Email),
        }
    }
}

impl std::fmt::Display for PassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Uma substituição feita por um passo.
///
/// Offsets de byte referem-se ao texto **de entrada daquele passo**.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redaction {
    pub pass: PassKind,
    pub category: Category,
    pub original: String,
    pub start: usize,
    pub end: usize,
    pub placeholder: String,
}
