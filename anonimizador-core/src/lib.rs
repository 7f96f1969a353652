//! # anonimizador-core — Anonimização de PII em Textos em Espanhol
//!
//! Este crate substitui dados pessoais (nomes, lugares, organizações, DNI,
//! endereços, telefones e e-mails) por placeholders fixos, combinando um
//! reconhecedor de entidades estatístico com detectores de padrões.
//!
//! ## Arquitetura do Sistema
//!
//! O texto atravessa cinco passos em ordem fixa; a saída de um é a entrada do próximo:
//!
//! 1.  **Entidades** ([`recognizer`]): tokenização ([`tokenizer`]), features ([`features`]),
//!     CRF + Viterbi ([`crf`], [`viterbi`]) e regras ([`rule_based`]) produzem spans
//!     PER/LOC/ORG/MISC; os três primeiros viram `PER_ANONIMIZADO` etc.
//! 2.  **DNI** ([`detector`], [`rules`]): `30.123.456` ou `30123456`.
//! 3.  **Endereço**: `Calle San Martín 123`.
//! 4.  **Telefone**: só se o [`validator`] confirmar.
//! 5.  **E-mail**: só se o [`validator`] confirmar.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use anonimizador_core::Anonymizer;
//!
//! let anonymizer = Anonymizer::new().unwrap();
//! let text = "Juan Pérez vive en Calle San Martín 123 y su DNI es 30123456";
//! let out = anonymizer.anonymize(text).unwrap();
//! assert_eq!(out, "PER_ANONIMIZADO vive en DIRECCION_ANONIMIZADA y su DNI es DNI_ANONIMIZADO");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: o [`Anonymizer`] e seus eventos.
//! - [`document`]: parágrafos e tabelas, em paralelo.
//! - [`config`]: configuração em JSON.

pub mod config;
pub mod crf;
pub mod detector;
pub mod document;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod model;
pub mod pipeline;
pub mod recognizer;
pub mod rule_based;
pub mod rules;
pub mod tagger;
pub mod tokenizer;
pub mod validator;
pub mod viterbi;

pub use config::{AnonymizerConfig, EntityReplacement};
pub use document::{anonymize_document, Document, OutputFormat};
pub use error::{AnonymizeError, Result, ValidationError};
pub use pipeline::{AnonymizationReport, Anonymizer, AnonymizerBuilder, PipelineEvent};
pub use recognizer::{EntityRecognizer, HybridRecognizer};
pub use rules::{Category, PassKind, Redaction};
pub use tagger::{EntityCategory, EntitySpan, Tag, TaggedToken};
pub use tokenizer::Token;
pub use validator::{EmailValidator, PhoneValidator, Verdict};
