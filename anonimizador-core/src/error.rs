//! # Erros do Anonimizador
//!
//! Dois níveis de falha:
//!
//! - [`AnonymizeError`]: **fatal**. Aborta a chamada inteira; nenhum texto parcial é devolvido.
//! - [`ValidationError`]: **recuperável**. Fica dentro de um [`Verdict`](crate::validator::Verdict)
//!   e apenas mantém o trecho original no lugar.

use std::path::PathBuf;

use thiserror::Error;

/// Erro fatal do pipeline de anonimização.
#[derive(Debug, Error)]
pub enum AnonymizeError {
    /// O reconhecedor de entidades não conseguiu processar a entrada.
    #[error("falha ao invocar o modelo de entidades: {0}")]
    ModelInvocation(String),

    /// Pesos do modelo não puderam ser carregados do disco.
    #[error("falha ao carregar o modelo em {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    /// Configuração inválida (JSON malformado, região telefônica desconhecida...).
    #[error("configuração inválida: {0}")]
    Config(String),

    /// Padrão regex que não compila.
    #[error("padrão inválido: {0}")]
    Pattern(#[from] regex::Error),

    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),
}

/// Falha recuperável de um validador: o trecho casou com a regex mas não é PII confirmada.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// O número não pôde ser interpretado como telefone.
    #[error("telefone não interpretável: {0}")]
    PhoneParse(String),

    /// O endereço de e-mail é sintaticamente inválido.
    #[error("e-mail inválido: {0}")]
    EmailValidation(String),
}

pub type Result<T> = std::result::Result<T, AnonymizeError>;
