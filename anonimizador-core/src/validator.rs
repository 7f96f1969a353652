//! # Validadores de Telefone e E-mail
//!
//! Um trecho que casa com a regex de telefone ou e-mail só é substituído se o
//! validador confirmar. O resultado é um [`Verdict`]: falhas de parse não são
//! erros do pipeline, apenas mantêm o trecho original.

use std::str::FromStr;

use email_address::EmailAddress;
use phonenumber::country;

use crate::error::{AnonymizeError, Result, ValidationError};

/// Resultado de uma validação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// PII confirmada: o trecho é substituído.
    Valid,
    /// Interpretável, mas não é um valor válido (ex: número inexistente).
    Invalid,
    /// Nem chegou a ser interpretável.
    Malformed(ValidationError),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Motivo legível para manter o trecho; `None` se válido.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid => Some("valor inválido".to_string()),
            Verdict::Malformed(err) => Some(err.to_string()),
        }
    }
}

pub trait PhoneValidator: Send + Sync {
    fn check(&self, candidate: &str) -> Verdict;
}

pub trait EmailValidator: Send + Sync {
    fn check(&self, candidate: &str) -> Verdict;
}

/// Validação pelos metadados do libphonenumber (crate `phonenumber`).
///
/// Sem região padrão, só números com prefixo internacional (`+54 ...`) são
/// interpretáveis.
#[derive(Debug, Clone, Default)]
pub struct LibPhoneValidator {
    default_region: Option<country::Id>,
}

impl LibPhoneValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Região ISO 3166-1 ("AR", "ES") usada para números sem prefixo `+`.
    pub fn with_region(region: Option<&str>) -> Result<Self> {
        let default_region = match region {
            None => None,
            Some(code) => Some(
                code.trim()
                    .to_ascii_uppercase()
                    .parse::<country::Id>()
                    .map_err(|_| AnonymizeError::Config(format!("região telefônica desconhecida: {code}")))?,
            ),
        };
        Ok(Self { default_region })
    }
}

impl PhoneValidator for LibPhoneValidator {
    fn check(&self, candidate: &str) -> Verdict {
        match phonenumber::parse(self.default_region, candidate) {
            Ok(number) if phonenumber::is_valid(&number) => Verdict::Valid,
            Ok(_) => Verdict::Invalid,
            Err(err) => Verdict::Malformed(ValidationError::PhoneParse(err.to_string())),
        }
    }
}

/// Sintaxe RFC 5322 (crate `email_address`) mais regras de domínio.
///
/// Não consulta DNS: entregabilidade fica fora do escopo.
#[derive(Debug, Clone, Default)]
pub struct SyntaxEmailValidator;

impl EmailValidator for SyntaxEmailValidator {
    fn check(&self, candidate: &str) -> Verdict {
        let email = match EmailAddress::from_str(candidate) {
            Ok(email) => email,
            Err(err) => return Verdict::Malformed(ValidationError::EmailValidation(err.to_string())),
        };
        match check_local_part(email.local_part()).and_then(|_| check_domain(email.domain())) {
            Ok(()) => Verdict::Valid,
            Err(reason) => Verdict::Malformed(ValidationError::EmailValidation(reason)),
        }
    }
}

fn check_local_part(local: &str) -> std::result::Result<(), String> {
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err("pontos mal posicionados na parte local".to_string());
    }
    Ok(())
}

fn check_domain(domain: &str) -> std::result::Result<(), String> {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err("domínio sem TLD".to_string());
    }
    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return Err("rótulo de domínio com tamanho inválido".to_string());
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("rótulo de domínio começa ou termina com hífen".to_string());
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("caractere inválido no domínio".to_string());
        }
    }
    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("TLD inválido".to_string());
    }
    Ok(())
}
