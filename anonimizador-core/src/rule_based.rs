//! # Motor de Regras — Gazetteers e Padrões Contextuais
//!
//! Complementa o CRF com conhecimento explícito do espanhol jurídico:
//! listas de entidades conhecidas e padrões de contexto como
//! "Sra. María Gómez", "Juzgado de Control Nº 2" ou "Transportes Norte S.R.L.".
//!
//! Onde uma regra dispara, ela vence o CRF. Três regras **suprimem** entidades
//! em vez de criá-las: placeholders já inseridos nunca voltam a ser entidade,
//! palavras coladas a um `@` ficam para o passo de e-mail, e os nomes logo
//! após "Calle"/"Av." ficam para o passo de endereço.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::lexicon;
use crate::tagger::{EntityCategory, Tag};
use crate::tokenizer::{tokenize, Token};

/// Uma correspondência de regra: qual token foi marcado e com qual tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMatch {
    pub token_index: usize,
    pub tag: Tag,
    pub rule_name: String,
    pub confidence: f64,
}

/// Máximo de tokens capitalizados aceitos após um título ("Sr. Juan Carlos Pérez Ríos").
const MAX_NAME_TOKENS: usize = 4;
/// Máximo de palavras que antecedem um sufixo societário.
const MAX_COMPANY_TOKENS: usize = 4;
/// Palavras de nome de rua após a palavra-chave ("Calle San Martín").
const MAX_STREET_NAME_TOKENS: usize = 2;

/// Motor de regras com gazetteers e padrões de contexto
pub struct RuleEngine {
    /// Nomes e sobrenomes (normalizados)
    person_names: HashSet<String>,
    /// Entradas de lugar/organização/misc já tokenizadas, mais longas primeiro
    phrases: Vec<(Vec<String>, EntityCategory)>,
    person_titles: HashSet<String>,
    org_heads: HashSet<String>,
    company_suffixes: HashSet<String>,
    street_keywords: HashSet<String>,
    connectors: HashSet<String>,
    non_entities: HashSet<String>,
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl RuleEngine {
    /// Motor sem gazetteers; apenas os padrões de contexto.
    pub fn new() -> Self {
        Self {
            person_names: HashSet::new(),
            phrases: vec![],
            person_titles: to_set(lexicon::PERSON_TITLES),
            org_heads: to_set(lexicon::ORG_HEADS),
            company_suffixes: to_set(lexicon::COMPANY_SUFFIXES),
            street_keywords: to_set(lexicon::STREET_KEYWORDS),
            connectors: to_set(lexicon::CONNECTORS),
            non_entities: to_set(lexicon::NON_ENTITY_WORDS),
        }
    }

    /// Motor completo, com os gazetteers do léxico embutido.
    pub fn from_lexicon() -> Self {
        let mut engine = Self::new();
        for name in lexicon::FIRST_NAMES.iter().chain(lexicon::SURNAMES) {
            engine.add_person(name);
        }
        for loc in lexicon::LOCATIONS {
            engine.add_phrase(loc, EntityCategory::Loc);
        }
        for org in lexicon::ORGANIZATIONS {
            engine.add_phrase(org, EntityCategory::Org);
        }
        for misc in lexicon::MISC {
            engine.add_phrase(misc, EntityCategory::Misc);
        }
        engine
    }

    pub fn add_person(&mut self, name: &str) {
        self.person_names.insert(name.to_lowercase());
    }

    /// Registra uma entrada de uma ou mais palavras.
    pub fn add_phrase(&mut self, phrase: &str, category: EntityCategory) {
        let parts: Vec<String> = tokenize(phrase).iter().map(Token::normalized).collect();
        if parts.is_empty() {
            return;
        }
        self.phrases.push((parts, category));
        self.phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Aplica todas as regras à sequência de tokens.
    ///
    /// Retorna, para cada token, a regra que decidiu sua tag (ou `None`).
    pub fn apply(&self, tokens: &[Token]) -> Vec<Option<RuleMatch>> {
        let norms: Vec<String> = tokens.iter().map(Token::normalized).collect();
        let mut result: Vec<Option<RuleMatch>> = vec![None; tokens.len()];

        self.mark_placeholders(tokens, &mut result);
        self.mark_email_parts(tokens, &mut result);
        self.mark_phrases(tokens, &norms, &mut result);
        self.mark_org_heads(tokens, &norms, &mut result);
        self.mark_company_suffixes(tokens, &norms, &mut result);
        self.mark_titles(tokens, &norms, &mut result);
        self.mark_person_names(tokens, &norms, &mut result);
        self.suppress_street_names(tokens, &norms, &mut result);

        result
    }

    /// 1. Placeholders são sempre `O`: garante a idempotência do pipeline.
    fn mark_placeholders(&self, tokens: &[Token], result: &mut [Option<RuleMatch>]) {
        for (i, token) in tokens.iter().enumerate() {
            if lexicon::is_placeholder(&token.text) {
                set(result, i, Tag::Outside, "placeholder", 1.0);
            }
        }
    }

    /// Tokens colados a um `@` ("SOPORTE@EJEMPLO.COM") são `O`.
    fn mark_email_parts(&self, tokens: &[Token], result: &mut [Option<RuleMatch>]) {
        for at in (0..tokens.len()).filter(|&i| tokens[i].text == "@") {
            set(result, at, Tag::Outside, "email_context", 0.95);
            let mut left = at;
            while left > 0 && tokens[left - 1].end == tokens[left].start {
                left -= 1;
                set(result, left, Tag::Outside, "email_context", 0.95);
            }
            let mut right = at;
            while right + 1 < tokens.len() && tokens[right].end == tokens[right + 1].start {
                right += 1;
                set(result, right, Tag::Outside, "email_context", 0.95);
            }
        }
    }

    /// 2. Gazetteers de várias palavras (maior correspondência primeiro).
    fn mark_phrases(&self, tokens: &[Token], norms: &[String], result: &mut [Option<RuleMatch>]) {
        let mut i = 0;
        'tokens: while i < tokens.len() {
            if result[i].is_some() || !tokens[i].is_capitalized() {
                i += 1;
                continue;
            }
            for (parts, category) in &self.phrases {
                let len = parts.len();
                if i + len > tokens.len() {
                    continue;
                }
                let matches = (0..len).all(|j| result[i + j].is_none() && norms[i + j] == parts[j]);
                if matches {
                    let (rule, confidence) = match category {
                        EntityCategory::Org => ("org_gazetteer", 0.93),
                        EntityCategory::Loc => ("location_gazetteer", 0.90),
                        _ => ("misc_gazetteer", 0.88),
                    };
                    set_span(result, i, i + len - 1, *category, rule, confidence);
                    i += len;
                    continue 'tokens;
                }
            }
            i += 1;
        }
    }

    /// 3. "Juzgado de Control Nº 2", "Ministerio de Seguridad".
    ///
    /// Conectores só entram se uma palavra capitalizada vier depois.
    fn mark_org_heads(&self, tokens: &[Token], norms: &[String], result: &mut [Option<RuleMatch>]) {
        let mut i = 0;
        while i < tokens.len() {
            if result[i].is_some() || !tokens[i].is_capitalized() || !self.org_heads.contains(&norms[i]) {
                i += 1;
                continue;
            }

            let mut last = i;
            let mut j = i + 1;
            while j < tokens.len() && result[j].is_none() {
                let norm = norms[j].as_str();
                let number_follows = tokens.get(j + 1).map(|t| is_number(&t.text)).unwrap_or(false)
                    && result.get(j + 1).map(Option::is_none).unwrap_or(false);

                if matches!(norm, "nº" | "nro" | "n") && number_follows {
                    last = j + 1;
                    j += 2;
                } else if self.is_name_word(&tokens[j], norm) {
                    last = j;
                    j += 1;
                } else if self.connectors.contains(norm) {
                    j += 1;
                } else {
                    break;
                }
            }

            if last > i {
                set_span(result, i, last, EntityCategory::Org, "org_head_pattern", 0.85);
            }
            i = last + 1;
        }
    }

    /// 4. Sufixos societários: "Transportes Quebrada S.R.L."
    fn mark_company_suffixes(&self, tokens: &[Token], norms: &[String], result: &mut [Option<RuleMatch>]) {
        for k in 0..tokens.len() {
            if result[k].is_some() || !tokens[k].is_capitalized() || !self.company_suffixes.contains(&norms[k]) {
                continue;
            }

            let mut first = k;
            while first > 0 && k - first < MAX_COMPANY_TOKENS {
                let p = first - 1;
                if result[p].is_none() && self.is_name_word(&tokens[p], &norms[p]) {
                    first = p;
                } else {
                    break;
                }
            }
            if first == k {
                continue;
            }

            // "S.R.L" + "." colado
            let mut last = k;
            if let Some(next) = tokens.get(k + 1) {
                if next.text == "." && next.start == tokens[k].end && result[k + 1].is_none() {
                    last = k + 1;
                }
            }
            set_span(result, first, last, EntityCategory::Org, "company_suffix", 0.90);
        }
    }

    /// 5. Título seguido de nome: "la Dra. María Gómez", "el imputado Carlos Romero".
    ///
    /// O título em si fica fora da entidade.
    fn mark_titles(&self, tokens: &[Token], norms: &[String], result: &mut [Option<RuleMatch>]) {
        for t in 0..tokens.len() {
            if !self.person_titles.contains(&norms[t]) {
                continue;
            }
            let mut j = t + 1;
            while j < tokens.len() && j - t <= MAX_NAME_TOKENS {
                if result[j].is_some() || self.person_titles.contains(&norms[j]) || !self.is_name_word(&tokens[j], &norms[j]) {
                    break;
                }
                let tag = if j == t + 1 {
                    Tag::Begin(EntityCategory::Per)
                } else {
                    Tag::Inside(EntityCategory::Per)
                };
                set(result, j, tag, "title_pattern", 0.90);
                j += 1;
            }
        }
    }

    /// 6. Nomes e sobrenomes conhecidos; encostado em outra pessoa vira `I-PER`.
    fn mark_person_names(&self, tokens: &[Token], norms: &[String], result: &mut [Option<RuleMatch>]) {
        for i in 0..tokens.len() {
            if result[i].is_some() || !tokens[i].is_capitalized() || !self.person_names.contains(&norms[i]) {
                continue;
            }
            let continues_person = i > 0
                && matches!(
                    result[i - 1].as_ref().map(|m| m.tag),
                    Some(Tag::Begin(EntityCategory::Per)) | Some(Tag::Inside(EntityCategory::Per))
                );
            let tag = if continues_person {
                Tag::Inside(EntityCategory::Per)
            } else {
                Tag::Begin(EntityCategory::Per)
            };
            set(result, i, tag, "person_gazetteer", 0.92);
        }
    }

    /// 7. "Calle San Martín 123": palavra-chave e nome da via viram `O`,
    /// mesmo que outra regra já os tenha marcado.
    fn suppress_street_names(&self, tokens: &[Token], norms: &[String], result: &mut [Option<RuleMatch>]) {
        for i in 0..tokens.len() {
            if !tokens[i].is_capitalized() || !self.street_keywords.contains(&norms[i]) {
                continue;
            }
            set(result, i, Tag::Outside, "street_context", 0.95);
            for j in (i + 1..tokens.len()).take(MAX_STREET_NAME_TOKENS) {
                if !tokens[j].is_capitalized() || lexicon::is_placeholder(&tokens[j].text) {
                    break;
                }
                set(result, j, Tag::Outside, "street_context", 0.95);
            }
        }
    }

    /// Palavra capitalizada que pode compor um nome próprio.
    fn is_name_word(&self, token: &Token, norm: &str) -> bool {
        token.is_capitalized()
            && token.text.chars().any(char::is_alphabetic)
            && !self.non_entities.contains(norm)
            && !lexicon::is_placeholder(&token.text)
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::from_lexicon()
    }
}

fn is_number(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn set(result: &mut [Option<RuleMatch>], i: usize, tag: Tag, rule: &str, confidence: f64) {
    result[i] = Some(RuleMatch {
        token_index: i,
        tag,
        rule_name: rule.to_string(),
        confidence,
    });
}

/// Marca `first..=last` como `B-X I-X ...`.
fn set_span(result: &mut [Option<RuleMatch>], first: usize, last: usize, cat: EntityCategory, rule: &str, confidence: f64) {
    for i in first..=last {
        let tag = if i == first { Tag::Begin(cat) } else { Tag::Inside(cat) };
        set(result, i, tag, rule, confidence);
    }
}
