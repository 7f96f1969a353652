//! # Esquema de Tags BIO e Tipos de Entidade
//!
//! O reconhecedor rotula cada token com uma tag **BIO** e depois reagrupa
//! os tokens em spans de entidade.
//!
//! | Prefixo | Significado      | Exemplos                               |
//! |---------|------------------|----------------------------------------|
//! | PER     | Pessoa           | Juan Pérez, Dra. María Gómez           |
//! | ORG     | Organização      | Juzgado de Control, Banco Macro        |
//! | LOC     | Local            | San Salvador de Jujuy, Palpalá         |
//! | MISC    | Miscelânea       | Código Penal (não é anonimizado)       |
//! | O       | Fora de entidade |                                        |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Categorias de entidade produzidas pelo reconhecedor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    #[serde(rename = "PER")]
    Per,
    #[serde(rename = "ORG")]
    Org,
    #[serde(rename = "LOC")]
    Loc,
    /// Leis, códigos, eventos. Reconhecida, mas nunca substituída.
    #[serde(rename = "MISC")]
    Misc,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [
        EntityCategory::Per,
        EntityCategory::Org,
        EntityCategory::Loc,
        EntityCategory::Misc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::Per => "PER",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }
}

impl FromStr for EntityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PER" => Ok(EntityCategory::Per),
            "ORG" => Ok(EntityCategory::Org),
            "LOC" => Ok(EntityCategory::Loc),
            "MISC" => Ok(EntityCategory::Misc),
            other => Err(format!("categoria desconhecida: {other}")),
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Begin(EntityCategory),
    Inside(EntityCategory),
    Outside,
}

impl Tag {
    /// Número total de tags possíveis
    pub const COUNT: usize = 9;

    /// Representação textual da tag (ex: "B-PER", "I-ORG", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{}", cat.name()),
            Tag::Inside(cat) => format!("I-{}", cat.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Índice 0..9 da tag nas matrizes do CRF.
    pub fn index(&self) -> usize {
        let offset = |cat: &EntityCategory| match cat {
            EntityCategory::Per => 1,
            EntityCategory::Org => 3,
            EntityCategory::Loc => 5,
            EntityCategory::Misc => 7,
        };
        match self {
            Tag::Outside => 0,
            Tag::Begin(cat) => offset(cat),
            Tag::Inside(cat) => offset(cat) + 1,
        }
    }

    /// Todas as tags, na ordem de [`Tag::index`].
    pub fn all() -> [Tag; Tag::COUNT] {
        let mut tags = [Tag::Outside; Tag::COUNT];
        for cat in EntityCategory::ALL {
            tags[Tag::Begin(cat).index()] = Tag::Begin(cat);
            tags[Tag::Inside(cat).index()] = Tag::Inside(cat);
        }
        tags
    }

    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// `I-X` só pode seguir `B-X` ou `I-X`.
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(cat) => match prev {
                Tag::Begin(prev_cat) | Tag::Inside(prev_cat) => prev_cat == cat,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Parseia uma tag a partir de string (ex: "B-PER" → Begin(Per))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, cat) = s.split_once('-')?;
        let cat = cat.parse().ok()?;
        match prefix {
            "B" => Some(Tag::Begin(cat)),
            "I" => Some(Tag::Inside(cat)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Um token com sua tag BIO e confiança
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: Token,
    pub tag: Tag,
    pub confidence: f64,
    /// Regra que decidiu a tag, ou "crf".
    pub source: String,
}

/// Uma entidade reconhecida (span de um ou mais tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto exato da entidade no original (ex: "Juan Pérez")
    pub text: String,
    pub category: EntityCategory,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    /// Offset de byte inicial no texto original
    pub start: usize,
    /// Offset de byte final no texto original (exclusivo)
    pub end: usize,
    /// Confiança média dos tokens
    pub confidence: f64,
    /// Fonte do primeiro token: nome da regra ou "crf"
    pub source: String,
}

/// Converte a sequência BIO em spans de entidade.
///
/// Um span começa em `B-X` e continua enquanto houver `I-X` da mesma categoria.
/// Um `I-X` órfão (sem `B-X` antes) também abre um span, para não perder entidades
/// quando regras e CRF discordam na fronteira. Uma quebra de linha sempre fecha o span.
pub fn tokens_to_spans(tagged: &[TaggedToken], original_text: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < tagged.len() {
        let cat = match tagged[i].tag {
            Tag::Begin(cat) | Tag::Inside(cat) => cat,
            Tag::Outside => {
                i += 1;
                continue;
            }
        };

        let first = &tagged[i];
        let mut last = first;
        let mut conf_sum = first.confidence;
        let mut count = 1usize;

        let mut j = i + 1;
        while j < tagged.len()
            && tagged[j].tag == Tag::Inside(cat)
            && !original_text[last.token.end..tagged[j].token.start].contains('\n')
        {
            last = &tagged[j];
            conf_sum += tagged[j].confidence;
            count += 1;
            j += 1;
        }

        spans.push(EntitySpan {
            text: original_text[first.token.start..last.token.end].to_string(),
            category: cat,
            start_token: first.token.index,
            end_token: last.token.index,
            start: first.token.start,
            end: last.token.end,
            confidence: conf_sum / count as f64,
            source: first.source.clone(),
        });

        i = j;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn tag_all(text: &str, tags: &[Tag]) -> Vec<TaggedToken> {
        tokenize(text)
            .into_iter()
            .zip(tags)
            .map(|(token, tag)| TaggedToken { token, tag: *tag, confidence: 1.0, source: "test".into() })
            .collect()
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin(EntityCategory::Per).label(), "B-PER");
        assert_eq!(Tag::Inside(EntityCategory::Loc).label(), "I-LOC");
    }

    #[test]
    fn test_valid_transitions() {
        let b_per = Tag::Begin(EntityCategory::Per);
        let i_per = Tag::Inside(EntityCategory::Per);
        assert!(Tag::is_valid_transition(&b_per, &i_per));
        assert!(!Tag::is_valid_transition(&Tag::Outside, &i_per));
        assert!(!Tag::is_valid_transition(&Tag::Begin(EntityCategory::Org), &i_per));
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B-PER"), Some(Tag::Begin(EntityCategory::Per)));
        assert_eq!(Tag::from_label("I-LOC"), Some(Tag::Inside(EntityCategory::Loc)));
        assert_eq!(Tag::from_label("X-PER"), None);
        assert_eq!(Tag::from_label("B-FOO"), None);
    }

    #[test]
    fn test_all_tags_match_their_index() {
        for (i, tag) in Tag::all().iter().enumerate() {
            assert_eq!(tag.index(), i);
        }
    }

    #[test]
    fn test_spans_from_bio() {
        let per = EntityCategory::Per;
        let text = "Juan Pérez vive en Jujuy";
        let tagged = tag_all(
            text,
            &[Tag::Begin(per), Tag::Inside(per), Tag::Outside, Tag::Outside, Tag::Begin(EntityCategory::Loc)],
        );
        let spans = tokens_to_spans(&tagged, text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Juan Pérez");
        assert_eq!(spans[0].category, per);
        assert_eq!((spans[0].start, spans[0].end), (0, "Juan Pérez".len()));
        assert_eq!(spans[1].text, "Jujuy");
    }

    #[test]
    fn test_line_break_closes_span() {
        let per = EntityCategory::Per;
        let text = "Juan Pérez\nMaría Gómez";
        let tagged = tag_all(text, &[Tag::Begin(per), Tag::Inside(per), Tag::Inside(per), Tag::Inside(per)]);
        let spans = tokens_to_spans(&tagged, text);
        let found: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(found, vec!["Juan Pérez", "María Gómez"]);
    }

    #[test]
    fn test_orphan_inside_opens_span() {
        let text = "vive Pérez";
        let tagged = tag_all(text, &[Tag::Outside, Tag::Inside(EntityCategory::Per)]);
        let spans = tokens_to_spans(&tagged, text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Pérez");
    }
}
