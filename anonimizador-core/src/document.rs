//! # Documentos
//!
//! Um documento é uma lista de parágrafos mais tabelas (linhas de células),
//! a estrutura que um leitor DOCX externo produz. Cada parágrafo e cada célula
//! não vazios passam pelo pipeline de forma independente, em paralelo (rayon).
//!
//! Apenas texto puro é lido e escrito aqui; DOCX e PDF ficam com
//! colaboradores externos.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::pipeline::Anonymizer;

/// Tabela: linhas de células.
pub type Table = Vec<Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Document {
    /// Um parágrafo por linha.
    pub fn from_plain_text(text: &str) -> Self {
        Self {
            paragraphs: text.lines().map(str::to_string).collect(),
            tables: vec![],
        }
    }

    /// Parágrafos não vazios unidos por `\n`, como na saída TXT/PDF.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Anonimiza todos os parágrafos e células; falha inteira se qualquer um falhar.
pub fn anonymize_document(anonymizer: &Anonymizer, document: &Document) -> Result<Document> {
    let paragraphs = document
        .paragraphs
        .par_iter()
        .map(|p| anonymize_unit(anonymizer, p))
        .collect::<Result<Vec<_>>>()?;

    let tables = document
        .tables
        .par_iter()
        .map(|table| {
            table
                .par_iter()
                .map(|row| {
                    row.par_iter()
                        .map(|cell| anonymize_unit(anonymizer, cell))
                        .collect::<Result<Vec<String>>>()
                })
                .collect::<Result<Table>>()
        })
        .collect::<Result<Vec<Table>>>()?;

    info!(
        paragraphs = paragraphs.len(),
        tables = tables.len(),
        "documento anonimizado"
    );
    Ok(Document { paragraphs, tables })
}

fn anonymize_unit(anonymizer: &Anonymizer, text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    anonymizer.anonymize(text)
}

/// Formato do arquivo de saída.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Docx,
    Txt,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Txt => "txt",
            OutputFormat::Pdf => "pdf",
        }
    }
}

/// `<dir>/<nome>_anonimizado.<ext>` ao lado do arquivo de entrada.
pub fn suggested_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_anonimizado.{}", format.extension()))
}

pub fn read_txt(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path)?;
    Ok(Document::from_plain_text(&raw))
}

/// Escreve em UTF-8, criando os diretórios que faltarem.
pub fn write_txt(text: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_paragraphs_untouched() {
        let anonymizer = Anonymizer::new().unwrap();
        let doc = Document {
            paragraphs: vec!["DNI 30123456".into(), "   ".into(), String::new()],
            tables: vec![vec![vec!["Tel. +65 6123 4567".into(), " ".into()]]],
        };
        let out = anonymize_document(&anonymizer, &doc).unwrap();
        assert_eq!(out.paragraphs, vec!["DNI DNI_ANONIMIZADO", "   ", ""]);
        assert_eq!(out.tables[0][0], vec!["Tel. TELEFONO_ANONIMIZADO", " "]);
    }

    #[test]
    fn test_plain_text_skips_blank_paragraphs() {
        let doc = Document {
            paragraphs: vec!["uno".into(), "".into(), "  ".into(), "dos".into()],
            tables: vec![],
        };
        assert_eq!(doc.plain_text(), "uno\ndos");
    }

    #[test]
    fn test_suggested_output_path() {
        let input = Path::new("/datos/denuncia.docx");
        assert_eq!(
            suggested_output_path(input, OutputFormat::Txt),
            PathBuf::from("/datos/denuncia_anonimizado.txt")
        );
        assert_eq!(
            suggested_output_path(input, OutputFormat::Pdf),
            PathBuf::from("/datos/denuncia_anonimizado.pdf")
        );
    }

    #[test]
    fn test_txt_roundtrip_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("salida").join("doc_anonimizado.txt");
        write_txt("Su DNI es DNI_ANONIMIZADO\nFin", &path).unwrap();

        let doc = read_txt(&path).unwrap();
        assert_eq!(doc.paragraphs, vec!["Su DNI es DNI_ANONIMIZADO", "Fin"]);
    }

    #[test]
    fn test_document_json_without_tables() {
        let doc: Document = serde_json::from_str(r#"{"paragraphs": ["hola"]}"#).unwrap();
        assert!(doc.tables.is_empty());
    }
}
