//! # Viterbi — Decodificação do CRF
//!
//! Programação dinâmica `O(N × T²)` que encontra a sequência de tags de maior
//! score:
//!
//! ```text
//! viterbi[0][t] = emission(t, x_0)
//! viterbi[i][t] = max_{t'} [viterbi[i-1][t'] + transition(t', t) - bio(t', t)] + emission(t, x_i)
//! ```
//!
//! seguida de backtracking pelos ponteiros. `bio(t', t)` penaliza transições
//! que quebram o esquema BIO dentro do próprio argmax.

use serde::{Deserialize, Serialize};

use crate::crf::{compute_emission_scores, CrfModel};
use crate::features::FeatureVector;
use crate::tagger::Tag;

/// Penalidade extra para transições que quebram o esquema BIO (`O → I-X`).
const INVALID_TRANSITION_PENALTY: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// Melhor sequência de tags (uma por token)
    pub best_sequence: Vec<Tag>,
    /// Score não normalizado da melhor sequência
    pub best_score: f64,
    /// Confiança (softmax sobre as tags no passo `i`) da tag escolhida para cada token
    pub confidences: Vec<f64>,
}

pub fn viterbi_decode(model: &CrfModel, feature_vectors: &[FeatureVector]) -> ViterbiResult {
    if feature_vectors.is_empty() {
        return ViterbiResult {
            best_sequence: vec![],
            best_score: 0.0,
            confidences: vec![],
        };
    }

    let n_tokens = feature_vectors.len();
    let tags = Tag::all();
    let n_tags = tags.len();
    let emission = compute_emission_scores(model, feature_vectors);

    // table[i][t]: melhor score acumulado terminando no token i com a tag t
    let mut table: Vec<Vec<f64>> = Vec::with_capacity(n_tokens);
    let mut backptr: Vec<Vec<usize>> = vec![vec![0usize; n_tags]; n_tokens];

    // Início de sequência se comporta como se viesse de `O`
    table.push((0..n_tags).map(|t| emission[0][t] - bio_penalty(&Tag::Outside, &tags[t])).collect());

    for i in 1..n_tokens {
        let prev_row = &table[i - 1];
        let mut row = vec![f64::NEG_INFINITY; n_tags];

        for t in 0..n_tags {
            let (best_prev, best_prev_score) = (0..n_tags)
                .map(|p| {
                    let score = prev_row[p] + model.transition_score(&tags[p], &tags[t]) - bio_penalty(&tags[p], &tags[t]);
                    (p, score)
                })
                .fold((0, f64::NEG_INFINITY), |best, cand| if cand.1 > best.1 { cand } else { best });

            row[t] = best_prev_score + emission[i][t];
            backptr[i][t] = best_prev;
        }
        table.push(row);
    }

    // === Backtracking ===
    let (mut best_last, best_score) = best_in_slice(&table[n_tokens - 1]);
    let mut best_sequence = vec![Tag::Outside; n_tokens];
    best_sequence[n_tokens - 1] = tags[best_last];
    for i in (0..n_tokens - 1).rev() {
        best_last = backptr[i + 1][best_last];
        best_sequence[i] = tags[best_last];
    }

    let confidences = best_sequence
        .iter()
        .zip(&table)
        .map(|(tag, row)| scores_to_probs(row)[tag.index()])
        .collect();

    ViterbiResult {
        best_sequence,
        best_score,
        confidences,
    }
}

fn bio_penalty(prev: &Tag, next: &Tag) -> f64 {
    if Tag::is_valid_transition(prev, next) {
        0.0
    } else {
        INVALID_TRANSITION_PENALTY
    }
}

fn best_in_slice(scores: &[f64]) -> (usize, f64) {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, &v)| (i, v))
        .unwrap_or((0, f64::NEG_INFINITY))
}

/// Softmax numericamente estável.
pub fn scores_to_probs(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return vec![];
    }
    let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|&s| (s - max_score).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return vec![1.0 / scores.len() as f64; scores.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    fn fv(index: usize, capitalized: bool) -> FeatureVector {
        let mut fv = FeatureVector::new(index);
        fv.insert("bias", 1.0);
        if capitalized {
            fv.insert("is_capitalized", 1.0);
        }
        fv
    }

    fn toy_model() -> CrfModel {
        let mut model = CrfModel::new();
        let b_per = Tag::Begin(EntityCategory::Per);
        let i_per = Tag::Inside(EntityCategory::Per);
        model.set_emission("is_capitalized", &b_per, 3.0);
        model.set_emission("is_capitalized", &i_per, 2.0);
        model.set_emission("bias", &Tag::Outside, 2.0);
        model.set_transition(&b_per, &i_per, 3.0);
        model
    }

    #[test]
    fn test_capitalized_pair_becomes_begin_inside() {
        let result = viterbi_decode(&toy_model(), &[fv(0, true), fv(1, true), fv(2, false)]);
        assert_eq!(
            result.best_sequence,
            vec![Tag::Begin(EntityCategory::Per), Tag::Inside(EntityCategory::Per), Tag::Outside]
        );
        assert_eq!(result.confidences.len(), 3);
        assert!(result.confidences.iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn test_orphan_inside_is_avoided() {
        // Sem B-PER antes, I-PER só poderia vir de O → I-PER (inválida)
        let mut model = CrfModel::new();
        model.set_emission("bias", &Tag::Inside(EntityCategory::Per), 1.5);
        model.set_emission("bias", &Tag::Outside, 1.0);
        let result = viterbi_decode(&model, &[fv(0, false), fv(1, false)]);
        assert_eq!(result.best_sequence, vec![Tag::Outside, Tag::Outside]);
    }

    #[test]
    fn test_valid_predecessor_beats_higher_invalid_one() {
        // O tem o maior score no token 0, mas O → I-PER é inválida
        let b_per = Tag::Begin(EntityCategory::Per);
        let i_per = Tag::Inside(EntityCategory::Per);
        let mut model = CrfModel::new();
        model.set_emission("primeiro", &Tag::Outside, 3.0);
        model.set_emission("primeiro", &b_per, 2.5);
        model.set_emission("segundo", &i_per, 5.0);

        let mut first = FeatureVector::new(0);
        first.insert("primeiro", 1.0);
        let mut second = FeatureVector::new(1);
        second.insert("segundo", 1.0);

        let result = viterbi_decode(&model, &[first, second]);
        assert_eq!(result.best_sequence, vec![b_per, i_per]);
        assert!((result.best_score - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_viterbi_empty() {
        let result = viterbi_decode(&CrfModel::new(), &[]);
        assert!(result.best_sequence.is_empty());
        assert!(result.confidences.is_empty());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = scores_to_probs(&[1.0, 2.0, 3.0, 0.5, -1.0]);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
