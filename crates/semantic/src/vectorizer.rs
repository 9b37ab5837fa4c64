use crate::error::VectorizationError;
use crate::tokenizer::tokenize_document;
use crate::{MAX_VOCABULARY, SEMANTIC_SIZE};
use redundancy_protocol::TestRecord;
use std::collections::HashMap;
use std::path::Path;

/// Resolves the text a test is vectorized from.
///
/// An explicit `source_text` is always used as-is, even when empty (the
/// document then degenerates to the synthetic marker). A missing source with
/// an existing `path` is read from disk; a missing source with a missing
/// path aborts the run.
pub fn resolve_source(record: &TestRecord) -> Result<String, VectorizationError> {
    if let Some(text) = &record.source_text {
        return Ok(text.clone());
    }
    let path = Path::new(&record.path);
    std::fs::read_to_string(path).map_err(|err| {
        VectorizationError::new(
            &record.test_id,
            format!("source file '{}' unavailable: {err}", record.path),
        )
    })
}

/// Corpus TF-IDF vectorizer. One instance per run; the vocabulary is fitted
/// once and shared by every vector so positions stay comparable.
#[derive(Debug)]
pub struct SemanticVectorizer {
    vocabulary: Vec<String>,
}

impl SemanticVectorizer {
    /// Tokenizes every record and produces `test_id -> [f64; 384]`.
    ///
    /// Vocabulary: the `min(768, distinct)` most frequent corpus terms
    /// (count-descending, term-ascending tie-break), indexed in lexicographic
    /// order — the same under any permutation of the input records.
    pub fn fit_transform(
        records: &[TestRecord],
    ) -> Result<(Self, HashMap<String, Vec<f64>>), VectorizationError> {
        if records.is_empty() {
            return Ok((
                Self {
                    vocabulary: Vec::new(),
                },
                HashMap::new(),
            ));
        }

        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            let source = resolve_source(record)?;
            let class_name = record
                .test_id
                .split("::")
                .next()
                .unwrap_or(&record.test_id);
            documents.push(tokenize_document(&source, &record.method, class_name));
        }

        let vocabulary = build_vocabulary(&documents);
        log::debug!(
            "semantic vocabulary: {} terms over {} documents",
            vocabulary.len(),
            documents.len()
        );

        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        // Document frequency per vocabulary term.
        let mut df = vec![0usize; vocabulary.len()];
        for doc in &documents {
            let mut seen = vec![false; vocabulary.len()];
            for token in doc {
                if let Some(&i) = index.get(token.as_str()) {
                    if !seen[i] {
                        seen[i] = true;
                        df[i] += 1;
                    }
                }
            }
        }

        // log(N/df) + 1: terms shared by every document keep weight 1 so two
        // byte-identical tests still land at cosine ~1.0.
        let doc_count = documents.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&count| {
                if count > 0 {
                    (doc_count / count as f64).ln() + 1.0
                } else {
                    0.0
                }
            })
            .collect();

        let mut vectors = HashMap::with_capacity(records.len());
        for (record, doc) in records.iter().zip(&documents) {
            let vector = vectorize_one(doc, &index, &idf, vocabulary.len());
            vectors.insert(record.test_id.clone(), vector);
        }

        log::info!("built {} semantic vectors", vectors.len());
        Ok((Self { vocabulary }, vectors))
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

/// Top `min(768, distinct)` corpus terms by total count, then lexicographic
/// index assignment.
fn build_vocabulary(documents: &[Vec<String>]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for doc in documents {
        for token in doc {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(&str, usize)> = counts.into_iter().collect();
    terms.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    terms.truncate(MAX_VOCABULARY);

    let mut vocabulary: Vec<String> = terms.into_iter().map(|(term, _)| term.to_string()).collect();
    vocabulary.sort_unstable();
    vocabulary
}

/// TF-IDF for one document, resized to `SEMANTIC_SIZE` (positional prefix or
/// zero pad) and L2-normalized. An empty document stays the zero vector.
fn vectorize_one(
    doc: &[String],
    index: &HashMap<&str, usize>,
    idf: &[f64],
    vocab_len: usize,
) -> Vec<f64> {
    let mut tf = vec![0.0f64; vocab_len];
    for token in doc {
        if let Some(&i) = index.get(token.as_str()) {
            tf[i] += 1.0;
        }
    }
    if !doc.is_empty() {
        let total = doc.len() as f64;
        for value in &mut tf {
            *value /= total;
        }
    }

    let mut tfidf: Vec<f64> = tf.iter().zip(idf.iter()).map(|(t, i)| t * i).collect();
    tfidf.resize(SEMANTIC_SIZE, 0.0);

    let norm = tfidf.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in &mut tfidf {
            *value /= norm;
        }
    }
    tfidf
}
