//! Answer post-processing: the authoritative "cite or refuse" enforcement.
//!
//! The generative model is instructed to cite or refuse, but instruction
//! following is not guaranteed. Every raw answer passes through
//! [`AnswerFormatter::format`], which recognizes the refusal string
//! regardless of casing and spacing, extracts citations best-effort, and
//! appends one when the model forgot.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::SearchResult;

/// The fixed literal output required when no retrieved fragment supports
/// an answer.
pub const REFUSAL: &str = "Não encontrei essa informação nas normas disponíveis.";

/// Matches a citation clause such as `(Fonte: a.pdf, b.pdf / Seção: 5.1)`.
static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(Fonte:\s*([^)]+)\)").expect("valid citation pattern"));

/// A finished answer with the set of source documents it cites.
///
/// Invariant: `cited_sources` is empty if and only if `text` equals
/// [`REFUSAL`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The answer text, citation clause included when sources were used.
    pub text: String,
    /// Source document ids backing the answer.
    pub cited_sources: BTreeSet<String>,
}

impl Answer {
    /// The refusal answer: the exact refusal string and no sources.
    pub fn refusal() -> Self {
        Self { text: REFUSAL.to_string(), cited_sources: BTreeSet::new() }
    }

    /// Whether this answer is the refusal.
    pub fn is_refusal(&self) -> bool {
        self.text == REFUSAL
    }
}

/// Best-effort outcome of scanning model output for cited sources.
enum CitedSources {
    Found(BTreeSet<String>),
    NotFound,
}

/// Lowercase and collapse all whitespace for tolerant comparison.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Post-processes raw model output into an [`Answer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerFormatter;

impl AnswerFormatter {
    /// Create a new `AnswerFormatter`.
    pub fn new() -> Self {
        Self
    }

    /// Reconcile `raw_answer` with the citation/refusal contract.
    ///
    /// Rules, in order:
    /// 1. A refusal (matched case- and whitespace-insensitively, ignoring
    ///    any spurious citation clause) becomes exactly
    ///    [`Answer::refusal`], whatever `results` contains.
    /// 2. Otherwise cited sources are extracted from the text. If none are
    ///    found and `results` is non-empty, a citation clause listing the
    ///    retrieved sources is appended so every grounded answer carries at
    ///    least one citation.
    pub fn format(&self, raw_answer: &str, results: &[SearchResult]) -> Answer {
        let stripped = CITATION_RE.replace_all(raw_answer, "");
        if normalize(&stripped) == normalize(REFUSAL) {
            return Answer::refusal();
        }

        let known: BTreeSet<String> =
            results.iter().map(|r| r.fragment.document_id.clone()).collect();

        match extract_cited(raw_answer, &known) {
            CitedSources::Found(cited) => {
                Answer { text: raw_answer.trim().to_string(), cited_sources: cited }
            }
            CitedSources::NotFound if known.is_empty() => {
                // Nothing was retrieved and the model did not refuse; there
                // is no source to attach, so the text stands on its own.
                Answer { text: raw_answer.trim().to_string(), cited_sources: BTreeSet::new() }
            }
            CitedSources::NotFound => {
                debug!(source_count = known.len(), "model omitted citation, appending");
                let listed = known.iter().cloned().collect::<Vec<_>>().join(", ");
                Answer {
                    text: format!("{}\n(Fonte: {listed})", raw_answer.trim_end()),
                    cited_sources: known,
                }
            }
        }
    }
}

/// Extract source identifiers cited in `text`.
///
/// Two signals are combined: identifiers listed inside `(Fonte: ...)`
/// clauses (the section part after `/` is ignored) and any known retrieval
/// source id appearing verbatim in the text. The result is never trusted
/// as sole enforcement; rule 2 of the formatter is the real guarantee.
fn extract_cited(text: &str, known: &BTreeSet<String>) -> CitedSources {
    let mut cited = BTreeSet::new();

    for capture in CITATION_RE.captures_iter(text) {
        let listed = capture[1].split('/').next().unwrap_or("");
        for name in listed.split(',') {
            let name = name.trim();
            if name.to_lowercase().ends_with(".pdf") {
                cited.insert(name.to_string());
            }
        }
    }

    for id in known {
        if text.contains(id.as_str()) {
            cited.insert(id.clone());
        }
    }

    if cited.is_empty() { CitedSources::NotFound } else { CitedSources::Found(cited) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Fragment;

    fn result(doc: &str) -> SearchResult {
        SearchResult {
            fragment: Fragment {
                document_id: doc.to_string(),
                text: "trecho".to_string(),
                start_offset: 0,
                embedding: vec![1.0],
            },
            score: 0.8,
        }
    }

    #[test]
    fn exact_refusal_yields_refusal_answer() {
        let answer = AnswerFormatter::new().format(REFUSAL, &[result("A.pdf")]);
        assert_eq!(answer, Answer::refusal());
    }

    #[test]
    fn refusal_is_matched_case_and_whitespace_insensitively() {
        let raw = "  NÃO ENCONTREI   essa informação nas normas disponíveis. ";
        let answer = AnswerFormatter::new().format(raw, &[result("A.pdf")]);
        assert_eq!(answer.text, REFUSAL);
        assert!(answer.cited_sources.is_empty());
    }

    #[test]
    fn refusal_with_spurious_citation_still_refuses() {
        let raw = format!("{REFUSAL}\n(Fonte: A.pdf)");
        let answer = AnswerFormatter::new().format(&raw, &[result("A.pdf")]);
        assert_eq!(answer, Answer::refusal());
    }

    #[test]
    fn citation_clause_is_parsed_for_sources() {
        let raw = "A tensão nominal é 220 V.\n(Fonte: NBR-5410.pdf, NBR-5419.pdf / Seção: 4.2)";
        let answer = AnswerFormatter::new().format(raw, &[]);
        assert_eq!(
            answer.cited_sources,
            BTreeSet::from(["NBR-5410.pdf".to_string(), "NBR-5419.pdf".to_string()])
        );
        assert_eq!(answer.text, raw);
    }

    #[test]
    fn known_source_mentioned_inline_counts_as_citation() {
        let raw = "Conforme NBR-5410.pdf, a seção mínima é 2,5 mm².";
        let answer = AnswerFormatter::new().format(raw, &[result("NBR-5410.pdf")]);
        assert_eq!(answer.cited_sources, BTreeSet::from(["NBR-5410.pdf".to_string()]));
        assert_eq!(answer.text, raw);
    }

    #[test]
    fn missing_citation_is_appended_from_retrieval() {
        let raw = "A seção mínima é 2,5 mm².";
        let answer =
            AnswerFormatter::new().format(raw, &[result("B.pdf"), result("A.pdf")]);
        assert!(answer.text.starts_with(raw));
        assert!(answer.text.ends_with("(Fonte: A.pdf, B.pdf)"));
        assert_eq!(
            answer.cited_sources,
            BTreeSet::from(["A.pdf".to_string(), "B.pdf".to_string()])
        );
    }

    #[test]
    fn non_refusal_with_empty_retrieval_keeps_text_unchanged() {
        let answer = AnswerFormatter::new().format("Resposta qualquer.", &[]);
        assert_eq!(answer.text, "Resposta qualquer.");
        assert!(answer.cited_sources.is_empty());
    }

    #[test]
    fn grounded_answers_always_carry_a_citation() {
        // The invariant behind rule 2: non-refusal plus non-empty retrieval
        // implies non-empty cited_sources.
        let answer = AnswerFormatter::new().format("Qualquer texto.", &[result("A.pdf")]);
        assert!(!answer.is_refusal());
        assert!(!answer.cited_sources.is_empty());
    }
}
