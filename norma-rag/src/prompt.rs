//! Prompt assembly with citation and refusal rules.
//!
//! The assembled prompt is the first line of defense of the
//! "cite or refuse" contract; [`AnswerFormatter`](crate::AnswerFormatter)
//! is the authoritative second.

use std::fmt::Write as _;

use crate::answer::REFUSAL;
use crate::document::SearchResult;

/// Builds the single instruction sent to the generative model.
///
/// The prompt contains a fixed directive restricting the answer to the
/// supplied fragments, the fragments themselves tagged with their source
/// document, and the verbatim user question.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    /// Create a new `PromptAssembler`.
    pub fn new() -> Self {
        Self
    }

    /// Assemble the prompt for `question` grounded in `results`.
    ///
    /// With an empty `results` the context section states that no relevant
    /// excerpt was found, steering the model toward the refusal string.
    pub fn assemble(&self, question: &str, results: &[SearchResult]) -> String {
        let mut context = String::new();
        if results.is_empty() {
            context.push_str("(nenhum trecho relevante foi encontrado)\n");
        } else {
            for result in results {
                // Tag each fragment so the model can quote its source back.
                let _ = writeln!(
                    context,
                    "[Fonte: {}]\n{}\n",
                    result.fragment.document_id, result.fragment.text
                );
            }
        }

        format!(
            "Você é um assistente técnico ultra-preciso. Sua ÚNICA fonte de informação é o \
             'Contexto' fornecido abaixo, extraído de normas técnicas. Responda à 'Pergunta' do \
             usuário.\n\
             \n\
             Contexto:\n\
             {context}\n\
             Pergunta: {question}\n\
             \n\
             REGRAS ESTRITAS PARA A RESPOSTA:\n\
             1. Baseie sua resposta EXCLUSIVAMENTE nas informações presentes no 'Contexto'.\n\
             2. NÃO adicione nenhuma informação externa, conhecimento prévio ou suposições.\n\
             3. Se a informação necessária NÃO estiver explicitamente no 'Contexto', responda \
             EXATAMENTE e SOMENTE com a frase: \"{REFUSAL}\"\n\
             4. Se encontrou a informação, cite ao final o(s) documento(s) de origem indicados \
             nas marcações [Fonte: ...], no formato: (Fonte: nome_do_arquivo.pdf)\n\
             \n\
             Resposta:"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Fragment;

    fn result(doc: &str, text: &str) -> SearchResult {
        SearchResult {
            fragment: Fragment {
                document_id: doc.to_string(),
                text: text.to_string(),
                start_offset: 0,
                embedding: vec![1.0],
            },
            score: 0.9,
        }
    }

    #[test]
    fn prompt_contains_question_verbatim() {
        let prompt = PromptAssembler::new()
            .assemble("Qual a seção mínima do condutor?", &[result("NBR-5410.pdf", "trecho")]);
        assert!(prompt.contains("Pergunta: Qual a seção mínima do condutor?"));
    }

    #[test]
    fn fragments_are_tagged_with_their_source() {
        let prompt = PromptAssembler::new().assemble(
            "pergunta",
            &[result("A.pdf", "primeiro trecho"), result("B.pdf", "segundo trecho")],
        );
        assert!(prompt.contains("[Fonte: A.pdf]\nprimeiro trecho"));
        assert!(prompt.contains("[Fonte: B.pdf]\nsegundo trecho"));
    }

    #[test]
    fn prompt_always_embeds_the_refusal_string() {
        let prompt = PromptAssembler::new().assemble("pergunta", &[result("A.pdf", "t")]);
        assert!(prompt.contains(REFUSAL));
    }

    #[test]
    fn empty_retrieval_still_steers_toward_refusal() {
        let prompt = PromptAssembler::new().assemble("pergunta", &[]);
        assert!(prompt.contains("(nenhum trecho relevante foi encontrado)"));
        assert!(prompt.contains(REFUSAL));
    }
}
