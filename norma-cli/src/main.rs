//! Interactive assistant for querying technical standards.
//!
//! Loads (or builds) the vector index at startup, then answers questions
//! in a read-eval loop until the user types `sair` or `exit`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use norma_rag::{Assistant, AssistantConfig, AssistantError, OpenAiChat, OpenAiEmbeddings};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "norma", about = "Assistente de consulta a normas técnicas", version)]
struct Args {
    /// Directory holding the source PDF documents
    #[arg(long, default_value = "docs")]
    docs_dir: PathBuf,

    /// Directory holding the persisted vector index
    #[arg(long, default_value = "vectorstore/index")]
    index_dir: PathBuf,

    /// Maximum fragment size in characters
    #[arg(long, default_value_t = 1500)]
    chunk_size: usize,

    /// Overlap between consecutive fragments in characters
    #[arg(long, default_value_t = 200)]
    chunk_overlap: usize,

    /// Number of fragments retrieved per question
    #[arg(long, default_value_t = 4)]
    top_k: usize,

    /// Embedding model identifier
    #[arg(long, default_value = "text-embedding-ada-002")]
    embedding_model: String,

    /// Generation model identifier
    #[arg(long, default_value = "gpt-4")]
    generation_model: String,
}

/// Whether the input is the sentinel that ends the loop.
fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("sair") || line.eq_ignore_ascii_case("exit")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = AssistantConfig::builder()
        .chunk_size(args.chunk_size)
        .chunk_overlap(args.chunk_overlap)
        .top_k(args.top_k)
        .embedding_model(&args.embedding_model)
        .generation_model(&args.generation_model)
        .docs_dir(args.docs_dir)
        .index_dir(args.index_dir)
        .build()?;

    let embedder = OpenAiEmbeddings::from_env()
        .context("configure a chave da API no ambiente (OPENAI_API_KEY)")?
        .with_model(&config.embedding_model);
    let generator = OpenAiChat::from_env()?.with_model(&config.generation_model);

    let assistant = Assistant::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .generator(Arc::new(generator))
        .init()
        .await
        .context("falha ao inicializar o assistente")?;

    println!("--- Assistente de Normas Técnicas ---");
    println!("Digite sua pergunta sobre as normas carregadas. Digite 'sair' para terminar.");

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("\nSua pergunta: ") {
            Ok(line) if is_exit(&line) => break,
            Ok(line) if line.trim().is_empty() => {
                println!("Por favor, digite uma pergunta.");
            }
            Ok(line) => {
                let _ = editor.add_history_entry(&line);
                match assistant.answer(line.trim()).await {
                    Ok(answer) => println!("\nAssistente: {}", answer.text),
                    Err(e @ AssistantError::Service { .. }) => {
                        // A failed turn never ends the session.
                        warn!(error = %e, "query turn failed");
                        println!("\nAssistente: Não foi possível processar a sua pergunta. Tente novamente.");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    println!("Encerrando o assistente. Até logo!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_sentinels_are_recognized() {
        assert!(is_exit("sair"));
        assert!(is_exit("  SAIR  "));
        assert!(is_exit("exit"));
        assert!(!is_exit("sai"));
        assert!(!is_exit("qual a norma de aterramento?"));
    }
}
