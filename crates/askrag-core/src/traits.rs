use crate::error::Result;

/// Sentence embedding with a fixed dimensionality per model identity.
/// Implementations must be deterministic for a given input and must fail
/// with a typed error rather than return a zero vector.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Hosted LLM behind the query pipeline: a filled prompt in, generated
/// text out. Stateless per call.
#[async_trait::async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
