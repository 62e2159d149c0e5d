use crate::domain::schema::ResponseSchema;
use crate::utils::error::Result;
use async_trait::async_trait;

/// One structured-generation call against the remote model.
/// Returns the first text part of the first candidate.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn send(&self, prompt: &str, schema: &ResponseSchema) -> Result<String>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}
