// Adapters layer: concrete implementations of the domain ports (http, storage, clipboard).

pub mod clipboard;
pub mod gemini;
pub mod storage;

pub use gemini::GeminiClient;
pub use storage::LocalStorage;
