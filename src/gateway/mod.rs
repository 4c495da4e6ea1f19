//! Service gateway: text completion, speech synthesis and transcription.

pub mod openai;
pub mod service;

pub use openai::OpenAiGateway;
pub use service::{MockGateway, RecordedCompletion, ServiceGateway, Voice};
