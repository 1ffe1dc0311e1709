//! Recommendation generator adapters.
//!
//! - `OpenAIRecommender` - chat completions against an OpenAI-compatible API

mod openai;

pub use openai::{build_prompt, OpenAIConfig, OpenAIRecommender};
