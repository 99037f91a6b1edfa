//! Prompt construction: persona system messages and batched analysis prompts

pub mod assembly;
pub mod persona;

pub use assembly::build_batch_prompts;
pub use persona::Persona;

/// System message grounding the follow-up chat in the prior analysis
pub const CHAT_SYSTEM_TEXT: &str = "The following is a completed stock analysis. \
Answer the user's questions based on its content. Keep answers concise and tie \
them back to the figures in the analysis where possible.";
