pub mod api;
pub mod llm;
