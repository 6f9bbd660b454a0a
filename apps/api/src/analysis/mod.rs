pub mod analyzer;
pub mod cover_letter;
pub mod handlers;
pub mod prompts;
pub mod resume_text;
pub mod store;
