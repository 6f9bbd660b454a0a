pub mod handlers;
pub mod interview;
pub mod negotiation;
pub mod prompts;
pub mod session;
