pub mod board;
pub mod handlers;
pub mod store;
