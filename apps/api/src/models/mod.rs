pub mod application;
pub mod contact;
pub mod resume;
pub mod session;
