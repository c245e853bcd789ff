pub mod conversation;
pub mod instance;
pub mod message;
pub mod rule;
