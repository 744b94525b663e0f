pub mod crypto;
pub mod message;
pub mod signature;
pub mod token;
