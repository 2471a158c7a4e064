//! Authentication primitives: Argon2id passwords and signed session tokens.

pub mod password;
pub mod session;
