//! Token repository module.

pub mod mock;
pub mod r#trait;

#[cfg(test)]
mod tests;

pub use mock::MockTokenRepository;
pub use r#trait::TokenRepository;
