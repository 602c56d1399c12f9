// Repositories module - session storage

pub mod session_repository;

#[cfg(test)]
mod tests;

pub use session_repository::{InMemorySessionRepository, SessionRepository};
