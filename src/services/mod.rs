//! # src/services/mod.rs
//!
//! Bündelt die Dienste der Bibliothek: Kryptographie, Token-Engine,
//! Schlüsselverwaltung, Kursdienst und die `TokenService`-Fassade.

pub mod crypto_utils;
pub mod decimal_utils;
pub mod key_manager;
pub mod rate_service;
pub mod token_engine;
pub mod token_service;
pub mod utils;
