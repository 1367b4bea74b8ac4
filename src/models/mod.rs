//! # src/models/mod.rs
//!
//! Bündelt die Kern-Datenstrukturen der Bibliothek: Token-Zustände,
//! Einlöse-Datensätze, Konfiguration und das Schlüsselpaar des Herausgebers.

pub mod config;
pub mod keypair;
pub mod redemption;
pub mod token;
