//! # gift_token_core
//!
//! Die Kernlogik eines Geschenk-Token-Systems: kryptographisch prüfbare
//! Inhaber-Tokens, deren Betrag ohne Datenbank-Zugriff aus der Signatur
//! rekonstruiert wird, ein Einlöse-Ledger mit At-most-once-Garantie sowie die
//! Satoshi⇄Währungs-Umrechnung und die Ausgabe von Wechsel-Tokens.

// Deklariert die Hauptmodule der Bibliothek und macht sie öffentlich.
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod test_utils;

// Re-exportiert die wichtigsten öffentlichen Typen für eine einfachere Nutzung.
// Anstatt `gift_token_lib::models::token::TokenState` können Benutzer nun
// `gift_token_lib::TokenState` schreiben.

// Fehler
pub use error::GiftTokenCoreError;

// Modelle
pub use models::config::{GiftTokenConfig, OperationalMode};
pub use models::keypair::IssuerKeypair;
pub use models::redemption::RedemptionRecord;
pub use models::token::{TokenState, VerifiedToken};

// Services
pub use services::crypto_utils;
pub use services::key_manager::{KeyManager, KeyManagerError};
pub use services::rate_service::{
    ExchangeRate, FixedRateOracle, RateOracle, RateOracleError, RateService,
};
pub use services::token_engine::{TokenEngineError, MAX_AMOUNT, NONCE_SIZE, TOKEN_PREFIX, TOKEN_SEPARATOR};
pub use services::token_service::{TokenService, TokenSettlement};

// Speicher
pub use storage::{KeyStore, RedeemOutcome, RedemptionLedger, StorageError};
