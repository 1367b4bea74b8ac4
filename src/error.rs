//! # src/error.rs
//!
//! Definiert den zentralen Fehlertyp für die gesamte gift_token_core-Bibliothek.
//! Verwendet `thiserror` zur einfachen Erstellung von aussagekräftigen Fehlern
//! und zur automatischen Konvertierung von untergeordneten Fehlertypen.

use thiserror::Error;

use crate::models::redemption::RedemptionRecord;
use crate::services::key_manager::KeyManagerError;
use crate::services::token_engine::TokenEngineError;
use crate::storage::StorageError;

/// Der zentrale Fehlertyp für alle Operationen in der `gift_token_core`-Bibliothek.
///
/// Dieser Enum fasst Fehler aus allen Modulen (Engine, Key Manager, Speicher,
/// Kursdienst) an einem Ort zusammen und bildet die einheitliche Fehler-API
/// der Bibliothek.
#[derive(Error, Debug)]
pub enum GiftTokenCoreError {
    /// Ein Fehler aus der Token-Engine (ungültiger Betrag, fehlgeschlagene Prüfung).
    /// Kapselt den spezifischeren `TokenEngineError`-Typ.
    #[error("Token Engine Error: {0}")]
    Engine(#[from] TokenEngineError),

    /// Ein Fehler bei der Bereitstellung des Signatur-Schlüsselpaars.
    #[error("Key Manager Error: {0}")]
    KeyManager(#[from] KeyManagerError),

    /// Ein Fehler, der während einer Speicheroperation (Ledger, Schlüssel) aufgetreten ist.
    #[error("Storage Error: {0}")]
    Storage(#[from] StorageError),

    /// Der Token konnte nicht eingelöst werden, weil er weder strukturell noch
    /// kryptographisch gültig ist. Die genaue Ursache (fehlerhafte Struktur oder
    /// gefälschte Signatur) wird nach außen bewusst nicht unterschieden.
    #[error("Invalid token.")]
    InvalidToken,

    /// Der Token wurde bereits eingelöst. Dies ist ein reguläres Geschäftsergebnis,
    /// kein Systemfehler; der vorhandene Einlöse-Datensatz wird mitgeliefert.
    #[error("Token has already been redeemed at {}.", .0.redeemed_at)]
    AlreadyRedeemed(RedemptionRecord),

    /// Es ist kein Wechselkurs verfügbar: Der Orakel-Abruf schlug fehl und es
    /// existiert weder ein zwischengespeicherter noch ein konfigurierter
    /// Fallback-Kurs.
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(String),

    /// Ein Betrag hat mehr Nachkommastellen, als die Konfiguration erlaubt.
    #[error("Amount precision exceeded: allowed {allowed} decimal places, found {found}.")]
    AmountPrecisionExceeded { allowed: u32, found: u32 },

    /// Ein Fehler bei der Verarbeitung von JSON (Serialisierung oder Deserialisierung).
    #[error("JSON Processing Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Ein Fehler bei der Deserialisierung von TOML (z.B. beim Laden der Konfiguration).
    #[error("TOML Deserialization Error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Ein Fehler bei der Konvertierung oder Berechnung von Beträgen.
    #[error("Amount Conversion Error: {0}")]
    AmountConversion(#[from] rust_decimal::Error),

    /// Ein Fehler bei I/O-Operationen.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ein allgemeiner Fehler, der für verschiedene Zwecke verwendet werden kann.
    #[error("Generic error: {0}")]
    Generic(String),
}
