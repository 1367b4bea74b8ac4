//! # src/storage/mod.rs
//!
//! Definiert die Abstraktionen für die persistente Speicherung: den
//! `KeyStore` für das Schlüsselpaar des Herausgebers und den
//! `RedemptionLedger` für Einlöse-Datensätze. Dies ermöglicht es, die
//! Kernlogik von der konkreten Speichermethode zu entkoppeln.
//!
//! Beide Traits arbeiten mit `&self` und innerer Synchronisation: Der Ledger
//! ist der einzige über Request-Grenzen hinweg umkämpfte Zustand, und seine
//! Eindeutigkeits-Garantie muss in der Speicherschicht atomar sein; eine
//! getrennte Prüfen-dann-Einfügen-Sequenz in der Anwendungslogik genügt nicht.

use thiserror::Error;

use crate::models::keypair::IssuerKeypair;
use crate::models::redemption::RedemptionRecord;

pub mod file_storage;
pub mod memory;

/// Ein generischer Fehler-Typ für alle Speicheroperationen.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Data not found for the given identifier.")]
    NotFound,

    #[error("Data is corrupted or has an invalid format: {0}")]
    InvalidFormat(String),

    #[error("Underlying I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("An unexpected error occurred: {0}")]
    Generic(String),
}

/// Das Ergebnis eines atomaren Einlöse-Versuchs.
///
/// Beide Varianten tragen den Datensatz, der nach der Operation tatsächlich
/// im Ledger steht: bei `Redeemed` der soeben eingefügte, bei
/// `AlreadyRedeemed` der zuvor vorhandene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Der Token wurde jetzt eingelöst; der neue Datensatz wurde eingefügt.
    Redeemed(RedemptionRecord),
    /// Der Token war bereits eingelöst; eingefügt wurde nichts.
    AlreadyRedeemed(RedemptionRecord),
}

/// Die Schnittstelle für die Persistierung des Herausgeber-Schlüsselpaars.
pub trait KeyStore: Send + Sync {
    /// Lädt das persistierte Schlüsselpaar, falls eines existiert.
    fn load_keypair(&self) -> Result<Option<IssuerKeypair>, StorageError>;

    /// Persistiert das Paar atomar, falls noch keines existiert ("create if
    /// absent"). Existiert bereits ein Paar (auch durch ein verlorenes
    /// Wettrennen), wird das vorhandene zurückgegeben, niemals überschrieben.
    fn store_keypair_if_absent(&self, keypair: &IssuerKeypair)
        -> Result<IssuerKeypair, StorageError>;
}

/// Die Schnittstelle für den Einlöse-Ledger.
///
/// Invariante: Pro Token-String existiert höchstens ein Datensatz, für die
/// gesamte Lebensdauer des Ledgers.
pub trait RedemptionLedger: Send + Sync {
    /// Existenz-Prüfung gegen den eindeutigen Token-Index.
    fn is_redeemed(&self, token: &str) -> Result<bool, StorageError>;

    /// Versucht, den Datensatz einzufügen. Prüfung und Einfügen sind eine
    /// einzige, unteilbare Operation; bei zwei nebenläufigen Versuchen für
    /// denselben Token erhält genau einer `Redeemed`, der andere
    /// `AlreadyRedeemed`.
    fn try_redeem(&self, record: RedemptionRecord) -> Result<RedeemOutcome, StorageError>;

    /// Liest den Datensatz zu einem Token für Anzeige- und Audit-Zwecke.
    fn get_record(&self, token: &str) -> Result<Option<RedemptionRecord>, StorageError>;
}
