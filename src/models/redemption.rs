//! # redemption.rs
//!
//! Definiert den Einlöse-Datensatz, der die einmalige Verwendung eines Tokens
//! dokumentiert. Pro Token-String existiert im Ledger höchstens ein Datensatz,
//! für die gesamte Lebensdauer des Ledgers.

use serde::{Deserialize, Serialize};

use crate::services::utils::get_current_timestamp;

/// Ein unveränderlicher Einlöse-Datensatz.
///
/// Wird genau einmal, zum Zeitpunkt der Einlösung, vom `TokenService` erstellt
/// und danach nie mutiert.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RedemptionRecord {
    /// Der vollständige, serialisierte Token-String. Eindeutiger Schlüssel im Ledger.
    pub token: String,
    /// Der zum Einlösezeitpunkt rekonstruierte Betrag.
    pub amount: u64,
    /// Zeitpunkt der Einlösung im ISO 8601-Format (UTC, Mikrosekunden-Präzision).
    pub redeemed_at: String,
    /// Optionale, opake Referenz auf die Bestellung, gegen die eingelöst wurde.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_reference: Option<String>,
    /// Optionale, opake Referenz auf den einlösenden Akteur.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_reference: Option<String>,
}

impl RedemptionRecord {
    /// Erstellt einen neuen Datensatz mit dem aktuellen Zeitstempel.
    pub fn new(
        token: String,
        amount: u64,
        order_reference: Option<&str>,
        actor_reference: Option<&str>,
    ) -> Self {
        RedemptionRecord {
            token,
            amount,
            redeemed_at: get_current_timestamp(),
            order_reference: order_reference.map(str::to_string),
            actor_reference: actor_reference.map(str::to_string),
        }
    }
}
