//! # token.rs
//!
//! Definiert die Datenstrukturen rund um das Ergebnis einer Token-Prüfung.
//! Der serialisierte Token selbst ist ein reiner String (siehe
//! `services::token_engine`); diese Strukturen beschreiben, was die
//! Bibliothek über einen geprüften Token weiß.

use serde::{Deserialize, Serialize};

use crate::models::redemption::RedemptionRecord;

/// Das Ergebnis einer erfolgreichen kryptographischen Token-Prüfung.
///
/// Der Betrag ist nicht im Token gespeichert, sondern wird während der
/// Verifikation rekonstruiert (siehe `token_engine::verify_token`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Der vollständige, serialisierte Token-String.
    pub token: String,
    /// Der rekonstruierte Betrag in der Einheit des Betriebsmodus.
    pub amount: u64,
    /// Die zufälligen Nonce-Bytes des Tokens.
    pub nonce: Vec<u8>,
}

/// Repräsentiert den übergeordneten Zustand eines Tokens aus Sicht des
/// `TokenService`. Dieser Zustand wird nicht im Token selbst gespeichert,
/// sondern ergibt sich aus der kryptographischen Prüfung und dem Ledger.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum TokenState {
    /// Der Token ist strukturell fehlerhaft oder kryptographisch ungültig.
    /// Die beiden Ursachen werden nach außen bewusst nicht unterschieden.
    Invalid,
    /// Der Token ist gültig und wurde noch nicht eingelöst.
    ValidUnredeemed(VerifiedToken),
    /// Der Token ist kryptographisch gültig, wurde aber bereits eingelöst.
    /// Der vorhandene Einlöse-Datensatz wird zur Anzeige mitgeliefert.
    ValidButRedeemed(VerifiedToken, RedemptionRecord),
}

impl TokenState {
    /// Gibt an, ob der Token kryptographisch gültig ist (unabhängig vom Einlöse-Status).
    pub fn is_valid(&self) -> bool {
        !matches!(self, TokenState::Invalid)
    }

    /// Der rekonstruierte Betrag, falls der Token gültig ist.
    pub fn amount(&self) -> Option<u64> {
        match self {
            TokenState::Invalid => None,
            TokenState::ValidUnredeemed(v) | TokenState::ValidButRedeemed(v, _) => Some(v.amount),
        }
    }

    /// Gibt an, ob der Token bereits eingelöst wurde.
    pub fn is_redeemed(&self) -> bool {
        matches!(self, TokenState::ValidButRedeemed(_, _))
    }
}
