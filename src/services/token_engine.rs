//! # token_engine.rs
//!
//! Die kryptographische Kern-Engine: erstellt und prüft Token-Strings.
//!
//! Ein Token trägt seinen Betrag nicht im Klartext. Signiert wird die
//! Nachricht `nonce ‖ be_uint32(betrag)`; serialisiert werden nur Präfix,
//! Nonce und Signatur. Der Betrag wird bei der Prüfung rekonstruiert, indem
//! alle Kandidaten-Beträge durchprobiert werden. Ein Prüfer benötigt dadurch
//! ausschließlich den öffentlichen Schlüssel und den Token-String, keine
//! Datenbank.

use ed25519_dalek::{Signature, SigningKey, VerifyingKey as EdPublicKey};
use std::fmt;

use crate::models::token::VerifiedToken;
use crate::services::crypto_utils;

/// Festes Literal, das Schema und Version des Token-Formats identifiziert.
pub const TOKEN_PREFIX: &str = "GIFT1";

/// Trennzeichen zwischen den drei Token-Teilen. Darf nicht im
/// base64url-Alphabet (`A-Z a-z 0-9 - _`) vorkommen.
pub const TOKEN_SEPARATOR: char = '.';

/// Länge der zufälligen Nonce in Bytes (128 Bit Kollisionsresistenz).
pub const NONCE_SIZE: usize = 16;

/// Obergrenze für Token-Beträge. Die Betrags-Rekonstruktion probiert im
/// schlimmsten Fall so viele Kandidaten durch; die Grenze ist damit zugleich
/// das Latenz-Budget der Verifikation.
pub const MAX_AMOUNT: u64 = 1_000_000;

// Definiert die Fehler, die im `token_engine`-Modul auftreten können.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenEngineError {
    /// Der Betrag liegt außerhalb des darstellbaren Bereichs `[1, MAX_AMOUNT]`.
    InvalidAmount(u64),
    /// Der Token-String ist strukturell fehlerhaft (Teile, Präfix, Kodierung, Längen).
    MalformedToken(String),
    /// Kein Kandidaten-Betrag verifiziert gegen die Signatur: Der Token ist
    /// gefälscht, beschädigt oder kodiert einen Betrag außerhalb des Bereichs.
    VerificationFailed,
    /// Der sichere Zufallszahlengenerator ist nicht verfügbar.
    CryptoUnavailable(String),
}

impl fmt::Display for TokenEngineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenEngineError::InvalidAmount(amount) => {
                write!(
                    f,
                    "Amount {} is outside the supported range [1, {}].",
                    amount, MAX_AMOUNT
                )
            }
            TokenEngineError::MalformedToken(s) => write!(f, "Malformed token: {}", s),
            TokenEngineError::VerificationFailed => {
                write!(f, "No candidate amount verifies against the token signature.")
            }
            TokenEngineError::CryptoUnavailable(s) => {
                write!(f, "Secure random number generator unavailable: {}", s)
            }
        }
    }
}

impl std::error::Error for TokenEngineError {}

impl From<crypto_utils::CryptoUnavailable> for TokenEngineError {
    fn from(e: crypto_utils::CryptoUnavailable) -> Self {
        TokenEngineError::CryptoUnavailable(e.0)
    }
}

/// Baut die signierte Nachricht `nonce ‖ be_uint32(betrag)` zusammen.
fn signing_message(nonce: &[u8], amount: u32) -> Vec<u8> {
    let mut message = Vec::with_capacity(nonce.len() + 4);
    message.extend_from_slice(nonce);
    message.extend_from_slice(&amount.to_be_bytes());
    message
}

/// Creates a new, signed token string for the given amount.
///
/// Two calls with the same amount yield different tokens (fresh nonce per
/// call); tokens are deliberately not deterministic functions of the amount.
/// The call is stateless with respect to the redemption ledger.
///
/// # Arguments
/// * `amount` - The token amount, a positive integer in `[1, MAX_AMOUNT]`.
///   The unit of the amount is defined by the operational mode, not here.
/// * `signing_key` - Der private Ed25519-Schlüssel des Herausgebers zum Signieren.
///
/// # Returns
/// Ein `Result`, das entweder den serialisierten Token-String oder einen
/// `TokenEngineError` enthält.
pub fn create_token(amount: u64, signing_key: &SigningKey) -> Result<String, TokenEngineError> {
    if amount == 0 || amount > MAX_AMOUNT {
        return Err(TokenEngineError::InvalidAmount(amount));
    }

    // 1. Frische Nonce ziehen; sie ist die einzige Quelle der Eindeutigkeit.
    let nonce = crypto_utils::random_bytes::<NONCE_SIZE>()?;

    // 2. Nachricht konstruieren und signieren.
    let message = signing_message(&nonce, amount as u32);
    let signature = crypto_utils::sign_ed25519(signing_key, &message);

    // 3. Serialisieren: PREFIX SEP b64url(nonce) SEP b64url(signatur).
    Ok(format!(
        "{}{}{}{}{}",
        TOKEN_PREFIX,
        TOKEN_SEPARATOR,
        crypto_utils::encode_base64url(nonce),
        TOKEN_SEPARATOR,
        crypto_utils::encode_base64url(signature.to_bytes())
    ))
}

/// Zerlegt einen Token-String in Nonce und Signatur.
///
/// Prüft die Struktur (exakt drei Teile, korrektes Präfix), dekodiert die
/// base64url-Teile und erzwingt die festen Längen von Nonce und Signatur.
pub fn parse_token(token: &str) -> Result<(Vec<u8>, Signature), TokenEngineError> {
    let parts: Vec<&str> = token.split(TOKEN_SEPARATOR).collect();
    if parts.len() != 3 {
        return Err(TokenEngineError::MalformedToken(format!(
            "Expected 3 separator-delimited parts, found {}.",
            parts.len()
        )));
    }
    if parts[0] != TOKEN_PREFIX {
        return Err(TokenEngineError::MalformedToken(format!(
            "Unknown token prefix '{}'.",
            parts[0]
        )));
    }

    let nonce = crypto_utils::decode_base64url(parts[1])
        .map_err(|e| TokenEngineError::MalformedToken(format!("Nonce decoding failed: {}", e)))?;
    if nonce.len() != NONCE_SIZE {
        return Err(TokenEngineError::MalformedToken(format!(
            "Nonce has invalid length (expected {}, got {}).",
            NONCE_SIZE,
            nonce.len()
        )));
    }

    let signature_bytes = crypto_utils::decode_base64url(parts[2]).map_err(|e| {
        TokenEngineError::MalformedToken(format!("Signature decoding failed: {}", e))
    })?;
    let signature = Signature::from_slice(&signature_bytes).map_err(|e| {
        TokenEngineError::MalformedToken(format!("Signature has invalid form: {}", e))
    })?;

    Ok((nonce, signature))
}

/// Verifies a token string and reconstructs its amount.
///
/// Für jeden Kandidaten-Betrag von 1 bis `MAX_AMOUNT` wird die Nachricht
/// `nonce ‖ be_uint32(kandidat)` rekonstruiert und gegen die Signatur geprüft.
/// Der erste Treffer ist der Betrag des Tokens; da jeder Betrag eine eigene
/// Nachricht ergibt, kann höchstens ein Kandidat verifizieren. Der frühe
/// Abbruch beim ersten Treffer ist daher verlustfrei und Pflicht.
///
/// Die Kosten skalieren linear mit dem Betrag, bei ungültigen Tokens mit
/// `MAX_AMOUNT`. Die Operation ist rein CPU-gebunden, ohne interne
/// Unterbrechungspunkte und ohne I/O.
///
/// # Arguments
/// * `token` - Der serialisierte Token-String.
/// * `public_key` - Der öffentliche Ed25519-Schlüssel des Herausgebers.
///
/// # Returns
/// Ein `Result` mit dem `VerifiedToken` (inklusive rekonstruiertem Betrag)
/// oder einem `TokenEngineError`, wenn der Token fehlerhaft oder gefälscht ist.
pub fn verify_token(
    token: &str,
    public_key: &EdPublicKey,
) -> Result<VerifiedToken, TokenEngineError> {
    verify_token_bounded(token, public_key, MAX_AMOUNT)
}

/// Wie [`verify_token`], aber mit expliziter Suchgrenze.
///
/// Die Grenze ist das Latenz-Budget der Suche: Tokens mit höherem Betrag
/// (oder ungültige Tokens) werden nach `max_amount` Kandidaten als
/// `VerificationFailed` abgelehnt.
pub fn verify_token_bounded(
    token: &str,
    public_key: &EdPublicKey,
    max_amount: u64,
) -> Result<VerifiedToken, TokenEngineError> {
    let (nonce, signature) = parse_token(token)?;

    // Die Nachricht wird einmal aufgebaut; pro Kandidat ändern sich nur die
    // letzten vier Bytes.
    let mut message = signing_message(&nonce, 0);
    for candidate in 1..=(max_amount.min(MAX_AMOUNT) as u32) {
        message[NONCE_SIZE..].copy_from_slice(&candidate.to_be_bytes());
        if crypto_utils::verify_ed25519(public_key, &message, &signature) {
            return Ok(VerifiedToken {
                token: token.to_string(),
                amount: candidate as u64,
                nonce,
            });
        }
    }

    Err(TokenEngineError::VerificationFailed)
}
