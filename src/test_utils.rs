//! # src/test_utils.rs
//!
//! Zentrale Hilfsfunktionen für alle Tests (intern und extern).
//! Stellt deterministische Herausgeber-Identitäten und vorkonfigurierte
//! `TokenService`-Instanzen über In-Memory-Backends bereit.

use lazy_static::lazy_static;
use rust_decimal::Decimal;

use crate::models::config::{GiftTokenConfig, OperationalMode};
use crate::models::keypair::IssuerKeypair;
use crate::services::crypto_utils::generate_ed25519_keypair_for_tests;
use crate::services::key_manager::KeyManager;
use crate::services::rate_service::{FixedRateOracle, RateOracle, RateOracleError};
use crate::services::token_service::TokenService;
use crate::storage::memory::{InMemoryKeyStore, InMemoryLedger};
use crate::storage::RedemptionLedger;

/// Erstellt ein deterministisches Herausgeber-Schlüsselpaar aus einem Seed.
pub fn deterministic_issuer_keypair(seed: &str) -> IssuerKeypair {
    let (_, signing_key) = generate_ed25519_keypair_for_tests(Some(seed));
    IssuerKeypair::from_signing_key(signing_key)
}

lazy_static! {
    /// Der Standard-Herausgeber, der in allen Tests wiederverwendet wird.
    pub static ref ISSUER: IssuerKeypair = deterministic_issuer_keypair("issuer-main");

    /// Ein zweiter, unabhängiger Herausgeber für Fremdschlüssel-Szenarien.
    pub static ref SECOND_ISSUER: IssuerKeypair = deterministic_issuer_keypair("issuer-second");
}

/// Ein Orakel, dessen Abruf immer fehlschlägt (für Fallback- und
/// `RateUnavailable`-Szenarien).
pub struct FailingOracle;

impl RateOracle for FailingOracle {
    fn fetch_rate(&self, _currency: &str) -> Result<Decimal, RateOracleError> {
        Err(RateOracleError::FetchFailed(
            "simulated oracle outage".to_string(),
        ))
    }
}

/// Eine Standard-Konfiguration für Tests: EUR, zwei Nachkommastellen,
/// kein Fallback-Kurs.
pub fn test_config(mode: OperationalMode) -> GiftTokenConfig {
    GiftTokenConfig {
        mode,
        currency: "EUR".to_string(),
        currency_decimal_places: 2,
        fallback_rate: None,
    }
}

/// Erstellt einen vollständig konfigurierbaren In-Memory-`TokenService`.
///
/// Der Schlüssel-Store wird mit dem deterministischen `ISSUER` vorbesetzt,
/// sodass Tokens über mehrere Service-Instanzen hinweg prüfbar bleiben.
pub fn setup_service(
    config: GiftTokenConfig,
    ledger: Box<dyn RedemptionLedger>,
    oracle: Box<dyn RateOracle>,
) -> TokenService {
    let key_manager = KeyManager::new(Box::new(InMemoryKeyStore::with_keypair(ISSUER.clone())));
    TokenService::new(&key_manager, ledger, config, oracle)
        .expect("Failed to create TokenService in test setup")
}

/// Erstellt einen In-Memory-`TokenService` mit leerem Ledger und einem
/// Festkurs-Orakel (Kurs 0, da die meisten Tests keinen Kurs benötigen).
pub fn setup_in_memory_service(mode: OperationalMode) -> TokenService {
    setup_service(
        test_config(mode),
        Box::new(InMemoryLedger::new()),
        Box::new(FixedRateOracle::new(Decimal::ZERO)),
    )
}

/// Erstellt einen In-Memory-`TokenService` mit Festkurs-Orakel.
pub fn setup_service_with_rate(mode: OperationalMode, rate: Decimal) -> TokenService {
    setup_service(
        test_config(mode),
        Box::new(InMemoryLedger::new()),
        Box::new(FixedRateOracle::new(rate)),
    )
}
