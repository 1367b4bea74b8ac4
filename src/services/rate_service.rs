//! # rate_service.rs
//!
//! Der Kursdienst: bezieht den Satoshi⇄Währungs-Kurs von einem externen
//! Orakel, hält ihn im Cache und stellt die Umrechnungsfunktionen bereit.
//! Leser dürfen einen veralteten Kurs sehen; die finanzielle Korrektheit wird
//! zum Einlösezeitpunkt geschützt, nicht zum Angebotszeitpunkt.

use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GiftTokenCoreError;
use crate::services::decimal_utils::floor_to_u64;
use crate::services::utils::get_current_timestamp;

/// Fehler beim Abruf eines Kurses vom externen Orakel.
#[derive(Debug, Error)]
pub enum RateOracleError {
    /// Der Abruf schlug fehl (Netzwerk, Format, Dienst nicht erreichbar).
    #[error("Rate oracle fetch failed: {0}")]
    FetchFailed(String),
}

/// Die Schnittstelle zu einer externen Kursquelle.
///
/// Der Kurs ist als Währungseinheiten pro Satoshi definiert (z.B. 0.0005 EUR
/// pro Satoshi). Implementierungen leben außerhalb des Kerns; die Bibliothek
/// liefert nur die Festkurs-Implementierung für manuelle Konfiguration.
pub trait RateOracle: Send + Sync {
    /// Liefert den aktuellen Kurs für die gegebene Währung.
    fn fetch_rate(&self, currency: &str) -> Result<Decimal, RateOracleError>;
}

/// Ein Orakel mit fest konfiguriertem Kurs (manuelle Übersteuerung, Tests).
pub struct FixedRateOracle {
    rate: Decimal,
}

impl FixedRateOracle {
    pub fn new(rate: Decimal) -> Self {
        FixedRateOracle { rate }
    }
}

impl RateOracle for FixedRateOracle {
    fn fetch_rate(&self, _currency: &str) -> Result<Decimal, RateOracleError> {
        Ok(self.rate)
    }
}

/// Ein zwischengespeicherter Wechselkurs mit Aktualisierungs-Zeitstempel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExchangeRate {
    /// Währungseinheiten pro Satoshi.
    pub rate: Decimal,
    /// Zeitpunkt der letzten Aktualisierung im ISO 8601-Format.
    pub updated_at: String,
}

/// Hält den Kurs-Cache und kapselt Abruf, Fallback und Umrechnung.
///
/// Der Cache wird gefüllt, wenn er leer ist oder einen Kurs von null enthält,
/// und auf expliziten Wunsch aktualisiert (z.B. unmittelbar vor dem Abschluss
/// einer Transaktion). Schlägt der Abruf fehl, greift der konfigurierte
/// Fallback-Kurs; der Rückgriff wird im Log deutlich gekennzeichnet, damit er
/// bei der Abstimmung erkennbar bleibt.
pub struct RateService {
    oracle: Box<dyn RateOracle>,
    currency: String,
    fallback_rate: Option<Decimal>,
    cached: Mutex<Option<ExchangeRate>>,
}

impl RateService {
    /// Erstellt den Dienst über dem gegebenen Orakel.
    pub fn new(oracle: Box<dyn RateOracle>, currency: String, fallback_rate: Option<Decimal>) -> Self {
        RateService {
            oracle,
            currency,
            fallback_rate,
            cached: Mutex::new(None),
        }
    }

    /// Der zuletzt zwischengespeicherte Kurs, falls vorhanden.
    pub fn cached_rate(&self) -> Option<ExchangeRate> {
        self.cached.lock().unwrap().clone()
    }

    /// Setzt den Kurs manuell (Übersteuerung durch Konfiguration oder Admin).
    pub fn override_rate(&self, rate: Decimal) {
        let mut cached = self.cached.lock().unwrap();
        *cached = Some(ExchangeRate {
            rate,
            updated_at: get_current_timestamp(),
        });
    }

    /// Liefert den aktuellen Kurs. Ein leerer Cache oder ein Kurs von null
    /// löst einen Abruf aus; ansonsten wird der Cache-Wert zurückgegeben.
    pub fn current_rate(&self) -> Result<Decimal, GiftTokenCoreError> {
        if let Some(exchange_rate) = self.cached_rate() {
            if exchange_rate.rate > Decimal::ZERO {
                return Ok(exchange_rate.rate);
            }
        }
        self.refresh_rate()
    }

    /// Ruft den Kurs frisch vom Orakel ab und aktualisiert den Cache
    /// (Überschreiben mit dem neuesten Wert, kein Zusammenführen).
    ///
    /// Schlägt der Abruf fehl, greift in dieser Reihenfolge: der konfigurierte
    /// Fallback-Kurs, sonst `RateUnavailable`.
    pub fn refresh_rate(&self) -> Result<Decimal, GiftTokenCoreError> {
        match self.oracle.fetch_rate(&self.currency) {
            Ok(rate) => {
                let mut cached = self.cached.lock().unwrap();
                *cached = Some(ExchangeRate {
                    rate,
                    updated_at: get_current_timestamp(),
                });
                Ok(rate)
            }
            Err(e) => match self.fallback_rate {
                Some(fallback) => {
                    tracing::warn!(
                        error = %e,
                        fallback = %fallback,
                        currency = %self.currency,
                        "rate oracle unavailable, using configured fallback rate"
                    );
                    Ok(fallback)
                }
                None => Err(GiftTokenCoreError::RateUnavailable(e.to_string())),
            },
        }
    }

    /// Rechnet Satoshi in Währungseinheiten um: `sats * kurs`.
    pub fn satoshis_to_currency(&self, satoshis: u64) -> Result<Decimal, GiftTokenCoreError> {
        Ok(satoshis_to_currency_at(satoshis, self.current_rate()?))
    }

    /// Rechnet Währungseinheiten in Satoshi um: `floor(betrag / kurs)` bei
    /// positivem Kurs, sonst `0`.
    pub fn currency_to_satoshis(&self, amount: Decimal) -> Result<u64, GiftTokenCoreError> {
        Ok(currency_to_satoshis_at(amount, self.current_rate()?))
    }
}

/// Umrechnung Satoshi -> Währung bei gegebenem Kurs.
pub fn satoshis_to_currency_at(satoshis: u64, rate: Decimal) -> Decimal {
    Decimal::from(satoshis) * rate
}

/// Umrechnung Währung -> Satoshi bei gegebenem Kurs.
///
/// Die Abrundung ist asymmetrisch zur Gegenrichtung: `floor(x / kurs) * kurs`
/// kann kleiner als `x` sein. Das ist dokumentiertes Verhalten, keine zu
/// korrigierende Ungenauigkeit.
pub fn currency_to_satoshis_at(amount: Decimal, rate: Decimal) -> u64 {
    if rate <= Decimal::ZERO {
        return 0;
    }
    floor_to_u64(&(amount / rate))
}
