//! # config.rs
//!
//! Definiert die explizite Konfiguration des `TokenService`. Der Betriebsmodus
//! und die Währungsparameter werden bei der Konstruktion übergeben statt als
//! globaler Zustand gehalten; so bleibt jede Instanz unabhängig testbar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GiftTokenCoreError;

/// Der Betriebsmodus legt fest, wie der ganzzahlige Betrag eines Tokens
/// interpretiert wird. Er ändert niemals das Token-Format, nur die
/// Interpretation und Umrechnung des Betrags.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationalMode {
    /// Der Betrag ist bereits in der Anzeigewährung des Händlers denominiert.
    StoreCurrency,
    /// Der Betrag ist in Satoshi denominiert und wird beim Anwenden über den
    /// zwischengespeicherten Wechselkurs in die Anzeigewährung umgerechnet.
    SatoshiConversion,
    /// Der Betrag bleibt in Satoshi und wird erst in einem nachgelagerten
    /// Zahlungsschritt verrechnet.
    DirectSatoshi,
}

/// Die vollständige Konfiguration des `TokenService`.
///
/// Kann aus einem TOML-String geladen werden; fehlende Felder fallen auf die
/// Default-Werte zurück.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GiftTokenConfig {
    /// Der Betriebsmodus für die Interpretation von Token-Beträgen.
    pub mode: OperationalMode,
    /// Das Kürzel der Anzeigewährung (z.B. "EUR"), wird dem Kurs-Orakel übergeben.
    pub currency: String,
    /// Die maximal erlaubte Anzahl an Nachkommastellen für Währungsbeträge.
    pub currency_decimal_places: u32,
    /// Der Fallback-Kurs (Währungseinheiten pro Satoshi), falls das Orakel
    /// nicht erreichbar ist. Ohne Fallback schlägt die Umrechnung dann fehl.
    pub fallback_rate: Option<Decimal>,
}

impl Default for GiftTokenConfig {
    fn default() -> Self {
        GiftTokenConfig {
            mode: OperationalMode::StoreCurrency,
            currency: "EUR".to_string(),
            currency_decimal_places: 2,
            fallback_rate: None,
        }
    }
}

impl GiftTokenConfig {
    /// Nimmt einen TOML-String entgegen und deserialisiert ihn in eine `GiftTokenConfig`.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, GiftTokenCoreError> {
        let config: GiftTokenConfig = toml::from_str(toml_str)?;
        Ok(config)
    }
}
