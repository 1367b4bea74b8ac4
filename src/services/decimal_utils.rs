// src/services/decimal_utils.rs

//! # decimal_utils.rs
//!
//! Enthält zentrale Hilfsfunktionen zur konsistenten Validierung und Formatierung
//! von `Decimal`-Werten. Die hier definierten Funktionen stellen sicher, dass
//! alle Währungsbeträge im System einheitlich behandelt werden, um Rundungs- und
//! Vergleichsfehler zu vermeiden.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::GiftTokenCoreError;

/// **Prinzip: Strenge Validierung am Eingang.**
///
/// Stellt sicher, dass ein `Decimal`-Wert die erlaubte Anzahl an
/// Nachkommastellen nicht überschreitet. Schlägt fehl, wenn die Präzision
/// der Eingabe zu hoch ist.
///
/// # Arguments
/// * `amount` - Der zu prüfende `Decimal`-Wert.
/// * `allowed_places` - Die maximal erlaubte Anzahl an Nachkommastellen.
///
/// # Returns
/// Ein `Result`, das bei Erfolg leer ist oder einen `GiftTokenCoreError` enthält.
pub fn validate_precision(amount: &Decimal, allowed_places: u32) -> Result<(), GiftTokenCoreError> {
    let normalized = amount.normalize();
    if normalized.scale() > allowed_places {
        Err(GiftTokenCoreError::AmountPrecisionExceeded {
            allowed: allowed_places,
            found: normalized.scale(),
        })
    } else {
        Ok(())
    }
}

/// **Prinzip: Kanonisches Anzeigeformat.**
///
/// Formatiert einen `Decimal`-Wert mit fester Nachkommastellen-Anzahl für die
/// Anzeige (z.B. 60 -> "60.00" bei zwei Stellen).
///
/// # Arguments
/// * `amount` - Der zu formatierende `Decimal`-Wert.
/// * `places` - Die Anzahl der Nachkommastellen im Ausgabe-String.
///
/// # Returns
/// Einen `String` mit der kanonischen Repräsentation des Betrags.
pub fn format_for_display(amount: &Decimal, places: u32) -> String {
    format!("{:.1$}", amount, places as usize)
}

/// Rundet einen nicht-negativen `Decimal`-Wert auf die nächstkleinere ganze
/// Zahl ab und gibt sie als `u64` zurück. Negative Werte ergeben `0`.
///
/// Die Abrundung ist die dokumentierte Asymmetrie der Umrechnung: Bruchteile
/// einer Einheit sind in einem Token nicht darstellbar.
pub fn floor_to_u64(amount: &Decimal) -> u64 {
    if amount.is_sign_negative() {
        return 0;
    }
    amount.floor().to_u64().unwrap_or(u64::MAX)
}
