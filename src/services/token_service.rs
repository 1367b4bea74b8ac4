//! # token_service.rs
//!
//! Die `TokenService`-Fassade, die zentrale Verwaltungsstruktur des Systems.
//! Sie kapselt das Schlüsselpaar des Herausgebers und orchestriert die
//! Interaktionen zwischen Token-Engine, Einlöse-Ledger und Kursdienst:
//! Erstellen, Prüfen und Einlösen von Tokens, die Währungs-Umrechnung und die
//! Ausgabe von Wechsel-Tokens.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GiftTokenCoreError;
use crate::models::config::{GiftTokenConfig, OperationalMode};
use crate::models::keypair::IssuerKeypair;
use crate::models::redemption::RedemptionRecord;
use crate::models::token::TokenState;
use crate::services::decimal_utils::{floor_to_u64, validate_precision};
use crate::services::key_manager::KeyManager;
use crate::services::rate_service::{
    currency_to_satoshis_at, satoshis_to_currency_at, RateOracle, RateService,
};
use crate::services::token_engine;
use crate::storage::{RedeemOutcome, RedemptionLedger};

/// Das Ergebnis einer Verrechnung von Tokens gegen einen geschuldeten Betrag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenSettlement {
    /// Die Einlöse-Datensätze der verbrauchten Tokens, in Eingabereihenfolge.
    pub redeemed: Vec<RedemptionRecord>,
    /// Der insgesamt angewendete Wert in der Wert-Einheit des Betriebsmodus
    /// (Währungseinheiten; bei `DirectSatoshi` Satoshi).
    pub applied_value: Decimal,
    /// Der geschuldete Betrag, gegen den verrechnet wurde.
    pub amount_owed: Decimal,
    /// Der neu geprägte Wechsel-Token, falls der angewendete Wert den
    /// geschuldeten Betrag überstieg.
    pub change_token: Option<String>,
    /// Der Betrag des Wechsel-Tokens in der Präge-Einheit des Betriebsmodus
    /// (Satoshi bei `SatoshiConversion`/`DirectSatoshi`, sonst ganze
    /// Währungseinheiten). `0`, wenn kein Wechsel-Token geprägt wurde.
    pub change_amount: u64,
    /// Wert-Rest, der wegen der Abrundung nicht in den Wechsel-Token passte
    /// (in der Wert-Einheit des Betriebsmodus). Wird ausgewiesen statt
    /// stillschweigend verworfen.
    pub residual_value: Decimal,
}

/// Die zentrale Fassade über Token-Engine, Einlöse-Ledger und Kursdienst.
///
/// Die Konstruktion schlägt fehl, wenn der `KeyManager` kein Schlüsselpaar
/// bereitstellen kann, denn ohne Schlüssel darf der Dienst nicht arbeiten.
pub struct TokenService {
    /// Das Schlüsselpaar des Herausgebers; die Engine erhält nur Referenzen.
    keypair: IssuerKeypair,
    /// Der Ledger mit der At-most-once-Garantie pro Token.
    ledger: Box<dyn RedemptionLedger>,
    /// Die explizite Konfiguration (Betriebsmodus, Währung, Fallback-Kurs).
    config: GiftTokenConfig,
    /// Der Kursdienst für die Satoshi⇄Währungs-Umrechnung.
    rates: RateService,
}

impl TokenService {
    /// Erstellt den Dienst. Bezieht das Schlüsselpaar einmalig vom
    /// `KeyManager`; ein `CryptoUnavailable` bricht die Initialisierung ab.
    pub fn new(
        key_manager: &KeyManager,
        ledger: Box<dyn RedemptionLedger>,
        config: GiftTokenConfig,
        oracle: Box<dyn RateOracle>,
    ) -> Result<Self, GiftTokenCoreError> {
        let keypair = key_manager.get_or_create_keypair()?;
        let rates = RateService::new(oracle, config.currency.clone(), config.fallback_rate);
        Ok(TokenService {
            keypair,
            ledger,
            config,
            rates,
        })
    }

    /// Der konfigurierte Betriebsmodus.
    pub fn operational_mode(&self) -> OperationalMode {
        self.config.mode
    }

    /// Die vollständige Konfiguration des Dienstes.
    pub fn config(&self) -> &GiftTokenConfig {
        &self.config
    }

    /// Zugriff auf den Kursdienst (manuelle Kurs-Übersteuerung, Cache-Einsicht).
    pub fn rates(&self) -> &RateService {
        &self.rates
    }

    /// Prägt einen neuen Token über den gegebenen Betrag.
    pub fn create_token(&self, amount: u64) -> Result<String, GiftTokenCoreError> {
        Ok(token_engine::create_token(amount, &self.keypair.signing_key)?)
    }

    /// Prägt `quantity` unabhängige Tokens über denselben Betrag.
    /// Jeder Token erhält eine eigene Nonce; es entstehen keine Duplikate.
    pub fn create_tokens_batch(
        &self,
        amount: u64,
        quantity: u32,
    ) -> Result<Vec<String>, GiftTokenCoreError> {
        (0..quantity).map(|_| self.create_token(amount)).collect()
    }

    /// Prüft einen Token und liefert seinen Zustand.
    ///
    /// Zustandsmaschine mit den Endzuständen `Invalid`, `ValidUnredeemed` und
    /// `ValidButRedeemed`:
    /// 1. Kryptographische Prüfung durch die Engine; jede Engine-Ablehnung
    ///    (fehlerhafte Struktur ODER gefälschte Signatur) ergibt `Invalid`.
    /// 2. Bei `check_redemption` entscheidet der Ledger zwischen
    ///    `ValidUnredeemed` und `ValidButRedeemed`.
    ///
    /// Nur Speicherfehler des Ledgers werden als `Err` gemeldet.
    pub fn verify_token(
        &self,
        token: &str,
        check_redemption: bool,
    ) -> Result<TokenState, GiftTokenCoreError> {
        let verified = match token_engine::verify_token(token, &self.keypair.public_key) {
            Ok(v) => v,
            Err(_) => return Ok(TokenState::Invalid),
        };

        if check_redemption {
            if let Some(record) = self.ledger.get_record(token)? {
                return Ok(TokenState::ValidButRedeemed(verified, record));
            }
        }

        Ok(TokenState::ValidUnredeemed(verified))
    }

    /// Löst einen Token genau einmal ein.
    ///
    /// Nach der kryptographischen Prüfung entscheidet ausschließlich der
    /// atomare `try_redeem` des Ledgers; eine vorgelagerte `is_redeemed`-
    /// Abfrage findet bewusst nicht statt, damit zwischen Prüfung und
    /// Einfügen kein Fenster für einen nebenläufigen Einlöser entsteht.
    /// Ein verlorenes Wettrennen wird als `AlreadyRedeemed` gemeldet, niemals
    /// stillschweigend in einen Erfolg umgedeutet.
    pub fn redeem_token(
        &self,
        token: &str,
        order_reference: Option<&str>,
        actor_reference: Option<&str>,
    ) -> Result<RedemptionRecord, GiftTokenCoreError> {
        let verified = token_engine::verify_token(token, &self.keypair.public_key)
            .map_err(|_| GiftTokenCoreError::InvalidToken)?;

        let record = RedemptionRecord::new(
            verified.token,
            verified.amount,
            order_reference,
            actor_reference,
        );
        match self.ledger.try_redeem(record)? {
            RedeemOutcome::Redeemed(record) => {
                tracing::debug!(amount = record.amount, "token redeemed");
                Ok(record)
            }
            RedeemOutcome::AlreadyRedeemed(prior) => Err(GiftTokenCoreError::AlreadyRedeemed(prior)),
        }
    }

    /// Existenz-Prüfung gegen den Ledger.
    pub fn is_token_redeemed(&self, token: &str) -> Result<bool, GiftTokenCoreError> {
        Ok(self.ledger.is_redeemed(token)?)
    }

    /// Liest den Einlöse-Datensatz eines Tokens (Anzeige, Audit).
    pub fn get_redemption_data(
        &self,
        token: &str,
    ) -> Result<Option<RedemptionRecord>, GiftTokenCoreError> {
        Ok(self.ledger.get_record(token)?)
    }

    /// Rechnet Satoshi in Währungseinheiten um (`sats * kurs`).
    pub fn convert_satoshis_to_currency(
        &self,
        satoshis: u64,
    ) -> Result<Decimal, GiftTokenCoreError> {
        self.rates.satoshis_to_currency(satoshis)
    }

    /// Rechnet Währungseinheiten in Satoshi um (`floor(betrag / kurs)` bei
    /// positivem Kurs, sonst `0`).
    pub fn convert_currency_to_satoshis(
        &self,
        amount: Decimal,
    ) -> Result<u64, GiftTokenCoreError> {
        self.rates.currency_to_satoshis(amount)
    }

    /// Prägt einen Wechsel-Token über den gegebenen Betrag.
    ///
    /// Wechsel wird immer als frischer Token ausgegeben, niemals als
    /// "Rückgabe" des Originals (das Original ist nach der Einlösung
    /// dauerhaft verbraucht) und niemals mit einem bestehenden,
    /// uneingelösten Token verrechnet.
    pub fn generate_change_token(&self, amount: u64) -> Result<String, GiftTokenCoreError> {
        self.create_token(amount)
    }

    /// Verrechnet Tokens gegen einen geschuldeten Betrag und gibt
    /// überschüssigen Wert als Wechsel-Token aus.
    ///
    /// Ablauf: Alle Tokens werden zuerst kryptographisch geprüft (doppelte
    /// Einträge in der Eingabe werden nur einmal angewendet), dann einzeln
    /// atomar eingelöst. Übersteigt der angewendete Gesamtwert den
    /// geschuldeten Betrag, wird der Überschuss in die Präge-Einheit des
    /// Betriebsmodus umgerechnet und, falls er mindestens eine ganze Einheit
    /// ergibt, als genau ein neuer Token geprägt. Bei `SatoshiConversion`
    /// wird der Kurs unmittelbar vor der Verrechnung aktualisiert, damit
    /// nicht auf einem veralteten Preis abgeschlossen wird.
    ///
    /// `amount_owed` ist in Währungseinheiten denominiert, bei
    /// `DirectSatoshi` in ganzen Satoshi.
    pub fn apply_tokens_to_purchase(
        &self,
        tokens: &[&str],
        amount_owed: Decimal,
        order_reference: Option<&str>,
        actor_reference: Option<&str>,
    ) -> Result<TokenSettlement, GiftTokenCoreError> {
        // 1. Strenge Validierung des geschuldeten Betrags am Eingang.
        if amount_owed.is_sign_negative() {
            return Err(GiftTokenCoreError::Generic(
                "Amount owed must not be negative.".to_string(),
            ));
        }
        let allowed_places = match self.config.mode {
            OperationalMode::DirectSatoshi => 0,
            _ => self.config.currency_decimal_places,
        };
        validate_precision(&amount_owed, allowed_places)?;

        // 2. Doppelte Eingaben nur einmal anwenden.
        let mut unique_tokens: Vec<&str> = Vec::with_capacity(tokens.len());
        for &token in tokens {
            if !unique_tokens.contains(&token) {
                unique_tokens.push(token);
            }
        }

        // 3. Alle Tokens kryptographisch prüfen, bevor der erste verbraucht wird.
        let mut verified_tokens = Vec::with_capacity(unique_tokens.len());
        for token in &unique_tokens {
            let verified = token_engine::verify_token(token, &self.keypair.public_key)
                .map_err(|_| GiftTokenCoreError::InvalidToken)?;
            verified_tokens.push(verified);
        }

        // 4. Kurs unmittelbar vor dem Abschluss festschreiben.
        let pinned_rate = match self.config.mode {
            OperationalMode::SatoshiConversion => Some(self.rates.refresh_rate()?),
            _ => None,
        };

        // 5. Einlösen; jede Einlösung einzeln atomar über den Ledger.
        let mut redeemed = Vec::with_capacity(verified_tokens.len());
        let mut applied_value = Decimal::ZERO;
        for verified in verified_tokens {
            let record = RedemptionRecord::new(
                verified.token,
                verified.amount,
                order_reference,
                actor_reference,
            );
            let record = match self.ledger.try_redeem(record)? {
                RedeemOutcome::Redeemed(record) => record,
                RedeemOutcome::AlreadyRedeemed(prior) => {
                    return Err(GiftTokenCoreError::AlreadyRedeemed(prior))
                }
            };

            applied_value += match pinned_rate {
                Some(rate) => satoshis_to_currency_at(record.amount, rate),
                None => Decimal::from(record.amount),
            };
            redeemed.push(record);
        }

        // 6. Überschuss bestimmen und als Wechsel-Token ausgeben.
        let excess = applied_value - amount_owed;
        let (change_amount, residual_value) = if excess > Decimal::ZERO {
            match self.config.mode {
                OperationalMode::StoreCurrency | OperationalMode::DirectSatoshi => {
                    let change = floor_to_u64(&excess);
                    (change, excess - Decimal::from(change))
                }
                OperationalMode::SatoshiConversion => {
                    let rate = pinned_rate.unwrap();
                    let change = currency_to_satoshis_at(excess, rate);
                    (change, excess - satoshis_to_currency_at(change, rate))
                }
            }
        } else {
            (0, Decimal::ZERO)
        };

        let change_token = if change_amount > 0 {
            Some(self.generate_change_token(change_amount)?)
        } else {
            None
        };

        tracing::debug!(
            tokens = redeemed.len(),
            %applied_value,
            %amount_owed,
            change_amount,
            "settlement completed"
        );

        Ok(TokenSettlement {
            redeemed,
            applied_value,
            amount_owed,
            change_token,
            change_amount,
            residual_value,
        })
    }
}
