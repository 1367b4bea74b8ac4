//! # src/storage/memory.rs
//!
//! In-Memory-Implementierungen von `KeyStore` und `RedemptionLedger`.
//! Gedacht für Tests und für Einbettungen, die keine eigene Persistenz
//! benötigen; die Atomaritäts-Garantien sind identisch mit den
//! dateibasierten Implementierungen.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::keypair::IssuerKeypair;
use crate::models::redemption::RedemptionRecord;
use crate::storage::{KeyStore, RedeemOutcome, RedemptionLedger, StorageError};

/// Ein `KeyStore`, der das Schlüsselpaar nur im Speicher hält.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keypair: Mutex<Option<IssuerKeypair>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt einen Store, der bereits ein Schlüsselpaar enthält.
    /// Nützlich, wenn mehrere Dienste dasselbe Paar teilen sollen.
    pub fn with_keypair(keypair: IssuerKeypair) -> Self {
        InMemoryKeyStore {
            keypair: Mutex::new(Some(keypair)),
        }
    }
}

impl KeyStore for InMemoryKeyStore {
    fn load_keypair(&self) -> Result<Option<IssuerKeypair>, StorageError> {
        Ok(self.keypair.lock().unwrap().clone())
    }

    fn store_keypair_if_absent(
        &self,
        keypair: &IssuerKeypair,
    ) -> Result<IssuerKeypair, StorageError> {
        let mut stored = self.keypair.lock().unwrap();
        match stored.as_ref() {
            Some(existing) => Ok(existing.clone()),
            None => {
                *stored = Some(keypair.clone());
                Ok(keypair.clone())
            }
        }
    }
}

/// Ein `RedemptionLedger` über einer gesperrten Hash-Map.
///
/// Das Einfügen läuft über die Entry-API unter einer einzigen Sperre und ist
/// damit die geforderte unteilbare Prüfen-und-Einfügen-Operation.
#[derive(Default)]
pub struct InMemoryLedger {
    records: Mutex<HashMap<String, RedemptionRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl der Datensätze im Ledger (für Tests und Statusanzeigen).
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RedemptionLedger for InMemoryLedger {
    fn is_redeemed(&self, token: &str) -> Result<bool, StorageError> {
        Ok(self.records.lock().unwrap().contains_key(token))
    }

    fn try_redeem(&self, record: RedemptionRecord) -> Result<RedeemOutcome, StorageError> {
        let mut records = self.records.lock().unwrap();
        match records.entry(record.token.clone()) {
            Entry::Occupied(existing) => Ok(RedeemOutcome::AlreadyRedeemed(existing.get().clone())),
            Entry::Vacant(slot) => Ok(RedeemOutcome::Redeemed(slot.insert(record).clone())),
        }
    }

    fn get_record(&self, token: &str) -> Result<Option<RedemptionRecord>, StorageError> {
        Ok(self.records.lock().unwrap().get(token).cloned())
    }
}
