//! # key_manager.rs
//!
//! Verwaltet das Signatur-Schlüsselpaar des Herausgebers. Das Paar wird beim
//! ersten Zugriff erzeugt und über ein `KeyStore`-Backend persistiert;
//! nachfolgende Zugriffe liefern das persistierte Paar. Eine Rotation des
//! Schlüssels ist nicht vorgesehen; sie würde alle umlaufenden Tokens
//! entwerten.

use std::sync::Mutex;

use thiserror::Error;

use crate::models::keypair::IssuerKeypair;
use crate::services::crypto_utils::{self, key_fingerprint};
use crate::storage::{KeyStore, StorageError};

/// Fehler, die bei der Bereitstellung des Schlüsselpaars auftreten können.
#[derive(Debug, Error)]
pub enum KeyManagerError {
    /// Der sichere Zufallszahlengenerator fehlt. Fatal beim Start: Ohne
    /// Schlüssel darf der Dienst nicht arbeiten.
    #[error("Crypto unavailable: {0}")]
    CryptoUnavailable(#[from] crypto_utils::CryptoUnavailable),

    /// Ein Fehler im darunterliegenden Schlüssel-Speicher.
    #[error("Key storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Verwaltet das Schlüsselpaar des Herausgebers über ein `KeyStore`-Backend.
///
/// Die Instanz memoisiert das Paar, sodass wiederholte Aufrufe keinen
/// Speicherzugriff kosten. Die Erzeugung ist nebenläufigkeitssicher: Das
/// Backend entscheidet per atomarem "create if absent", welches Paar gewinnt,
/// wenn zwei Prozesse gleichzeitig starten.
pub struct KeyManager {
    store: Box<dyn KeyStore>,
    cached: Mutex<Option<IssuerKeypair>>,
}

impl KeyManager {
    /// Erstellt einen `KeyManager` über dem gegebenen Backend.
    pub fn new(store: Box<dyn KeyStore>) -> Self {
        KeyManager {
            store,
            cached: Mutex::new(None),
        }
    }

    /// Liefert das persistierte Schlüsselpaar; erzeugt und persistiert beim
    /// ersten Aufruf ein frisches Paar.
    ///
    /// Verliert dieser Prozess das Erzeugungs-Rennen gegen einen parallel
    /// startenden Prozess, wird das bereits persistierte Paar des Gewinners
    /// übernommen und das eigene verworfen.
    pub fn get_or_create_keypair(&self) -> Result<IssuerKeypair, KeyManagerError> {
        let mut cached = self.cached.lock().unwrap();
        if let Some(keypair) = cached.as_ref() {
            return Ok(keypair.clone());
        }

        if let Some(keypair) = self.store.load_keypair()? {
            *cached = Some(keypair.clone());
            return Ok(keypair);
        }

        let (_, signing_key) = crypto_utils::generate_signing_keypair()?;
        let fresh = IssuerKeypair::from_signing_key(signing_key);
        let winner = self.store.store_keypair_if_absent(&fresh)?;
        tracing::info!(
            fingerprint = %key_fingerprint(&winner.public_key),
            "issuer keypair initialized"
        );

        *cached = Some(winner.clone());
        Ok(winner)
    }
}
