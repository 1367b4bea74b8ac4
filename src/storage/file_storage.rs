//! # src/storage/file_storage.rs
//!
//! Dateibasierte Implementierungen von `KeyStore` und `RedemptionLedger`.
//! Der Schlüssel liegt als Rohbytes in einem Schlüsselverzeichnis, der Ledger
//! als JSON-Datei; geschrieben wird über eine temporäre Datei mit
//! anschließendem Umbenennen, damit nie ein halb geschriebener Ledger auf der
//! Platte liegt.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};

use crate::models::keypair::IssuerKeypair;
use crate::models::redemption::RedemptionRecord;
use crate::storage::{KeyStore, RedeemOutcome, RedemptionLedger, StorageError};

// --- Interne Konstanten und Strukturen ---

const SIGNING_KEY_FILE_NAME: &str = "issuer.key";
const PUBLIC_KEY_FILE_NAME: &str = "issuer.pub";

/// Container für die serialisierte Ledger-Datei.
#[derive(Serialize, Deserialize, Default)]
struct LedgerFileContainer {
    records: HashMap<String, RedemptionRecord>,
}

// --- FileKeyStore Implementierung ---

/// Ein `KeyStore`, der beide Schlüsselhälften als Rohbytes im Dateisystem ablegt.
pub struct FileKeyStore {
    /// Der Pfad zum Verzeichnis, das die Schlüsseldateien enthält.
    key_directory: PathBuf,
}

impl FileKeyStore {
    /// Erstellt eine neue `FileKeyStore`-Instanz für ein bestimmtes Verzeichnis.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileKeyStore {
            key_directory: path.into(),
        }
    }

    fn signing_key_path(&self) -> PathBuf {
        self.key_directory.join(SIGNING_KEY_FILE_NAME)
    }
}

impl KeyStore for FileKeyStore {
    fn load_keypair(&self) -> Result<Option<IssuerKeypair>, StorageError> {
        let key_path = self.signing_key_path();
        if !key_path.exists() {
            return Ok(None);
        }

        let key_bytes: [u8; 32] = fs::read(&key_path)?
            .try_into()
            .map_err(|_| StorageError::InvalidFormat("Signing key file has invalid length".to_string()))?;
        let signing_key = SigningKey::from_bytes(&key_bytes);
        Ok(Some(IssuerKeypair::from_signing_key(signing_key)))
    }

    fn store_keypair_if_absent(
        &self,
        keypair: &IssuerKeypair,
    ) -> Result<IssuerKeypair, StorageError> {
        fs::create_dir_all(&self.key_directory)?;

        // `create_new` ist die atomare "insert if absent"-Operation des
        // Dateisystems: Genau ein Prozess gewinnt das Anlegen der Datei.
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.signing_key_path())
        {
            Ok(mut file) => {
                file.write_all(&keypair.signing_key.to_bytes())?;
                // Die öffentliche Hälfte dient der Einsichtnahme; maßgeblich
                // ist beim Laden allein die private Hälfte.
                fs::write(
                    self.key_directory.join(PUBLIC_KEY_FILE_NAME),
                    keypair.public_key.to_bytes(),
                )?;
                Ok(keypair.clone())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => self
                .load_keypair()?
                .ok_or_else(|| {
                    StorageError::Generic(
                        "Key file existed during store but could not be loaded".to_string(),
                    )
                }),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

// --- FileRedemptionLedger Implementierung ---

/// Ein `RedemptionLedger`, der seine Datensätze in einer JSON-Datei hält.
///
/// Die komplette Map wird im Speicher gehalten; die Sperre bleibt über die
/// gesamte Lese-Ändern-Schreiben-Sequenz gehalten, sodass die
/// Eindeutigkeits-Garantie auch unter nebenläufigen Einlösungen gilt.
///
/// Die Instanz geht von exklusivem Zugriff auf die Datei aus: Der Ledger ist
/// der eine autoritative Speicher des Systems, nicht ein geteiltes Medium
/// zwischen mehreren gleichzeitig laufenden Prozessen.
pub struct FileRedemptionLedger {
    ledger_path: PathBuf,
    records: Mutex<HashMap<String, RedemptionRecord>>,
}

impl FileRedemptionLedger {
    /// Öffnet den Ledger; eine vorhandene Datei wird eingelesen, eine fehlende
    /// beim ersten Einlösen angelegt.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let ledger_path = path.into();
        let records = if ledger_path.exists() {
            let container_bytes = fs::read(&ledger_path)?;
            let container: LedgerFileContainer = serde_json::from_slice(&container_bytes)
                .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;
            container.records
        } else {
            HashMap::new()
        };

        Ok(FileRedemptionLedger {
            ledger_path,
            records: Mutex::new(records),
        })
    }

    /// Schreibt den kompletten Bestand über eine temporäre Datei und benennt
    /// sie anschließend um.
    fn persist(&self, records: &HashMap<String, RedemptionRecord>) -> Result<(), StorageError> {
        if let Some(parent) = self.ledger_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let container = LedgerFileContainer {
            records: records.clone(),
        };
        let serialized = serde_json::to_vec_pretty(&container)
            .map_err(|e| StorageError::InvalidFormat(e.to_string()))?;

        let tmp_path = self.ledger_path.with_extension("tmp");
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, &self.ledger_path)?;
        Ok(())
    }
}

impl RedemptionLedger for FileRedemptionLedger {
    fn is_redeemed(&self, token: &str) -> Result<bool, StorageError> {
        Ok(self.records.lock().unwrap().contains_key(token))
    }

    fn try_redeem(&self, record: RedemptionRecord) -> Result<RedeemOutcome, StorageError> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.get(&record.token) {
            return Ok(RedeemOutcome::AlreadyRedeemed(existing.clone()));
        }

        let token = record.token.clone();
        records.insert(token.clone(), record.clone());
        if let Err(e) = self.persist(&records) {
            // Ohne dauerhafte Schreibung gilt der Token als nicht eingelöst.
            records.remove(&token);
            return Err(e);
        }
        Ok(RedeemOutcome::Redeemed(record))
    }

    fn get_record(&self, token: &str) -> Result<Option<RedemptionRecord>, StorageError> {
        Ok(self.records.lock().unwrap().get(token).cloned())
    }
}
