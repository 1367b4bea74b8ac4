//! # keypair.rs
//!
//! Definiert das Signatur-Schlüsselpaar des Herausgebers. Der private
//! Schlüssel wird sicher im Speicher gehalten und beim Verlassen des
//! Gültigkeitsbereichs genullt.

use ed25519_dalek::{SigningKey, VerifyingKey as EdPublicKey};
use zeroize::ZeroizeOnDrop;

/// Das Ed25519-Schlüsselpaar, mit dem Tokens signiert und geprüft werden.
///
/// Wird exklusiv vom `KeyManager` verwaltet; die Token-Engine erhält nur
/// Referenzen auf die einzelnen Schlüsselhälften. Der private Schlüssel wird
/// nicht serialisiert und verlässt die Bibliothek nur über den `KeyStore`.
#[derive(Clone, ZeroizeOnDrop)]
pub struct IssuerKeypair {
    /// Der private Ed25519-Signaturschlüssel.
    pub signing_key: SigningKey,
    /// Der öffentliche Ed25519-Prüfschlüssel, abgeleitet vom privaten Schlüssel.
    #[zeroize(skip)]
    pub public_key: EdPublicKey,
}

impl IssuerKeypair {
    /// Konstruiert das Paar aus dem privaten Schlüssel; die öffentliche Hälfte
    /// wird deterministisch abgeleitet.
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = signing_key.verifying_key();
        IssuerKeypair {
            signing_key,
            public_key,
        }
    }
}
