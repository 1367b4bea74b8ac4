// Zufallszahlengenerierung
use rand_core::OsRng;
use rand_core::RngCore;

// Kryptografische Hashes (SHA-2)
use sha2::{Digest, Sha256, Sha512};

// Ed25519 Signaturen
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey as EdPublicKey};

// Base64url-Kodierung für das Token-Drahtformat
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use std::convert::TryInto;

use thiserror::Error;

/// Fehlertyp für den Fall, dass der sichere Zufallszahlengenerator des
/// Betriebssystems nicht verfügbar ist. Ohne CSPRNG darf kein Schlüssel und
/// keine Nonce erzeugt werden.
#[derive(Debug, Error)]
#[error("Secure random number generator unavailable: {0}")]
pub struct CryptoUnavailable(pub String);

/// Generates a fresh Ed25519 signing keypair from the operating system CSPRNG.
///
/// # Errors
///
/// Returns `CryptoUnavailable` if the OS random number generator cannot
/// provide entropy. Callers must treat this as fatal and abort initialization
/// rather than operate without a key.
pub fn generate_signing_keypair() -> Result<(EdPublicKey, SigningKey), CryptoUnavailable> {
    let mut csprng = OsRng;
    let mut key_bytes = [0u8; 32];
    csprng
        .try_fill_bytes(&mut key_bytes)
        .map_err(|e| CryptoUnavailable(e.to_string()))?;

    let signing_key = SigningKey::from_bytes(&key_bytes);
    Ok((signing_key.verifying_key(), signing_key))
}

/// Erzeugt ein zufälliges oder deterministisches Ed25519-Schlüsselpaar für Testzwecke.
///
/// # Warnung
/// **Diese Funktion ist NICHT für den produktiven Einsatz geeignet!**
/// Der deterministische Pfad verwendet eine einfache Hash-Funktion und ist nicht
/// gegen Brute-Force-Angriffe gehärtet. Er dient ausschließlich dazu, in Tests
/// reproduzierbare Schlüsselpaare zu erzeugen.
///
/// # Arguments
/// * `seed` - Ein optionaler String.
///   - `None`: Erzeugt ein vollständig zufälliges, neues Schlüsselpaar.
///   - `Some(seed_str)`: Erzeugt ein deterministisches Schlüsselpaar aus dem Seed-String.
///
/// # Returns
/// Ein Tupel, das den öffentlichen und den privaten Ed25519-Schlüssel enthält.
pub fn generate_ed25519_keypair_for_tests(seed: Option<&str>) -> (EdPublicKey, SigningKey) {
    if let Some(seed_str) = seed {
        // Deterministischer Pfad: Seed hashen, um einen 32-Byte-Schlüssel zu erzeugen.
        let mut hasher = Sha512::new();
        hasher.update(seed_str.as_bytes());
        let hash_result = hasher.finalize();
        let key_bytes: [u8; 32] = hash_result[..32]
            .try_into()
            .expect("Hash output must be 64 bytes");

        let signing_key = SigningKey::from_bytes(&key_bytes);
        (signing_key.verifying_key(), signing_key)
    } else {
        // Sicherer, zufälliger Pfad für allgemeine Tests.
        let mut csprng = OsRng;
        let mut key_bytes = [0u8; 32];
        csprng.fill_bytes(&mut key_bytes);

        let signing_key = SigningKey::from_bytes(&key_bytes);
        (signing_key.verifying_key(), signing_key)
    }
}

/// Draws `N` fresh random bytes from the OS CSPRNG, e.g. for token nonces.
///
/// # Errors
///
/// Returns `CryptoUnavailable` if the OS random number generator fails.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CryptoUnavailable> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoUnavailable(e.to_string()))?;
    Ok(bytes)
}

/// Signs a message with an Ed25519 signing key.
///
/// # Arguments
///
/// * `signing_key` - The Ed25519 signing key.
/// * `message` - The message to be signed.
///
/// # Returns
///
/// The signature.
pub fn sign_ed25519(signing_key: &SigningKey, message: &[u8]) -> Signature {
    signing_key.sign(message)
}

/// Verifies an Ed25519 signature.
///
/// # Arguments
///
/// * `public_key` - The Ed25519 public key.
/// * `message` - The message to be verified.
/// * `signature` - The signature to be verified.
///
/// # Returns
///
/// `true` if the signature is valid, `false` otherwise.
pub fn verify_ed25519(public_key: &EdPublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature).is_ok()
}

/// Encodes bytes as base64url without padding (`-`/`_` alphabet).
pub fn encode_base64url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes.as_ref())
}

/// Decodes a base64url string without padding.
///
/// # Errors
///
/// Returns the underlying decode error if the input is not valid base64url.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(input)
}

/// Computes a short, human-readable fingerprint of a public key.
///
/// The fingerprint is the base58-encoded first 8 bytes of the SHA-256 hash of
/// the key. It is used for log output and CLI display, never for verification.
pub fn key_fingerprint(public_key: &EdPublicKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(public_key.as_bytes());
    let hash_bytes = hasher.finalize();
    bs58::encode(&hash_bytes[..8]).into_string()
}
