//! # gift-token-cli.rs
//!
//! Ein Kommandozeilen-Tool zum Verwalten von Geschenk-Tokens.
//!
//! ## Befehle:
//! - `generate-keys`: Erzeugt (falls nötig) das Schlüsselpaar des Herausgebers.
//! - `create-token`: Prägt einen oder mehrere Tokens über einen Betrag.
//! - `verify-token`: Prüft einen Token und rekonstruiert seinen Betrag.
//! - `redeem-token`: Löst einen Token genau einmal gegen den Ledger ein.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

use gift_token_lib::{
    crypto_utils::key_fingerprint,
    services::decimal_utils::format_for_display,
    storage::file_storage::{FileKeyStore, FileRedemptionLedger},
    FixedRateOracle, GiftTokenConfig, KeyManager, TokenService, TokenState,
};

/// Das Haupt-Struct für das CLI-Tool, das von `clap` geparst wird.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verzeichnis mit den Schlüsseldateien des Herausgebers.
    #[arg(long, default_value = "target/issuer-keys")]
    key_dir: PathBuf,

    /// Pfad zur Ledger-Datei mit den Einlöse-Datensätzen.
    #[arg(long, default_value = "target/redemptions.json")]
    ledger: PathBuf,

    /// Optionaler Pfad zu einer TOML-Konfigurationsdatei.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Definiert die verfügbaren Unterbefehle.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Erzeugt das Ed25519-Schlüsselpaar des Herausgebers, falls noch keines existiert.
    GenerateKeys,

    /// Prägt einen oder mehrere Tokens über den angegebenen Betrag.
    CreateToken {
        /// Der Betrag in der Einheit des konfigurierten Betriebsmodus.
        amount: u64,

        /// Anzahl der zu prägenden, unabhängigen Tokens.
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Prüft einen Token und zeigt Betrag, Nonce und Einlöse-Status an.
    VerifyToken {
        /// Der vollständige Token-String.
        token: String,
    },

    /// Löst einen Token gegen den Ledger ein.
    RedeemToken {
        /// Der vollständige Token-String.
        token: String,

        /// Optionale Bestell-Referenz für den Einlöse-Datensatz.
        #[arg(long)]
        order_ref: Option<String>,

        /// Optionale Akteurs-Referenz für den Einlöse-Datensatz.
        #[arg(long)]
        actor_ref: Option<String>,
    },
}

/// Hauptfunktion des Programms.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.clone())?;
    let service = build_service(&cli.key_dir, &cli.ledger, config.clone())?;

    match cli.command {
        Commands::GenerateKeys => generate_keys(&cli.key_dir)?,
        Commands::CreateToken { amount, quantity } => create_tokens(&service, amount, quantity)?,
        Commands::VerifyToken { token } => verify_token(&service, &config, &token)?,
        Commands::RedeemToken {
            token,
            order_ref,
            actor_ref,
        } => redeem_token(&service, &token, order_ref.as_deref(), actor_ref.as_deref())?,
    }

    Ok(())
}

/// Lädt die Konfiguration aus der angegebenen Datei oder verwendet die Defaults.
fn load_config(path: Option<PathBuf>) -> Result<GiftTokenConfig> {
    match path {
        Some(path) => {
            let toml_str = fs::read_to_string(&path)
                .with_context(|| format!("Konnte Konfiguration aus {} nicht laden", path.display()))?;
            GiftTokenConfig::from_toml_str(&toml_str)
                .with_context(|| format!("Konfiguration in {} ist ungültig", path.display()))
        }
        None => Ok(GiftTokenConfig::default()),
    }
}

/// Baut den `TokenService` über den dateibasierten Backends auf.
fn build_service(
    key_dir: &Path,
    ledger_path: &Path,
    config: GiftTokenConfig,
) -> Result<TokenService> {
    let key_manager = KeyManager::new(Box::new(FileKeyStore::new(key_dir)));
    let ledger = FileRedemptionLedger::open(ledger_path)
        .with_context(|| format!("Konnte Ledger {} nicht öffnen", ledger_path.display()))?;

    // Das CLI hat keine Live-Kursquelle; der konfigurierte Fallback-Kurs
    // dient als Festkurs.
    let oracle = FixedRateOracle::new(config.fallback_rate.unwrap_or(Decimal::ZERO));

    TokenService::new(&key_manager, Box::new(ledger), config, Box::new(oracle))
        .context("TokenService konnte nicht initialisiert werden")
}

/// Logik für den `generate-keys`-Befehl.
fn generate_keys(key_dir: &Path) -> Result<()> {
    println!("🔑 Stelle Herausgeber-Schlüsselpaar bereit...");

    let key_manager = KeyManager::new(Box::new(FileKeyStore::new(key_dir)));
    let keypair = key_manager
        .get_or_create_keypair()
        .context("Schlüsselpaar konnte nicht erzeugt werden")?;

    println!("✅ Schlüsselpaar verfügbar!");
    println!("   - Schlüsselverzeichnis: {}", key_dir.display());
    println!("   - Fingerprint: {}", key_fingerprint(&keypair.public_key));

    Ok(())
}

/// Logik für den `create-token`-Befehl.
fn create_tokens(service: &TokenService, amount: u64, quantity: u32) -> Result<()> {
    let tokens = service
        .create_tokens_batch(amount, quantity)
        .context("Token-Erstellung fehlgeschlagen")?;

    println!("✅ {} Token(s) über Betrag {} geprägt:", tokens.len(), amount);
    for token in tokens {
        println!("{}", token);
    }

    Ok(())
}

/// Logik für den `verify-token`-Befehl.
fn verify_token(service: &TokenService, config: &GiftTokenConfig, token: &str) -> Result<()> {
    let state = service.verify_token(token, true)?;
    match &state {
        TokenState::Invalid => println!("❌ Token ist ungültig."),
        TokenState::ValidUnredeemed(verified) => {
            println!("✅ Token ist gültig und nicht eingelöst.");
            println!("   - Betrag: {}", verified.amount);
            println!("   - Nonce:  {}", hex::encode(&verified.nonce));
        }
        TokenState::ValidButRedeemed(verified, record) => {
            println!("⚠️  Token ist gültig, wurde aber bereits eingelöst.");
            println!("   - Betrag:     {}", verified.amount);
            println!("   - Nonce:      {}", hex::encode(&verified.nonce));
            println!("   - Eingelöst:  {}", record.redeemed_at);
            if let Some(order) = &record.order_reference {
                println!("   - Bestellung: {}", order);
            }
        }
    }

    // Zusatzanzeige: der Gegenwert in der Anzeigewährung, falls ein Kurs vorliegt.
    if let Some(amount) = state.amount() {
        if let Ok(currency_value) = service.convert_satoshis_to_currency(amount) {
            if currency_value > Decimal::ZERO {
                println!(
                    "   - Gegenwert:  {} {}",
                    format_for_display(&currency_value, config.currency_decimal_places),
                    config.currency
                );
            }
        }
    }

    Ok(())
}

/// Logik für den `redeem-token`-Befehl.
fn redeem_token(
    service: &TokenService,
    token: &str,
    order_ref: Option<&str>,
    actor_ref: Option<&str>,
) -> Result<()> {
    let record = service
        .redeem_token(token, order_ref, actor_ref)
        .context("Einlösung fehlgeschlagen")?;

    println!("✅ Token eingelöst!");
    println!("   - Betrag:    {}", record.amount);
    println!("   - Zeitpunkt: {}", record.redeemed_at);

    Ok(())
}
