// cargo test --test test_file_storage
//
// Tests für den dateibasierten Einlöse-Ledger: Persistenz über Neustarts,
// Verhalten bei fehlenden und beschädigten Dateien.

#[cfg(test)]
mod tests {
    use gift_token_lib::models::redemption::RedemptionRecord;
    use gift_token_lib::storage::file_storage::FileRedemptionLedger;
    use gift_token_lib::storage::memory::InMemoryKeyStore;
    use gift_token_lib::test_utils::{test_config, ISSUER};
    use gift_token_lib::{
        FixedRateOracle, KeyManager, OperationalMode, RedeemOutcome, RedemptionLedger, StorageError,
        TokenService,
    };
    use rust_decimal::Decimal;

    /// Baut einen `TokenService` über einem dateibasierten Ledger auf.
    fn service_with_file_ledger(ledger_path: &std::path::Path) -> TokenService {
        let key_manager = KeyManager::new(Box::new(InMemoryKeyStore::with_keypair(ISSUER.clone())));
        let ledger = FileRedemptionLedger::open(ledger_path).unwrap();
        TokenService::new(
            &key_manager,
            Box::new(ledger),
            test_config(OperationalMode::StoreCurrency),
            Box::new(FixedRateOracle::new(Decimal::ZERO)),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_file_starts_an_empty_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ledger = FileRedemptionLedger::open(temp_dir.path().join("redemptions.json")).unwrap();
        assert!(!ledger.is_redeemed("anything").unwrap());
        assert_eq!(ledger.get_record("anything").unwrap(), None);
    }

    #[test]
    fn test_redemptions_survive_a_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let ledger_path = temp_dir.path().join("redemptions.json");

        // 1. Einlösen und Service (samt Ledger) verwerfen.
        let token;
        let record;
        {
            let service = service_with_file_ledger(&ledger_path);
            token = service.create_token(75)?;
            record = service.redeem_token(&token, Some("order-7"), Some("clerk-1"))?;
        }
        assert!(ledger_path.exists());

        // 2. "Neustart": Der wieder geöffnete Ledger kennt die Einlösung, der
        //    Token ist nicht erneut einlösbar.
        let service = service_with_file_ledger(&ledger_path);
        assert!(service.is_token_redeemed(&token)?);
        assert_eq!(service.get_redemption_data(&token)?, Some(record));
        assert!(service.redeem_token(&token, None, None).is_err());
        println!("SUCCESS: Redemption state survived the reopen.");
        Ok(())
    }

    #[test]
    fn test_direct_ledger_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ledger_path = temp_dir.path().join("redemptions.json");

        let record = RedemptionRecord::new("token-x".to_string(), 12, None, Some("kiosk"));
        {
            let ledger = FileRedemptionLedger::open(&ledger_path).unwrap();
            let outcome = ledger.try_redeem(record.clone()).unwrap();
            assert_eq!(outcome, RedeemOutcome::Redeemed(record.clone()));
        }

        let reopened = FileRedemptionLedger::open(&ledger_path).unwrap();
        assert_eq!(reopened.get_record("token-x").unwrap(), Some(record.clone()));

        // Auch nach dem Neu-Öffnen gilt die Eindeutigkeit.
        let retry = RedemptionRecord::new("token-x".to_string(), 12, None, None);
        let outcome = reopened.try_redeem(retry).unwrap();
        assert_eq!(outcome, RedeemOutcome::AlreadyRedeemed(record));
        println!("SUCCESS: Uniqueness holds across reopen.");
    }

    #[test]
    fn test_corrupted_ledger_file_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ledger_path = temp_dir.path().join("redemptions.json");
        std::fs::write(&ledger_path, b"{ this is not json").unwrap();

        let result = FileRedemptionLedger::open(&ledger_path);
        assert!(
            matches!(result, Err(StorageError::InvalidFormat(_))),
            "A corrupted ledger must fail loudly, not start empty"
        );
        println!("SUCCESS: Corrupted ledger file is rejected.");
    }

    #[test]
    fn test_no_temp_file_remains_after_persisting() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ledger_path = temp_dir.path().join("redemptions.json");

        let ledger = FileRedemptionLedger::open(&ledger_path).unwrap();
        let record = RedemptionRecord::new("token-y".to_string(), 5, None, None);
        ledger.try_redeem(record).unwrap();

        assert!(ledger_path.exists());
        assert!(!ledger_path.with_extension("tmp").exists());
    }
}
