// cargo test --test test_redemption_ledger
//
// Tests für die At-most-once-Garantie des Einlöse-Ledgers, insbesondere
// unter nebenläufigen Einlöse-Versuchen für denselben Token.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use gift_token_lib::models::redemption::RedemptionRecord;
    use gift_token_lib::storage::memory::InMemoryLedger;
    use gift_token_lib::test_utils::setup_in_memory_service;
    use gift_token_lib::{GiftTokenCoreError, OperationalMode, RedeemOutcome, RedemptionLedger};

    #[test]
    fn test_try_redeem_is_insert_if_absent() {
        let ledger = InMemoryLedger::new();
        let first = RedemptionRecord::new("token-a".to_string(), 50, Some("order-1"), None);
        let second = RedemptionRecord::new("token-a".to_string(), 50, Some("order-2"), None);

        // 1. Der erste Versuch fügt ein.
        let outcome = ledger.try_redeem(first.clone()).unwrap();
        assert_eq!(outcome, RedeemOutcome::Redeemed(first.clone()));

        // 2. Der zweite Versuch fügt NICHT ein und liefert den bestehenden
        //    Datensatz zurück, nicht den neu angebotenen.
        let outcome = ledger.try_redeem(second).unwrap();
        assert_eq!(outcome, RedeemOutcome::AlreadyRedeemed(first.clone()));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get_record("token-a").unwrap(), Some(first));
        assert!(ledger.is_redeemed("token-a").unwrap());
        assert!(!ledger.is_redeemed("token-b").unwrap());
        println!("SUCCESS: try_redeem is a single insert-if-absent operation.");
    }

    #[test]
    fn test_concurrent_redemption_exactly_one_winner() {
        const CONTENDERS: usize = 8;

        let service = Arc::new(setup_in_memory_service(OperationalMode::StoreCurrency));
        let token = service.create_token(100).unwrap();
        let barrier = Arc::new(Barrier::new(CONTENDERS));

        // Alle Threads starten ihre Einlösung so gleichzeitig wie möglich.
        let mut handles = Vec::with_capacity(CONTENDERS);
        for i in 0..CONTENDERS {
            let service = Arc::clone(&service);
            let token = token.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                service.redeem_token(&token, None, Some(&format!("contender-{}", i)))
            }));
        }

        let mut successes = 0;
        let mut already_redeemed = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(_) => successes += 1,
                Err(GiftTokenCoreError::AlreadyRedeemed(_)) => already_redeemed += 1,
                Err(other) => panic!("Unexpected error during concurrent redemption: {}", other),
            }
        }

        // Genau ein Gewinner, alle anderen verlieren mit `AlreadyRedeemed`,
        // unabhängig von der Verschränkung der Threads.
        assert_eq!(successes, 1);
        assert_eq!(already_redeemed, CONTENDERS - 1);
        assert!(service.is_token_redeemed(&token).unwrap());
        println!(
            "SUCCESS: {} contenders, exactly 1 success and {} rejections.",
            CONTENDERS, already_redeemed
        );
    }

    #[test]
    fn test_losing_record_does_not_overwrite_winner() {
        let service = setup_in_memory_service(OperationalMode::StoreCurrency);
        let token = service.create_token(25).unwrap();

        let winner = service.redeem_token(&token, Some("first-order"), None).unwrap();
        let _ = service.redeem_token(&token, Some("second-order"), None);

        // Der Ledger trägt weiterhin den Datensatz des Gewinners.
        let stored = service.get_redemption_data(&token).unwrap().unwrap();
        assert_eq!(stored, winner);
        assert_eq!(stored.order_reference.as_deref(), Some("first-order"));
        println!("SUCCESS: Losing attempts never mutate the ledger.");
    }

    #[test]
    fn test_unknown_token_is_not_redeemed() {
        let service = setup_in_memory_service(OperationalMode::StoreCurrency);
        let token = service.create_token(10).unwrap();

        assert!(!service.is_token_redeemed(&token).unwrap());
        assert_eq!(service.get_redemption_data(&token).unwrap(), None);
    }
}
