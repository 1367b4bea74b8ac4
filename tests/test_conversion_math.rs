// cargo test --test test_conversion_math
//
// Tests für die Satoshi⇄Währungs-Umrechnung, den Kurs-Cache und das
// Fallback-Verhalten bei Orakel-Ausfall.

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use gift_token_lib::services::rate_service::{
        currency_to_satoshis_at, satoshis_to_currency_at,
    };
    use gift_token_lib::storage::memory::InMemoryLedger;
    use gift_token_lib::test_utils::{
        setup_service, setup_service_with_rate, test_config, FailingOracle,
    };
    use gift_token_lib::{GiftTokenCoreError, OperationalMode};

    #[test]
    fn test_reference_conversion_scenario() {
        // Referenz-Szenario: Kurs 0.0005 Währungseinheiten pro Satoshi.
        let service = setup_service_with_rate(OperationalMode::SatoshiConversion, dec!(0.0005));

        assert_eq!(service.convert_satoshis_to_currency(1000).unwrap(), dec!(0.5));
        assert_eq!(service.convert_currency_to_satoshis(dec!(0.5)).unwrap(), 1000);
        println!("SUCCESS: 1000 sats == 0.5 currency units at rate 0.0005.");
    }

    #[test]
    fn test_floor_rounding_asymmetry() {
        // Die Rückrichtung rundet ab: floor(0.0007 / 0.0005) = 1 Satoshi,
        // dessen Gegenwert (0.0005) kleiner als die Eingabe ist. Diese
        // Asymmetrie ist dokumentiertes Verhalten.
        let rate = dec!(0.0005);
        let sats = currency_to_satoshis_at(dec!(0.0007), rate);
        assert_eq!(sats, 1);
        let back = satoshis_to_currency_at(sats, rate);
        assert!(back < dec!(0.0007));
        println!("SUCCESS: Floor asymmetry confirmed ({} < 0.0007).", back);
    }

    #[test]
    fn test_zero_rate_yields_zero_satoshis() {
        assert_eq!(currency_to_satoshis_at(dec!(123.45), Decimal::ZERO), 0);
        assert_eq!(currency_to_satoshis_at(dec!(123.45), dec!(-1)), 0);
    }

    #[test]
    fn test_fallback_rate_on_oracle_outage() {
        // Orakel fällt aus, aber ein Fallback-Kurs ist konfiguriert: Die
        // Umrechnung bleibt verfügbar und nutzt den Fallback.
        let mut config = test_config(OperationalMode::SatoshiConversion);
        config.fallback_rate = Some(dec!(0.0004));
        let service = setup_service(
            config,
            Box::new(InMemoryLedger::new()),
            Box::new(FailingOracle),
        );

        assert_eq!(service.convert_satoshis_to_currency(1000).unwrap(), dec!(0.4));
        println!("SUCCESS: Fallback rate kept conversion available.");
    }

    #[test]
    fn test_rate_unavailable_without_fallback() {
        // Orakel fällt aus und es gibt weder Cache noch Fallback: Die
        // Umrechnung schlägt mit `RateUnavailable` fehl statt stillschweigend
        // mit einem erfundenen Kurs zu rechnen.
        let service = setup_service(
            test_config(OperationalMode::SatoshiConversion),
            Box::new(InMemoryLedger::new()),
            Box::new(FailingOracle),
        );

        let result = service.convert_satoshis_to_currency(1000);
        assert!(matches!(result, Err(GiftTokenCoreError::RateUnavailable(_))));
        println!("SUCCESS: Missing rate is an explicit error.");
    }

    #[test]
    fn test_manual_rate_override_takes_precedence() {
        // Die manuelle Übersteuerung füllt den Cache; das (ausgefallene)
        // Orakel wird danach nicht mehr befragt.
        let service = setup_service(
            test_config(OperationalMode::SatoshiConversion),
            Box::new(InMemoryLedger::new()),
            Box::new(FailingOracle),
        );

        service.rates().override_rate(dec!(0.001));
        assert_eq!(service.convert_satoshis_to_currency(500).unwrap(), dec!(0.5));

        let cached = service.rates().cached_rate().unwrap();
        assert_eq!(cached.rate, dec!(0.001));
        assert!(!cached.updated_at.is_empty());
        println!("SUCCESS: Manual override feeds the cache.");
    }

    #[test]
    fn test_refresh_overwrites_cached_rate() {
        let service = setup_service_with_rate(OperationalMode::SatoshiConversion, dec!(0.0005));

        // Erst einen abweichenden Kurs in den Cache legen, dann explizit
        // aktualisieren: Der Orakel-Kurs überschreibt den Cache-Wert.
        service.rates().override_rate(dec!(0.9));
        assert_eq!(service.rates().current_rate().unwrap(), dec!(0.9));

        let refreshed = service.rates().refresh_rate().unwrap();
        assert_eq!(refreshed, dec!(0.0005));
        assert_eq!(service.rates().cached_rate().unwrap().rate, dec!(0.0005));
        println!("SUCCESS: Explicit refresh is overwrite-with-latest.");
    }
}
