// cargo test --test test_token_security
//
// Sicherheits-Tests für das Token-Format: Manipulation, Fälschung und
// fehlerhafte Eingaben dürfen niemals als gültige Tokens akzeptiert werden
// und niemals zu einem Absturz führen.

#[cfg(test)]
mod tests {
    use gift_token_lib::services::crypto_utils::{decode_base64url, encode_base64url};
    use gift_token_lib::services::token_engine::{
        create_token, verify_token, verify_token_bounded, TokenEngineError, TOKEN_SEPARATOR,
    };
    use gift_token_lib::test_utils::{ISSUER, SECOND_ISSUER};

    /// Suchgrenze für die Negativ-Suchen in diesen Tests. Ein manipulierter
    /// Token scheitert für jeden Kandidaten-Betrag; eine kleine Grenze hält
    /// die Tests schnell, ohne die Aussage zu schwächen.
    const SEARCH_BOUND: u64 = 2_000;

    /// Dekodiert einen Token-Teil, kippt ein einzelnes Bit und setzt den
    /// Token wieder zusammen.
    fn flip_bit_in_part(token: &str, part_index: usize, bit: usize) -> String {
        let mut parts: Vec<String> = token
            .split(TOKEN_SEPARATOR)
            .map(str::to_string)
            .collect();
        let mut bytes = decode_base64url(&parts[part_index]).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        parts[part_index] = encode_base64url(&bytes);
        parts.join(&TOKEN_SEPARATOR.to_string())
    }

    #[test]
    fn test_tampered_nonce_is_rejected() {
        let token = create_token(250, &ISSUER.signing_key).unwrap();

        // Kippe je ein Bit an verschiedenen Positionen der Nonce.
        for bit in [0, 7, 63, 127] {
            let tampered = flip_bit_in_part(&token, 1, bit);
            assert_ne!(token, tampered);
            let result = verify_token_bounded(&tampered, &ISSUER.public_key, SEARCH_BOUND);
            assert_eq!(
                result.unwrap_err(),
                TokenEngineError::VerificationFailed,
                "Tampered nonce (bit {}) must not verify",
                bit
            );
        }
        println!("SUCCESS: Single-bit nonce tampering is rejected.");
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let token = create_token(250, &ISSUER.signing_key).unwrap();

        for bit in [0, 100, 255, 511] {
            let tampered = flip_bit_in_part(&token, 2, bit);
            let result = verify_token_bounded(&tampered, &ISSUER.public_key, SEARCH_BOUND);
            assert_eq!(
                result.unwrap_err(),
                TokenEngineError::VerificationFailed,
                "Tampered signature (bit {}) must not verify",
                bit
            );
        }
        println!("SUCCESS: Single-bit signature tampering is rejected.");
    }

    #[test]
    fn test_foreign_issuer_key_is_rejected() {
        // Ein Token eines fremden Herausgebers verifiziert nicht gegen
        // unseren öffentlichen Schlüssel.
        let foreign_token = create_token(250, &SECOND_ISSUER.signing_key).unwrap();
        let result = verify_token_bounded(&foreign_token, &ISSUER.public_key, SEARCH_BOUND);
        assert_eq!(result.unwrap_err(), TokenEngineError::VerificationFailed);

        // Gegen den eigenen Schlüssel des fremden Herausgebers ist er gültig.
        let verified = verify_token_bounded(&foreign_token, &SECOND_ISSUER.public_key, SEARCH_BOUND);
        assert_eq!(verified.unwrap().amount, 250);
        println!("SUCCESS: Signatures are bound to the issuer key.");
    }

    #[test]
    fn test_malformed_inputs_never_panic() {
        let valid = create_token(10, &ISSUER.signing_key).unwrap();
        let parts: Vec<&str> = valid.split(TOKEN_SEPARATOR).collect();

        let two_parts = format!("{}{}{}", parts[0], TOKEN_SEPARATOR, parts[1]);
        let four_parts = format!("{}{}extra", valid, TOKEN_SEPARATOR);
        let wrong_prefix = format!("WRONG{}{}{}{}", TOKEN_SEPARATOR, parts[1], TOKEN_SEPARATOR, parts[2]);
        let bad_base64 = format!("{}{}!!!{}{}", parts[0], TOKEN_SEPARATOR, TOKEN_SEPARATOR, parts[2]);
        let short_nonce = format!(
            "{}{}{}{}{}",
            parts[0],
            TOKEN_SEPARATOR,
            encode_base64url([0u8; 8]),
            TOKEN_SEPARATOR,
            parts[2]
        );
        let short_signature = format!(
            "{}{}{}{}{}",
            parts[0],
            TOKEN_SEPARATOR,
            parts[1],
            TOKEN_SEPARATOR,
            encode_base64url([0u8; 32])
        );

        let cases = [
            ("two parts", two_parts),
            ("four parts", four_parts),
            ("wrong prefix", wrong_prefix),
            ("bad base64", bad_base64),
            ("short nonce", short_nonce),
            ("short signature", short_signature),
            ("empty string", String::new()),
        ];

        for (name, input) in &cases {
            let result = verify_token(input, &ISSUER.public_key);
            assert!(
                matches!(result, Err(TokenEngineError::MalformedToken(_))),
                "Input '{}' must be rejected as malformed, got {:?}",
                name,
                result
            );
        }
        println!("SUCCESS: All malformed inputs were rejected without panicking.");
    }
}
