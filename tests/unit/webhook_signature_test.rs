use hmac::{Hmac, Mac};
use sha2::Sha512;

use estatepay::config::GatewayConfig;
use estatepay::modules::gateways::{PaymentGateway, PaystackClient};

type HmacSha512 = Hmac<Sha512>;

fn client_with_secret(webhook_secret: &str) -> PaystackClient {
    PaystackClient::new(GatewayConfig {
        secret_key: "sk_test_xyz".to_string(),
        webhook_secret: webhook_secret.to_string(),
        base_url: "https://api.paystack.co".to_string(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod webhook_signature_tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] =
        br#"{"event":"charge.success","data":{"reference":"trx_u1_1700000000_ab12cd34"}}"#;

    #[test]
    fn test_valid_signature_is_accepted() {
        let client = client_with_secret(SECRET);
        let signature = sign(SECRET, BODY);

        assert!(client.verify_webhook_signature(&signature, BODY));
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let client = client_with_secret(SECRET);
        let signature = sign(SECRET, BODY);

        let mut tampered = BODY.to_vec();
        tampered[10] ^= 0x01;

        assert!(!client.verify_webhook_signature(&signature, &tampered));
    }

    #[test]
    fn test_signature_from_wrong_secret_is_rejected() {
        let client = client_with_secret(SECRET);
        let signature = sign("whsec_other_secret", BODY);

        assert!(!client.verify_webhook_signature(&signature, BODY));
    }

    #[test]
    fn test_garbage_signature_is_rejected() {
        let client = client_with_secret(SECRET);

        assert!(!client.verify_webhook_signature("not-hex!", BODY));
        assert!(!client.verify_webhook_signature("deadbeef", BODY));
        assert!(!client.verify_webhook_signature("", BODY));
    }

    #[test]
    fn test_signature_is_case_insensitive_hex() {
        let client = client_with_secret(SECRET);
        let signature = sign(SECRET, BODY).to_uppercase();

        assert!(client.verify_webhook_signature(&signature, BODY));
    }
}
