//! Stripe webhook signature verification.
//!
//! HMAC-SHA256 over `"{timestamp}.{raw body}"` with the endpoint signing
//! secret, plus a freshness window against replayed deliveries.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use crate::domain::payment::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// Every v1 signature present. Stripe sends several while a secret is rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>...]`
    ///
    /// # Errors
    ///
    /// `MissingSignature` for an empty header, `ParseError` for anything
    /// malformed.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        if header.trim().is_empty() {
            return Err(WebhookError::MissingSignature);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                // v0 and future schemes are ignored
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    secret: SecretString,
}

impl StripeWebhookVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the webhook signature and parses the event.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` / `ParseError` - header absent or malformed
    /// - `TimestampOutOfRange` - signed more than 5 minutes ago
    /// - `InvalidTimestamp` - signed in the future beyond clock skew
    /// - `InvalidSignature` - no v1 signature matches
    /// - `ParseError` - body is not a Stripe event
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;
        validate_timestamp(header.timestamp, chrono::Utc::now().timestamp())?;

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, payload)?;
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }
}

fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    let age = now.checked_sub(timestamp).ok_or(WebhookError::InvalidTimestamp)?;

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }
    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| WebhookError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Builds a valid `Stripe-Signature` header for a payload.
///
/// Used by the mock gateway and by tests that drive the webhook endpoint.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    match compute_signature(secret, timestamp, payload) {
        Ok(signature) => format!("t={},v1={}", timestamp, hex::encode(signature)),
        Err(_) => format!("t={}", timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::OrderId;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    fn verifier() -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn payload() -> Vec<u8> {
        super::super::checkout_event_json(
            "evt_test",
            "checkout.session.completed",
            &OrderId::new(),
            Some("pi_1"),
            1500,
        )
        .to_string()
        .into_bytes()
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_single_v1() {
        let header = SignatureHeader::parse("t=1704067200,v1=abcd").unwrap();
        assert_eq!(header.timestamp, 1704067200);
        assert_eq!(header.v1_signatures, vec![vec![0xab, 0xcd]]);
    }

    #[test]
    fn parse_header_collects_every_v1_and_ignores_v0() {
        let header = SignatureHeader::parse("t=1,v1=aa,v0=ff,v1=bb").unwrap();
        assert_eq!(header.v1_signatures, vec![vec![0xaa], vec![0xbb]]);
    }

    #[test]
    fn parse_empty_header_is_missing_signature() {
        assert!(matches!(
            SignatureHeader::parse("  "),
            Err(WebhookError::MissingSignature)
        ));
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        assert!(matches!(
            SignatureHeader::parse("v1=abcd"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1704067200,v0=abcd"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1704067200,v1=zz"),
            Err(WebhookError::ParseError(_))
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let body = payload();
        let header = signature_header(TEST_SECRET, now(), &body);

        let event = verifier().verify_and_parse(&body, &header).unwrap();

        assert_eq!(event.id, "evt_test");
    }

    #[test]
    fn verify_accepts_any_matching_v1() {
        let body = payload();
        let ts = now();
        let good = signature_header(TEST_SECRET, ts, &body);
        let good_sig = good.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", ts, "00".repeat(32), good_sig);

        assert!(verifier().verify_and_parse(&body, &header).is_ok());
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let body = payload();
        let header = signature_header("whsec_other", now(), &body);

        assert!(matches!(
            verifier().verify_and_parse(&body, &header),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let body = payload();
        let header = signature_header(TEST_SECRET, now(), &body);
        let tampered = String::from_utf8(body).unwrap().replace("1500", "1");

        assert!(matches!(
            verifier().verify_and_parse(tampered.as_bytes(), &header),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_invalid_json_with_valid_signature_fails_to_parse() {
        let body = b"not json".to_vec();
        let header = signature_header(TEST_SECRET, now(), &body);

        assert!(matches!(
            verifier().verify_and_parse(&body, &header),
            Err(WebhookError::ParseError(_))
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Window Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn timestamp_at_boundary_succeeds() {
        assert!(validate_timestamp(1000, 1000 + MAX_EVENT_AGE_SECS).is_ok());
    }

    #[test]
    fn timestamp_just_past_boundary_fails() {
        assert!(matches!(
            validate_timestamp(1000, 1001 + MAX_EVENT_AGE_SECS),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn future_timestamp_within_skew_succeeds() {
        assert!(validate_timestamp(1030, 1000).is_ok());
    }

    #[test]
    fn future_timestamp_beyond_skew_fails() {
        assert!(matches!(
            validate_timestamp(1000 + MAX_CLOCK_SKEW_SECS + 1, 1000),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn extreme_timestamps_are_rejected_without_overflow() {
        assert!(matches!(
            validate_timestamp(i64::MIN, 1000),
            Err(WebhookError::InvalidTimestamp)
        ));
        assert!(matches!(
            validate_timestamp(i64::MAX, -1000),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn minimum_header_timestamp_is_rejected() {
        let result = verifier().verify_and_parse(b"{}", "t=-9223372036854775808,v1=00");

        assert!(matches!(result, Err(WebhookError::InvalidTimestamp)));
    }

    #[test]
    fn stale_delivery_is_rejected_end_to_end() {
        let body = payload();
        let header = signature_header(TEST_SECRET, now() - 600, &body);

        assert!(matches!(
            verifier().verify_and_parse(&body, &header),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2]));
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }
}
