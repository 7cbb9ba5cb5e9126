//! Request verification
//!
//! Every inbound request is checked before any routing happens:
//! - the chain URL header must name a certificate on the platform's bucket
//! - the signature header must be present and decode as base64
//! - the request timestamp must be within the tolerance window
//! - the body signature must verify against a trusted signing certificate
//!
//! Failures collapse to `false`; the reason is only logged.

pub mod cert_url;
pub mod chain;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::config::VerificationConfig;
use crate::error::MeteosatError;

pub use chain::{BodySignature, CertificateChainCheck, SignatureAlgorithm, SignatureCheck};

pub const SIGNATURE_CERT_CHAIN_URL_HEADER: &str = "SignatureCertChainUrl";
pub const SIGNATURE_HEADER: &str = "Signature";
pub const SIGNATURE_256_HEADER: &str = "Signature-256";

/// Raw verification headers as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub cert_chain_url: Option<String>,
    pub signature: Option<String>,
    pub signature_256: Option<String>,
}

impl SignatureHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            cert_chain_url: read(SIGNATURE_CERT_CHAIN_URL_HEADER),
            signature: read(SIGNATURE_HEADER),
            signature_256: read(SIGNATURE_256_HEADER),
        }
    }

    /// Decode the strongest signature on offer. `Signature` must always be set.
    pub fn body_signature(&self) -> Result<BodySignature, MeteosatError> {
        let legacy = non_blank(self.signature.as_deref())
            .ok_or_else(|| MeteosatError::malformed("Missing Signature header"))?;

        let (algorithm, encoded) = match non_blank(self.signature_256.as_deref()) {
            Some(sha256) => (SignatureAlgorithm::RsaSha256, sha256),
            None => (SignatureAlgorithm::RsaSha1, legacy),
        };

        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| MeteosatError::signature(format!("Signature is not base64: {e}")))?;

        Ok(BodySignature { algorithm, bytes })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
pub trait RequestVerifier: Send + Sync {
    /// Whether the request provably comes from the voice platform.
    async fn validate(
        &self,
        body: &[u8],
        headers: &SignatureHeaders,
        timestamp: DateTime<Utc>,
    ) -> bool;
}

pub struct AlexaRequestVerifier {
    check: Arc<dyn SignatureCheck>,
    tolerance: Duration,
}

impl AlexaRequestVerifier {
    pub fn new(config: &VerificationConfig) -> anyhow::Result<Self> {
        let check = CertificateChainCheck::new(config)?;
        Ok(Self::with_check(
            Arc::new(check),
            Duration::from_secs(config.timestamp_tolerance_seconds.into()),
        ))
    }

    pub fn with_check(check: Arc<dyn SignatureCheck>, tolerance: Duration) -> Self {
        Self { check, tolerance }
    }

    /// Run every check against the given clock reading.
    pub async fn verify_at(
        &self,
        body: &[u8],
        headers: &SignatureHeaders,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), MeteosatError> {
        let raw_url = non_blank(headers.cert_chain_url.as_deref())
            .ok_or_else(|| MeteosatError::malformed("Missing SignatureCertChainUrl header"))?;
        let chain_url = cert_url::validate_chain_url(raw_url)?;

        let signature = headers.body_signature()?;

        if body.trim_ascii().is_empty() {
            return Err(MeteosatError::malformed("Empty request body"));
        }

        check_timestamp(timestamp, now, self.tolerance)?;

        self.check.verify(&chain_url, &signature, body).await?;
        debug!(algorithm = ?signature.algorithm, "Request signature verified");
        Ok(())
    }
}

#[async_trait]
impl RequestVerifier for AlexaRequestVerifier {
    #[instrument(skip_all)]
    async fn validate(
        &self,
        body: &[u8],
        headers: &SignatureHeaders,
        timestamp: DateTime<Utc>,
    ) -> bool {
        match self.verify_at(body, headers, timestamp, Utc::now()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Rejected skill request");
                false
            }
        }
    }
}

/// Accept timestamps within `tolerance` of `now`, in either direction.
pub fn check_timestamp(
    timestamp: DateTime<Utc>,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<(), MeteosatError> {
    let skew_seconds = (now - timestamp).num_seconds();
    let tolerance_seconds = i64::try_from(tolerance.as_secs()).unwrap_or(i64::MAX);

    if skew_seconds.abs() > tolerance_seconds {
        return Err(MeteosatError::TimestampStale { skew_seconds });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use reqwest::Url;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CHAIN_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert-12.pem";
    const TOLERANCE: Duration = Duration::from_secs(150);

    /// Signature check that passes, counting its invocations.
    #[derive(Default)]
    struct PassingCheck {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SignatureCheck for PassingCheck {
        async fn verify(&self, _: &Url, _: &BodySignature, _: &[u8]) -> Result<(), MeteosatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingCheck;

    #[async_trait]
    impl SignatureCheck for FailingCheck {
        async fn verify(&self, _: &Url, _: &BodySignature, _: &[u8]) -> Result<(), MeteosatError> {
            Err(MeteosatError::certificate_fetch("connection refused"))
        }
    }

    fn headers() -> SignatureHeaders {
        SignatureHeaders {
            cert_chain_url: Some(CHAIN_URL.to_string()),
            signature: Some("c2lnbmF0dXJl".to_string()),
            signature_256: None,
        }
    }

    fn passing() -> (Arc<PassingCheck>, AlexaRequestVerifier) {
        let check = Arc::new(PassingCheck::default());
        let verifier = AlexaRequestVerifier::with_check(check.clone(), TOLERANCE);
        (check, verifier)
    }

    #[tokio::test]
    async fn test_valid_request_passes() {
        let (check, verifier) = passing();
        let now = Utc::now();

        assert!(verifier.verify_at(b"{}", &headers(), now, now).await.is_ok());
        assert_eq!(check.calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case(SignatureHeaders { cert_chain_url: None, ..headers() })]
    #[case(SignatureHeaders { cert_chain_url: Some("   ".into()), ..headers() })]
    #[case(SignatureHeaders { cert_chain_url: Some("not a url".into()), ..headers() })]
    #[case(SignatureHeaders { cert_chain_url: Some("https://evil.example/echo.api/c.pem".into()), ..headers() })]
    #[case(SignatureHeaders { signature: None, ..headers() })]
    #[case(SignatureHeaders { signature: Some("".into()), ..headers() })]
    #[case(SignatureHeaders { signature: Some("".into()), signature_256: Some("c2lnbmF0dXJl".into()), ..headers() })]
    #[case(SignatureHeaders { signature: Some("***".into()), ..headers() })]
    #[tokio::test]
    async fn test_header_problems_are_rejected(#[case] headers: SignatureHeaders) {
        let (check, verifier) = passing();
        let now = Utc::now();

        assert!(verifier.verify_at(b"{}", &headers, now, now).await.is_err());
        assert!(!verifier.validate(b"{}", &headers, now).await);
        assert_eq!(check.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_body_is_rejected() {
        let (_, verifier) = passing();
        assert!(!verifier.validate(b"  ", &headers(), Utc::now()).await);
    }

    #[tokio::test]
    async fn test_stale_timestamp_fails_even_with_good_signature() {
        let (_, verifier) = passing();
        let now = Utc::now();
        let stale = now - TimeDelta::seconds(151);

        let err = verifier.verify_at(b"{}", &headers(), stale, now).await.unwrap_err();
        assert!(matches!(err, MeteosatError::TimestampStale { skew_seconds: 151 }));
        assert!(!verifier.validate(b"{}", &headers(), stale).await);
    }

    #[tokio::test]
    async fn test_failed_check_fails_closed() {
        let verifier = AlexaRequestVerifier::with_check(Arc::new(FailingCheck), TOLERANCE);
        assert!(!verifier.validate(b"{}", &headers(), Utc::now()).await);
    }

    #[rstest]
    #[case(0, true)]
    #[case(150, true)]
    #[case(-150, true)]
    #[case(151, false)]
    #[case(-151, false)]
    #[case(3600, false)]
    fn test_check_timestamp(#[case] age_seconds: i64, #[case] accepted: bool) {
        let now = Utc::now();
        let timestamp = now - TimeDelta::seconds(age_seconds);
        assert_eq!(check_timestamp(timestamp, now, TOLERANCE).is_ok(), accepted);
    }

    #[test]
    fn test_signature_256_is_preferred() {
        let headers = SignatureHeaders {
            signature_256: Some("AQID".to_string()),
            ..headers()
        };
        let signature = headers.body_signature().unwrap();
        assert_eq!(signature.algorithm, SignatureAlgorithm::RsaSha256);
        assert_eq!(signature.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_legacy_signature_fallback() {
        let signature = headers().body_signature().unwrap();
        assert_eq!(signature.algorithm, SignatureAlgorithm::RsaSha1);
        assert_eq!(signature.bytes, b"signature");
    }

    #[test]
    fn test_from_headers() {
        let mut map = HeaderMap::new();
        // Header names are case-insensitive; HeaderMap stores them lowercased.
        map.insert("signaturecertchainurl", CHAIN_URL.parse().unwrap());
        map.insert("signature", "c2lnbmF0dXJl".parse().unwrap());

        let parsed = SignatureHeaders::from_headers(&map);
        assert_eq!(parsed, headers());
    }
}
