//! Certificate chain retrieval and body signature verification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use ring::signature::{RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY, UnparsedPublicKey};
use rustls::pki_types::{
    AlgorithmIdentifier, CertificateDer, InvalidSignature, ServerName,
    SignatureVerificationAlgorithm, TrustAnchor, UnixTime, alg_id,
};
use tracing::{debug, instrument, warn};
use webpki::{EndEntityCert, KeyUsage};

use crate::cache::TtlCache;
use crate::config::VerificationConfig;
use crate::error::MeteosatError;

/// Subject alternative name the signing certificate must carry
pub const SIGNING_CERT_SAN: &str = "echo-api.amazon.com";

type CertChain = Arc<Vec<CertificateDer<'static>>>;

/// Digest the platform used when signing the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// Legacy `Signature` header
    RsaSha1,
    /// `Signature-256` header
    RsaSha256,
}

impl SignatureAlgorithm {
    fn verification_algorithm(&self) -> &'static dyn SignatureVerificationAlgorithm {
        match self {
            SignatureAlgorithm::RsaSha1 => &RSA_PKCS1_SHA1,
            SignatureAlgorithm::RsaSha256 => webpki::ring::RSA_PKCS1_2048_8192_SHA256,
        }
    }
}

/// Decoded body signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodySignature {
    pub algorithm: SignatureAlgorithm,
    pub bytes: Vec<u8>,
}

/// Cryptographic half of request verification.
#[async_trait]
pub trait SignatureCheck: Send + Sync {
    async fn verify(
        &self,
        chain_url: &Url,
        signature: &BodySignature,
        body: &[u8],
    ) -> Result<(), MeteosatError>;
}

/// Fetches the chain named by the request and verifies it with webpki
/// against the public web PKI roots.
pub struct CertificateChainCheck {
    client: Client,
    roots: Vec<TrustAnchor<'static>>,
    cache: TtlCache<CertChain>,
    cache_ttl: Duration,
}

impl CertificateChainCheck {
    pub fn new(config: &VerificationConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.cert_fetch_timeout_seconds.into()))
            .user_agent(concat!("meteosat-skill/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
            cache: TtlCache::new(),
            cache_ttl: Duration::from_secs(config.cert_cache_ttl_seconds.into()),
        })
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_chain(&self, url: &Url) -> Result<CertChain, MeteosatError> {
        if let Some(chain) = self.cache.get(url.as_str()).await {
            return Ok(chain);
        }

        debug!("Fetching certificate chain");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| MeteosatError::certificate_fetch(e.to_string()))?;
        let pem = response
            .bytes()
            .await
            .map_err(|e| MeteosatError::certificate_fetch(e.to_string()))?;

        let chain = Arc::new(parse_pem_chain(&pem)?);
        if let Err(e) = self.cache.put(url.as_str(), chain.clone(), self.cache_ttl).await {
            warn!("Could not cache certificate chain: {e}");
        }
        Ok(chain)
    }
}

#[async_trait]
impl SignatureCheck for CertificateChainCheck {
    async fn verify(
        &self,
        chain_url: &Url,
        signature: &BodySignature,
        body: &[u8],
    ) -> Result<(), MeteosatError> {
        let chain = self.fetch_chain(chain_url).await?;
        verify_with_chain(&chain, &self.roots, signature, body, UnixTime::now())
    }
}

/// Decode every certificate of a PEM bundle, signing certificate first.
pub fn parse_pem_chain(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, MeteosatError> {
    let mut reader = pem;
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MeteosatError::signature(format!("Malformed PEM chain: {e}")))?;

    if certs.is_empty() {
        return Err(MeteosatError::signature("PEM chain contains no certificates"));
    }
    Ok(certs)
}

/// Check the chain against `roots`, then the body signature against the
/// signing certificate.
pub fn verify_with_chain(
    chain: &[CertificateDer<'_>],
    roots: &[TrustAnchor<'_>],
    signature: &BodySignature,
    body: &[u8],
    now: UnixTime,
) -> Result<(), MeteosatError> {
    let (leaf, intermediates) = chain
        .split_first()
        .ok_or_else(|| MeteosatError::signature("Certificate chain is empty"))?;

    let cert = EndEntityCert::try_from(leaf)
        .map_err(|e| MeteosatError::signature(format!("Unparseable signing certificate: {e}")))?;

    cert.verify_for_usage(
        webpki::ALL_VERIFICATION_ALGS,
        roots,
        intermediates,
        now,
        KeyUsage::server_auth(),
        None,
        None,
    )
    .map_err(|e| MeteosatError::signature(format!("Untrusted certificate chain: {e}")))?;

    let san = ServerName::try_from(SIGNING_CERT_SAN)
        .map_err(|e| MeteosatError::signature(e.to_string()))?;
    cert.verify_is_valid_for_subject_name(&san)
        .map_err(|e| MeteosatError::signature(format!("Signing certificate SAN mismatch: {e}")))?;

    cert.verify_signature(
        signature.algorithm.verification_algorithm(),
        body,
        &signature.bytes,
    )
    .map_err(|e| MeteosatError::signature(format!("Body signature mismatch: {e}")))
}

// AlgorithmIdentifier contents for sha1WithRSAEncryption (1.2.840.113549.1.1.5).
const RSA_PKCS1_SHA1_ALG_ID: AlgorithmIdentifier = AlgorithmIdentifier::from_slice(&[
    0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x05, 0x05, 0x00,
]);

/// RSA PKCS#1 v1.5 with SHA-1, used only for the legacy body signature.
#[derive(Debug)]
struct RsaPkcs1Sha1;

static RSA_PKCS1_SHA1: RsaPkcs1Sha1 = RsaPkcs1Sha1;

impl SignatureVerificationAlgorithm for RsaPkcs1Sha1 {
    fn verify_signature(
        &self,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), InvalidSignature> {
        UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY, public_key)
            .verify(message, signature)
            .map_err(|_| InvalidSignature)
    }

    fn public_key_alg_id(&self) -> AlgorithmIdentifier {
        alg_id::RSA_ENCRYPTION
    }

    fn signature_alg_id(&self) -> AlgorithmIdentifier {
        RSA_PKCS1_SHA1_ALG_ID
    }
}
