//! Validation of the `SignatureCertChainUrl` header value.

use reqwest::Url;

use crate::error::MeteosatError;

const CERT_HOST: &str = "s3.amazonaws.com";
const CERT_PATH_PREFIX: &str = "/echo.api/";
const CERT_PORT: u16 = 443;

/// Parse and check a certificate chain URL.
///
/// Scheme and host compare case-insensitively (the parser lowercases them),
/// the path compares case-sensitively after dot-segment normalisation.
pub fn validate_chain_url(raw: &str) -> Result<Url, MeteosatError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| MeteosatError::signature(format!("Chain URL is not a valid URL: {e}")))?;

    if url.scheme() != "https" {
        return Err(MeteosatError::signature(format!(
            "Chain URL scheme must be https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str() != Some(CERT_HOST) {
        return Err(MeteosatError::signature(format!(
            "Chain URL host must be {CERT_HOST}, got '{}'",
            url.host_str().unwrap_or_default()
        )));
    }

    if url.port_or_known_default() != Some(CERT_PORT) {
        return Err(MeteosatError::signature("Chain URL port must be 443"));
    }

    if !url.path().starts_with(CERT_PATH_PREFIX) {
        return Err(MeteosatError::signature(format!(
            "Chain URL path must start with {CERT_PATH_PREFIX}"
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://s3.amazonaws.com/echo.api/echo-api-cert.pem")]
    #[case("https://s3.amazonaws.com:443/echo.api/echo-api-cert.pem")]
    #[case("https://s3.amazonaws.com/echo.api/../echo.api/echo-api-cert.pem")]
    #[case("HTTPS://s3.amazonaws.com/echo.api/echo-api-cert.pem")]
    #[case("https://S3.AMAZONAWS.COM/echo.api/echo-api-cert.pem")]
    fn test_accepted_urls(#[case] raw: &str) {
        let url = validate_chain_url(raw).unwrap();
        assert!(url.path().starts_with("/echo.api/"));
    }

    #[rstest]
    #[case("http://s3.amazonaws.com/echo.api/echo-api-cert.pem")]
    #[case("https://notamazon.com/echo.api/echo-api-cert.pem")]
    #[case("https://s3.amazonaws.com/EcHo.aPi/echo-api-cert.pem")]
    #[case("https://s3.amazonaws.com/invalid.path/echo-api-cert.pem")]
    #[case("https://s3.amazonaws.com:563/echo.api/echo-api-cert.pem")]
    #[case("https://s3.amazonaws.com/echo.api/../invalid.path/echo-api-cert.pem")]
    #[case("not a url")]
    #[case("/echo.api/echo-api-cert.pem")]
    fn test_rejected_urls(#[case] raw: &str) {
        let err = validate_chain_url(raw).unwrap_err();
        assert!(matches!(err, MeteosatError::SignatureInvalid { .. }));
    }
}
