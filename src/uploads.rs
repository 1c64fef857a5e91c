use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::ImageKitConfig;

type HmacSha256 = Hmac<Sha256>;

/// How long a signed parameter set stays valid.
const TOKEN_TTL_SECS: i64 = 600;

/// Short-lived parameters the browser hands to the image CDN together with
/// the binary. The CDN recomputes the signature with the same private key.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadAuthParams {
    pub token: String,
    pub expire: i64,
    pub signature: String,
    pub file_name: String,
    pub public_key: String,
    pub url_endpoint: String,
}

/// Signs upload requests with the CDN private key. The key comes from
/// configuration only; it is never serialized or logged.
#[derive(Clone)]
pub struct UploadSigner {
    public_key: String,
    private_key: SecretString,
    url_endpoint: String,
}

impl UploadSigner {
    pub fn new(config: &ImageKitConfig) -> Self {
        Self {
            public_key: config.public_key.clone(),
            private_key: config.private_key.clone(),
            url_endpoint: config.url_endpoint.clone(),
        }
    }

    pub fn sign(&self, file_name: &str) -> UploadAuthParams {
        self.sign_at(file_name, Utc::now())
    }

    fn sign_at(&self, file_name: &str, now: DateTime<Utc>) -> UploadAuthParams {
        let token = Uuid::new_v4().to_string();
        let expire = (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp();
        let signature = self.signature_for(&token, expire, file_name);
        UploadAuthParams {
            token,
            expire,
            signature,
            file_name: file_name.to_string(),
            public_key: self.public_key.clone(),
            url_endpoint: self.url_endpoint.clone(),
        }
    }

    fn signature_for(&self, token: &str, expire: i64, file_name: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.private_key.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(token.as_bytes());
        mac.update(expire.to_string().as_bytes());
        mac.update(file_name.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> UploadSigner {
        UploadSigner {
            public_key: "public_test".into(),
            private_key: "private_test_key".to_string().into(),
            url_endpoint: "https://ik.example.com/shop".into(),
        }
    }

    #[test]
    fn signature_is_hex_sha256_and_deterministic() {
        let s = signer();
        let a = s.signature_for("tok", 1_700_000_000, "bottle.png");
        let b = s.signature_for("tok", 1_700_000_000, "bottle.png");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_binds_the_file_name() {
        let s = signer();
        let a = s.signature_for("tok", 1_700_000_000, "bottle.png");
        let b = s.signature_for("tok", 1_700_000_000, "box.png");
        assert_ne!(a, b);
    }

    #[test]
    fn params_expire_after_the_ttl() {
        let s = signer();
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap();
        let params = s.sign_at("bottle.png", now);

        assert_eq!(params.expire, now.timestamp() + TOKEN_TTL_SECS);
        assert_eq!(params.public_key, "public_test");
        assert_eq!(
            params.signature,
            s.signature_for(&params.token, params.expire, "bottle.png")
        );
    }
}
