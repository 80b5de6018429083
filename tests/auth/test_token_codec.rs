// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use support_rag_node::auth::{Identity, Role, TokenCodec, TokenError};

const SECRET: &[u8] = b"token-codec-test-secret-42";

fn identity() -> Identity {
    Identity {
        user_id: 12,
        email: "carol@x.com".to_string(),
        role: Role::Admin,
    }
}

#[test]
fn test_verify_returns_issued_claims() {
    let codec = TokenCodec::new(SECRET, Duration::from_secs(24 * 3600));
    let token = codec.issue(&identity()).unwrap();
    let claims = codec.verify(&token).unwrap();

    assert_eq!(claims.identity(), identity());
    assert_eq!(claims.exp - claims.iat, 24 * 3600);
    assert!((claims.iat - Utc::now().timestamp()).abs() <= 2);
}

#[test]
fn test_expired_token() {
    let codec = TokenCodec::new(SECRET, Duration::from_secs(3600));
    let token = codec
        .issue_at(&identity(), Duration::from_secs(10), Utc::now() - ChronoDuration::seconds(60))
        .unwrap();
    assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
}

#[test]
fn test_expiry_is_measured_from_issue_time() {
    let codec = TokenCodec::new(SECRET, Duration::from_secs(3600));
    let token = codec
        .issue_at(&identity(), Duration::from_secs(120), Utc::now() - ChronoDuration::seconds(60))
        .unwrap();
    let claims = codec.verify(&token).unwrap();
    assert_eq!(claims.exp - claims.iat, 120);
}

#[test]
fn test_wrong_secret_is_bad_signature() {
    let issuer = TokenCodec::new(SECRET, Duration::from_secs(3600));
    let verifier = TokenCodec::new(b"a-completely-different-key", Duration::from_secs(3600));
    let token = issuer.issue(&identity()).unwrap();
    assert_eq!(verifier.verify(&token).unwrap_err(), TokenError::BadSignature);
}

#[test]
fn test_tampered_payload_is_rejected() {
    let codec = TokenCodec::new(SECRET, Duration::from_secs(3600));
    let token = codec.issue(&identity()).unwrap();
    let other = codec
        .issue(&Identity {
            user_id: 13,
            ..identity()
        })
        .unwrap();

    // Splice the payload of one token onto the signature of another
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let spliced = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
    assert_eq!(codec.verify(&spliced).unwrap_err(), TokenError::BadSignature);
}

#[test]
fn test_garbage_is_malformed() {
    let codec = TokenCodec::new(SECRET, Duration::from_secs(3600));
    for token in ["", "abc", "a.b.c", "not-a-token-at-all"] {
        assert_eq!(codec.verify(token).unwrap_err(), TokenError::Malformed, "{:?}", token);
    }
}
