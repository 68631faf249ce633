// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token codec behaviour tests.
//!
//! These pin down the properties integrators rely on: the subject survives a
//! refresh, expiry is reported as expiry, token kinds never cross over, and
//! the emitted strings look opaque.

use merchant_api_mock::services::{
    decode_opaque, encode_opaque, InvalidReason, TokenCodec, TokenConfig, TokenError,
};

const NOW: u64 = 1_700_000_000;

fn codec() -> TokenCodec {
    TokenCodec::new(&TokenConfig {
        secret: b"test_signing_key_32_bytes_long!!".to_vec(),
        access_ttl_secs: 3_600,
        refresh_ttl_secs: 7_200,
        default_scope: vec!["all".to_string()],
    })
}

fn scope_all() -> Vec<String> {
    vec!["all".to_string()]
}

#[test]
fn test_issue_and_validate_scenario() {
    let codec = codec();
    let tokens = codec.issue("u1", &scope_all()).unwrap();

    assert!(tokens.access_token_expires_in > 0);
    assert!(tokens.refresh_token_expires_in > 0);

    let access = codec.validate_access(&tokens.access_token).unwrap();
    assert_eq!(access.subject_id, "u1");
    assert_eq!(access.scope, scope_all());

    let refresh = codec.validate_refresh(&tokens.refresh_token).unwrap();
    assert_eq!(refresh.subject_id, "u1");
}

#[test]
fn test_subject_survives_refresh() {
    let codec = codec();

    for subject in ["u1", "ou_0123456789abcdef", "merchant with spaces", "商户"] {
        let original = codec.issue_at(subject, &scope_all(), NOW).unwrap();
        let reissued = codec
            .reissue_from_refresh_at(&original.refresh_token, NOW + 60)
            .unwrap();

        let access = codec
            .validate_access_at(&reissued.access_token, NOW + 61)
            .unwrap();
        let refresh = codec
            .validate_refresh_at(&reissued.refresh_token, NOW + 61)
            .unwrap();
        assert_eq!(access.subject_id, subject);
        assert_eq!(refresh.subject_id, subject);
        assert_eq!(access.scope, scope_all());
    }
}

#[test]
fn test_expiry_is_never_malformed() {
    let codec = codec();
    let tokens = codec.issue_at("u1", &scope_all(), NOW).unwrap();
    let access_expiry = NOW + 3_600;
    let refresh_expiry = NOW + 7_200;

    assert!(codec
        .validate_access_at(&tokens.access_token, access_expiry - 1)
        .is_ok());
    for late in [access_expiry, access_expiry + 1, access_expiry + 86_400 * 365] {
        assert_eq!(
            codec.validate_access_at(&tokens.access_token, late),
            Err(InvalidReason::Expired)
        );
    }

    assert!(codec
        .validate_refresh_at(&tokens.refresh_token, refresh_expiry - 1)
        .is_ok());
    assert_eq!(
        codec.validate_refresh_at(&tokens.refresh_token, refresh_expiry),
        Err(InvalidReason::Expired)
    );
}

#[test]
fn test_expired_refresh_cannot_reissue() {
    let codec = codec();
    let tokens = codec.issue_at("u1", &scope_all(), NOW).unwrap();

    let err = codec
        .reissue_from_refresh_at(&tokens.refresh_token, NOW + 7_200)
        .unwrap_err();
    assert!(matches!(err, TokenError::Invalid(InvalidReason::Expired)));
}

#[test]
fn test_kind_segregation() {
    let codec = codec();
    let tokens = codec.issue_at("u1", &scope_all(), NOW).unwrap();

    assert_eq!(
        codec.validate_access_at(&tokens.refresh_token, NOW + 1),
        Err(InvalidReason::WrongKind)
    );
    assert_eq!(
        codec.validate_refresh_at(&tokens.access_token, NOW + 1),
        Err(InvalidReason::WrongKind)
    );
    assert!(matches!(
        codec.reissue_from_refresh_at(&tokens.access_token, NOW + 1),
        Err(TokenError::Invalid(InvalidReason::WrongKind))
    ));
}

#[test]
fn test_tokens_are_opaque_and_stable_under_reencoding() {
    let codec = codec();
    let tokens = codec.issue("u1", &scope_all()).unwrap();

    for token in [&tokens.access_token, &tokens.refresh_token] {
        assert!(!token.contains('.'));
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let jwt = decode_opaque(token).unwrap();
        assert_eq!(jwt.matches('.').count(), 2);
        assert_eq!(&encode_opaque(&jwt), token);
    }
}

#[test]
fn test_garbage_is_malformed() {
    let codec = codec();

    for token in ["", "abc", "not-a-token!", "eyJhbGciOiJIUzI1NiJ9.e30.sig"] {
        assert_eq!(
            codec.validate_access(token),
            Err(InvalidReason::Malformed),
            "token {:?}",
            token
        );
    }
}

#[test]
fn test_tampered_payload_is_malformed() {
    let codec = codec();
    let tokens = codec.issue_at("u1", &scope_all(), NOW).unwrap();

    let jwt = decode_opaque(&tokens.access_token).unwrap();
    let mut parts: Vec<String> = jwt.split('.').map(str::to_string).collect();
    let other = codec.issue_at("u2", &scope_all(), NOW).unwrap();
    let other_jwt = decode_opaque(&other.access_token).unwrap();
    parts[1] = other_jwt.split('.').nth(1).unwrap().to_string();
    let forged = encode_opaque(&parts.join("."));

    assert_eq!(
        codec.validate_access_at(&forged, NOW + 1),
        Err(InvalidReason::Malformed)
    );
}
