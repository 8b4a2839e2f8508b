//! Unit tests for the ES256 signer

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::errors::VerifyError;
use crate::services::token::Signer;

use super::keys::{OTHER_PRIVATE_KEY, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};

fn signer_with_clock(clock: Arc<dyn Clock>) -> Signer {
    Signer::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY, clock)
        .expect("Failed to build signer from test keys")
}

fn signer() -> Signer {
    signer_with_clock(Arc::new(SystemClock))
}

/// Flips one character of the token's payload segment
fn tamper_payload(token: &str) -> String {
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    assert_eq!(parts.len(), 3);

    let mut payload: Vec<u8> = parts[1].clone().into_bytes();
    let i = payload.len() / 2;
    payload[i] = if payload[i] == b'A' { b'B' } else { b'A' };
    parts[1] = String::from_utf8(payload).unwrap();

    parts.join(".")
}

#[test]
fn test_mint_verify_round_trip() {
    let signer = signer();
    let user_id = Uuid::new_v4();

    let token = signer.mint(user_id, Duration::seconds(900)).unwrap();
    let claims = signer.verify(&token).unwrap();

    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.exp, claims.iat + 900);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_each_token_gets_a_fresh_jti() {
    let signer = signer();
    let user_id = Uuid::new_v4();

    let a = signer.verify(&signer.mint(user_id, Duration::seconds(900)).unwrap()).unwrap();
    let b = signer.verify(&signer.mint(user_id, Duration::seconds(900)).unwrap()).unwrap();

    assert_ne!(a.jti, b.jti);
}

#[test]
fn test_tampered_payload_fails_signature() {
    let signer = signer();
    let token = signer.mint(Uuid::new_v4(), Duration::seconds(900)).unwrap();

    let tampered = tamper_payload(&token);
    assert_ne!(token, tampered);

    assert_eq!(
        signer.verify(&tampered).unwrap_err(),
        VerifyError::InvalidSignature
    );
}

#[test]
fn test_wrong_key_fails_signature() {
    let attacker = Signer::from_pem_strings(
        OTHER_PRIVATE_KEY,
        TEST_PUBLIC_KEY,
        Arc::new(SystemClock),
    )
    .unwrap();
    let forged = attacker.mint(Uuid::new_v4(), Duration::seconds(900)).unwrap();

    assert_eq!(
        signer().verify(&forged).unwrap_err(),
        VerifyError::InvalidSignature
    );
}

#[test]
fn test_garbage_token_fails_closed() {
    let signer = signer();

    assert_eq!(
        signer.verify("not-a-token").unwrap_err(),
        VerifyError::InvalidSignature
    );
    assert_eq!(
        signer.verify("").unwrap_err(),
        VerifyError::InvalidSignature
    );
}

#[test]
fn test_expiry_boundary() {
    // A token whose lifetime ends one second from now still verifies...
    let clock = ManualClock::starting_at(Utc::now() - Duration::seconds(899));
    let signer = signer_with_clock(Arc::new(clock));
    let token = signer.mint(Uuid::new_v4(), Duration::seconds(900)).unwrap();
    assert!(signer.verify(&token).is_ok());

    // ...one that ended one second ago does not.
    let clock = ManualClock::starting_at(Utc::now() - Duration::seconds(901));
    let signer = signer_with_clock(Arc::new(clock));
    let token = signer.mint(Uuid::new_v4(), Duration::seconds(900)).unwrap();
    assert_eq!(signer.verify(&token).unwrap_err(), VerifyError::Expired);
}

#[derive(Serialize)]
struct ClaimsWithoutJti {
    sub: String,
    iat: i64,
    exp: i64,
}

#[derive(Serialize)]
struct ClaimsWithoutSub {
    iat: i64,
    exp: i64,
    jti: String,
}

#[test]
fn test_missing_jti_claim() {
    let now = Utc::now().timestamp();
    let claims = ClaimsWithoutJti {
        sub: Uuid::new_v4().to_string(),
        iat: now,
        exp: now + 900,
    };
    let token = encode(
        &Header::new(Algorithm::ES256),
        &claims,
        &EncodingKey::from_ec_pem(TEST_PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap();

    assert_eq!(
        signer().verify(&token).unwrap_err(),
        VerifyError::MissingClaim {
            claim: "jti".to_string()
        }
    );
}

#[test]
fn test_missing_sub_claim() {
    let now = Utc::now().timestamp();
    let claims = ClaimsWithoutSub {
        iat: now,
        exp: now + 900,
        jti: Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::new(Algorithm::ES256),
        &claims,
        &EncodingKey::from_ec_pem(TEST_PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap();

    assert_eq!(
        signer().verify(&token).unwrap_err(),
        VerifyError::MissingClaim {
            claim: "sub".to_string()
        }
    );
}

#[test]
fn test_key_load_rejects_bad_pem() {
    let result = Signer::from_pem_strings("not a pem", TEST_PUBLIC_KEY, Arc::new(SystemClock));
    assert!(result.is_err());
}
