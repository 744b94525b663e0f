use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use jwtsig_core::{
    rsa::{
        pkcs1v15::SigningKey,
        pkcs8::DecodePrivateKey,
        signature::{SignatureEncoding, Signer},
        RsaPrivateKey,
    },
    verify, DigestAlgorithm, EncodedSignature, KeyLoadError, MalformedSignature, PublicKey,
    RawSignature, SignedMessage, VerificationResult, Verifier, VerifyError,
};
use sha2::{Sha256, Sha384};

const HEADER: &str = "eyJhbGciOiJSUzI1NiJ9";
const PAYLOAD: &str = "eyJzdWIiOiIxMjM0NTY3ODkwIn0";

const PRIVATE_PEM: &str = include_str!("data/private_pkcs8.pem");
const SPKI_PEM: &str = include_str!("data/public_spki.pem");
const PKCS1_PEM: &str = include_str!("data/public_pkcs1.pem");
const OTHER_SPKI_PEM: &str = include_str!("data/other_spki.pem");

/// RS256 signature over `HEADER.PAYLOAD`, produced with openssl from the fixture private key
const SCENARIO_SIG: &str = include_str!("data/rs256_scenario.sig");

fn rs256() -> Verifier {
    Verifier::from_pem(SPKI_PEM.as_bytes(), DigestAlgorithm::Sha256).unwrap()
}

fn sign_rs256(header: &str, payload: &str) -> String {
    let key = SigningKey::<Sha256>::new(RsaPrivateKey::from_pkcs8_pem(PRIVATE_PEM).unwrap());
    let sig = key.sign(format!("{}.{}", header, payload).as_bytes());
    URL_SAFE_NO_PAD.encode(sig.to_vec())
}

fn scenario_sig() -> &'static str {
    SCENARIO_SIG.trim()
}

#[test]
fn externally_produced_signature_is_valid() {
    let result = rs256()
        .verify_parts(HEADER.into(), PAYLOAD.into(), scenario_sig().into())
        .unwrap();

    assert_eq!(result, VerificationResult::Valid { digest: DigestAlgorithm::Sha256 });
}

#[test]
fn locally_produced_signature_matches_external_one() {
    assert_eq!(sign_rs256(HEADER, PAYLOAD), scenario_sig());
}

#[test]
fn changed_last_character_is_invalid() {
    let sig = scenario_sig();
    let (head, last) = sig.split_at(sig.len() - 1);
    // Both replacements leave the unused low bits of the final character clear
    let replacement = if last == "A" { "Q" } else { "A" };
    let tampered = format!("{}{}", head, replacement);

    let verifier = rs256();
    assert!(verifier
        .verify_parts(HEADER.into(), PAYLOAD.into(), sig.into())
        .unwrap()
        .is_valid());

    let result = verifier
        .verify_parts(HEADER.into(), PAYLOAD.into(), tampered.as_str().into())
        .unwrap();

    assert_eq!(result, VerificationResult::Invalid);
}

#[test]
fn compact_token_form() {
    let token = format!("{}.{}.{}", HEADER, PAYLOAD, scenario_sig());
    assert!(rs256().verify_token(&token).unwrap().is_valid());

    let swapped = format!("{}.{}.{}", PAYLOAD, HEADER, scenario_sig());
    assert_eq!(rs256().verify_token(&swapped).unwrap(), VerificationResult::Invalid);
}

#[test]
fn padded_and_unpadded_signatures_decode_identically() {
    let unpadded = scenario_sig();
    let padding = (4 - unpadded.len() % 4) % 4;
    let padded = format!("{}{}", unpadded, "=".repeat(padding));

    let a = EncodedSignature::new(unpadded).decode().unwrap();
    let b = EncodedSignature::new(&padded).decode().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), 256);

    assert!(rs256()
        .verify_parts(HEADER.into(), PAYLOAD.into(), padded.as_str().into())
        .unwrap()
        .is_valid());
}

#[test]
fn flipped_header_or_payload_byte_is_invalid() {
    let verifier = rs256();
    let sig = scenario_sig();

    assert!(verifier
        .verify_parts(HEADER.into(), PAYLOAD.into(), sig.into())
        .unwrap()
        .is_valid());

    for idx in 0..HEADER.len() {
        let mut header = HEADER.as_bytes().to_vec();
        header[idx] ^= 0x01;
        let header = String::from_utf8(header).unwrap();

        let result = verifier
            .verify_parts(header.as_str().into(), PAYLOAD.into(), sig.into())
            .unwrap();
        assert_eq!(result, VerificationResult::Invalid, "header byte {}", idx);
    }

    for idx in 0..PAYLOAD.len() {
        let mut payload = PAYLOAD.as_bytes().to_vec();
        payload[idx] ^= 0x01;
        let payload = String::from_utf8(payload).unwrap();

        let result = verifier
            .verify_parts(HEADER.into(), payload.as_str().into(), sig.into())
            .unwrap();
        assert_eq!(result, VerificationResult::Invalid, "payload byte {}", idx);
    }
}

#[test]
fn pkcs1_key_verifies_the_same() {
    let verifier = Verifier::from_pem(PKCS1_PEM.as_bytes(), DigestAlgorithm::Sha256).unwrap();
    assert!(verifier
        .verify_parts(HEADER.into(), PAYLOAD.into(), scenario_sig().into())
        .unwrap()
        .is_valid());
}

#[test]
fn other_key_is_invalid_not_malformed() {
    assert!(rs256()
        .verify_parts(HEADER.into(), PAYLOAD.into(), scenario_sig().into())
        .unwrap()
        .is_valid());

    let verifier = Verifier::from_pem(OTHER_SPKI_PEM.as_bytes(), DigestAlgorithm::Sha256).unwrap();
    assert_eq!(
        verifier
            .verify_parts(HEADER.into(), PAYLOAD.into(), scenario_sig().into())
            .unwrap(),
        VerificationResult::Invalid
    );
}

#[test]
fn digest_is_fixed_by_the_verifier() {
    let rs384 = Verifier::from_pem(SPKI_PEM.as_bytes(), DigestAlgorithm::Sha384).unwrap();
    assert_eq!(
        rs384
            .verify_parts(HEADER.into(), PAYLOAD.into(), scenario_sig().into())
            .unwrap(),
        VerificationResult::Invalid
    );

    let key = SigningKey::<Sha384>::new(RsaPrivateKey::from_pkcs8_pem(PRIVATE_PEM).unwrap());
    let sig = key.sign(format!("{}.{}", HEADER, PAYLOAD).as_bytes());
    let sig = URL_SAFE_NO_PAD.encode(sig.to_vec());

    assert_eq!(
        rs384.verify_parts(HEADER.into(), PAYLOAD.into(), sig.as_str().into()).unwrap(),
        VerificationResult::Valid { digest: DigestAlgorithm::Sha384 }
    );
    assert_eq!(
        rs256().verify_parts(HEADER.into(), PAYLOAD.into(), sig.as_str().into()).unwrap(),
        VerificationResult::Invalid
    );
}

#[test]
fn hs256_forged_with_public_key_is_rejected() {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"admin"}"#);

    let mut mac = Hmac::<Sha256>::new_from_slice(SPKI_PEM.as_bytes()).unwrap();
    mac.update(format!("{}.{}", header, payload).as_bytes());
    let forged = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    let token = format!("{}.{}.{}", header, payload, forged);

    assert!(matches!(
        rs256().verify_token(&token),
        Err(VerifyError::MalformedSignature(MalformedSignature::LengthMismatch {
            expected: 256,
            actual: 32
        }))
    ));

    let key = PublicKey::from_pem(SPKI_PEM.as_bytes()).unwrap();
    let message = SignedMessage::assemble(header.as_str().into(), payload.as_str().into());
    let raw = EncodedSignature::new(&forged).decode().unwrap();
    assert!(jwtsig_core::verify_any(&message, &raw, &key, &DigestAlgorithm::ALL).is_err());
}

#[test]
fn structural_errors_are_not_verification_outcomes() {
    let bogus = b"-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----\n";
    assert!(matches!(
        Verifier::from_pem(bogus, DigestAlgorithm::Sha256),
        Err(KeyLoadError::Unrecognized { .. })
    ));

    let truncated = &scenario_sig()[..336];
    assert!(matches!(
        rs256().verify_parts(HEADER.into(), PAYLOAD.into(), truncated.into()),
        Err(VerifyError::MalformedSignature(
            MalformedSignature::LengthMismatch { expected: 256, .. }
        ))
    ));

    let key = PublicKey::from_pem(SPKI_PEM.as_bytes()).unwrap();
    let message = SignedMessage::assemble(HEADER.into(), PAYLOAD.into());
    let long = RawSignature::from(vec![0u8; 512]);
    assert!(matches!(
        verify(&message, &long, &key, DigestAlgorithm::Sha256),
        Err(MalformedSignature::LengthMismatch { expected: 256, actual: 512 })
    ));
}

#[test]
fn shared_verifier_across_threads() {
    let verifier = Arc::new(rs256());
    let sig = scenario_sig().to_owned();

    let handles = (0..4)
        .map(|i| {
            let verifier = verifier.clone();
            let sig = sig.clone();
            std::thread::spawn(move || {
                let payload = if i % 2 == 0 { PAYLOAD } else { "eyJzdWIiOiJvdGhlciJ9" };
                verifier
                    .verify_parts(HEADER.into(), payload.into(), sig.as_str().into())
                    .unwrap()
            })
        })
        .collect::<Vec<_>>();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap().is_valid(), i % 2 == 0);
    }
}
