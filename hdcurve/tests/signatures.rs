//! Tests for ECDSA and Schnorr signing

use hdcurve::hash::sha256;
use hdcurve::keys::{parse_public_key, public_key_from_private, public_key_point};
use hdcurve::{derive_key, ChallengeHash, CurveProfile, Ecdsa, Schnorr, SignOptions};

fn scalar(value: u8) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = value;
    bytes
}

#[test]
fn test_ecdsa_known_answer() -> anyhow::Result<()> {
    let ecdsa = Ecdsa::new(CurveProfile::Secp256k1);
    let digest = sha256(b"Satoshi Nakamoto");
    let signature = ecdsa.sign(&digest, &scalar(1))?;

    assert_eq!(
        hex::encode(ecdsa.serialize_compact(&signature)),
        concat!(
            "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8",
            "2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
        )
    );
    let public_key = public_key_point(CurveProfile::Secp256k1, &scalar(1))?;
    assert!(ecdsa.verify(&digest, &public_key, &signature)?);
    Ok(())
}

#[test]
fn test_ecdsa_sign_verify_recover() -> anyhow::Result<()> {
    let seed = hex::decode("fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a29f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542")?;
    for profile in CurveProfile::ALL {
        let ecdsa = Ecdsa::new(profile);
        let key = derive_key(profile, &seed, "m/44'/60'/0'/0/3")?;
        let private_key = key.private_key_bytes().unwrap();
        let public_key = parse_public_key(profile, &key.public_key_bytes())?;

        for message in [&b"transfer 1"[..], b"transfer 2", b""] {
            let digest = sha256(message);
            let signature = ecdsa.sign(&digest, private_key)?;
            assert!(ecdsa.verify(&digest, &public_key, &signature)?);
            assert_eq!(ecdsa.recover_signature(&digest, &signature)?, public_key);

            let encoded = ecdsa.serialize_recoverable(&signature)?;
            assert_eq!(encoded.len(), 65);
            let decoded = ecdsa.parse_recoverable(&encoded)?;
            assert_eq!(ecdsa.recover_signature(&digest, &decoded)?, public_key);

            let other_digest = sha256(b"tampered");
            assert!(!ecdsa.verify(&other_digest, &public_key, &signature)?);
        }
    }
    Ok(())
}

#[test]
fn test_ecdsa_extra_entropy_changes_signature() -> anyhow::Result<()> {
    let ecdsa = Ecdsa::new(CurveProfile::NistP256);
    let digest = sha256(b"entropy");
    let public_key = public_key_point(CurveProfile::NistP256, &scalar(9))?;

    let plain = ecdsa.sign(&digest, &scalar(9))?;
    let options = SignOptions {
        extra_entropy: Some([0x42; 32]),
        ..SignOptions::default()
    };
    let mixed = ecdsa.sign_with_options(&digest, &scalar(9), &options)?;
    assert_ne!(plain, mixed);
    assert!(ecdsa.verify(&digest, &public_key, &mixed)?);
    Ok(())
}

#[test]
fn test_bip340_vector_0() -> anyhow::Result<()> {
    let schnorr = Schnorr::bip340();
    let message = [0u8; 32];
    let aux = [0u8; 32];

    let public = schnorr.x_only_public_key(&scalar(3))?;
    assert_eq!(
        hex::encode(&public),
        "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9"
    );

    let signature = schnorr.sign(&message, &scalar(3), &aux)?;
    assert_eq!(
        hex::encode(signature.as_bytes()),
        concat!(
            "e907831f80848d1069a5371b402410364bdf1c5f8307b0084c55f1ce2dca8215",
            "25f66a4a85ea8b71e482a74f382d2ce5ebeee8fdb2172f477df4900d310536c0",
        )
    );
    assert!(schnorr.verify(&message, &public, &signature)?);
    Ok(())
}

#[test]
fn test_schnorr_rejects_flipped_bits() -> anyhow::Result<()> {
    for profile in CurveProfile::ALL {
        for hash in [ChallengeHash::Bip340, ChallengeHash::Keccak256] {
            let schnorr = Schnorr::new(profile, hash);
            let message = b"flip every bit";
            let public = schnorr.x_only_public_key(&scalar(0x2a))?;
            let signature = schnorr.sign_with_rng(message, &scalar(0x2a))?;
            assert!(schnorr.verify(message, &public, &signature)?);

            let original = signature.to_vec();
            for bit in 0..original.len() * 8 {
                let mut bytes = original.clone();
                bytes[bit / 8] ^= 1 << (bit % 8);
                let tampered = schnorr.parse_signature(&bytes)?;
                assert!(
                    !schnorr.verify(message, &public, &tampered)?,
                    "{profile} {hash:?}: bit {bit} accepted"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_ecdsa_and_schnorr_do_not_collide() -> anyhow::Result<()> {
    let digest = sha256(b"same message");
    let ecdsa = Ecdsa::new(CurveProfile::Secp256k1);
    let schnorr = Schnorr::bip340();

    let ecdsa_signature = ecdsa.sign(&digest, &scalar(1))?;
    let schnorr_signature = schnorr.sign(&digest, &scalar(1), &[0u8; 32])?;
    let compact = ecdsa.serialize_compact(&ecdsa_signature);
    assert_ne!(compact.as_slice(), schnorr_signature.as_bytes());

    let public_key = public_key_point(CurveProfile::Secp256k1, &scalar(1))?;
    let x_only = schnorr.x_only_public_key(&scalar(1))?;
    assert!(ecdsa.verify(&digest, &public_key, &ecdsa_signature)?);
    assert!(schnorr.verify(&digest, &x_only, &schnorr_signature)?);

    // Each encoding is rejected by the other scheme
    let as_schnorr = schnorr.parse_signature(&compact)?;
    assert!(!schnorr.verify(&digest, &x_only, &as_schnorr)?);
    if let Ok(as_ecdsa) = ecdsa.parse_compact(schnorr_signature.as_bytes()) {
        assert!(!ecdsa.verify(&digest, &public_key, &as_ecdsa)?);
    }
    Ok(())
}

#[test]
fn test_public_key_formats() -> anyhow::Result<()> {
    let compressed = public_key_from_private(CurveProfile::Secp256k1, &scalar(1))?;
    assert_eq!(
        hex::encode(&compressed),
        "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
    );
    let point = parse_public_key(CurveProfile::Secp256k1, &compressed)?;
    let uncompressed = CurveProfile::Secp256k1.params().serialize_uncompressed(&point);
    assert_eq!(parse_public_key(CurveProfile::Secp256k1, &uncompressed)?, point);
    Ok(())
}

#[test]
fn test_sign_options_from_json() -> anyhow::Result<()> {
    let options: SignOptions = serde_json::from_str(r#"{ "low_s": false }"#)?;
    assert!(options.deterministic_nonce);
    assert!(!options.low_s);
    assert_eq!(options.extra_entropy, None);

    let profile: CurveProfile = serde_json::from_str(r#""nist-p256""#)?;
    assert_eq!(profile, CurveProfile::NistP256);
    Ok(())
}
