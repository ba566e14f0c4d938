//! Tests for the woodpecker-note crate.

use crate::{
    KeyKind, Note, NoteError, Signer, Verifier, marshal_body, open_checkpoint, parse_body,
    sign_note,
};

const ORIGIN: &str = "example.com/log";

fn log_signer() -> Signer {
    Signer::from_seed("example.com/log", KeyKind::Ed25519, [1u8; 32])
}

fn witness_signer(n: u8) -> Signer {
    Signer::from_seed(format!("witness-{n}"), KeyKind::CosignatureV1, [n + 10; 32])
        .with_timestamp(1_700_000_000)
}

fn body(size: u64) -> String {
    marshal_body(ORIGIN, size, &[7u8; 32], &[])
}

// -----------------------------------------------------------------------
// Verifier keys
// -----------------------------------------------------------------------

#[test]
fn test_verifier_key_round_trips_through_signer() {
    let signer = log_signer();
    let verifier = Verifier::new(&signer.verifier_key()).unwrap();
    assert_eq!(verifier.name(), "example.com/log");
    assert_eq!(verifier.key_hash(), signer.key_hash());
    assert_eq!(verifier.kind(), KeyKind::Ed25519);
}

#[test]
fn test_parses_published_sumdb_key() {
    let v = Verifier::new("sum.golang.org+033de0ae+Ac4zctda0e5eza+HJyk9SxEdh+s3Ly18Ks3HPcDJ0g/GP")
        .unwrap();
    assert_eq!(v.name(), "sum.golang.org");
    assert_eq!(v.key_hash(), 0x033de0ae);
}

#[test]
fn test_rejects_malformed_keys() {
    for bad in [
        "",
        "name-only",
        "name+deadbeef",
        "name+xyz+AQ==",
        "name+deadbeef+not-base64!",
        "name+deadbeef+AQ==",
    ] {
        assert!(
            matches!(Verifier::new(bad), Err(NoteError::InvalidKey(_))),
            "accepted {bad:?}"
        );
    }
}

#[test]
fn test_rejects_wrong_key_hash() {
    let key = log_signer().verifier_key();
    let mut parts: Vec<&str> = key.split('+').collect();
    parts[1] = "00000000";
    let tampered = parts.join("+");
    assert!(matches!(
        Verifier::new(&tampered),
        Err(NoteError::KeyHashMismatch { .. })
    ));
}

#[test]
fn test_rejects_unknown_algorithm() {
    use base64::Engine as _;
    let mut encoded = vec![0x09u8];
    encoded.extend_from_slice(&[3u8; 32]);
    let key = format!(
        "name+00000000+{}",
        base64::engine::general_purpose::STANDARD.encode(&encoded)
    );
    assert_eq!(Verifier::new(&key), Err(NoteError::UnsupportedKeyType(0x09)));
}

// -----------------------------------------------------------------------
// Notes
// -----------------------------------------------------------------------

#[test]
fn test_open_verifies_known_signatures() {
    let log = log_signer();
    let w1 = witness_signer(1);
    let note = sign_note(&body(5), &[&log, &w1]).unwrap();

    let lv = Verifier::new(&log.verifier_key()).unwrap();
    let wv = Verifier::new(&w1.verifier_key()).unwrap();
    let opened = Note::open(&note, &[&lv, &wv]).unwrap();

    assert_eq!(opened.text, body(5));
    assert_eq!(opened.signatures.len(), 2);
    assert_eq!(opened.verified, vec!["example.com/log", "witness-1"]);
}

#[test]
fn test_open_ignores_unknown_signers() {
    let log = log_signer();
    let stranger = witness_signer(9);
    let note = sign_note(&body(5), &[&log, &stranger]).unwrap();

    let lv = Verifier::new(&log.verifier_key()).unwrap();
    let opened = Note::open(&note, &[&lv]).unwrap();
    assert_eq!(opened.signatures.len(), 2);
    assert_eq!(opened.verified, vec!["example.com/log"]);
}

#[test]
fn test_open_rejects_tampered_text() {
    let log = log_signer();
    let note = sign_note(&body(5), &[&log]).unwrap();
    let tampered = String::from_utf8(note.to_vec())
        .unwrap()
        .replacen("\n5\n", "\n6\n", 1);

    let lv = Verifier::new(&log.verifier_key()).unwrap();
    assert_eq!(
        Note::open(tampered.as_bytes(), &[&lv]),
        Err(NoteError::InvalidSignature {
            name: "example.com/log".into()
        })
    );
}

#[test]
fn test_open_requires_a_known_signature() {
    let note = sign_note(&body(5), &[&witness_signer(3)]).unwrap();
    let lv = Verifier::new(&log_signer().verifier_key()).unwrap();
    assert_eq!(Note::open(&note, &[&lv]), Err(NoteError::NoVerifiedSignatures));
}

#[test]
fn test_split_rejects_missing_signature_block() {
    assert!(matches!(
        Note::split(b"just text\n"),
        Err(NoteError::Malformed(_))
    ));
    assert!(matches!(
        Note::split(b"text\n\nnot a signature\n"),
        Err(NoteError::Malformed(_))
    ));
}

#[test]
fn test_sign_note_requires_trailing_newline() {
    assert!(sign_note("no newline", &[&log_signer()]).is_err());
}

#[test]
fn test_cosignature_timestamp_is_bound() {
    let w = witness_signer(1);
    let v = Verifier::new(&w.verifier_key()).unwrap();
    let mut sig = w.sign(b"hello\n");
    assert!(v.verify(b"hello\n", &sig));
    // Changing the embedded timestamp invalidates the signature.
    sig[7] ^= 1;
    assert!(!v.verify(b"hello\n", &sig));
}

// -----------------------------------------------------------------------
// Checkpoints
// -----------------------------------------------------------------------

#[test]
fn test_parse_body_with_extensions() {
    let text = marshal_body(ORIGIN, 42, &[1, 2, 3], &["ext one".into()]);
    let (origin, size, hash, ext) = parse_body(&text).unwrap();
    assert_eq!(origin, ORIGIN);
    assert_eq!(size, 42);
    assert_eq!(hash, vec![1, 2, 3]);
    assert_eq!(ext, vec!["ext one"]);
}

#[test]
fn test_parse_body_rejects_bad_sizes() {
    for text in [
        "o\n-1\nAAAA\n",
        "o\n01\nAAAA\n",
        "o\nten\nAAAA\n",
        "o\n\nAAAA\n",
        "o\n1\n",
        "\n1\nAAAA\n",
        "o\n1\nAAAA",
    ] {
        assert!(parse_body(text).is_err(), "accepted {text:?}");
    }
}

#[test]
fn test_open_checkpoint_reports_witnesses() {
    let log = log_signer();
    let (w1, w2, w3) = (witness_signer(1), witness_signer(2), witness_signer(3));
    let raw = sign_note(&body(100), &[&log, &w1, &w3]).unwrap();

    let lv = Verifier::new(&log.verifier_key()).unwrap();
    let wits: Vec<Verifier> = [&w1, &w2, &w3]
        .iter()
        .map(|w| Verifier::new(&w.verifier_key()).unwrap())
        .collect();

    let opened = open_checkpoint(&raw, ORIGIN, &lv, &wits).unwrap();
    assert_eq!(opened.checkpoint.size, 100);
    assert_eq!(opened.checkpoint.origin, ORIGIN);
    assert_eq!(opened.checkpoint.raw, raw);
    assert_eq!(opened.checkpoint.signatures.len(), 3);
    assert_eq!(opened.witnesses, vec!["witness-1", "witness-3"]);
}

#[test]
fn test_open_checkpoint_requires_log_signature() {
    let log = log_signer();
    let w1 = witness_signer(1);
    let raw = sign_note(&body(1), &[&w1]).unwrap();

    let lv = Verifier::new(&log.verifier_key()).unwrap();
    let wv = Verifier::new(&w1.verifier_key()).unwrap();
    assert_eq!(
        open_checkpoint(&raw, ORIGIN, &lv, &[wv]),
        Err(NoteError::MissingLogSignature("example.com/log".into()))
    );
}

#[test]
fn test_open_checkpoint_checks_origin() {
    let log = log_signer();
    let raw = sign_note(&marshal_body("other/log", 1, &[0; 32], &[]), &[&log]).unwrap();
    let lv = Verifier::new(&log.verifier_key()).unwrap();
    assert!(matches!(
        open_checkpoint(&raw, ORIGIN, &lv, &[]),
        Err(NoteError::OriginMismatch { .. })
    ));
}
