use staffetta_core::*;
use serde_json::{self as json, Value};
use time::macros::datetime;

fn parse(bytes: &[u8]) -> Value {
    json::from_slice(bytes).expect("valid json")
}

/*
    Obiettivo test: verificare che l'envelope del relay venga serializzato con i nomi campo del form
    (username / message) e non con i nomi interni author / body.
*/
#[test]
fn relay_envelope_uses_form_field_names_on_the_wire() {
    let env = RelayEnvelope::new("alice", "hello");
    let bytes = env.encode().expect("serialize");
    let v = parse(&bytes);

    assert_eq!(v["username"], "alice");
    assert_eq!(v["message"], "hello");
    assert!(v.get("author").is_none());
    assert!(v.get("body").is_none());
    assert_eq!(bytes, br#"{"username":"alice","message":"hello"}"#.to_vec());
}

/*
    Il relay accetta anche gli alias author / body in ingresso.
*/
#[test]
fn relay_envelope_accepts_author_and_body_aliases() {
    let env = RelayEnvelope::decode(br#"{"author":"bob","body":"ciao"}"#).expect("decode");
    assert_eq!(env, RelayEnvelope::new("bob", "ciao"));
}

/*
    Campi mancanti => stringa vuota, nessun rifiuto.
*/
#[test]
fn relay_envelope_missing_fields_default_to_empty() {
    let env = RelayEnvelope::decode(b"{}").expect("decode");
    assert_eq!(env.author, "");
    assert_eq!(env.body, "");

    let env = RelayEnvelope::decode(br#"{"username":"carol"}"#).expect("decode");
    assert_eq!(env.author, "carol");
    assert_eq!(env.body, "");
}

/*
    Obiettivo test: una data messa dal client nel payload non deve sopravvivere alla decodifica,
    il timestamp lo decide solo il relay.
*/
#[test]
fn client_supplied_date_is_overwritten_by_stamp() {
    let env = RelayEnvelope::decode(
        br#"{"username":"mallory","message":"hi","date":"1970-01-01 00:00:00.000000"}"#,
    )
    .expect("decode");
    let msg = Message::stamp(env, "2025-11-02 10:20:30.123456".to_string());

    let v = json::to_value(&msg).expect("serialize");
    assert_eq!(v["date"], "2025-11-02 10:20:30.123456");
    assert_eq!(v["username"], "mallory");
    assert_eq!(v["message"], "hi");
}

/*
    Payload non validi: JSON rotto, JSON troncato, JSON che non è un oggetto, campo non stringa, byte non utf-8.
*/
#[test]
fn malformed_payloads_are_decode_errors() {
    assert!(matches!(RelayEnvelope::decode(b"not json"), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(br#"{"username":"al"#), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(br#"["alice","hello"]"#), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(br#"["alice"]"#), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(br#""alice""#), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(b"42"), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(b"null"), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(br#"{"username":42}"#), Err(DecodeError::Json(_))));
    assert!(matches!(RelayEnvelope::decode(&[0xff, 0xfe, b'{', b'}']), Err(DecodeError::Utf8(_))));
}

/*
    Il testo viaggia intatto: niente trim, unicode e caratteri speciali preservati.
*/
#[test]
fn relay_envelope_preserves_text_exactly() {
    let env = RelayEnvelope::new("  ànna ", "riga 1\nriga \"2\" 🚀 ");
    let back = RelayEnvelope::decode(&env.encode().expect("serialize")).expect("decode");
    assert_eq!(back, env);
}

/*
    Obiettivo test: il documento persistito ha esattamente i campi username / message / date.
*/
#[test]
fn persisted_message_has_document_shape() {
    let msg = Message {
        author: "alice".to_string(),
        body: "hello".to_string(),
        received_at: "2025-11-02 10:20:35.000001".to_string(),
    };
    let v = json::to_value(&msg).expect("serialize");
    let obj = v.as_object().expect("object");

    assert_eq!(obj.len(), 3);
    assert_eq!(v["username"], "alice");
    assert_eq!(v["message"], "hello");
    assert_eq!(v["date"], "2025-11-02 10:20:35.000001");
}

/*
    Il form prende il primo valore non vuoto di ogni campo e ignora il resto.
*/
#[test]
fn submit_form_from_pairs() {
    let form = SubmitForm::from_pairs([("username", "alice"), ("message", "hello"), ("other", "x")]);
    assert_eq!(form, SubmitForm { username: "alice".into(), message: "hello".into() });

    let form = SubmitForm::from_pairs([("username", ""), ("username", "bob"), ("username", "eve")]);
    assert_eq!(form.username, "bob");
    assert_eq!(form.message, "");

    let form = SubmitForm::from_pairs(Vec::<(String, String)>::new());
    assert_eq!(form, SubmitForm::default());

    let env: RelayEnvelope = SubmitForm { username: "a".into(), message: "b".into() }.into();
    assert_eq!(env, RelayEnvelope::new("a", "b"));
}

#[test]
fn timestamp_has_microsecond_shape() {
    assert_eq!(
        format_timestamp(datetime!(2025-03-04 05:06:07.000089 UTC)).expect("format"),
        "2025-03-04 05:06:07.000089"
    );

    let now = now_timestamp().expect("format");
    let b = now.as_bytes();
    assert_eq!(b.len(), 26, "unexpected shape: {now}");
    for (i, c) in b.iter().enumerate() {
        match i {
            4 | 7 => assert_eq!(*c, b'-'),
            10 => assert_eq!(*c, b' '),
            13 | 16 => assert_eq!(*c, b':'),
            19 => assert_eq!(*c, b'.'),
            _ => assert!(c.is_ascii_digit(), "unexpected shape: {now}"),
        }
    }
}

#[test]
fn connection_ids_are_unique() {
    assert_ne!(new_connection_id(), new_connection_id());
}
