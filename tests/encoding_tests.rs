//! Wire formats produced by the public encoders.

use rstest::{fixture, rstest};
use thingspeak_rs::{
    ChannelClient, ClientConfig, Encoding, Feed, serialise_form_bulk, serialise_form_record,
    serialise_json_bulk,
};

const STAMP: &str = "2024-01-01T00:00:00.000Z";

#[fixture]
fn feeds() -> Vec<Feed> {
    vec![
        Feed::new()
            .with_field(1, 10.5)
            .with_field(3, -2.0)
            .at(STAMP),
        Feed::new()
            .with_field(2, 0.125)
            .with_field(10, 99.0)
            .at("2024-01-01T00:01:00.000Z"),
    ]
}

#[rstest]
fn form_and_json_agree_on_in_range_fields(feeds: Vec<Feed>) {
    let json = serialise_json_bulk("KEY", &feeds).expect("serialise");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
    let updates = parsed["updates"].as_array().expect("updates array");
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1]["created_at"], "2024-01-01T00:01:00.000Z");
    assert_eq!(updates[1]["field2"], 0.125);
    assert_eq!(updates[1]["field10"], 99);

    let record = serialise_form_record(&feeds[1]);
    assert_eq!(record, "2024-01-01T00:01:00.000Z,,0.125,,,,,,,,,,|");
    assert!(!record.contains("99"));
}

#[rstest]
fn client_encodes_with_configured_encoding(feeds: Vec<Feed>) {
    let form = ChannelClient::with_config(ClientConfig::new("1", "KEY")).expect("client");
    assert_eq!(
        form.encode_batch(&feeds).expect("encode"),
        serialise_form_bulk("KEY", &feeds)
    );

    let json = ChannelClient::with_config(ClientConfig {
        encoding: Encoding::Json,
        ..ClientConfig::new("1", "KEY")
    })
    .expect("client");
    assert_eq!(
        json.encode_batch(&feeds).expect("encode"),
        serialise_json_bulk("KEY", &feeds).expect("serialise")
    );
}

#[rstest]
#[case(Encoding::Json, r#"{"write_api_key":"KEY","updates":[]}"#)]
#[case(Encoding::Form, "write_api_key=KEY&time_format=absolute&updates=")]
fn empty_batches_are_well_formed(#[case] encoding: Encoding, #[case] expected: &str) {
    let client = ChannelClient::with_config(ClientConfig {
        encoding,
        ..ClientConfig::new("1", "KEY")
    })
    .expect("client");
    assert_eq!(client.encode_batch(&[]).expect("encode"), expected);
}

#[test]
fn default_timestamps_end_in_z() {
    let first = Feed::new();
    let second = Feed::new();
    assert!(first.created_at().ends_with('Z'));
    assert!(second.created_at() >= first.created_at());
    assert_eq!(first.created_at()[..10], second.created_at()[..10]);
}
