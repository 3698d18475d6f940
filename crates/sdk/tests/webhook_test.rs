// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for signing and webhook verification
//!
//! These tests verify:
//! - Determinism and key sensitivity of tags
//! - Sign/seal/verify round trips under both escape policies
//! - Tamper detection on every payload byte, escapes included
//! - Verification over the exact received bytes (key order, escapes)

use heleket_sdk::{
	EscapePolicy, SecretKey, VerifyError, WebhookKind, canonical::locate_tag, compute_tag,
	parse_webhook, seal, seal_raw, sign, verify,
};
use rand::{Rng, distributions::Alphanumeric};
use serde::de::IgnoredAny;
use serde_json::{Value, json};

/// Webhook sample as the gateway documents it (tag not valid for any test key)
const DOCUMENTED_WEBHOOK: &str = r#"{
  "type": "payment",
  "uuid": "62f88b36-a9d5-4fa6-aa26-e040c3dbf26d",
  "order_id": "97a75bf8eda5cca41ba9d2e104840fcd",
  "amount": "3.00000000",
  "payment_amount": "3.00000000",
  "payment_amount_usd": "0.23",
  "merchant_amount": "2.94000000",
  "commission": "0.06000000",
  "is_final": true,
  "status": "paid",
  "from": "THgEWubVc8tPKXLJ4VZ5zbiiAK7AgqSeGH",
  "wallet_address_uuid": null,
  "network": "tron",
  "currency": "TRX",
  "payer_currency": "TRX",
  "additional_data": null,
  "convert": {
    "to_currency": "USDT",
    "commission": null,
    "rate": "0.07700000",
    "amount": "0.22638000"
  },
  "txid": "6f0d9c8374db57cac0d806251473de754f361c83a03cd805f74aa9da3193486b",
  "sign": "a76c0d77f3e8e1a419b138af04ab600a"
}"#;

/// Signed by an independent encoder: keys not sorted, slashes escaped
const FOREIGN_BODY: &str = r#"{"uuid":"62f8","type":"payment","url":"https:\/\/pay.heleket.com\/x","status":"paid"}"#;
const FOREIGN_TAG: &str = "1d000d2811d46816f8a097b87f7b749e";

fn key(k: &str) -> SecretKey {
	SecretKey::new(k).unwrap()
}

fn random_key(rng: &mut impl Rng) -> String {
	let len = rng.gen_range(1..48);
	rng.sample_iter(&Alphanumeric)
		.take(len)
		.map(char::from)
		.collect()
}

fn with_tag(body: &str, tag: &str) -> String {
	let head = body.strip_suffix('}').unwrap();
	format!(r#"{},"sign":"{}"}}"#, head, tag)
}

fn sample_payloads() -> Vec<Value> {
	vec![
		json!({"a": "1", "b": "2"}),
		json!({}),
		json!({"url_callback": "https://example.com/heleket/callback", "amount": "10"}),
		json!({"note": "café € 𝄞", "nested": {"list": [1, 2.5, null, true], "s": "x/y"}}),
		json!({"memo": "quote \" and backslash \\ and brace }", "order_id": "o-1"}),
	]
}

#[test]
fn test_concrete_scenario() {
	let body = br#"{"a":"1","b":"2"}"#;
	let tag = compute_tag(body, &key("k"));
	assert_eq!(tag.as_str(), "362191a0aa8b67e4d5bee0a8b30cc0d1");

	let wire = with_tag(r#"{"a":"1","b":"2"}"#, tag.as_str());
	assert_eq!(verify(wire.as_bytes(), &key("k")), Ok(()));
	assert!(matches!(
		verify(wire.as_bytes(), &key("wrong")),
		Err(VerifyError::SignatureMismatch { .. })
	));
	assert_eq!(
		verify(br#"{"a":"1","b":"2"}"#, &key("k")),
		Err(VerifyError::MissingTag)
	);
}

#[test]
fn test_sign_is_deterministic() {
	let k = key("payment-key");
	for payload in sample_payloads() {
		for policy in [EscapePolicy::Plain, EscapePolicy::Php] {
			let first = sign(Some(&payload), &k, policy).unwrap();
			let second = sign(Some(&payload), &k, policy).unwrap();
			assert_eq!(first, second);
		}
	}
}

#[test]
fn test_key_sensitivity() {
	let mut rng = rand::thread_rng();
	let payload = json!({"a": "1", "b": "2"});

	for _ in 0..500 {
		let a = random_key(&mut rng);
		let b = random_key(&mut rng);
		if a == b {
			continue;
		}
		let tag_a = sign(Some(&payload), &key(&a), EscapePolicy::Plain).unwrap();
		let tag_b = sign(Some(&payload), &key(&b), EscapePolicy::Plain).unwrap();
		assert_ne!(tag_a, tag_b, "keys {:?} and {:?} collided", a, b);
	}
}

#[test]
fn test_round_trip_both_policies() {
	let mut rng = rand::thread_rng();
	for payload in sample_payloads() {
		for policy in [EscapePolicy::Plain, EscapePolicy::Php] {
			let k = key(&random_key(&mut rng));
			let tag = sign(Some(&payload), &k, policy).unwrap();
			let wire = seal(&payload, &k, policy).unwrap();

			let span = locate_tag(&wire).unwrap();
			assert_eq!(span.claimed, tag.as_str());
			assert_eq!(verify(&wire, &k), Ok(()), "payload {}", payload);
		}
	}
}

#[test]
fn test_seal_raw_round_trip_keeps_foreign_formatting() {
	let k = key("payment-key");
	let pretty = "{\n  \"uuid\": \"62f8\",\n  \"url\": \"https:\\/\\/pay.heleket.com\\/x\"\n}";

	let wire = seal_raw(pretty.as_bytes(), &k).unwrap();
	assert_eq!(verify(&wire, &k), Ok(()));

	let canonical = heleket_sdk::canonicalize(&wire).unwrap();
	assert_eq!(canonical.bytes, pretty.as_bytes());

	let sealed = seal_raw(FOREIGN_BODY.as_bytes(), &k).unwrap();
	assert_eq!(sealed, with_tag(FOREIGN_BODY, FOREIGN_TAG).into_bytes());
}

/// Substitute a byte, keeping letters and digits within their class
fn tampered_byte(b: u8) -> u8 {
	match b {
		b'0'..=b'8' | b'a'..=b'y' | b'A'..=b'Y' => b + 1,
		b'9' => b'0',
		b'z' => b'a',
		b'Z' => b'A',
		_ => b'x',
	}
}

#[test]
fn test_tamper_any_payload_byte() {
	let k = key("payout-key");
	let payload = json!({
		"type": "payout",
		"uuid": "A9D5fa6a-26e",
		"amount": "12.50",
		"count": 42,
		"url": "https://pay.heleket.com/p/Ab",
		"note": "café €"
	});
	let wire = seal(&payload, &k, EscapePolicy::Php).unwrap();
	let tag_start = locate_tag(&wire).unwrap().excise.start;
	assert!(wire.windows(6).any(|w| w == br"\u00e9"));
	assert!(wire.windows(2).any(|w| w == br"\/"));

	let mut mismatches = 0;
	for i in 0..tag_start {
		let mut tampered = wire.clone();
		tampered[i] = tampered_byte(wire[i]);
		let still_json = serde_json::from_slice::<IgnoredAny>(&tampered).is_ok();
		let structural = matches!(wire[i], b'{' | b'}' | b'"' | b':' | b',');
		let escaped = i > 0 && wire[i - 1] == b'\\';

		match verify(&tampered, &k) {
			Ok(()) => panic!("change at offset {} was not detected", i),
			Err(VerifyError::SignatureMismatch { .. }) => mismatches += 1,
			Err(VerifyError::MalformedPayload(_)) => {
				assert!(!still_json, "valid JSON rejected at offset {}", i);
				assert!(
					structural || escaped,
					"non-structural byte {:?} at offset {} broke the payload",
					wire[i] as char,
					i
				);
			}
			Err(VerifyError::MissingTag) => {
				assert!(structural, "tag lost at offset {}", i);
			}
		}
	}
	assert!(mismatches > 60);
}

#[test]
fn test_verify_uses_received_bytes() {
	let k = key("payment-key");
	let wire = with_tag(FOREIGN_BODY, FOREIGN_TAG);
	assert_eq!(verify(wire.as_bytes(), &k), Ok(()));

	// Decoding and re-encoding loses both the key order and the `\/` escapes
	let mut decoded: Value = serde_json::from_str(&wire).unwrap();
	decoded.as_object_mut().unwrap().remove("sign");
	let reencoded = serde_json::to_vec(&decoded).unwrap();
	assert_ne!(reencoded, FOREIGN_BODY.as_bytes());
	assert_ne!(compute_tag(&reencoded, &k).as_str(), FOREIGN_TAG);
}

#[test]
fn test_tag_position_does_not_matter() {
	let k = key("payment-key");
	let first = format!(
		r#"{{"sign":"{}",{}"#,
		FOREIGN_TAG,
		FOREIGN_BODY.strip_prefix('{').unwrap()
	);
	assert_eq!(verify(first.as_bytes(), &k), Ok(()));
}

#[test]
fn test_documented_webhook() {
	let event = parse_webhook(DOCUMENTED_WEBHOOK.as_bytes(), None).unwrap();
	assert_eq!(event.kind, WebhookKind::Payment);
	assert_eq!(event.status.as_deref(), Some("paid"));
	assert_eq!(event.is_final, Some(true));
	assert_eq!(event.fields["convert"]["to_currency"], json!("USDT"));

	let span = locate_tag(DOCUMENTED_WEBHOOK.as_bytes()).unwrap();
	assert_eq!(span.claimed, "a76c0d77f3e8e1a419b138af04ab600a");
	assert!(parse_webhook(DOCUMENTED_WEBHOOK.as_bytes(), Some(&key("payment-key"))).is_err());
}

#[test]
fn test_concurrent_verification() {
	let k = key("payment-key");
	let wire = with_tag(FOREIGN_BODY, FOREIGN_TAG);

	std::thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				for _ in 0..100 {
					assert_eq!(verify(wire.as_bytes(), &k), Ok(()));
				}
			});
		}
	});
}
