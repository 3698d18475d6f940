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

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Map, Value, json};
use std::hint::black_box;

use heleket_sdk::{EscapePolicy, SecretKey, seal, sign, verify};

const FIELD_COUNTS: &[usize] = &[4, 32, 256];

fn payload(fields: usize) -> Value {
	let mut map = Map::new();
	for i in 0..fields {
		map.insert(
			format!("field_{}", i),
			json!(format!("https://pay.heleket.com/invoice/{}", i)),
		);
	}
	Value::Object(map)
}

fn bench_sign(c: &mut Criterion) {
	let key = SecretKey::new("bench-payment-key").unwrap();
	let mut group = c.benchmark_group("sign");

	for &fields in FIELD_COUNTS {
		let value = payload(fields);
		group.bench_with_input(BenchmarkId::from_parameter(fields), &value, |b, value| {
			b.iter(|| sign(Some(black_box(value)), &key, EscapePolicy::Php).unwrap());
		});
	}

	group.finish();
}

fn bench_verify(c: &mut Criterion) {
	let key = SecretKey::new("bench-payment-key").unwrap();
	let mut group = c.benchmark_group("verify");

	for &fields in FIELD_COUNTS {
		let wire = seal(&payload(fields), &key, EscapePolicy::Php).unwrap();
		group.throughput(Throughput::Bytes(wire.len() as u64));
		group.bench_with_input(BenchmarkId::from_parameter(fields), &wire, |b, wire| {
			b.iter(|| verify(black_box(wire), &key).unwrap());
		});
	}

	group.finish();
}

criterion_group!(benches, bench_sign, bench_verify);
criterion_main!(benches);
