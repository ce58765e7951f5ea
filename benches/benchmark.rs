use std::sync::OnceLock;

use criterion::{criterion_group, criterion_main, Criterion};
use utsuri::{Attribute, Dispatcher, EventKey, Model, Schema, Value};

#[derive(Default)]
struct Gauge {
    level: i64,
    events: Dispatcher,
}

impl Model for Gauge {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Gauge>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder("Gauge")
                .attribute(Attribute::new(
                    "level",
                    |g: &Gauge| g.level.into(),
                    |g, v| {
                        if let Value::Integer(i) = v {
                            g.level = i
                        }
                    },
                ))
                .build()
        })
    }

    fn dispatcher(&self) -> &Dispatcher {
        &self.events
    }
}

fn bench_instrumented_write(c: &mut Criterion) {
    let mut gauge = Gauge::default();
    for _ in 0..4 {
        gauge
            .listen_to(Some(&gauge), EventKey::change_of("level"), |_| {})
            .unwrap();
    }

    let mut next = 0i64;
    c.bench_function("set with four listeners", |b| {
        b.iter(|| {
            next = next.wrapping_add(1);
            gauge.set("level", Value::Integer(next)).unwrap();
        })
    });
}

criterion_group!(benches, bench_instrumented_write);
criterion_main!(benches);
