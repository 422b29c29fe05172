//! Benchmarks for building form bodies and decoding replies.
//!
//! Run with: `cargo bench --bench wire_overhead`

#![allow(clippy::unwrap_used, reason = "benchmark inputs are known to be valid")]
#![allow(missing_docs, reason = "Benchmark functions are self-documenting")]

use std::hint::black_box;

use converge_gateway::{
    CreditCard, GatewayConfig, Operation, Request,
    audit::redact_sensitive,
    response::{RecordDelimiter, ResponseFormat},
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;

fn config() -> GatewayConfig {
    GatewayConfig::new("000000", "USERNAME", "PASSWORD").with_test_mode(true)
}

/// Benchmark `data()` plus form encoding per operation
fn bench_body_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_building");
    let config = config();

    let void = Request::new(Operation::Void, &config).with_transaction_reference("SALE123");
    let purchase = Request::new(Operation::Purchase, &config)
        .with_amount(Decimal::new(1999, 2))
        .with_description("Order #1042")
        .with_card(
            CreditCard::new("4111111111111111", 12, 2099)
                .with_cvv("123")
                .with_name("Ada", "Lovelace")
                .with_address("1 Main St", None)
                .with_postcode("94025"),
        );

    for (name, request) in [("void", &void), ("purchase", &purchase)] {
        group.bench_with_input(BenchmarkId::new("data_and_encode", name), request, |b, request| {
            b.iter(|| {
                let data = black_box(request).data().unwrap();
                black_box(data.to_form_encoded().unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark reply decoding for each delimiter mode
fn bench_reply_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_parsing");

    let newline = "ssl_result=0\nssl_result_message=APPROVAL\nssl_txn_id=AA49315-1234\n\
                   ssl_approval_code=CMC142\nssl_card_number=41**********1111\nssl_amount=19.99\n\
                   ssl_txn_time=10/16/2026 09:12:01 AM\nssl_avs_response=Y\nssl_cvv2_response=M";
    let piped = newline.replace('\n', "|");

    let cases = [
        ("auto_newline", ResponseFormat::default(), newline.to_owned()),
        ("auto_pipe", ResponseFormat::default(), piped.clone()),
        (
            "explicit_pipe",
            ResponseFormat::default().with_delimiter(RecordDelimiter::Char('|')),
            piped,
        ),
        ("empty", ResponseFormat::default(), String::new()),
    ];

    for (name, format, body) in &cases {
        group.bench_with_input(BenchmarkId::new("parse", name), body, |b, body| {
            b.iter(|| black_box(format.parse(black_box(body))));
        });
    }

    group.finish();
}

/// Benchmark log redaction on a full form body
fn bench_redaction(c: &mut Criterion) {
    let body = Request::new(Operation::Purchase, &config())
        .with_amount(Decimal::new(1999, 2))
        .with_card(CreditCard::new("4111111111111111", 12, 2099).with_cvv("123"))
        .data()
        .unwrap()
        .to_form_encoded()
        .unwrap();

    c.bench_function("redact_form_body", |b| {
        b.iter(|| black_box(redact_sensitive(black_box(&body))));
    });
}

/// Benchmark the cost of an audit event with and without a subscriber
fn bench_audit_logging(c: &mut Criterion) {
    use converge_gateway::audit::{AuditEvent, AuditEventType, audit_log};
    use uuid::Uuid;

    let mut group = c.benchmark_group("audit_logging");

    group.bench_function("no_subscriber", |b| {
        b.iter(|| {
            let event = AuditEvent::new(AuditEventType::RequestSent, "000000", Uuid::new_v4())
                .with_operation("void");
            audit_log(black_box(&event));
        });
    });

    group.bench_function("json_subscriber", |b| {
        let subscriber =
            tracing_subscriber::fmt().json().with_writer(std::io::sink).finish();

        tracing::subscriber::with_default(subscriber, || {
            b.iter(|| {
                let event = AuditEvent::new(AuditEventType::RequestSent, "000000", Uuid::new_v4())
                    .with_operation("void");
                audit_log(black_box(&event));
            });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_body_building,
    bench_reply_parsing,
    bench_redaction,
    bench_audit_logging
);
criterion_main!(benches);
