//! Performance benchmarks for the payroll engine.
//!
//! Targets:
//! - Progressive tax over a seven-bracket schedule: < 10μs mean
//! - One full payroll computation: < 100μs mean
//! - One generated and stored record: < 1ms mean
//! - Bulk generation of 100 employees: < 100ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use rust_decimal::Decimal;

use payroll_engine::calculation::calculate_progressive_tax;
use payroll_engine::compensation::CompensationComposer;
use payroll_engine::compliance::ComplianceChecker;
use payroll_engine::config::PayrollSettings;
use payroll_engine::currency::{CurrencyConverter, UnavailableRateSource};
use payroll_engine::models::{AuditTrace, Employee, PayPeriod};
use payroll_engine::payroll::{
    EmployeeFilter, InMemoryEmployeeDirectory, InMemoryPayrollStore, PayrollGenerator,
    PayrollInputs, compute_payroll,
};
use payroll_engine::tax_rules::{TaxRuleRepository, default_tax_rule};

/// Creates `count` active India employees.
fn create_employees(count: usize) -> Vec<Employee> {
    (0..count)
        .map(|i| Employee {
            id: format!("emp_bench_{:04}", i),
            tenant_id: "bench".to_string(),
            name: format!("Bench {}", i),
            base_salary: Decimal::new(50_000 + (i as i64 % 7) * 5_000, 0),
            currency: "INR".to_string(),
            country: "India".to_string(),
            department: None,
            active: true,
        })
        .collect()
}

/// Creates a generator with an empty store.
fn create_generator(employees: Vec<Employee>) -> PayrollGenerator {
    let settings = PayrollSettings::default();
    PayrollGenerator::new(
        Arc::new(InMemoryEmployeeDirectory::with_employees(employees)),
        Arc::new(InMemoryPayrollStore::new()),
        Arc::new(TaxRuleRepository::new()),
        Arc::new(CurrencyConverter::new(Arc::new(UnavailableRateSource), &settings)),
        settings,
    )
}

fn march_2025() -> PayPeriod {
    PayPeriod { year: 2025, month: 3 }
}

/// Benchmark: progressive tax across income levels.
///
/// Target: < 10μs mean
fn bench_progressive_tax(c: &mut Criterion) {
    let rule = default_tax_rule("India");
    let mut group = c.benchmark_group("progressive_tax");

    for income in [250_000i64, 784_200, 5_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(income), &income, |b, &income| {
            b.iter(|| {
                calculate_progressive_tax(black_box(Decimal::new(income, 0)), &rule.tax_brackets, 1)
            })
        });
    }
    group.finish();
}

/// Benchmark: one full payroll computation.
///
/// Target: < 100μs mean
fn bench_compute_payroll(c: &mut Criterion) {
    let rule = default_tax_rule("India");
    let composer = CompensationComposer::with_builtin_strategies(Decimal::new(10, 2));
    let compliance = ComplianceChecker::with_builtin_rules();

    c.bench_function("compute_payroll", |b| {
        b.iter(|| {
            let inputs = PayrollInputs {
                country: "India",
                currency: "INR",
                basic_salary: black_box(Decimal::new(75_000, 0)),
                rule: &rule,
            };
            compute_payroll(&inputs, &composer, &compliance, AuditTrace::default())
        })
    });
}

/// Benchmark: generating and storing one record.
///
/// Target: < 1ms mean
fn bench_generate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("generate_single", |b| {
        b.to_async(&rt).iter_batched(
            || create_generator(create_employees(1)),
            |generator| async move {
                let record = generator
                    .generate("bench", "emp_bench_0000", "India", march_2025())
                    .await
                    .unwrap();
                black_box(record)
            },
            BatchSize::SmallInput,
        )
    });
}

/// Benchmark: bulk generation of 100 employees.
///
/// Target: < 100ms mean
fn bench_bulk_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let employees = create_employees(100);

    let mut group = c.benchmark_group("bulk_generation");
    group.throughput(Throughput::Elements(100));

    group.bench_function("bulk_100", |b| {
        b.to_async(&rt).iter_batched(
            || create_generator(employees.clone()),
            |generator| async move {
                let summary = generator
                    .generate_bulk("bench", "India", march_2025(), &EmployeeFilter::all())
                    .await
                    .unwrap();
                black_box(summary)
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_progressive_tax,
    bench_compute_payroll,
    bench_generate,
    bench_bulk_100
);
criterion_main!(benches);
