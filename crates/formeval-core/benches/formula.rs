use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::NaiveDate;
use formeval_core::formula::{compile, Helpers};
use formeval_core::model::ValueMap;

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    let simple = "num(values.qty) * num(values.price)";
    let helper = "helpers.age(values.dob)";
    let nested = "values.country == 'NZ' ? (num(values.net) * 1.15) : \
                  values.country == 'AU' ? (num(values.net) * 1.1) : num(values.net)";

    let long = {
        let terms: Vec<String> = (0..100).map(|i| format!("num(values.f{i})")).collect();
        terms.join(" + ")
    };

    group.bench_function("simple", |b| b.iter(|| compile(black_box(simple))));
    group.bench_function("helper", |b| b.iter(|| compile(black_box(helper))));
    group.bench_function("nested_conditional", |b| {
        b.iter(|| compile(black_box(nested)))
    });
    group.bench_function("100_terms", |b| b.iter(|| compile(black_box(&long))));

    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");

    let helpers = Helpers::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    let mut values = ValueMap::new();
    values.insert("qty", "3");
    values.insert("price", "19.99");
    values.insert("dob", "1990-05-17");
    for i in 0..100 {
        values.insert(format!("f{i}"), i.to_string());
    }

    let product = compile("num(values.qty) * num(values.price)").unwrap();
    let age = compile("helpers.age(values.dob)").unwrap();
    let long = {
        let terms: Vec<String> = (0..100).map(|i| format!("num(values.f{i})")).collect();
        compile(&terms.join(" + ")).unwrap()
    };

    group.bench_function("product", |b| {
        b.iter(|| product.run(black_box(&values), &helpers))
    });
    group.bench_function("age", |b| b.iter(|| age.run(black_box(&values), &helpers)));
    group.bench_function("100_terms", |b| {
        b.iter(|| long.run(black_box(&values), &helpers))
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_run);
criterion_main!(benches);
