use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relopt::{estimated, optimize, parse_query, parse_yaml_catalogue, MemoryCatalogue, Operator};

/// A chain of `n` relations `R0..Rn`, each joined to the next by `ki = fi+1`.
fn chain(n: usize) -> (MemoryCatalogue, String) {
    let mut yaml = String::from("relations:\n");
    for i in 0..n {
        yaml.push_str(&format!(
            "  - name: R{i}\n    tuples: {}\n    attributes:\n      - {{ name: k{i}, distinct: 100 }}\n      - {{ name: f{i}, distinct: 50 }}\n      - {{ name: v{i}, distinct: 10 }}\n",
            1000 + i * 10
        ));
    }
    let from: Vec<String> = (0..n).map(|i| format!("R{i}")).collect();
    let mut preds: Vec<String> = (0..n - 1).map(|i| format!("k{i} = f{}", i + 1)).collect();
    preds.push("v0 = \"x\"".into());
    let query = format!(
        "SELECT v0, v{}\nFROM {}\nWHERE {}",
        n - 1,
        from.join(", "),
        preds.join(", ")
    );
    (parse_yaml_catalogue(&yaml).unwrap(), query)
}

fn canonical(n: usize) -> Operator {
    let (catalogue, query) = chain(n);
    parse_query(&query, &catalogue).unwrap()
}

fn bench_optimize(c: &mut Criterion) {
    for n in [3usize, 8, 16] {
        let plan = canonical(n);
        c.bench_function(&format!("optimize_chain_{n}"), |b| {
            b.iter(|| optimize(black_box(&plan)).unwrap())
        });
    }
}

fn bench_estimate(c: &mut Criterion) {
    let plan = optimize(&canonical(8)).unwrap();
    c.bench_function("estimate_optimized_chain_8", |b| {
        b.iter(|| estimated(black_box(plan.clone())).unwrap())
    });
}

criterion_group!(benches, bench_optimize, bench_estimate);
criterion_main!(benches);
