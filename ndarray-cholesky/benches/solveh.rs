use criterion::*;
use ndarray::*;
use ndarray_cholesky::*;

fn factorizeh_blocked(c: &mut Criterion) {
    let mut group = c.benchmark_group("factorizeh");
    for &n in &[32, 64, 128, 256] {
        let a: Array2<f64> = min_matrix(n);
        for &block_size in &[8, 32] {
            for &threads in &[1, 2, 4] {
                let opts = FactorOpts {
                    block_size,
                    threads,
                };
                let id = BenchmarkId::new(format!("b{block_size}/t{threads}"), n);
                group.bench_with_input(id, &n, |b, _| {
                    b.iter(|| {
                        let _f = a.factorizeh_with(opts).unwrap();
                    })
                });
            }
        }
    }
}

fn solveh_factored(c: &mut Criterion) {
    let mut group = c.benchmark_group("solveh");
    for &n in &[32, 64, 128, 256] {
        let a: Array2<f64> = min_matrix(n);
        let b_vec: Array1<f64> = a.dot(&even_ones::<f64>(n));
        let f = a
            .factorizeh_with(FactorOpts {
                block_size: 32.min(n),
                threads: 1,
            })
            .unwrap();
        group.bench_with_input(BenchmarkId::new("solveh", n), &n, |b, _| {
            b.iter(|| {
                let _x = f.solveh(&b_vec).unwrap();
            })
        });
    }
}

criterion_group!(solveh, factorizeh_blocked, solveh_factored);
criterion_main!(solveh);
