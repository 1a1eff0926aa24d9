use ndarray::*;
use ndarray_cholesky::*;

// Solve `Ax=b` for a symmetric positive-definite A
fn solve() -> Result<(), error::CholeskyError> {
    let a: Array2<f64> = random_spd(3);
    let b: Array1<f64> = random(3);
    println!("b = {:?}", &b);
    let x = a.solveh(&b)?;
    println!("Ax = {:?}", a.dot(&x));
    Ok(())
}

// Solve `Ax=b` for many b with fixed A, on 2 worker threads
fn factorize() -> Result<(), error::CholeskyError> {
    let a: Array2<f64> = min_matrix(64);
    let f = a.factorizeh_with(FactorOpts {
        block_size: 8,
        threads: 2,
    })?;
    // once factorized, you can use it several times:
    for _ in 0..10 {
        let b: Array1<f64> = random(64);
        let _x = f.solveh_into(b)?;
    }
    Ok(())
}

fn main() {
    solve().unwrap();
    factorize().unwrap();
}
