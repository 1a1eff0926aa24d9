//! Solve a symmetric system from the command line.
//!
//! ```text
//! cholsolve <size> <block-size> <threads> [matrix-file]
//! ```
//!
//! Without a file the matrix is generated as `A[i, j] = min(n - i, n - j)`;
//! with a file it is read as whitespace-separated entries of the full
//! symmetric matrix in row-major order (only the upper triangle is kept).
//! The right-hand side is `b = A * x` for the known answer `x` with ones at
//! even indices, so the report at the end can state the true error next to
//! the residual.

use ndarray::*;
use ndarray_cholesky::*;
use std::env;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    if args.len() < 3 || args.len() > 4 {
        return Err("usage: cholsolve <size> <block-size> <threads> [matrix-file]".to_string());
    }

    let size: usize = parse(&args[0], "size")?;
    let block_size: usize = parse(&args[1], "block size")?;
    let threads: usize = parse(&args[2], "thread count")?;
    let opts = FactorOpts {
        block_size,
        threads,
    };

    let clock = Instant::now();
    let a: Array2<f64> = match args.get(3) {
        Some(path) => read_matrix(path, size)?,
        None => min_matrix(size),
    };
    let answer: Array1<f64> = even_ones(size);
    let b = a.dot(&answer);
    report("initialization", clock);

    if size < 15 {
        println!("matrix A:");
        print_matrix(&a);
        println!("\nrhs:\n{b:12.6}\n");
    }

    let clock = Instant::now();
    let f = a
        .factorizeh_with(opts)
        .map_err(|e| format!("factorization failed: {e}"))?;
    report("factorization", clock);

    let clock = Instant::now();
    let x = f.solveh(&b).map_err(|e| format!("solve failed: {e}"))?;
    report("triangular solves", clock);

    if size < 15 {
        println!("factor R:");
        print_matrix(&unpack_upper(&f.factor, size).map_err(|e| e.to_string())?);
        println!("\nsigns:\n{:4.1}\n", Array1::from_vec(f.signs.clone()));
    }

    let error = (&x - &answer).norm_l2();
    let residual = (&b - &a.dot(&x)).norm_l2();
    let rhs_norm = b.norm_l2();
    println!(
        "Error: {:11.5e} ; Residual: {:11.5e} ({:11.5e})",
        error,
        residual,
        residual / rhs_norm
    );

    Ok(())
}

fn parse(arg: &str, what: &str) -> Result<usize, String> {
    arg.parse()
        .map_err(|_| format!("invalid {what}: {arg:?}"))
}

fn read_matrix(path: &str, size: usize) -> Result<Array2<f64>, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("cannot open {path}: {e}"))?;
    let mut values = text.split_whitespace();

    let mut a = Array2::zeros((size, size));
    for i in 0..size {
        for j in 0..size {
            let v = values
                .next()
                .ok_or_else(|| format!("cannot read matrix: expected {} entries", size * size))?;
            a[(i, j)] = v
                .parse()
                .map_err(|e| format!("cannot read matrix: {e}"))?;
        }
    }
    Ok(a)
}

fn print_matrix(a: &Array2<f64>) {
    for row in a.rows() {
        for v in row {
            print!("{v:>12.6} ");
        }
        println!();
    }
}

fn report(stage: &str, clock: Instant) {
    println!("Time on {stage}: {:.3} s", clock.elapsed().as_secs_f64());
}
