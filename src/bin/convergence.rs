//! Experiment Runner for the Convergence Analysis.
//!
//! This executable measures accuracy and cost of the restarted Newton
//! propagator as the Krylov dimension `m_max` grows, on a dense Hermitian
//! test problem whose exact propagation is known analytically.
//!
//! ## Methodology
//!
//! 1.  **Analytically solvable problem**: the operator is `H = P·D·P`
//!     with `D` a random real diagonal and `P = I − 2wwᴴ` a Householder
//!     reflector built from a random unit vector. Since `P` is unitary
//!     and Hermitian, `f(H·dt) = P·diag(f(λᵢ·dt))·P`, so the ground
//!     truth requires no dense eigensolver.
//! 2.  **Statistical sampling**: each configuration is timed over several
//!     samples; the median (robust to outliers) and standard deviation
//!     are reported.
//! 3.  **Diagnostics**: restart count, Leja-sequence length, the fixed
//!     scaling radius, and peak RSS accompany every data point.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use faer::{
    Mat, Par, c64,
    dyn_stack::{MemBuffer, MemStack},
    matrix_free::LinOp,
    prelude::*,
};
use newton_propagator::{
    NewtonWorkspace, exp_minus_iz, propagate, utils::perf::peak_rss_kb, vector,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use statrs::statistics::{Data, Distribution, Median};
use std::{path::PathBuf, time::Instant};

/// Command-line arguments for the convergence experiment.
#[derive(Parser, Debug)]
#[clap(
    name = "convergence-runner",
    about = "Runs the convergence analysis for the restarted Newton propagator."
)]
struct ConvergenceArgs {
    /// Dimension of the test problem.
    #[clap(long, default_value_t = 400)]
    dim: usize,

    /// Real part of the time step.
    #[clap(long, default_value_t = 0.5)]
    dt_re: f64,

    /// Imaginary part of the time step.
    #[clap(long, default_value_t = 0.0)]
    dt_im: f64,

    /// Half-width of the uniform eigenvalue distribution of the operator.
    #[clap(long, default_value_t = 5.0)]
    spectral_radius: f64,

    /// Smallest Krylov dimension to test.
    #[clap(long, default_value_t = 4)]
    m_start: usize,

    /// Largest Krylov dimension to test.
    #[clap(long, default_value_t = 40)]
    m_end: usize,

    /// Step size for the Krylov dimension sweep.
    #[clap(long, default_value_t = 4)]
    m_step: usize,

    /// Number of timed samples per configuration.
    #[clap(long, default_value_t = 5)]
    num_samples: usize,

    /// Seed for the random problem generator.
    #[clap(long, default_value_t = 42)]
    seed: u64,

    /// Path to the output CSV file where results will be written.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,
}

/// One row of the convergence analysis CSV.
#[derive(Debug, Serialize)]
struct ConvergenceResult {
    /// The Krylov dimension of this configuration.
    m_max: usize,
    /// Whether the propagation converged within the restart budget.
    converged: bool,
    /// Relative error against the analytic ground truth.
    rel_error: f64,
    /// Restarts taken by the final sample.
    restarts: usize,
    /// Leja points accumulated by the final sample.
    n_leja: usize,
    /// The scaling radius fixed from the first Ritz spectrum.
    radius: f64,
    /// Median wall time over the samples, in seconds.
    time_s_median: f64,
    /// Standard deviation of the wall time, in seconds.
    time_s_stddev: f64,
    /// Peak resident set size after this configuration, in KB.
    rss_kb: u64,
}

/// The analytically solvable Hermitian test problem.
struct TestProblem {
    h: Mat<c64>,
    psi0: Mat<c64>,
    exact: Mat<c64>,
}

/// Builds `H = P·D·P` together with the exact propagation of a random
/// unit state.
fn build_problem(dim: usize, dt: c64, spectral_radius: f64, seed: u64) -> TestProblem {
    let mut rng = StdRng::seed_from_u64(seed);

    // Random real spectrum, uniform in [-spectral_radius, spectral_radius].
    let eigs: Vec<f64> = (0..dim)
        .map(|_| spectral_radius * (2.0 * rng.random::<f64>() - 1.0))
        .collect();

    // Householder reflector P = I - 2wwᴴ from a random unit vector.
    let mut w = Mat::from_fn(dim, 1, |_, _| c64::new(rng.random(), rng.random()));
    let w_norm = vector::norm(w.as_ref());
    vector::scale(w.as_mut(), c64::new(1.0 / w_norm, 0.0));
    let p = Mat::from_fn(dim, dim, |i, j| {
        let outer = w.as_ref()[(i, 0)] * w.as_ref()[(j, 0)].conj() * 2.0;
        if i == j { c64::new(1.0, 0.0) - outer } else { -outer }
    });

    let d = Mat::from_fn(dim, dim, |i, j| {
        if i == j {
            c64::new(eigs[i], 0.0)
        } else {
            c64::new(0.0, 0.0)
        }
    });
    let h = &p * &d * &p;

    let mut psi0 = Mat::from_fn(dim, 1, |_, _| c64::new(rng.random(), rng.random()));
    let psi_norm = vector::norm(psi0.as_ref());
    vector::scale(psi0.as_mut(), c64::new(1.0 / psi_norm, 0.0));

    // Exact result: P·diag(f(λᵢ·dt))·P·ψ₀.
    let mut y = &p * &psi0;
    for i in 0..dim {
        let factor = exp_minus_iz(c64::new(eigs[i], 0.0) * dt);
        y.as_mut()[(i, 0)] *= factor;
    }
    let exact = &p * &y;

    TestProblem { h, psi0, exact }
}

/// Runs all samples for one Krylov dimension and aggregates the metrics.
fn run_configuration(
    problem: &TestProblem,
    dt: c64,
    m_max: usize,
    num_samples: usize,
) -> Result<ConvergenceResult> {
    let dim = problem.h.nrows();
    let mut wrk = NewtonWorkspace::new(problem.psi0.as_ref(), m_max);
    let mut mem = MemBuffer::new(problem.h.as_ref().apply_scratch(1, Par::Seq));

    let mut times = Vec::with_capacity(num_samples);
    let mut converged = true;
    let mut psi = Mat::<c64>::zeros(dim, 1);

    for sample in 0..num_samples {
        psi.as_mut().copy_from(problem.psi0.as_ref());
        let mut stack = MemStack::new(&mut mem);
        let start = Instant::now();
        let outcome = propagate(&problem.h.as_ref(), psi.as_mut(), dt, &mut wrk, &mut stack);
        times.push(start.elapsed().as_secs_f64());
        if let Err(err) = outcome {
            log::warn!("m_max = {m_max}, sample {sample}: propagation failed: {err}");
            converged = false;
            break;
        }
    }

    let rel_error = if converged {
        let mut diff = psi.clone();
        for i in 0..dim {
            let e = problem.exact.as_ref()[(i, 0)];
            diff.as_mut()[(i, 0)] -= e;
        }
        vector::norm(diff.as_ref()) / vector::norm(problem.exact.as_ref())
    } else {
        f64::NAN
    };

    let samples = Data::new(times);
    Ok(ConvergenceResult {
        m_max,
        converged,
        rel_error,
        restarts: wrk.restarts(),
        n_leja: wrk.n_leja(),
        radius: wrk.radius(),
        time_s_median: samples.median(),
        time_s_stddev: samples.std_dev().unwrap_or(0.0),
        rss_kb: peak_rss_kb(),
    })
}

/// The main entry point for the convergence experiment.
fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let args = ConvergenceArgs::parse();
    if args.m_step == 0 || args.m_start == 0 {
        return Err(anyhow!("m-start and m-step must be positive."));
    }
    let dt = c64::new(args.dt_re, args.dt_im);
    if dt == c64::new(0.0, 0.0) {
        return Err(anyhow!("The time step must be nonzero."));
    }

    log::info!(
        "Building test problem: dim = {}, spectral radius = {}...",
        args.dim,
        args.spectral_radius,
    );
    let problem = build_problem(args.dim, dt, args.spectral_radius, args.seed);

    let mut results = Vec::new();
    for m_max in (args.m_start..=args.m_end).step_by(args.m_step) {
        log::info!("Running convergence analysis for m_max = {m_max}...");
        let result = run_configuration(&problem, dt, m_max, args.num_samples)?;
        log::info!(
            "m_max = {}: rel_error = {:.3e}, restarts = {}, median time = {:.3e} s",
            result.m_max,
            result.rel_error,
            result.restarts,
            result.time_s_median,
        );
        results.push(result);
    }

    log::info!("Experiment finished. Writing results to {:?}...", &args.output);
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to open output file {:?}", &args.output))?;
    for record in results {
        writer.serialize(record)?;
    }
    writer.flush()?;

    log::info!("Convergence analysis complete.");
    Ok(())
}
