use lapsolve::algebra::{CooMatrix, CscMatrix, VectorMath};
use lapsolve::{FactorMethod, LaplacianSolver, SolverSettingsBuilder, SolverStatus};

fn grid(rows: usize, cols: usize, weights: impl Fn(usize) -> f64) -> CscMatrix<f64> {
    let mut is = Vec::new();
    let mut js = Vec::new();
    let mut vs = Vec::new();
    let mut e = 0;
    for r in 0..rows {
        for c in 0..cols {
            let u = r * cols + c;
            if c + 1 < cols {
                is.push(u);
                js.push(u + 1);
                vs.push(weights(e));
                e += 1;
            }
            if r + 1 < rows {
                is.push(u);
                js.push(u + cols);
                vs.push(weights(e));
                e += 1;
            }
        }
    }
    CooMatrix::symmetric(rows * cols, &is, &js, &vs).to_csc()
}

//deterministic zero-mean right-hand side
fn pseudo_rhs(n: usize) -> Vec<f64> {
    let mut b: Vec<f64> = (0..n)
        .map(|k| ((k.wrapping_mul(48271) % 1000) as f64) / 1000.0 - 0.5)
        .collect();
    let mu = b.as_slice().mean();
    b.as_mut_slice().translate(-mu);
    b
}

#[test]
fn test_grid10x10_converges_quickly() {
    let adj = grid(10, 10, |_| 1.0);
    let degs = adj.degrees();
    let b = pseudo_rhs(100);

    let settings = SolverSettingsBuilder::<f64>::default()
        .tol(1e-6)
        .max_iter(30)
        .seed(1)
        .build()
        .unwrap();
    let mut solver = LaplacianSolver::new(&adj, settings).unwrap();
    let x = solver.solve(&b).unwrap();

    assert_eq!(solver.info.status, SolverStatus::Solved);
    assert!(solver.info.iterations <= 30);

    let mut lx = vec![0.0; 100];
    adj.laplacian_mul(&x, &mut lx, &degs);
    let mut r = lx;
    r.as_mut_slice().axpby(1.0, &b, -1.0);
    assert!(r.as_slice().norm() <= 1e-6 * b.as_slice().norm());
    assert!(x.as_slice().mean().abs() < 1e-10);
}

#[test]
fn test_grid_varied_weights_both_methods() {
    //weights spread across [0.1, 10]
    let adj = grid(6, 6, |e| 0.1 * (1.0 + (e % 100) as f64));
    let degs = adj.degrees();
    let b = pseudo_rhs(36);

    for method in [FactorMethod::EdgeElim, FactorMethod::VertexSample] {
        let settings = SolverSettingsBuilder::<f64>::default()
            .factor_method(method)
            .tol(1e-6)
            .max_iter(200)
            .seed(4)
            .build()
            .unwrap();
        let mut solver = LaplacianSolver::new(&adj, settings).unwrap();
        let x = solver.solve(&b).unwrap();

        assert_eq!(solver.info.status, SolverStatus::Solved, "{:?}", method);
        let mut lx = vec![0.0; 36];
        adj.laplacian_mul(&x, &mut lx, &degs);
        let mut r = lx;
        r.as_mut_slice().axpby(1.0, &b, -1.0);
        assert!(r.as_slice().norm() <= 1e-6 * b.as_slice().norm());
    }
}

#[test]
fn test_grid_vertex_sampler_with_capping() {
    let adj = grid(6, 6, |_| 1.0);
    let b = pseudo_rhs(36);

    let settings = SolverSettingsBuilder::<f64>::default()
        .factor_method(FactorMethod::VertexSample)
        .cap_multiplicities(true)
        .sketch_dim(8)
        .tol(1e-6)
        .max_iter(200)
        .seed(6)
        .build()
        .unwrap();
    let mut solver = LaplacianSolver::new(&adj, settings).unwrap();
    let x = solver.solve(&b).unwrap();
    assert_eq!(solver.info.status, SolverStatus::Solved);
    assert_eq!(x.len(), 36);
}
