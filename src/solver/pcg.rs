use crate::algebra::{CscMatrix, FloatT, VectorMath};
use crate::solver::info::SolverStatus;
use std::time::Instant;

/// Preconditioned conjugate gradients on the graph Laplacian.
///
/// `precond` applies the (zero-mean preserving) preconditioner in place.
/// Returns best-effort: on hitting the iteration or wall-clock budget the
/// best iterate seen so far is left in `x` along with the corresponding
/// status, never an error.
#[allow(clippy::too_many_arguments)]
pub fn pcg<T, P>(
    a: &CscMatrix<T>,
    degs: &[T],
    b: &[T],
    x: &mut [T],
    mut precond: P,
    tol: T,
    max_iter: usize,
    time_limit: f64,
    verbose: bool,
) -> (SolverStatus, usize, T)
where
    T: FloatT,
    P: FnMut(&mut [T]),
{
    let n = a.n;
    assert_eq!(b.len(), n);
    assert_eq!(x.len(), n);

    x.set(T::zero());
    let normb = b.norm();
    if normb == T::zero() {
        return (SolverStatus::Solved, 0, T::zero());
    }

    let mut r = b.to_vec();
    let mut z = b.to_vec();
    precond(&mut z);
    let mut p = z.clone();
    let mut ap = vec![T::zero(); n];
    let mut rz = r.as_slice().dot(&z);

    let mut best = x.to_vec();
    let mut best_res = T::infinity();
    let mut status = SolverStatus::MaxIterations;
    let mut iters = 0;

    if verbose {
        println!("iter     relres");
    }

    let start = Instant::now();
    for iter in 1..=max_iter {
        iters = iter;

        a.laplacian_mul(&p, &mut ap, degs);
        let pap = p.as_slice().dot(&ap);
        if pap <= T::zero() {
            //numerical breakdown; fall back to the best iterate
            break;
        }
        let alpha = rz / pap;
        x.axpby(alpha, &p, T::one());
        r.as_mut_slice().axpby(-alpha, &ap, T::one());

        let res = r.norm() / normb;
        if verbose {
            println!("{:4}    {:9.3e}", iter, res);
        }
        if res < best_res {
            best_res = res;
            best.copy_from_slice(x);
        }
        if res < tol {
            status = SolverStatus::Solved;
            break;
        }
        if start.elapsed().as_secs_f64() > time_limit {
            status = SolverStatus::MaxTime;
            break;
        }

        z.copy_from_slice(&r);
        precond(&mut z);
        let rz_new = r.as_slice().dot(&z);
        let beta = rz_new / rz;
        rz = rz_new;
        p.as_mut_slice().axpby(T::one(), &z, beta);
    }

    //hand back the best iterate seen, centered
    x.copy_from(&best);
    let mu = x.mean();
    x.translate(-mu);
    (status, iters, best_res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CooMatrix;

    fn center(z: &mut [f64]) {
        let mu = z.mean();
        z.translate(-mu);
    }

    #[test]
    fn test_identity_preconditioner_path() {
        let a = CooMatrix::symmetric(4, &[0, 1, 2], &[1, 2, 3], &[1.0; 3]).to_csc();
        let degs = a.degrees();
        let b = vec![1.0, 0.0, 0.0, -1.0];
        let mut x = vec![0.0; 4];

        let (status, iters, res) = pcg(
            &a,
            &degs,
            &b,
            &mut x,
            center,
            1e-10,
            100,
            f64::INFINITY,
            false,
        );
        assert_eq!(status, SolverStatus::Solved);
        assert!(iters <= 4);
        assert!(res < 1e-10);

        let expect = [1.5, 0.5, -0.5, -1.5];
        for k in 0..4 {
            assert!((x[k] - expect[k]).abs() < 1e-8);
        }
    }

    #[test]
    fn test_iteration_budget_returns_best() {
        //ring of 40: too tough for 2 unpreconditioned iterations
        let n = 40;
        let is: Vec<usize> = (0..n).collect();
        let js: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
        let a = CooMatrix::symmetric(n, &is, &js, &vec![1.0; n]).to_csc();
        let degs = a.degrees();
        let mut b = vec![0.0; n];
        b[0] = 1.0;
        b[n / 2] = -1.0;
        let mut x = vec![0.0; n];

        let (status, iters, _) = pcg(
            &a,
            &degs,
            &b,
            &mut x,
            center,
            1e-12,
            2,
            f64::INFINITY,
            false,
        );
        assert_eq!(status, SolverStatus::MaxIterations);
        assert_eq!(iters, 2);
        //partial progress still beats the zero vector
        let mut lx = vec![0.0; n];
        a.laplacian_mul(&x, &mut lx, &degs);
        let mut r = lx.clone();
        r.as_mut_slice().axpby(1.0, &b, -1.0);
        assert!(r.as_slice().norm() < b.as_slice().norm());
    }

    #[test]
    fn test_zero_rhs() {
        let a = CooMatrix::symmetric(3, &[0, 1], &[1, 2], &[1.0, 1.0]).to_csc();
        let degs = a.degrees();
        let b = vec![0.0; 3];
        let mut x = vec![1.0; 3];
        let (status, iters, _) = pcg(
            &a,
            &degs,
            &b,
            &mut x,
            center,
            1e-8,
            10,
            f64::INFINITY,
            false,
        );
        assert_eq!(status, SolverStatus::Solved);
        assert_eq!(iters, 0);
        assert!(x.iter().all(|&v| v == 0.0));
    }
}
