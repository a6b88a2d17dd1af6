use crate::algebra::{AsFloatT, CscMatrix, FloatT, VectorMath};
use rand::rngs::StdRng;
use rand::Rng;

/// Johnson–Lindenstrauss sketch of effective resistances.
///
/// Projects the columns of `W^{1/2} B L^+` onto `k` random ±1
/// directions, so that `||xhat[u] - xhat[v]||^2` estimates the effective
/// resistance between `u` and `v`.  The estimate only has to be crude:
/// it caps multi-edge multiplicities during elimination, so each column
/// is produced by a short unpreconditioned CG solve.
#[derive(Debug)]
pub struct ResistanceSketch<T> {
    n: usize,
    k: usize,
    //row-major n x k
    xhat: Vec<T>,
}

impl<T> ResistanceSketch<T>
where
    T: FloatT,
{
    pub fn new(a: &CscMatrix<T>, degs: &[T], k: usize, rng: &mut StdRng) -> Self {
        assert!(k > 0);
        let n = a.n;
        let (ei, ej, ev) = a.triu_triplets();
        let mut xhat = vec![T::zero(); n * k];

        let rsqrt_k = {
            let kf: T = k.as_T();
            kf.sqrt().recip()
        };

        let mut y = vec![T::zero(); n];
        let mut x = vec![T::zero(); n];
        for t in 0..k {
            //y = B^T W^{1/2} r for a random sign vector r over edges
            y.as_mut_slice().set(T::zero());
            for e in 0..ei.len() {
                let s = if rng.gen::<bool>() {
                    ev[e].sqrt() * rsqrt_k
                } else {
                    -ev[e].sqrt() * rsqrt_k
                };
                y[ei[e]] += s;
                y[ej[e]] -= s;
            }
            let mu = y.as_slice().mean();
            y.as_mut_slice().translate(-mu);

            //crude pseudoinverse application
            cg_rough(a, degs, &y, &mut x);
            for (v, &xv) in x.iter().enumerate() {
                xhat[v * k + t] = xv;
            }
        }

        Self { n, k, xhat }
    }

    /// squared sketch distance between two vertices
    pub fn distance2(&self, u: usize, v: usize) -> T {
        let ru = &self.xhat[u * self.k..(u + 1) * self.k];
        let rv = &self.xhat[v * self.k..(v + 1) * self.k];
        let d = ru.dist(rv);
        d * d
    }

    /// Reindex the rows so that new row `pos[v]` holds old row `v`;
    /// used when elimination works in permuted vertex positions.
    pub fn permuted(&self, pos: &[usize]) -> Self {
        assert_eq!(pos.len(), self.n);
        let mut xhat = vec![T::zero(); self.n * self.k];
        for v in 0..self.n {
            let dst = pos[v] * self.k;
            let src = v * self.k;
            xhat[dst..dst + self.k].copy_from_slice(&self.xhat[src..src + self.k]);
        }
        Self {
            n: self.n,
            k: self.k,
            xhat,
        }
    }
}

/// Short fixed-budget CG on the Laplacian; accuracy is secondary to cost
/// here.
fn cg_rough<T: FloatT>(a: &CscMatrix<T>, degs: &[T], b: &[T], x: &mut [T]) {
    let n = a.n;
    const MAXIT: usize = 50;
    let tol: T = (1e-2).as_T();

    x.set(T::zero());
    let mut r = b.to_vec();
    let mut p = r.clone();
    let mut ap = vec![T::zero(); n];
    let mut rr = r.as_slice().dot(&r);
    let normb = b.norm();
    if normb == T::zero() {
        return;
    }

    for _ in 0..MAXIT {
        a.laplacian_mul(&p, &mut ap, degs);
        let pap = p.as_slice().dot(&ap);
        if pap <= T::zero() {
            break;
        }
        let alpha = rr / pap;
        x.axpby(alpha, &p, T::one());
        r.as_mut_slice().axpby(-alpha, &ap, T::one());
        let rr_new = r.as_slice().dot(&r);
        if rr_new.sqrt() < tol * normb {
            break;
        }
        let beta = rr_new / rr;
        rr = rr_new;
        p.as_mut_slice().axpby(T::one(), &r, beta);
    }
    let mu = x.mean();
    x.translate(-mu);
}
