use crate::algebra::{AsFloatT, CscMatrix, FloatT, VectorMath};
use crate::solver::alias::AliasSampler;
use crate::solver::lls::{LinkedListStorage, PurgeScratch};
use crate::solver::order::RootedTree;
use crate::solver::sketch::ResistanceSketch;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const NO_SLOT: usize = usize::MAX;

/// Approximate `L D L^T` factorization from the vertex-elimination
/// sampler.
///
/// Everything is stored in permuted (elimination-position) space: the
/// unit-lower factor column `k` holds the scaled neighbor weights of the
/// vertex eliminated at step `k`, with the unit diagonal implied.
#[derive(Debug)]
pub struct ApproxLdl<T> {
    pub lower: CscMatrix<T>,
    pub d: Vec<T>,
    /// `perm[k]` is the original vertex eliminated at step `k`
    pub perm: Vec<usize>,
}

/// Run the vertex-elimination sampler along a fixed ordering.
///
/// Each elimination drains the vertex's pooled adjacency list, emits its
/// scaled column, and replaces the clique of fill-in with either the
/// exact pair set (degree <= 3) or the full tree pairs plus a weighted
/// random sample of the rest.  `sketch` optionally caps multi-edge
/// multiplicities, shrinking the sample count.
pub fn factor_vertex<T: FloatT>(
    a: &CscMatrix<T>,
    tree: &RootedTree,
    perm: Vec<usize>,
    pool_size: usize,
    sketch: Option<(&ResistanceSketch<T>, T)>,
    rng: &mut StdRng,
) -> ApproxLdl<T> {
    let n = a.n;
    let mut pos = vec![0usize; n];
    for (k, &v) in perm.iter().enumerate() {
        pos[v] = k;
    }
    //tree parent relation carried into position space
    let mut par_pos = vec![0usize; n];
    for v in 0..n {
        par_pos[pos[v]] = pos[tree.parent[v]];
    }

    //seed each edge onto the endpoint eliminated first
    let mut lls = LinkedListStorage::new(n, pool_size);
    let (ei, ej, ev) = a.triu_triplets();
    for k in 0..ei.len() {
        let (pu, pv) = (pos[ei[k]], pos[ej[k]]);
        let (lo, hi) = if pu < pv { (pu, pv) } else { (pv, pu) };
        lls.add(lo, ev[k], 1, hi);
    }

    let mut scratch = PurgeScratch::new(n);
    let mut slot = vec![NO_SLOT; n];
    let mut pbuf: Vec<usize> = Vec::new();

    let mut colptr = vec![0usize];
    let mut rowval: Vec<usize> = Vec::new();
    let mut nzval: Vec<T> = Vec::new();
    let mut d = vec![T::zero(); n];

    for ipos in 0..n.saturating_sub(1) {
        let (wsum, msum, ndist) = lls.purge(ipos, &mut scratch, sketch);
        if ndist == 0 {
            colptr.push(rowval.len());
            continue;
        }
        d[ipos] = wsum;

        //column of the unit-lower factor
        for k in 0..ndist {
            rowval.push(scratch.inds[k]);
            nzval.push(-scratch.weights[k] / wsum);
        }
        colptr.push(rowval.len());

        if ndist <= 3 {
            //small cliques are replaced exactly
            for x in 0..ndist {
                for y in x + 1..ndist {
                    let (ix, iy) = (scratch.inds[x], scratch.inds[y]);
                    let w = scratch.weights[x] * scratch.weights[y] / wsum;
                    lls.add(ix.min(iy), w, 1, ix.max(iy));
                }
            }
        } else {
            for (k, &u) in scratch.inds.iter().enumerate() {
                slot[u] = k;
            }

            //tree edges among the current neighbors, emitted in full;
            //each is reached once through its child endpoint
            for x in 0..ndist {
                let ix = scratch.inds[x];
                let p = par_pos[ix];
                if p != ix && slot[p] != NO_SLOT {
                    let w = scratch.weights[x] * scratch.weights[slot[p]] / wsum;
                    lls.add(ix.min(p), w, 1, ix.max(p));
                }
            }

            //sampled remainder: one endpoint weighted, one from a
            //uniform random permutation, scaled to stay unbiased
            let sampler = AliasSampler::new(&scratch.weights);
            let nsamp = msum.max(ndist);
            let scale = {
                let degf: T = ndist.as_T();
                let nsampf: T = nsamp.as_T();
                degf / nsampf
            };
            pbuf.clear();
            pbuf.extend(0..ndist);
            for t in 0..nsamp {
                let r = t % ndist;
                if r == 0 {
                    pbuf.shuffle(rng);
                }
                let xa = sampler.draw(rng);
                let xb = pbuf[r];
                if xa == xb {
                    continue;
                }
                let (ia, ib) = (scratch.inds[xa], scratch.inds[xb]);
                if par_pos[ia] == ib || par_pos[ib] == ia {
                    continue; //tree pair already emitted in full
                }
                let (wa, wb) = (scratch.weights[xa], scratch.weights[xb]);
                let w = scale * wa * wb / (wa + wb);
                lls.add(ia.min(ib), w, 1, ia.max(ib));
            }

            for &u in scratch.inds.iter() {
                slot[u] = NO_SLOT;
            }
        }
    }
    //final vertex: unit diagonal, no eliminated weight
    colptr.push(rowval.len());

    ApproxLdl {
        lower: CscMatrix::new(n, n, colptr, rowval, nzval),
        d,
        perm,
    }
}

impl<T> ApproxLdl<T>
where
    T: FloatT,
{
    /// Apply the preconditioner in place: permute, forward and backward
    /// unit-triangular sweeps around the diagonal scaling, unpermute,
    /// and remove the mean.  `work` is caller-owned scratch of length n.
    pub fn apply(&self, b: &mut [T], work: &mut [T]) {
        let n = self.d.len();
        assert_eq!(b.len(), n);
        assert_eq!(work.len(), n);
        let lp = &self.lower.colptr;
        let li = &self.lower.rowval;
        let lx = &self.lower.nzval;

        for (k, &v) in self.perm.iter().enumerate() {
            work[k] = b[v];
        }

        //solve (I + L) y = b
        for col in 0..n {
            let xi = work[col];
            for p in lp[col]..lp[col + 1] {
                work[li[p]] -= lx[p] * xi;
            }
        }

        for (y, &dv) in work.iter_mut().zip(self.d.iter()) {
            if dv != T::zero() {
                *y /= dv;
            }
        }

        //solve (I + L)^T x = y
        for col in (0..n).rev() {
            let mut s = T::zero();
            for p in lp[col]..lp[col + 1] {
                s += lx[p] * work[li[p]];
            }
            work[col] -= s;
        }

        for (k, &v) in self.perm.iter().enumerate() {
            b[v] = work[k];
        }
        let mu = b.mean();
        b.translate(-mu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CooMatrix;
    use crate::solver::akpw::akpw;
    use crate::solver::order::{elimination_order, OrderPolicy};
    use rand::SeedableRng;

    fn path(n: usize) -> CscMatrix<f64> {
        let is: Vec<usize> = (0..n - 1).collect();
        let js: Vec<usize> = (1..n).collect();
        let vs = vec![1.0; n - 1];
        CooMatrix::symmetric(n, &is, &js, &vs).to_csc()
    }

    fn factor(a: &CscMatrix<f64>, seed: u64) -> ApproxLdl<f64> {
        let tree = RootedTree::from_tree(&akpw(a).unwrap());
        let perm = elimination_order(OrderPolicy::Min, &tree, a);
        let mut rng = StdRng::seed_from_u64(seed);
        factor_vertex(a, &tree, perm, 16 * a.nnz() + 16, None, &mut rng)
    }

    #[test]
    fn test_exact_on_path() {
        //all eliminations have degree <= 3, so the factorization is the
        //exact Cholesky of the path Laplacian
        let a = path(6);
        let degs = a.degrees();
        let ldl = factor(&a, 17);

        let mut b = vec![0.0; 6];
        b[0] = 1.0;
        b[5] = -1.0;
        let mut x = b.clone();
        let mut work = vec![0.0; 6];
        ldl.apply(&mut x, &mut work);

        let mut lx = vec![0.0; 6];
        a.laplacian_mul(&x, &mut lx, &degs);
        assert!(lx.as_slice().norm_inf_diff(&b) < 1e-12);
        assert!(x.as_slice().mean().abs() < 1e-13);
    }

    #[test]
    fn test_diagonal_totals_eliminated_weight() {
        let a = path(5);
        let ldl = factor(&a, 2);
        //the root is eliminated last with zero weight
        assert_eq!(ldl.d[4], 0.0);
        assert!(ldl.d[..4].iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_solver_quality_on_k6() {
        //degree-5 eliminations exercise the sampling branch; the result
        //must still be a useful preconditioner, i.e. applying it to a
        //Laplacian image roughly inverts it
        let nv = 6;
        let mut is = Vec::new();
        let mut js = Vec::new();
        let mut vs = Vec::new();
        for u in 0..nv {
            for v in u + 1..nv {
                is.push(u);
                js.push(v);
                vs.push(1.0);
            }
        }
        let a = CooMatrix::symmetric(nv, &is, &js, &vs).to_csc();
        let degs = a.degrees();
        let ldl = factor(&a, 23);

        let xstar: Vec<f64> = vec![2.5, -0.5, -0.5, -0.5, -0.5, -0.5];
        let mut b = vec![0.0; nv];
        a.laplacian_mul(&xstar, &mut b, &degs);
        let mut x = b.clone();
        let mut work = vec![0.0; nv];
        ldl.apply(&mut x, &mut work);

        //not exact (sampled), but closer to x* than the zero guess
        let err = x.as_slice().dist(&xstar);
        assert!(err < xstar.as_slice().norm(), "err = {}", err);
    }
}
