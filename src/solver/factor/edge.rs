use crate::algebra::{AsFloatT, CscMatrix, FloatT};
use crate::solver::degree_pq::DegreePq;
use crate::solver::ldlinv::LdlInv;
use crate::solver::llgraph::LlGraph;
use rand::rngs::StdRng;
use rand::Rng;

/// Approximate factorization by edge elimination.
///
/// Vertices are eliminated in dynamic min-degree order.  Each column is
/// collected and compressed, then consumed as a run of 2-edge splits:
/// neighbor `k` keeps fraction `f = w/wdeg` of the column mass and the
/// remainder is rerouted through a weighted random partner drawn from
/// the cumulative-sum suffix, creating one sampled edge per split.  The
/// last neighbor absorbs the leftovers with `f = 1`.
pub fn factor_edge<T: FloatT>(a: &CscMatrix<T>, rng: &mut StdRng) -> LdlInv<T> {
    let n = a.n;
    let mut llg = LlGraph::from_adjacency(a);
    let mut pq = DegreePq::build(&llg.degs);

    let mut col = Vec::with_capacity(n.saturating_sub(1));
    let mut colptr = Vec::with_capacity(n);
    let mut rowval: Vec<usize> = Vec::new();
    let mut fval: Vec<T> = Vec::new();
    let mut d = vec![T::zero(); n];

    let mut colspace: Vec<usize> = Vec::new();
    let mut vals: Vec<T> = Vec::new();
    let mut csum: Vec<T> = Vec::new();

    colptr.push(0);
    let one = T::one();

    for _it in 0..n.saturating_sub(1) {
        let i = match pq.pop_min() {
            Some(i) => i,
            None => break,
        };
        col.push(i);

        let len = llg.get_col(i, &mut colspace);
        let len = llg.compress_col(&mut colspace, len, &mut pq);
        if len == 0 {
            colptr.push(rowval.len());
            continue;
        }

        vals.clear();
        csum.clear();
        let mut acc = T::zero();
        for &cell in colspace[..len].iter() {
            vals.push(llg.val(cell));
            acc += llg.val(cell);
            csum.push(acc);
        }

        let mut wdeg = acc;
        let mut colscale = one;

        for k in 0..len - 1 {
            let cell = colspace[k];
            let j = llg.row(cell);
            let rev = llg.reverse_of(cell);

            let w = vals[k] * colscale;
            let f = w / wdeg;

            //weighted draw from the suffix of the cumulative sums;
            //the partner is always strictly beyond k
            let u: T = rng.gen::<f64>().as_T();
            let r = csum[k] + u * (csum[len - 1] - csum[k]);
            let kp = k + 1 + csum[k + 1..len].partition_point(|&c| c <= r);
            let kp = kp.min(len - 1);
            let krow = llg.row(colspace[kp]);

            let new_val = f * (one - f) * wdeg;
            llg.reuse_edge(cell, rev, j, krow, new_val);
            pq.inc(krow);

            colscale *= one - f;
            wdeg *= (one - f) * (one - f);

            rowval.push(j);
            fval.push(f);
        }

        //last neighbor is the sink for the remaining mass
        let cell = colspace[len - 1];
        let j = llg.row(cell);
        let w = vals[len - 1] * colscale;
        llg.kill_edge(cell);
        pq.dec(j);

        rowval.push(j);
        fval.push(one);
        d[i] = w;

        colptr.push(rowval.len());
    }

    LdlInv {
        n,
        col,
        colptr,
        rowval,
        fval,
        d,
    }
}
