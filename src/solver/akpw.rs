use crate::algebra::{AsFloatT, CooMatrix, CscMatrix, FloatT, GraphError};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const UNASSIGNED: usize = usize::MAX;

/// Build a low-stretch spanning tree of a connected weighted graph by
/// AKPW-style clustering.
///
/// The graph is repeatedly partitioned by boundary/volume-controlled
/// cluster growth over its heaviest edges, clusters are contracted, and
/// the quotient recursed on; the union of the growth edges across levels
/// is the tree.  Weights of the returned tree match the original edges.
///
/// # Errors
/// Returns [`GraphError::Disconnected`] when the input does not connect
/// all vertices; per-component callers should decompose first.
pub fn akpw<T: FloatT>(a: &CscMatrix<T>) -> Result<CscMatrix<T>, GraphError> {
    a.check_adjacency()?;
    if a.n > 1 {
        let (_, ncomp) = a.connected_components();
        if ncomp != 1 {
            return Err(GraphError::Disconnected);
        }
    }
    Ok(akpw_unchecked(a))
}

/// Tree builder for inputs already validated as connected adjacencies.
pub(crate) fn akpw_unchecked<T: FloatT>(a: &CscMatrix<T>) -> CscMatrix<T> {
    let n = a.n;
    let (ei, ej, ev) = a.triu_triplets();
    let chosen = cluster_tree_edges(n, &ei, &ej, &ev);
    debug_assert_eq!(chosen.len(), n.saturating_sub(1));

    let ti: Vec<usize> = chosen.iter().map(|&e| ei[e]).collect();
    let tj: Vec<usize> = chosen.iter().map(|&e| ej[e]).collect();
    let tv: Vec<T> = chosen.iter().map(|&e| ev[e]).collect();
    CooMatrix::symmetric(n, &ti, &tj, &tv).to_csc()
}

/// boundary/volume growth threshold, `1 / (2 ln n)`
fn xfactor<T: FloatT>(n: usize) -> T {
    let nf: T = n.max(2).as_T();
    let two: T = (2.0).as_T();
    T::one() / (two * nf.ln())
}

/// One recursion level: pick tree edges (indices into the given edge
/// arrays) by heavy-band clustering, then recurse on the contraction.
fn cluster_tree_edges<T: FloatT>(n: usize, ei: &[usize], ej: &[usize], ev: &[T]) -> Vec<usize> {
    let m = ei.len();
    if m == 0 || n <= 1 {
        return Vec::new();
    }

    //edge ids by decreasing weight
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_unstable_by(|&a, &b| ev[b].partial_cmp(&ev[a]).unwrap_or(Ordering::Equal));

    let xfac = xfactor::<T>(n);
    let thresh = ev[order[0]] * xfac;
    let band: Vec<usize> = order
        .iter()
        .copied()
        .take_while(|&e| ev[e] > thresh)
        .collect();

    //incidence restricted to the heavy band
    let mut adj: Vec<Vec<(usize, usize)>> = vec![Vec::new(); n];
    let mut wdeg: Vec<T> = vec![T::zero(); n];
    for &e in band.iter() {
        adj[ei[e]].push((ej[e], e));
        adj[ej[e]].push((ei[e], e));
        wdeg[ei[e]] += ev[e];
        wdeg[ej[e]] += ev[e];
    }

    let mut comp = vec![UNASSIGNED; n];
    let mut ncl = 0;
    let mut tree: Vec<usize> = Vec::new();
    let mut heap: BinaryHeap<GrowCand<T>> = BinaryHeap::new();

    //seeds in heavy-weight order
    for &e in band.iter() {
        for s in [ei[e], ej[e]] {
            if comp[s] == UNASSIGNED {
                grow_cluster(
                    s, ncl, xfac, ev, &adj, &wdeg, &mut comp, &mut tree, &mut heap,
                );
                ncl += 1;
            }
        }
    }
    //vertices untouched by the band become their own clusters
    for c in comp.iter_mut() {
        if *c == UNASSIGNED {
            *c = ncl;
            ncl += 1;
        }
    }

    if ncl <= 1 {
        return tree;
    }

    //contract: between-cluster edges, heaviest parallel edge wins, each
    //quotient edge remembering the original index it came from
    let mut quot: Vec<(usize, usize, usize)> = Vec::new();
    for e in 0..m {
        let (ci, cj) = (comp[ei[e]], comp[ej[e]]);
        if ci != cj {
            quot.push((ci.min(cj), ci.max(cj), e));
        }
    }
    quot.sort_unstable_by_key(|&(a, b, _)| (a, b));

    let mut qi: Vec<usize> = Vec::new();
    let mut qj: Vec<usize> = Vec::new();
    let mut qv: Vec<T> = Vec::new();
    let mut qid: Vec<usize> = Vec::new();
    let mut it = 0;
    while it < quot.len() {
        let (a, b, mut best) = quot[it];
        let mut jt = it + 1;
        while jt < quot.len() && quot[jt].0 == a && quot[jt].1 == b {
            if ev[quot[jt].2] > ev[best] {
                best = quot[jt].2;
            }
            jt += 1;
        }
        qi.push(a);
        qj.push(b);
        qv.push(ev[best]);
        qid.push(best);
        it = jt;
    }

    let sub = cluster_tree_edges(ncl, &qi, &qj, &qv);
    tree.extend(sub.into_iter().map(|t| qid[t]));
    tree
}

/// Grow one cluster from `seed` by Dijkstra in reciprocal-weight
/// distance, admitting the nearest unassigned vertex while the external
/// boundary weight exceeds `xfac` times the cluster volume.  Every
/// admission records the edge it arrived through.
#[allow(clippy::too_many_arguments)]
fn grow_cluster<T: FloatT>(
    seed: usize,
    cid: usize,
    xfac: T,
    ev: &[T],
    adj: &[Vec<(usize, usize)>],
    wdeg: &[T],
    comp: &mut [usize],
    tree: &mut Vec<usize>,
    heap: &mut BinaryHeap<GrowCand<T>>,
) {
    comp[seed] = cid;
    heap.clear();

    let mut boundary = T::zero();
    let mut volume = wdeg[seed];
    for &(z, e) in adj[seed].iter() {
        if comp[z] == UNASSIGNED {
            boundary += ev[e];
            heap.push(GrowCand {
                dist: ev[e].recip(),
                vertex: z,
                edge: e,
            });
        }
    }

    while boundary > xfac * volume {
        //nearest unassigned candidate; stale heap entries are skipped
        let cand = loop {
            match heap.pop() {
                None => return,
                Some(c) if comp[c.vertex] == UNASSIGNED => break c,
                Some(_) => (),
            }
        };

        let u = cand.vertex;
        comp[u] = cid;
        tree.push(cand.edge);
        volume += wdeg[u];

        for &(z, e) in adj[u].iter() {
            if comp[z] == UNASSIGNED {
                boundary += ev[e];
                heap.push(GrowCand {
                    dist: cand.dist + ev[e].recip(),
                    vertex: z,
                    edge: e,
                });
            } else if comp[z] == cid {
                //edge just became internal; it was counted when its
                //other endpoint joined
                boundary -= ev[e];
            }
        }
    }
}

/// Cluster-growth heap entry, ordered nearest-first.
struct GrowCand<T> {
    dist: T,
    vertex: usize,
    edge: usize,
}

impl<T: FloatT> PartialEq for GrowCand<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}
impl<T: FloatT> Eq for GrowCand<T> {}
impl<T: FloatT> PartialOrd for GrowCand<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: FloatT> Ord for GrowCand<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        //reversed so BinaryHeap pops the smallest distance
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
    }
}

/// Average stretch of the graph's edges with respect to a spanning tree:
/// `w(e)` times the resistive length of the tree path between the
/// endpoints of `e`, averaged over all edges.
pub fn average_stretch<T: FloatT>(a: &CscMatrix<T>, tree: &CscMatrix<T>) -> T {
    let n = a.n;
    assert_eq!(tree.n, n);
    let (ei, ej, ev) = a.triu_triplets();
    if ei.is_empty() {
        return T::zero();
    }

    //root the tree at 0 with resistive depth to the root
    let mut parent = vec![UNASSIGNED; n];
    let mut depth = vec![0usize; n];
    let mut resist = vec![T::zero(); n];
    parent[0] = 0;
    let mut queue = std::collections::VecDeque::from([0usize]);
    while let Some(u) = queue.pop_front() {
        for p in tree.colptr[u]..tree.colptr[u + 1] {
            let z = tree.rowval[p];
            if parent[z] == UNASSIGNED && z != 0 {
                parent[z] = u;
                depth[z] = depth[u] + 1;
                resist[z] = resist[u] + tree.nzval[p].recip();
                queue.push_back(z);
            }
        }
    }
    debug_assert!(parent.iter().all(|&p| p != UNASSIGNED), "tree must span");

    let two: T = (2.0).as_T();
    let mut total = T::zero();
    for k in 0..ei.len() {
        let (mut u, mut v) = (ei[k], ej[k]);
        let (ru, rv) = (resist[u], resist[v]);
        //walk to the common ancestor
        while depth[u] > depth[v] {
            u = parent[u];
        }
        while depth[v] > depth[u] {
            v = parent[v];
        }
        while u != v {
            u = parent[u];
            v = parent[v];
        }
        let pathlen = ru + rv - two * resist[u];
        total += ev[k] * pathlen;
    }
    let nedge: T = ei.len().as_T();
    total / nedge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CooMatrix;

    fn grid(rows: usize, cols: usize) -> CscMatrix<f64> {
        let mut is = Vec::new();
        let mut js = Vec::new();
        let mut vs = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                let u = r * cols + c;
                if c + 1 < cols {
                    is.push(u);
                    js.push(u + 1);
                    vs.push(1.0);
                }
                if r + 1 < rows {
                    is.push(u);
                    js.push(u + cols);
                    vs.push(1.0);
                }
            }
        }
        CooMatrix::symmetric(rows * cols, &is, &js, &vs).to_csc()
    }

    #[test]
    fn test_tree_is_spanning() {
        let a = grid(5, 4);
        let t = akpw(&a).unwrap();
        assert_eq!(t.nnz(), 2 * (a.n - 1));
        let (_, ncomp) = t.connected_components();
        assert_eq!(ncomp, 1);

        //tree weights match original edges
        let (ti, tj, tv) = t.triu_triplets();
        for k in 0..ti.len() {
            assert_eq!(a.get_entry((ti[k], tj[k])).unwrap(), tv[k]);
        }
    }

    #[test]
    fn test_disconnected_rejected() {
        let a = CooMatrix::symmetric(4, &[0, 2], &[1, 3], &[1.0, 1.0]).to_csc();
        assert!(matches!(akpw(&a), Err(GraphError::Disconnected)));
    }

    #[test]
    fn test_grid3x3_stretch() {
        let a = grid(3, 3);
        let t = akpw(&a).unwrap();
        assert_eq!(t.nnz(), 2 * 8);
        let avg = average_stretch(&a, &t);
        assert!(avg <= 3.0, "average stretch {} too large", avg);
    }

    #[test]
    fn test_heavy_edges_favored() {
        //path 0-1-2 with a heavy shortcut 0-2: the tree should keep both
        //heavy edges when weights differ by orders of magnitude
        let a = CooMatrix::symmetric(
            3,
            &[0, 1, 0],
            &[1, 2, 2],
            &[100.0, 0.01, 100.0],
        )
        .to_csc();
        let t = akpw(&a).unwrap();
        assert_eq!(t.nnz(), 4);
        assert!(t.get_entry((1, 0)).is_some());
        assert!(t.get_entry((2, 0)).is_some());
    }
}
