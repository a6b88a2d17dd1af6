use crate::algebra::{CscMatrix, FloatT, GraphError};
use std::collections::VecDeque;

/// Graph-semantic operations on a symmetric weighted adjacency.
impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// Validate the matrix as a weighted undirected adjacency: square,
    /// structurally symmetric with matching weights, no self loops, all
    /// weights positive and finite, sorted columns.
    pub fn check_adjacency(&self) -> Result<(), GraphError> {
        self.check_format()?;
        if !self.is_square() {
            return Err(GraphError::NotSquare);
        }

        for col in 0..self.n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[p];
                let v = self.nzval[p];
                if row == col {
                    return Err(GraphError::SelfLoop(col));
                }
                if !(v.is_finite() && v > T::zero()) {
                    return Err(GraphError::BadWeight(p));
                }
                //the mirror entry must exist and carry the same weight
                match self.get_entry((col, row)) {
                    Some(w) if w == v => (),
                    _ => return Err(GraphError::AsymmetricPattern),
                }
            }
        }
        Ok(())
    }

    /// Weighted degree of each vertex.
    pub fn degrees(&self) -> Vec<T> {
        let mut degs = vec![T::zero(); self.n];
        for col in 0..self.n {
            let mut acc = T::zero();
            for p in self.colptr[col]..self.colptr[col + 1] {
                acc += self.nzval[p];
            }
            degs[col] = acc;
        }
        degs
    }

    /// y = (D - A) x, the Laplacian applied to `x`, without materializing
    /// the Laplacian.  `degs` must be the output of [`degrees`](CscMatrix::degrees).
    pub fn laplacian_mul(&self, x: &[T], y: &mut [T], degs: &[T]) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);

        for col in 0..self.n {
            let mut acc = T::zero();
            for p in self.colptr[col]..self.colptr[col + 1] {
                acc += self.nzval[p] * x[self.rowval[p]];
            }
            y[col] = degs[col] * x[col] - acc;
        }
    }

    /// Label the connected components of the adjacency by breadth-first
    /// search.  Returns per-vertex component ids and the component count.
    pub fn connected_components(&self) -> (Vec<usize>, usize) {
        const UNSEEN: usize = usize::MAX;
        let mut comp = vec![UNSEEN; self.n];
        let mut ncomp = 0;
        let mut queue = VecDeque::new();

        for seed in 0..self.n {
            if comp[seed] != UNSEEN {
                continue;
            }
            comp[seed] = ncomp;
            queue.push_back(seed);
            while let Some(u) = queue.pop_front() {
                for p in self.colptr[u]..self.colptr[u + 1] {
                    let v = self.rowval[p];
                    if comp[v] == UNSEEN {
                        comp[v] = ncomp;
                        queue.push_back(v);
                    }
                }
            }
            ncomp += 1;
        }
        (comp, ncomp)
    }

    /// Extract the induced subgraph on the vertex set `keep`, which must
    /// be sorted ascending.  Vertices are relabeled `0..keep.len()` in
    /// the order given, so columns of the result stay sorted.
    pub fn subgraph(&self, keep: &[usize]) -> CscMatrix<T> {
        const OUTSIDE: usize = usize::MAX;
        debug_assert!(keep.windows(2).all(|w| w[0] < w[1]));

        let mut local = vec![OUTSIDE; self.n];
        for (loc, &glob) in keep.iter().enumerate() {
            local[glob] = loc;
        }

        //count surviving entries per kept column
        let nsub = keep.len();
        let mut colptr = vec![0; nsub + 1];
        for (loc, &glob) in keep.iter().enumerate() {
            let cnt = self.rowval[self.colptr[glob]..self.colptr[glob + 1]]
                .iter()
                .filter(|&&r| local[r] != OUTSIDE)
                .count();
            colptr[loc + 1] = colptr[loc] + cnt;
        }

        let nnz = colptr[nsub];
        let mut rowval = vec![0; nnz];
        let mut nzval = vec![T::zero(); nnz];
        let mut ptr = 0;
        for &glob in keep.iter() {
            for p in self.colptr[glob]..self.colptr[glob + 1] {
                let r = local[self.rowval[p]];
                if r != OUTSIDE {
                    rowval[ptr] = r;
                    nzval[ptr] = self.nzval[p];
                    ptr += 1;
                }
            }
        }

        CscMatrix::new(nsub, nsub, colptr, rowval, nzval)
    }

    /// Upper-triangle edge list `(i, j, w)` with `i < j`, one entry per
    /// undirected edge.
    pub fn triu_triplets(&self) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        let mut is = Vec::with_capacity(self.nnz() / 2);
        let mut js = Vec::with_capacity(self.nnz() / 2);
        let mut vs = Vec::with_capacity(self.nnz() / 2);
        for col in 0..self.n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[p];
                if row < col {
                    is.push(row);
                    js.push(col);
                    vs.push(self.nzval[p]);
                }
            }
        }
        (is, js, vs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CooMatrix;

    fn path3() -> CscMatrix<f64> {
        CooMatrix::symmetric(3, &[0, 1], &[1, 2], &[2., 5.]).to_csc()
    }

    #[test]
    fn test_check_adjacency() {
        assert!(path3().check_adjacency().is_ok());

        //self loop
        let a = CscMatrix::new(2, 2, vec![0, 1, 1], vec![0], vec![1.0]);
        assert!(matches!(
            a.check_adjacency(),
            Err(GraphError::SelfLoop(0))
        ));

        //asymmetric weights
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![1, 0], vec![1.0, 2.0]);
        assert!(matches!(
            a.check_adjacency(),
            Err(GraphError::AsymmetricPattern)
        ));

        //nonpositive weight
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![1, 0], vec![-1.0, -1.0]);
        assert!(matches!(a.check_adjacency(), Err(GraphError::BadWeight(_))));
    }

    #[test]
    fn test_laplacian_nullspace() {
        let a = path3();
        let degs = a.degrees();
        let ones = vec![1.0; 3];
        let mut y = vec![0.0; 3];
        a.laplacian_mul(&ones, &mut y, &degs);
        assert!(y.iter().all(|v| v.abs() < 1e-15));
    }

    #[test]
    fn test_components_and_subgraph() {
        //two disjoint edges: {0,1}, {2,3}
        let a = CooMatrix::symmetric(4, &[0, 2], &[1, 3], &[1., 4.]).to_csc();
        let (comp, ncomp) = a.connected_components();
        assert_eq!(ncomp, 2);
        assert_eq!(comp[0], comp[1]);
        assert_eq!(comp[2], comp[3]);
        assert_ne!(comp[0], comp[2]);

        let sub = a.subgraph(&[2, 3]);
        assert_eq!(sub.n, 2);
        assert_eq!(sub.nnz(), 2);
        assert_eq!(sub.get_entry((1, 0)).unwrap(), 4.);
    }
}
