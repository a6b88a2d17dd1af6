use crate::algebra::{CscMatrix, FloatT};
use crate::solver::degree_pq::DegreePq;

const EMPTY: usize = usize::MAX;

/// Reverse-linked multigraph backing edge elimination.
///
/// Cells live in one arena, addressed by index so that both endpoints of
/// an edge can be relocated safely while elimination rewires lists (see
/// the `reverse` mirror links).  A cell with `val == 0` is dead and is
/// skipped by column collection; killing an edge zeroes both mirrors.
#[derive(Debug)]
pub struct LlGraph<T> {
    n: usize,
    /// live cell count per column at build time
    pub degs: Vec<usize>,
    cols: Vec<usize>,
    row: Vec<usize>,
    next: Vec<usize>,
    reverse: Vec<usize>,
    val: Vec<T>,
}

impl<T> LlGraph<T>
where
    T: FloatT,
{
    /// Build from a symmetric adjacency.  Cell `p` corresponds to CSC
    /// entry `p`; mirrors are paired by binary search in the partner
    /// column, which is sorted by the adjacency format invariant.
    pub fn from_adjacency(a: &CscMatrix<T>) -> Self {
        let n = a.n;
        let nnz = a.nnz();
        let mut cols = vec![EMPTY; n];
        let mut next = vec![EMPTY; nnz];
        let mut reverse = vec![EMPTY; nnz];
        let mut degs = vec![0; n];

        for j in 0..n {
            let (first, last) = (a.colptr[j], a.colptr[j + 1]);
            degs[j] = last - first;
            if first == last {
                continue;
            }
            cols[j] = first;
            for p in first..last {
                if p + 1 < last {
                    next[p] = p + 1;
                }
                let r = a.rowval[p];
                //mirror entry: row j within column r
                let rfirst = a.colptr[r];
                let rlast = a.colptr[r + 1];
                let off = a.rowval[rfirst..rlast]
                    .binary_search(&j)
                    .expect("adjacency pattern is not symmetric");
                reverse[p] = rfirst + off;
            }
        }

        Self {
            n,
            degs,
            cols,
            row: a.rowval.clone(),
            next,
            reverse,
            val: a.nzval.clone(),
        }
    }

    pub fn nvertices(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn row(&self, cell: usize) -> usize {
        self.row[cell]
    }

    #[inline]
    pub fn val(&self, cell: usize) -> T {
        self.val[cell]
    }

    #[inline]
    pub fn reverse_of(&self, cell: usize) -> usize {
        self.reverse[cell]
    }

    /// Collect the live cells of column `i` into `colspace`; returns the
    /// live count.
    pub fn get_col(&self, i: usize, colspace: &mut Vec<usize>) -> usize {
        colspace.clear();
        let mut cell = self.cols[i];
        while cell != EMPTY {
            if self.val[cell] > T::zero() {
                colspace.push(cell);
            }
            cell = self.next[cell];
        }
        colspace.len()
    }

    /// Merge duplicate rows within a collected column.  Values of equal
    /// rows are summed into the first cell of the run; every merged-away
    /// cell and its mirror are killed and the duplicate row's queue key
    /// is decremented (it lost a parallel edge).  Returns the compressed
    /// length; `colspace[0..len]` is left sorted by row.
    pub fn compress_col(&mut self, colspace: &mut [usize], len: usize, pq: &mut DegreePq) -> usize {
        let cells = &mut colspace[..len];
        cells.sort_unstable_by_key(|&c| self.row[c]);

        let mut ptr = 0;
        for ii in 0..len {
            let cell = cells[ii];
            if ptr > 0 && self.row[cells[ptr - 1]] == self.row[cell] {
                let keep = cells[ptr - 1];
                let add = self.val[cell];
                self.val[keep] += add;
                //kill the merged-away cell on both sides
                self.val[self.reverse[cell]] = T::zero();
                self.val[cell] = T::zero();
                pq.dec(self.row[cell]);
            } else {
                cells[ptr] = cell;
                ptr += 1;
            }
        }
        ptr
    }

    /// Replace the eliminated edge pair `(cell, rev)`, previously the
    /// two mirrors of edge `{i, j}`, with a new edge `{j, krow}` of
    /// weight `w`.  `rev` already sits on `j`'s list and is updated in
    /// place; `cell` is spliced onto `krow`'s list.
    pub fn reuse_edge(&mut self, cell: usize, rev: usize, j: usize, krow: usize, w: T) {
        self.row[rev] = krow;
        self.val[rev] = w;
        self.reverse[rev] = cell;

        self.row[cell] = j;
        self.val[cell] = w;
        self.reverse[cell] = rev;
        self.next[cell] = self.cols[krow];
        self.cols[krow] = cell;
    }

    /// Kill an edge outright (both mirrors).
    pub fn kill_edge(&mut self, cell: usize) {
        self.val[self.reverse[cell]] = T::zero();
        self.val[cell] = T::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CooMatrix;

    #[test]
    fn test_mirror_pairing() {
        let a = CooMatrix::symmetric(3, &[0, 1], &[1, 2], &[2.0, 3.0]).to_csc();
        let g = LlGraph::from_adjacency(&a);
        let mut colspace = Vec::new();

        let len = g.get_col(1, &mut colspace);
        assert_eq!(len, 2);
        for &cell in colspace.iter() {
            //the mirror of a mirror is the cell itself
            assert_eq!(g.reverse[g.reverse[cell]], cell);
            //mirror sits in the column named by this cell's row
            let r = g.row(cell);
            assert_eq!(g.row(g.reverse[cell]), 1);
            assert!(r == 0 || r == 2);
        }
    }

    #[test]
    fn test_compress_merges_duplicates() {
        let a = CooMatrix::symmetric(3, &[0, 1], &[1, 2], &[2.0, 3.0]).to_csc();
        let mut g = LlGraph::from_adjacency(&a);
        let mut pq = DegreePq::build(&g.degs);

        //fabricate a duplicate: revive an extra cell of column 1 pointing to 0
        let mut colspace = Vec::new();
        let len = g.get_col(1, &mut colspace);
        assert_eq!(len, 2);
        //duplicate the 1->0 edge by rewiring the 1->2 cell onto row 0
        let dup = *colspace
            .iter()
            .find(|&&c| g.row(c) == 2)
            .unwrap();
        g.row[dup] = 0;

        let len = g.get_col(1, &mut colspace);
        let newlen = g.compress_col(&mut colspace, len, &mut pq);
        assert_eq!(newlen, 1);
        assert_eq!(g.row(colspace[0]), 0);
        assert_eq!(g.val(colspace[0]), 5.0);
        assert_eq!(pq.key(0), 0); //lost its parallel edge
    }

    #[test]
    fn test_kill_edge_hides_from_collection() {
        let a = CooMatrix::symmetric(2, &[0], &[1], &[1.0]).to_csc();
        let mut g = LlGraph::from_adjacency(&a);
        let mut colspace = Vec::new();
        let len = g.get_col(0, &mut colspace);
        assert_eq!(len, 1);
        g.kill_edge(colspace[0]);
        assert_eq!(g.get_col(0, &mut colspace), 0);
        assert_eq!(g.get_col(1, &mut colspace), 0);
    }
}
