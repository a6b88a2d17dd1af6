use crate::algebra::{CscMatrix, FloatT};
use itertools::izip;

/// Rule for combining duplicate entries during [`CooMatrix::compress`].
///
/// Laplacian edge weights sum; cluster-quotient weights take the heaviest
/// parallel edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    Sum,
    Max,
}

/// Sparse matrix in triplet ("IJV") form.
///
/// Duplicate coordinates are allowed and are normalized away by
/// [`compress`](CooMatrix::compress) or on conversion to CSC.
#[derive(Debug, Clone)]
pub struct CooMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// row index of each entry
    pub rowval: Vec<usize>,
    /// column index of each entry
    pub colval: Vec<usize>,
    /// value of each entry
    pub nzval: Vec<T>,
}

impl<T> CooMatrix<T>
where
    T: FloatT,
{
    /// Triplet constructor.
    ///
    /// # Panics
    /// Panics if the index/value arrays have mismatched lengths or any
    /// index is out of bounds.
    pub fn new(m: usize, n: usize, rowval: Vec<usize>, colval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), colval.len());
        assert_eq!(rowval.len(), nzval.len());
        assert!(rowval.iter().all(|&r| r < m));
        assert!(colval.iter().all(|&c| c < n));
        CooMatrix {
            m,
            n,
            rowval,
            colval,
            nzval,
        }
    }

    /// Build a symmetric triplet form on `n` vertices from an undirected
    /// edge list: each `(i[k], j[k], v[k])` is stored in both orientations.
    pub fn symmetric(n: usize, i: &[usize], j: &[usize], v: &[T]) -> Self {
        assert_eq!(i.len(), j.len());
        assert_eq!(i.len(), v.len());

        let nedge = i.len();
        let mut rowval = Vec::with_capacity(2 * nedge);
        let mut colval = Vec::with_capacity(2 * nedge);
        let mut nzval = Vec::with_capacity(2 * nedge);
        for (&i, &j, &v) in izip!(i, j, v) {
            rowval.push(i);
            colval.push(j);
            nzval.push(v);
            rowval.push(j);
            colval.push(i);
            nzval.push(v);
        }
        CooMatrix::new(n, n, rowval, colval, nzval)
    }

    /// number of stored entries (before duplicate merging)
    pub fn nnz(&self) -> usize {
        self.nzval.len()
    }

    /// Normalize to a duplicate-free triplet form, sorted column-major
    /// with increasing rows, combining duplicates with `combine`.
    pub fn compress(&self, combine: Combine) -> CooMatrix<T> {
        let csc = self.to_csc_with(combine);
        let mut rowval = Vec::with_capacity(csc.nnz());
        let mut colval = Vec::with_capacity(csc.nnz());
        let mut nzval = Vec::with_capacity(csc.nnz());
        for col in 0..csc.n {
            for p in csc.colptr[col]..csc.colptr[col + 1] {
                rowval.push(csc.rowval[p]);
                colval.push(col);
                nzval.push(csc.nzval[p]);
            }
        }
        CooMatrix::new(self.m, self.n, rowval, colval, nzval)
    }

    /// Convert to CSC, summing duplicate entries.
    pub fn to_csc(&self) -> CscMatrix<T> {
        self.to_csc_with(Combine::Sum)
    }

    /// Convert to CSC with an explicit duplicate-combination rule.
    ///
    /// Two count-sort passes (bucket by row, then transpose-place by
    /// column) leave each column sorted by row without any comparison
    /// sort or hashing; duplicates end up adjacent and are merged in a
    /// final sweep.
    pub fn to_csc_with(&self, combine: Combine) -> CscMatrix<T> {
        let (m, n, nnz) = (self.m, self.n, self.nnz());

        //bucket by row: rptr cumulated counts, then placement
        let mut rptr = vec![0usize; m + 1];
        for &r in self.rowval.iter() {
            rptr[r + 1] += 1;
        }
        for k in 0..m {
            rptr[k + 1] += rptr[k];
        }
        let mut rcols = vec![0usize; nnz];
        let mut rvals = vec![T::zero(); nnz];
        {
            let mut cursor = rptr[0..m].to_vec();
            for (&r, &c, &v) in izip!(&self.rowval, &self.colval, &self.nzval) {
                let dest = cursor[r];
                rcols[dest] = c;
                rvals[dest] = v;
                cursor[r] += 1;
            }
        }

        //transpose-place by column; scanning rows in ascending order
        //makes rows ascend within each output column
        let mut colptr = vec![0usize; n + 1];
        for &c in rcols.iter() {
            colptr[c + 1] += 1;
        }
        for k in 0..n {
            colptr[k + 1] += colptr[k];
        }
        let mut rowval = vec![0usize; nnz];
        let mut nzval = vec![T::zero(); nnz];
        {
            let mut cursor = colptr[0..n].to_vec();
            for row in 0..m {
                for p in rptr[row]..rptr[row + 1] {
                    let c = rcols[p];
                    let dest = cursor[c];
                    rowval[dest] = row;
                    nzval[dest] = rvals[p];
                    cursor[c] += 1;
                }
            }
        }

        //merge adjacent duplicates in place, rebuilding colptr
        let mut ptr = 0;
        let mut newcolptr = vec![0usize; n + 1];
        for col in 0..n {
            let (first, last) = (colptr[col], colptr[col + 1]);
            let mut p = first;
            while p < last {
                let row = rowval[p];
                let mut v = nzval[p];
                let mut q = p + 1;
                while q < last && rowval[q] == row {
                    v = match combine {
                        Combine::Sum => v + nzval[q],
                        Combine::Max => T::max(v, nzval[q]),
                    };
                    q += 1;
                }
                rowval[ptr] = row;
                nzval[ptr] = v;
                ptr += 1;
                p = q;
            }
            newcolptr[col + 1] = ptr;
        }
        rowval.truncate(ptr);
        nzval.truncate(ptr);

        CscMatrix::new(m, n, newcolptr, rowval, nzval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_csc_sums_duplicates() {
        //entry (1,0) listed twice: 2 + 3
        let coo = CooMatrix::new(
            2,
            2,
            vec![1, 0, 1],
            vec![0, 1, 0],
            vec![2.0, 5.0, 3.0],
        );
        let csc = coo.to_csc();
        assert!(csc.check_format().is_ok());
        assert_eq!(csc.nnz(), 2);
        assert_eq!(csc.get_entry((1, 0)).unwrap(), 5.0);
        assert_eq!(csc.get_entry((0, 1)).unwrap(), 5.0);
    }

    #[test]
    fn test_max_combine() {
        let coo = CooMatrix::new(2, 2, vec![1, 1], vec![0, 0], vec![2.0, 7.0]);
        let csc = coo.to_csc_with(Combine::Max);
        assert_eq!(csc.get_entry((1, 0)).unwrap(), 7.0);
    }

    #[test]
    fn test_symmetric_builder() {
        let a = CooMatrix::symmetric(3, &[0, 1], &[1, 2], &[1.5, 2.5]).to_csc();
        assert!(a.check_adjacency().is_ok());
        assert_eq!(a.get_entry((0, 1)).unwrap(), 1.5);
        assert_eq!(a.get_entry((2, 1)).unwrap(), 2.5);
    }

    #[test]
    fn test_compress_sorted_output() {
        let coo = CooMatrix::new(
            3,
            3,
            vec![2, 0, 2, 1],
            vec![0, 2, 0, 1],
            vec![1.0, 1.0, 1.0, 1.0],
        );
        let z = coo.compress(Combine::Sum);
        assert_eq!(z.nnz(), 3);
        //column-major, rows ascending
        assert_eq!(z.colval, vec![0, 1, 2]);
        assert_eq!(z.rowval, vec![2, 1, 0]);
        assert_eq!(z.nzval[0], 2.0);
    }
}
