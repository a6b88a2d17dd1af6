use crate::algebra::{FloatT, SparseFormatError};

/// Sparse matrix in standard Compressed Sparse Column (CSC) format.
///
/// For graph use the matrix holds a symmetric weighted adjacency: entry
/// `(i,j)` is the weight of edge `{i,j}`, the diagonal is structurally
/// empty, and both `(i,j)` and `(j,i)` are stored.
///
/// __Example usage__ : to construct the 3 x 3 path adjacency
/// ```text
/// A = [0.  2.  0.]
///     [2.  0.  5.]
///     [0.  5.  0.]
/// ```
///
/// ```no_run
/// use lapsolve::algebra::CscMatrix;
///
/// let A: CscMatrix<f64> = CscMatrix::new(
///    3,                    // m
///    3,                    // n
///    vec![0, 1, 3, 4],     // colptr
///    vec![1, 0, 2, 1],     // rowval
///    vec![2., 2., 5., 5.], // nzval
/// );
///
/// assert!(A.check_format().is_ok());
/// ```

#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// This field should have length `n+1`. The last entry corresponds
    /// to the number of nonzeros and should agree with the lengths of
    /// the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

impl<T> CscMatrix<T>
where
    T: FloatT,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.  This constructor does __not__ ensure that row indices
    /// are in bounds or that entries within each column appear in order
    /// of increasing row index; use [`check_format`](CscMatrix::check_format)
    /// for that.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for an `m` x `n` matrix with `nnz` elements
    pub fn spalloc(m: usize, n: usize, nnz: usize) -> Self {
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::zero(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// true if the matrix is square
    pub fn is_square(&self) -> bool {
        self.m == self.n
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        //check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        //check for rowval monotonicity within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowval);
            }
        }
        //check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }

    /// Transpose into a new matrix, by two-pass row counting then bucket
    /// placement.  Entries of the result are sorted within each column.
    pub fn transpose(&self) -> Self {
        let (m, n) = (self.m, self.n);
        let nnz = self.nnz();
        let mut out = CscMatrix::spalloc(n, m, nnz);

        //count entries per row, cumulate into the new colptr
        for &r in self.rowval.iter() {
            out.colptr[r + 1] += 1;
        }
        for k in 0..m {
            out.colptr[k + 1] += out.colptr[k];
        }

        //placement cursors start at each column base
        let mut cursor = out.colptr[0..m].to_vec();

        for col in 0..n {
            for p in self.colptr[col]..self.colptr[col + 1] {
                let r = self.rowval[p];
                let dest = cursor[r];
                out.rowval[dest] = col;
                out.nzval[dest] = self.nzval[p];
                cursor[r] += 1;
            }
        }
        out
    }

    /// Returns the value at the given (row,col) index as an Option.
    /// Returns None if the given index is not a structural nonzero.
    ///
    /// # Panics
    /// Panics if the given index is out of bounds.
    pub fn get_entry(&self, idx: (usize, usize)) -> Option<T> {
        let (row, col) = idx;
        assert!(row < self.m && col < self.n);

        let first = self.colptr[col];
        let last = self.colptr[col + 1];
        let rows_in_this_column = &self.rowval[first..last];
        match rows_in_this_column.binary_search(&row) {
            Ok(idx) => Some(self.nzval[first + idx]),
            Err(_) => None,
        }
    }
}

#[test]
fn test_csc_transpose() {
    // A =
    //[ ⋅   4.0   ⋅ ]
    //[1.0   ⋅   6.0]
    //[ ⋅   5.0   ⋅ ]
    let a = CscMatrix::new(
        3,
        3,
        vec![0, 1, 3, 4],
        vec![1, 0, 2, 1],
        vec![1., 4., 5., 6.],
    );
    let at = a.transpose();
    assert!(at.check_format().is_ok());
    assert_eq!(at.get_entry((1, 0)).unwrap(), 4.);
    assert_eq!(at.get_entry((0, 1)).unwrap(), 1.);
    assert_eq!(at.get_entry((2, 1)).unwrap(), 5.);
    assert_eq!(at.get_entry((1, 2)).unwrap(), 6.);
    assert!(at.get_entry((0, 0)).is_none());
}
