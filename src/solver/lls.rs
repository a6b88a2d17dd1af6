use crate::algebra::FloatT;
use crate::solver::sketch::ResistanceSketch;

const EMPTY: usize = usize::MAX;

/// Pooled linked-list storage for per-vertex adjacency during vertex
/// elimination.
///
/// A fixed-capacity block of cells `(weight, count, nbr, next)` backs one
/// mutable list per vertex.  A circular free list hands out cells in O(1);
/// [`purge`](LinkedListStorage::purge) drains a whole column, coalescing
/// multi-edges, and returns every cell to the pool.  The pool wraps many
/// times within a single elimination, so exhaustion means the caller
/// undersized it and is a hard error.
#[derive(Debug)]
pub struct LinkedListStorage<T> {
    n: usize,
    capacity: usize,
    used: usize,
    //per-vertex list heads and tails
    first: Vec<usize>,
    last: Vec<usize>,
    //cell pool
    weight: Vec<T>,
    count: Vec<usize>,
    nbr: Vec<usize>,
    next: Vec<usize>,
    //circular free list with allocation/release cursors
    free: Vec<usize>,
    left: usize,
    right: usize,
}

/// Dense scratch and output buffers for [`LinkedListStorage::purge`].
///
/// `val`/`mult` are length-n accumulators assumed zero between calls;
/// the output triple is overwritten on every purge.
#[derive(Debug)]
pub struct PurgeScratch<T> {
    val: Vec<T>,
    mult: Vec<usize>,
    /// coalesced weight per distinct neighbor
    pub weights: Vec<T>,
    /// coalesced (possibly capped) multiplicity per distinct neighbor
    pub mults: Vec<usize>,
    /// distinct neighbor indices
    pub inds: Vec<usize>,
}

impl<T: FloatT> PurgeScratch<T> {
    pub fn new(n: usize) -> Self {
        Self {
            val: vec![T::zero(); n],
            mult: vec![0; n],
            weights: Vec::with_capacity(n),
            mults: Vec::with_capacity(n),
            inds: Vec::with_capacity(n),
        }
    }
}

impl<T> LinkedListStorage<T>
where
    T: FloatT,
{
    /// Empty per-vertex lists over `n` vertices, with a pool of
    /// `capacity` cells.
    pub fn new(n: usize, capacity: usize) -> Self {
        assert!(capacity > 0);
        Self {
            n,
            capacity,
            used: 0,
            first: vec![EMPTY; n],
            last: vec![EMPTY; n],
            weight: vec![T::zero(); capacity],
            count: vec![0; capacity],
            nbr: vec![0; capacity],
            next: vec![EMPTY; capacity],
            free: (0..capacity).collect(),
            left: 0,
            right: 0,
        }
    }

    /// cells currently checked out of the pool
    pub fn used(&self) -> usize {
        self.used
    }

    fn alloc(&mut self) -> usize {
        assert!(
            self.used < self.capacity,
            "linked list pool exhausted ({} cells); rebuild with a larger pool",
            self.capacity
        );
        let idx = self.free[self.left];
        self.left = modulo_next(self.left, self.capacity);
        self.used += 1;
        idx
    }

    fn release(&mut self, idx: usize) {
        self.free[self.right] = idx;
        self.right = modulo_next(self.right, self.capacity);
        self.used -= 1;
    }

    /// Append `(weight, count, nbr)` at the tail of `v`'s list.
    pub fn add(&mut self, v: usize, weight: T, count: usize, nbr: usize) {
        debug_assert!(v < self.n && nbr < self.n);
        let idx = self.alloc();
        self.weight[idx] = weight;
        self.count[idx] = count;
        self.nbr[idx] = nbr;
        self.next[idx] = EMPTY;

        if self.first[v] == EMPTY {
            self.first[v] = idx;
        } else {
            self.next[self.last[v]] = idx;
        }
        self.last[v] = idx;
    }

    /// Drain `v`'s list, coalescing multi-edges to distinct neighbors
    /// into `scratch.{weights, mults, inds}`.  Returns
    /// `(diag, mult_sum, n_distinct)` where `diag` is the total weight
    /// drained.  When a sketch is supplied, each coalesced multiplicity
    /// is capped at `ceil(rho * w * ||xhat[v] - xhat[u]||^2)`.
    ///
    /// All drained cells go back to the free pool, and the dense scratch
    /// accumulators are re-zeroed before returning.
    pub fn purge(
        &mut self,
        v: usize,
        scratch: &mut PurgeScratch<T>,
        cap: Option<(&ResistanceSketch<T>, T)>,
    ) -> (T, usize, usize) {
        scratch.weights.clear();
        scratch.mults.clear();
        scratch.inds.clear();

        let mut diag = T::zero();
        let mut cell = self.first[v];
        while cell != EMPTY {
            let u = self.nbr[cell];
            assert!(u != v, "self loop in elimination list at vertex {}", v);
            debug_assert!(u > v, "neighbor below the elimination front");

            if scratch.mult[u] == 0 {
                scratch.inds.push(u);
            }
            scratch.val[u] += self.weight[cell];
            scratch.mult[u] += self.count[cell];
            diag += self.weight[cell];

            let dead = cell;
            cell = self.next[cell];
            self.release(dead);
        }
        self.first[v] = EMPTY;
        self.last[v] = EMPTY;

        let mut mult_sum = 0;
        for &u in scratch.inds.iter() {
            let w = scratch.val[u];
            let mut c = scratch.mult[u];
            if let Some((sketch, rho)) = cap {
                let lim = rho * w * sketch.distance2(v, u);
                let lim = num_traits::cast::<T, usize>(lim.ceil()).unwrap_or(usize::MAX);
                c = c.min(lim.max(1));
            }
            scratch.weights.push(w);
            scratch.mults.push(c);
            mult_sum += c;
            scratch.val[u] = T::zero();
            scratch.mult[u] = 0;
        }

        (diag, mult_sum, scratch.inds.len())
    }
}

#[inline]
fn modulo_next(i: usize, len: usize) -> usize {
    if i + 1 == len {
        0
    } else {
        i + 1
    }
}
