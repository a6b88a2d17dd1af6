use crate::algebra::{CscMatrix, FloatT};
use crate::solver::degree_pq::DegreePq;

const UNSEEN: usize = usize::MAX;

/// Elimination ordering policies.
///
/// All three eliminate toward the tree root (the last vertex); they
/// differ in how the queue key of a leaf is maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// leaves first, keyed by static degree in the graph
    Min,
    /// leaves first, with neighbor keys bumped by 2 per elimination to
    /// model fill-in
    Approx,
    /// reverse depth-first order from the root
    Dfs,
}

/// A spanning tree rooted at the last vertex, in parent-array form.
///
/// The root's parent is itself; `nkids` counts children and drives the
/// leaves-first orderings.
#[derive(Debug, Clone)]
pub struct RootedTree {
    pub parent: Vec<usize>,
    pub nkids: Vec<usize>,
    pub root: usize,
}

impl RootedTree {
    /// Root a symmetric tree adjacency at vertex `n - 1` by BFS.
    pub fn from_tree<T: FloatT>(tree: &CscMatrix<T>) -> Self {
        let n = tree.n;
        assert!(n > 0);
        let root = n - 1;
        let mut parent = vec![UNSEEN; n];
        let mut nkids = vec![0usize; n];
        parent[root] = root;

        let mut queue = std::collections::VecDeque::from([root]);
        while let Some(u) = queue.pop_front() {
            for p in tree.colptr[u]..tree.colptr[u + 1] {
                let z = tree.rowval[p];
                if parent[z] == UNSEEN {
                    parent[z] = u;
                    nkids[u] += 1;
                    queue.push_back(z);
                }
            }
        }
        assert!(
            parent.iter().all(|&p| p != UNSEEN),
            "ordering requires a spanning tree"
        );
        Self {
            parent,
            nkids,
            root,
        }
    }
}

/// Produce the elimination permutation for the given policy.  The result
/// is a permutation of `0..n` with the root in the final slot.
pub fn elimination_order<T: FloatT>(
    policy: OrderPolicy,
    tree: &RootedTree,
    a: &CscMatrix<T>,
) -> Vec<usize> {
    match policy {
        OrderPolicy::Min => leaf_order(tree, a, false),
        OrderPolicy::Approx => leaf_order(tree, a, true),
        OrderPolicy::Dfs => dfs_order(tree),
    }
}

/// Shared leaves-first queue loop.  With `fill_adjust`, every pop bumps
/// the stored degree of the popped vertex's graph neighbors by 2.
fn leaf_order<T: FloatT>(tree: &RootedTree, a: &CscMatrix<T>, fill_adjust: bool) -> Vec<usize> {
    let n = tree.parent.len();
    assert_eq!(a.n, n);

    //structural degree in the graph
    let mut deg: Vec<usize> = (0..n).map(|i| a.colptr[i + 1] - a.colptr[i]).collect();
    let mut nkids = tree.nkids.clone();
    let mut pq = DegreePq::new(n);

    for i in 0..n {
        if nkids[i] == 0 && i != tree.root {
            pq.insert(i, deg[i]);
        }
    }

    let mut order = Vec::with_capacity(n);
    while let Some(u) = pq.pop_min() {
        order.push(u);

        if fill_adjust {
            for p in a.colptr[u]..a.colptr[u + 1] {
                let z = a.rowval[p];
                deg[z] += 2;
                if pq.contains(z) {
                    pq.inc(z);
                    pq.inc(z);
                }
            }
        }

        let par = tree.parent[u];
        nkids[par] -= 1;
        if nkids[par] == 0 && par != tree.root {
            pq.insert(par, deg[par]);
        }
    }
    order.push(tree.root);
    debug_assert_eq!(order.len(), n);
    order
}

/// Reverse preorder DFS from the root.
fn dfs_order(tree: &RootedTree) -> Vec<usize> {
    let n = tree.parent.len();
    let mut kids: Vec<Vec<usize>> = vec![Vec::new(); n];
    for v in 0..n {
        if v != tree.root {
            kids[tree.parent[v]].push(v);
        }
    }

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![tree.root];
    while let Some(u) = stack.pop() {
        order.push(u);
        stack.extend(kids[u].iter().copied());
    }
    order.reverse();
    debug_assert_eq!(order.len(), n);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CooMatrix;
    use crate::solver::akpw::akpw;

    fn is_permutation(p: &[usize]) -> bool {
        let mut seen = vec![false; p.len()];
        p.iter().all(|&i| {
            if i < seen.len() && !seen[i] {
                seen[i] = true;
                true
            } else {
                false
            }
        })
    }

    fn path(n: usize) -> CscMatrix<f64> {
        let is: Vec<usize> = (0..n - 1).collect();
        let js: Vec<usize> = (1..n).collect();
        let vs = vec![1.0; n - 1];
        CooMatrix::symmetric(n, &is, &js, &vs).to_csc()
    }

    #[test]
    fn test_orders_are_permutations() {
        let a = path(7);
        let tree = RootedTree::from_tree(&akpw(&a).unwrap());
        for policy in [OrderPolicy::Min, OrderPolicy::Approx, OrderPolicy::Dfs] {
            let ord = elimination_order(policy, &tree, &a);
            assert!(is_permutation(&ord), "{:?} not a permutation", policy);
            assert_eq!(*ord.last().unwrap(), tree.root);
        }
    }

    #[test]
    fn test_leaves_eliminated_before_parents() {
        let a = path(6);
        let tree = RootedTree::from_tree(&akpw(&a).unwrap());
        let ord = elimination_order(OrderPolicy::Min, &tree, &a);

        //every vertex appears after all of its tree children
        let mut pos = vec![0usize; 6];
        for (k, &v) in ord.iter().enumerate() {
            pos[v] = k;
        }
        for v in 0..6 {
            if v != tree.root {
                assert!(pos[v] < pos[tree.parent[v]]);
            }
        }
    }
}
