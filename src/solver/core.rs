use crate::algebra::{CscMatrix, FloatT, GraphError, VectorMath};
use crate::solver::akpw::akpw_unchecked;
use crate::solver::conditioning::condition_estimate;
use crate::solver::factor::{factor_edge, factor_vertex, ApproxLdl};
use crate::solver::info::{SolveInfo, SolverStatus};
use crate::solver::ldlinv::LdlInv;
use crate::solver::order::{elimination_order, RootedTree};
use crate::solver::pcg::pcg;
use crate::solver::settings::{FactorMethod, SolverSettings};
use crate::solver::sketch::ResistanceSketch;
use crate::timers::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// A built preconditioner, one per connected component.
#[derive(Debug)]
pub enum Factorization<T> {
    Edge(LdlInv<T>),
    Vertex(Box<ApproxLdl<T>>),
    /// singleton components need no factorization
    Trivial,
}

impl<T> Factorization<T>
where
    T: FloatT,
{
    fn apply(&self, b: &mut [T], work: &mut [T]) {
        match self {
            Factorization::Edge(ldli) => ldli.apply(b),
            Factorization::Vertex(ldl) => ldl.apply(b, work),
            Factorization::Trivial => {
                b.set(T::zero());
            }
        }
    }
}

#[derive(Debug)]
struct Component<T> {
    /// global vertex ids, sorted ascending
    vertices: Vec<usize>,
    graph: CscMatrix<T>,
    degs: Vec<T>,
    factor: Factorization<T>,
}

/// Laplacian system solver.
///
/// Building validates the adjacency, splits it into connected
/// components, and constructs an approximate elimination of each
/// component's Laplacian.  [`solve`](LaplacianSolver::solve) then runs
/// preconditioned CG per component and reassembles; the solver object is
/// reusable across any number of right-hand sides.
///
/// ```no_run
/// use lapsolve::{CooMatrix, LaplacianSolver, SolverSettings};
///
/// //unit path on 4 vertices
/// let adj = CooMatrix::symmetric(4, &[0, 1, 2], &[1, 2, 3], &[1.0; 3]).to_csc();
/// let mut solver = LaplacianSolver::new(&adj, SolverSettings::default()).unwrap();
/// let x = solver.solve(&[1.0, 0.0, 0.0, -1.0]).unwrap();
/// ```
pub struct LaplacianSolver<T: FloatT = f64> {
    n: usize,
    nedges: usize,
    components: Vec<Component<T>>,
    pub settings: SolverSettings<T>,
    pub info: SolveInfo<T>,
    pub timers: Timers,
}

impl<T> LaplacianSolver<T>
where
    T: FloatT,
{
    /// Build a solver for the given adjacency.
    ///
    /// # Errors
    /// Any [`GraphError`] from adjacency validation; the build is
    /// all-or-nothing.
    pub fn new(adj: &CscMatrix<T>, settings: SolverSettings<T>) -> Result<Self, GraphError> {
        adj.check_adjacency()?;

        let mut rng = match settings.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        let mut timers = Timers::default();
        let mut components: Vec<Component<T>> = Vec::new();

        timeit! {timers => "setup"; {
            let (labels, ncomp) = adj.connected_components();
            for c in 0..ncomp {
                let vertices: Vec<usize> = (0..adj.n).filter(|&v| labels[v] == c).collect();
                let graph = adj.subgraph(&vertices);
                let degs = graph.degrees();
                let factor = Self::build_factor(&graph, &degs, &settings, &mut rng, &mut timers);
                components.push(Component {
                    vertices,
                    graph,
                    degs,
                    factor,
                });
            }
        }}

        let mut info = SolveInfo::new();
        if settings.return_condition_number {
            timeit! {timers => "cond check"; {
                info.condition_estimate = Some(Self::estimate_condition(&components, &settings));
            }}
        }

        let out = Self {
            n: adj.n,
            nedges: adj.nnz() / 2,
            components,
            settings,
            info,
            timers,
        };
        if out.settings.verbose {
            out.print_configuration();
        }
        Ok(out)
    }

    fn build_factor(
        graph: &CscMatrix<T>,
        degs: &[T],
        settings: &SolverSettings<T>,
        rng: &mut StdRng,
        timers: &mut Timers,
    ) -> Factorization<T> {
        if graph.n <= 1 {
            return Factorization::Trivial;
        }
        match settings.factor_method {
            FactorMethod::EdgeElim => {
                let ldli;
                timeit! {timers => "factor"; {
                    ldli = factor_edge(graph, rng);
                }}
                Factorization::Edge(ldli)
            }
            FactorMethod::VertexSample => {
                let rooted;
                timeit! {timers => "tree"; {
                    rooted = RootedTree::from_tree(&akpw_unchecked(graph));
                }}
                let perm = elimination_order(settings.order_policy, &rooted, graph);

                let sketch = if settings.cap_multiplicities {
                    let mut pos = vec![0usize; graph.n];
                    for (k, &v) in perm.iter().enumerate() {
                        pos[v] = k;
                    }
                    let s = ResistanceSketch::new(graph, degs, settings.sketch_dim, rng);
                    Some(s.permuted(&pos))
                } else {
                    None
                };

                let pool = settings
                    .starting_pool_size
                    .unwrap_or(8 * graph.nnz() + 16);
                let ldl;
                timeit! {timers => "factor"; {
                    ldl = factor_vertex(
                        graph,
                        &rooted,
                        perm,
                        pool,
                        sketch.as_ref().map(|s| (s, settings.rho)),
                        rng,
                    );
                }}
                Factorization::Vertex(Box::new(ldl))
            }
        }
    }

    /// condition estimate on the largest component
    fn estimate_condition(components: &[Component<T>], settings: &SolverSettings<T>) -> T {
        let comp = match components.iter().max_by_key(|c| c.vertices.len()) {
            Some(c) if c.vertices.len() > 1 => c,
            _ => return T::zero(),
        };
        let mut work = vec![T::zero(); comp.vertices.len()];
        let fac = &comp.factor;
        let (lam, _its) = condition_estimate(
            &comp.graph,
            &comp.degs,
            |z| fac.apply(z, &mut work),
            settings.cond_tolerance,
            300,
        );
        lam
    }

    /// Solve `L x = b` for the built graph.
    ///
    /// `b` should have zero mean on every connected component; the
    /// returned `x` does.  Non-convergence within the iteration or time
    /// budget is reported through [`SolveInfo::status`], not as an error.
    pub fn solve(&mut self, b: &[T]) -> Result<Vec<T>, GraphError> {
        if b.len() != self.n {
            return Err(GraphError::DimensionMismatch);
        }

        let start = Instant::now();
        let mut x = vec![T::zero(); self.n];
        let mut status = SolverStatus::Unsolved;
        let mut iterations = 0;
        let mut residual = T::zero();

        for comp in self.components.iter() {
            let nc = comp.vertices.len();
            if nc <= 1 {
                continue;
            }

            let mut bc: Vec<T> = comp.vertices.iter().map(|&v| b[v]).collect();
            let mu = bc.as_slice().mean();
            bc.as_mut_slice().translate(-mu);

            let mut xc = vec![T::zero(); nc];
            let mut work = vec![T::zero(); nc];
            let fac = &comp.factor;
            let (st, its, res) = pcg(
                &comp.graph,
                &comp.degs,
                &bc,
                &mut xc,
                |z| fac.apply(z, &mut work),
                self.settings.tol,
                self.settings.max_iter,
                self.settings.time_limit,
                self.settings.verbose,
            );

            for (loc, &glob) in comp.vertices.iter().enumerate() {
                x[glob] = xc[loc];
            }
            status = status.worst(st);
            iterations = iterations.max(its);
            residual = T::max(residual, res);
        }
        if status == SolverStatus::Unsolved {
            //only trivial components
            status = SolverStatus::Solved;
        }

        self.info.status = status;
        self.info.iterations = iterations;
        self.info.residual = residual;
        self.info.solve_time = start.elapsed().as_secs_f64();

        if self.settings.verbose {
            self.print_summary();
        }
        Ok(x)
    }

    /// The compact elimination descriptor, when the graph is connected
    /// and was factored by edge elimination.
    pub fn ldl_descriptor(&self) -> Option<&LdlInv<T>> {
        match self.components.as_slice() {
            [Component {
                factor: Factorization::Edge(ldli),
                ..
            }] => Some(ldli),
            _ => None,
        }
    }

    /// The elimination permutation, when the graph is connected and was
    /// factored by the vertex sampler.
    pub fn permutation(&self) -> Option<&[usize]> {
        match self.components.as_slice() {
            [Component {
                factor: Factorization::Vertex(ldl),
                ..
            }] => Some(&ldl.perm),
            _ => None,
        }
    }

    fn print_configuration(&self) {
        const VERSION: &str = env!("CARGO_PKG_VERSION");
        println!("-------------------------------------------------------------");
        println!("                    lapsolve v{}", VERSION);
        println!("-------------------------------------------------------------");
        println!("problem:");
        println!("  vertices    = {}", self.n);
        println!("  edges       = {}", self.nedges);
        println!("  components  = {}", self.components.len());
        println!("settings:");
        println!("  method      = {:?}", self.settings.factor_method);
        println!("  ordering    = {:?}", self.settings.order_policy);
        println!("  tol         = {}", self.settings.tol);
        println!("  max iter    = {}", self.settings.max_iter);
        if let Some(lam) = self.info.condition_estimate {
            println!("  precond gap = {}", lam);
        }
        println!("build timing:");
        self.timers.print();
    }

    fn print_summary(&self) {
        println!("-------------------------------------------------------------");
        println!(
            "status = {}, iterations = {}, relres = {:.3e}, time = {:.3}s",
            self.info.status, self.info.iterations, self.info.residual, self.info.solve_time
        );
    }
}
