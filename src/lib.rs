//! # lapsolve
//!
//! A solver for linear systems in graph Laplacians, i.e. `L(G) x = b` for
//! `L = D - A` of an undirected weighted graph `G`.  The solver builds an
//! approximate elimination of the Laplacian and uses it as a preconditioner
//! for conjugate gradients, giving near-linear solve times in the number
//! of edges.
//!
//! The main entry points are [`LaplacianSolver`](crate::solver::LaplacianSolver)
//! for building and solving, and [`akpw`](crate::solver::akpw) for callers
//! who only want a low-stretch spanning tree.

pub mod algebra;
pub mod solver;
pub mod timers;

pub use crate::algebra::{CooMatrix, CscMatrix};
pub use crate::solver::{
    akpw, average_stretch, FactorMethod, LaplacianSolver, OrderPolicy, SolverSettings,
    SolverSettingsBuilder, SolverStatus,
};
