use crate::algebra::*;
use crate::solver::order::OrderPolicy;
use derive_builder::Builder;

/// Factorization variant used to build the preconditioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorMethod {
    /// edge-elimination heuristic with dynamic min-degree selection
    EdgeElim,
    /// vertex-elimination sampler along a tree-derived ordering
    VertexSample,
}

/// Solver configuration.
///
/// Build with [`SolverSettingsBuilder`]:
/// ```no_run
/// use lapsolve::solver::SolverSettingsBuilder;
///
/// let settings = SolverSettingsBuilder::<f64>::default()
///     .tol(1e-8)
///     .verbose(true)
///     .seed(42)
///     .build()
///     .unwrap();
/// ```

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SolverSettings<T: FloatT> {
    ///factorization variant
    #[builder(default = "FactorMethod::EdgeElim")]
    pub factor_method: FactorMethod,

    ///elimination ordering policy (vertex sampler only)
    #[builder(default = "OrderPolicy::Min")]
    pub order_policy: OrderPolicy,

    ///cell count of the elimination pool; None sizes it from the edge count
    #[builder(default = "None", setter(strip_option))]
    pub starting_pool_size: Option<usize>,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,

    ///estimate the preconditioner condition number during build
    #[builder(default = "false")]
    pub return_condition_number: bool,

    ///relative tolerance of the condition estimate
    #[builder(default = "(1e-3).as_T()")]
    pub cond_tolerance: T,

    ///RNG seed; None draws from entropy
    #[builder(default = "None", setter(strip_option))]
    pub seed: Option<u64>,

    ///cap multi-edge multiplicities using the resistance sketch
    #[builder(default = "false")]
    pub cap_multiplicities: bool,

    ///number of sketch columns
    #[builder(default = "12")]
    pub sketch_dim: usize,

    ///multiplicity cap scale
    #[builder(default = "(4.0).as_T()")]
    pub rho: T,

    ///PCG relative residual tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub tol: T,

    ///PCG iteration limit
    #[builder(default = "1000")]
    pub max_iter: usize,

    ///PCG wall clock limit (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,
}

impl<T> Default for SolverSettings<T>
where
    T: FloatT,
{
    fn default() -> SolverSettings<T> {
        SolverSettingsBuilder::<T>::default().build().unwrap()
    }
}

/// Automatic pre-build settings validation
impl<T> SolverSettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), String> {
        if let Some(tol) = self.tol {
            if !(tol.is_finite() && tol > T::zero()) {
                return Err("tol must be positive and finite".to_string());
            }
        }
        if let Some(ct) = self.cond_tolerance {
            if !(ct.is_finite() && ct > T::zero()) {
                return Err("cond_tolerance must be positive and finite".to_string());
            }
        }
        if let Some(rho) = self.rho {
            if !(rho.is_finite() && rho > T::zero()) {
                return Err("rho must be positive and finite".to_string());
            }
        }
        if let Some(k) = self.sketch_dim {
            if k == 0 {
                return Err("sketch_dim must be at least 1".to_string());
            }
        }
        if let Some(Some(pool)) = self.starting_pool_size {
            if pool == 0 {
                return Err("starting_pool_size must be nonzero".to_string());
            }
        }
        if let Some(0) = self.max_iter {
            return Err("max_iter must be at least 1".to_string());
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    //all standard settings
    SolverSettingsBuilder::<f64>::default().build().unwrap();

    //fail on nonsensical tolerances
    assert!(SolverSettingsBuilder::<f64>::default()
        .tol(-1.0)
        .build()
        .is_err());
    assert!(SolverSettingsBuilder::<f64>::default()
        .sketch_dim(0)
        .build()
        .is_err());
    assert!(SolverSettingsBuilder::<f64>::default()
        .starting_pool_size(0)
        .build()
        .is_err());

    //builder setters strip options
    let s = SolverSettingsBuilder::<f64>::default()
        .seed(7)
        .starting_pool_size(1024)
        .build()
        .unwrap();
    assert_eq!(s.seed, Some(7));
    assert_eq!(s.starting_pool_size, Some(1024));
}
