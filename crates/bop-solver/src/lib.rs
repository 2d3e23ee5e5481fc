//! bop-solver: numerical kernels for module state advance.
//!
//! - `ode`: adaptive one-interval integrator (`integrate`) with a stiff-capable
//!   default method and an explicit alternative
//! - `newton`: damped Newton iteration used for implicit stages
//! - `jacobian`: forward finite-difference Jacobian
//!
//! Every kernel is generic over the caller's error type `E: From<SolverError>`,
//! so errors raised inside a right-hand side (phase violations, property
//! lookups) come back out unchanged.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod ode;

pub use error::{SolverError, SolverResult};
pub use jacobian::finite_difference_jacobian;
pub use newton::{NewtonConfig, NewtonResult, newton_solve};
pub use ode::{OdeMethod, OdeOptions, OdeSolution, integrate};
