pub mod solver;

pub use solver::{SolveRequest, SolveResponse, SolverService};
