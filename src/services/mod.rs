pub mod audit;
pub mod transitions;
