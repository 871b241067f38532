pub mod errors;
pub mod status;
