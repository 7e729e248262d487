pub mod callback;
pub mod constants;
pub mod errors;
