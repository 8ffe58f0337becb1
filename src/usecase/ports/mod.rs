pub mod mutator;
pub mod session;
pub mod source;
