pub mod client;
pub mod envelope;
pub mod mutator;
pub mod source;
