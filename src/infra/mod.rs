pub mod export;
pub mod http;
pub mod session;
