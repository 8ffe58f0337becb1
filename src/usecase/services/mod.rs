pub mod mutation;
pub mod table_engine;
pub mod table_state;
