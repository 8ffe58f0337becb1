pub mod column;
pub mod entity;
pub mod page;
pub mod record;
