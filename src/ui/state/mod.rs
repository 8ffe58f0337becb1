pub mod services;
pub mod table_view;
