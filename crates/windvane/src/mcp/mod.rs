pub mod server;
pub mod tools;
pub mod types;
