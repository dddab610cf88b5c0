// src/mcp/mod.rs
pub mod dispatch;
pub mod handler;
pub mod protocol;
pub mod schema;
pub mod tools;
