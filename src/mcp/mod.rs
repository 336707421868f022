//! Model Context Protocol tool surface: newline delimited JSON-RPC 2.0 over stdio.

pub mod api;
pub mod server;
pub mod types;

pub use server::Server;
