//! Single-threaded epoll host for a [`Handler`](crate::handlers::Handler) chain.

mod connection;
mod poller;
pub mod server;

pub use poller::{Epoll, Interest, SocketEvent, create_listener};
pub use server::Server;
