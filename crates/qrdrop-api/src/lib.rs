pub mod auth;
pub mod bootstrap;
pub mod credential;
pub mod error;
pub mod manage;
pub mod middleware;
pub mod qr;
pub mod router;
pub mod transfers;
