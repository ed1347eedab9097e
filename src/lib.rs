//! Jobbly auth gateway: signed session tokens and the request pipeline that
//! enforces them.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
