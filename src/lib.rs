//! Listing Studio core: items, suggestions and the enhance/validate
//! operations that run against them.

pub mod config;
pub mod error;
pub mod export;
pub mod processing;
pub mod services;
pub mod state;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;
