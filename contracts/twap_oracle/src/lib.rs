pub mod amm;
pub mod api;
pub mod contract;
pub mod error;
pub mod listeners;
pub mod logic;
pub mod state;
pub mod store;

#[cfg(test)]
mod testing;
