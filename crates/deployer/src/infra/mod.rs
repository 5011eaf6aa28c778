pub mod catalog;
pub mod cli;
pub mod config;
pub mod http;
pub mod persistence;
pub mod wallet;

pub use self::{config::Config, persistence::Persistence, wallet::NodeWallet};
