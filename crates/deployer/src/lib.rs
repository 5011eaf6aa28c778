pub mod console;
pub mod domain;
pub mod infra;
mod run;

pub use self::run::{run, start};
