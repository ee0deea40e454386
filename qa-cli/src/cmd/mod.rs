pub mod config;
pub mod phrases;
pub mod progress;
pub mod run;
pub mod validate;
