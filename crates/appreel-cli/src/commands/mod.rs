pub mod catalogue;
pub mod config;
pub mod layout;
pub mod plan;
pub mod run;
