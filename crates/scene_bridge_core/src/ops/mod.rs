pub mod component;
pub mod create;
pub mod get;
pub mod health;
pub mod raw;
pub mod remove;
pub mod reset;
