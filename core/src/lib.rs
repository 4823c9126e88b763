pub mod analysis;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod nutrition;
pub mod service;
pub mod session;
