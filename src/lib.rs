pub mod config;
pub mod db;
pub mod handlers;
pub mod services;
pub mod stockcalc;
pub mod utils;
