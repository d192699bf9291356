// src/lib.rs

//! imgscrape: image search scraping library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod strategies;
pub mod utils;
