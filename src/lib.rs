// src/lib.rs

pub mod aggregate;
pub mod db;
pub mod error;
pub mod extract;
pub mod logging;
pub mod normalize;
pub mod observation;
pub mod pipeline;
pub mod upsert;
