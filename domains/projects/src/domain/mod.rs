//! Domain model for the Projects domain

pub mod assets;
pub mod entities;
pub mod state;
