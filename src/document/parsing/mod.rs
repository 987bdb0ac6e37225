//! Navigation data derived from engine output

pub mod links;
pub mod outline;
