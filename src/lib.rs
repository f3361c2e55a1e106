// Vigil: harassment and abuse content scanning across social and news platforms.
//
// This is the library root. Each module corresponds to a stage of the
// fetch -> detect -> normalize -> aggregate pipeline.

pub mod config;
pub mod detector;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
