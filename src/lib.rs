pub mod clock;
pub mod config;
pub mod cues;
pub mod error;
pub mod events;
pub mod payload;
pub mod reconstruct;
