pub mod config;
pub mod ignored;
pub mod run;
pub mod sounds;
