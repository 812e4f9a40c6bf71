pub mod game;
pub mod hud;
pub mod input;
pub mod reducer;
pub mod session;
pub mod simulation;
pub mod transport;
