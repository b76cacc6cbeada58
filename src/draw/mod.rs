pub mod board;
pub mod engine;
pub mod report;
pub mod roster;
pub mod strategy;
pub mod world_cup;
