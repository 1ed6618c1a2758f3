pub mod board;
pub mod engine;
pub mod ranker;
pub mod scorer;
pub mod text;
pub mod types;
