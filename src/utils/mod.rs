pub mod fen_generator;
pub mod fen_parser;
pub mod pmn;
pub mod san;
