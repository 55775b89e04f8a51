pub mod board;
pub mod evaluator;
pub mod hint;
pub mod operator;
pub mod problem;
pub mod scheduler;

pub use board::Board;
pub use operator::Operator;
pub use problem::{Problem, ProblemGenerator};
