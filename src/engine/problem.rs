use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::engine::board::{Board, FactorSource};
use crate::engine::operator::Operator;

/// Draws allowed before accepting a repeat of the previous problem.
pub const MAX_ATTEMPTS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    pub operand1: u32,
    pub operand2: u32,
    pub operator: Operator,
}

impl Problem {
    pub fn new(operand1: u32, operator: Operator, operand2: u32) -> Self {
        Self {
            operand1,
            operand2,
            operator,
        }
    }

    pub fn correct_answer(&self) -> u32 {
        self.operator.apply(self.operand1, self.operand2)
    }

    pub fn display(&self) -> String {
        format!("{} {} {} =", self.operand1, self.operator.symbol(), self.operand2)
    }
}

pub struct ProblemGenerator {
    board: Board,
    last: Option<Problem>,
    rng: SmallRng,
}

impl ProblemGenerator {
    pub fn new(board: Board, rng: SmallRng) -> Self {
        Self {
            board,
            last: None,
            rng,
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn last(&self) -> Option<Problem> {
        self.last
    }

    /// Produce a problem from the enabled operators, avoiding an immediate
    /// repeat of the previous one. Returns `None` for an empty operator set.
    pub fn generate(&mut self, operators: &[Operator]) -> Option<Problem> {
        if operators.is_empty() {
            return None;
        }

        let mut candidate = None;
        for _ in 0..MAX_ATTEMPTS {
            let op = *operators.choose(&mut self.rng)?;
            let problem = self.draw(op);
            candidate = Some(problem);
            if self.last != Some(problem) {
                break;
            }
        }

        self.last = candidate;
        if let Some(p) = candidate {
            tracing::debug!(
                board = self.board.as_str(),
                operand1 = p.operand1,
                operator = p.operator.as_str(),
                operand2 = p.operand2,
                "generated problem"
            );
        }
        candidate
    }

    fn draw(&mut self, op: Operator) -> Problem {
        let max = self.board.max();
        match op {
            Operator::Add => {
                let sum = self.rng.gen_range(2..=max);
                let a = self.rng.gen_range(1..sum);
                Problem::new(a, op, sum - a)
            }
            Operator::Sub => {
                let a = self.rng.gen_range(2..=max);
                let b = self.rng.gen_range(1..a);
                Problem::new(a, op, b)
            }
            Operator::Mul => {
                let (a, b) = self.factor_pair(self.board.mul_source());
                Problem::new(a, op, b)
            }
            Operator::Div => match self.board.div_source() {
                FactorSource::Table(pairs) => {
                    let (dividend, divisor) = self.pick(pairs);
                    Problem::new(dividend, op, divisor)
                }
                source @ FactorSource::Random { .. } => {
                    let (divisor, quotient) = self.factor_pair(source);
                    Problem::new(divisor * quotient, op, divisor)
                }
            },
        }
    }

    fn factor_pair(&mut self, source: FactorSource) -> (u32, u32) {
        match source {
            FactorSource::Table(pairs) => self.pick(pairs),
            FactorSource::Random { max_factor } => {
                let max = self.board.max();
                let first = self.rng.gen_range(2..=max_factor.min(max / 2));
                let second = self.rng.gen_range(2..=(max / first).max(2));
                (first, second)
            }
        }
    }

    fn pick(&mut self, pairs: &[(u32, u32)]) -> (u32, u32) {
        pairs.choose(&mut self.rng).copied().unwrap_or((2, 2))
    }
}
