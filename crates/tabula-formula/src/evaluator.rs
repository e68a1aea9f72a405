//! Formula evaluator
//!
//! Evaluates validated token sequences with two stacks, one for values and
//! one for pending operators and open parentheses.

use crate::error::EvaluationError;
use crate::expression::{Expression, Operator, Token};

/// Result type for formula evaluation
pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

impl Operator {
    /// Apply this operator to two operands
    pub fn apply(&self, lhs: f64, rhs: f64) -> EvaluationResult<f64> {
        match self {
            Operator::Add => Ok(lhs + rhs),
            Operator::Sub => Ok(lhs - rhs),
            Operator::Mul => Ok(lhs * rhs),
            Operator::Div => {
                if rhs == 0.0 {
                    Err(EvaluationError::DivisionByZero)
                } else {
                    Ok(lhs / rhs)
                }
            }
        }
    }
}

impl Expression {
    /// Evaluate this formula
    ///
    /// `lookup` supplies the value of each variable; returning `None` aborts
    /// evaluation with [`EvaluationError::UndefinedVariable`]. Division by zero
    /// fails with [`EvaluationError::DivisionByZero`] instead of producing an
    /// infinite or NaN result.
    pub fn evaluate<F>(&self, mut lookup: F) -> EvaluationResult<f64>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        let mut machine = StackMachine::default();

        for token in self.tokens() {
            match token {
                Token::Number(n) => machine.push_operand(*n)?,
                Token::Variable(name) => {
                    let value = lookup(name.as_str())
                        .ok_or_else(|| EvaluationError::UndefinedVariable(name.clone()))?;
                    machine.push_operand(value)?;
                }
                Token::Operator(op) if op.is_multiplicative() => {
                    machine.pending.push(Pending::Operator(*op));
                }
                Token::Operator(op) => {
                    if machine.top_operator().is_some_and(|top| !top.is_multiplicative()) {
                        machine.fold()?;
                    }
                    machine.pending.push(Pending::Operator(*op));
                }
                Token::LeftParen => machine.pending.push(Pending::LeftParen),
                Token::RightParen => machine.close_group()?,
            }
        }

        machine.finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Operator(Operator),
    LeftParen,
}

#[derive(Debug, Default)]
struct StackMachine {
    values: Vec<f64>,
    pending: Vec<Pending>,
}

impl StackMachine {
    fn top_operator(&self) -> Option<Operator> {
        match self.pending.last() {
            Some(Pending::Operator(op)) => Some(*op),
            _ => None,
        }
    }

    /// Push a value, folding a pending `*` or `/` right away
    fn push_operand(&mut self, value: f64) -> EvaluationResult<()> {
        self.values.push(value);
        if self.top_operator().is_some_and(|op| op.is_multiplicative()) {
            self.fold()?;
        }
        Ok(())
    }

    /// Handle `)`: finish the group, then any `*` or `/` waiting on it
    fn close_group(&mut self) -> EvaluationResult<()> {
        if self.top_operator().is_some_and(|op| !op.is_multiplicative()) {
            self.fold()?;
        }
        self.pending.pop();
        if self.top_operator().is_some_and(|op| op.is_multiplicative()) {
            self.fold()?;
        }
        Ok(())
    }

    /// Pop one operator and two values, push the result
    fn fold(&mut self) -> EvaluationResult<()> {
        match (self.pending.pop(), self.values.pop(), self.values.pop()) {
            (Some(Pending::Operator(op)), Some(rhs), Some(lhs)) => {
                self.values.push(op.apply(lhs, rhs)?);
                Ok(())
            }
            _ => unreachable!("validated formulas keep two operands per pending operator"),
        }
    }

    fn finish(mut self) -> EvaluationResult<f64> {
        while self.top_operator().is_some() {
            self.fold()?;
        }
        match self.values.pop() {
            Some(value) => Ok(value),
            None => unreachable!("validated formulas always produce a value"),
        }
    }
}
