//! Sandboxed numeric expression language used by the custom effect.
//!
//! Source text is lexed, parsed and lowered once into a flat stack bytecode. Evaluation reads
//! only the caller's variable slots and a reusable stack; there are no loops, calls into host
//! code, or allocations past the precomputed stack depth.
//!
//! Booleans are numbers: comparisons yield `1` or `0` and any non-zero value is true.

mod ast;
mod bytecode;
mod error;
mod lexer;
mod lower;
mod parser;
mod vm;

use crate::foundation::error::{FxError, FxResult};

/// Longest accepted source text, in bytes.
pub const MAX_SOURCE_LEN: usize = 1024;
/// Longest accepted compiled program, in operations.
pub const MAX_OPS: usize = 256;

/// A compiled expression bound to a fixed list of variable names.
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    code: bytecode::BytecodeProgram,
}

impl Program {
    /// Compile `source`; identifiers resolve against `vars` by position.
    pub fn compile(source: &str, vars: &[&str]) -> FxResult<Self> {
        if source.len() > MAX_SOURCE_LEN {
            return Err(FxError::expr(format!(
                "expression is {} bytes, limit is {MAX_SOURCE_LEN}",
                source.len()
            )));
        }
        if vars.len() > usize::from(u8::MAX) {
            return Err(FxError::validation("too many expression variables"));
        }
        let ast = parser::parse_expr(source)?;
        let code = lower::lower_to_bytecode(&ast, vars, MAX_OPS)?;
        Ok(Self {
            source: source.to_owned(),
            code,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn op_count(&self) -> usize {
        self.code.ops.len()
    }

    /// Evaluate with `vars` in the order given to [`Program::compile`].
    ///
    /// Non-finite results are errors.
    pub fn eval(&self, vars: &[f64], stack: &mut Vec<f64>) -> FxResult<f64> {
        let v = vm::eval_program_with_stack(&self.code, vars, stack)?;
        if !v.is_finite() {
            return Err(FxError::expr(format!(
                "'{}' evaluated to a non-finite value",
                self.source
            )));
        }
        Ok(v)
    }

    /// `true` when the program is a bare read of variable `slot`.
    pub fn is_passthrough(&self, slot: usize) -> bool {
        matches!(self.code.ops.as_slice(), [bytecode::Op::Load(s)] if usize::from(*s) == slot)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/mod.rs"]
mod tests;
