use crate::expression::ast::{BinaryOp, Expr, UnaryOp};
use crate::expression::bytecode::{BuiltinId, BytecodeProgram, Op};
use crate::expression::error::ExprError;

pub(crate) fn lower_to_bytecode(
    expr: &Expr,
    vars: &[&str],
    max_ops: usize,
) -> Result<BytecodeProgram, ExprError> {
    let mut l = Lowerer {
        prog: BytecodeProgram::default(),
        vars,
        max_ops,
        depth: 0,
    };
    l.emit_expr(expr)?;
    Ok(l.prog)
}

struct Lowerer<'a> {
    prog: BytecodeProgram,
    vars: &'a [&'a str],
    max_ops: usize,
    depth: usize,
}

impl Lowerer<'_> {
    /// Append `op`, tracking the stack effect `pops -> 1`.
    fn emit(&mut self, op: Op, pops: usize, offset: usize) -> Result<(), ExprError> {
        if self.prog.ops.len() >= self.max_ops {
            return Err(ExprError::new(
                offset,
                format!("program exceeds {} operations", self.max_ops),
            ));
        }
        self.prog.ops.push(op);
        self.depth = self.depth - pops + 1;
        self.prog.max_stack = self.prog.max_stack.max(self.depth);
        Ok(())
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<(), ExprError> {
        match expr {
            Expr::Num(v) => {
                let idx = self.prog.push_const(*v);
                self.emit(Op::PushConst(idx), 0, 0)
            }
            Expr::Ident { name, offset } => {
                if let Some(slot) = self.vars.iter().position(|v| v == name) {
                    return self.emit(Op::Load(slot as u8), 0, *offset);
                }
                let v = match name.as_str() {
                    "true" => 1.0,
                    "false" => 0.0,
                    "pi" => std::f64::consts::PI,
                    _ => {
                        return Err(ExprError::new(
                            *offset,
                            format!("unknown variable '{name}'"),
                        ));
                    }
                };
                let idx = self.prog.push_const(v);
                self.emit(Op::PushConst(idx), 0, *offset)
            }
            Expr::Unary { op, expr } => {
                self.emit_expr(expr)?;
                let op = match op {
                    UnaryOp::Neg => Op::Neg,
                    UnaryOp::Not => Op::Not,
                };
                self.emit(op, 1, 0)
            }
            Expr::Binary { op, left, right } => {
                self.emit_expr(left)?;
                self.emit_expr(right)?;
                let op = match op {
                    BinaryOp::Add => Op::Add,
                    BinaryOp::Sub => Op::Sub,
                    BinaryOp::Mul => Op::Mul,
                    BinaryOp::Div => Op::Div,
                    BinaryOp::Mod => Op::Mod,
                    BinaryOp::Eq => Op::Eq,
                    BinaryOp::Ne => Op::Ne,
                    BinaryOp::Lt => Op::Lt,
                    BinaryOp::Le => Op::Le,
                    BinaryOp::Gt => Op::Gt,
                    BinaryOp::Ge => Op::Ge,
                    BinaryOp::And => Op::And,
                    BinaryOp::Or => Op::Or,
                };
                self.emit(op, 2, 0)
            }
            Expr::Cond {
                cond,
                then,
                otherwise,
            } => {
                self.emit_expr(cond)?;
                self.emit_expr(then)?;
                self.emit_expr(otherwise)?;
                self.emit(Op::Select, 3, 0)
            }
            Expr::Call { func, offset, args } => {
                let id = BuiltinId::from_name(func).ok_or_else(|| {
                    ExprError::new(*offset, format!("unknown function '{func}'"))
                })?;
                let arity = usize::from(id.arity());
                if args.len() != arity {
                    return Err(ExprError::new(
                        *offset,
                        format!("{func} expects {arity} argument(s), got {}", args.len()),
                    ));
                }
                for a in args {
                    self.emit_expr(a)?;
                }
                self.emit(Op::Call(id), arity, *offset)
            }
        }
    }
}
