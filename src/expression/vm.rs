use crate::expression::bytecode::{BuiltinId, BytecodeProgram, Op};

#[derive(Debug, Clone)]
pub(crate) struct VmError {
    pub(crate) message: String,
}

impl VmError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for VmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vm error: {}", self.message)
    }
}

impl std::error::Error for VmError {}

impl From<VmError> for crate::foundation::error::FxError {
    fn from(e: VmError) -> Self {
        Self::Expr(e.message)
    }
}

#[inline]
fn truth(v: f64) -> bool {
    v != 0.0
}

#[inline]
fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Run `p` against `vars`. `stack` is cleared and reused; it never grows past `p.max_stack`.
pub(crate) fn eval_program_with_stack(
    p: &BytecodeProgram,
    vars: &[f64],
    stack: &mut Vec<f64>,
) -> Result<f64, VmError> {
    stack.clear();
    stack.reserve(p.max_stack);

    for &op in &p.ops {
        match op {
            Op::PushConst(idx) => {
                let c = p
                    .consts
                    .get(usize::from(idx.0))
                    .ok_or_else(|| VmError::new("const idx out of range"))?;
                stack.push(*c);
            }
            Op::Load(slot) => {
                let v = vars
                    .get(usize::from(slot))
                    .ok_or_else(|| VmError::new(format!("variable slot {slot} not bound")))?;
                stack.push(*v);
            }

            Op::Neg => unary(stack, |v| -v)?,
            Op::Not => unary(stack, |v| flag(!truth(v)))?,
            Op::Add => binary(stack, |a, b| a + b)?,
            Op::Sub => binary(stack, |a, b| a - b)?,
            Op::Mul => binary(stack, |a, b| a * b)?,
            Op::Div => binary(stack, |a, b| a / b)?,
            // Euclidean remainder keeps `x % n` in `[0, n)` for negative coordinates.
            Op::Mod => binary(stack, f64::rem_euclid)?,
            Op::Eq => binary(stack, |a, b| flag(a == b))?,
            Op::Ne => binary(stack, |a, b| flag(a != b))?,
            Op::Lt => binary(stack, |a, b| flag(a < b))?,
            Op::Le => binary(stack, |a, b| flag(a <= b))?,
            Op::Gt => binary(stack, |a, b| flag(a > b))?,
            Op::Ge => binary(stack, |a, b| flag(a >= b))?,
            Op::And => binary(stack, |a, b| flag(truth(a) && truth(b)))?,
            Op::Or => binary(stack, |a, b| flag(truth(a) || truth(b)))?,
            Op::Select => {
                let otherwise = pop(stack)?;
                let then = pop(stack)?;
                let cond = pop(stack)?;
                stack.push(if truth(cond) { then } else { otherwise });
            }
            Op::Call(id) => call_builtin(stack, id)?,
        }
    }

    if stack.len() != 1 {
        return Err(VmError::new(format!(
            "stack has {} values at end of program",
            stack.len()
        )));
    }
    pop(stack)
}

fn pop(stack: &mut Vec<f64>) -> Result<f64, VmError> {
    stack.pop().ok_or_else(|| VmError::new("stack underflow"))
}

fn unary(stack: &mut Vec<f64>, f: impl FnOnce(f64) -> f64) -> Result<(), VmError> {
    let v = pop(stack)?;
    stack.push(f(v));
    Ok(())
}

fn binary(stack: &mut Vec<f64>, f: impl FnOnce(f64, f64) -> f64) -> Result<(), VmError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(f(a, b));
    Ok(())
}

fn ternary(stack: &mut Vec<f64>, f: impl FnOnce(f64, f64, f64) -> f64) -> Result<(), VmError> {
    let c = pop(stack)?;
    let b = pop(stack)?;
    let a = pop(stack)?;
    stack.push(f(a, b, c));
    Ok(())
}

fn call_builtin(stack: &mut Vec<f64>, id: BuiltinId) -> Result<(), VmError> {
    match id {
        BuiltinId::Abs => unary(stack, f64::abs),
        BuiltinId::Sin => unary(stack, f64::sin),
        BuiltinId::Cos => unary(stack, f64::cos),
        BuiltinId::Floor => unary(stack, f64::floor),
        BuiltinId::Sqrt => unary(stack, |x| x.max(0.0).sqrt()),
        BuiltinId::Min => binary(stack, f64::min),
        BuiltinId::Max => binary(stack, f64::max),
        BuiltinId::Pow => binary(stack, f64::powf),
        BuiltinId::Step => binary(stack, |edge, x| flag(x >= edge)),
        // min/max rather than f64::clamp: bounds may be NaN or reversed.
        BuiltinId::Clamp => ternary(stack, |x, lo, hi| x.max(lo.min(hi)).min(hi.max(lo))),
        BuiltinId::Lerp | BuiltinId::Mix => ternary(stack, |a, b, t| a + (b - a) * t),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/vm.rs"]
mod tests;
