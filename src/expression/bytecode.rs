#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstIdx(pub(crate) u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinId {
    Min,
    Max,
    Clamp,
    Abs,
    Sin,
    Cos,
    Lerp,
    Floor,
    Sqrt,
    Pow,
    Mix,
    Step,
}

impl BuiltinId {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "min" => Self::Min,
            "max" => Self::Max,
            "clamp" => Self::Clamp,
            "abs" => Self::Abs,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "lerp" => Self::Lerp,
            "floor" => Self::Floor,
            "sqrt" => Self::Sqrt,
            "pow" => Self::Pow,
            "mix" => Self::Mix,
            "step" => Self::Step,
            _ => return None,
        })
    }

    pub(crate) fn arity(self) -> u8 {
        match self {
            Self::Abs | Self::Sin | Self::Cos | Self::Floor | Self::Sqrt => 1,
            Self::Min | Self::Max | Self::Pow | Self::Step => 2,
            Self::Clamp | Self::Lerp | Self::Mix => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    PushConst(ConstIdx),
    /// Push the caller-supplied variable at this slot.
    Load(u8),

    Neg,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// Pops `otherwise`, `then`, `cond`; pushes the selected branch.
    Select,

    Call(BuiltinId),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct BytecodeProgram {
    pub(crate) ops: Vec<Op>,
    pub(crate) consts: Vec<f64>,
    /// Deepest stack reached by `ops`; evaluation reserves exactly this much.
    pub(crate) max_stack: usize,
}

impl BytecodeProgram {
    pub(crate) fn push_const(&mut self, v: f64) -> ConstIdx {
        if let Some(i) = self.consts.iter().position(|c| c.to_bits() == v.to_bits()) {
            return ConstIdx(i as u16);
        }
        let idx = ConstIdx(self.consts.len() as u16);
        self.consts.push(v);
        idx
    }
}
