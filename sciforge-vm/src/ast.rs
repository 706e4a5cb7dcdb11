//! Expression AST for model predict bodies.
//!
//! Parameter and feature references are resolved to indices at parse time so
//! evaluation during fitting is a plain slice-indexed tree walk.

/// Binary operators, conventional precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Pow,
    Min,
    Max,
}

impl Func {
    /// Look up a function by name, returning it with its arity
    pub fn from_name(name: &str) -> Option<(Func, usize)> {
        let f = match name {
            "sin" => (Func::Sin, 1),
            "cos" => (Func::Cos, 1),
            "tan" => (Func::Tan, 1),
            "asin" => (Func::Asin, 1),
            "acos" => (Func::Acos, 1),
            "atan" => (Func::Atan, 1),
            "sinh" => (Func::Sinh, 1),
            "cosh" => (Func::Cosh, 1),
            "tanh" => (Func::Tanh, 1),
            "exp" => (Func::Exp, 1),
            "ln" => (Func::Ln, 1),
            "log10" => (Func::Log10, 1),
            "sqrt" => (Func::Sqrt, 1),
            "abs" => (Func::Abs, 1),
            "sign" => (Func::Sign, 1),
            "floor" => (Func::Floor, 1),
            "ceil" => (Func::Ceil, 1),
            "pow" => (Func::Pow, 2),
            "min" => (Func::Min, 2),
            "max" => (Func::Max, 2),
            _ => return None,
        };
        Some(f)
    }
}

/// An expression over parameters and feature columns
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal (constants `pi`/`e` fold into this at parse time)
    Number(f64),
    /// Free parameter, index into the model's parameter vector
    Param(usize),
    /// Feature column `xN`, index into the input row
    Feature(usize),
    /// Unary negation
    Neg(Box<Expr>),
    /// Binary operation
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// Function call
    Call(Func, Vec<Expr>),
}

impl Expr {
    /// Evaluate against a parameter vector and one feature row.
    ///
    /// Out-of-range feature references evaluate to NaN; the fit path
    /// validates feature arity up front so this only surfaces on malformed
    /// direct calls.
    pub fn eval(&self, params: &[f64], row: &[f64]) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Param(i) => params.get(*i).copied().unwrap_or(f64::NAN),
            Expr::Feature(i) => row.get(*i).copied().unwrap_or(f64::NAN),
            Expr::Neg(inner) => -inner.eval(params, row),
            Expr::Binary(op, lhs, rhs) => {
                let l = lhs.eval(params, row);
                let r = rhs.eval(params, row);
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            Expr::Call(func, args) => {
                let a = args[0].eval(params, row);
                match func {
                    Func::Sin => a.sin(),
                    Func::Cos => a.cos(),
                    Func::Tan => a.tan(),
                    Func::Asin => a.asin(),
                    Func::Acos => a.acos(),
                    Func::Atan => a.atan(),
                    Func::Sinh => a.sinh(),
                    Func::Cosh => a.cosh(),
                    Func::Tanh => a.tanh(),
                    Func::Exp => a.exp(),
                    Func::Ln => a.ln(),
                    Func::Log10 => a.log10(),
                    Func::Sqrt => a.sqrt(),
                    Func::Abs => a.abs(),
                    Func::Sign => {
                        if a == 0.0 {
                            0.0
                        } else {
                            a.signum()
                        }
                    }
                    Func::Floor => a.floor(),
                    Func::Ceil => a.ceil(),
                    Func::Pow => a.powf(args[1].eval(params, row)),
                    Func::Min => a.min(args[1].eval(params, row)),
                    Func::Max => a.max(args[1].eval(params, row)),
                }
            }
        }
    }

    /// Highest feature index referenced, plus one (0 for feature-free exprs)
    pub fn feature_arity(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::Param(_) => 0,
            Expr::Feature(i) => i + 1,
            Expr::Neg(inner) => inner.feature_arity(),
            Expr::Binary(_, lhs, rhs) => lhs.feature_arity().max(rhs.feature_arity()),
            Expr::Call(_, args) => args.iter().map(|a| a.feature_arity()).max().unwrap_or(0),
        }
    }
}
