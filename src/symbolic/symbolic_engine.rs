//! # Symbolic Engine Module
//!
//! Exact symbolic numbers used as coefficients by the PEP algebra. This is the backend that
//! plays the role of an exact-arithmetic system: whenever a coefficient must stay exact (a
//! rational step size, `sqrt(2)`, a free symbol standing for an unknown rate) it is carried
//! around as an [`Expr`].
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - free symbols like "theta", "L"
//! - **Constants**: `Const(BigRational)` - exact rational constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - Create multiple variables from comma-separated string
//! - `simplify_()` - canonical sum-of-products form (see `symbolic_simplify`)
//! - `equals_zero()` - exact zero test on the canonical form
//! - `eval_f64()` - numerical value of a closed expression
//! - `set_variable()` - substitute a variable with another expression
//!
//! Arithmetic operators (`+ - * /` and unary `-`) build new nodes without simplifying, the
//! same way the rest of the crate builds expression trees and canonicalizes them afterwards.

use num::{BigInt, BigRational};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::HashMap;
use std::fmt;

/// Core exact symbolic expression.
///
/// # Examples
/// ```rust, ignore
/// use RustedPEP::symbolic::symbolic_engine::Expr;
/// let half = Expr::rational(1, 2);
/// let expr = Expr::Var("L".to_string()) * half;
/// assert_eq!(expr.to_string(), "L*(1/2)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "theta")
    Var(String),
    /// Exact rational constant
    Const(BigRational),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(_, _) | Expr::Sub(_, _) => 1,
            Expr::Const(c) if c.is_negative() => 1,
            Expr::Mul(_, _) | Expr::Div(_, _) => 2,
            Expr::Const(c) if !c.is_integer() => 2,
            Expr::Pow(_, exp) if is_half(exp) => 4,
            Expr::Pow(_, _) => 3,
            Expr::Var(_) | Expr::Const(_) => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

fn is_half(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(c) if *c == BigRational::new(BigInt::one(), BigInt::from(2)))
}

/// Pretty printing with the minimal set of parentheses.
///
/// `Pow(x, 1/2)` is printed as `sqrt(x)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, " + ")?;
                rhs.fmt_operand(f, 2)
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, " - ")?;
                rhs.fmt_operand(f, 2)
            }
            Expr::Mul(lhs, rhs) => {
                // a leading coefficient never needs parentheses: -2*x, 1/2*x
                match lhs.as_ref() {
                    Expr::Const(c) => write!(f, "{}", c)?,
                    _ => lhs.fmt_operand(f, 2)?,
                }
                write!(f, "*")?;
                rhs.fmt_operand(f, 3)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_operand(f, 2)?;
                write!(f, "/")?;
                rhs.fmt_operand(f, 3)
            }
            Expr::Pow(base, exp) if is_half(exp) => write!(f, "sqrt({})", base),
            Expr::Pow(base, exp) => {
                base.fmt_operand(f, 4)?;
                write!(f, "^")?;
                exp.fmt_operand(f, 4)
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::int(-1)), Box::new(self))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::int(value as i64)
    }
}

impl From<BigRational> for Expr {
    fn from(value: BigRational) -> Self {
        Expr::Const(value)
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("x, y, z");
    /// assert_eq!(vars.len(), 3);
    /// ```
    #[allow(non_snake_case)]
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// integer constant
    pub fn int(value: i64) -> Expr {
        Expr::Const(BigRational::from_integer(BigInt::from(value)))
    }

    /// exact fraction `numer/denom`; panics on a zero denominator like `BigRational::new`
    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::Const(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Expr::rational(1, 2).boxed())
    }

    pub fn pow(self, exp: Expr) -> Expr {
        Expr::Pow(self.boxed(), exp.boxed())
    }

    /// Returns the rational value if the node is a bare constant.
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Const(c) => Some(c),
            _ => None,
        }
    }

    /// true if no free symbols occur in the expression
    pub fn is_constant(&self) -> bool {
        self.extract_variables().is_empty()
    }

    /// Collects the names of all free symbols, sorted and without duplicates.
    pub fn extract_variables(&self) -> Vec<String> {
        fn walk(expr: &Expr, acc: &mut Vec<String>) {
            match expr {
                Expr::Var(name) => acc.push(name.clone()),
                Expr::Const(_) => {}
                Expr::Add(lhs, rhs)
                | Expr::Sub(lhs, rhs)
                | Expr::Mul(lhs, rhs)
                | Expr::Div(lhs, rhs)
                | Expr::Pow(lhs, rhs) => {
                    walk(lhs, acc);
                    walk(rhs, acc);
                }
            }
        }
        let mut vars = Vec::new();
        walk(self, &mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    /// Numerical value of a closed expression, `None` if a free symbol is left.
    pub fn eval_f64(&self) -> Option<f64> {
        match self {
            Expr::Var(_) => None,
            Expr::Const(c) => c.to_f64(),
            Expr::Add(lhs, rhs) => Some(lhs.eval_f64()? + rhs.eval_f64()?),
            Expr::Sub(lhs, rhs) => Some(lhs.eval_f64()? - rhs.eval_f64()?),
            Expr::Mul(lhs, rhs) => Some(lhs.eval_f64()? * rhs.eval_f64()?),
            Expr::Div(lhs, rhs) => Some(lhs.eval_f64()? / rhs.eval_f64()?),
            Expr::Pow(base, exp) => Some(base.eval_f64()?.powf(exp.eval_f64()?)),
        }
    }

    /// Substitutes a variable with an expression throughout the tree.
    pub fn set_variable(&self, var: &str, value: &Expr) -> Expr {
        self.substitute(&|name| (name == var).then(|| value.clone()))
    }

    /// Substitutes every variable present in the map.
    pub fn set_variable_from_map(&self, var_map: &HashMap<String, Expr>) -> Expr {
        self.substitute(&|name| var_map.get(name).cloned())
    }

    fn substitute(&self, lookup: &dyn Fn(&str) -> Option<Expr>) -> Expr {
        match self {
            Expr::Var(name) => lookup(name).unwrap_or_else(|| self.clone()),
            Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(
                Box::new(lhs.substitute(lookup)),
                Box::new(rhs.substitute(lookup)),
            ),
            Expr::Sub(lhs, rhs) => Expr::Sub(
                Box::new(lhs.substitute(lookup)),
                Box::new(rhs.substitute(lookup)),
            ),
            Expr::Mul(lhs, rhs) => Expr::Mul(
                Box::new(lhs.substitute(lookup)),
                Box::new(rhs.substitute(lookup)),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(lhs.substitute(lookup)),
                Box::new(rhs.substitute(lookup)),
            ),
            Expr::Pow(base, exp) => Expr::Pow(
                Box::new(base.substitute(lookup)),
                Box::new(exp.substitute(lookup)),
            ),
        }
    }

    /// true if the expression is the constant 1 as written (no simplification)
    pub fn is_literal_one(&self) -> bool {
        matches!(self, Expr::Const(c) if c.is_one())
    }

    /// true if the expression is the constant 0 as written (no simplification)
    pub fn is_literal_zero(&self) -> bool {
        matches!(self, Expr::Const(c) if c.is_zero())
    }
}
