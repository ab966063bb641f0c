//! Raw numbers and the closed operand union used wherever "a number or a Parameter" fits.
//!
//! [`Number`] keeps integers and fractions exact and lets floats be floats. [`Operand`] adds
//! the two deferred cases, a [`Parameter`] and an exact symbolic [`Expr`]. Operand arithmetic
//! folds what it can right away and defers everything else into a composite Parameter, which
//! is resolved only at evaluation time.

use crate::pep::parameter::Parameter;
use crate::pep::utils::{Op, numerical_str};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::SymbolicType;
use num::{BigInt, BigRational};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;

/// A raw number: a float or an exact rational.
#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Float(f64),
    Rational(BigRational),
}

impl Number {
    pub fn int(value: i64) -> Number {
        Number::Rational(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn rational(numer: i64, denom: i64) -> Number {
        Number::Rational(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Float(x) => *x == 0.0,
            Number::Rational(r) => r.is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Float(x) => *x == 1.0,
            Number::Rational(r) => r.is_one(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Float(x) => *x < 0.0,
            Number::Rational(r) => r.is_negative(),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Float(x) => *x,
            Number::Rational(r) => r.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// integer value of an exact integer or an integral float
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            Number::Rational(r) if r.is_integer() => r.to_integer().to_i32(),
            Number::Float(x) if x.fract() == 0.0 => x.to_i32(),
            _ => None,
        }
    }

    fn zero_like(&self) -> Number {
        match self {
            Number::Float(_) => Number::Float(0.0),
            Number::Rational(_) => Number::int(0),
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a + b),
            _ => Number::Float(self.to_f64() + other.to_f64()),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a - b),
            _ => Number::Float(self.to_f64() - other.to_f64()),
        }
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a * b),
            _ => Number::Float(self.to_f64() * other.to_f64()),
        }
    }

    /// `None` for a zero divisor, float or exact.
    pub fn checked_div(&self, other: &Number) -> Option<Number> {
        if other.is_zero() {
            return None;
        }
        Some(match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a / b),
            _ => Number::Float(self.to_f64() / other.to_f64()),
        })
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Float(x) => Number::Float(-x),
            Number::Rational(r) => Number::Rational(-r),
        }
    }

    /// Exact power for an integer exponent, float power when a float is involved.
    /// `None` when the result is not a plain number (fractional exact exponent, `0^-k`).
    pub fn checked_pow(&self, exp: &Number) -> Option<Number> {
        match (self, exp) {
            (Number::Rational(base), Number::Rational(e)) => {
                if !e.is_integer() {
                    return None;
                }
                let k = e.to_integer().to_i32()?;
                if base.is_zero() && k < 0 {
                    return None;
                }
                Some(Number::Rational(base.pow(k)))
            }
            _ => {
                if self.is_zero() && exp.is_negative() {
                    return None;
                }
                Some(Number::Float(self.to_f64().powf(exp.to_f64())))
            }
        }
    }

    pub fn to_expr(&self) -> Option<Expr> {
        match self {
            Number::Rational(r) => Some(Expr::Const(r.clone())),
            Number::Float(_) => None,
        }
    }
}

/// Floats use 4 significant digits, rationals print as `p/q`.
impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Float(x) => write!(f, "{}", numerical_str(*x)),
            Number::Rational(r) => write!(f, "{}", r),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::int(value as i64)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::int(value)
    }
}

impl From<BigRational> for Number {
    fn from(value: BigRational) -> Self {
        Number::Rational(value)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                   OPERAND
////////////////////////////////////////////////////////////////////////////////////////

/// A coefficient: a raw number, a Parameter, or an exact symbolic expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Number(Number),
    Parameter(Parameter),
    Symbolic(Expr),
}

impl Operand {
    pub fn zero() -> Operand {
        Operand::Number(Number::int(0))
    }

    pub fn one() -> Operand {
        Operand::Number(Number::int(1))
    }

    /// Symbolic results that reduce to a rational become plain numbers.
    fn from_symbolic(expr: Expr) -> Operand {
        let simplified = expr.simplify_();
        match simplified.to_rational() {
            Some(r) => Operand::Number(Number::Rational(r)),
            None => Operand::Symbolic(simplified),
        }
    }

    fn as_exact_expr(&self) -> Option<Expr> {
        match self {
            Operand::Number(n) => n.to_expr(),
            Operand::Symbolic(e) => Some(e.clone()),
            Operand::Parameter(_) => None,
        }
    }

    /// Numerical value of a raw number or of a symbolic expression without free symbols.
    fn float_value(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(n.to_f64()),
            Operand::Symbolic(e) => SymbolicType::to_f64(e),
            Operand::Parameter(_) => None,
        }
    }

    fn is_symbolic(&self) -> bool {
        matches!(self, Operand::Symbolic(_))
    }

    fn deferred(op: Op, left: &Operand, right: &Operand) -> Operand {
        Operand::Parameter(Parameter::composite(op, left.clone(), right.clone()))
    }

    /// Exact zero test. Parameters are simplified first and count as non-zero when they
    /// cannot be.
    pub fn is_zero(&self) -> bool {
        match self {
            Operand::Number(n) => n.is_zero(),
            Operand::Symbolic(e) => e.equals_zero(),
            Operand::Parameter(p) => p.is_zero(),
        }
    }

    /// Only raw numbers and closed symbolic expressions can be one.
    pub fn is_one(&self) -> bool {
        match self {
            Operand::Number(n) => n.is_one(),
            Operand::Symbolic(e) => (e.clone() - Expr::int(1)).equals_zero(),
            Operand::Parameter(_) => false,
        }
    }

    /// true if a float appears anywhere, including inside Parameters
    pub fn contains_float(&self) -> bool {
        match self {
            Operand::Number(n) => n.is_float(),
            Operand::Symbolic(_) => false,
            Operand::Parameter(p) => p.contains_float(),
        }
    }

    pub fn simplify(&self) -> Operand {
        match self {
            Operand::Number(_) => self.clone(),
            Operand::Symbolic(e) => Operand::from_symbolic(e.clone()),
            Operand::Parameter(p) => p
                .simplify()
                .map(Operand::Parameter)
                .unwrap_or_else(|_| self.clone()),
        }
    }

    pub fn add(&self, other: &Operand) -> Operand {
        if other.is_literal_zero() {
            return self.clone();
        }
        if self.is_literal_zero() {
            return other.clone();
        }
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => Operand::Number(a.add(b)),
            _ => self.fold_exact(other, Op::Add, |a, b| a + b),
        }
    }

    pub fn sub(&self, other: &Operand) -> Operand {
        if other.is_literal_zero() {
            return self.clone();
        }
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => Operand::Number(a.sub(b)),
            _ => self.fold_exact(other, Op::Sub, |a, b| a - b),
        }
    }

    pub fn mul(&self, other: &Operand) -> Operand {
        if let (Operand::Number(a), Operand::Number(b)) = (self, other) {
            return Operand::Number(a.mul(b));
        }
        if other.is_literal_one() {
            return self.clone();
        }
        if self.is_literal_one() {
            return other.clone();
        }
        if let Operand::Number(n) = self {
            if n.is_zero() {
                return Operand::Number(n.zero_like());
            }
        }
        if let Operand::Number(n) = other {
            if n.is_zero() {
                return Operand::Number(n.zero_like());
            }
        }
        self.fold_exact(other, Op::Mul, |a, b| a * b)
    }

    /// Division by an exact zero is deferred; it fails when the result is evaluated.
    pub fn div(&self, other: &Operand) -> Operand {
        if other.is_literal_one() {
            return self.clone();
        }
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => match a.checked_div(b) {
                Some(q) => Operand::Number(q),
                None => Operand::deferred(Op::Div, self, other),
            },
            (_, Operand::Symbolic(e)) if e.equals_zero() => {
                Operand::deferred(Op::Div, self, other)
            }
            _ => self.fold_exact(other, Op::Div, |a, b| a / b),
        }
    }

    pub fn neg(&self) -> Operand {
        match self {
            Operand::Number(n) => Operand::Number(n.neg()),
            Operand::Symbolic(e) => Operand::from_symbolic(-e.clone()),
            Operand::Parameter(_) => Operand::Number(Number::int(-1)).mul(self),
        }
    }

    pub fn pow(&self, exp: &Operand) -> Operand {
        if exp.is_literal_zero() {
            return Operand::one();
        }
        if exp.is_literal_one() {
            return self.clone();
        }
        if let (Operand::Number(a), Operand::Number(b)) = (self, exp) {
            if let Some(p) = a.checked_pow(b) {
                return Operand::Number(p);
            }
        }
        match (self.as_exact_expr(), exp.as_exact_expr()) {
            (Some(a), Some(b)) => {
                let zero_base_negative_exp = a.equals_zero()
                    && b.to_rational().map(|r| r.is_negative()).unwrap_or(true);
                if zero_base_negative_exp {
                    Operand::deferred(Op::Pow, self, exp)
                } else {
                    Operand::from_symbolic(a.pow(b))
                }
            }
            _ if self.is_symbolic() || exp.is_symbolic() => {
                match (self.float_value(), exp.float_value()) {
                    (Some(a), Some(b)) => Number::Float(a)
                        .checked_pow(&Number::Float(b))
                        .map(Operand::Number)
                        .unwrap_or_else(|| Operand::deferred(Op::Pow, self, exp)),
                    _ => Operand::deferred(Op::Pow, self, exp),
                }
            }
            _ => Operand::deferred(Op::Pow, self, exp),
        }
    }

    /// Rational⊕Symbolic and Symbolic⊕Symbolic fold exactly. A float next to a symbolic
    /// expression without free symbols folds to a float, everything else is deferred.
    fn fold_exact(&self, other: &Operand, op: Op, f: impl Fn(Expr, Expr) -> Expr) -> Operand {
        if self.is_symbolic() || other.is_symbolic() {
            if let (Some(a), Some(b)) = (self.as_exact_expr(), other.as_exact_expr()) {
                return Operand::from_symbolic(f(a, b));
            }
            if let (Some(a), Some(b)) = (self.float_value(), other.float_value()) {
                let (a, b) = (Operand::from(a), Operand::from(b));
                return match op {
                    Op::Add => a.add(&b),
                    Op::Sub => a.sub(&b),
                    Op::Mul => a.mul(&b),
                    Op::Div => a.div(&b),
                    Op::Pow => a.pow(&b),
                };
            }
        }
        Operand::deferred(op, self, other)
    }

    fn is_literal_zero(&self) -> bool {
        match self {
            Operand::Number(n) => n.is_zero(),
            _ => false,
        }
    }

    fn is_literal_one(&self) -> bool {
        match self {
            Operand::Number(n) => n.is_one(),
            _ => false,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Number(n) => write!(f, "{}", n),
            Operand::Parameter(p) => write!(f, "{}", p),
            Operand::Symbolic(e) => write!(f, "{}", e),
        }
    }
}

impl From<Number> for Operand {
    fn from(value: Number) -> Self {
        Operand::Number(value)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Number(Number::Float(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Number(Number::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Number(Number::from(value))
    }
}

impl From<BigRational> for Operand {
    fn from(value: BigRational) -> Self {
        Operand::Number(Number::Rational(value))
    }
}

impl From<Parameter> for Operand {
    fn from(value: Parameter) -> Self {
        Operand::Parameter(value)
    }
}

impl From<&Parameter> for Operand {
    fn from(value: &Parameter) -> Self {
        Operand::Parameter(value.clone())
    }
}

impl From<Expr> for Operand {
    fn from(value: Expr) -> Self {
        Operand::from_symbolic(value)
    }
}

impl std::ops::Add for Operand {
    type Output = Operand;

    fn add(self, rhs: Operand) -> Operand {
        Operand::add(&self, &rhs)
    }
}

impl std::ops::Sub for Operand {
    type Output = Operand;

    fn sub(self, rhs: Operand) -> Operand {
        Operand::sub(&self, &rhs)
    }
}

impl std::ops::Mul for Operand {
    type Output = Operand;

    fn mul(self, rhs: Operand) -> Operand {
        Operand::mul(&self, &rhs)
    }
}

impl std::ops::Div for Operand {
    type Output = Operand;

    fn div(self, rhs: Operand) -> Operand {
        Operand::div(&self, &rhs)
    }
}

impl std::ops::Neg for Operand {
    type Output = Operand;

    fn neg(self) -> Operand {
        Operand::neg(&self)
    }
}
