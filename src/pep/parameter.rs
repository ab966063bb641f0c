//! # Parameter algebra
//!
//! A [`Parameter`] is a number that is resolved late. It is one of
//! - a *leaf*: a named symbol (`L`, `h`, `mu`) looked up at evaluation time,
//! - a *composite*: an operator applied to two [`Operand`]s, built by `+ - * / pow`,
//! - a *by-dict* parameter: the canonical polynomial form produced by [`Parameter::simplify`].
//!
//! The canonical form is a [`ParameterPolynomial`], a map from [`Monomial`]s (products of
//! leaves with integer exponents) to constant coefficients plus a constant offset. Two
//! Parameters are equivalent when the difference of their polynomials vanishes coefficient
//! by coefficient.
//!
//! # Example
//! ```rust, ignore
//! let a = Parameter::named("a");
//! let b = Parameter::named("b");
//! assert!(((a.clone() + b.clone()) - (b + a)).is_zero());
//! ```

use crate::pep::expression_manager::Coefficient;
use crate::pep::number::{Number, Operand};
use crate::pep::pep_error::{PepError, PepResult};
use crate::pep::utils::Op;
use crate::symbolic::symbolic_engine::Expr;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

////////////////////////////////////////////////////////////////////////////////////////
//                                   MONOMIAL
////////////////////////////////////////////////////////////////////////////////////////

/// Product of leaves with non-zero integer exponents, keyed by leaf name.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial {
    powers: BTreeMap<String, i32>,
}

impl Monomial {
    /// the empty product
    pub fn one() -> Monomial {
        Monomial::default()
    }

    pub fn leaf(name: &str) -> Monomial {
        Monomial::from_powers([(name.to_string(), 1)])
    }

    /// Merges repeated leaves and drops zero exponents.
    pub fn from_powers<I: IntoIterator<Item = (String, i32)>>(powers: I) -> Monomial {
        let mut merged: BTreeMap<String, i32> = BTreeMap::new();
        for (name, exp) in powers {
            *merged.entry(name).or_insert(0) += exp;
        }
        merged.retain(|_, exp| *exp != 0);
        Monomial { powers: merged }
    }

    pub fn powers(&self) -> &BTreeMap<String, i32> {
        &self.powers
    }

    pub fn is_one(&self) -> bool {
        self.powers.is_empty()
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        Monomial::from_powers(
            self.powers
                .iter()
                .chain(other.powers.iter())
                .map(|(name, exp)| (name.clone(), *exp)),
        )
    }

    pub fn pow(&self, k: i32) -> Monomial {
        Monomial::from_powers(self.powers.iter().map(|(name, exp)| (name.clone(), exp * k)))
    }

    pub fn evaluate<T: Coefficient>(&self, resolve_parameters: &HashMap<String, T>) -> PepResult<T> {
        let mut value = T::one();
        for (name, exp) in &self.powers {
            let base = resolve_parameters.get(name).ok_or_else(|| {
                PepError::Resolution(format!("Cannot resolve Parameter named: {}", name))
            })?;
            let factor = base.checked_powi(*exp).ok_or_else(|| {
                PepError::UnsupportedOperation(format!(
                    "zero value of {} raised to the negative power {}",
                    name, exp
                ))
            })?;
            value = value * factor;
        }
        Ok(value)
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.powers.is_empty() {
            return write!(f, "1");
        }
        let terms: Vec<String> = self
            .powers
            .iter()
            .map(|(name, exp)| {
                if *exp == 1 {
                    name.clone()
                } else {
                    format!("{}^{}", name, exp)
                }
            })
            .collect();
        write!(f, "{}", terms.join("*"))
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                              PARAMETER POLYNOMIAL
////////////////////////////////////////////////////////////////////////////////////////

/// Canonical form of a Parameter: `offset + Σ coeff * monomial`.
///
/// Coefficients and the offset are constants (numbers or symbolic expressions). Zero
/// coefficients are pruned after every ring operation.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterPolynomial {
    terms: BTreeMap<Monomial, Operand>,
    offset: Operand,
}

impl Default for ParameterPolynomial {
    fn default() -> Self {
        ParameterPolynomial {
            terms: BTreeMap::new(),
            offset: Operand::zero(),
        }
    }
}

impl ParameterPolynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(offset: Operand) -> Self {
        ParameterPolynomial {
            terms: BTreeMap::new(),
            offset,
        }
    }

    pub fn leaf(name: &str) -> Self {
        Self::from_terms([(Monomial::leaf(name), Operand::one())], Operand::zero())
    }

    pub fn from_terms<I: IntoIterator<Item = (Monomial, Operand)>>(terms: I, offset: Operand) -> Self {
        let mut poly = Self::constant(offset);
        for (monomial, coeff) in terms {
            if monomial.is_one() {
                poly.offset = poly.offset.add(&coeff);
            } else {
                let entry = poly.terms.entry(monomial).or_insert_with(Operand::zero);
                *entry = entry.add(&coeff);
            }
        }
        poly.prune();
        poly
    }

    pub fn terms(&self) -> &BTreeMap<Monomial, Operand> {
        &self.terms
    }

    pub fn offset(&self) -> &Operand {
        &self.offset
    }

    /// Coefficient of a monomial, zero when absent.
    pub fn coeff(&self, monomial: &Monomial) -> Operand {
        if monomial.is_one() {
            return self.offset.clone();
        }
        self.terms.get(monomial).cloned().unwrap_or_else(Operand::zero)
    }

    fn prune(&mut self) {
        self.terms.retain(|_, coeff| !coeff.is_zero());
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.offset.is_zero()
    }

    pub fn contains_float(&self) -> bool {
        self.offset.contains_float() || self.terms.values().any(|c| c.contains_float())
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.offset = self.offset.add(&other.offset);
        for (monomial, coeff) in &other.terms {
            let entry = out.terms.entry(monomial.clone()).or_insert_with(Operand::zero);
            *entry = entry.add(coeff);
        }
        out.prune();
        out
    }

    pub fn neg(&self) -> Self {
        ParameterPolynomial {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c.neg()))
                .collect(),
            offset: self.offset.neg(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &Operand) -> Self {
        let mut out = ParameterPolynomial {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c.mul(factor)))
                .collect(),
            offset: self.offset.mul(factor),
        };
        out.prune();
        out
    }

    /// One side must be constant.
    pub fn mul(&self, other: &Self) -> PepResult<Self> {
        if other.is_constant() {
            Ok(self.scale(&other.offset))
        } else if self.is_constant() {
            Ok(other.scale(&self.offset))
        } else {
            Err(PepError::UnsupportedOperation(format!(
                "polynomial × polynomial is not supported: ({}) * ({})",
                self, other
            )))
        }
    }

    /// The divisor must be a non-zero constant.
    pub fn div(&self, other: &Self) -> PepResult<Self> {
        if !other.is_constant() {
            return Err(PepError::UnsupportedOperation(format!(
                "division by the non-constant polynomial {} is not supported",
                other
            )));
        }
        if other.offset.is_zero() {
            return Err(PepError::UnsupportedOperation(format!(
                "division of {} by zero",
                self
            )));
        }
        let reciprocal = Operand::one().div(&other.offset);
        Ok(self.scale(&reciprocal))
    }

    /// Integer powers of constants and of single terms.
    pub fn pow(&self, exponent: &Self) -> PepResult<Self> {
        let k = match (exponent.is_constant(), exponent.offset.simplify()) {
            (true, Operand::Number(n)) => n.to_i32(),
            _ => None,
        }
        .ok_or_else(|| {
            PepError::UnsupportedOperation(format!(
                "only integer constant exponents are supported, got {}",
                exponent
            ))
        })?;
        if k == 0 {
            return Ok(Self::constant(Operand::one()));
        }
        if self.is_constant() {
            if k < 0 && self.offset.is_zero() {
                return Err(PepError::UnsupportedOperation(format!(
                    "zero raised to the negative power {}",
                    k
                )));
            }
            return Ok(Self::constant(self.offset.pow(&Operand::from(k))));
        }
        match self.terms.iter().next() {
            Some((monomial, coeff)) if self.terms.len() == 1 && self.offset.is_zero() => {
                Ok(Self::from_terms(
                    [(monomial.pow(k), coeff.pow(&Operand::from(k)))],
                    Operand::zero(),
                ))
            }
            _ => Err(PepError::UnsupportedOperation(format!(
                "power of the polynomial {} with several terms is not supported",
                self
            ))),
        }
    }

    /// Coefficient-wise comparison: every difference must simplify to zero.
    pub fn equiv(&self, other: &Self) -> bool {
        let monomials: BTreeSet<&Monomial> = self.terms.keys().chain(other.terms.keys()).collect();
        let terms_match = monomials.into_iter().all(|m| {
            let diff = self.coeff(m).sub(&other.coeff(m)).simplify();
            diff.is_zero()
        });
        terms_match && self.offset.sub(&other.offset).simplify().is_zero()
    }

    /// `offset + Σ coeff * Π leaf^exp`
    pub fn evaluate<T: Coefficient>(&self, resolve_parameters: &HashMap<String, T>) -> PepResult<T> {
        let mut value = eval_operand(&self.offset, resolve_parameters)?;
        for (monomial, coeff) in &self.terms {
            let c: T = eval_operand(coeff, resolve_parameters)?;
            value = value + c * monomial.evaluate(resolve_parameters)?;
        }
        Ok(value)
    }
}

impl fmt::Display for ParameterPolynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.offset.is_zero() {
            parts.push(self.offset.to_string());
        }
        for (monomial, coeff) in &self.terms {
            if coeff.is_one() {
                parts.push(monomial.to_string());
            } else {
                parts.push(format!("{}*{}", coeff, monomial));
            }
        }
        if parts.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", parts.join(" + "))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                   PARAMETER
////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterRepresentation {
    pub op: Op,
    pub left: Operand,
    pub right: Operand,
}

/// Expression of a Parameter without a name.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterExpression {
    Op(ParameterRepresentation),
    ByDict(ParameterPolynomial),
}

#[derive(Debug, PartialEq)]
enum ParameterKind {
    Leaf(String),
    Expression(ParameterExpression),
}

/// Immutable, cheaply cloned symbolic number with structural equality.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter(Rc<ParameterKind>);

impl Parameter {
    /// Validating constructor: exactly one of `name` and `expression` must be given.
    pub fn new(name: Option<&str>, expression: Option<ParameterExpression>) -> PepResult<Parameter> {
        match (name, expression) {
            (Some(name), None) => Ok(Parameter::named(name)),
            (None, Some(expression)) => Ok(Parameter(Rc::new(ParameterKind::Expression(expression)))),
            (None, None) => Err(PepError::Construction(
                "For a parameter, a name or an expression must be specified.".to_string(),
            )),
            (Some(name), Some(_)) => Err(PepError::Construction(format!(
                "Parameter {} cannot have both a name and an expression.",
                name
            ))),
        }
    }

    pub fn named(name: &str) -> Parameter {
        Parameter(Rc::new(ParameterKind::Leaf(name.to_string())))
    }

    pub(crate) fn composite(op: Op, left: Operand, right: Operand) -> Parameter {
        Parameter(Rc::new(ParameterKind::Expression(ParameterExpression::Op(
            ParameterRepresentation { op, left, right },
        ))))
    }

    fn by_dict(poly: ParameterPolynomial) -> Parameter {
        Parameter(Rc::new(ParameterKind::Expression(ParameterExpression::ByDict(poly))))
    }

    pub fn name(&self) -> Option<&str> {
        match self.0.as_ref() {
            ParameterKind::Leaf(name) => Some(name),
            ParameterKind::Expression(_) => None,
        }
    }

    pub fn expression(&self) -> Option<&ParameterExpression> {
        match self.0.as_ref() {
            ParameterKind::Leaf(_) => None,
            ParameterKind::Expression(expr) => Some(expr),
        }
    }

    /// `self ** exp`
    pub fn pow<R: Into<Operand>>(&self, exp: R) -> Parameter {
        Parameter::composite(Op::Pow, Operand::Parameter(self.clone()), exp.into())
    }

    pub fn contains_float(&self) -> bool {
        match self.0.as_ref() {
            ParameterKind::Leaf(_) => false,
            ParameterKind::Expression(ParameterExpression::Op(rep)) => {
                rep.left.contains_float() || rep.right.contains_float()
            }
            ParameterKind::Expression(ParameterExpression::ByDict(poly)) => poly.contains_float(),
        }
    }

    /// Recursively resolves the Parameter against a name → value map.
    pub fn get_value<T: Coefficient>(&self, resolve_parameters: &HashMap<String, T>) -> PepResult<T> {
        match self.0.as_ref() {
            ParameterKind::Leaf(name) => resolve_parameters.get(name).cloned().ok_or_else(|| {
                PepError::Resolution(format!("Cannot resolve Parameter named: {}", name))
            }),
            ParameterKind::Expression(ParameterExpression::ByDict(poly)) => {
                poly.evaluate(resolve_parameters)
            }
            ParameterKind::Expression(ParameterExpression::Op(rep)) => {
                let left: T = eval_operand(&rep.left, resolve_parameters)?;
                let right: T = eval_operand(&rep.right, resolve_parameters)?;
                apply_op(rep.op, left, right)
            }
        }
    }

    /// The canonical polynomial of this Parameter.
    pub fn polynomial(&self) -> PepResult<ParameterPolynomial> {
        match self.0.as_ref() {
            ParameterKind::Leaf(name) => Ok(ParameterPolynomial::leaf(name)),
            ParameterKind::Expression(ParameterExpression::ByDict(poly)) => Ok(poly.clone()),
            ParameterKind::Expression(ParameterExpression::Op(rep)) => {
                let left = operand_polynomial(&rep.left)?;
                let right = operand_polynomial(&rep.right)?;
                match rep.op {
                    Op::Add => Ok(left.add(&right)),
                    Op::Sub => Ok(left.sub(&right)),
                    Op::Mul => left.mul(&right),
                    Op::Div => left.div(&right),
                    Op::Pow => left.pow(&right),
                }
            }
        }
    }

    /// Flattens the expression into a by-dict Parameter. Idempotent.
    pub fn simplify(&self) -> PepResult<Parameter> {
        match self.0.as_ref() {
            ParameterKind::Expression(ParameterExpression::ByDict(_)) => Ok(self.clone()),
            _ => Ok(Parameter::by_dict(self.polynomial()?)),
        }
    }

    /// `false` also when either side cannot be simplified.
    pub fn equiv(&self, other: &Parameter) -> bool {
        match (self.polynomial(), other.polynomial()) {
            (Ok(a), Ok(b)) => a.equiv(&b),
            _ => false,
        }
    }

    /// Parameters built from constants alone are tested by evaluating them, exactly when
    /// possible, since their polynomial is the same deferred constant again.
    pub fn is_zero(&self) -> bool {
        if !self.has_leaves() {
            return match self.get_value::<Expr>(&HashMap::new()) {
                Ok(value) => value.equals_zero(),
                Err(_) => matches!(self.get_value::<f64>(&HashMap::new()), Ok(v) if v == 0.0),
            };
        }
        self.polynomial().map(|p| p.is_zero()).unwrap_or(false)
    }

    /// true if some named leaf occurs anywhere in the expression
    fn has_leaves(&self) -> bool {
        match self.0.as_ref() {
            ParameterKind::Leaf(_) => true,
            ParameterKind::Expression(ParameterExpression::ByDict(poly)) => {
                !poly.terms().is_empty() || operand_has_leaves(poly.offset())
            }
            ParameterKind::Expression(ParameterExpression::Op(rep)) => {
                operand_has_leaves(&rep.left) || operand_has_leaves(&rep.right)
            }
        }
    }
}

fn operand_has_leaves(operand: &Operand) -> bool {
    matches!(operand, Operand::Parameter(p) if p.has_leaves())
}

fn operand_polynomial(operand: &Operand) -> PepResult<ParameterPolynomial> {
    match operand {
        Operand::Parameter(p) => p.polynomial(),
        other => Ok(ParameterPolynomial::constant(other.simplify())),
    }
}

/// Resolves any operand into the coefficient type of the evaluation mode.
pub fn eval_operand<T: Coefficient>(
    operand: &Operand,
    resolve_parameters: &HashMap<String, T>,
) -> PepResult<T> {
    match operand {
        Operand::Number(n) => T::from_number(n),
        Operand::Symbolic(e) => T::from_symbolic(e),
        Operand::Parameter(p) => p.get_value(resolve_parameters),
    }
}

fn apply_op<T: Coefficient>(op: Op, left: T, right: T) -> PepResult<T> {
    match op {
        Op::Add => Ok(left + right),
        Op::Sub => Ok(left - right),
        Op::Mul => Ok(left * right),
        Op::Div => left.checked_div(&right).ok_or_else(|| {
            PepError::UnsupportedOperation(format!("division of {:?} by zero", left))
        }),
        Op::Pow => left.checked_pow(&right),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Position {
    Sub,
    Subtrahend,
    Product,
    RightFactor,
    PowBase,
    PowExponent,
}

fn parenthesize(operand: &Operand, position: Position) -> String {
    let repr = operand.to_string();
    // a leading minus right after an operator or before `**` would read as part of it
    let sign_sensitive = matches!(
        position,
        Position::Subtrahend | Position::RightFactor | Position::PowBase
    );
    let in_difference = matches!(position, Position::Sub | Position::Subtrahend);
    let wrap = match operand {
        Operand::Number(n) if n.is_negative() && sign_sensitive => true,
        Operand::Number(Number::Float(_)) => false,
        Operand::Number(Number::Rational(r)) => !r.is_integer() && !in_difference,
        Operand::Symbolic(e) => match e {
            Expr::Add(_, _) | Expr::Sub(_, _) => true,
            Expr::Mul(_, _) | Expr::Div(_, _) | Expr::Pow(_, _) => position == Position::PowBase,
            Expr::Const(c) => {
                (!c.is_integer() && !in_difference)
                    || (sign_sensitive && Number::Rational(c.clone()).is_negative())
            }
            Expr::Var(_) => false,
        },
        Operand::Parameter(p) => {
            if position == Position::PowExponent {
                return format!("{{{}}}", repr);
            }
            match p.expression() {
                None => false,
                Some(_) if position == Position::PowBase => true,
                Some(ParameterExpression::Op(rep)) => matches!(rep.op, Op::Add | Op::Sub),
                Some(ParameterExpression::ByDict(poly)) => {
                    poly.terms().len() + usize::from(!poly.offset().is_zero()) > 1
                }
            }
        }
    };
    if wrap { format!("({})", repr) } else { repr }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rep = match self.0.as_ref() {
            ParameterKind::Leaf(name) => return write!(f, "{}", name),
            ParameterKind::Expression(ParameterExpression::ByDict(poly)) => {
                return write!(f, "{}", poly);
            }
            ParameterKind::Expression(ParameterExpression::Op(rep)) => rep,
        };
        match rep.op {
            Op::Add => write!(f, "{}+{}", rep.left, rep.right),
            Op::Sub => write!(
                f,
                "{}-{}",
                parenthesize(&rep.left, Position::Sub),
                parenthesize(&rep.right, Position::Subtrahend)
            ),
            Op::Mul => write!(
                f,
                "{}*{}",
                parenthesize(&rep.left, Position::Product),
                parenthesize(&rep.right, Position::RightFactor)
            ),
            Op::Div => write!(
                f,
                "{}/{}",
                parenthesize(&rep.left, Position::Product),
                parenthesize(&rep.right, Position::RightFactor)
            ),
            Op::Pow => write!(
                f,
                "{}**{}",
                parenthesize(&rep.left, Position::PowBase),
                parenthesize(&rep.right, Position::PowExponent)
            ),
        }
    }
}

macro_rules! impl_parameter_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: Into<Operand>> std::ops::$trait<R> for Parameter {
            type Output = Parameter;

            fn $method(self, rhs: R) -> Parameter {
                Parameter::composite($op, Operand::Parameter(self), rhs.into())
            }
        }
        impl_parameter_binary_op!(@lhs $trait, $method, $op, f64, i32, Number, Operand, Expr);
    };
    (@lhs $trait:ident, $method:ident, $op:expr, $($lhs:ty),*) => {
        $(
            impl std::ops::$trait<Parameter> for $lhs {
                type Output = Parameter;

                fn $method(self, rhs: Parameter) -> Parameter {
                    Parameter::composite($op, Operand::from(self), Operand::Parameter(rhs))
                }
            }
        )*
    };
}

impl_parameter_binary_op!(Add, add, Op::Add);
impl_parameter_binary_op!(Sub, sub, Op::Sub);
impl_parameter_binary_op!(Mul, mul, Op::Mul);
impl_parameter_binary_op!(Div, div, Op::Div);

impl std::ops::Neg for Parameter {
    type Output = Parameter;

    fn neg(self) -> Parameter {
        Parameter::composite(Op::Mul, Operand::from(-1), Operand::Parameter(self))
    }
}
