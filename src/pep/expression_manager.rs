//! # Evaluation layer
//!
//! [`ExpressionManager`] turns canonical forms into coordinates against the basis of one
//! [`PepContext`]:
//! - a Vector becomes a column of length `#basis vectors`,
//! - a Scalar becomes function coordinates, a symmetric Gram matrix and an offset.
//!
//! The evaluation mode is the coefficient type. `f64` is floating point, [`Expr`] is exact
//! symbolic arithmetic (the `sympy_mode` of the configuration). Both implement
//! [`Coefficient`].
//!
//! # Example
//! ```rust, ignore
//! let params = HashMap::from([("h".to_string(), 0.5)]);
//! let em = ExpressionManager::new(&ctx, params);
//! let x1 = em.eval_vector(x1)?;          // EvaluatedVector<f64>
//! let text = em.repr_vector_by_basis(x1)?; // "x_0 - 0.5*grad_x_0"
//! ```

use crate::pep::number::{Number, Operand};
use crate::pep::parameter::eval_operand;
use crate::pep::pep_context::{PepContext, Scalar, Vector};
use crate::pep::pep_error::{PepError, PepResult};
use crate::pep::scalar::EvaluatedScalar;
use crate::pep::utils::{join_terms, numerical_str};
use crate::pep::vector::EvaluatedVector;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::SymbolicType;
use log::info;
use num_traits::Signed;
use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Coefficient field of an evaluation mode.
pub trait Coefficient:
    nalgebra::Scalar
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// true for exact arithmetic
    const EXACT: bool;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_number(n: &Number) -> PepResult<Self>;
    fn from_symbolic(e: &Expr) -> PepResult<Self>;
    /// `None` for a zero divisor
    fn checked_div(&self, rhs: &Self) -> Option<Self>;
    fn checked_pow(&self, exp: &Self) -> PepResult<Self>;
    /// `None` for zero raised to a negative power
    fn checked_powi(&self, k: i32) -> Option<Self>;
    /// Coefficients that `repr_by_basis` leaves out.
    fn is_negligible(&self) -> bool;
    /// Canonical representative; exact mode simplifies here.
    fn normalize(self) -> Self;
    /// `"+ 2*x "`, `"- x "` or `""`, to be joined by [`join_terms`].
    fn format_term(&self, tag: &str) -> String;
    fn format_constant(&self) -> String;
}

fn zero_to_negative_power<T: std::fmt::Debug>(base: &T, exp: &T) -> PepError {
    PepError::UnsupportedOperation(format!("{:?} raised to the negative power {:?}", base, exp))
}

impl Coefficient for f64 {
    const EXACT: bool = false;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_number(n: &Number) -> PepResult<Self> {
        Ok(n.to_f64())
    }

    fn from_symbolic(e: &Expr) -> PepResult<Self> {
        SymbolicType::to_f64(e).ok_or_else(|| {
            PepError::Usage(format!(
                "symbolic coefficient {} cannot be evaluated in floating point mode (free symbols: {:?})",
                e,
                e.free_symbols()
            ))
        })
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if *rhs == 0.0 { None } else { Some(self / rhs) }
    }

    fn checked_pow(&self, exp: &Self) -> PepResult<Self> {
        if *self == 0.0 && *exp < 0.0 {
            return Err(zero_to_negative_power(self, exp));
        }
        Ok(self.powf(*exp))
    }

    fn checked_powi(&self, k: i32) -> Option<Self> {
        if *self == 0.0 && k < 0 {
            None
        } else {
            Some(f64::powi(*self, k))
        }
    }

    fn is_negligible(&self) -> bool {
        self.abs() < 1e-5
    }

    fn normalize(self) -> Self {
        self
    }

    fn format_term(&self, tag: &str) -> String {
        let sign = if *self < 0.0 { "-" } else { "+" };
        let magnitude = self.abs();
        if (magnitude - 1.0).abs() <= 1e-9 {
            format!("{} {} ", sign, tag)
        } else if self.is_negligible() {
            String::new()
        } else {
            format!("{} {}*{} ", sign, numerical_str(magnitude), tag)
        }
    }

    fn format_constant(&self) -> String {
        if self.is_negligible() {
            return String::new();
        }
        let sign = if *self < 0.0 { "-" } else { "+" };
        format!("{} {} ", sign, numerical_str(self.abs()))
    }
}

/// Sign and magnitude of a simplified exact coefficient, `None` when it is zero.
fn exact_sign_and_magnitude(value: &Expr) -> Option<(&'static str, String)> {
    let simplified = value.simplify_();
    if let Some(r) = simplified.to_rational() {
        if r == num::BigRational::from_integer(0.into()) {
            return None;
        }
        let sign = if r.is_negative() { "-" } else { "+" };
        return Some((sign, r.abs().to_string()));
    }
    let text = simplified.to_string();
    Some(match text.strip_prefix('-') {
        Some(rest) => ("-", rest.to_string()),
        None => ("+", text),
    })
}

impl Coefficient for Expr {
    const EXACT: bool = true;

    fn zero() -> Self {
        Expr::int(0)
    }

    fn one() -> Self {
        Expr::int(1)
    }

    fn from_number(n: &Number) -> PepResult<Self> {
        n.to_expr().ok_or_else(|| {
            PepError::Usage(format!(
                "float {} found while evaluating in exact (sympy) mode; use exact rationals",
                n
            ))
        })
    }

    fn from_symbolic(e: &Expr) -> PepResult<Self> {
        Ok(SymbolicType::simplify(e))
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.equals_zero() {
            None
        } else {
            Some((self.clone() / rhs.clone()).simplify_())
        }
    }

    fn checked_pow(&self, exp: &Self) -> PepResult<Self> {
        let negative_exp = exp.to_rational().map(|r| r.is_negative()).unwrap_or(false);
        if negative_exp && self.equals_zero() {
            return Err(zero_to_negative_power(self, exp));
        }
        Ok(self.clone().pow(exp.clone()).simplify_())
    }

    fn checked_powi(&self, k: i32) -> Option<Self> {
        if k < 0 && self.equals_zero() {
            None
        } else {
            Some(self.clone().pow(Expr::int(k as i64)).simplify_())
        }
    }

    fn is_negligible(&self) -> bool {
        SymbolicType::is_zero(self)
    }

    fn normalize(self) -> Self {
        self.simplify_()
    }

    fn format_term(&self, tag: &str) -> String {
        match exact_sign_and_magnitude(self) {
            None => String::new(),
            Some((sign, magnitude)) if magnitude == "1" => format!("{} {} ", sign, tag),
            Some((sign, magnitude)) => format!("{} {}*{} ", sign, magnitude, tag),
        }
    }

    fn format_constant(&self) -> String {
        match exact_sign_and_magnitude(self) {
            None => String::new(),
            Some((sign, magnitude)) => format!("{} {} ", sign, magnitude),
        }
    }
}

//////////////////////////////////////////////////////////////////////////////////////////

/// Evaluator bound to one context and one parameter resolution.
pub struct ExpressionManager<'ctx, T: Coefficient> {
    ctx: &'ctx PepContext,
    resolve_parameters: HashMap<String, T>,
    basis_vectors: Vec<Vector>,
    basis_scalars: Vec<Scalar>,
    vector_index: HashMap<Vector, usize>,
    scalar_index: HashMap<Scalar, usize>,
}

impl<'ctx, T: Coefficient> ExpressionManager<'ctx, T> {
    /// Snapshots the basis of `ctx` in construction order.
    pub fn new(ctx: &'ctx PepContext, resolve_parameters: HashMap<String, T>) -> Self {
        let basis_vectors = ctx.basis_vectors().to_vec();
        let basis_scalars = ctx.basis_scalars().to_vec();
        let vector_index = basis_vectors.iter().enumerate().map(|(i, v)| (*v, i)).collect();
        let scalar_index = basis_scalars.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        ExpressionManager {
            ctx,
            resolve_parameters,
            basis_vectors,
            basis_scalars,
            vector_index,
            scalar_index,
        }
    }

    pub fn num_basis_vectors(&self) -> usize {
        self.basis_vectors.len()
    }

    pub fn num_basis_scalars(&self) -> usize {
        self.basis_scalars.len()
    }

    fn resolve(&self, c: &Operand) -> PepResult<T> {
        Ok(eval_operand::<T>(c, &self.resolve_parameters)?.normalize())
    }

    fn vector_slot(&self, v: &Vector) -> PepResult<usize> {
        self.vector_index.get(v).copied().ok_or_else(|| {
            PepError::Internal(format!(
                "basis vector {} is missing from the basis of context {}",
                v.index(),
                self.ctx.name()
            ))
        })
    }

    fn scalar_slot(&self, s: &Scalar) -> PepResult<usize> {
        self.scalar_index.get(s).copied().ok_or_else(|| {
            PepError::Internal(format!(
                "basis scalar {} is missing from the basis of context {}",
                s.index(),
                self.ctx.name()
            ))
        })
    }

    pub fn eval_vector(&self, v: Vector) -> PepResult<EvaluatedVector<T>> {
        let by_basis = v.canonical(self.ctx)?;
        let mut result = EvaluatedVector::<T>::zero(self.num_basis_vectors());
        for (basis, c) in by_basis.coeffs() {
            let i = self.vector_slot(basis)?;
            result.coords[i] = result.coords[i].clone() + self.resolve(c)?;
        }
        result.coords.apply(|c| *c = c.clone().normalize());
        info!(
            "evaluated Vector {} against {} basis vectors (exact: {})",
            v.repr(self.ctx)?,
            self.num_basis_vectors(),
            T::EXACT
        );
        Ok(result)
    }

    pub fn eval_scalar(&self, s: Scalar) -> PepResult<EvaluatedScalar<T>> {
        let by_basis = s.canonical(self.ctx)?;
        let mut result = EvaluatedScalar::<T>::zero(self.num_basis_scalars(), self.num_basis_vectors());
        for (basis, c) in by_basis.func_coeffs() {
            let i = self.scalar_slot(basis)?;
            result.func_coords[i] = result.func_coords[i].clone() + self.resolve(c)?;
        }
        let two = T::one() + T::one();
        for ((v, w), c) in by_basis.inner_prod_coeffs() {
            let i = self.vector_slot(v)?;
            let j = self.vector_slot(w)?;
            let value = self.resolve(c)?;
            if i == j {
                result.inner_prod_coords[(i, i)] = result.inner_prod_coords[(i, i)].clone() + value;
            } else {
                let half = value / two.clone();
                result.inner_prod_coords[(i, j)] =
                    result.inner_prod_coords[(i, j)].clone() + half.clone();
                result.inner_prod_coords[(j, i)] = result.inner_prod_coords[(j, i)].clone() + half;
            }
        }
        result.offset = self.resolve(by_basis.offset())?;
        result.func_coords.apply(|c| *c = c.clone().normalize());
        result.inner_prod_coords.apply(|c| *c = c.clone().normalize());
        info!(
            "evaluated Scalar {} against {} basis scalars and {} basis vectors (exact: {})",
            s.repr(self.ctx)?,
            self.num_basis_scalars(),
            self.num_basis_vectors(),
            T::EXACT
        );
        Ok(result)
    }

    /// Linear combination of the basis tags, e.g. `x_0 - 0.5*grad_x_0`.
    pub fn repr_vector_by_basis(&self, v: Vector) -> PepResult<String> {
        let evaluated = self.eval_vector(v)?;
        let mut terms = Vec::with_capacity(self.num_basis_vectors());
        for (i, basis) in self.basis_vectors.iter().enumerate() {
            terms.push(evaluated.coords[i].format_term(&basis.repr(self.ctx)?));
        }
        Ok(join_terms(terms))
    }

    /// Function terms, then upper-triangular inner products, then the offset.
    /// A diagonal term prints `|p|^2` with `greedy_square`, `p*p` without.
    pub fn repr_scalar_by_basis(&self, s: Scalar, greedy_square: bool) -> PepResult<String> {
        let evaluated = self.eval_scalar(s)?;
        let mut terms = Vec::new();
        for (i, basis) in self.basis_scalars.iter().enumerate() {
            terms.push(evaluated.func_coords[i].format_term(&basis.repr(self.ctx)?));
        }
        let n = self.num_basis_vectors();
        let m = &evaluated.inner_prod_coords;
        for i in 0..n {
            let p_i = self.basis_vectors[i].repr(self.ctx)?;
            for j in i..n {
                if i == j {
                    let tag = if greedy_square {
                        format!("|{}|^2", p_i)
                    } else {
                        format!("{}*{}", p_i, p_i)
                    };
                    terms.push(m[(i, i)].format_term(&tag));
                } else {
                    let p_j = self.basis_vectors[j].repr(self.ctx)?;
                    let c = (m[(i, j)].clone() + m[(j, i)].clone()).normalize();
                    terms.push(c.format_term(&format!("{}*{}", p_i, p_j)));
                }
            }
        }
        terms.push(evaluated.offset.format_constant());
        Ok(join_terms(terms))
    }
}
