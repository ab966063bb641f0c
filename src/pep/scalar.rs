//! # Scalar algebra
//!
//! A [`Scalar`] is a real number of the problem: a function value, an inner product of two
//! Vectors, or a linear combination of those with Parameter coefficients. It mirrors
//! [`Vector`]: basis Scalars have no expression, composites are `Op`, `ByBasis` or `Zero`.
//!
//! The canonical form [`ScalarByBasis`] has three parts
//! - `func_coeffs`: basis Scalar → coefficient,
//! - `inner_prod_coeffs`: unordered pair of basis Vectors → coefficient,
//! - `offset`: the constant term.

use crate::pep::expression_manager::{Coefficient, ExpressionManager};
use crate::pep::number::{Number, Operand};
use crate::pep::parameter::Parameter;
pub use crate::pep::pep_context::Scalar;
use crate::pep::pep_context::{PepContext, Vector};
use crate::pep::pep_error::{PepError, PepResult};
use crate::pep::utils::Op;
use crate::pep::vector::VectorByBasis;
use log::debug;
use nalgebra::{DMatrix, DVector};
use std::collections::{BTreeMap, HashMap};

/// Left or right side of a composite Scalar. A Vector appears only in inner products.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarOperand {
    Scalar(Scalar),
    Vector(Vector),
    Operand(Operand),
}

impl From<Scalar> for ScalarOperand {
    fn from(s: Scalar) -> Self {
        ScalarOperand::Scalar(s)
    }
}

impl From<Operand> for ScalarOperand {
    fn from(c: Operand) -> Self {
        ScalarOperand::Operand(c)
    }
}

impl From<f64> for ScalarOperand {
    fn from(c: f64) -> Self {
        ScalarOperand::Operand(c.into())
    }
}

impl From<i32> for ScalarOperand {
    fn from(c: i32) -> Self {
        ScalarOperand::Operand(c.into())
    }
}

impl From<Parameter> for ScalarOperand {
    fn from(p: Parameter) -> Self {
        ScalarOperand::Operand(p.into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarRepresentation {
    pub op: Op,
    pub left: ScalarOperand,
    pub right: ScalarOperand,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZeroScalar;

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarExpression {
    Op(ScalarRepresentation),
    ByBasis(ScalarByBasis),
    Zero(ZeroScalar),
}

/// Arena entry of a scalar.
#[derive(Clone, Debug)]
pub struct ScalarNode {
    pub is_basis: bool,
    pub expression: Option<ScalarExpression>,
    pub tags: Vec<String>,
    pub math_expr: String,
}

////////////////////////////////////////////////////////////////////////////////////////
//                                 SCALAR BY BASIS
////////////////////////////////////////////////////////////////////////////////////////

fn ordered_pair(v: Vector, w: Vector) -> (Vector, Vector) {
    if v <= w { (v, w) } else { (w, v) }
}

fn accumulate<K: Ord>(map: &mut BTreeMap<K, Operand>, key: K, c: &Operand) {
    let sum = match map.remove(&key) {
        Some(prev) => prev.add(c),
        None => c.clone(),
    };
    if !sum.is_zero() {
        map.insert(key, sum);
    }
}

fn map_coeffs<K: Ord + Copy>(
    map: &BTreeMap<K, Operand>,
    f: impl Fn(&Operand) -> Operand,
) -> BTreeMap<K, Operand> {
    map.iter()
        .map(|(k, c)| (*k, f(c)))
        .filter(|(_, c)| !c.is_zero())
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScalarByBasis {
    func_coeffs: BTreeMap<Scalar, Operand>,
    inner_prod_coeffs: BTreeMap<(Vector, Vector), Operand>,
    offset: Operand,
}

impl Default for ScalarByBasis {
    fn default() -> Self {
        ScalarByBasis {
            func_coeffs: BTreeMap::new(),
            inner_prod_coeffs: BTreeMap::new(),
            offset: Operand::zero(),
        }
    }
}

impl ScalarByBasis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basis(s: Scalar) -> Self {
        Self::from_parts([(s, Operand::one())], [], Operand::zero())
    }

    pub fn constant(offset: Operand) -> Self {
        ScalarByBasis {
            offset,
            ..Self::default()
        }
    }

    /// Inner-product keys may come in any order; they are stored as `(min, max)`.
    pub fn from_parts<F, I>(func_coeffs: F, inner_prod_coeffs: I, offset: Operand) -> Self
    where
        F: IntoIterator<Item = (Scalar, Operand)>,
        I: IntoIterator<Item = ((Vector, Vector), Operand)>,
    {
        let mut out = Self::constant(offset);
        for (s, c) in func_coeffs {
            accumulate(&mut out.func_coeffs, s, &c);
        }
        for ((v, w), c) in inner_prod_coeffs {
            accumulate(&mut out.inner_prod_coeffs, ordered_pair(v, w), &c);
        }
        out
    }

    /// Symmetrised outer product `Σ a_v b_w <v, w>`.
    pub fn outer(a: &VectorByBasis, b: &VectorByBasis) -> Self {
        let mut out = Self::new();
        for (v, c) in a.coeffs() {
            for (w, d) in b.coeffs() {
                accumulate(&mut out.inner_prod_coeffs, ordered_pair(*v, *w), &c.mul(d));
            }
        }
        out
    }

    pub fn func_coeffs(&self) -> &BTreeMap<Scalar, Operand> {
        &self.func_coeffs
    }

    pub fn inner_prod_coeffs(&self) -> &BTreeMap<(Vector, Vector), Operand> {
        &self.inner_prod_coeffs
    }

    pub fn offset(&self) -> &Operand {
        &self.offset
    }

    pub fn func_coeff(&self, s: &Scalar) -> Operand {
        self.func_coeffs.get(s).cloned().unwrap_or_else(Operand::zero)
    }

    pub fn inner_prod_coeff(&self, v: Vector, w: Vector) -> Operand {
        self.inner_prod_coeffs
            .get(&ordered_pair(v, w))
            .cloned()
            .unwrap_or_else(Operand::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.func_coeffs.is_empty() && self.inner_prod_coeffs.is_empty() && self.offset.is_zero()
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (s, c) in &other.func_coeffs {
            accumulate(&mut out.func_coeffs, *s, c);
        }
        for (k, c) in &other.inner_prod_coeffs {
            accumulate(&mut out.inner_prod_coeffs, *k, c);
        }
        out.offset = self.offset.add(&other.offset);
        out
    }

    pub fn neg(&self) -> Self {
        ScalarByBasis {
            func_coeffs: map_coeffs(&self.func_coeffs, Operand::neg),
            inner_prod_coeffs: map_coeffs(&self.inner_prod_coeffs, Operand::neg),
            offset: self.offset.neg(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &Operand) -> Self {
        ScalarByBasis {
            func_coeffs: map_coeffs(&self.func_coeffs, |c| c.mul(factor)),
            inner_prod_coeffs: map_coeffs(&self.inner_prod_coeffs, |c| c.mul(factor)),
            offset: self.offset.mul(factor),
        }
    }

    pub fn div(&self, divisor: &Operand) -> Self {
        ScalarByBasis {
            func_coeffs: map_coeffs(&self.func_coeffs, |c| c.div(divisor)),
            inner_prod_coeffs: map_coeffs(&self.inner_prod_coeffs, |c| c.div(divisor)),
            offset: self.offset.div(divisor),
        }
    }

    pub fn describe(&self, ctx: &PepContext) -> PepResult<String> {
        let mut terms = Vec::new();
        for (s, c) in &self.func_coeffs {
            terms.push(format!("{}*{}", c, s.repr(ctx)?));
        }
        for ((v, w), c) in &self.inner_prod_coeffs {
            terms.push(format!("{}*{}*{}", c, v.repr(ctx)?, w.repr(ctx)?));
        }
        if !self.offset.is_zero() {
            terms.push(self.offset.to_string());
        }
        Ok(if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                EVALUATED SCALAR
////////////////////////////////////////////////////////////////////////////////////////

/// Coordinates of a scalar: function values, the symmetric Gram matrix and the offset.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedScalar<T: Coefficient> {
    pub func_coords: DVector<T>,
    pub inner_prod_coords: DMatrix<T>,
    pub offset: T,
}

impl<T: Coefficient> EvaluatedScalar<T> {
    pub fn zero(num_basis_scalars: usize, num_basis_vectors: usize) -> Self {
        EvaluatedScalar {
            func_coords: DVector::from_element(num_basis_scalars, T::zero()),
            inner_prod_coords: DMatrix::from_element(num_basis_vectors, num_basis_vectors, T::zero()),
            offset: T::zero(),
        }
    }

    fn map(self, f: impl Fn(T) -> T) -> Self {
        EvaluatedScalar {
            func_coords: self.func_coords.map(|c| f(c).normalize()),
            inner_prod_coords: self.inner_prod_coords.map(|c| f(c).normalize()),
            offset: f(self.offset).normalize(),
        }
    }

    fn zip(self, rhs: Self, f: impl Fn(T, T) -> T) -> Self {
        EvaluatedScalar {
            func_coords: self.func_coords.zip_map(&rhs.func_coords, |a, b| f(a, b).normalize()),
            inner_prod_coords: self
                .inner_prod_coords
                .zip_map(&rhs.inner_prod_coords, |a, b| f(a, b).normalize()),
            offset: f(self.offset, rhs.offset).normalize(),
        }
    }
}

impl<T: Coefficient> std::ops::Add for EvaluatedScalar<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }
}

impl<T: Coefficient> std::ops::Sub for EvaluatedScalar<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a - b)
    }
}

impl<T: Coefficient> std::ops::Neg for EvaluatedScalar<T> {
    type Output = Self;

    fn neg(self) -> Self {
        self.map(|a| -a)
    }
}

impl<T: Coefficient> std::ops::Mul<T> for EvaluatedScalar<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        self.map(|a| a * rhs.clone())
    }
}

impl<T: Coefficient> std::ops::Div<T> for EvaluatedScalar<T> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        self.map(|a| a / rhs.clone())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                     SCALAR
////////////////////////////////////////////////////////////////////////////////////////

/// Per-call memo of canonical forms, shared between Vector and Scalar nodes.
#[derive(Default)]
pub(crate) struct CanonicalCache {
    pub vectors: HashMap<Vector, VectorByBasis>,
    pub scalars: HashMap<Scalar, ScalarByBasis>,
}

enum Canonical {
    Scalar(ScalarByBasis),
    Vector(VectorByBasis),
    Operand(Operand),
}

fn validate_representation(ctx: &PepContext, rep: &ScalarRepresentation) -> PepResult<()> {
    for side in [&rep.left, &rep.right] {
        match side {
            ScalarOperand::Scalar(s) => {
                ctx.scalar_node(*s)?;
            }
            ScalarOperand::Vector(v) => {
                ctx.vector_node(*v)?;
            }
            ScalarOperand::Operand(_) => {}
        }
    }
    use ScalarOperand::{Operand as C, Scalar as S, Vector as V};
    let shape_ok = match (rep.op, &rep.left, &rep.right) {
        (Op::Add | Op::Sub, S(_), S(_)) | (Op::Add | Op::Sub, S(_), C(_)) | (Op::Add | Op::Sub, C(_), S(_)) => true,
        (Op::Mul, S(_), C(_)) | (Op::Mul, C(_), S(_)) | (Op::Mul, V(_), V(_)) => true,
        (Op::Div, S(_), C(_)) => true,
        _ => false,
    };
    if shape_ok {
        Ok(())
    } else {
        Err(PepError::UnsupportedOperation(format!(
            "operator {} is not defined for these Scalar operands",
            rep.op
        )))
    }
}

fn describe_operand(ctx: &PepContext, operand: &ScalarOperand, parenthesized: bool) -> PepResult<String> {
    match operand {
        ScalarOperand::Scalar(s) if parenthesized => s.parenthesized_repr(ctx),
        ScalarOperand::Scalar(s) => s.repr(ctx),
        ScalarOperand::Vector(v) if parenthesized => v.parenthesized_repr(ctx),
        ScalarOperand::Vector(v) => v.repr(ctx),
        ScalarOperand::Operand(c) => Ok(c.to_string()),
    }
}

fn describe_expression(ctx: &PepContext, expression: &ScalarExpression) -> PepResult<String> {
    match expression {
        ScalarExpression::Zero(_) => Ok("0".to_string()),
        ScalarExpression::ByBasis(by_basis) => by_basis.describe(ctx),
        ScalarExpression::Op(rep) => {
            let left = describe_operand(ctx, &rep.left, !matches!(rep.op, Op::Add | Op::Sub))?;
            let right = describe_operand(ctx, &rep.right, rep.op != Op::Add)?;
            Ok(match rep.op {
                Op::Add => format!("{}+{}", left, right),
                Op::Sub => format!("{}-{}", left, right),
                Op::Div => format!("1/{}*{}", right, left),
                _ => format!("{}*{}", left, right),
            })
        }
    }
}

impl Scalar {
    ///////////////////////////////// CONSTRUCTION //////////////////////////////

    /// Validating constructor, see [`Vector::new`].
    pub fn new(
        ctx: &mut PepContext,
        is_basis: bool,
        expression: Option<ScalarExpression>,
        tags: &[&str],
    ) -> PepResult<Scalar> {
        let math_expr = match (&expression, is_basis) {
            (Some(_), true) => {
                return Err(PepError::Construction(
                    "a basis Scalar cannot have an expression".to_string(),
                ));
            }
            (None, false) => {
                return Err(PepError::Construction(
                    "a composite Scalar needs an expression".to_string(),
                ));
            }
            (None, true) => format!("s{}", ctx.next_scalar_index()),
            (Some(expr), false) => {
                if let ScalarExpression::Op(rep) = expr {
                    validate_representation(ctx, rep)?;
                }
                describe_expression(ctx, expr)?
            }
        };
        Self::push(ctx, is_basis, expression, tags, math_expr)
    }

    fn push(
        ctx: &mut PepContext,
        is_basis: bool,
        expression: Option<ScalarExpression>,
        tags: &[&str],
        math_expr: String,
    ) -> PepResult<Scalar> {
        let math_expr = tags.last().map(|t| t.to_string()).unwrap_or(math_expr);
        ctx.add_scalar(ScalarNode {
            is_basis,
            expression,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            math_expr,
        })
    }

    /// Composite with a display string computed by the caller.
    pub(crate) fn composite_with_repr(
        ctx: &mut PepContext,
        expression: ScalarExpression,
        math_expr: String,
    ) -> PepResult<Scalar> {
        if let ScalarExpression::Op(rep) = &expression {
            validate_representation(ctx, rep)?;
        }
        Self::push(ctx, false, Some(expression), &[], math_expr)
    }

    fn composite(
        ctx: &mut PepContext,
        op: Op,
        left: ScalarOperand,
        right: ScalarOperand,
        math_expr: String,
    ) -> PepResult<Scalar> {
        let expression = ScalarExpression::Op(ScalarRepresentation { op, left, right });
        Self::composite_with_repr(ctx, expression, math_expr)
    }

    pub fn basis(ctx: &mut PepContext, tags: &[&str]) -> PepResult<Scalar> {
        Scalar::new(ctx, true, None, tags)
    }

    pub fn zero(ctx: &mut PepContext) -> PepResult<Scalar> {
        Scalar::new(ctx, false, Some(ScalarExpression::Zero(ZeroScalar)), &[])
    }

    ///////////////////////////////// OPERATORS /////////////////////////////////

    /// `self + other`, other a Scalar or a number/Parameter.
    pub fn add<R: Into<ScalarOperand>>(self, ctx: &mut PepContext, other: R) -> PepResult<Scalar> {
        let other = other.into();
        let math_expr = format!("{}+{}", self.repr(ctx)?, describe_operand(ctx, &other, false)?);
        Self::composite(ctx, Op::Add, self.into(), other, math_expr)
    }

    /// `c + self`
    pub fn radd<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Scalar> {
        let c = c.into();
        let math_expr = format!("{}+{}", c, self.repr(ctx)?);
        Self::composite(ctx, Op::Add, ScalarOperand::Operand(c), self.into(), math_expr)
    }

    pub fn sub<R: Into<ScalarOperand>>(self, ctx: &mut PepContext, other: R) -> PepResult<Scalar> {
        let other = other.into();
        let math_expr = format!("{}-{}", self.repr(ctx)?, describe_operand(ctx, &other, true)?);
        Self::composite(ctx, Op::Sub, self.into(), other, math_expr)
    }

    /// `c - self`
    pub fn rsub<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Scalar> {
        let c = c.into();
        let math_expr = format!("{}-{}", c, self.parenthesized_repr(ctx)?);
        Self::composite(ctx, Op::Sub, ScalarOperand::Operand(c), self.into(), math_expr)
    }

    pub fn mul<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Scalar> {
        let c = c.into();
        let math_expr = format!("{}*{}", self.parenthesized_repr(ctx)?, c);
        Self::composite(ctx, Op::Mul, self.into(), ScalarOperand::Operand(c), math_expr)
    }

    pub fn rmul<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Scalar> {
        let c = c.into();
        let math_expr = format!("{}*{}", c, self.parenthesized_repr(ctx)?);
        Self::composite(ctx, Op::Mul, ScalarOperand::Operand(c), self.into(), math_expr)
    }

    pub fn div<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Scalar> {
        let c = c.into();
        let math_expr = format!("1/{}*{}", c, self.parenthesized_repr(ctx)?);
        Self::composite(ctx, Op::Div, self.into(), ScalarOperand::Operand(c), math_expr)
    }

    /// `-self`, stored as `(-1)*self`
    pub fn neg(self, ctx: &mut PepContext) -> PepResult<Scalar> {
        let math_expr = format!("-{}", self.parenthesized_repr(ctx)?);
        Self::composite(
            ctx,
            Op::Mul,
            ScalarOperand::Operand(Operand::Number(Number::int(-1))),
            self.into(),
            math_expr,
        )
    }

    ///////////////////////////////// TAGS //////////////////////////////////////

    pub fn add_tag(self, ctx: &mut PepContext, tag: &str) -> PepResult<Scalar> {
        ctx.add_tag_to_vectors_or_scalars(tag, self.into())?;
        ctx.scalar_node_mut(self)?.tags.push(tag.to_string());
        Ok(self)
    }

    pub fn tag(self, ctx: &PepContext) -> PepResult<String> {
        ctx.scalar_node(self)?
            .tags
            .last()
            .cloned()
            .ok_or_else(|| PepError::Tag("This Scalar object doesn't have a tag.".to_string()))
    }

    pub fn tags(self, ctx: &PepContext) -> PepResult<Vec<String>> {
        Ok(ctx.scalar_node(self)?.tags.clone())
    }

    pub fn repr(self, ctx: &PepContext) -> PepResult<String> {
        let node = ctx.scalar_node(self)?;
        Ok(node.tags.last().cloned().unwrap_or_else(|| node.math_expr.clone()))
    }

    pub(crate) fn parenthesized_repr(self, ctx: &PepContext) -> PepResult<String> {
        let node = ctx.scalar_node(self)?;
        let repr = self.repr(ctx)?;
        let is_sum = matches!(
            &node.expression,
            Some(ScalarExpression::Op(rep)) if matches!(rep.op, Op::Add | Op::Sub)
        );
        Ok(if is_sum && node.tags.is_empty() {
            format!("({})", repr)
        } else {
            repr
        })
    }

    pub fn is_basis(self, ctx: &PepContext) -> PepResult<bool> {
        Ok(ctx.scalar_node(self)?.is_basis)
    }

    pub fn expression(self, ctx: &PepContext) -> PepResult<Option<&ScalarExpression>> {
        Ok(ctx.scalar_node(self)?.expression.as_ref())
    }

    ///////////////////////////////// CANONICAL FORM ////////////////////////////

    pub fn canonical(self, ctx: &PepContext) -> PepResult<ScalarByBasis> {
        let mut cache = CanonicalCache::default();
        let result = self.canonical_cached(ctx, &mut cache)?;
        debug!(
            "canonicalized Scalar {} into {} function and {} inner product terms",
            self.repr(ctx)?,
            result.func_coeffs().len(),
            result.inner_prod_coeffs().len()
        );
        Ok(result)
    }

    pub(crate) fn canonical_cached(
        self,
        ctx: &PepContext,
        cache: &mut CanonicalCache,
    ) -> PepResult<ScalarByBasis> {
        if let Some(done) = cache.scalars.get(&self) {
            return Ok(done.clone());
        }
        let node = ctx.scalar_node(self)?;
        let result = match &node.expression {
            None => ScalarByBasis::basis(self),
            Some(ScalarExpression::Zero(_)) => ScalarByBasis::new(),
            Some(ScalarExpression::ByBasis(by_basis)) => by_basis.clone(),
            Some(ScalarExpression::Op(rep)) => {
                let left = Self::canonical_operand(&rep.left, ctx, cache)?;
                let right = Self::canonical_operand(&rep.right, ctx, cache)?;
                use Canonical::{Operand as C, Scalar as S, Vector as V};
                match (rep.op, left, right) {
                    (Op::Add, S(a), S(b)) => a.add(&b),
                    (Op::Add, S(a), C(c)) => a.add(&ScalarByBasis::constant(c)),
                    (Op::Add, C(c), S(a)) => ScalarByBasis::constant(c).add(&a),
                    (Op::Sub, S(a), S(b)) => a.sub(&b),
                    (Op::Sub, S(a), C(c)) => a.sub(&ScalarByBasis::constant(c)),
                    (Op::Sub, C(c), S(a)) => ScalarByBasis::constant(c).sub(&a),
                    (Op::Mul, S(a), C(c)) | (Op::Mul, C(c), S(a)) => a.scale(&c),
                    (Op::Mul, V(a), V(b)) => ScalarByBasis::outer(&a, &b),
                    (Op::Div, S(a), C(c)) => a.div(&c),
                    (op, _, _) => unreachable!("Scalar operator {} with invalid operands", op),
                }
            }
        };
        cache.scalars.insert(self, result.clone());
        Ok(result)
    }

    fn canonical_operand(
        operand: &ScalarOperand,
        ctx: &PepContext,
        cache: &mut CanonicalCache,
    ) -> PepResult<Canonical> {
        match operand {
            ScalarOperand::Scalar(s) => Ok(Canonical::Scalar(s.canonical_cached(ctx, cache)?)),
            ScalarOperand::Vector(v) => {
                Ok(Canonical::Vector(v.canonical_cached(ctx, &mut cache.vectors)?))
            }
            ScalarOperand::Operand(c) => Ok(Canonical::Operand(c.clone())),
        }
    }

    pub fn simplify(self, ctx: &mut PepContext, tag: Option<&str>) -> PepResult<Scalar> {
        let by_basis = self.canonical(ctx)?;
        let math_expr = by_basis.describe(ctx)?;
        let tags: Vec<&str> = tag.into_iter().collect();
        Self::push(
            ctx,
            false,
            Some(ScalarExpression::ByBasis(by_basis)),
            &tags,
            math_expr,
        )
    }

    ///////////////////////////////// EVALUATION ////////////////////////////////

    pub fn eval<T: Coefficient>(
        self,
        ctx: &PepContext,
        resolve_parameters: &HashMap<String, T>,
    ) -> PepResult<EvaluatedScalar<T>> {
        ExpressionManager::new(ctx, resolve_parameters.clone()).eval_scalar(self)
    }

    pub fn repr_by_basis<T: Coefficient>(
        self,
        ctx: &PepContext,
        resolve_parameters: &HashMap<String, T>,
        greedy_square: bool,
    ) -> PepResult<String> {
        ExpressionManager::new(ctx, resolve_parameters.clone())
            .repr_scalar_by_basis(self, greedy_square)
    }
}
