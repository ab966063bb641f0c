//! # Vector algebra
//!
//! A [`Vector`] is an element of an abstract inner-product space: a point, a gradient, a
//! linear combination of those. Basis vectors carry no expression; every other vector is
//! - `Op`: an operator applied to vectors and coefficients (`x + y`, `h*g`, `1/L*g`),
//! - `ByBasis`: an explicit linear combination of basis vectors,
//! - `Zero`.
//!
//! Operators never evaluate anything; they push a new node into the [`PepContext`] and return
//! its handle. [`Vector::canonical`] flattens a tree into a [`VectorByBasis`] and the evaluation
//! layer turns that into coordinates.
//!
//! # Example
//! ```rust, ignore
//! let mut ctx = PepContext::new("gd");
//! let x0 = Vector::basis(&mut ctx, &["x_0"])?;
//! let g0 = Vector::basis(&mut ctx, &["grad_x_0"])?;
//! let x1 = g0.mul(&mut ctx, Parameter::named("h"))?;
//! let x1 = x0.sub(&mut ctx, x1)?;
//! assert_eq!(x1.repr(&ctx)?, "x_0-grad_x_0*h");
//! ```

use crate::pep::expression_manager::{Coefficient, ExpressionManager};
use crate::pep::number::{Number, Operand};
use crate::pep::pep_context::{PepContext, Scalar};
pub use crate::pep::pep_context::Vector;
use crate::pep::pep_error::{PepError, PepResult};
use crate::pep::scalar::{ScalarOperand, ScalarRepresentation, ScalarExpression};
use crate::pep::utils::Op;
use log::debug;
use nalgebra::DVector;
use std::collections::{BTreeMap, HashMap};

/// Left or right side of a composite Vector.
#[derive(Clone, Debug, PartialEq)]
pub enum VectorOperand {
    Vector(Vector),
    Operand(Operand),
}

impl From<Vector> for VectorOperand {
    fn from(v: Vector) -> Self {
        VectorOperand::Vector(v)
    }
}

impl From<Operand> for VectorOperand {
    fn from(c: Operand) -> Self {
        VectorOperand::Operand(c)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VectorRepresentation {
    pub op: Op,
    pub left: VectorOperand,
    pub right: VectorOperand,
}

/// Marker expression of the zero vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZeroVector;

#[derive(Clone, Debug, PartialEq)]
pub enum VectorExpression {
    Op(VectorRepresentation),
    ByBasis(VectorByBasis),
    Zero(ZeroVector),
}

/// Arena entry of a vector.
#[derive(Clone, Debug)]
pub struct VectorNode {
    pub is_basis: bool,
    pub expression: Option<VectorExpression>,
    pub tags: Vec<String>,
    pub math_expr: String,
}

////////////////////////////////////////////////////////////////////////////////////////
//                                 VECTOR BY BASIS
////////////////////////////////////////////////////////////////////////////////////////

/// Linear combination of basis vectors. The empty map is zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorByBasis {
    coeffs: BTreeMap<Vector, Operand>,
}

impl VectorByBasis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basis(v: Vector) -> Self {
        Self::from_coeffs([(v, Operand::one())])
    }

    pub fn from_coeffs<I: IntoIterator<Item = (Vector, Operand)>>(coeffs: I) -> Self {
        let mut out = Self::default();
        for (v, c) in coeffs {
            out.add_term(v, &c);
        }
        out
    }

    pub fn coeffs(&self) -> &BTreeMap<Vector, Operand> {
        &self.coeffs
    }

    pub fn coeff(&self, v: &Vector) -> Operand {
        self.coeffs.get(v).cloned().unwrap_or_else(Operand::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    fn add_term(&mut self, v: Vector, c: &Operand) {
        let entry = self.coeffs.entry(v).or_insert_with(Operand::zero);
        *entry = entry.add(c);
        if entry.is_zero() {
            self.coeffs.remove(&v);
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (v, c) in &other.coeffs {
            out.add_term(*v, c);
        }
        out
    }

    pub fn neg(&self) -> Self {
        VectorByBasis {
            coeffs: self.coeffs.iter().map(|(v, c)| (*v, c.neg())).collect(),
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &Operand) -> Self {
        let mut coeffs = BTreeMap::new();
        for (v, c) in &self.coeffs {
            let scaled = c.mul(factor);
            if !scaled.is_zero() {
                coeffs.insert(*v, scaled);
            }
        }
        VectorByBasis { coeffs }
    }

    pub fn div(&self, divisor: &Operand) -> Self {
        VectorByBasis {
            coeffs: self.coeffs.iter().map(|(v, c)| (*v, c.div(divisor))).collect(),
        }
    }

    /// `c*x + d*y` with the tags (or expressions) of the basis vectors; `0` when empty.
    pub fn describe(&self, ctx: &PepContext) -> PepResult<String> {
        let mut terms = Vec::with_capacity(self.coeffs.len());
        for (v, c) in &self.coeffs {
            terms.push(format!("{}*{}", c, v.repr(ctx)?));
        }
        Ok(if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                EVALUATED VECTOR
////////////////////////////////////////////////////////////////////////////////////////

/// Coordinates of a vector against the basis of a context.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluatedVector<T: Coefficient> {
    pub coords: DVector<T>,
}

impl<T: Coefficient> EvaluatedVector<T> {
    pub fn zero(num_basis_vectors: usize) -> Self {
        EvaluatedVector {
            coords: DVector::from_element(num_basis_vectors, T::zero()),
        }
    }

    fn normalized(coords: DVector<T>) -> Self {
        EvaluatedVector {
            coords: coords.map(|c| c.normalize()),
        }
    }
}

impl<T: Coefficient> std::ops::Add for EvaluatedVector<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::normalized(self.coords.zip_map(&rhs.coords, |a, b| a + b))
    }
}

impl<T: Coefficient> std::ops::Sub for EvaluatedVector<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::normalized(self.coords.zip_map(&rhs.coords, |a, b| a - b))
    }
}

impl<T: Coefficient> std::ops::Neg for EvaluatedVector<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::normalized(self.coords.map(|a| -a))
    }
}

impl<T: Coefficient> std::ops::Mul<T> for EvaluatedVector<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::normalized(self.coords.map(|a| a * rhs.clone()))
    }
}

impl<T: Coefficient> std::ops::Div<T> for EvaluatedVector<T> {
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        Self::normalized(self.coords.map(|a| a / rhs.clone()))
    }
}

////////////////////////////////////////////////////////////////////////////////////////
//                                     VECTOR
////////////////////////////////////////////////////////////////////////////////////////

fn validate_representation(ctx: &PepContext, rep: &VectorRepresentation) -> PepResult<()> {
    for side in [&rep.left, &rep.right] {
        if let VectorOperand::Vector(v) = side {
            ctx.vector_node(*v)?;
        }
    }
    let shape_ok = match (&rep.left, &rep.right) {
        (VectorOperand::Vector(_), VectorOperand::Vector(_)) => matches!(rep.op, Op::Add | Op::Sub),
        (VectorOperand::Vector(_), VectorOperand::Operand(_)) => matches!(rep.op, Op::Mul | Op::Div),
        (VectorOperand::Operand(_), VectorOperand::Vector(_)) => rep.op == Op::Mul,
        (VectorOperand::Operand(_), VectorOperand::Operand(_)) => false,
    };
    if shape_ok {
        Ok(())
    } else {
        Err(PepError::UnsupportedOperation(format!(
            "operator {} is not defined for these Vector operands",
            rep.op
        )))
    }
}

fn describe_operand(ctx: &PepContext, operand: &VectorOperand, parenthesized: bool) -> PepResult<String> {
    match operand {
        VectorOperand::Vector(v) if parenthesized => v.parenthesized_repr(ctx),
        VectorOperand::Vector(v) => v.repr(ctx),
        VectorOperand::Operand(c) => Ok(c.to_string()),
    }
}

fn describe_expression(ctx: &PepContext, expression: &VectorExpression) -> PepResult<String> {
    match expression {
        VectorExpression::Zero(_) => Ok("0".to_string()),
        VectorExpression::ByBasis(by_basis) => by_basis.describe(ctx),
        VectorExpression::Op(rep) => {
            let left = describe_operand(ctx, &rep.left, rep.op != Op::Add)?;
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

enum Canonical {
    Vector(VectorByBasis),
    Operand(Operand),
}

impl Vector {
    ///////////////////////////////// CONSTRUCTION //////////////////////////////

    /// Validating constructor.
    ///
    /// A basis vector has no expression, any other vector has one; composite expressions must
    /// combine operands of the right kinds (`Vector ± Vector`, `Vector * c`, `c * Vector`,
    /// `Vector / c`).
    pub fn new(
        ctx: &mut PepContext,
        is_basis: bool,
        expression: Option<VectorExpression>,
        tags: &[&str],
    ) -> PepResult<Vector> {
        let math_expr = match (&expression, is_basis) {
            (Some(_), true) => {
                return Err(PepError::Construction(
                    "a basis Vector cannot have an expression".to_string(),
                ));
            }
            (None, false) => {
                return Err(PepError::Construction(
                    "a composite Vector needs an expression".to_string(),
                ));
            }
            (None, true) => format!("v{}", ctx.next_vector_index()),
            (Some(expr), false) => {
                if let VectorExpression::Op(rep) = expr {
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
        expression: Option<VectorExpression>,
        tags: &[&str],
        math_expr: String,
    ) -> PepResult<Vector> {
        let math_expr = tags.last().map(|t| t.to_string()).unwrap_or(math_expr);
        ctx.add_vector(VectorNode {
            is_basis,
            expression,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            math_expr,
        })
    }

    fn composite(
        ctx: &mut PepContext,
        op: Op,
        left: VectorOperand,
        right: VectorOperand,
        math_expr: String,
    ) -> PepResult<Vector> {
        let rep = VectorRepresentation { op, left, right };
        validate_representation(ctx, &rep)?;
        Self::push(ctx, false, Some(VectorExpression::Op(rep)), &[], math_expr)
    }

    pub fn basis(ctx: &mut PepContext, tags: &[&str]) -> PepResult<Vector> {
        Vector::new(ctx, true, None, tags)
    }

    pub fn zero(ctx: &mut PepContext) -> PepResult<Vector> {
        Vector::new(ctx, false, Some(VectorExpression::Zero(ZeroVector)), &[])
    }

    ///////////////////////////////// OPERATORS /////////////////////////////////

    pub fn add(self, ctx: &mut PepContext, other: Vector) -> PepResult<Vector> {
        let math_expr = format!("{}+{}", self.repr(ctx)?, other.repr(ctx)?);
        Self::composite(ctx, Op::Add, self.into(), other.into(), math_expr)
    }

    pub fn sub(self, ctx: &mut PepContext, other: Vector) -> PepResult<Vector> {
        let math_expr = format!("{}-{}", self.repr(ctx)?, other.parenthesized_repr(ctx)?);
        Self::composite(ctx, Op::Sub, self.into(), other.into(), math_expr)
    }

    /// `self * c`
    pub fn mul<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Vector> {
        let c = c.into();
        let math_expr = format!("{}*{}", self.parenthesized_repr(ctx)?, c);
        Self::composite(ctx, Op::Mul, self.into(), VectorOperand::Operand(c), math_expr)
    }

    /// `c * self`
    pub fn rmul<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Vector> {
        let c = c.into();
        let math_expr = format!("{}*{}", c, self.parenthesized_repr(ctx)?);
        Self::composite(ctx, Op::Mul, VectorOperand::Operand(c), self.into(), math_expr)
    }

    /// `self / c`, printed `1/c*self`
    pub fn div<C: Into<Operand>>(self, ctx: &mut PepContext, c: C) -> PepResult<Vector> {
        let c = c.into();
        let math_expr = format!("1/{}*{}", c, self.parenthesized_repr(ctx)?);
        Self::composite(ctx, Op::Div, self.into(), VectorOperand::Operand(c), math_expr)
    }

    /// `-self`, stored as `(-1)*self`
    pub fn neg(self, ctx: &mut PepContext) -> PepResult<Vector> {
        let math_expr = format!("-{}", self.parenthesized_repr(ctx)?);
        Self::composite(
            ctx,
            Op::Mul,
            VectorOperand::Operand(Operand::Number(Number::int(-1))),
            self.into(),
            math_expr,
        )
    }

    /// Inner product, a Scalar.
    pub fn inner(self, ctx: &mut PepContext, other: Vector) -> PepResult<Scalar> {
        let math_expr = format!(
            "{}*{}",
            self.parenthesized_repr(ctx)?,
            other.parenthesized_repr(ctx)?
        );
        self.inner_with_repr(ctx, other, math_expr)
    }

    /// Only the square `|v|^2` is defined.
    pub fn pow(self, ctx: &mut PepContext, power: i32) -> PepResult<Scalar> {
        if power != 2 {
            return Err(PepError::UnsupportedOperation(format!(
                "Vector power {} is not supported, only 2",
                power
            )));
        }
        let math_expr = format!("|{}|^{}", self.repr(ctx)?, power);
        self.inner_with_repr(ctx, self, math_expr)
    }

    fn inner_with_repr(self, ctx: &mut PepContext, other: Vector, math_expr: String) -> PepResult<Scalar> {
        Scalar::composite_with_repr(
            ctx,
            ScalarExpression::Op(ScalarRepresentation {
                op: Op::Mul,
                left: ScalarOperand::Vector(self),
                right: ScalarOperand::Vector(other),
            }),
            math_expr,
        )
    }

    ///////////////////////////////// TAGS //////////////////////////////////////

    pub fn add_tag(self, ctx: &mut PepContext, tag: &str) -> PepResult<Vector> {
        ctx.add_tag_to_vectors_or_scalars(tag, self.into())?;
        ctx.vector_node_mut(self)?.tags.push(tag.to_string());
        Ok(self)
    }

    /// The most recently added tag.
    pub fn tag(self, ctx: &PepContext) -> PepResult<String> {
        ctx.vector_node(self)?
            .tags
            .last()
            .cloned()
            .ok_or_else(|| PepError::Tag("This Vector object doesn't have a tag.".to_string()))
    }

    pub fn tags(self, ctx: &PepContext) -> PepResult<Vec<String>> {
        Ok(ctx.vector_node(self)?.tags.clone())
    }

    /// The most recent tag, else the expression recorded at construction.
    pub fn repr(self, ctx: &PepContext) -> PepResult<String> {
        let node = ctx.vector_node(self)?;
        Ok(node.tags.last().cloned().unwrap_or_else(|| node.math_expr.clone()))
    }

    /// `(x+y)` for untagged sums and differences, `repr` otherwise.
    pub(crate) fn parenthesized_repr(self, ctx: &PepContext) -> PepResult<String> {
        let node = ctx.vector_node(self)?;
        let repr = self.repr(ctx)?;
        let is_sum = matches!(
            &node.expression,
            Some(VectorExpression::Op(rep)) if matches!(rep.op, Op::Add | Op::Sub)
        );
        Ok(if is_sum && node.tags.is_empty() {
            format!("({})", repr)
        } else {
            repr
        })
    }

    pub fn is_basis(self, ctx: &PepContext) -> PepResult<bool> {
        Ok(ctx.vector_node(self)?.is_basis)
    }

    pub fn expression(self, ctx: &PepContext) -> PepResult<Option<&VectorExpression>> {
        Ok(ctx.vector_node(self)?.expression.as_ref())
    }

    ///////////////////////////////// CANONICAL FORM ////////////////////////////

    /// Linear combination of basis vectors equal to this vector.
    pub fn canonical(self, ctx: &PepContext) -> PepResult<VectorByBasis> {
        let mut cache = HashMap::new();
        let result = self.canonical_cached(ctx, &mut cache)?;
        debug!(
            "canonicalized Vector {} into {} basis terms ({} nodes visited)",
            self.repr(ctx)?,
            result.coeffs().len(),
            cache.len()
        );
        Ok(result)
    }

    /// Memoised on the handle so shared sub-trees are flattened once.
    pub(crate) fn canonical_cached(
        self,
        ctx: &PepContext,
        cache: &mut HashMap<Vector, VectorByBasis>,
    ) -> PepResult<VectorByBasis> {
        if let Some(done) = cache.get(&self) {
            return Ok(done.clone());
        }
        let node = ctx.vector_node(self)?;
        let result = match &node.expression {
            None => VectorByBasis::basis(self),
            Some(VectorExpression::Zero(_)) => VectorByBasis::new(),
            Some(VectorExpression::ByBasis(by_basis)) => by_basis.clone(),
            Some(VectorExpression::Op(rep)) => {
                let left = Self::canonical_operand(&rep.left, ctx, cache)?;
                let right = Self::canonical_operand(&rep.right, ctx, cache)?;
                match (rep.op, left, right) {
                    (Op::Add, Canonical::Vector(a), Canonical::Vector(b)) => a.add(&b),
                    (Op::Sub, Canonical::Vector(a), Canonical::Vector(b)) => a.sub(&b),
                    (Op::Mul, Canonical::Vector(a), Canonical::Operand(c))
                    | (Op::Mul, Canonical::Operand(c), Canonical::Vector(a)) => a.scale(&c),
                    (Op::Div, Canonical::Vector(a), Canonical::Operand(c)) => a.div(&c),
                    (op, _, _) => unreachable!("Vector operator {} with invalid operands", op),
                }
            }
        };
        cache.insert(self, result.clone());
        Ok(result)
    }

    fn canonical_operand(
        operand: &VectorOperand,
        ctx: &PepContext,
        cache: &mut HashMap<Vector, VectorByBasis>,
    ) -> PepResult<Canonical> {
        match operand {
            VectorOperand::Vector(v) => Ok(Canonical::Vector(v.canonical_cached(ctx, cache)?)),
            VectorOperand::Operand(c) => Ok(Canonical::Operand(c.clone())),
        }
    }

    /// New non-basis vector holding the canonical form; a basis vector is wrapped, not copied.
    pub fn simplify(self, ctx: &mut PepContext, tag: Option<&str>) -> PepResult<Vector> {
        let by_basis = self.canonical(ctx)?;
        let math_expr = by_basis.describe(ctx)?;
        let tags: Vec<&str> = tag.into_iter().collect();
        Self::push(
            ctx,
            false,
            Some(VectorExpression::ByBasis(by_basis)),
            &tags,
            math_expr,
        )
    }

    ///////////////////////////////// EVALUATION ////////////////////////////////

    /// Coordinates against the basis vectors of `ctx`.
    pub fn eval<T: Coefficient>(
        self,
        ctx: &PepContext,
        resolve_parameters: &HashMap<String, T>,
    ) -> PepResult<EvaluatedVector<T>> {
        ExpressionManager::new(ctx, resolve_parameters.clone()).eval_vector(self)
    }

    /// `2*x_0 - h*g_0` style linear combination of the basis tags.
    pub fn repr_by_basis<T: Coefficient>(
        self,
        ctx: &PepContext,
        resolve_parameters: &HashMap<String, T>,
    ) -> PepResult<String> {
        ExpressionManager::new(ctx, resolve_parameters.clone()).repr_vector_by_basis(self)
    }
}
