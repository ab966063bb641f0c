//! # Symbolic Expression Simplification Module
//!
//! Canonical form for exact expressions. Every expression is flattened into a sum of
//! products over *atoms*, with exact rational coefficients and integer exponents.
//!
//! ## Atoms
//!
//! 1. **Free symbols**: `Var("L")`
//! 2. **Radicals**: `r^(1/n)` with an integer radicand that carries no perfect n-th power
//!    factor (below a trial-division bound), so `sqrt(8)` becomes `2*sqrt(2)` and
//!    `sqrt(2)^2` becomes `2`
//! 3. **Opaque sub-expressions**: powers with a non-constant exponent, division by a sum,
//!    powers of sums above [`MAX_EXPANSION_POWER`]. They are identified by the printed form of
//!    their own canonical expression.
//!
//! ## Key Features
//!
//! - **Term Ordering Independence**: `(a + b) - (b + a)` reduces to nothing
//! - **Distributive Property**: products of sums are expanded
//! - **Exact Zero Test**: an expression is zero iff no term survives the reduction
//! - **Idempotence**: `e.simplify_().simplify_() == e.simplify_()`
//!
//! Cube and higher roots are reduced per radicand only: `2^(1/3) * 2^(1/3)` and `4^(1/3)`
//! stay distinct atoms.

use crate::symbolic::symbolic_engine::Expr;
use num::{BigInt, BigRational, Integer};
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Powers of multi-term sums above this exponent are kept opaque instead of expanded.
pub const MAX_EXPANSION_POWER: i64 = 16;
const MAX_TRIAL_DIVISOR: u64 = 10_000;
const MAX_ROOT_INDEX: u32 = 64;

#[derive(Clone, Debug)]
struct OpaqueAtom {
    key: String,
    expr: Expr,
}

impl OpaqueAtom {
    fn new(expr: Expr) -> Self {
        OpaqueAtom {
            key: expr.to_string(),
            expr,
        }
    }
}

impl PartialEq for OpaqueAtom {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for OpaqueAtom {}

impl PartialOrd for OpaqueAtom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpaqueAtom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Atom {
    Var(String),
    Root { radicand: BigInt, index: u32 },
    Opaque(OpaqueAtom),
}

type Factors = BTreeMap<Atom, i64>;

/// exponent bookkeeping; radicals fold whole powers of their radicand into the coefficient
fn multiply_atom(factors: &mut Factors, coeff: &mut BigRational, atom: Atom, exp: i64) {
    let mut total = factors.remove(&atom).unwrap_or(0) + exp;
    if let Atom::Root { radicand, index } = &atom {
        let n = *index as i64;
        let whole = total.div_euclid(n);
        total = total.rem_euclid(n);
        if whole != 0 {
            let r = BigRational::from_integer(radicand.clone());
            *coeff = &*coeff * r.pow(whole as i32);
        }
    }
    if total != 0 {
        factors.insert(atom, total);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct SumOfProducts {
    terms: BTreeMap<Factors, BigRational>,
}

impl SumOfProducts {
    fn constant(c: BigRational) -> Self {
        Self::single(Factors::new(), c)
    }

    fn single(factors: Factors, coeff: BigRational) -> Self {
        let mut out = Self::default();
        out.add_term(factors, coeff);
        out
    }

    fn atom(atom: Atom, exp: i64) -> Self {
        let mut factors = Factors::new();
        let mut coeff = BigRational::one();
        multiply_atom(&mut factors, &mut coeff, atom, exp);
        Self::single(factors, coeff)
    }

    fn add_term(&mut self, factors: Factors, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        let entry = self.terms.entry(factors).or_insert_with(BigRational::zero);
        *entry = &*entry + coeff;
        if entry.is_zero() {
            self.terms.retain(|_, c| !c.is_zero());
        }
    }

    fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (factors, coeff) in &other.terms {
            out.add_term(factors.clone(), coeff.clone());
        }
        out
    }

    fn neg(&self) -> Self {
        SumOfProducts {
            terms: self
                .terms
                .iter()
                .map(|(f, c)| (f.clone(), -c))
                .collect(),
        }
    }

    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    fn mul(&self, other: &Self) -> Self {
        let mut out = Self::default();
        for (f1, c1) in &self.terms {
            for (f2, c2) in &other.terms {
                let mut factors = f1.clone();
                let mut coeff = c1 * c2;
                for (atom, exp) in f2 {
                    multiply_atom(&mut factors, &mut coeff, atom.clone(), *exp);
                }
                out.add_term(factors, coeff);
            }
        }
        out
    }

    fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(f, _)| f.is_empty())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    /// Only single terms are invertible.
    fn inverse(&self) -> Option<Self> {
        if self.terms.len() != 1 {
            return None;
        }
        let (factors, coeff) = self.terms.iter().next()?;
        let mut out_factors = Factors::new();
        let mut out_coeff = coeff.recip();
        for (atom, exp) in factors {
            multiply_atom(&mut out_factors, &mut out_coeff, atom.clone(), -exp);
        }
        Some(Self::single(out_factors, out_coeff))
    }

    fn pow_int(&self, k: i64) -> Option<Self> {
        if k < 0 {
            return self.inverse()?.pow_int(k.checked_neg()?);
        }
        if self.terms.len() == 1 {
            let (factors, coeff) = self.terms.iter().next()?;
            let mut out_factors = Factors::new();
            let mut out_coeff = coeff.pow(i32::try_from(k).ok()?);
            for (atom, exp) in factors {
                multiply_atom(
                    &mut out_factors,
                    &mut out_coeff,
                    atom.clone(),
                    exp.checked_mul(k)?,
                );
            }
            return Some(Self::single(out_factors, out_coeff));
        }
        if k > MAX_EXPANSION_POWER {
            return None;
        }
        let mut acc = Self::constant(BigRational::one());
        for _ in 0..k {
            acc = acc.mul(self);
        }
        Some(acc)
    }
}

/// Splits `n` into `(outside, inside)` with `n = outside^q * inside`.
fn extract_root(n: &BigInt, q: u32) -> (BigInt, BigInt) {
    let root = n.nth_root(q);
    if root.pow(q) == *n {
        return (root, BigInt::one());
    }
    let mut inside = n.clone();
    let mut outside = BigInt::one();
    let mut d = 2u64;
    while d <= MAX_TRIAL_DIVISOR {
        let dq = BigInt::from(d).pow(q);
        if dq > inside {
            break;
        }
        while (&inside % &dq).is_zero() {
            inside /= &dq;
            outside *= d;
        }
        d += 1;
    }
    (outside, inside)
}

/// `base^(p/q)` for a rational base, `None` when it cannot be expressed with radicals.
fn rational_power(base: &BigRational, exp: &BigRational) -> Option<SumOfProducts> {
    if base.is_zero() {
        return exp
            .is_positive()
            .then(|| SumOfProducts::constant(BigRational::zero()));
    }
    if base.is_negative() {
        return None;
    }
    let q = exp.denom().to_u32().filter(|q| *q <= MAX_ROOT_INDEX)?;
    let whole = exp.numer().div_floor(exp.denom()).to_i32()?;
    let rem = exp.numer().mod_floor(exp.denom()).to_u32()?;

    let mut coeff = base.pow(whole);
    let num = base.numer().pow(rem);
    let den = base.denom().pow(rem);
    let (outside, inside) = extract_root(&(num * den.pow(q - 1)), q);
    coeff = coeff * BigRational::new(outside, den);
    if inside.is_one() {
        return Some(SumOfProducts::constant(coeff));
    }
    let root = SumOfProducts::atom(
        Atom::Root {
            radicand: inside,
            index: q,
        },
        1,
    );
    Some(root.mul(&SumOfProducts::constant(coeff)))
}

fn opaque_power(base: &SumOfProducts, k: i64) -> SumOfProducts {
    SumOfProducts::atom(Atom::Opaque(OpaqueAtom::new(from_sop(base))), k)
}

fn power(base: &SumOfProducts, exp: &SumOfProducts) -> SumOfProducts {
    if let Some(k) = exp.as_constant() {
        if k.is_integer() {
            if let Some(k) = k.to_integer().to_i64() {
                return base.pow_int(k).unwrap_or_else(|| opaque_power(base, k));
            }
        } else if let Some(b) = base.as_constant() {
            if let Some(res) = rational_power(&b, &k) {
                return res;
            }
        }
    }
    let expr = Expr::Pow(from_sop(base).boxed(), from_sop(exp).boxed());
    SumOfProducts::atom(Atom::Opaque(OpaqueAtom::new(expr)), 1)
}

fn to_sop(expr: &Expr) -> SumOfProducts {
    match expr {
        Expr::Var(name) => SumOfProducts::atom(Atom::Var(name.clone()), 1),
        Expr::Const(c) => SumOfProducts::constant(c.clone()),
        Expr::Add(lhs, rhs) => to_sop(lhs).add(&to_sop(rhs)),
        Expr::Sub(lhs, rhs) => to_sop(lhs).sub(&to_sop(rhs)),
        Expr::Mul(lhs, rhs) => to_sop(lhs).mul(&to_sop(rhs)),
        Expr::Div(lhs, rhs) => {
            let num = to_sop(lhs);
            let den = to_sop(rhs);
            match den.inverse() {
                Some(inv) => num.mul(&inv),
                None => num.mul(&opaque_power(&den, -1)),
            }
        }
        Expr::Pow(base, exp) => power(&to_sop(base), &to_sop(exp)),
    }
}

fn atom_power(atom: &Atom, exp: i64) -> Expr {
    let base = match atom {
        Atom::Var(name) => Expr::Var(name.clone()),
        Atom::Root { radicand, index } => Expr::Pow(
            Expr::Const(BigRational::from_integer(radicand.clone())).boxed(),
            Expr::rational(1, *index as i64).boxed(),
        ),
        Atom::Opaque(opaque) => opaque.expr.clone(),
    };
    if exp == 1 {
        base
    } else {
        Expr::Pow(base.boxed(), Expr::int(exp).boxed())
    }
}

/// `coeff*a1*a2*...` built left-associative; a unit coefficient is left out
fn product(factors: &Factors, coeff: &BigRational) -> Expr {
    let mut powers = factors.iter().map(|(atom, exp)| atom_power(atom, *exp));
    let first = if coeff.is_one() {
        match powers.next() {
            Some(p) => p,
            None => return Expr::Const(coeff.clone()),
        }
    } else {
        Expr::Const(coeff.clone())
    };
    powers.fold(first, |acc, f| Expr::Mul(acc.boxed(), f.boxed()))
}

fn from_sop(sop: &SumOfProducts) -> Expr {
    let mut result: Option<Expr> = None;
    for (factors, coeff) in &sop.terms {
        result = Some(match result {
            None => product(factors, coeff),
            Some(acc) if coeff.is_negative() => {
                Expr::Sub(acc.boxed(), product(factors, &coeff.abs()).boxed())
            }
            Some(acc) => Expr::Add(acc.boxed(), product(factors, coeff).boxed()),
        });
    }
    result.unwrap_or_else(|| Expr::int(0))
}

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Canonical sum-of-products form of the expression.
    ///
    /// ## Examples
    ///
    /// - `sqrt(2)^2` → `2`
    /// - `(x + 1)^2` → `1 + 2*x + x^2`
    /// - `x/x` → `1`
    pub fn simplify_(&self) -> Expr {
        from_sop(&to_sop(self))
    }

    /// Exact zero test on the canonical form.
    pub fn equals_zero(&self) -> bool {
        to_sop(self).terms.is_empty()
    }

    /// Rational value if the expression reduces to a constant without radicals.
    pub fn to_rational(&self) -> Option<BigRational> {
        to_sop(self).as_constant()
    }
}
