// SYMBOLIC TRAITS //////////////////////////////////////////////////////////////////
// This module contains the narrow interface the PEP algebra needs from an exact backend.
// The traits are implemented for the native engine in the symbolic_engine.rs file
// add other engines here as needed

use crate::symbolic::symbolic_engine::Expr;
use num::BigRational;
use std::collections::HashMap;

pub trait SymbolicType: Clone + std::fmt::Display {
    /// canonical form; must be idempotent
    fn simplify(&self) -> Self;
    /// exact zero test
    fn is_zero(&self) -> bool;
    /// numerical value, `None` while free symbols remain
    fn to_f64(&self) -> Option<f64>;
    fn from_rational(value: BigRational) -> Self;
    fn free_symbols(&self) -> Vec<String>;
    fn substitute(&self, values: &HashMap<String, Self>) -> Self;
    fn convert_to_string(&self) -> String {
        self.to_string()
    }
}
///////////////// IMPLEMENTATION OF THE TRAIT FOR THE NATIVE ENGINE /////////////////////////
impl SymbolicType for Expr {
    fn simplify(&self) -> Self {
        self.simplify_()
    }
    fn is_zero(&self) -> bool {
        self.equals_zero()
    }
    fn to_f64(&self) -> Option<f64> {
        self.simplify_().eval_f64()
    }
    fn from_rational(value: BigRational) -> Self {
        Expr::Const(value)
    }
    fn free_symbols(&self) -> Vec<String> {
        self.extract_variables()
    }
    fn substitute(&self, values: &HashMap<String, Self>) -> Self {
        self.set_variable_from_map(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn through_trait<S: SymbolicType>(s: &S) -> (S, bool, Option<f64>) {
        (s.simplify(), s.is_zero(), s.to_f64())
    }

    #[test]
    fn test_native_engine_through_trait() {
        let e = Expr::int(2).sqrt() * Expr::int(3);
        let (simplified, zero, value) = through_trait(&e);
        assert_eq!(simplified.convert_to_string(), "3*sqrt(2)");
        assert!(!zero);
        assert_relative_eq!(value.unwrap(), 3.0 * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_free_symbols_and_substitution() {
        let e = Expr::Var("L".to_string()) * Expr::Var("h".to_string());
        assert_eq!(e.free_symbols(), vec!["L".to_string(), "h".to_string()]);
        assert_eq!(SymbolicType::to_f64(&e), None);
        let mut values = HashMap::new();
        values.insert("L".to_string(), Expr::int(2));
        values.insert("h".to_string(), Expr::rational(1, 4));
        let closed = SymbolicType::substitute(&e, &values);
        assert_eq!(SymbolicType::simplify(&closed), Expr::rational(1, 2));
    }
}
