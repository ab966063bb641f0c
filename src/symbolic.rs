#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// exact expression tree used as the backend of exact (sympy) evaluation mode: rational constants,
/// named variables, + - * / and powers, with a precedence aware pretty printer.
///# Example#
/// ```
/// use RustedPEP::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let e = (x.clone() + Expr::int(1)) * Expr::rational(1, 2);
/// assert_eq!(e.to_string(), "(x + 1)*(1/2)");
/// assert_eq!((Expr::rational(1, 2) + Expr::rational(1, 3)).simplify_().to_string(), "5/6");
/// ```
pub mod symbolic_engine;
///________________________________________________________________________________________________________________________________________________
/// canonical sum-of-products form: collects like terms, folds rational constants and reduces radicals
pub mod symbolic_simplify;
/// the narrow trait through which the PEP algebra talks to the exact backend
pub mod symbolic_traits;
