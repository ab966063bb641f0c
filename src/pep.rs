//! # Performance Estimation Problem algebra
//!
//! Symbolic description of first-order optimization methods as Gram-matrix expressions.
//! Points and gradients are [`vector::Vector`]s, function values and inner products are
//! [`scalar::Scalar`]s, step sizes and constants are [`parameter::Parameter`]s. Everything is
//! recorded in a [`pep_context::PepContext`] and evaluated by
//! [`expression_manager::ExpressionManager`].
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use RustedPEP::pep::parameter::Parameter;
//! use RustedPEP::pep::pep_context::PepContext;
//! use RustedPEP::pep::vector::Vector;
//!
//! let mut ctx = PepContext::new("gd");
//! let x0 = Vector::basis(&mut ctx, &["x_0"]).unwrap();
//! let g0 = Vector::basis(&mut ctx, &["grad_x_0"]).unwrap();
//! let step = g0.mul(&mut ctx, Parameter::named("h")).unwrap();
//! let x1 = x0.sub(&mut ctx, step).unwrap();
//! let params = HashMap::from([("h".to_string(), 0.5)]);
//! assert_eq!(x1.repr_by_basis(&ctx, &params).unwrap(), "x_0 - 0.5*grad_x_0");
//! ```

/// problem configuration read from a task document
pub mod config;
/// the coefficient field of an evaluation mode and the evaluator itself
pub mod expression_manager;
mod expression_manager_tests;
/// raw numbers and the Number/Parameter/Symbolic operand union
pub mod number;
/// late-bound symbolic numbers and their polynomial canonical form
pub mod parameter;
/// arena of Vectors and Scalars, tag index, named sessions
pub mod pep_context;
pub mod pep_error;
pub mod scalar;
mod scalar_tests;
pub mod utils;
pub mod vector;
