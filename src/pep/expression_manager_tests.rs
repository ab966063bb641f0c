#[cfg(test)]
mod tests {
    use crate::pep::expression_manager::{Coefficient, ExpressionManager};
    use crate::pep::number::Number;
    use crate::pep::parameter::Parameter;
    use crate::pep::pep_context::PepContext;
    use crate::pep::pep_error::PepError;
    use crate::pep::scalar::Scalar;
    use crate::pep::utils::grad_tag;
    use crate::pep::vector::Vector;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;
    use std::collections::HashMap;

    #[test]
    fn test_float_format_term() {
        assert_eq!(1.0_f64.format_term("x"), "+ x ");
        assert_eq!((-1.0_f64).format_term("x"), "- x ");
        assert_eq!(2.5_f64.format_term("x"), "+ 2.5*x ");
        assert_eq!((-0.5_f64).format_term("x"), "- 0.5*x ");
        assert_eq!(1e-6_f64.format_term("x"), "");
        assert_eq!(3.0_f64.format_constant(), "+ 3 ");
        assert_eq!((-0.25_f64).format_constant(), "- 0.25 ");
        assert_eq!(0.0_f64.format_constant(), "");
    }

    #[test]
    fn test_exact_format_term() {
        assert_eq!(Expr::rational(-1, 2).format_term("x"), "- 1/2*x ");
        assert_eq!(Expr::int(1).format_term("x"), "+ x ");
        assert_eq!(Expr::int(0).format_term("x"), "");
        assert_eq!(Expr::int(2).sqrt().format_term("x"), "+ sqrt(2)*x ");
        assert_eq!(Expr::rational(7, 3).format_constant(), "+ 7/3 ");
        // only exact zeros are left out
        assert!(!Expr::rational(1, 1_000_000_000).is_negligible());
        assert!(1e-9_f64.is_negligible());
    }

    #[test]
    fn test_float_threshold_is_strict() {
        assert!(!1e-5_f64.is_negligible());
        assert!(!(-1e-5_f64).is_negligible());
        assert!(9e-6_f64.is_negligible());
        assert!((-9e-6_f64).is_negligible());
    }

    #[test]
    fn test_conversions() {
        assert_relative_eq!(f64::from_number(&Number::rational(1, 4)).unwrap(), 0.25);
        assert!(matches!(
            Expr::from_number(&Number::Float(0.5)),
            Err(PepError::Usage(_))
        ));
        assert_eq!(Expr::from_number(&Number::int(3)).unwrap(), Expr::int(3));
        let root = f64::from_symbolic(&Expr::int(2).sqrt()).unwrap();
        assert_relative_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert!(matches!(
            f64::from_symbolic(&Expr::Var("x".to_string())),
            Err(PepError::Usage(_))
        ));
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(1.0_f64.checked_div(&0.0), None);
        assert_eq!(Expr::int(1).checked_div(&Expr::int(0)), None);
        assert_eq!(Expr::int(1).checked_div(&Expr::int(3)), Some(Expr::rational(1, 3)));
        assert!(matches!(
            0.0_f64.checked_pow(&-1.0),
            Err(PepError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            Expr::int(0).checked_pow(&Expr::int(-1)),
            Err(PepError::UnsupportedOperation(_))
        ));
        assert_relative_eq!(2.0_f64.checked_pow(&3.0).unwrap(), 8.0);
        assert_eq!(0.0_f64.checked_powi(-1), None);
        assert_eq!(Expr::int(3).checked_powi(2), Some(Expr::int(9)));
        assert_eq!(Expr::int(2).checked_powi(-2), Some(Expr::rational(1, 4)));
    }

    /// `x_1 = x_0 - h*grad_x_0`
    fn gradient_step(ctx: &mut PepContext) -> (Vector, Vector, Vector) {
        let x0 = Vector::basis(ctx, &["x_0"]).unwrap();
        let g0 = Vector::basis(ctx, &[grad_tag("x_0").as_str()]).unwrap();
        let step = g0.rmul(ctx, Parameter::named("h")).unwrap();
        let x1 = x0.sub(ctx, step).unwrap();
        (x0, g0, x1)
    }

    #[test]
    fn test_basis_snapshot() {
        let mut ctx = PepContext::new("test");
        let (_, _, x1) = gradient_step(&mut ctx);
        Scalar::basis(&mut ctx, &["f_0"]).unwrap();
        let em = ExpressionManager::new(&ctx, HashMap::from([("h".to_string(), 0.5)]));
        assert_eq!(em.num_basis_vectors(), 2);
        assert_eq!(em.num_basis_scalars(), 1);
        let coords = em.eval_vector(x1).unwrap().coords;
        assert_relative_eq!(coords[0], 1.0);
        assert_relative_eq!(coords[1], -0.5);
    }

    #[test]
    fn test_gram_matrix_float() {
        let mut ctx = PepContext::new("test");
        let (_, _, x1) = gradient_step(&mut ctx);
        let norm = x1.pow(&mut ctx, 2).unwrap();
        let em = ExpressionManager::new(&ctx, HashMap::from([("h".to_string(), 0.5)]));
        let gram = em.eval_scalar(norm).unwrap().inner_prod_coords;
        assert_eq!(gram, DMatrix::from_row_slice(2, 2, &[1.0, -0.5, -0.5, 0.25]));
        assert_eq!(
            em.repr_scalar_by_basis(norm, true).unwrap(),
            "|x_0|^2 - x_0*grad_x_0 + 0.25*|grad_x_0|^2"
        );
        assert_eq!(
            em.repr_scalar_by_basis(norm, false).unwrap(),
            "x_0*x_0 - x_0*grad_x_0 + 0.25*grad_x_0*grad_x_0"
        );
    }

    #[test]
    fn test_gram_matrix_exact() {
        let mut ctx = PepContext::new("test");
        let (_, _, x1) = gradient_step(&mut ctx);
        let norm = x1.pow(&mut ctx, 2).unwrap();
        let em = ExpressionManager::new(&ctx, HashMap::from([("h".to_string(), Expr::rational(1, 2))]));
        let gram = em.eval_scalar(norm).unwrap().inner_prod_coords;
        assert_eq!(gram[(0, 0)], Expr::int(1));
        assert_eq!(gram[(0, 1)], Expr::rational(-1, 2));
        assert_eq!(gram[(1, 0)], Expr::rational(-1, 2));
        assert_eq!(gram[(1, 1)], Expr::rational(1, 4));
        assert_eq!(
            em.repr_scalar_by_basis(norm, true).unwrap(),
            "|x_0|^2 - x_0*grad_x_0 + 1/4*|grad_x_0|^2"
        );
        assert_eq!(em.repr_vector_by_basis(x1).unwrap(), "x_0 - 1/2*grad_x_0");
    }

    #[test]
    fn test_offset_formatting() {
        let mut ctx = PepContext::new("test");
        let f = Scalar::basis(&mut ctx, &["f"]).unwrap();
        let shifted = f.add(&mut ctx, Parameter::named("c")).unwrap();
        let exact = ExpressionManager::new(&ctx, HashMap::from([("c".to_string(), Expr::rational(-1, 3))]));
        assert_eq!(exact.repr_scalar_by_basis(shifted, true).unwrap(), "f - 1/3");
        let float = ExpressionManager::new(&ctx, HashMap::from([("c".to_string(), 0.125)]));
        assert_eq!(float.repr_scalar_by_basis(shifted, true).unwrap(), "f + 0.125");
    }

    #[test]
    fn test_resolution_errors() {
        let mut ctx = PepContext::new("test");
        let (x0, _, x1) = gradient_step(&mut ctx);
        let em = ExpressionManager::new(&ctx, HashMap::<String, f64>::new());
        assert!(matches!(em.eval_vector(x1), Err(PepError::Resolution(_))));
        let half = x0.mul(&mut ctx, 0.5).unwrap();
        let exact = ExpressionManager::new(&ctx, HashMap::from([("h".to_string(), Expr::int(1))]));
        assert!(matches!(exact.eval_vector(half), Err(PepError::Usage(_))));
    }

    #[test]
    fn test_foreign_context() {
        let mut ctx = PepContext::new("first");
        let mut other = PepContext::new("second");
        let x = Vector::basis(&mut ctx, &["x"]).unwrap();
        Vector::basis(&mut other, &["y"]).unwrap();
        let em = ExpressionManager::new(&other, HashMap::<String, f64>::new());
        assert!(matches!(em.eval_vector(x), Err(PepError::MissingContext(_))));
    }
}
