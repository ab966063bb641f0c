#[cfg(test)]
mod tests {
    use crate::pep::number::{Number, Operand};
    use crate::pep::parameter::Parameter;
    use crate::pep::pep_context::PepContext;
    use crate::pep::pep_error::PepError;
    use crate::pep::scalar::{
        EvaluatedScalar, Scalar, ScalarByBasis, ScalarExpression, ScalarOperand, ScalarRepresentation,
    };
    use crate::pep::utils::Op;
    use crate::pep::vector::Vector;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use std::collections::HashMap;

    fn two_scalars(ctx: &mut PepContext) -> (Scalar, Scalar) {
        (
            Scalar::basis(ctx, &["s1"]).unwrap(),
            Scalar::basis(ctx, &["s2"]).unwrap(),
        )
    }

    #[test]
    fn test_scalar_add_tag() {
        let mut ctx = PepContext::new("test");
        let s = Scalar::basis(&mut ctx, &[]).unwrap();
        assert_eq!(s.repr(&ctx).unwrap(), "s0");
        s.add_tag(&mut ctx, "my_tag").unwrap();
        assert_eq!(s.tags(&ctx).unwrap(), vec!["my_tag"]);
        assert_eq!(s.tag(&ctx).unwrap(), "my_tag");
        assert_eq!(s.repr(&ctx).unwrap(), "my_tag");
        let composite = s.add(&mut ctx, 1).unwrap();
        assert!(matches!(composite.tag(&ctx), Err(PepError::Tag(_))));
    }

    #[test]
    fn test_scalar_add_sub_repr() {
        let mut ctx = PepContext::new("test");
        let (s1, s2) = two_scalars(&mut ctx);
        let sum = s1.add(&mut ctx, s2).unwrap();
        assert_eq!(sum.repr(&ctx).unwrap(), "s1+s2");
        let plus_number = s1.add(&mut ctx, 0.1).unwrap();
        assert_eq!(plus_number.repr(&ctx).unwrap(), "s1+0.1");
        let number_plus = s1.radd(&mut ctx, 0.1).unwrap();
        assert_eq!(number_plus.repr(&ctx).unwrap(), "0.1+s1");
        let diff = s1.sub(&mut ctx, s2).unwrap();
        assert_eq!(diff.repr(&ctx).unwrap(), "s1-s2");
        let s2_plus_s1 = s2.add(&mut ctx, s1).unwrap();
        let nested_sum = s1.sub(&mut ctx, s2_plus_s1).unwrap();
        assert_eq!(nested_sum.repr(&ctx).unwrap(), "s1-(s2+s1)");
        let s2_minus_s1 = s2.sub(&mut ctx, s1).unwrap();
        let nested_diff = s1.sub(&mut ctx, s2_minus_s1).unwrap();
        assert_eq!(nested_diff.repr(&ctx).unwrap(), "s1-(s2-s1)");
        let minus_number = s1.sub(&mut ctx, 0.1).unwrap();
        assert_eq!(minus_number.repr(&ctx).unwrap(), "s1-0.1");
        let number_minus = s1.rsub(&mut ctx, 0.1).unwrap();
        assert_eq!(number_minus.repr(&ctx).unwrap(), "0.1-s1");
    }

    #[test]
    fn test_scalar_mul_div_repr() {
        let mut ctx = PepContext::new("test");
        let s = Scalar::basis(&mut ctx, &["s"]).unwrap();
        assert_eq!(s.mul(&mut ctx, 0.1).unwrap().repr(&ctx).unwrap(), "s*0.1");
        assert_eq!(s.rmul(&mut ctx, 0.1).unwrap().repr(&ctx).unwrap(), "0.1*s");
        assert_eq!(s.neg(&mut ctx).unwrap().repr(&ctx).unwrap(), "-s");
        assert_eq!(s.div(&mut ctx, 0.1).unwrap().repr(&ctx).unwrap(), "1/0.1*s");
    }

    #[test]
    fn test_scalar_hybrid_repr() {
        let mut ctx = PepContext::new("test");
        let (s1, s2) = two_scalars(&mut ctx);
        let sum = s1.add(&mut ctx, s2).unwrap();
        assert_eq!(sum.mul(&mut ctx, 0.1).unwrap().repr(&ctx).unwrap(), "(s1+s2)*0.1");
        let s2_scaled = s2.mul(&mut ctx, 0.1).unwrap();
        assert_eq!(s1.add(&mut ctx, s2_scaled).unwrap().repr(&ctx).unwrap(), "s1+s2*0.1");
        assert_eq!(sum.neg(&mut ctx).unwrap().repr(&ctx).unwrap(), "-(s1+s2)");
        assert_eq!(sum.rmul(&mut ctx, 0.1).unwrap().repr(&ctx).unwrap(), "0.1*(s1+s2)");
    }

    #[test]
    fn test_inner_product_repr() {
        let mut ctx = PepContext::new("test");
        let x = Vector::basis(&mut ctx, &["x"]).unwrap();
        let y = Vector::basis(&mut ctx, &["y"]).unwrap();
        let z = Vector::basis(&mut ctx, &["z"]).unwrap();
        let xy = x.add(&mut ctx, y).unwrap();
        assert_eq!(xy.inner(&mut ctx, z).unwrap().repr(&ctx).unwrap(), "(x+y)*z");
        assert_eq!(z.inner(&mut ctx, x).unwrap().repr(&ctx).unwrap(), "z*x");
    }

    fn pm_problem(ctx: &mut PepContext) -> Scalar {
        let s1 = Scalar::basis(ctx, &["s1"]).unwrap();
        let p1 = Vector::basis(ctx, &["p1"]).unwrap();
        let pm = Parameter::named("pm");
        let left = s1.rmul(ctx, pm.clone()).unwrap();
        let square = p1.inner(ctx, p1).unwrap();
        let right = square.mul(ctx, pm).unwrap();
        left.add(ctx, right).unwrap()
    }

    #[test]
    fn test_scalar_with_parameter() {
        let mut ctx = PepContext::new("test");
        let s = pm_problem(&mut ctx);
        let params = HashMap::from([("pm".to_string(), 3.0)]);
        let evaluated = s.eval(&ctx, &params).unwrap();
        assert_eq!(evaluated.inner_prod_coords, DMatrix::from_element(1, 1, 3.0));
        assert_eq!(evaluated.func_coords, DVector::from_element(1, 3.0));
        assert_relative_eq!(evaluated.offset, 0.0);

        let params = HashMap::from([("pm".to_string(), 2.3)]);
        assert_eq!(
            s.repr_by_basis(&ctx, &params, true).unwrap(),
            "2.3*s1 + 2.3*|p1|^2"
        );
        assert_eq!(
            s.repr_by_basis(&ctx, &params, false).unwrap(),
            "2.3*s1 + 2.3*p1*p1"
        );
    }

    #[test]
    fn test_scalar_with_parameter_exact() {
        let mut ctx = PepContext::new("test");
        let s = pm_problem(&mut ctx);
        let params = HashMap::from([("pm".to_string(), Expr::int(3))]);
        let evaluated = s.eval(&ctx, &params).unwrap();
        assert_eq!(evaluated.inner_prod_coords[(0, 0)], Expr::int(3));
        assert_eq!(evaluated.func_coords[0], Expr::int(3));
        let params = HashMap::from([("pm".to_string(), Expr::rational(7, 3))]);
        assert_eq!(
            s.repr_by_basis(&ctx, &params, true).unwrap(),
            "7/3*s1 + 7/3*|p1|^2"
        );
    }

    #[test]
    fn test_zero_scalar() {
        for num_vectors in [1, 2] {
            let mut ctx = PepContext::new("test");
            Scalar::basis(&mut ctx, &["f"]).unwrap();
            for i in 0..num_vectors {
                Vector::basis(&mut ctx, &[format!("p{}", i).as_str()]).unwrap();
            }
            let zero = Scalar::zero(&mut ctx).unwrap();
            assert_eq!(zero.repr(&ctx).unwrap(), "0");

            let evaluated = zero.eval(&ctx, &HashMap::<String, f64>::new()).unwrap();
            assert_eq!(evaluated, EvaluatedScalar::zero(1, num_vectors));
            assert_eq!(
                evaluated.inner_prod_coords,
                DMatrix::from_element(num_vectors, num_vectors, 0.0)
            );

            let exact = zero.eval(&ctx, &HashMap::<String, Expr>::new()).unwrap();
            assert_eq!(exact.func_coords, DVector::from_element(1, Expr::int(0)));
            assert_eq!(
                exact.inner_prod_coords,
                DMatrix::from_element(num_vectors, num_vectors, Expr::int(0))
            );
            assert_eq!(exact.offset, Expr::int(0));
        }
    }

    struct ByBasisFixture {
        f1: Scalar,
        f2: Scalar,
        v1: Vector,
        v2: Vector,
        a: ScalarByBasis,
        b: ScalarByBasis,
    }

    fn by_basis_fixture(ctx: &mut PepContext) -> ByBasisFixture {
        let f1 = Scalar::basis(ctx, &["f1"]).unwrap();
        let f2 = Scalar::basis(ctx, &["f2"]).unwrap();
        let v1 = Vector::basis(ctx, &["v1"]).unwrap();
        let v2 = Vector::basis(ctx, &["v2"]).unwrap();
        let a = ScalarByBasis::from_parts([(f1, 2.into())], [((v1, v2), 3.into())], 1.into());
        let b = ScalarByBasis::from_parts(
            [(f1, 5.into()), (f2, 4.into())],
            [((v1, v2), 4.into())],
            2.into(),
        );
        ByBasisFixture { f1, f2, v1, v2, a, b }
    }

    fn assert_parts(
        fx: &ByBasisFixture,
        value: &ScalarByBasis,
        f1: Operand,
        f2: Operand,
        v1v2: Operand,
        offset: Operand,
    ) {
        assert_eq!(value.func_coeff(&fx.f1), f1);
        assert_eq!(value.func_coeff(&fx.f2), f2);
        assert_eq!(value.inner_prod_coeff(fx.v1, fx.v2), v1v2);
        assert_eq!(*value.offset(), offset);
    }

    #[test]
    fn test_scalar_by_basis_add_sub() {
        let mut ctx = PepContext::new("test");
        let fx = by_basis_fixture(&mut ctx);
        let sum = fx.a.add(&fx.b);
        assert_parts(&fx, &sum, 7.into(), 4.into(), 7.into(), 3.into());
        let diff = fx.a.sub(&fx.b);
        assert_parts(&fx, &diff, (-3).into(), (-4).into(), (-1).into(), (-1).into());
        let negated = fx.a.neg();
        assert_parts(&fx, &negated, (-2).into(), 0.into(), (-3).into(), (-1).into());
        assert!(fx.a.sub(&fx.a).is_zero());
    }

    #[test]
    fn test_scalar_by_basis_scaling() {
        let mut ctx = PepContext::new("test");
        let fx = by_basis_fixture(&mut ctx);
        let tripled = fx.a.scale(&3.into());
        assert_parts(&fx, &tripled, 6.into(), 0.into(), 9.into(), 3.into());
        let doubled = fx.a.scale(&2.into());
        assert_parts(&fx, &doubled, 4.into(), 0.into(), 6.into(), 2.into());
        let halved = fx.a.div(&2.into());
        assert_parts(
            &fx,
            &halved,
            1.into(),
            0.into(),
            Number::rational(3, 2).into(),
            Number::rational(1, 2).into(),
        );
        assert!(fx.a.scale(&0.into()).func_coeffs().is_empty());
    }

    #[test]
    fn test_scalar_by_basis_parameter_coefficients() {
        let mut ctx = PepContext::new("test");
        let fx = by_basis_fixture(&mut ctx);
        let pm = Parameter::named("pm");
        let scaled = fx.a.scale(&pm.clone().into());
        assert_eq!(scaled.func_coeff(&fx.f1), Operand::from(2 * pm.clone()));
        assert_eq!(scaled.inner_prod_coeff(fx.v1, fx.v2), Operand::from(3 * pm.clone()));
        assert_eq!(*scaled.offset(), Operand::from(pm.clone()));

        let divided = fx.a.div(&pm.clone().into());
        assert_eq!(divided.func_coeff(&fx.f1), Operand::from(2 / pm.clone()));
        let params = HashMap::from([("pm".to_string(), 4.0)]);
        let evaluated = Scalar::new(&mut ctx, false, Some(ScalarExpression::ByBasis(divided)), &[])
            .unwrap()
            .eval(&ctx, &params)
            .unwrap();
        assert_relative_eq!(evaluated.func_coords[0], 0.5);
        assert_relative_eq!(evaluated.inner_prod_coords[(0, 1)], 0.375);
        assert_relative_eq!(evaluated.offset, 0.25);
    }

    #[test]
    fn test_inner_product_keys_are_unordered() {
        let mut ctx = PepContext::new("test");
        let fx = by_basis_fixture(&mut ctx);
        let swapped = ScalarByBasis::from_parts(Vec::<(Scalar, Operand)>::new(), [((fx.v2, fx.v1), 3.into())], 0.into());
        assert_eq!(swapped.inner_prod_coeff(fx.v1, fx.v2), Operand::from(3));
        assert!(swapped.inner_prod_coeffs().contains_key(&(fx.v1, fx.v2)));
        let x_dot_y = fx.v1.inner(&mut ctx, fx.v2).unwrap();
        let y_dot_x = fx.v2.inner(&mut ctx, fx.v1).unwrap();
        assert_eq!(
            x_dot_y.canonical(&ctx).unwrap(),
            y_dot_x.canonical(&ctx).unwrap()
        );
    }

    #[test]
    fn test_gram_matrix_is_symmetric() {
        let mut ctx = PepContext::new("test");
        let x = Vector::basis(&mut ctx, &["x"]).unwrap();
        let y = Vector::basis(&mut ctx, &["y"]).unwrap();
        let x_dot_y = x.inner(&mut ctx, y).unwrap();
        let y_dot_x = y.inner(&mut ctx, x).unwrap();
        let params = HashMap::<String, f64>::new();
        let a = x_dot_y.eval(&ctx, &params).unwrap();
        let b = y_dot_x.eval(&ctx, &params).unwrap();
        assert_eq!(a.inner_prod_coords, b.inner_prod_coords.transpose());
        assert_eq!(a.inner_prod_coords, DMatrix::from_row_slice(2, 2, &[0.0, 0.5, 0.5, 0.0]));

        let sum = x.add(&mut ctx, y).unwrap();
        let diff = x.sub(&mut ctx, y).unwrap();
        let product = sum.inner(&mut ctx, diff).unwrap();
        let m = product.eval(&ctx, &params).unwrap().inner_prod_coords;
        assert_eq!(m, m.transpose());
        assert_eq!(m, DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_repr_scalar_by_basis() {
        let mut ctx = PepContext::new("test");
        let f = Scalar::basis(&mut ctx, &["f"]).unwrap();
        let x = Vector::basis(&mut ctx, &["x"]).unwrap();
        let y = Vector::basis(&mut ctx, &["y"]).unwrap();
        let xy = x.inner(&mut ctx, y).unwrap();
        let xy2 = xy.mul(&mut ctx, 2).unwrap();
        let s = f.sub(&mut ctx, xy2).unwrap();
        let yy = y.pow(&mut ctx, 2).unwrap();
        let s = s.add(&mut ctx, yy).unwrap();
        let s = s.add(&mut ctx, 3).unwrap();
        let floats = HashMap::<String, f64>::new();
        assert_eq!(
            s.repr_by_basis(&ctx, &floats, false).unwrap(),
            "f - 2*x*y + y*y + 3"
        );
        assert_eq!(
            s.repr_by_basis(&ctx, &floats, true).unwrap(),
            "f - 2*x*y + |y|^2 + 3"
        );
        let exact = HashMap::<String, Expr>::new();
        assert_eq!(
            s.repr_by_basis(&ctx, &exact, false).unwrap(),
            "f - 2*x*y + y*y + 3"
        );
        let zero = s.sub(&mut ctx, s).unwrap();
        assert_eq!(zero.repr_by_basis(&ctx, &floats, true).unwrap(), "0");
    }

    #[test]
    fn test_offsets() {
        let mut ctx = PepContext::new("test");
        let f = Scalar::basis(&mut ctx, &["f"]).unwrap();
        let shifted = f.add(&mut ctx, 2).unwrap();
        let shifted = shifted.sub(&mut ctx, 0.5).unwrap();
        let flipped = shifted.rsub(&mut ctx, 1).unwrap();
        let by_basis = flipped.canonical(&ctx).unwrap();
        assert_eq!(by_basis.func_coeff(&f), Operand::from(-1));
        assert_eq!(*by_basis.offset(), Operand::from(-0.5));
        let evaluated = flipped.eval(&ctx, &HashMap::<String, f64>::new()).unwrap();
        assert_relative_eq!(evaluated.offset, -0.5);
    }

    #[test]
    fn test_scalar_simplify() {
        let mut ctx = PepContext::new("test");
        let (s1, s2) = two_scalars(&mut ctx);
        let sum = s1.add(&mut ctx, s2).unwrap();
        let doubled = sum.rmul(&mut ctx, 2).unwrap();
        let once = doubled.simplify(&mut ctx, None).unwrap();
        assert_eq!(once.repr(&ctx).unwrap(), "2*s1 + 2*s2");
        let twice = once.simplify(&mut ctx, Some("t")).unwrap();
        assert_eq!(twice.repr(&ctx).unwrap(), "t");
        assert_eq!(once.canonical(&ctx).unwrap(), twice.canonical(&ctx).unwrap());
        let wrapped = s1.simplify(&mut ctx, None).unwrap();
        assert!(!wrapped.is_basis(&ctx).unwrap());
        assert_eq!(ctx.num_basis_scalars(), 2);
    }

    #[test]
    fn test_scalar_validation() {
        let mut ctx = PepContext::new("test");
        let (s1, s2) = two_scalars(&mut ctx);
        let v = Vector::basis(&mut ctx, &["v"]).unwrap();
        assert!(matches!(
            s1.add(&mut ctx, ScalarOperand::Vector(v)),
            Err(PepError::UnsupportedOperation(_))
        ));
        let ratio = ScalarExpression::Op(ScalarRepresentation {
            op: Op::Div,
            left: s1.into(),
            right: s2.into(),
        });
        assert!(matches!(
            Scalar::new(&mut ctx, false, Some(ratio), &[]),
            Err(PepError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            Scalar::new(&mut ctx, false, None, &[]),
            Err(PepError::Construction(_))
        ));
        let zero = Some(ScalarExpression::Zero(Default::default()));
        assert!(matches!(
            Scalar::new(&mut ctx, true, zero, &[]),
            Err(PepError::Construction(_))
        ));
    }

    #[test]
    fn test_evaluated_scalar_ops() {
        let a = EvaluatedScalar {
            func_coords: DVector::from_vec(vec![1.0]),
            inner_prod_coords: DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 0.0]),
            offset: 3.0,
        };
        let b = EvaluatedScalar::zero(1, 2);
        assert_eq!(a.clone() + b.clone(), a);
        assert_eq!(a.clone() - a.clone(), b);
        let doubled = a.clone() * 2.0;
        assert_relative_eq!(doubled.offset, 6.0);
        assert_relative_eq!(doubled.inner_prod_coords[(0, 1)], 2.0);
        let halved = a.clone() / 2.0;
        assert_relative_eq!(halved.func_coords[0], 0.5);
        assert_relative_eq!((-a).offset, -3.0);
    }
}
