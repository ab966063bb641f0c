use RustedPEP::pep::parameter::Parameter;
use RustedPEP::pep::pep_context::PepContext;
use RustedPEP::pep::scalar::Scalar;
use RustedPEP::pep::utils::grad_tag;
use RustedPEP::pep::vector::Vector;
use RustedPEP::symbolic::symbolic_engine::Expr;
use criterion::{Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::hint::black_box;

/// `n` gradient steps with step size `h`, returns the context and `|x_n - x_star|^2`.
fn trajectory(n: usize) -> (PepContext, Scalar) {
    let mut ctx = PepContext::new("gd");
    let x_star = Vector::basis(&mut ctx, &["x_star"]).unwrap();
    let mut x = Vector::basis(&mut ctx, &["x_0"]).unwrap();
    for k in 0..n {
        let g = Vector::basis(&mut ctx, &[grad_tag(&format!("x_{}", k)).as_str()]).unwrap();
        let descent = g.rmul(&mut ctx, Parameter::named("h")).unwrap();
        x = x.sub(&mut ctx, descent).unwrap();
        x.add_tag(&mut ctx, &format!("x_{}", k + 1)).unwrap();
    }
    let error = x.sub(&mut ctx, x_star).unwrap();
    let distance = error.pow(&mut ctx, 2).unwrap();
    (ctx, distance)
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build 50 gradient steps", |b| {
        b.iter(|| trajectory(black_box(50)))
    });
}

fn bench_eval_float(c: &mut Criterion) {
    let (ctx, distance) = trajectory(50);
    let params = HashMap::from([("h".to_string(), 0.5)]);
    c.bench_function("eval Gram matrix, 50 steps, f64", |b| {
        b.iter(|| distance.eval(&ctx, black_box(&params)).unwrap())
    });
}

fn bench_eval_exact(c: &mut Criterion) {
    let (ctx, distance) = trajectory(10);
    let params = HashMap::from([("h".to_string(), Expr::rational(1, 2))]);
    c.bench_function("eval Gram matrix, 10 steps, exact", |b| {
        b.iter(|| distance.eval(&ctx, black_box(&params)).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_eval_float, bench_eval_exact);
criterion_main!(benches);
