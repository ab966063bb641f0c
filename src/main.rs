#![allow(non_snake_case)]
use RustedPEP::pep::config::PepConfig;
use RustedPEP::pep::expression_manager::{Coefficient, ExpressionManager};
use RustedPEP::pep::parameter::Parameter;
use RustedPEP::pep::pep_context::{ContextRegistry, PepContext};
use RustedPEP::pep::pep_error::PepResult;
use RustedPEP::pep::scalar::Scalar;
use RustedPEP::pep::utils::grad_tag;
use RustedPEP::pep::vector::Vector;
use RustedPEP::symbolic::symbolic_engine::Expr;
use log::{error, info};
use std::fmt::Display;

const DEFAULT_TASK: &str = "problem\n name: gd\nsettings\n loglevel: info\nparameters\n L: 1\n h: 1/2\n";

/// One gradient step `x_1 = x_0 - h/L*grad_x_0` and the quantities a PEP for it needs.
struct GradientStep {
    x_1: Vector,
    distance: Scalar,
    decrease: Scalar,
}

fn gradient_step(ctx: &mut PepContext) -> PepResult<GradientStep> {
    let x_star = Vector::basis(ctx, &["x_star"])?;
    let x_0 = Vector::basis(ctx, &["x_0"])?;
    let g_0 = Vector::basis(ctx, &[grad_tag("x_0").as_str()])?;
    let f_0 = Scalar::basis(ctx, &["f_0"])?;
    let f_star = Scalar::basis(ctx, &["f_star"])?;

    let step = Parameter::named("h") / Parameter::named("L");
    let descent = g_0.rmul(ctx, step)?;
    let x_1 = x_0.sub(ctx, descent)?.add_tag(ctx, "x_1")?;

    let error = x_1.sub(ctx, x_star)?;
    let distance = error.pow(ctx, 2)?;
    // f_0 - f_star - <grad_x_0, x_0 - x_star>
    let initial_error = x_0.sub(ctx, x_star)?;
    let linear = g_0.inner(ctx, initial_error)?;
    let gap = f_0.sub(ctx, f_star)?;
    let decrease = gap.sub(ctx, linear)?;
    Ok(GradientStep {
        x_1,
        distance,
        decrease,
    })
}

fn report<T: Coefficient + Display>(ctx: &PepContext, config: &PepConfig, step: &GradientStep) -> PepResult<()> {
    let params = config.resolve_parameters::<T>()?;
    let em = ExpressionManager::new(ctx, params);
    println!("x_1 = {}", em.repr_vector_by_basis(step.x_1)?);
    println!(
        "|x_1 - x_star|^2 = {}",
        em.repr_scalar_by_basis(step.distance, config.greedy_square)?
    );
    println!(
        "f_0 - f_star - <grad_x_0, x_0 - x_star> = {}",
        em.repr_scalar_by_basis(step.decrease, config.greedy_square)?
    );
    let evaluated = em.eval_scalar(step.distance)?;
    println!("Gram matrix of |x_1 - x_star|^2: {}", evaluated.inner_prod_coords);
    Ok(())
}

fn run(config: &PepConfig) -> PepResult<()> {
    config.init_logging()?;
    let mut registry = ContextRegistry::new();
    registry.create(&config.name);
    registry.set_current(Some(&config.name))?;
    let ctx = registry.current_mut()?;
    let step = gradient_step(ctx)?;
    info!(
        "context {} holds {} vectors and {} scalars",
        ctx.name(),
        ctx.num_vectors(),
        ctx.num_scalars()
    );
    if config.sympy_mode {
        // exact evaluation, parameters must be integers or fractions
        report::<Expr>(ctx, config, &step)?;
    } else {
        report::<f64>(ctx, config, &step)?;
    }
    let simplified = step.x_1.simplify(ctx, Some("x_1_simplified"))?;
    println!("simplified: {}", simplified.repr(ctx)?);
    Ok(())
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => PepConfig::from_file(&path),
        None => DEFAULT_TASK.parse::<PepConfig>(),
    };
    let result = config.and_then(|config| run(&config));
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
