//! Primal-dual hybrid gradient engine for standard form LPs.
//!
//! Solves
//!
//! ```text
//! minimize    c'x + k
//! subject to  a_i'x  = b_i   i in 1..n_eq
//!             a_i'x >= b_i   otherwise
//!             lb <= x <= ub
//! ```
//!
//! via the saddle point form `min_x max_y  c'x + y'(b - Ax)` with the
//! dual constrained to `y_i >= 0` on the inequality rows.  One iteration
//! takes a projected primal gradient step followed by a projected dual
//! ascent step at the extrapolated primal point.  The stepsize adapts to
//! the observed primal-dual interaction, the iteration restarts
//! according to the configured restart policy, and a primal weight
//! balances the primal and dual stepsizes.

use crate::algebra::*;
use crate::problem::{rescale_problem, StandardFormProblem};
use crate::solver::*;
use itertools::izip;
use std::iter::zip;
use std::time::Instant;

const POWER_ITERATIONS: usize = 20;

/// First-order PDHG engine implementing [`SolveEngine`].
pub struct PdhgSolver;

impl<T: FloatT> SolveEngine<T> for PdhgSolver {
    fn solve(&self, problem: &StandardFormProblem<T>, settings: &PdhgSettings<T>) -> SolveResult<T> {
        solve(problem, settings)
    }
}

/// Solve `problem` with the primal-dual hybrid gradient method.
pub fn solve<T: FloatT>(
    problem: &StandardFormProblem<T>,
    settings: &PdhgSettings<T>,
) -> SolveResult<T> {
    Workspace::new(problem, settings).run()
}

// scalar convergence measurements for one candidate point, always
// taken against the original (unscaled) problem data
#[derive(Clone, Copy, Debug)]
struct ConvergenceInfo<T> {
    primal_objective: T,
    dual_objective: T,
    primal_residual_norm: T,
    dual_residual_norm: T,
    gap: T,
    merit: T,
}

struct Workspace<'a, T: FloatT> {
    original: &'a StandardFormProblem<T>,
    scaled: StandardFormProblem<T>,
    settings: &'a PdhgSettings<T>,
    row_scale: Vec<T>,
    col_scale: Vec<T>,

    //norms of the original data, fixed for relative tolerances
    b_norm: T,
    c_norm: T,

    //iterates, in the scaled space
    x: Vec<T>,
    y: Vec<T>,
    ax: Vec<T>, // A*x, maintained across accepted steps
    x_avg: Vec<T>,
    y_avg: Vec<T>,
    weight_sum: T,

    //adaptive stepsize and primal weight state
    eta: T,
    eta_floor: T,
    omega: T,
    step_attempts: usize,

    //restart bookkeeping
    x_restart: Vec<T>,
    y_restart: Vec<T>,
    merit_restart: T,
    merit_prev_candidate: T,
    iters_since_restart: u32,

    iteration: u32,
    start: Instant,

    //work buffers
    grad: Vec<T>,
    dx: Vec<T>,
    a_dx: Vec<T>,
    x_next: Vec<T>,
    y_next: Vec<T>,
    xu: Vec<T>,
    yu: Vec<T>,
    work_m: Vec<T>,
    work_n: Vec<T>,
}

impl<'a, T: FloatT> Workspace<'a, T> {
    fn new(original: &'a StandardFormProblem<T>, settings: &'a PdhgSettings<T>) -> Self {
        let scaled = rescale_problem(
            original,
            settings.l_inf_ruiz_iterations,
            settings.l2_norm_rescaling,
            settings.pock_chambolle_alpha,
        );
        let (m, n) = scaled.constraint_matrix.size();

        let row_scale = scaled.row_scaling_or_ones();
        let col_scale = scaled.col_scaling_or_ones();

        let norm_a = estimate_operator_norm(&scaled.constraint_matrix);
        let eta = if norm_a > T::zero() {
            norm_a.recip()
        } else {
            T::one()
        };

        let mut omega = settings.primal_importance;
        if settings.scale_invariant_initial_primal_weight {
            let c_norm = scaled.objective_vector.norm();
            let b_norm = scaled.right_hand_side.norm();
            if c_norm > T::zero() && b_norm > T::zero() {
                omega = settings.primal_importance * c_norm / b_norm;
            }
        }

        //start from the projection of the origin onto the box
        let mut x = vec![T::zero(); n];
        for (xi, (&l, &u)) in zip(
            &mut x,
            zip(&scaled.variable_lower_bound, &scaled.variable_upper_bound),
        ) {
            *xi = xi.clip(l, u);
        }
        let y = vec![T::zero(); m];

        let mut ax = vec![T::zero(); m];
        scaled.constraint_matrix.gemv(&mut ax, &x, T::one(), T::zero());

        Self {
            original,
            settings,
            row_scale,
            col_scale,
            b_norm: original.right_hand_side.norm(),
            c_norm: original.objective_vector.norm(),
            x_avg: x.clone(),
            y_avg: y.clone(),
            weight_sum: T::zero(),
            eta,
            eta_floor: eta * T::epsilon(),
            omega,
            step_attempts: 0,
            x_restart: x.clone(),
            y_restart: y.clone(),
            merit_restart: T::infinity(),
            merit_prev_candidate: T::infinity(),
            iters_since_restart: 0,
            iteration: 0,
            start: Instant::now(),
            grad: vec![T::zero(); n],
            dx: vec![T::zero(); n],
            a_dx: vec![T::zero(); m],
            x_next: vec![T::zero(); n],
            y_next: vec![T::zero(); m],
            xu: vec![T::zero(); n],
            yu: vec![T::zero(); m],
            work_m: vec![T::zero(); m],
            work_n: vec![T::zero(); n],
            x,
            y,
            ax,
            scaled,
        }
    }

    fn run(mut self) -> SolveResult<T> {
        let (m, n) = self.scaled.constraint_matrix.size();
        let mut result = SolveResult::new(n, m);

        self.print_banner();

        let freq = self.settings.termination_evaluation_frequency;
        let criteria = &self.settings.termination;

        loop {
            let elapsed = self.start.elapsed().as_secs_f64();
            let hit_iteration_limit = self.iteration >= criteria.iteration_limit;
            let hit_time_limit = elapsed >= criteria.time_sec_limit;
            let at_evaluation = self.iteration % freq == 0;

            if at_evaluation || hit_iteration_limit || hit_time_limit {
                let info_cur = self.evaluate(false);
                let have_avg = self.weight_sum > T::zero();
                let info_avg = if have_avg {
                    self.evaluate(true)
                } else {
                    info_cur
                };

                //report whichever candidate currently looks better
                let avg_is_better = have_avg && info_avg.merit <= info_cur.merit;
                let info_best = if avg_is_better { info_avg } else { info_cur };

                self.print_status(&info_best);
                if self.settings.record_iteration_stats {
                    result.iteration_stats.push(IterationStats {
                        iteration: self.iteration,
                        cumulative_time_sec: elapsed,
                        primal_objective: info_best.primal_objective,
                        dual_objective: info_best.dual_objective,
                        primal_residual_norm: info_best.primal_residual_norm,
                        dual_residual_norm: info_best.dual_residual_norm,
                        stepsize: self.eta,
                        primal_weight: self.omega,
                    });
                }

                let avg_optimal =
                    have_avg && is_optimal(&info_avg, criteria, self.b_norm, self.c_norm);
                let cur_optimal = is_optimal(&info_cur, criteria, self.b_norm, self.c_norm);

                if avg_optimal || cur_optimal {
                    let use_avg = avg_optimal && (!cur_optimal || avg_is_better);
                    result.status = SolverStatus::Optimal;
                    self.extract(use_avg, &mut result);
                    break;
                }

                if !self.x.is_finite_all() || !self.y.is_finite_all() {
                    result.status = SolverStatus::NumericalError;
                    self.extract(avg_is_better, &mut result);
                    break;
                }

                if hit_iteration_limit {
                    result.status = SolverStatus::IterationLimit;
                    self.extract(avg_is_better, &mut result);
                    break;
                }
                if hit_time_limit {
                    result.status = SolverStatus::TimeLimit;
                    self.extract(avg_is_better, &mut result);
                    break;
                }

                if self.iteration == 0 {
                    self.merit_restart = info_cur.merit;
                    self.merit_prev_candidate = info_cur.merit;
                } else if at_evaluation {
                    self.consider_restart(&info_cur, &info_avg);
                }
            }

            if !self.step() {
                result.status = SolverStatus::NumericalError;
                self.extract(false, &mut result);
                break;
            }
            self.iteration += 1;
            self.iters_since_restart += 1;
        }

        result.iterations = self.iteration;
        result.solve_time = self.start.elapsed().as_secs_f64();
        self.print_summary(&result);
        result
    }

    // one PDHG iteration with the adaptive stepsize rule; false when the
    // stepsize has collapsed below the numerical floor
    fn step(&mut self) -> bool {
        let one = T::one();
        let two: T = (2.0).as_T();
        let half: T = (0.5).as_T();
        let n_eq = self.scaled.num_equalities;

        //grad = c - A'y
        self.grad.copy_from(&self.scaled.objective_vector);
        self.scaled
            .constraint_matrix
            .t()
            .gemv(&mut self.grad, &self.y, -one, one);

        let lb = &self.scaled.variable_lower_bound;
        let ub = &self.scaled.variable_upper_bound;
        let b = &self.scaled.right_hand_side;

        loop {
            let tau = self.eta / self.omega;
            let sigma = self.eta * self.omega;

            //primal gradient step with box projection
            for (xn, &xi, &g, &l, &u) in izip!(&mut self.x_next, &self.x, &self.grad, lb, ub) {
                *xn = (xi - tau * g).clip(l, u);
            }
            for (d, (&xn, &xi)) in zip(&mut self.dx, zip(&self.x_next, &self.x)) {
                *d = xn - xi;
            }
            self.scaled
                .constraint_matrix
                .gemv(&mut self.a_dx, &self.dx, one, T::zero());

            //dual ascent at the extrapolated primal point,
            //A*(2x⁺ - x) = A*x + 2*A*dx
            for (i, (yn, &yi, &bi, &axi, &adxi)) in
                izip!(&mut self.y_next, &self.y, b, &self.ax, &self.a_dx).enumerate()
            {
                let v = yi + sigma * (bi - axi - two * adxi);
                *yn = if i < n_eq { v } else { T::max(v, T::zero()) };
            }

            //movement/interaction test for the attempted stepsize
            let dx_norm = self.dx.norm();
            let dy_norm = self.y_next.dist(&self.y);
            let movement =
                half * self.omega * dx_norm * dx_norm + half / self.omega * dy_norm * dy_norm;
            let interaction = izip!(&self.y_next, &self.y, &self.a_dx)
                .fold(T::zero(), |acc, (&yn, &yi, &adx)| acc + (yn - yi) * adx)
                .abs();
            let limit = if interaction > T::zero() {
                movement / interaction
            } else {
                T::infinity()
            };

            let eta_used = self.eta;
            let accepted = eta_used <= limit;

            //next candidate stepsize: contract toward the limit, grow
            //away from it, both decaying with the attempt count
            self.step_attempts += 1;
            let k = (self.step_attempts + 1).as_T();
            let contraction = one - T::powf(k, -self.settings.stepsize.reduction_exponent);
            let growth = one + T::powf(k, -self.settings.stepsize.growth_exponent);
            self.eta = T::min(limit * contraction, eta_used * growth);

            if !self.eta.is_finite() || self.eta < self.eta_floor {
                return false;
            }

            if accepted {
                std::mem::swap(&mut self.x, &mut self.x_next);
                std::mem::swap(&mut self.y, &mut self.y_next);
                self.ax.axpby(one, &self.a_dx, one);

                //stepsize-weighted running averages
                self.weight_sum += eta_used;
                let ratio = eta_used / self.weight_sum;
                for (avg, &xi) in zip(&mut self.x_avg, &self.x) {
                    *avg += ratio * (xi - *avg);
                }
                for (avg, &yi) in zip(&mut self.y_avg, &self.y) {
                    *avg += ratio * (yi - *avg);
                }
                return true;
            }
        }
    }

    fn consider_restart(&mut self, info_cur: &ConvergenceInfo<T>, info_avg: &ConvergenceInfo<T>) {
        let params = &self.settings.restart;
        if params.scheme == RestartScheme::NoRestarts || self.iters_since_restart == 0 {
            return;
        }

        let use_avg = match params.metric {
            RestartMetric::Average => self.weight_sum > T::zero(),
            RestartMetric::GreedyKkt => {
                self.weight_sum > T::zero() && info_avg.merit <= info_cur.merit
            }
        };
        let cand_merit = if use_avg {
            info_avg.merit
        } else {
            info_cur.merit
        };

        let do_restart = match params.scheme {
            RestartScheme::NoRestarts => false,
            RestartScheme::FixedFrequency => self.iters_since_restart >= params.frequency,
            RestartScheme::AdaptiveKkt => {
                let sufficient =
                    cand_merit <= params.sufficient_reduction_for_restart * self.merit_restart;
                let necessary = cand_merit
                    <= params.necessary_reduction_for_restart * self.merit_restart
                    && cand_merit > self.merit_prev_candidate;
                let restart_count: T = (self.iters_since_restart as usize).as_T();
                let iteration_count: T = (self.iteration as usize).as_T();
                let artificial = restart_count
                    >= params.artificial_restart_threshold * iteration_count;
                sufficient || necessary || artificial
            }
        };
        self.merit_prev_candidate = cand_merit;

        if !do_restart {
            return;
        }

        let (cand_x, cand_y) = if use_avg {
            (self.x_avg.clone(), self.y_avg.clone())
        } else {
            (self.x.clone(), self.y.clone())
        };

        //primal weight update in log space, smoothed over the
        //displacement observed across the restart interval
        let dx = cand_x.dist(&self.x_restart);
        let dy = cand_y.dist(&self.y_restart);
        let smoothing = self.settings.restart.primal_weight_update_smoothing;
        if dx > T::zero() && dy > T::zero() && smoothing > T::zero() {
            let ratio = dy / dx;
            self.omega = T::exp(
                smoothing * ratio.ln() + (T::one() - smoothing) * self.omega.ln(),
            );
        }

        self.x.copy_from(&cand_x);
        self.y.copy_from(&cand_y);
        self.scaled
            .constraint_matrix
            .gemv(&mut self.ax, &self.x, T::one(), T::zero());

        self.x_avg.copy_from(&self.x);
        self.y_avg.copy_from(&self.y);
        self.weight_sum = T::zero();

        self.x_restart = cand_x;
        self.y_restart = cand_y;
        self.merit_restart = cand_merit;
        self.iters_since_restart = 0;

        if self.settings.verbosity >= 2 {
            println!(
                "restart at iteration {:>8}:  merit = {:.4e}, primal weight = {:.4e}",
                self.iteration, cand_merit, self.omega
            );
        }
    }

    // map a candidate back to the original space through the scaling
    // vectors: x = C x', y = R y'
    fn unscale(&mut self, use_avg: bool) {
        let xs = if use_avg { &self.x_avg } else { &self.x };
        let ys = if use_avg { &self.y_avg } else { &self.y };
        for (u, (&v, &s)) in zip(&mut self.xu, zip(xs, &self.col_scale)) {
            *u = v * s;
        }
        for (u, (&v, &s)) in zip(&mut self.yu, zip(ys, &self.row_scale)) {
            *u = v * s;
        }
    }

    fn evaluate(&mut self, use_avg: bool) -> ConvergenceInfo<T> {
        self.unscale(use_avg);
        convergence_info(
            self.original,
            &self.xu,
            &self.yu,
            &mut self.work_m,
            &mut self.work_n,
        )
    }

    fn extract(&mut self, use_avg: bool, result: &mut SolveResult<T>) {
        self.unscale(use_avg);
        result.x.copy_from(&self.xu);
        result.y.copy_from(&self.yu);
    }

    fn print_banner(&self) {
        if self.settings.verbosity < 2 {
            return;
        }
        println!("-------------------------------------------------------------");
        println!(
            "       firstlp v{}  -  primal-dual hybrid gradient",
            crate::VERSION
        );
        println!("-------------------------------------------------------------");
        println!("problem:");
        println!("  variables     = {}", self.scaled.num_variables());
        println!(
            "  constraints   = {}  ({} equality)",
            self.scaled.num_constraints(),
            self.scaled.num_equalities
        );
        println!("  nnz(A)        = {}", self.scaled.nnz());
        if self.settings.verbosity >= 3 {
            println!(
                "{:>9} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10}",
                "iter", "pobj", "dobj", "gap", "pres", "dres", "step"
            );
        }
    }

    fn print_status(&self, info: &ConvergenceInfo<T>) {
        if self.settings.verbosity < 3 {
            return;
        }
        println!(
            "{:>9} {:>12.4e} {:>12.4e} {:>10.2e} {:>10.2e} {:>10.2e} {:>10.2e}",
            self.iteration,
            info.primal_objective,
            info.dual_objective,
            info.gap,
            info.primal_residual_norm,
            info.dual_residual_norm,
            self.eta
        );
    }

    fn print_summary(&self, result: &SolveResult<T>) {
        if self.settings.verbosity < 1 {
            return;
        }
        println!("terminated with status = {}", result.status);
        println!("  iterations = {}", result.iterations);
        println!("  solve time = {:.3e}s", result.solve_time);
    }
}

// ---------------------------------------------------------
// convergence measurement
// ---------------------------------------------------------

fn convergence_info<T: FloatT>(
    problem: &StandardFormProblem<T>,
    x: &[T],
    y: &[T],
    work_m: &mut [T],
    work_n: &mut [T],
) -> ConvergenceInfo<T> {
    let a = &problem.constraint_matrix;
    let n_eq = problem.num_equalities;

    //primal residuals: equality rows measure |a'x - b|, inequality rows
    //only the violation max(0, b - a'x)
    a.gemv(work_m, x, T::one(), T::zero());
    let mut pres_sq = T::zero();
    for (i, (&axi, &bi)) in zip(work_m.iter(), &problem.right_hand_side).enumerate() {
        let r = axi - bi;
        let viol = if i < n_eq { r } else { T::min(r, T::zero()) };
        pres_sq += viol * viol;
    }

    //reduced costs c - A'y, split into the part absorbable by finite
    //bound multipliers and the leftover dual residual
    work_n.copy_from(&problem.objective_vector);
    a.t().gemv(work_n, y, -T::one(), T::one());
    let mut dres_sq = T::zero();
    let mut bound_term = T::zero();
    for (j, &rc) in work_n.iter().enumerate() {
        let lb = problem.variable_lower_bound[j];
        let ub = problem.variable_upper_bound[j];
        let absorbed = if rc > T::zero() && lb.is_finite() {
            rc
        } else if rc < T::zero() && ub.is_finite() {
            rc
        } else {
            T::zero()
        };
        let resid = rc - absorbed;
        dres_sq += resid * resid;
        if absorbed > T::zero() {
            bound_term += absorbed * lb;
        } else if absorbed < T::zero() {
            bound_term += absorbed * ub;
        }
    }

    let primal_objective = problem.objective_value(x);
    let dual_objective =
        problem.right_hand_side.dot(y) + bound_term + problem.objective_constant;
    let gap = (primal_objective - dual_objective).abs();

    let primal_residual_norm = pres_sq.sqrt();
    let dual_residual_norm = dres_sq.sqrt();
    let merit = (pres_sq + dres_sq + gap * gap).sqrt();

    ConvergenceInfo {
        primal_objective,
        dual_objective,
        primal_residual_norm,
        dual_residual_norm,
        gap,
        merit,
    }
}

fn is_optimal<T: FloatT>(
    info: &ConvergenceInfo<T>,
    criteria: &TerminationCriteria<T>,
    b_norm: T,
    c_norm: T,
) -> bool {
    let abs = criteria.eps_optimal_absolute;
    let rel = criteria.eps_optimal_relative;
    info.primal_residual_norm <= abs + rel * b_norm
        && info.dual_residual_norm <= abs + rel * c_norm
        && info.gap <= abs + rel * (info.primal_objective.abs() + info.dual_objective.abs())
}

// power iteration estimate of ||A||₂, from a deterministic start vector
fn estimate_operator_norm<T: FloatT>(a: &CscMatrix<T>) -> T {
    let (m, n) = a.size();
    if a.nnz() == 0 || m == 0 || n == 0 {
        return T::zero();
    }

    let mut v = vec![T::one(); n];
    let norm = v.norm();
    v.scale(norm.recip());

    let mut av = vec![T::zero(); m];
    let mut w = vec![T::zero(); n];
    let mut lambda = T::zero();

    for _ in 0..POWER_ITERATIONS {
        a.gemv(&mut av, &v, T::one(), T::zero());
        a.t().gemv(&mut w, &av, T::one(), T::zero());
        lambda = w.norm();
        if lambda == T::zero() {
            break;
        }
        v.copy_from(&w);
        v.scale(lambda.recip());
    }

    lambda.sqrt()
}

// ---------------------------------------------------------

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::problem::StandardFormProblem;

    fn quiet_settings() -> PdhgSettings<f64> {
        PdhgSettingsBuilder::default().verbosity(1).build().unwrap()
    }

    #[test]
    fn test_operator_norm_estimate() {
        // diag(3, 4) has operator norm 4
        let A = CscMatrix::<f64>::from_triplets(2, 2, &[0, 1], &[0, 1], &[3.0, 4.0]);
        let est = estimate_operator_norm(&A);
        assert!((est - 4.0).abs() < 1e-3, "estimate was {}", est);

        let Z = CscMatrix::<f64>::spalloc(2, 2, 0);
        assert_eq!(estimate_operator_norm(&Z), 0.0);
    }

    fn equality_lp() -> StandardFormProblem<f64> {
        // min -x1 - 2 x2  s.t.  x1 + x2 = 1,  0 <= x <= 1
        // optimum x = (0, 1), objective -2
        let A = CscMatrix::from_triplets(1, 2, &[0, 0], &[0, 1], &[1.0, 1.0]);
        StandardFormProblem::new(
            vec![-1.0, -2.0],
            0.0,
            A,
            vec![1.0],
            vec![0.0, 0.0],
            vec![1.0, 1.0],
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_solves_equality_lp() {
        let problem = equality_lp();
        let result = solve(&problem, &quiet_settings());

        assert_eq!(result.status, SolverStatus::Optimal);
        let objective = problem.objective_value(&result.x);
        assert!(
            (objective + 2.0).abs() < 1e-3,
            "objective was {}",
            objective
        );
        assert!((result.x[0] - 0.0).abs() < 1e-3);
        assert!((result.x[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_solves_inequality_lp() {
        // min x1 + x2  s.t.  x1 + x2 >= 1,  x >= 0: optimal value 1
        let A = CscMatrix::from_triplets(1, 2, &[0, 0], &[0, 1], &[1.0, 1.0]);
        let problem = StandardFormProblem::new(
            vec![1.0, 1.0],
            0.0,
            A,
            vec![1.0],
            vec![0.0, 0.0],
            vec![f64::INFINITY, f64::INFINITY],
            0,
        )
        .unwrap();

        let result = solve(&problem, &quiet_settings());
        assert_eq!(result.status, SolverStatus::Optimal);
        let objective = problem.objective_value(&result.x);
        assert!((objective - 1.0).abs() < 1e-3, "objective was {}", objective);
        //inequality duals stay nonnegative under projection
        assert!(result.y[0] >= 0.0);
    }

    #[test]
    fn test_solves_box_only_lp() {
        // no constraint rows at all: minimize over the box alone
        let A = CscMatrix::<f64>::spalloc(0, 2, 0);
        let problem = StandardFormProblem::new(
            vec![1.0, -1.0],
            0.0,
            A,
            vec![],
            vec![0.0, 0.0],
            vec![2.0, 3.0],
            0,
        )
        .unwrap();

        let result = solve(&problem, &quiet_settings());
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!((result.x[0] - 0.0).abs() < 1e-4);
        assert!((result.x[1] - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_iteration_limit_status() {
        let problem = equality_lp();
        let mut settings = quiet_settings();
        settings.termination.iteration_limit = 1;
        settings.termination_evaluation_frequency = 1;

        let result = solve(&problem, &settings);
        assert_eq!(result.status, SolverStatus::IterationLimit);
        assert!(result.iterations <= 1);
    }

    #[test]
    fn test_solution_respects_bounds() {
        let problem = equality_lp();
        let result = solve(&problem, &quiet_settings());
        for (&xi, (&l, &u)) in std::iter::zip(
            &result.x,
            std::iter::zip(&problem.variable_lower_bound, &problem.variable_upper_bound),
        ) {
            assert!(xi >= l - 1e-9 && xi <= u + 1e-9);
        }
    }

    #[test]
    fn test_record_iteration_stats() {
        let problem = equality_lp();
        let mut settings = quiet_settings();
        settings.record_iteration_stats = true;

        let result = solve(&problem, &settings);
        assert!(!result.iteration_stats.is_empty());
        let last = result.iteration_stats.last().unwrap();
        assert!(last.iteration <= result.iterations);
        assert!(last.stepsize > 0.0);
        assert!(last.primal_weight > 0.0);
    }

    #[test]
    fn test_deterministic_given_identical_inputs() {
        let problem = equality_lp();
        let settings = quiet_settings();
        let r1 = solve(&problem, &settings);
        let r2 = solve(&problem, &settings);
        assert_eq!(r1.iterations, r2.iterations);
        assert_eq!(r1.x, r2.x);
        assert_eq!(r1.y, r2.y);
    }

    #[test]
    fn test_rescaling_does_not_change_answer() {
        // badly scaled version of the equality LP
        let A = CscMatrix::from_triplets(1, 2, &[0, 0], &[0, 1], &[1000.0, 0.001]);
        let problem = StandardFormProblem::new(
            vec![-1000.0, -0.002],
            0.0,
            A,
            vec![1.0],
            vec![0.0, 0.0],
            vec![0.001, 1000.0],
            1,
        )
        .unwrap();

        let mut settings = quiet_settings();
        settings.l_inf_ruiz_iterations = 10;
        settings.l2_norm_rescaling = true;
        let result = solve(&problem, &settings);

        assert_eq!(result.status, SolverStatus::Optimal);
        // optimum: 1000*x1 + 0.001*x2 = 1 with cheapest mass on x2:
        // c per unit of b is -1 for x1 and -2 for x2, so x2 = 1000, x1 = 0
        let objective = problem.objective_value(&result.x);
        assert!((objective + 2.0).abs() < 1e-2, "objective was {}", objective);
    }
}
