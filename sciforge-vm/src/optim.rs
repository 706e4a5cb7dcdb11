//! Derivative-free parameter optimization.
//!
//! The inner fit is a plain Nelder-Mead downhill simplex. It is deliberately
//! deterministic: restarts are seeded perturbations of the declared initial
//! values, so the same candidate source always fits to the same parameters.

/// Nelder-Mead downhill simplex minimizer
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    /// Iteration budget
    pub max_iters: usize,
    /// Relative spread of simplex values at which to stop
    pub tol: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self { max_iters: 200, tol: 1e-10 }
    }
}

// Standard coefficients: reflection, expansion, contraction, shrink
const ALPHA: f64 = 1.0;
const GAMMA: f64 = 2.0;
const RHO: f64 = 0.5;
const SIGMA: f64 = 0.5;

impl NelderMead {
    pub fn new(max_iters: usize) -> Self {
        Self { max_iters, ..Self::default() }
    }

    /// Minimize `f` starting from `x0`, returning the best point and value.
    ///
    /// Non-finite objective values are treated as +inf so the simplex walks
    /// away from singular regions instead of corrupting comparisons.
    pub fn minimize<F>(&self, f: F, x0: &[f64]) -> (Vec<f64>, f64)
    where
        F: Fn(&[f64]) -> f64,
    {
        let n = x0.len();
        let g = |x: &[f64]| {
            let v = f(x);
            if v.is_finite() {
                v
            } else {
                f64::INFINITY
            }
        };

        if n == 0 {
            return (Vec::new(), g(x0));
        }

        // initial simplex: x0 plus one perturbed vertex per dimension
        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        simplex.push((x0.to_vec(), g(x0)));
        for i in 0..n {
            let mut v = x0.to_vec();
            let step = if v[i] != 0.0 { 0.25 * v[i].abs() } else { 0.25 };
            v[i] += step;
            let fv = g(&v);
            simplex.push((v, fv));
        }

        for _ in 0..self.max_iters {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));

            let best = simplex[0].1;
            let worst = simplex[n].1;
            if spread_converged(best, worst, self.tol) {
                break;
            }

            // centroid of all but the worst vertex
            let mut centroid = vec![0.0; n];
            for (v, _) in simplex.iter().take(n) {
                for (c, x) in centroid.iter_mut().zip(v) {
                    *c += x;
                }
            }
            for c in centroid.iter_mut() {
                *c /= n as f64;
            }

            let reflected = blend(&centroid, &simplex[n].0, -ALPHA);
            let f_reflected = g(&reflected);

            if f_reflected < simplex[0].1 {
                // try expanding further along the same direction
                let expanded = blend(&centroid, &simplex[n].0, -GAMMA);
                let f_expanded = g(&expanded);
                simplex[n] = if f_expanded < f_reflected {
                    (expanded, f_expanded)
                } else {
                    (reflected, f_reflected)
                };
                continue;
            }

            if f_reflected < simplex[n - 1].1 {
                simplex[n] = (reflected, f_reflected);
                continue;
            }

            let contracted = blend(&centroid, &simplex[n].0, RHO);
            let f_contracted = g(&contracted);
            if f_contracted < simplex[n].1 {
                simplex[n] = (contracted, f_contracted);
                continue;
            }

            // shrink everything toward the best vertex
            let best_point = simplex[0].0.clone();
            for (v, fv) in simplex.iter_mut().skip(1) {
                for (x, b) in v.iter_mut().zip(&best_point) {
                    *x = b + SIGMA * (*x - b);
                }
                *fv = g(v);
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        simplex.swap_remove(0)
    }
}

/// Point at `centroid + coeff * (point - centroid)`
fn blend(centroid: &[f64], point: &[f64], coeff: f64) -> Vec<f64> {
    centroid
        .iter()
        .zip(point)
        .map(|(c, p)| c + coeff * (p - c))
        .collect()
}

fn spread_converged(best: f64, worst: f64, tol: f64) -> bool {
    if !worst.is_finite() {
        return false;
    }
    (worst - best).abs() <= tol * (best.abs() + tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimize_quadratic() {
        let nm = NelderMead::new(500);
        let (x, fx) = nm.minimize(|p| (p[0] - 3.0).powi(2) + (p[1] + 1.0).powi(2), &[0.0, 0.0]);
        assert!(fx < 1e-8, "fx = {}", fx);
        assert!((x[0] - 3.0).abs() < 1e-3);
        assert!((x[1] + 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_minimize_zero_dimensional() {
        let nm = NelderMead::default();
        let (x, fx) = nm.minimize(|_| 42.0, &[]);
        assert!(x.is_empty());
        assert_eq!(fx, 42.0);
    }

    #[test]
    fn test_non_finite_regions_avoided() {
        // objective is NaN left of zero, quadratic right of it
        let nm = NelderMead::new(500);
        let f = |p: &[f64]| {
            if p[0] < 0.0 {
                f64::NAN
            } else {
                (p[0] - 2.0).powi(2)
            }
        };
        let (x, fx) = nm.minimize(f, &[0.5]);
        assert!(fx < 1e-6);
        assert!((x[0] - 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_deterministic() {
        let nm = NelderMead::new(300);
        let f = |p: &[f64]| (p[0] - 1.0).powi(2) * (p[0] + 2.0).powi(2) + p[0].sin();
        let a = nm.minimize(f, &[0.3]);
        let b = nm.minimize(f, &[0.3]);
        assert_eq!(a, b);
    }
}
