//! Two-variable linear programs solved by vertex enumeration.
//!
//! The feasible region is the box `0 <= x <= x_max, 0 <= y <= y_max`
//! intersected with half-planes `a*x + b*y <= rhs`. It is bounded, so when
//! it is non-empty the maximum is attained at a vertex: the intersection of
//! two boundary lines that satisfies every other constraint.

use tracing::trace;

/// Relative slack allowed when testing a vertex against a constraint.
const FEASIBILITY_TOL: f64 = 1e-9;
/// Determinant below which two boundary lines count as parallel.
const PARALLEL_TOL: f64 = 1e-12;

/// `a*x + b*y <= rhs`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub label: &'static str,
    pub a: f64,
    pub b: f64,
    pub rhs: f64,
}

impl HalfPlane {
    pub fn new(label: &'static str, a: f64, b: f64, rhs: f64) -> Self {
        Self { label, a, b, rhs }
    }

    pub fn slack(&self, x: f64, y: f64) -> f64 {
        self.rhs - (self.a * x + self.b * y)
    }

    fn admits(&self, x: f64, y: f64) -> bool {
        let scale = self.rhs.abs().max(self.a.abs().max(self.b.abs())).max(1.0);
        self.slack(x, y) >= -FEASIBILITY_TOL * scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub objective: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LpOutcome {
    Optimal(Vertex),
    Infeasible,
}

/// Maximize `cx*x + cy*y` over the box and the added half-planes.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    objective: (f64, f64),
    upper: (f64, f64),
    constraints: Vec<HalfPlane>,
}

impl LinearProgram {
    pub fn maximize(cx: f64, cy: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            objective: (cx, cy),
            upper: (x_max, y_max),
            constraints: Vec::new(),
        }
    }

    pub fn subject_to(mut self, constraint: HalfPlane) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn constraints(&self) -> &[HalfPlane] {
        &self.constraints
    }

    fn boundaries(&self) -> Vec<HalfPlane> {
        let mut all = vec![
            HalfPlane::new("x>=0", -1.0, 0.0, 0.0),
            HalfPlane::new("y>=0", 0.0, -1.0, 0.0),
            HalfPlane::new("x<=max", 1.0, 0.0, self.upper.0),
            HalfPlane::new("y<=max", 0.0, 1.0, self.upper.1),
        ];
        all.extend(self.constraints.iter().copied());
        all
    }

    /// Vertices are visited in a fixed order and only a strictly better
    /// objective replaces the incumbent, so ties resolve deterministically.
    pub fn solve(&self) -> LpOutcome {
        let lines = self.boundaries();
        let mut best: Option<Vertex> = None;
        let mut feasible_vertices = 0usize;

        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                let (l1, l2) = (&lines[i], &lines[j]);
                let det = l1.a * l2.b - l2.a * l1.b;
                if det.abs() <= PARALLEL_TOL {
                    continue;
                }
                let x = (l1.rhs * l2.b - l2.rhs * l1.b) / det;
                let y = (l1.a * l2.rhs - l2.a * l1.rhs) / det;

                if !lines.iter().all(|h| h.admits(x, y)) {
                    continue;
                }
                feasible_vertices += 1;

                let x = x.clamp(0.0, self.upper.0.max(0.0));
                let y = y.clamp(0.0, self.upper.1.max(0.0));
                let objective = self.objective.0 * x + self.objective.1 * y;
                trace!(x, y, objective, a = l1.label, b = l2.label, "feasible vertex");

                match best {
                    Some(incumbent) if objective <= incumbent.objective => {}
                    _ => best = Some(Vertex { x, y, objective }),
                }
            }
        }

        trace!(feasible_vertices, "vertex enumeration done");
        match best {
            Some(vertex) => LpOutcome::Optimal(vertex),
            None => LpOutcome::Infeasible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_only_picks_best_corner() {
        let lp = LinearProgram::maximize(1.0, 2.0, 10.0, 5.0);
        match lp.solve() {
            LpOutcome::Optimal(v) => {
                assert_eq!((v.x, v.y), (10.0, 5.0));
                assert_eq!(v.objective, 20.0);
            }
            LpOutcome::Infeasible => panic!("box is feasible"),
        }
    }

    #[test]
    fn diagonal_cut_moves_optimum_to_intersection() {
        // x + y <= 8 with x favoured: optimum at (8, 0)
        let lp = LinearProgram::maximize(3.0, 1.0, 10.0, 10.0)
            .subject_to(HalfPlane::new("sum", 1.0, 1.0, 8.0));
        match lp.solve() {
            LpOutcome::Optimal(v) => {
                assert!((v.x - 8.0).abs() < 1e-12);
                assert!(v.y.abs() < 1e-12);
            }
            LpOutcome::Infeasible => panic!("region is non-empty"),
        }

        // x <= 6 as well: optimum at (6, 2)
        let lp = LinearProgram::maximize(3.0, 1.0, 10.0, 10.0)
            .subject_to(HalfPlane::new("sum", 1.0, 1.0, 8.0))
            .subject_to(HalfPlane::new("x", 1.0, 0.0, 6.0));
        match lp.solve() {
            LpOutcome::Optimal(v) => {
                assert!((v.x - 6.0).abs() < 1e-12);
                assert!((v.y - 2.0).abs() < 1e-12);
            }
            LpOutcome::Infeasible => panic!("region is non-empty"),
        }
    }

    #[test]
    fn empty_region_is_infeasible() {
        // x + y <= -1 cannot meet the non-negative quadrant
        let lp = LinearProgram::maximize(1.0, 1.0, 10.0, 10.0)
            .subject_to(HalfPlane::new("neg", 1.0, 1.0, -1.0));
        assert_eq!(lp.solve(), LpOutcome::Infeasible);
    }

    #[test]
    fn negative_objective_stays_at_origin() {
        let lp = LinearProgram::maximize(-1.0, -1.0, 10.0, 10.0);
        match lp.solve() {
            LpOutcome::Optimal(v) => assert_eq!((v.x, v.y), (0.0, 0.0)),
            LpOutcome::Infeasible => panic!("box is feasible"),
        }
    }

    #[test]
    fn zero_width_box_is_a_segment() {
        let lp = LinearProgram::maximize(1.0, 1.0, 0.0, 4.0);
        match lp.solve() {
            LpOutcome::Optimal(v) => assert_eq!((v.x, v.y), (0.0, 4.0)),
            LpOutcome::Infeasible => panic!("segment is feasible"),
        }
    }
}
