// Smallest enclosing ball and viewport fitting.
//
// The ball is found by farthest-point insertion: start from the bounding-box
// center with radius 0, repeatedly add the point farthest outside the current
// ball to a support set, and recompute the smallest ball containing the
// support. That ball is always spanned by at most four support points, so it
// is found by trying the circumball of every subset of up to four points and
// keeping the smallest one that contains the whole support. Support points
// left strictly inside the new ball are dropped, the most interior first.
//
// Each insertion strictly grows the ball, so the loop converges long before
// `MAX_ITERATIONS` on real input. Whatever happens, the radius is widened at
// the end so every input point lies inside.
//
// `normalize` then maps the ball onto a viewport: centered on the viewport
// center, radius scaled to the space left inside the margin.

use crate::error::BoundsError;
use nalgebra::{DMatrix, DVector, Point3, Vector3};
use tracing::{debug, warn};

/// Convergence tolerance for "inside the ball".
pub const EPSILON: f64 = 1e-10;
pub const MAX_ITERATIONS: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Ball {
    pub fn contains(&self, point: &Point3<f64>, tolerance: f64) -> bool {
        nalgebra::distance(&self.center, point) <= self.radius + tolerance
    }
}

/// Smallest Cholesky pivot, relative to the largest, for points to count as
/// affinely independent.
const DEPENDENCE_TOLERANCE: f64 = 1e-6;

/// Slack for accepting a candidate ball, relative to its size.
fn support_tolerance(radius: f64) -> f64 {
    1e-9 * (1.0 + radius)
}

// ---------------------------------------------------------------------------
// Smallest enclosing ball
// ---------------------------------------------------------------------------

pub fn smallest_enclosing_ball(points: &[Point3<f64>]) -> Ball {
    let Some(first) = points.first() else {
        return Ball {
            center: Point3::origin(),
            radius: 0.0,
        };
    };

    let (mut min, mut max) = (first.coords, first.coords);
    for p in points {
        min = min.inf(&p.coords);
        max = max.sup(&p.coords);
    }
    let mut ball = Ball {
        center: Point3::from((min + max) / 2.0),
        radius: 0.0,
    };

    let mut support: Vec<usize> = Vec::new();
    let mut iterations = 0;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let (far, distance) = farthest(points, &ball.center);
        if distance <= ball.radius + EPSILON || support.contains(&far) {
            break;
        }
        support.push(far);
        ball = support_ball(points, &support);

        while let Some(slot) = most_interior(points, &support, &ball) {
            support.remove(slot);
            ball = support_ball(points, &support);
        }
    }

    let (_, distance) = farthest(points, &ball.center);
    ball.radius = ball.radius.max(distance);
    debug!(points = points.len(), iterations, radius = ball.radius, "enclosing ball");
    ball
}

fn support_ball(points: &[Point3<f64>], support: &[usize]) -> Ball {
    let selected: Vec<Point3<f64>> = support.iter().map(|&i| points[i]).collect();
    ball_of_support(&selected)
}

/// Index and distance of the point farthest from `center`.
fn farthest(points: &[Point3<f64>], center: &Point3<f64>) -> (usize, f64) {
    points
        .iter()
        .map(|p| nalgebra::distance(center, p))
        .enumerate()
        .fold((0, 0.0), |best, (i, d)| if d > best.1 { (i, d) } else { best })
}

/// Position in `support` of the point deepest inside `ball`, if any lies
/// inside by more than `EPSILON`.
fn most_interior(points: &[Point3<f64>], support: &[usize], ball: &Ball) -> Option<usize> {
    support
        .iter()
        .enumerate()
        .map(|(slot, &i)| (slot, nalgebra::distance(&ball.center, &points[i])))
        .filter(|&(_, d)| d < ball.radius - EPSILON)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(slot, _)| slot)
}

/// The smallest ball containing every point of `support`.
///
/// Candidates are the circumballs of all subsets of one to four points. If
/// none of them contains the whole support (only possible through rounding),
/// falls back to the centroid and the largest distance from it.
pub fn ball_of_support(support: &[Point3<f64>]) -> Ball {
    let mut best: Option<Ball> = None;
    for size in 1..=support.len().min(4) {
        for subset in combinations(support.len(), size) {
            let chosen: Vec<Point3<f64>> = subset.iter().map(|&i| support[i]).collect();
            let Some(candidate) = circumball(&chosen) else {
                continue;
            };
            if best.is_some_and(|b| b.radius <= candidate.radius) {
                continue;
            }
            let tolerance = support_tolerance(candidate.radius);
            if support.iter().all(|p| candidate.contains(p, tolerance)) {
                best = Some(candidate);
            }
        }
    }
    best.unwrap_or_else(|| centroid_ball(support))
}

/// The ball with every point of `points` on its boundary whose center lies in
/// their affine hull. `None` when the points are affinely dependent (or there
/// are none).
pub fn circumball(points: &[Point3<f64>]) -> Option<Ball> {
    match points {
        [] => None,
        [p] => Some(Ball {
            center: *p,
            radius: 0.0,
        }),
        [a, b] => Some(Ball {
            center: nalgebra::center(a, b),
            radius: nalgebra::distance(a, b) / 2.0,
        }),
        [origin, rest @ ..] => {
            // Center = origin + Σ λ_j v_j with |c - p_i| = |c - origin| for
            // every i, which gives the Gram system 2·G·λ = (|v_i|²).
            let edges: Vec<Vector3<f64>> = rest.iter().map(|p| p - origin).collect();
            let m = edges.len();
            let gram = DMatrix::from_fn(m, m, |i, j| 2.0 * edges[i].dot(&edges[j]));
            let rhs = DVector::from_fn(m, |i, _| edges[i].norm_squared());
            let cholesky = gram.cholesky()?;
            // Rounding can let a singular Gram matrix through with a near-zero
            // pivot, so rank is judged against the largest pivot.
            let pivots = cholesky.l_dirty().diagonal();
            let largest = pivots.max();
            if pivots.min() <= DEPENDENCE_TOLERANCE * largest {
                return None;
            }
            let lambda = cholesky.solve(&rhs);
            let offset = edges
                .iter()
                .zip(lambda.iter())
                .fold(Vector3::zeros(), |acc, (v, l)| acc + v * *l);
            if !offset.iter().all(|x| x.is_finite()) {
                return None;
            }
            let ball = Ball {
                center: origin + offset,
                radius: offset.norm(),
            };
            let tolerance = support_tolerance(ball.radius);
            let on_boundary = points
                .iter()
                .all(|p| (nalgebra::distance(&ball.center, p) - ball.radius).abs() <= tolerance);
            on_boundary.then_some(ball)
        }
    }
}

fn centroid_ball(points: &[Point3<f64>]) -> Ball {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    let center = Point3::from(sum / points.len().max(1) as f64);
    let radius = points
        .iter()
        .map(|p| nalgebra::distance(&center, p))
        .fold(0.0, f64::max);
    Ball { center, radius }
}

/// All `size`-element index subsets of `0..n`, in lexicographic order.
fn combinations(n: usize, size: usize) -> Vec<Vec<usize>> {
    if size == 0 || size > n {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut current: Vec<usize> = (0..size).collect();
    loop {
        out.push(current.clone());
        let Some(i) = (0..size).rev().find(|&i| current[i] < n - size + i) else {
            return out;
        };
        current[i] += 1;
        for j in (i + 1)..size {
            current[j] = current[j - 1] + 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Viewport fitting
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Space kept clear on every side, e.g. for labels.
    pub margin: f64,
}

impl Viewport {
    pub fn square(size: f64, margin: f64) -> Self {
        Viewport {
            width: size,
            height: size,
            margin,
        }
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(self.width / 2.0, self.height / 2.0, 0.0)
    }

    /// Radius available to the points once the margin is taken out.
    pub fn target_radius(&self) -> Result<f64, BoundsError> {
        let size = self.width.min(self.height);
        let fits = size >= 2.0 * self.margin && self.margin >= 0.0;
        if !fits {
            return Err(BoundsError::ViewportTooSmall {
                size,
                margin: self.margin,
            });
        }
        Ok((size - 2.0 * self.margin) / 2.0)
    }
}

/// Points mapped into viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub points: Vec<Point3<f64>>,
    /// The enclosing ball of the input, before scaling.
    pub ball: Ball,
    pub scale: f64,
    /// Every input point coincided, so nothing was scaled.
    pub degenerate: bool,
}

pub fn normalize(points: &[Point3<f64>], viewport: &Viewport) -> Result<Normalized, BoundsError> {
    let target = viewport.target_radius()?;
    let ball = smallest_enclosing_ball(points);
    let degenerate = ball.radius == 0.0;
    let scale = if degenerate {
        warn!(points = points.len(), "all points coincide; skipping scaling");
        1.0
    } else {
        target / ball.radius
    };

    let center = viewport.center();
    let points = points
        .iter()
        .map(|p| center + (p - ball.center) * scale)
        .collect();
    Ok(Normalized {
        points,
        ball,
        scale,
        degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use edo_graphs_prng::LayoutRng;

    fn random_points(n: usize, seed: u64) -> Vec<Point3<f64>> {
        let mut rng = LayoutRng::new(seed);
        (0..n)
            .map(|_| Point3::new(rng.next_f64(), rng.next_f64(), rng.next_f64()))
            .collect()
    }

    /// Smallest enclosing radius by exhaustion, from closed-form circumcenters
    /// of every point, pair, triangle and tetrahedron.
    fn brute_force(points: &[Point3<f64>]) -> f64 {
        let n = points.len();
        let mut centers: Vec<Point3<f64>> = points.to_vec();
        for i in 0..n {
            for j in (i + 1)..n {
                centers.push(nalgebra::center(&points[i], &points[j]));
                for k in (j + 1)..n {
                    centers.extend(triangle_circumcenter(points[i], points[j], points[k]));
                    for l in (k + 1)..n {
                        let tetra = [points[i], points[j], points[k], points[l]];
                        centers.extend(tetrahedron_circumcenter(tetra));
                    }
                }
            }
        }
        centers
            .iter()
            .map(|c| points.iter().map(|p| nalgebra::distance(c, p)).fold(0.0, f64::max))
            .fold(f64::INFINITY, f64::min)
    }

    fn triangle_circumcenter(
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
    ) -> Option<Point3<f64>> {
        let (u, v) = (b - a, c - a);
        let w = u.cross(&v);
        let denom = 2.0 * w.norm_squared();
        (denom > 1e-12).then(|| {
            a + (v.cross(&w) * u.norm_squared() + w.cross(&u) * v.norm_squared()) / denom
        })
    }

    fn tetrahedron_circumcenter([a, b, c, d]: [Point3<f64>; 4]) -> Option<Point3<f64>> {
        let (u, v, w) = (b - a, c - a, d - a);
        let denom = 2.0 * u.dot(&v.cross(&w));
        (denom.abs() > 1e-9).then(|| {
            a + (v.cross(&w) * u.norm_squared()
                + w.cross(&u) * v.norm_squared()
                + u.cross(&v) * w.norm_squared())
                / denom
        })
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-7
    }

    #[test]
    fn obtuse_triangle_uses_longest_side() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let ball = smallest_enclosing_ball(&points);
        assert!(close(ball.radius, 2.0));
        assert!(close(nalgebra::distance(&ball.center, &Point3::new(2.0, 0.0, 0.0)), 0.0));
    }

    #[test]
    fn equilateral_triangle_uses_circumcircle() {
        let h = 3.0_f64.sqrt();
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, h, 0.0),
        ];
        let ball = smallest_enclosing_ball(&points);
        assert!(close(ball.radius, 2.0 / h));
        assert!(close(ball.center.y, 1.0 / h));
    }

    #[test]
    fn cube_corners() {
        let mut points = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        let ball = smallest_enclosing_ball(&points);
        assert!(close(ball.radius, 3.0_f64.sqrt() / 2.0));
        assert!(close(nalgebra::distance(&ball.center, &Point3::new(0.5, 0.5, 0.5)), 0.0));
    }

    #[test]
    fn tetrahedron_circumsphere() {
        let points = [
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let ball = circumball(&points).unwrap();
        assert!(close(ball.radius, 3.0_f64.sqrt()));
        assert!(close(ball.center.coords.norm(), 0.0));
    }

    #[test]
    fn collinear_points_have_no_circumball() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(circumball(&points).is_none());
        assert!(close(ball_of_support(&points).radius, 1.0));
    }

    #[test]
    fn coplanar_points_have_no_circumsphere() {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(circumball(&square).is_none());
        assert!(close(ball_of_support(&square).radius, 2.0_f64.sqrt() / 2.0));
    }

    #[test]
    fn circumball_puts_every_point_on_the_boundary() {
        for seed in 0..20 {
            let points = random_points(4, seed);
            for size in 2..=4 {
                let Some(ball) = circumball(&points[..size]) else {
                    continue;
                };
                for p in &points[..size] {
                    let d = nalgebra::distance(&ball.center, p);
                    let r = ball.radius;
                    assert!(close(d, r), "seed {seed}, size {size}: {d} vs {r}");
                }
            }
        }
    }

    #[test]
    fn matches_brute_force_on_small_sets() {
        for seed in 0..40 {
            let n = 2 + (seed as usize % 7);
            let points = random_points(n, seed);
            let ball = smallest_enclosing_ball(&points);
            let expected = brute_force(&points);
            assert!(close(ball.radius, expected), "seed {seed}: {} vs {expected}", ball.radius);
        }
    }

    #[test]
    fn contains_every_point() {
        let points = random_points(300, 17);
        let ball = smallest_enclosing_ball(&points);
        assert!(points.iter().all(|p| ball.contains(p, EPSILON)));
        // Unit cube content: the ball can't be larger than the cube's.
        assert!(ball.radius <= 3.0_f64.sqrt() / 2.0 + 1e-9);
    }

    #[test]
    fn single_and_coincident_points() {
        let p = Point3::new(3.0, -1.0, 2.0);
        let ball = smallest_enclosing_ball(&[p, p, p]);
        assert_eq!(ball.center, p);
        assert_eq!(ball.radius, 0.0);
        assert_eq!(smallest_enclosing_ball(&[]).radius, 0.0);
    }

    #[test]
    fn combinations_are_complete() {
        assert_eq!(combinations(5, 2).len(), 10);
        assert_eq!(combinations(8, 4).len(), 70);
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
        assert!(combinations(2, 3).is_empty());
    }

    #[test]
    fn normalize_fits_the_viewport() {
        let viewport = Viewport::square(800.0, 40.0);
        let normalized = normalize(&random_points(50, 3), &viewport).unwrap();
        assert!(!normalized.degenerate);
        let center = viewport.center();
        let farthest = normalized
            .points
            .iter()
            .map(|p| nalgebra::distance(&center, p))
            .fold(0.0, f64::max);
        assert!(close(farthest, 360.0));
    }

    #[test]
    fn normalize_uses_the_shorter_side() {
        let viewport = Viewport {
            width: 1000.0,
            height: 600.0,
            margin: 50.0,
        };
        let points = [Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let normalized = normalize(&points, &viewport).unwrap();
        assert!(close(normalized.scale, 250.0));
        assert!(close(normalized.points[0].x, 250.0));
        assert!(close(normalized.points[1].x, 750.0));
        assert!(close(normalized.points[0].y, 300.0));
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let p = Point3::new(0.3, 0.3, 0.3);
        let normalized = normalize(&[p, p], &Viewport::square(100.0, 10.0)).unwrap();
        assert!(normalized.degenerate);
        assert_eq!(normalized.scale, 1.0);
        assert_eq!(normalized.points[0], Point3::new(50.0, 50.0, 0.0));
    }

    #[test]
    fn margin_larger_than_viewport_is_an_error() {
        let err = normalize(&random_points(3, 1), &Viewport::square(100.0, 60.0)).unwrap_err();
        assert_eq!(
            err,
            BoundsError::ViewportTooSmall {
                size: 100.0,
                margin: 60.0
            }
        );
    }
}
