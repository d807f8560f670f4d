// Principal-axis projection of a layout to three dimensions.
//
// The points are centered, their covariance is decomposed with
// `SymmetricEigen`, and each point is expressed in the eigenbasis ordered by
// descending variance. Layouts with fewer than three dimensions are rotated
// into their principal axes and padded with zeros; layouts with more keep only
// the top three axes. Eigenvectors are only defined up to sign, so each axis
// is flipped to make its largest-magnitude component positive, which keeps the
// output stable for equal input.

use crate::layout::Layout;
use nalgebra::{DMatrix, DVector, Point3, SymmetricEigen};

/// Project every layout position onto (up to) its three principal axes.
pub fn principal_axes(layout: &Layout) -> Vec<Point3<f64>> {
    let n = layout.len();
    let dims = layout.dimensions;
    if n == 0 || dims == 0 {
        return vec![Point3::origin(); n];
    }

    let data = DMatrix::from_fn(n, dims, |row, col| layout.positions[row][col]);
    let mean = data.row_mean();
    let centered = DMatrix::from_fn(n, dims, |row, col| data[(row, col)] - mean[col]);
    let covariance = centered.transpose() * &centered / n as f64;

    let eigen = SymmetricEigen::new(covariance);
    let mut order: Vec<usize> = (0..dims).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let axes: Vec<DVector<f64>> = order
        .iter()
        .take(3)
        .map(|&i| oriented(eigen.eigenvectors.column(i).into_owned()))
        .collect();

    (0..n)
        .map(|row| {
            let point = centered.row(row).transpose();
            let mut coords = [0.0; 3];
            for (coord, axis) in coords.iter_mut().zip(&axes) {
                *coord = point.dot(axis);
            }
            Point3::from(coords)
        })
        .collect()
}

/// Flip `axis` so its largest-magnitude component is positive.
fn oriented(axis: DVector<f64>) -> DVector<f64> {
    let dominant = axis
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);
    if dominant < 0.0 { -axis } else { axis }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edo_graphs_prng::LayoutRng;
    use nalgebra::Vector3;

    fn layout(dimensions: usize, positions: Vec<Vec<f64>>) -> Layout {
        Layout {
            dimensions,
            positions,
        }
    }

    fn random_layout(dimensions: usize, n: usize, seed: u64) -> Layout {
        let mut rng = LayoutRng::new(seed);
        layout(dimensions, (0..n).map(|_| rng.unit_point(dimensions)).collect())
    }

    fn distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
    }

    fn variance(points: &[Point3<f64>], axis: usize) -> f64 {
        points.iter().map(|p| p[axis] * p[axis]).sum::<f64>() / points.len() as f64
    }

    #[test]
    fn three_dimensions_preserve_distances() {
        let input = random_layout(3, 20, 11);
        let projected = principal_axes(&input);
        for i in 0..20 {
            for j in 0..20 {
                let before = distance(&input.positions[i], &input.positions[j]);
                let after = nalgebra::distance(&projected[i], &projected[j]);
                assert!((before - after).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn output_is_centered_and_ordered_by_variance() {
        let projected = principal_axes(&random_layout(3, 50, 4));
        let centroid = projected
            .iter()
            .fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords);
        assert!(centroid.norm() < 1e-9);
        assert!(variance(&projected, 0) >= variance(&projected, 1));
        assert!(variance(&projected, 1) >= variance(&projected, 2));
    }

    #[test]
    fn two_dimensions_are_padded_with_zero() {
        let input = random_layout(2, 10, 2);
        let projected = principal_axes(&input);
        assert!(projected.iter().all(|p| p.z == 0.0));
        let before = distance(&input.positions[0], &input.positions[1]);
        let after = nalgebra::distance(&projected[0], &projected[1]);
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn one_dimension_keeps_the_centered_coordinate() {
        let projected = principal_axes(&layout(1, vec![vec![1.0], vec![2.0], vec![6.0]]));
        let xs: Vec<f64> = projected.iter().map(|p| p.x).collect();
        for (x, expected) in xs.iter().zip([-2.0, -1.0, 3.0]) {
            assert!((x - expected).abs() < 1e-12);
        }
        assert!(projected.iter().all(|p| p.y == 0.0 && p.z == 0.0));
    }

    #[test]
    fn higher_dimensions_keep_the_dominant_axes() {
        // Points spread along three axes of a 6-D space, flat in the rest.
        let mut rng = LayoutRng::new(8);
        let positions: Vec<Vec<f64>> = (0..30)
            .map(|_| {
                let mut p = vec![0.5; 6];
                p[1] = rng.next_f64() * 10.0;
                p[3] = rng.next_f64() * 5.0;
                p[5] = rng.next_f64() * 2.0;
                p
            })
            .collect();
        let input = layout(6, positions);
        let projected = principal_axes(&input);
        for i in 0..30 {
            let before = distance(&input.positions[i], &input.positions[(i + 1) % 30]);
            let after = nalgebra::distance(&projected[i], &projected[(i + 1) % 30]);
            assert!((before - after).abs() < 1e-9);
        }
    }

    #[test]
    fn principal_axis_follows_the_long_direction() {
        let projected = principal_axes(&layout(
            2,
            vec![vec![0.0, 0.0], vec![0.0, 4.0], vec![0.1, 8.0]],
        ));
        // The spread is almost entirely along the input's second axis.
        let spread = projected[2].x - projected[0].x;
        assert!(spread > 7.9);
        assert!(projected.iter().all(|p| p.y.abs() < 0.1));
    }

    #[test]
    fn empty_and_single_layouts() {
        assert!(principal_axes(&layout(3, vec![])).is_empty());
        let single = principal_axes(&layout(3, vec![vec![0.2, 0.4, 0.6]]));
        assert_eq!(single, vec![Point3::origin()]);
    }
}
