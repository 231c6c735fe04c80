use rand::Rng;

/// Post-sampling transforms, always applied as jitter → mirror → rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
  /// Full width of the uniform noise added to each coordinate.
  pub jitter: f64,
  pub mirror: bool,
  pub rotation_degrees: f64,
}

impl Transform {
  pub fn apply<R: Rng>(
    &self,
    mut points: Vec<(f64, f64)>,
    rng: &mut R,
  ) -> Vec<(f64, f64)> {
    jitter(&mut points, self.jitter, rng);
    if self.mirror {
      points = mirror(points);
    }
    rotate(&mut points, self.rotation_degrees);
    points
  }
}

/// Add an independent draw from `U(-amount/2, amount/2)` to every
/// coordinate. No-op for `amount <= 0`.
pub fn jitter<R: Rng>(
  points: &mut [(f64, f64)],
  amount: f64,
  rng: &mut R,
) {
  if amount <= 0.0 {
    return;
  }
  let half = amount / 2.0;
  for (a, b) in points.iter_mut() {
    *a += rng.gen_range(-half..half);
    *b += rng.gen_range(-half..half);
  }
}

/// Append the reflection `(a, -b)` of every point, keeping their order.
pub fn mirror(mut points: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
  let n = points.len();
  points.reserve(n);
  for i in 0..n {
    let (a, b) = points[i];
    points.push((a, -b));
  }
  points
}

/// Counter-clockwise rotation by `degrees`, both coordinates together.
/// `0` leaves the points untouched. Coordinates near `f64::MAX` can
/// overflow to infinity; the pipeline re-applies the failure policy after
/// transforming.
pub fn rotate(points: &mut [(f64, f64)], degrees: f64) {
  if degrees == 0.0 {
    return;
  }
  let (sin, cos) = degrees.to_radians().sin_cos();
  for (a, b) in points.iter_mut() {
    let (x, y) = (*a, *b);
    *a = x * cos - y * sin;
    *b = x * sin + y * cos;
  }
}
