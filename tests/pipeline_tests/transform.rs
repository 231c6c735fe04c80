use super::*;

mod transform {
  use super::*;

  fn square() -> Vec<(f64, f64)> {
    vec![(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -2.0)]
  }

  #[test]
  fn mirror_appends_reflections_in_order() {
    let points = square();
    let n = points.len();
    let mirrored = mirror(points.clone());
    assert_eq!(mirrored.len(), 2 * n);
    assert_eq!(&mirrored[..n], &points[..]);
    for i in 0..n {
      assert_eq!(mirrored[n + i], (points[i].0, -points[i].1));
    }
  }

  #[test]
  fn rotation_by_zero_is_exact_identity() {
    let mut points = vec![(0.1, 0.2), (1e300, -3.5)];
    rotate(&mut points, 0.0);
    assert_eq!(points, vec![(0.1, 0.2), (1e300, -3.5)]);
  }

  #[test]
  fn rotation_by_360_matches_zero() {
    let mut points = square();
    rotate(&mut points, 360.0);
    for (p, e) in points.iter().zip(square()) {
      assert!(approx_point(*p, e), "{p:?} != {e:?}");
    }
  }

  #[test]
  fn rotation_is_counter_clockwise() {
    let mut points = vec![(1.0, 0.0), (0.0, 2.0)];
    rotate(&mut points, 90.0);
    assert!(approx_point(points[0], (0.0, 1.0)));
    assert!(approx_point(points[1], (-2.0, 0.0)));
  }

  #[test]
  fn jitter_stays_within_half_amount() {
    let original = square();
    let mut points = original.clone();
    jitter(&mut points, 0.5, &mut run_rng(11, 3));
    assert_ne!(points, original);
    for (p, o) in points.iter().zip(&original) {
      assert!((p.0 - o.0).abs() <= 0.25);
      assert!((p.1 - o.1).abs() <= 0.25);
    }
  }

  #[test]
  fn zero_jitter_is_a_no_op() {
    let mut points = square();
    jitter(&mut points, 0.0, &mut run_rng(11, 3));
    assert_eq!(points, square());
  }

  #[test]
  fn jitter_is_reproducible() {
    let mut a = square();
    let mut b = square();
    jitter(&mut a, 1.0, &mut run_rng(5, 3));
    jitter(&mut b, 1.0, &mut run_rng(5, 3));
    assert_eq!(a, b);
  }

  #[test]
  fn order_is_jitter_then_mirror_then_rotate() {
    let transform = Transform {
      jitter: 0.0,
      mirror: true,
      rotation_degrees: 90.0,
    };
    let out = transform.apply(vec![(1.0, 1.0)], &mut run_rng(0, 3));
    // Mirror gives (1, -1); rotating afterwards moves both points.
    assert_eq!(out.len(), 2);
    assert!(approx_point(out[0], (-1.0, 1.0)));
    assert!(approx_point(out[1], (1.0, 1.0)));
  }

  #[test]
  fn mirrored_jitter_reflects_the_jittered_point() {
    let transform = Transform {
      jitter: 0.3,
      mirror: true,
      rotation_degrees: 0.0,
    };
    let out = transform.apply(square(), &mut run_rng(9, 3));
    let n = square().len();
    for i in 0..n {
      assert_eq!(out[n + i], (out[i].0, -out[i].1));
    }
  }

  #[test]
  fn default_transform_is_identity() {
    let out = Transform::default().apply(square(), &mut run_rng(1, 3));
    assert_eq!(out, square());
  }
}
