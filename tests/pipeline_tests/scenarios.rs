use super::*;

mod scenarios {
  use super::*;

  fn seeded(f1: &str, f2: &str) -> Settings {
    Settings {
      f1_expr: f1.to_string(),
      f2_expr: f2.to_string(),
      seed: Some(2024),
      ..Settings::default()
    }
  }

  #[test]
  fn sine_and_cosine_all_succeed() {
    let generation = generate(&Settings {
      domain: (-10.0, 10.0),
      ..seeded("sin(x)", "cos(x)")
    })
    .unwrap();
    assert_eq!(generation.total_samples, 1000);
    assert_eq!(generation.failed_samples, 0);
    let request = generation.request;
    assert_eq!(request.points.len(), 1000);
    assert_eq!(request.colors.len(), 1000);
    for &(x, y) in &request.points {
      assert!(approx(x * x + y * y, 1.0));
    }
  }

  #[test]
  fn log_drops_non_positive_inputs() {
    let generation = generate(&Settings {
      domain: (-10.0, 10.0),
      ..seeded("log(x)", "x")
    })
    .unwrap();
    let points = generation.request.points;
    assert!(points.len() < 1000);
    assert_eq!(points.len(), 1000 - generation.failed_samples);
    assert!(points.iter().all(|&(_, x)| x > 0.0));
  }

  #[test]
  fn reciprocal_fails_only_at_zero() {
    let generation = generate(&Settings {
      domain: (-10.0, 10.0),
      sample_count: 1001,
      ..seeded("1/x", "x")
    })
    .unwrap();
    assert_eq!(generation.failed_samples, 1);
    assert_eq!(generation.request.points.len(), 1000);
  }

  #[test]
  fn reciprocal_defaults_to_zero_on_connected_line() {
    let generation = generate(&Settings {
      style: Style::ConnectedLine,
      domain: (-10.0, 10.0),
      sample_count: 1001,
      ..seeded("1/x", "x")
    })
    .unwrap();
    let request = generation.request;
    assert_eq!(request.points.len(), 1001);
    assert_eq!(request.points[500], (0.0, 0.0));
    assert_eq!(request.colors.len(), 1);
  }

  #[test]
  fn same_seed_same_request() {
    let settings = Settings {
      jitter: 0.2,
      mirror: true,
      rotation_degrees: 30.0,
      color_mode: ColorMode::RadialGradient,
      ..seeded("sin(x) + random()", "cos(x) * random()")
    };
    let a = generate(&settings).unwrap();
    let b = generate(&settings).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.seed, 2024);
    assert_eq!(a.request.points.len(), 2000);
  }

  #[test]
  fn random_colors_follow_the_seed() {
    let settings = Settings {
      color_mode: ColorMode::Random,
      ..seeded("sin(x)", "cos(x)")
    };
    let a = generate(&settings).unwrap().request;
    let b = generate(&settings).unwrap().request;
    assert_eq!(a.colors, b.colors);
    assert!(a.colors.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(a.colors[0].a, settings.alpha);

    let other = generate(&Settings {
      seed: Some(2025),
      ..settings.clone()
    })
    .unwrap()
    .request;
    assert_ne!(other.colors[0], a.colors[0]);
    // The color stream is separate, so the points do not move.
    let solid = generate(&seeded("sin(x)", "cos(x)")).unwrap().request;
    assert_eq!(a.points, solid.points);
  }

  #[test]
  fn rotation_overflow_follows_the_failure_policy() {
    let huge = Settings {
      rotation_degrees: 45.0,
      sample_count: 10,
      ..seeded("1.7e308", "1.7e308")
    };
    assert!(matches!(
      generate(&huge),
      Err(GenerationError::AllSamplesFailed { .. })
    ));

    let connected = generate(&Settings {
      style: Style::ConnectedLine,
      ..huge.clone()
    })
    .unwrap()
    .request;
    assert_eq!(connected.points.len(), 10);
    assert!(connected
      .points
      .iter()
      .all(|&(a, b)| a.is_finite() && b.is_finite()));
  }

  #[test]
  fn lines_break_where_samples_were_dropped() {
    let generation = generate(&Settings {
      style: Style::Lines,
      domain: (-10.0, 10.0),
      sample_count: 1001,
      ..seeded("x", "1/x")
    })
    .unwrap();
    let request = generation.request;
    assert_eq!(request.points.len(), 1000);
    assert_eq!(request.colors.len(), 999);
    assert_eq!(request.breaks, vec![499]);

    let mirrored = generate(&Settings {
      style: Style::Lines,
      domain: (-10.0, 10.0),
      sample_count: 1001,
      mirror: true,
      ..seeded("x", "1/x")
    })
    .unwrap();
    assert_eq!(mirrored.request.points.len(), 2000);
    assert_eq!(mirrored.request.breaks, vec![499, 1499]);
  }

  #[test]
  fn different_seeds_differ() {
    let a = generate(&seeded("random()", "x")).unwrap();
    let b = generate(&Settings {
      seed: Some(2025),
      ..seeded("random()", "x")
    })
    .unwrap();
    assert_ne!(a.request.points, b.request.points);
  }

  #[test]
  fn runs_on_other_threads_agree() {
    let settings = Settings {
      jitter: 0.5,
      ..seeded("x * random()", "random()")
    };
    let here = generate(&settings).unwrap();
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let settings = settings.clone();
        std::thread::spawn(move || generate(&settings).unwrap())
      })
      .collect();
    for handle in handles {
      assert_eq!(handle.join().unwrap(), here);
    }
  }

  #[test]
  fn the_two_expressions_draw_independent_streams() {
    let generation = generate(&seeded("random()", "random()")).unwrap();
    assert!(generation.request.points.iter().any(|&(a, b)| a != b));
  }

  #[test]
  fn missing_seed_is_drawn_and_reported() {
    let generation = generate(&Settings::default()).unwrap();
    assert!(arabesque::SEED_RANGE.contains(&generation.seed));
    let replay = generate(&Settings {
      seed: Some(generation.seed),
      ..Settings::default()
    })
    .unwrap();
    assert_eq!(replay.request, generation.request);
  }

  #[test]
  fn polar_rose() {
    let generation = generate(&Settings {
      style: Style::Polar,
      sample_count: 400,
      ..seeded("cos(4*t)", "t")
    })
    .unwrap();
    let request = generation.request;
    assert_eq!(request.style, RenderStyle::Lines);
    assert_eq!(request.points.len(), 400);
    assert_eq!(request.colors.len(), 399);
    assert!(approx_point(request.points[0], (1.0, 0.0)));
  }

  #[test]
  fn grid_presets_render() {
    use arabesque::functions::presets::{
      Preset, PresetFunction, PresetOperation, GALLERY,
    };

    for function in PresetFunction::ALL {
      for operation in PresetOperation::ALL {
        let preset = Preset {
          function,
          operation,
        };
        assert_eq!(preset.to_string().parse(), Ok(preset));
        let settings = Settings {
          sampling: Sampling::Grid,
          sample_count: 400,
          domain: (-2.0, 2.0),
          ..seeded(&preset.expression(), "x + y")
        };
        let generation = generate(&settings).unwrap();
        assert!(!generation.request.points.is_empty(), "{preset}");
      }
    }
    for formula in GALLERY {
      let settings = Settings {
        sampling: Sampling::Grid,
        sample_count: 100,
        ..seeded(formula, "y")
      };
      assert!(generate(&settings).is_ok(), "{formula}");
    }
  }

  #[test]
  fn presets_expand_to_two_variable_text() {
    use arabesque::functions::presets::{preset_expression, Preset};
    use arabesque::functions::presets::{PresetFunction, PresetOperation};

    assert_eq!(
      preset_expression(PresetFunction::Sin, PresetOperation::Multiply),
      "sin(x) * sin(y)"
    );
    let preset: Preset = "sqrt:/".parse().unwrap();
    assert_eq!(preset.expression(), "sqrt(x) / sqrt(y)");
    assert!("sin".parse::<Preset>().is_err());
    assert!("sinh:+".parse::<Preset>().is_err());
    assert!("sin:%".parse::<Preset>().is_err());
  }
}
