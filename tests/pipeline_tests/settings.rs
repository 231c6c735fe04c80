use super::*;

mod settings {
  use super::*;

  fn check(settings: Settings) -> Result<(), GenerationError> {
    settings.validate()
  }

  #[test]
  fn defaults_are_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
    assert_eq!(settings.style, Style::Points);
    assert_eq!(settings.sample_count, 1000);
    assert_eq!(settings.figure_size, (12.0, 10.0));
    assert_eq!(settings.seed, None);
  }

  #[test]
  fn sample_count_bounds() {
    for n in [0, 1, 1_000_001] {
      assert!(matches!(
        check(Settings {
          sample_count: n,
          ..Settings::default()
        }),
        Err(GenerationError::InvalidSampleCount(_))
      ));
    }
    assert!(check(Settings {
      sample_count: 2,
      ..Settings::default()
    })
    .is_ok());
  }

  #[test]
  fn domain_must_be_ordered_and_finite() {
    for domain in [(1.0, 1.0), (5.0, -5.0), (f64::NEG_INFINITY, 0.0)] {
      assert!(matches!(
        check(Settings {
          domain,
          ..Settings::default()
        }),
        Err(GenerationError::InvalidDomain { .. })
      ));
    }
  }

  #[test]
  fn polar_ignores_domain() {
    assert!(check(Settings {
      style: Style::Polar,
      domain: (1.0, 1.0),
      ..Settings::default()
    })
    .is_ok());
  }

  #[test]
  fn option_ranges() {
    let err = |settings: Settings| settings.validate().unwrap_err();
    assert!(matches!(
      err(Settings {
        alpha: 1.5,
        ..Settings::default()
      }),
      GenerationError::InvalidAlpha(_)
    ));
    assert!(matches!(
      err(Settings {
        jitter: -0.1,
        ..Settings::default()
      }),
      GenerationError::InvalidJitter(_)
    ));
    assert!(matches!(
      err(Settings {
        rotation_degrees: 361.0,
        ..Settings::default()
      }),
      GenerationError::InvalidRotation(_)
    ));
    assert!(matches!(
      err(Settings {
        point_size: 0.0,
        ..Settings::default()
      }),
      GenerationError::InvalidSize {
        name: "point_size",
        ..
      }
    ));
    assert!(matches!(
      err(Settings {
        line_width: f64::NAN,
        ..Settings::default()
      }),
      GenerationError::InvalidSize {
        name: "line_width",
        ..
      }
    ));
    assert!(matches!(
      err(Settings {
        figure_size: (12.0, -1.0),
        ..Settings::default()
      }),
      GenerationError::InvalidSize { .. }
    ));
  }

  #[test]
  fn validation_runs_before_compilation() {
    let settings = Settings {
      f1_expr: "sin(".to_string(),
      sample_count: 1,
      ..Settings::default()
    };
    assert!(matches!(
      generate(&settings),
      Err(GenerationError::InvalidSampleCount(1))
    ));
  }

  #[test]
  fn compile_errors_name_the_expression() {
    let settings = Settings {
      f2_expr: "cos(x".to_string(),
      ..Settings::default()
    };
    match generate(&settings) {
      Err(GenerationError::Compile { slot, .. }) => assert_eq!(slot, "f2"),
      other => panic!("unexpected result {other:?}"),
    }

    let polar = Settings {
      style: Style::Polar,
      f1_expr: "   ".to_string(),
      ..Settings::default()
    };
    match generate(&polar) {
      Err(GenerationError::Compile { slot, .. }) => assert_eq!(slot, "r"),
      other => panic!("unexpected result {other:?}"),
    }
  }

  mod json {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
      let settings = Settings::from_json_str(
        r##"{
          "style": "connected_line",
          "f1_expr": "sin(3*x)",
          "color": "#ff0000",
          "domain": [-1, 1],
          "seed": 12
        }"##,
      )
      .unwrap();
      assert_eq!(settings.style, Style::ConnectedLine);
      assert_eq!(settings.f1_expr, "sin(3*x)");
      assert_eq!(settings.f2_expr, "cos(x)");
      assert_eq!(settings.color, Rgba::new(1.0, 0.0, 0.0, 1.0));
      assert_eq!(settings.domain, (-1.0, 1.0));
      assert_eq!(settings.seed, Some(12));
      assert_eq!(settings.sample_count, 1000);
    }

    #[test]
    fn polar_aliases() {
      let settings = Settings::from_json_str(
        r#"{"style": "polar", "r_expr": "1 + t", "theta_expr": "2*t"}"#,
      )
      .unwrap();
      assert_eq!(settings.f1_expr, "1 + t");
      assert_eq!(settings.f2_expr, "2*t");
    }

    #[test]
    fn rejects_bad_values() {
      for json in [
        r#"{"color": "not-a-color"}"#,
        r#"{"style": "spiral"}"#,
        r#"{"sampling": "random"}"#,
        r#"{"unknown_option": 1}"#,
        r#"{"sample_count": -5}"#,
        r#"not json"#,
      ] {
        assert!(Settings::from_json_str(json).is_err(), "{json}");
      }
    }

    #[test]
    fn serializes_colors_as_hex() {
      let json = serde_json::to_string(&Settings::default()).unwrap();
      assert!(json.contains(r##""color":"#1f77b4""##), "{json}");
      assert!(json.contains(r##""background_color":"#ffffff""##), "{json}");
      let back = Settings::from_json_str(&json).unwrap();
      assert_eq!(back.style, Settings::default().style);
    }
  }

  mod text {
    use super::*;

    #[test]
    fn cartesian_text() {
      let text = Settings {
        seed: Some(42),
        ..Settings::default()
      }
      .to_text();
      let lines: Vec<&str> = text.lines().collect();
      assert_eq!(lines[0], "style: points");
      assert_eq!(lines[1], "f1_expr: sin(x)");
      assert_eq!(lines[2], "f2_expr: cos(x)");
      assert!(lines.contains(&"sampling: sweep"));
      assert!(lines.contains(&"color: #1f77b4"));
      assert!(lines.contains(&"point_size: 2"));
      assert!(lines.contains(&"seed: 42"));
      assert!(!text.contains("line_width"));
      assert!(!text.contains("color1"));
      assert!(text.ends_with('\n'));
    }

    #[test]
    fn polar_gradient_text() {
      let text = Settings {
        style: Style::Polar,
        color_mode: ColorMode::RadialGradient,
        ..Settings::default()
      }
      .to_text();
      assert!(text.contains("r_expr: sin(x)\n"));
      assert!(text.contains("theta_expr: cos(x)\n"));
      assert!(text.contains("color1: #1e88e5\n"));
      assert!(text.contains("color2: #ff7f0e\n"));
      assert!(text.contains("line_width: 1\n"));
      assert!(text.contains("seed: random\n"));
      assert!(!text.contains("domain"));
      assert!(!text.contains("sampling"));
    }
  }

  #[test]
  fn grid_sampling_declares_two_variables() {
    let settings = Settings {
      sampling: Sampling::Grid,
      ..Settings::default()
    };
    assert_eq!(settings.variables(), ["x", "y"]);
    let polar = Settings {
      style: Style::Polar,
      sampling: Sampling::Grid,
      ..Settings::default()
    };
    assert_eq!(polar.variables(), ["t"]);
  }
}
