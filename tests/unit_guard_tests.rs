mod common;

use common::{axes, cell};
use jobmatrix::ConfigError;
use jobmatrix::core::guard::Guard;
use jobmatrix::models::Step;

#[test]
fn test_equals_guard() {
    let guard = Guard::equals("os", "linux");
    assert!(guard.matches(&cell(&[("os", "linux"), ("py", "3.8")])));
    assert!(!guard.matches(&cell(&[("os", "mac"), ("py", "3.8")])));
}

#[test]
fn test_one_of_and_negation() {
    let guard = Guard::one_of("os", ["mac", "win"]);
    let linux = cell(&[("os", "linux")]);
    let mac = cell(&[("os", "mac")]);

    assert!(guard.matches(&mac));
    assert!(!guard.matches(&linux));
    assert!(guard.clone().negate().matches(&linux));
    assert!(!guard.negate().matches(&mac));
}

#[test]
fn test_all_and_any_combinators() {
    let target = cell(&[("os", "linux"), ("py", "pypy-3.8")]);
    let all = Guard::All {
        all: vec![Guard::equals("os", "linux"), Guard::equals("py", "3.8")],
    };
    let any = Guard::Any {
        any: vec![Guard::equals("os", "mac"), Guard::equals("py", "pypy-3.8")],
    };

    assert!(!all.matches(&target));
    assert!(any.matches(&target));
}

#[test]
fn test_guard_on_axis_missing_from_cell_is_false() {
    assert!(!Guard::equals("compiler", "gcc").matches(&cell(&[("os", "linux")])));
}

#[test]
fn test_step_without_guard_always_applies() {
    let step = Step::new("Build", "make");
    assert!(step.applies_to(&cell(&[("os", "mac")])));
}

#[test]
fn test_validate_rejects_unknown_axis_and_value() {
    let axes = axes(&[("os", &["linux", "mac"])]);

    let err = Guard::equals("arch", "x64")
        .validate(&axes, "step 'Build'")
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownAxis { ref axis, .. } if axis == "arch"));

    let nested = Guard::Not {
        not: Box::new(Guard::one_of("os", ["linux", "solaris"])),
    };
    let err = nested.validate(&axes, "step 'Build'").unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnknownValue {
            axis: "os".to_string(),
            value: "solaris".to_string(),
            context: "step 'Build'".to_string(),
        }
    );
}

#[test]
fn test_guard_toml_forms() {
    #[derive(serde::Deserialize)]
    struct Holder {
        when: Guard,
    }

    let parsed: Holder = toml::from_str(r#"when = { axis = "os", in = ["mac", "win"] }"#).unwrap();
    assert_eq!(parsed.when, Guard::one_of("os", ["mac", "win"]));

    let parsed: Holder = toml::from_str(
        r#"when = { all = [{ axis = "os", equals = "linux" }, { not = { axis = "py", equals = "3.7" } }] }"#,
    )
    .unwrap();
    assert_eq!(
        parsed.when,
        Guard::All {
            all: vec![
                Guard::equals("os", "linux"),
                Guard::equals("py", "3.7").negate()
            ]
        }
    );
}
