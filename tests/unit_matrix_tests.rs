mod common;

use common::axes;
use jobmatrix::ConfigError;
use jobmatrix::core::generate;
use jobmatrix::models::{Axis, CellPattern};
use std::collections::HashSet;

fn render(cells: &[jobmatrix::models::Cell]) -> Vec<String> {
    cells.iter().map(ToString::to_string).collect()
}

/// Two axes of two values with one exclusion leave three cells, in product order.
/// 两个各有两个值的轴加一条排除规则，按乘积顺序留下三个单元。
#[test]
fn test_exclusion_removes_matching_cell() {
    let axes = axes(&[("os", &["linux", "mac"]), ("py", &["3.7", "3.8"])]);
    let exclusions = [CellPattern::new([("os", "mac"), ("py", "3.7")])];

    let cells = generate(&axes, &exclusions).unwrap();

    assert_eq!(
        render(&cells),
        ["os=linux, py=3.7", "os=linux, py=3.8", "os=mac, py=3.8"]
    );
}

#[test]
fn test_product_size_without_exclusions() {
    let axes = axes(&[
        ("os", &["ubuntu", "macos", "windows"]),
        ("python", &["3.7", "3.8"]),
        ("arch", &["x64", "arm64"]),
    ]);

    let cells = generate(&axes, &[]).unwrap();

    assert_eq!(cells.len(), 12);
    let distinct: HashSet<_> = cells.iter().collect();
    assert_eq!(distinct.len(), 12, "every cell must be unique");
    for cell in &cells {
        assert_eq!(cell.assignments().len(), 3);
        for axis in &axes {
            let value = cell.value(axis.name()).unwrap();
            assert!(axis.contains(value));
        }
    }
}

#[test]
fn test_partial_rule_excludes_every_cell_it_matches() {
    let axes = axes(&[("os", &["linux", "mac", "win"]), ("py", &["3.7", "3.8"])]);
    let exclusions = [CellPattern::new([("os", "win")])];

    let cells = generate(&axes, &exclusions).unwrap();

    assert_eq!(cells.len(), 4);
    assert!(cells.iter().all(|c| c.value("os") != Some("win")));
}

#[test]
fn test_rule_with_extra_pair_only_matches_exactly() {
    let axes = axes(&[("os", &["linux", "mac"]), ("py", &["3.7", "3.8"])]);
    // Matches os=mac only together with py=3.8.
    let exclusions = [CellPattern::new([("os", "mac"), ("py", "3.8")])];

    let cells = generate(&axes, &exclusions).unwrap();

    assert_eq!(
        render(&cells),
        ["os=linux, py=3.7", "os=linux, py=3.8", "os=mac, py=3.7"]
    );
}

#[test]
fn test_exclusion_naming_unknown_axis_is_config_error() {
    let axes = axes(&[("os", &["linux"])]);
    let exclusions = [CellPattern::new([("compiler", "gcc")])];

    let err = generate(&axes, &exclusions).unwrap_err();

    assert_eq!(
        err,
        ConfigError::UnknownAxis {
            axis: "compiler".to_string(),
            context: "exclusion rule #1".to_string(),
        }
    );
}

#[test]
fn test_exclusion_with_undeclared_value_never_matches() {
    let axes = axes(&[("os", &["linux", "mac"])]);
    let exclusions = [CellPattern::new([("os", "beos")])];

    let cells = generate(&axes, &exclusions).unwrap();

    assert_eq!(cells.len(), 2);
}

#[test]
fn test_generation_is_deterministic() {
    let axes = axes(&[("a", &["1", "2", "3"]), ("b", &["x", "y"])]);
    let exclusions = [CellPattern::new([("a", "2")])];

    let first = generate(&axes, &exclusions).unwrap();
    let second = generate(&axes, &exclusions).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_axis_with_no_values_yields_empty_matrix() {
    let axes = [Axis::new("os", ["linux"]), Axis::new("py", Vec::<String>::new())];
    assert!(generate(&axes, &[]).unwrap().is_empty());
}

#[test]
fn test_every_cell_excluded_yields_empty_matrix() {
    let axes = axes(&[("os", &["linux"])]);
    let exclusions = [CellPattern::new([("os", "linux")])];
    assert!(generate(&axes, &exclusions).unwrap().is_empty());
}

#[test]
fn test_duplicate_axis_values_are_collapsed() {
    let axis = Axis::new("os", ["linux", "mac", "linux"]);
    assert_eq!(axis.values(), ["linux", "mac"]);
}

#[test]
fn test_cell_slug_is_filesystem_safe() {
    let axes = axes(&[("os", &["ubuntu-latest"]), ("py", &["pypy/3.8"])]);
    let cell = generate(&axes, &[]).unwrap().remove(0);
    let slug = cell.slug();
    assert!(slug.chars().all(|c| c.is_alphanumeric() || c == '_'), "{slug}");
}
