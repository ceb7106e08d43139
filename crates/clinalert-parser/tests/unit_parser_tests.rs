//! Unit tests for the condition compiler
//!
//! Tests rule compilation, alert building and rule-table decoding with the
//! rule texts used by real study alert tables.

use clinalert_core::ast::{AlertSet, AtomicTest};
use clinalert_parser::*;

const LAB_RULE: &str = r#"
    ([wbc_109l] <> "" and ([wbc_109l] < 3.5 or [wbc_109l] > 12)) or
    ([plt_109l] <> "" and ([plt_109l] < 145 or [plt_109l] > 387)) or
    ([hgb_gl] <> "" and ([hgb_gl] < 117 or [hgb_gl] > 170)) or
    ([mcv_fl] <> "" and ([mcv_fl] < 80 or [mcv_fl] > 100)) or
    ([neut_number_109l] <> "" and ([neut_number_109l] < 1.6 or [neut_number_109l] > 8)) or
    ([lymph_number_109l] <> "" and ([lymph_number_109l] < 1.1 or [lymph_number_109l] > 3.5)) or
    ([mono_number_109l] <> "" and ([mono_number_109l] < 0.2 or [mono_number_109l] > 0.8)) or
    ([eos_number_109l] <> "" and ([eos_number_109l] < 0 or [eos_number_109l] > 0.5)) or
    ([baso_number_109l] <> "" and ([baso_number_109l] < 0 or [baso_number_109l] > 0.1))
"#;

const BP_RULE: &str = r#"
    (([bp_right_sys] <> "" and ([bp_right_sys] < 80 or [bp_right_sys] > 180)) or
    ([bp_left_sys] <> "" and ([bp_left_sys] < 80 or [bp_left_sys] > 180)) or
    ([bp_right_dia] <> "" and ([bp_right_dia] < 50 or [bp_right_dia] > 110)) or
    ([bp_left_dia] <> "" and ([bp_left_dia] < 50 or [bp_left_dia] > 110)) or
    ([pulse_right] <> "" and ([pulse_right] < 40 or [pulse_right] > 120)) or
    ([pulse_left] <> "" and ([pulse_left] < 40 or [pulse_left] > 120)) or
    (abs([bp_right_sys] - [bp_left_sys]) > 20) or
    (abs([bp_right_dia] - [bp_left_dia]) > 10))
"#;

// =============================================================================
// Condition Parser Tests
// =============================================================================

#[test]
fn test_compile_lab_rule() {
    let compiled = ConditionParser::compile(LAB_RULE);
    assert!(compiled.is_clean(), "warnings: {:?}", compiled.warnings);

    let expected = [
        ("wbc_109l", "not empty AND (< 3.5 OR > 12)", "3.5 < x < 12"),
        ("plt_109l", "not empty AND (< 145 OR > 387)", "145 < x < 387"),
        ("hgb_gl", "not empty AND (< 117 OR > 170)", "117 < x < 170"),
        ("mcv_fl", "not empty AND (< 80 OR > 100)", "80 < x < 100"),
        ("neut_number_109l", "not empty AND (< 1.6 OR > 8)", "1.6 < x < 8"),
        ("lymph_number_109l", "not empty AND (< 1.1 OR > 3.5)", "1.1 < x < 3.5"),
        ("mono_number_109l", "not empty AND (< 0.2 OR > 0.8)", "0.2 < x < 0.8"),
        ("eos_number_109l", "not empty AND (< 0 OR > 0.5)", "0 < x < 0.5"),
        ("baso_number_109l", "not empty AND (< 0 OR > 0.1)", "0 < x < 0.1"),
    ];

    assert_eq!(compiled.conditions.len(), expected.len());
    for (key, description, interval) in expected {
        let spec = &compiled.conditions[key];
        assert_eq!(spec.description, description, "description of {}", key);
        assert_eq!(
            spec.reference_interval.as_deref(),
            Some(interval),
            "interval of {}",
            key
        );
    }
}

#[test]
fn test_compile_bp_rule_keeps_pair_keys() {
    let conditions = ConditionParser::parse(BP_RULE);

    assert!(conditions.contains_key("bp_right_sys,bp_left_sys"));
    assert!(conditions.contains_key("bp_right_dia,bp_left_dia"));
    assert_eq!(
        conditions["bp_right_dia,bp_left_dia"].description,
        "(abs(bp_right_dia - bp_left_dia) > 10)"
    );
}

#[test]
fn test_compile_twice_is_identical() {
    assert_eq!(ConditionParser::parse(LAB_RULE), ConditionParser::parse(LAB_RULE));
    assert_eq!(ConditionParser::parse(BP_RULE), ConditionParser::parse(BP_RULE));
}

#[test]
fn test_interval_ignores_bound_order() {
    let forward = ConditionParser::parse(r#"[k] <> "" and ([k] < 3.5 or [k] > 5.1)"#);
    let reverse = ConditionParser::parse(r#"[k] <> "" and ([k] > 5.1 or [k] < 3.5)"#);

    assert_eq!(forward["k"].reference_interval.as_deref(), Some("3.5 < x < 5.1"));
    assert_eq!(reverse["k"].reference_interval, forward["k"].reference_interval);
}

#[test]
fn test_nested_parentheses_and_mixed_case() {
    let conditions =
        ConditionParser::parse(r#"((([crp] <> "" AND ([crp] < 0 OR [crp] > 10))))"#);
    assert_eq!(conditions["crp"].description, "not empty AND (< 0 OR > 10)");
}

// =============================================================================
// Alert Builder Tests
// =============================================================================

#[test]
fn test_build_bp_alert() {
    let alert = AlertParser::build("Vital signs", BP_RULE, "N");

    let expected = [
        (
            "bp_right_sys",
            "not empty AND (< 80 OR > 180) OR (abs(bp_right_sys - bp_left_sys) > 20)",
            "80 < x < 180",
        ),
        (
            "bp_left_sys",
            "not empty AND (< 80 OR > 180) OR (abs(bp_right_sys - bp_left_sys) > 20)",
            "80 < x < 180",
        ),
        (
            "bp_right_dia",
            "not empty AND (< 50 OR > 110) OR (abs(bp_right_dia - bp_left_dia) > 10)",
            "50 < x < 110",
        ),
        (
            "bp_left_dia",
            "not empty AND (< 50 OR > 110) OR (abs(bp_right_dia - bp_left_dia) > 10)",
            "50 < x < 110",
        ),
        ("pulse_right", "not empty AND (< 40 OR > 120)", "40 < x < 120"),
        ("pulse_left", "not empty AND (< 40 OR > 120)", "40 < x < 120"),
    ];

    assert_eq!(alert.conditions().len(), expected.len());
    for (key, description, interval) in expected {
        let spec = alert.condition(key).unwrap();
        assert_eq!(spec.description, description, "description of {}", key);
        assert_eq!(spec.reference_interval.as_deref(), Some(interval));
    }
    assert_eq!(
        alert.condition("bp_left_dia").unwrap().paired_with,
        vec!["bp_right_dia".to_string()]
    );
    assert!(alert.condition("pulse_left").unwrap().paired_with.is_empty());
}

#[test]
fn test_fanned_out_abs_test_is_shared() {
    let alert = AlertParser::build("Vital signs", BP_RULE, "N");

    let abs_of = |key: &str| {
        alert
            .condition(key)
            .unwrap()
            .tests
            .iter()
            .find(|t| matches!(t, AtomicTest::AbsDifference { .. }))
            .cloned()
    };
    assert!(abs_of("bp_right_sys").is_some());
    assert_eq!(abs_of("bp_right_sys"), abs_of("bp_left_sys"));
}

#[test]
fn test_two_rows_share_variable() {
    let rows = vec![
        RuleRow::new(
            "Platelets",
            r#"([plt_109l] <> "" and ([plt_109l] < 145 or [plt_109l] > 387))"#,
            "N",
        ),
        RuleRow::new(
            "Platelets critical",
            r#"([plt_109l] <> "" and ([plt_109l] < 100 or [plt_109l] > 450))"#,
            "N",
        ),
    ];
    let mut set = AlertSet::new();
    AlertParser::build_all(&rows, &mut set);

    let intervals: Vec<&str> = set
        .alerts_by_variable("plt_109l")
        .into_iter()
        .filter_map(|a| a.condition("plt_109l"))
        .filter_map(|c| c.reference_interval.as_deref())
        .collect();
    assert_eq!(intervals, vec!["145 < x < 387", "100 < x < 450"]);
}

// =============================================================================
// Rule Table Tests
// =============================================================================

#[test]
fn test_rule_table_to_alert_set() -> anyhow::Result<()> {
    let yaml = format!(
        r#"
alerts:
  - alert-title: Lab values
    alert-condition: '{}'
    alert-deactivated: N
  - alert-title: CMR finding
    alert-condition: "[cmr_notification] = 1 or [microvascdysfunction_cmr] = 1"
    alert-deactivated: Y
"#,
        LAB_RULE.trim().replace('\n', " ")
    );

    let rows = RuleTable::from_yaml_str(&yaml)?;
    let mut set = AlertSet::new();
    let alerts = AlertParser::build_all(&rows, &mut set);

    assert_eq!(alerts.len(), 2);
    assert_eq!(set.active().count(), 1);
    assert_eq!(alerts[0].conditions().len(), 9);
    assert_eq!(
        alerts[1]
            .condition("microvascdysfunction_cmr")
            .map(|c| c.description.as_str()),
        Some("= 1")
    );
    Ok(())
}
