use runboard::compare::{DeltaTag, compare, last_finite_val_loss};
use runboard::overlay::REQUIRED_CHECKLIST_TITLES;
use runboard::status::{LossPoint, RuntimeStatus, StreamMetrics};

fn snapshot(passed: usize, patch_losses: &str, swin_losses: &str) -> RuntimeStatus {
    let checklist: Vec<String> = REQUIRED_CHECKLIST_TITLES
        .iter()
        .enumerate()
        .map(|(i, t)| format!(r#"{{"index": {}, "title": "{}", "passed": {}}}"#, i + 1, t, i < passed))
        .collect();
    let json = format!(
        r#"{{
            "checklist": [{}],
            "metrics": {{
                "patchtst": {{"loss": [{}]}},
                "swinmae": {{"loss": [{}]}}
            }}
        }}"#,
        checklist.join(","),
        patch_losses,
        swin_losses
    );
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_missing_side_is_not_applicable() {
    let a = snapshot(3, "", "");
    for summary in [compare(Some(&a), None), compare(None, Some(&a)), compare(None, None)] {
        assert_eq!(summary.checklist, None);
        assert_eq!(summary.checklist_tag(), DeltaTag::NotApplicable);
        assert_eq!(summary.losses.len(), 2);
        assert!(summary.losses.iter().all(|l| l.tag == DeltaTag::NotApplicable));
        assert!(summary.rows().iter().all(|(_, v, _)| v == "n/a"));
    }
}

#[test]
fn test_more_passed_checks_is_improved() {
    let current = snapshot(5, "", "");
    let baseline = snapshot(3, "", "");
    let summary = compare(Some(&current), Some(&baseline));
    let c = summary.checklist.unwrap();
    assert_eq!(c.delta, 2);
    assert_eq!(c.tag, DeltaTag::Improved);
    assert_eq!(c.current.total, 7);
    let rows = summary.rows();
    let (_, value, tag) = &rows[0];
    assert!(value.starts_with("+2"), "{value}");
    assert_eq!(*tag, DeltaTag::Improved);

    let reverse = compare(Some(&baseline), Some(&current));
    assert_eq!(reverse.checklist_tag(), DeltaTag::Regressed);
    assert_eq!(reverse.checklist.unwrap().delta, -2);

    let same = compare(Some(&current), Some(&current));
    assert_eq!(same.checklist_tag(), DeltaTag::Neutral);
}

#[test]
fn test_lower_loss_is_improved() {
    let current = snapshot(
        0,
        r#"{"epoch": 1, "val_loss": 0.9}, {"epoch": 2, "val_loss": 0.4}"#,
        r#"{"epoch": 1, "val_loss": 0.2}"#,
    );
    let baseline = snapshot(
        0,
        r#"{"epoch": 1, "val_loss": 0.6}"#,
        r#"{"epoch": 1, "val_loss": 0.1}"#,
    );
    let summary = compare(Some(&current), Some(&baseline));
    let patch = summary.loss("patchtst").unwrap();
    assert!((patch.delta.unwrap() - (-0.2)).abs() < 1e-12);
    assert_eq!(patch.tag, DeltaTag::Improved);
    let swin = summary.loss("swinmae").unwrap();
    assert_eq!(swin.tag, DeltaTag::Regressed);
}

#[test]
fn test_loss_missing_on_one_side_is_neutral() {
    let current = snapshot(0, r#"{"epoch": 1, "val_loss": 0.5}"#, "");
    let baseline = snapshot(0, "", "");
    let summary = compare(Some(&current), Some(&baseline));
    let patch = summary.loss("patchtst").unwrap();
    assert_eq!(patch.current, Some(0.5));
    assert_eq!(patch.baseline, None);
    assert_eq!(patch.delta, None);
    assert_eq!(patch.tag, DeltaTag::Neutral);
}

#[test]
fn test_last_finite_val_loss_scans_backwards() {
    let s = snapshot(
        0,
        r#"{"epoch": 1, "val_loss": 0.8},
           {"epoch": 2, "val_loss": 0.7},
           {"epoch": 3, "val_loss": null},
           {"epoch": 4, "val_loss": "NaN"}"#,
        "",
    );
    assert_eq!(last_finite_val_loss(&s, "patchtst"), Some(0.7));
    assert_eq!(last_finite_val_loss(&s, "swinmae"), None);
    assert_eq!(last_finite_val_loss(&s, "unknown"), None);
}

#[test]
fn test_non_finite_numbers_are_skipped() {
    let point = |epoch: i64, val_loss: f64| LossPoint {
        epoch: Some(epoch),
        train_loss: None,
        val_loss: Some(val_loss),
    };
    let mut s = RuntimeStatus::default();
    s.metrics.insert(
        "patchtst".into(),
        StreamMetrics {
            loss: vec![
                point(1, 0.9),
                point(2, 0.6),
                point(3, f64::NAN),
                point(4, f64::INFINITY),
                point(5, f64::NEG_INFINITY),
            ],
            ..StreamMetrics::default()
        },
    );
    assert_eq!(last_finite_val_loss(&s, "patchtst"), Some(0.6));

    // a stream holding only non-finite values has no final loss
    s.metrics.insert(
        "swinmae".into(),
        StreamMetrics {
            loss: vec![point(1, f64::NAN)],
            ..StreamMetrics::default()
        },
    );
    assert_eq!(last_finite_val_loss(&s, "swinmae"), None);
    let summary = compare(Some(&s), Some(&s));
    assert_eq!(summary.loss("swinmae").unwrap().tag, DeltaTag::Neutral);
}
