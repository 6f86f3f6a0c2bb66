use super::*;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

#[test]
fn test_parse_components() {
    assert_eq!(v("1.2.10").components(), &[1, 2, 10]);
    assert_eq!(v("7").components(), &[7]);
}

#[test]
fn test_parse_trims_padding() {
    // Fixed-width columns hand versions back space-padded
    let version = v("1.1       ");
    assert_eq!(version.as_str(), "1.1");
    assert_eq!(version.components(), &[1, 1]);
}

#[test]
fn test_parse_keeps_raw_text() {
    let version = v("1.02");
    assert_eq!(version.to_string(), "1.02");
    assert_eq!(version, v("1.2"));
}

#[test]
fn test_parse_rejects_malformed() {
    for bad in ["", "   ", "1..2", "1.", ".1", "1.a", "v1", "1.-2", "1 .2"] {
        let err = Version::parse(bad).unwrap_err();
        assert!(
            matches!(err, CoreError::MalformedVersion { .. }),
            "expected MalformedVersion for {bad:?}, got {err:?}"
        );
    }
}

#[test]
fn test_parse_rejects_overflow() {
    let err = Version::parse("99999999999999999999999").unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_compare_numeric_not_lexicographic() {
    assert_eq!(compare("1.9", "1.10").unwrap(), Ordering::Less);
    assert_eq!(compare("1.10", "1.9").unwrap(), Ordering::Greater);
}

#[test]
fn test_compare_more_components_wins_tie() {
    assert_eq!(compare("1.2", "1.2.0").unwrap(), Ordering::Less);
    assert_eq!(compare("1.2", "1").unwrap(), Ordering::Greater);
}

#[test]
fn test_compare_first_component_decides() {
    assert_eq!(compare("2", "1.9.9").unwrap(), Ordering::Greater);
}

#[test]
fn test_compare_equal() {
    assert_eq!(compare("3.4.5", "3.4.5").unwrap(), Ordering::Equal);
}

#[test]
fn test_compare_malformed_side_fails() {
    assert!(compare("1.x", "1").is_err());
    assert!(compare("1", "").is_err());
}

#[test]
fn test_initial_version() {
    assert_eq!(Version::initial().as_str(), "0");
    assert!(v("0.1") > Version::initial());
    assert_eq!(v("0"), Version::initial());
}

#[test]
fn test_total_order_properties() {
    let samples = [
        "0", "1", "1.0", "1.0.0", "1.1", "1.2", "1.2.0", "1.9", "1.10", "2", "2.0.1", "10",
    ];

    for a in samples {
        assert_eq!(compare(a, a).unwrap(), Ordering::Equal, "reflexive for {a}");
        for b in samples {
            let ab = compare(a, b).unwrap();
            let ba = compare(b, a).unwrap();
            assert_eq!(ab, ba.reverse(), "antisymmetric for {a} / {b}");

            for c in samples {
                let bc = compare(b, c).unwrap();
                if ab != Ordering::Greater && bc != Ordering::Greater {
                    assert_ne!(
                        compare(a, c).unwrap(),
                        Ordering::Greater,
                        "transitive for {a} <= {b} <= {c}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_sorting_uses_numeric_order() {
    let mut versions: Vec<Version> = ["1.10", "1.2", "1", "1.2.0", "0.9"]
        .iter()
        .map(|s| v(s))
        .collect();
    versions.sort();
    let sorted: Vec<&str> = versions.iter().map(Version::as_str).collect();
    assert_eq!(sorted, vec!["0.9", "1", "1.2", "1.2.0", "1.10"]);
}
