use rowan::{TextRange, TextSize};

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(TextSize::from(start), TextSize::from(end))
}

#[test]
fn empty_diagnostics_has_no_errors() {
    let d = Diagnostics::new();
    assert!(d.is_empty());
    assert!(!d.has_errors());
    assert!(!d.has_warnings());
}

#[test]
fn error_and_warning_counts() {
    let mut d = Diagnostics::new();
    d.error("bad atom", range(0, 1)).emit();
    d.warning("duplicate rule `r`", range(5, 6)).emit();
    assert_eq!(d.error_count(), 1);
    assert_eq!(d.warning_count(), 1);
    assert!(d.has_errors());
    assert!(d.has_warnings());
}

#[test]
fn related_info_is_carried_through_plain_rendering() {
    let mut d = Diagnostics::new();
    d.warning("duplicate rule `r`", range(10, 11))
        .related_to("first defined here", range(0, 1))
        .emit();
    let rendered = d.printer().render();
    assert!(rendered.contains("duplicate rule"));
    assert!(rendered.contains("first defined here"));
}

#[test]
fn extend_merges_two_collections() {
    let mut a = Diagnostics::new();
    a.error("a", range(0, 1)).emit();
    let mut b = Diagnostics::new();
    b.error("b", range(1, 2)).emit();
    a.extend(b);
    assert_eq!(a.len(), 2);
}
