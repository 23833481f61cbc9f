use super::shared_catalog;
use crate::core::{
    Binding, CatalogError, CommandParameter, Gesture, GestureSpace, InputScheme,
};
use crate::settings::{SettingsController, SettingsError};

fn controller() -> SettingsController {
    SettingsController::new(shared_catalog())
}

fn key(input: &str) -> Gesture {
    Gesture::parse(GestureSpace::Key, input).unwrap()
}

#[test]
fn test_rows_in_display_order() {
    let rows = controller().rows();

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["NextPage", "PrevPage", "ViewScrollUp", "ViewScrollDown", "OpenFile"]
    );
    assert_eq!(rows[0].keys, "Right");
    assert_eq!(rows[0].pointer, "L");
    assert_eq!(rows[0].touch, "TouchL1");
    assert!(rows.iter().all(|r| !r.has_conflicts()));
}

#[test]
fn test_filter_rows() {
    let controller = controller();

    assert_eq!(controller.filter_rows("").len(), 5, "Empty query should return all rows");
    assert_eq!(controller.filter_rows("scroll").len(), 2);
    assert_eq!(controller.filter_rows("ctrl+o")[0].name, "OpenFile");
    assert_eq!(controller.filter_rows("touchr1")[0].name, "PrevPage");
    assert!(controller.filter_rows("nothing matches").is_empty());
}

#[test]
fn test_submit_binding_reports_conflicts() {
    let controller = controller();

    let conflicts = controller
        .submit_binding("PrevPage", Binding::parse(GestureSpace::Key, "Right").unwrap())
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].gesture, key("Right"));
    assert_eq!(conflicts[0].commands, vec!["NextPage".to_string()]);

    // Annotated on both rows
    let rows = controller.rows();
    assert!(rows[0].has_conflicts());
    assert!(rows[1].has_conflicts());
    assert_eq!(rows[1].conflicts[0].commands, vec!["NextPage".to_string()]);
    assert_eq!(controller.conflict_count(), 1);

    let conflicts = controller
        .submit_binding_text("PrevPage", GestureSpace::Key, "Left")
        .unwrap();
    assert!(conflicts.is_empty());
    assert_eq!(controller.conflict_count(), 0);
}

#[test]
fn test_submit_binding_text_errors() {
    let controller = controller();

    assert!(matches!(
        controller.submit_binding_text("PrevPage", GestureSpace::Touch, "TouchL9"),
        Err(SettingsError::Gesture(_))
    ));
    assert!(matches!(
        controller.submit_binding_text("Missing", GestureSpace::Key, "F1"),
        Err(SettingsError::Catalog(CatalogError::NotFound(_)))
    ));
}

#[test]
fn test_parameter_edits() {
    let controller = controller();
    let faster = CommandParameter::ViewScroll {
        scroll: 80,
        allow_cross_scroll: false,
    };

    controller.submit_parameter("ViewScrollUp", faster.clone()).unwrap();
    assert_eq!(controller.rows()[2].parameter, Some(faster));

    controller.reset_parameter("ViewScrollUp").unwrap();
    assert_eq!(
        controller.rows()[2].parameter,
        Some(CommandParameter::ViewScroll {
            scroll: 25,
            allow_cross_scroll: true
        })
    );

    assert!(matches!(
        controller.submit_parameter("ViewScrollUp", CommandParameter::MovePage { size: 2 }),
        Err(CatalogError::ParameterMismatch { .. })
    ));
}

#[test]
fn test_clone_lifecycle() {
    let controller = controller();

    let clone = controller.create_clone("ViewScrollUp").unwrap();
    assert_eq!(clone, "ViewScrollUp:2");

    let rows = controller.rows();
    assert_eq!(rows[3].name, clone);
    assert!(rows[3].is_clone);
    assert!(!rows[3].cloneable);
    assert_eq!(rows[3].keys, "");

    controller.remove_clone(&clone).unwrap();
    assert_eq!(controller.command_count(), 5);
    assert!(controller.remove_clone("ViewScrollUp").is_err());
}

#[test]
fn test_shared_rows_show_owner() {
    let controller = controller();
    controller
        .catalog()
        .borrow_mut()
        .set_share("ViewScrollDown", "ViewScrollUp")
        .unwrap();

    let rows = controller.rows();
    assert_eq!(rows[3].shared_with.as_deref(), Some("ViewScrollUp"));
}

#[test]
fn test_apply_scheme_restores_defaults() {
    let controller = controller();
    controller
        .submit_binding_text("OpenFile", GestureSpace::Key, "Ctrl+P")
        .unwrap();
    let before = controller.catalog().borrow().change_count();

    let report = controller.apply_scheme(InputScheme::TypeA);

    assert_eq!(report.applied.len(), 5);
    assert_eq!(controller.rows()[4].keys, "Ctrl+O");
    assert_eq!(controller.catalog().borrow().change_count(), before + 1);
}

#[test]
fn test_resolve_conflict() {
    let controller = controller();
    controller
        .submit_binding_text("OpenFile", GestureSpace::Key, "Ctrl+O,Right")
        .unwrap();

    let unbound = controller.resolve_conflict(&key("Right"), &["OpenFile"]).unwrap();

    assert_eq!(unbound, vec!["NextPage".to_string()]);
    assert!(controller.conflicts().is_empty());
}

#[test]
fn test_snapshot_round_trip() {
    let controller = controller();
    controller
        .submit_binding_text("NextPage", GestureSpace::Pointer, "LD")
        .unwrap();
    let snapshot = controller.snapshot();

    let other = SettingsController::new(super::shared_catalog());
    let report = other.restore(&snapshot);

    assert!(report.skipped.is_empty());
    assert_eq!(other.rows()[0].pointer, "LD");
}
