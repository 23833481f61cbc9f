use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::fixtures::page_catalog;
use crate::core::{
    CatalogError, CommandArgs, CommandCatalog, CommandParameter, ScriptBindingState,
    ScriptDeclaration, ScriptEntry, ScriptRefresh, ScriptRunner, ScriptScan,
};

fn declaration(keys: &str, args: Option<&str>) -> ScriptDeclaration {
    let mut header = format!("// @shortcutkey {}\n// @cloneable\n", keys);
    if let Some(args) = args {
        header.push_str(&format!("// @args {}\n", args));
    }
    ScriptDeclaration::parse(&header, Path::new("/scripts/Foo.nvjs"))
}

fn scan(entries: &[(&str, ScriptDeclaration)]) -> ScriptScan {
    ScriptScan {
        entries: entries
            .iter()
            .map(|(path, declaration)| ScriptEntry {
                path: PathBuf::from(path),
                declaration: declaration.clone(),
            })
            .collect(),
        unreadable: Vec::new(),
    }
}

fn keys_of(catalog: &CommandCatalog, name: &str) -> String {
    catalog.get(name).unwrap().bindings().keys.to_string()
}

#[test]
fn test_declaration_from_header() {
    let declaration = ScriptDeclaration::parse(
        "// @name Open editor\n\
         // @description Edits the page\n\
         // @shortcutkey Ctrl+Shift+E\n\
         // @mousegesture UR\n\
         // @touchgesture TouchCenter\n\
         // @args --fast\n",
        Path::new("/scripts/Edit.nvjs"),
    );

    assert_eq!(declaration.text, "Open editor");
    assert_eq!(declaration.remarks, "Edits the page");
    assert_eq!(declaration.bindings.keys.to_string(), "Ctrl+Shift+E");
    assert_eq!(declaration.bindings.pointer.to_string(), "UR");
    assert_eq!(declaration.bindings.touch.to_string(), "TouchCenter");
    assert_eq!(declaration.args.as_deref(), Some("--fast"));
    assert!(!declaration.cloneable);
}

#[test]
fn test_malformed_declaration_degrades_one_slot() {
    let declaration = ScriptDeclaration::parse(
        "// @shortcutkey Ctrl+Bogus\n// @mousegesture LD\n",
        Path::new("/scripts/Bad.js"),
    );

    assert!(declaration.bindings.keys.is_empty());
    assert_eq!(declaration.bindings.pointer.to_string(), "LD");
    assert_eq!(declaration.text, "Bad");
}

#[test]
fn test_scan_adds_default_bound_commands() {
    let mut catalog = page_catalog();
    let report = catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None))]),
        ScriptRefresh::default(),
    );

    assert_eq!(report.added, vec!["Script_Foo".to_string()]);
    let command = catalog.get("Script_Foo").unwrap();
    assert_eq!(command.group(), "Script");
    assert_eq!(command.script_state(), Some(ScriptBindingState::DefaultBound));
    assert_eq!(catalog.names().last().map(String::as_str), Some("Script_Foo"));
}

#[test]
fn test_untouched_script_follows_new_default() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None))]),
        ScriptRefresh::default(),
    );

    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+G", None))]),
        ScriptRefresh::default(),
    );

    assert_eq!(keys_of(&catalog, "Script_Foo"), "Ctrl+Shift+G");
}

#[test]
fn test_customised_script_keeps_user_binding() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None))]),
        ScriptRefresh::default(),
    );
    catalog
        .set_key_gestures("Script_Foo", "Ctrl+Alt+F".parse().unwrap())
        .unwrap();
    assert_eq!(
        catalog.get("Script_Foo").unwrap().script_state(),
        Some(ScriptBindingState::Customized)
    );

    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+G", None))]),
        ScriptRefresh::default(),
    );
    assert_eq!(keys_of(&catalog, "Script_Foo"), "Ctrl+Alt+F");

    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+G", None))]),
        ScriptRefresh {
            force: true,
            replace: false,
        },
    );
    assert_eq!(keys_of(&catalog, "Script_Foo"), "Ctrl+Shift+G");
}

#[test]
fn test_script_argument_reconciliation() {
    let mut catalog = page_catalog();
    let entry = |args| scan(&[("/scripts/Foo.nvjs", declaration("F8", Some(args)))]);

    catalog.apply_script_scan(entry("one"), ScriptRefresh::default());
    catalog.apply_script_scan(entry("two"), ScriptRefresh::default());
    assert_eq!(
        catalog.parameter("Script_Foo").unwrap(),
        Some(&CommandParameter::Script {
            argument: Some("two".to_string())
        })
    );

    let custom = CommandParameter::Script {
        argument: Some("mine".to_string()),
    };
    catalog.set_parameter("Script_Foo", custom.clone()).unwrap();
    catalog.apply_script_scan(entry("three"), ScriptRefresh::default());

    assert_eq!(catalog.parameter("Script_Foo").unwrap(), Some(&custom));
    assert!(catalog.parameter_source("Script_Foo").unwrap().unwrap().is_drifted());
}

#[test]
fn test_script_clones_never_auto_rebind() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None))]),
        ScriptRefresh::default(),
    );
    let clone = catalog.create_clone("Script_Foo").unwrap();

    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+G", None))]),
        ScriptRefresh::default(),
    );

    assert!(catalog.get(&clone).unwrap().bindings().is_empty());
    assert_eq!(catalog.get(&clone).unwrap().text(), "Foo 2");
    assert_eq!(
        catalog.names()[catalog.len() - 2..],
        ["Script_Foo".to_string(), clone.clone()]
    );
}

#[test]
fn test_missing_script_is_removed_with_clones() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[
            ("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None)),
            ("/scripts/Bar.js", declaration("Ctrl+Shift+B", None)),
        ]),
        ScriptRefresh::default(),
    );
    let clone = catalog.create_clone("Script_Foo").unwrap();
    let before = catalog.change_count();

    let report = catalog.apply_script_scan(
        scan(&[("/scripts/Bar.js", declaration("Ctrl+Shift+B", None))]),
        ScriptRefresh::default(),
    );

    assert_eq!(report.removed, vec!["Script_Foo".to_string(), clone.clone()]);
    assert!(!catalog.contains("Script_Foo"));
    assert!(!catalog.contains(&clone));
    assert!(catalog.contains("Script_Bar"));
    assert_eq!(catalog.change_count(), before + 1);
}

#[test]
fn test_mixed_refresh_counts_as_one_change() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[
            ("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None)),
            ("/scripts/Bar.js", declaration("Ctrl+Shift+B", None)),
        ]),
        ScriptRefresh::default(),
    );
    let before = catalog.change_count();

    // Bar updated, Foo removed, Baz and Qux added
    let report = catalog.apply_script_scan(
        scan(&[
            ("/scripts/Bar.js", declaration("Ctrl+Shift+N", None)),
            ("/scripts/Baz.js", declaration("Ctrl+Shift+Z", None)),
            ("/scripts/Qux.js", declaration("Ctrl+Shift+Q", None)),
        ]),
        ScriptRefresh::default(),
    );

    assert_eq!(
        report.added,
        vec!["Script_Baz".to_string(), "Script_Qux".to_string()]
    );
    assert_eq!(report.updated, vec!["Script_Bar".to_string()]);
    assert_eq!(report.removed, vec!["Script_Foo".to_string()]);
    assert_eq!(catalog.change_count(), before + 1);
}

#[test]
fn test_unreadable_script_is_kept() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("Ctrl+Shift+F", None))]),
        ScriptRefresh::default(),
    );
    catalog
        .set_key_gestures("Script_Foo", "Ctrl+Alt+F".parse().unwrap())
        .unwrap();
    let clone = catalog.create_clone("Script_Foo").unwrap();

    let mut unreadable = scan(&[]);
    unreadable.unreadable.push(PathBuf::from("/scripts/Foo.nvjs"));
    let report = catalog.apply_script_scan(unreadable, ScriptRefresh::default());

    assert!(report.removed.is_empty());
    assert_eq!(keys_of(&catalog, "Script_Foo"), "Ctrl+Alt+F");
    assert!(catalog.contains(&clone));
}

#[test]
fn test_share_to_removed_script_falls_back() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[
            ("/scripts/Foo.nvjs", declaration("F7", Some("a"))),
            ("/scripts/Bar.js", declaration("F8", Some("b"))),
        ]),
        ScriptRefresh::default(),
    );
    catalog.set_share("Script_Bar", "Script_Foo").unwrap();

    catalog.apply_script_scan(
        scan(&[("/scripts/Bar.js", declaration("F8", Some("b")))]),
        ScriptRefresh::default(),
    );

    assert_eq!(catalog.get("Script_Bar").unwrap().share_target(), None);
    assert_eq!(
        catalog.parameter("Script_Bar").unwrap(),
        Some(&CommandParameter::Script {
            argument: Some("b".to_string())
        })
    );
}

#[test]
fn test_replace_drops_every_script_first() {
    let mut catalog = page_catalog();
    let foo = scan(&[("/scripts/Foo.nvjs", declaration("F7", None))]);
    catalog.apply_script_scan(foo.clone(), ScriptRefresh::default());
    catalog
        .set_key_gestures("Script_Foo", "F2".parse().unwrap())
        .unwrap();

    let report = catalog.apply_script_scan(
        foo,
        ScriptRefresh {
            force: false,
            replace: true,
        },
    );

    assert_eq!(report.removed, vec!["Script_Foo".to_string()]);
    assert_eq!(report.added, vec!["Script_Foo".to_string()]);
    assert_eq!(keys_of(&catalog, "Script_Foo"), "F7");
}

#[test]
fn test_name_collision_is_skipped() {
    let mut catalog = page_catalog();
    let report = catalog.apply_script_scan(
        scan(&[
            ("/scripts/Foo.nvjs", declaration("F7", None)),
            ("/scripts/Foo.js", declaration("F8", None)),
        ]),
        ScriptRefresh::default(),
    );

    assert_eq!(report.added, vec!["Script_Foo".to_string()]);
    assert_eq!(report.skipped, vec!["Script_Foo".to_string()]);
}

#[derive(Default)]
struct RecordingRunner {
    runs: RefCell<Vec<(PathBuf, String, Option<String>)>>,
}

impl ScriptRunner for RecordingRunner {
    fn run(&self, path: &Path, command: &str, argument: Option<&str>) -> anyhow::Result<()> {
        self.runs.borrow_mut().push((
            path.to_path_buf(),
            command.to_string(),
            argument.map(str::to_string),
        ));
        Ok(())
    }
}

#[test]
fn test_scripts_need_a_runner() {
    let mut catalog = page_catalog();
    catalog.apply_script_scan(
        scan(&[("/scripts/Foo.nvjs", declaration("F7", Some("x")))]),
        ScriptRefresh::default(),
    );
    let args = CommandArgs::default();

    assert!(matches!(
        catalog.execute("Script_Foo", &args),
        Err(CatalogError::NotExecutable(_))
    ));

    let runner = Rc::new(RecordingRunner::default());
    catalog.set_script_runner(Some(runner.clone()));
    catalog.execute("Script_Foo", &args).unwrap();

    assert_eq!(
        runner.runs.borrow().as_slice(),
        &[(
            PathBuf::from("/scripts/Foo.nvjs"),
            "Script_Foo".to_string(),
            Some("x".to_string())
        )]
    );
}
