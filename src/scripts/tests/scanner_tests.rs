use std::{fs, path::Path};
use tempfile::TempDir;

use crate::core::{ActionProvider, CommandCatalog, CommandDefinition, NoActions, ScriptRefresh};
use crate::scripts::{ScanError, ScriptScanner};

fn write_script(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_scan_reads_declarations_sorted() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "Zoom.nvjs", "// @shortcutkey Ctrl+Shift+Z\n");
    write_script(dir.path(), "Alpha.js", "// @name First\n");
    write_script(dir.path(), "readme.txt", "// @shortcutkey F1\n");

    let scan = ScriptScanner::new(dir.path().to_path_buf()).scan().unwrap();

    let names: Vec<_> = scan
        .entries
        .iter()
        .map(|e| e.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha.js", "Zoom.nvjs"]);
    assert_eq!(scan.entries[0].declaration.text, "First");
    assert_eq!(
        scan.entries[1].declaration.bindings.keys.to_string(),
        "Ctrl+Shift+Z"
    );
}

#[test]
fn test_non_utf8_script_is_decoded_lossily() {
    let dir = TempDir::new().unwrap();
    let mut content = b"// @shortcutkey Ctrl+Shift+F\nlog(\"".to_vec();
    content.extend_from_slice(&[0x82, 0xa0]);
    content.extend_from_slice(b"\");\n");
    fs::write(dir.path().join("Foo.nvjs"), content).unwrap();

    let scan = ScriptScanner::new(dir.path().to_path_buf()).scan().unwrap();

    assert_eq!(scan.entries.len(), 1);
    assert!(scan.unreadable.is_empty());
    assert_eq!(
        scan.entries[0].declaration.bindings.keys.to_string(),
        "Ctrl+Shift+F"
    );
}

#[test]
fn test_custom_extensions() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "a.nvjs", "");
    write_script(dir.path(), "b.lua", "");

    let scanner = ScriptScanner::new(dir.path().to_path_buf()).with_extensions(["LUA"]);
    let scan = scanner.scan().unwrap();

    assert_eq!(scan.entries.len(), 1);
    assert!(scan.entries[0].path.ends_with("b.lua"));
}

#[test]
fn test_missing_folder_is_an_error() {
    let dir = TempDir::new().unwrap();
    let scanner = ScriptScanner::new(dir.path().join("missing"));

    assert!(matches!(scanner.scan(), Err(ScanError::FolderNotFound(_))));
    assert!(matches!(scanner.spawn().wait(), Err(ScanError::FolderNotFound(_))));
}

#[test]
fn test_background_scan_feeds_catalog() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "Foo.nvjs", "// @shortcutkey Ctrl+Shift+F\n// @args -q\n");

    let handle = ScriptScanner::new(dir.path().to_path_buf()).spawn();
    let scan = handle.wait().unwrap();

    let mut catalog = CommandCatalog::from_definitions([CommandDefinition::new(
        "Quit",
        "File",
        "Quit",
        NoActions.action_for("Quit"),
    )])
    .unwrap();
    let report = catalog.apply_script_scan(scan, ScriptRefresh::default());

    assert_eq!(report.added, vec!["Script_Foo".to_string()]);
    assert_eq!(
        catalog.get("Script_Foo").unwrap().bindings().keys.to_string(),
        "Ctrl+Shift+F"
    );
    assert_eq!(catalog.change_count(), 1);
}

#[test]
fn test_try_take_eventually_yields() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "Foo.js", "");

    let handle = ScriptScanner::new(dir.path().to_path_buf()).spawn();
    let result = loop {
        if let Some(result) = handle.try_take() {
            break result;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    };

    assert_eq!(result.unwrap().entries.len(), 1);
}
