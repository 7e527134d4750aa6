//! Project Materializer Tests
//!
//! CHARACTERIZATION: These tests pin how a code-bearing reply becomes a
//! project directory.
//!
//! What these tests protect:
//! - Fence grammar (filename comments, default names)
//! - Slug derivation
//! - Refusal to write outside the project
//! - Snapshot scanning

use bars_core::memory::SnapshotEntry;
use bars_core::project::{
    extract_code_files, is_project_request, list_projects, materialize, project_slug,
    scan_snapshot,
};
use bars_core::CodeFile;
use chrono::{Local, TimeZone};
use tempfile::TempDir;

// =============================================================================
// Test: extraction
// =============================================================================

mod extraction {
    use super::*;

    #[test]
    fn test_named_python_block() {
        let reply = "Here's your game!\n```python\n# main.py\nprint('snake')\n```\nEnjoy.";
        assert_eq!(
            extract_code_files(reply),
            vec![CodeFile::new("main.py", "print('snake')")]
        );
    }

    #[test]
    fn test_name_on_fence_line() {
        let reply = "```js // app.js\nconsole.log(1)\n```";
        assert_eq!(
            extract_code_files(reply),
            vec![CodeFile::new("app.js", "console.log(1)")]
        );
    }

    #[test]
    fn test_comment_styles() {
        let reply = "```html\n<!-- index.html -->\n<p>hi</p>\n```\n\
                     ```css\n/* style.css */\np {}\n```\n\
                     ```sql\n-- schema.sql\nselect 1;\n```";
        let names: Vec<String> = extract_code_files(reply).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["index.html", "style.css", "schema.sql"]);
    }

    #[test]
    fn test_unnamed_blocks_get_default_names() {
        let reply = "```python\nprint(1)\n```\n```python\nprint(2)\n```\n```\nnotes\n```";
        let names: Vec<String> = extract_code_files(reply).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["main.py", "file1.py", "file2.txt"]);
    }

    #[test]
    fn test_plain_comment_is_code() {
        let reply = "```python\n# this prints stuff\nprint(1)\n```";
        let files = extract_code_files(reply);
        assert_eq!(files[0].name, "main.py");
        assert!(files[0].content.starts_with("# this prints stuff"));
    }

    #[test]
    fn test_c_include_is_code_not_a_name() {
        let reply = "```c\n#include<stdio.h>\nint main(){return 0;}\n```";
        assert_eq!(
            extract_code_files(reply),
            vec![CodeFile::new(
                "main.c",
                "#include<stdio.h>\nint main(){return 0;}"
            )]
        );
    }

    #[test]
    fn test_duplicate_name_later_block_wins() {
        let reply = "```python\n# main.py\nold\n```\n```python\n# main.py\nnew\n```";
        assert_eq!(extract_code_files(reply), vec![CodeFile::new("main.py", "new")]);
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let reply = "```python\n# main.py\nprint('cut off')";
        assert_eq!(
            extract_code_files(reply),
            vec![CodeFile::new("main.py", "print('cut off')")]
        );
    }

    #[test]
    fn test_no_blocks() {
        assert!(extract_code_files("no code here, sorry").is_empty());
    }
}

// =============================================================================
// Test: request detection and slugs
// =============================================================================

mod naming {
    use super::*;

    #[test]
    fn test_project_request_detection() {
        assert!(is_project_request("make a snake game"));
        assert!(is_project_request("Can you CREATE a todo App"));
        assert!(is_project_request("write a script that renames files"));
        assert!(!is_project_request("how was your day"));
        assert!(!is_project_request("I played a game today"));
    }

    #[test]
    fn test_slug_takes_three_meaningful_words() {
        let now = Local::now();
        assert_eq!(project_slug("make a snake game in python", now), "snake_game_python");
        assert_eq!(project_slug("Create me a Todo-List app!", now), "todo_list_app");
    }

    #[test]
    fn test_slug_falls_back_to_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(project_slug("make me a", now), "project_20240309_140507");
    }
}

// =============================================================================
// Test: writing to disk
// =============================================================================

mod writing {
    use super::*;

    #[test]
    fn test_materialize_writes_files() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            CodeFile::new("main.py", "print('hi')"),
            CodeFile::new("lib/util.py", "X = 1"),
        ];

        let report = materialize(dir.path(), "demo", &files).unwrap();

        assert_eq!(report.name, "demo");
        assert_eq!(report.created.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("demo/main.py")).unwrap(),
            "print('hi')\n"
        );
        assert!(dir.path().join("demo/lib/util.py").is_file());
        assert_eq!(report.main_file(), Some(dir.path().join("demo/main.py").as_path()));
    }

    #[test]
    fn test_materialize_skips_escaping_names() {
        let dir = TempDir::new().unwrap();
        let projects = dir.path().join("projects");
        let files = vec![
            CodeFile::new("../evil.py", "boom"),
            CodeFile::new("/tmp/abs.py", "boom"),
            CodeFile::new("ok.py", "fine"),
        ];

        let report = materialize(&projects, "demo", &files).unwrap();

        assert_eq!(report.skipped, vec!["../evil.py", "/tmp/abs.py"]);
        assert_eq!(report.created.len(), 1);
        assert!(!projects.join("evil.py").exists());
        assert!(report.to_string().contains("Skipped: ../evil.py, /tmp/abs.py"));
    }

    #[test]
    fn test_report_display() {
        let dir = TempDir::new().unwrap();
        let report = materialize(dir.path(), "demo", &[CodeFile::new("main.py", "x")]).unwrap();
        let text = report.to_string();
        assert!(text.starts_with("🎯 Project created: demo\n📁 Location: "));
        assert!(text.ends_with("📄 Files created: 1"));
    }
}

// =============================================================================
// Test: listing and snapshot
// =============================================================================

mod scanning {
    use super::*;

    fn seed(root: &std::path::Path) {
        let projects = root.join("projects");
        std::fs::create_dir_all(projects.join("beta")).unwrap();
        std::fs::create_dir_all(projects.join("alpha/src")).unwrap();
        std::fs::create_dir_all(projects.join("empty")).unwrap();
        std::fs::write(projects.join("beta/main.py"), "").unwrap();
        std::fs::write(projects.join("alpha/b.js"), "").unwrap();
        std::fs::write(projects.join("alpha/a.js"), "").unwrap();
        std::fs::write(projects.join("alpha/src/x.js"), "").unwrap();
    }

    #[test]
    fn test_list_projects_sorted() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());

        let names: Vec<String> = list_projects(&dir.path().join("projects"))
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "empty"]);
    }

    #[test]
    fn test_list_projects_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(list_projects(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_snapshot_lists_folders_with_files() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());

        let snapshot = scan_snapshot(dir.path(), &dir.path().join("projects"));
        let sep = std::path::MAIN_SEPARATOR;
        assert_eq!(
            snapshot,
            vec![
                SnapshotEntry {
                    folder: format!("projects{sep}alpha"),
                    files: vec!["a.js".to_string(), "b.js".to_string()],
                },
                SnapshotEntry {
                    folder: format!("projects{sep}alpha{sep}src"),
                    files: vec!["x.js".to_string()],
                },
                SnapshotEntry {
                    folder: format!("projects{sep}beta"),
                    files: vec!["main.py".to_string()],
                },
            ]
        );
    }
}
