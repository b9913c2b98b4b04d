use covstack::driver::{HitRecorder, MemoryDriver};
use covstack::metrics::{Metrics, MetricsKind};
use covstack::parser::RustParser;
use covstack::session::{Session, SessionStack};
use covstack::LineSpan;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Methods `next` (coverable 6, 7) and `peek` (coverable 11)
const LEXER: &str = indoc! {"
    mod app {
        pub struct Lexer;

        impl Lexer {
            pub fn next(&self) -> u32 {
                let a = 1;
                a + 1
            }

            pub fn peek(&self) -> u32 {
                0
            }
        }
    }
    // end
"};

/// Coverable lines 5 (closure body) and 7 (the chained call)
const APPLY: &str = indoc! {"
    fn apply(values: &[i32]) -> Vec<i32> {
        values
            .iter()
            .map(|v| {
                v * 2
            })
            .collect()
    }
    // end
"};

/// Free function in a namespace, coverable lines 3 and 4
const UTIL: &str = indoc! {"
    mod util {
        pub fn helper() -> bool {
            let ready = true;
            ready
        }
    }
    // end
"};

/// Two trait impls defining `fmt`, coverable lines 7 and 13
const FORMATS: &str = indoc! {r#"
    use std::fmt;

    struct Foo;

    impl fmt::Display for Foo {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "foo")
        }
    }

    impl fmt::Debug for Foo {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Foo")
        }
    }
    // end
"#};

fn write(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    path
}

/// Run one session over `files`, letting `record` report hits while it runs
fn measure(files: Vec<PathBuf>, record: impl FnOnce(&HitRecorder)) -> Metrics {
    let driver = MemoryDriver::new();
    let recorder = driver.recorder();
    let session = Session::builder(driver, Arc::new(RustParser::new()))
        .files(files)
        .build()
        .unwrap();

    let mut stack = SessionStack::new();
    let id = stack.start(session);
    record(&recorder);
    stack.stop(id, true).unwrap().metrics().unwrap()
}

#[test]
fn test_methods_roll_up_into_class_and_namespace() {
    let dir = TempDir::new().unwrap();
    let lexer = write(&dir, "lexer.rs", LEXER);

    let metrics = measure(vec![lexer.clone()], |rec| {
        rec.hit(&lexer, 6);
        rec.hit(&lexer, 7);
    });

    let next = metrics.get("app\\Lexer::next()").unwrap();
    assert_eq!(next.kind(), MetricsKind::Method);
    assert_eq!(next.data().loc, 4);
    assert_eq!(next.data().ncloc, 2);
    assert_eq!(next.data().cloc, 2);
    assert_eq!(next.data().covered, 2);
    assert_eq!(next.data().line, Some(LineSpan::new(5, 8)));
    assert_eq!(next.data().covered_lines, vec![6, 7]);
    assert_eq!(next.percent(), 100.0);

    let peek = metrics.get("app\\Lexer::peek()").unwrap();
    assert_eq!(peek.data().uncovered_lines, vec![11]);
    assert_eq!(peek.data().cmethods, 0);
    assert_eq!(peek.percent(), 0.0);

    let class = metrics.get("app\\Lexer").unwrap();
    assert_eq!(class.kind(), MetricsKind::Class);
    assert_eq!(class.data().loc, 7);
    assert_eq!(class.data().cloc, 3);
    assert_eq!(class.data().covered, 2);
    assert_eq!(class.data().methods, 2);
    assert_eq!(class.data().cmethods, 1);
    assert_eq!(class.data().line, None);
    assert!(class.data().covered_lines.is_empty());
    assert_eq!(class.percent(), 66.67);

    let namespace = metrics.get("app").unwrap();
    assert_eq!(namespace.kind(), MetricsKind::Namespace);
    assert_eq!(namespace.data(), class.data());
    assert_eq!(metrics.data().cloc, 3);
    assert!(metrics.data().files.contains(&lexer));
}

#[test]
fn test_closure_lines_count_towards_enclosing_function() {
    let dir = TempDir::new().unwrap();
    let apply = write(&dir, "apply.rs", APPLY);

    let metrics = measure(vec![apply.clone()], |rec| {
        rec.hit(&apply, 5);
    });

    assert_eq!(metrics.children().count(), 1);
    let entry = metrics.get("apply()").unwrap();
    assert_eq!(entry.kind(), MetricsKind::Function);
    assert_eq!(entry.data().loc, 8);
    assert_eq!(entry.data().cloc, 2);
    assert_eq!(entry.data().covered, 1);
    assert_eq!(entry.data().covered_lines, vec![5]);
    assert_eq!(entry.data().uncovered_lines, vec![7]);
    assert_eq!(entry.percent(), 50.0);
}

#[test]
fn test_root_sums_every_file() {
    let dir = TempDir::new().unwrap();
    let lexer = write(&dir, "lexer.rs", LEXER);
    let util = write(&dir, "util.rs", UTIL);

    let metrics = measure(vec![lexer.clone(), util.clone()], |rec| {
        rec.hit(&lexer, 11);
        rec.hit(&util, 3);
        rec.hit(&util, 4);
    });

    let helper = metrics.get("util\\helper()").unwrap();
    assert_eq!(helper.kind(), MetricsKind::Function);
    assert_eq!(helper.percent(), 100.0);

    let root = metrics.data();
    assert_eq!(root.methods, 3);
    assert_eq!(root.cmethods, 2);
    assert_eq!(root.cloc, 5);
    assert_eq!(root.covered, 3);
    assert_eq!(root.files.len(), 2);
    assert_eq!(metrics.percent(), 60.0);
}

#[test]
fn test_unexecuted_sources_report_zero_percent() {
    let dir = TempDir::new().unwrap();
    let util = write(&dir, "util.rs", UTIL);

    let metrics = measure(vec![util], |_| {});

    assert_eq!(metrics.data().cloc, 2);
    assert_eq!(metrics.data().covered, 0);
    assert_eq!(metrics.percent(), 0.0);
}

#[test]
fn test_report_serializes_tree_with_percentages() {
    let dir = TempDir::new().unwrap();
    let lexer = write(&dir, "lexer.rs", LEXER);

    let metrics = measure(vec![lexer.clone()], |rec| rec.hit(&lexer, 6));
    let json = serde_json::to_value(metrics.report()).unwrap();

    let app = &json["children"][0];
    assert_eq!(app["name"], "app");
    assert_eq!(app["kind"], "namespace");
    assert_eq!(app["cloc"], 3);
    assert_eq!(app["percent"], 33.33);

    let next = &app["children"][0]["children"][0];
    assert_eq!(next["name"], "next()");
    assert_eq!(next["kind"], "method");
    assert_eq!(next["line"]["start"], 5);
    assert_eq!(next["covered_lines"], serde_json::json!([6]));
    assert_eq!(next["uncovered_lines"], serde_json::json!([7]));
}

#[test]
fn test_trait_impls_of_one_type_stay_separate() {
    let dir = TempDir::new().unwrap();
    let formats = write(&dir, "formats.rs", FORMATS);

    let metrics = measure(vec![formats.clone()], |rec| rec.hit(&formats, 7));

    let display = metrics.get("Foo as Display::fmt()").unwrap();
    assert_eq!(display.kind(), MetricsKind::Method);
    assert_eq!(display.data().methods, 1);
    assert_eq!(display.data().cmethods, 1);
    assert_eq!(display.data().line, Some(LineSpan::new(6, 8)));
    assert_eq!(display.data().covered_lines, vec![7]);
    assert!(display.data().uncovered_lines.is_empty());

    let debug = metrics.get("Foo as Debug::fmt()").unwrap();
    assert_eq!(debug.data().methods, 1);
    assert_eq!(debug.data().cmethods, 0);
    assert_eq!(debug.data().line, Some(LineSpan::new(12, 14)));
    assert_eq!(debug.data().uncovered_lines, vec![13]);

    assert_eq!(metrics.get("Foo as Display").unwrap().kind(), MetricsKind::Class);
    assert_eq!(metrics.data().methods, 2);
    assert_eq!(metrics.percent(), 50.0);
}

#[test]
fn test_same_function_in_two_files_is_reported_twice() {
    let dir = TempDir::new().unwrap();
    let first = write(&dir, "first.rs", UTIL);
    let second = write(&dir, "second.rs", UTIL);

    let metrics = measure(vec![first.clone(), second.clone()], |rec| {
        rec.hit(&first, 3);
        rec.hit(&first, 4);
    });

    let covered = metrics.get("util\\helper()").unwrap();
    assert_eq!(covered.data().methods, 1);
    assert_eq!(covered.percent(), 100.0);
    assert!(covered.data().files.contains(&first));

    let uncovered = metrics.get("util\\helper#2()").unwrap();
    assert_eq!(uncovered.data().methods, 1);
    assert_eq!(uncovered.percent(), 0.0);
    assert!(uncovered.data().files.contains(&second));

    assert_eq!(metrics.get("util").unwrap().data().methods, 2);
}
