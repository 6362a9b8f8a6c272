//! End-to-end tests: a real on-disk format tree, a populated checker
//! registry, one engine pass, and the serialized reports.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use uuid::Uuid;

use validate_doc::logger::{LogLevel, MemoryLogger};
use validate_doc::plugin::{CheckStatus, CheckerRegistration, CheckerRegistry};
use validate_doc::report::{Issue, IssueLevel, Location};
use validate_doc::serialize;
use validate_doc::validator::ValidationEngine;

/// One format tree under a tempdir:
/// `<root>/xodr/{format.json, config.json, checks/}` and a document file.
struct FormatTree {
    dir: TempDir,
}

impl FormatTree {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let format_dir = dir.path().join("xodr");
        fs::create_dir_all(format_dir.join("checks")).unwrap();
        fs::write(
            format_dir.join("format.json"),
            r#"{"extension": "xodr", "name": "OpenDRIVE"}"#,
        )
        .unwrap();
        fs::write(format_dir.join("config.json"), "{}").unwrap();
        fs::write(
            dir.path().join("map.xodr"),
            "<OpenDRIVE><road id=\"1\"/></OpenDRIVE>",
        )
        .unwrap();
        Self { dir }
    }

    fn format_root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    fn document(&self) -> PathBuf {
        self.dir.path().join("map.xodr")
    }

    fn checks_dir(&self) -> PathBuf {
        self.dir.path().join("xodr").join("checks")
    }

    fn add_bundle(&self, dir_name: &str, manifest: &str, checker_files: &[&str]) {
        let bundle_dir = self.checks_dir().join(dir_name);
        fs::create_dir_all(&bundle_dir).unwrap();
        fs::write(bundle_dir.join("bundle.toml"), manifest).unwrap();
        for file in checker_files {
            fs::write(bundle_dir.join(file), "").unwrap();
        }
    }

    fn set_bundle_order(&self, names: &[&str]) {
        let quoted: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
        fs::write(
            self.checks_dir().join("order.toml"),
            format!("order = [{}]\n", quoted.join(", ")),
        )
        .unwrap();
    }
}

/// A checker that attaches one issue with a caller-fixed identifier, so
/// serialized output can be compared across runs.
fn fixed_issue_checker(
    id: &str,
    description: &str,
    issue_id: u128,
    message: &'static str,
) -> CheckerRegistration {
    CheckerRegistration::new(id, description, move |ctx| {
        ctx.add_issue(Issue::with_identifier(
            Uuid::from_u128(issue_id),
            IssueLevel::Warning,
            message,
            vec![Location::file(3, 1), Location::xml("/OpenDRIVE/road[1]")],
        ));
        Ok(CheckStatus::Completed)
    })
}

#[test]
fn full_pipeline_produces_all_three_report_forms() {
    let tree = FormatTree::new();
    tree.add_bundle(
        "semantic",
        "name = \"semantic\"\ndescription = \"Semantic checks\"\nversion = \"2.1.0\"\norder = [\"check_road_ids\", \"check_links\"]\n",
        &["check_road_ids.toml", "check_links.toml"],
    );

    let mut registry = CheckerRegistry::new();
    registry.register(
        "semantic",
        "check_road_ids",
        fixed_issue_checker("road_ids", "Road ids are unique", 1, "duplicate road id"),
    );
    registry.register(
        "semantic",
        "check_links",
        CheckerRegistration::new("links", "Road links resolve", |ctx| {
            // The document is reachable through the context
            assert!(ctx.document().text().unwrap().contains("OpenDRIVE"));
            Ok(CheckStatus::Completed)
        }),
    );

    let mut engine = ValidationEngine::new(registry, tree.format_root());
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&tree.document(), None, None, &logger);

    assert!(outcome.valid);
    assert_eq!(outcome.report.issue_count(), 1);

    let xml = serialize::to_xqar_string(&outcome.report);
    assert!(xml.contains("<CheckerResults version=\"1.0.0\">"));
    assert!(xml.contains(
        "name=\"semantic\" description=\"Semantic checks\" version=\"2.1.0\""
    ));
    assert!(xml.contains("summary=\"Found 1 issue\""));
    assert!(xml.contains("<Param name=\"XodrFile\""));
    assert!(xml.contains("checkerId=\"links\""));
    assert!(xml.contains("checkerId=\"road_ids\""));
    assert!(xml.contains("level=\"2\""));
    assert!(xml.contains("<FileLocation row=\"3\" column=\"1\" fileType=\"1\"/>"));
    assert!(xml.contains("<XMLLocation xpath=\"/OpenDRIVE/road[1]\"/>"));

    let json: serde_json::Value =
        serde_json::from_str(&serialize::to_json_string(&outcome.report).unwrap()).unwrap();
    assert_eq!(json["bundles"][0]["name"], "semantic");
    assert_eq!(
        json["bundles"][0]["checkers"][0]["issues"][0]["level"],
        "Warning"
    );

    let text = serialize::to_text_string(&outcome.report);
    assert!(text.starts_with("CheckerResults:\n"));
    assert!(text.contains("bundle semantic"));
    assert!(text.contains("  check = road_ids - Road ids are unique"));
    assert!(text.contains("    Warning: duplicate road id"));
    // The checker without findings gets the placeholder line
    assert!(text.contains("  check = links - Road links resolve\n    ok"));
}

#[test]
fn canonical_xml_is_independent_of_execution_order() {
    // One tree, one document; only the ordering manifest changes between
    // the two runs, so any difference in output would come from execution
    // order alone.
    let tree = FormatTree::new();
    tree.add_bundle("alpha", "name = \"alpha\"\n", &["check_a.toml"]);
    tree.add_bundle("beta", "name = \"beta\"\n", &["check_b.toml"]);

    let run = |tree: &FormatTree, order: &[&str]| {
        tree.set_bundle_order(order);

        let mut registry = CheckerRegistry::new();
        registry.register(
            "alpha",
            "check_a",
            fixed_issue_checker("a", "first checker", 100, "finding a"),
        );
        registry.register(
            "beta",
            "check_b",
            fixed_issue_checker("b", "second checker", 200, "finding b"),
        );

        let mut engine = ValidationEngine::new(registry, tree.format_root());
        let logger = MemoryLogger::new();
        let outcome = engine.validate_file(&tree.document(), None, None, &logger);
        assert!(outcome.valid);

        // Report bundles reflect execution order; serialization must not
        let names: Vec<String> = outcome
            .report
            .bundles()
            .iter()
            .map(|b| b.name.clone())
            .collect();
        (serialize::to_xqar_string(&outcome.report), names)
    };

    let (forward_xml, forward_names) = run(&tree, &["alpha", "beta"]);
    let (reverse_xml, reverse_names) = run(&tree, &["beta", "alpha"]);

    assert_eq!(forward_names, vec!["alpha", "beta"]);
    assert_eq!(reverse_names, vec!["beta", "alpha"]);
    assert_eq!(forward_xml, reverse_xml);
}

#[test]
fn manifest_ordering_and_missing_entries_end_to_end() {
    let tree = FormatTree::new();
    tree.add_bundle("core", "name = \"core\"\n", &["check_one.toml"]);
    tree.add_bundle("extra", "name = \"extra\"\n", &["check_two.toml"]);
    tree.set_bundle_order(&["extra", "ghost", "core"]);

    let mut registry = CheckerRegistry::new();
    registry.register(
        "core",
        "check_one",
        CheckerRegistration::new("one", "first", |_ctx| Ok(CheckStatus::Completed)),
    );
    registry.register(
        "extra",
        "check_two",
        CheckerRegistration::new("two", "second", |_ctx| Ok(CheckStatus::Completed)),
    );

    let mut engine = ValidationEngine::new(registry, tree.format_root());
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&tree.document(), None, None, &logger);

    assert!(outcome.valid);
    let names: Vec<&str> = outcome
        .report
        .bundles()
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(names, vec!["extra", "core"]);

    // The absent manifest entry logged exactly one error
    let errors = logger.messages_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("ghost"));
}

#[test]
fn additional_check_roots_contribute_bundles_after_default_root() {
    let tree = FormatTree::new();
    tree.add_bundle("core", "name = \"core\"\n", &["check_one.toml"]);

    let extra_root = tempfile::tempdir().unwrap();
    let extra_bundle = extra_root.path().join("vendor");
    fs::create_dir_all(&extra_bundle).unwrap();
    fs::write(extra_bundle.join("bundle.toml"), "name = \"vendor\"\n").unwrap();
    fs::write(extra_bundle.join("check_vendor.toml"), "").unwrap();

    let mut registry = CheckerRegistry::new();
    registry.register(
        "core",
        "check_one",
        CheckerRegistration::new("one", "core checker", |_ctx| Ok(CheckStatus::Completed)),
    );
    registry.register(
        "vendor",
        "check_vendor",
        CheckerRegistration::new("vendor_check", "vendor checker", |_ctx| {
            Ok(CheckStatus::Completed)
        }),
    );

    let mut engine = ValidationEngine::new(registry, tree.format_root())
        .with_additional_roots(vec![extra_root.path().to_path_buf()]);
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&tree.document(), None, None, &logger);

    assert!(outcome.valid);
    let names: Vec<&str> = outcome
        .report
        .bundles()
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(names, vec!["core", "vendor"]);
}

#[test]
fn fatal_check_keeps_partial_issues_and_marks_document_invalid() {
    let tree = FormatTree::new();
    tree.add_bundle(
        "gate",
        "name = \"gate\"\norder = [\"check_first\", \"check_fatal\"]\n",
        &["check_first.toml", "check_fatal.toml"],
    );
    tree.add_bundle("after", "name = \"after\"\n", &["check_never.toml"]);
    tree.set_bundle_order(&["gate", "after"]);

    let mut registry = CheckerRegistry::new();
    registry.register(
        "gate",
        "check_first",
        fixed_issue_checker("first", "runs before the gate", 7, "kept finding"),
    );
    registry.register(
        "gate",
        "check_fatal",
        CheckerRegistration::new("header", "parse the document header", |_ctx| {
            Ok(CheckStatus::Fatal)
        }),
    );
    registry.register(
        "after",
        "check_never",
        CheckerRegistration::new("never", "unreachable", |_ctx| {
            panic!("must not run after a fatal signal")
        }),
    );

    let mut engine = ValidationEngine::new(registry, tree.format_root());
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&tree.document(), None, None, &logger);

    assert!(!outcome.valid);
    assert_eq!(outcome.report.bundle_count(), 1);
    assert_eq!(outcome.report.issue_count(), 1);
    assert_eq!(
        outcome.report.bundles()[0].checkers()[0].issues()[0].description,
        "kept finding"
    );
}

#[test]
fn empty_format_tree_validates_cleanly() {
    let tree = FormatTree::new();

    let mut engine = ValidationEngine::new(CheckerRegistry::new(), tree.format_root());
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&tree.document(), None, None, &logger);

    assert!(outcome.valid);
    assert_eq!(outcome.report.bundle_count(), 0);
    assert_eq!(outcome.report.issue_count(), 0);

    let xml = serialize::to_xqar_string(&outcome.report);
    assert!(xml.contains("<CheckerResults version=\"1.0.0\">\n</CheckerResults>"));
}

#[test]
fn absent_format_settings_do_not_raise() {
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("map.xodr");
    fs::write(&document, "<OpenDRIVE/>").unwrap();

    let mut engine = ValidationEngine::new(CheckerRegistry::new(), dir.path());
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&document, None, None, &logger);

    assert!(!outcome.valid);
    assert_eq!(outcome.report.bundle_count(), 0);
    assert!(logger.error_count() >= 1);
}

#[test]
fn explicit_config_path_overrides_format_default() {
    let tree = FormatTree::new();
    tree.add_bundle("tuned", "name = \"tuned\"\n", &["check_limit.toml"]);

    let config_path = tree.dir.path().join("custom_config.json");
    fs::write(&config_path, r#"{"tuned": {"limit": {"max": 99}}}"#).unwrap();

    let mut registry = CheckerRegistry::new();
    registry.register(
        "tuned",
        "check_limit",
        CheckerRegistration::new("limit", "limit checker", |ctx| {
            assert_eq!(ctx.config()["max"], serde_json::json!(99));
            Ok(CheckStatus::Completed)
        }),
    );

    let mut engine = ValidationEngine::new(registry, tree.format_root());
    let logger = MemoryLogger::new();
    let outcome = engine.validate_file(&tree.document(), Some(&config_path), None, &logger);

    assert!(outcome.valid);
    assert_eq!(logger.error_count(), 0);
}
