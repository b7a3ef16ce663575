use bundle_treemap::analyzer::{analyze_stats, AnalyzerOptions};
use bundle_treemap::output::report_to_string;
use bundle_treemap::parser::parse_bundle;
use bundle_treemap::sizes::{InMemorySources, SourceProvider};
use bundle_treemap::utils::ParseError;
use bundle_treemap::ChartNode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn analyze(payload: &Value) -> Vec<ChartNode> {
    analyze_stats(payload, None, &AnalyzerOptions::default())
        .unwrap()
        .chart_data
}

fn analyze_with(payload: &Value, sources: &dyn SourceProvider) -> Vec<ChartNode> {
    analyze_stats(payload, Some(sources), &AnalyzerOptions::default())
        .unwrap()
        .chart_data
}

fn labels(nodes: &[ChartNode]) -> Vec<&str> {
    nodes.iter().map(|node| node.label.as_str()).collect()
}

/// Every folder's sizes are the sum of its children's
fn assert_sum_law(node: &ChartNode) {
    if let Some(groups) = &node.groups {
        if !node.concatenated && !groups.is_empty() {
            let stat: u64 = groups.iter().map(|child| child.size.stat_size).sum();
            assert_eq!(node.size.stat_size, stat, "statSize of {}", node.label);

            let parsed: Vec<u64> = groups.iter().filter_map(|child| child.size.parsed_size).collect();
            let expected = if parsed.is_empty() { None } else { Some(parsed.iter().sum::<u64>()) };
            assert_eq!(node.size.parsed_size, expected, "parsedSize of {}", node.label);
        }
        groups.iter().for_each(assert_sum_law);
    }
}

#[test]
fn test_single_chunk_single_module() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "size": 141, "chunks": [0]}],
        "chunks": [{"id": 0, "files": ["bundle.js"], "size": 141}],
        "modules": [{"id": 0, "name": "./index.js", "size": 141, "chunks": [0]}]
    });

    let chart = analyze(&payload);

    assert_eq!(
        serde_json::to_value(&chart).unwrap(),
        json!([{
            "label": "bundle.js",
            "statSize": 141,
            "isAsset": true,
            "groups": [{"id": 0, "label": "index.js", "path": "./index.js", "statSize": 141}]
        }])
    );
}

#[test]
fn test_array_config_keeps_order() {
    let payload = json!([
        {
            "assets": [{"name": "config-1-main.js", "size": 10, "chunks": [0]}],
            "modules": [{"id": 0, "name": "./a.js", "size": 10, "chunks": [0]}]
        },
        {
            "assets": [{"name": "config-2-main.js", "size": 20, "chunks": [0]}],
            "modules": [{"id": 0, "name": "./b.js", "size": 20, "chunks": [0]}]
        }
    ]);

    let chart = analyze(&payload);
    assert_eq!(labels(&chart), vec!["config-1-main.js", "config-2-main.js"]);
    assert_eq!(chart[1].size.stat_size, 20);
}

#[test]
fn test_children_and_array_shapes_match() {
    let configs = json!([
        {"assets": [{"name": "a.js", "chunks": [0]}], "modules": [{"id": 0, "name": "./a.js", "size": 1, "chunks": [0]}]},
        {"assets": [{"name": "b.js", "chunks": [0]}], "modules": [{"id": 0, "name": "./b.js", "size": 2, "chunks": [0]}]}
    ]);
    let multi = json!({"hash": "x", "children": configs.clone()});

    assert_eq!(analyze(&configs), analyze(&multi));
}

#[test]
fn test_missing_module_id_keeps_chunk() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "size": 90, "chunks": [0]}],
        "chunks": [{"id": 0, "files": ["bundle.js"], "size": 24, "modules": [7]}],
        "modules": []
    });

    let sources = InMemorySources::new().with_bundle("bundle.js", "webpackJsonp([0], { 1: function () {} });");
    let chart = analyze_with(&payload, &sources);

    assert_eq!(chart.len(), 1);
    assert_eq!(chart[0].size.stat_size, 24);
    assert_eq!(chart[0].size.parsed_size, None);
    assert_eq!(chart[0].size.gzip_size, None);
    assert_eq!(chart[0].children()[0].label, "unresolved modules: 7");
}

#[test]
fn test_missing_chunk_uses_asset_size() {
    let payload = json!({
        "assets": [{"name": "invalid-chunk.js", "size": 24, "chunks": [3]}],
        "chunks": [{"id": 0, "files": ["main.js"]}],
        "modules": []
    });

    let chart = analyze(&payload);
    assert_eq!(chart[0].label, "invalid-chunk.js");
    assert_eq!(chart[0].size.stat_size, 24);
    assert!(chart[0].descendants().iter().all(|node| node.size.parsed_size.is_none()));
}

#[test]
fn test_worker_bundle_is_sibling_root() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "size": 50, "chunks": [0]}],
        "modules": [{"id": 0, "name": "./src/index.js", "size": 50, "chunks": [0]}],
        "children": [{
            "name": "worker",
            "assets": [{"name": "bundle.worker.js", "size": 30, "chunks": [0]}],
            "modules": [{"id": 0, "name": "./src/worker.js", "size": 30, "chunks": [0]}]
        }]
    });

    let chart = analyze(&payload);
    assert_eq!(labels(&chart), vec!["bundle.js", "bundle.worker.js"]);
    assert!(chart[0].child("src").unwrap().child("worker.js").is_none());
    assert_eq!(chart[1].size.stat_size, 30);
}

#[test]
fn test_dynamic_import_chunk_gets_own_root() {
    let payload = json!({
        "assets": [
            {"name": "main.js", "chunks": [0]},
            {"name": "1.main.js", "chunks": [1]}
        ],
        "chunks": [
            {"id": 0, "children": [1], "modules": [{"id": 0, "name": "./main.js", "size": 10}]},
            {"id": 1, "parents": [0], "modules": [{"id": 1, "name": "./lazy.js", "size": 15}]}
        ]
    });

    let chart = analyze(&payload);
    assert_eq!(labels(&chart), vec!["main.js", "1.main.js"]);
    assert_eq!(chart[0].size.stat_size, 10);
    assert_eq!(chart[1].size.stat_size, 15);
}

#[test]
fn test_malformed_module_among_valid_siblings() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}],
        "modules": [
            {"id": 1, "name": "./a.js", "size": 10, "chunks": [0]},
            {"id": 2, "name": "./b.js", "chunks": [0]},
            {"id": 3, "name": "./c.js", "size": 30, "chunks": [0]},
            {"id": 4, "name": "./d.js", "size": "big", "chunks": [0]}
        ]
    });

    let chart = analyze(&payload);
    assert_eq!(labels(chart[0].children()), vec!["a.js", "c.js"]);
    assert_eq!(chart[0].size.stat_size, 40);
}

#[test]
fn test_shared_module_counted_in_each_bundle() {
    let payload = json!({
        "assets": [
            {"name": "a.js", "chunks": [0]},
            {"name": "b.js", "chunks": [1]}
        ],
        "modules": [{"id": 1, "name": "./shared.js", "size": 12, "chunks": [0, 1]}]
    });

    let chart = analyze(&payload);
    assert_eq!(chart[0].size.stat_size, 12);
    assert_eq!(chart[1].size.stat_size, 12);
}

#[test]
fn test_utf8_byte_sizes() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}],
        "modules": [{"id": 1, "name": "./src/ünï.js", "source": "const s = 'ü€';", "chunks": [0]}]
    });

    let chart = analyze(&payload);
    let module = chart[0].child("src").unwrap().child("ünï.js").unwrap();
    assert_eq!(module.size.stat_size, "const s = 'ü€';".len() as u64);
    assert_eq!(module.size.stat_size, 18);
    assert_eq!(module.path.as_deref(), Some("./src/ünï.js"));
}

#[test]
fn test_concatenated_umbrella_keeps_declared_size() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}],
        "modules": [{
            "id": 1,
            "name": "./src/index.js + 2 modules",
            "size": 100,
            "chunks": [0],
            "modules": [
                {"name": "./src/index.js", "size": 70},
                {"name": "./src/a.js", "size": 60}
            ]
        }]
    });

    let chart = analyze(&payload);
    let umbrella = chart[0]
        .child("src")
        .unwrap()
        .child("index.js + 2 modules (concatenated)")
        .unwrap();

    assert!(umbrella.concatenated);
    assert_eq!(umbrella.size.stat_size, 100);

    let content = umbrella.child("src").unwrap();
    assert_eq!(content.size.stat_size, 130);
    assert!(content.children().iter().all(|leaf| leaf.inaccurate_sizes));
    assert_eq!(
        content.child("index.js").unwrap().path.as_deref(),
        Some("./src/index.js + 2 modules/src/index.js")
    );
}

#[test]
fn test_module_and_folder_of_same_name_both_kept() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}],
        "modules": [
            {"id": 1, "name": "./src/foo", "size": 10, "chunks": [0]},
            {"id": 2, "name": "./src/foo/bar.js", "size": 5, "chunks": [0]}
        ]
    });

    let chart = analyze(&payload);

    assert_eq!(chart[0].size.stat_size, 15);
    let src = chart[0].child("src").unwrap();
    assert_eq!(labels(src.children()), vec!["foo", "foo"]);

    let leaves: Vec<&ChartNode> = chart[0]
        .descendants()
        .into_iter()
        .filter(|node| node.groups.is_none())
        .collect();
    let ids: Vec<String> = leaves
        .iter()
        .filter_map(|leaf| leaf.id.as_ref().map(|id| id.to_string()))
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_sum_law(&chart[0]);
}

#[test]
fn test_measured_sizes_and_sum_law() {
    let bundle = "webpackJsonp([0], {\n\
        1: function (m) { m.exports = 'alpha'; },\n\
        2: function (m) { m.exports = 'beta'; }\n\
    });";
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}],
        "modules": [
            {"id": 1, "name": "./src/a.js", "size": 100, "chunks": [0]},
            {"id": 2, "name": "./src/lib/b.js", "size": 50, "chunks": [0]},
            {"id": 3, "name": "./src/lib/gone.js", "size": 5, "chunks": [0]}
        ]
    });

    let sources = InMemorySources::new().with_bundle("bundle.js", bundle);
    let chart = analyze_with(&payload, &sources);

    let src = chart[0].child("src").unwrap();
    let a = src.child("a.js").unwrap();
    assert_eq!(a.size.parsed_size, Some("function (m) { m.exports = 'alpha'; }".len() as u64));
    assert!(a.size.gzip_size.is_some());

    let gone = src.child("lib").unwrap().child("gone.js").unwrap();
    assert_eq!(gone.size.parsed_size, None);
    assert_eq!(gone.size.gzip_size, None);

    assert_sum_law(&chart[0]);
}

#[test]
fn test_entry_modules_take_runtime_source() {
    let bundle = "(function (modules) { var installed = {}; })({ 1: function () { dep(); } });";
    let payload = json!({
        "assets": [{"name": "main.js", "chunks": [0]}],
        "modules": [
            {"id": 0, "name": "./src/entry.js", "size": 20, "depth": 0, "chunks": [0]},
            {"id": 1, "name": "./src/dep.js", "size": 10, "depth": 1, "chunks": [0]}
        ]
    });

    let sources = InMemorySources::new().with_bundle("main.js", bundle);
    let chart = analyze_with(&payload, &sources);

    let runtime = parse_bundle("main.js", bundle).unwrap().runtime_src;
    let entry = chart[0].child("src").unwrap().child("entry.js").unwrap();
    assert_eq!(entry.size.parsed_size, Some(runtime.len() as u64));
}

#[test]
fn test_inlined_single_entry_takes_whole_bundle() {
    let bundle = r#"(() => { "use strict"; console.log('hello world'); })();"#;
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}],
        "modules": [{"id": 0, "name": "./src/index.js", "size": 30, "depth": 0, "chunks": [0]}]
    });

    let sources = InMemorySources::new().with_bundle("bundle.js", bundle);
    let chart = analyze_with(&payload, &sources);

    let entry = chart[0].child("src").unwrap().child("index.js").unwrap();
    assert_eq!(entry.size.parsed_size, Some(bundle.len() as u64));
    assert_eq!(chart[0].size.parsed_size, Some(bundle.len() as u64));
    assert!(chart[0].size.gzip_size.is_some());
}

#[test]
fn test_several_entry_modules_grouped() {
    let bundle = "(function (modules) { boot(); })({ 2: function () { dep(); } });";
    let payload = json!({
        "assets": [{"name": "main.js", "chunks": [0]}],
        "modules": [
            {"id": 0, "name": "./src/a.js", "size": 20, "depth": 0, "chunks": [0]},
            {"id": 1, "name": "./src/b.js", "size": 25, "depth": 0, "chunks": [0]},
            {"id": 2, "name": "./src/dep.js", "size": 10, "depth": 1, "chunks": [0]}
        ]
    });

    let sources = InMemorySources::new().with_bundle("main.js", bundle);
    let chart = analyze_with(&payload, &sources);

    let entry = chart[0].child("entry modules (concatenated)").unwrap();
    assert_eq!(entry.size.stat_size, 45);
    assert!(entry.size.parsed_size.is_some());
    assert_eq!(labels(chart[0].children()), vec!["entry modules (concatenated)", "src"]);
}

#[test]
fn test_output_is_idempotent() {
    let payload = json!({
        "assets": [{"name": "bundle.js", "chunks": [0]}, {"name": "other.js", "chunks": [1]}],
        "modules": [
            {"id": 1, "name": "./src/a.js", "size": 100, "chunks": [0]},
            {"id": 2, "name": "./src/b.js", "size": 50, "chunks": [1]}
        ]
    });
    let sources = InMemorySources::new()
        .with_bundle("bundle.js", "webpackJsonp([0], { 1: function () { return 'x'.repeat(40); } });")
        .with_bundle("other.js", "webpackJsonp([1], { 2: function () { return 2; } });");

    let first = report_to_string(&analyze_with(&payload, &sources)).unwrap();
    let second = report_to_string(&analyze_with(&payload, &sources)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_initial_by_entrypoint_and_exclude() {
    let payload = json!({
        "assets": [
            {"name": "main.js", "chunks": [0]},
            {"name": "vendor.js", "chunks": [1]}
        ],
        "modules": [
            {"id": 1, "name": "./src/a.js", "size": 1, "chunks": [0]},
            {"id": 2, "name": "./node_modules/x/index.js", "size": 2, "chunks": [1]}
        ],
        "entrypoints": {"main": {"assets": ["vendor.js", "main.js"]}}
    });

    let chart = analyze(&payload);
    assert_eq!(chart[0].is_initial_by_entrypoint.get("main"), Some(&true));

    let options = AnalyzerOptions::with_exclude_patterns(["vendor"]).unwrap();
    let report = analyze_stats(&payload, None, &options).unwrap();
    assert_eq!(labels(&report.chart_data), vec!["main.js"]);
}

#[test]
fn test_skipped_entry_reported() {
    let payload = json!([
        {"assets": [{"name": "a.js", "chunks": [0]}]},
        {"children": "nope"}
    ]);

    let report = analyze_stats(&payload, None, &AnalyzerOptions::default()).unwrap();
    assert_eq!(report.chart_data.len(), 1);
    assert_eq!(report.skipped_entries.len(), 1);
    assert_eq!(report.skipped_entries[0].entry(), Some("payload[1]"));
}

#[test]
fn test_unusable_payload_is_parse_error() {
    let err = analyze_stats(&json!({"version": "5"}), None, &AnalyzerOptions::default()).unwrap_err();
    assert!(matches!(err, ParseError::InvalidPayload { .. }));
    assert_eq!(err.entry(), Some("payload"));
}
