//! End-to-end tests: record fixtures, replay them and check the results.

use replay_engine::{to_collection, to_record, Record};
use replay_fixtures::files::{
    CONTENT_FILE, EXPECTED_OUTPUTS_FILE, EXPECTED_PAGES_FILE, OUTPUTS_FILE, PAGE_FILE, VARS_FILE,
};
use replay_fixtures::{
    DataSource, FixtureContext, LoadOptions, MatchExpectedOptions, OutputFilter, RecordMap,
    Recorder,
};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CONTENT: &str = r#"<html><body><a href="/shoes/1">Blue</a><a href="/shoes/2">Red</a></body></html>"#;

/// Tiny scraper: one page per link, one output per link.
fn parse(context: &mut FixtureContext) {
    let content = context.content.clone().unwrap_or_default();
    let category = context
        .page
        .as_ref()
        .and_then(|page| page.get("vars"))
        .and_then(|vars| vars.get("category"))
        .cloned()
        .unwrap_or(Value::Null);

    for chunk in content.split("<a href=\"").skip(1) {
        let Some((href, rest)) = chunk.split_once("\">") else {
            continue;
        };
        let name = rest.split('<').next().unwrap_or_default();
        let url = format!("https://shop.example.com{href}");

        context.enqueue_page(record(json!({"url": url, "vars": {"category": category}})));
        context.enqueue_output(record(json!({"name": name, "url": url})));
    }
}

fn record(value: Value) -> Record {
    to_record(&value).unwrap()
}

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn source_dir(dir: &Path) {
    fs::write(dir.join(CONTENT_FILE), CONTENT).unwrap();
    write_json(
        dir,
        PAGE_FILE,
        &json!({"gid": "listing-1", "job_id": 42, "url": "https://shop.example.com/shoes", "vars": {"category": "shoes"}}),
    );
    write_json(
        dir,
        OUTPUTS_FILE,
        &json!([
            {"_id": "o1", "_collection": "products", "name": "Blue", "_gid": "listing-1"},
            {"_id": "o2", "_collection": "products", "name": "Red", "_gid": "listing-1"},
            {"_id": "o3", "name": "Stray", "_gid": "other"}
        ]),
    );
}

#[test]
fn load_directory_with_only_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(CONTENT_FILE), CONTENT).unwrap();

    let mut context = FixtureContext::new();
    context.load_input(LoadOptions::from_dir(dir.path())).unwrap();

    assert_eq!(context.content.as_deref(), Some(CONTENT));
    assert!(context.failed_content.is_none());
    assert!(context.page.is_none());
    assert!(context.pages.is_empty());
    assert!(context.outputs.is_empty());
    assert!(context.saved_pages.is_empty());
    assert!(context.saved_outputs.is_empty());
}

#[test]
fn record_then_replay() {
    let source = tempdir().unwrap();
    source_dir(source.path());
    let fixtures = tempdir().unwrap();
    fs::create_dir(fixtures.path().join("listing")).unwrap();

    let mut platform = FixtureContext::new();
    platform
        .load_input(LoadOptions::from_dir(source.path()))
        .unwrap();
    assert_eq!(platform.get_job_id("shop").unwrap(), Some(42));

    let mut map = RecordMap::new("listing-1", "listing").with_outputs(
        OutputFilter::new("products").with_query(record(json!({"_gid": "listing-1"}))),
    );
    map.record_vars = true;

    let mut recorder = Recorder::new(platform)
        .with_root_dir(fixtures.path())
        .with_scraper_name("shop")
        .with_input_map(vec![map]);
    assert_eq!(recorder.record_all().unwrap(), 1);

    let dir = fixtures.path().join("listing");
    assert_eq!(fs::read_to_string(dir.join(CONTENT_FILE)).unwrap(), CONTENT);
    let vars: Value = serde_json::from_str(&fs::read_to_string(dir.join(VARS_FILE)).unwrap()).unwrap();
    assert_eq!(vars, json!({"category": "shoes"}));
    let outputs: Value =
        serde_json::from_str(&fs::read_to_string(dir.join(OUTPUTS_FILE)).unwrap()).unwrap();
    assert_eq!(outputs.as_array().unwrap().len(), 2);

    // expected files are written by hand
    write_json(
        &dir,
        EXPECTED_PAGES_FILE,
        &json!([
            {"url": "https://shop.example.com/shoes/2", "vars": {"category": "shoes"}},
            {"url": "https://shop.example.com/shoes/1", "vars": {"category": "shoes"}}
        ]),
    );
    write_json(
        &dir,
        EXPECTED_OUTPUTS_FILE,
        &json!([
            {"name": "Blue", "url": "https://shop.example.com/shoes/1"},
            {"name": "Red", "url": "https://shop.example.com/shoes/2"}
        ]),
    );
    // recorded outputs would be counted as saved ones
    fs::remove_file(dir.join(OUTPUTS_FILE)).unwrap();

    let mut context = FixtureContext::with_root(fixtures.path());
    context.load_input(LoadOptions::from_rel_dir("listing")).unwrap();
    parse(&mut context);

    assert!(context
        .should_match_pages(&MatchExpectedOptions::default())
        .unwrap());
    assert!(context
        .should_match_outputs(&MatchExpectedOptions::default())
        .unwrap());
}

#[test]
fn mismatch_reports_both_sides() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(CONTENT_FILE), CONTENT).unwrap();
    write_json(
        dir.path(),
        EXPECTED_OUTPUTS_FILE,
        &json!([
            {"name": "Blue", "url": "https://shop.example.com/shoes/1"},
            {"name": "Green", "url": "https://shop.example.com/shoes/3"}
        ]),
    );

    let mut context = FixtureContext::new();
    context.load_input(LoadOptions::from_dir(dir.path())).unwrap();
    parse(&mut context);
    context.flush();

    let diff = context
        .match_expected_outputs(&MatchExpectedOptions::default())
        .unwrap();
    assert!(!diff.matched);
    assert_eq!(
        diff.saved,
        to_collection(&json!([{"name": "Red", "url": "https://shop.example.com/shoes/2"}])).unwrap()
    );
    assert_eq!(
        diff.expected,
        to_collection(&json!([{"name": "Green", "url": "https://shop.example.com/shoes/3"}])).unwrap()
    );
}

#[test]
fn skip_fields_hide_volatile_values() {
    let mut context = FixtureContext::new();
    context.enqueue_output(record(json!({"name": "Blue", "scraped_at": "2024-01-01"})));

    let opts = MatchExpectedOptions::default()
        .with_expected(to_collection(&json!([{"name": "Blue", "scraped_at": "2025-06-30"}])).unwrap());
    assert!(!context.should_match_outputs(&opts).unwrap());

    let opts = opts.with_skip_fields(["scraped_at"]);
    assert!(context.should_match_outputs(&opts).unwrap());
}
