//! End-to-end tests for the merge pipeline.

use k2rule_merge::codec::yaml;
use k2rule_merge::{
    Behavior, Config, ConvertTag, Encoding, Error, Fetched, Fetcher, Merger, Result, RuleSource,
    RulesetConverter, TargetDefinition, TargetStatus,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Serves canned bodies; unknown URLs answer 404.
#[derive(Default, Clone)]
struct FakeFetcher {
    bodies: HashMap<String, String>,
}

impl FakeFetcher {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Fetched> {
        match self.bodies.get(url) {
            Some(body) => Ok(Fetched {
                body: body.clone().into_bytes(),
                content_type: None,
            }),
            None => Err(Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Copies text through unchanged, prefixing compiled output with a marker.
#[derive(Default, Clone)]
struct FakeConverter {
    calls: Arc<Mutex<Vec<(Behavior, ConvertTag)>>>,
}

impl RulesetConverter for FakeConverter {
    fn convert(&self, behavior: Behavior, tag: ConvertTag, input: &Path, output: &Path) -> Result<()> {
        self.calls.lock().unwrap().push((behavior, tag));
        let body = fs::read(input)?;
        match tag {
            ConvertTag::Text => {
                let mut out = b"MRS\n".to_vec();
                out.extend(body);
                fs::write(output, out)?;
            }
            ConvertTag::Mrs => {
                let body = body.strip_prefix(b"MRS\n").unwrap_or(&body);
                fs::write(output, body)?;
            }
        }
        Ok(())
    }
}

/// Always fails, like a converter rejecting its input.
struct BrokenConverter;

impl RulesetConverter for BrokenConverter {
    fn convert(&self, _: Behavior, _: ConvertTag, _: &Path, _: &Path) -> Result<()> {
        Err(Error::ConverterFailed {
            status: "exit status: 1".to_string(),
            stderr: "invalid ruleset".to_string(),
        })
    }
}

fn body_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn yaml_rules(path: &Path) -> Vec<String> {
    yaml::decode(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_classical_domain_rule_keeps_case() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("domain.txt");
    let target = TargetDefinition::new(&out, Behavior::Domain, Encoding::Text).with_source(
        "up",
        RuleSource::http("https://example.com/a.yaml", Behavior::Classical, None),
    );

    let fetcher = FakeFetcher::default().with(
        "https://example.com/a.yaml",
        "payload:\n  - DOMAIN,Example.COM\n  - DOMAIN-SUFFIX,example.com\n",
    );
    let merger = Merger::new(fetcher, FakeConverter::default());
    merger.merge_target(&target).unwrap();

    assert_eq!(body_lines(&out), vec!["+.example.com", "Example.COM"]);
}

#[test]
fn test_domain_suffix_to_classical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "+.example.com\n").unwrap();
    let out = dir.path().join("out.yaml");

    let target = TargetDefinition::new(&out, Behavior::Classical, Encoding::Structured)
        .with_source("local", RuleSource::file(&input, Behavior::Domain, None));

    Merger::new(FakeFetcher::default(), FakeConverter::default())
        .merge_target(&target)
        .unwrap();

    assert_eq!(yaml_rules(&out), vec!["DOMAIN-SUFFIX,example.com"]);
}

#[test]
fn test_duplicates_collapse_and_untransformable_rules_drop() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ip.yaml");

    let fetcher = FakeFetcher::default()
        .with("https://a.example/list.txt", "IP-CIDR,1.2.3.0/24\n")
        .with("https://b.example/list.txt", "IP-CIDR,1.2.3.0/24\n")
        .with("https://c.example/list.txt", "DOMAIN,a.com\n");

    let target = TargetDefinition::new(&out, Behavior::IpCidr, Encoding::Structured)
        .with_source("a", RuleSource::http("https://a.example/list.txt", Behavior::Classical, None))
        .with_source("b", RuleSource::http("https://b.example/list.txt", Behavior::Classical, None))
        .with_source("c", RuleSource::http("https://c.example/list.txt", Behavior::Classical, None));

    let report = Merger::new(fetcher, FakeConverter::default())
        .merge_target(&target)
        .unwrap();

    assert_eq!(yaml_rules(&out), vec!["1.2.3.0/24"]);
    match report.status {
        TargetStatus::Written { rules, sources } => {
            assert_eq!(rules, 1);
            let counts: Vec<usize> = sources.iter().map(|s| s.rules).collect();
            assert_eq!(counts, vec![1, 1, 0]);
        }
        other => panic!("unexpected status: {other:?}"),
    }
}

#[test]
fn test_malformed_rule_dropped_for_every_behavior() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "DOMAIN,not a domain!!\nDOMAIN,ok.com\n").unwrap();

    for behavior in Behavior::ALL {
        let out = dir.path().join(format!("out-{behavior}.txt"));
        let target = TargetDefinition::new(&out, behavior, Encoding::Text)
            .with_source("local", RuleSource::file(&input, Behavior::Classical, None));

        Merger::new(FakeFetcher::default(), FakeConverter::default())
            .merge_target(&target)
            .unwrap();

        let lines = body_lines(&out);
        assert!(lines.iter().all(|l| !l.contains("not a domain")), "{behavior}");
    }
}

#[test]
fn test_failing_sources_do_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("merged.yaml");

    let fetcher = FakeFetcher::default()
        .with("https://ok.example/rules.yaml", "payload:\n  - DOMAIN,good.com\n")
        .with("https://bad.example/rules.yaml", "payload: [oops");

    let target = TargetDefinition::new(&out, Behavior::Classical, Encoding::Structured)
        .with_source("ok", RuleSource::http("https://ok.example/rules.yaml", Behavior::Classical, None))
        .with_source("malformed", RuleSource::http("https://bad.example/rules.yaml", Behavior::Classical, None))
        .with_source("missing", RuleSource::http("https://gone.example/rules.yaml", Behavior::Classical, None))
        .with_source("no_file", RuleSource::file(dir.path().join("absent.txt"), Behavior::Classical, None));

    Merger::new(fetcher, FakeConverter::default())
        .merge_target(&target)
        .unwrap();

    assert_eq!(yaml_rules(&out), vec!["DOMAIN,good.com"]);
}

#[test]
fn test_classical_compiled_target_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "DOMAIN,a.com\n").unwrap();
    let out = dir.path().join("classical.mrs");

    let converter = FakeConverter::default();
    let target = TargetDefinition::new(&out, Behavior::Classical, Encoding::Compiled)
        .with_source("local", RuleSource::file(&input, Behavior::Classical, None));

    let report = Merger::new(FakeFetcher::default(), converter.clone())
        .merge_target(&target)
        .unwrap();

    assert!(matches!(report.status, TargetStatus::Skipped { .. }));
    assert!(!out.exists());
    assert!(converter.calls.lock().unwrap().is_empty());
}

#[test]
fn test_compiled_round_trip_through_converter() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "IP-CIDR,10.0.0.0/8\nIP-CIDR6,fc00::/7\nDOMAIN,a.com\n").unwrap();
    let compiled = dir.path().join("out/ip.mrs");

    let converter = FakeConverter::default();
    let merger = Merger::new(FakeFetcher::default(), converter.clone());

    let to_mrs = TargetDefinition::new(&compiled, Behavior::IpCidr, Encoding::Compiled)
        .with_source("local", RuleSource::file(&input, Behavior::Classical, None));
    merger.merge_target(&to_mrs).unwrap();

    // Compiled output carries no header lines.
    assert_eq!(
        fs::read_to_string(&compiled).unwrap(),
        "MRS\n10.0.0.0/8\nfc00::/7\n"
    );

    let back = dir.path().join("back.txt");
    let from_mrs = TargetDefinition::new(&back, Behavior::Classical, Encoding::Text)
        .with_source("compiled", RuleSource::file(&compiled, Behavior::IpCidr, None));
    merger.merge_target(&from_mrs).unwrap();

    assert_eq!(
        body_lines(&back),
        vec!["IP-CIDR,10.0.0.0/8", "IP-CIDR6,fc00::/7"]
    );

    let calls = converter.calls.lock().unwrap();
    assert_eq!(
        *calls,
        vec![
            (Behavior::IpCidr, ConvertTag::Text),
            (Behavior::IpCidr, ConvertTag::Mrs)
        ]
    );
}

#[test]
fn test_broken_converter_degrades_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let compiled = dir.path().join("in.mrs");
    fs::write(&compiled, b"\x00binary").unwrap();
    let text = dir.path().join("in.txt");
    fs::write(&text, "+.a.com\n").unwrap();

    let merger = Merger::new(FakeFetcher::default(), BrokenConverter);

    // Decoding failure: that source is empty, the other still contributes.
    let out = dir.path().join("domain.txt");
    let target = TargetDefinition::new(&out, Behavior::Domain, Encoding::Text)
        .with_source("compiled", RuleSource::file(&compiled, Behavior::Domain, None))
        .with_source("text", RuleSource::file(&text, Behavior::Domain, None));
    merger.merge_target(&target).unwrap();
    assert_eq!(body_lines(&out), vec!["+.a.com"]);

    // Encoding failure: the target fails and nothing is written.
    let mrs = dir.path().join("domain.mrs");
    let target = TargetDefinition::new(&mrs, Behavior::Domain, Encoding::Compiled)
        .with_source("text", RuleSource::file(&text, Behavior::Domain, None));
    assert!(matches!(
        merger.merge_target(&target),
        Err(Error::ConverterFailed { .. })
    ));
    assert!(!mrs.exists());
}

#[test]
fn test_output_header_and_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(
        &input,
        "# upstream header\nDOMAIN-SUFFIX,b.com # trailing\n\nDOMAIN,a.com\nDOMAIN,a.com\n",
    )
    .unwrap();
    let out = dir.path().join("nested/dir/out.yaml");

    let target = TargetDefinition::new(&out, Behavior::Classical, Encoding::Structured)
        .with_source("local", RuleSource::file(&input, Behavior::Classical, Some(Encoding::Text)));
    Merger::new(FakeFetcher::default(), FakeConverter::default())
        .merge_target(&target)
        .unwrap();

    let content = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[0].starts_with("# Updated: "));
    assert_eq!(lines[1], "# Rules: 2");
    assert_eq!(
        &lines[2..],
        &["payload:", "  - DOMAIN,a.com", "  - DOMAIN-SUFFIX,b.com"]
    );
}

#[test]
fn test_run_isolates_targets() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "DOMAIN,a.com\nIP-CIDR,1.2.3.0/24\n").unwrap();

    // A regular file where a directory is needed makes that write fail.
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let yaml = format!(
        r#"
- path: {out_ok}
  behavior: domain
  upstream:
    local: {{ type: file, path: {input}, format: text }}
- path: {out_bad}
  upstream:
    local: {{ type: file, path: {input}, format: text }}
- path: {out_skip}
  format: mrs
  upstream:
    local: {{ type: file, path: {input}, format: text }}
- path: {out_ip}
  behavior: ipcidr
  format: text
  upstream:
    local: {{ type: file, path: {input}, format: text }}
"#,
        out_ok = dir.path().join("ok.yaml").display(),
        out_bad = blocker.join("bad.yaml").display(),
        out_skip = dir.path().join("skip.mrs").display(),
        out_ip = dir.path().join("ip.txt").display(),
        input = input.display(),
    );
    let config = Config::parse(&yaml).unwrap();

    let report = Merger::new(FakeFetcher::default(), FakeConverter::default()).run(&config);

    assert_eq!(report.targets.len(), 4);
    assert!(matches!(report.targets[0].status, TargetStatus::Written { rules: 1, .. }));
    assert!(matches!(report.targets[1].status, TargetStatus::Failed { .. }));
    assert!(matches!(report.targets[2].status, TargetStatus::Skipped { .. }));
    assert!(matches!(report.targets[3].status, TargetStatus::Written { rules: 1, .. }));
    assert!(report.has_failures());
    assert_eq!(report.written(), 2);

    assert_eq!(yaml_rules(&dir.path().join("ok.yaml")), vec!["a.com"]);
    assert_eq!(body_lines(&dir.path().join("ip.txt")), vec!["1.2.3.0/24"]);
    assert!(!dir.path().join("skip.mrs").exists());
}

#[test]
fn test_source_order_does_not_matter() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "z.com\n+.m.com\na.com\n").unwrap();
    fs::write(&b, "a.com\nb.com\n").unwrap();

    let merger = Merger::new(FakeFetcher::default(), FakeConverter::default());
    let forward = TargetDefinition::new("unused", Behavior::Domain, Encoding::Text)
        .with_source("1", RuleSource::file(&a, Behavior::Domain, None))
        .with_source("2", RuleSource::file(&b, Behavior::Domain, None));
    let backward = TargetDefinition::new("unused", Behavior::Domain, Encoding::Text)
        .with_source("1", RuleSource::file(&b, Behavior::Domain, None))
        .with_source("2", RuleSource::file(&a, Behavior::Domain, None));

    let (first, _) = merger.collect(&forward);
    let (second, _) = merger.collect(&backward);

    assert_eq!(first, second);
    assert_eq!(first.rules(), &["+.m.com", "a.com", "b.com", "z.com"]);
}

#[test]
fn test_unsupported_source_behavior_contributes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ip.txt");
    fs::write(&input, "1.2.3.0/24\n").unwrap();

    let merger = Merger::new(FakeFetcher::default(), FakeConverter::default());
    let rules = merger.process_source(
        "ip",
        &RuleSource::file(&input, Behavior::IpCidr, None),
        Behavior::Domain,
    );
    assert!(rules.is_empty());
}
