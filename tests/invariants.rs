//! Contract Invariant Tests
//!
//! These tests verify the resolver's guarantees through a minimal
//! collection factory built only from the public extension points.

use ingest_templates_core::{
    CollectionContentTemplateFactory, CollectionTemplateFactory, ElementErrorKind, KindCandidate,
    Resolution, ResolutionChain, ResolverConfig, ResolverError, TemplateCandidate, TemplateContainer,
};
use serde_json::Value;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct Stub {
    kind: &'static str,
    payload: Value,
}

/// Claims "A" and always succeeds.
fn always_a() -> Box<dyn TemplateCandidate<Stub>> {
    Box::new(KindCandidate::new("A", |payload: &Value| -> Result<Stub, Vec<String>> {
        Ok(Stub { kind: "A", payload: payload.clone() })
    }))
}

/// Claims "B"; rejects payloads without a numeric `v`.
fn strict_b() -> Box<dyn TemplateCandidate<Stub>> {
    Box::new(KindCandidate::new("B", |payload: &Value| -> Result<Stub, Vec<String>> {
        match payload.get("v").and_then(Value::as_i64) {
            Some(_) => Ok(Stub { kind: "B", payload: payload.clone() }),
            None => Err(vec!["B requires numeric v".to_string(), "B payload rejected".to_string()]),
        }
    }))
}

/// Counts every offer and claims whatever discriminator it was built for.
struct Counting {
    kind: &'static str,
    tag: &'static str,
    offers: Arc<AtomicUsize>,
}

impl TemplateCandidate<Stub> for Counting {
    fn kind(&self) -> &str {
        self.kind
    }

    fn try_resolve(&self, container: &TemplateContainer) -> Resolution<Stub> {
        self.offers.fetch_add(1, Ordering::SeqCst);
        if container.matches_template_name(self.kind) {
            Resolution::Matched(Stub { kind: self.tag, payload: container.template.clone() })
        } else {
            Resolution::NoMatch
        }
    }
}

struct StubCollectionFactory {
    chain: ResolutionChain<Stub>,
    config: ResolverConfig,
}

impl StubCollectionFactory {
    fn new(candidates: Vec<Box<dyn TemplateCandidate<Stub>>>) -> Self {
        Self {
            chain: ResolutionChain::new(candidates).unwrap(),
            config: ResolverConfig::inline("type"),
        }
    }
}

impl CollectionTemplateFactory for StubCollectionFactory {
    type Element = Stub;
    type Output = Vec<Stub>;

    fn target_template_type(&self) -> &str {
        "Collection"
    }

    fn chain(&self) -> &ResolutionChain<Stub> {
        &self.chain
    }

    fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn build_collection(&self, templates: Vec<Stub>) -> Vec<Stub> {
        templates
    }
}

fn create_factory() -> StubCollectionFactory {
    StubCollectionFactory::new(vec![always_a(), strict_b()])
}

#[test]
fn invariant_empty_array_is_success() {
    let factory = create_factory();
    let input = r#"{"templateType":"Collection","template":[]}"#;

    let outcome = factory.create_lenient(input).unwrap();
    assert!(outcome.template.is_empty());
    assert!(outcome.errors.is_empty());

    assert!(factory.create(input).unwrap().is_empty());
}

#[test]
fn invariant_wrong_discriminator_is_structural() {
    let offers = Arc::new(AtomicUsize::new(0));
    let factory = StubCollectionFactory::new(vec![Box::new(Counting { kind: "A", tag: "A", offers: offers.clone() })]);
    let input = r#"{"templateType":"Wrong","template":[{"type":"A"}]}"#;

    let lenient = factory.create_lenient(input).unwrap_err();
    let strict = factory.create(input).unwrap_err();

    for err in [lenient, strict] {
        assert!(err.is_structural());
        assert!(err.to_string().contains("Expected templateType value Collection, actual Wrong"));
    }
    assert_eq!(offers.load(Ordering::SeqCst), 0);
}

#[test]
fn invariant_non_array_payload_is_structural() {
    let factory = create_factory();
    for payload in [r#"{"type":"A"}"#, "\"A\"", "7", "null"] {
        let input = format!(r#"{{"templateType":"Collection","template":{}}}"#, payload);
        let err = factory.create_lenient(&input).unwrap_err();
        assert!(err.is_structural(), "payload {} should be rejected", payload);
        assert!(factory.create(&input).unwrap_err().is_structural());
    }
}

#[test]
fn invariant_malformed_input() {
    let factory = create_factory();
    for input in ["not json", r#"{"templateType":"Collection","template":["#, ""] {
        let err = factory.create(input).unwrap_err();
        assert!(matches!(err, ResolverError::MalformedInput(_)), "input {:?}", input);
    }
}

#[test]
fn invariant_valid_json_with_bad_root_discriminator_is_structural() {
    let offers = Arc::new(AtomicUsize::new(0));
    let factory = StubCollectionFactory::new(vec![Box::new(Counting { kind: "A", tag: "A", offers: offers.clone() })]);

    for (input, actual) in [
        (r#"{"templateType":null,"template":[{"type":"A"}]}"#, "actual ."),
        (r#"{"templateType":5,"template":[{"type":"A"}]}"#, "actual 5."),
        (r#"{"template":[{"type":"A"}]}"#, "actual ."),
        ("[1, 2]", "actual ."),
    ] {
        let lenient = factory.create_lenient(input).unwrap_err();
        let strict = factory.create(input).unwrap_err();
        for err in [lenient, strict] {
            assert!(err.is_structural(), "input {}: {}", input, err);
            assert!(err.to_string().contains("Expected templateType value Collection"));
            assert!(err.to_string().ends_with(actual), "input {}: {}", input, err);
        }
    }
    assert_eq!(offers.load(Ordering::SeqCst), 0);
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn invariant_candidate_events_carry_element_index() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let factory = create_factory();
    tracing::subscriber::with_default(subscriber, || {
        factory
            .create_lenient(r#"{"templateType":"Collection","template":[{"type":"Z"},{"type":"A"}]}"#)
            .unwrap();
    });

    let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    let accepted = output
        .lines()
        .find(|line| line.contains("candidate resolved template"))
        .expect("accepting candidate was logged");
    assert!(accepted.contains("template_element{index=1}"), "{}", accepted);
    assert!(accepted.contains("candidate=\"A\""), "{}", accepted);
}

#[test]
fn invariant_first_registered_match_wins() {
    let first_offers = Arc::new(AtomicUsize::new(0));
    let second_offers = Arc::new(AtomicUsize::new(0));
    let factory = StubCollectionFactory::new(vec![
        Box::new(Counting { kind: "A", tag: "first", offers: first_offers.clone() }),
        Box::new(Counting { kind: "A", tag: "second", offers: second_offers.clone() }),
    ]);

    let result = factory
        .create(r#"{"templateType":"Collection","template":[{"type":"A"},{"type":"A"}]}"#)
        .unwrap();

    assert!(result.iter().all(|s| s.kind == "first"));
    assert_eq!(first_offers.load(Ordering::SeqCst), 2);
    assert_eq!(second_offers.load(Ordering::SeqCst), 0);
}

#[test]
fn invariant_matched_failure_does_not_fall_through() {
    let offers = Arc::new(AtomicUsize::new(0));
    let factory = StubCollectionFactory::new(vec![
        strict_b(),
        Box::new(Counting { kind: "B", tag: "fallback", offers: offers.clone() }),
    ]);

    let outcome = factory
        .create_lenient(r#"{"templateType":"Collection","template":[{"type":"B"}]}"#)
        .unwrap();

    assert!(outcome.template.is_empty());
    assert_eq!(outcome.messages(), vec!["B requires numeric v", "B payload rejected"]);
    assert!(outcome.errors.iter().all(|e| e.kind == ElementErrorKind::Validation));
    assert_eq!(offers.load(Ordering::SeqCst), 0);
}

#[test]
fn invariant_unmatched_element_continues() {
    let factory = create_factory();
    let input = r#"{"templateType":"Collection","template":[{"type":"A","v":1},{"type":"Z"}]}"#;

    let outcome = factory.create_lenient(input).unwrap();
    assert_eq!(outcome.template.len(), 1);
    assert_eq!(outcome.template[0].kind, "A");
    assert_eq!(outcome.messages(), vec!["no matching template found for discriminator Z"]);
    assert_eq!(outcome.errors[0].kind, ElementErrorKind::Unmatched);
    assert_eq!(outcome.errors[0].index, 1);

    let err = factory.create(input).unwrap_err();
    assert!(matches!(err, ResolverError::InvalidTemplate { .. }));
    assert!(err.to_string().contains("no matching template found for discriminator Z"));
    assert!(err.to_string().contains("Collection"));
}

#[test]
fn invariant_strict_aggregates_every_failure() {
    let factory = create_factory();
    let input = r#"{"templateType":"Collection","template":[
        {"type":"Y"},
        {"type":"A"},
        {"type":"B","v":"x"},
        {"type":"Z"},
        {"v":1}
    ]}"#;

    match factory.create(input).unwrap_err() {
        ResolverError::InvalidTemplate { template_type, errors } => {
            assert_eq!(template_type, "Collection");
            assert_eq!(
                errors,
                vec![
                    "no matching template found for discriminator Y",
                    "B requires numeric v",
                    "B payload rejected",
                    "no matching template found for discriminator Z",
                    "template element is missing the 'type' discriminator",
                ]
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn invariant_output_preserves_order_with_duplicates() {
    let factory = create_factory();
    let input = r#"{"templateType":"Collection","template":[
        {"type":"B","v":1},{"type":"A","n":1},{"type":"B","v":2},{"type":"A","n":2}
    ]}"#;

    let result = factory.create(input).unwrap();
    let kinds: Vec<_> = result.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec!["B", "A", "B", "A"]);
    assert_eq!(result[2].payload["v"], 2);
    assert_eq!(result[3].payload["n"], 2);
}

#[test]
fn invariant_index_tags_when_configured() {
    let mut factory = create_factory();
    factory.config = ResolverConfig::inline("type").with_index_tags();

    let input = r#"{"templateType":"Collection","template":[{"type":"A"},{"type":"Z"}]}"#;
    let outcome = factory.create_lenient(input).unwrap();
    assert_eq!(outcome.messages(), vec!["template[1]: no matching template found for discriminator Z"]);

    let err = factory.create(input).unwrap_err();
    assert!(err.to_string().contains("template[1]: no matching template"));
}

#[test]
fn invariant_factory_shared_across_threads() {
    let factory = CollectionContentTemplateFactory::new();
    let input = r#"{"templateType":"CollectionContent","template":[
        {"templateType":"IotJsonPathContent","template":{"typeName":"steps","typeMatchExpression":"$..[?(@steps)]"}},
        {"templateType":"Unknown","template":{}}
    ]}"#;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| factory.create_lenient(input).unwrap()))
            .collect();

        for handle in handles {
            let outcome = handle.join().unwrap();
            assert_eq!(outcome.template.len(), 1);
            assert_eq!(outcome.messages(), vec!["no matching template found for discriminator Unknown"]);
        }
    });
}

#[test]
fn invariant_content_template_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devicecontent.json");
    std::fs::write(
        &path,
        r#"{"templateType":"CollectionContent","template":[
            {"templateType":"JsonPathContent","template":{
                "typeName":"heartrate",
                "typeMatchExpression":"$..[?(@heartRate)]",
                "deviceIdExpression":"$.deviceId",
                "timestampExpression":"$.endDate",
                "values":[{"valueName":"hr","valueExpression":"$.heartRate","required":true}]
            }}
        ]}"#,
    )
    .unwrap();

    let input = std::fs::read_to_string(&path).unwrap();
    let collection = CollectionContentTemplateFactory::new().create(&input).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.templates[0].type_name(), "heartrate");
}
