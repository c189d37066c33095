//! Integration tests for the log handler
//!
//! These tests verify:
//! - Text and JSON line shapes
//! - Quoting of text values
//! - Group nesting, inlining and rollback
//! - Resolver rewriting and suppression
//! - Handler derivation isolation
//! - Terminal detection and themes
//! - Sink failures and file output

use chrono::{DateTime, TimeZone, Utc};
use rust_log_handler::core::theme::{ThemeBuilder, RESET};
use rust_log_handler::prelude::*;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 8, 15, 4, 5).unwrap()
}

fn text_handler(sink: &MemorySink) -> FormatHandler {
    FormatHandler::text().sink(sink.clone()).level(Level::new(-100)).build()
}

fn json_handler(sink: &MemorySink) -> FormatHandler {
    FormatHandler::json().sink(sink.clone()).level(Level::new(-100)).build()
}

fn record(msg: &str) -> Record {
    Record::new(Level::INFO, msg).with_time(None)
}

fn render(handler: &FormatHandler, sink: &MemorySink, record: Record) -> String {
    sink.clear();
    handler.handle(&record).expect("handle failed");
    sink.contents_string()
}

// ============================================================================
// Line layout
// ============================================================================

#[test]
fn test_zero_time_has_no_time_section() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    assert_eq!(render(&handler, &sink, record("hello")), "INFO hello\n");

    let json = json_handler(&sink);
    assert_eq!(
        render(&json, &sink, record("hello")),
        "{\"level\":\"INFO\",\"msg\":\"hello\"}\n"
    );
}

#[test]
fn test_time_section_uses_configured_format() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    let rec = Record::new(Level::INFO, "hello").with_time(Some(fixed_time()));
    assert_eq!(render(&handler, &sink, rec), "3:04PM INFO hello\n");

    let unix = FormatHandler::json()
        .sink(sink.clone())
        .time_format(TimestampFormat::Unix)
        .build();
    let rec = Record::new(Level::INFO, "hello").with_time(Some(fixed_time()));
    assert_eq!(
        render(&unix, &sink, rec),
        "{\"time\":1736348645,\"level\":\"INFO\",\"msg\":\"hello\"}\n"
    );
}

#[test]
fn test_full_text_line() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text()
        .sink(sink.clone())
        .caller(true)
        .prefix("api")
        .build();
    let rec = Record::new(Level::WARN, "slow request")
        .with_time(Some(fixed_time()))
        .with_source(Source::new("app::http::server::accept", "src/http.rs", 42))
        .with_attr("ms", 1500);

    assert_eq!(
        render(&handler, &sink, rec),
        "3:04PM WARN <server::accept:42> [api]: slow request ms=1500\n"
    );
}

#[test]
fn test_full_json_line() {
    let sink = MemorySink::new();
    let handler = FormatHandler::json()
        .sink(sink.clone())
        .caller(true)
        .prefix("api")
        .time_format(TimestampFormat::Rfc3339Nano)
        .build();
    let rec = Record::new(Level::ERROR, "failed")
        .with_time(Some(fixed_time()))
        .with_source(Source::new("app::db::query", "src/db.rs", 7))
        .with_attr("retry", true);

    assert_eq!(
        render(&handler, &sink, rec),
        "{\"time\":\"2025-01-08T15:04:05.000000000Z\",\"level\":\"ERRO\",\
         \"caller\":\"<db::query:7>\",\"prefix\":\"api\",\"msg\":\"failed\",\"retry\":true}\n"
    );
}

#[test]
fn test_empty_message_is_omitted() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    assert_eq!(render(&handler, &sink, record("").with_attr("k", 1)), "INFO k=1\n");

    let json = json_handler(&sink);
    assert_eq!(
        render(&json, &sink, record("").with_attr("k", 1)),
        "{\"level\":\"INFO\",\"k\":1}\n"
    );
}

#[test]
fn test_unresolved_caller_is_omitted() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text().sink(sink.clone()).caller(true).build();

    let no_line = record("m").with_source(Source::new("app::main", "src/main.rs", 0));
    assert_eq!(render(&handler, &sink, no_line), "INFO m\n");
    assert_eq!(render(&handler, &sink, record("m")), "INFO m\n");
}

// ============================================================================
// Levels
// ============================================================================

#[test]
fn test_level_labels_at_thresholds() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    let cases = [
        (-100, "DBUG"),
        (-5, "DBUG"),
        (-4, "DBUG"),
        (-1, "DBUG"),
        (0, "INFO"),
        (3, "INFO"),
        (4, "WARN"),
        (7, "WARN"),
        (8, "ERRO"),
        (100, "ERRO"),
    ];
    for (value, label) in cases {
        let out = render(&handler, &sink, Record::new(Level::new(value), "m").with_time(None));
        assert_eq!(out, format!("{} m\n", label), "level {}", value);
    }
}

#[test]
fn test_custom_level_names() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text()
        .sink(sink.clone())
        .level_name(Level::new(12), "FATAL")
        .level_name(Level::new(2), "N")
        .build();

    let fatal = Record::new(Level::new(12), "m").with_time(None);
    assert_eq!(render(&handler, &sink, fatal), "FATA m\n");

    let notice = Record::new(Level::new(2), "m").with_time(None);
    assert_eq!(render(&handler, &sink, notice), "N    m\n");

    let json = FormatHandler::json()
        .sink(sink.clone())
        .level_name(Level::new(12), "FATAL")
        .build();
    let fatal = Record::new(Level::new(12), "m").with_time(None);
    assert_eq!(render(&json, &sink, fatal), "{\"level\":\"FATAL\",\"msg\":\"m\"}\n");
}

// ============================================================================
// Values and quoting
// ============================================================================

#[test]
fn test_text_quoting() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    let rec = record("m")
        .with_attr("key1", "value1")
        .with_attr("s", "inner value")
        .with_attr("e", "")
        .with_attr("eq", "a=b")
        .with_attr("t", "a\tb");

    assert_eq!(
        render(&handler, &sink, rec),
        "INFO m key1=value1 s=\"inner value\" e=\"\" eq=\"a=b\" t=a\tb\n"
    );
}

#[test]
fn test_value_kinds() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    let rec = record("m")
        .with_attr("i", -3)
        .with_attr("u", 7u64)
        .with_attr("f", 0.25)
        .with_attr("b", false)
        .with_attr("d", Duration::from_millis(1500))
        .with_attr("t", fixed_time())
        .with_attr("n", Value::Null);

    assert_eq!(
        render(&handler, &sink, rec),
        "INFO m i=-3 u=7 f=0.2500000000 b=false d=1.5s t=2025-01-08T15:04:05.000000000Z n=null\n"
    );

    let json = json_handler(&sink);
    let rec = record("m")
        .with_attr("f", 0.25)
        .with_attr("d", Duration::from_millis(1500))
        .with_attr("t", fixed_time())
        .with_attr("nan", f64::NAN)
        .with_attr("s", "quote\"d");
    assert_eq!(
        render(&json, &sink, rec),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"f\":0.25,\"d\":1500000000,\
         \"t\":\"2025-01-08T15:04:05.000000000Z\",\"nan\":null,\"s\":\"quote\\\"d\"}\n"
    );
}

struct Hostname;

impl LogValuer for Hostname {
    fn log_value(&self) -> Value {
        Value::from("db-01")
    }
}

struct Endpoint;

impl LogValuer for Endpoint {
    fn log_value(&self) -> Value {
        Value::Group(vec![Attr::new("host", "db-01"), Attr::new("port", 5432)])
    }
}

#[test]
fn test_lazy_values_are_resolved() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    let rec = record("m")
        .with_attr("host", Value::lazy(Hostname))
        .with_attr("db", Value::lazy(Endpoint));
    assert_eq!(
        render(&handler, &sink, rec),
        "INFO m host=db-01 db.host=db-01 db.port=5432\n"
    );
}

// ============================================================================
// Groups
// ============================================================================

fn nested_group() -> Attr {
    Attr::group(
        "g",
        vec![
            Attr::new("a", 1),
            Attr::group("h", vec![Attr::new("b", 2)]),
        ],
    )
}

#[test]
fn test_group_nesting_text() {
    let sink = MemorySink::new();
    let handler = text_handler(&sink);
    let rec = record("m").with_attrs([nested_group(), Attr::new("c", 3)]);
    assert_eq!(render(&handler, &sink, rec), "INFO m g.a=1 g.h.b=2 c=3\n");
}

#[test]
fn test_group_nesting_json() {
    let sink = MemorySink::new();
    let handler = json_handler(&sink);
    let rec = record("m").with_attrs([nested_group(), Attr::new("c", 3)]);
    assert_eq!(
        render(&handler, &sink, rec),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"g\":{\"a\":1,\"h\":{\"b\":2}},\"c\":3}\n"
    );
}

#[test]
fn test_empty_key_group_is_inlined() {
    let sink = MemorySink::new();
    let inline = Attr::group("", vec![Attr::new("a", 1), Attr::new("b", 2)]);

    let text = text_handler(&sink).with_group("g");
    assert_eq!(
        render(&text, &sink, record("m").with_attrs([inline.clone()])),
        "INFO m g.a=1 g.b=2\n"
    );

    let json = json_handler(&sink);
    assert_eq!(
        render(&json, &sink, record("m").with_attrs([inline])),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"a\":1,\"b\":2}\n"
    );
}

#[test]
fn test_empty_groups_produce_nothing() {
    let sink = MemorySink::new();
    let dropped = Attr::new("", Value::Null);
    let hollow = Attr::group("outer", vec![Attr::group("inner", vec![dropped.clone()])]);

    let text = text_handler(&sink);
    let rec = record("m").with_attrs([Attr::group("g", vec![]), hollow.clone(), dropped.clone()]);
    assert_eq!(render(&text, &sink, rec), "INFO m\n");

    let json = json_handler(&sink);
    let rec = record("m").with_attrs([Attr::group("g", vec![]), hollow, Attr::new("k", 1)]);
    assert_eq!(
        render(&json, &sink, rec),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"k\":1}\n"
    );
}

#[test]
fn test_handler_groups_json() {
    let sink = MemorySink::new();
    let handler = json_handler(&sink).with_group("req").with_group("");

    assert_eq!(
        render(&handler, &sink, record("m")),
        "{\"level\":\"INFO\",\"msg\":\"m\"}\n"
    );
    assert_eq!(
        render(&handler, &sink, record("m").with_attr("id", 1)),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"req\":{\"id\":1}}\n"
    );
}

#[test]
fn test_bound_attrs_and_groups_json() {
    let sink = MemorySink::new();
    let base = json_handler(&sink);

    let h = base.with_attrs(vec![Attr::new("a", 1)]).with_group("g");
    assert_eq!(
        render(&h, &sink, record("m").with_attr("b", 2)),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"a\":1,\"g\":{\"b\":2}}\n"
    );

    let h = base.with_group("g").with_attrs(vec![Attr::new("a", 1)]);
    assert_eq!(
        render(&h, &sink, record("m")),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"g\":{\"a\":1}}\n"
    );

    let h = h.with_group("h").with_attrs(vec![Attr::new("b", 2)]);
    assert_eq!(
        render(&h, &sink, record("m").with_attr("c", 3)),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"g\":{\"a\":1,\"h\":{\"b\":2,\"c\":3}}}\n"
    );
}

#[test]
fn test_bound_attrs_text() {
    let sink = MemorySink::new();
    let h = text_handler(&sink)
        .with_attrs(vec![Attr::new("a", 1)])
        .with_group("g")
        .with_attrs(vec![Attr::new("b", 2)]);
    assert_eq!(
        render(&h, &sink, record("m").with_attr("c", 3)),
        "INFO m a=1 g.b=2 g.c=3\n"
    );
}

#[test]
fn test_bound_attrs_that_render_nothing_are_ignored() {
    let sink = MemorySink::new();
    let h = json_handler(&sink)
        .with_group("g")
        .with_attrs(vec![Attr::new("", Value::Null)]);
    assert_eq!(
        render(&h, &sink, record("m")),
        "{\"level\":\"INFO\",\"msg\":\"m\"}\n"
    );
}

// ============================================================================
// Resolver
// ============================================================================

#[test]
fn test_resolver_suppresses_only_target() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text()
        .sink(sink.clone())
        .resolver(|_groups, attr| {
            if attr.key == "secret" {
                Attr::new("", Value::Null)
            } else {
                attr
            }
        })
        .build();

    let rec = record("m")
        .with_attr("user", "ada")
        .with_attr("secret", "hunter2")
        .with_attr("n", 1);
    assert_eq!(render(&handler, &sink, rec), "INFO m user=ada n=1\n");
}

#[test]
fn test_resolver_sees_enclosing_groups() {
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let captured = Arc::clone(&seen);
    let sink = MemorySink::new();
    let handler = FormatHandler::json()
        .sink(sink.clone())
        .resolver(move |groups, attr| {
            captured.lock().push((groups.to_vec(), attr.key.clone()));
            attr
        })
        .build()
        .with_group("outer");

    let rec = record("m")
        .with_attr("top", 1)
        .with_attrs([Attr::group("inner", vec![Attr::new("x", 2)])]);
    handler.handle(&rec).unwrap();

    let seen = seen.lock();
    assert_eq!(
        *seen,
        vec![
            (vec!["outer".to_string()], "top".to_string()),
            (vec!["outer".to_string(), "inner".to_string()], "x".to_string()),
        ]
    );
}

#[test]
fn test_resolver_rewrites_values() {
    let sink = MemorySink::new();
    let handler = FormatHandler::json()
        .sink(sink.clone())
        .resolver(|_groups, mut attr| {
            if attr.key == "password" {
                attr.value = Value::from("[redacted]");
            }
            attr
        })
        .build();

    let rec = record("login").with_attr("password", "hunter2");
    assert_eq!(
        render(&handler, &sink, rec),
        "{\"level\":\"INFO\",\"msg\":\"login\",\"password\":\"[redacted]\"}\n"
    );
}

#[test]
fn test_resolver_applies_to_bound_attrs() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text()
        .sink(sink.clone())
        .resolver(|groups, mut attr| {
            if !groups.is_empty() {
                attr.key = attr.key.to_uppercase();
            }
            attr
        })
        .build()
        .with_group("g")
        .with_attrs(vec![Attr::new("a", 1)]);

    assert_eq!(render(&handler, &sink, record("m")), "INFO m g.A=1\n");
}

// ============================================================================
// Derivation
// ============================================================================

#[test]
fn test_derivation_isolation() {
    let sink = MemorySink::new();
    let parent = json_handler(&sink);
    let first = parent.with_group("first").with_attrs(vec![Attr::new("a", 1)]);
    let second = parent.with_prefix("p2").with_attrs(vec![Attr::new("b", 2)]);

    assert_eq!(
        render(&parent, &sink, record("m")),
        "{\"level\":\"INFO\",\"msg\":\"m\"}\n"
    );
    assert_eq!(
        render(&first, &sink, record("m")),
        "{\"level\":\"INFO\",\"msg\":\"m\",\"first\":{\"a\":1}}\n"
    );
    assert_eq!(
        render(&second, &sink, record("m")),
        "{\"level\":\"INFO\",\"prefix\":\"p2\",\"msg\":\"m\",\"b\":2}\n"
    );
}

#[test]
fn test_with_themes_overrides_one_role() {
    let sink = MemorySink::terminal();
    let handler = FormatHandler::text().sink(sink.clone()).dark_background(true).build();

    let mut themes = Themes::new();
    themes.insert(ThemeRole::Info, Arc::new(ThemeBuilder::new(true).underline().format()));
    let themed = handler.with_themes(themes);

    let out = render(&themed, &sink, record("m"));
    assert_eq!(out, format!("\x1b[4mINFO{} m\n", RESET));

    let original = render(&handler, &sink, record("m"));
    assert!(!original.starts_with("\x1b[4m"));
}

// ============================================================================
// Terminal handling
// ============================================================================

#[test]
fn test_non_tty_output_has_no_escapes() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text()
        .sink(sink.clone())
        .caller(true)
        .prefix("api")
        .build();
    let rec = Record::new(Level::ERROR, "m")
        .with_source(Source::new("a::b", "src/b.rs", 1))
        .with_attrs([nested_group()]);

    let out = render(&handler, &sink, rec);
    assert!(!out.contains('\x1b'), "unexpected escape in {:?}", out);
}

#[test]
fn test_tty_output_is_themed() {
    let sink = MemorySink::terminal();
    let handler = FormatHandler::text()
        .sink(sink.clone())
        .dark_background(true)
        .prefix("api")
        .build();

    let out = render(&handler, &sink, record("m").with_attr("k", 1));
    assert!(out.starts_with("\x1b[38;2;0;255;213;1mINFO\x1b[0m"), "{:?}", out);
    assert!(out.contains("[api]:\x1b[0m"));
    assert!(out.contains("k\x1b[0m=1"));

    let json = FormatHandler::json().sink(sink.clone()).build();
    let out = render(&json, &sink, record("m"));
    assert!(out.starts_with("\x1b[1m{\x1b[0m"));
    assert!(out.ends_with("\x1b[1m}\x1b[0m\n"));
}

#[test]
fn test_forced_tty_on_plain_writer() {
    let sink = MemorySink::new();
    let handler = FormatHandler::text().sink(sink.clone()).force_tty(true).build();
    assert!(render(&handler, &sink, record("m")).contains('\x1b'));
}

// ============================================================================
// Sinks
// ============================================================================

struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Sink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }
}

#[test]
fn test_write_failure_is_returned() {
    let handler = FormatHandler::text().sink(FailingSink).build();
    let err = handler.handle(&record("m")).unwrap_err();

    match err {
        HandlerError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(handler.metrics().write_failures(), 1);
    assert_eq!(handler.metrics().records_written(), 0);
}

#[test]
fn test_file_sink() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("handler.log");

    let handler = FormatHandler::json()
        .sink(FileSink::new(&path).expect("Failed to open log file"))
        .build();
    handler.handle(&record("one")).unwrap();
    handler.handle(&record("two").with_attr("n", 2)).unwrap();
    handler.flush().unwrap();

    let content = std::fs::read_to_string(&path).expect("Failed to read log file");
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("invalid JSON line"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["msg"], "one");
    assert_eq!(lines[1]["n"], 2);
}

#[test]
fn test_writer_sink() {
    let handler = FormatHandler::text().writer(Vec::new()).build();
    assert!(!handler.is_tty());
    handler.handle(&record("m")).unwrap();
    assert_eq!(handler.metrics().bytes_written(), "INFO m\n".len() as u64);
}

// ============================================================================
// Logger front end
// ============================================================================

#[test]
fn test_default_logger_slot() {
    let sink = MemorySink::new();
    let logger = Logger::new(text_handler(&sink));
    set_default_and_log(logger);
    assert!(sink.contents_string().ends_with(" from default\n"));
}

fn set_default_and_log(logger: Logger) {
    rust_log_handler::set_default(logger);
    let logger = rust_log_handler::default_logger().expect("default logger installed");
    logger.info("from default", []);
}

#[test]
fn test_options_drive_handler() {
    let sink = MemorySink::new();
    let handler = HandlerOptions::from_json(r#"{"format": "json", "level": "warn"}"#)
        .unwrap()
        .into_builder()
        .sink(sink.clone())
        .build();

    assert!(!handler.enabled(Level::INFO));
    let rec = Record::new(Level::WARN, "m").with_time(None);
    assert_eq!(render(&handler, &sink, rec), "{\"level\":\"WARN\",\"msg\":\"m\"}\n");
}
