use microxml::{traverse, Error, Event, EventCollector, Outcome, ParseErrorKind, Traverser};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};

fn events(input: &str) -> (Outcome, Vec<Event>) {
    let mut collector = EventCollector::new();
    let outcome = Traverser::new()
        .traverse_str(input, &mut collector)
        .unwrap();
    (outcome, collector.into_events())
}

const COMPLETED: Outcome = Outcome::Completed { unclosed: 0 };

#[test]
fn test_empty_element() {
    assert_eq!(
        events("<a/>"),
        (COMPLETED, vec![Event::enter("a", &[]), Event::leave("a")])
    );
}

#[test]
fn test_text_is_trimmed() {
    assert_eq!(
        events("<a>  hello  </a>"),
        (
            COMPLETED,
            vec![Event::enter("a", &[]), Event::data("a", "hello"), Event::leave("a")]
        )
    );
}

#[test]
fn test_comment_is_transparent() {
    assert_eq!(
        events("<a><!-- comment --><b/></a>"),
        (
            COMPLETED,
            vec![
                Event::enter("a", &[]),
                Event::enter("b", &[]),
                Event::leave("b"),
                Event::leave("a"),
            ]
        )
    );
}

#[test]
fn test_cdata_section() {
    assert_eq!(
        events("<a><![CDATA[raw <not-a-tag> text]]></a>"),
        (
            COMPLETED,
            vec![
                Event::enter("a", &[]),
                Event::data("a", "raw <not-a-tag> text"),
                Event::leave("a"),
            ]
        )
    );
}

#[test]
fn test_attribute_escapes() {
    let (outcome, found) = events(r#"<a v="&amp;&lt;&gt;&quot;&apos;&#10;&#9;" w='plain'/>"#);
    assert_eq!(outcome, COMPLETED);
    assert_eq!(
        found[0],
        Event::enter("a", &[("v", "&<>\"'\n\t"), ("w", "plain")])
    );
}

#[test]
fn test_text_is_not_unescaped() {
    let (_, found) = events("<a>fish &amp; chips</a>");
    assert_eq!(found[1], Event::data("a", "fish &amp; chips"));
}

#[test]
fn test_duplicate_attribute_last_wins() {
    let (_, found) = events(r#"<a k="1" k="2"/>"#);
    assert_eq!(found[0], Event::enter("a", &[("k", "2")]));
}

#[test]
fn test_declaration_is_ignored() {
    let doc = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n  <item id=\"1\">one</item>\n  tail\n</root>\n";
    assert_eq!(
        events(doc),
        (
            COMPLETED,
            vec![
                Event::enter("root", &[]),
                Event::enter("item", &[("id", "1")]),
                Event::data("item", "one"),
                Event::leave("item"),
                Event::data("root", "tail"),
                Event::leave("root"),
            ]
        )
    );
}

#[test]
fn test_text_after_empty_element_belongs_to_parent() {
    let (_, found) = events("<p>one<br/>two</p>");
    assert_eq!(
        found,
        vec![
            Event::enter("p", &[]),
            Event::data("p", "one"),
            Event::enter("br", &[]),
            Event::leave("br"),
            Event::data("p", "two"),
            Event::leave("p"),
        ]
    );
}

#[test]
fn test_nesting_is_balanced() {
    let doc = "<r><a><b><c/></b><b>t</b></a><a/><d><e><f>x</f></e></d></r>";
    let (outcome, found) = events(doc);
    assert_eq!(outcome, COMPLETED);

    let mut stack = Vec::new();
    for event in &found {
        match event {
            Event::Enter { name, .. } => stack.push(name.clone()),
            Event::Leave { name } => assert_eq!(stack.pop().as_ref(), Some(name)),
            Event::Data { name, .. } => assert_eq!(name.as_ref(), stack.last()),
        }
    }
    assert!(stack.is_empty());
}

#[test]
fn test_unmatched_closing_tag_stops() {
    let (outcome, found) = events("</a><b/>");
    assert_eq!(
        outcome,
        Outcome::Mismatch {
            expected: None,
            found: "a".into(),
            line: 1,
        }
    );
    assert!(found.is_empty());
}

#[test]
fn test_crossed_tags_stop() {
    let (outcome, found) = events("<a>\n<b>\n</a></b>");
    assert_eq!(
        outcome,
        Outcome::Mismatch {
            expected: Some("b".into()),
            found: "a".into(),
            line: 3,
        }
    );
    assert_eq!(found, vec![Event::enter("a", &[]), Event::enter("b", &[])]);
}

#[test]
fn test_false_stops_immediately() {
    let mut seen = Vec::new();
    let outcome = traverse(
        Cursor::new("<a><b>text</b><c/></a><!-- never reached"),
        |name, _| {
            seen.push(name.to_string());
            name != "b"
        },
        |_| true,
        |_, _| panic!("data after a stop"),
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Stopped);
    assert_eq!(seen, vec!["a", "b"]);
}

#[test]
fn test_leave_false_on_empty_element_stops() {
    let mut data_calls = 0;
    let outcome = traverse(
        Cursor::new("<a><b/>after</a>"),
        |_, _| true,
        |name| name != "b",
        |_, _| {
            data_calls += 1;
            true
        },
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Stopped);
    assert_eq!(data_calls, 0);
}

#[test]
fn test_data_false_stops() {
    let mut data_calls = 0;
    let outcome = traverse(
        Cursor::new("<a>x<b/>y</a><c/>"),
        |_, _| true,
        |_| true,
        |_, _| {
            data_calls += 1;
            false
        },
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Stopped);
    assert_eq!(data_calls, 1);
}

#[test]
fn test_leave_false_on_closing_tag_stops() {
    let mut entered = Vec::new();
    let outcome = traverse(
        Cursor::new("<a><b></b><c/></a>"),
        |name, _| {
            entered.push(name.to_string());
            true
        },
        |_| false,
        |_, _| true,
    )
    .unwrap();
    assert_eq!(outcome, Outcome::Stopped);
    assert_eq!(entered, vec!["a", "b"]);
}

#[test]
fn test_unterminated_tag_is_fatal() {
    let err = Traverser::new()
        .traverse_str("<a", &mut EventCollector::new())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Parse {
            kind: ParseErrorKind::UnterminatedTag(_),
            line: 1
        }
    ));
}

#[test]
fn test_callbacks_before_failure_are_delivered() {
    let mut collector = EventCollector::new();
    let result = Traverser::new().traverse_str("<a>ok<!DOCTYPE x>", &mut collector);
    assert_eq!(
        result.unwrap_err().parse_kind(),
        Some(&ParseErrorKind::UnsupportedDeclaration(Some(b'D')))
    );
    assert_eq!(
        collector.events(),
        &[Event::enter("a", &[]), Event::data("a", "ok")]
    );
}

#[test]
fn test_unclosed_tags_are_counted() {
    let (outcome, _) = events("<a><b></b>");
    assert_eq!(outcome, Outcome::Completed { unclosed: 1 });
}

#[test]
fn test_small_buffers_give_same_events() {
    let doc = r#"<?xml version="1.0"?>
<catalog>
  <book id="b1" note='x &amp; y'>
    <title>First</title>
    <!-- a comment with <tags> -->
    <summary><![CDATA[<raw> text]]></summary>
    <available/>
  </book>
  <book id="b2"><title>Second</title></book>
</catalog>
"#;
    let (expected_outcome, expected) = events(doc);
    assert_eq!(expected_outcome, COMPLETED);
    assert_eq!(expected.len(), 17);

    for capacity in [2, 3, 5, 16, 64] {
        let mut collector = EventCollector::new();
        let outcome = Traverser::new()
            .with_buffer_capacity(capacity)
            .traverse_str(doc, &mut collector)
            .unwrap();
        assert_eq!(outcome, COMPLETED, "capacity {}", capacity);
        assert_eq!(collector.events(), expected.as_slice(), "capacity {}", capacity);
    }
}

#[test]
fn test_traverse_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<config><entry key=\"a\">1</entry></config>").unwrap();

    let mut collector = EventCollector::new();
    let outcome = Traverser::new()
        .traverse_file(file.path(), &mut collector)
        .unwrap();
    assert_eq!(outcome, COMPLETED);
    assert_eq!(
        collector.into_events(),
        vec![
            Event::enter("config", &[]),
            Event::enter("entry", &[("key", "a")]),
            Event::data("entry", "1"),
            Event::leave("entry"),
            Event::leave("config"),
        ]
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Traverser::new()
        .traverse_file(dir.path().join("missing.xml"), &mut EventCollector::new())
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
