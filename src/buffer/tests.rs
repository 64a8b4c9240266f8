use super::*;
use crate::binxml::{CodecError, Quota, StartElement, XmlNode};
use crate::sink::XmlTextWriter;

fn render(nodes: &[XmlNode]) -> String {
    nodes.iter().map(ToString::to_string).collect()
}

fn read_section(buffer: &XmlBuffer, index: usize) -> Vec<XmlNode> {
    let mut nodes = Vec::new();
    buffer.write_to(index, &mut nodes).unwrap();
    nodes
}

/// Buffer with one closed, empty section.
fn buffer_with_section() -> XmlBuffer {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    drop(buffer.open_section(&ReaderQuotas::default()).unwrap());
    buffer.close_section().unwrap();
    buffer
}

#[test]
fn test_new_buffer() {
    let buffer = XmlBuffer::new(0).unwrap();
    assert_eq!(buffer.state(), BufferState::Created);
    assert_eq!(buffer.section_count(), 0);
    assert_eq!(buffer.max_size(), 0);

    let buffer = XmlBuffer::new(1024u64).unwrap();
    assert_eq!(buffer.max_size(), 1024);
}

#[test]
fn test_negative_max_size_is_out_of_range() {
    let err = XmlBuffer::new(-1).unwrap_err();
    assert!(err.is_out_of_range());
    assert!(XmlBuffer::new(i64::MIN).unwrap_err().is_out_of_range());
}

#[test]
fn test_open_requires_created() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    drop(buffer.open_section(&ReaderQuotas::default()).unwrap());
    assert_eq!(buffer.state(), BufferState::Writing);

    // Double open
    let err = buffer.open_section(&ReaderQuotas::default()).err().unwrap();
    assert!(err.is_invalid_state());
    assert_eq!(buffer.state(), BufferState::Writing);

    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    // Open after seal
    let err = buffer.open_section(&ReaderQuotas::default()).err().unwrap();
    assert!(matches!(
        err,
        Error::InvalidState {
            state: BufferState::Sealed,
            ..
        }
    ));
}

#[test]
fn test_close_requires_writing() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    assert!(buffer.close_section().unwrap_err().is_invalid_state());
    assert_eq!(buffer.state(), BufferState::Created);

    buffer.seal().unwrap();
    assert!(buffer.close_section().unwrap_err().is_invalid_state());
    assert_eq!(buffer.state(), BufferState::Sealed);
}

#[test]
fn test_seal_requires_created() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    drop(buffer.open_section(&ReaderQuotas::default()).unwrap());

    // Mid-write
    assert!(buffer.seal().unwrap_err().is_invalid_state());
    assert_eq!(buffer.state(), BufferState::Writing);

    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    // Already sealed
    assert!(buffer.seal().unwrap_err().is_invalid_state());
}

#[test]
fn test_reads_require_sealed() {
    let mut buffer = buffer_with_section();
    let mut nodes: Vec<XmlNode> = Vec::new();

    assert!(buffer.get_reader(0).unwrap_err().is_invalid_state());
    assert!(buffer.write_to(0, &mut nodes).unwrap_err().is_invalid_state());
    assert!(buffer.buffer_size().unwrap_err().is_invalid_state());
    assert!(buffer.sealed_bytes().unwrap_err().is_invalid_state());

    drop(buffer.open_section(&ReaderQuotas::default()).unwrap());
    assert!(buffer.get_reader(0).unwrap_err().is_invalid_state());
    assert!(buffer.buffer_size().unwrap_err().is_invalid_state());
}

#[test]
fn test_two_section_scenario() {
    let mut buffer = XmlBuffer::new(1024).unwrap();

    let q1 = ReaderQuotas::default();
    let mut section = buffer.open_section(&q1).unwrap();
    section.write_empty_element("a").unwrap();
    drop(section);
    buffer.close_section().unwrap();

    let q2 = ReaderQuotas::default().with_max_depth(4);
    let mut section = buffer.open_section(&q2).unwrap();
    section.write_start_element("b").unwrap();
    section.write_empty_element("c").unwrap();
    section.write_end_element().unwrap();
    drop(section);
    buffer.close_section().unwrap();

    buffer.seal().unwrap();
    assert_eq!(buffer.section_count(), 2);

    let reader = buffer.get_reader(0).unwrap();
    assert_eq!(
        reader.node(),
        Some(&XmlNode::StartElement(StartElement {
            name: "a".to_string(),
            attributes: Vec::new(),
            empty: true,
        }))
    );

    let mut reader = buffer.get_reader(1).unwrap();
    assert_eq!(reader.node().and_then(XmlNode::name), Some("b"));
    assert_eq!(reader.quotas(), &q2);
    let nodes: Vec<XmlNode> = reader.nodes().collect::<std::result::Result<_, _>>().unwrap();
    assert_eq!(render(&nodes), "<b><c/></b>");

    assert!(buffer.get_reader(2).unwrap_err().is_out_of_range());
    let mut sink: Vec<XmlNode> = Vec::new();
    assert!(buffer.write_to(2, &mut sink).unwrap_err().is_out_of_range());
}

#[test]
fn test_quotas_are_snapshotted_at_open() {
    let mut quotas = ReaderQuotas::default().with_max_depth(1);
    let mut buffer = XmlBuffer::new(1024).unwrap();

    let mut section = buffer.open_section(&quotas).unwrap();
    section.write_start_element("b").unwrap();
    section.write_empty_element("c").unwrap();
    drop(section);
    quotas.max_depth = 100;
    buffer.close_section().unwrap();

    let mut section = buffer.open_section(&quotas).unwrap();
    section.write_start_element("b").unwrap();
    section.write_empty_element("c").unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    assert_eq!(buffer.section(0).unwrap().quotas().max_depth, 1);
    assert_eq!(buffer.section(1).unwrap().quotas().max_depth, 100);
    assert_eq!(render(&read_section(&buffer, 1)), "<b><c/></b>");

    let mut sink: Vec<XmlNode> = Vec::new();
    let err = buffer.write_to(0, &mut sink).unwrap_err();
    assert!(matches!(
        err,
        Error::Codec(CodecError::QuotaExceeded {
            quota: Quota::MaxDepth,
            limit: 1,
            found: 2,
        })
    ));
    // Nodes before the violation were already streamed
    assert_eq!(render(&sink), "<b>");
}

#[test]
fn test_empty_section() {
    let mut buffer = buffer_with_section();
    buffer.seal().unwrap();

    let section = buffer.section(0).unwrap();
    assert!(section.is_empty());
    assert_eq!(section.offset(), 0);
    assert_eq!(buffer.buffer_size().unwrap(), 0);

    let reader = buffer.get_reader(0).unwrap();
    assert!(reader.node().is_none());
    assert!(reader.is_eof());
    assert!(read_section(&buffer, 0).is_empty());
}

#[test]
fn test_dropping_writer_closes_open_elements() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    section.write_start_element("a").unwrap();
    section.write_start_element("b").unwrap();
    section.write_attribute("k", "v").unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    assert_eq!(render(&read_section(&buffer, 0)), r#"<a><b k="v"/></a>"#);
}

#[test]
fn test_section_writer_close() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    assert_eq!(section.index(), 0);
    section.write_start_element("a").unwrap();
    section.write_bool(true).unwrap();
    section.close().unwrap();
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    assert_eq!(render(&read_section(&buffer, 0)), "<a>true</a>");
}

#[test]
fn test_get_reader_skips_prolog() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    section
        .write_declaration(&crate::binxml::XmlDeclaration::default())
        .unwrap();
    section.write_comment("header").unwrap();
    section.write_whitespace("\n").unwrap();
    section.write_element_string("doc", "x").unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    let reader = buffer.get_reader(0).unwrap();
    assert_eq!(reader.node().and_then(XmlNode::name), Some("doc"));
    assert_eq!(render(&read_section(&buffer, 0)), "<doc>x</doc>");
}

#[test]
fn test_readers_are_independent() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    section.write_element_string("a", "1").unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    let mut first = buffer.get_reader(0).unwrap();
    let second = buffer.get_reader(0).unwrap();
    while first.read().unwrap() {}
    assert!(first.is_eof());

    assert_eq!(second.node().and_then(XmlNode::name), Some("a"));
    drop(first);
    assert_eq!(render(&read_section(&buffer, 0)), "<a>1</a>");
}

#[test]
fn test_max_size_is_advisory() {
    let mut buffer = XmlBuffer::new(4).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    section
        .write_element_string("paragraph", "longer than four bytes")
        .unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    assert!(buffer.buffer_size().unwrap() > buffer.max_size());
    assert_eq!(buffer.sealed_bytes().unwrap().len(), buffer.buffer_size().unwrap());
}

#[test]
fn test_write_to_text_file() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    section.write_start_element("p").unwrap();
    section.write_attribute("lang", "en").unwrap();
    section.write_text("fish & chips").unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    let mut writer = XmlTextWriter::new(file.reopen().unwrap());
    buffer.write_to(0, &mut writer).unwrap();
    drop(writer);

    let written = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(written, r#"<p lang="en">fish &amp; chips</p>"#);
}

#[test]
fn test_copy_between_buffers() {
    let mut source = XmlBuffer::new(1024).unwrap();
    let mut section = source.open_section(&ReaderQuotas::default()).unwrap();
    section.write_start_element("list").unwrap();
    section.write_i64(-7).unwrap();
    section.write_f64(f64::INFINITY).unwrap();
    drop(section);
    source.close_section().unwrap();
    source.seal().unwrap();

    let mut target = XmlBuffer::new(1024).unwrap();
    let mut section = target.open_section(&ReaderQuotas::default()).unwrap();
    source.write_to(0, &mut section).unwrap();
    drop(section);
    target.close_section().unwrap();
    target.seal().unwrap();

    assert_eq!(render(&read_section(&target, 0)), "<list>-7INF</list>");
}

#[cfg(feature = "xml-import")]
#[test]
fn test_write_xml_into_section() {
    let mut buffer = XmlBuffer::new(1024).unwrap();
    let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
    section
        .write_xml("<?xml version=\"1.0\"?><root a=\"&lt;\"><leaf/>text</root>")
        .unwrap();
    drop(section);
    buffer.close_section().unwrap();
    buffer.seal().unwrap();

    assert_eq!(
        render(&read_section(&buffer, 0)),
        r#"<root a="&lt;"><leaf/>text</root>"#
    );
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    type Document = Vec<(String, String)>;

    fn document_strategy() -> impl Strategy<Value = Document> {
        prop::collection::vec(("[a-z][a-z0-9]{0,6}", "[a-zA-Z0-9 <>&\"]{0,12}"), 0..4)
    }

    fn expected_nodes(document: &Document) -> Vec<XmlNode> {
        document
            .iter()
            .flat_map(|(name, text)| {
                [
                    XmlNode::StartElement(StartElement {
                        name: name.clone(),
                        attributes: Vec::new(),
                        empty: false,
                    }),
                    XmlNode::Text(text.clone()),
                    XmlNode::EndElement(name.clone()),
                ]
            })
            .collect()
    }

    fn build(documents: &[Document]) -> XmlBuffer {
        let mut buffer = XmlBuffer::new(1024).unwrap();
        for document in documents {
            let mut section = buffer.open_section(&ReaderQuotas::default()).unwrap();
            for (name, text) in document {
                section.write_element_string(name, text).unwrap();
            }
            drop(section);
            buffer.close_section().unwrap();
        }
        buffer.seal().unwrap();
        buffer
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_sections_are_contiguous(documents in prop::collection::vec(document_strategy(), 0..6)) {
            let buffer = build(&documents);
            prop_assert_eq!(buffer.section_count(), documents.len());

            let mut expected_offset = 0;
            for section in buffer.sections() {
                prop_assert_eq!(section.offset(), expected_offset);
                expected_offset = section.range().end;
            }
            prop_assert_eq!(expected_offset, buffer.buffer_size().unwrap());
        }

        #[test]
        fn prop_sections_round_trip(documents in prop::collection::vec(document_strategy(), 1..6)) {
            let buffer = build(&documents);
            for (index, document) in documents.iter().enumerate() {
                prop_assert_eq!(read_section(&buffer, index), expected_nodes(document));
            }
            prop_assert!(buffer.get_reader(documents.len()).unwrap_err().is_out_of_range());
        }
    }
}
