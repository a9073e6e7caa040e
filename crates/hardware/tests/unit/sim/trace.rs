//! # Trace Reader Tests
//!
//! Parses traces from memory and from temporary files, including malformed
//! lines and their reported line numbers.

use std::io::Write;

use cachesim_core::common::{MemoryReference, TraceError};
use cachesim_core::sim::trace::{TraceReader, parse_line};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn read_all(text: &str) -> Vec<Result<MemoryReference, TraceError>> {
    TraceReader::new(text.as_bytes()).collect()
}

#[rstest]
#[case("r 0x1f", MemoryReference::read(0x1f))]
#[case("w 1F", MemoryReference::write(0x1f))]
#[case("R 0XDEADBEEF", MemoryReference::read(0xdead_beef))]
#[case("  W\t40  ", MemoryReference::write(0x40))]
#[case("r ffffffff trailing", MemoryReference::read(0xffff_ffff))]
fn parses_reference_lines(#[case] line: &str, #[case] expected: MemoryReference) {
    assert_eq!(parse_line(line).unwrap(), Some(expected));
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("# r 0x10")]
fn skips_blank_and_comment_lines(#[case] line: &str) {
    assert_eq!(parse_line(line).unwrap(), None);
}

#[test]
fn rejects_unknown_kind() {
    assert!(matches!(
        parse_line("x 10"),
        Err(TraceError::UnknownAccessKind { ref kind, .. }) if kind == "x"
    ));
    assert!(matches!(
        parse_line("rw 10"),
        Err(TraceError::UnknownAccessKind { ref kind, .. }) if kind == "rw"
    ));
}

#[test]
fn rejects_missing_address() {
    assert!(matches!(parse_line("w"), Err(TraceError::MissingAddress { line: 0 })));
}

#[rstest]
#[case("r 0xzz", "0xzz")]
#[case("r 0x", "0x")]
#[case("w 1ffffffff", "1ffffffff")]
fn rejects_bad_address(#[case] line: &str, #[case] text: &str) {
    match parse_line(line) {
        Err(TraceError::BadAddress { text: got, .. }) => assert_eq!(got, text),
        other => panic!("expected BadAddress, got {other:?}"),
    }
}

#[test]
fn reader_numbers_lines_from_one() {
    let results = read_all("r 0\n\n# note\nw 4\nq 8\nr 0xc\n");
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].as_ref().unwrap(), &MemoryReference::read(0x0));
    assert_eq!(results[1].as_ref().unwrap(), &MemoryReference::write(0x4));
    assert!(matches!(
        results[2],
        Err(TraceError::UnknownAccessKind { line: 5, .. })
    ));
    assert_eq!(results[3].as_ref().unwrap(), &MemoryReference::read(0xc));
}

#[test]
fn reader_handles_missing_final_newline_and_crlf() {
    let refs: Vec<MemoryReference> = TraceReader::new("r 10\r\nw 20".as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(refs, vec![MemoryReference::read(0x10), MemoryReference::write(0x20)]);
}

#[test]
fn reads_trace_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "r 0x0").unwrap();
    writeln!(file, "w 0x10").unwrap();
    writeln!(file, "r 0x0").unwrap();
    file.flush().unwrap();

    let mut reader = TraceReader::open(file.path()).unwrap();
    let refs: Vec<MemoryReference> = reader.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(
        refs,
        vec![
            MemoryReference::read(0x0),
            MemoryReference::write(0x10),
            MemoryReference::read(0x0),
        ]
    );
    assert_eq!(reader.line(), 3);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.trace");
    let err = TraceReader::open(&path).unwrap_err();

    assert!(matches!(err, TraceError::Open { ref path, .. } if path.ends_with("absent.trace")));
    assert!(err.to_string().contains("absent.trace"));
}
