//! Split driver tests

mod common;

use common::{create_workspace, file_names, write_file};
use std::fs;
use zettelflow_core::{Note, NoteRenderer, PipelineError};
use zettelflow_pipeline::SplitDriver;

#[test]
fn splits_into_numbered_notes() {
    let ws = create_workspace("").unwrap();
    let source = write_file(&ws.ingest_dir(), "ingest_20250101120000.txt", "Topic A ### Topic B").unwrap();

    let report = SplitDriver::new(&ws.config).unwrap().run().unwrap();
    assert_eq!(report.processed, vec![source]);
    assert_eq!(report.outputs.len(), 2);

    let names = file_names(&ws.split_dir()).unwrap();
    assert_eq!(names.len(), 2);
    assert!(names[0].starts_with("note_") && names[0].ends_with("_1.md"));
    assert!(names[1].starts_with("note_") && names[1].ends_with("_2.md"));

    let first = fs::read_to_string(ws.split_dir().join(&names[0])).unwrap();
    let second = fs::read_to_string(ws.split_dir().join(&names[1])).unwrap();
    assert!(first.starts_with("---\n"));

    let first = Note::parse(&first);
    assert!(first.metadata.contains("date:"));
    assert_eq!(first.body.trim(), "Topic A");
    assert_eq!(Note::parse(&second).body.trim(), "Topic B");
}

/// `note_<14 digit timestamp>_<index>.md`
fn is_note_name(name: &str) -> bool {
    let Some(core) = name.strip_prefix("note_").and_then(|n| n.strip_suffix(".md")) else {
        return false;
    };
    match core.split_once('_') {
        Some((stamp, index)) => {
            stamp.len() == 14
                && stamp.chars().all(|c| c.is_ascii_digit())
                && !index.is_empty()
                && index.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[test]
fn sources_split_together_get_distinct_timestamps() {
    let ws = create_workspace("").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "A1 ### A2").unwrap();
    write_file(&ws.ingest_dir(), "ingest_2.txt", "B1 ### B2").unwrap();

    let report = SplitDriver::new(&ws.config).unwrap().run().unwrap();
    assert_eq!(report.outputs.len(), 4);

    let names = file_names(&ws.split_dir()).unwrap();
    assert_eq!(names.len(), 4);
    for name in &names {
        assert!(is_note_name(name), "unexpected note name {name}");
    }

    // listing order follows source order
    let bodies: Vec<String> = names
        .iter()
        .map(|name| {
            let text = fs::read_to_string(ws.split_dir().join(name)).unwrap();
            Note::parse(&text).body.trim().to_string()
        })
        .collect();
    assert_eq!(bodies, vec!["A1", "A2", "B1", "B2"]);
}

#[test]
fn existing_notes_are_never_suffixed() {
    let ws = create_workspace("").unwrap();
    let driver = SplitDriver::new(&ws.config).unwrap();

    write_file(&ws.ingest_dir(), "ingest_1.txt", "first").unwrap();
    driver.run().unwrap();
    write_file(&ws.ingest_dir(), "ingest_2.txt", "second").unwrap();
    SplitDriver::new(&ws.config).unwrap().run().unwrap();

    let names = file_names(&ws.split_dir()).unwrap();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|name| is_note_name(name)), "{names:?}");
}

#[test]
fn retired_sources_are_not_split_again() {
    let ws = create_workspace("").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "one ### two").unwrap();
    write_file(&ws.ingest_dir(), "ingest_2.txt", "three").unwrap();

    let driver = SplitDriver::new(&ws.config).unwrap();
    let first = driver.run().unwrap();
    assert_eq!(first.processed.len(), 2);
    assert!(file_names(&ws.ingest_dir()).unwrap().is_empty());
    assert_eq!(
        file_names(&ws.processed_dir()).unwrap(),
        vec!["ingest_1.txt", "ingest_2.txt"]
    );

    let second = driver.run().unwrap();
    assert!(second.is_empty());
    assert_eq!(file_names(&ws.split_dir()).unwrap().len(), 3);
}

#[test]
fn skipped_segments_still_count_towards_the_index() {
    let ws = create_workspace("").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "a ###### b").unwrap();

    SplitDriver::new(&ws.config).unwrap().run().unwrap();

    let names = file_names(&ws.split_dir()).unwrap();
    assert_eq!(names.len(), 2);
    assert!(names[0].ends_with("_1.md"));
    assert!(names[1].ends_with("_3.md"));
}

#[test]
fn empty_source_is_retired_without_notes() {
    let ws = create_workspace("").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "  ###  ").unwrap();

    let report = SplitDriver::new(&ws.config).unwrap().run().unwrap();
    assert_eq!(report.processed.len(), 1);
    assert!(report.outputs.is_empty());
    assert!(file_names(&ws.split_dir()).unwrap().is_empty());
    assert_eq!(file_names(&ws.processed_dir()).unwrap(), vec!["ingest_1.txt"]);
}

#[test]
fn custom_delimiter_and_extension() {
    let ws = create_workspace("[split]\ndelimiter = \"%%\"\noutput_extension = \".txt\"").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "left %% right ### kept").unwrap();

    let driver = SplitDriver::new(&ws.config).unwrap();
    assert_eq!(driver.delimiter(), "%%");
    driver.run().unwrap();

    let names = file_names(&ws.split_dir()).unwrap();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.ends_with(".txt")));
    let second = fs::read_to_string(ws.split_dir().join(&names[1])).unwrap();
    assert!(second.contains("right ### kept"));
}

#[test]
fn preview_writes_and_retires_nothing() {
    let ws = create_workspace("").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "alpha ### beta").unwrap();

    let mut sink = Vec::new();
    let report = SplitDriver::new(&ws.config)
        .unwrap()
        .preview(&mut sink)
        .unwrap();

    let shown = String::from_utf8(sink).unwrap();
    assert!(shown.contains("alpha"));
    assert!(shown.contains("beta"));
    assert!(shown.contains("ingest_1.txt"));
    assert_eq!(report.processed.len(), 1);
    assert!(report.outputs.is_empty());
    assert!(file_names(&ws.split_dir()).unwrap().is_empty());
    assert_eq!(file_names(&ws.ingest_dir()).unwrap(), vec!["ingest_1.txt"]);
}

#[test]
fn template_errors_stop_the_stage_even_when_continuing() {
    let ws = create_workspace("[pipeline]\nhalt_on_error = false").unwrap();
    write_file(&ws.ingest_dir(), "ingest_1.txt", "text").unwrap();

    let renderer = NoteRenderer::new("{{Content}} {{Author}}").unwrap();
    let driver = SplitDriver::with_renderer(&ws.config, renderer).unwrap();
    let err = driver.run().unwrap_err();

    assert!(matches!(err, PipelineError::Format(_)));
    assert!(file_names(&ws.split_dir()).unwrap().is_empty());
    assert_eq!(file_names(&ws.ingest_dir()).unwrap(), vec!["ingest_1.txt"]);
}

#[test]
fn empty_delimiter_is_a_configuration_error() {
    let ws = create_workspace("[split]\ndelimiter = \"\"").unwrap();
    let err = SplitDriver::new(&ws.config).err().unwrap();
    assert!(matches!(err, PipelineError::Configuration(_)));
}

#[test]
fn missing_ingest_directory_is_fatal() {
    let ws = create_workspace("").unwrap();
    fs::remove_dir_all(ws.ingest_dir()).unwrap();

    let err = SplitDriver::new(&ws.config).unwrap().run().unwrap_err();
    assert!(matches!(err, PipelineError::Stage { .. }));
}
