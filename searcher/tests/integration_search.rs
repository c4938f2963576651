use searcher::{run_bm25, run_boolean, SearchOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use trec_core::bm25::{Bm25Params, DEFAULT_TOP_K};
use trec_core::boolean::MissingTerms;
use trec_core::builder::IndexBuilder;
use trec_core::corpus::ParsedDoc;
use trec_core::persist::{create_index_dir, save_index, IndexPaths, MetaFile};
use trec_core::run::RunEntry;
use trec_core::{DocDate, Tokenizer};

const TINY_DOCS: [(u8, &str, &str); 3] = [
    (1, "LA010189-0001", "cat dog cat"),
    (2, "LA010289-0002", "dog bird"),
    (3, "LA010389-0003", "fish"),
];

fn build_tiny_index(dir: &Path) {
    build_index(dir, &TINY_DOCS, false);
}

fn build_index(dir: &Path, docs: &[(u8, &str, &str)], stem: bool) {
    let mut builder = IndexBuilder::new(Tokenizer::new(stem));
    for &(day, docno, text) in docs {
        builder.add_document(ParsedDoc {
            docno: docno.into(),
            date: DocDate { month: 1, day, year: 1989 },
            headline: String::new(),
            text: text.into(),
        });
    }
    let index = builder.finish();
    let paths = IndexPaths::new(dir);
    create_index_dir(&paths).unwrap();
    save_index(&paths, &index, &MetaFile::describe(&index, stem)).unwrap();
}

fn options(root: &Path, queries: &str, tag: &str) -> SearchOptions {
    let index = root.join("index");
    if !index.exists() {
        build_tiny_index(&index);
    }
    let query_file = root.join(format!("{tag}.queries"));
    fs::write(&query_file, queries).unwrap();
    SearchOptions { index, queries: query_file, output: root.join(format!("{tag}.run")), run_tag: tag.into() }
}

fn read_run(path: &Path) -> Vec<RunEntry> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .enumerate()
        .map(|(i, l)| RunEntry::parse(i + 1, l).unwrap())
        .collect()
}

#[test]
fn bm25_run_is_ranked_and_ordered_by_topic() {
    let dir = tempdir().unwrap();
    let opts = options(dir.path(), "403\nzebra\n402\nbird cat\n401\ncat\n", "bm25");
    let summary = run_bm25(&opts, Bm25Params::default(), DEFAULT_TOP_K).unwrap();
    assert_eq!(summary.topics, 3);
    assert_eq!(summary.lines, 3);
    assert_eq!(summary.unknown_terms, 1);

    let run = read_run(&opts.output);
    let rows: Vec<(u32, &str, usize)> = run.iter().map(|e| (e.topic, e.docno.as_str(), e.rank)).collect();
    assert_eq!(
        rows,
        vec![(401, "LA010189-0001", 1), (402, "LA010189-0001", 1), (402, "LA010289-0002", 2)]
    );
    assert!(run[1].score.value() > run[2].score.value());
    assert!(run.iter().all(|e| e.tag == "bm25"));
}

#[test]
fn bm25_output_is_deterministic() {
    let dir = tempdir().unwrap();
    let opts = options(dir.path(), "1\ndog bird cat fish\n", "det");
    run_bm25(&opts, Bm25Params::default(), DEFAULT_TOP_K).unwrap();
    let first = fs::read_to_string(&opts.output).unwrap();
    run_bm25(&opts, Bm25Params::default(), DEFAULT_TOP_K).unwrap();
    assert_eq!(first, fs::read_to_string(&opts.output).unwrap());
}

#[test]
fn boolean_run_counts_down_remaining_documents() {
    let dir = tempdir().unwrap();
    let opts = options(dir.path(), "401\ndog cat\n402\ndog\n403\ndog zebra\n", "and");
    run_boolean(&opts, MissingTerms::Ignore).unwrap();
    assert_eq!(
        fs::read_to_string(&opts.output).unwrap(),
        "401 Q0 LA010189-0001 1 0 and\n\
402 Q0 LA010189-0001 1 1 and\n\
402 Q0 LA010289-0002 2 0 and\n\
403 Q0 LA010189-0001 1 1 and\n\
403 Q0 LA010289-0002 2 0 and\n"
    );

    let strict = SearchOptions { output: dir.path().join("strict.run"), ..opts };
    run_boolean(&strict, MissingTerms::Unsatisfiable).unwrap();
    let run = read_run(&strict.output);
    assert!(run.iter().all(|e| e.topic != 403));
    assert_eq!(run.len(), 3);
}

#[test]
fn missing_index_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("q"), "1\ncat\n").unwrap();
    let opts = SearchOptions {
        index: dir.path().join("absent"),
        queries: dir.path().join("q"),
        output: dir.path().join("out.run"),
        run_tag: "x".into(),
    };
    let err = run_bm25(&opts, Bm25Params::default(), DEFAULT_TOP_K).unwrap_err();
    assert!(format!("{err:#}").contains("input not found"));
    assert!(!opts.output.exists());
}

#[test]
fn queries_are_stemmed_like_the_index() {
    let docs = [
        (4, "LA010489-0004", "running cats"),
        (5, "LA010589-0005", "dog"),
        (6, "LA010689-0006", "bird"),
    ];
    for stem in [true, false] {
        let dir = tempdir().unwrap();
        build_index(&dir.path().join("index"), &docs, stem);
        let opts = options(dir.path(), "401\nruns cat\n", "stem");

        let summary = run_bm25(&opts, Bm25Params::default(), DEFAULT_TOP_K).unwrap();
        let ranked: Vec<String> = read_run(&opts.output).into_iter().map(|e| e.docno).collect();
        let and = SearchOptions { output: dir.path().join("and.run"), ..opts };
        run_boolean(&and, MissingTerms::Ignore).unwrap();
        let matched: Vec<String> = read_run(&and.output).into_iter().map(|e| e.docno).collect();

        if stem {
            assert_eq!(summary.unknown_terms, 0);
            assert_eq!(ranked, vec!["LA010489-0004"]);
            assert_eq!(matched, vec!["LA010489-0004"]);
        } else {
            // Neither "runs" nor "cat" occurs verbatim in the unstemmed index.
            assert_eq!(summary.unknown_terms, 2);
            assert!(ranked.is_empty());
            assert!(matched.is_empty());
        }
    }
}
