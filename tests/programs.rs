//! Runs every `tests/programs/*.lox` fixture and checks it against the
//! expectations written in its comments:
//!
//! - `// expect: TEXT` — the next printed line
//! - `// expect runtime error: MESSAGE` — execution stops with this error
//! - `// expect static error` — the file is rejected before running

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use regex::Regex;

use rox::session::{Failure, Session};

#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(PartialEq, Debug)]
enum TestResult {
    Ok,
    StaticError,
    RuntimeError(String),
}

fn parse_expects(source: &str, regex: &Regex) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| regex.captures(line).map(|caps| caps[1].to_owned()))
        .collect()
}

fn execute(source: &str) -> (Vec<String>, TestResult) {
    let out = Captured::default();
    let mut session = Session::with_output(Box::new(out.clone()));

    let result = match session.run(source) {
        Ok(()) => TestResult::Ok,
        Err(Failure::Static(_)) => TestResult::StaticError,
        Err(Failure::Runtime(e)) => TestResult::RuntimeError(e.message()),
    };

    let output = String::from_utf8_lossy(&out.0.borrow()).into_owned();
    (output.lines().map(str::to_owned).collect(), result)
}

fn harness(path: &Path) {
    let source = fs::read_to_string(path).expect("fixture is readable");

    let expects = parse_expects(&source, &Regex::new(r"// expect: ?(.*)$").unwrap());
    let runtime = parse_expects(
        &source,
        &Regex::new(r"// expect runtime error: (.+)$").unwrap(),
    );
    let expected_result = if source.contains("// expect static error") {
        TestResult::StaticError
    } else if let Some(message) = runtime.first() {
        TestResult::RuntimeError(message.trim().to_owned())
    } else {
        TestResult::Ok
    };

    let (output, result) = execute(&source);

    assert_eq!(expects, output, "output of {}", path.display());
    assert_eq!(expected_result, result, "result of {}", path.display());
}

fn fixtures() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/programs");
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("fixture directory exists")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "lox"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn test_program_fixtures() {
    let paths = fixtures();
    assert!(!paths.is_empty());

    for path in paths {
        harness(&path);
    }
}
