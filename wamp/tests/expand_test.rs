use std::fs;

use wamp::{expand_str, preprocess, Context, Error, Options, SyntaxError};

const TEST_FILE: &str = "./tests/expand.wam";

struct Case {
    line_number: usize,
    source: String,
    expected: Option<String>,
}

fn cases(text: &str) -> Vec<Case> {
    text.lines()
        .enumerate()
        .filter(|(_index, line)| !(line.is_empty() || line.starts_with(";;")))
        .scan(None, |state: &mut Option<(usize, String)>, (index, line)| {
            match state.take() {
                None => {
                    *state = Some((index, line.to_string()));

                    Some(None)
                }
                Some((index, source)) => {
                    if line.starts_with(";=>") {
                        Some(Some(Case {
                            line_number: index + 1,
                            source,
                            expected: Some(line.trim_start_matches(";=>").to_string()),
                        }))
                    } else if line.starts_with(";/") {
                        Some(Some(Case {
                            line_number: index + 1,
                            source,
                            expected: None,
                        }))
                    } else {
                        *state = Some((index, format!("{}\n{}", source, line)));

                        Some(None)
                    }
                }
            }
        })
        .flatten()
        .collect()
}

#[test]
fn should_pass_acceptance_test() {
    let text = fs::read_to_string(TEST_FILE).unwrap();
    let cases = cases(&text);

    assert!(cases.len() > 20, "fixture should hold every case");

    for case in cases {
        let mut ctx = Context::new();
        let result = expand_str(&case.source, &mut ctx);

        match case.expected {
            None => assert!(
                result.is_err(),
                "Test at line {} should fail: {}",
                case.line_number,
                case.source
            ),
            Some(expected) => assert_eq!(
                result,
                Ok(expected),
                "Test at line {} should expand correctly: {}",
                case.line_number,
                case.source
            ),
        }
    }
}

#[test]
fn hoisted_globals_keep_source_order() {
    let text = preprocess(
        &[concat!(
            "(module $m\n",
            "  (func $first (global $a i32 (i32.const 1)))\n",
            "  (func $second (global $b i32 (i32.const 2))))",
        )],
        &Options::default(),
    )
    .unwrap();

    let a = text.find("  (global $a i32 (i32.const 1))\n").unwrap();
    let b = text.find("  (global $b i32 (i32.const 2))\n").unwrap();
    let end = text.find("$S_STRING_END").unwrap();

    assert!(a < b && b < end);
    assert!(text.contains("(func $first (; global $a hoisted to top ;))"));
}

#[test]
fn interned_offsets_count_the_terminator() {
    let text = preprocess(
        &[r#"(module $m (func $f (drop (STRING "hi")) (drop (STRING "hi")) (drop (STRING "bye"))))"#],
        &Options::default(),
    )
    .unwrap();

    assert!(text.contains("  (global $S_STRING_0  i32 (i32.const 0))\n"));
    assert!(text.contains("  (global $S_STRING_1  i32 (i32.const 3))\n"));
    assert_eq!(text.matches("\"hi\\00\"").count(), 1);
    assert_eq!(text.matches("(get_global $S_STRING_0)").count(), 2);
}

#[test]
fn static_arrays_are_zero_filled() {
    let text = preprocess(
        &["(module $m (func $f (drop (STATIC_ARRAY 4)) (drop (STATIC_ARRAY 4))))"],
        &Options::default(),
    )
    .unwrap();

    assert!(text.contains("$S_STATIC_ARRAY_0"));
    assert!(text.contains("$S_STATIC_ARRAY_1"));
    assert_eq!(text.matches("\"\\00\\00\\00\\00\\00\"").count(), 2);
    assert!(text.contains("  (global $S_STRING_END  i32 (i32.const 10))\n"));
}

#[test]
fn macro_free_sources_round_trip() {
    let source = concat!(
        "(func $add (param $a i32) (param $b i32) (result i32)\n",
        "  ;; sum of both\n",
        "  (i32.add (get_local $a) (get_local $b)) (; done ;)\n",
        ")\n",
    );

    let ast = wamp::read_str(source).unwrap();
    assert_eq!(wamp::emit(&ast).unwrap(), source);
}

#[test]
fn parse_errors_are_fatal() {
    assert_eq!(
        preprocess(&["(foo"], &Options::default()),
        Err(Error::Syntax(SyntaxError::UnexpectedEof { line: 1 }))
    );
    assert_eq!(
        preprocess(&[")"], &Options::default()),
        Err(Error::Syntax(SyntaxError::UnexpectedClose { line: 1 }))
    );
}

#[test]
fn oversized_static_data_is_an_error() {
    assert!(preprocess(
        &["(module $m (func (drop (STATIC_ARRAY 0xffffffffffffffff))))"],
        &Options::default()
    )
    .is_err());

    assert_eq!(
        preprocess(
            &["(module $m (func (drop (STATIC_ARRAY 0xffffffff))))"],
            &Options::default()
        ),
        Err(Error::DataOverflow {
            needed: 1 << 32,
            capacity: 256 * 64 * 1024
        })
    );
}
