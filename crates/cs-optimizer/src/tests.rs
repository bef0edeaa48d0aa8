use crate::*;
use crate::stage1_comments;
use crate::stage2_indent;
use crate::stage3_whitespace;
use cs_core::*;

fn kw() -> IndentConfig {
    IndentConfig { strategy: IndentStrategy::Keyword, ..IndentConfig::default() }
}

fn keyword(text: &str) -> stage2_indent::Reindented {
    stage2_indent::reindent(text, &kw())
}

fn structural(text: &str) -> stage2_indent::Reindented {
    stage2_indent::reindent_structural(text, 4)
}

// ========== Stage 1: quote parity ==========

#[test]
fn test_s1_parity_trailing_comment() {
    assert_eq!(stage1_comments::strip_quote_parity("x = 1  # comment"), "x = 1  ");
}

#[test]
fn test_s1_parity_hash_in_string() {
    let line = r#"s = "a # b""#;
    assert_eq!(stage1_comments::strip_quote_parity(line), line);
}

#[test]
fn test_s1_parity_mixed_quotes_keeps_line() {
    // one `'` before the marker makes the parity odd
    let line = r#"s = "it's" # c"#;
    assert_eq!(stage1_comments::strip_quote_parity(line), line);
}

#[test]
fn test_s1_parity_removes_triple_spans() {
    let src = "def f():\n    \"\"\"Doc.\n    More.\"\"\"\n    return 1";
    assert_eq!(stage1_comments::strip_quote_parity(src), "def f():\n    \n    return 1");
}

#[test]
fn test_s1_parity_single_triple_style() {
    let src = "x = 1\n'''block\ncomment'''\ny = 2";
    assert_eq!(stage1_comments::strip_quote_parity(src), "x = 1\n\ny = 2");
}

#[test]
fn test_s1_parity_unterminated_triple_kept() {
    let src = "x = \"\"\"abc # not";
    assert_eq!(stage1_comments::strip_quote_parity(src), src);
}

#[test]
fn test_s1_parity_full_line_comment() {
    assert_eq!(stage1_comments::strip_quote_parity("# header\nx = 1"), "\nx = 1");
}

// ========== Stage 1: scanner ==========

#[test]
fn test_s1_scanner_trailing_comment() {
    assert_eq!(stage1_comments::strip_scanner("x = 1  # comment\ny = 2"), "x = 1\ny = 2");
}

#[test]
fn test_s1_scanner_hash_in_string() {
    let src = r#"s = "a # b"  # real"#;
    assert_eq!(stage1_comments::strip_scanner(src), r#"s = "a # b""#);
}

#[test]
fn test_s1_scanner_tracks_quote_kind() {
    assert_eq!(stage1_comments::strip_scanner(r#"s = "it's" # c"#), r#"s = "it's""#);
}

#[test]
fn test_s1_scanner_escaped_quote() {
    let src = r#"s = "a \" # b" # c"#;
    assert_eq!(stage1_comments::strip_scanner(src), r#"s = "a \" # b""#);
}

#[test]
fn test_s1_scanner_single_quoted_hash() {
    assert_eq!(stage1_comments::strip_scanner("c = '#'  # x"), "c = '#'");
}

#[test]
fn test_s1_scanner_removes_docstring() {
    let src = "def f():\n    \"\"\"Doc # not a comment.\"\"\"\n    return 1";
    assert_eq!(stage1_comments::strip_scanner(src), "def f():\n    \n    return 1");
}

#[test]
fn test_s1_scanner_removes_prefixed_docstring() {
    let src = "def f():\n    r\"\"\"raw\"\"\"\n    pass";
    assert_eq!(stage1_comments::strip_scanner(src), "def f():\n    \n    pass");
}

#[test]
fn test_s1_scanner_keeps_triple_value() {
    let src = "x = \"\"\"a # b\"\"\"  # c";
    assert_eq!(stage1_comments::strip_scanner(src), "x = \"\"\"a # b\"\"\"");
}

#[test]
fn test_s1_scanner_keeps_triple_argument() {
    let src = "f(\n    '''arg'''\n)";
    assert_eq!(stage1_comments::strip_scanner(src), src);
}

#[test]
fn test_s1_scanner_no_comments_unchanged() {
    let src = "a = [1, 2]\nb = {'k': a}";
    assert_eq!(stage1_comments::strip_scanner(src), src);
}

#[test]
fn test_s1_scanner_empty() {
    assert_eq!(stage1_comments::strip_scanner(""), "");
    assert_eq!(stage1_comments::strip_quote_parity(""), "");
}

// ========== Stage 2: keyword ==========

#[test]
fn test_s2_keyword_placeholder_dedents() {
    let r = keyword("def f():\npass");
    assert_eq!(r.lines[0], LogicalLine::new("def f():", 0));
    // one unit below the body level the `def` opened
    assert_eq!(r.lines[1], LogicalLine::new("pass", 0));
    assert!(r.notes.is_empty());
}

#[test]
fn test_s2_keyword_depth_returns_after_block() {
    let r = keyword("def f():\n    x = 1\n    pass\ny = 2");
    assert_eq!(r.text().as_str(), "def f():\n    x = 1\npass\ny = 2");
}

#[test]
fn test_s2_keyword_nesting() {
    let r = keyword("class A:\ndef f(self):\nreturn 1");
    assert_eq!(r.text().as_str(), "class A:\n    def f(self):\n        return 1");
}

#[test]
fn test_s2_keyword_drops_blank_lines() {
    let r = keyword("x = 1\n\n   \ny = 2");
    assert_eq!(r.text().as_str(), "x = 1\ny = 2");
}

#[test]
fn test_s2_keyword_underflow_reported() {
    let r = keyword("pass\nx = 1");
    assert_eq!(r.notes, vec![IndentNote::Underflow { line: 1 }]);
    assert_eq!(r.text().as_str(), "pass\nx = 1");
}

#[test]
fn test_s2_keyword_bare_except_not_a_block() {
    let r = keyword("try:\nx()\nexcept:\ny()");
    assert_eq!(r.text().as_str(), "try:\n    x()\n    except:\n    y()");
}

#[test]
fn test_s2_keyword_custom_width() {
    let cfg = IndentConfig { unit_width: 2, ..kw() };
    let r = stage2_indent::reindent("if x:\ny = 1", &cfg);
    assert_eq!(r.text().as_str(), "if x:\n  y = 1");
}

// ========== Stage 2: structural ==========

#[test]
fn test_s2_structural_nested_blocks() {
    let src = "class A:\n    def f(self):\n        x = [1,\n             2]\n        return x\n\n    def g(self):\n      return 1";
    let r = structural(src);
    assert_eq!(
        r.text().as_str(),
        "class A:\n    def f(self):\n        x = [1,\n            2]\n        return x\n    def g(self):\n        return 1"
    );
    assert!(r.notes.is_empty());
}

#[test]
fn test_s2_structural_no_placeholder_needed() {
    let r = structural("if a:\n  b = 1\nc = 2");
    assert_eq!(r.text().as_str(), "if a:\n    b = 1\nc = 2");
}

#[test]
fn test_s2_structural_bracket_continuation() {
    let r = structural("x = foo(1,\n        2)\ny = 3");
    assert_eq!(r.text().as_str(), "x = foo(1,\n    2)\ny = 3");
}

#[test]
fn test_s2_structural_backslash_continuation() {
    let r = structural("x = 1 + \\\n      2\ny = 3");
    assert_eq!(r.text().as_str(), "x = 1 + \\\n    2\ny = 3");
}

#[test]
fn test_s2_structural_string_lines_verbatim() {
    let r = structural("s = \"\"\"a\n   b\"\"\"\nt = 1");
    assert_eq!(r.text().as_str(), "s = \"\"\"a\n   b\"\"\"\nt = 1");
}

#[test]
fn test_s2_structural_inconsistent_dedent() {
    let r = structural("if x:\n        a = 1\n    b = 2");
    assert_eq!(r.notes, vec![IndentNote::InconsistentDedent { line: 3 }]);
    assert_eq!(r.text().as_str(), "if x:\n    a = 1\n    b = 2");
}

#[test]
fn test_s2_structural_indented_snippet() {
    let r = structural("    def m(self):\n        return 1");
    assert_eq!(r.text().as_str(), "def m(self):\n    return 1");
}

#[test]
fn test_s2_structural_tabs() {
    let r = structural("if x:\n\ty = 1");
    assert_eq!(r.text().as_str(), "if x:\n    y = 1");
}

#[test]
fn test_s2_structural_empty() {
    assert!(structural("").lines.is_empty());
    assert!(structural("\n\n  \n").lines.is_empty());
}

// ========== Stage 3: whitespace ==========

#[test]
fn test_s3_collapse_basic() {
    assert_eq!(
        stage3_whitespace::collapse("def add(a, b):\n    return a + b"),
        "def add(a,b):return a + b"
    );
}

#[test]
fn test_s3_collapse_dict() {
    assert_eq!(stage3_whitespace::collapse("{ 'a' : 1 ,\n\t'b' : 2 }"), "{'a':1,'b':2}");
}

#[test]
fn test_s3_collapse_idempotent() {
    let inputs = [
        "def f(x):\n    return  x",
        "a , , b",
        "  lead and trail  ",
        "x = {1 : (2, 3)}\n\n\ny\t=\t4",
    ];
    for input in inputs {
        let once = stage3_whitespace::collapse(input);
        assert_eq!(stage3_whitespace::collapse(&once), once, "input: {input:?}");
    }
}

#[test]
fn test_s3_custom_punctuation() {
    let c = Collapser::new("=").unwrap();
    assert_eq!(c.collapse("x = 1,  y"), "x=1, y");
}

#[test]
fn test_s3_empty_punctuation() {
    let c = Collapser::new("").unwrap();
    assert_eq!(c.collapse("a ,  b"), "a , b");
}

#[test]
fn test_s3_empty() {
    assert_eq!(stage3_whitespace::collapse(""), "");
}

// ========== Stage 4: validation ==========

#[test]
fn test_s4_valid() {
    let v = PythonValidator::new();
    assert_eq!(v.validate(&"def add(a,b):return a + b".into()), ValidationResult::Valid);
    assert_eq!(v.language(), "python");
}

#[test]
fn test_s4_empty_is_valid() {
    assert!(PythonValidator::new().validate(&"".into()).is_valid());
}

#[test]
fn test_s4_invalid_has_position() {
    match PythonValidator::new().validate(&"def f(:".into()) {
        ValidationResult::Invalid { diagnostic } => {
            assert_eq!(diagnostic.line, Some(1));
            assert!(diagnostic.column.is_some());
        }
        ValidationResult::Valid => panic!("expected invalid"),
    }
}

#[test]
fn test_s4_two_statements_on_one_line_invalid() {
    assert!(!PythonValidator::new().validate(&"def f():x = 1 return x".into()).is_valid());
}

fn rejection(text: &str) -> Option<SyntaxDiagnostic> {
    match PythonValidator::new().validate(&text.into()) {
        ValidationResult::Invalid { diagnostic } => Some(diagnostic),
        ValidationResult::Valid => None,
    }
}

#[test]
fn test_s4_python2_statements_invalid() {
    let d = rejection("print 'a'").expect("print statement must be rejected");
    assert!(d.message.contains("print"));
    assert_eq!((d.line, d.column), (Some(1), Some(1)));
    assert!(rejection("exec 'x=1'").is_some());
    assert!(rejection("def f(x):print x").is_some());
    assert!(rejection("def f((a, b)):return a").is_some());

    assert!(rejection("print('a')").is_none());
    assert!(rejection("exec(code)").is_none());
}

#[test]
fn test_s4_non_default_after_default_invalid() {
    let d = rejection("def f(a=1, b):return a").expect("parameter order must be rejected");
    assert!(d.message.contains("default"));
    assert_eq!(d.column, Some(12));
    assert!(rejection("def f(a: int = 1, b: int):return a").is_some());
    assert!(rejection("def f(a=1, /, b):return a").is_some());
    assert!(rejection("g = lambda a=1, b: a").is_some());
}

#[test]
fn test_s4_keyword_only_after_default_valid() {
    for text in [
        "def f(a, b=2):return a",
        "def f(a=1, *, b):return a",
        "def f(a=1, *args, b):return a",
        "def f(a=1, *args: int, b):return a",
        "def f(a, /, b=1, **kw):return a",
        "g = lambda a, b=1: a",
    ] {
        assert!(rejection(text).is_none(), "should be valid: {text}");
    }
}

// ========== Pipeline ==========

#[test]
fn test_pipeline_end_to_end() {
    let src = SourceText::from("def add(a, b):\n    # adds two numbers\n    return a + b\n");
    let artifact = transform(&src).unwrap();
    assert_eq!(artifact.text().as_str(), "def add(a,b):return a + b");
    assert!(artifact.validation().is_valid());
    assert!(artifact.notes().is_empty());
}

#[test]
fn test_pipeline_end_to_end_keyword_strategy() {
    let mut config = CodeslimConfig::default();
    config.indent.strategy = IndentStrategy::Keyword;
    config.comments.strategy = CommentStrategy::QuoteParity;
    let p = Pipeline::new(&config).unwrap();
    let src = SourceText::from("def add(a, b):\n    # adds two numbers\n    return a + b\n");
    assert_eq!(p.transform(&src).unwrap().text().as_str(), "def add(a,b):return a + b");
}

#[test]
fn test_pipeline_rejects_invalid_output() {
    let src = SourceText::from("def f():\n    x = 1\n    return x\n");
    let err = transform(&src).unwrap_err();
    assert!(matches!(err, CodeslimError::OptimizationFailed { .. }));
    assert!(err.diagnostic().is_some());
}

#[test]
fn test_pipeline_rejects_text_python3_cannot_parse() {
    for src in ["print 'a'\n", "def f(a=1, b):\n    return a\n"] {
        let err = transform(&src.into()).unwrap_err();
        assert!(
            matches!(err, CodeslimError::OptimizationFailed { .. }),
            "input: {src:?}"
        );
    }
}

#[test]
fn test_pipeline_output_always_validates() {
    let inputs = [
        "x = 1  # one",
        "class A:\n    pass  # nothing",
        "def f(a, b):\n    \"\"\"Doc.\"\"\"\n    return (a, b)",
        "def f():\n    x = 1\n    return x",
        "if x:\n    y = 1\nelse:\n    y = 2",
        "print('# not a comment')",
    ];
    let p = Pipeline::default();
    for input in inputs {
        if let Ok(artifact) = p.transform(&input.into()) {
            assert!(p.validate(artifact.text()).is_valid(), "input: {input:?}");
        }
    }
}

#[test]
fn test_pipeline_class_placeholder() {
    let artifact = transform(&"class A:\n    pass  # nothing\n".into()).unwrap();
    assert_eq!(artifact.text().as_str(), "class A:pass");
}

#[test]
fn test_pipeline_hash_in_string_survives() {
    let artifact = transform(&"print('# not a comment')  # real\n".into()).unwrap();
    assert_eq!(artifact.text().as_str(), "print('# not a comment')");
}

#[test]
fn test_pipeline_underflow_note() {
    let mut config = CodeslimConfig::default();
    config.indent.strategy = IndentStrategy::Keyword;
    let artifact = Pipeline::new(&config).unwrap().transform(&"pass".into()).unwrap();
    assert_eq!(artifact.notes(), &[IndentNote::Underflow { line: 1 }]);
}

#[test]
fn test_pipeline_strict_indent_rejects_underflow() {
    let mut config = CodeslimConfig::default();
    config.indent.strategy = IndentStrategy::Keyword;
    config.pipeline.strict_indent = true;
    let err = Pipeline::new(&config).unwrap().transform(&"pass".into()).unwrap_err();
    assert!(matches!(err, CodeslimError::MalformedInput(_)));
}

#[test]
fn test_pipeline_humanize() {
    let p = Pipeline::default();
    let src = SourceText::from("def add(a, b):\n    # adds\n\n    return a + b\n");
    assert_eq!(p.humanize(&src).as_str(), "def add(a, b):\n    return a + b");
}

#[test]
fn test_pipeline_rejects_bad_config() {
    let mut config = CodeslimConfig::default();
    config.indent.unit_width = 0;
    assert!(matches!(Pipeline::new(&config), Err(CodeslimError::Config(_))));
}

struct RejectAll;

impl SyntaxValidator for RejectAll {
    fn validate(&self, _text: &SourceText) -> ValidationResult {
        ValidationResult::invalid(SyntaxDiagnostic::new("rejected").at(1, 1))
    }

    fn language(&self) -> &'static str {
        "none"
    }
}

#[test]
fn test_pipeline_custom_validator() {
    let p = Pipeline::default().with_validator(RejectAll);
    assert_eq!(p.language(), "none");
    let err = p.transform(&"x = 1".into()).unwrap_err();
    assert_eq!(err.diagnostic().unwrap().message, "rejected");
}

#[test]
fn test_pipeline_artifact_serializes() {
    let artifact = transform(&"x = 1".into()).unwrap();
    let json = serde_json::to_value(&artifact).unwrap();
    assert_eq!(json["text"], "x = 1");
    assert_eq!(json["validation"]["status"], "valid");
}

// ========== Extraction ==========

const MODULE: &str = "import os\n\ndef helper():\n    return 1\n\nclass Box:\n    def size(self):\n        return 2\n\n@dec\ndef g():\n    return 3\n";

#[test]
fn test_extract_function() {
    let src = extract_definition(&MODULE.into(), "helper").unwrap();
    assert_eq!(src.as_str(), "def helper():\n    return 1");
}

#[test]
fn test_extract_method_dedented() {
    let src = extract_definition(&MODULE.into(), "size").unwrap();
    assert_eq!(src.as_str(), "def size(self):\n    return 2");
}

#[test]
fn test_extract_class() {
    let src = extract_definition(&MODULE.into(), "Box").unwrap();
    assert!(src.as_str().starts_with("class Box:"));
    assert!(src.as_str().contains("def size(self):"));
}

#[test]
fn test_extract_skips_decorators() {
    let src = extract_definition(&MODULE.into(), "g").unwrap();
    assert_eq!(src.as_str(), "def g():\n    return 3");
}

#[test]
fn test_extract_missing() {
    let err = extract_definition(&MODULE.into(), "nope").unwrap_err();
    assert!(matches!(err, CodeslimError::DefinitionNotFound { name } if name == "nope"));
}

#[test]
fn test_extract_then_transform() {
    let src = extract_definition(&MODULE.into(), "size").unwrap();
    assert_eq!(transform(&src).unwrap().text().as_str(), "def size(self):return 2");
}
