//! Round-trip properties of the tokenizer
//!
//! The token stream is the single source of truth for the original text:
//! concatenating every token's text in order must reproduce the input
//! byte-for-byte, for any input at all, because lexing never discards or
//! normalizes anything.

use jstyle::{tokenize, LexerMode, TokenKind};
use proptest::prelude::*;

#[test]
fn simple_statement_token_sequence() {
    let (stream, mode) = tokenize("x = 1;\n");
    assert_eq!(mode, LexerMode::Text);

    let tokens: Vec<_> = stream
        .ids()
        .map(|id| (stream.get(id).kind, stream.get(id).text.clone()))
        .collect();

    // An identifier, whitespace, `=`, whitespace, a number, a semicolon,
    // and the trailing newline. The identifier is lexed as a simple
    // lvalue because an assignment follows it.
    assert_eq!(tokens.len(), 7);
    assert!(matches!(
        tokens[0].0,
        TokenKind::Identifier | TokenKind::SimpleLvalue
    ));
    assert_eq!(tokens[0].1, "x");
    assert_eq!(tokens[1], (TokenKind::Whitespace, " ".to_string()));
    assert_eq!(tokens[2], (TokenKind::Operator, "=".to_string()));
    assert_eq!(tokens[3], (TokenKind::Whitespace, " ".to_string()));
    assert_eq!(tokens[4], (TokenKind::Number, "1".to_string()));
    assert_eq!(tokens[5], (TokenKind::Semicolon, ";".to_string()));
    assert_eq!(tokens[6], (TokenKind::Whitespace, "\n".to_string()));
}

#[test]
fn kind_sequence_snapshot() {
    let (stream, _) = tokenize("x = 1;\n");
    let kinds: Vec<String> = stream
        .ids()
        .map(|id| format!("{:?}", stream.get(id).kind))
        .collect();
    insta::assert_snapshot!(
        kinds.join(" "),
        @"SimpleLvalue Whitespace Operator Whitespace Number Semicolon Whitespace"
    );
}

#[test]
fn unterminated_block_comment_reports_its_mode() {
    let (_, mode) = tokenize("/* never closed");
    assert_eq!(mode, LexerMode::BlockComment);
}

#[test]
fn representative_sources_round_trip() {
    let sources = [
        "var x = 1;\n",
        "// line comment\nif (a && b) {\n  c = 'str\\'ing';\n}\n",
        "/**\n * @param {Array<ns.Item>} items\n */\nfunction f(items) {}\n",
        "x = /re[g]ex/g;\ny = a / b / c;\n",
        "switch (v) {\n  case 1:\n    break;\n  default:\n    break;\n}\n",
        "for (var i = 0; i < 10; i++) {\n  s += `template\nstring`;\n}\n",
        "weird \u{1F600} unicode \t\t and \\ stray # bytes",
        "no trailing newline",
        "",
        "\n\n\n",
    ];
    for source in sources {
        let (stream, _) = tokenize(source);
        assert_eq!(stream.source_text(), source, "round trip for {source:?}");
    }
}

proptest! {
    // Lexing never fails and never loses a byte, whatever the input.
    #[test]
    fn arbitrary_input_round_trips(source in any::<String>()) {
        let (stream, _) = tokenize(&source);
        prop_assert_eq!(stream.source_text(), source);
    }

    // JavaScript-shaped input round-trips too, and ends in text mode when
    // all constructs are closed.
    #[test]
    fn jsish_input_round_trips(
        fragments in proptest::collection::vec(
            prop_oneof![
                Just("var x = 1;\n".to_string()),
                Just("if (a) {\n  b();\n}\n".to_string()),
                Just("// comment\n".to_string()),
                Just("/* block */\n".to_string()),
                Just("s = 'text';\n".to_string()),
                Just("f(1, [2, 3], {k: 4});\n".to_string()),
            ],
            0..8,
        )
    ) {
        let source: String = fragments.concat();
        let (stream, mode) = tokenize(&source);
        prop_assert_eq!(stream.source_text(), source);
        prop_assert_eq!(mode, LexerMode::Text);
    }
}
