//! Ordered rule tables for every lexer mode
//!
//! Each mode owns a list of rules tried in declared order against the input
//! at the cursor; the first rule whose pattern matches and whose guard
//! accepts wins. This is not longest-match lexing: the order encodes real
//! disambiguation (a regex literal must be tried before the division
//! operator, `/**` before `/*`, `>>>=` before `>>>`), so reordering rules
//! changes lexing outcomes.
//!
//! The source material expressed some of these decisions as regex
//! look-around; those become explicit [`Guard`]s here, evaluated against
//! the line around the match, which keeps the patterns within the regex
//! crate's supported syntax and makes the disambiguation visible.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexing::modes::LexerMode;
use crate::tokens::TokenKind;

/// Extra acceptance checks applied after a pattern matched at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Guard {
    /// The character after the match must not be an identifier character
    /// (the identifier charset includes `$`, which word boundaries miss).
    NotFollowedByIdentChar,
    /// The text after the match must be `=` (after optional spaces) but not
    /// `==`; distinguishes a simple lvalue from a plain identifier.
    FollowedByAssignment,
    /// Regex-literal disambiguation: the match must not open a comment, and
    /// must be followed by a token that can legally follow a regex literal.
    /// Without this, `x / y / z` would lex as `x REGEX(/ y /) z`.
    RegexLiteral,
    /// The character after the match must not be `/` (a star that does not
    /// end a comment).
    NotFollowedBySlash,
    /// The match must sit at line start or after whitespace; keeps
    /// `someone@example.com` in an `@author` line from lexing as a flag.
    PrecededBySpaceOrLineStart,
    /// The match must directly follow `{` (inline doc flags).
    PrecededByOpenBrace,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Tokens that can legally follow a regex literal.
const REGEX_FOLLOWERS: &[&str] = &[";", ",", ".", ")", "]", "//", "/*", ":", "}"];

impl Guard {
    /// Whether the match `line[start..end]` is acceptable in its context.
    pub(crate) fn allows(self, line: &str, start: usize, end: usize) -> bool {
        match self {
            Guard::NotFollowedByIdentChar => {
                line[end..].chars().next().map_or(true, |c| !is_ident_char(c))
            }
            Guard::FollowedByAssignment => {
                let rest = line[end..].trim_start();
                rest.starts_with('=') && !rest.starts_with("==")
            }
            Guard::RegexLiteral => {
                if line[start..end].starts_with("/*") {
                    return false;
                }
                let rest = line[end..].trim_start();
                rest.is_empty() || REGEX_FOLLOWERS.iter().any(|f| rest.starts_with(f))
            }
            Guard::NotFollowedBySlash => line[end..].chars().next() != Some('/'),
            Guard::PrecededBySpaceOrLineStart => {
                line[..start].chars().next_back().map_or(true, |c| c.is_whitespace())
            }
            Guard::PrecededByOpenBrace => line[..start].ends_with('{'),
        }
    }
}

/// One entry of a mode's rule table.
pub(crate) struct LexRule {
    pub pattern: &'static Lazy<Regex>,
    pub kind: TokenKind,
    pub next_mode: Option<LexerMode>,
    /// The rule only applies when the cursor is at column zero.
    pub line_start_only: bool,
    pub guard: Option<Guard>,
}

impl LexRule {
    fn new(pattern: &'static Lazy<Regex>, kind: TokenKind) -> Self {
        LexRule {
            pattern,
            kind,
            next_mode: None,
            line_start_only: false,
            guard: None,
        }
    }

    fn to(mut self, mode: LexerMode) -> Self {
        self.next_mode = Some(mode);
        self
    }

    fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    fn line_start(mut self) -> Self {
        self.line_start_only = true;
        self
    }
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).unwrap());
    };
}

// Text-mode patterns, all anchored at the cursor.
pattern!(START_DOC_COMMENT, r"^/\*\*");
pattern!(START_BLOCK_COMMENT, r"^/\*");
pattern!(EOL_LINE_COMMENT, r"^//$");
pattern!(START_LINE_COMMENT, r"^//");
pattern!(SINGLE_QUOTE, r"^'");
pattern!(DOUBLE_QUOTE, r#"^""#);
pattern!(TEMPLATE_QUOTE, r"^`");
// Body: escapes, ordinary characters, or a bracketed character class (which
// may itself contain an unescaped slash).
pattern!(
    REGEX_LITERAL,
    r"^/(?:\\.|[^\[/\\]|\[(?:[^\]\\]|\\.)*\])*/[gimsx]*"
);
pattern!(START_BLOCK, r"^\{");
pattern!(END_BLOCK, r"^\}");
pattern!(FUNCTION_DECLARATION, r"^function");
pattern!(OPENING_PAREN, r"^\(");
pattern!(CLOSING_PAREN, r"^\)");
pattern!(OPENING_BRACKET, r"^\[");
pattern!(CLOSING_BRACKET, r"^\]");
// Hex first, then mantissa variants in an order that keeps `10.5`, `10.`
// and `.5` whole, with an optional exponent.
pattern!(
    NUMBER,
    r"^(?:0[xX][0-9a-fA-F]+|(?:\d*\.\d+|\d+\.?)(?:[eE][-+]?\d+)?)"
);
// Nested dotted identifiers are one token; trailing dots are not included.
pattern!(
    IDENTIFIER,
    r"^[a-zA-Z_$](?:[A-Za-z0-9_$]|\.[a-zA-Z_$])*"
);
// Operators that are prefixes of longer operators must come later, e.g.
// `>>` after `>>>`.
pattern!(
    OPERATOR,
    r"^(?:,|\+\+|===|!==|>>>=|>>>|==|>=|<=|!=|<<=|>>=|<<|>>|=>|>|<|\+=|\+|--|\^=|-=|-|/=|/|\*=|\*|%=|%|&&|\|\||&=|&|\|=|\||=|!|:|\?|\^|delete\b|in\b|instanceof\b|new\b|typeof\b|void\b|\.)"
);
pattern!(
    KEYWORD,
    r"^(?:break|case|catch|const|continue|default|do|else|finally|for|if|let|return|switch|throw|try|var|while|with)"
);
pattern!(WHITESPACE, r"^\s+");
pattern!(SEMICOLON, r"^;");

// String bodies: anything but the delimiter or a backslash, an escape pair,
// or a lone backslash at end of line (multi-line string continuation).
pattern!(SINGLE_QUOTE_TEXT, r"^(?:[^'\\]|\\.|\\$)+");
pattern!(DOUBLE_QUOTE_TEXT, r#"^(?:[^"\\]|\\.|\\$)+"#);
// Template strings do not need end-of-line escapes to span lines.
pattern!(TEMPLATE_QUOTE_TEXT, r"^[^`]+");

pattern!(END_BLOCK_COMMENT, r"^\*/");
pattern!(BLOCK_COMMENT_TEXT, r"^[^*]+");
pattern!(STAR, r"^\*");

pattern!(DOC_INLINE_FLAG, r"^@[a-zA-Z]+");
// Flags whose payload may contain whitespace-separated parts (a type and a
// parameter name); they switch the machine into the space-lexing variant.
pattern!(
    DOC_FLAG_LEX_SPACES,
    r"^@(?:const|enum|export|extends|final|implements|package|param|private|protected|public|return|type|typedef)\b"
);
pattern!(DOC_FLAG, r"^@[a-zA-Z]+");
pattern!(DOC_TYPE_START, r"^[<(]");
pattern!(DOC_TYPE_END, r"^[>)]");
pattern!(DOC_TYPE_MODIFIERS, r"^[!?|,:=]");
// Anything allowed inside a type definition, except tokens needed to parse
// it.
pattern!(DOC_TYPE_TEXT, r"^[^*|!?=<>(){}:,\s]+");
// The ` * ` prefix that starts every continuation line of a doc comment.
pattern!(DOC_PREFIX_SPACED, r"^\s*\*\s+");
pattern!(DOC_PREFIX_BARE, r"^\s*\*");
// Comment text: `@` is only text when stuck to a preceding non-space
// character (email addresses in `@author` lines), otherwise it starts a
// flag and must not be swallowed here.
pattern!(DOC_COMMENT_TEXT, r"^(?:[^*\{\s]@|[^*\{\}@])+");
pattern!(DOC_COMMENT_NO_SPACES_TEXT, r"^(?:[^*\{\s]@|[^*\{\}@\s])+");

pattern!(ANYTHING, r"^.*");
pattern!(END_PARAMETERS, r"^\)[ \t]*");
pattern!(PARAMETERS, r"^[^)]+");

fn text_rules() -> Vec<LexRule> {
    vec![
        // Strings, comments and regexes first: they can all contain each
        // other's delimiters and must win over operator rules.
        LexRule::new(&START_DOC_COMMENT, TokenKind::StartDocComment).to(LexerMode::DocComment),
        LexRule::new(&START_BLOCK_COMMENT, TokenKind::StartBlockComment)
            .to(LexerMode::BlockComment),
        // `//` as the very last thing on a line never enters comment mode.
        LexRule::new(&EOL_LINE_COMMENT, TokenKind::StartSingleLineComment),
        LexRule::new(&START_LINE_COMMENT, TokenKind::StartSingleLineComment)
            .to(LexerMode::LineComment),
        LexRule::new(&SINGLE_QUOTE, TokenKind::SingleQuoteStringStart)
            .to(LexerMode::SingleQuoteString),
        LexRule::new(&DOUBLE_QUOTE, TokenKind::DoubleQuoteStringStart)
            .to(LexerMode::DoubleQuoteString),
        LexRule::new(&TEMPLATE_QUOTE, TokenKind::TemplateStringStart)
            .to(LexerMode::TemplateString),
        LexRule::new(&REGEX_LITERAL, TokenKind::Regex).guarded(Guard::RegexLiteral),
        LexRule::new(&START_BLOCK, TokenKind::StartBlock),
        LexRule::new(&END_BLOCK, TokenKind::EndBlock),
        // Function declarations switch modes so the parameter list is lexed
        // under its own rules.
        LexRule::new(&FUNCTION_DECLARATION, TokenKind::FunctionDeclaration)
            .to(LexerMode::FunctionHeader)
            .guarded(Guard::NotFollowedByIdentChar),
        LexRule::new(&OPENING_PAREN, TokenKind::StartParen),
        LexRule::new(&CLOSING_PAREN, TokenKind::EndParen),
        LexRule::new(&OPENING_BRACKET, TokenKind::StartBracket),
        LexRule::new(&CLOSING_BRACKET, TokenKind::EndBracket),
        // Numbers before operators: scientific notation contains + and -.
        LexRule::new(&NUMBER, TokenKind::Number),
        LexRule::new(&IDENTIFIER, TokenKind::SimpleLvalue).guarded(Guard::FollowedByAssignment),
        LexRule::new(&OPERATOR, TokenKind::Operator),
        LexRule::new(&KEYWORD, TokenKind::Keyword).guarded(Guard::NotFollowedByIdentChar),
        LexRule::new(&WHITESPACE, TokenKind::Whitespace),
        LexRule::new(&IDENTIFIER, TokenKind::Identifier),
        LexRule::new(&SEMICOLON, TokenKind::Semicolon),
    ]
}

fn common_doc_rules() -> Vec<LexRule> {
    vec![
        LexRule::new(&END_BLOCK_COMMENT, TokenKind::EndDocComment).to(LexerMode::Text),
        LexRule::new(&DOC_INLINE_FLAG, TokenKind::DocInlineFlag)
            .guarded(Guard::PrecededByOpenBrace),
        LexRule::new(&DOC_FLAG_LEX_SPACES, TokenKind::DocFlag)
            .to(LexerMode::DocCommentLexSpaces)
            .guarded(Guard::PrecededBySpaceOrLineStart),
        // Any other flag leaves space-lexing mode again.
        LexRule::new(&DOC_FLAG, TokenKind::DocFlag)
            .to(LexerMode::DocComment)
            .guarded(Guard::PrecededBySpaceOrLineStart),
        LexRule::new(&START_BLOCK, TokenKind::DocStartBrace),
        LexRule::new(&END_BLOCK, TokenKind::DocEndBrace),
        LexRule::new(&DOC_TYPE_START, TokenKind::DocTypeStartBlock),
        LexRule::new(&DOC_TYPE_END, TokenKind::DocTypeEndBlock),
        LexRule::new(&DOC_TYPE_MODIFIERS, TokenKind::DocTypeModifier),
        LexRule::new(&DOC_TYPE_TEXT, TokenKind::Comment),
        LexRule::new(&DOC_PREFIX_SPACED, TokenKind::DocPrefix).line_start(),
        LexRule::new(&DOC_PREFIX_BARE, TokenKind::DocPrefix)
            .line_start()
            .guarded(Guard::NotFollowedBySlash),
    ]
}

static TEXT_RULES: Lazy<Vec<LexRule>> = Lazy::new(text_rules);

static SINGLE_QUOTE_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        LexRule::new(&SINGLE_QUOTE_TEXT, TokenKind::StringText),
        LexRule::new(&SINGLE_QUOTE, TokenKind::SingleQuoteStringEnd).to(LexerMode::Text),
    ]
});

static DOUBLE_QUOTE_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        LexRule::new(&DOUBLE_QUOTE_TEXT, TokenKind::StringText),
        LexRule::new(&DOUBLE_QUOTE, TokenKind::DoubleQuoteStringEnd).to(LexerMode::Text),
    ]
});

static TEMPLATE_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        LexRule::new(&TEMPLATE_QUOTE_TEXT, TokenKind::StringText),
        LexRule::new(&TEMPLATE_QUOTE, TokenKind::TemplateStringEnd).to(LexerMode::Text),
    ]
});

static BLOCK_COMMENT_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        LexRule::new(&END_BLOCK_COMMENT, TokenKind::EndBlockComment).to(LexerMode::Text),
        LexRule::new(&BLOCK_COMMENT_TEXT, TokenKind::Comment),
        LexRule::new(&STAR, TokenKind::Comment).guarded(Guard::NotFollowedBySlash),
    ]
});

static DOC_COMMENT_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    let mut rules = common_doc_rules();
    rules.push(LexRule::new(&DOC_COMMENT_TEXT, TokenKind::Comment));
    rules
});

static DOC_COMMENT_LEX_SPACES_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    let mut rules = common_doc_rules();
    rules.push(LexRule::new(&WHITESPACE, TokenKind::Comment));
    rules.push(LexRule::new(&DOC_COMMENT_NO_SPACES_TEXT, TokenKind::Comment));
    rules
});

static LINE_COMMENT_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    // Greedy match to the end of the line, then back to code.
    vec![LexRule::new(&ANYTHING, TokenKind::Comment).to(LexerMode::Text)]
});

static FUNCTION_HEADER_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        // The open paren must be matched before anything else, otherwise
        // the parameter list is tokenized as ordinary code.
        LexRule::new(&OPENING_PAREN, TokenKind::StartParameters).to(LexerMode::ParameterList),
        LexRule::new(&WHITESPACE, TokenKind::Whitespace),
        LexRule::new(&IDENTIFIER, TokenKind::FunctionName),
    ]
});

static PARAMETER_RULES: Lazy<Vec<LexRule>> = Lazy::new(|| {
    vec![
        LexRule::new(&END_PARAMETERS, TokenKind::EndParameters).to(LexerMode::Text),
        LexRule::new(&PARAMETERS, TokenKind::Parameters),
    ]
});

/// The ordered rule table for a mode.
pub(crate) fn rules_for(mode: LexerMode) -> &'static [LexRule] {
    match mode {
        LexerMode::Text => &TEXT_RULES,
        LexerMode::SingleQuoteString => &SINGLE_QUOTE_RULES,
        LexerMode::DoubleQuoteString => &DOUBLE_QUOTE_RULES,
        LexerMode::TemplateString => &TEMPLATE_RULES,
        LexerMode::BlockComment => &BLOCK_COMMENT_RULES,
        LexerMode::DocComment => &DOC_COMMENT_RULES,
        LexerMode::DocCommentLexSpaces => &DOC_COMMENT_LEX_SPACES_RULES,
        LexerMode::LineComment => &LINE_COMMENT_RULES,
        LexerMode::FunctionHeader => &FUNCTION_HEADER_RULES,
        LexerMode::ParameterList => &PARAMETER_RULES,
    }
}
