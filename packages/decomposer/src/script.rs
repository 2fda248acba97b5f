//! # Script Splitting
//!
//! Splits inline script text into top-level function declarations and the
//! remaining global code, using a token scan instead of pattern matching on
//! raw text. Strings, template literals and comments are lexed as units, so
//! braces inside them do not disturb nesting.
//!
//! Regular-expression literals are not recognised; a brace inside one can
//! still throw the depth count off. That is the accepted accuracy limit of a
//! scan that stops short of a real parser.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum Token {
    #[token("function")]
    Function,

    #[token("async")]
    Async,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semi,

    #[token("*")]
    Star,

    #[token("=>")]
    Arrow,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    #[regex(r"`([^`\\]|\\.)*`")]
    Str,

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,
}

/// A token kind, with unrecognised input collapsed into `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Tok(Token),
    Other,
}

#[derive(Debug, Clone)]
struct Lexeme {
    kind: Kind,
    span: Range<usize>,
    /// A line break sits between this lexeme and the previous one
    newline_before: bool,
}

fn lex(source: &str) -> Vec<Lexeme> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    let mut previous_end = 0;
    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(token) => Kind::Tok(token),
            Err(()) => Kind::Other,
        };
        let span = lexer.span();
        let newline_before = source[previous_end..span.start].contains('\n');
        previous_end = span.end;
        lexemes.push(Lexeme {
            kind,
            span,
            newline_before,
        });
    }
    lexemes
}

fn is(lexemes: &[Lexeme], index: usize, token: Token) -> bool {
    lexemes.get(index).map(|l| l.kind) == Some(Kind::Tok(token))
}

/// Index of the token closing the bracket opened at `open`
fn matching_close(lexemes: &[Lexeme], open: usize) -> Option<usize> {
    let (opener, closer) = match lexemes.get(open)?.kind {
        Kind::Tok(Token::LBrace) => (Token::LBrace, Token::RBrace),
        Kind::Tok(Token::LParen) => (Token::LParen, Token::RParen),
        Kind::Tok(Token::LBracket) => (Token::LBracket, Token::RBracket),
        _ => return None,
    };

    let mut depth = 0usize;
    for (index, lexeme) in lexemes.iter().enumerate().skip(open) {
        if lexeme.kind == Kind::Tok(opener) {
            depth += 1;
        } else if lexeme.kind == Kind::Tok(closer) {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// A top-level function declaration found in a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub code: String,
}

/// Result of splitting one script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptParts {
    pub functions: Vec<FunctionDecl>,
    /// Global code left after removing the declarations
    pub remainder: String,
}

/// Split a script into function declarations and remaining global code
///
/// A single top-level IIFE wrapper is unwrapped first, since generated
/// documents always wrap all script code in one.
pub fn split_script(source: &str) -> ScriptParts {
    let source = unwrap_iife(source).unwrap_or(source);
    let lexemes = lex(source);

    let mut functions = Vec::new();
    let mut removed: Vec<Range<usize>> = Vec::new();
    let mut depth = 0usize;
    let mut statement_start = true;
    let mut index = 0;

    while index < lexemes.len() {
        if depth == 0 && (statement_start || starts_line(source, &lexemes, index)) {
            if let Some((decl, end)) = declaration_at(source, &lexemes, index) {
                removed.push(lexemes[index].span.start..lexemes[end].span.end);
                functions.push(decl);
                index = end + 1;
                continue;
            }
        }

        match lexemes[index].kind {
            Kind::Tok(Token::LBrace | Token::LParen | Token::LBracket) => {
                depth += 1;
                statement_start = false;
            }
            Kind::Tok(Token::RBrace) => {
                depth = depth.saturating_sub(1);
                statement_start = depth == 0;
            }
            Kind::Tok(Token::RParen | Token::RBracket) => {
                depth = depth.saturating_sub(1);
                statement_start = false;
            }
            Kind::Tok(Token::Semi) => statement_start = depth == 0,
            _ => statement_start = false,
        }
        index += 1;
    }

    let mut remainder = String::with_capacity(source.len());
    let mut cursor = 0;
    for range in &removed {
        remainder.push_str(&source[cursor..range.start]);
        cursor = range.end;
    }
    remainder.push_str(&source[cursor..]);

    ScriptParts {
        functions,
        remainder: tidy(&remainder),
    }
}

/// Words after which a following line still continues the expression
const CONTINUING_WORDS: &[&str] = &[
    "await", "case", "delete", "extends", "in", "instanceof", "new", "of", "typeof", "void", "yield",
];

/// A lexeme that opens a new line after a complete expression
///
/// Covers scripts that rely on automatic semicolon insertion. A line break
/// does not end the statement when the previous token expects an operand.
fn starts_line(source: &str, lexemes: &[Lexeme], index: usize) -> bool {
    let Some(previous) = index.checked_sub(1).and_then(|i| lexemes.get(i)) else {
        return true;
    };
    if !lexemes[index].newline_before {
        return false;
    }

    let text = &source[previous.span.clone()];
    match previous.kind {
        Kind::Tok(Token::LParen | Token::LBracket | Token::LBrace | Token::Star | Token::Arrow) => false,
        Kind::Tok(Token::Ident) => !CONTINUING_WORDS.contains(&text),
        Kind::Other => {
            // Postfix increment and decrement complete an expression
            let before = &source[..previous.span.end];
            before.ends_with("++") || before.ends_with("--") || !text.chars().all(is_operator_char)
        }
        _ => true,
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '=' | ',' | '+' | '-' | '!' | '?' | ':' | '|' | '&' | '<' | '>' | '.' | '%' | '^' | '~' | '/'
    )
}

/// `[async] function [*] name (...) {...}` starting at `start`
fn declaration_at(source: &str, lexemes: &[Lexeme], start: usize) -> Option<(FunctionDecl, usize)> {
    let mut cursor = start;
    if is(lexemes, cursor, Token::Async) {
        cursor += 1;
    }
    if !is(lexemes, cursor, Token::Function) {
        return None;
    }
    cursor += 1;
    if is(lexemes, cursor, Token::Star) {
        cursor += 1;
    }
    if !is(lexemes, cursor, Token::Ident) {
        return None;
    }
    let name = source[lexemes[cursor].span.clone()].to_string();
    cursor += 1;

    if !is(lexemes, cursor, Token::LParen) {
        return None;
    }
    cursor = matching_close(lexemes, cursor)? + 1;
    if !is(lexemes, cursor, Token::LBrace) {
        return None;
    }
    let end = matching_close(lexemes, cursor)?;

    let code = source[lexemes[start].span.start..lexemes[end].span.end].to_string();
    Some((FunctionDecl { name, code }, end))
}

/// Body of a script consisting of exactly one IIFE
///
/// Recognises `(function () {...})();`, `(function () {...}());` and
/// `(() => {...})();`, with or without the trailing semicolon.
pub fn unwrap_iife(source: &str) -> Option<&str> {
    let lexemes = lex(source);
    if !is(&lexemes, 0, Token::LParen) {
        return None;
    }

    let body_open = if is(&lexemes, 1, Token::Function) {
        let mut cursor = 2;
        if is(&lexemes, cursor, Token::Ident) {
            cursor += 1;
        }
        if !is(&lexemes, cursor, Token::LParen) || !is(&lexemes, cursor + 1, Token::RParen) {
            return None;
        }
        cursor + 2
    } else if is(&lexemes, 1, Token::LParen)
        && is(&lexemes, 2, Token::RParen)
        && is(&lexemes, 3, Token::Arrow)
    {
        4
    } else {
        return None;
    };

    if !is(&lexemes, body_open, Token::LBrace) {
        return None;
    }
    let body_close = matching_close(&lexemes, body_open)?;

    let tail: Vec<Kind> = lexemes[body_close + 1..].iter().map(|l| l.kind).collect();
    let call_outside = [Token::RParen, Token::LParen, Token::RParen];
    let call_inside = [Token::LParen, Token::RParen, Token::RParen];
    let matches_tail = |expected: &[Token]| {
        let expected: Vec<Kind> = expected.iter().map(|t| Kind::Tok(*t)).collect();
        let with_semi = tail.len() == expected.len() + 1
            && tail[..expected.len()] == expected[..]
            && tail[expected.len()] == Kind::Tok(Token::Semi);
        tail == expected || with_semi
    };
    let arrow = is(&lexemes, 1, Token::LParen);
    if !(matches_tail(&call_outside) || (!arrow && matches_tail(&call_inside))) {
        return None;
    }

    Some(&source[lexemes[body_open].span.end..lexemes[body_close].span.start])
}

/// Trim trailing whitespace per line, drop leading/trailing blank lines and
/// collapse runs of blank lines
fn tidy(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in text.lines() {
        let line = line.trim_end();
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }

    lines.join("\n")
}
