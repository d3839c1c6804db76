//! Tokenizer für SII-Text: Wörter, Strings, Satzzeichen; Kommentare werden verworfen.

use anyhow::{bail, Result};
use logos::Logos;

/// Ein lexikalisches Token mit Zeilennummer (1-basiert).
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum TokenKind {
    /// Unquotiertes Wort: Bezeichner, Unit-Namen, Zahlen, Tokens
    Word(String),
    /// Quotierter String inkl. Anführungszeichen
    Quoted(String),
    /// Eines von `: { } ( ) [ ] , ;`
    Symbol(char),
}

/// Rohes logos-Token; leiht aus dem Quelltext und wird danach in [`TokenKind`] überführt.
///
/// Ein Wort endet an Leerraum, Satzzeichen, `"` und Kommentaranfängen.
/// Ein `/` innerhalb eines Worts (Pfade) ist erlaubt, `//` und `/*` nicht.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"\s+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum RawToken {
    #[regex(r"[:{}()\[\],;]")]
    Symbol,

    #[regex(r##""([^"\\\n]|\\[^\n])*""##)]
    Quoted,

    #[regex(r##"([^\s:{}()\[\],;"#/]|/[^\s:{}()\[\],;"#/*])+"##)]
    Word,

    #[token("/")]
    Slash,
}

/// Zerlegt den Text in Tokens.
pub(super) fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut counted = 0usize;

    for (raw, span) in RawToken::lexer(text).spanned() {
        // Zeilennummer aus dem Span, inklusive übersprungener Kommentare
        line += text[counted..span.start].matches('\n').count();
        counted = span.start;
        let slice = &text[span.clone()];

        let kind = match raw {
            Ok(RawToken::Symbol) => match slice.chars().next() {
                Some(c) => TokenKind::Symbol(c),
                None => continue,
            },
            Ok(RawToken::Quoted) => TokenKind::Quoted(slice.to_string()),
            Ok(RawToken::Word) => TokenKind::Word(slice.to_string()),
            Ok(RawToken::Slash) => {
                // Ein geschlossener Blockkommentar wäre übersprungen worden
                if text[span.end..].starts_with('*') {
                    bail!("Zeile {}: Blockkommentar nicht geschlossen", line);
                }
                TokenKind::Word(slice.to_string())
            }
            Err(()) => {
                let rest = &text[span.start..];
                if rest.starts_with('"') {
                    bail!("Zeile {}: String nicht geschlossen", line);
                }
                let c = rest.chars().next().unwrap_or_default();
                bail!("Zeile {}: unerwartetes Zeichen '{}'", line, c);
            }
        };
        tokens.push(Token { kind, line });
    }

    Ok(tokens)
}
