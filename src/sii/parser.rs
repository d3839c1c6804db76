//! Parser für die benötigte Teilmenge des SII-Textformats.
//!
//! Unterstützt:
//! - optionalen `SiiNunit { ... }`-Rahmen
//! - Unit-Blöcke `klasse : name { ... }`
//! - Attribute `key: wert`, `key[]: wert` (anhängen), `key[N]: wert` (indiziert)
//! - Array-Größenangaben `key: N`, die von nachfolgenden Einträgen ersetzt werden
//! - Werte: Strings, Zahlen (auch `&xxxxxxxx`-Hex-Floats), Tupel, Tokens
//! - `@include "datei.sui"` relativ zur einbindenden Datei

mod lexer;

use anyhow::{anyhow, bail, Context, Result};
use glam::{Vec2, Vec3};
use indexmap::IndexMap;

use super::{AttributeValue, DefinitionFile, Unit};
use crate::fs::{join_paths, parent_dir, FileSystem};
use lexer::{Token, TokenKind};

/// Maximale Verschachtelungstiefe von `@include`.
const MAX_INCLUDE_DEPTH: usize = 16;

/// Low-Level-Parser: Bytes → [`DefinitionFile`].
///
/// `fs` wird nur für eingebundene Dateien benötigt.
pub trait DefinitionParser: Send + Sync {
    /// Parsed den Inhalt der Datei `path`.
    fn parse(&self, path: &str, data: &[u8], fs: &dyn FileSystem) -> Result<DefinitionFile>;
}

/// Standard-Parser für SII-Textdateien.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiiTextParser;

impl DefinitionParser for SiiTextParser {
    fn parse(&self, path: &str, data: &[u8], fs: &dyn FileSystem) -> Result<DefinitionFile> {
        let text = decode_text(data).with_context(|| format!("Kein gültiger Text: {}", path))?;
        let expanded = expand_includes(text, path, fs, 0)?;
        parse_sii_text(path, &expanded)
    }
}

/// Parsed SII-Text ohne `@include`-Auflösung.
pub fn parse_sii_text(path: &str, text: &str) -> Result<DefinitionFile> {
    let tokens = lexer::tokenize(text).with_context(|| format!("Tokenizer-Fehler in {}", path))?;
    let mut cursor = Cursor::new(&tokens);
    let mut units = Vec::new();

    let framed = cursor.peek_word() == Some("SiiNunit");
    if framed {
        cursor.next();
        cursor.expect_symbol('{')?;
    }

    loop {
        match cursor.peek() {
            None => {
                if framed {
                    bail!("SiiNunit-Block nicht geschlossen");
                }
                break;
            }
            Some(TokenKind::Symbol('}')) if framed => {
                cursor.next();
                break;
            }
            _ => units.push(parse_unit(&mut cursor)?),
        }
    }

    if let Some(token) = cursor.peek_token() {
        bail!("Zeile {}: unerwarteter Inhalt nach Dateiende", token.line);
    }

    Ok(DefinitionFile {
        path: path.to_string(),
        units,
    })
}

/// Entfernt ein UTF-8-BOM und prüft auf gültiges UTF-8.
fn decode_text(data: &[u8]) -> Result<&str> {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    Ok(std::str::from_utf8(data)?)
}

/// Ersetzt `@include`-Zeilen rekursiv durch den Inhalt der eingebundenen Datei.
fn expand_includes(text: &str, path: &str, fs: &dyn FileSystem, depth: usize) -> Result<String> {
    if depth > MAX_INCLUDE_DEPTH {
        bail!("@include zu tief verschachtelt ab {}", path);
    }

    let mut output = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("@include") else {
            output.push_str(line);
            output.push('\n');
            continue;
        };

        let target = rest.trim().trim_matches('"');
        if target.is_empty() {
            bail!("Leeres @include in {}", path);
        }
        let include_path = join_paths(&parent_dir(path), target);
        let data = fs
            .open(&include_path)
            .with_context(|| format!("@include aus {} nicht lesbar", path))?;
        let included = decode_text(&data)
            .with_context(|| format!("Kein gültiger Text: {}", include_path))?;
        output.push_str(&expand_includes(included, &include_path, fs, depth + 1)?);
        output.push('\n');
    }
    Ok(output)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek_token(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> Option<&'a TokenKind> {
        self.peek_token().map(|t| &t.kind)
    }

    fn peek_word(&self) -> Option<&'a str> {
        match self.peek() {
            Some(TokenKind::Word(w)) => Some(w),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn line(&self) -> usize {
        self.peek_token()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<()> {
        let line = self.line();
        match self.next().map(|t| &t.kind) {
            Some(TokenKind::Symbol(c)) if *c == symbol => Ok(()),
            Some(other) => bail!("Zeile {}: '{}' erwartet, {:?} gefunden", line, symbol, other),
            None => bail!("Zeile {}: '{}' erwartet, Dateiende gefunden", line, symbol),
        }
    }

    fn expect_word(&mut self, what: &str) -> Result<&'a str> {
        let line = self.line();
        match self.next().map(|t| &t.kind) {
            Some(TokenKind::Word(w)) => Ok(w),
            Some(other) => bail!("Zeile {}: {} erwartet, {:?} gefunden", line, what, other),
            None => bail!("Zeile {}: {} erwartet, Dateiende gefunden", line, what),
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if matches!(self.peek(), Some(TokenKind::Symbol(c)) if *c == symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

fn parse_unit(cursor: &mut Cursor<'_>) -> Result<Unit> {
    let class = cursor.expect_word("Unit-Klasse")?.to_string();
    cursor.expect_symbol(':')?;
    let name = cursor.expect_word("Unit-Name")?.to_string();
    cursor.expect_symbol('{')?;

    let mut attributes: IndexMap<String, AttributeValue> = IndexMap::new();
    loop {
        if cursor.eat_symbol('}') {
            break;
        }
        if cursor.peek().is_none() {
            bail!("Unit '{}' nicht geschlossen", name);
        }
        parse_attribute(cursor, &mut attributes)
            .with_context(|| format!("Fehler in Unit '{}'", name))?;
    }

    Ok(Unit {
        class,
        name,
        attributes,
    })
}

/// Array-Zugriff eines Attributs.
enum Slot {
    Scalar,
    Append,
    Index(usize),
}

fn parse_attribute(
    cursor: &mut Cursor<'_>,
    attributes: &mut IndexMap<String, AttributeValue>,
) -> Result<()> {
    let line = cursor.line();
    let key = cursor.expect_word("Attributname")?.to_string();

    let slot = if cursor.eat_symbol('[') {
        if cursor.eat_symbol(']') {
            Slot::Append
        } else {
            let raw = cursor.expect_word("Array-Index")?;
            let index = raw
                .parse::<usize>()
                .map_err(|_| anyhow!("Zeile {}: ungültiger Array-Index '{}'", line, raw))?;
            cursor.expect_symbol(']')?;
            Slot::Index(index)
        }
    } else {
        Slot::Scalar
    };

    cursor.expect_symbol(':')?;
    let value = parse_value(cursor)?;

    match slot {
        Slot::Scalar => {
            attributes.insert(key, value);
        }
        Slot::Append => {
            list_slot(attributes, key).push(value);
        }
        Slot::Index(index) => {
            let list = list_slot(attributes, key.clone());
            if index < list.len() {
                list[index] = value;
            } else if index == list.len() {
                list.push(value);
            } else {
                bail!(
                    "Zeile {}: {}[{}] überspringt Indizes (Länge {})",
                    line,
                    key,
                    index,
                    list.len()
                );
            }
        }
    }
    Ok(())
}

/// Liefert die Liste für `key`; eine vorherige Größenangabe wird ersetzt.
fn list_slot(attributes: &mut IndexMap<String, AttributeValue>, key: String) -> &mut Vec<AttributeValue> {
    let entry = attributes
        .entry(key)
        .or_insert_with(|| AttributeValue::List(Vec::new()));
    if !matches!(entry, AttributeValue::List(_)) {
        *entry = AttributeValue::List(Vec::new());
    }
    match entry {
        AttributeValue::List(items) => items,
        _ => unreachable!("Eintrag wurde eben als Liste gesetzt"),
    }
}

fn parse_value(cursor: &mut Cursor<'_>) -> Result<AttributeValue> {
    let line = cursor.line();
    match cursor.next().map(|t| &t.kind) {
        Some(TokenKind::Quoted(s)) => Ok(AttributeValue::String(s.clone())),
        Some(TokenKind::Word(w)) => Ok(match parse_number(w) {
            Some(n) => AttributeValue::Number(n),
            None => AttributeValue::String(w.clone()),
        }),
        Some(TokenKind::Symbol('(')) => parse_tuple(cursor, line),
        Some(other) => bail!("Zeile {}: Wert erwartet, {:?} gefunden", line, other),
        None => bail!("Zeile {}: Wert erwartet, Dateiende gefunden", line),
    }
}

fn parse_tuple(cursor: &mut Cursor<'_>, line: usize) -> Result<AttributeValue> {
    let mut components = Vec::new();
    loop {
        let raw = cursor.expect_word("Tupel-Komponente")?;
        let value = parse_number(raw)
            .ok_or_else(|| anyhow!("Zeile {}: ungültige Tupel-Komponente '{}'", line, raw))?;
        components.push(value);

        if cursor.eat_symbol(')') {
            break;
        }
        // Quaternionen trennen die erste Komponente mit ';'
        if !(cursor.eat_symbol(',') || cursor.eat_symbol(';')) {
            bail!("Zeile {}: ',' oder ')' im Tupel erwartet", line);
        }
    }

    Ok(match components.as_slice() {
        [n] => AttributeValue::Number(*n),
        [x, y] => AttributeValue::Vector2(Vec2::new(*x, *y)),
        [x, y, z] => AttributeValue::Vector3(Vec3::new(*x, *y, *z)),
        _ => AttributeValue::List(components.into_iter().map(AttributeValue::Number).collect()),
    })
}

/// Zahl im SII-Format: Dezimal/Exponent oder `&` + 8 Hex-Ziffern (IEEE-754-Bits).
pub fn parse_number(raw: &str) -> Option<f32> {
    if let Some(hex) = raw.strip_prefix('&') {
        if hex.len() != 8 {
            return None;
        }
        return u32::from_str_radix(hex, 16).ok().map(f32::from_bits);
    }

    let first = raw.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }
    raw.parse::<f32>().ok()
}

#[cfg(test)]
mod tests;
