//! Minimaler S-Expression-Leser für KiCad-Dateien.
//!
//! Iterativ (expliziter Stack) mit begrenzter Schachtelungstiefe: weder das
//! Lesen noch das rekursive `Drop` des Baums darf den Call-Stack sprengen.

use std::iter::Peekable;
use std::str::CharIndices;

/// Maximale Schachtelungstiefe; KiCad-Dateien bleiben weit darunter.
pub const MAX_SEXPR_DEPTH: usize = 256;

/// Ein Knoten des S-Expression-Baums.
#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    /// Unquotiertes Token (`F.Cu`, `1.27`, `yes`)
    Atom(String),
    /// Quotierter String (Escapes aufgelöst)
    Str(String),
    /// Liste `( … )`
    List(Vec<SExpr>),
}

/// Fehler beim Lesen einer S-Expression (Offsets in Bytes).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SExprError {
    /// Eingabe enthält keinen Ausdruck
    #[error("leere Eingabe")]
    Empty,
    /// Liste nicht geschlossen
    #[error("unerwartetes Dateiende, Liste ab Offset {offset} nicht geschlossen")]
    UnexpectedEof {
        /// Offset der öffnenden Klammer
        offset: usize,
    },
    /// Schließende Klammer ohne offene Liste
    #[error("unerwartete ')' bei Offset {offset}")]
    UnbalancedClose {
        /// Offset der Klammer
        offset: usize,
    },
    /// String nicht geschlossen
    #[error("String ab Offset {offset} nicht geschlossen")]
    UnterminatedString {
        /// Offset des öffnenden Anführungszeichens
        offset: usize,
    },
    /// Schachtelung tiefer als [`MAX_SEXPR_DEPTH`]
    #[error("Schachtelung zu tief bei Offset {offset} (maximal {max})", max = MAX_SEXPR_DEPTH)]
    TooDeep {
        /// Offset der Klammer, die die Grenze überschreitet
        offset: usize,
    },
    /// Weitere Ausdrücke nach dem Wurzelausdruck
    #[error("zusätzliche Eingabe nach dem Wurzelausdruck bei Offset {offset}")]
    TrailingInput {
        /// Offset des ersten überzähligen Tokens
        offset: usize,
    },
}

/// Liest genau einen Wurzelausdruck aus dem Text.
pub fn parse_sexpr(text: &str) -> Result<SExpr, SExprError> {
    let mut chars = text.char_indices().peekable();
    // (Offset der öffnenden Klammer, bisher gelesene Kinder)
    let mut stack: Vec<(usize, Vec<SExpr>)> = Vec::new();
    let mut root: Option<SExpr> = None;

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if root.is_some() {
            return Err(SExprError::TrailingInput { offset });
        }

        let node = match c {
            '(' => {
                chars.next();
                if stack.len() >= MAX_SEXPR_DEPTH {
                    return Err(SExprError::TooDeep { offset });
                }
                stack.push((offset, Vec::new()));
                continue;
            }
            ')' => {
                chars.next();
                let (_, children) = stack
                    .pop()
                    .ok_or(SExprError::UnbalancedClose { offset })?;
                SExpr::List(children)
            }
            '"' => {
                chars.next();
                SExpr::Str(read_string(&mut chars, offset)?)
            }
            _ => SExpr::Atom(read_atom(text, &mut chars, offset)),
        };

        match stack.last_mut() {
            Some((_, children)) => children.push(node),
            None => root = Some(node),
        }
    }

    if let Some((offset, _)) = stack.pop() {
        return Err(SExprError::UnexpectedEof { offset });
    }
    root.ok_or(SExprError::Empty)
}

fn read_string(chars: &mut Peekable<CharIndices<'_>>, start: usize) -> Result<String, SExprError> {
    let mut out = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(out),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(SExprError::UnterminatedString { offset: start })
}

fn read_atom(text: &str, chars: &mut Peekable<CharIndices<'_>>, start: usize) -> String {
    let mut end = text.len();
    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
            end = offset;
            break;
        }
        chars.next();
    }
    text[start..end].to_string()
}

impl SExpr {
    /// Kopf-Token einer Liste (`(segment …)` → `segment`).
    pub fn head(&self) -> Option<&str> {
        match self {
            Self::List(items) => items.first().and_then(Self::as_str),
            _ => None,
        }
    }

    /// Textwert eines Atoms oder Strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Atom(s) | Self::Str(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Zahlwert eines Atoms.
    pub fn as_f32(&self) -> Option<f32> {
        self.as_str().and_then(|s| s.parse::<f32>().ok())
    }

    /// Alle Elemente nach dem Kopf.
    pub fn args(&self) -> &[SExpr] {
        match self {
            Self::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    /// Argument `idx` (0 = erstes Element nach dem Kopf) als Text.
    pub fn str_arg(&self, idx: usize) -> Option<&str> {
        self.args().get(idx).and_then(Self::as_str)
    }

    /// Argument `idx` als Zahl.
    pub fn f32_arg(&self, idx: usize) -> Option<f32> {
        self.args().get(idx).and_then(Self::as_f32)
    }

    /// Erstes Kind mit dem gegebenen Kopf.
    pub fn child(&self, name: &str) -> Option<&SExpr> {
        self.args().iter().find(|c| c.head() == Some(name))
    }

    /// Alle Kinder mit dem gegebenen Kopf.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SExpr> + 'a {
        self.args().iter().filter(move |c| c.head() == Some(name))
    }

    /// Textwert von `(name wert)`.
    pub fn child_str(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.str_arg(0))
    }

    /// Punkt aus `(name x y)`.
    pub fn child_vec2(&self, name: &str) -> Option<glam::Vec2> {
        let c = self.child(name)?;
        Some(glam::Vec2::new(c.f32_arg(0)?, c.f32_arg(1)?))
    }

    /// Flag, entweder als nacktes Atom (`locked`) oder als `(name yes)`.
    pub fn flag(&self, name: &str) -> bool {
        self.args().iter().any(|c| match c {
            Self::Atom(a) => a == name,
            Self::List(_) if c.head() == Some(name) => {
                !matches!(c.str_arg(0), Some("no") | Some("false"))
            }
            _ => false,
        })
    }

    /// Kinder `(property "Name" "Wert" …)` nach Name.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.children("property")
            .find(|p| p.str_arg(0) == Some(key))
            .and_then(|p| p.str_arg(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_lists_and_strings() {
        let expr = parse_sexpr(r#"(kicad_pcb (version 20240108) (net 1 "/aaa/b\"b") (layers))"#)
            .expect("gültige S-Expression erwartet");
        assert_eq!(expr.head(), Some("kicad_pcb"));
        assert_eq!(expr.child_str("version"), Some("20240108"));
        let net = expr.child("net").expect("net erwartet");
        assert_eq!(net.f32_arg(0), Some(1.0));
        assert_eq!(net.str_arg(1), Some("/aaa/b\"b"));
        assert!(expr.child("layers").is_some_and(|l| l.args().is_empty()));
    }

    #[test]
    fn flags_accept_bare_atoms_and_yes_lists() {
        let expr = parse_sexpr("(footprint \"R\" locked (dnp yes) (exclude_from_bom no))")
            .expect("gültig");
        assert!(expr.flag("locked"));
        assert!(expr.flag("dnp"));
        assert!(!expr.flag("exclude_from_bom"));
        assert!(!expr.flag("board_only"));
    }

    #[test]
    fn reports_structural_errors_with_offsets() {
        assert_eq!(parse_sexpr("   "), Err(SExprError::Empty));
        assert_eq!(
            parse_sexpr("(a (b)"),
            Err(SExprError::UnexpectedEof { offset: 0 })
        );
        assert_eq!(parse_sexpr("a)"), Err(SExprError::TrailingInput { offset: 1 }));
        assert_eq!(
            parse_sexpr("(a \"open"),
            Err(SExprError::UnterminatedString { offset: 3 })
        );
        assert_eq!(parse_sexpr(")"), Err(SExprError::UnbalancedClose { offset: 0 }));
    }

    #[test]
    fn nesting_up_to_limit_is_accepted() {
        let depth = MAX_SEXPR_DEPTH;
        let text = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_sexpr(&text).is_ok());
    }

    #[test]
    fn excessive_nesting_is_rejected_without_overflow() {
        let depth = 1_000_000;
        let text = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            parse_sexpr(&text),
            Err(SExprError::TooDeep {
                offset: MAX_SEXPR_DEPTH
            })
        );
    }
}
