//! Indenting XML emitter that records identifier declarations and references.

use std::fmt::Write;

/// Indentation per nesting level.
const INDENT: &str = "    ";

/// Attribute declaring an identifier.
const ID_ATTRIBUTE: &str = "id";

/// Attribute referencing an identifier.
const IDREF_ATTRIBUTE: &str = "idref";

/// Declaration of or reference to an identifier, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdEvent {
    Declare(String),
    Reference(String),
}

// =#========================================================================#=
// XML WRITER
// =#========================================================================#=
/// Chainable XML emitter writing one element per line.
///
/// Every `id` attribute is recorded as [IdEvent::Declare] and every `idref`
/// attribute as [IdEvent::Reference], so the identifier graph of the written
/// text can be checked without parsing it back.
///
/// # Example
/// ```
/// use beastgen::xml::{IdEvent, XmlWriter};
///
/// let mut xml = XmlWriter::new();
/// xml.open("taxa", &[("id", "taxa")])
///     .empty("taxon", &[("id", "A")])
///     .close("taxa")
///     .idref("taxa", "taxa");
/// let (text, events) = xml.take();
/// assert_eq!(
///     text,
///     "<taxa id=\"taxa\">\n    <taxon id=\"A\"/>\n</taxa>\n<taxa idref=\"taxa\"/>\n"
/// );
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[2], IdEvent::Reference("taxa".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct XmlWriter {
    buf: String,
    depth: usize,
    events: Vec<IdEvent>,
}

// ============================================================================
// Elements (pub)
// ============================================================================
impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a start tag and increases the indentation.
    pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.indent().tag_start(tag, attrs);
        self.buf.push_str(">\n");
        self.depth += 1;
        self
    }

    /// Decreases the indentation and writes an end tag.
    pub fn close(&mut self, tag: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.indent();
        let _ = writeln!(self.buf, "</{tag}>");
        self
    }

    /// Writes an empty element `<tag .../>`.
    pub fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.indent().tag_start(tag, attrs);
        self.buf.push_str("/>\n");
        self
    }

    /// Writes a reference element `<tag idref="id"/>`.
    pub fn idref(&mut self, tag: &str, id: &str) -> &mut Self {
        self.empty(tag, &[(IDREF_ATTRIBUTE, id)])
    }

    /// Writes `<outer>` wrapping a single `<inner .../>`.
    pub fn wrap(&mut self, outer: &str, inner: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.open(outer, &[]).empty(inner, attrs).close(outer)
    }

    /// Writes an indented comment line.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.indent();
        let _ = writeln!(self.buf, "<!-- {} -->", text.replace("--", "- -"));
        self
    }

    /// Writes an indented line of escaped character data.
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.indent();
        self.buf.push_str(&escape(text, false));
        self.buf.push('\n');
        self
    }

    /// Writes a line verbatim, without indentation or escaping.
    pub fn raw(&mut self, line: &str) -> &mut Self {
        self.buf.push_str(line);
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Takes the text and events written so far, keeping the nesting depth.
    pub fn take(&mut self) -> (String, Vec<IdEvent>) {
        (
            std::mem::take(&mut self.buf),
            std::mem::take(&mut self.events),
        )
    }
}

// ============================================================================
// Little Helpers (private)
// ============================================================================
impl XmlWriter {
    fn indent(&mut self) -> &mut Self {
        for _ in 0..self.depth {
            self.buf.push_str(INDENT);
        }
        self
    }

    /// Writes `<tag a="v" ...` and records id events.
    fn tag_start(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attrs {
            let _ = write!(self.buf, " {name}=\"{}\"", escape(value, true));
            match *name {
                ID_ATTRIBUTE => self.events.push(IdEvent::Declare(value.to_string())),
                IDREF_ATTRIBUTE => self.events.push(IdEvent::Reference(value.to_string())),
                _ => {}
            }
        }
    }
}

/// Escapes markup characters, and double quotes inside attribute values.
fn escape(text: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats a real number the way the inference engine prints doubles:
/// always with a fractional part, in scientific notation below 1.0E-3 and
/// from 1.0E7 on.
///
/// # Example
/// ```
/// use beastgen::xml::format_real;
///
/// assert_eq!(format_real(1.0), "1.0");
/// assert_eq!(format_real(0.001), "0.001");
/// assert_eq!(format_real(3.0E-4), "3.0E-4");
/// assert_eq!(format_real(1.0E100), "1.0E100");
/// assert_eq!(format_real(1000000.0), "1000000.0");
/// assert_eq!(format_real(f64::INFINITY), "Infinity");
/// ```
pub fn format_real(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1.0E-3..1.0E7).contains(&magnitude) {
        let formatted = format!("{value:E}");
        return match formatted.split_once('E') {
            Some((mantissa, exponent)) if !mantissa.contains('.') => {
                format!("{mantissa}.0E{exponent}")
            }
            _ => formatted,
        };
    }

    let formatted = format!("{value}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_and_events() {
        let mut xml = XmlWriter::new();
        xml.open("a", &[("id", "x")])
            .wrap("b", "parameter", &[("idref", "x")])
            .close("a");
        assert_eq!(xml.depth(), 0);
        let (text, events) = xml.take();
        assert_eq!(
            text,
            "<a id=\"x\">\n    <b>\n        <parameter idref=\"x\"/>\n    </b>\n</a>\n"
        );
        assert_eq!(
            events,
            vec![
                IdEvent::Declare("x".to_string()),
                IdEvent::Reference("x".to_string())
            ]
        );
    }

    #[test]
    fn test_take_keeps_depth() {
        let mut xml = XmlWriter::new();
        xml.open("mcmc", &[]);
        let _ = xml.take();
        xml.empty("log", &[]);
        assert_eq!(xml.take().0, "    <log/>\n");
    }

    #[test]
    fn test_escaping() {
        let mut xml = XmlWriter::new();
        xml.empty("taxon", &[("id", "a\"b&c")]).text("x<y").comment("a--b");
        let (text, _) = xml.take();
        assert_eq!(
            text,
            "<taxon id=\"a&quot;b&amp;c\"/>\nx&lt;y\n<!-- a- -b -->\n"
        );
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(0.0), "0.0");
        assert_eq!(format_real(1.0E-8), "1.0E-8");
        assert_eq!(format_real(0.3333333333333333), "0.3333333333333333");
        assert_eq!(format_real(-2.5), "-2.5");
        assert_eq!(format_real(1.0E7), "1.0E7");
        assert_eq!(format_real(1.25E-5), "1.25E-5");
        assert_eq!(format_real(100000.0), "100000.0");
    }
}
