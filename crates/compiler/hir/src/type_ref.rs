//! Structured type references.
//!
//! The parser hands the binder a raw type capture; this module turns it
//! into a [`TypeReference`] tree: qualifiers peeled, pointer/reference
//! sugar expanded, array suffixes wrapped, generic arguments recursed,
//! and builtin aliases folded to their canonical family name.
//!
//! The `normalized_text` rendering is load-bearing: it feeds the MIR
//! canonical print, so its rules are a versioned contract.

use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceSpan};

/// Ordered identifier components of a dotted name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedName {
    pub components: Vec<String>,
}

impl QualifiedName {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.components.join(separator)
    }

    pub fn last(&self) -> &str {
        self.components.last().map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeKind {
    #[default]
    Invalid,
    Named,
    Pointer,
    Reference,
    Array,
}

/// One parsed type annotation.
///
/// `Pointer`, `Reference`, and `Array` nodes hold exactly one generic
/// argument (the pointee, referent, or element); `Named` nodes hold any
/// number. `text` is the canonical rebuilt spelling, `original_text` the
/// raw capture, and `normalized_text` the deterministic rendering used
/// by the MIR canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeReference {
    pub kind: TypeKind,
    pub name: QualifiedName,
    pub generic_arguments: Vec<TypeReference>,
    pub qualifiers: Vec<String>,
    pub array_length: Option<u64>,
    pub is_builtin: bool,
    pub text: String,
    pub original_text: String,
    pub normalized_text: String,
    pub span: SourceSpan,
}

impl TypeReference {
    pub const fn is_valid(&self) -> bool {
        !matches!(self.kind, TypeKind::Invalid)
    }

    pub const fn is_pointer(&self) -> bool {
        matches!(self.kind, TypeKind::Pointer)
    }

    pub const fn is_reference(&self) -> bool {
        matches!(self.kind, TypeKind::Reference)
    }

    pub const fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array)
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_arguments.is_empty()
    }

    pub fn qualified_name(&self, separator: &str) -> String {
        self.name.join(separator)
    }

    pub fn base_name(&self) -> &str {
        self.name.last()
    }

    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers.iter().any(|q| q == qualifier)
    }

    /// The canonical text MIR lowering writes into instruction details.
    pub fn canonical_text(&self) -> &str {
        if self.normalized_text.is_empty() {
            &self.text
        } else {
            &self.normalized_text
        }
    }
}

/// Recognised type qualifier spellings. `const` is handled separately as
/// a diagnosed legacy alias of `constant`.
const QUALIFIER_KEYWORDS: &[&str] = &["constant"];

/// Builtin heads and the family name sized variants fold into.
fn normalize_builtin(name: &str) -> Option<&'static str> {
    match name {
        "integer" | "integer8" | "integer16" | "integer32" | "integer64" => Some("integer"),
        "float" | "float32" | "float64" => Some("float"),
        "void" => Some("void"),
        "boolean" => Some("boolean"),
        "byte" => Some("byte"),
        "character" => Some("character"),
        "string" => Some("string"),
        _ => None,
    }
}

/// Parses integer text with base auto-detection (`0x`, `0b`, `0o`,
/// leading-zero octal, else decimal). The whole string must parse.
pub(crate) fn parse_unsigned(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Some(digits) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(digits, 16).ok()
    } else if let Some(digits) = value.strip_prefix("0b").or_else(|| value.strip_prefix("0B")) {
        u64::from_str_radix(digits, 2).ok()
    } else if let Some(digits) = value.strip_prefix("0o").or_else(|| value.strip_prefix("0O")) {
        u64::from_str_radix(digits, 8).ok()
    } else if value.len() > 1 && value.starts_with('0') {
        u64::from_str_radix(&value[1..], 8).ok()
    } else {
        value.parse().ok()
    }
}

/// Splits off the Live marker at the front of a raw capture.
///
/// `Some("")` means the marker was present with nothing after it (the
/// caller reports `BOLT-E2217`); `Some(rest)` strips it; `None` means no
/// marker. Both the `LiveValue` prefix and the surface `live` spelling
/// are accepted.
pub(crate) fn strip_live_marker(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    for marker in ["LiveValue", "live"] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            if rest.is_empty() {
                return Some("");
            }
            if rest.starts_with(char::is_whitespace) {
                return Some(rest.trim());
            }
        }
    }
    None
}

/// Parses a raw type capture into a structured reference, emitting
/// qualifier diagnostics into `diagnostics`.
pub fn parse_type_reference(
    text: &str,
    span: SourceSpan,
    diagnostics: &mut Vec<Diagnostic>,
) -> TypeReference {
    let mut reference = parse_text(text, span, diagnostics);
    reference.original_text = text.to_string();
    populate_normalized_text(&mut reference);
    reference
}

fn parse_text(text: &str, span: SourceSpan, diagnostics: &mut Vec<Diagnostic>) -> TypeReference {
    let trimmed = text.trim();
    let mut node = TypeReference {
        span,
        original_text: trimmed.to_string(),
        ..TypeReference::default()
    };

    if trimmed.is_empty() {
        return node;
    }

    // Trailing array suffix wraps everything to its left.
    if trimmed.ends_with(']') {
        if let Some(open) = matching_open_bracket(trimmed) {
            let inner = trimmed[open + 1..trimmed.len() - 1].trim();
            let element = parse_text(&trimmed[..open], span, diagnostics);
            node.kind = TypeKind::Array;
            node.array_length = if inner.is_empty() {
                None
            } else {
                parse_unsigned(inner)
            };
            node.text = match node.array_length {
                Some(length) => format!("{}[{length}]", element.text),
                None => format!("{}[]", element.text),
            };
            node.generic_arguments.push(element);
            return node;
        }
    }

    // Trailing pointer/reference sugar; `*&` reads inside-out, so a
    // reference-to-pointer strips the `&` first.
    if let Some(prefix) = trimmed.strip_suffix('*') {
        let pointee = parse_text(prefix, span, diagnostics);
        node.kind = TypeKind::Pointer;
        node.name = QualifiedName {
            components: vec!["pointer".to_string()],
        };
        node.text = format!("pointer<{}>", pointee.text);
        node.generic_arguments.push(pointee);
        return node;
    }
    if let Some(prefix) = trimmed.strip_suffix('&') {
        let referent = parse_text(prefix, span, diagnostics);
        node.kind = TypeKind::Reference;
        node.name = QualifiedName {
            components: vec!["reference".to_string()],
        };
        node.text = format!("reference<{}>", referent.text);
        node.generic_arguments.push(referent);
        return node;
    }

    // Leading qualifiers, one word at a time. A qualifier must be
    // followed by more text; a lone keyword stays a (broken) name.
    let mut rest = trimmed;
    loop {
        let (word, remainder) = split_first_word(rest);
        if remainder.is_empty() {
            break;
        }
        let canonical = if word == "const" {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::LegacyConstQualifier,
                    "Legacy 'const' qualifier is not supported; use 'constant' instead.",
                    span,
                )
                .with_fixit("replace 'const' with 'constant'"),
            );
            Some("constant")
        } else if QUALIFIER_KEYWORDS.contains(&word) {
            Some(word)
        } else {
            None
        };

        match canonical {
            Some(qualifier) => {
                if node.qualifiers.iter().any(|q| q == qualifier) {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticCode::DuplicateQualifier,
                        format!("Duplicate '{qualifier}' qualifier in type reference."),
                        span,
                    ));
                } else {
                    node.qualifiers.push(qualifier.to_string());
                }
                rest = remainder;
            }
            None => break,
        }
    }

    // Generic arguments at the top angle level.
    if let (Some(open), true) = (rest.find('<'), rest.ends_with('>')) {
        let head = rest[..open].trim();
        let arguments: Vec<TypeReference> = split_generic_arguments(&rest[open + 1..rest.len() - 1])
            .into_iter()
            .map(|argument| parse_text(argument, span, diagnostics))
            .collect();

        match head {
            "pointer" if arguments.len() == 1 => {
                node.kind = TypeKind::Pointer;
                node.name = QualifiedName {
                    components: vec!["pointer".to_string()],
                };
            }
            "reference" if arguments.len() == 1 => {
                node.kind = TypeKind::Reference;
                node.name = QualifiedName {
                    components: vec!["reference".to_string()],
                };
            }
            _ => {
                node.kind = TypeKind::Named;
                node.name = parse_qualified_head(head);
            }
        }
        node.generic_arguments = arguments;
        node.text = render_text(&node);
        return node;
    }

    // A plain, possibly dotted, head.
    node.kind = TypeKind::Named;
    node.name = parse_qualified_head(rest);
    if node.name.components.len() == 1 {
        if let Some(builtin) = normalize_builtin(&node.name.components[0]) {
            node.name.components[0] = builtin.to_string();
            node.is_builtin = true;
        }
    }
    node.text = render_text(&node);
    node
}

fn parse_qualified_head(head: &str) -> QualifiedName {
    QualifiedName {
        components: head
            .split('.')
            .map(str::trim)
            .filter(|component| !component.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

fn split_first_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim_start()),
        None => (text, ""),
    }
}

/// Index of the `[` matching the trailing `]`, if the bracket nesting is
/// well formed.
fn matching_open_bracket(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for index in (0..bytes.len()).rev() {
        match bytes[index] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits `a, B<c, d>, e` into top-level arguments by tracking angle
/// depth.
fn split_generic_arguments(arguments: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (index, ch) in arguments.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                result.push(arguments[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    let tail = arguments[start..].trim();
    if !tail.is_empty() {
        result.push(tail);
    }
    result
}

fn joined_qualifiers(qualifiers: &[String]) -> String {
    qualifiers.join(" ")
}

/// The deterministic rendering: qualifiers, then the dotted name (or raw
/// text), then `<…>` of rendered arguments; arrays append their suffix
/// after the rendered element.
fn render_text(ty: &TypeReference) -> String {
    if matches!(ty.kind, TypeKind::Invalid) {
        return String::new();
    }

    let mut result = String::new();
    if !ty.qualifiers.is_empty() {
        result.push_str(&joined_qualifiers(&ty.qualifiers));
        result.push(' ');
    }

    if matches!(ty.kind, TypeKind::Array) {
        match ty.generic_arguments.first() {
            Some(element) => result.push_str(&render_text(element)),
            None => result.push_str(&ty.text),
        }
        result.push('[');
        if let Some(length) = ty.array_length {
            result.push_str(&length.to_string());
        }
        result.push(']');
        return result;
    }

    let qualified = ty.qualified_name(".");
    if qualified.is_empty() {
        result.push_str(&ty.text);
    } else {
        result.push_str(&qualified);
    }

    if !ty.generic_arguments.is_empty() {
        result.push('<');
        for (index, argument) in ty.generic_arguments.iter().enumerate() {
            if index > 0 {
                result.push_str(", ");
            }
            result.push_str(&render_text(argument));
        }
        result.push('>');
    }

    result
}

fn populate_normalized_text(ty: &mut TypeReference) {
    for argument in &mut ty.generic_arguments {
        populate_normalized_text(argument);
    }
    ty.normalized_text = render_text(ty);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (TypeReference, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let reference = parse_type_reference(text, SourceSpan::default(), &mut diagnostics);
        (reference, diagnostics)
    }

    #[test]
    fn named_builtin_folds_sized_alias() {
        let (ty, diags) = parse("integer32");
        assert!(diags.is_empty());
        assert_eq!(ty.kind, TypeKind::Named);
        assert!(ty.is_builtin);
        assert_eq!(ty.text, "integer");
        assert_eq!(ty.normalized_text, "integer");
        assert_eq!(ty.original_text, "integer32");
    }

    #[test]
    fn pointer_sugar_expands_to_word_form() {
        let (ty, diags) = parse("integer*");
        assert!(diags.is_empty());
        assert!(ty.is_pointer());
        assert_eq!(ty.text, "pointer<integer>");
        assert_eq!(ty.generic_arguments.len(), 1);
        assert_eq!(ty.generic_arguments[0].text, "integer");
    }

    #[test]
    fn star_ampersand_reads_reference_to_pointer() {
        let (ty, diags) = parse("integer*&");
        assert!(diags.is_empty());
        assert!(ty.is_reference());
        assert_eq!(ty.text, "reference<pointer<integer>>");
        assert!(ty.generic_arguments[0].is_pointer());
    }

    #[test]
    fn word_form_and_sugar_agree() {
        let (word, _) = parse("pointer<integer>");
        let (sugar, _) = parse("integer*");
        assert_eq!(word.kind, sugar.kind);
        assert_eq!(word.normalized_text, sugar.normalized_text);
    }

    #[test]
    fn qualifier_binds_to_the_element_under_array_suffixes() {
        let (ty, diags) = parse("constant byte[16]");
        assert!(diags.is_empty());
        assert!(ty.is_array());
        assert_eq!(ty.array_length, Some(16));
        assert_eq!(ty.text, "constant byte[16]");
        let element = &ty.generic_arguments[0];
        assert_eq!(element.kind, TypeKind::Named);
        assert_eq!(element.qualifiers, vec!["constant".to_string()]);
        assert_eq!(element.text, "constant byte");
    }

    #[test]
    fn repeated_array_suffixes_nest_outermost_last() {
        let (ty, diags) = parse("pointer<byte>[4][2]");
        assert!(diags.is_empty());
        assert!(ty.is_array());
        assert_eq!(ty.array_length, Some(2));
        assert_eq!(ty.text, "pointer<byte>[4][2]");
        let inner = &ty.generic_arguments[0];
        assert!(inner.is_array());
        assert_eq!(inner.array_length, Some(4));
        assert_eq!(inner.text, "pointer<byte>[4]");
        assert!(inner.generic_arguments[0].is_pointer());
    }

    #[test]
    fn unsized_array_keeps_empty_suffix() {
        let (ty, _) = parse("integer[]");
        assert!(ty.is_array());
        assert_eq!(ty.array_length, None);
        assert_eq!(ty.text, "integer[]");
    }

    #[test]
    fn dotted_generic_name_keeps_components() {
        let (ty, diags) = parse("std.core.result.Result<void,WriteError>");
        assert!(diags.is_empty());
        assert_eq!(ty.kind, TypeKind::Named);
        assert_eq!(ty.name.components.len(), 4);
        assert_eq!(ty.name.components[0], "std");
        assert_eq!(ty.name.components[3], "Result");
        assert_eq!(ty.generic_arguments.len(), 2);
        assert_eq!(ty.generic_arguments[0].text, "void");
        assert_eq!(ty.generic_arguments[1].text, "WriteError");
        assert_eq!(
            ty.normalized_text,
            "std.core.result.Result<void, WriteError>"
        );
    }

    #[test]
    fn duplicate_qualifier_is_reported_once() {
        let (ty, diags) = parse("constant constant byte");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::DuplicateQualifier);
        assert_eq!(ty.qualifiers, vec!["constant".to_string()]);
    }

    #[test]
    fn legacy_const_rewrites_with_diagnostic() {
        let (ty, diags) = parse("const byte");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::LegacyConstQualifier);
        assert!(diags[0].fixit.is_some());
        assert_eq!(ty.qualifiers, vec!["constant".to_string()]);
        assert_eq!(ty.text, "constant byte");
    }

    #[test]
    fn names_merely_starting_with_const_are_untouched() {
        let (ty, diags) = parse("Constellation");
        assert!(diags.is_empty());
        assert!(ty.qualifiers.is_empty());
        assert_eq!(ty.text, "Constellation");
    }

    #[test]
    fn empty_capture_is_invalid() {
        let (ty, diags) = parse("  ");
        assert!(diags.is_empty());
        assert!(!ty.is_valid());
        assert!(ty.text.is_empty());
    }

    #[test]
    fn live_marker_detection() {
        assert_eq!(strip_live_marker("live integer32"), Some("integer32"));
        assert_eq!(strip_live_marker("LiveValue integer"), Some("integer"));
        assert_eq!(strip_live_marker("live"), Some(""));
        assert_eq!(strip_live_marker("livelihood"), None);
        assert_eq!(strip_live_marker("integer"), None);
    }

    #[test]
    fn unsigned_parsing_detects_bases() {
        assert_eq!(parse_unsigned("42"), Some(42));
        assert_eq!(parse_unsigned("0x10"), Some(16));
        assert_eq!(parse_unsigned("0b101"), Some(5));
        assert_eq!(parse_unsigned("010"), Some(8));
        assert_eq!(parse_unsigned("x"), None);
        assert_eq!(parse_unsigned(""), None);
    }
}
