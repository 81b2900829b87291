//! Recursive-descent parser for Bolt compilation units.
//!
//! The grammar is type-first: every function declaration starts with a
//! type capture that runs up to the `function` keyword. The parser never
//! fails outright; unexpected input produces a diagnostic, the cursor
//! advances one token, and parsing continues, so callers always receive a
//! structurally valid [`CompilationUnit`].
//!
//! Function bodies are skipped by brace counting in this stage; only the
//! declaration surface is modelled.

use bolt_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceSpan};
use tracing::debug;

use crate::ast::{
    Attribute, AttributeArgument, BlueprintDeclaration, BlueprintField, CompilationUnit,
    FunctionDeclaration, ImportDeclaration, ModuleDeclaration, Parameter, TypeCapture,
};
use crate::tokens::{Token, TokenKind};

/// Result of parsing one token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    pub unit: CompilationUnit,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a lexed token stream into a compilation unit.
pub fn parse_tokens(tokens: &[Token], module_name: &str) -> ParseOutput {
    Parser::new(tokens, module_name).parse()
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    module_name: &'a str,
    current: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], module_name: &'a str) -> Self {
        Self {
            tokens,
            module_name,
            current: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn parse(mut self) -> ParseOutput {
        let mut unit = CompilationUnit {
            module: self.parse_module(),
            ..CompilationUnit::default()
        };

        while !self.is_at_end() {
            let attributes = if self.check(TokenKind::LeftBracket) {
                self.parse_attributes()
            } else {
                Vec::new()
            };

            let modifiers = self.parse_modifiers();

            if self.check(TokenKind::KeywordImport) {
                if let Some(first) = attributes.first() {
                    self.report(
                        DiagnosticCode::AttributesOnImport,
                        "Attributes are not allowed on import statements.",
                        first.span,
                    );
                }
                if !modifiers.is_empty() {
                    let span = self.previous().span;
                    self.report(
                        DiagnosticCode::ModifiersOnImport,
                        "Modifiers are not allowed before an import statement.",
                        span,
                    );
                }

                let import_decl = self.parse_import();
                unit.imports.push(import_decl);
                continue;
            }

            if self.match_kind(TokenKind::KeywordBlueprint) {
                let mut blueprint = self.parse_blueprint(modifiers);
                blueprint.attributes = attributes;
                unit.blueprints.push(blueprint);
                continue;
            }

            let return_type_capture = self.parse_type_until(&[TokenKind::KeywordFunction]);
            if !self.check(TokenKind::KeywordFunction) {
                let span = self.peek().span;
                self.report(
                    DiagnosticCode::ExpectedReturnTypeBeforeFunction,
                    "Expected return type followed by 'function' declaration.",
                    span,
                );
                if !self.is_at_end() {
                    self.advance();
                }
                continue;
            }

            self.consume(
                TokenKind::KeywordFunction,
                DiagnosticCode::ExpectedFunctionKeyword,
                "Expected 'function' keyword after return type.",
            );

            let mut function = self.parse_function(modifiers, return_type_capture);
            function.attributes = attributes;
            unit.functions.push(function);
        }

        debug!(
            module = self.module_name,
            functions = unit.functions.len(),
            blueprints = unit.blueprints.len(),
            imports = unit.imports.len(),
            "parsed compilation unit"
        );

        ParseOutput {
            unit,
            diagnostics: self.diagnostics,
        }
    }

    // --- Cursor primitives ---

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.tokens[self.current.saturating_sub(1)].clone()
    }

    fn look_ahead(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfFile
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, code: DiagnosticCode, message: &str) -> Token {
        if self.check(kind) {
            return self.advance();
        }

        let span = self.peek().span;
        self.report(code, message, span);

        if !self.is_at_end() {
            self.advance();
        }
        self.previous().clone()
    }

    fn report(&mut self, code: DiagnosticCode, message: impl Into<String>, span: SourceSpan) {
        self.diagnostics.push(Diagnostic::new(code, message, span));
    }

    /// Terminator test for the type captures. Commas and closing parens
    /// inside `<…>` do not terminate; a `[` terminates only when it opens
    /// an attribute rather than an `[n]`/`[]` array suffix.
    fn is_capture_terminator(
        &self,
        kind: TokenKind,
        terminators: &[TokenKind],
        angle_depth: i32,
    ) -> bool {
        terminators.iter().any(|&terminator| {
            if kind != terminator {
                return false;
            }
            if (terminator == TokenKind::Comma || terminator == TokenKind::RightParen)
                && angle_depth > 0
            {
                return false;
            }
            if terminator == TokenKind::LeftBracket && self.bracket_is_array_suffix(1) {
                return false;
            }
            true
        })
    }

    /// True when the `[` at `offset` tokens ahead begins an array suffix
    /// (`[n]` or `[]`) rather than an attribute (`[name…]`).
    fn bracket_is_array_suffix(&self, offset: usize) -> bool {
        matches!(
            self.look_ahead(offset).kind,
            TokenKind::IntegerLiteral | TokenKind::RightBracket
        )
    }

    // --- Declarations ---

    fn parse_module(&mut self) -> ModuleDeclaration {
        let mut module = ModuleDeclaration::default();
        let mut span = SourceSpan::default();
        let mut package_specified = false;

        if self.match_kind(TokenKind::KeywordPackage) {
            let keyword = self.previous().clone();
            let (package_name, _) = self.parse_qualified_name(
                DiagnosticCode::ExpectedPackageIdentifier,
                "Expected package identifier.",
            );
            module.package_name = package_name;
            let terminator = self.consume(
                TokenKind::Semicolon,
                DiagnosticCode::ExpectedPackageTerminator,
                "Expected ';' after package declaration.",
            );
            span.begin = keyword.span.begin;
            span.end = terminator.span.end;
            package_specified = true;
        } else {
            let at = self.peek().span;
            self.report(
                DiagnosticCode::MissingPackageDeclaration,
                "Missing 'package' declaration at file start.",
                at,
            );
        }

        if self.match_kind(TokenKind::KeywordModule) {
            let keyword = self.previous().clone();
            if !package_specified {
                span.begin = keyword.span.begin;
            }
            let (module_name, _) = self.parse_qualified_name(
                DiagnosticCode::MissingModuleDeclaration,
                "Expected module identifier.",
            );
            module.module_name = module_name;
            let terminator = self.consume(
                TokenKind::Semicolon,
                DiagnosticCode::ExpectedModuleTerminator,
                "Expected ';' after module declaration.",
            );
            span.end = terminator.span.end;
        } else {
            let at = self.peek().span;
            self.report(
                DiagnosticCode::MissingModuleDeclaration,
                "Missing 'module' declaration.",
                at,
            );
        }

        module.span = span;
        if !package_specified {
            module.package_name = module.module_name.clone();
        }

        module
    }

    fn parse_import(&mut self) -> ImportDeclaration {
        let keyword = self.advance();
        let mut import_decl = ImportDeclaration {
            span: keyword.span,
            ..ImportDeclaration::default()
        };

        let (path, path_span) = self.parse_qualified_name(
            DiagnosticCode::ExpectedImportPath,
            "Expected module path after 'import'.",
        );
        if !path.is_empty() {
            import_decl.module_path = path;
            import_decl.span.end = path_span.end;
        }

        if self.match_kind(TokenKind::Semicolon) {
            import_decl.span.end = self.previous().span.end;
        }

        import_decl
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while self.check(TokenKind::KeywordPublic)
            || self.check(TokenKind::KeywordLink)
            || self.check(TokenKind::KeywordExternal)
        {
            let token = self.advance();
            modifiers.push(token.text);
        }
        modifiers
    }

    fn parse_function(
        &mut self,
        modifiers: Vec<String>,
        return_type_capture: TypeCapture,
    ) -> FunctionDeclaration {
        let mut function = FunctionDeclaration {
            modifiers,
            ..FunctionDeclaration::default()
        };

        if return_type_capture.valid {
            function.return_type = Some(return_type_capture.text);
            function.return_type_span = Some(return_type_capture.span);
        } else {
            let span = self.previous().span;
            self.report(
                DiagnosticCode::MissingReturnType,
                "Expected return type before 'function'.",
                span,
            );
        }

        // Destructors spell their name as '~' followed by the blueprint name.
        let mut name_span;
        if self.check(TokenKind::Tilde) {
            let tilde = self.advance();
            let name_token = self.consume(
                TokenKind::Identifier,
                DiagnosticCode::ExpectedFunctionName,
                "Expected function name.",
            );
            function.name = format!("~{}", name_token.text);
            name_span = tilde.span.merge(name_token.span);
        } else {
            let name_token = self.consume(
                TokenKind::Identifier,
                DiagnosticCode::ExpectedFunctionName,
                "Expected function name.",
            );
            function.name = name_token.text;
            name_span = name_token.span;
        }

        self.consume(
            TokenKind::LeftParen,
            DiagnosticCode::ExpectedParameterList,
            "Expected '(' after function name.",
        );

        while !self.check(TokenKind::RightParen) && !self.is_at_end() {
            let parameter = self.parse_parameter();
            function.parameters.push(parameter);

            if !self.match_kind(TokenKind::Comma) {
                break;
            }
        }

        self.consume(
            TokenKind::RightParen,
            DiagnosticCode::ExpectedParameterListEnd,
            "Expected ')' after parameters.",
        );

        if self.match_kind(TokenKind::Arrow) {
            let span = self.previous().span;
            self.report(
                DiagnosticCode::LegacyReturnTypeSyntax,
                "Return types must appear before 'function'.",
                span,
            );
            let _ = self.parse_type_until(&[TokenKind::LeftBrace]);
        }

        let body_start = self.consume(
            TokenKind::LeftBrace,
            DiagnosticCode::ExpectedFunctionBody,
            "Expected '{' to begin function body.",
        );
        let mut depth = 1i32;
        let mut body_span = body_start.span;

        while !self.is_at_end() && depth > 0 {
            let token = self.advance();
            if token.kind == TokenKind::LeftBrace {
                depth += 1;
            } else if token.kind == TokenKind::RightBrace {
                depth -= 1;
                body_span.end = token.span.end;
            }
        }

        if depth != 0 {
            self.report(
                DiagnosticCode::UnterminatedFunctionBody,
                "Unterminated function body.",
                body_start.span,
            );
        }

        name_span = name_span.merge(body_span);
        function.span = name_span;
        function
    }

    fn parse_blueprint(&mut self, modifiers: Vec<String>) -> BlueprintDeclaration {
        let mut blueprint = BlueprintDeclaration {
            modifiers,
            ..BlueprintDeclaration::default()
        };

        let name_token = self.consume(
            TokenKind::Identifier,
            DiagnosticCode::ExpectedBlueprintName,
            "Expected blueprint name.",
        );
        blueprint.name = name_token.text;

        let open_brace = self.consume(
            TokenKind::LeftBrace,
            DiagnosticCode::ExpectedBlueprintBody,
            "Expected '{' after blueprint name.",
        );

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            let attributes = if self.check(TokenKind::LeftBracket) {
                self.parse_attributes()
            } else {
                Vec::new()
            };

            let mut field = self.parse_field();
            field.attributes = attributes;
            blueprint.fields.push(field);

            self.match_kind(TokenKind::Semicolon);
        }

        let closing = self.consume(
            TokenKind::RightBrace,
            DiagnosticCode::ExpectedBlueprintEnd,
            "Expected '}' to close blueprint.",
        );
        blueprint.span = open_brace.span.merge(closing.span);
        blueprint.span.begin = name_token.span.begin;
        blueprint
    }

    // --- Attributes ---

    fn parse_attributes(&mut self) -> Vec<Attribute> {
        let mut attributes = Vec::new();
        while self.match_kind(TokenKind::LeftBracket) {
            attributes.push(self.parse_attribute());
            self.consume(
                TokenKind::RightBracket,
                DiagnosticCode::ExpectedAttributeEnd,
                "Expected ']' after attribute.",
            );
        }
        attributes
    }

    fn parse_attribute(&mut self) -> Attribute {
        let mut attribute = Attribute::default();
        let name_token = self.consume(
            TokenKind::Identifier,
            DiagnosticCode::ExpectedAttributeName,
            "Expected attribute identifier.",
        );
        attribute.name = name_token.text;
        attribute.span.begin = name_token.span.begin;

        if self.match_kind(TokenKind::LeftParen) {
            while !self.check(TokenKind::RightParen) && !self.is_at_end() {
                let argument = self.parse_attribute_argument();
                attribute.arguments.push(argument);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(
                TokenKind::RightParen,
                DiagnosticCode::ExpectedAttributeArgumentsEnd,
                "Expected ')' after attribute arguments.",
            );
        }

        attribute.span.end = self.previous().span.end;
        attribute
    }

    fn parse_attribute_argument(&mut self) -> AttributeArgument {
        let mut argument = AttributeArgument::default();

        if !(self.check(TokenKind::Identifier)
            || self.check(TokenKind::IntegerLiteral)
            || self.check(TokenKind::StringLiteral))
        {
            let span = self.peek().span;
            self.report(
                DiagnosticCode::ExpectedAttributeArgument,
                "Expected attribute argument.",
                span,
            );
            return argument;
        }

        let first_token = self.advance();

        if self.match_kind(TokenKind::Equals) {
            if first_token.kind != TokenKind::Identifier {
                self.report(
                    DiagnosticCode::MalformedAttributeArgument,
                    "Named attribute argument must start with an identifier.",
                    first_token.span,
                );
            }

            if !(self.check(TokenKind::Identifier)
                || self.check(TokenKind::IntegerLiteral)
                || self.check(TokenKind::StringLiteral))
            {
                let span = self.peek().span;
                self.report(
                    DiagnosticCode::MalformedAttributeArgument,
                    "Expected value after '=' in attribute argument.",
                    span,
                );
                return argument;
            }

            let value_token = self.advance();
            argument.name = first_token.text;
            argument.value = value_token.text;
            argument.span = SourceSpan::new(first_token.span.begin, value_token.span.end);
        } else {
            argument.value = first_token.text;
            argument.span = first_token.span;
        }

        argument
    }

    // --- Parameters and fields ---

    fn parse_parameter(&mut self) -> Parameter {
        let mut parameter = Parameter::default();

        // Legacy `name : type` spelling is diagnosed but still accepted.
        if self.check(TokenKind::Identifier) && self.look_ahead(1).kind == TokenKind::Colon {
            let legacy_name = self.advance();
            self.advance();

            self.report(
                DiagnosticCode::LegacyParameterSyntax,
                "Parameters must use type-first syntax (for example, 'integer value').",
                legacy_name.span,
            );

            let legacy_type = self.parse_type_until(&[TokenKind::Comma, TokenKind::RightParen]);
            if legacy_type.valid {
                parameter.type_name = legacy_type.text;
                parameter.type_span = legacy_type.span;
                parameter.span = legacy_name.span.merge(legacy_type.span);
            } else {
                parameter.type_span = legacy_name.span;
                parameter.span = legacy_name.span;
            }

            parameter.name = legacy_name.text;
            return parameter;
        }

        let type_capture =
            self.parse_type_before_name(&[TokenKind::Comma, TokenKind::RightParen]);
        if !type_capture.valid {
            let span = self.peek().span;
            self.report(
                DiagnosticCode::ExpectedParameterType,
                "Expected parameter type before name.",
                span,
            );
        } else {
            parameter.type_name = type_capture.text.clone();
            parameter.type_span = type_capture.span;
        }

        let mut name_token = None;
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            parameter.name = token.text.clone();
            name_token = Some(token);
        } else {
            let span = self.peek().span;
            self.report(
                DiagnosticCode::ExpectedParameterName,
                "Expected parameter name after type.",
                span,
            );
        }

        match (&name_token, type_capture.valid) {
            (Some(token), true) => parameter.span = type_capture.span.merge(token.span),
            (Some(token), false) => parameter.span = token.span,
            (None, true) => parameter.span = type_capture.span,
            (None, false) => {}
        }

        parameter
    }

    fn parse_field(&mut self) -> BlueprintField {
        let mut field = BlueprintField::default();

        if self.check(TokenKind::Identifier) && self.look_ahead(1).kind == TokenKind::Colon {
            let legacy_name = self.advance();
            self.advance();

            self.report(
                DiagnosticCode::LegacyFieldSyntax,
                "Fields must use type-first syntax (for example, 'integer value').",
                legacy_name.span,
            );

            let legacy_type = self.parse_type_until(&[
                TokenKind::Semicolon,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
            ]);
            if legacy_type.valid {
                field.type_name = legacy_type.text;
                field.type_span = legacy_type.span;
                field.span = legacy_name.span.merge(legacy_type.span);
            } else {
                field.type_span = legacy_name.span;
                field.span = legacy_name.span;
            }

            field.name = legacy_name.text;
            return field;
        }

        let type_capture = self.parse_type_before_name(&[
            TokenKind::Semicolon,
            TokenKind::RightBrace,
            TokenKind::LeftBracket,
        ]);
        if !type_capture.valid {
            let span = self.peek().span;
            self.report(
                DiagnosticCode::ExpectedFieldType,
                "Expected field type before name.",
                span,
            );
        } else {
            field.type_name = type_capture.text.clone();
            field.type_span = type_capture.span;
        }

        let mut name_token = None;
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            field.name = token.text.clone();
            name_token = Some(token);
        } else {
            let span = self.peek().span;
            self.report(
                DiagnosticCode::ExpectedFieldName,
                "Expected field name after type.",
                span,
            );
        }

        match (&name_token, type_capture.valid) {
            (Some(token), true) => field.span = type_capture.span.merge(token.span),
            (Some(token), false) => field.span = token.span,
            (None, true) => field.span = type_capture.span,
            (None, false) => {}
        }

        field
    }

    fn parse_qualified_name(
        &mut self,
        code: DiagnosticCode,
        message: &str,
    ) -> (String, SourceSpan) {
        if !self.check(TokenKind::Identifier) {
            let span = self.peek().span;
            self.report(code, message, span);
            return (String::new(), SourceSpan::default());
        }

        let first = self.advance();
        let mut name = first.text;
        let mut span = first.span;

        while self.match_kind(TokenKind::Dot) {
            name.push_str(&self.previous().text);

            if !self.check(TokenKind::Identifier) {
                let at = self.peek().span;
                self.report(code, "Expected identifier segment after '.'.", at);
                break;
            }

            let part = self.advance();
            name.push_str(&part.text);
            span.end = part.span.end;
        }

        (name, span)
    }

    // --- Type captures ---

    /// Consumes a type up to, but not including, the identifier that names
    /// the declared parameter or field. The lookahead that spots that
    /// identifier checks the token after it against the closers that can
    /// legally follow a name.
    fn parse_type_before_name(&mut self, terminators: &[TokenKind]) -> TypeCapture {
        let mut capture = TypeCapture::default();
        let mut last_was_punctuation = true;
        let mut angle_depth = 0i32;

        while !self.is_at_end() {
            let token_kind = self.peek().kind;

            if token_kind == TokenKind::Identifier {
                let next = self.look_ahead(1).kind;
                let closes_name = match next {
                    TokenKind::Comma
                    | TokenKind::RightParen
                    | TokenKind::Semicolon
                    | TokenKind::RightBrace
                    | TokenKind::Equals
                    | TokenKind::EndOfFile => true,
                    TokenKind::LeftBracket => !self.bracket_is_array_suffix(2),
                    _ => false,
                };
                if closes_name {
                    break;
                }
            }

            if self.is_capture_terminator(token_kind, terminators, angle_depth) {
                break;
            }

            let consumed = self.advance();
            Self::accumulate_capture(
                self,
                &consumed,
                &mut capture,
                &mut last_was_punctuation,
                &mut angle_depth,
            );
        }

        capture
    }

    /// Consumes a type through an explicit terminator set, e.g. up to the
    /// `function` keyword.
    fn parse_type_until(&mut self, terminators: &[TokenKind]) -> TypeCapture {
        let mut capture = TypeCapture::default();
        let mut last_was_punctuation = true;
        let mut angle_depth = 0i32;

        while !self.is_at_end() {
            let token_kind = self.peek().kind;

            if self.is_capture_terminator(token_kind, terminators, angle_depth) {
                break;
            }

            let consumed = self.advance();
            Self::accumulate_capture(
                self,
                &consumed,
                &mut capture,
                &mut last_was_punctuation,
                &mut angle_depth,
            );
        }

        capture
    }

    fn accumulate_capture(
        &mut self,
        consumed: &Token,
        capture: &mut TypeCapture,
        last_was_punctuation: &mut bool,
        angle_depth: &mut i32,
    ) {
        if consumed.kind == TokenKind::LessThan {
            *angle_depth += 1;
        } else if consumed.kind == TokenKind::GreaterThan && *angle_depth > 0 {
            *angle_depth -= 1;
        }

        if consumed.text.is_empty() {
            return;
        }

        // A space is re-inserted only between two word-like tokens, so
        // `pointer<byte>` and `constant byte` both round-trip faithfully.
        let punctuation = matches!(
            consumed.kind,
            TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::Dot
                | TokenKind::Ampersand
                | TokenKind::Asterisk
                | TokenKind::LeftBracket
                | TokenKind::RightBracket
                | TokenKind::Comma
                | TokenKind::Colon
        );

        if !capture.valid {
            capture.span.begin = consumed.span.begin;
        }

        if !capture.text.is_empty() && !punctuation && !*last_was_punctuation {
            capture.text.push(' ');
        }

        capture.text.push_str(&consumed.text);
        capture.span.end = consumed.span.end;
        capture.valid = true;
        *last_was_punctuation = punctuation;
    }
}
