use std::fmt::Display;

use full_moon::{
    ast::{
        Call, Expression, Field, FunctionArgs, FunctionCall, Index, MethodCall, Prefix, Suffix,
        TableConstructor,
    },
    node::Node,
    tokenizer::TokenReference,
    visitors::Visitor,
};
use tracing::trace;

use crate::{
    diagnostic::{Diagnostic, Origin, Position},
    literal::{self, string_value},
    rules::{self, Rule, Shape},
    scan_into, ScriptScan,
};

/// A value a rule can be applied to: a field value or a call's first argument.
#[derive(Clone, Copy)]
enum Value<'a> {
    Expression(&'a Expression),
    /// `f "literal"` call sugar.
    Token(&'a TokenReference),
    /// `f { ... }` call sugar.
    Table(&'a TableConstructor),
}

impl<'a> Value<'a> {
    fn string_literal(self) -> Option<(String, &'a TokenReference)> {
        let token = match self {
            Value::Token(token) => token,
            Value::Expression(expression) => match strip_parentheses(expression) {
                Expression::String(token) => token,
                _ => return None,
            },
            Value::Table(_) => return None,
        };
        string_value(token).map(|value| (value, token))
    }

    fn table(self) -> Option<&'a TableConstructor> {
        match self {
            Value::Table(table) => Some(table),
            Value::Expression(expression) => match strip_parentheses(expression) {
                Expression::TableConstructor(table) => Some(table),
                _ => None,
            },
            Value::Token(_) => None,
        }
    }

    fn start_position(self) -> Option<full_moon::tokenizer::Position> {
        match self {
            Value::Expression(expression) => expression.start_position(),
            Value::Token(token) => Some(token.token().start_position()),
            Value::Table(table) => table.start_position(),
        }
    }

    fn snippet(self) -> String {
        match self {
            Value::Expression(expression) => expression.to_string(),
            Value::Token(token) => token.to_string(),
            Value::Table(table) => table.to_string(),
        }
    }
}

fn strip_parentheses(mut expression: &Expression) -> &Expression {
    while let Expression::Parentheses {
        expression: inner, ..
    } = expression
    {
        expression = inner.as_ref();
    }
    expression
}

/// Where a rule was matched, for diagnostics.
#[derive(Clone, Copy)]
enum Site<'a> {
    Field(&'a str),
    Method(&'a str),
    Function(&'a str),
}

impl Site<'_> {
    fn describe(self) -> String {
        match self {
            Site::Field(name) => format!("table field `{name}`"),
            Site::Method(name) => format!("first argument of method `{name}`"),
            Site::Function(name) => format!("first argument of function `{name}`"),
        }
    }
}

/// Name a free call is made through, tracked while walking call suffixes.
enum Callee {
    Named(String),
    /// `t[expr](...)`
    Dynamic,
    /// `(expr)(...)` or `f()(...)`
    Unknown,
}

/// Walks one script's syntax tree and collects resource strings into `scan`.
pub(crate) struct ResourceVisitor<'s> {
    origin: Origin,
    scan: &'s mut ScriptScan,
}

impl<'s> ResourceVisitor<'s> {
    pub fn new(origin: Origin, scan: &'s mut ScriptScan) -> Self {
        Self { origin, scan }
    }

    fn locate(&self, position: full_moon::tokenizer::Position) -> Position {
        self.origin
            .locate(Position::new(position.line(), position.character()))
    }

    fn report(
        &mut self,
        position: Option<full_moon::tokenizer::Position>,
        snippet: impl Display,
        message: String,
    ) {
        let position = position.map(|p| self.locate(p));
        self.scan.diagnostics.push(Diagnostic {
            position,
            message,
            snippet: Some(snippet.to_string().trim().to_string()),
        });
    }

    fn apply(&mut self, rule: &Rule, value: Value<'_>, site: Site<'_>) {
        let found = match rule.shape {
            Shape::Single => match value.string_literal() {
                Some((literal, _)) => vec![literal],
                None => {
                    return self.report(
                        value.start_position(),
                        value.snippet(),
                        format!("expected a constant string for {}", site.describe()),
                    )
                }
            },
            Shape::Multi => match value.table() {
                Some(table) => table_strings(table),
                None => {
                    return self.report(
                        value.start_position(),
                        value.snippet(),
                        format!("expected a table of strings for {}", site.describe()),
                    )
                }
            },
            Shape::SingleOrMulti => match (value.string_literal(), value.table()) {
                (Some((literal, _)), _) => vec![literal],
                (None, Some(table)) => table_strings(table),
                (None, None) => {
                    return self.report(
                        value.start_position(),
                        value.snippet(),
                        format!(
                            "expected a constant string or a table of strings for {}",
                            site.describe()
                        ),
                    )
                }
            },
            Shape::EmbeddedScript => match value.string_literal() {
                Some((script, token)) => {
                    let opening = self.locate(token.token().start_position());
                    let origin = if literal::skips_leading_newline(token) {
                        Origin::embedded_at(Position::new(opening.line + 1, 0))
                    } else {
                        Origin::embedded_at(opening)
                    };
                    trace!("Scanning embedded script for {}", site.describe());
                    scan_into(&script, origin, self.scan);
                    return;
                }
                None => {
                    return self.report(
                        value.start_position(),
                        value.snippet(),
                        format!("expected a constant script string for {}", site.describe()),
                    )
                }
            },
        };

        self.scan.resources.extend(rule.transform(found));
    }

    fn method_call(&mut self, method: &MethodCall) {
        let name = method.name().token().to_string();
        if let Some(rule) = rules::method_rule(&name) {
            if let Some(value) = first_argument(method.args()) {
                self.apply(rule, value, Site::Method(&name));
            }
        }
    }

    fn free_call(&mut self, callee: &Callee, args: &FunctionArgs, call: &FunctionCall) {
        let Some(value) = first_argument(args) else {
            return;
        };
        match callee {
            Callee::Named(name) => {
                if let Some(rule) = rules::function_rule(name) {
                    self.apply(rule, value, Site::Function(name));
                }
            }
            Callee::Dynamic => self.report(
                call.start_position(),
                call,
                "unable to determine name of dynamic function call".into(),
            ),
            Callee::Unknown => self.report(
                call.start_position(),
                call,
                "could not determine function name".into(),
            ),
        }
    }
}

impl Visitor for ResourceVisitor<'_> {
    fn visit_field(&mut self, field: &Field) {
        if let Field::NameKey { key, value, .. } = field {
            let name = key.token().to_string();
            if let Some(rule) = rules::table_field_rule(&name) {
                self.apply(rule, Value::Expression(value), Site::Field(&name));
            }
        }
    }

    fn visit_function_call(&mut self, call: &FunctionCall) {
        let mut callee = match call.prefix() {
            Prefix::Name(name) => Callee::Named(name.token().to_string()),
            _ => Callee::Unknown,
        };

        for suffix in call.suffixes() {
            callee = match suffix {
                Suffix::Index(Index::Dot { name, .. }) => Callee::Named(name.token().to_string()),
                Suffix::Index(_) => Callee::Dynamic,
                Suffix::Call(Call::AnonymousCall(args)) => {
                    self.free_call(&callee, args, call);
                    Callee::Unknown
                }
                Suffix::Call(Call::MethodCall(method)) => {
                    self.method_call(method);
                    Callee::Unknown
                }
                _ => Callee::Unknown,
            };
        }
    }
}

fn first_argument(args: &FunctionArgs) -> Option<Value<'_>> {
    match args {
        FunctionArgs::Parentheses { arguments, .. } => {
            arguments.iter().next().map(Value::Expression)
        }
        FunctionArgs::String(token) => Some(Value::Token(token)),
        FunctionArgs::TableConstructor(table) => Some(Value::Table(table)),
        _ => None,
    }
}

/// String literals among a table constructor's values, whatever their keys.
fn table_strings(table: &TableConstructor) -> Vec<String> {
    table
        .fields()
        .iter()
        .filter_map(|field| match field {
            Field::NoKey(value)
            | Field::NameKey { value, .. }
            | Field::ExpressionKey { value, .. } => Some(value),
            _ => None,
        })
        .filter_map(|value| match value {
            Expression::String(token) => string_value(token),
            _ => None,
        })
        .collect()
}
