// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Filter predicates and function-index keys. An expression is stored twice:
//! as canonical source text and as a postcard encoded token stream. Both
//! address attributes and the owning class by name, so a rename leaves them
//! stale until [`recompile`] rewrites them.

use altera_catalog::{ClassDef, ConstraintDef, StoredExpression, name::names_equal};
use altera_type::{
	Error, Result,
	error::diagnostic::{catalog, constraint},
	internal_error, return_error,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::EngineError;

const KEYWORDS: &[&str] = &[
	"AND", "OR", "NOT", "IS", "NULL", "IN", "LIKE", "BETWEEN", "TRUE", "FALSE", "CASE", "WHEN", "THEN", "ELSE", "END",
	"ESCAPE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
	Attribute,
	Class,
	Function,
	Keyword,
	Literal,
	Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	pub kind: TokenKind,
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledExpression {
	pub class: String,
	pub tokens: Vec<Token>,
}

impl CompiledExpression {
	pub fn attributes(&self) -> impl Iterator<Item = &str> {
		self.tokens.iter().filter(|t| t.kind == TokenKind::Attribute).map(|t| t.text.as_str())
	}

	/// Canonical source text. Identifiers are bracketed so that any name
	/// survives a round trip.
	pub fn render(&self) -> String {
		let mut out = String::new();
		let mut previous: Option<&Token> = None;
		for token in &self.tokens {
			let glue = match previous {
				None => true,
				Some(prev) => {
					prev.kind == TokenKind::Function
						|| matches!(prev.text.as_str(), "(" | ".")
						|| (prev.kind == TokenKind::Class)
						|| (token.kind == TokenKind::Symbol && matches!(token.text.as_str(), ")" | "," | "."))
				}
			};
			if !glue {
				out.push(' ');
			}
			match token.kind {
				TokenKind::Attribute | TokenKind::Class => {
					out.push('[');
					out.push_str(&token.text);
					out.push(']');
				}
				_ => out.push_str(&token.text),
			}
			previous = Some(token);
		}
		out
	}
}

/// Where an expression sits in its constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionRole {
	Filter,
	Function,
}

impl ExpressionRole {
	/// Statement the expression is re-parsed in.
	pub fn synthetic_statement(&self, text: &str, class: &str) -> String {
		match self {
			ExpressionRole::Filter => format!("SELECT * FROM [{}] WHERE {}", class, text),
			ExpressionRole::Function => format!("SELECT {} FROM [{}]", text, class),
		}
	}
}

/// Attribute renames to apply while recompiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Renames {
	pub attributes: SmallVec<[(String, String); 2]>,
}

impl Renames {
	pub fn none() -> Self {
		Self::default()
	}

	pub fn attribute(from: impl Into<String>, to: impl Into<String>) -> Self {
		let mut renames = Self::default();
		renames.attributes.push((from.into(), to.into()));
		renames
	}

	fn apply<'a>(&'a self, name: &'a str) -> &'a str {
		self.attributes.iter().find(|(from, _)| names_equal(from, name)).map(|(_, to)| to.as_str()).unwrap_or(name)
	}
}

struct Cursor<'a> {
	input: &'a str,
	position: usize,
}

impl<'a> Cursor<'a> {
	fn new(input: &'a str) -> Self {
		Self {
			input,
			position: 0,
		}
	}

	fn peek(&self) -> Option<char> {
		self.input[self.position..].chars().next()
	}

	fn peek_ahead(&self, n: usize) -> Option<char> {
		self.input[self.position..].chars().nth(n)
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.position += ch.len_utf8();
		Some(ch)
	}

	fn is_eof(&self) -> bool {
		self.position >= self.input.len()
	}

	fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(char::is_whitespace) {
			self.bump();
		}
	}

	fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
		let start = self.position;
		while self.peek().is_some_and(&f) {
			self.bump();
		}
		&self.input[start..self.position]
	}

	/// Next non-blank character, without consuming anything.
	fn next_significant(&self) -> Option<char> {
		self.input[self.position..].chars().find(|c| !c.is_whitespace())
	}
}

#[derive(Debug)]
enum Lexeme {
	Identifier(String),
	Quoted(String),
	Literal(String),
	Symbol(String),
}

fn invalid(text: &str, reason: impl Into<String>) -> Error {
	EngineError::InvalidExpression {
		expression: text.to_string(),
		reason: reason.into(),
	}
	.into()
}

fn scan(text: &str) -> Result<Vec<(Lexeme, Option<char>)>> {
	let mut cursor = Cursor::new(text);
	let mut lexemes = Vec::new();

	loop {
		cursor.skip_whitespace();
		if cursor.is_eof() {
			break;
		}

		let lexeme = match cursor.peek() {
			Some('\'') => {
				cursor.bump();
				let mut literal = String::from("'");
				loop {
					match cursor.bump() {
						Some('\'') if cursor.peek() == Some('\'') => {
							cursor.bump();
							literal.push_str("''");
						}
						Some('\'') => break,
						Some(ch) => literal.push(ch),
						None => return Err(invalid(text, "unterminated string literal")),
					}
				}
				literal.push('\'');
				Lexeme::Literal(literal)
			}
			Some(open @ ('[' | '"')) => {
				cursor.bump();
				let close = if open == '[' {
					']'
				} else {
					'"'
				};
				let name = cursor.take_while(|c| c != close).to_string();
				if cursor.bump() != Some(close) {
					return Err(invalid(text, "unterminated quoted identifier"));
				}
				Lexeme::Quoted(name)
			}
			Some(ch) if ch.is_ascii_digit() => {
				let mut number = cursor.take_while(|c| c.is_ascii_digit()).to_string();
				if cursor.peek() == Some('.') && cursor.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
					cursor.bump();
					number.push('.');
					number.push_str(cursor.take_while(|c| c.is_ascii_digit()));
				}
				Lexeme::Literal(number)
			}
			Some(ch) if ch.is_alphabetic() || ch == '_' => {
				Lexeme::Identifier(cursor.take_while(|c| c.is_alphanumeric() || c == '_').to_string())
			}
			Some(ch) => {
				let pair: String = [Some(ch), cursor.peek_ahead(1)].into_iter().flatten().collect();
				if matches!(pair.as_str(), "<=" | ">=" | "<>" | "!=" | "||") {
					cursor.bump();
					cursor.bump();
					Lexeme::Symbol(pair)
				} else if "()+-*/%=<>,.".contains(ch) {
					cursor.bump();
					Lexeme::Symbol(ch.to_string())
				} else {
					return Err(invalid(text, format!("unexpected character `{}`", ch)));
				}
			}
			None => break,
		};

		lexemes.push((lexeme, cursor.next_significant()));
	}

	Ok(lexemes)
}

fn tokenize(text: &str, class: &ClassDef) -> Result<Vec<Token>> {
	let mut tokens = Vec::new();

	for (lexeme, next) in scan(text)? {
		let token = match lexeme {
			Lexeme::Literal(text) => Token {
				kind: TokenKind::Literal,
				text,
			},
			Lexeme::Symbol(text) => Token {
				kind: TokenKind::Symbol,
				text,
			},
			Lexeme::Identifier(word) if next == Some('(') => Token {
				kind: TokenKind::Function,
				text: word.to_ascii_uppercase(),
			},
			Lexeme::Identifier(word) if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(&word)) => Token {
				kind: TokenKind::Keyword,
				text: word.to_ascii_uppercase(),
			},
			Lexeme::Identifier(name) | Lexeme::Quoted(name) => {
				if next == Some('.') {
					if !names_equal(&name, &class.name) {
						return_error!(catalog::class_not_found(&name));
					}
					Token {
						kind: TokenKind::Class,
						text: class.name.clone(),
					}
				} else {
					let Some(attribute) = class.find_attribute(&name) else {
						return_error!(catalog::attribute_not_found(&class.name, &name));
					};
					Token {
						kind: TokenKind::Attribute,
						text: attribute.name.clone(),
					}
				}
			}
		};
		tokens.push(token);
	}

	if tokens.is_empty() {
		return Err(invalid(text, "empty expression"));
	}
	Ok(tokens)
}

fn store(compiled: &CompiledExpression) -> Result<StoredExpression> {
	let bytes = postcard::to_stdvec(compiled)
		.map_err(|e| Error::new(internal_error!("failed to serialize expression: {}", e)))?;
	Ok(StoredExpression {
		text: compiled.render(),
		compiled: bytes,
	})
}

/// Resolves every name in `text` against `class` and stores the result.
pub fn compile(text: &str, class: &ClassDef) -> Result<StoredExpression> {
	let compiled = CompiledExpression {
		class: class.name.clone(),
		tokens: tokenize(text, class)?,
	};
	store(&compiled)
}

pub fn decode(stored: &StoredExpression) -> Result<CompiledExpression> {
	postcard::from_bytes(&stored.compiled)
		.map_err(|e| Error::new(internal_error!("failed to deserialize expression: {}", e)))
}

/// Rewrites a stored expression for `class`: class references are pointed
/// at `class`, renamed attributes are substituted and the result is resolved
/// again. Any failure is fatal to the statement.
pub fn recompile(
	stored: &StoredExpression,
	role: ExpressionRole,
	constraint_name: &str,
	class: &ClassDef,
	renames: &Renames,
) -> Result<StoredExpression> {
	let statement = role.synthetic_statement(&stored.text, &class.name);
	let fail = |reason: String| Error::new(constraint::expression_recompile_failed(constraint_name, &statement, &reason));

	let mut compiled = decode(stored).map_err(|err| fail(err.message.clone()))?;
	for token in &mut compiled.tokens {
		match token.kind {
			TokenKind::Attribute => token.text = renames.apply(&token.text).to_string(),
			TokenKind::Class => token.text = class.name.clone(),
			_ => {}
		}
	}
	compiled.class = class.name.clone();

	let text = compiled.render();
	let tokens = tokenize(&text, class).map_err(|err| fail(err.message.clone()))?;
	trace!(constraint = constraint_name, statement = %statement, "expression recompiled");
	store(&CompiledExpression {
		class: class.name.clone(),
		tokens,
	})
}

pub fn mentions(stored: &StoredExpression, attribute: &str) -> bool {
	decode(stored).is_ok_and(|compiled| compiled.attributes().any(|name| names_equal(name, attribute)))
}

pub fn constraint_mentions(constraint: &ConstraintDef, attribute: &str) -> bool {
	constraint.filter.iter().chain(constraint.function.iter()).any(|e| mentions(e, attribute))
}

/// Copy of `constraint` with both expressions recompiled for `class`.
pub fn recompile_constraint(constraint: &ConstraintDef, class: &ClassDef, renames: &Renames) -> Result<ConstraintDef> {
	let mut result = constraint.clone();
	if let Some(filter) = &constraint.filter {
		result.filter = Some(recompile(filter, ExpressionRole::Filter, &constraint.name, class, renames)?);
	}
	if let Some(function) = &constraint.function {
		result.function = Some(recompile(function, ExpressionRole::Function, &constraint.name, class, renames)?);
	}
	Ok(result)
}
