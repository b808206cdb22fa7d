//! Thrift IDL subset parsing
//!
//! Extracts service method signatures over base types, which is all the
//! request builder needs to type a case's argument values. Struct, container,
//! and typedef'd argument types are rejected up front rather than mis-encoded.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thriftmark_core::SchemaError;

use crate::binary::TType;

/// Typed argument slot of a service method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Thrift field id
    pub id: i16,
    /// Wire type of the argument
    pub ttype: TType,
    /// Argument name, matched against case values
    pub name: String,
}

/// One service method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSchema {
    /// Method name
    pub name: String,
    /// Declared arguments, in declaration order
    pub args: Vec<FieldSchema>,
}

/// Method signatures collected from every service in a schema source
#[derive(Debug, Clone, Default)]
pub struct ServiceSchema {
    methods: HashMap<String, MethodSchema>,
}

impl ServiceSchema {
    /// Load and parse a schema file.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let source = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Parse schema source text.
    pub fn parse(source: &str) -> Result<Self, SchemaError> {
        let text = strip_comments(source);
        let mut methods = HashMap::new();

        let mut rest = text.as_str();
        let mut found_service = false;
        while let Some(keyword) = find_keyword(rest, "service") {
            found_service = true;
            let after = &rest[keyword + "service".len()..];
            let open = after
                .find('{')
                .ok_or_else(|| SchemaError::Parse("unterminated service block".to_string()))?;
            let body_start = open + 1;
            let close = after[body_start..]
                .find('}')
                .ok_or_else(|| SchemaError::Parse("unterminated service block".to_string()))?;

            parse_service_body(&after[body_start..body_start + close], &mut methods)?;
            rest = &after[body_start + close + 1..];
        }

        if !found_service {
            return Err(SchemaError::Parse(
                "no service definitions found".to_string(),
            ));
        }
        Ok(Self { methods })
    }

    /// Look up a method signature by name.
    pub fn method(&self, name: &str) -> Option<&MethodSchema> {
        self.methods.get(name)
    }

    /// Number of methods across all services.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether any method was declared.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Find a keyword at an identifier boundary.
fn find_keyword(text: &str, keyword: &str) -> Option<usize> {
    for (index, _) in text.match_indices(keyword) {
        let before_ok = index == 0
            || !text[..index]
                .chars()
                .next_back()
                .is_some_and(is_ident_char);
        let after = index + keyword.len();
        let after_ok = !text[after..].chars().next().is_some_and(is_ident_char);
        if before_ok && after_ok {
            return Some(index);
        }
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn parse_service_body(
    body: &str,
    methods: &mut HashMap<String, MethodSchema>,
) -> Result<(), SchemaError> {
    let mut rest = body;
    while let Some(open) = rest.find('(') {
        let head = rest[..open].trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
        let name = head
            .split_whitespace()
            .next_back()
            .ok_or_else(|| SchemaError::Parse(format!("malformed method declaration: {head:?}")))?
            .to_string();

        let close = rest[open + 1..]
            .find(')')
            .ok_or_else(|| SchemaError::Parse(format!("unterminated argument list for {name}")))?;
        let args = parse_args(&rest[open + 1..open + 1 + close])?;
        rest = &rest[open + 1 + close + 1..];

        // A throws clause contributes nothing to the request encoding.
        let trimmed = rest.trim_start();
        if let Some(after_throws) = trimmed.strip_prefix("throws") {
            let topen = after_throws
                .find('(')
                .ok_or_else(|| SchemaError::Parse(format!("malformed throws clause on {name}")))?;
            let tclose = after_throws[topen + 1..]
                .find(')')
                .ok_or_else(|| SchemaError::Parse(format!("malformed throws clause on {name}")))?;
            rest = &after_throws[topen + 1 + tclose + 1..];
        }

        methods.insert(name.clone(), MethodSchema { name, args });
    }
    Ok(())
}

fn parse_args(source: &str) -> Result<Vec<FieldSchema>, SchemaError> {
    let mut args = Vec::new();
    for part in source.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (id_src, decl) = part
            .split_once(':')
            .ok_or_else(|| SchemaError::Parse(format!("malformed argument: {part:?}")))?;
        let id: i16 = id_src
            .trim()
            .parse()
            .map_err(|_| SchemaError::Parse(format!("invalid field id: {id_src:?}")))?;

        let mut tokens = decl.split_whitespace();
        let mut type_token = tokens
            .next()
            .ok_or_else(|| SchemaError::Parse(format!("argument {id} has no type")))?;
        if type_token == "required" || type_token == "optional" {
            type_token = tokens
                .next()
                .ok_or_else(|| SchemaError::Parse(format!("argument {id} has no type")))?;
        }
        let name = tokens
            .next()
            .ok_or_else(|| SchemaError::Parse(format!("argument {id} has no name")))?
            .trim_end_matches([',', ';']);

        args.push(FieldSchema {
            id,
            ttype: base_type(type_token)?,
            name: name.to_string(),
        });
    }
    Ok(args)
}

fn base_type(token: &str) -> Result<TType, SchemaError> {
    match token {
        "bool" => Ok(TType::Bool),
        "byte" | "i8" => Ok(TType::Byte),
        "i16" => Ok(TType::I16),
        "i32" => Ok(TType::I32),
        "i64" => Ok(TType::I64),
        "double" => Ok(TType::Double),
        "string" | "binary" => Ok(TType::String),
        other => Err(SchemaError::UnsupportedType(other.to_string())),
    }
}

/// Remove `//`, `#`, and `/* */` comments, preserving line structure.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '#' => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}
