//! Parse schema DSL source into an AST using PEST.

use crate::ast::*;
use crate::descriptor::PrimitiveType;
use crate::schema::SchemaError;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct SchemaParser;

/// Parse schema source into an AST. Type names are not resolved here.
pub fn parse_schema(source: &str) -> Result<SchemaFile, SchemaError> {
    let pairs = SchemaParser::parse(Rule::schema, source)
        .map_err(|e| SchemaError::Syntax(e.to_string()))?;
    let pair = pairs
        .into_iter()
        .next()
        .ok_or_else(|| SchemaError::Syntax("empty parse".to_string()))?;
    build_schema(pair)
}

fn build_schema(pair: Pair<Rule>) -> Result<SchemaFile, SchemaError> {
    let mut file = SchemaFile::default();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::enum_section => file.enums.push(build_enum(inner)?),
            Rule::message_section => file.messages.push(build_message(inner)?),
            _ => {}
        }
    }
    Ok(file)
}

fn build_enum(pair: Pair<Rule>) -> Result<EnumSection, SchemaError> {
    let mut name = String::new();
    let mut variants = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::enum_variant => {
                let mut it = inner.into_inner();
                let var_name = it.next().ok_or_else(|| missing("enum variant name"))?;
                let value = it.next().ok_or_else(|| missing("enum variant value"))?;
                variants.push((var_name.as_str().to_string(), parse_number(value)?));
            }
            _ => {}
        }
    }
    if name.is_empty() {
        return Err(missing("enum name"));
    }
    Ok(EnumSection { name, variants })
}

fn build_message(pair: Pair<Rule>) -> Result<MessageSection, SchemaError> {
    let mut name = String::new();
    let mut fields = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::message_field => fields.push(build_field(inner)?),
            _ => {}
        }
    }
    if name.is_empty() {
        return Err(missing("message name"));
    }
    Ok(MessageSection { name, fields })
}

fn build_field(pair: Pair<Rule>) -> Result<FieldSection, SchemaError> {
    let mut name = None;
    let mut repeated = false;
    let mut type_ref = None;
    let mut index = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = Some(inner.as_str().to_string()),
            Rule::repeated => repeated = true,
            Rule::type_name => type_ref = Some(build_type_ref(inner)?),
            Rule::number => index = Some(parse_number(inner)?),
            _ => {}
        }
    }
    Ok(FieldSection {
        name: name.ok_or_else(|| missing("field name"))?,
        type_ref: type_ref.ok_or_else(|| missing("field type"))?,
        repeated,
        index: index.ok_or_else(|| missing("field index"))?,
    })
}

fn build_type_ref(pair: Pair<Rule>) -> Result<TypeRef, SchemaError> {
    let inner = pair.into_inner().next().ok_or_else(|| missing("type name"))?;
    match inner.as_rule() {
        Rule::primitive_type => Ok(TypeRef::Primitive(parse_primitive_type(inner.as_str())?)),
        _ => Ok(TypeRef::Named(inner.as_str().to_string())),
    }
}

fn parse_primitive_type(s: &str) -> Result<PrimitiveType, SchemaError> {
    match s {
        "number" => Ok(PrimitiveType::Number),
        "bool" | "boolean" => Ok(PrimitiveType::Boolean),
        "string" => Ok(PrimitiveType::String),
        _ => Err(SchemaError::Syntax(format!("unknown primitive type: {}", s))),
    }
}

fn parse_number(pair: Pair<Rule>) -> Result<u32, SchemaError> {
    let s = pair.as_str();
    s.parse::<u32>()
        .map_err(|_| SchemaError::Syntax(format!("number {} does not fit in 32 bits", s)))
}

fn missing(what: &str) -> SchemaError {
    SchemaError::Syntax(format!("missing {}", what))
}
