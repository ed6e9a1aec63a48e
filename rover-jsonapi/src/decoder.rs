//! Streaming Resource Decoder.
//!
//! Walks a JSON:API document once, reading only the top-level `data` and
//! `included` members. Each resource object is reduced to its
//! `(type, id, attributes)` triple and handed to a [`ResourceFactory`].
//!
//! Failure policy:
//! - structural errors abort the decode and propagate;
//! - a resource the factory cannot map is dropped;
//! - a malformed scalar inside `attributes` is skipped on its own;
//! - nesting past [`MAX_DEPTH`](crate::reader::MAX_DEPTH) is a structural error.

use rover_api::Attributes;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::DecodeError;
use crate::reader::{JsonReader, Token, TokenReader};

/// Builds a domain object from a decoded resource.
///
/// Returning `None` means "not a type I know" and is not an error.
pub trait ResourceFactory<T> {
    fn create(&self, kind: &str, id: Option<&str>, attributes: &Attributes) -> Option<T>;
}

impl<T, F> ResourceFactory<T> for F
where
    F: Fn(&str, Option<&str>, &Attributes) -> Option<T>,
{
    fn create(&self, kind: &str, id: Option<&str>, attributes: &Attributes) -> Option<T> {
        self(kind, id, attributes)
    }
}

/// The primary `data` member of a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary<T> {
    /// `data` was absent, null, or a single unmapped resource.
    Empty,
    Single(T),
    List(Vec<T>),
}

impl<T> Primary<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Primary::Empty => Vec::new(),
            Primary::Single(item) => vec![item],
            Primary::List(items) => items,
        }
    }

    pub fn into_single(self) -> Option<T> {
        match self {
            Primary::Single(item) => Some(item),
            Primary::Empty | Primary::List(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Primary::Empty => 0,
            Primary::Single(_) => 1,
            Primary::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one decode: the primary payload plus mapped `included` resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<T> {
    pub data: Primary<T>,
    pub included: Vec<T>,
}

/// A resource object before mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResource {
    pub kind: String,
    pub id: Option<String>,
    pub attributes: Attributes,
}

/// Decode a complete document from bytes.
pub fn decode_slice<T, F>(bytes: &[u8], factory: &F) -> Result<Document<T>, DecodeError>
where
    F: ResourceFactory<T> + ?Sized,
{
    let mut reader = JsonReader::new(bytes);
    decode_document(&mut reader, factory)
}

/// Decode a document from any token stream.
pub fn decode_document<T, R, F>(reader: &mut R, factory: &F) -> Result<Document<T>, DecodeError>
where
    R: TokenReader + ?Sized,
    F: ResourceFactory<T> + ?Sized,
{
    let mut data = Primary::Empty;
    let mut included = Vec::new();

    reader.begin_object()?;
    while reader.has_next()? {
        let name = reader.next_name()?;
        match name.as_str() {
            "data" => data = read_primary(reader, factory)?,
            "included" => included = read_included(reader, factory)?,
            _ => {
                trace!(member = %name, "skipping top-level member");
                reader.skip_value()?;
            }
        }
    }
    reader.end_object()?;

    debug!(
        primary = data.len(),
        included = included.len(),
        "decoded document"
    );
    Ok(Document { data, included })
}

fn read_primary<T, R, F>(reader: &mut R, factory: &F) -> Result<Primary<T>, DecodeError>
where
    R: TokenReader + ?Sized,
    F: ResourceFactory<T> + ?Sized,
{
    match reader.peek()? {
        Token::BeginObject => {
            let raw = read_resource(reader)?;
            Ok(map_resource(&raw, factory).map_or(Primary::Empty, Primary::Single))
        }
        Token::BeginArray => Ok(Primary::List(read_resource_array(reader, factory)?)),
        Token::Null => {
            reader.next_null()?;
            Ok(Primary::Empty)
        }
        other => Err(DecodeError::UnexpectedToken {
            expected: "resource object or array",
            found: format!("{:?}", other),
            offset: reader.offset(),
        }),
    }
}

fn read_included<T, R, F>(reader: &mut R, factory: &F) -> Result<Vec<T>, DecodeError>
where
    R: TokenReader + ?Sized,
    F: ResourceFactory<T> + ?Sized,
{
    match reader.peek()? {
        Token::BeginArray => read_resource_array(reader, factory),
        Token::Null => {
            reader.next_null()?;
            Ok(Vec::new())
        }
        other => {
            warn!(found = ?other, "`included` is not an array, ignoring");
            reader.skip_value()?;
            Ok(Vec::new())
        }
    }
}

fn read_resource_array<T, R, F>(reader: &mut R, factory: &F) -> Result<Vec<T>, DecodeError>
where
    R: TokenReader + ?Sized,
    F: ResourceFactory<T> + ?Sized,
{
    let mut items = Vec::new();
    reader.begin_array()?;
    while reader.has_next()? {
        if reader.peek()? != Token::BeginObject {
            debug!(offset = reader.offset(), "skipping non-object array entry");
            reader.skip_value()?;
            continue;
        }
        let raw = read_resource(reader)?;
        if let Some(item) = map_resource(&raw, factory) {
            items.push(item);
        }
    }
    reader.end_array()?;
    Ok(items)
}

fn map_resource<T, F>(raw: &RawResource, factory: &F) -> Option<T>
where
    F: ResourceFactory<T> + ?Sized,
{
    let mapped = factory.create(&raw.kind, raw.id.as_deref(), &raw.attributes);
    if mapped.is_none() {
        debug!(kind = %raw.kind, id = ?raw.id, "dropping unmapped resource");
    }
    mapped
}

/// Read one resource object, skipping `relationships`, `links` and `meta`.
pub fn read_resource<R>(reader: &mut R) -> Result<RawResource, DecodeError>
where
    R: TokenReader + ?Sized,
{
    let mut raw = RawResource::default();
    reader.begin_object()?;
    while reader.has_next()? {
        let name = reader.next_name()?;
        match name.as_str() {
            "type" => raw.kind = read_identifier(reader)?.unwrap_or_default(),
            "id" => raw.id = read_identifier(reader)?,
            "attributes" if reader.peek()? == Token::BeginObject => {
                raw.attributes = read_object(reader)?;
            }
            _ => reader.skip_value()?,
        }
    }
    reader.end_object()?;
    Ok(raw)
}

/// Strings as-is, numbers as their literal text, anything else `None`.
fn read_identifier<R>(reader: &mut R) -> Result<Option<String>, DecodeError>
where
    R: TokenReader + ?Sized,
{
    match reader.peek()? {
        Token::String | Token::Number => reader.next_string().map(Some),
        _ => {
            reader.skip_value()?;
            Ok(None)
        }
    }
}

/// Read an object into a generic map, omitting members whose value is malformed.
pub fn read_object<R>(reader: &mut R) -> Result<Attributes, DecodeError>
where
    R: TokenReader + ?Sized,
{
    let mut map = Attributes::new();
    reader.begin_object()?;
    while reader.has_next()? {
        let name = match reader.next_name() {
            Ok(name) => name,
            Err(err) if err.is_recoverable() => {
                debug!(error = %err, "skipping member with malformed name");
                reader.skip_value()?;
                continue;
            }
            Err(err) => return Err(err),
        };
        if let Some(value) = read_value(reader)? {
            map.insert(name, value);
        }
    }
    reader.end_object()?;
    Ok(map)
}

/// Read any JSON value.
///
/// Returns `Ok(None)` when a scalar was malformed and has been skipped.
pub fn read_value<R>(reader: &mut R) -> Result<Option<Value>, DecodeError>
where
    R: TokenReader + ?Sized,
{
    let value = match reader.peek()? {
        Token::BeginObject => Value::Object(read_object(reader)?),
        Token::BeginArray => {
            let mut items = Vec::new();
            reader.begin_array()?;
            while reader.has_next()? {
                if let Some(item) = read_value(reader)? {
                    items.push(item);
                }
            }
            reader.end_array()?;
            Value::Array(items)
        }
        Token::String => match reader.next_string() {
            Ok(s) => Value::String(s),
            Err(err) => return skip_recoverable(err),
        },
        Token::Number => match reader.next_number() {
            Ok(n) => Value::Number(n),
            Err(err) => return skip_recoverable(err),
        },
        Token::Bool => Value::Bool(reader.next_bool()?),
        Token::Null => {
            reader.next_null()?;
            Value::Null
        }
        Token::Malformed => {
            debug!(offset = reader.offset(), "skipping unknown literal");
            reader.skip_value()?;
            return Ok(None);
        }
        other => {
            return Err(DecodeError::UnexpectedToken {
                expected: "value",
                found: format!("{:?}", other),
                offset: reader.offset(),
            });
        }
    };
    Ok(Some(value))
}

fn skip_recoverable(err: DecodeError) -> Result<Option<Value>, DecodeError> {
    if err.is_recoverable() {
        debug!(error = %err, "skipping malformed value");
        Ok(None)
    } else {
        Err(err)
    }
}
