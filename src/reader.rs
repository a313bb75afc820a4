//! Materialization of the value at the tokenizer cursor

use indexmap::IndexMap;

use crate::error::Result;
use crate::tokenizer::{JsonTokenizer, Token};
use crate::value::{parse_number, Value};

/// Materialize the next value from the stream.
pub fn read_value(tok: &mut JsonTokenizer<'_>) -> Result<Value> {
    let first = tok.next_token()?;
    read_from(tok, first)
}

/// Materialize a value whose first token was already consumed.
///
/// Objects keep their keys in tokenizer order; tokens with no value
/// representation materialize as `Null`.
pub fn read_from(tok: &mut JsonTokenizer<'_>, first: Token) -> Result<Value> {
    match first {
        Token::ObjectStart => {
            let mut map = IndexMap::new();
            loop {
                match tok.next_token()? {
                    Token::Key(key) => {
                        let value = read_value(tok)?;
                        map.insert(key, value);
                    }
                    Token::ObjectEnd => break,
                    Token::Eof => {
                        return Err(tok.err("unexpected end of input in object"))
                    }
                    _ => {}
                }
            }
            Ok(Value::Object(map))
        }
        Token::ArrayStart => {
            let mut items = Vec::new();
            loop {
                match tok.next_token()? {
                    Token::ArrayEnd => break,
                    Token::Eof => {
                        return Err(tok.err("unexpected end of input in array"))
                    }
                    element => items.push(read_from(tok, element)?),
                }
            }
            Ok(Value::Array(items))
        }
        Token::String(s) => Ok(Value::String(s)),
        Token::Number(lexeme) => Ok(parse_number(&lexeme)),
        Token::Bool(b) => Ok(Value::Bool(b)),
        Token::Null => Ok(Value::Null),
        Token::Key(_) | Token::ObjectEnd | Token::ArrayEnd | Token::Eof => Ok(Value::Null),
    }
}
