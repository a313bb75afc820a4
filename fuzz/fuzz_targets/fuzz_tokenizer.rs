#![no_main]

use libfuzzer_sys::fuzz_target;

use mapquery::reader::read_value;
use mapquery::tokenizer::{JsonTokenizer, Token};

fuzz_target!(|data: &[u8]| {
    // Tokenizing arbitrary bytes must terminate without panicking.
    let mut tok = JsonTokenizer::new(data);
    loop {
        match tok.next_token() {
            Ok(Token::Eof) | Err(_) => break,
            Ok(_) => {}
        }
    }

    // Materialization must be equally robust.
    let mut tok = JsonTokenizer::new(data);
    let _ = read_value(&mut tok);
});
