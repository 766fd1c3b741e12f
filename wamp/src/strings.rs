use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{anychar, char, one_of},
    combinator::{all_consuming, map, map_opt, verify},
    error::{ErrorKind, ParseError},
    multi::fold_many0,
    sequence::{delimited, preceded},
    IResult,
};

fn hex_char<'a, E: ParseError<&'a str>>(
    prefix: char,
    digits: usize,
) -> impl Fn(&'a str) -> IResult<&'a str, char, E> {
    preceded(
        char(prefix),
        map_opt(
            take_while_m_n(digits, digits, |ch: char| ch.is_ascii_hexdigit()),
            |hex: &str| u32::from_str_radix(hex, 16).ok().and_then(std::char::from_u32),
        ),
    )
}

fn octal_char<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, char, E> {
    map_opt(
        take_while_m_n(1, 3, |ch: char| ch.is_digit(8)),
        |octal: &str| u32::from_str_radix(octal, 8).ok().and_then(std::char::from_u32),
    )(i)
}

fn simple_escape<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, char, E> {
    map(one_of("\\\"'ntrabfv"), |ch| match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'v' => '\x0b',
        other => other,
    })(i)
}

fn escape<'a, E: ParseError<&'a str>>(i: &'a str) -> IResult<&'a str, char, E> {
    preceded(
        char('\\'),
        alt((simple_escape, hex_char('x', 2), hex_char('u', 4), octal_char)),
    )(i)
}

fn quoted<'a, E: ParseError<&'a str>>(
    quote: char,
) -> impl Fn(&'a str) -> IResult<&'a str, String, E> {
    move |i: &'a str| {
        delimited(
            char(quote),
            fold_many0(
                alt((
                    escape,
                    verify(anychar, move |ch: &char| *ch != '\\' && *ch != quote),
                )),
                String::new(),
                |mut text, ch| {
                    text.push(ch);
                    text
                },
            ),
            char(quote),
        )(i)
    }
}

/// Decodes the content of a single- or double-quoted literal token.
pub fn decode(literal: &str) -> Option<String> {
    let parsed: IResult<&str, String, (&str, ErrorKind)> =
        all_consuming(alt((quoted('"'), quoted('\''))))(literal);

    parsed.ok().map(|(_, text)| text)
}

/// Escapes bytes for a data-section string literal.
pub fn escape_data(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            ch if ch.is_ascii_control() => {
                escaped.push_str(&format!("\\{:02x}", ch as u32));
            }
            other => escaped.push(other),
        }
    }

    escaped
}
