use nom::{digit, IResult};
use std::str::{self, FromStr};

const HEX_DIGITS: &[u8] = b"0123456789abcdefABCDEF";

/// Runs `parser` over the whole of `input`, failing if anything is left unconsumed.
pub fn parse_all<O>(input: &str, parser: fn(&[u8]) -> IResult<&[u8], O>) -> Option<O> {
    match parser(input.as_bytes()) {
        IResult::Done(rest, output) if rest.is_empty() => Some(output),
        _ => None,
    }
}

named!(
    pub parse_literal_u64<u64>,
    complete!(
        alt_complete!(
            parse_hex_literal_u64 |
            parse_decimal_literal_u64
        )
    )
);

named!(
    pub parse_hex_literal_u64<u64>,
    preceded!(tag_no_case!("0x"), hex_u64)
);

named!(
    pub parse_decimal_literal_u64<u64>,
    map_res!(
        map_res!(
            digit,
            str::from_utf8
        )
        , FromStr::from_str
    )
);

named!(
    pub parse_literal_i64<i64>,
    complete!(
        map_res!(
            map_res!(
                parse_integer,
                str::from_utf8
            )
            , FromStr::from_str
        )
    )
);

named!(
    parse_integer<&[u8]>,
    recognize!(preceded!(opt!(tag!("-")), digit))
);

// Hex digits with no prefix; more digits than fit in a u64 is a parse error
named!(
    pub hex_u64<u64>,
    map_res!(
        map_res!(
            is_a!(HEX_DIGITS),
            str::from_utf8
        )
        , |digits: &str| u64::from_str_radix(digits, 16)
    )
);
