use crate::machine::{AccessWidth, ImageMachine, Machine};
use crate::parsers::{self, parse_literal_u64};
use nom::alphanumeric;
use std::str;

// The reference machine only understands single operands, there is no operator grammar
#[derive(Debug, PartialEq, Eq)]
pub enum Atom {
    Number(u64),
    Register(String),
    /// A register or number read through memory `depth` times.
    Deref(usize, Box<Atom>),
}

named!(
    pub parse_atom<Atom>,
    complete!(
        map!(
            pair!(
                opt!(is_a!("*")),
                alt_complete!(
                    parse_register  |
                    parse_number
                )
            )
            , |(stars, base): (Option<&[u8]>, Atom)| match stars.map_or(0, |stars| stars.len()) {
                0 => base,
                depth => Atom::Deref(depth, Box::new(base)),
            }
        )
    )
);

named!(
    parse_register<Atom>,
    map!(
        map_res!(
            preceded!(tag!("$"), alphanumeric)
            , str::from_utf8
        )
        , |name: &str| Atom::Register(name.to_string())
    )
);

named!(
    parse_number<Atom>,
    map!(parse_literal_u64, Atom::Number)
);

pub fn evaluate(machine: &mut ImageMachine, expression: &str) -> Option<i64> {
    let atom = parsers::parse_all(expression.trim(), parse_atom)?;
    evaluate_atom(machine, &atom)
}

fn evaluate_atom(machine: &mut ImageMachine, atom: &Atom) -> Option<i64> {
    match *atom {
        Atom::Number(value) => Some(value as i64),
        Atom::Register(ref name) => machine.register(name).map(|value| value as i64),
        Atom::Deref(depth, ref base) => {
            let mut value = evaluate_atom(machine, base)?;
            for _ in 0..depth {
                value = machine
                    .read_memory(value as u64, AccessWidth::Word)
                    .ok()? as i64;
            }
            Some(value)
        }
    }
}
