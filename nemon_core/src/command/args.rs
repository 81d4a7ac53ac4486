use crate::errors::MonitorError;
use crate::machine::StepCount;
use crate::parsers::{
    hex_u64, parse_all, parse_decimal_literal_u64, parse_hex_literal_u64, parse_literal_i64,
};
use nom::{space, IResult};

pub const STEP_USAGE: &str = "si [N]";
pub const INFO_USAGE: &str = "info r|w";
pub const SCAN_USAGE: &str = "x N EXPR";
pub const PRINT_USAGE: &str = "p EXPR";
pub const WATCH_USAGE: &str = "w EXPR";
pub const DELETE_USAGE: &str = "d N";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoSelector {
    Registers,
    Watchpoints,
}

pub fn parse_step_count(args: Option<&str>) -> Result<StepCount, MonitorError> {
    match args {
        None => Ok(StepCount::Bounded(1)),
        Some(args) => parse_all(args, parse_literal_i64)
            .map(StepCount::from)
            .ok_or(MonitorError::MalformedArgument(STEP_USAGE)),
    }
}

pub fn parse_info_selector(args: Option<&str>) -> Result<InfoSelector, MonitorError> {
    args.and_then(|args| parse_all(args, parse_info))
        .ok_or(MonitorError::MalformedArgument(INFO_USAGE))
}

/// Splits `N EXPR` into the unit count and the untouched expression text.
pub fn parse_scan_args(args: Option<&str>) -> Result<(u64, &str), MonitorError> {
    let args = args.ok_or(MonitorError::MalformedArgument(SCAN_USAGE))?;

    match scan_count(args.as_bytes()) {
        IResult::Done(rest, count) => {
            let expression = args[args.len() - rest.len()..].trim();
            if expression.is_empty() {
                Err(MonitorError::MalformedArgument(SCAN_USAGE))
            } else {
                Ok((count, expression))
            }
        }
        _ => Err(MonitorError::MalformedArgument(SCAN_USAGE)),
    }
}

/// Addresses are hexadecimal, with or without a `0x` prefix.
pub fn parse_address(expression: &str) -> Option<u64> {
    parse_all(expression, parse_address_literal)
}

pub fn parse_watchpoint_id(args: Option<&str>) -> Result<usize, MonitorError> {
    args.and_then(|args| parse_all(args, parse_decimal_literal_u64))
        .map(|id| id as usize)
        .ok_or(MonitorError::MalformedArgument(DELETE_USAGE))
}

named!(
    parse_info<InfoSelector>,
    complete!(
        alt_complete!(
            parse_info_registers |
            parse_info_watchpoints
        )
    )
);

named!(
    parse_info_registers<InfoSelector>,
    map!(
        alt_complete!(
            tag!("registers") |
            tag!("r")
        )
        , |_| InfoSelector::Registers
    )
);

named!(
    parse_info_watchpoints<InfoSelector>,
    map!(
        alt_complete!(
            tag!("watchpoints") |
            tag!("w")
        )
        , |_| InfoSelector::Watchpoints
    )
);

named!(
    scan_count<u64>,
    complete!(terminated!(parse_decimal_literal_u64, space))
);

named!(
    parse_address_literal<u64>,
    complete!(
        alt_complete!(
            parse_hex_literal_u64 |
            hex_u64
        )
    )
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_defaults_to_one() {
        assert_eq!(parse_step_count(None).unwrap(), StepCount::Bounded(1));
        assert_eq!(parse_step_count(Some("10")).unwrap(), StepCount::Bounded(10));
        assert_eq!(parse_step_count(Some("0")).unwrap(), StepCount::Bounded(0));
        assert_eq!(parse_step_count(Some("-1")).unwrap(), StepCount::Unbounded);
    }

    #[test]
    fn step_count_rejects_garbage() {
        assert!(matches!(
            parse_step_count(Some("3x")),
            Err(MonitorError::MalformedArgument(STEP_USAGE))
        ));
        assert!(parse_step_count(Some("ten")).is_err());
    }

    #[test]
    fn info_selectors() {
        assert_eq!(parse_info_selector(Some("r")).unwrap(), InfoSelector::Registers);
        assert_eq!(parse_info_selector(Some("registers")).unwrap(), InfoSelector::Registers);
        assert_eq!(parse_info_selector(Some("w")).unwrap(), InfoSelector::Watchpoints);
        assert_eq!(
            parse_info_selector(Some("watchpoints")).unwrap(),
            InfoSelector::Watchpoints
        );
        assert!(parse_info_selector(None).is_err());
        assert!(parse_info_selector(Some("regs")).is_err());
        assert!(parse_info_selector(Some("b")).is_err());
    }

    #[test]
    fn scan_args_keep_expression_verbatim() {
        assert_eq!(parse_scan_args(Some("4 0x80000000")).unwrap(), (4, "0x80000000"));
        assert_eq!(parse_scan_args(Some("10   *$sp ")).unwrap(), (10, "*$sp"));
    }

    #[test]
    fn scan_args_need_count_and_expression() {
        assert!(parse_scan_args(None).is_err());
        assert!(parse_scan_args(Some("10")).is_err());
        assert!(parse_scan_args(Some("10 ")).is_err());
        assert!(parse_scan_args(Some("$sp 10")).is_err());
    }

    #[test]
    fn addresses_are_hex() {
        assert_eq!(parse_address("0x80000000"), Some(0x8000_0000));
        assert_eq!(parse_address("80000000"), Some(0x8000_0000));
        assert_eq!(parse_address("10"), Some(0x10));
        assert_eq!(parse_address("$sp"), None);
        assert_eq!(parse_address("0x10+4"), None);
    }

    #[test]
    fn watchpoint_ids() {
        assert_eq!(parse_watchpoint_id(Some("3")).unwrap(), 3);
        assert!(parse_watchpoint_id(None).is_err());
        assert!(parse_watchpoint_id(Some("-1")).is_err());
        assert!(parse_watchpoint_id(Some("1 2")).is_err());
    }
}
