//! Free-text argument parsing for the transact and convert commands.
//!
//! The transact grammar is a keyword-driven scan: the vocabulary is
//! `as give take at to from for`, the first token must be a keyword, any
//! other token joins the value of the most recent keyword, and `for` is a
//! grammatical sink: once active it consumes every remaining token,
//! keywords included, so a reason may mention "to" without breaking the
//! parse. That also means `for` must come last; this is a documented
//! constraint of the grammar, not a parser accident.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use engine::{Coin, Mode, Purse};

use crate::CommandError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Keyword {
    As,
    Give,
    Take,
    At,
    To,
    From,
    For,
}

impl Keyword {
    fn parse(token: &str) -> Option<Keyword> {
        match token {
            "as" => Some(Keyword::As),
            "give" => Some(Keyword::Give),
            "take" => Some(Keyword::Take),
            "at" => Some(Keyword::At),
            "to" => Some(Keyword::To),
            "from" => Some(Keyword::From),
            "for" => Some(Keyword::For),
            _ => None,
        }
    }
}

/// A fully validated transact instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactArgs {
    /// GM-only initiator override (`as <name>`).
    pub initiator: Option<String>,
    pub mode: Mode,
    pub amounts: Purse,
    /// Signed percentage offset (`at ±N%`).
    pub offset: Option<i64>,
    /// Participant name; `None` is the World counterparty.
    pub participant: Option<String>,
    pub reason: Option<String>,
}

/// A validated convert instruction: a signed delta purse ready to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertArgs {
    pub initiator: Option<String>,
    pub delta: Purse,
}

fn scan_keywords(input: &str) -> Result<HashMap<Keyword, String>, CommandError> {
    let mut tokens = input.split_whitespace();
    let first = tokens.next().ok_or(CommandError::Syntax)?;
    let mut active = Keyword::parse(first).ok_or(CommandError::Syntax)?;

    let mut values: HashMap<Keyword, String> = HashMap::new();
    for token in tokens {
        if active != Keyword::For
            && let Some(keyword) = Keyword::parse(token)
        {
            active = keyword;
            continue;
        }
        match values.entry(active) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().push(' ');
                entry.get_mut().push_str(token);
            }
            Entry::Vacant(entry) => {
                entry.insert(token.to_string());
            }
        }
    }
    Ok(values)
}

pub fn parse_transact(input: &str) -> Result<TransactArgs, CommandError> {
    let mut values = scan_keywords(input)?;

    let (mode, amounts_list) = match (
        values.remove(&Keyword::Give),
        values.remove(&Keyword::Take),
    ) {
        (Some(list), None) => (Mode::Give, list),
        (None, Some(list)) => (Mode::Take, list),
        _ => return Err(CommandError::Syntax),
    };
    let amounts = parse_amounts(&amounts_list)?;

    let offset = values
        .remove(&Keyword::At)
        .map(|raw| parse_offset(&raw))
        .transpose()?;

    // The direction keyword must agree with the mode: `to` pairs with give,
    // `from` with take.
    let participant = match (
        values.remove(&Keyword::To),
        values.remove(&Keyword::From),
        mode,
    ) {
        (Some(name), None, Mode::Give) | (None, Some(name), Mode::Take) => Some(name),
        (None, None, _) => None,
        _ => return Err(CommandError::Syntax),
    };

    Ok(TransactArgs {
        initiator: values.remove(&Keyword::As),
        mode,
        amounts,
        offset,
        participant,
        reason: values.remove(&Keyword::For),
    })
}

/// Comma-separated `<amount> <unit>` terms. Coin amounts must be integers;
/// only EGP terms take decimals, at most two.
fn parse_amounts(list: &str) -> Result<Purse, CommandError> {
    let mut amounts = Purse::EMPTY;
    for term in list.split(',') {
        let mut fields = term.split_whitespace();
        let (Some(number), Some(unit), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(CommandError::Syntax);
        };

        if unit.eq_ignore_ascii_case("egp") {
            amounts.add_copper(parse_egp(number)?);
        } else {
            let coin = Coin::try_from(unit).map_err(|_| CommandError::Syntax)?;
            let count: i64 = number.parse().map_err(|_| CommandError::Syntax)?;
            amounts.add(coin, count);
        }
    }
    Ok(amounts)
}

/// Parses a decimal EGP amount into exact copper (one copper per centi-EGP).
fn parse_egp(raw: &str) -> Result<i64, CommandError> {
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let mut parts = rest.split('.');
    let whole = parts.next().ok_or(CommandError::Syntax)?;
    let fraction = parts.next();
    if parts.next().is_some() {
        return Err(CommandError::Syntax);
    }
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(CommandError::Syntax);
    }
    let whole: i64 = whole.parse().map_err(|_| CommandError::Syntax)?;

    let cents: i64 = match fraction {
        None | Some("") => 0,
        Some(fraction) if fraction.len() <= 2 && fraction.chars().all(|c| c.is_ascii_digit()) => {
            let value: i64 = fraction.parse().map_err(|_| CommandError::Syntax)?;
            if fraction.len() == 1 { value * 10 } else { value }
        }
        Some(_) => return Err(CommandError::Syntax),
    };

    Ok(sign * (whole * 100 + cents))
}

/// `[+|-]N%`; the sign and the percent sign are both required.
fn parse_offset(raw: &str) -> Result<i64, CommandError> {
    let body = raw.strip_suffix('%').ok_or(CommandError::Syntax)?;
    let (sign, digits) = match body.strip_prefix('+') {
        Some(digits) => (1, digits),
        None => (-1, body.strip_prefix('-').ok_or(CommandError::Syntax)?),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CommandError::Syntax);
    }
    let value: i64 = digits.parse().map_err(|_| CommandError::Syntax)?;
    Ok(sign * value)
}

/// `(as <name>) <n> <unit> to <unit>, ...`; every conversion must be
/// integral in the target unit.
pub fn parse_convert(input: &str) -> Result<ConvertArgs, CommandError> {
    let mut terms: Vec<String> = input.split(',').map(|term| term.trim().to_string()).collect();
    if terms.is_empty() || terms[0].is_empty() {
        return Err(CommandError::Syntax);
    }

    let mut initiator = None;
    if let Some(rest) = terms[0].strip_prefix("as ") {
        let mut fields = rest.split_whitespace();
        let name = fields.next().ok_or(CommandError::Syntax)?;
        initiator = Some(name.to_string());
        terms[0] = fields.collect::<Vec<_>>().join(" ");
    }

    let mut delta = Purse::EMPTY;
    for term in &terms {
        let fields: Vec<&str> = term.split_whitespace().collect();
        let [number, from_unit, keyword, to_unit] = fields.as_slice() else {
            return Err(CommandError::Syntax);
        };
        if !keyword.eq_ignore_ascii_case("to") {
            return Err(CommandError::Syntax);
        }

        let amount: i64 = number.parse().map_err(|_| CommandError::Syntax)?;
        let from = Coin::try_from(*from_unit).map_err(|_| CommandError::Syntax)?;
        let to = Coin::try_from(*to_unit).map_err(|_| CommandError::Syntax)?;

        let converted = from.convert(amount, to).ok_or_else(|| {
            CommandError::Conversion(format!("{amount} {from} to {to}"))
        })?;
        delta.add(from, -amount);
        delta.add(to, converted);
    }

    Ok(ConvertArgs { initiator, delta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_transact_line() {
        let args =
            parse_transact("as player1 give 45 gp at -20% to player2 for buying used scale mail")
                .unwrap();
        assert_eq!(args.initiator.as_deref(), Some("player1"));
        assert_eq!(args.mode, Mode::Give);
        assert_eq!(args.amounts.gp, 45);
        assert_eq!(args.offset, Some(-20));
        assert_eq!(args.participant.as_deref(), Some("player2"));
        assert_eq!(args.reason.as_deref(), Some("buying used scale mail"));
    }

    #[test]
    fn minimal_transact_line() {
        let args = parse_transact("take 2 CP, 5 SP").unwrap();
        assert_eq!(args.mode, Mode::Take);
        assert_eq!(args.amounts.cp, 2);
        assert_eq!(args.amounts.sp, 5);
        assert_eq!(args.participant, None);
        assert_eq!(args.reason, None);
    }

    #[test]
    fn first_token_must_be_a_keyword() {
        assert!(matches!(
            parse_transact("gift 5 gp"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(parse_transact(""), Err(CommandError::Syntax)));
    }

    #[test]
    fn reason_swallows_keywords() {
        let args = parse_transact("give 1 gp for paying what I owe to the barkeep").unwrap();
        assert_eq!(
            args.reason.as_deref(),
            Some("paying what I owe to the barkeep")
        );
        assert_eq!(args.participant, None);
    }

    #[test]
    fn mode_is_required_and_exclusive() {
        assert!(matches!(
            parse_transact("at +5%"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(
            parse_transact("give 1 gp take 1 gp"),
            Err(CommandError::Syntax)
        ));
    }

    #[test]
    fn direction_must_agree_with_mode() {
        assert!(matches!(
            parse_transact("give 1 gp from Bob"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(
            parse_transact("take 1 gp to Bob"),
            Err(CommandError::Syntax)
        ));
        assert!(parse_transact("take 1 gp from Bob").is_ok());
    }

    #[test]
    fn coin_amounts_must_be_integers() {
        assert!(matches!(
            parse_transact("give 2.7 cp"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(
            parse_transact("give five gp"),
            Err(CommandError::Syntax)
        ));
    }

    #[test]
    fn egp_amounts_take_up_to_two_decimals() {
        let args = parse_transact("give 24.5 EGP").unwrap();
        assert_eq!(args.amounts, Purse::from_copper(2450));

        let args = parse_transact("give 24.55 egp").unwrap();
        assert_eq!(args.amounts, Purse::from_copper(2455));

        assert!(matches!(
            parse_transact("give 24.555 egp"),
            Err(CommandError::Syntax)
        ));
    }

    #[test]
    fn units_are_case_insensitive() {
        let args = parse_transact("give 400 SP").unwrap();
        assert_eq!(args.amounts.sp, 400);
    }

    #[test]
    fn unknown_unit_is_a_syntax_error() {
        assert!(matches!(
            parse_transact("give 5 zp"),
            Err(CommandError::Syntax)
        ));
    }

    #[test]
    fn offset_requires_sign_and_percent() {
        assert_eq!(parse_transact("give 1 gp at +5%").unwrap().offset, Some(5));
        assert_eq!(
            parse_transact("give 1 gp at -20%").unwrap().offset,
            Some(-20)
        );
        assert!(matches!(
            parse_transact("give 1 gp at 5%"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(
            parse_transact("give 1 gp at +5"),
            Err(CommandError::Syntax)
        ));
    }

    #[test]
    fn convert_single_term() {
        let args = parse_convert("20 cp to sp").unwrap();
        assert_eq!(args.initiator, None);
        assert_eq!(args.delta.cp, -20);
        assert_eq!(args.delta.sp, 2);
    }

    #[test]
    fn convert_with_initiator_and_multiple_terms() {
        let args = parse_convert("as Alice 1 pp to gp, 30 sp to gp").unwrap();
        assert_eq!(args.initiator.as_deref(), Some("Alice"));
        assert_eq!(args.delta.pp, -1);
        assert_eq!(args.delta.sp, -30);
        assert_eq!(args.delta.gp, 13);
    }

    #[test]
    fn convert_rejects_non_integral_result() {
        let err = parse_convert("5 cp to sp").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Conversion(term) if term == "5 CP to SP"
        ));
    }

    #[test]
    fn convert_rejects_malformed_terms() {
        assert!(matches!(
            parse_convert("5 cp into sp"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(
            parse_convert("cp to sp"),
            Err(CommandError::Syntax)
        ));
        assert!(matches!(parse_convert(""), Err(CommandError::Syntax)));
    }
}
