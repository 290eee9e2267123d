use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FIAT_CODE_RE: Regex = Regex::new(r"^[a-zA-Z]{3,5}$").unwrap();
}

/// Positional arguments of `/buy` and `/sell`, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderArgs {
    pub amount_sats: u64,
    pub amount_fiat: f64,
    pub fiat_code: String,
    pub payment_method: String,
    pub price_margin: Option<f64>,
}

#[derive(Debug)]
pub enum ParseArgsError {
    TooFew(usize),
    InvalidSatsAmount(String),
    InvalidFiatAmount(String),
    InvalidFiatCode(String),
}

impl Display for ParseArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseArgsError::TooFew(got) => {
                write!(f, "expected at least 4 arguments, got {}", got)
            }
            ParseArgsError::InvalidSatsAmount(arg) => {
                write!(f, "not a positive sats amount: {}", arg)
            }
            ParseArgsError::InvalidFiatAmount(arg) => {
                write!(f, "not a positive fiat amount: {}", arg)
            }
            ParseArgsError::InvalidFiatCode(arg) => {
                write!(f, "not a fiat currency code: {}", arg)
            }
        }
    }
}

impl std::error::Error for ParseArgsError {}

/// Pure parse of the whitespace-split tokens after the command itself.
///
/// Order: `<monto_en_sats> <monto_en_fiat> <codigo_fiat> <método_de_pago>
/// [margen_de_precio]`. The payment method is free text: when the trailing
/// token parses as a number it is taken as the margin, everything between
/// the fiat code and the margin joins into the payment method.
pub fn parse(tokens: &[&str]) -> Result<OrderArgs, ParseArgsError> {
    if tokens.len() < 4 {
        return Err(ParseArgsError::TooFew(tokens.len()));
    }

    let amount_sats = tokens[0]
        .parse::<u64>()
        .ok()
        .filter(|sats| *sats > 0)
        .ok_or_else(|| ParseArgsError::InvalidSatsAmount(tokens[0].to_owned()))?;

    let amount_fiat = tokens[1]
        .parse::<f64>()
        .ok()
        .filter(|fiat| *fiat > 0.0)
        .ok_or_else(|| ParseArgsError::InvalidFiatAmount(tokens[1].to_owned()))?;

    if !FIAT_CODE_RE.is_match(tokens[2]) {
        return Err(ParseArgsError::InvalidFiatCode(tokens[2].to_owned()));
    }
    let fiat_code = tokens[2].to_lowercase();

    let trailing_margin = tokens[tokens.len() - 1].parse::<f64>().ok();
    let (method_tokens, price_margin) = match trailing_margin {
        Some(margin) if tokens.len() > 4 => (&tokens[3..tokens.len() - 1], Some(margin)),
        _ => (&tokens[3..], None),
    };

    Ok(OrderArgs {
        amount_sats,
        amount_fiat,
        fiat_code,
        payment_method: method_tokens.join(" "),
        price_margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_sell_args() {
        let args = parse(&["100", "1", "ves", "Pagomovil"]).unwrap();

        assert_eq!(args.amount_sats, 100);
        assert_eq!(args.amount_fiat, 1.0);
        assert_eq!(args.fiat_code, "ves");
        assert_eq!(args.payment_method, "Pagomovil");
        assert_eq!(args.price_margin, None);
    }

    #[test]
    fn too_few_arguments() {
        assert!(matches!(parse(&[]), Err(ParseArgsError::TooFew(0))));
        assert!(matches!(
            parse(&["100", "1", "ves"]),
            Err(ParseArgsError::TooFew(3))
        ));
    }

    #[test]
    fn trailing_number_is_the_margin() {
        let args = parse(&["100", "1", "ves", "Pagomovil", "-2.5"]).unwrap();
        assert_eq!(args.payment_method, "Pagomovil");
        assert_eq!(args.price_margin, Some(-2.5));
    }

    #[test]
    fn multiword_payment_method() {
        let args = parse(&["21000", "350.5", "ARS", "transferencia", "bancaria", "3"]).unwrap();

        assert_eq!(args.fiat_code, "ars");
        assert_eq!(args.payment_method, "transferencia bancaria");
        assert_eq!(args.price_margin, Some(3.0));

        let no_margin = parse(&["21000", "350.5", "ars", "transferencia", "bancaria"]).unwrap();
        assert_eq!(no_margin.payment_method, "transferencia bancaria");
        assert_eq!(no_margin.price_margin, None);
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(matches!(
            parse(&["0", "1", "ves", "Pagomovil"]),
            Err(ParseArgsError::InvalidSatsAmount(_))
        ));
        assert!(matches!(
            parse(&["-100", "1", "ves", "Pagomovil"]),
            Err(ParseArgsError::InvalidSatsAmount(_))
        ));
        assert!(matches!(
            parse(&["100", "0", "ves", "Pagomovil"]),
            Err(ParseArgsError::InvalidFiatAmount(_))
        ));
    }

    #[test]
    fn rejects_bad_fiat_code() {
        assert!(matches!(
            parse(&["100", "1", "v3s", "Pagomovil"]),
            Err(ParseArgsError::InvalidFiatCode(_))
        ));
        assert!(matches!(
            parse(&["100", "1", "x", "Pagomovil"]),
            Err(ParseArgsError::InvalidFiatCode(_))
        ));
    }
}
