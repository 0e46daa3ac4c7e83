// src/common/format.rs
//
// Formatação de valores para exibição. Só texto: nenhuma conta de negócio mora aqui.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Valor com exatamente duas casas decimais e ponto como separador ("37.50").
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Mesmo valor, mas com vírgula como separador decimal ("450,00").
pub fn format_brl(value: Decimal) -> String {
    format_amount(value).replace('.', ",")
}

/// "R$ 450,00"
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_brl(value))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_has_two_decimals() {
        assert_eq!(format_amount(dec!(37.5)), "37.50");
        assert_eq!(format_amount(dec!(10)), "10.00");
        assert_eq!(format_amount(dec!(0)), "0.00");
    }

    #[test]
    fn amount_rounds_half_away_from_zero() {
        assert_eq!(format_amount(dec!(1.005)), "1.01");
        assert_eq!(format_amount(dec!(2.344)), "2.34");
    }

    #[test]
    fn brl_uses_comma() {
        assert_eq!(format_brl(dec!(450)), "450,00");
        assert_eq!(format_currency(dec!(1234.5)), "R$ 1234,50");
    }

    #[test]
    fn date_is_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "07/03/2024");
    }
}
