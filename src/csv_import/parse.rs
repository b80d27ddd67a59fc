//! Parses CSV files with a header row into new expenses or income.
//!
//! The columns `descricao`, `valor`, `data` and `categoria` are required and
//! may appear in any order. Header names are matched case-insensitively.

use csv::{ReaderBuilder, StringRecord, Trim};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    expense::{NewExpense, PaymentMethod},
    income::NewIncome,
};

const REQUIRED_COLUMNS: [&str; 4] = ["descricao", "valor", "data", "categoria"];

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const BR_DATE: &[BorrowedFormatItem<'_>] = format_description!("[day]/[month]/[year]");

/// The positions of the known columns in a CSV header.
#[derive(Debug, Clone, Copy)]
struct Columns {
    description: usize,
    amount: usize,
    date: usize,
    category: usize,
    payment_method: Option<usize>,
    source: Option<usize>,
}

impl Columns {
    /// # Errors
    /// Returns [Error::MissingCSVColumns] listing every required column that
    /// is not in `header`.
    fn from_header(header: &StringRecord) -> Result<Self, Error> {
        let position = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|&name| position(name).is_none())
            .map(str::to_owned)
            .collect();

        match (
            position("descricao"),
            position("valor"),
            position("data"),
            position("categoria"),
        ) {
            (Some(description), Some(amount), Some(date), Some(category)) => Ok(Self {
                description,
                amount,
                date,
                category,
                payment_method: position("forma_pagamento"),
                source: position("fonte"),
            }),
            _ => Err(Error::MissingCSVColumns(missing)),
        }
    }
}

/// The fields shared by expense and income rows.
struct CommonFields {
    description: String,
    amount: f64,
    date: Date,
    category: String,
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

fn optional_field(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .map(|index| field(record, index))
        .filter(|text| !text.is_empty())
}

/// Parse an amount written as `1234.56`, `1,234.56` or in the Brazilian style
/// `1.234,56`. Several commas with no dot, e.g. `1,234,567`, are ambiguous and
/// rejected.
fn parse_amount(text: &str) -> Result<f64, String> {
    let invalid = || format!("\"{text}\" is not a valid amount");

    // The separator written last is the decimal one, the other groups thousands.
    let normalized = match (text.rfind(','), text.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => text.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => text.replace(',', ""),
        (Some(_), None) if text.matches(',').count() > 1 => return Err(invalid()),
        (Some(_), None) => text.replace(',', "."),
        (None, _) => text.to_owned(),
    };

    normalized.parse().map_err(|_| invalid())
}

/// Parse a date written either as `YYYY-MM-DD` or `DD/MM/YYYY`.
fn parse_date(text: &str) -> Result<Date, String> {
    Date::parse(text, ISO_DATE)
        .or_else(|_| Date::parse(text, BR_DATE))
        .map_err(|_| format!("\"{text}\" is not a valid date"))
}

fn parse_common_fields(record: &StringRecord, columns: &Columns) -> Result<CommonFields, String> {
    Ok(CommonFields {
        description: field(record, columns.description).to_owned(),
        amount: parse_amount(field(record, columns.amount))?,
        date: parse_date(field(record, columns.date))?,
        category: field(record, columns.category).to_owned(),
    })
}

/// Read the header and every record of `text`, calling `parse_row` on each record.
///
/// Nothing is returned unless every row parses, so that an import is all or nothing.
///
/// # Errors
/// Returns:
/// - [Error::MissingCSVColumns] if a required column is missing from the header,
/// - [Error::InvalidCSV] naming the first row that could not be read or parsed.
fn parse_rows<T>(
    text: &str,
    parse_row: impl Fn(&StringRecord, &Columns) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(error.to_string()))?;
    let columns = Columns::from_header(header)?;

    reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            // Row numbers count the header as row 1.
            let row = index + 2;
            let record = record.map_err(|error| Error::InvalidCSV(format!("row {row}: {error}")))?;

            parse_row(&record, &columns).map_err(|error| {
                let message = match error {
                    Error::InvalidCSV(message) => message,
                    error => error.to_string(),
                };

                Error::InvalidCSV(format!("row {row}: {message}"))
            })
        })
        .collect()
}

/// Parse a CSV file of expenses.
///
/// Rows without a `forma_pagamento` are treated as paid in cash. Credit card
/// purchases cannot be imported since they need a card.
pub fn parse_expenses(text: &str) -> Result<Vec<NewExpense>, Error> {
    parse_rows(text, |record, columns| {
        let fields = parse_common_fields(record, columns).map_err(Error::InvalidCSV)?;
        let payment_method = match optional_field(record, columns.payment_method) {
            Some(method) => method.parse()?,
            None => PaymentMethod::Dinheiro,
        };

        if payment_method == PaymentMethod::Credito {
            return Err(Error::MissingCard);
        }

        let expense = NewExpense {
            description: fields.description,
            date: fields.date,
            amount: fields.amount,
            category: fields.category,
            payment_method,
        };
        expense.validate()?;

        Ok(expense)
    })
}

/// Parse a CSV file of one-off income.
pub fn parse_incomes(text: &str) -> Result<Vec<NewIncome>, Error> {
    parse_rows(text, |record, columns| {
        let fields = parse_common_fields(record, columns).map_err(Error::InvalidCSV)?;

        let income = NewIncome {
            description: fields.description,
            date: fields.date,
            amount: fields.amount,
            category: fields.category,
            source: optional_field(record, columns.source).map(str::to_owned),
            receipt_method: None,
            recurrence_interval: None,
        };
        income.validate()?;

        Ok(income)
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, expense::PaymentMethod};

    use super::{parse_amount, parse_expenses, parse_incomes};

    #[test]
    fn parses_expenses_in_any_column_order() {
        let text = "\
            data,Categoria,valor,descricao,forma_pagamento\n\
            2025-03-01,Mercado,152.30,Feira da semana,pix\n\
            05/03/2025,Transporte,\"1.234,50\",Revisão do carro,\n";

        let expenses = parse_expenses(text).unwrap();

        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].description, "Feira da semana");
        assert_eq!(expenses[0].date, date!(2025 - 03 - 01));
        assert_eq!(expenses[0].amount, 152.30);
        assert_eq!(expenses[0].payment_method, PaymentMethod::Pix);
        assert_eq!(expenses[1].date, date!(2025 - 03 - 05));
        assert_eq!(expenses[1].amount, 1234.50);
        assert_eq!(expenses[1].payment_method, PaymentMethod::Dinheiro);
    }

    #[test]
    fn missing_columns_are_listed() {
        let text = "descricao,data\nCafé,2025-03-01\n";

        assert_eq!(
            parse_expenses(text),
            Err(Error::MissingCSVColumns(vec![
                "valor".to_owned(),
                "categoria".to_owned()
            ]))
        );
    }

    #[test]
    fn empty_file_is_missing_every_column() {
        assert!(matches!(
            parse_incomes(""),
            Err(Error::MissingCSVColumns(columns)) if columns.len() == 4
        ));
    }

    #[test]
    fn bad_row_names_the_row() {
        let text = "descricao,valor,data,categoria\n\
            Café,8.50,2025-03-01,Lazer\n\
            Pão,abc,2025-03-02,Mercado\n";

        assert_eq!(
            parse_expenses(text),
            Err(Error::InvalidCSV(
                "row 3: \"abc\" is not a valid amount".to_owned()
            ))
        );
    }

    #[test]
    fn credit_rows_are_rejected() {
        let text = "descricao,valor,data,categoria,forma_pagamento\n\
            TV,2000,2025-03-01,Casa,credito\n";

        assert_eq!(
            parse_expenses(text),
            Err(Error::InvalidCSV(
                "row 2: credit card purchases must reference a card".to_owned()
            ))
        );
    }

    #[test]
    fn parses_income_source() {
        let text = "descricao,valor,data,categoria,fonte\n\
            Salário,5000,2025-03-05,Salário,Empresa X\n\
            Venda,120,2025-03-09,Extra,\n";

        let incomes = parse_incomes(text).unwrap();

        assert_eq!(incomes[0].source.as_deref(), Some("Empresa X"));
        assert_eq!(incomes[1].source, None);
        assert_eq!(incomes[1].recurrence_interval, None);
    }

    #[test]
    fn amounts_accept_both_decimal_styles() {
        assert_eq!(parse_amount("10.5"), Ok(10.5));
        assert_eq!(parse_amount("10,5"), Ok(10.5));
        assert_eq!(parse_amount("2.500,00"), Ok(2500.0));
        assert_eq!(parse_amount("1,234.56"), Ok(1234.56));
        assert!(parse_amount("1,234,567").is_err());
        assert!(parse_amount("").is_err());
    }
}
