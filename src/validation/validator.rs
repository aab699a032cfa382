//! Types the joined frame into a `Table` of records.
use super::rules::RULES;
use crate::error::{CoreError, Result, Side};
use crate::store::{columns, Cell, Frame, JoinKey, Record, RecordInputs, Table};

/// Reads a joined frame row by row into `Record`s.
///
/// This is the only place the pipeline looks columns up by name. Everything
/// downstream works with typed fields. The conversion is all-or-nothing: the
/// first missing or malformed value aborts it and no table is produced.
pub struct Validator<'a> {
    frame: &'a Frame,
}

impl<'a> Validator<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    /// # Errors
    /// - `MissingColumn` if a required column is absent, or empty for a row.
    /// - `InvalidCell` if a value is not numeric or breaks a domain rule.
    pub fn into_table(self) -> Result<Table> {
        let mut records = Vec::with_capacity(self.frame.row_count());
        for row in 0..self.frame.row_count() {
            let record = self.read_record(row)?;
            if let Some(err) = RULES.iter().find_map(|rule| rule(row, &record)) {
                return Err(err);
            }
            records.push(record);
        }
        tracing::debug!(records = records.len(), "validated joined table");
        Ok(Table::from_records(records))
    }

    fn read_record(&self, row: usize) -> Result<Record> {
        let key = self.read_key(row)?;
        let inputs = RecordInputs {
            co2_emissions: self.required(row, &key, columns::CO2_EMISSIONS)?,
            green_subsidies: self.required(row, &key, columns::GREEN_SUBSIDIES)?,
            env_tax_revenue: self.required(row, &key, columns::ENV_TAX_REVENUE)?,
            debt_pct_gdp: self.required(row, &key, columns::DEBT_PCT_GDP)?,
            private_investment: self.optional(row, columns::PRIVATE_INVESTMENT)?,
        };
        Ok(Record::new(key, inputs))
    }

    fn read_key(&self, row: usize) -> Result<JoinKey> {
        let country = match self.frame.cell(columns::COUNTRY, row) {
            Some(cell) => cell.as_text(),
            None => None,
        };
        let year = self.frame.cell(columns::YEAR, row).and_then(Cell::as_year);
        match (country, year) {
            (Some(country), Some(year)) => Ok(JoinKey::new(country, year)),
            (None, _) => Err(self.invalid(row, columns::COUNTRY, "missing country")),
            (_, None) => Err(self.invalid(row, columns::YEAR, "missing or non-integer year")),
        }
    }

    fn required(&self, row: usize, key: &JoinKey, column: &str) -> Result<f64> {
        let missing = || CoreError::MissingColumn { column: column.to_string(), key: key.clone() };
        match self.frame.cell(column, row) {
            None | Some(Cell::Empty) => Err(missing()),
            Some(Cell::Number(v)) => Ok(*v),
            Some(Cell::Text(s)) => Err(self.invalid(row, column, &format!("'{}' is not a number", s))),
        }
    }

    fn optional(&self, row: usize, column: &str) -> Result<Option<f64>> {
        match self.frame.cell(column, row) {
            None | Some(Cell::Empty) => Ok(None),
            Some(Cell::Number(v)) => Ok(Some(*v)),
            Some(Cell::Text(s)) => Err(self.invalid(row, column, &format!("'{}' is not a number", s))),
        }
    }

    fn invalid(&self, row: usize, column: &str, message: &str) -> CoreError {
        CoreError::InvalidCell { side: Side::Joined, row, column: column.to_string(), message: message.to_string() }
    }
}
