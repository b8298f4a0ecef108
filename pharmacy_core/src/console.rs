//! Operator input and output.
//!
//! [`Console`] is the prompt/display collaborator used by the interactive
//! workflows. Typed prompts loop until the input parses and return
//! `Ok(None)` once input is exhausted, which callers treat as cancellation.

use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::{BufRead, Write};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        Error::Validation(format!("invalid date '{}', expected YYYY-MM-DD", raw.trim()))
    })
}

/// Parse a non-negative, finite price
pub fn parse_price(raw: &str) -> Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Validation(format!("invalid price '{}'", raw.trim())))?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::Validation(format!(
            "price must be non-negative, got '{}'",
            raw.trim()
        )));
    }
    Ok(price)
}

/// Parse a non-negative whole quantity
pub fn parse_quantity(raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("invalid quantity '{}'", raw.trim())))
}

/// Line-oriented operator I/O
pub trait Console {
    /// Show `prompt` and read one line. `None` means input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Emit one line of output
    fn say(&mut self, line: &str) -> Result<()>;

    fn prompt_line(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self.read_line(prompt)?.map(|s| s.trim().to_string()))
    }

    fn prompt_int(&mut self, prompt: &str) -> Result<Option<i64>> {
        loop {
            let Some(raw) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match raw.trim().parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.say("Invalid input. Please enter an integer.")?,
            }
        }
    }

    /// Integer prompt restricted to ids and quantities
    fn prompt_count(&mut self, prompt: &str) -> Result<Option<u32>> {
        loop {
            let Some(value) = self.prompt_int(prompt)? else {
                return Ok(None);
            };
            match u32::try_from(value) {
                Ok(count) => return Ok(Some(count)),
                Err(_) => self.say("Invalid input. Please enter a non-negative integer.")?,
            }
        }
    }

    fn prompt_float(&mut self, prompt: &str) -> Result<Option<f64>> {
        loop {
            let Some(raw) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match parse_price(&raw) {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self.say("Invalid input. Please enter a non-negative numeric value.")?,
            }
        }
    }

    fn prompt_date(&mut self, prompt: &str) -> Result<Option<NaiveDate>> {
        loop {
            let Some(raw) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match parse_date(&raw) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => {
                    self.say("Invalid date format. Please enter date in YYYY-MM-DD format.")?
                }
            }
        }
    }

    /// `y`/`yes` confirms; anything else, including end of input, declines
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.prompt_line(prompt)?.unwrap_or_default().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Console over any buffered reader and writer (stdin/stdout in the CLI)
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) type TestConsole = LineConsole<Cursor<Vec<u8>>, Vec<u8>>;

    pub(crate) fn scripted(input: &str) -> TestConsole {
        LineConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    pub(crate) fn transcript(console: TestConsole) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_prompt_int_reprompts_until_valid() {
        let mut console = scripted("abc\n4.5\n42\n");
        assert_eq!(console.prompt_int("n: ").unwrap(), Some(42));

        let out = transcript(console);
        assert_eq!(out.matches("Please enter an integer").count(), 2);
    }

    #[test]
    fn test_prompt_count_rejects_negative() {
        let mut console = scripted("-1\n3\n");
        assert_eq!(console.prompt_count("qty: ").unwrap(), Some(3));
        assert!(transcript(console).contains("non-negative integer"));
    }

    #[test]
    fn test_prompt_returns_none_at_end_of_input() {
        let mut console = scripted("oops\n");
        assert_eq!(console.prompt_int("n: ").unwrap(), None);
    }

    #[test]
    fn test_prompt_date_validates_format() {
        let mut console = scripted("31/01/2027\n2027-01-31\n");
        assert_eq!(
            console.prompt_date("date: ").unwrap(),
            NaiveDate::from_ymd_opt(2027, 1, 31)
        );
    }

    #[test]
    fn test_prompt_float_rejects_negative() {
        let mut console = scripted("-2\n2.75\n");
        assert_eq!(console.prompt_float("price: ").unwrap(), Some(2.75));
    }

    #[test]
    fn test_confirm() {
        assert!(scripted("Y\n").confirm("? ").unwrap());
        assert!(!scripted("n\n").confirm("? ").unwrap());
        assert!(!scripted("").confirm("? ").unwrap());
    }

    #[test]
    fn test_parse_helpers() {
        assert!(parse_price("abc").is_err());
        assert!(parse_price("NaN").is_err());
        assert_eq!(parse_quantity(" 7 ").unwrap(), 7);
        assert!(parse_quantity("-7").is_err());
        assert!(parse_date("2027-02-30").is_err());
    }
}
