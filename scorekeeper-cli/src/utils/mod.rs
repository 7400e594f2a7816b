use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use scorekeeper_core::Side;

/// Reads input from stdin after printing a message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prompt<'a> {
    msg: &'a str,
}

impl<'a> Prompt<'a> {
    #[inline]
    pub fn new(msg: &'a str) -> Self {
        Self { msg }
    }

    /// Reads a single line. Returns `None` once stdin is closed.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        {
            let mut writer = io::stdout().lock();
            writer.write_all(self.msg.as_bytes())?;
            writer.write_all(b": ")?;
            writer.flush()?;
        }

        let mut string = String::new();
        if io::stdin().lock().read_line(&mut string)? == 0 {
            return Ok(None);
        }

        Ok(Some(string.trim_end_matches(['\r', '\n']).to_owned()))
    }

    /// Read until a valid element is input.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if stdin cannot be read or is closed.
    pub fn read_valid<T>(&self) -> io::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            let line = self
                .read_line()?
                .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;

            match line.parse() {
                Ok(val) => return Ok(val),
                Err(err) => println!("Failed to parse input: {}", err),
            }
        }
    }

    /// Asks a yes/no question. Anything but `y` or `yes` is a no.
    pub fn confirm(&self) -> io::Result<bool> {
        let line = self.read_line()?.unwrap_or_default();
        Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

/// Parses a side given as `a`/`b` or `1`/`2`.
pub fn parse_side(s: &str) -> Result<Side, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "a" | "1" => Ok(Side::A),
        "b" | "2" => Ok(Side::B),
        _ => Err(format!("invalid side {:?}, expected a or b", s)),
    }
}

/// Prints `rows` as a table with aligned columns.
pub fn print_table<const N: usize>(header: [&str; N], rows: &[[String; N]]) {
    let mut widths = header.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String; N]| {
        let cells: Vec<_> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:width$}", cell, width = width))
            .collect();
        println!("{}", cells.join(" | ").trim_end());
    };

    line(&header.map(String::from));
    for row in rows {
        line(row);
    }
}
