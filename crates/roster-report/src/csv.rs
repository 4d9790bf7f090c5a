//! Minimal RFC 4180 writer.
//!
//! Fields are quoted only when they contain a separator, a quote or a line
//! break; rows end with `\n`.

/// Quote `field` if needed, doubling inner quotes.
pub(crate) fn escape_field(field: &str) -> std::borrow::Cow<'_, str> {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\"")).into()
  } else {
    field.into()
  }
}

/// Accumulates rows into one in-memory table.
#[derive(Debug, Default)]
pub(crate) struct Table {
  buf: String,
}

impl Table {
  pub(crate) fn row<I, S>(&mut self, fields: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for (i, field) in fields.into_iter().enumerate() {
      if i > 0 {
        self.buf.push(',');
      }
      self.buf.push_str(&escape_field(field.as_ref()));
    }
    self.buf.push('\n');
  }

  pub(crate) fn finish(self) -> String { self.buf }
}
