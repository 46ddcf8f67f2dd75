//! JSON to HTML conversion for `htm=1` requests.
//!
//! Objects carrying a string `type` and a `value` are rendered according to
//! the type tag:
//!
//! | type     | value         | output                                   |
//! |----------|---------------|------------------------------------------|
//! | `aid`    | number        | link to the asset page                   |
//! | `amount` | number/string | colored figure, red `-`, green `+`       |
//! | `cid`    | string        | link to the contract page, shortened     |
//! | `th`     | string        | centered heading                         |
//! | `group`  | array         | rows spliced into the enclosing table    |
//! | `table`  | array         | nested table, optional `more` link       |
//!
//! Anything else renders generically: objects as `<ul>`, arrays as `[a, b]`.

use serde_json::{Map, Value};

use super::amount::Amount;
use super::MAX_DEPTH;
use crate::error::ExplorerError;

const PRELUDE: &str = "\
<!DOCTYPE html>
<html>
<head>
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
<style>
table, th, td {
  border: 1px solid black;
  border-collapse: collapse;
}
td {
  text-align: right;
}
</style>
</head>
<body>
";

const EPILOGUE: &str = "\
</body>
</html>
";

const GROUP_GAP: &str = "<tr></tr><tr></tr><tr></tr>";

/// Display width of shortened contract ids.
pub const SHORT_CHARS: usize = 13;
const SHORT_SUFFIX: &str = "...";

/// Renders one document into an HTML page.
pub struct HtmlConverter<'a> {
    out: String,
    /// Request target the page was generated for; base for "More..." links.
    url: &'a str,
    native_asset: &'a str,
}

impl<'a> HtmlConverter<'a> {
    pub fn new(url: &'a str, native_asset: &'a str) -> Self {
        Self {
            out: String::with_capacity(4096),
            url,
            native_asset,
        }
    }

    /// Render `doc` as a complete page.
    pub fn convert(mut self, doc: &Value) -> Result<String, ExplorerError> {
        self.out.push_str(PRELUDE);
        self.node(doc, 0, 0)?;
        self.out.push_str(EPILOGUE);
        Ok(self.out)
    }

    fn node(&mut self, v: &Value, depth: u32, tbl: u32) -> Result<(), ExplorerError> {
        let depth = depth + 1;
        if depth > MAX_DEPTH {
            return Err(ExplorerError::RecursionLimit);
        }

        match v {
            Value::Object(map) => {
                if self.special(map, depth, tbl)? {
                    return Ok(());
                }
                self.out.push_str("<ul>");
                for (key, child) in map {
                    self.out.push_str("<li>");
                    self.out.push_str(&encode(key));
                    self.out.push_str(": ");
                    self.node(child, depth, tbl)?;
                    self.out.push_str("</li>");
                }
                self.out.push_str("</ul>");
            }
            Value::Array(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.node(item, depth, tbl)?;
                }
                self.out.push(']');
            }
            Value::String(s) => self.out.push_str(&encode(s)),
            Value::Number(n) => self.out.push_str(&n.to_string()),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Null => {}
        }
        Ok(())
    }

    /// Rows of a table. Array elements become `<tr>`, anything else is inlined.
    fn table_data(&mut self, rows: &[Value], depth: u32, tbl: u32) -> Result<(), ExplorerError> {
        for row in rows {
            let Value::Array(cells) = row else {
                self.node(row, depth, tbl)?;
                continue;
            };

            self.out.push_str("<tr>");
            let width = 100 / cells.len().max(1);
            for (j, cell) in cells.iter().enumerate() {
                self.out.push_str("<td");
                if tbl > 1 && j + 1 < cells.len() {
                    self.out.push_str(&format!(" style = \"width:{}%\"", width));
                }
                self.out.push('>');
                self.node(cell, depth, tbl)?;
                self.out.push_str("</td>");
            }
            self.out.push_str("</tr>\n");
        }
        Ok(())
    }

    fn table(&mut self, rows: &[Value], depth: u32, tbl: u32) -> Result<(), ExplorerError> {
        self.out.push_str("<table style=\"width:100%\">\n");
        self.table_data(rows, depth, tbl)?;
        self.out.push_str("</table>\n");
        Ok(())
    }

    /// Returns `Ok(false)` when the object is not a recognized envelope.
    fn special(&mut self, obj: &Map<String, Value>, depth: u32, tbl: u32) -> Result<bool, ExplorerError> {
        let (Some(Value::String(kind)), Some(v)) = (obj.get("type"), obj.get("value")) else {
            return Ok(false);
        };

        match (kind.as_str(), v) {
            ("aid", Value::Number(n)) => {
                let Some(aid) = n.as_u64() else {
                    return Ok(false);
                };
                if aid == 0 {
                    self.out.push_str(self.native_asset);
                } else {
                    self.out
                        .push_str(&format!("<a href = \"asset?htm=1&id={aid}\">Asset-{aid}</a>"));
                }
            }
            ("amount", _) => {
                let Some(amount) = Amount::read(v) else {
                    return Ok(false);
                };
                self.out
                    .push_str(&format!("<p2 style=\"color:{}\">{}</p2>", amount.color(), amount));
            }
            ("cid", Value::String(s)) => {
                let cid = encode(s);
                self.out.push_str(&format!(
                    "<a href = \"contract?htm=1&id={}\">cid-{}</a>",
                    cid,
                    short_of(&cid, SHORT_CHARS)
                ));
            }
            ("th", Value::String(s)) => {
                self.out.push_str("<h3 align=center>");
                self.out.push_str(&encode(s));
                self.out.push_str("</h3>");
            }
            ("group", Value::Array(rows)) => {
                self.out.push_str(GROUP_GAP);
                self.table_data(rows, depth, tbl)?;
                self.out.push_str(GROUP_GAP);
            }
            ("table", Value::Array(rows)) => {
                self.table(rows, depth, tbl + 1)?;
                if let Some(Value::Object(more)) = obj.get("more") {
                    let href = more_link(self.url, more);
                    self.out.push_str(&format!("<a href = \"{}\">More...</a>", href));
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn more_link(url: &str, more: &Map<String, Value>) -> String {
    more.iter().fold(url.to_string(), |path, (key, v)| {
        let arg = match v {
            Value::String(s) => encode(s),
            Value::Number(n) => n.as_u64().map(|x| x.to_string()).unwrap_or_else(|| n.to_string()),
            _ => String::new(),
        };
        substitute_arg(&path, key, &arg)
    })
}

/// Escape `<`, `>` and `&` as numeric entities. Nothing else changes.
pub fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '<' => out.push_str("&#60;"),
            '>' => out.push_str("&#62;"),
            '&' => out.push_str("&#38;"),
            _ => out.push(ch),
        }
    }
    out
}

/// First `max_chars` characters plus `...`, unless the string is short
/// enough that the suffix would not save anything.
pub fn short_of(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars + SHORT_SUFFIX.len() {
        return s.to_string();
    }
    let mut short: String = s.chars().take(max_chars).collect();
    short.push_str(SHORT_SUFFIX);
    short
}

/// Set `key=value` in the query string of `url`.
///
/// Existing `key=` arguments are dropped together with their separator; all
/// other arguments keep their order and bytes. The new argument goes last.
pub fn substitute_arg(url: &str, key: &str, value: &str) -> String {
    let prefix = format!("{}=", key);
    let mut res = String::with_capacity(url.len() + prefix.len() + value.len() + 1);

    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (url, None),
    };
    res.push_str(path);

    let mut kept = 0usize;
    let mut sep_at_end = false;
    if let Some(query) = query {
        res.push('?');
        sep_at_end = true;
        for arg in query.split_inclusive('&') {
            if arg.starts_with(&prefix) {
                continue;
            }
            res.push_str(arg);
            kept += 1;
            sep_at_end = arg.ends_with('&');
        }
    }

    if !sep_at_end {
        res.push(if kept > 0 { '&' } else { '?' });
    }
    res.push_str(&prefix);
    res.push_str(value);
    res
}
