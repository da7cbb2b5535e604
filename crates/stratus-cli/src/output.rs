//! Output formatting for CLI commands.
//!
//! Every command prints through a [`Printer`]: `raw` echoes the response
//! body, `json`/`yaml` pretty-print it, and the default format runs a
//! per-command table renderer over the parsed JSON. Renderers that hit a
//! missing key fall back to JSON with a note on stderr, so new API fields
//! or shapes never make the CLI unusable.

use std::io::Write;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use stratus_api::ApiResponse;

use crate::error::CliError;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Per-command table output.
    #[default]
    Default,
    /// Raw API response body.
    Raw,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl std::str::FromStr for Format {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "raw" => Ok(Self::Raw),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => Err(CliError::InvalidArgument(format!(
                "invalid output format '{other}', expected one of: default, raw, json, yaml"
            ))),
        }
    }
}

/// Column-aligned plain table. Cells are left-justified to the widest cell
/// in their column and joined with tabs.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header row in front of any existing rows.
    pub fn header<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.insert(0, columns.into_iter().map(Into::into).collect());
    }

    /// Append a row.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// True if the table has no rows (header included).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the aligned table.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        for row in &self.rows {
            let line: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
                .collect();
            writeln!(writer, "{}", line.join("\t").trim_end())?;
        }
        Ok(())
    }
}

/// Look up a dotted path (`server.os.name`) in a JSON value.
#[must_use]
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for key in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a dotted path as an array, for list renderers.
pub fn list<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], CliError> {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .ok_or_else(|| CliError::MissingField(path.to_string()))
}

/// Get a dotted path as a display string. Strings come out unquoted, null
/// becomes an empty cell, everything else is compact JSON.
pub fn gs(value: &Value, path: &str) -> Result<String, CliError> {
    let found = lookup(value, path).ok_or_else(|| CliError::MissingField(path.to_string()))?;
    Ok(display_value(found))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

static FILTER_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(([a-zA-Z0-9._-]+:[a-zA-Z0-9._-]+),?)+$").expect("valid filter regex")
});

/// Validate a `KEY:VALUE[,KEY:VALUE...]` filter expression.
pub fn validate_filters(filters: &str) -> Result<(), CliError> {
    if FILTER_RE.is_match(filters) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "invalid filter format: '{filters}', expected KEY:VALUE[,KEY:VALUE...]"
        )))
    }
}

/// Rewrite convenience filter keys onto the wire field names.
fn filter_key_alias(key: &str) -> &str {
    match key {
        "region" => "location",
        "proto" => "protocol",
        "rule_id" => "id",
        other => other,
    }
}

/// Filter every top-level list in `value`, keeping objects whose dotted-path
/// values match each `KEY:VALUE` pair. Comparison is case-insensitive.
pub fn apply_filters(value: &mut Value, filters: &str) {
    let pairs: Vec<(&str, &str)> = filters
        .split(',')
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.split_once(':'))
        .map(|(key, val)| (filter_key_alias(key), val))
        .collect();

    let Value::Object(map) = value else { return };
    for entry in map.values_mut() {
        let Value::Array(items) = entry else { continue };
        items.retain(|item| {
            pairs.iter().all(|(key, expected)| {
                lookup(item, key)
                    .map(display_value)
                    .is_some_and(|got| got.eq_ignore_ascii_case(expected))
            })
        });
    }
}

/// Response printer for one invocation's output format and filters.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    format: Format,
    filters: Option<String>,
}

impl Printer {
    /// Create a printer for a format.
    #[must_use]
    pub fn new(format: Format) -> Self {
        Self {
            format,
            filters: None,
        }
    }

    /// Attach a validated filter expression. Filters only affect the
    /// default (table) format.
    pub fn with_filters(mut self, filters: Option<String>) -> Result<Self, CliError> {
        if let Some(ref f) = filters {
            validate_filters(f)?;
        }
        self.filters = filters;
        Ok(self)
    }

    /// The selected format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Print a response. In the default format, `render` fills a [`Table`]
    /// from the (filtered) response JSON; a [`CliError::MissingField`] from
    /// the renderer falls back to JSON output with a note on stderr.
    pub fn print<W, F>(&self, writer: &mut W, response: &ApiResponse, render: F) -> Result<(), CliError>
    where
        W: Write,
        F: FnOnce(&Value, &mut Table) -> Result<(), CliError>,
    {
        match self.format {
            Format::Raw => {
                writeln!(writer, "{}", response.text())?;
                Ok(())
            }
            Format::Json => self.print_json(writer, response),
            Format::Yaml => {
                let value = response.json()?;
                let yaml = serde_yaml::to_string(&value)
                    .map_err(|e| CliError::Format(format!("YAML serialization failed: {e}")))?;
                write!(writer, "{yaml}")?;
                Ok(())
            }
            Format::Default => {
                let mut value = response.json()?;
                if let Some(ref filters) = self.filters {
                    apply_filters(&mut value, filters);
                }
                let mut table = Table::new();
                match render(&value, &mut table) {
                    Ok(()) => table.write(writer),
                    Err(CliError::MissingField(_)) => {
                        eprintln!("Error: Cannot represent output. Fallback to JSON.");
                        self.print_json(writer, response)
                    }
                    Err(other) => Err(other),
                }
            }
        }
    }

    /// Print only the value at `id_path` in the default format; other
    /// formats print the full response. Used by create operations so the
    /// default output stays script-friendly.
    pub fn print_id<W: Write>(
        &self,
        writer: &mut W,
        response: &ApiResponse,
        id_path: &str,
    ) -> Result<(), CliError> {
        if self.format == Format::Default {
            let value = response.json()?;
            writeln!(writer, "{}", gs(&value, id_path)?)?;
            Ok(())
        } else {
            self.print(writer, response, |_, _| Ok(()))
        }
    }

    fn print_json<W: Write>(&self, writer: &mut W, response: &ApiResponse) -> Result<(), CliError> {
        // serde_json's default map keeps keys sorted, matching sorted-key
        // pretty output.
        match response.json() {
            Ok(value) => {
                let pretty = serde_json::to_string_pretty(&value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer, "{pretty}")?;
            }
            // Not JSON at all (e.g. kubeconfig YAML body): echo it raw.
            Err(_) => writeln!(writer, "{}", response.text())?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: &str) -> ApiResponse {
        ApiResponse::from_parts(200, body)
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new();
        table.header(["ID", "NAME"]);
        table.row(["1", "web-server-01"]);
        table.row(["23", "db"]);

        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");

        assert_eq!(output, "ID\tNAME\n1 \tweb-server-01\n23\tdb\n");
    }

    #[test]
    fn table_empty_writes_nothing() {
        let table = Table::new();
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        assert!(buf.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn lookup_dotted_path() {
        let value = json!({"server": {"os": {"name": "ubuntu", "version": "22.04"}}});
        assert_eq!(
            lookup(&value, "server.os.name"),
            Some(&Value::String("ubuntu".into()))
        );
        assert_eq!(lookup(&value, "server.os.arch"), None);
    }

    #[test]
    fn lookup_indexes_into_arrays() {
        let value = json!({"ips": [{"ip": "192.0.2.1"}, {"ip": "192.0.2.2"}]});
        assert_eq!(gs(&value, "ips.1.ip").expect("gs"), "192.0.2.2");
    }

    #[test]
    fn gs_renders_scalars() {
        let value = json!({"id": 42, "name": "web", "ptr": null, "on": true});
        assert_eq!(gs(&value, "id").expect("gs"), "42");
        assert_eq!(gs(&value, "name").expect("gs"), "web");
        assert_eq!(gs(&value, "ptr").expect("gs"), "");
        assert_eq!(gs(&value, "on").expect("gs"), "true");
        assert!(matches!(
            gs(&value, "missing"),
            Err(CliError::MissingField(_))
        ));
    }

    #[test]
    fn filter_format_validation() {
        assert!(validate_filters("status:on").is_ok());
        assert!(validate_filters("status:on,location:us-1").is_ok());
        assert!(validate_filters("os.name:ubuntu").is_ok());
        assert!(validate_filters("status=on").is_err());
        assert!(validate_filters("status:").is_err());
        assert!(validate_filters("").is_err());
    }

    #[test]
    fn filters_retain_matching_objects() {
        let mut value = json!({
            "servers": [
                {"id": 1, "status": "on", "location": "us-1"},
                {"id": 2, "status": "off", "location": "us-1"},
                {"id": 3, "status": "on", "location": "eu-1"},
            ],
            "meta": {"total": 3}
        });
        apply_filters(&mut value, "status:on,location:us-1");
        let servers = value["servers"].as_array().expect("array");
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0]["id"], 1);
    }

    #[test]
    fn filter_region_alias_maps_to_location() {
        let mut value = json!({
            "vpcs": [
                {"id": "vpc-1", "location": "us-1"},
                {"id": "vpc-2", "location": "eu-1"},
            ]
        });
        apply_filters(&mut value, "region:eu-1");
        assert_eq!(value["vpcs"].as_array().expect("array").len(), 1);
        assert_eq!(value["vpcs"][0]["id"], "vpc-2");
    }

    #[test]
    fn printer_raw_echoes_body() {
        let printer = Printer::new(Format::Raw);
        let mut buf = Vec::new();
        printer
            .print(&mut buf, &response(r#"{"a":1}"#), |_, _| Ok(()))
            .expect("print");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "{\"a\":1}\n");
    }

    #[test]
    fn printer_json_is_pretty_and_sorted() {
        let printer = Printer::new(Format::Json);
        let mut buf = Vec::new();
        printer
            .print(&mut buf, &response(r#"{"b":2,"a":1}"#), |_, _| Ok(()))
            .expect("print");
        let output = String::from_utf8(buf).expect("utf8");
        let a = output.find("\"a\"").expect("a key");
        let b = output.find("\"b\"").expect("b key");
        assert!(a < b);
        assert!(output.contains("  \"a\": 1"));
    }

    #[test]
    fn printer_yaml_output() {
        let printer = Printer::new(Format::Yaml);
        let mut buf = Vec::new();
        printer
            .print(&mut buf, &response(r#"{"name":"web"}"#), |_, _| Ok(()))
            .expect("print");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "name: web\n");
    }

    #[test]
    fn printer_default_renders_table() {
        let printer = Printer::new(Format::Default);
        let body = r#"{"servers":[{"id":1,"name":"web"}]}"#;
        let mut buf = Vec::new();
        printer
            .print(&mut buf, &response(body), |value, table| {
                table.header(["ID", "NAME"]);
                let servers = lookup(value, "servers")
                    .and_then(Value::as_array)
                    .ok_or_else(|| CliError::MissingField("servers".into()))?;
                for server in servers {
                    table.row([gs(server, "id")?, gs(server, "name")?]);
                }
                Ok(())
            })
            .expect("print");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("ID"));
        assert!(output.contains("web"));
    }

    #[test]
    fn printer_default_falls_back_to_json_on_missing_key() {
        let printer = Printer::new(Format::Default);
        let mut buf = Vec::new();
        printer
            .print(&mut buf, &response(r#"{"unexpected":true}"#), |value, _| {
                gs(value, "servers")?;
                Ok(())
            })
            .expect("print");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("\"unexpected\": true"));
    }

    #[test]
    fn printer_applies_filters_only_to_default_format() {
        let body = r#"{"items":[{"id":1,"status":"on"},{"id":2,"status":"off"}]}"#;
        let printer = Printer::new(Format::Json)
            .with_filters(Some("status:on".into()))
            .expect("filters");
        let mut buf = Vec::new();
        printer
            .print(&mut buf, &response(body), |_, _| Ok(()))
            .expect("print");
        // JSON output is unfiltered.
        assert!(String::from_utf8(buf).expect("utf8").contains("\"id\": 2"));
    }

    #[test]
    fn printer_rejects_bad_filters() {
        let result = Printer::new(Format::Default).with_filters(Some("nope".into()));
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn printer_print_id_default_format() {
        let printer = Printer::new(Format::Default);
        let mut buf = Vec::new();
        printer
            .print_id(&mut buf, &response(r#"{"server":{"id":42}}"#), "server.id")
            .expect("print");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "42\n");
    }

    #[test]
    fn printer_print_id_json_prints_full_body() {
        let printer = Printer::new(Format::Json);
        let mut buf = Vec::new();
        printer
            .print_id(&mut buf, &response(r#"{"server":{"id":42}}"#), "server.id")
            .expect("print");
        assert!(String::from_utf8(buf).expect("utf8").contains("\"server\""));
    }

    #[test]
    fn format_parses_from_profile_strings() {
        assert_eq!("json".parse::<Format>().expect("parse"), Format::Json);
        assert_eq!("YAML".parse::<Format>().expect("parse"), Format::Yaml);
        assert!("xml".parse::<Format>().is_err());
    }
}
