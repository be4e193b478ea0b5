//! Structural validator for declarations
//!
//! Validation semantics:
//! - Metadata first, then tables in argument order
//! - Within a table: columns in order, then rows, then cells in column order
//! - The first violation aborts; errors are never aggregated
//! - Every error carries the path of steps that reached it
//!
//! Input is untyped JSON. Output is the typed model in `types`, so nothing
//! downstream of this module re-checks shapes.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};

use super::errors::{DeclarationError, DeclarationResult};
use super::request::RegisterRequest;
use super::types::{
    Cell, Column, ColumnKind, ColumnType, Declaration, Identifier, Metadata, Payload, RecordKind,
    Row, Table, SUPPORTED_VERSION,
};

/// Lexical rule for identifiers. Double dashes are rejected separately.
pub const IDENTIFIER_PATTERN: &str = "^([a-z][-a-z0-9]{1,30}[a-z0-9])$";

/// Strings this long or longer are shortened in error messages.
const SAFE_MAX_CHARS: usize = 80;

fn identifier_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"))
}

/// A closed set of kind names that `validate_kind` checks against.
pub trait KindSet: Copy + Sized + 'static {
    /// Members in the order they are listed in error messages
    fn members() -> &'static [Self];
    fn name(&self) -> &'static str;
    fn from_name(name: &str) -> Option<Self>;
}

impl KindSet for RecordKind {
    fn members() -> &'static [Self] {
        &RecordKind::ALL
    }

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn from_name(name: &str) -> Option<Self> {
        RecordKind::from_name(name)
    }
}

impl KindSet for ColumnKind {
    fn members() -> &'static [Self] {
        &ColumnKind::ALL
    }

    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn from_name(name: &str) -> Option<Self> {
        ColumnKind::from_name(name)
    }
}

/// Validates a whole registration request into a declaration.
///
/// Fails with `Arity` when fewer than one table is supplied and with
/// `Duplicate` when two tables share an identifier.
pub fn validate_request(request: &RegisterRequest, path: &str) -> DeclarationResult<Declaration> {
    let items = request.items();
    let len = items.len();
    if len < 2 {
        return Err(DeclarationError::arity(
            path,
            format!("got {} item{} (less than 2)", len, if len == 1 { "" } else { "s" }),
        ));
    }

    let metadata = validate_metadata(&items[0], path)?;

    let mut seen = HashSet::new();
    let mut tables = Vec::with_capacity(len - 1);
    for (i, item) in items.iter().enumerate().skip(1) {
        let table = validate_table(item, &format!("{}item[{}]: ", path, i))?;
        if !seen.insert(table.identifier.clone()) {
            return Err(DeclarationError::duplicate(
                path,
                format!("item[{}] dupe identifier \"{}\"", i, safe_str(table.identifier.as_str())),
            ));
        }
        tables.push(table);
    }

    Ok(Declaration { metadata, tables })
}

/// Validates the metadata record.
pub fn validate_metadata(candidate: &Value, path: &str) -> DeclarationResult<Metadata> {
    let p = format!("{}validate_metadata(): ", path);
    let obj = candidate
        .as_object()
        .ok_or_else(|| DeclarationError::shape(&p, "not an object"))?;

    let identifier = validate_identifier(obj.get("identifier"), &p)?;
    let kind = validate_kind::<RecordKind>(obj.get("kind"), &p)?;
    if kind != RecordKind::Metadata {
        return Err(DeclarationError::kind_mismatch(&p, "kind is not \"Metadata\""));
    }
    let version = validate_version(obj.get("version"), &p)?;

    Ok(Metadata {
        identifier,
        kind,
        version,
    })
}

/// Validates one table record.
pub fn validate_table(candidate: &Value, path: &str) -> DeclarationResult<Table> {
    let p = format!("{}validate_table(): ", path);
    let obj = candidate
        .as_object()
        .ok_or_else(|| DeclarationError::shape(&p, "not an object"))?;

    let identifier = validate_identifier(obj.get("identifier"), &p)?;
    let kind = validate_kind::<RecordKind>(obj.get("kind"), &p)?;
    if kind == RecordKind::Metadata {
        return Err(DeclarationError::kind_mismatch(&p, "kind is \"Metadata\""));
    }
    let payload = validate_payload(obj.get("payload"), &p)?;

    Ok(Table {
        identifier,
        kind,
        payload,
    })
}

/// Checks that an identifier is 3 to 32 chars, kebab-case, starts with a
/// lowercase letter, does not end with a dash and has no double dashes.
pub fn validate_identifier(value: Option<&Value>, path: &str) -> DeclarationResult<Identifier> {
    let p = format!("{}validate_identifier(): ", path);
    let Some(Value::String(identifier)) = value else {
        return Err(DeclarationError::shape(
            p,
            format!("identifier is type \"{}\" not \"string\"", json_type_name(value)),
        ));
    };
    if !identifier_regex().is_match(identifier) {
        return Err(DeclarationError::pattern(
            p,
            format!("identifier \"{}\" fails /{}/", safe_str(identifier), IDENTIFIER_PATTERN),
        ));
    }
    if identifier.contains("--") {
        return Err(DeclarationError::pattern(
            p,
            format!("identifier \"{}\" contains double-dashes", safe_str(identifier)),
        ));
    }
    Ok(Identifier::new_unchecked(identifier.as_str()))
}

/// Checks that a kind is one of the names in the set `K`.
pub fn validate_kind<K: KindSet>(value: Option<&Value>, path: &str) -> DeclarationResult<K> {
    let p = format!("{}validate_kind(): ", path);
    let Some(Value::String(name)) = value else {
        return Err(DeclarationError::shape(
            p,
            format!("kind is type \"{}\" not \"string\"", json_type_name(value)),
        ));
    };
    K::from_name(name).ok_or_else(|| {
        let allowed: Vec<&str> = K::members().iter().map(KindSet::name).collect();
        DeclarationError::enumeration(
            p,
            format!(
                "kind \"{}\" is not one of \"{}\"",
                safe_str(name),
                allowed.join("\" | \"")
            ),
        )
    })
}

/// Checks that the version tag is exactly the supported version.
pub fn validate_version(value: Option<&Value>, path: &str) -> DeclarationResult<String> {
    let p = format!("{}validate_version(): ", path);
    let Some(Value::String(version)) = value else {
        return Err(DeclarationError::shape(
            p,
            format!("version is type \"{}\" not \"string\"", json_type_name(value)),
        ));
    };
    if version != SUPPORTED_VERSION {
        return Err(DeclarationError::value(
            p,
            format!("version \"{}\" is not \"{}\"", safe_str(version), SUPPORTED_VERSION),
        ));
    }
    Ok(version.clone())
}

/// Checks that a table's payload has well-formed columns and rows.
pub fn validate_payload(payload: Option<&Value>, path: &str) -> DeclarationResult<Payload> {
    let p = format!("{}validate_payload(): ", path);
    let Some(Value::Object(obj)) = payload else {
        return Err(DeclarationError::shape(
            p,
            format!("payload is type \"{}\" not a plain object", json_type_name(payload)),
        ));
    };

    let columns = validate_columns(obj, &p)?;
    let rows = validate_rows(obj, &columns, &p)?;

    Ok(Payload { columns, rows })
}

fn validate_columns(obj: &Map<String, Value>, p: &str) -> DeclarationResult<Vec<Column>> {
    let Some(Value::Array(raw_columns)) = obj.get("columns") else {
        return Err(DeclarationError::shape(p, "payload.columns is not an array"));
    };

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(raw_columns.len());
    for (i, raw) in raw_columns.iter().enumerate() {
        let Value::Object(column) = raw else {
            return Err(DeclarationError::shape(
                p,
                format!(
                    "payload.columns[{}] is type \"{}\" not a plain object",
                    i,
                    json_type_name(Some(raw))
                ),
            ));
        };

        let column_path = format!("{}payload.columns[{}]: ", p, i);
        let identifier = validate_identifier(column.get("identifier"), &column_path)?;
        let column_type = match validate_kind::<ColumnKind>(column.get("kind"), &column_path)? {
            ColumnKind::Enum => ColumnType::Enum {
                valid: validate_valid_values(column.get("valid"), p, i)?,
            },
            ColumnKind::Integer => ColumnType::Integer,
            ColumnKind::String => ColumnType::String,
        };

        if !seen.insert(identifier.clone()) {
            return Err(DeclarationError::duplicate(
                p,
                format!("payload.columns[{}] dupe identifier \"{}\"", i, safe_str(identifier.as_str())),
            ));
        }
        columns.push(Column {
            identifier,
            column_type,
        });
    }

    if columns.is_empty() {
        return Err(DeclarationError::empty(p, "payload.columns is empty"));
    }
    Ok(columns)
}

fn validate_valid_values(value: Option<&Value>, p: &str, column: usize) -> DeclarationResult<Vec<String>> {
    let Some(Value::Array(raw)) = value else {
        return Err(DeclarationError::shape(
            p,
            format!("payload.columns[{}].valid is not an array", column),
        ));
    };
    raw.iter()
        .enumerate()
        .map(|(j, v)| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(DeclarationError::shape(
                p,
                format!(
                    "payload.columns[{}].valid[{}] is type \"{}\" not \"string\"",
                    column,
                    j,
                    json_type_name(Some(other))
                ),
            )),
        })
        .collect()
}

fn validate_rows(obj: &Map<String, Value>, columns: &[Column], p: &str) -> DeclarationResult<Vec<Row>> {
    let Some(Value::Array(raw_rows)) = obj.get("rows") else {
        return Err(DeclarationError::shape(p, "payload.rows is not an array"));
    };

    let mut rows = Vec::with_capacity(raw_rows.len());
    for (i, raw) in raw_rows.iter().enumerate() {
        let Value::Array(cells) = raw else {
            return Err(DeclarationError::shape(
                p,
                format!("payload.rows[{}] is type \"{}\" not an array", i, json_type_name(Some(raw))),
            ));
        };
        if cells.len() != columns.len() {
            return Err(DeclarationError::arity(
                p,
                format!(
                    "payload.rows[{}] has {} columns, expected {}",
                    i,
                    cells.len(),
                    columns.len()
                ),
            ));
        }

        let row = cells
            .iter()
            .zip(columns)
            .enumerate()
            .map(|(j, (cell, column))| validate_cell(cell, &column.column_type, p, i, j))
            .collect::<DeclarationResult<Row>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn validate_cell(
    cell: &Value,
    column_type: &ColumnType,
    p: &str,
    row: usize,
    col: usize,
) -> DeclarationResult<Cell> {
    match column_type {
        ColumnType::Enum { valid } => match cell {
            Value::String(s) if valid.iter().any(|v| v == s) => Ok(Cell::Text(s.clone())),
            _ => Err(DeclarationError::enumeration(
                p,
                format!(
                    "payload.rows[{}][{}] \"{}\" is not a valid Enum value",
                    row,
                    col,
                    safe(cell)
                ),
            )),
        },
        ColumnType::Integer => {
            let Value::Number(n) = cell else {
                return Err(cell_type_error(p, row, col, "number", cell));
            };
            whole_number(n).map(Cell::Integer).map_err(|reason| {
                DeclarationError::integer(
                    p,
                    format!("payload.rows[{}][{}] \"{}\" {}", row, col, safe(cell), reason),
                )
            })
        }
        ColumnType::String => match cell {
            Value::String(s) => Ok(Cell::Text(s.clone())),
            _ => Err(cell_type_error(p, row, col, "string", cell)),
        },
    }
}

/// Accepts integers and whole-valued floats that fit in an `i64`.
fn whole_number(n: &Number) -> Result<i64, &'static str> {
    if let Some(v) = n.as_i64() {
        return Ok(v);
    }
    if n.is_u64() {
        return Err("is out of range for a 64-bit integer");
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    if !f.is_finite() || f.fract() != 0.0 {
        return Err("is not an integer");
    }
    // 2^63 is exactly representable; anything at or above it overflows.
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err("is out of range for a 64-bit integer");
    }
    Ok(f as i64)
}

fn cell_type_error(p: &str, row: usize, col: usize, expected: &str, cell: &Value) -> DeclarationError {
    DeclarationError::type_mismatch(
        p,
        format!(
            "payload.rows[{}][{}] is type \"{}\" not \"{}\"",
            row,
            col,
            json_type_name(Some(cell)),
            expected
        ),
    )
}

/// Returns the JSON type name for error messages. An absent field is
/// `missing`.
pub fn json_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Makes any JSON value safe to embed in an error message.
fn safe(value: &Value) -> String {
    match value {
        Value::String(s) => safe_str(s),
        other => safe_str(&other.to_string()),
    }
}

/// Replaces control characters and bytes 0x7F-0xFF with `#`, and shortens
/// long strings to their first 61 and last 16 characters.
pub(crate) fn safe_str(s: &str) -> String {
    let printable: Vec<char> = s
        .chars()
        .map(|c| match c as u32 {
            0x00..=0x1F | 0x7F..=0xFF => '#',
            _ => c,
        })
        .collect();
    if printable.len() < SAFE_MAX_CHARS {
        return printable.into_iter().collect();
    }
    let head: String = printable[..61].iter().collect();
    let tail: String = printable[printable.len() - 16..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::errors::ErrorKind;
    use serde_json::json;

    fn payload_err(payload: Value) -> DeclarationError {
        validate_payload(Some(&payload), "").unwrap_err()
    }

    #[test]
    fn test_identifier_bounds() {
        let longest = "a".repeat(32);
        for id in ["abc", "a-b", "a1b", "user-db", longest.as_str()] {
            assert!(validate_identifier(Some(&json!(id)), "").is_ok(), "{}", id);
        }

        let too_long = "a".repeat(33);
        for bad in ["a", "ab", "ab-", "1ab", "Abc", "a_b", too_long.as_str()] {
            let err = validate_identifier(Some(&json!(bad)), "").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Pattern, "{}", bad);
        }
    }

    #[test]
    fn test_identifier_double_dash_has_own_reason() {
        let err = validate_identifier(Some(&json!("a--b")), "x: ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Pattern);
        assert_eq!(
            err.to_string(),
            "x: validate_identifier(): identifier \"a--b\" contains double-dashes"
        );
    }

    #[test]
    fn test_identifier_wrong_type() {
        let err = validate_identifier(Some(&json!(true)), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(err.reason(), "identifier is type \"boolean\" not \"string\"");

        let err = validate_identifier(None, "").unwrap_err();
        assert_eq!(err.reason(), "identifier is type \"missing\" not \"string\"");
    }

    #[test]
    fn test_kind_lists_allowed_set() {
        let err = validate_kind::<ColumnKind>(Some(&json!("BigInt")), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Enum);
        assert_eq!(
            err.reason(),
            "kind \"BigInt\" is not one of \"Enum\" | \"Integer\" | \"String\""
        );

        let kind = validate_kind::<RecordKind>(Some(&json!("UnencryptedTable")), "").unwrap();
        assert_eq!(kind, RecordKind::UnencryptedTable);
    }

    #[test]
    fn test_reserved_encrypted_kind_is_rejected() {
        let err = validate_kind::<RecordKind>(Some(&json!("EncryptedTable")), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Enum);
    }

    #[test]
    fn test_metadata_kind_mismatch() {
        let err = validate_metadata(
            &json!({ "identifier": "abc", "kind": "UnencryptedTable", "version": "0.0.1" }),
            "",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);
    }

    #[test]
    fn test_metadata_version_checks() {
        let err = validate_metadata(&json!({ "identifier": "abc", "kind": "Metadata" }), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);

        let err = validate_metadata(
            &json!({ "identifier": "abc", "kind": "Metadata", "version": "1.0.0" }),
            "",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(
            err.to_string(),
            "validate_metadata(): validate_version(): version \"1.0.0\" is not \"0.0.1\""
        );
    }

    #[test]
    fn test_table_cannot_claim_metadata() {
        let err = validate_table(&json!({ "identifier": "abc", "kind": "Metadata" }), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KindMismatch);
        assert_eq!(err.to_string(), "validate_table(): kind is \"Metadata\"");
    }

    #[test]
    fn test_payload_builds_typed_rows() {
        let payload = validate_payload(
            Some(&json!({
                "columns": [
                    { "identifier": "uid", "kind": "Integer" },
                    { "identifier": "name", "kind": "String" },
                    { "identifier": "theme", "kind": "Enum", "valid": ["blue", "red"] }
                ],
                "rows": [[1, "Alice", "blue"], [2.0, "Bob", "red"]]
            })),
            "",
        )
        .unwrap();

        assert_eq!(payload.columns.len(), 3);
        assert_eq!(payload.rows[1][0], Cell::Integer(2));
        assert_eq!(payload.rows[0][2], Cell::Text("blue".into()));
    }

    #[test]
    fn test_empty_columns() {
        let err = payload_err(json!({ "columns": [], "rows": [] }));
        assert_eq!(err.kind(), ErrorKind::Empty);
    }

    #[test]
    fn test_duplicate_column_cites_index() {
        let err = payload_err(json!({
            "columns": [
                { "identifier": "foo", "kind": "String" },
                { "identifier": "bar", "kind": "Integer" },
                { "identifier": "foo", "kind": "Integer" }
            ],
            "rows": []
        }));
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(err.reason(), "payload.columns[2] dupe identifier \"foo\"");
    }

    #[test]
    fn test_enum_with_no_valid_values_accepts_no_rows() {
        let columns = json!([{ "identifier": "abc", "kind": "Enum", "valid": [] }]);
        assert!(validate_payload(Some(&json!({ "columns": columns, "rows": [] })), "").is_ok());

        let err = payload_err(json!({ "columns": columns, "rows": [["abc"]] }));
        assert_eq!(err.kind(), ErrorKind::Enum);
    }

    #[test]
    fn test_enum_cell_must_be_listed_string() {
        let err = payload_err(json!({
            "columns": [{ "identifier": "abc", "kind": "Enum", "valid": ["1"] }],
            "rows": [[1]]
        }));
        assert_eq!(err.kind(), ErrorKind::Enum);
        assert_eq!(err.reason(), "payload.rows[0][0] \"1\" is not a valid Enum value");
    }

    #[test]
    fn test_integer_cells() {
        let columns = json!([{ "identifier": "abc", "kind": "Integer" }]);

        let err = payload_err(json!({ "columns": columns, "rows": [[1.5]] }));
        assert_eq!(err.kind(), ErrorKind::Integer);
        assert_eq!(err.reason(), "payload.rows[0][0] \"1.5\" is not an integer");

        let err = payload_err(json!({ "columns": columns, "rows": [["1"]] }));
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = payload_err(json!({ "columns": columns, "rows": [[u64::MAX]] }));
        assert_eq!(err.kind(), ErrorKind::Integer);
        assert!(err.reason().ends_with("is out of range for a 64-bit integer"));

        let payload = validate_payload(
            Some(&json!({ "columns": columns, "rows": [[-3], [i64::MAX]] })),
            "",
        )
        .unwrap();
        assert_eq!(payload.rows[1][0], Cell::Integer(i64::MAX));
    }

    #[test]
    fn test_row_must_be_array() {
        let err = payload_err(json!({
            "columns": [{ "identifier": "abc", "kind": "String" }],
            "rows": [{ "abc": "x" }]
        }));
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(err.reason(), "payload.rows[0] is type \"object\" not an array");
    }

    #[test]
    fn test_first_violation_wins() {
        // Row 0 is fine, row 1 has two errors; only the first cell is reported.
        let err = payload_err(json!({
            "columns": [
                { "identifier": "num", "kind": "Integer" },
                { "identifier": "txt", "kind": "String" }
            ],
            "rows": [[1, "a"], ["x", 2]]
        }));
        assert_eq!(err.reason(), "payload.rows[1][0] is type \"string\" not \"number\"");
    }

    #[test]
    fn test_safe_str_masks_and_shortens() {
        assert_eq!(safe_str("a\nb\u{7f}c\u{e9}"), "a#b#c#");
        assert_eq!(safe_str("\u{263a}"), "\u{263a}");

        let long = format!("{}{}", "x".repeat(70), "0123456789abcdef");
        let shown = safe_str(&long);
        assert_eq!(shown.chars().count(), 61 + 3 + 16);
        assert!(shown.starts_with(&"x".repeat(61)));
        assert!(shown.ends_with("...0123456789abcdef"));

        let short = "y".repeat(79);
        assert_eq!(safe_str(&short), short);
    }

    #[test]
    fn test_request_arity() {
        let err = validate_request(&RegisterRequest::from_items(vec![]), "register(): ").unwrap_err();
        assert_eq!(err.to_string(), "register(): got 0 items (less than 2)");

        let err = validate_request(
            &RegisterRequest::from_items(vec![json!({ "identifier": "abc" })]),
            "register(): ",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arity);
        assert_eq!(err.reason(), "got 1 item (less than 2)");
    }
}
