use serde_json::Value;

/// Keys whose string values are emitted as raw template blocks
const RAW_BLOCK_KEYS: &[&str] = &["source"];
const INDENT: &str = "  ";

/// Render a JSON value as an `export default` module body.
///
/// Source text becomes a template literal in which only the backtick and
/// `${` are escaped; every other scalar is quoted exactly as in JSON.
/// Backslashes are not escaped, so a source `` \` `` comes out as `` \\\` `` and
/// ends the template early; the output is for reading, not re-evaluation.
pub fn to_literal_export(value: &Value, pretty: bool) -> String {
    let mut out = String::from("export default ");
    write_value(&mut out, value, false, 0, pretty);
    out.push(';');
    out
}

fn write_value(out: &mut String, value: &Value, raw_block: bool, depth: usize, pretty: bool) {
    match value {
        Value::String(text) if raw_block => {
            out.push('`');
            out.push_str(&escape_template(text));
            out.push('`');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + 1, pretty);
                write_key(out, key);
                out.push(':');
                if pretty {
                    out.push(' ');
                }
                write_value(out, item, RAW_BLOCK_KEYS.contains(&key.as_str()), depth + 1, pretty);
            }
            newline(out, depth, pretty);
            out.push('}');
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, depth + 1, pretty);
                write_value(out, item, false, depth + 1, pretty);
            }
            newline(out, depth, pretty);
            out.push(']');
        }
        // scalars use standard literal quoting
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn newline(out: &mut String, depth: usize, pretty: bool) {
    if pretty {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(INDENT);
        }
    }
}

fn write_key(out: &mut String, key: &str) {
    if is_identifier(key) {
        out.push_str(key);
    } else {
        out.push_str(&Value::String(key.to_string()).to_string());
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn escape_template(text: &str) -> String {
    text.replace('`', "\\`").replace("${", "\\${")
}
