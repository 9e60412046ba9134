//! Implementations of the `indivo` subcommands.
//!
//! Commands write their report to any [`Write`] so they can be exercised
//! without a terminal. They return `Ok(false)` when the command ran but found
//! problems (only `validate` does), and `Err` when it could not run at all.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use tracing::{debug, info, warn};

use indivo_document::{BindingOptions, Document, Record, Value, WireElement, WireEncoding};
use indivo_records::registry;
use indivo_serde::json::read_wire_json;
use indivo_serde::xml::read_wire_str;
use indivo_serde::{to_json_string, to_json_string_pretty, to_xml_string, to_xml_string_pretty};

use crate::config::{CliConfig, Command, InputFormat, OutputFormat};

/// Runs the configured subcommand.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<bool> {
    let options = config.binding_options();
    match &config.command {
        Command::Inspect { file } => {
            inspect(out, file, config.format, &options)?;
            Ok(true)
        }
        Command::Convert { file, to, pretty } => {
            convert(out, file, config.format, &options, *to, *pretty)?;
            Ok(true)
        }
        Command::Validate { files } => validate(out, files, config.format, &options),
        Command::Schemas { type_name } => {
            schemas(out, type_name.as_deref())?;
            Ok(true)
        }
    }
}

/// Decides the wire format of `content` read from `path`.
///
/// An explicit format wins. Otherwise a `.xml` or `.json` extension decides,
/// and failing that the first non-blank character.
pub fn detect_format(path: &Path, content: &str, requested: InputFormat) -> anyhow::Result<OutputFormat> {
    match requested {
        InputFormat::Xml => return Ok(OutputFormat::Xml),
        InputFormat::Json => return Ok(OutputFormat::Json),
        InputFormat::Auto => {}
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("xml") => return Ok(OutputFormat::Xml),
        Some("json") => return Ok(OutputFormat::Json),
        _ => {}
    }

    match content.trim_start().chars().next() {
        Some('<') => Ok(OutputFormat::Xml),
        Some('{') => Ok(OutputFormat::Json),
        _ => bail!(
            "cannot tell whether {} is XML or JSON; pass --format",
            path.display()
        ),
    }
}

/// Reads `path` and binds it to the registered type named by its root.
pub fn load_record(
    path: &Path,
    format: InputFormat,
    options: &BindingOptions,
) -> anyhow::Result<Box<dyn Record>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let wire: WireElement = match detect_format(path, &content, format)? {
        OutputFormat::Xml => read_wire_str(&content),
        OutputFormat::Json => read_wire_json(&content),
    }
    .with_context(|| format!("parsing {}", path.display()))?;

    debug!(path = %path.display(), root = %wire.name, "read wire tree");

    registry()
        .dispatch_with(&wire, options)
        .with_context(|| format!("binding {}", path.display()))
}

pub fn inspect(
    out: &mut impl Write,
    path: &Path,
    format: InputFormat,
    options: &BindingOptions,
) -> anyhow::Result<()> {
    let record = load_record(path, format, options)?;
    write_document(out, record.document(), 0)?;
    Ok(())
}

fn write_document(out: &mut impl Write, document: &Document, depth: usize) -> std::io::Result<()> {
    let indent = "  ".repeat(depth);
    match document.id() {
        Some(id) => writeln!(out, "{}{} (id {})", indent, document.type_name(), id)?,
        None => writeln!(out, "{}{}", indent, document.type_name())?,
    }

    let indent = "  ".repeat(depth + 1);
    for (binding, field) in document.fields() {
        for value in field.values() {
            match value {
                Value::Document(nested) => {
                    writeln!(out, "{}{}:", indent, binding.wire_name())?;
                    write_document(out, nested, depth + 2)?;
                }
                other => writeln!(out, "{}{}: {}", indent, binding.wire_name(), other)?,
            }
        }
    }
    Ok(())
}

pub fn convert(
    out: &mut impl Write,
    path: &Path,
    format: InputFormat,
    options: &BindingOptions,
    to: OutputFormat,
    pretty: bool,
) -> anyhow::Result<()> {
    let record = load_record(path, format, options)?;
    let document = record.document();

    let rendered = match (to, pretty) {
        (OutputFormat::Xml, false) => to_xml_string(document)?,
        (OutputFormat::Xml, true) => to_xml_string_pretty(document)?,
        (OutputFormat::Json, false) => to_json_string(document)?,
        (OutputFormat::Json, true) => to_json_string_pretty(document)?,
    };
    info!(path = %path.display(), to = ?to, bytes = rendered.len(), "converted document");

    writeln!(out, "{}", rendered)?;
    Ok(())
}

/// Binds every file and serializes it back. Reports each file on its own
/// line and returns whether all of them passed.
pub fn validate(
    out: &mut impl Write,
    files: &[impl AsRef<Path>],
    format: InputFormat,
    options: &BindingOptions,
) -> anyhow::Result<bool> {
    let mut failures = 0usize;

    for path in files {
        let path = path.as_ref();
        let outcome = load_record(path, format, options).and_then(|record| {
            record
                .document()
                .serialize()
                .with_context(|| format!("serializing {}", path.display()))?;
            Ok(record)
        });

        match outcome {
            Ok(record) => {
                let id = record
                    .document()
                    .id()
                    .map(|id| format!(" {}", id))
                    .unwrap_or_default();
                writeln!(out, "ok    {} ({}{})", path.display(), record.type_name(), id)?;
            }
            Err(err) => {
                failures += 1;
                warn!(path = %path.display(), error = %err, "document failed validation");
                writeln!(out, "FAIL  {}: {:#}", path.display(), err)?;
            }
        }
    }

    if failures > 0 {
        writeln!(out, "{} of {} documents failed", failures, files.len())?;
    }
    Ok(failures == 0)
}

/// Lists registered types, or the fields of `type_name`.
pub fn schemas(out: &mut impl Write, type_name: Option<&str>) -> anyhow::Result<()> {
    let registry = registry();

    let Some(type_name) = type_name else {
        for name in registry.type_names() {
            writeln!(out, "{}", name)?;
        }
        return Ok(());
    };

    let Some(schema) = registry.schema(type_name) else {
        bail!(
            "unknown document type {:?}; registered types: {}",
            type_name,
            registry.type_names().collect::<Vec<_>>().join(", ")
        );
    };

    match schema.type_uri() {
        Some(uri) => writeln!(out, "{} ({})", schema.type_name(), uri)?,
        None => writeln!(out, "{}", schema.type_name())?,
    }
    for field in schema.fields() {
        let mut flags = Vec::new();
        if field.is_required() {
            flags.push("required");
        }
        if field.is_repeated() {
            flags.push("repeated");
        }
        if field.encoding() == WireEncoding::Attribute {
            flags.push("attribute");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        writeln!(out, "  {}: {}{}", field.wire_name(), field.kind(), flags)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use tempfile::TempDir;

    const ASPIRIN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Medication xmlns="http://indivo.org/vocab/xml/documents#" id="med-1">
  <name code="123" codingSystem="rxnorm">Aspirin</name>
  <dose>10 mg</dose>
  <prescription>
    <by id="contact-1"/>
    <instructions>Take with water</instructions>
  </prescription>
  <color>white</color>
</Medication>"#;

    const CONTACT: &str = r##"{"#type": "Contact", "@id": "c1", "fullName": "Lisa Cuddy"}"##;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_detect_format() {
        let path = Path::new("doc.txt");
        assert_eq!(
            detect_format(Path::new("a.XML"), "", InputFormat::Auto).unwrap(),
            OutputFormat::Xml
        );
        assert_eq!(
            detect_format(path, "  \n{\"#type\": \"Contact\"}", InputFormat::Auto).unwrap(),
            OutputFormat::Json
        );
        assert_eq!(
            detect_format(path, "<Contact/>", InputFormat::Auto).unwrap(),
            OutputFormat::Xml
        );
        assert_eq!(
            detect_format(Path::new("a.xml"), "{}", InputFormat::Json).unwrap(),
            OutputFormat::Json
        );
        assert!(detect_format(path, "Contact", InputFormat::Auto).is_err());
    }

    #[test]
    fn test_inspect_prints_nested_fields() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "aspirin.xml", ASPIRIN);

        let mut buffer = Vec::new();
        inspect(&mut buffer, &path, InputFormat::Auto, &BindingOptions::default()).unwrap();
        let text = output(buffer);

        assert!(text.starts_with("Medication (id med-1)\n"));
        assert!(text.contains("  dose: 10 mg\n"));
        assert!(text.contains("  prescription:\n    Prescription\n"));
        assert!(text.contains("      instructions: Take with water\n"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "aspirin.xml", ASPIRIN);

        let err = load_record(&path, InputFormat::Auto, &BindingOptions::strict()).unwrap_err();
        assert!(format!("{:#}", err).contains("color"));
    }

    #[test]
    fn test_convert_xml_to_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "aspirin.xml", ASPIRIN);

        let mut buffer = Vec::new();
        convert(
            &mut buffer,
            &path,
            InputFormat::Auto,
            &BindingOptions::default(),
            OutputFormat::Json,
            false,
        )
        .unwrap();
        let json = output(buffer);

        assert!(json.starts_with(r##"{"#type":"Medication","@id":"med-1""##));
        assert!(json.contains(r#""dose":"10 mg""#));
    }

    #[test]
    fn test_convert_json_to_xml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "contact.json", CONTACT);

        let mut buffer = Vec::new();
        convert(
            &mut buffer,
            &path,
            InputFormat::Auto,
            &BindingOptions::default(),
            OutputFormat::Xml,
            true,
        )
        .unwrap();
        let xml = output(buffer);

        assert!(xml.contains(r#"<Contact xmlns="http://indivo.org/vocab/xml/documents#" id="c1">"#));
        assert!(xml.contains("<fullName>Lisa Cuddy</fullName>"));
    }

    #[test]
    fn test_validate_reports_each_file() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "contact.json", CONTACT);
        let missing_name = write(&dir, "nameless.xml", "<Contact id=\"c2\"/>");
        let unknown_type = write(&dir, "allergy.xml", "<Allergy/>");

        let mut buffer = Vec::new();
        let passed = validate(
            &mut buffer,
            &[good.clone()],
            InputFormat::Auto,
            &BindingOptions::default(),
        )
        .unwrap();
        assert!(passed);
        assert!(output(buffer).starts_with("ok    "));

        let mut buffer = Vec::new();
        let passed = validate(
            &mut buffer,
            &[good, missing_name, unknown_type],
            InputFormat::Auto,
            &BindingOptions::default(),
        )
        .unwrap();
        let report = output(buffer);

        assert!(!passed);
        assert!(report.contains("(Contact c1)"));
        assert!(report.contains("FAIL") && report.contains("fullName"));
        assert!(report.contains("Allergy"));
        assert!(report.ends_with("2 of 3 documents failed\n"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_record(
            Path::new("/nonexistent/indivo/doc.xml"),
            InputFormat::Auto,
            &BindingOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("reading"));
    }

    #[test]
    fn test_schemas_listing() {
        let mut buffer = Vec::new();
        schemas(&mut buffer, None).unwrap();
        assert_eq!(
            output(buffer),
            "Medication\nPrescription\nContact\nContactLocation\n"
        );

        let mut buffer = Vec::new();
        schemas(&mut buffer, Some("Contact")).unwrap();
        let text = output(buffer);
        assert!(text.contains("  fullName: String [required]\n"));
        assert!(text.contains("  email: String [repeated]\n"));

        let mut buffer = Vec::new();
        schemas(&mut buffer, Some("ContactLocation")).unwrap();
        assert!(output(buffer).contains("  type: String [attribute]\n"));

        assert!(schemas(&mut Vec::new(), Some("Allergy")).is_err());
    }
}
