//! Reading and writing of `archetype.xml` manifests.
//!
//! ```xml
//! <archetype>
//!   <id>quickstart</id>
//!   <allowPartial>true</allowPartial>
//!   <encoding>UTF-8</encoding>
//!   <sources>
//!     <source>src/main/java/__packageInPathFormat__/App.java</source>
//!   </sources>
//!   <resources>
//!     <resource filtered="false">src/main/resources/logo.png</resource>
//!   </resources>
//! </archetype>
//! ```
//!
//! Entry attributes equal to the defaults (`filtered="true"`, the manifest
//! encoding) are left out when writing.

use super::{ArchetypeDescriptor, RequiredProperty, Role, TemplateDescriptor};
use crate::encoding::Charset;
use crate::error::{Error, Result};
use crate::path::is_rendered_path_valid;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

const ROOT: &str = "archetype";

/// Order of the lists in a written manifest.
const MANIFEST_ORDER: [Role; 5] = [
    Role::Sources,
    Role::Resources,
    Role::TestSources,
    Role::TestResources,
    Role::SiteResources,
];

/// Reads a manifest from disk.
///
/// # Arguments
/// * `path` - Location of the manifest
/// * `fallback_encoding` - Encoding used when the manifest declares none
pub fn read<P: AsRef<Path>>(path: P, fallback_encoding: &Charset) -> Result<ArchetypeDescriptor> {
    let path = path.as_ref();
    debug!("Reading archetype descriptor from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|source| Error::FileError {
        action: "read",
        path: path.display().to_string(),
        fileset: "descriptor".to_string(),
        source,
    })?;
    parse(&content, fallback_encoding)
}

/// Writes a manifest to disk, creating parent directories.
pub fn write<P: AsRef<Path>>(descriptor: &ArchetypeDescriptor, path: P) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing archetype descriptor to {}", path.display());
    let content = serialize(descriptor)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|source| Error::FileError {
        action: "write",
        path: path.display().to_string(),
        fileset: "descriptor".to_string(),
        source,
    })
}

struct RawEntry {
    role: Role,
    path: String,
    filtered: Option<bool>,
    encoding: Option<Charset>,
}

#[derive(Default)]
struct ManifestParser {
    stack: Vec<String>,
    id: Option<String>,
    allow_partial: bool,
    encoding: Option<Charset>,
    entries: Vec<RawEntry>,
    entry: Option<RawEntry>,
    properties: Vec<RequiredProperty>,
    property: Option<RequiredProperty>,
}

impl ManifestParser {
    fn open(&mut self, name: &str, element: &BytesStart) -> Result<()> {
        let parent: Vec<&str> = self.stack.iter().map(String::as_str).collect();
        match parent.as_slice() {
            [] if name == ROOT => {}
            [] => {
                return Err(Error::DescriptorError(format!(
                    "expected <{ROOT}> root element, found <{name}>"
                )))
            }
            [ROOT, "requiredProperties"] if name == "requiredProperty" => {
                let key = attribute(element, "key")?.ok_or_else(|| {
                    Error::DescriptorError("requiredProperty without key".to_string())
                })?;
                self.property = Some(RequiredProperty::new(key));
            }
            [ROOT, list] => {
                if let Some(role) = Role::from_list_element(list) {
                    if name != role.entry_element() {
                        return Err(Error::DescriptorError(format!(
                            "unexpected <{name}> in <{list}>"
                        )));
                    }
                    self.entry = Some(parse_entry(role, element)?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        let path: Vec<&str> = self.stack.iter().map(String::as_str).collect();
        match path.as_slice() {
            [ROOT, "id"] => self.id = Some(text.to_string()),
            [ROOT, "allowPartial"] => self.allow_partial = parse_bool("allowPartial", text)?,
            [ROOT, "encoding"] => self.encoding = Some(Charset::for_label(text)?),
            [ROOT, list, _] if Role::from_list_element(list).is_some() => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.path.push_str(text);
                }
            }
            [ROOT, "requiredProperties", "requiredProperty", field] => {
                if let Some(property) = self.property.as_mut() {
                    match *field {
                        "defaultValue" => property.default_value = Some(text.to_string()),
                        "validationRegex" => property.validation_regex = Some(text.to_string()),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let depth = self.stack.len();
        if depth == 3 {
            if let Some(entry) = self.entry.take() {
                if entry.path.trim().is_empty() {
                    return Err(Error::DescriptorError(format!(
                        "empty <{}> entry in <{}>",
                        entry.role.entry_element(),
                        entry.role.list_element()
                    )));
                }
                if !is_rendered_path_valid(entry.path.trim()) {
                    return Err(Error::DescriptorError(format!(
                        "entry '{}' in <{}> must be a relative path without '..'",
                        entry.path.trim(),
                        entry.role.list_element()
                    )));
                }
                self.entries.push(entry);
            }
            if let Some(property) = self.property.take() {
                self.properties.push(property);
            }
        }
        self.stack.pop();
        Ok(())
    }

    fn finish(self, fallback_encoding: &Charset) -> Result<ArchetypeDescriptor> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::DescriptorError("missing <id>".to_string()))?;
        let encoding = self.encoding.unwrap_or_else(|| fallback_encoding.clone());

        let mut descriptor = ArchetypeDescriptor::new(id.trim(), encoding.clone());
        descriptor.set_allow_partial(self.allow_partial);
        for property in self.properties {
            descriptor.add_required_property(property);
        }
        for entry in self.entries {
            let template = TemplateDescriptor::new(
                entry.filtered.unwrap_or(true),
                entry.encoding.unwrap_or_else(|| encoding.clone()),
            );
            descriptor.insert(entry.role, entry.path.trim(), template);
        }
        Ok(descriptor)
    }
}

fn parse_entry(role: Role, element: &BytesStart) -> Result<RawEntry> {
    let filtered = attribute(element, "filtered")?
        .map(|value| parse_bool("filtered", &value))
        .transpose()?;
    let encoding = attribute(element, "encoding")?.map(Charset::for_label).transpose()?;
    Ok(RawEntry { role, path: String::new(), filtered, encoding })
}

fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::DescriptorError(e.to_string()))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(|e| Error::DescriptorError(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::DescriptorError(format!(
            "{field} must be 'true' or 'false', found '{other}'"
        ))),
    }
}

/// Parses manifest content.
///
/// # Errors
/// * `Error::XmlError` if the document is not well-formed
/// * `Error::DescriptorError` for a wrong root element, missing id or bad attribute
/// * `Error::UnsupportedEncodingError` for an unknown encoding name
pub fn parse(content: &str, fallback_encoding: &Charset) -> Result<ArchetypeDescriptor> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut parser = ManifestParser::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                parser.open(&name, &e)?;
                parser.stack.push(name);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                parser.open(&name, &e)?;
                parser.stack.push(name);
                parser.close()?;
            }
            Event::End(_) => parser.close()?,
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| Error::DescriptorError(e.to_string()))?;
                parser.text(&text)?;
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t.into_inner()).to_string();
                parser.text(&text)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parser.finish(fallback_encoding)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Serializes a descriptor to manifest XML.
pub fn serialize(descriptor: &ArchetypeDescriptor) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

    write_text_element(&mut writer, "id", descriptor.id())?;
    if descriptor.allow_partial() {
        write_text_element(&mut writer, "allowPartial", "true")?;
    }
    let default_encoding = descriptor.default_encoding();
    write_text_element(&mut writer, "encoding", default_encoding.label())?;

    if !descriptor.required_properties().is_empty() {
        writer.write_event(Event::Start(BytesStart::new("requiredProperties")))?;
        for property in descriptor.required_properties() {
            let mut start = BytesStart::new("requiredProperty");
            start.push_attribute(("key", property.key.as_str()));
            writer.write_event(Event::Start(start))?;
            if let Some(default_value) = &property.default_value {
                write_text_element(&mut writer, "defaultValue", default_value)?;
            }
            if let Some(regex) = &property.validation_regex {
                write_text_element(&mut writer, "validationRegex", regex)?;
            }
            writer.write_event(Event::End(BytesEnd::new("requiredProperty")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("requiredProperties")))?;
    }

    for role in MANIFEST_ORDER {
        let mut entries = descriptor.entries(role).peekable();
        if entries.peek().is_none() {
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new(role.list_element())))?;
        for (path, template) in entries {
            let mut start = BytesStart::new(role.entry_element());
            if template.encoding != *default_encoding {
                start.push_attribute(("encoding", template.encoding.label()));
            }
            if !template.filtered {
                start.push_attribute(("filtered", "false"));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(path)))?;
            writer.write_event(Event::End(BytesEnd::new(role.entry_element())))?;
        }
        writer.write_event(Event::End(BytesEnd::new(role.list_element())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::DescriptorError(format!("manifest is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("filtered", " true ").unwrap());
        assert!(!parse_bool("filtered", "false").unwrap());
        assert!(parse_bool("filtered", "yes").is_err());
    }

    #[test]
    fn test_wrong_root_element() {
        let result = parse("<project><id>x</id></project>", &Charset::utf8());
        assert!(matches!(result, Err(Error::DescriptorError(_))));
    }

    #[test]
    fn test_entry_outside_resources() {
        for entry in ["../secret.txt", "src/../../secret.txt", "/etc/passwd"] {
            let xml = format!(
                "<archetype><id>x</id><resources><resource>{entry}</resource></resources></archetype>"
            );
            assert!(matches!(parse(&xml, &Charset::utf8()), Err(Error::DescriptorError(_))));
        }
    }

    #[test]
    fn test_unexpected_entry_element() {
        let xml = "<archetype><id>x</id><sources><resource>a</resource></sources></archetype>";
        assert!(matches!(parse(xml, &Charset::utf8()), Err(Error::DescriptorError(_))));
    }
}
