//! Content type table parsed from [Content_Types].xml.

use crate::opc::packuri::PackUri;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Content type map implementing the OPC content type discovery
/// algorithm over Default and Override elements.
#[derive(Debug, Default)]
pub struct ContentTypeMap {
    /// Lowercased extension -> media type.
    defaults: HashMap<String, String>,
    /// Exact part name -> media type.
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse [Content_Types].xml.
    pub fn from_xml(xml: &[u8]) -> Result<Self, String> {
        let mut map = Self::new();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"Default" => {
                            let mut extension = None;
                            let mut content_type = None;
                            for attr in e.attributes() {
                                let attr = attr.map_err(|e| e.to_string())?;
                                match attr.key.as_ref() {
                                    b"Extension" => {
                                        extension = Some(
                                            attr.unescape_value()
                                                .map_err(|e| e.to_string())?
                                                .to_string(),
                                        );
                                    }
                                    b"ContentType" => {
                                        content_type = Some(
                                            attr.unescape_value()
                                                .map_err(|e| e.to_string())?
                                                .to_string(),
                                        );
                                    }
                                    _ => {}
                                }
                            }
                            if let (Some(ext), Some(ct)) = (extension, content_type) {
                                map.add_default(ext, ct);
                            }
                        }
                        b"Override" => {
                            let mut partname = None;
                            let mut content_type = None;
                            for attr in e.attributes() {
                                let attr = attr.map_err(|e| e.to_string())?;
                                match attr.key.as_ref() {
                                    b"PartName" => {
                                        partname = Some(
                                            attr.unescape_value()
                                                .map_err(|e| e.to_string())?
                                                .to_string(),
                                        );
                                    }
                                    b"ContentType" => {
                                        content_type = Some(
                                            attr.unescape_value()
                                                .map_err(|e| e.to_string())?
                                                .to_string(),
                                        );
                                    }
                                    _ => {}
                                }
                            }
                            if let (Some(pn), Some(ct)) = (partname, content_type) {
                                map.add_override(pn, ct);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(format!("content types parse error: {}", e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(map)
    }

    pub fn add_default(&mut self, extension: String, content_type: String) {
        self.defaults.insert(extension.to_lowercase(), content_type);
    }

    pub fn add_override(&mut self, partname: String, content_type: String) {
        self.overrides.insert(partname, content_type);
    }

    /// Look up the content type for a part. Overrides win; otherwise the
    /// extension default applies, matched case-insensitively.
    pub fn get(&self, pack_uri: &PackUri) -> Option<&str> {
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Some(ct);
        }
        self.defaults
            .get(&pack_uri.ext().to_lowercase())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = br#"<?xml version="1.0"?>
        <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
            <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
            <Default Extension="XML" ContentType="application/xml"/>
            <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
        </Types>"#;

    #[test]
    fn test_override_wins() {
        let map = ContentTypeMap::from_xml(SAMPLE).unwrap();
        let uri = PackUri::new("/ppt/presentation.xml").unwrap();
        assert_eq!(
            map.get(&uri),
            Some(
                "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"
            )
        );
    }

    #[test]
    fn test_extension_default_case_insensitive() {
        let map = ContentTypeMap::from_xml(SAMPLE).unwrap();
        let uri = PackUri::new("/docProps/app.xml").unwrap();
        assert_eq!(map.get(&uri), Some("application/xml"));
        let uri = PackUri::new("/docProps/APP.XML").unwrap();
        assert_eq!(map.get(&uri), Some("application/xml"));
    }

    #[test]
    fn test_miss() {
        let map = ContentTypeMap::from_xml(SAMPLE).unwrap();
        let uri = PackUri::new("/media/image1.png").unwrap();
        assert_eq!(map.get(&uri), None);
    }

    #[test]
    fn test_malformed() {
        assert!(ContentTypeMap::from_xml(b"<Types><Default").is_err());
    }
}
