//! Single-pass XML response reader
//!
//! Every operation's response is read the same way: one streaming pass that
//! collects the error (if any), box usage, success marker, listed names,
//! attribute pairs and the continuation token. Element text is kept verbatim;
//! only bookkeeping fields (codes, usage, tokens) are trimmed.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::sdb::dialect::Dialect;
use crate::sdb::error::{Result, SdbError, ServiceError};

/// Everything the client reads from one response document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDocument {
    /// First `Errors/Error` element
    pub error: Option<ServiceError>,
    pub box_usage: Option<f64>,
    /// A `Success` element was present
    pub success: bool,
    pub request_id: Option<String>,
    pub domain_names: Vec<String>,
    pub item_names: Vec<String>,
    /// `Attribute/Name` + `Attribute/Value` pairs in document order
    pub attributes: Vec<(String, String)>,
    /// Continuation token; an empty element counts as absent
    pub next_token: Option<String>,
}

impl ResponseDocument {
    pub fn parse(xml_data: &[u8], dialect: Dialect) -> Result<Self> {
        let mut reader = Reader::from_reader(xml_data);

        let mut doc = ResponseDocument::default();
        let mut stack: Vec<Vec<u8>> = Vec::with_capacity(8);
        let mut current_text = String::with_capacity(256);

        let mut attr_name: Option<String> = None;
        let mut attr_value: Option<String> = None;
        let mut error_code: Option<String> = None;
        let mut error_message: Option<String> = None;

        let domain_path = dialect.domain_entry_path();
        let token_tag = dialect.token_param().as_bytes();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = e.local_name();
                    match name.as_ref() {
                        b"Success" => doc.success = true,
                        b"Attribute" => {
                            attr_name = None;
                            attr_value = None;
                        }
                        b"Error" => {
                            error_code = None;
                            error_message = None;
                        }
                        _ => {}
                    }
                    stack.push(name.as_ref().to_vec());
                    current_text.clear();
                }
                Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"Success" {
                        doc.success = true;
                    }
                }
                Ok(Event::Text(e)) => {
                    current_text.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) => {
                    current_text.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::End(e)) => {
                    let name = e.local_name();
                    let tag = name.as_ref();

                    if ends_with(&stack, domain_path) {
                        doc.domain_names.push(std::mem::take(&mut current_text));
                    } else if tag == token_tag {
                        let token = current_text.trim();
                        if !token.is_empty() {
                            doc.next_token = Some(token.to_string());
                        }
                    } else {
                        match tag {
                            b"ItemName" => {
                                doc.item_names.push(std::mem::take(&mut current_text));
                            }
                            b"Name" if parent_is(&stack, b"Attribute") => {
                                attr_name = Some(std::mem::take(&mut current_text));
                            }
                            b"Value" if parent_is(&stack, b"Attribute") => {
                                attr_value = Some(std::mem::take(&mut current_text));
                            }
                            b"Attribute" => {
                                if let Some(name) = attr_name.take() {
                                    doc.attributes.push((name, attr_value.take().unwrap_or_default()));
                                }
                            }
                            b"Code" if parent_is(&stack, b"Error") => {
                                error_code = Some(current_text.trim().to_string());
                            }
                            b"Message" if parent_is(&stack, b"Error") => {
                                error_message = Some(current_text.trim().to_string());
                            }
                            b"Error" if parent_is(&stack, b"Errors") => {
                                if doc.error.is_none() {
                                    if let Some(code) = error_code.take() {
                                        doc.error = Some(ServiceError::new(
                                            code,
                                            error_message.take().unwrap_or_default(),
                                        ));
                                    }
                                }
                            }
                            b"BoxUsage" => {
                                if doc.box_usage.is_none() {
                                    doc.box_usage = current_text.trim().parse().ok();
                                }
                            }
                            b"RequestId" | b"RequestID" => {
                                doc.request_id = Some(current_text.trim().to_string());
                            }
                            _ => {}
                        }
                    }

                    stack.pop();
                    current_text.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(SdbError::XmlParse(e.to_string())),
                _ => {}
            }
        }

        Ok(doc)
    }

    /// Surface the classified service error, if the document carries one
    pub fn check(&self) -> Result<()> {
        match &self.error {
            Some(err) => Err(SdbError::Service(err.clone())),
            None => Ok(()),
        }
    }
}

fn parent_is(stack: &[Vec<u8>], name: &[u8]) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == name
}

/// Whether the open-element stack ends with `path` (innermost last)
fn ends_with(stack: &[Vec<u8>], path: &[&[u8]]) -> bool {
    stack.len() >= path.len()
        && stack[stack.len() - path.len()..]
            .iter()
            .zip(path)
            .all(|(open, want)| open.as_slice() == *want)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdb::error::ErrorCategory;

    const LIST_DOMAINS: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<ListDomainsResponse xmlns="http://sdb.amazonaws.com/doc/2007-11-07">
  <ListDomainsResult>
    <DomainName>foo</DomainName>
    <DomainName>bar</DomainName>
    <NextToken>FOOBAR</NextToken>
  </ListDomainsResult>
  <ResponseMetadata>
    <RequestId>eb13162f-1b95-4511-8b12-489b86acfd28</RequestId>
    <BoxUsage>0.0000219907</BoxUsage>
  </ResponseMetadata>
</ListDomainsResponse>"#;

    #[test]
    fn test_parse_domain_listing() {
        let doc = ResponseDocument::parse(LIST_DOMAINS.as_bytes(), Dialect::Sdb).unwrap();
        assert_eq!(doc.domain_names, vec!["foo", "bar"]);
        assert_eq!(doc.next_token.as_deref(), Some("FOOBAR"));
        assert_eq!(doc.box_usage, Some(0.0000219907));
        assert_eq!(
            doc.request_id.as_deref(),
            Some("eb13162f-1b95-4511-8b12-489b86acfd28")
        );
        assert!(doc.error.is_none());
        assert!(doc.check().is_ok());
    }

    #[test]
    fn test_parse_sds_listing() {
        let xml = r#"<ListResponse>
  <Domain><Name>alpha</Name></Domain>
  <Domain><Name>beta</Name></Domain>
  <MoreToken>NEXT</MoreToken>
</ListResponse>"#;
        let doc = ResponseDocument::parse(xml.as_bytes(), Dialect::Sds).unwrap();
        assert_eq!(doc.domain_names, vec!["alpha", "beta"]);
        assert_eq!(doc.next_token.as_deref(), Some("NEXT"));

        // the other dialect's token element is not a continuation
        let doc = ResponseDocument::parse(xml.as_bytes(), Dialect::Sdb).unwrap();
        assert!(doc.next_token.is_none());
    }

    #[test]
    fn test_parse_attributes() {
        let xml = r#"<GetAttributesResponse>
<GetAttributesResult>
<Attribute><Name>Color</Name><Value>Blue</Value></Attribute>
<Attribute><Name>Size</Name><Value> Med </Value></Attribute>
<Attribute><Name>Note</Name><Value>a &amp; b</Value></Attribute>
</GetAttributesResult>
</GetAttributesResponse>"#;
        let doc = ResponseDocument::parse(xml.as_bytes(), Dialect::Sdb).unwrap();
        assert_eq!(
            doc.attributes,
            vec![
                ("Color".to_string(), "Blue".to_string()),
                ("Size".to_string(), " Med ".to_string()),
                ("Note".to_string(), "a & b".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_error() {
        let xml = r#"<Response>
<Errors>
<Error>
<Code>NoSuchDomain</Code>
<Message>The specified domain does not exist.</Message>
<BoxUsage>0.0000219907</BoxUsage>
</Error>
</Errors>
<RequestID>1e6265c5-f1f2-4a4b-afef-1448cac0f065</RequestID>
</Response>"#;
        let doc = ResponseDocument::parse(xml.as_bytes(), Dialect::Sdb).unwrap();
        let err = doc.error.clone().unwrap();
        assert_eq!(err.code, "NoSuchDomain");
        assert_eq!(err.message, "The specified domain does not exist.");
        assert_eq!(err.category, ErrorCategory::Parameter);
        assert_eq!(doc.box_usage, Some(0.0000219907));
        assert_eq!(doc.check().unwrap_err().category(), Some(ErrorCategory::Parameter));
    }

    #[test]
    fn test_only_first_error_surfaces() {
        let xml = r#"<Response><Errors>
<Error><Code>RequestTimeout</Code><Message>slow</Message></Error>
<Error><Code>AuthFailure</Code><Message>bad</Message></Error>
</Errors></Response>"#;
        let doc = ResponseDocument::parse(xml.as_bytes(), Dialect::Sdb).unwrap();
        assert_eq!(doc.error.unwrap().code, "RequestTimeout");
    }

    #[test]
    fn test_success_marker_and_empty_token() {
        let xml = "<PutResponse><Success/><NextToken></NextToken></PutResponse>";
        let doc = ResponseDocument::parse(xml.as_bytes(), Dialect::Sdb).unwrap();
        assert!(doc.success);
        assert!(doc.next_token.is_none());
    }

    #[test]
    fn test_malformed_xml() {
        let err = ResponseDocument::parse(b"<a><b></a>", Dialect::Sdb).unwrap_err();
        assert!(matches!(err, SdbError::XmlParse(_)));
    }
}
