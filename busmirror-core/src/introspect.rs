//! Introspection document parsing.
//!
//! A reply looks like:
//!
//! ```text
//! <node name="/Settings">
//!   <interface name="com.victronenergy.BusItem"> ... </interface>
//!   <node name="System"/>
//!   <node name="Vrmlogger"/>
//! </node>
//! ```
//!
//! Only `<node>` elements that are direct children of the root element name
//! child objects. Everything else is ignored.

use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::IntrospectionError;
use crate::types::PATH_SEPARATOR;

const NODE_TAG: &[u8] = b"node";

/// Names of the immediate children listed in an introspection document, in
/// document order. A child named after the root marker is skipped; a name
/// listed twice makes the document malformed.
pub fn child_names(document: &str) -> Result<Vec<String>, IntrospectionError> {
    let mut reader = Reader::from_str(document);
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut names = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| IntrospectionError::malformed(err.to_string()))?;
        match event {
            Event::Start(element) => {
                visit_element(&element, depth, &mut seen_root, &mut names)?;
                depth += 1;
            }
            Event::Empty(element) => {
                visit_element(&element, depth, &mut seen_root, &mut names)?;
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(IntrospectionError::malformed("unexpected closing tag"));
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(IntrospectionError::malformed("document has no <node> element"));
    }
    if depth != 0 {
        return Err(IntrospectionError::malformed("unterminated <node> element"));
    }
    let mut unique = HashSet::new();
    if let Some(dup) = names.iter().find(|name| !unique.insert(name.as_str())) {
        return Err(IntrospectionError::malformed(format!(
            "child '{dup}' listed more than once"
        )));
    }
    Ok(names)
}

fn visit_element(
    element: &BytesStart<'_>,
    depth: usize,
    seen_root: &mut bool,
    names: &mut Vec<String>,
) -> Result<(), IntrospectionError> {
    let is_node = element.name().as_ref() == NODE_TAG;
    match depth {
        0 => {
            if *seen_root {
                return Err(IntrospectionError::malformed("more than one root element"));
            }
            if !is_node {
                return Err(IntrospectionError::malformed(format!(
                    "root element is <{}>, expected <node>",
                    String::from_utf8_lossy(element.name().as_ref())
                )));
            }
            *seen_root = true;
        }
        1 if is_node => {
            let name = node_name(element)?;
            if name != PATH_SEPARATOR {
                names.push(name);
            }
        }
        _ => {}
    }
    Ok(())
}

fn node_name(element: &BytesStart<'_>) -> Result<String, IntrospectionError> {
    let attr = element
        .try_get_attribute("name")
        .map_err(|err| IntrospectionError::malformed(err.to_string()))?
        .ok_or_else(|| IntrospectionError::malformed("child <node> without a name"))?;
    let name = attr
        .unescape_value()
        .map_err(|err| IntrospectionError::malformed(err.to_string()))?
        .into_owned();
    if name.is_empty() {
        return Err(IntrospectionError::malformed("child <node> with an empty name"));
    }
    Ok(name)
}

/// Render the document a service would return for an object with `children`.
pub fn render(children: &[&str]) -> String {
    let mut doc = String::from(
        "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n\
         \"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n<node>\n",
    );
    for child in children {
        doc.push_str(&format!(
            "  <node name=\"{}\"/>\n",
            quick_xml::escape::escape(*child)
        ));
    }
    doc.push_str("</node>\n");
    doc
}
