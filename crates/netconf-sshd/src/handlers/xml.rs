// Copyright 2024-2026 Farlight Networks, LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Minimal element extraction for edit-config payloads.
//!
//! The filters handlers care about are small and their element names are
//! fixed, so extraction works the same way as dispatch: byte search, no
//! schema. The open tag may carry attributes; nesting of an element inside
//! itself is not supported and not needed by any of the served models.

/// Returns the inner content of the first `<tag ...>...</tag>` section.
pub fn section<'a>(doc: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let start = doc.find(&open)?;
    let after_open = &doc[start..];
    // The byte after the tag name must end the open tag or start an
    // attribute list, otherwise "<ssh" would match "<ssh-server-config".
    let rest = &after_open[open.len()..];
    if !matches!(rest.as_bytes().first(), Some(b'>' | b' ' | b'\t' | b'\r' | b'\n')) {
        // Try again past this false match.
        let next = doc[start + open.len()..].find(&open).map(|i| i + start + open.len())?;
        return section(&doc[next..], tag);
    }
    let body_start = rest.find('>')? + 1;
    let body = &rest[body_start..];
    let body_end = body.find(&close)?;
    Some(&body[..body_end])
}

/// Returns the trimmed text of the first `<tag>...</tag>` element.
pub fn element_text<'a>(doc: &'a str, tag: &str) -> Option<&'a str> {
    section(doc, tag).map(str::trim)
}

/// Returns the inner content of every `<tag ...>...</tag>` section, in
/// document order.
pub fn sections<'a>(doc: &'a str, tag: &str) -> Vec<&'a str> {
    let close = format!("</{tag}>");
    let mut found = Vec::new();
    let mut rest = doc;

    while let Some(body) = section(rest, tag) {
        found.push(body);
        // Continue after the close tag of the section just found.
        let Some(close_at) = rest.find(&close) else {
            break;
        };
        rest = &rest[close_at + close.len()..];
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_with_attributes() {
        let doc = r#"<config><vlans xmlns="yang:set_vlan"><vlan/></vlans></config>"#;
        assert_eq!(section(doc, "vlans"), Some("<vlan/>"));
    }

    #[test]
    fn element_text_is_trimmed() {
        assert_eq!(element_text("<id> 42 </id>", "id"), Some("42"));
    }

    #[test]
    fn missing_element_is_none() {
        assert_eq!(section("<config/>", "vlans"), None);
    }

    #[test]
    fn prefix_tag_is_not_confused() {
        // Looking for <ssh> must not stop at <ssh-server-config>.
        let doc = "<ssh-server-config><enabled>true</enabled></ssh-server-config>";
        assert_eq!(section(doc, "ssh"), None);
        assert_eq!(
            section(doc, "ssh-server-config"),
            Some("<enabled>true</enabled>")
        );
    }

    #[test]
    fn sections_in_document_order() {
        let doc = "<vlan><id>1</id></vlan><vlan><id>2</id></vlan>";
        let all = sections(doc, "vlan");
        assert_eq!(all, vec!["<id>1</id>", "<id>2</id>"]);
    }
}
