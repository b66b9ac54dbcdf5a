use super::tokens::{Token, Tokens, XmlError};

/// Collect the `href` of every `a` element, in document order.
///
/// Elements and attributes match on local name, so `xhtml:a` and
/// `xlink:href` count too. An `a` without `href` adds nothing; one with two
/// adds both. Values are returned as written (entities resolved), with no
/// URL checks.
pub fn extract_hrefs(text: &str) -> Result<Vec<String>, XmlError> {
    extract_attribute_values(text, "a", "href")
}

/// Collect the value of every `attribute` on every `element` start tag.
///
/// All or nothing: if the document turns out malformed anywhere, the values
/// found before the error are discarded and the error is returned.
pub fn extract_attribute_values(
    text: &str,
    element: &str,
    attribute: &str,
) -> Result<Vec<String>, XmlError> {
    let mut values = Vec::new();

    for token in Tokens::new(text) {
        if let Token::Start(start) = token? {
            if start.local_name == element {
                values.extend(start.attribute_values(attribute).map(str::to_string));
            }
        }
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_anchor() {
        assert_eq!(extract_hrefs("<a href=\"x\"/>").unwrap(), ["x"]);
    }

    #[test]
    fn anchor_without_href() {
        assert!(extract_hrefs("<a name=\"x\"/>").unwrap().is_empty());
    }

    #[test]
    fn duplicate_href_yields_both_in_order() {
        assert_eq!(
            extract_hrefs("<a href=\"first\" href=\"second\">x</a>").unwrap(),
            ["first", "second"]
        );
    }

    #[test]
    fn document_order_and_duplicates() {
        let page = r##"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
  <head><link href="style.css" rel="stylesheet"/></head>
  <body>
    <p>See <a href="https://en.wikipedia.org/wiki/Information">information</a>.</p>
    <p><a id="anchor"/><b><a href="#note1">1</a></b></p>
    <p><a href="https://en.wikipedia.org/wiki/Information">again</a></p>
  </body>
</html>"##;

        assert_eq!(
            extract_hrefs(page).unwrap(),
            [
                "https://en.wikipedia.org/wiki/Information",
                "#note1",
                "https://en.wikipedia.org/wiki/Information",
            ]
        );
    }

    #[test]
    fn prefixed_names_match() {
        let page = r#"<h:body xmlns:h="http://www.w3.org/1999/xhtml"><h:a xlink:href="x">y</h:a></h:body>"#;
        assert_eq!(extract_hrefs(page).unwrap(), ["x"]);
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(extract_hrefs("<A href=\"x\"/>").unwrap().is_empty());
        assert!(extract_hrefs("<a HREF=\"x\"/>").unwrap().is_empty());
    }

    #[test]
    fn entities_in_values_are_resolved() {
        assert_eq!(
            extract_hrefs("<a href=\"/search?q=a&amp;b=c\">s</a>").unwrap(),
            ["/search?q=a&b=c"]
        );
    }

    #[test]
    fn values_are_not_validated() {
        assert_eq!(extract_hrefs("<a href=\"not a url\"/>").unwrap(), ["not a url"]);
    }

    #[test]
    fn malformed_document_discards_partial_results() {
        let err = extract_hrefs("<p><a href=\"kept?\"/></p><p>").unwrap_err();
        assert!(matches!(err, XmlError::Unclosed { open: 1 }));
    }

    #[test]
    fn invalid_character_data_is_an_error() {
        for page in ["<p>\u{1}</p>", "<a href=\"a<b\"/>", "<1a/>"] {
            assert!(extract_hrefs(page).is_err(), "{page:?} was accepted");
        }
    }

    #[test]
    fn other_element_attribute_pairs() {
        let page = r#"<body><img src="a.png"/><a href="x"/><img src="b.png"/></body>"#;
        assert_eq!(
            extract_attribute_values(page, "img", "src").unwrap(),
            ["a.png", "b.png"]
        );
    }
}
