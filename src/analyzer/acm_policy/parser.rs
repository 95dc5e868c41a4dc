//! Violation message parsing.
//!
//! ACM status history carries free-text messages such as
//!
//! ```text
//! NonCompliant; violation - operators [web-terminal.openshift-web-terminal] found but not as specified
//! [Subscription] my-operator in namespace openshift-operators not as specified
//! nodes found but not as specified
//! no matches for kind "PtpConfig" in version "ptp.openshift.io/v1"
//! ```
//!
//! There is no formal grammar. Three shapes are recognised, tried in order
//! from [`GRAMMARS`]; the namespace is pulled out independently of which
//! one matched. Unrecognised text parses to empty fields.

/// Prefix ACM puts in front of the resource description.
const VIOLATION_PREFIX: &str = "violation - ";

/// Marker preceding a namespace inside a message.
const NAMESPACE_MARKER: &str = "in namespace ";

/// API server phrasings for a kind it does not serve, with the kind (if
/// any) following the phrase.
const UNSERVED_KIND_MARKERS: &[&str] = &[
    "no matches for kind",
    "the server doesn't have a resource type",
    "could not find the requested resource",
];

/// Resource coordinates pulled out of a message. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResource {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl ParsedResource {
    pub fn kind(&self) -> Option<&str> {
        non_empty(&self.kind)
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn namespace(&self) -> Option<&str> {
        non_empty(&self.namespace)
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty() && self.name.is_empty() && self.namespace.is_empty()
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// One recognised message shape.
pub struct Grammar {
    pub name: &'static str,
    /// Whether this grammar claims the (trimmed, non-empty) detail.
    pub applies: fn(&str) -> bool,
    /// Extract `(kind, name)`.
    pub parse: fn(&str) -> (String, String),
}

/// Message grammars in priority order. The first whose `applies` holds wins.
pub const GRAMMARS: &[Grammar] = &[
    Grammar {
        name: "unserved-kind",
        applies: mentions_unserved_kind,
        parse: parse_unserved_kind,
    },
    Grammar {
        name: "bracketed-kind",
        applies: starts_with_bracket,
        parse: parse_bracketed_kind,
    },
    Grammar {
        name: "kind-first",
        applies: always,
        parse: parse_kind_first,
    },
];

fn mentions_unserved_kind(detail: &str) -> bool {
    UNSERVED_KIND_MARKERS.iter().any(|m| detail.contains(m))
}

fn starts_with_bracket(detail: &str) -> bool {
    detail.starts_with('[')
}

fn always(_: &str) -> bool {
    true
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// `[kind] name rest...`
fn parse_bracketed_kind(detail: &str) -> (String, String) {
    let Some(close) = detail.find(']').filter(|&i| i > 0) else {
        return (String::new(), String::new());
    };
    let kind = detail[1..close].to_string();
    let rest = detail[close + 1..].trim();
    let name = match rest.find(is_blank) {
        Some(i) if i > 0 => &rest[..i],
        _ => rest,
    };
    (kind, name.to_string())
}

/// `... no matches for kind "Kind" in version ...`; the name is never known.
fn parse_unserved_kind(detail: &str) -> (String, String) {
    let after = UNSERVED_KIND_MARKERS
        .iter()
        .find_map(|m| detail.find(m).map(|i| detail[i + m.len()..].trim_start()))
        .unwrap_or_default();

    let kind = match after.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next().unwrap_or_default(),
        None => after
            .split(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .trim_matches(|c: char| c == '"' || c == ':' || c == ';' || c == ','),
    };
    (kind.to_string(), String::new())
}

/// `kind [name] rest...` or `kind description...`
fn parse_kind_first(detail: &str) -> (String, String) {
    match detail.find('[').filter(|&i| i > 0) {
        Some(open) => {
            let kind = detail[..open].trim().to_string();
            let name = detail[open..]
                .find(']')
                .filter(|&i| i > 0)
                .map(|close| detail[open + 1..open + close].to_string())
                .unwrap_or_default();
            (kind, name)
        }
        None => {
            let kind = detail
                .find(is_blank)
                .filter(|&i| i > 0)
                .map(|i| detail[..i].to_string())
                .unwrap_or_default();
            (kind, String::new())
        }
    }
}

/// Drop the `NonCompliant; violation - ` preamble when present.
pub fn strip_violation_prefix(message: &str) -> &str {
    match message.find(VIOLATION_PREFIX) {
        Some(i) => &message[i + VIOLATION_PREFIX.len()..],
        None => message,
    }
}

/// Token after `in namespace `, up to whitespace, `;` or `,`.
pub fn extract_namespace(detail: &str) -> Option<&str> {
    let start = detail.find(NAMESPACE_MARKER)? + NAMESPACE_MARKER.len();
    let after = &detail[start..];
    let end = after
        .find(|c: char| c.is_whitespace() || c == ';' || c == ',')
        .unwrap_or(after.len());
    non_empty(&after[..end])
}

/// Parse a raw status-history message into resource coordinates.
pub fn parse_violation_resource(message: &str) -> ParsedResource {
    let detail = strip_violation_prefix(message).trim();
    if detail.is_empty() {
        return ParsedResource::default();
    }

    let (kind, name) = GRAMMARS
        .iter()
        .find(|g| (g.applies)(detail))
        .map(|g| (g.parse)(detail))
        .unwrap_or_default();

    ParsedResource {
        kind,
        name,
        namespace: extract_namespace(detail).unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(msg: &str) -> (String, String, String) {
        let p = parse_violation_resource(msg);
        (p.kind, p.name, p.namespace)
    }

    #[test]
    fn test_kind_bracket_name() {
        assert_eq!(
            parse("nodes [worker-1] not found"),
            ("nodes".into(), "worker-1".into(), "".into())
        );
    }

    #[test]
    fn test_bracket_kind_name_namespace() {
        assert_eq!(
            parse("[Subscription] my-operator in namespace openshift-operators not as specified"),
            (
                "Subscription".into(),
                "my-operator".into(),
                "openshift-operators".into()
            )
        );
    }

    #[test]
    fn test_violation_prefix_is_stripped() {
        let msg = "NonCompliant; violation - operators [web-terminal.openshift-web-terminal] found but not as specified";
        assert_eq!(
            parse(msg),
            (
                "operators".into(),
                "web-terminal.openshift-web-terminal".into(),
                "".into()
            )
        );
    }

    #[test]
    fn test_bare_kind_description() {
        assert_eq!(
            parse("nodes found but not as specified"),
            ("nodes".into(), "".into(), "".into())
        );
    }

    #[test]
    fn test_namespace_terminators() {
        assert_eq!(
            extract_namespace("deployments [a] in namespace ns-1; other"),
            Some("ns-1")
        );
        assert_eq!(
            extract_namespace("deployments [a] in namespace ns-2, and more"),
            Some("ns-2")
        );
        assert_eq!(extract_namespace("deployments [a] in namespace ns-3"), Some("ns-3"));
        assert_eq!(
            extract_namespace("deployments [a] in namespace ns-4\r\nnext"),
            Some("ns-4")
        );
        assert_eq!(
            extract_namespace("deployments [a] in namespace ns-5\u{a0}missing"),
            Some("ns-5")
        );
        assert_eq!(extract_namespace("deployments [a] missing"), None);
    }

    #[test]
    fn test_multiple_names_keep_first_bracket() {
        let msg = "subscriptions [sriov, ptp] not found in namespace openshift-operators";
        assert_eq!(
            parse(msg),
            (
                "subscriptions".into(),
                "sriov, ptp".into(),
                "openshift-operators".into()
            )
        );
    }

    #[test]
    fn test_bracketed_kind_without_name() {
        assert_eq!(parse("[Namespace]"), ("Namespace".into(), "".into(), "".into()));
    }

    #[test]
    fn test_unrecognised_messages_are_empty() {
        assert!(parse_violation_resource("").is_empty());
        assert!(parse_violation_resource("   ").is_empty());
        assert!(parse_violation_resource("compliant").is_empty());
        assert!(parse_violation_resource("[unterminated").is_empty());
    }

    #[test]
    fn test_unclosed_name_bracket() {
        assert_eq!(parse("pods [broken"), ("pods".into(), "".into(), "".into()));
    }

    #[test]
    fn test_unserved_kind_takes_quoted_kind() {
        let msg = "NonCompliant; violation - no matches for kind \"PtpConfig\" in version \"ptp.openshift.io/v1\"";
        assert_eq!(parse(msg), ("PtpConfig".into(), "".into(), "".into()));
        assert_eq!(
            parse("error: the server doesn't have a resource type \"sriovnetworks\""),
            ("sriovnetworks".into(), "".into(), "".into())
        );
        assert_eq!(
            parse("no matches for kind Foo: not found"),
            ("Foo".into(), "".into(), "".into())
        );
    }

    #[test]
    fn test_unserved_kind_without_kind_is_empty() {
        assert!(parse_violation_resource("the server could not find the requested resource").is_empty());
    }

    #[test]
    fn test_grammar_order() {
        let names: Vec<_> = GRAMMARS.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["unserved-kind", "bracketed-kind", "kind-first"]);
    }

    proptest! {
        #[test]
        fn prop_parsing_is_idempotent(msg in ".{0,200}") {
            prop_assert_eq!(parse_violation_resource(&msg), parse_violation_resource(&msg));
        }

        #[test]
        fn prop_never_panics_on_bracket_soup(msg in "[\\[\\] a-z;,.-]{0,80}") {
            let _ = parse_violation_resource(&msg);
        }

        #[test]
        fn prop_kind_first_roundtrip(kind in "[a-z]{1,12}", name in "[a-z0-9-]{1,20}") {
            let parsed = parse_violation_resource(&format!("{} [{}] not found", kind, name));
            prop_assert_eq!(parsed.kind, kind);
            prop_assert_eq!(parsed.name, name);
        }
    }
}
