use crate::config::ParseLimits;
use crate::error::{ParseError, Resource};
use crate::ir::{Graph, Link, Node, NodeStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static CLASS_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^class\s+"([^"]+)"\s+(.+)$"#).unwrap());
static CLASS_BARE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^class\s+(\S+)\s+(.+)$").unwrap());
static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)color\s*:\s*(#[0-9a-f]{3,8})").unwrap());
// The value group admits a leading '-' so negative values are reported as
// invalid values rather than as unmatched lines.
static CHAIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(.+?):\s*(-?[0-9.]+)(?:\s+"(.+?)")?$"#).unwrap());

const CHAIN_ARROW: &str = "-->";

/// Parses a flow description with the default [`ParseLimits`].
pub fn parse_sankey(input: &str) -> Result<Graph, ParseError> {
    parse_sankey_with_limits(input, &ParseLimits::default())
}

pub fn parse_sankey_with_limits(input: &str, limits: &ParseLimits) -> Result<Graph, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::InvalidInput);
    }
    let len = input.chars().count();
    if len > limits.max_input_chars {
        return Err(ParseError::TooLarge {
            len,
            max: limits.max_input_chars,
        });
    }

    let mut parser = SankeyParser::new(limits);
    for (idx, raw_line) in input.lines().enumerate() {
        parser.parse_line(idx + 1, raw_line)?;
    }
    let graph = parser.finish();
    log::debug!(
        "parsed sankey: {} nodes, {} links, {} options, {} styles",
        graph.nodes.len(),
        graph.links.len(),
        graph.options.len(),
        graph.styles.len()
    );
    Ok(graph)
}

struct SankeyParser<'a> {
    limits: &'a ParseLimits,
    graph: Graph,
    index: HashMap<String, usize>,
}

impl<'a> SankeyParser<'a> {
    fn new(limits: &'a ParseLimits) -> Self {
        Self {
            limits,
            graph: Graph::new(),
            index: HashMap::new(),
        }
    }

    fn finish(mut self) -> Graph {
        self.graph.apply_styles();
        self.graph
    }

    fn parse_line(&mut self, line_no: usize, raw_line: &str) -> Result<(), ParseError> {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with("%%") {
            return Ok(());
        }
        if line.starts_with("class ") {
            self.parse_class(line);
            return Ok(());
        }
        if !line.contains(CHAIN_ARROW) {
            if let Some((key, value)) = line.split_once(':') {
                self.graph
                    .options
                    .insert(key.trim().to_string(), value.trim().to_string());
                return Ok(());
            }
        }
        self.parse_chain(line_no, line)
    }

    fn parse_class(&mut self, line: &str) {
        let caps = CLASS_QUOTED_RE
            .captures(line)
            .or_else(|| CLASS_BARE_RE.captures(line));
        let Some(caps) = caps else {
            log::trace!("ignoring class directive without a body: {line}");
            return;
        };
        let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
            return;
        };
        let Some(color) = COLOR_RE.captures(body.as_str()).and_then(|c| c.get(1)) else {
            log::trace!("ignoring class directive without a color: {line}");
            return;
        };
        self.graph.styles.insert(
            name.as_str().to_string(),
            NodeStyle {
                color: Some(color.as_str().to_string()),
            },
        );
    }

    fn parse_chain(&mut self, line_no: usize, line: &str) -> Result<(), ParseError> {
        let caps = CHAIN_RE.captures(line).ok_or_else(|| ParseError::SyntaxError {
            line: line_no,
            text: line.to_string(),
            detail: "syntax error",
        })?;
        let path = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let token = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let label = caps.get(3).map(|m| m.as_str().to_string());

        let names: Vec<&str> = path
            .split(CHAIN_ARROW)
            .map(|name| strip_quotes(name.trim()))
            .collect();
        if names.len() < 2 {
            return Err(ParseError::SyntaxError {
                line: line_no,
                text: line.to_string(),
                detail: "path must have at least 2 nodes",
            });
        }

        let last_hop = names.len() - 2;
        for (hop, pair) in names.windows(2).enumerate() {
            if self.graph.links.len() >= self.limits.max_links {
                return Err(ParseError::ResourceLimitExceeded {
                    line: line_no,
                    resource: Resource::Links,
                    max: self.limits.max_links,
                });
            }
            validate_node_name(pair[0], line_no, self.limits)?;
            validate_node_name(pair[1], line_no, self.limits)?;
            let value = parse_value(token, line_no)?;
            let source = self.intern(pair[0], line_no)?;
            let target = self.intern(pair[1], line_no)?;
            self.graph.links.push(Link {
                source,
                target,
                value,
                label: if hop == last_hop { label.clone() } else { None },
            });
        }
        Ok(())
    }

    fn intern(&mut self, name: &str, line_no: usize) -> Result<usize, ParseError> {
        if let Some(&idx) = self.index.get(name) {
            return Ok(idx);
        }
        if self.graph.nodes.len() >= self.limits.max_nodes {
            return Err(ParseError::ResourceLimitExceeded {
                line: line_no,
                resource: Resource::Nodes,
                max: self.limits.max_nodes,
            });
        }
        let idx = self.graph.nodes.len();
        self.graph.nodes.push(Node {
            id: name.to_string(),
            color: None,
        });
        self.index.insert(name.to_string(), idx);
        Ok(idx)
    }
}

fn strip_quotes(name: &str) -> &str {
    name.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(name)
}

/// Names are rejected rather than sanitized so two distinct names can never collapse into one.
fn validate_node_name(name: &str, line_no: usize, limits: &ParseLimits) -> Result<(), ParseError> {
    let invalid = |reason: String| ParseError::InvalidNodeName {
        line: line_no,
        name: name.to_string(),
        reason,
    };
    let len = name.chars().count();
    if len == 0 || len > limits.max_node_name_chars {
        return Err(invalid(format!(
            "must be 1-{} characters",
            limits.max_node_name_chars
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("contains a control character".to_string()));
    }
    if name.contains('"') {
        return Err(invalid("contains an unbalanced double quote".to_string()));
    }
    Ok(())
}

fn parse_value(token: &str, line_no: usize) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidValue {
        line: line_no,
        token: token.to_string(),
    };
    let value: f64 = token.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    // "-0" parses to negative zero; keep the sign out of the graph.
    Ok(if value == 0.0 { 0.0 } else { value })
}
