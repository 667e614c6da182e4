//! Reader for the subset of the Graphviz DOT language used by state diagrams.
//!
//! The grammar follows the DOT reference: optional `strict`, `graph` or
//! `digraph`, node/edge/attribute statements, edge chains, anonymous and named
//! subgraphs, quoted (with `+` concatenation), numeric and HTML ids, ports,
//! and `//`, `/* */` and `#` comments. Subgraphs are flattened: their nodes and
//! edges join the parent graph, and `node [..]` / `edge [..]` defaults are
//! scoped to the block that declares them.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, satisfy},
    combinator::{eof, map, not, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
};

use crate::GraphError;

/// Attributes in declaration order; later assignments overwrite earlier ones.
pub type Attributes = IndexMap<String, String>;

/// A flattened DOT graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotGraph {
    pub name: Option<String>,
    pub strict: bool,
    pub directed: bool,
    /// Nodes in order of first appearance, either declared or as an edge end.
    pub nodes: Vec<DotNode>,
    /// Edges in file order; chains contribute one edge per hop.
    pub edges: Vec<DotEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotNode {
    pub id: String,
    pub attrs: Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotEdge {
    pub source: String,
    pub target: String,
    pub attrs: Attributes,
}

impl DotNode {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

impl DotEdge {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

/// Parses DOT source text into a flattened graph.
pub fn parse(text: &str) -> Result<DotGraph, GraphError> {
    match graph(text) {
        Ok((_, parsed)) => Ok(parsed.lower()),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(syntax_error(text, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(text, "")),
    }
}

fn syntax_error(text: &str, rest: &str) -> GraphError {
    let offset = text.len() - rest.len();
    let consumed = &text[..offset];
    let line = consumed.matches('\n').count() + 1;
    let column = consumed.rfind('\n').map_or(offset, |nl| offset - nl - 1) + 1;
    let message = match rest.lines().next().map(str::trim) {
        Some(snippet) if !snippet.is_empty() => {
            let snippet: String = snippet.chars().take(24).collect();
            format!("unexpected `{snippet}`")
        }
        _ => "unexpected end of input".to_string(),
    };
    GraphError::Parse {
        line,
        column,
        message,
    }
}

// ---------------------------------------------------------------------------
// Syntax tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefaultTarget {
    Graph,
    Node,
    Edge,
}

#[derive(Debug, Clone)]
enum Endpoint {
    Node(String),
    Subgraph(Vec<Stmt>),
}

#[derive(Debug, Clone)]
enum Stmt {
    Node(String, Vec<(String, String)>),
    Edge(Vec<Endpoint>, Vec<(String, String)>),
    Defaults(DefaultTarget, Vec<(String, String)>),
    Assign,
    Subgraph(Vec<Stmt>),
}

struct ParsedGraph {
    name: Option<String>,
    strict: bool,
    directed: bool,
    stmts: Vec<Stmt>,
}

// ---------------------------------------------------------------------------
// Lowering
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Scope {
    node: Vec<(String, String)>,
    edge: Vec<(String, String)>,
}

#[derive(Default)]
struct Builder {
    strict: bool,
    nodes: IndexMap<String, Attributes>,
    edges: Vec<DotEdge>,
    /// Edge position per (source, target); only filled for strict graphs.
    merged: HashMap<(String, String), usize>,
}

impl ParsedGraph {
    fn lower(self) -> DotGraph {
        let mut builder = Builder {
            strict: self.strict,
            ..Builder::default()
        };
        let top_level = builder.block(&self.stmts, Scope::default());
        tracing::trace!(nodes = top_level.len(), edges = builder.edges.len(), "lowered dot graph");

        DotGraph {
            name: self.name,
            strict: self.strict,
            directed: self.directed,
            nodes: builder
                .nodes
                .into_iter()
                .map(|(id, attrs)| DotNode { id, attrs })
                .collect(),
            edges: builder.edges,
        }
    }
}

impl Builder {
    /// Lowers a statement block and returns every node it mentions, in order.
    fn block(&mut self, stmts: &[Stmt], mut scope: Scope) -> IndexSet<String> {
        let mut mentioned: IndexSet<String> = IndexSet::new();

        for stmt in stmts {
            match stmt {
                Stmt::Node(id, attrs) => {
                    self.touch(id, &scope);
                    if let Some(node) = self.nodes.get_mut(id) {
                        node.extend(attrs.iter().cloned());
                    }
                    mentioned.insert(id.clone());
                }
                Stmt::Edge(endpoints, attrs) => {
                    let mut groups = Vec::with_capacity(endpoints.len());
                    for endpoint in endpoints {
                        let ids = match endpoint {
                            Endpoint::Node(id) => {
                                self.touch(id, &scope);
                                IndexSet::from([id.clone()])
                            }
                            Endpoint::Subgraph(inner) => self.block(inner, scope.clone()),
                        };
                        mentioned.extend(ids.iter().cloned());
                        groups.push(ids);
                    }

                    let mut edge_attrs: Attributes = scope.edge.iter().cloned().collect();
                    edge_attrs.extend(attrs.iter().cloned());
                    for hop in groups.windows(2) {
                        for source in &hop[0] {
                            for target in &hop[1] {
                                self.connect(source, target, &edge_attrs);
                            }
                        }
                    }
                }
                Stmt::Defaults(DefaultTarget::Node, attrs) => scope.node.extend(attrs.iter().cloned()),
                Stmt::Defaults(DefaultTarget::Edge, attrs) => scope.edge.extend(attrs.iter().cloned()),
                Stmt::Defaults(DefaultTarget::Graph, _) | Stmt::Assign => {}
                Stmt::Subgraph(inner) => {
                    mentioned.extend(self.block(inner, scope.clone()));
                }
            }
        }

        mentioned
    }

    fn touch(&mut self, id: &str, scope: &Scope) {
        if !self.nodes.contains_key(id) {
            self.nodes
                .insert(id.to_string(), scope.node.iter().cloned().collect());
        }
    }

    fn connect(&mut self, source: &str, target: &str, attrs: &Attributes) {
        if self.strict {
            let key = (source.to_string(), target.to_string());
            if let Some(&position) = self.merged.get(&key) {
                self.edges[position].attrs.extend(attrs.clone());
                return;
            }
            self.merged.insert(key, self.edges.len());
        }
        self.edges.push(DotEdge {
            source: source.to_string(),
            target: target.to_string(),
            attrs: attrs.clone(),
        });
    }
}

// ---------------------------------------------------------------------------
// Lexical parsers
// ---------------------------------------------------------------------------

fn sp(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(alt((tag("//"), tag("#"))), not_line_ending)),
            value((), tuple((tag("/*"), take_until("*/"), tag("*/")))),
        ))),
    )(input)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(sp, inner, sp)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(kw), not(satisfy(is_ident_char)))
}

fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(satisfy(is_ident_start), take_while(is_ident_char))),
        str::to_string,
    )(input)
}

fn numeral(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            opt(char('-')),
            alt((
                recognize(pair(char('.'), digit1)),
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            )),
        )),
        str::to_string,
    )(input)
}

fn quoted_part(input: &str) -> IResult<&str, String> {
    let (mut rest, _) = char('"')(input)?;
    let mut out = String::new();
    loop {
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, '"')) => return Ok((&rest[1..], out)),
            Some((_, '\\')) => match chars.next() {
                Some((i, '"')) => {
                    out.push('"');
                    rest = &rest[i + 1..];
                }
                // Backslash-newline is a line continuation.
                Some((i, '\n')) => rest = &rest[i + 1..],
                Some((i, '\r')) => {
                    rest = &rest[i + 1..];
                    rest = rest.strip_prefix('\n').unwrap_or(rest);
                }
                Some((i, c)) => {
                    out.push('\\');
                    out.push(c);
                    rest = &rest[i + c.len_utf8()..];
                }
                None => return Err(nom::Err::Failure(Error::new(input, ErrorKind::Escaped))),
            },
            Some((_, c)) => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
            None => return Err(nom::Err::Failure(Error::new(input, ErrorKind::Char))),
        }
    }
}

fn quoted(input: &str) -> IResult<&str, String> {
    map(separated_list1(ws(char('+')), quoted_part), |parts| {
        parts.concat()
    })(input)
}

fn html(input: &str) -> IResult<&str, String> {
    let (rest, _) = char('<')(input)?;
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&rest[i + 1..], rest[..i].to_string()));
                }
            }
            _ => {}
        }
    }
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)))
}

fn id(input: &str) -> IResult<&str, String> {
    alt((quoted, html, numeral, identifier))(input)
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

fn attr_pair(input: &str) -> IResult<&str, (String, String)> {
    let (input, key) = ws(id)(input)?;
    let (input, value) = opt(preceded(char('='), ws(id)))(input)?;
    let (input, _) = opt(alt((char(';'), char(','))))(input)?;
    Ok((input, (key, value.unwrap_or_else(|| "true".to_string()))))
}

fn attr_list(input: &str) -> IResult<&str, Vec<(String, String)>> {
    map(
        many1(delimited(
            ws(char('[')),
            many0(attr_pair),
            ws(char(']')),
        )),
        |lists| lists.into_iter().flatten().collect(),
    )(input)
}

fn node_id(input: &str) -> IResult<&str, String> {
    let (input, name) = id(input)?;
    // Ports (`node:port:compass`) do not affect the state graph.
    let (input, _) = opt(pair(ws(char(':')), id))(input)?;
    let (input, _) = opt(pair(ws(char(':')), id))(input)?;
    Ok((input, name))
}

fn subgraph(input: &str) -> IResult<&str, Vec<Stmt>> {
    let (input, _) = opt(pair(ws(keyword("subgraph")), opt(ws(id))))(input)?;
    delimited(ws(char('{')), stmt_list, ws(char('}')))(input)
}

fn endpoint(input: &str) -> IResult<&str, Endpoint> {
    alt((
        map(subgraph, Endpoint::Subgraph),
        map(node_id, Endpoint::Node),
    ))(input)
}

fn edge_op(input: &str) -> IResult<&str, &str> {
    alt((tag("->"), tag("--")))(input)
}

fn edge_stmt(input: &str) -> IResult<&str, Stmt> {
    let (input, first) = endpoint(input)?;
    let (input, rest) = many1(preceded(ws(edge_op), endpoint))(input)?;
    let (input, attrs) = opt(ws(attr_list))(input)?;

    let mut endpoints = Vec::with_capacity(rest.len() + 1);
    endpoints.push(first);
    endpoints.extend(rest);
    Ok((input, Stmt::Edge(endpoints, attrs.unwrap_or_default())))
}

fn attr_stmt(input: &str) -> IResult<&str, Stmt> {
    let (input, target) = alt((
        value(DefaultTarget::Graph, keyword("graph")),
        value(DefaultTarget::Node, keyword("node")),
        value(DefaultTarget::Edge, keyword("edge")),
    ))(input)?;
    let (input, attrs) = ws(attr_list)(input)?;
    Ok((input, Stmt::Defaults(target, attrs)))
}

fn assign_stmt(input: &str) -> IResult<&str, Stmt> {
    let (input, _) = id(input)?;
    let (input, _) = ws(char('='))(input)?;
    let (input, _) = id(input)?;
    Ok((input, Stmt::Assign))
}

fn node_stmt(input: &str) -> IResult<&str, Stmt> {
    let (input, name) = node_id(input)?;
    let (input, attrs) = opt(ws(attr_list))(input)?;
    Ok((input, Stmt::Node(name, attrs.unwrap_or_default())))
}

fn stmt(input: &str) -> IResult<&str, Stmt> {
    alt((
        attr_stmt,
        edge_stmt,
        map(subgraph, Stmt::Subgraph),
        assign_stmt,
        node_stmt,
    ))(input)
}

fn stmt_list(input: &str) -> IResult<&str, Vec<Stmt>> {
    many0(terminated(ws(stmt), opt(ws(char(';')))))(input)
}

fn graph(input: &str) -> IResult<&str, ParsedGraph> {
    let (input, _) = sp(input)?;
    let (input, strict) = opt(ws(keyword("strict")))(input)?;
    let (input, directed) = alt((
        value(true, keyword("digraph")),
        value(false, keyword("graph")),
    ))(input)?;
    let (input, name) = opt(ws(id))(input)?;
    let (input, stmts) = delimited(ws(char('{')), stmt_list, ws(char('}')))(input)?;
    let (input, _) = eof(input)?;

    Ok((
        input,
        ParsedGraph {
            name,
            strict: strict.is_some(),
            directed,
            stmts,
        },
    ))
}
