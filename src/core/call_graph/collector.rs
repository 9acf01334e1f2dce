// src/core/call_graph/collector.rs
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;
use tree_sitter::Node;

use super::super::languages::{
    classify, node_text, positional_arguments, string_value, FunctionShape, Syntax,
};
use super::super::printer::SourcePrinter;
use super::super::ParsedSource;
use super::call_graph::{CallGraph, DeclKind, DeclarationNode, NodeIndex, SourceSpan};

pub(crate) const ANONYMOUS: &str = "<anonymous>";
pub(crate) const ANONYMOUS_CLASS: &str = "<anonymous-class>";
pub(crate) const DEFAULT_EXPORT: &str = "<default>";
const DYNAMIC_EVENT: &str = "<dynamic>";
const OPAQUE_TARGET: &str = "<expr>";

const LISTENER_METHODS: &[&str] = &["addEventListener", "removeEventListener"];

/// Declaration recorded by the builder, still tied to its syntax node
pub(crate) struct PendingNode<'tree> {
    pub(crate) syntax: Node<'tree>,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) kind: DeclKind,
    pub(crate) params: String,
    pub(crate) parent: Option<usize>,
    pub(crate) calls: BTreeSet<usize>,
    pub(crate) called_by: BTreeSet<usize>,
}

/// Incremental state for the collection and resolution passes.
///
/// Passes run in a fixed order: `collect_classes`, `collect_functions`,
/// `link_ownership`, then call resolution. `finish` freezes the result into
/// an immutable [`CallGraph`].
pub struct GraphBuilder<'tree> {
    source: &'tree ParsedSource,
    pub(crate) pending: Vec<PendingNode<'tree>>,
    /// tree-sitter node id -> pending slot
    by_syntax: HashMap<usize, usize>,
    used_ids: HashSet<String>,
    fallback_counter: usize,
}

impl<'tree> GraphBuilder<'tree> {
    pub fn new(source: &'tree ParsedSource) -> Self {
        Self {
            source,
            pending: Vec::new(),
            by_syntax: HashMap::new(),
            used_ids: HashSet::new(),
            fallback_counter: 0,
        }
    }

    pub(crate) fn text(&self) -> &'tree str {
        &self.source.text
    }

    /// Every syntax node of the file in pre-order (source order)
    pub(crate) fn preorder(&self) -> Vec<Node<'tree>> {
        let mut ordered = Vec::new();
        let mut cursor = self.source.tree.walk();

        loop {
            ordered.push(cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return ordered;
                }
            }
        }
    }

    /// First pass: class declarations and class expressions
    pub fn collect_classes(&mut self) {
        for node in self.preorder() {
            if let Syntax::Class(class) = classify(node) {
                let name = self.infer_name(class, false).unwrap_or_else(|| ANONYMOUS_CLASS.to_string());
                self.record(class, DeclKind::Class, name, String::new());
            }
        }
        debug!("Collected {} classes", self.pending.len());
    }

    /// Second pass: functions, methods and arrows
    pub fn collect_functions(&mut self) {
        let before = self.pending.len();

        for node in self.preorder() {
            let Syntax::Function { shape, node: function } = classify(node) else {
                continue;
            };

            let has_own_name = function.child_by_field_name("name").is_some();
            let listener = if shape != FunctionShape::Declaration && !has_own_name {
                match self.call_argument_role(function) {
                    ArgumentRole::NotAnArgument => None,
                    ArgumentRole::Listener(name) => Some(name),
                    ArgumentRole::Inline => continue,
                }
            } else {
                None
            };

            let kind = match shape {
                FunctionShape::Declaration | FunctionShape::Expression => DeclKind::Function,
                FunctionShape::Arrow => DeclKind::Arrow,
                FunctionShape::Method => DeclKind::Method,
            };
            let name = listener
                .or_else(|| self.infer_name(function, shape == FunctionShape::Method))
                .unwrap_or_else(|| ANONYMOUS.to_string());
            let params = self.parameter_signature(function);

            self.record(function, kind, name, params);
        }
        debug!("Collected {} functions and methods", self.pending.len() - before);
    }

    /// Resolve each declaration's owner: nearest enclosing function, else nearest enclosing class
    pub fn link_ownership(&mut self) {
        for slot in 0..self.pending.len() {
            let parent = self.enclosing_declaration(self.pending[slot].syntax);
            self.pending[slot].parent = parent;
        }
    }

    /// Nearest recorded function, arrow or method strictly enclosing `node`,
    /// falling back to the nearest recorded class
    pub(crate) fn enclosing_declaration(&self, node: Node<'tree>) -> Option<usize> {
        let mut nearest_class = None;
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if let Some(slot) = self.by_syntax.get(&ancestor.id()) {
                if self.pending[*slot].kind != DeclKind::Class {
                    return Some(*slot);
                }
                nearest_class.get_or_insert(*slot);
            }
            current = ancestor.parent();
        }
        nearest_class
    }

    pub(crate) fn add_edge(&mut self, caller: usize, callee: usize) -> bool {
        let added = self.pending[caller].calls.insert(callee);
        if added {
            self.pending[callee].called_by.insert(caller);
        }
        added
    }

    /// Freeze the builder into an immutable graph in source order
    pub fn finish(self, printer: &dyn SourcePrinter) -> CallGraph {
        let text = self.text();

        // source order: outer declarations before inner ones starting at the same byte
        let mut order: Vec<usize> = (0..self.pending.len()).collect();
        order.sort_by_key(|slot| {
            let syntax = self.pending[*slot].syntax;
            (syntax.start_byte(), std::cmp::Reverse(syntax.end_byte()), *slot)
        });
        let mut position = vec![0; order.len()];
        for (index, slot) in order.iter().enumerate() {
            position[*slot] = index;
        }

        let mut nodes: Vec<DeclarationNode> = order
            .iter()
            .map(|slot| {
                let pending = &self.pending[*slot];
                let syntax = pending.syntax;
                DeclarationNode {
                    id: pending.id.clone(),
                    name: pending.name.clone(),
                    kind: pending.kind,
                    params: pending.params.clone(),
                    span: span_of(syntax),
                    source: node_text(syntax, text).to_string(),
                    printed: printer.print(syntax, text),
                    parent: pending.parent.map(|p| position[p]),
                    children: Vec::new(),
                    calls: pending.calls.iter().map(|c| position[*c]).collect(),
                    called_by: pending.called_by.iter().map(|c| position[*c]).collect(),
                }
            })
            .collect();

        for index in 0..nodes.len() {
            if let Some(parent) = nodes[index].parent {
                nodes[parent].children.push(index);
            }
        }

        CallGraph::from_nodes(nodes)
    }

    fn record(&mut self, syntax: Node<'tree>, kind: DeclKind, name: String, params: String) -> NodeIndex {
        let id = self.identity(syntax, kind);
        let slot = self.pending.len();

        self.used_ids.insert(id.clone());
        self.by_syntax.insert(syntax.id(), slot);
        self.pending.push(PendingNode {
            syntax,
            id,
            name,
            kind,
            params,
            parent: None,
            calls: BTreeSet::new(),
            called_by: BTreeSet::new(),
        });
        slot
    }

    /// `<tag>@<line>:<col>-<line>:<col>`, or `<tag>#<n>` without a usable span
    fn identity(&mut self, syntax: Node<'tree>, kind: DeclKind) -> String {
        let has_location = !syntax.is_missing() && syntax.end_byte() > syntax.start_byte();
        if has_location {
            let span = span_of(syntax);
            let id = format!(
                "{}@{}:{}-{}:{}",
                kind.tag(),
                span.start_line,
                span.start_column,
                span.end_line,
                span.end_column
            );
            if !self.used_ids.contains(&id) {
                return id;
            }
        }

        loop {
            self.fallback_counter += 1;
            let id = format!("{}#{}", kind.tag(), self.fallback_counter);
            if !self.used_ids.contains(&id) {
                return id;
            }
        }
    }

    /// Name inference; `None` means no rule applied
    fn infer_name(&self, node: Node<'tree>, is_method: bool) -> Option<String> {
        let text = self.text();

        // declared identifier (methods carry their key in `name`, handled below)
        if !is_method {
            if let Some(name) = node.child_by_field_name("name") {
                return Some(node_text(name, text).to_string());
            }
        }

        if is_method {
            if let Some(key) = node.child_by_field_name("name") {
                return property_key(key, text);
            }
            return None;
        }

        let parent = node.parent()?;
        let is_value_of = |field: &str| {
            parent
                .child_by_field_name(field)
                .map(|value| value.id() == node.id())
                .unwrap_or(false)
        };

        match parent.kind() {
            "variable_declarator" if is_value_of("value") => {
                let target = parent.child_by_field_name("name")?;
                match classify(target) {
                    Syntax::Identifier(ident) => Some(node_text(ident, text).to_string()),
                    _ => None,
                }
            }
            "assignment_expression" if is_value_of("right") => {
                let target = parent.child_by_field_name("left")?;
                match classify(target) {
                    Syntax::Identifier(ident) => Some(node_text(ident, text).to_string()),
                    Syntax::Member { property, .. } => Some(node_text(property, text).to_string()),
                    Syntax::Subscript { index, .. } => string_value(index, text),
                    _ => None,
                }
            }
            "pair" if is_value_of("value") => {
                let key = parent.child_by_field_name("key")?;
                property_key(key, text)
            }
            // class fields: `handler = () => {}`
            "field_definition" | "public_field_definition" if is_value_of("value") => {
                let key = parent
                    .child_by_field_name("property")
                    .or_else(|| parent.child_by_field_name("name"))?;
                property_key(key, text)
            }
            "export_statement" if is_default_export(parent) => Some(DEFAULT_EXPORT.to_string()),
            _ => None,
        }
    }

    /// How a nameless function expression relates to an enclosing call
    fn call_argument_role(&self, function: Node<'tree>) -> ArgumentRole {
        let Some(arguments) = function.parent().filter(|p| p.kind() == "arguments") else {
            return ArgumentRole::NotAnArgument;
        };
        let Some(call) = arguments.parent() else {
            return ArgumentRole::NotAnArgument;
        };
        let Syntax::Call { callee, .. } = classify(call) else {
            // `new Foo(() => ...)` is not a call expression
            return ArgumentRole::NotAnArgument;
        };

        let text = self.text();
        let Syntax::Member { object, property } = classify(callee) else {
            return ArgumentRole::Inline;
        };
        let method = node_text(property, text);
        if !LISTENER_METHODS.contains(&method) {
            return ArgumentRole::Inline;
        }

        let args = positional_arguments(arguments);
        if args.get(1).map(|arg| arg.id()) != Some(function.id()) {
            return ArgumentRole::Inline;
        }

        let event = args
            .first()
            .and_then(|arg| match classify(*arg) {
                Syntax::StringLiteral(_) => string_value(*arg, text),
                _ => None,
            })
            .unwrap_or_else(|| DYNAMIC_EVENT.to_string());
        let target = render_target(object, text);

        ArgumentRole::Listener(format!("listener:{}:{}@{}", method, event, target))
    }

    fn parameter_signature(&self, function: Node<'tree>) -> String {
        let text = self.text();
        let params = function
            .child_by_field_name("parameters")
            .or_else(|| function.child_by_field_name("parameter"));

        let Some(params) = params else {
            return String::new();
        };

        let raw = node_text(params, text);
        let inner = raw
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(raw);
        let collapsed = inner.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim_end_matches(',').trim().to_string()
    }
}

enum ArgumentRole {
    NotAnArgument,
    /// inline callback, excluded from the graph
    Inline,
    Listener(String),
}

fn span_of(node: Node<'_>) -> SourceSpan {
    let start = node.start_position();
    let end = node.end_position();
    SourceSpan {
        start_line: start.row + 1,
        start_column: start.column,
        end_line: end.row + 1,
        end_column: end.column,
    }
}

fn is_default_export(export: Node<'_>) -> bool {
    let mut cursor = export.walk();
    let found = export.children(&mut cursor).any(|child| child.kind() == "default");
    found
}

/// Identifier, private name, string or number key; computed keys give `None`
fn property_key(key: Node<'_>, text: &str) -> Option<String> {
    match key.kind() {
        "property_identifier" | "private_property_identifier" | "identifier" => {
            Some(node_text(key, text).to_string())
        }
        "string" | "number" => string_value(key, text),
        _ => None,
    }
}

/// Best-effort rendering of a listener target such as `document.body`
fn render_target(node: Node<'_>, text: &str) -> String {
    match classify(node) {
        Syntax::Identifier(ident) => node_text(ident, text).to_string(),
        Syntax::Member { object, property } => {
            format!("{}.{}", render_target(object, text), node_text(property, text))
        }
        Syntax::Subscript { object, index } => match string_value(index, text) {
            Some(key) => format!("{}[{}]", render_target(object, text), key),
            None => format!("{}[{}]", render_target(object, text), OPAQUE_TARGET),
        },
        _ => match node.kind() {
            "this" | "super" => node.kind().to_string(),
            "parenthesized_expression" | "non_null_expression" => node
                .named_child(0)
                .map(|inner| render_target(inner, text))
                .unwrap_or_else(|| OPAQUE_TARGET.to_string()),
            _ => OPAQUE_TARGET.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::printer::ReindentPrinter;
    use super::super::super::{Dialect, SourceParser};
    use super::*;
    use crate::config::ParsingConfig;
    use std::path::Path;

    fn parse(source: &str, dialect: Dialect) -> ParsedSource {
        SourceParser::new(&ParsingConfig::default())
            .parse_source(source.to_string(), dialect, Path::new("fixture"))
            .unwrap()
    }

    fn collect(parsed: &ParsedSource) -> CallGraph {
        let mut builder = GraphBuilder::new(parsed);
        builder.collect_classes();
        builder.collect_functions();
        builder.link_ownership();
        builder.finish(&ReindentPrinter)
    }

    fn names(graph: &CallGraph) -> Vec<&str> {
        graph.nodes().iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn test_name_inference_chain() {
        let parsed = parse(
            r#"
function declared(a, b) {}
const viaVar = () => {};
obj.viaMember = function () {};
obj["viaKey"] = () => {};
handlers = function () {};
const table = { viaPair: () => {}, "quoted": function () {}, shorthand() {} };
export default function () {}
"#,
            Dialect::Javascript,
        );
        let graph = collect(&parsed);

        assert_eq!(
            names(&graph),
            vec![
                "declared",
                "viaVar",
                "viaMember",
                "viaKey",
                "handlers",
                "viaPair",
                "quoted",
                "shorthand",
                "<default>",
            ]
        );
        assert_eq!(graph.nodes()[0].params, "a, b");
    }

    #[test]
    fn test_classes_and_methods() {
        let parsed = parse(
            r#"
class Widget {
  #secret() {}
  "quoted"() {}
  [computed]() {}
  onClick = () => {};
}
const Anon = class {};
const Named = class Inner {};
"#,
            Dialect::Javascript,
        );
        let graph = collect(&parsed);

        assert_eq!(
            names(&graph),
            vec!["Widget", "#secret", "quoted", "<anonymous>", "onClick", "Anon", "Inner"]
        );

        let widget = &graph.nodes()[0];
        assert_eq!(widget.kind, DeclKind::Class);
        assert_eq!(widget.children, vec![1, 2, 3, 4]);
        for child in &widget.children {
            assert_eq!(graph.node(*child).parent, Some(0));
        }
    }

    #[test]
    fn test_anonymous_class_placeholder() {
        let parsed = parse("export default class {}\nwrap(class {});\n", Dialect::Javascript);
        let graph = collect(&parsed);
        assert_eq!(names(&graph), vec!["<default>", "<anonymous-class>"]);
    }

    #[test]
    fn test_inline_callbacks_are_excluded() {
        let parsed = parse(
            r#"
items.forEach((item) => handle(item));
setTimeout(function () {}, 10);
run(function named() {});
new Promise((resolve) => resolve());
"#,
            Dialect::Javascript,
        );
        let graph = collect(&parsed);
        assert_eq!(names(&graph), vec!["named", "<anonymous>"]);
        assert_eq!(graph.nodes()[1].kind, DeclKind::Arrow);
        assert_eq!(graph.nodes()[1].params, "resolve");
    }

    #[test]
    fn test_listener_callbacks_are_kept_and_named() {
        let parsed = parse(
            r#"
el.addEventListener("click", () => {});
window.removeEventListener('resize', function () {});
document.body.addEventListener(eventName, () => {});
this.root?.addEventListener("keydown", (e) => {});
el.addEventListener(() => {}, "click");
"#,
            Dialect::Javascript,
        );
        let graph = collect(&parsed);
        assert_eq!(
            names(&graph),
            vec![
                "listener:addEventListener:click@el",
                "listener:removeEventListener:resize@window",
                "listener:addEventListener:<dynamic>@document.body",
                "listener:addEventListener:keydown@this.root",
            ]
        );
    }

    #[test]
    fn test_ownership_prefers_enclosing_function_over_class() {
        let parsed = parse(
            r#"
function outer() {
  function inner() {
    const deepest = () => {};
  }
  class Local {
    method() {}
  }
}
class Top {
  run() {
    class Nested {}
  }
  static make() {}
}
"#,
            Dialect::Javascript,
        );
        let graph = collect(&parsed);
        let index = |name: &str| graph.nodes().iter().position(|n| n.name == name).unwrap();

        assert_eq!(graph.node(index("outer")).parent, None);
        assert_eq!(graph.node(index("inner")).parent, Some(index("outer")));
        assert_eq!(graph.node(index("deepest")).parent, Some(index("inner")));
        assert_eq!(graph.node(index("Local")).parent, Some(index("outer")));
        // a member of a class nested in a function belongs to the function
        assert_eq!(graph.node(index("method")).parent, Some(index("outer")));
        assert_eq!(graph.node(index("run")).parent, Some(index("Top")));
        assert_eq!(graph.node(index("make")).parent, Some(index("Top")));
        assert_eq!(graph.node(index("Nested")).parent, Some(index("run")));
        assert_eq!(graph.roots(), &[index("outer"), index("Top")]);

        let chain: Vec<_> = graph.ancestors(index("deepest")).collect();
        assert_eq!(chain, vec![index("inner"), index("outer")]);
    }

    #[test]
    fn test_ids_are_span_based_and_stable() {
        let source = "function a() {}\n\nclass B {\n  m() {}\n}\n";
        let first = collect(&parse(source, Dialect::Javascript));
        let second = collect(&parse(source, Dialect::Javascript));

        let ids: Vec<_> = first.nodes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec!["function@1:0-1:15", "class@3:0-5:1", "method@4:2-4:8"]);
        assert_eq!(
            ids,
            second.nodes().iter().map(|n| n.id.clone()).collect::<Vec<_>>()
        );

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_typescript_declarations() {
        let parsed = parse(
            r#"
abstract class Repo<T> {
  private load(id: string): T | undefined { return undefined; }
}
export function save<T>(item: T, opts?: { force: boolean }): void {}
"#,
            Dialect::Typescript,
        );
        let graph = collect(&parsed);
        assert_eq!(names(&graph), vec!["Repo", "load", "save"]);
        assert_eq!(graph.nodes()[1].params, "id: string");
        assert_eq!(graph.nodes()[2].params, "item: T, opts?: { force: boolean }");
    }

    #[test]
    fn test_printed_source_is_reindented() {
        let parsed = parse("class A {\n  run() {\n    go();\n  }\n}\n", Dialect::Javascript);
        let graph = collect(&parsed);
        let run = &graph.nodes()[1];
        assert_eq!(run.source, "run() {\n    go();\n  }");
        assert_eq!(run.display_source(), "run() {\n  go();\n}");
    }

    #[test]
    fn test_fallback_identity_on_collision_and_zero_width() {
        let parsed = parse("function a() {}\n", Dialect::Javascript);
        let mut builder = GraphBuilder::new(&parsed);
        builder.collect_functions();
        let syntax = builder.pending[0].syntax;
        assert_eq!(builder.pending[0].id, "function@1:0-1:15");

        // span id already taken
        assert_eq!(builder.identity(syntax, DeclKind::Function), "function#1");
        assert_eq!(builder.identity(syntax, DeclKind::Function), "function#2");

        let empty = parse("", Dialect::Javascript);
        let mut builder = GraphBuilder::new(&empty);
        let root = empty.tree.root_node();
        assert_eq!(root.start_byte(), root.end_byte());
        assert_eq!(builder.identity(root, DeclKind::Class), "class#1");
    }
}
