use tree_sitter::Node;

/// Which function construct a `Syntax::Function` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionShape {
    /// `function foo() {}`, `function* gen() {}`
    Declaration,
    /// `function () {}` in expression position
    Expression,
    /// `(a) => a`
    Arrow,
    /// class or object-literal method
    Method,
}

/// The closed set of ECMAScript constructs the graph passes consume.
///
/// Everything else in the tree is `Other` and only ever walked through.
#[derive(Debug, Clone, Copy)]
pub enum Syntax<'tree> {
    Identifier(Node<'tree>),
    Member {
        object: Node<'tree>,
        property: Node<'tree>,
    },
    Subscript {
        object: Node<'tree>,
        index: Node<'tree>,
    },
    Call {
        callee: Node<'tree>,
        arguments: Option<Node<'tree>>,
    },
    Function {
        shape: FunctionShape,
        node: Node<'tree>,
    },
    Class(Node<'tree>),
    StringLiteral(Node<'tree>),
    NumberLiteral(Node<'tree>),
    Other(Node<'tree>),
}

/// Classify a tree-sitter node into the consumed construct set.
///
/// Works for the JavaScript, TypeScript and TSX grammars, which share node
/// kinds for everything listed here.
pub fn classify(node: Node<'_>) -> Syntax<'_> {
    match node.kind() {
        "identifier" => Syntax::Identifier(node),
        "member_expression" => {
            match (node.child_by_field_name("object"), node.child_by_field_name("property")) {
                (Some(object), Some(property)) => Syntax::Member { object, property },
                _ => Syntax::Other(node),
            }
        }
        "subscript_expression" => {
            match (node.child_by_field_name("object"), node.child_by_field_name("index")) {
                (Some(object), Some(index)) => Syntax::Subscript { object, index },
                _ => Syntax::Other(node),
            }
        }
        "call_expression" => match node.child_by_field_name("function") {
            Some(callee) => Syntax::Call {
                callee,
                // tagged templates put a template_string in the arguments slot
                arguments: node
                    .child_by_field_name("arguments")
                    .filter(|args| args.kind() == "arguments"),
            },
            None => Syntax::Other(node),
        },
        "function_declaration" | "generator_function_declaration" => Syntax::Function {
            shape: FunctionShape::Declaration,
            node,
        },
        "function_expression" | "generator_function" => Syntax::Function {
            shape: FunctionShape::Expression,
            node,
        },
        // older grammars name the expression after the keyword
        "function" if node.is_named() => Syntax::Function {
            shape: FunctionShape::Expression,
            node,
        },
        "arrow_function" => Syntax::Function {
            shape: FunctionShape::Arrow,
            node,
        },
        "method_definition" => Syntax::Function {
            shape: FunctionShape::Method,
            node,
        },
        "class_declaration" | "abstract_class_declaration" => Syntax::Class(node),
        "class" if node.is_named() => Syntax::Class(node),
        "string" => Syntax::StringLiteral(node),
        "number" => Syntax::NumberLiteral(node),
        _ => Syntax::Other(node),
    }
}

/// Source text covered by a node
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Value of a string or number literal, without quotes
pub fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    match classify(node) {
        Syntax::StringLiteral(lit) => {
            let text = node_text(lit, source);
            let mut chars = text.chars();
            match (chars.next(), chars.next_back()) {
                (Some(open), Some(close)) if open == close && (open == '"' || open == '\'') => {
                    Some(chars.as_str().to_string())
                }
                _ => None,
            }
        }
        Syntax::NumberLiteral(lit) => Some(node_text(lit, source).to_string()),
        _ => None,
    }
}

pub fn is_comment(node: Node<'_>) -> bool {
    matches!(node.kind(), "comment" | "html_comment")
}

/// Positional arguments of an `arguments` node, comments skipped
pub fn positional_arguments(arguments: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter(|arg| !is_comment(*arg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::language())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn first_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|child| first_of_kind(child, kind))
    }

    #[test]
    fn test_classify_call_with_member_callee() {
        let source = "el.addEventListener('click', go);";
        let tree = parse(source);
        let call = first_of_kind(tree.root_node(), "call_expression").unwrap();

        match classify(call) {
            Syntax::Call { callee, arguments } => {
                match classify(callee) {
                    Syntax::Member { object, property } => {
                        assert_eq!(node_text(object, source), "el");
                        assert_eq!(node_text(property, source), "addEventListener");
                    }
                    other => panic!("unexpected callee {:?}", other),
                }
                let args = positional_arguments(arguments.unwrap());
                assert_eq!(args.len(), 2);
                assert_eq!(string_value(args[0], source).as_deref(), Some("click"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_function_keyword_token_is_not_a_function() {
        let source = "const f = function () {};";
        let tree = parse(source);
        let root = tree.root_node();

        let mut functions = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if matches!(classify(node), Syntax::Function { .. }) {
                functions += 1;
            }
            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }
        assert_eq!(functions, 1);
    }

    #[test]
    fn test_string_value_strips_quotes() {
        let source = "x[\"key\"]; y[42];";
        let tree = parse(source);
        let sub = first_of_kind(tree.root_node(), "subscript_expression").unwrap();
        match classify(sub) {
            Syntax::Subscript { index, .. } => {
                assert_eq!(string_value(index, source).as_deref(), Some("key"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
