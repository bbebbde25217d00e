//! S-expression rendering of expression trees

use crate::ids::ExprId;
use crate::node::Node;
use std::fmt::Write;

pub(crate) fn render(nodes: &[Node], id: ExprId) -> String {
    let mut out = String::new();
    write_node(nodes, id, &mut out);
    out
}

fn write_node(nodes: &[Node], id: ExprId, out: &mut String) {
    let Some(node) = nodes.get(id.index()) else {
        let _ = write!(out, "<invalid {:?}>", id);
        return;
    };
    match node {
        Node::Literal { value, kind } => {
            if value.is_null() {
                let _ = write!(out, "null:{}", kind.name().to_lowercase());
            } else {
                let _ = write!(out, "{}", value);
            }
        }
        Node::Field { field, kind } => {
            let _ = write!(out, "{}:{}", field, kind.name().to_lowercase());
        }
        Node::Unary { op, operand } => {
            let _ = write!(out, "({} ", op.name());
            write_node(nodes, *operand, out);
            out.push(')');
        }
        Node::Binary { op, lhs, rhs } => {
            let _ = write!(out, "({} ", op);
            write_node(nodes, *lhs, out);
            out.push(' ');
            write_node(nodes, *rhs, out);
            out.push(')');
        }
        Node::Aggregate {
            func, inner, scope, key, ..
        } => {
            let _ = write!(out, "({}{} {} ", func.name(), key, scope);
            write_node(nodes, *inner, out);
            out.push(')');
        }
    }
}
