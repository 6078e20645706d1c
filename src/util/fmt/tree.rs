use std::io::Write;

use crate::ast::{Field, Node, ScopeNode};

const INDENT_WIDTH: usize = 4;

pub fn print_tree_string(root: &ScopeNode) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_tree(&mut buf, root).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_node_string(node: &Node) -> String {
    let mut buf = Vec::with_capacity(512);
    print_node(&mut buf, 0, node).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_tree(w: &mut impl Write, root: &ScopeNode) -> std::io::Result<()> {
    writeln!(w, "ScopeNode - {:?}", root.tag())?;
    print_fields(w, 1, &root.fields())
}

/// Prints the node header on the current line, followed by its fields, one
/// per line, at `i + 1`.
pub fn print_node(w: &mut impl Write, i: usize, node: &Node) -> std::io::Result<()> {
    writeln!(w, "{} - {:?}", node.type_name(), node.tag())?;
    print_fields(w, i + 1, &node.fields())
}

fn print_fields(
    w: &mut impl Write,
    i: usize,
    fields: &[(&'static str, Field<'_>)],
) -> std::io::Result<()> {
    for (name, field) in fields {
        sp(w, i)?;
        write!(w, "{name}: ")?;
        print_field(w, i, field)?;
    }
    Ok(())
}

/// Prints a field value starting at the current line. Nested lines are
/// indented relative to `i`.
pub fn print_field(w: &mut impl Write, i: usize, field: &Field<'_>) -> std::io::Result<()> {
    match field {
        Field::Node(node) => print_node(w, i, node)?,
        Field::Scope(scope) => {
            writeln!(w, "ScopeNode - {:?}", scope.tag())?;
            print_fields(w, i + 1, &scope.fields())?;
        }
        Field::List(items) if items.is_empty() => writeln!(w, "[]")?,
        Field::List(items) => {
            writeln!(w, "[")?;
            for item in items {
                sp(w, i + 1)?;
                print_field(w, i + 1, item)?;
            }
            sp(w, i)?;
            writeln!(w, "]")?;
        }
        Field::Map(entries) if entries.is_empty() => writeln!(w, "{{}}")?,
        Field::Map(entries) => {
            writeln!(w, "{{")?;
            for (key, value) in entries {
                sp(w, i + 1)?;
                write!(w, "{key}: ")?;
                print_field(w, i + 1, value)?;
            }
            sp(w, i)?;
            writeln!(w, "}}")?;
        }
        Field::Value(value) => writeln!(w, "{value}")?,
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
