//! Re-serialization of a syntax tree back into surface syntax.
//!
//! The tree is normalized: parentheses from the source text are gone and
//! associativity is encoded structurally. Emission therefore reintroduces
//! non-capturing groups `(?:…)` exactly where a re-parse would otherwise
//! bind operators differently — around operator children of quantifiers,
//! around an alternation on the left of a concatenation, and around right
//! children that override the default left associativity.

use crate::ast::{CharClass, RegexKind, RegexNode};
use crate::walker::{TraversalEvent, Walker};

/// Renders the given tree as a pattern string.
#[must_use]
pub fn regex_to_string(regex: &RegexNode) -> String {
    let mut walker = Walker::new(String::new());

    walker.register_terminal_listener(write_terminal);

    walker.register_listener(TraversalEvent::Inorder, RegexKind::Alt, alt_inorder);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Alt, alt_postorder);

    walker.register_listener(TraversalEvent::Preorder, RegexKind::Concat, concat_preorder);
    walker.register_listener(TraversalEvent::Inorder, RegexKind::Concat, concat_inorder);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Concat, concat_postorder);

    walker.register_listener(TraversalEvent::Preorder, RegexKind::Capture, capture_preorder);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Capture, capture_postorder);

    walker.register_listener(TraversalEvent::Preorder, RegexKind::Star, open_operator_child);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Star, star_postorder);

    walker.register_listener(TraversalEvent::Preorder, RegexKind::Plus, open_operator_child);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Plus, plus_postorder);

    walker.register_listener(TraversalEvent::Preorder, RegexKind::Ques, open_operator_child);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Ques, ques_postorder);

    walker.register_listener(TraversalEvent::Preorder, RegexKind::Counter, open_operator_child);
    walker.register_listener(TraversalEvent::Postorder, RegexKind::Counter, counter_postorder);

    walker.register_listener(
        TraversalEvent::Preorder,
        RegexKind::Lookahead,
        lookahead_preorder,
    );
    walker.register_listener(
        TraversalEvent::Postorder,
        RegexKind::Lookahead,
        lookahead_postorder,
    );
    // the default walker keeps lookahead bodies opaque; serialization has
    // to descend into them
    walker.register_walker(RegexKind::Lookahead, walk_lookahead_body);

    let mut root = Box::new(regex.clone());
    walker.walk(&mut root);
    walker.into_state()
}

fn walk_lookahead_body(walker: &mut Walker<String>, regex: &mut Box<RegexNode>) {
    walker.emit(TraversalEvent::Preorder, regex);
    if let Some(body) = regex.left_mut() {
        walker.walk(body);
    }
    walker.emit(TraversalEvent::Inorder, regex);
    walker.emit(TraversalEvent::Postorder, regex);
}

fn write_terminal(out: &mut String, node: &RegexNode) {
    match node {
        RegexNode::Caret => out.push('^'),
        RegexNode::Dollar => out.push('$'),
        RegexNode::Memoise => out.push('#'),
        RegexNode::Literal(ch) => out.push(*ch),
        RegexNode::CharClass(class) => write_char_class(out, class),
        _ => {}
    }
}

fn write_char_class(out: &mut String, class: &CharClass) {
    out.push('[');
    if class.negated() {
        out.push('^');
    }
    for (lo, hi) in class.ranges() {
        out.push(*lo);
        if lo != hi {
            out.push('-');
            out.push(*hi);
        }
    }
    out.push(']');
}

fn right_is_alt(node: &RegexNode) -> bool {
    node.right().map(RegexNode::kind) == Some(RegexKind::Alt)
}

fn alt_inorder(out: &mut String, node: &RegexNode) {
    out.push('|');
    if right_is_alt(node) {
        // associativity was overridden
        out.push_str("(?:");
    }
}

fn alt_postorder(out: &mut String, node: &RegexNode) {
    if right_is_alt(node) {
        out.push(')');
    }
}

fn concat_preorder(out: &mut String, node: &RegexNode) {
    // an alternation binds looser than the concatenation around it
    if node.left().map(RegexNode::kind) == Some(RegexKind::Alt) {
        out.push_str("(?:");
    }
}

fn concat_inorder(out: &mut String, node: &RegexNode) {
    if node.left().map(RegexNode::kind) == Some(RegexKind::Alt) {
        out.push(')');
    }
    // a binary right child is either a looser-binding alternation or a
    // concatenation that overrides associativity
    if node.right().is_some_and(|right| right.kind().is_binary_op()) {
        out.push_str("(?:");
    }
}

fn concat_postorder(out: &mut String, node: &RegexNode) {
    if node.right().is_some_and(|right| right.kind().is_binary_op()) {
        out.push(')');
    }
}

fn capture_preorder(out: &mut String, _node: &RegexNode) {
    out.push('(');
}

fn capture_postorder(out: &mut String, _node: &RegexNode) {
    out.push(')');
}

// operator children that are neither terminals nor parenthetical need a
// group to survive a re-parse under the quantifier
fn open_operator_child(out: &mut String, node: &RegexNode) {
    if node.left().is_some_and(|child| child.kind().is_op()) {
        out.push_str("(?:");
    }
}

fn close_operator_child(out: &mut String, node: &RegexNode) {
    if node.left().is_some_and(|child| child.kind().is_op()) {
        out.push(')');
    }
}

fn star_postorder(out: &mut String, node: &RegexNode) {
    close_operator_child(out, node);
    out.push('*');
    if let RegexNode::Star { greedy: false, .. } = node {
        out.push('?'); // lazy
    }
}

fn plus_postorder(out: &mut String, node: &RegexNode) {
    close_operator_child(out, node);
    out.push('+');
    if let RegexNode::Plus { greedy: false, .. } = node {
        out.push('?'); // lazy
    }
}

fn ques_postorder(out: &mut String, node: &RegexNode) {
    close_operator_child(out, node);
    out.push('?');
    if let RegexNode::Ques { greedy: false, .. } = node {
        out.push('?'); // lazy
    }
}

fn counter_postorder(out: &mut String, node: &RegexNode) {
    close_operator_child(out, node);
    if let RegexNode::Counter {
        min, max, greedy, ..
    } = node
    {
        out.push_str(&format!("{{{min},{max}}}"));
        if !*greedy {
            out.push('?'); // lazy
        }
    }
}

fn lookahead_preorder(out: &mut String, node: &RegexNode) {
    match node {
        RegexNode::Lookahead { positive: true, .. } => out.push_str("(?="),
        _ => out.push_str("(?!"),
    }
}

fn lookahead_postorder(out: &mut String, _node: &RegexNode) {
    out.push(')');
}
