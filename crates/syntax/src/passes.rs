//! Memoisation rewrite passes over the syntax tree.
//!
//! Each pass is a [`Walker`] specialization that splices `#` memoisation
//! markers into the tree so the compiled program consults a memo table at
//! positions where redundant exploration would otherwise happen. The
//! passes come in construction-specific variants because the set of
//! re-entered program positions differs between the Thompson and the
//! Glushkov compilation schemes.

use tracing::trace;

use crate::ast::{RegexKind, RegexNode};
use crate::walker::Walker;

/// Applies the closure-node memoisation strategy: the body of every
/// closure quantifier is prefixed with a memoisation marker, rewriting
/// `F*` to `(#F)*` and `F+` to `(#F)+`.
///
/// The pass is not idempotent: applying it twice wraps the already
/// memoised body again, yielding `(#(#F))*`.
pub fn closure_node_thompson(regex: &mut Box<RegexNode>) {
    let mut walker = Walker::new(());
    walker.register_walker(RegexKind::Star, memoise_closure_body);
    walker.register_walker(RegexKind::Plus, memoise_closure_body);
    walker.walk(regex);
}

fn memoise_closure_body(walker: &mut Walker<()>, regex: &mut Box<RegexNode>) {
    if let Some(body) = regex.left_mut() {
        walker.walk(body);
        memoise_child(body);
        trace!(kind = %regex.kind(), "memoised closure body");
    }
}

/// Applies the in-degree memoisation strategy for the Thompson
/// construction: a marker lands on every program position entered by more
/// than one transition.
///
/// For Thompson bytecode those positions are the split heading a star
/// (re-entered by the loop-back jump), the first instruction of a plus
/// body (re-entered by the trailing split) and the join following the
/// branches of an alternation or an option.
pub fn in_degree_thompson(regex: &mut Box<RegexNode>) {
    let mut walker = Walker::new(());
    walker.register_walker(RegexKind::Star, memoise_before_node);
    walker.register_walker(RegexKind::Plus, memoise_closure_body);
    walker.register_walker(RegexKind::Alt, memoise_after_binary);
    walker.register_walker(RegexKind::Ques, memoise_after_unary);
    walker.walk(regex);
}

/// Applies the in-degree memoisation strategy for the Glushkov
/// construction. The automaton is ε-free, so there is no re-entered split
/// in front of a star; both closure quantifiers memoise their body entry
/// instead, while alternations and options keep the join marker.
pub fn in_degree_glushkov(regex: &mut Box<RegexNode>) {
    let mut walker = Walker::new(());
    walker.register_walker(RegexKind::Star, memoise_closure_body);
    walker.register_walker(RegexKind::Plus, memoise_closure_body);
    walker.register_walker(RegexKind::Alt, memoise_after_binary);
    walker.register_walker(RegexKind::Ques, memoise_after_unary);
    walker.walk(regex);
}

/// Applies the infinite-ambiguity-removal memoisation strategy.
///
/// The rewrite itself is unimplemented; the pass walks the tree and
/// leaves it untouched.
pub fn infinite_ambiguity_removal_thompson(regex: &mut Box<RegexNode>) {
    let mut walker = Walker::new(());
    walker.walk(regex);
}

fn memoise_child(child: &mut Box<RegexNode>) {
    let body = std::mem::replace(child, Box::new(RegexNode::Memoise));
    *child = RegexNode::memoised(body);
}

fn memoise_before_node(walker: &mut Walker<()>, regex: &mut Box<RegexNode>) {
    if let Some(body) = regex.left_mut() {
        walker.walk(body);
    }
    trace!(kind = %regex.kind(), "memoised loop head");
    let node = std::mem::replace(regex, Box::new(RegexNode::Memoise));
    *regex = RegexNode::memoised(node);
}

fn memoise_after_unary(walker: &mut Walker<()>, regex: &mut Box<RegexNode>) {
    if let Some(body) = regex.left_mut() {
        walker.walk(body);
    }
    append_memoise(regex);
}

fn memoise_after_binary(walker: &mut Walker<()>, regex: &mut Box<RegexNode>) {
    if let Some(left) = regex.left_mut() {
        walker.walk(left);
    }
    if let Some(right) = regex.right_mut() {
        walker.walk(right);
    }
    append_memoise(regex);
}

fn append_memoise(regex: &mut Box<RegexNode>) {
    let node = std::mem::replace(regex, Box::new(RegexNode::Memoise));
    *regex = Box::new(RegexNode::Concat(node, Box::new(RegexNode::Memoise)));
}
