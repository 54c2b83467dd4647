//! A visitor/listener hybrid over the regex syntax tree.
//!
//! The walker keeps a table of walk functions keyed on node kind. Walk
//! functions control the exploration (depth-first only) and are the place
//! where in-place tree rewrites happen. Listeners are passive: they
//! observe the traversal at three positions (pre-order, in-order,
//! post-order) and receive the walker state plus the node that triggered
//! the event.
//!
//! The default walker installed by [`Walker::new`] explores in-order and
//! triggers every event where appropriate:
//! - a node with no children fires the terminal listener, then all three
//!   events consecutively;
//! - a node with one child fires pre-order, recurses, then fires in-order
//!   and post-order;
//! - a node with two children fires in-order between the recursions.
//!
//! Lookaheads are treated as childless by the default walker; a custom
//! walk function has to be registered to descend into their body.

use strum_macros::EnumCount;

use crate::ast::{RegexKind, RegexNode};

/// Traversal positions a listener can attach to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount)]
pub enum TraversalEvent {
    Preorder,
    Inorder,
    Postorder,
}

impl TraversalEvent {
    pub const COUNT: usize = <Self as strum::EnumCount>::COUNT;
}

/// Controls the exploration of a subtree. Receives the owning walker and
/// the slot holding the current node, so the subtree can be replaced
/// in-place while the traversal cursor stays valid.
pub type WalkFn<S> = fn(&mut Walker<S>, &mut Box<RegexNode>);

/// Observes a traversal event. Listeners must not restructure the tree.
pub type ListenFn<S> = fn(&mut S, &RegexNode);

pub struct Walker<S> {
    // visitor tables
    walk_fns: [WalkFn<S>; RegexKind::COUNT],
    walk_terminal: WalkFn<S>,

    // listener tables
    triggers: [[Option<ListenFn<S>>; RegexKind::COUNT]; TraversalEvent::COUNT],
    listen_terminal: Option<ListenFn<S>>,

    // state shared by walk functions and listeners; the walker owns no
    // tree memory, only this
    state: S,
}

impl<S> Walker<S> {
    /// Creates a walker with the identity walk functions installed for
    /// every node kind and no listeners.
    pub fn new(state: S) -> Self {
        let mut walk_fns: [WalkFn<S>; RegexKind::COUNT] =
            [dispatch_terminal::<S>; RegexKind::COUNT];

        walk_fns[RegexKind::Alt as usize] = walk_binary::<S>;
        walk_fns[RegexKind::Concat as usize] = walk_binary::<S>;
        for kind in [
            RegexKind::Capture,
            RegexKind::Star,
            RegexKind::Plus,
            RegexKind::Ques,
            RegexKind::Counter,
        ] {
            walk_fns[kind as usize] = walk_unary::<S>;
        }
        walk_fns[RegexKind::Lookahead as usize] = walk_opaque::<S>;

        Self {
            walk_fns,
            walk_terminal: emit_terminal_events::<S>,
            triggers: [[None; RegexKind::COUNT]; TraversalEvent::COUNT],
            listen_terminal: None,
            state,
        }
    }

    /// Overrides the traversal of a specific node kind.
    pub fn register_walker(&mut self, kind: RegexKind, walk_fn: WalkFn<S>) {
        self.walk_fns[kind as usize] = walk_fn;
    }

    /// Overrides the shared traversal of all nullary node kinds.
    pub fn register_terminal_walker(&mut self, walk_fn: WalkFn<S>) {
        self.walk_terminal = walk_fn;
    }

    pub fn register_listener(&mut self, event: TraversalEvent, kind: RegexKind, listen_fn: ListenFn<S>) {
        self.triggers[event as usize][kind as usize] = Some(listen_fn);
    }

    pub fn register_terminal_listener(&mut self, listen_fn: ListenFn<S>) {
        self.listen_terminal = Some(listen_fn);
    }

    /// Walks the tree rooted in the given slot, dispatching through the
    /// walk-function table. Walk functions recurse by calling this again
    /// on a child slot.
    pub fn walk(&mut self, regex: &mut Box<RegexNode>) {
        let walk_fn = self.walk_fns[regex.kind() as usize];
        walk_fn(self, regex);
    }

    /// Fires the listener registered for the given event and node kind,
    /// if any.
    pub fn emit(&mut self, event: TraversalEvent, node: &RegexNode) {
        if let Some(listen_fn) = self.triggers[event as usize][node.kind() as usize] {
            listen_fn(&mut self.state, node);
        }
    }

    /// Fires the terminal listener, if any.
    pub fn emit_terminal(&mut self, node: &RegexNode) {
        if let Some(listen_fn) = self.listen_terminal {
            listen_fn(&mut self.state, node);
        }
    }

    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Consumes the walker, handing back its state. The walked tree stays
    /// with the caller.
    #[inline]
    pub fn into_state(self) -> S {
        self.state
    }
}

/// Default entry for nullary kinds: defer to the (replaceable) terminal
/// walk function.
fn dispatch_terminal<S>(walker: &mut Walker<S>, regex: &mut Box<RegexNode>) {
    let walk_fn = walker.walk_terminal;
    walk_fn(walker, regex);
}

fn emit_terminal_events<S>(walker: &mut Walker<S>, regex: &mut Box<RegexNode>) {
    walker.emit_terminal(regex);
    walker.emit(TraversalEvent::Preorder, regex);
    walker.emit(TraversalEvent::Inorder, regex);
    walker.emit(TraversalEvent::Postorder, regex);
}

fn walk_unary<S>(walker: &mut Walker<S>, regex: &mut Box<RegexNode>) {
    walker.emit(TraversalEvent::Preorder, regex);
    if let Some(child) = regex.left_mut() {
        walker.walk(child);
    }
    walker.emit(TraversalEvent::Inorder, regex);
    walker.emit(TraversalEvent::Postorder, regex);
}

fn walk_binary<S>(walker: &mut Walker<S>, regex: &mut Box<RegexNode>) {
    walker.emit(TraversalEvent::Preorder, regex);
    if let Some(left) = regex.left_mut() {
        walker.walk(left);
    }
    walker.emit(TraversalEvent::Inorder, regex);
    if let Some(right) = regex.right_mut() {
        walker.walk(right);
    }
    walker.emit(TraversalEvent::Postorder, regex);
}

// lookahead bodies are opaque to the default traversal
fn walk_opaque<S>(walker: &mut Walker<S>, regex: &mut Box<RegexNode>) {
    walker.emit(TraversalEvent::Preorder, regex);
    walker.emit(TraversalEvent::Inorder, regex);
    walker.emit(TraversalEvent::Postorder, regex);
}

#[cfg(test)]
mod walker_tests {
    use super::*;
    use crate::ast::RegexNode;

    type Events = Vec<String>;

    fn preorder(events: &mut Events, node: &RegexNode) {
        events.push(format!("pre:{}", node.kind()));
    }

    fn inorder(events: &mut Events, node: &RegexNode) {
        events.push(format!("in:{}", node.kind()));
    }

    fn postorder(events: &mut Events, node: &RegexNode) {
        events.push(format!("post:{}", node.kind()));
    }

    fn terminal(events: &mut Events, node: &RegexNode) {
        events.push(format!("term:{}", node.kind()));
    }

    fn listen_everywhere(walker: &mut Walker<Events>, kinds: &[RegexKind]) {
        for kind in kinds {
            walker.register_listener(TraversalEvent::Preorder, *kind, preorder);
            walker.register_listener(TraversalEvent::Inorder, *kind, inorder);
            walker.register_listener(TraversalEvent::Postorder, *kind, postorder);
        }
        walker.register_terminal_listener(terminal);
    }

    #[test]
    fn binary_nodes_fire_one_of_each_event_in_order() {
        let mut root = Box::new(RegexNode::concat(
            RegexNode::alt(RegexNode::literal('a'), RegexNode::literal('b')),
            RegexNode::literal('c'),
        ));

        let mut walker = Walker::new(Events::new());
        listen_everywhere(
            &mut walker,
            &[RegexKind::Alt, RegexKind::Concat, RegexKind::Literal],
        );
        walker.walk(&mut root);

        assert_eq!(
            walker.into_state(),
            vec![
                "pre:Concat",
                "pre:Alt",
                "term:Literal",
                "pre:Literal",
                "in:Literal",
                "post:Literal",
                "in:Alt",
                "term:Literal",
                "pre:Literal",
                "in:Literal",
                "post:Literal",
                "post:Alt",
                "in:Concat",
                "term:Literal",
                "pre:Literal",
                "in:Literal",
                "post:Literal",
                "post:Concat",
            ]
        );
    }

    #[test]
    fn unary_nodes_wrap_the_single_recursion() {
        let mut root = Box::new(RegexNode::star(true, RegexNode::literal('a')));

        let mut walker = Walker::new(Events::new());
        listen_everywhere(&mut walker, &[RegexKind::Star]);
        walker.walk(&mut root);

        assert_eq!(
            walker.into_state(),
            vec!["pre:Star", "term:Literal", "in:Star", "post:Star"]
        );
    }

    #[test]
    fn terminals_fire_all_three_events_after_the_terminal_listener() {
        let mut root = Box::new(RegexNode::literal('x'));

        let mut walker = Walker::new(Events::new());
        listen_everywhere(&mut walker, &[RegexKind::Literal]);
        walker.walk(&mut root);

        assert_eq!(
            walker.into_state(),
            vec!["term:Literal", "pre:Literal", "in:Literal", "post:Literal"]
        );
    }

    #[test]
    fn lookahead_bodies_stay_unvisited_by_default() {
        let mut root = Box::new(RegexNode::lookahead(true, RegexNode::literal('a')));

        let mut walker = Walker::new(Events::new());
        listen_everywhere(&mut walker, &[RegexKind::Lookahead]);
        walker.walk(&mut root);

        assert_eq!(
            walker.into_state(),
            vec!["pre:Lookahead", "in:Lookahead", "post:Lookahead"]
        );
    }

    fn replace_with_dollar(_walker: &mut Walker<Events>, regex: &mut Box<RegexNode>) {
        **regex = RegexNode::Dollar;
    }

    #[test]
    fn registered_walkers_can_replace_the_current_node() {
        let mut root = Box::new(RegexNode::concat(
            RegexNode::literal('a'),
            RegexNode::literal('b'),
        ));

        let mut walker = Walker::new(Events::new());
        walker.register_walker(RegexKind::Literal, replace_with_dollar);
        walker.walk(&mut root);

        assert_eq!(
            *root,
            RegexNode::concat(RegexNode::Dollar, RegexNode::Dollar)
        );
    }

    fn count_terminals(walker: &mut Walker<Events>, regex: &mut Box<RegexNode>) {
        walker
            .state_mut()
            .push(format!("seen:{}", regex.kind()));
    }

    #[test]
    fn terminal_walker_override_covers_every_nullary_kind() {
        let mut root = Box::new(RegexNode::concat(
            RegexNode::Caret,
            RegexNode::concat(RegexNode::literal('a'), RegexNode::Dollar),
        ));

        let mut walker = Walker::new(Events::new());
        walker.register_terminal_walker(count_terminals);
        walker.walk(&mut root);

        assert_eq!(
            walker.into_state(),
            vec!["seen:Caret", "seen:Literal", "seen:Dollar"]
        );
    }
}
