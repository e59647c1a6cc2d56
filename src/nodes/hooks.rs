//! Lifecycle hook chains for nodes and node classes
//!
//! Several independent behaviours can subscribe to the same lifecycle event
//! without replacing each other. Subscribers run in the order they were
//! chained, all with the same arguments, and the caller gets back the value
//! returned by the first subscriber. Chains are append-only.

use crate::nodes::events::{ConnectionEvent, InputRemoved, NodeCreated};
use crate::nodes::NodeGraph;
use log::warn;
use std::fmt;
use std::sync::Arc;

/// A single subscriber. It may freely mutate the graph it is handed.
pub type Hook<A, R> = Arc<dyn Fn(&mut NodeGraph, &A) -> R + Send + Sync>;

/// Ordered list of subscribers for one lifecycle event
pub struct HookChain<A, R = ()> {
    subscribers: Vec<Hook<A, R>>,
}

impl<A, R> HookChain<A, R> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Append `hook` after every subscriber already in the chain
    pub fn chain<F>(&mut self, hook: F)
    where
        F: Fn(&mut NodeGraph, &A) -> R + Send + Sync + 'static,
    {
        self.subscribers.push(Arc::new(hook));
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Run every subscriber in order. Returns the first subscriber's result,
    /// or `None` if the chain is empty.
    pub fn invoke(&self, graph: &mut NodeGraph, args: &A) -> Option<R> {
        let mut subscribers = self.subscribers.iter();
        let first = subscribers.next()?;
        let result = first(graph, args);
        for hook in subscribers {
            hook(graph, args);
        }
        Some(result)
    }
}

impl<A, R> Default for HookChain<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> Clone for HookChain<A, R> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<A, R> fmt::Debug for HookChain<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Chain `hook` onto `target`. A missing target is logged and left alone.
pub fn chain_callback<A, R, F>(target: Option<&mut HookChain<A, R>>, hook: F) -> bool
where
    F: Fn(&mut NodeGraph, &A) -> R + Send + Sync + 'static,
{
    match target {
        Some(chain) => {
            chain.chain(hook);
            true
        }
        None => {
            warn!("Tried to add callback to a non-existent hook target");
            false
        }
    }
}

/// Hooks installed on a single node instance
#[derive(Clone, Default, Debug)]
pub struct NodeHooks {
    /// Called for every link created or removed on one of the node's slots,
    /// including links restored while loading a graph
    pub connections_change: HookChain<ConnectionEvent>,
    /// Called after an input slot has been spliced out
    pub input_removed: HookChain<InputRemoved>,
}

/// Hooks installed on a node class, shared by all of its instances
#[derive(Clone, Default, Debug)]
pub struct ClassHooks {
    pub node_created: HookChain<NodeCreated>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::Node;
    use egui::Pos2;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_empty_chain_returns_none() {
        let chain: HookChain<u32, u32> = HookChain::new();
        let mut graph = NodeGraph::new();
        assert_eq!(chain.invoke(&mut graph, &1), None);
    }

    #[test]
    fn test_first_subscriber_result_wins() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut chain: HookChain<u32, &'static str> = HookChain::new();

        let seen = Arc::clone(&order);
        chain.chain(move |_, arg| {
            seen.lock().unwrap().push(("first", *arg));
            "original"
        });
        let seen = Arc::clone(&order);
        chain.chain(move |_, arg| {
            seen.lock().unwrap().push(("second", *arg));
            "ignored"
        });

        let mut graph = NodeGraph::new();
        assert_eq!(chain.invoke(&mut graph, &7), Some("original"));
        assert_eq!(*order.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_later_subscriber_effects_are_visible() {
        let mut chain: HookChain<NodeCreated, usize> = HookChain::new();
        chain.chain(|graph, _| graph.nodes.len());
        chain.chain(|graph, created| {
            graph.add_node(Node::new(0, format!("spawned-by-{}", created.node_id), Pos2::ZERO));
            999
        });

        let mut graph = NodeGraph::new();
        let result = chain.invoke(&mut graph, &NodeCreated { node_id: 4 });
        assert_eq!(result, Some(0));
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_chain_callback_on_missing_target_is_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let attached = chain_callback::<NodeCreated, (), _>(None, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!attached);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_chain_callback_appends() {
        let mut hooks = ClassHooks::default();
        assert!(chain_callback(Some(&mut hooks.node_created), |_, _| {}));
        assert!(chain_callback(Some(&mut hooks.node_created), |_, _| {}));
        assert_eq!(hooks.node_created.len(), 2);
    }
}
