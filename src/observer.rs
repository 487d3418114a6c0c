/*!
Synchronous notification of graph edits.

Every edit on a [`Graph`](crate::graph::Graph) reports what it does as
a sequence of [`GraphEvent`]s. Each event is handed to every registered
[`Listener`], in registration order, before the edit takes its next
step. Composite edits (merge, split, glue) first announce the structure
they created, then announce the removal of the old structure, and only
then purge it, so a listener handling a deletion can still read the
deleted element and already sees its replacement.

Events are fired once per conjugate pair; listeners that care about
the conjugate look it up through the graph they are handed.
*/

use std::fmt;

use crate::graph::GraphStore;
use crate::handle::{EdgeId, VertexId};
use crate::index::IndexRenewer;
use crate::policy::DataPolicy;

#[allow(unused_imports)]
use log::{debug, error, info, trace};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphEvent {
    AddVertex(VertexId),
    DeleteVertex(VertexId),
    AddEdge(EdgeId),
    DeleteEdge(EdgeId),
    /// The edges of `old` are being replaced by the single edge `new`.
    Merge { old: Vec<EdgeId>, new: EdgeId },
    /// `old` is being replaced by `first` followed by `second`.
    Split {
        old: EdgeId,
        first: EdgeId,
        second: EdgeId,
    },
    /// `first` and `second` are being replaced by `new`.
    Glue {
        new: EdgeId,
        first: EdgeId,
        second: EdgeId,
    },
    MergeVertices {
        first: VertexId,
        second: VertexId,
        merged: VertexId,
    },
    SplitVertex {
        old: VertexId,
        first: VertexId,
        second: VertexId,
    },
}

/// Receiver of graph events. All callbacks default to doing nothing.
///
/// `on_event` dispatches to the specific callbacks; override it
/// instead to see every event in one place.
pub trait GraphListener<P: DataPolicy> {
    fn name(&self) -> &str;

    fn on_event(&mut self, graph: &GraphStore<P>, event: &GraphEvent) {
        match event {
            GraphEvent::AddVertex(v) => self.on_add_vertex(graph, *v),
            GraphEvent::DeleteVertex(v) => self.on_delete_vertex(graph, *v),
            GraphEvent::AddEdge(e) => self.on_add_edge(graph, *e),
            GraphEvent::DeleteEdge(e) => self.on_delete_edge(graph, *e),
            GraphEvent::Merge { old, new } => self.on_merge(graph, old, *new),
            GraphEvent::Split { old, first, second } => {
                self.on_split(graph, *old, *first, *second)
            }
            GraphEvent::Glue { new, first, second } => {
                self.on_glue(graph, *new, *first, *second)
            }
            GraphEvent::MergeVertices {
                first,
                second,
                merged,
            } => self.on_merge_vertices(graph, *first, *second, *merged),
            GraphEvent::SplitVertex { old, first, second } => {
                self.on_split_vertex(graph, *old, *first, *second)
            }
        }
    }

    fn on_add_vertex(&mut self, _graph: &GraphStore<P>, _v: VertexId) {}

    fn on_delete_vertex(&mut self, _graph: &GraphStore<P>, _v: VertexId) {}

    fn on_add_edge(&mut self, _graph: &GraphStore<P>, _e: EdgeId) {}

    fn on_delete_edge(&mut self, _graph: &GraphStore<P>, _e: EdgeId) {}

    fn on_merge(
        &mut self,
        _graph: &GraphStore<P>,
        _old: &[EdgeId],
        _new: EdgeId,
    ) {
    }

    fn on_split(
        &mut self,
        _graph: &GraphStore<P>,
        _old: EdgeId,
        _first: EdgeId,
        _second: EdgeId,
    ) {
    }

    fn on_glue(
        &mut self,
        _graph: &GraphStore<P>,
        _new: EdgeId,
        _first: EdgeId,
        _second: EdgeId,
    ) {
    }

    fn on_merge_vertices(
        &mut self,
        _graph: &GraphStore<P>,
        _first: VertexId,
        _second: VertexId,
        _merged: VertexId,
    ) {
    }

    fn on_split_vertex(
        &mut self,
        _graph: &GraphStore<P>,
        _old: VertexId,
        _first: VertexId,
        _second: VertexId,
    ) {
    }
}

/// Records every event it receives, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<GraphEvent>,
}

impl EventLog {
    pub fn new() -> EventLog {
        Default::default()
    }

    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<P: DataPolicy> GraphListener<P> for EventLog {
    fn name(&self) -> &str {
        "event log"
    }

    fn on_event(&mut self, _graph: &GraphStore<P>, event: &GraphEvent) {
        self.events.push(event.clone());
    }
}

/// The listeners a [`NotificationBus`] can hold.
pub enum Listener<P: DataPolicy> {
    IndexRenewer(IndexRenewer),
    EventLog(EventLog),
    Custom(Box<dyn GraphListener<P>>),
}

impl<P: DataPolicy> Listener<P> {
    pub fn custom<L>(listener: L) -> Listener<P>
    where
        L: GraphListener<P> + 'static,
    {
        Listener::Custom(Box::new(listener))
    }

    fn as_listener_mut(&mut self) -> &mut dyn GraphListener<P> {
        match self {
            Listener::IndexRenewer(renewer) => renewer,
            Listener::EventLog(log) => log,
            Listener::Custom(listener) => listener.as_mut(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Listener::IndexRenewer(renewer) => {
                GraphListener::<P>::name(renewer)
            }
            Listener::EventLog(log) => GraphListener::<P>::name(log),
            Listener::Custom(listener) => listener.name(),
        }
    }
}

/// Ordered registry of listeners.
pub struct NotificationBus<P: DataPolicy> {
    listeners: Vec<Listener<P>>,
}

impl<P: DataPolicy> Default for NotificationBus<P> {
    fn default() -> Self {
        NotificationBus {
            listeners: Vec::new(),
        }
    }
}

impl<P: DataPolicy> fmt::Debug for NotificationBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.listeners.iter().map(|l| l.name()))
            .finish()
    }
}

impl<P: DataPolicy> NotificationBus<P> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a listener after all the ones already registered.
    pub fn register(&mut self, listener: Listener<P>) {
        debug!("registering listener {}", listener.name());
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn listeners(&self) -> impl Iterator<Item = &Listener<P>> + '_ {
        self.listeners.iter()
    }

    pub fn listeners_mut(
        &mut self,
    ) -> impl Iterator<Item = &mut Listener<P>> + '_ {
        self.listeners.iter_mut()
    }

    /// Hand `event` to every listener, in registration order.
    pub fn fire(&mut self, graph: &GraphStore<P>, event: &GraphEvent) {
        trace!("firing {:?}", event);
        for listener in self.listeners.iter_mut() {
            listener.as_listener_mut().on_event(graph, event);
        }
    }
}
