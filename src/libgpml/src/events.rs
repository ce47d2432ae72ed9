// Copyright 2026 The Simlin Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use crate::datamodel::{ObjectType, PropertyTag};
use crate::ids::ElementId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Deleted,
    Resized,
    PropertyChanged(PropertyTag),
    AllPropertiesChanged,
}

/// A change notification.  `element` is `None` when the subject is the
/// pathway itself.
#[derive(Clone, Debug, PartialEq)]
pub struct PathwayEvent {
    pub kind: EventKind,
    pub object_type: ObjectType,
    pub element: Option<ElementId>,
}

impl PathwayEvent {
    pub(crate) fn element(kind: EventKind, object_type: ObjectType, id: &ElementId) -> Self {
        PathwayEvent {
            kind,
            object_type,
            element: Some(id.clone()),
        }
    }

    pub(crate) fn pathway(kind: EventKind) -> Self {
        PathwayEvent {
            kind,
            object_type: ObjectType::Pathway,
            element: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

pub type Listener = Box<dyn FnMut(&PathwayEvent)>;

/// Listeners in registration order plus the events raised by the operation
/// in progress.  Events are only handed out by `flush`, which the model
/// calls once its bookkeeping for an operation is complete.
#[derive(Default)]
pub(crate) struct EventQueue {
    listeners: Vec<(ListenerId, Listener)>,
    pending: Vec<PathwayEvent>,
    next_id: u64,
}

impl EventQueue {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn push(&mut self, event: PathwayEvent) {
        self.pending.push(event);
    }

    pub(crate) fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for event in pending.iter() {
            for (_, listener) in self.listeners.iter_mut() {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_flush_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = EventQueue::default();
        for name in ["first", "second"] {
            let log = log.clone();
            queue.subscribe(Box::new(move |event: &PathwayEvent| {
                log.borrow_mut().push((name, event.kind));
            }));
        }

        queue.push(PathwayEvent::pathway(EventKind::AllPropertiesChanged));
        assert!(log.borrow().is_empty());
        queue.flush();
        assert_eq!(
            vec![
                ("first", EventKind::AllPropertiesChanged),
                ("second", EventKind::AllPropertiesChanged)
            ],
            *log.borrow()
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut queue = EventQueue::default();
        let id = {
            let count = count.clone();
            queue.subscribe(Box::new(move |_: &PathwayEvent| *count.borrow_mut() += 1))
        };
        assert!(queue.unsubscribe(id));
        assert!(!queue.unsubscribe(id));
        queue.push(PathwayEvent::pathway(EventKind::Added));
        queue.flush();
        assert_eq!(0, *count.borrow());
    }
}
