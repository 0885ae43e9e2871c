use std::cell::RefCell;
use std::rc::Rc;

use super::EngineError;

/// Progress report for one texture source of a plane or pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Source label (image URL, element id, ...).
    pub source: String,
    /// Sampler name the texture is bound to in the shader.
    pub sampler: String,
}

/// Events a plane resource reports.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneEvent {
    AfterRender,
    AfterResize,
    Error(EngineError),
    LeaveView,
    Loading(TextureInfo),
    Ready,
    ReEnterView,
    Render,
}

/// Events a shader pass resource reports.
#[derive(Debug, Clone, PartialEq)]
pub enum PassEvent {
    AfterRender,
    AfterResize,
    Error(EngineError),
    Loading(TextureInfo),
    Ready,
    Render,
}

/// Shared queue the engine pushes events into.
///
/// Everything runs on the host's single update thread, so the queue is a plain
/// `Rc<RefCell<..>>`. The engine keeps one clone, the owning controller keeps
/// another and drains it when the host pumps events.
#[derive(Debug)]
pub struct EventSink<E>(Rc<RefCell<Vec<E>>>);

impl<E> EventSink<E> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Vec::new())))
    }

    /// Queue an event.
    pub fn push(&self, event: E) {
        self.0.borrow_mut().push(event);
    }

    /// Drain all pending events in arrival order.
    pub fn take(&self) -> Vec<E> {
        self.0.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<E> Default for EventSink<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_queue() {
        let sink = EventSink::new();
        let engine_side = sink.clone();
        engine_side.push(PlaneEvent::Ready);
        engine_side.push(PlaneEvent::Render);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.take(), vec![PlaneEvent::Ready, PlaneEvent::Render]);
        assert!(engine_side.is_empty());
    }
}
