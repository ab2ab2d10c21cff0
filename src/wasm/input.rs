use std::cell::RefCell;
use std::rc::Weak;

use glam::Vec2;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::error::Result;
use crate::pointer::{client_to_canvas, PointerState};

use super::render::Renderer;

/// An event subscription that unregisters itself when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        if removed.is_err() {
            log::warn!("failed to remove `{}` listener", self.event);
        }
    }
}

/// Follows the pointer anywhere in the window, storing its position in
/// `canvas` pixel coordinates.
pub fn track_pointer(
    window: &Window,
    canvas: HtmlCanvasElement,
    pointer: PointerState,
) -> Result<Listener> {
    Listener::new(window, "pointermove", move |event: Event| {
        let Some(event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let rect = canvas.get_bounding_client_rect();
        let position = client_to_canvas(
            Vec2::new(event.client_x() as f32, event.client_y() as f32),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
            (canvas.width(), canvas.height()),
        );
        pointer.set(position);
    })
}

/// Resizes the backing store and rebuilds the grid whenever the window size
/// changes.
pub fn track_resize(window: &Window, renderer: Weak<RefCell<Renderer>>) -> Result<Listener> {
    Listener::new(window, "resize", move |_event: Event| {
        let Some(renderer) = renderer.upgrade() else {
            return;
        };
        let Ok(mut renderer) = renderer.try_borrow_mut() else {
            return;
        };
        if renderer.resize() {
            let size = renderer.surface_size();
            log::debug!("canvas resized to {}x{}", size.width, size.height);
        }
    })
}
