use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::window;

use crate::error::{GridError, Result};

use super::render::Renderer;

/// Drives a [`Renderer`] once per animation frame until stopped.
///
/// `stop` is idempotent and also runs on drop, so a loop never outlives the
/// handle that started it.
#[derive(Default)]
pub struct FrameLoop {
    state: Rc<LoopState>,
}

#[derive(Default)]
struct LoopState {
    aborted: Cell<bool>,
    pending: Cell<Option<i32>>,
    // Holds the animation-frame closure so it can keep requesting itself.
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepares `renderer` and enters the loop. A loop that was already
    /// running is stopped first.
    pub fn start(&self, renderer: Rc<RefCell<Renderer>>) -> Result<()> {
        self.stop();
        renderer.borrow_mut().prepare();
        self.state.aborted.set(false);

        let state: Weak<LoopState> = Rc::downgrade(&self.state);
        let callback = Closure::wrap(Box::new(move |timestamp: f64| {
            let Some(state) = state.upgrade() else {
                return;
            };
            state.pending.set(None);
            if state.aborted.get() {
                return;
            }

            let rendered = match renderer.try_borrow_mut() {
                Ok(mut renderer) => renderer.render(timestamp / 1000.0),
                Err(_) => {
                    log::warn!("renderer busy at {timestamp:.1}ms; frame skipped");
                    Ok(())
                }
            };
            if let Err(err) = rendered.and_then(|()| state.request()) {
                log::error!("render loop stopped: {err}");
                state.halt();
            }
        }) as Box<dyn FnMut(f64)>);

        *self.state.callback.borrow_mut() = Some(callback);
        if let Err(err) = self.state.request() {
            self.stop();
            return Err(err);
        }
        Ok(())
    }

    /// Cancels the pending frame and releases the loop closure.
    pub fn stop(&self) {
        self.state.halt();
        self.state.callback.borrow_mut().take();
    }

    pub fn is_running(&self) -> bool {
        !self.state.aborted.get() && self.state.callback.borrow().is_some()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl LoopState {
    fn request(&self) -> Result<()> {
        let callback = self.callback.borrow();
        let Some(callback) = callback.as_ref() else {
            return Ok(());
        };
        let handle = window()
            .ok_or_else(|| GridError::Dom("no window".into()))?
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.pending.set(Some(handle));
        Ok(())
    }

    /// Stops scheduling without dropping the closure, which may be the one
    /// currently executing.
    fn halt(&self) {
        self.aborted.set(true);
        if let Some(handle) = self.pending.take() {
            if let Some(window) = window() {
                window.cancel_animation_frame(handle).ok();
            }
        }
    }
}
