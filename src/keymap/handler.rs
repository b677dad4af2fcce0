//! Input handler: ties translation, composition and output sinks together

use std::fmt;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::composition::{CompositionBridge, CompositionOrder, SurfaceEvent, TextOutcome};
use super::translator::KeyOutcome;
use super::types::{Mode, RawKeyEvent};
use crate::error::Result;
use crate::settings::SettingsContext;

/// Receiver of translated input (the editor's `input(text)` call)
pub trait InputSink {
    fn input(&mut self, text: &str);
}

impl<F: FnMut(&str)> InputSink for F {
    fn input(&mut self, text: &str) {
        self(text)
    }
}

/// Forwards input over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink(pub Sender<String>);

impl InputSink for ChannelSink {
    fn input(&mut self, text: &str) {
        if self.0.send(text.to_string()).is_err() {
            tracing::debug!("input channel closed, dropping {:?}", text);
        }
    }
}

/// Per-surface input state: current mode, composition state and observers
pub struct InputHandler {
    context: Arc<SettingsContext>,
    mode: Mode,
    bridge: CompositionBridge,
    sinks: Vec<Box<dyn InputSink + Send>>,
}

impl InputHandler {
    pub fn new(context: Arc<SettingsContext>, order: CompositionOrder) -> Self {
        Self {
            context,
            mode: Mode::default(),
            bridge: CompositionBridge::new(order),
            sinks: Vec::new(),
        }
    }

    /// Register an observer for every emitted notation or text
    pub fn on_translated(&mut self, sink: impl InputSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Mode signal from the remote editor
    pub fn set_mode(&mut self, mode: impl Into<Mode>) {
        let mode = mode.into();
        if mode != self.mode {
            tracing::trace!(from = %self.mode, to = %mode, "mode change");
            self.mode = mode;
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn context(&self) -> &Arc<SettingsContext> {
        &self.context
    }

    /// Translate a key event against the current settings snapshot.
    ///
    /// Fails only when settings have not been loaded yet.
    pub fn handle_key(&mut self, event: &RawKeyEvent) -> Result<KeyOutcome> {
        let snapshot = self.context.snapshot()?;
        let outcome = snapshot.translator().translate(event, &self.mode);
        if let KeyOutcome::Emitted(notation) = &outcome {
            self.dispatch(notation);
        }
        Ok(outcome)
    }

    /// Feed a text-surface event through the composition bridge
    pub fn handle_surface(&mut self, event: SurfaceEvent) -> TextOutcome {
        let outcome = self.bridge.handle(event);
        if let TextOutcome::Emitted(text) = &outcome {
            self.dispatch(text);
        }
        outcome
    }

    fn dispatch(&mut self, text: &str) {
        for sink in &mut self.sinks {
            sink.input(text);
        }
    }
}

impl fmt::Debug for InputHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputHandler")
            .field("mode", &self.mode)
            .field("bridge", &self.bridge)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
