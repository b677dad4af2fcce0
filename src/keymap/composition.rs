//! Text input that bypasses key translation
//!
//! Plain text insertion and finished IME compositions are forwarded as
//! literal text. Engines disagree on whether the composition-end event comes
//! before or after the last input event of a composition, so the order is a
//! setting of the bridge rather than something detected at runtime.

/// Order in which a host delivers the end of a composition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositionOrder {
    /// `compositionend` first, then an input event with the composing flag
    /// cleared that carries the final text. The input event is authoritative.
    #[default]
    EndBeforeInput,
    /// Input events all report composing; `compositionend` comes last and is
    /// authoritative.
    EndAfterInput,
}

/// Events from the text surface that receives raw input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    CompositionStart,
    Input {
        data: String,
        is_composing: bool,
        trusted: bool,
    },
    CompositionEnd {
        data: String,
    },
}

impl SurfaceEvent {
    /// A trusted, non-composing text insertion
    pub fn text(data: impl Into<String>) -> Self {
        SurfaceEvent::Input {
            data: data.into(),
            is_composing: false,
            trusted: true,
        }
    }

    /// A trusted insertion made while a composition is in progress
    pub fn composing(data: impl Into<String>) -> Self {
        SurfaceEvent::Input {
            data: data.into(),
            is_composing: true,
            trusted: true,
        }
    }

    pub fn end(data: impl Into<String>) -> Self {
        SurfaceEvent::CompositionEnd { data: data.into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositionState {
    #[default]
    Idle,
    Composing,
}

/// Result of feeding one surface event to the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextOutcome {
    /// Send this text verbatim; the surface buffer has been cleared
    Emitted(String),
    /// Part of a composition still in progress
    Pending,
    /// Nothing to send
    Ignored,
}

/// Two-state machine turning surface events into literal text
#[derive(Debug, Clone, Default)]
pub struct CompositionBridge {
    order: CompositionOrder,
    state: CompositionState,
    /// Text of the composition in progress, as last reported by the surface
    buffer: String,
}

impl CompositionBridge {
    pub fn new(order: CompositionOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn order(&self) -> CompositionOrder {
        self.order
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    /// Text of the composition in progress
    pub fn pending_text(&self) -> &str {
        &self.buffer
    }

    pub fn handle(&mut self, event: SurfaceEvent) -> TextOutcome {
        match event {
            SurfaceEvent::CompositionStart => {
                self.state = CompositionState::Composing;
                self.buffer.clear();
                TextOutcome::Pending
            }
            SurfaceEvent::Input { trusted: false, .. } => TextOutcome::Ignored,
            SurfaceEvent::Input {
                data,
                is_composing: true,
                ..
            } => {
                self.state = CompositionState::Composing;
                self.buffer = data;
                TextOutcome::Pending
            }
            SurfaceEvent::Input { data, .. } => {
                self.state = CompositionState::Idle;
                self.buffer.clear();
                emit(data)
            }
            SurfaceEvent::CompositionEnd { data } => {
                self.state = CompositionState::Idle;
                let pending = std::mem::take(&mut self.buffer);
                match self.order {
                    // The input event that follows carries the text
                    CompositionOrder::EndBeforeInput => TextOutcome::Pending,
                    CompositionOrder::EndAfterInput if data.is_empty() => emit(pending),
                    CompositionOrder::EndAfterInput => emit(data),
                }
            }
        }
    }

    /// Drop any composition in progress
    pub fn reset(&mut self) {
        self.state = CompositionState::Idle;
        self.buffer.clear();
    }
}

fn emit(text: String) -> TextOutcome {
    if text.is_empty() {
        TextOutcome::Ignored
    } else {
        tracing::debug!(text = %text, "captured text input");
        TextOutcome::Emitted(text)
    }
}
