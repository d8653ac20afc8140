//! # Drop Zone Negotiator
//!
//! Decides, per drag-over tick and again at drop time, whether the dragged
//! payload is acceptable, and hands accepted payloads to a [`DropHandler`]
//! together with the drop position.
//!
//! ## State machine
//! - `Idle`: counter is 0, nothing hovering.
//! - `Hovering`: counter > 0, acceptance unknown or rejected.
//! - `HoveringValid`: counter > 0 and the latest validation accepted the drag.
//!
//! Enter/leave events bubble from nested children, so hover is tracked with a
//! counter rather than a flag. Acceptance is only recomputed on drag-over.
//!
//! Validation may be deferred. Each drag-over tick is stamped with a sequence
//! number and a deferred result is only applied if no newer tick has been
//! issued since (last issued wins, regardless of resolution order).

use crate::codec;
use crate::event::DragEvent;
use crate::payload::{DragKind, DragPayload};
use crate::session::DragSession;
use crate::transfer::{DataTransfer, DropEffect};
use async_trait::async_trait;
use futures::future::BoxFuture;
use glam::Vec2;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Outcome of a validation predicate.
pub enum Validation {
    Ready(bool),
    Deferred(BoxFuture<'static, bool>),
}

impl Validation {
    pub fn deferred(future: impl Future<Output = bool> + Send + 'static) -> Self {
        Validation::Deferred(Box::pin(future))
    }

    pub async fn resolve(self) -> bool {
        match self {
            Validation::Ready(ok) => ok,
            Validation::Deferred(future) => future.await,
        }
    }
}

impl From<bool> for Validation {
    fn from(ok: bool) -> Self {
        Validation::Ready(ok)
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Ready(ok) => f.debug_tuple("Ready").field(ok).finish(),
            Validation::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Extra acceptance check run after the kind filter.
pub trait DropValidator: Send + Sync {
    fn validate(&self, payload: &DragPayload, event: &DragEvent) -> Validation;
}

impl<F> DropValidator for F
where
    F: Fn(&DragPayload, &DragEvent) -> Validation + Send + Sync,
{
    fn validate(&self, payload: &DragPayload, event: &DragEvent) -> Validation {
        self(payload, event)
    }
}

/// Receives accepted drops.
#[async_trait]
pub trait DropHandler: Send + Sync {
    /// `position` is already translated into the zone's local space.
    async fn on_drop(&self, payload: DragPayload, event: &DragEvent, position: Vec2);
}

/// Maps client coordinates into a zone-local space (e.g. canvas world space).
pub trait CoordinateSpace: Send + Sync {
    fn to_local(&self, screen: Vec2) -> Vec2;
}

/// Leaves coordinates untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl CoordinateSpace for Identity {
    fn to_local(&self, screen: Vec2) -> Vec2 {
        screen
    }
}

/// Static configuration of a drop zone.
#[derive(Clone, Debug, Default)]
pub struct DropZoneConfig {
    /// Kinds this zone accepts. Include [`DragKind::File`] for external files.
    pub accepts: HashSet<DragKind>,
    pub disabled: bool,
    /// Presentation hint while something hovers the zone.
    pub active_class_name: Option<String>,
    /// Presentation hint while the hovering drag is acceptable.
    pub valid_class_name: Option<String>,
}

impl DropZoneConfig {
    pub fn accepting<I, K>(kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<DragKind>,
    {
        Self {
            accepts: kinds.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// Hover state of one zone instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropZoneState {
    pub is_over: bool,
    pub can_drop: bool,
    pub drag_counter: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZonePhase {
    Idle,
    Hovering,
    HoveringValid,
}

impl DropZoneState {
    pub fn phase(&self) -> ZonePhase {
        match (self.drag_counter > 0, self.can_drop) {
            (false, _) => ZonePhase::Idle,
            (true, false) => ZonePhase::Hovering,
            (true, true) => ZonePhase::HoveringValid,
        }
    }
}

/// What [`DropZone::drop`] did with the drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// The payload was handed to the handler.
    Delivered,
    /// External files were handed to the handler one at a time.
    FilesDelivered(usize),
    /// Wrong kind or failed validation. Nothing happened.
    Rejected,
    /// Nothing decodable was carried.
    Empty,
    Disabled,
}

#[derive(Debug, Default)]
struct Shared {
    state: DropZoneState,
    /// Sequence number of the most recent drag-over tick.
    issued: u64,
    drops_in_flight: usize,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Result of a settled [`ValidationTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationSettled {
    pub seq: u64,
    pub can_drop: bool,
    /// False if a newer tick superseded this one or the drag already left.
    pub applied: bool,
}

/// A deferred validation issued by [`DropZone::drag_over`].
///
/// The host drives it (typically by spawning it) so that a slow predicate
/// never blocks the event loop.
#[must_use = "a deferred validation has no effect until it is awaited"]
pub struct ValidationTask {
    seq: u64,
    future: BoxFuture<'static, bool>,
    shared: Arc<Mutex<Shared>>,
}

impl ValidationTask {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub async fn run(self) -> ValidationSettled {
        let Self {
            seq,
            future,
            shared,
        } = self;
        let can_drop = future.await;

        let mut shared = lock(&shared);
        let applied = shared.issued == seq && shared.state.is_over;
        if applied {
            shared.state.can_drop = can_drop;
        } else {
            tracing::trace!(seq, latest = shared.issued, "Discarding stale drop validation");
        }
        ValidationSettled {
            seq,
            can_drop,
            applied,
        }
    }
}

impl fmt::Debug for ValidationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationTask").field("seq", &self.seq).finish()
    }
}

/// Marks a drop as in flight for as long as it lives.
struct InFlight(Arc<Mutex<Shared>>);

impl InFlight {
    fn begin(shared: &Arc<Mutex<Shared>>) -> Self {
        lock(shared).drops_in_flight += 1;
        Self(Arc::clone(shared))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut shared = lock(&self.0);
        shared.drops_in_flight = shared.drops_in_flight.saturating_sub(1);
    }
}

/// Drop behaviour for one UI region.
pub struct DropZone {
    config: DropZoneConfig,
    session: DragSession,
    handler: Arc<dyn DropHandler>,
    validator: Option<Arc<dyn DropValidator>>,
    translator: Option<Arc<dyn CoordinateSpace>>,
    shared: Arc<Mutex<Shared>>,
}

impl DropZone {
    pub fn new(config: DropZoneConfig, session: DragSession, handler: Arc<dyn DropHandler>) -> Self {
        Self {
            config,
            session,
            handler,
            validator: None,
            translator: None,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    pub fn with_validator(mut self, validator: impl DropValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn CoordinateSpace>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn config(&self) -> &DropZoneConfig {
        &self.config
    }

    pub fn state(&self) -> DropZoneState {
        lock(&self.shared).state
    }

    pub fn phase(&self) -> ZonePhase {
        self.state().phase()
    }

    pub fn is_drop_in_flight(&self) -> bool {
        lock(&self.shared).drops_in_flight > 0
    }

    pub fn accepts(&self, kind: &DragKind) -> bool {
        self.config.accepts.contains(kind)
    }

    /// Presentation hints matching the current state.
    pub fn class_names(&self) -> Vec<&str> {
        let state = self.state();
        let mut names = Vec::new();
        if state.is_over
            && let Some(name) = &self.config.active_class_name
        {
            names.push(name.as_str());
        }
        if state.can_drop
            && let Some(name) = &self.config.valid_class_name
        {
            names.push(name.as_str());
        }
        names
    }

    /// Converts client coordinates into the zone's local space.
    ///
    /// Without a translator the client coordinates are returned unchanged.
    pub fn position(&self, client: Vec2) -> Vec2 {
        match &self.translator {
            Some(translator) => translator.to_local(client),
            None => {
                tracing::trace!("No coordinate translator, using client coordinates");
                client
            }
        }
    }

    /// Disabled zones ignore enter and leave, so they never show as active.
    pub fn drag_enter(&self, _event: &DragEvent) {
        if self.config.disabled {
            return;
        }
        let mut shared = lock(&self.shared);
        shared.state.drag_counter += 1;
        if shared.state.drag_counter == 1 {
            shared.state.is_over = true;
        }
    }

    pub fn drag_leave(&self, _event: &DragEvent) {
        if self.config.disabled {
            return;
        }
        let mut shared = lock(&self.shared);
        shared.state.drag_counter = shared.state.drag_counter.saturating_sub(1);
        if shared.state.drag_counter == 0 {
            shared.state.is_over = false;
            shared.state.can_drop = false;
        }
    }

    /// Recomputes acceptance for this tick and sets the drop indicator.
    ///
    /// A deferred validation is returned as a task; until it settles the
    /// indicator reflects the last settled result.
    pub fn drag_over(
        &self,
        event: &DragEvent,
        transfer: &mut dyn DataTransfer,
    ) -> Option<ValidationTask> {
        let seq = {
            let mut shared = lock(&self.shared);
            shared.issued += 1;
            shared.issued
        };

        match self.evaluate(event, transfer) {
            Validation::Ready(ok) => {
                {
                    let mut shared = lock(&self.shared);
                    if shared.state.is_over {
                        shared.state.can_drop = ok;
                    }
                }
                set_indicator(transfer, ok);
                None
            }
            Validation::Deferred(future) => {
                let settled = lock(&self.shared).state.can_drop;
                set_indicator(transfer, settled);
                Some(ValidationTask {
                    seq,
                    future,
                    shared: Arc::clone(&self.shared),
                })
            }
        }
    }

    /// Handles the final drop.
    ///
    /// The hover state is reset before anything else so a failing handler
    /// cannot leave the zone stuck. The transport is decoded afresh: the
    /// session only knows about drags started in this window.
    pub async fn drop(&self, event: &DragEvent, transfer: &dyn DataTransfer) -> DropOutcome {
        self.reset();
        if self.config.disabled {
            return DropOutcome::Disabled;
        }

        // Files are delivered only to zones that take them; otherwise the
        // transport may still carry an in-app payload alongside.
        if codec::has_external_files(transfer) && self.accepts(&DragKind::File) {
            let files = codec::extract_files(transfer);
            let count = files.len();
            let position = self.position(event.client);
            let _flight = InFlight::begin(&self.shared);
            for file in files {
                self.handler
                    .on_drop(DragPayload::file(file), event, position)
                    .await;
            }
            return DropOutcome::FilesDelivered(count);
        }

        let Some(payload) = codec::deserialize(transfer) else {
            return DropOutcome::Empty;
        };
        if !self.accepts(&payload.kind()) {
            tracing::trace!(kind = %payload.kind(), "Drop rejected by kind");
            return DropOutcome::Rejected;
        }
        if let Some(validator) = &self.validator
            && !validator.validate(&payload, event).resolve().await
        {
            tracing::trace!(kind = %payload.kind(), "Drop rejected by validator");
            return DropOutcome::Rejected;
        }

        let position = self.position(event.client);
        let _flight = InFlight::begin(&self.shared);
        self.handler.on_drop(payload, event, position).await;
        DropOutcome::Delivered
    }

    fn reset(&self) {
        let mut shared = lock(&self.shared);
        shared.state = DropZoneState::default();
        // Pending validations belong to a drag that is over.
        shared.issued += 1;
    }

    fn evaluate(&self, event: &DragEvent, transfer: &dyn DataTransfer) -> Validation {
        if self.config.disabled {
            return Validation::Ready(false);
        }
        if codec::has_external_files(transfer) && self.accepts(&DragKind::File) {
            return Validation::Ready(true);
        }
        let Some(payload) = self.session.active_drag() else {
            return Validation::Ready(false);
        };
        if !self.accepts(&payload.kind()) {
            return Validation::Ready(false);
        }
        match &self.validator {
            Some(validator) => validator.validate(&payload, event),
            None => Validation::Ready(true),
        }
    }
}

fn set_indicator(transfer: &mut dyn DataTransfer, can_drop: bool) {
    let effect = if can_drop {
        transfer.effect_allowed().preferred_drop_effect()
    } else {
        DropEffect::None
    };
    transfer.set_drop_effect(effect);
}
