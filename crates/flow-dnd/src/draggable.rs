//! # Draggable Binding
//!
//! Connects one element's native drag gesture to the codec and the session
//! store.
//!
//! On drag start the binding writes its payload into the transport, sets the
//! allowed effect, optionally builds a custom preview, then publishes the
//! payload to the [`DragSession`]. On drag end it tears the preview down and
//! clears the session, whether or not any drop zone acted on the drag.

use crate::codec;
use crate::config::DragConfig;
use crate::error::DragImageError;
use crate::event::DragEvent;
use crate::payload::DragPayload;
use crate::session::DragSession;
use crate::transfer::{DataTransfer, EffectAllowed, VisualHandle};
use glam::Vec2;
use std::sync::Arc;

/// Description of a preview the binding should synthesize.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragImageDescriptor {
    /// Number of dragged items, shown as a badge.
    pub count: Option<usize>,
    /// Text shown when there is neither a thumbnail nor a count above one.
    pub content: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Cursor offset. Falls back to [`DragConfig::drag_image_offset`].
    pub offset: Option<Vec2>,
    /// Largest thumbnail edge. Falls back to [`DragConfig::drag_image_max_size`].
    pub max_size: Option<f32>,
}

/// Preview to use instead of the browser's default ghost image.
#[derive(Clone, Debug, PartialEq)]
pub enum DragImage {
    /// A ready-made element owned by the host.
    Element(VisualHandle),
    /// A preview to build on drag start.
    Descriptor(DragImageDescriptor),
}

/// A preview the host is asked to create.
#[derive(Clone, Debug, PartialEq)]
pub enum DragVisual {
    /// Thumbnail image, with a count badge when more than one item is dragged.
    Thumbnail {
        url: String,
        badge: Option<String>,
        max_size: f32,
    },
    /// Count badge alone.
    CountBadge { label: String },
    /// Plain text label.
    Text { content: String },
}

/// Badge text for `count` items.
pub fn badge_label(count: usize) -> String {
    if count > 99 {
        "99+".to_string()
    } else {
        count.to_string()
    }
}

/// Picks the preview for a descriptor: thumbnail, then count badge, then text.
///
/// A count badge needs more than one item; a single item falls through to text.
///
/// `None` means the dragged element itself should be used.
pub fn synthesize(descriptor: &DragImageDescriptor, config: &DragConfig) -> Option<DragVisual> {
    if let Some(url) = &descriptor.thumbnail_url {
        return Some(DragVisual::Thumbnail {
            url: url.clone(),
            badge: descriptor.count.filter(|&c| c > 1).map(badge_label),
            max_size: descriptor.max_size.unwrap_or(config.drag_image_max_size),
        });
    }
    if let Some(count) = descriptor.count.filter(|&c| c > 1) {
        return Some(DragVisual::CountBadge {
            label: badge_label(count),
        });
    }
    descriptor
        .content
        .as_ref()
        .filter(|content| !content.is_empty())
        .map(|content| DragVisual::Text {
            content: content.clone(),
        })
}

/// Host side of preview synthesis.
pub trait DragImageHost: Send + Sync {
    /// Builds a detached element for `visual`.
    fn create(&self, visual: &DragVisual) -> Result<VisualHandle, DragImageError>;
    /// True if `handle` is currently part of the document.
    fn is_attached(&self, handle: VisualHandle) -> bool;
    /// Inserts `handle` into the document, off-screen.
    fn attach(&self, handle: VisualHandle) -> Result<(), DragImageError>;
    /// Removes `handle` from the document.
    fn remove(&self, handle: VisualHandle);
}

/// User callback run after the binding's own bookkeeping.
pub type DragCallback = Box<dyn Fn(&DragEvent) + Send + Sync>;

/// Result of [`Draggable::drag_start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragStart {
    Started,
    /// The binding is disabled; the host must cancel the native gesture.
    Cancelled,
}

/// Drag behaviour for one element.
pub struct Draggable {
    payload: DragPayload,
    session: DragSession,
    config: DragConfig,
    disabled: bool,
    effect_allowed: Option<EffectAllowed>,
    drag_image: Option<DragImage>,
    host: Option<Arc<dyn DragImageHost>>,
    on_drag_start: Option<DragCallback>,
    on_drag_end: Option<DragCallback>,
    /// Preview inserted by this binding, removed again on drag end.
    mounted: Option<VisualHandle>,
}

impl Draggable {
    pub fn new(payload: DragPayload, session: DragSession) -> Self {
        Self {
            payload,
            session,
            config: DragConfig::default(),
            disabled: false,
            effect_allowed: None,
            drag_image: None,
            host: None,
            on_drag_start: None,
            on_drag_end: None,
            mounted: None,
        }
    }

    pub fn with_config(mut self, config: DragConfig) -> Self {
        self.config = config;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn effect_allowed(mut self, effect: EffectAllowed) -> Self {
        self.effect_allowed = Some(effect);
        self
    }

    pub fn drag_image(mut self, image: DragImage) -> Self {
        self.drag_image = Some(image);
        self
    }

    pub fn image_host(mut self, host: Arc<dyn DragImageHost>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn on_drag_start(mut self, callback: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.on_drag_start = Some(Box::new(callback));
        self
    }

    pub fn on_drag_end(mut self, callback: impl Fn(&DragEvent) + Send + Sync + 'static) -> Self {
        self.on_drag_end = Some(Box::new(callback));
        self
    }

    pub fn payload(&self) -> &DragPayload {
        &self.payload
    }

    /// Swaps the payload, e.g. when the element's selection changes.
    pub fn set_payload(&mut self, payload: DragPayload) {
        self.payload = payload;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Handle of the preview currently inserted by this binding.
    pub fn mounted_preview(&self) -> Option<VisualHandle> {
        self.mounted
    }

    pub fn drag_start(&mut self, event: &DragEvent, transfer: &mut dyn DataTransfer) -> DragStart {
        if self.disabled {
            return DragStart::Cancelled;
        }

        codec::serialize(&self.payload, transfer);
        transfer.set_effect_allowed(self.effect_allowed.unwrap_or(self.config.effect_allowed));

        if let Some(image) = self.drag_image.clone()
            && let Err(e) = self.apply_drag_image(&image, transfer)
        {
            tracing::warn!(error = %e, "Falling back to the default drag preview");
        }

        self.session.set_active_drag(self.payload.clone());

        if let Some(callback) = &self.on_drag_start {
            callback(event);
        }
        DragStart::Started
    }

    pub fn drag_end(&mut self, event: &DragEvent) {
        self.unmount_preview();
        self.session.clear_drag();

        if let Some(callback) = &self.on_drag_end {
            callback(event);
        }
    }

    fn apply_drag_image(
        &mut self,
        image: &DragImage,
        transfer: &mut dyn DataTransfer,
    ) -> Result<(), DragImageError> {
        // A stale preview from an aborted drag would otherwise leak.
        self.unmount_preview();

        match image {
            DragImage::Element(handle) => {
                let Some(host) = self.host.clone() else {
                    transfer.set_drag_image(*handle, self.config.drag_image_offset);
                    return Ok(());
                };
                if !host.is_attached(*handle) {
                    host.attach(*handle)?;
                    self.mounted = Some(*handle);
                }
                transfer.set_drag_image(*handle, self.config.drag_image_offset);
            }
            DragImage::Descriptor(descriptor) => {
                let Some(visual) = synthesize(descriptor, &self.config) else {
                    return Ok(());
                };
                let Some(host) = self.host.clone() else {
                    tracing::debug!("No drag image host, using the element as preview");
                    return Ok(());
                };
                let handle = host.create(&visual)?;
                if let Err(e) = host.attach(handle) {
                    host.remove(handle);
                    return Err(e);
                }
                self.mounted = Some(handle);
                let offset = descriptor.offset.unwrap_or(self.config.drag_image_offset);
                transfer.set_drag_image(handle, offset);
            }
        }
        Ok(())
    }

    fn unmount_preview(&mut self) {
        if let (Some(handle), Some(host)) = (self.mounted.take(), &self.host) {
            host.remove(handle);
        }
    }
}
