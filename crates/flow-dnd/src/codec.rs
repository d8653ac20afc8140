//! # Serialization Codec
//!
//! Writes a [`DragPayload`] into a [`DataTransfer`] and reads it back.
//!
//! Producers write two things: the full tagged payload under
//! [`DRAG_DATA_MIME`] (the unified format), and for a few kinds the bare body
//! under an older per-kind key. Consumers read the unified key first and fall
//! back to the legacy keys in [`LEGACY_DECODERS`] order, so either side can be
//! upgraded without the other.

use crate::payload::{DragData, DragKind, DragMetadata, DragPayload, FileHandle, WirePayload};
use crate::transfer::{DataTransfer, TransferItemKind};

/// Reserved transport key carrying the full tagged payload as JSON.
pub const DRAG_DATA_MIME: &str = "application/x-nodetool-drag";

/// Per-kind keys written by producers that predate [`DRAG_DATA_MIME`].
pub mod legacy {
    pub const CREATE_NODE: &str = "create-node";
    pub const ASSET: &str = "asset";
    pub const SELECTED_ASSET_IDS: &str = "selectedAssetIds";
    pub const OUTPUT_IMAGE: &str = "output-image";
}

/// Decodes the bare body stored under a legacy key.
pub type LegacyDecoder = fn(&str) -> Option<DragPayload>;

/// Legacy keys in the order they are tried. First successful decode wins.
pub const LEGACY_DECODERS: &[(&str, LegacyDecoder)] = &[
    (legacy::CREATE_NODE, decode_create_node),
    (legacy::SELECTED_ASSET_IDS, decode_selected_assets),
    (legacy::ASSET, decode_asset),
    (legacy::OUTPUT_IMAGE, decode_output_image),
];

/// The legacy key a kind is mirrored under, if it has one.
pub fn legacy_key(kind: &DragKind) -> Option<&'static str> {
    match kind {
        DragKind::CreateNode => Some(legacy::CREATE_NODE),
        DragKind::Asset => Some(legacy::ASSET),
        DragKind::AssetsMultiple => Some(legacy::SELECTED_ASSET_IDS),
        DragKind::OutputImage => Some(legacy::OUTPUT_IMAGE),
        _ => None,
    }
}

/// Writes `payload` in the unified format and, where one exists, its legacy key.
///
/// Existing values under the same keys are overwritten.
pub fn serialize(payload: &DragPayload, transfer: &mut dyn DataTransfer) {
    match serde_json::to_string(payload) {
        Ok(json) => transfer.set_data(DRAG_DATA_MIME, &json),
        Err(e) => tracing::warn!(kind = %payload.kind(), error = %e, "Failed to encode drag payload"),
    }

    if let Some(key) = legacy_key(&payload.kind()) {
        match serde_json::to_string(&payload.data) {
            Ok(json) => transfer.set_data(key, &json),
            Err(e) => tracing::warn!(key, error = %e, "Failed to encode legacy drag payload"),
        }
    }
}

/// Reads the payload back from `transfer`.
///
/// Returns `None` when nothing decodable is present, including when the drag
/// only carries external files; those are handled by the drop zone. Legacy
/// keys are consulted only when the unified value is absent or not JSON.
pub fn deserialize(transfer: &dyn DataTransfer) -> Option<DragPayload> {
    if let Some(raw) = read(transfer, DRAG_DATA_MIME) {
        match serde_json::from_str::<WirePayload>(&raw) {
            // A well-formed unified value is authoritative, even when its body
            // does not fit its kind.
            Ok(wire) => {
                let kind = wire.kind.clone();
                return match DragPayload::try_from(wire) {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        tracing::debug!(kind = %kind, error = %e, "Unified drag data does not match its kind");
                        None
                    }
                };
            }
            Err(e) => tracing::debug!(error = %e, "Malformed unified drag data, trying legacy keys"),
        }
    }

    for (key, decode) in LEGACY_DECODERS {
        if let Some(payload) = read(transfer, key).and_then(|raw| decode(&raw)) {
            tracing::trace!(key, "Decoded legacy drag data");
            return Some(payload);
        }
    }

    if has_external_files(transfer) {
        tracing::trace!("Drag carries external files only");
    }
    None
}

/// True if the drag carries files from outside the application.
///
/// Uses the item list when the host exposes it, otherwise the file list.
pub fn has_external_files(transfer: &dyn DataTransfer) -> bool {
    match transfer.item_kinds() {
        Some(kinds) => kinds.contains(&TransferItemKind::File),
        None => !transfer.files().is_empty(),
    }
}

/// Files carried by the drag, in transport order.
pub fn extract_files(transfer: &dyn DataTransfer) -> Vec<FileHandle> {
    transfer.files()
}

fn read(transfer: &dyn DataTransfer, key: &str) -> Option<String> {
    transfer.get_data(key).filter(|raw| !raw.is_empty())
}

fn decode_body(kind: DragKind, raw: &str) -> Option<DragData> {
    let body = match serde_json::from_str(raw) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(%kind, error = %e, "Malformed legacy drag data");
            return None;
        }
    };
    match DragData::from_parts(kind.as_str(), body) {
        Ok(data) => Some(data),
        Err(e) => {
            tracing::debug!(%kind, error = %e, "Legacy drag data has the wrong shape");
            None
        }
    }
}

fn decode_create_node(raw: &str) -> Option<DragPayload> {
    decode_body(DragKind::CreateNode, raw).map(DragPayload::new)
}

fn decode_selected_assets(raw: &str) -> Option<DragPayload> {
    let data = decode_body(DragKind::AssetsMultiple, raw)?;
    let count = match &data {
        DragData::AssetsMultiple(ids) => ids.len(),
        _ => return None,
    };
    Some(DragPayload::new(data).with_metadata(DragMetadata {
        count: Some(count),
        ..Default::default()
    }))
}

fn decode_asset(raw: &str) -> Option<DragPayload> {
    decode_body(DragKind::Asset, raw).map(DragPayload::new)
}

fn decode_output_image(raw: &str) -> Option<DragPayload> {
    decode_body(DragKind::OutputImage, raw).map(DragPayload::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::MemoryTransfer;

    #[test]
    fn legacy_order_is_fixed() {
        let keys: Vec<&str> = LEGACY_DECODERS.iter().map(|(key, _)| *key).collect();
        assert_eq!(
            keys,
            vec!["create-node", "selectedAssetIds", "asset", "output-image"]
        );
    }

    #[test]
    fn create_node_beats_asset_in_legacy_chain() {
        let mut transfer = MemoryTransfer::new();
        transfer.set_data(legacy::ASSET, r#"{"id":"a1","content_type":"image/png"}"#);
        transfer.set_data(legacy::CREATE_NODE, r#"{"node_type":"nodetool.text.Concat"}"#);

        let payload = deserialize(&transfer).expect("payload");
        assert_eq!(payload.kind(), DragKind::CreateNode);
    }

    #[test]
    fn only_some_kinds_have_legacy_keys() {
        assert_eq!(legacy_key(&DragKind::Tab), None);
        assert_eq!(legacy_key(&DragKind::File), None);
        assert_eq!(legacy_key(&DragKind::AssetsMultiple), Some("selectedAssetIds"));
    }
}
