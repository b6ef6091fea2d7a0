use crate::blit::channel::{BlitChannel, BlitRequest};
use crate::foundation::error::{BufferRole, CompositorResult};
use crate::layer::Layer;

/// How a single merge was carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The accelerator performed the copy.
    Accelerated,
    /// The software word copy performed the copy.
    Software,
    /// The base layer has no buffer; nothing to merge into.
    SkippedNullBase,
    /// The overlay layer has no buffer; nothing to draw.
    SkippedNullOverlay,
}

/// Merge one overlay layer into the base layer's buffer.
///
/// Column and row counts come from the overlay's source rectangle; the
/// display rectangle's own dimensions are not used, as this engine does
/// not scale. The destination origin compounds the overlay's display
/// placement with the base layer's own source offset: the base source
/// rectangle acts as an additional destination bias and is part of the
/// merge contract, not something to normalize away.
///
/// The accelerator channel is tried first; any channel failure is logged
/// and silently degrades to the bounds-checked software copy. A bounds
/// violation on either buffer aborts the remainder of the merge with
/// [`CompositorError::OutOfBounds`], leaving the pixels copied before it
/// in place.
///
/// [`CompositorError::OutOfBounds`]: crate::CompositorError::OutOfBounds
pub fn merge(
    base: &Layer,
    overlay: &Layer,
    channel: &dyn BlitChannel,
) -> CompositorResult<MergeOutcome> {
    let Some(base_buffer) = &base.buffer else {
        tracing::debug!("null base layer");
        return Ok(MergeOutcome::SkippedNullBase);
    };
    let Some(overlay_buffer) = &overlay.buffer else {
        return Ok(MergeOutcome::SkippedNullOverlay);
    };

    let columns = i64::from(overlay.source_rect.width().max(0));
    let rows = i64::from(overlay.source_rect.height().max(0));

    let dst_left = i64::from(overlay.display_rect.left) + i64::from(base.source_rect.left);
    let dst_top = i64::from(overlay.display_rect.top) + i64::from(base.source_rect.top);
    let src_left = i64::from(overlay.source_rect.left);
    let src_top = i64::from(overlay.source_rect.top);

    tracing::debug!(dst_left, dst_top, src_left, src_top, columns, rows, "merge layer");

    let dst_origin = dst_left + dst_top * i64::from(base_buffer.stride());
    let src_origin = src_left + src_top * i64::from(overlay_buffer.stride());
    if dst_origin >= 0 && src_origin >= 0 {
        let request = BlitRequest {
            dst: base_buffer.accel_id(),
            dst_offset: 4 * dst_origin as u64,
            dst_stride: base_buffer.stride(),
            src: overlay_buffer.accel_id(),
            src_offset: 4 * src_origin as u64,
            src_stride: overlay_buffer.stride(),
            columns: columns as u32,
            rows: rows as u32,
        };
        match channel.blit(&request) {
            Ok(()) => return Ok(MergeOutcome::Accelerated),
            Err(error) => {
                tracing::debug!(%error, "accelerated blit failed, using software copy");
            }
        }
    }

    let dst = base_buffer.view(BufferRole::Base);
    let src = overlay_buffer.view(BufferRole::Overlay);
    for i in 0..columns {
        for j in 0..rows {
            let to = dst.checked_index(dst_left + i, dst_top + j)?;
            let from = src.checked_index(src_left + i, src_top + j)?;
            dst.store(to, src.load(from)?)?;
        }
    }
    Ok(MergeOutcome::Software)
}
