use super::next_free_frame;
use crate::pager::Pager;

/// Evict the frame whose last touch is oldest.
///
/// Frames are stamped with the reference counter on every hit and every
/// claim. Equal stamps go to the lowest frame index.
pub fn select_victim_frame(pager: &mut Pager) -> usize {
    if let Some(frame) = next_free_frame(pager) {
        return frame;
    }

    let victim = pager
        .frames()
        .iter()
        .enumerate()
        .min_by_key(|(_, frame)| frame.last_touched)
        .map(|(index, _)| index)
        .unwrap_or(0);
    log::debug!("LRU victim: frame {}", victim);
    victim
}
