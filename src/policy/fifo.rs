use super::next_free_frame;
use crate::pager::Pager;

/// Rotate through the frames in the order they were first filled.
///
/// The cursor starts at 0 and is advanced before use, so once memory is full
/// the victims run 1, 2, ..., n-1, 0, 1, ...
pub fn select_victim_frame(pager: &mut Pager) -> usize {
    if let Some(frame) = next_free_frame(pager) {
        return frame;
    }

    let victim = (pager.cursors.fifo + 1) % pager.num_frames();
    pager.cursors.fifo = victim;
    log::debug!("FIFO victim: frame {}", victim);
    victim
}
