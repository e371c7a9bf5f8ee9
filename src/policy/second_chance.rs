use super::next_free_frame;
use crate::memory::PageFlags;
use crate::pager::Pager;

/// Clock sweep over the frames starting at the head cursor.
///
/// A resident page with REFERENCED set loses the bit and is skipped; the
/// first page found without it is the victim. The head is left just past the
/// victim. Every bit can be cleared at most once per sweep, so the loop ends
/// within two passes.
pub fn select_victim_frame(pager: &mut Pager) -> usize {
    if let Some(frame) = next_free_frame(pager) {
        return frame;
    }

    let num_frames = pager.num_frames();
    let mut frame = pager.cursors.second_chance % num_frames;
    for _ in 0..2 * num_frames {
        match pager.resident_entry_mut(frame) {
            Some(entry) if entry.is_referenced() => {
                entry.flags.remove(PageFlags::REFERENCED);
                frame = (frame + 1) % num_frames;
            }
            _ => break,
        }
    }

    pager.cursors.second_chance = (frame + 1) % num_frames;
    log::debug!("SC victim: frame {}", frame);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_util::*;

    fn referenced(pager: &Pager, frame: usize) -> bool {
        pager.resident_entry(frame).unwrap().is_referenced()
    }

    #[test]
    fn test_skips_referenced_frame() {
        let mut pager = pager_with(4, 2);
        reference(&mut pager, 0, select_victim_frame);
        reference(&mut pager, 1, select_victim_frame);

        // frame 0 referenced, frame 1 not
        pager
            .resident_entry_mut(1)
            .unwrap()
            .flags
            .remove(PageFlags::REFERENCED);
        assert!(referenced(&pager, 0));

        assert_eq!(select_victim_frame(&mut pager), 1);
        assert!(!referenced(&pager, 0));
        assert_eq!(pager.cursors().second_chance, 0);

        // frame 0 lost its second chance and goes next
        assert_eq!(select_victim_frame(&mut pager), 0);
        assert_eq!(pager.cursors().second_chance, 1);
    }

    #[test]
    fn test_unreferenced_head_is_taken_immediately() {
        let mut pager = pager_with(6, 3);
        for page in 0..3 {
            reference(&mut pager, page, select_victim_frame);
        }
        for frame in 0..3 {
            pager
                .resident_entry_mut(frame)
                .unwrap()
                .flags
                .remove(PageFlags::REFERENCED);
        }
        pager
            .resident_entry_mut(1)
            .unwrap()
            .flags
            .insert(PageFlags::REFERENCED);

        assert_eq!(select_victim_frame(&mut pager), 0);
        // frame 1 was never reached
        assert!(referenced(&pager, 1));
        assert_eq!(pager.cursors().second_chance, 1);
    }

    #[test]
    fn test_all_referenced_wraps_to_head() {
        let mut pager = pager_with(6, 3);
        for page in 0..3 {
            reference(&mut pager, page, select_victim_frame);
        }
        // every page was referenced when it faulted in
        assert!((0..3).all(|f| referenced(&pager, f)));

        assert_eq!(select_victim_frame(&mut pager), 0);
        assert!((0..3).all(|f| !referenced(&pager, f)));
        assert_eq!(pager.cursors().second_chance, 1);
    }

    #[test]
    fn test_sequence_through_pager() {
        let mut pager = pager_with(8, 3);
        for page in 0..3 {
            reference(&mut pager, page, select_victim_frame);
        }
        // first sweep clears everything and takes frame 0
        assert_eq!(reference(&mut pager, 3, select_victim_frame), Some(0));
        // frame 1 lost its bit in that sweep
        assert_eq!(reference(&mut pager, 4, select_victim_frame), Some(1));
        assert_eq!(pager.cursors().second_chance, 2);

        // a hit on page 2 (frame 2) only buys it one more sweep
        assert_eq!(reference(&mut pager, 2, select_victim_frame), None);
        assert_eq!(reference(&mut pager, 5, select_victim_frame), Some(2));
        assert!(!referenced(&pager, 0));
        assert!(!referenced(&pager, 1));
        assert_eq!(pager.cursors().second_chance, 0);
    }
}
