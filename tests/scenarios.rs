use pager_sim::io::{TraceEvent, TraceReader};
use pager_sim::simulation::{self, Simulation};
use pager_sim::{FaultSummary, Notice, PageFlags, Pager, ReplacementPolicy, TranslationResult};

const POLICIES: [ReplacementPolicy; 3] = [
    ReplacementPolicy::Fifo,
    ReplacementPolicy::SecondChance,
    ReplacementPolicy::Lru,
];

/// Run a trace through the library and return the summary and stdout text
fn replay(trace: &str, policy: ReplacementPolicy) -> (FaultSummary, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let summary = simulation::run(TraceReader::new(trace.as_bytes()), policy, &mut out, &mut err)
        .expect("trace should replay");
    (summary, String::from_utf8(out).unwrap())
}

/// Feed trace lines (no header) one at a time into an existing simulation
fn feed(sim: &mut Simulation, lines: &str) -> Vec<Notice> {
    for line in lines.lines().filter(|l| !l.trim().is_empty()) {
        let event = TraceEvent::parse(line).unwrap_or_else(|| panic!("bad line {:?}", line));
        sim.step(event).unwrap();
    }
    sim.drain_notices()
}

/// The victim frame reported by the last eviction notice
fn last_eviction(notices: &[Notice]) -> Option<usize> {
    notices.iter().rev().find_map(|n| match n {
        Notice::Evicted { frame, .. } => Some(*frame),
        _ => None,
    })
}

/// Frame table and page tables agree: every occupied frame is pointed at by
/// exactly one VALID entry, and nothing else is VALID.
fn assert_consistent(pager: &Pager) {
    let mut valid = 0;
    for pid in 0..pager.num_processes() {
        for page in 0..pager.num_pages() {
            let entry = pager.page_entry(pid, page).unwrap();
            if entry.is_valid() {
                valid += 1;
                assert!(entry.is_allocated());
                let frame = pager.frame(entry.frame).unwrap();
                let resident = frame.resident.expect("VALID page in empty frame");
                assert_eq!((resident.pid, resident.page), (pid, page));
            }
        }
    }
    let occupied = pager.frames().iter().filter(|f| f.is_occupied()).count();
    assert_eq!(valid, occupied);
    assert_eq!(pager.free_frames(), pager.num_frames() - occupied);
}

const FILL_TWO_FRAMES: &str = "
a 0 0 rw
a 0 1 rw
a 0 2 rw
a 0 3 rw
r 0 0x0 r
r 0 0x2 r
r 0 0x0 w
";

fn two_frame_sim(policy: ReplacementPolicy) -> Simulation {
    let header = TraceReader::new("4 2 1 1".as_bytes()).read_header().unwrap();
    Simulation::new(&header, policy).unwrap()
}

#[test]
fn third_page_evicts_frame_one_for_fifo_and_lru() {
    for policy in [ReplacementPolicy::Fifo, ReplacementPolicy::Lru] {
        let mut sim = two_frame_sim(policy);
        let notices = feed(&mut sim, FILL_TWO_FRAMES);
        assert_eq!(last_eviction(&notices), None);
        assert_eq!(sim.pager().free_frames(), 0);

        let notices = feed(&mut sim, "r 0 0x4 r");
        assert_eq!(last_eviction(&notices), Some(1), "{}", policy);
        assert_eq!(
            notices,
            vec![
                Notice::Evicted {
                    pid: 0,
                    page: 1,
                    frame: 1
                },
                Notice::Discarded,
                Notice::PagedIn {
                    pid: 0,
                    page: 2,
                    frame: 1
                },
            ]
        );
        assert_consistent(sim.pager());
    }
}

#[test]
fn fifo_and_lru_diverge_on_out_of_order_touches() {
    let mut fifo = two_frame_sim(ReplacementPolicy::Fifo);
    let mut lru = two_frame_sim(ReplacementPolicy::Lru);
    // page 2 lands in frame 1, then page 0 (frame 0) is touched again
    let tail = "r 0 0x4 r\nr 0 0x1 r\nr 0 0x6 r";
    feed(&mut fifo, FILL_TWO_FRAMES);
    feed(&mut lru, FILL_TWO_FRAMES);

    let fifo_notices = feed(&mut fifo, tail);
    let lru_notices = feed(&mut lru, tail);

    // FIFO keeps rotating over fill order, LRU spares the recently used frame 0
    assert_eq!(last_eviction(&fifo_notices), Some(0));
    assert_eq!(last_eviction(&lru_notices), Some(1));
    // page 0 was written, so FIFO had to write it back
    assert!(fifo_notices.contains(&Notice::WrittenToSwap));
    assert!(!lru_notices.contains(&Notice::WrittenToSwap));
}

#[test]
fn second_chance_skips_referenced_frame() {
    let mut sim = two_frame_sim(ReplacementPolicy::SecondChance);
    feed(&mut sim, FILL_TWO_FRAMES);

    // both pages faulted in referenced; the first sweep clears both bits
    // and takes frame 0
    let notices = feed(&mut sim, "r 0 0x4 r");
    assert_eq!(last_eviction(&notices), Some(0));
    assert_eq!(sim.pager().cursors().second_chance, 1);

    // frame 1 (page 1) lost its bit, frame 0 (page 2) still has it
    let notices = feed(&mut sim, "r 0 0x6 r");
    assert_eq!(last_eviction(&notices), Some(1));
    assert_eq!(sim.pager().cursors().second_chance, 0);
    assert_consistent(sim.pager());
}

#[test]
fn lru_evicts_oldest_touch() {
    let mut sim = Simulation::with_pager(Pager::new(8, 3, 0, 1).unwrap(), ReplacementPolicy::Lru);
    let notices = feed(
        &mut sim,
        "a 0 0 r\na 0 1 r\na 0 2 r\na 0 3 r\n\
         r 0 0 r\nr 0 1 r\nr 0 2 r\n\
         r 0 0 r\nr 0 1 r\nr 0 2 r\n\
         r 0 3 r",
    );
    assert_eq!(last_eviction(&notices), Some(0));
}

#[test]
fn fault_rate_is_exact() {
    let mut trace = String::from("8 3 0 1\na 0 0 r\na 0 1 r\na 0 2 r\n");
    // 3 faults followed by 7 hits
    for page in [0, 1, 2, 0, 1, 2, 0, 1, 2, 0] {
        trace.push_str(&format!("r 0 {:x} r\n", page));
    }
    for policy in POLICIES {
        let (summary, out) = replay(&trace, policy);
        assert_eq!(summary.faults, 3);
        assert_eq!(summary.references, 10);
        assert_eq!(summary.fault_rate(), 0.3);
        assert!(out.contains("Page Fault Rate: 0.300000"));
    }
}

#[test]
fn invalid_references_do_not_count() {
    let trace = "4 2 0 1\na 0 0 r\nr 0 0 w\nr 0 1 r\nr 0 0 r\n";
    let (summary, out) = replay(trace, ReplacementPolicy::Fifo);
    assert_eq!(summary.references, 1);
    assert_eq!(summary.faults, 1);
    assert!(out.contains("Process 0 attempted to write to page 0 but that page can only be read"));
    assert!(out.contains("Process 0 attempted to access page 1 which has not been allocated"));
}

#[test]
fn invariants_hold_under_churn() {
    let mut trace = String::from("6 3 2 2\n");
    for pid in 0..2 {
        for page in 0..6 {
            let access = if page % 2 == 0 { "rw" } else { "r" };
            trace.push_str(&format!("a {} {} {}\n", pid, page, access));
        }
    }
    let pattern = [0u64, 5, 1, 4, 2, 3, 0, 0, 5, 1, 2, 4, 3, 3, 1, 0, 5];
    for policy in POLICIES {
        let mut reader = TraceReader::new(trace.as_bytes());
        let header = reader.read_header().unwrap();
        let mut sim = Simulation::new(&header, policy).unwrap();
        for event in reader {
            sim.step(event.unwrap()).unwrap();
        }

        let mut last_free = sim.pager().free_frames();
        for (i, &page) in pattern.iter().enumerate() {
            let pid = (i % 2) as u64;
            let access = if i % 3 == 0 { PageFlags::WRITE } else { PageFlags::READ };
            let address = (page << 2) | (i as u64 % 4);
            let event = TraceEvent::Reference { pid, address, access };
            let result = sim.step(event).unwrap();

            if page % 2 == 1 && access == PageFlags::WRITE {
                assert_eq!(result, Some(TranslationResult::InvalidPage));
            }
            let free = sim.pager().free_frames();
            assert!(free <= last_free, "{}: free frames grew", policy);
            assert!(free <= sim.pager().num_frames());
            last_free = free;
            assert_consistent(sim.pager());
        }
        assert_eq!(sim.pager().free_frames(), 0);
    }
}
