use crate::host_loop::HostLoop;

use bridge_core::task_queue::TaskQueue;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(1);

#[test]
fn given_submitted_work_when_ticked_then_runs_against_owned_host() {
    // GIVEN: A loop owning a counter and two queued increments, on a queue
    // with no drain hook
    let queue = Arc::new(TaskQueue::new());
    let mut host_loop = HostLoop::new(0u32, Arc::clone(&queue), FRAME);
    let first = queue.submit(|count: &mut u32| {
        *count += 1;
        Ok(*count)
    });
    let second = queue.submit(|count: &mut u32| {
        *count += 10;
        Ok(*count)
    });

    // WHEN: Ticking once
    let report = host_loop.tick();

    // THEN: Both ran in order on the loop's host
    assert_eq!(report.executed, 2);
    assert_eq!(*host_loop.host(), 11);
    drop((first, second));
}

#[test]
fn given_frame_callback_when_it_sets_stop_then_run_returns() {
    let queue: Arc<TaskQueue<Vec<u32>>> = Arc::new(TaskQueue::new());
    let mut host_loop = HostLoop::new(Vec::new(), queue, FRAME);
    let mut frames = 0;

    host_loop.run(|host, stop| {
        frames += 1;
        host.push(frames);
        if frames == 3 {
            stop.store(true, Ordering::SeqCst);
        }
    });

    assert_eq!(host_loop.into_host(), vec![1, 2, 3]);
}

/// **VALUE**: Verifies that the loop can be stopped from another thread.
///
/// **WHY THIS MATTERS**: The console and signal paths stop the host from outside the loop.
///
/// **BUG THIS CATCHES**: Would catch `stop_flag` handing out a copy instead of the shared flag.
#[test]
fn given_running_loop_when_stop_flag_set_elsewhere_then_loop_exits() {
    // GIVEN: A loop and its stop flag
    let queue: Arc<TaskQueue<()>> = Arc::new(TaskQueue::new());
    let mut host_loop = HostLoop::new((), queue, FRAME);
    let stop = host_loop.stop_flag();

    // WHEN: Another thread sets the flag
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::SeqCst);
    });
    host_loop.run(|_, _| {});

    // THEN: run returned
    stopper.join().expect("stopper thread");
}
