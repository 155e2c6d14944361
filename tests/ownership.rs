mod common;

use handle_kit::{
    Error, GrowingCall, Handle, VectorQueue,
    growing_buffer::{CallError, stack_capacity},
};
use rstest::rstest;

#[cfg(unix)]
mod descriptors {
    use super::common;
    use handle_kit::platform::unix::{FileDescriptor, pipe, read, write};

    #[test]
    fn release_failure_is_logged_not_raised() {
        let logs = common::capture_logs(|| {
            // far above any open descriptor; close(2) reports EBADF
            let h = unsafe { FileDescriptor::from_raw(1 << 20) };
            drop(h);
        });
        let text = logs.text();
        assert!(text.contains("WARN"), "{text}");
        assert!(text.contains("closing fd failed"), "{text}");
    }

    #[test]
    fn successful_release_is_quiet() {
        let logs = common::capture_logs(|| {
            let (r, w) = pipe().unwrap();
            drop((r, w));
        });
        assert_eq!(logs.text(), "");
    }

    #[test]
    fn handles_survive_containers() {
        common::init_tracing();

        let (r, w) = pipe().unwrap();
        let mut writers = vec![w.clone(), w.clone(), w];
        writers.truncate(1);
        write(&writers[0], b"ok").unwrap();
        writers.clear();

        let mut buf = [0u8; 4];
        assert_eq!(read(&r, &mut buf).unwrap(), 2);
        assert_eq!(read(&r, &mut buf).unwrap(), 0);
    }

    #[test]
    fn queue_of_descriptors_releases_overwritten_entries() {
        let (r, w) = pipe().unwrap();
        let mut q = handle_kit::VectorQueue::new(1);
        q.push_back(w).unwrap();
        q.push_back(FileDescriptor::new()).unwrap();

        // the write end was overwritten, so it is closed already
        let mut buf = [0u8; 1];
        assert_eq!(read(&r, &mut buf).unwrap(), 0);
    }
}

#[test]
fn handle_in_queue_moves_without_release() {
    #[derive(Default)]
    struct Counted;
    static RELEASED: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
    impl handle_kit::Resource for Counted {
        type Raw = u64;
        const INVALID: u64 = 0;

        fn release(&self, _: u64) {
            RELEASED.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    let mut q = VectorQueue::new(2);
    q.push_back(unsafe { Handle::<Counted>::from_raw(1) }).unwrap();
    q.push_back(unsafe { Handle::<Counted>::from_raw(2) }).unwrap();
    let front = q.pop_front().unwrap();
    assert_eq!(front.raw(), 1);
    assert_eq!(RELEASED.load(std::sync::atomic::Ordering::SeqCst), 0);

    drop(q);
    assert_eq!(RELEASED.load(std::sync::atomic::Ordering::SeqCst), 1);
    drop(front);
    assert_eq!(RELEASED.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[rstest]
#[case(10, 1)]
#[case(2000, 2)]
fn growing_call_attempts(#[case] len: usize, #[case] expected_calls: usize) {
    let expected_calls = if len <= stack_capacity::<u8>() { 1 } else { expected_calls };
    let src: Vec<u8> = (0..len).map(|i| i as u8).collect();
    let mut calls = 0;

    let out = GrowingCall::new()
        .call(|buf: &mut [u8]| {
            calls += 1;
            match buf.get_mut(..src.len()) {
                Some(dst) => {
                    dst.copy_from_slice(&src);
                    Ok(src.len())
                }
                None => Err(CallError::<()>::MoreData {
                    required: Some(src.len()),
                }),
            }
        })
        .unwrap();

    assert_eq!(out.len(), len);
    assert_eq!(out, src);
    assert_eq!(calls, expected_calls);
}

#[test]
fn growing_format_macro_is_exported() {
    let s = handle_kit::growing_format!("{}={}", "key", 42).unwrap();
    assert_eq!(s, "key=42");
}

#[test]
fn queue_errors_are_reported() {
    let mut q = VectorQueue::<u8>::default();
    assert_eq!(q.push_back(1), Err(Error::NoCapacity));
    assert_eq!(q.pop_back(), Err(Error::EmptyStorage));
}
