//! Frame fan-out benchmark.
//!
//! Measures routing one binary frame from a host to N bound viewers,
//! without sockets, at common screen-frame sizes.
//!
//! Run with: cargo bench --bench fanout
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;

use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use screen_relay::relay::OutboundRx;
use screen_relay::{ConnectionRegistry, Inbound, MessageRouter, Peer, Session};
use serde_json::json;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const VIEWER_COUNTS: &[usize] = &[1, 4, 16, 64];
const FRAME_SIZES: &[usize] = &[16 * 1024, 256 * 1024];

// ============================================================================
// Setup
// ============================================================================

struct Fixture {
    router: MessageRouter,
    host: Session,
    viewer_queues: Vec<OutboundRx>,
    host_queue: OutboundRx,
}

fn fixture(viewers: usize) -> Fixture {
    let router = MessageRouter::new(Arc::new(ConnectionRegistry::new()));

    let (peer, host_queue) = Peer::channel();
    let mut host = router.lifecycle().open(peer);
    router.handle_message(
        &mut host,
        Inbound::Text(json!({"type": "register_host", "id": "bench"}).to_string()),
    );

    let connect = json!({"type": "connect_client", "hostId": "bench"}).to_string();
    let viewer_queues = (0..viewers)
        .map(|_| {
            let (peer, mut queue) = Peer::channel();
            let mut viewer = router.lifecycle().open(peer);
            router.handle_message(&mut viewer, Inbound::Text(connect.clone()));
            let _ = queue.try_recv();
            queue
        })
        .collect();

    Fixture {
        router,
        host,
        viewer_queues,
        host_queue,
    }
}

// ============================================================================
// Benchmark: Binary Fan-out
// ============================================================================

fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_fanout");

    for &size in FRAME_SIZES {
        let frame = Bytes::from(vec![0xA5u8; size]);

        for &viewers in VIEWER_COUNTS {
            let mut fx = fixture(viewers);
            group.throughput(Throughput::Bytes((size * viewers) as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}KiB", size / 1024), viewers),
                &frame,
                |b, frame| {
                    b.iter(|| {
                        let dispatch = fx
                            .router
                            .handle_message(&mut fx.host, Inbound::Binary(frame.clone()));
                        for queue in &mut fx.viewer_queues {
                            let _ = black_box(queue.try_recv());
                        }
                        black_box(dispatch)
                    });
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Benchmark: Control Forwarding
// ============================================================================

fn bench_control(c: &mut Criterion) {
    let mut fx = fixture(1);
    let (peer, _queue) = Peer::channel();
    let mut viewer = fx.router.lifecycle().open(peer);
    let control = json!({
        "type": "control",
        "hostId": "bench",
        "payload": {"type": "mouse", "action": "move", "x": 640, "y": 360}
    })
    .to_string();

    c.bench_function("control_forward", |b| {
        b.iter(|| {
            let dispatch = fx
                .router
                .handle_message(&mut viewer, Inbound::Text(control.clone()));
            let _ = black_box(fx.host_queue.try_recv());
            black_box(dispatch)
        });
    });
}

criterion_group!(benches, bench_fanout, bench_control);
criterion_main!(benches);
