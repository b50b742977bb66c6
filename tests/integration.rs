//! End-to-end session against a scripted vehicle on an in-memory stream.

use std::sync::Arc;
use std::time::Duration;

use groundlink::communication::mavlink::transport::StreamTransport;
use groundlink::error::ParamWriteError;
use groundlink::{CloseReason, Link, LinkConfig, LinkEvent};
use groundlink_core::params::{ParamName, ParamSyncOutcome, ParamType};
use groundlink_core::protocol::messages::{
    Attitude, CommandLong, Heartbeat, ModeFlags, OutboundMessage, ParamSet, ParamValue, SetMode,
};
use groundlink_core::protocol::{encode_v2, DecodedMessage, FrameDecoder, MessageKind, SequenceCounter};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::broadcast;

struct Vehicle {
    stream: DuplexStream,
    decoder: FrameDecoder,
    sequence: SequenceCounter,
}

impl Vehicle {
    async fn send<M: OutboundMessage>(&mut self, msg: &M) {
        let frame = encode_v2(M::KIND.id(), 1, 1, &msg.payload(), &mut self.sequence).unwrap();
        self.stream.write_all(&frame).await.unwrap();
    }

    async fn expect(&mut self, count: usize) -> Vec<DecodedMessage> {
        let mut frames = Vec::new();
        let mut buf = [0u8; 512];
        while frames.len() < count {
            let n = self.stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "link closed the stream");
            frames.extend(self.decoder.push(&buf[..n]));
        }
        frames
    }
}

fn start() -> (Link, Vehicle) {
    let (local, remote) = tokio::io::duplex(64 * 1024);
    let link = Link::start(
        Arc::new(StreamTransport::new("duplex", local)),
        LinkConfig::default(),
    );
    let vehicle = Vehicle {
        stream: remote,
        decoder: FrameDecoder::new(),
        sequence: SequenceCounter::new(),
    };
    (link, vehicle)
}

fn heartbeat(custom_mode: u32, armed: bool) -> Heartbeat {
    let mut base_mode = ModeFlags::CUSTOM_MODE_ENABLED;
    if armed {
        base_mode |= ModeFlags::SAFETY_ARMED;
    }
    Heartbeat {
        custom_mode,
        vehicle_type: 1,
        autopilot: 3,
        base_mode,
        system_status: 4,
        mavlink_version: 3,
    }
}

fn param_value(name: &str, value: f32, index: u16, count: u16) -> ParamValue {
    ParamValue {
        name: ParamName::try_from(name).unwrap(),
        value,
        param_type: ParamType::Real32,
        index: Some(index),
        count: Some(count),
    }
}

async fn sync_outcome(events: &mut broadcast::Receiver<LinkEvent>) -> ParamSyncOutcome {
    loop {
        if let LinkEvent::ParamSyncFinished(outcome) = events.recv().await.unwrap() {
            return outcome;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_vehicle_session() {
    let (link, mut vehicle) = start();
    let mut events = link.subscribe();
    let mut telemetry = link.telemetry();

    // Lock and mode
    vehicle.send(&heartbeat(10, true)).await;
    match events.recv().await.unwrap() {
        LinkEvent::TargetLocked(target) => {
            assert_eq!((target.system_id, target.component_id), (1, 1));
        }
        other => panic!("unexpected event {other:?}"),
    }
    let state = telemetry.wait_for(|s| s.armed).await.unwrap().clone();
    assert_eq!(state.mode, "AUTO");

    // Attitude in degrees
    vehicle
        .send(&Attitude {
            time_boot_ms: 1000,
            roll: 0.1,
            pitch: -0.05,
            yaw: 0.0,
            rollspeed: 0.0,
            pitchspeed: 0.0,
            yawspeed: 0.0,
        })
        .await;
    let state = telemetry.wait_for(|s| !s.roll_deg.is_nan()).await.unwrap().clone();
    assert!((state.roll_deg - 5.73).abs() < 0.01);
    assert!((state.pitch_deg + 2.86).abs() < 0.01);

    // Full download with a repeated index
    assert!(link.request_param_list().await);
    let requests = vehicle.expect(1).await;
    assert_eq!(requests[0].kind(), Some(MessageKind::ParamRequestList));
    for (index, name) in [(0, "ATC_RAT_RLL_P"), (1, "THR_MAX"), (1, "THR_MAX"), (2, "WP_RADIUS")] {
        vehicle.send(&param_value(name, 1.0, index, 3)).await;
    }
    assert_eq!(sync_outcome(&mut events).await, ParamSyncOutcome::Complete { count: 3 });
    assert_eq!(link.params().len(), 3);

    // Confirmed write
    let writer = link.clone();
    let write = tokio::spawn(async move {
        writer
            .set_param("ATC_RAT_RLL_P", 0.135, ParamType::Real32)
            .await
    });
    let frames = vehicle.expect(1).await;
    let set = ParamSet::decode(&frames[0]).unwrap();
    assert_eq!(set.target_system, 1);
    assert_eq!(set.name().as_str(), "ATC_RAT_RLL_P");
    vehicle.send(&param_value("ATC_RAT_RLL_P", 0.135, 0, 3)).await;
    assert_eq!(write.await.unwrap().unwrap().value, 0.135);
    assert_eq!(link.param("ATC_RAT_RLL_P").unwrap().value, 0.135);

    // Mode change by name
    assert_eq!(link.commands().set_mode("RTL").await.unwrap(), 11);
    let frames = vehicle.expect(2).await;
    assert_eq!(SetMode::decode(&frames[0]).unwrap().custom_mode, 11);
    let cmd = CommandLong::decode(&frames[1]).unwrap();
    assert_eq!(cmd.params[1], 11.0);

    // Nothing was lost on the wire
    let stats = link.decoder_stats();
    assert_eq!(stats.crc_errors, 0);
    assert_eq!(stats.dropped_bytes, 0);

    link.shutdown();
    link.closed().await;
    assert!(link.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_write_exhausts_retries() {
    let (link, mut vehicle) = start();
    vehicle.send(&heartbeat(0, false)).await;
    link.target_updates().wait_for(Option::is_some).await.unwrap();

    let writer = link.clone();
    let started = tokio::time::Instant::now();
    let write = tokio::spawn(async move {
        writer
            .set_param("ATC_RAT_RLL_P", 0.135, ParamType::Real32)
            .await
    });

    let frames = vehicle.expect(3).await;
    assert!(frames.iter().all(|f| f.kind() == Some(MessageKind::ParamSet)));
    let err = write.await.unwrap().unwrap_err();
    assert!(matches!(err, ParamWriteError::Exhausted { attempts: 3, .. }));
    // Three echo timeouts plus two backoffs
    assert!(started.elapsed() >= Duration::from_millis(3 * 1500 + 400 + 600));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_fails_pending_write_and_announces_close() {
    let (link, mut vehicle) = start();
    let mut events = link.subscribe();

    let writer = link.clone();
    let write = tokio::spawn(async move { writer.set_param("THR_MAX", 80.0, ParamType::Real32).await });
    vehicle.expect(1).await;

    link.shutdown();
    assert!(matches!(write.await.unwrap(), Err(ParamWriteError::LinkClosed)));
    loop {
        if let LinkEvent::Closed { reason } = events.recv().await.unwrap() {
            assert_eq!(reason, CloseReason::Shutdown);
            break;
        }
    }
    assert!(link.target().is_none());
}
