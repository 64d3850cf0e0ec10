//! Synthetic monitoring data generator.
//!
//! The simulator stands in for the device while none is connected. On a
//! fixed interval it draws a fresh random monitoring state and pushes it
//! through the hub as a full overwrite. Ticks are skipped while a real
//! device holds the link, so simulated data never races real data.

use esprelay_core::{GaugeLevel, MonitoringState};
use esprelay_hub::BroadcastHub;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Probability that each indicator draws as on.
const INDICATOR_ON_PROBABILITY: [f64; 4] = [0.5, 0.5, 0.25, 0.75];

/// Inclusive value range per variable (volts, amps).
const VARIABLE_RANGES: [(f64, f64); 2] = [(0.0, 12.0), (0.0, 5.0)];

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Draw a full random monitoring state.
pub fn random_monitoring<R: Rng>(rng: &mut R) -> MonitoringState {
    let mut indicators = [false; 4];
    for (slot, p) in indicators.iter_mut().zip(INDICATOR_ON_PROBABILITY) {
        *slot = rng.random_bool(p);
    }

    let gauges = [
        GaugeLevel::clamped(rng.random_range(0..=100)),
        GaugeLevel::clamped(rng.random_range(0..=100)),
    ];

    let mut variables = [0.0; 2];
    for (slot, (lo, hi)) in variables.iter_mut().zip(VARIABLE_RANGES) {
        *slot = round_two_decimals(rng.random_range(lo..=hi));
    }

    MonitoringState::from_parts(indicators, gauges, variables)
}

/// Run the simulator until the task is aborted.
///
/// Each tick overwrites the monitoring state and broadcasts it, unless
/// the device link is connected.
pub async fn run_simulator(hub: Arc<BroadcastHub>, interval: Duration) {
    info!(
        interval_ms = interval.as_millis() as u64,
        "Starting simulator"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;

        if hub.device_connected() {
            debug!("Device connected, skipping simulator tick");
            continue;
        }

        let mut rng = rand::rng();
        hub.overwrite_monitoring(random_monitoring(&mut rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esprelay_core::{GaugeId, VariableId};
    use esprelay_state::{DeviceLink, StateStore};

    fn test_hub() -> Arc<BroadcastHub> {
        Arc::new(BroadcastHub::new(
            Arc::new(StateStore::new()),
            Arc::new(DeviceLink::new()),
            Duration::from_secs(10),
        ))
    }

    #[test]
    fn test_random_monitoring_within_domain() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let state = random_monitoring(&mut rng);
            for id in GaugeId::ALL {
                assert!(state.gauge(id).value() <= 100);
            }
            let v1 = state.variable(VariableId::One);
            let v2 = state.variable(VariableId::Two);
            assert!((0.0..=12.0).contains(&v1));
            assert!((0.0..=5.0).contains(&v2));
            // Two decimal places.
            assert!((v1 * 100.0 - (v1 * 100.0).round()).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_simulator_broadcasts_when_device_absent() {
        let hub = test_hub();
        let (_client, mut rx) = hub.connect();
        rx.try_recv().unwrap();
        rx.try_recv().unwrap();

        let handle = tokio::spawn(run_simulator(hub.clone(), Duration::from_millis(10)));

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&event).unwrap();
        assert_eq!(value["event"], "monitoringData");

        handle.abort();
    }

    #[tokio::test]
    async fn test_simulator_skips_while_device_connected() {
        let hub = test_hub();
        let (device, mut device_rx) = hub.connect();
        device_rx.try_recv().unwrap();
        device_rx.try_recv().unwrap();
        hub.handle_device_handshake(device);
        device_rx.try_recv().unwrap();

        let handle = tokio::spawn(run_simulator(hub.clone(), Duration::from_millis(10)));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(device_rx.try_recv().is_err());
        handle.abort();
    }
}
