//! Retry-until-available host object discovery.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::config::DiscoveryConfig;
use crate::error::{Error, Result};
use crate::host::{EventSource, HandleKind, Host, HostHandles, LevelInfo, TimeSource};

/// Poll the host until every required object exists.
///
/// The host may take arbitrarily long to construct its objects, so the
/// default is to wait forever; cancellation and epoch invalidation are
/// the normal exits and return `Ok(None)` (not an error). When a timeout
/// is configured, expiry returns [`Error::HostObjectNotFound`] naming the
/// kinds still missing.
pub fn discover_handles(
    host: &dyn Host,
    epoch: &super::Epoch,
    config: &DiscoveryConfig,
    cancel: &CancelToken,
) -> Result<Option<HostHandles>> {
    let started = Instant::now();
    let deadline = config.timeout().map(|timeout| started + timeout);

    let mut time: Option<Arc<dyn TimeSource>> = None;
    let mut score: Option<Arc<dyn EventSource>> = None;
    let mut energy: Option<Arc<dyn EventSource>> = None;
    let mut level: Option<LevelInfo> = None;
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() || !epoch.is_current() {
            return Ok(None);
        }
        attempts += 1;

        if time.is_none() {
            time = host.find_time_source();
        }
        if score.is_none() {
            score = host.find_score_source();
        }
        if energy.is_none() {
            energy = host.find_energy_source();
        }
        if level.is_none() {
            level = host.find_level_info();
        }

        if let (Some(time), Some(score), Some(energy), Some(level)) =
            (&time, &score, &energy, &level)
        {
            debug!(
                "Found all host objects after {} attempt(s) ({:?})",
                attempts,
                started.elapsed()
            );
            return Ok(Some(HostHandles {
                time: Arc::clone(time),
                score: Arc::clone(score),
                energy: Arc::clone(energy),
                level: level.clone(),
            }));
        }

        let missing = missing_kinds(&time, &score, &energy, &level);
        trace!("Still waiting for host objects: {:?}", missing);

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            return Err(Error::HostObjectNotFound {
                waited: started.elapsed(),
                missing,
            });
        }

        if cancel.wait(config.poll_interval()) {
            return Ok(None);
        }
    }
}

fn missing_kinds(
    time: &Option<Arc<dyn TimeSource>>,
    score: &Option<Arc<dyn EventSource>>,
    energy: &Option<Arc<dyn EventSource>>,
    level: &Option<LevelInfo>,
) -> Vec<HandleKind> {
    let mut missing = Vec::new();
    if time.is_none() {
        missing.push(HandleKind::TimeSource);
    }
    if score.is_none() {
        missing.push(HandleKind::ScoreSource);
    }
    if energy.is_none() {
        missing.push(HandleKind::EnergySource);
    }
    if level.is_none() {
        missing.push(HandleKind::LevelMetadata);
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::script::ScriptedHost;
    use crate::session::EpochCounter;
    use std::thread;
    use std::time::Duration;

    fn fast_config(timeout_ms: Option<u64>) -> DiscoveryConfig {
        DiscoveryConfig {
            poll_interval_ms: 1,
            timeout_ms,
        }
    }

    #[test]
    fn test_finds_handles_once_available() {
        let host = Arc::new(ScriptedHost::new());
        host.load_level(LevelInfo {
            song_name: "X".to_string(),
            song_sub_name: "Y".to_string(),
            song_author_name: "Z".to_string(),
            no_fail: false,
        });

        let delayed = Arc::clone(&host);
        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            delayed.make_available();
        });

        let counter = EpochCounter::new();
        let epoch = counter.advance();
        let cancel = CancelToken::new();
        let handles = discover_handles(host.as_ref(), &epoch, &fast_config(None), &cancel)
            .unwrap()
            .expect("handles should be found");
        assert_eq!(handles.level.song_name, "X");
        waker.join().unwrap();
    }

    #[test]
    fn test_cancellation_is_silent() {
        let host = ScriptedHost::new();
        let counter = EpochCounter::new();
        let epoch = counter.advance();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = discover_handles(&host, &epoch, &fast_config(None), &cancel).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_stale_epoch_stops_polling() {
        let host = ScriptedHost::new();
        let counter = EpochCounter::new();
        let old = counter.advance();
        counter.advance();
        let cancel = CancelToken::new();

        let result = discover_handles(&host, &old, &fast_config(None), &cancel).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_timeout_reports_missing_kinds() {
        let host = ScriptedHost::new();
        let counter = EpochCounter::new();
        let epoch = counter.advance();
        let cancel = CancelToken::new();

        let err = discover_handles(&host, &epoch, &fast_config(Some(10)), &cancel).unwrap_err();
        match err {
            Error::HostObjectNotFound { missing, .. } => {
                assert!(missing.contains(&HandleKind::TimeSource));
                assert!(missing.contains(&HandleKind::LevelMetadata));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
